//! Authentication route handlers
//!
//! This module contains the session lifecycle endpoints:
//! - Registration and login
//! - Token refresh
//! - Logout

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
