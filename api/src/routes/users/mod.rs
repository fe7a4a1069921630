//! Profile of the authenticated member

pub mod me;
