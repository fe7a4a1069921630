//! Durable key-value storage for client tokens

pub mod file;
pub mod memory;

pub mod r#trait {
    pub use super::trait_::*;
}

#[path = "trait.rs"]
mod trait_;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;
pub use trait_::TokenStorage;
