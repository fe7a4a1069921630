pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod hashing;
pub mod memory;
pub mod policy;

pub use hashing::DecoyHash;
pub use memory::InMemoryCredentialStore;
pub use policy::PasswordPolicy;
pub use r#trait::CredentialStore;
