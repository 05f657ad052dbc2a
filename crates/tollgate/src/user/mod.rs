//! User management module.
//!
//! Owns the identity record, its storage and password hashing. The auth
//! core only reads identities through [`crate::auth::IdentityResolver`].

mod memory;
mod models;
mod password;
mod repository;
mod service;
mod store;

pub use memory::MemoryIdentityStore;
pub use models::{Credentials, NewUser, RegistrationRequest, Role, User};
pub use password::{BcryptHasher, PasswordHasher};
pub use repository::UserRepository;
pub use service::{RegistrationError, UserService};
pub use store::{IdentityStore, StoreError};
