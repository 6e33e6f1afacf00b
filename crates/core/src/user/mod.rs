//! Operator accounts, password hashing and sign-in checks.

pub mod directory;
pub mod password;
pub mod types;

pub use directory::UserDirectory;
pub use password::{hash_password, verify_password};
pub use types::{
    MIN_PASSWORD_LENGTH, NewUser, User, UserFilter, UserPatch, check_sign_in,
    ensure_admin_remains, normalize_username,
};
