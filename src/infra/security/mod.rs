//! Credential and token adapters implementing the security ports.

mod jwt;
mod password;

pub use jwt::JwtTokenService;
pub use password::Argon2PasswordService;
