//! Ports - capability interfaces consumed by the use cases.
//!
//! SOLID (DIP): use cases depend on these traits only; adapters in `infra`
//! implement them. No storage or crypto types appear in any signature.

mod password;
mod repositories;
mod token;

pub use password::PasswordService;
pub use repositories::{BookRepository, RoleRepository, UserRepository};
pub use token::{TokenClaims, TokenService};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordService;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockBookRepository, MockRoleRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use token::MockTokenService;
