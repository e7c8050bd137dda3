pub mod constants;
pub mod enrollment;
pub mod error;
pub mod messages;
pub mod registry;
pub mod types;
pub mod verifier;

pub use enrollment::{EnrollmentData, EnrollmentPaths};
pub use error::{Error, Result};
pub use registry::IdentityRegistry;
pub use types::*;
pub use verifier::{TokenVerifier, Verification};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
