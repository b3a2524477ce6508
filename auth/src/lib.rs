//! Credential primitives shared by the service crates.
//!
//! - Password hashing (Argon2id, configurable work factor)
//! - Asymmetric token signing and verification (RS*/PS*/ES*/EdDSA)
//! - Authentication coordination
//!
//! Key material is never ambient: callers read PEM files once at startup and
//! pass them into [`TokenSigner::from_pem`] / [`TokenVerifier::from_pem`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_params(4096, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("other_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```no_run
//! use auth::{parse_algorithm, parse_lifetime, Claims, TokenSigner};
//!
//! let private_pem = std::fs::read("keys/jwt_private.pem").unwrap();
//! let public_pem = std::fs::read("keys/jwt_public.pem").unwrap();
//!
//! let signer = TokenSigner::from_pem(
//!     parse_algorithm("RS256").unwrap(),
//!     &private_pem,
//!     &public_pem,
//!     parse_lifetime("1h").unwrap(),
//! )
//! .unwrap();
//!
//! let issued = signer.issue("alice").unwrap();
//! let claims: Claims = signer.verifier().decode(&issued.token).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("alice"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::parse_algorithm;
pub use jwt::parse_lifetime;
pub use jwt::Claims;
pub use jwt::ExpiryError;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::TokenSigner;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;
