pub mod algorithm;
pub mod claims;
pub mod errors;
pub mod expiry;
pub mod signer;

pub use algorithm::parse_algorithm;
pub use algorithm::ACCEPTED_ALGORITHMS;
pub use claims::Claims;
pub use errors::ExpiryError;
pub use errors::JwtError;
pub use expiry::parse_lifetime;
pub use signer::IssuedToken;
pub use signer::TokenSigner;
pub use signer::TokenVerifier;
