use std::str::FromStr;

use jsonwebtoken::Algorithm;

use super::errors::JwtError;

/// Asymmetric algorithms accepted for signing and verification.
pub const ACCEPTED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// Parse an algorithm name and check it against [`ACCEPTED_ALGORITHMS`].
///
/// Shared-secret algorithms (HS*) are rejected: a verifier must never be able
/// to mint tokens.
///
/// # Errors
/// * `AlgorithmNotAllowed` - Unknown name or symmetric algorithm
pub fn parse_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| JwtError::AlgorithmNotAllowed(name.to_string()))?;
    validate_algorithm(algorithm)?;
    Ok(algorithm)
}

/// Reject any algorithm outside [`ACCEPTED_ALGORITHMS`].
pub fn validate_algorithm(algorithm: Algorithm) -> Result<(), JwtError> {
    if ACCEPTED_ALGORITHMS.contains(&algorithm) {
        Ok(())
    } else {
        Err(JwtError::AlgorithmNotAllowed(format!("{:?}", algorithm)))
    }
}
