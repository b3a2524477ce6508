use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::algorithm::validate_algorithm;
use super::claims::Claims;
use super::errors::JwtError;

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verifies bearer tokens with a public key only.
///
/// Holding a `TokenVerifier` grants no ability to mint tokens, so it can be
/// handed to any component that only needs to check them.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenVerifier {
    /// Build a verifier from a PEM encoded public key.
    ///
    /// # Errors
    /// * `AlgorithmNotAllowed` - Symmetric algorithm requested
    /// * `InvalidKey` - Key does not parse for the algorithm's family
    pub fn from_pem(algorithm: Algorithm, public_key_pem: &[u8]) -> Result<Self, JwtError> {
        validate_algorithm(algorithm)?;

        let decoding_key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(public_key_pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(public_key_pem),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(public_key_pem),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Err(JwtError::AlgorithmNotAllowed(format!("{:?}", algorithm)))
            }
        }
        .map_err(|e| JwtError::InvalidKey(e.to_string()))?;

        Ok(Self {
            decoding_key,
            algorithm,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Decode and validate a token.
    ///
    /// Only the configured algorithm is accepted and `exp` is mandatory and
    /// enforced without leeway.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is in the past
    /// * `AlgorithmNotAllowed` - Header algorithm differs from the configured one
    /// * `InvalidSignature` - Signature does not match the public key
    /// * `MissingClaim` - A required claim is absent
    /// * `InvalidToken` - Malformed token
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(classify_decode_error)
    }
}

fn classify_decode_error(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            JwtError::AlgorithmNotAllowed(error.to_string())
        }
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
        _ => JwtError::InvalidToken(error.to_string()),
    }
}

/// Signs bearer tokens with a private key.
///
/// Every token carries `iat` and an `exp` derived from the configured
/// lifetime. The matching [`TokenVerifier`] is built from the public half of
/// the same keypair.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    lifetime: Duration,
}

impl TokenSigner {
    /// Build a signer from a PEM encoded keypair.
    ///
    /// # Arguments
    /// * `algorithm` - Asymmetric signing algorithm
    /// * `private_key_pem` - Private key (PKCS#8, or PKCS#1 for RSA)
    /// * `public_key_pem` - Matching public key
    /// * `lifetime` - Validity window of issued tokens
    ///
    /// # Errors
    /// * `AlgorithmNotAllowed` - Symmetric algorithm requested
    /// * `InvalidKey` - A key does not parse for the algorithm's family
    pub fn from_pem(
        algorithm: Algorithm,
        private_key_pem: &[u8],
        public_key_pem: &[u8],
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let verifier = TokenVerifier::from_pem(algorithm, public_key_pem)?;

        let encoding_key = match algorithm {
            Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(private_key_pem),
            Algorithm::EdDSA => EncodingKey::from_ed_pem(private_key_pem),
            _ => EncodingKey::from_rsa_pem(private_key_pem),
        }
        .map_err(|e| JwtError::InvalidKey(e.to_string()))?;

        Ok(Self {
            encoding_key,
            verifier,
            lifetime,
        })
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Issue a token whose subject is `identifier`, expiring after the
    /// configured lifetime.
    pub fn issue(&self, identifier: &str) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_principal(identifier, self.lifetime);
        let exp = claims
            .exp
            .ok_or_else(|| JwtError::MissingClaim("exp".to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| JwtError::EncodingFailed(format!("expiry out of range: {}", exp)))?;

        let token = self.encode(&claims)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Encode arbitrary claims as-is.
    ///
    /// # Errors
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.verifier.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Shorthand for `self.verifier().decode(token)`.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        self.verifier.decode(token)
    }
}
