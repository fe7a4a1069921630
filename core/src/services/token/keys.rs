//! HS256 signing keys built once at startup and passed to whoever signs or
//! verifies access tokens.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use fc_shared::JwtConfig;

use crate::errors::TokenError;

/// Minimum key size for HS256 (256 bits)
pub const MIN_KEY_BYTES: usize = 32;

const BASE64_PREFIX: &str = "base64:";

/// Immutable symmetric key material
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    key_len: usize,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm())
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// Builds keys from a configured secret
    ///
    /// A secret prefixed with `base64:` must decode as standard base64. Without
    /// the prefix, a value that decodes as standard base64 to at least 32 bytes
    /// is used decoded; anything else is taken as raw UTF-8 bytes.
    pub fn from_secret(secret: &str) -> Result<Self, TokenError> {
        let bytes = decode_secret(secret)?;

        if bytes.len() < MIN_KEY_BYTES {
            return Err(TokenError::InvalidSigningKey {
                reason: format!(
                    "key is {} bytes, at least {} are required",
                    bytes.len(),
                    MIN_KEY_BYTES
                ),
            });
        }

        Ok(Self::from_bytes(&bytes))
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        Self::from_secret(&config.secret)
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            key_len: bytes.len(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Length of the key material in bytes
    pub fn key_len(&self) -> usize {
        self.key_len
    }
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, TokenError> {
    if let Some(encoded) = secret.strip_prefix(BASE64_PREFIX) {
        return STANDARD
            .decode(encoded.trim())
            .map_err(|e| TokenError::InvalidSigningKey {
                reason: format!("invalid base64: {}", e),
            });
    }

    match STANDARD.decode(secret.trim()) {
        Ok(decoded) if decoded.len() >= MIN_KEY_BYTES => Ok(decoded),
        _ => Ok(secret.as_bytes().to_vec()),
    }
}
