/*!
 * Error handling for the aesgcm crate
 *
 * Every failure is reported as a distinct [`CryptoError`] variant carrying a
 * stable numeric code, so callers can branch on the kind of failure without
 * parsing messages. Underlying causes are kept as error sources where the
 * cause type supports it.
 */

use std::collections::HashMap;
use thiserror::Error;

use crate::aes::NONCE_SIZE;

/// Error type for all cipher, key generation and configuration operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key size: key must be 16, 24, or 32 bytes long - got {actual}")]
    InvalidKeySize { actual: usize },

    #[error("Failed to create AES cipher: {cause}")]
    CipherConstructionFailed { cause: String },

    #[error("Failed to create GCM: {cause}")]
    AeadConstructionFailed { cause: String },

    #[error("Failed to generate nonce: {source}")]
    NonceGenerationFailed {
        #[source]
        source: rand::Error,
    },

    #[error("Failed to generate key: {source}")]
    KeyGenerationFailed {
        #[source]
        source: rand::Error,
    },

    #[error("Failed to decode ciphertext: {source}")]
    DecodeError {
        #[source]
        source: hex::FromHexError,
    },

    #[error("Invalid nonce size: ciphertext has {actual} bytes, nonce needs {expected}")]
    InvalidNonceSize { expected: usize, actual: usize },

    #[error("Failed to encrypt data: {cause}")]
    EncryptionFailed { cause: String },

    /// Authentication failed. Carries no detail on purpose.
    #[error("Failed to decrypt data")]
    DecryptionFailed,

    #[error("Cipher service is not initialized")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Error code constants for the different error categories
pub mod error_codes {
    // AES errors: 3000-3999
    pub const AES_ENCRYPTION_FAILED: u32 = 3001;
    pub const AES_DECRYPTION_FAILED: u32 = 3002;
    pub const AES_INVALID_KEY_SIZE: u32 = 3003;
    pub const AES_INVALID_NONCE_SIZE: u32 = 3004;
    pub const AES_CIPHER_CONSTRUCTION_FAILED: u32 = 3005;
    pub const AES_GCM_CONSTRUCTION_FAILED: u32 = 3006;
    pub const CIPHERTEXT_DECODE_FAILED: u32 = 3007;

    // Key and randomness errors: 4000-4999
    pub const KEY_GENERATION_FAILED: u32 = 4001;
    pub const NONCE_GENERATION_FAILED: u32 = 4002;

    // Service errors: 8000-8999
    pub const SERVICE_NOT_INITIALIZED: u32 = 8001;

    // Ambient errors: 9000-9999
    pub const SERIALIZATION_FAILED: u32 = 9001;
    pub const IO_ERROR: u32 = 9002;
    pub const CONFIGURATION_INVALID: u32 = 9003;
}

impl CryptoError {
    /// Get the numeric error code for this error
    pub fn error_code(&self) -> u32 {
        match self {
            CryptoError::InvalidKeySize { .. } => error_codes::AES_INVALID_KEY_SIZE,
            CryptoError::CipherConstructionFailed { .. } => {
                error_codes::AES_CIPHER_CONSTRUCTION_FAILED
            }
            CryptoError::AeadConstructionFailed { .. } => error_codes::AES_GCM_CONSTRUCTION_FAILED,
            CryptoError::NonceGenerationFailed { .. } => error_codes::NONCE_GENERATION_FAILED,
            CryptoError::KeyGenerationFailed { .. } => error_codes::KEY_GENERATION_FAILED,
            CryptoError::DecodeError { .. } => error_codes::CIPHERTEXT_DECODE_FAILED,
            CryptoError::InvalidNonceSize { .. } => error_codes::AES_INVALID_NONCE_SIZE,
            CryptoError::EncryptionFailed { .. } => error_codes::AES_ENCRYPTION_FAILED,
            CryptoError::DecryptionFailed => error_codes::AES_DECRYPTION_FAILED,
            CryptoError::NotInitialized => error_codes::SERVICE_NOT_INITIALIZED,
            CryptoError::ConfigError(_) => error_codes::CONFIGURATION_INVALID,
            CryptoError::IoError(_) => error_codes::IO_ERROR,
            CryptoError::SerializationError(_) => error_codes::SERIALIZATION_FAILED,
        }
    }

    /// Get the error category/type as a string
    pub fn error_type(&self) -> &'static str {
        match self {
            CryptoError::InvalidKeySize { .. } => "InvalidKeySize",
            CryptoError::CipherConstructionFailed { .. } => "CipherConstructionFailed",
            CryptoError::AeadConstructionFailed { .. } => "AeadConstructionFailed",
            CryptoError::NonceGenerationFailed { .. } => "NonceGenerationFailed",
            CryptoError::KeyGenerationFailed { .. } => "KeyGenerationFailed",
            CryptoError::DecodeError { .. } => "DecodeError",
            CryptoError::InvalidNonceSize { .. } => "InvalidNonceSize",
            CryptoError::EncryptionFailed { .. } => "EncryptionFailed",
            CryptoError::DecryptionFailed => "DecryptionFailed",
            CryptoError::NotInitialized => "NotInitialized",
            CryptoError::ConfigError(_) => "ConfigError",
            CryptoError::IoError(_) => "IoError",
            CryptoError::SerializationError(_) => "SerializationError",
        }
    }

    /// Get a user-friendly error message
    pub fn user_friendly_message(&self) -> String {
        match self {
            CryptoError::InvalidKeySize { actual } => format!(
                "The key is {} bytes long. Use a 16, 24, or 32 byte key for AES-128, AES-192, or AES-256.",
                actual
            ),
            CryptoError::CipherConstructionFailed { .. }
            | CryptoError::AeadConstructionFailed { .. } => {
                "The cipher could not be set up with the supplied key.".to_string()
            }
            CryptoError::NonceGenerationFailed { .. } | CryptoError::KeyGenerationFailed { .. } => {
                "The system random number generator is unavailable. No data was encrypted."
                    .to_string()
            }
            CryptoError::DecodeError { .. } => {
                "The ciphertext is not valid hexadecimal text.".to_string()
            }
            CryptoError::InvalidNonceSize { .. } => {
                "The ciphertext is too short to contain a nonce.".to_string()
            }
            CryptoError::EncryptionFailed { .. } => {
                "The data could not be encrypted. It may exceed the maximum message size."
                    .to_string()
            }
            CryptoError::DecryptionFailed => {
                "The ciphertext could not be authenticated. It was tampered with, corrupted, or encrypted under a different key. Do not trust this data."
                    .to_string()
            }
            CryptoError::NotInitialized => {
                "No key has been set. Initialize the cipher service before encrypting or decrypting."
                    .to_string()
            }
            CryptoError::ConfigError(_) => {
                "The configuration is invalid. Check the key and key size settings.".to_string()
            }
            CryptoError::IoError(_) => {
                "Input/output operation failed. Check file paths and permissions.".to_string()
            }
            CryptoError::SerializationError(_) => {
                "Data serialization failed. Data format may be corrupted.".to_string()
            }
        }
    }

    /// Get suggested remediation steps
    pub fn suggested_remediation(&self) -> Option<String> {
        match self {
            CryptoError::InvalidKeySize { .. } => Some(
                "Generate a key with generate_key(16 | 24 | 32) or supply one of those lengths."
                    .to_string(),
            ),
            CryptoError::NonceGenerationFailed { .. } | CryptoError::KeyGenerationFailed { .. } => {
                Some("Check system entropy sources and retry the operation.".to_string())
            }
            CryptoError::DecodeError { .. } => Some(
                "Pass the exact string returned by encrypt; it must have an even number of hex digits."
                    .to_string(),
            ),
            CryptoError::InvalidNonceSize { .. } => Some(format!(
                "Ciphertexts are at least {} bytes of nonce followed by the sealed data. Check for truncation.",
                NONCE_SIZE
            )),
            CryptoError::DecryptionFailed => Some(
                "Verify the ciphertext was produced with the same key and has not been modified."
                    .to_string(),
            ),
            CryptoError::NotInitialized => {
                Some("Call service::init with a valid key first.".to_string())
            }
            _ => None,
        }
    }

    /// Get technical details for debugging
    pub fn technical_details(&self) -> HashMap<String, String> {
        let mut details = HashMap::new();

        details.insert("error_code".to_string(), self.error_code().to_string());
        details.insert("error_type".to_string(), self.error_type().to_string());
        details.insert("timestamp".to_string(), chrono::Utc::now().to_rfc3339());

        match self {
            CryptoError::InvalidKeySize { actual } => {
                details.insert("actual".to_string(), actual.to_string());
                details.insert("expected".to_string(), "16, 24, or 32".to_string());
            }
            CryptoError::InvalidNonceSize { expected, actual } => {
                details.insert("expected".to_string(), expected.to_string());
                details.insert("actual".to_string(), actual.to_string());
            }
            CryptoError::CipherConstructionFailed { cause }
            | CryptoError::AeadConstructionFailed { cause }
            | CryptoError::EncryptionFailed { cause } => {
                details.insert("cause".to_string(), cause.clone());
            }
            CryptoError::NonceGenerationFailed { source }
            | CryptoError::KeyGenerationFailed { source } => {
                details.insert("cause".to_string(), source.to_string());
            }
            CryptoError::DecodeError { source } => {
                details.insert("cause".to_string(), source.to_string());
            }
            CryptoError::DecryptionFailed | CryptoError::NotInitialized => {}
            CryptoError::ConfigError(cause)
            | CryptoError::IoError(cause)
            | CryptoError::SerializationError(cause) => {
                details.insert("cause".to_string(), cause.clone());
            }
        }

        details
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(source: hex::FromHexError) -> Self {
        CryptoError::DecodeError { source }
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        CryptoError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(err: serde_json::Error) -> Self {
        CryptoError::SerializationError(err.to_string())
    }
}

/// Result type alias for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = vec![
            CryptoError::InvalidKeySize { actual: 7 },
            CryptoError::CipherConstructionFailed { cause: "x".into() },
            CryptoError::AeadConstructionFailed { cause: "x".into() },
            CryptoError::InvalidNonceSize {
                expected: 12,
                actual: 3,
            },
            CryptoError::EncryptionFailed { cause: "x".into() },
            CryptoError::DecryptionFailed,
            CryptoError::NotInitialized,
            CryptoError::ConfigError("x".into()),
            CryptoError::IoError("x".into()),
            CryptoError::SerializationError("x".into()),
        ];

        let mut codes: Vec<u32> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_decode_error_keeps_source() {
        let error: CryptoError = hex::decode("zz").unwrap_err().into();
        assert_eq!(error.error_code(), error_codes::CIPHERTEXT_DECODE_FAILED);
        assert!(error.source().is_some());
        assert!(error.to_string().starts_with("Failed to decode ciphertext"));
    }

    #[test]
    fn test_invalid_key_size_message() {
        let error = CryptoError::InvalidKeySize { actual: 20 };
        assert!(error.to_string().contains("16, 24, or 32"));
        assert!(error.user_friendly_message().contains("20 bytes"));
        assert!(error.suggested_remediation().is_some());
    }

    #[test]
    fn test_technical_details() {
        let error = CryptoError::InvalidNonceSize {
            expected: 12,
            actual: 4,
        };
        let details = error.technical_details();
        assert_eq!(details["error_type"], "InvalidNonceSize");
        assert_eq!(details["expected"], "12");
        assert_eq!(details["actual"], "4");
        assert!(details.contains_key("timestamp"));
    }

    #[test]
    fn test_decryption_failure_has_no_cause() {
        let details = CryptoError::DecryptionFailed.technical_details();
        assert!(!details.contains_key("cause"));
        assert!(CryptoError::DecryptionFailed
            .user_friendly_message()
            .contains("Do not trust"));
    }
}
