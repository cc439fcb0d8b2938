/*!
 * AES-GCM authenticated encryption
 *
 * Symmetric encryption with AES-128, AES-192 or AES-256 in Galois/Counter
 * Mode. Each message is sealed under a fresh random 96-bit nonce and the
 * result is transported as lowercase hex:
 *
 * ```text
 * hex( nonce (12 bytes) || ciphertext || tag (16 bytes) )
 * ```
 *
 * The AES and GCM primitives come from the RustCrypto `aes-gcm` crate;
 * this crate handles key validation, nonce generation, framing and error
 * reporting.
 *
 * # Example
 *
 * ```
 * use aesgcm::prelude::*;
 *
 * fn main() -> Result<(), CryptoError> {
 *     let key = generate_key(32)?;
 *     let cipher = AesGcm::new(key.as_bytes())?;
 *
 *     let ciphertext = cipher.encrypt(b"attack at dawn")?;
 *     let plaintext = cipher.decrypt(&ciphertext)?;
 *     assert_eq!(plaintext, b"attack at dawn");
 *     Ok(())
 * }
 * ```
 */

/// AES-GCM cipher handle, key generation and the process-wide service
pub mod aes;

/// Cipher configuration loaded from JSON and the environment
pub mod config;

/// Common error types
pub mod error;

/// Zeroizing container for key material
pub mod secure_memory;

pub use crate::aes::{AesGcm, KeySize, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use secure_memory::SecureBytes;

/// Set the process-wide key. See [`aes::service::init`].
pub fn init(key: &[u8]) -> CryptoResult<()> {
    aes::service::init(key)
}

/// Encrypt with the process-wide key. See [`aes::service::encrypt`].
pub fn encrypt(plaintext: &[u8]) -> CryptoResult<String> {
    aes::service::encrypt(plaintext)
}

/// Decrypt with the process-wide key. See [`aes::service::decrypt`].
pub fn decrypt(ciphertext_hex: &str) -> CryptoResult<Vec<u8>> {
    aes::service::decrypt(ciphertext_hex)
}

/// Generate a random key of 16, 24 or 32 bytes. See [`aes::generate_key`].
pub fn generate_key(size: usize) -> CryptoResult<SecureBytes> {
    aes::generate_key(size)
}

/// The most commonly used types and functions
pub mod prelude {
    pub use crate::aes::{generate_key, generate_key_for, AesGcm, KeySize};
    pub use crate::config::CipherConfig;
    pub use crate::error::{CryptoError, CryptoResult};
    pub use crate::secure_memory::SecureBytes;
}
