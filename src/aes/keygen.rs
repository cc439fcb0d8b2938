use rand::rngs::OsRng;
use rand::RngCore;

use super::KeySize;
use crate::error::{CryptoError, CryptoResult};
use crate::secure_memory::SecureBytes;

/// Generate a random AES key of `size` bytes
///
/// The key is drawn from the operating system's CSPRNG and returned in a
/// container that is zeroed on drop. Storing the key and passing it to
/// [`AesGcm::new`](super::AesGcm::new) is up to the caller.
///
/// # Security Considerations
///
/// 1. Prefer 32-byte keys unless a peer requires a smaller size
/// 2. Avoid leaving copies of the key in unzeroed buffers, for example via
///    [`SecureBytes::to_hex`]
///
/// # Errors
///
/// * [`CryptoError::InvalidKeySize`] unless `size` is 16, 24 or 32
/// * [`CryptoError::KeyGenerationFailed`] if the random source fails
///
/// # Examples
///
/// ```
/// use aesgcm::aes::{generate_key, AesGcm};
///
/// let key = generate_key(24).unwrap();
/// assert_eq!(key.len(), 24);
///
/// let cipher = AesGcm::new(key.as_bytes()).unwrap();
/// let ciphertext = cipher.encrypt(b"data").unwrap();
/// assert_eq!(cipher.decrypt(&ciphertext).unwrap(), b"data");
/// ```
pub fn generate_key(size: usize) -> CryptoResult<SecureBytes> {
    generate_key_for(KeySize::from_len(size)?)
}

/// Generate a random key for the given [`KeySize`]
pub fn generate_key_for(key_size: KeySize) -> CryptoResult<SecureBytes> {
    let mut key = SecureBytes::zeroed(key_size.len());

    OsRng.try_fill_bytes(key.as_bytes_mut()).map_err(|source| {
        log::warn!("key generation failed: {}", source);
        CryptoError::KeyGenerationFailed { source }
    })?;

    log::debug!("generated {}-byte key", key_size.len());
    Ok(key)
}
