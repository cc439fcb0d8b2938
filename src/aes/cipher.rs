use std::fmt;
use std::sync::Arc;

use ::aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Size of the GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// AES-192 in GCM mode with a 96-bit nonce
type Aes192Gcm = aes_gcm::AesGcm<Aes192, U12>;

/// Supported AES key sizes
///
/// Serializes as the key length in bytes (`16`, `24` or `32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum KeySize {
    /// 16-byte key, AES-128
    Aes128,
    /// 24-byte key, AES-192
    Aes192,
    /// 32-byte key, AES-256
    Aes256,
}

impl KeySize {
    /// All supported sizes, smallest first
    pub const ALL: [KeySize; 3] = [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256];

    /// Map a key length in bytes to a key size
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] unless `len` is 16, 24 or 32.
    pub fn from_len(len: usize) -> CryptoResult<Self> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            actual => Err(CryptoError::InvalidKeySize { actual }),
        }
    }

    /// Key length in bytes
    pub const fn len(self) -> usize {
        match self {
            KeySize::Aes128 => 16,
            KeySize::Aes192 => 24,
            KeySize::Aes256 => 32,
        }
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeySize::Aes128 => "AES-128-GCM",
            KeySize::Aes192 => "AES-192-GCM",
            KeySize::Aes256 => "AES-256-GCM",
        };
        f.write_str(name)
    }
}

impl TryFrom<usize> for KeySize {
    type Error = CryptoError;

    fn try_from(len: usize) -> CryptoResult<Self> {
        KeySize::from_len(len)
    }
}

impl From<KeySize> for usize {
    fn from(size: KeySize) -> usize {
        size.len()
    }
}

/// The keyed GCM instance behind an [`AesGcm`] handle
enum GcmEngine {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl GcmEngine {
    fn new(key: &[u8], key_size: KeySize) -> CryptoResult<Self> {
        let engine = match key_size {
            KeySize::Aes128 => GcmEngine::Aes128(gcm_from_block::<Aes128, Aes128Gcm>(key)?),
            KeySize::Aes192 => GcmEngine::Aes192(gcm_from_block::<Aes192, Aes192Gcm>(key)?),
            KeySize::Aes256 => GcmEngine::Aes256(gcm_from_block::<Aes256, Aes256Gcm>(key)?),
        };
        Ok(engine)
    }

    fn seal(
        &self,
        nonce: &[u8; NONCE_SIZE],
        payload: Payload<'_, '_>,
    ) -> aes_gcm::aead::Result<Vec<u8>> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            GcmEngine::Aes128(gcm) => gcm.encrypt(nonce, payload),
            GcmEngine::Aes192(gcm) => gcm.encrypt(nonce, payload),
            GcmEngine::Aes256(gcm) => gcm.encrypt(nonce, payload),
        }
    }

    fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        payload: Payload<'_, '_>,
    ) -> aes_gcm::aead::Result<Vec<u8>> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            GcmEngine::Aes128(gcm) => gcm.decrypt(nonce, payload),
            GcmEngine::Aes192(gcm) => gcm.decrypt(nonce, payload),
            GcmEngine::Aes256(gcm) => gcm.decrypt(nonce, payload),
        }
    }
}

/// Build the AES block cipher, then wrap it in GCM mode
fn gcm_from_block<B, G>(key: &[u8]) -> CryptoResult<G>
where
    B: KeyInit,
    G: AeadCore + From<B>,
{
    let block = B::new_from_slice(key).map_err(|e| CryptoError::CipherConstructionFailed {
        cause: e.to_string(),
    })?;

    // The wire format hard-codes the nonce and tag lengths
    let nonce_size = G::NonceSize::USIZE;
    let tag_size = G::TagSize::USIZE;
    if nonce_size != NONCE_SIZE || tag_size != TAG_SIZE {
        return Err(CryptoError::AeadConstructionFailed {
            cause: format!(
                "expected {}-byte nonce and {}-byte tag, got {} and {}",
                NONCE_SIZE, TAG_SIZE, nonce_size, tag_size
            ),
        });
    }

    Ok(G::from(block))
}

/// AES-GCM cipher bound to a single key
///
/// Each call to [`AesGcm::encrypt`] generates a fresh random nonce, so
/// encrypting the same plaintext twice yields different ciphertexts. The
/// ciphertext is the lowercase hex encoding of
/// `nonce (12 bytes) || sealed data || tag (16 bytes)`.
///
/// The handle is cheap to clone and can be shared between threads; all
/// clones use the same keyed cipher.
///
/// # Security Considerations
///
/// 1. Random 96-bit nonces stay safe for at most 2^32 messages per key;
///    rotate the key before reaching that count
/// 2. A repeated nonce under one key exposes the XOR of the plaintexts and
///    allows tag forgery
/// 3. Ciphertexts are not bound to any context unless associated data is
///    passed to the `_with_aad` methods
///
/// # Examples
///
/// ```
/// use aesgcm::aes::AesGcm;
///
/// let key = [0u8; 32];
/// let cipher = AesGcm::new(&key).unwrap();
///
/// let ciphertext = cipher.encrypt(b"hello").unwrap();
/// assert_eq!(ciphertext.len(), 66);
///
/// let plaintext = cipher.decrypt(&ciphertext).unwrap();
/// assert_eq!(plaintext, b"hello");
/// ```
#[derive(Clone)]
pub struct AesGcm {
    engine: Arc<GcmEngine>,
    key_size: KeySize,
}

impl fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcm")
            .field("key_size", &self.key_size)
            .field("cipher", &"[AES-GCM Cipher]")
            .finish()
    }
}

impl AesGcm {
    /// Create a new AES-GCM cipher with the given key
    ///
    /// The key length selects the variant: 16 bytes for AES-128, 24 for
    /// AES-192 and 32 for AES-256.
    ///
    /// # Arguments
    ///
    /// * `key` - Raw key bytes
    ///
    /// # Returns
    ///
    /// A cipher handle bound to `key`, or an error if the key is unusable
    ///
    /// # Security Considerations
    ///
    /// 1. The key must come from a CSPRNG such as [`generate_key`](super::generate_key)
    ///    and be kept secret
    /// 2. The caller's copy of `key` is not zeroed; drop it promptly
    ///
    /// # Errors
    ///
    /// * [`CryptoError::InvalidKeySize`] if the key is not 16, 24 or 32 bytes
    /// * [`CryptoError::CipherConstructionFailed`] if the block cipher rejects the key
    /// * [`CryptoError::AeadConstructionFailed`] if the GCM instance does not
    ///   use a 12-byte nonce and 16-byte tag
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        let key_size = KeySize::from_len(key.len())?;
        let engine = GcmEngine::new(key, key_size)?;

        log::debug!("initialized {} cipher", key_size);

        Ok(Self {
            engine: Arc::new(engine),
            key_size,
        })
    }

    /// The key size this cipher was created with
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// Nonce length in bytes expected at the front of every ciphertext
    pub fn nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    /// Length of the hex string produced for a plaintext of `plaintext_len` bytes
    pub fn encrypted_hex_len(plaintext_len: usize) -> usize {
        2 * (NONCE_SIZE + plaintext_len + TAG_SIZE)
    }

    /// Generate a random nonce from the operating system's CSPRNG
    ///
    /// # Security Considerations
    ///
    /// 1. Each nonce must be unique for a given key
    /// 2. Uniqueness is probabilistic; the birthday bound on 96-bit values
    ///    caps a key at 2^32 messages
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::NonceGenerationFailed`] if the random source
    /// cannot supply enough bytes.
    pub fn generate_nonce() -> CryptoResult<[u8; NONCE_SIZE]> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.try_fill_bytes(&mut nonce).map_err(|source| {
            log::warn!("nonce generation failed: {}", source);
            CryptoError::NonceGenerationFailed { source }
        })?;
        Ok(nonce)
    }

    /// Encrypt plaintext and return `hex(nonce || ciphertext || tag)`
    ///
    /// No associated data is authenticated.
    ///
    /// # Errors
    ///
    /// * [`CryptoError::NonceGenerationFailed`] if no nonce could be drawn
    /// * [`CryptoError::EncryptionFailed`] if the plaintext exceeds the GCM
    ///   message size limit
    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<String> {
        self.encrypt_with_aad(plaintext, None)
    }

    /// Encrypt plaintext, authenticating optional associated data
    ///
    /// The associated data is not part of the output. The same associated
    /// data must be passed to [`AesGcm::decrypt_with_aad`]. `None` and an
    /// empty slice are equivalent.
    ///
    /// # Examples
    ///
    /// ```
    /// use aesgcm::aes::AesGcm;
    ///
    /// let cipher = AesGcm::new(&[7u8; 16]).unwrap();
    /// let ciphertext = cipher.encrypt_with_aad(b"balance=10", Some(&b"record:42"[..])).unwrap();
    ///
    /// assert!(cipher.decrypt_with_aad(&ciphertext, Some(&b"record:43"[..])).is_err());
    /// let plaintext = cipher.decrypt_with_aad(&ciphertext, Some(&b"record:42"[..])).unwrap();
    /// assert_eq!(plaintext, b"balance=10");
    /// ```
    pub fn encrypt_with_aad(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> CryptoResult<String> {
        let nonce = Self::generate_nonce()?;
        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or(&[]),
        };

        let sealed = self.engine.seal(&nonce, payload).map_err(|e| {
            CryptoError::EncryptionFailed {
                cause: format!("{} encryption failed: {}", self.key_size, e),
            }
        })?;

        let mut output = Vec::with_capacity(NONCE_SIZE + sealed.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&sealed);

        Ok(hex::encode(output))
    }

    /// Decrypt a hex ciphertext produced by [`AesGcm::encrypt`]
    ///
    /// # Errors
    ///
    /// * [`CryptoError::DecodeError`] if the input is not valid hex
    /// * [`CryptoError::InvalidNonceSize`] if the decoded input is shorter than the nonce
    /// * [`CryptoError::DecryptionFailed`] if authentication fails (wrong key,
    ///   tampered or truncated data). No plaintext is returned in that case.
    pub fn decrypt(&self, ciphertext_hex: &str) -> CryptoResult<Vec<u8>> {
        self.decrypt_with_aad(ciphertext_hex, None)
    }

    /// Decrypt a hex ciphertext, verifying optional associated data
    ///
    /// # Security Considerations
    ///
    /// 1. The associated data must match what was passed when encrypting
    /// 2. Tag comparison is constant time inside `aes-gcm`; no plaintext is
    ///    released when it fails
    pub fn decrypt_with_aad(
        &self,
        ciphertext_hex: &str,
        associated_data: Option<&[u8]>,
    ) -> CryptoResult<Vec<u8>> {
        let data = hex::decode(ciphertext_hex)?;

        if data.len() < NONCE_SIZE {
            return Err(CryptoError::InvalidNonceSize {
                expected: NONCE_SIZE,
                actual: data.len(),
            });
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        let payload = Payload {
            msg: sealed,
            aad: associated_data.unwrap_or(&[]),
        };

        self.engine.open(&nonce, payload).map_err(|_| {
            log::warn!(
                "{} authentication failed for {}-byte ciphertext",
                self.key_size,
                data.len()
            );
            CryptoError::DecryptionFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_handle_is_send_sync() {
        assert_send_sync::<AesGcm>();
    }

    #[test]
    fn test_key_size_from_len() {
        assert_eq!(KeySize::from_len(16).unwrap(), KeySize::Aes128);
        assert_eq!(KeySize::from_len(24).unwrap(), KeySize::Aes192);
        assert_eq!(KeySize::from_len(32).unwrap(), KeySize::Aes256);

        for len in [0, 1, 15, 17, 23, 25, 31, 33, 64] {
            assert!(matches!(
                KeySize::from_len(len),
                Err(CryptoError::InvalidKeySize { actual }) if actual == len
            ));
        }
    }

    #[test]
    fn test_key_size_display() {
        assert_eq!(KeySize::Aes128.to_string(), "AES-128-GCM");
        assert_eq!(KeySize::Aes192.to_string(), "AES-192-GCM");
        assert_eq!(KeySize::Aes256.to_string(), "AES-256-GCM");
    }

    #[test]
    fn test_key_size_serde() {
        assert_eq!(serde_json::to_string(&KeySize::Aes192).unwrap(), "24");
        let size: KeySize = serde_json::from_str("16").unwrap();
        assert_eq!(size, KeySize::Aes128);
        assert!(serde_json::from_str::<KeySize>("20").is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let cipher = AesGcm::new(&[0x5A; 32]).unwrap();
        let rendered = format!("{:?}", cipher);
        assert!(rendered.contains("Aes256"));
        assert!(!rendered.contains("5a"));
        assert!(!rendered.contains("90"));
    }

    #[test]
    fn test_generate_nonce_differs() {
        let nonce1 = AesGcm::generate_nonce().unwrap();
        let nonce2 = AesGcm::generate_nonce().unwrap();
        assert_ne!(nonce1, nonce2);
    }

    #[test]
    fn test_encrypted_hex_len() {
        assert_eq!(AesGcm::encrypted_hex_len(0), 56);
        assert_eq!(AesGcm::encrypted_hex_len(5), 66);
    }

    #[test]
    fn test_gcm_with_wrong_nonce_size_is_rejected() {
        use aes_gcm::aead::consts::U16;

        // The key is valid but a 16-byte nonce does not fit the wire format
        let result = gcm_from_block::<Aes128, aes_gcm::AesGcm<Aes128, U16>>(&[0u8; 16]);
        match result {
            Err(CryptoError::AeadConstructionFailed { cause }) => {
                assert!(cause.contains("got 16 and 16"), "cause: {}", cause);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("16-byte nonce GCM was accepted"),
        }
    }

    #[test]
    fn test_block_cipher_rejects_key_length() {
        let result = gcm_from_block::<Aes128, Aes128Gcm>(&[0u8; 24]);
        assert!(matches!(
            result,
            Err(CryptoError::CipherConstructionFailed { .. })
        ));

        assert!(gcm_from_block::<Aes192, Aes192Gcm>(&[0u8; 24]).is_ok());
    }

    #[test]
    fn test_short_body_fails_authentication() {
        // A nonce with fewer bytes than a tag behind it cannot authenticate
        let cipher = AesGcm::new(&[1u8; 16]).unwrap();
        let input = hex::encode([0u8; NONCE_SIZE + 4]);
        assert!(matches!(
            cipher.decrypt(&input),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_empty_vs_none_aad() {
        let cipher = AesGcm::new(&[3u8; 24]).unwrap();
        let ciphertext = cipher.encrypt_with_aad(b"payload", Some(&[][..])).unwrap();
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), b"payload");

        let ciphertext = cipher.encrypt(b"payload").unwrap();
        assert_eq!(
            cipher.decrypt_with_aad(&ciphertext, Some(&[][..])).unwrap(),
            b"payload"
        );
    }
}
