/*!
 * Process-wide cipher service
 *
 * Holds at most one [`AesGcm`] handle for the whole process. [`init`]
 * replaces it under a write lock; [`encrypt`] and [`decrypt`] take the read
 * lock only long enough to clone the handle, so they run concurrently with
 * each other and never observe a half-replaced cipher.
 *
 * Code that needs more than one key should hold [`AesGcm`] handles directly.
 */

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{AesGcm, KeySize};
use crate::error::{CryptoError, CryptoResult};

static ACTIVE: RwLock<Option<AesGcm>> = RwLock::new(None);

// The guarded value is replaced wholesale, so a panic while holding the lock
// cannot leave it half-written.
fn read_guard() -> RwLockReadGuard<'static, Option<AesGcm>> {
    ACTIVE.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_guard() -> RwLockWriteGuard<'static, Option<AesGcm>> {
    ACTIVE.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn active() -> CryptoResult<AesGcm> {
    read_guard().clone().ok_or(CryptoError::NotInitialized)
}

/// Initialize the service with `key`, replacing any previous key
///
/// On error the previously active cipher, if any, stays in place.
///
/// # Errors
///
/// Same as [`AesGcm::new`].
pub fn init(key: &[u8]) -> CryptoResult<()> {
    let cipher = AesGcm::new(key)?;
    let key_size = cipher.key_size();

    let previous = write_guard().replace(cipher);
    match previous {
        Some(old) => log::debug!(
            "cipher service re-initialized: {} -> {}",
            old.key_size(),
            key_size
        ),
        None => log::debug!("cipher service initialized with {}", key_size),
    }
    Ok(())
}

/// Encrypt with the active key
///
/// # Errors
///
/// [`CryptoError::NotInitialized`] before [`init`], otherwise the errors of
/// [`AesGcm::encrypt`].
pub fn encrypt(plaintext: &[u8]) -> CryptoResult<String> {
    active()?.encrypt(plaintext)
}

/// Decrypt with the active key
///
/// # Errors
///
/// [`CryptoError::NotInitialized`] before [`init`], otherwise the errors of
/// [`AesGcm::decrypt`].
pub fn decrypt(ciphertext_hex: &str) -> CryptoResult<Vec<u8>> {
    active()?.decrypt(ciphertext_hex)
}

/// Whether [`init`] has installed a key
pub fn is_initialized() -> bool {
    read_guard().is_some()
}

/// Key size of the active cipher, if any
pub fn active_key_size() -> Option<KeySize> {
    read_guard().as_ref().map(AesGcm::key_size)
}

/// Drop the active cipher and return to the uninitialized state
pub fn reset() {
    if write_guard().take().is_some() {
        log::debug!("cipher service reset");
    }
}
