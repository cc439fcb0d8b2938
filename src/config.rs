/*!
 * Cipher configuration
 *
 * A small JSON document selecting the key size used for key generation and,
 * optionally, an externally supplied hex key:
 *
 * ```json
 * { "key_size": 32, "key_hex": "00112233..." }
 * ```
 *
 * `AESGCM_KEY` and `AESGCM_KEY_SIZE` in the environment override the file.
 */

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aes::{generate_key_for, AesGcm, KeySize};
use crate::error::{CryptoError, CryptoResult};
use crate::secure_memory::SecureBytes;

/// Environment variable holding a hex-encoded key
pub const KEY_ENV: &str = "AESGCM_KEY";

/// Environment variable holding the key size in bytes
pub const KEY_SIZE_ENV: &str = "AESGCM_KEY_SIZE";

/// Settings for building an [`AesGcm`] cipher
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CipherConfig {
    /// Size of generated keys, and the required size of `key_hex`
    pub key_size: KeySize,
    /// Externally supplied key, hex-encoded
    pub key_hex: Option<String>,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            key_size: KeySize::Aes256,
            key_hex: None,
        }
    }
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field("key_size", &self.key_size)
            .field("key_hex", &self.key_hex.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CipherConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        serde_json::from_str(json).map_err(|e| CryptoError::ConfigError(e.to_string()))
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// [`CryptoError::IoError`] if the file cannot be read and
    /// [`CryptoError::ConfigError`] if it is not a valid configuration.
    pub fn load(path: &Path) -> CryptoResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CryptoError::IoError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&contents)?;

        log::debug!("loaded cipher config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> CryptoResult<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> CryptoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = lookup(KEY_SIZE_ENV) {
            let len: usize = size.trim().parse().map_err(|_| {
                CryptoError::ConfigError(format!("{} must be 16, 24, or 32", KEY_SIZE_ENV))
            })?;
            self.key_size = KeySize::from_len(len)?;
        }

        if let Some(key) = lookup(KEY_ENV) {
            let key = key.trim().to_string();
            // A key given on its own determines the size
            if lookup(KEY_SIZE_ENV).is_none() {
                if let Ok(size) = KeySize::from_len(key.len() / 2) {
                    self.key_size = size;
                }
            }
            self.key_hex = Some(key);
        }

        Ok(self)
    }

    /// Check that a configured key decodes and matches `key_size`
    pub fn validate(&self) -> CryptoResult<()> {
        self.configured_key().map(|_| ())
    }

    /// Decode the configured key, if any
    pub fn configured_key(&self) -> CryptoResult<Option<SecureBytes>> {
        let Some(key_hex) = self.key_hex.as_deref() else {
            return Ok(None);
        };

        let key = SecureBytes::from(hex::decode(key_hex)?);
        let actual = KeySize::from_len(key.len())?;
        if actual != self.key_size {
            return Err(CryptoError::ConfigError(format!(
                "configured key is {} bytes but key_size is {}",
                key.len(),
                self.key_size.len()
            )));
        }

        Ok(Some(key))
    }

    /// The configured key, or a freshly generated one of `key_size`
    pub fn resolve_key(&self) -> CryptoResult<SecureBytes> {
        match self.configured_key()? {
            Some(key) => Ok(key),
            None => generate_key_for(self.key_size),
        }
    }

    /// Build a cipher from the configured key
    ///
    /// # Errors
    ///
    /// [`CryptoError::ConfigError`] when no key is configured, otherwise the
    /// errors of [`CipherConfig::validate`] and [`AesGcm::new`].
    pub fn build_cipher(&self) -> CryptoResult<AesGcm> {
        let key = self.configured_key()?.ok_or_else(|| {
            CryptoError::ConfigError(format!(
                "no key configured; set key_hex or {}",
                KEY_ENV
            ))
        })?;
        AesGcm::new(key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CipherConfig::default();
        assert_eq!(config.key_size, KeySize::Aes256);
        assert!(config.key_hex.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_key().unwrap().len(), 32);
    }

    #[test]
    fn test_from_json() {
        let config = CipherConfig::from_json(r#"{ "key_size": 16 }"#).unwrap();
        assert_eq!(config.key_size, KeySize::Aes128);

        let config = CipherConfig::from_json("{}").unwrap();
        assert_eq!(config, CipherConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        for json in [
            r#"{ "key_size": 20 }"#,
            r#"{ "key_size": 32, "mode": "cbc" }"#,
            "not json",
        ] {
            assert!(matches!(
                CipherConfig::from_json(json),
                Err(CryptoError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cipher.json");
        let key_hex = "11".repeat(24);

        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "key_size": 24, "key_hex": "{}" }}"#, key_hex).unwrap();

        let config = CipherConfig::load(&path).unwrap();
        assert_eq!(config.key_size, KeySize::Aes192);

        let cipher = config.build_cipher().unwrap();
        assert_eq!(cipher.key_size(), KeySize::Aes192);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CipherConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(CryptoError::IoError(_))));
    }

    #[test]
    fn test_key_size_mismatch() {
        let config = CipherConfig {
            key_size: KeySize::Aes256,
            key_hex: Some("00".repeat(16)),
        };
        assert!(matches!(config.validate(), Err(CryptoError::ConfigError(_))));
    }

    #[test]
    fn test_bad_key_hex() {
        let config = CipherConfig {
            key_size: KeySize::Aes128,
            key_hex: Some("xyz".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(CryptoError::DecodeError { .. })
        ));

        let config = CipherConfig {
            key_size: KeySize::Aes128,
            key_hex: Some("00".repeat(10)),
        };
        assert!(matches!(
            config.validate(),
            Err(CryptoError::InvalidKeySize { actual: 10 })
        ));
    }

    #[test]
    fn test_build_cipher_requires_key() {
        assert!(matches!(
            CipherConfig::default().build_cipher(),
            Err(CryptoError::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let key_hex = "ab".repeat(16);
        let config = CipherConfig::default()
            .with_overrides_from(lookup_from(&[(KEY_ENV, key_hex.as_str())]))
            .unwrap();
        assert_eq!(config.key_size, KeySize::Aes128);
        assert_eq!(config.key_hex.as_deref(), Some(key_hex.as_str()));
        assert!(config.build_cipher().is_ok());

        let config = CipherConfig::default()
            .with_overrides_from(lookup_from(&[(KEY_SIZE_ENV, "24")]))
            .unwrap();
        assert_eq!(config.key_size, KeySize::Aes192);

        let result = CipherConfig::default()
            .with_overrides_from(lookup_from(&[(KEY_SIZE_ENV, "big")]));
        assert!(matches!(result, Err(CryptoError::ConfigError(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = CipherConfig {
            key_size: KeySize::Aes128,
            key_hex: Some("cafebabe".repeat(4)),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("cafebabe"));
        assert!(rendered.contains("REDACTED"));
    }
}
