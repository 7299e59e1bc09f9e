//! Encrypted, machine-scoped store for the database connection string.
//!
//! The connection string is sealed with AES-256-GCM under a random data
//! key. The data key itself is wrapped by a [`KeyProtector`] so the
//! envelope on disk is useless on another machine or user account.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AppError, Result};

const ENVELOPE_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// Wraps and unwraps the data key of the credential envelope.
pub trait KeyProtector: Send + Sync {
    fn protect(&self, key: &[u8]) -> Result<Vec<u8>>;
    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>>;
}

/// Key protector bound to the current machine and user account.
pub struct MachineKeyProtector {
    wrapping_key: Key<Aes256Gcm>,
}

impl MachineKeyProtector {
    /// Protector for the machine and user this process runs as.
    pub fn current() -> Self {
        let machine = std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_default();
        let user = std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_default();
        Self::with_entropy(&format!("{machine}\\{user}"))
    }

    /// Protector derived from an explicit identity string.
    pub fn with_entropy(identity: &str) -> Self {
        let digest = Sha256::new()
            .chain_update(b"special-equipment/credential-store/v1")
            .chain_update(identity.as_bytes())
            .finalize();
        Self {
            wrapping_key: *Key::<Aes256Gcm>::from_slice(&digest),
        }
    }
}

impl KeyProtector for MachineKeyProtector {
    fn protect(&self, key: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(&self.wrapping_key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, key)
            .map_err(|_| AppError::crypto("failed to wrap data key"))?;

        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() <= NONCE_LEN {
            return Err(AppError::crypto("wrapped key is truncated"));
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(&self.wrapping_key);
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| AppError::crypto("data key was sealed for another machine or user"))
    }
}

/// On-disk envelope.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u8,
    wrapped_key: String,
    nonce: String,
    ciphertext: String,
}

/// File-backed credential store.
pub struct CredentialStore {
    path: PathBuf,
    protector: Box<dyn KeyProtector>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, protector: Box<dyn KeyProtector>) -> Self {
        Self {
            path: path.into(),
            protector,
        }
    }

    /// Store in the per-user config folder, protected for this machine.
    pub fn open_default() -> Self {
        Self::new(Self::default_path(), Box::new(MachineKeyProtector::current()))
    }

    /// `<config dir>/credentials.json`, or the working directory when the
    /// platform exposes no config folder.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("ru", "SpecialEquipment", "special-equipment")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("credentials.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Encrypt and persist a connection string, replacing any previous one.
    pub fn save(&self, connection_string: &str) -> Result<()> {
        let data_key = Aes256Gcm::generate_key(OsRng);
        let cipher = Aes256Gcm::new(&data_key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, connection_string.as_bytes())
            .map_err(|_| AppError::crypto("failed to encrypt connection string"))?;

        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            wrapped_key: STANDARD.encode(self.protector.protect(data_key.as_slice())?),
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&envelope).map_err(|e| AppError::crypto(e.to_string()))?;
        std::fs::write(&self.path, json)?;

        info!("Connection string stored in {:?}", self.path);
        Ok(())
    }

    /// Decrypt the stored connection string; `None` when nothing is stored.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("No credential envelope at {:?}", self.path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let envelope: Envelope =
            serde_json::from_str(&content).map_err(|e| AppError::crypto(format!("malformed envelope: {e}")))?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(AppError::crypto(format!(
                "unsupported envelope version {}",
                envelope.version
            )));
        }

        let wrapped_key = decode_field(&envelope.wrapped_key, "wrapped_key")?;
        let nonce = decode_field(&envelope.nonce, "nonce")?;
        let ciphertext = decode_field(&envelope.ciphertext, "ciphertext")?;
        if nonce.len() != NONCE_LEN {
            return Err(AppError::crypto("nonce has wrong length"));
        }

        let data_key = self.protector.unprotect(&wrapped_key)?;
        let cipher =
            Aes256Gcm::new_from_slice(&data_key).map_err(|_| AppError::crypto("data key has wrong length"))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| AppError::crypto("connection string failed authentication"))?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| AppError::crypto("connection string is not valid UTF-8"))
    }

    /// Remove the stored envelope, if any.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Credential envelope removed");
        }
        Ok(())
    }
}

fn decode_field(value: &str, field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| AppError::crypto(format!("{field} is not valid base64: {e}")))
}
