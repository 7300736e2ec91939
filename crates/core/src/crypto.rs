//! AES-256-GCM encryption of bank account details.
//!
//! Each call to [`BankCipher::encrypt`] draws a fresh random 12-byte nonce.
//! The stored form is `"<nonce hex>:<ciphertext hex>"`, where the ciphertext
//! carries the 16-byte authentication tag appended by the cipher.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Errors from the bank detail cipher.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Encryption key must be {KEY_LEN} bytes encoded as hex")]
    InvalidKey,

    #[error("Malformed encrypted value")]
    Malformed,

    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed: value was tampered with or the key is wrong")]
    Decrypt,

    #[error("Decrypted value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Plaintext bank account details attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

/// The same three fields in their encrypted storage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

/// Symmetric cipher for bank detail fields.
#[derive(Clone)]
pub struct BankCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for BankCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankCipher").finish_non_exhaustive()
    }
}

impl BankCipher {
    /// Build a cipher from raw key bytes.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Build a cipher from a 64-character hex key (the `BANK_ENCRYPTION_KEY`
    /// format).
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| CryptoError::InvalidKey)?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    /// Encrypt a single field.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;
        Ok(format!("{}:{}", hex::encode(nonce), hex::encode(ciphertext)))
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, stored: &str) -> Result<String, CryptoError> {
        let (nonce_hex, ciphertext_hex) = stored.split_once(':').ok_or(CryptoError::Malformed)?;
        let nonce_bytes = hex::decode(nonce_hex).map_err(|_| CryptoError::Malformed)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CryptoError::Malformed);
        }
        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| CryptoError::Malformed)?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
            .map_err(|_| CryptoError::Decrypt)?;
        Ok(String::from_utf8(plaintext)?)
    }

    pub fn encrypt_bank_details(
        &self,
        details: &BankDetails,
    ) -> Result<EncryptedBankDetails, CryptoError> {
        Ok(EncryptedBankDetails {
            account_name: self.encrypt(&details.account_name)?,
            account_number: self.encrypt(&details.account_number)?,
            bank_name: self.encrypt(&details.bank_name)?,
        })
    }

    pub fn decrypt_bank_details(
        &self,
        encrypted: &EncryptedBankDetails,
    ) -> Result<BankDetails, CryptoError> {
        Ok(BankDetails {
            account_name: self.decrypt(&encrypted.account_name)?,
            account_number: self.decrypt(&encrypted.account_number)?,
            bank_name: self.decrypt(&encrypted.bank_name)?,
        })
    }
}

/// Hide all but the last four characters of an account number. Spaces and
/// hyphens are dropped; any other character counts toward the mask.
pub fn mask_account_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    let hidden = chars.len().saturating_sub(4);
    let tail: String = chars[hidden..].iter().collect();
    format!("{}{tail}", "*".repeat(hidden))
}
