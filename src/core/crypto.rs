//! Cryptographic operations using age encryption.
//!
//! Seals and unseals secret parameter values for the file store using the
//! age format with x25519 keys and ASCII armor encoding. The armored
//! ciphertext is exactly what an undecrypted read of a secret returns.

use std::io::{Read, Write};

use age::x25519;

use crate::error::{Error, Result};

/// Encrypt a plaintext string for a recipient, producing armored text.
pub fn seal(plaintext: &str, recipient: &x25519::Recipient) -> Result<String> {
    let encryptor =
        age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
            .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(age::armor::ArmoredWriter::wrap_output(
            &mut encrypted,
            age::armor::Format::AsciiArmor,
        )?)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    writer.write_all(plaintext.as_bytes())?;
    let armored = writer
        .finish()
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;
    armored
        .finish()
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    String::from_utf8(encrypted).map_err(|e| Error::EncryptionFailed(e.to_string()))
}

/// Decrypt an armored string with a private key.
pub fn unseal(armored: &str, identity: &x25519::Identity) -> Result<String> {
    let reader = age::armor::ArmoredReader::new(armored.as_bytes());
    let decryptor =
        age::Decryptor::new(reader).map_err(|e| Error::DecryptionFailed(e.to_string()))?;

    let mut decrypted = Vec::new();
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| Error::DecryptionFailed(e.to_string()))?;

    reader.read_to_end(&mut decrypted)?;

    String::from_utf8(decrypted).map_err(|e| Error::DecryptionFailed(e.to_string()))
}

/// Parse a stored identity string back into an age identity.
pub fn parse_identity(key: &str) -> Result<x25519::Identity> {
    key.parse::<x25519::Identity>()
        .map_err(|e| Error::DecryptionFailed(format!("invalid age identity: {}", e)))
}
