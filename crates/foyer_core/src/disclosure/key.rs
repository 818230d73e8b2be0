//! Decode key derivation.
//!
//! # Responsibility
//! - Turn an environment-provided passphrase into the 256-bit key the
//!   disclosure gate decrypts with.
//!
//! # Invariants
//! - The passphrase is reduced to its hiragana characters before hashing,
//!   so spacing and stray input do not change the derived key.
//! - Key material is never logged and never exposed through `Debug`.

use once_cell::sync::Lazy;
use regex::Regex;
use sha3::{Digest, Sha3_256};
use std::fmt::{Debug, Formatter};

static NON_HIRAGANA: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^ぁ-ゖ]").expect("hiragana filter pattern is valid"));

/// Symmetric key the disclosure gate decodes the protected profile with.
///
/// The key mechanism is environment-provided: the host hands over a
/// passphrase and this type owns only the derivation, never storage.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscloseKey {
    bytes: [u8; 32],
}

impl DiscloseKey {
    /// Derives a key from a passphrase.
    ///
    /// Everything but hiragana is stripped, then the remainder is hashed
    /// with SHA3-256. Two passphrases that differ only in punctuation,
    /// whitespace or script noise derive the same key.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let normalized = normalize_passphrase(passphrase);
        let bytes: [u8; 32] = Sha3_256::digest(normalized.as_bytes()).into();
        Self { bytes }
    }

    /// Wraps externally derived key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub(crate) fn bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl Debug for DiscloseKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("DiscloseKey(redacted)")
    }
}

/// Reduces a passphrase to the hiragana characters it contains.
pub fn normalize_passphrase(passphrase: &str) -> String {
    NON_HIRAGANA.replace_all(passphrase, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{normalize_passphrase, DiscloseKey};

    #[test]
    fn normalization_keeps_only_hiragana() {
        assert_eq!(normalize_passphrase("やまだ たろう"), "やまだたろう");
        assert_eq!(normalize_passphrase("ヤマダ12 abc"), "");
        assert_eq!(normalize_passphrase("や・ま、だ！"), "やまだ");
    }

    #[test]
    fn equivalent_passphrases_derive_the_same_key() {
        let a = DiscloseKey::from_passphrase("やまだたろう");
        let b = DiscloseKey::from_passphrase(" やまだ たろう\n");
        assert_eq!(a, b);
    }

    #[test]
    fn different_passphrases_derive_different_keys() {
        let a = DiscloseKey::from_passphrase("やまだたろう");
        let b = DiscloseKey::from_passphrase("すずきはなこ");
        assert_ne!(a, b);
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let key = DiscloseKey::from_passphrase("やまだたろう");
        assert_eq!(format!("{key:?}"), "DiscloseKey(redacted)");
    }
}
