//! Disclosure gate for the protected profile.
//!
//! # Responsibility
//! - Keep the protected payload and decode key away from every consumer;
//!   the only way through is the explicit `disclose` operation.
//! - Produce a `DisclosedProfile` or a loud failure, never a silent
//!   default.
//!
//! # Invariants
//! - Disclosure is deterministic: the same payload and key always yield a
//!   field-for-field identical profile.
//! - A failed disclosure leaves already-loaded public records untouched.
//!
//! # See also
//! - docs/architecture/disclosure.md

use crate::model::profile::DisclosedProfile;
use crate::model::resource::{ResourceKind, ResourceName, ResourceRecord};
use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod key;

pub use key::{normalize_passphrase, DiscloseKey};

/// Length of the random nonce prefixed to every sealed payload.
pub const NONCE_LEN: usize = 12;

/// Disclosure failure taxonomy.
///
/// Fatal to showing personal profile content; callers may still activate
/// with public data only, but that is their explicit decision.
#[derive(Debug)]
pub enum DisclosureError {
    /// The record handed to the gate is not a protected one.
    NotProtected { name: ResourceName },
    /// Payload is shorter than the sealed-format header.
    TruncatedPayload { len: usize },
    /// Authenticated decryption rejected the payload (corruption, tampering
    /// or a wrong key; the cipher does not distinguish these).
    DecryptRejected,
    /// Decrypted bytes are not a well-formed profile document.
    MalformedProfile { source: serde_json::Error },
    /// The cipher refused to seal the plaintext.
    SealRejected,
}

impl Display for DisclosureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotProtected { name } => {
                write!(f, "disclosure failure: resource `{name}` is not protected")
            }
            Self::TruncatedPayload { len } => write!(
                f,
                "disclosure failure: payload of {len} bytes is shorter than the sealed header"
            ),
            Self::DecryptRejected => {
                write!(f, "disclosure failure: payload rejected by authenticated decryption")
            }
            Self::MalformedProfile { source } => {
                write!(f, "disclosure failure: decoded payload is not a profile: {source}")
            }
            Self::SealRejected => write!(f, "sealing failure: cipher rejected the plaintext"),
        }
    }
}

impl Error for DisclosureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedProfile { source } => Some(source),
            _ => None,
        }
    }
}

/// Gate between the protected profile record and the renderer.
///
/// Holds the only reference to the protected payload during an activation;
/// neither the payload nor the key is reachable through its API.
#[derive(Debug)]
pub struct DisclosureGate<'a> {
    record: &'a ResourceRecord,
}

impl<'a> DisclosureGate<'a> {
    /// Places the gate over one protected record.
    ///
    /// # Errors
    /// - `NotProtected` when the record is of a public kind; public records
    ///   never pass through the gate.
    pub fn over(record: &'a ResourceRecord) -> Result<Self, DisclosureError> {
        if record.kind != ResourceKind::StructuredProtected {
            return Err(DisclosureError::NotProtected {
                name: record.name.clone(),
            });
        }
        Ok(Self { record })
    }

    /// Decodes the protected payload into a structured profile.
    ///
    /// Deterministic: repeated calls with the same key yield identical
    /// profiles. No caching is involved; activation happens once per page
    /// load, so the gate simply recomputes.
    ///
    /// # Side effects
    /// - Emits `disclose` logging events; never logs payload or key bytes.
    pub fn disclose(&self, key: &DiscloseKey) -> Result<DisclosedProfile, DisclosureError> {
        info!(
            "event=disclose module=disclosure status=start resource={} payload_len={}",
            self.record.name,
            self.record.payload.len()
        );
        match open_profile(&self.record.payload, key) {
            Ok(profile) => {
                info!(
                    "event=disclose module=disclosure status=ok resource={} sections={}",
                    self.record.name,
                    profile.sections().len()
                );
                Ok(profile)
            }
            Err(err) => {
                error!(
                    "event=disclose module=disclosure status=error resource={} error={}",
                    self.record.name, err
                );
                Err(err)
            }
        }
    }
}

fn open_profile(payload: &[u8], key: &DiscloseKey) -> Result<DisclosedProfile, DisclosureError> {
    if payload.len() < NONCE_LEN {
        return Err(DisclosureError::TruncatedPayload { len: payload.len() });
    }
    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| DisclosureError::DecryptRejected)?;
    serde_json::from_slice(&plaintext).map_err(|source| DisclosureError::MalformedProfile { source })
}

/// Seals profile plaintext into the protected payload format.
///
/// Counterpart of `DisclosureGate::disclose`, used by the packaging tool
/// and by tests. Output layout: 12-byte random nonce, then the
/// AES-256-GCM ciphertext with its authentication tag.
pub fn seal(plaintext: &[u8], key: &DiscloseKey) -> Result<Vec<u8>, DisclosureError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| DisclosureError::SealRejected)?;

    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(nonce.as_slice());
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}
