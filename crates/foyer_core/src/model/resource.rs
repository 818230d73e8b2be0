//! Resource record model.
//!
//! # Responsibility
//! - Define the named, typed unit of data the manifest declares and loads.
//! - Keep payloads opaque at this layer; interpretation belongs to the
//!   renderer or to the disclosure gate.
//!
//! # Invariants
//! - `name` is unique within one manifest version.
//! - Payload bytes are never rewritten after load.

use serde::{Deserialize, Serialize};

/// Stable identifier for a declared resource.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ResourceName = String;

/// Logical category of a declared resource.
///
/// The kind decides how the bootstrap may hand the payload to the renderer:
/// protected records must pass through the disclosure gate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Directly inspectable structured data (JSON text).
    StructuredPublic,
    /// Opaque encoded structured data; usable only after disclosure.
    StructuredProtected,
    /// Vector or raster image bytes.
    Media,
}

impl ResourceKind {
    /// Stable string id used in declarations and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StructuredPublic => "structured_public",
            Self::StructuredProtected => "structured_protected",
            Self::Media => "media",
        }
    }

    /// Returns whether records of this kind may reach the renderer verbatim.
    pub fn is_public(self) -> bool {
        matches!(self, Self::StructuredPublic | Self::Media)
    }
}

/// Parses one resource kind from its stable string id.
pub fn parse_resource_kind(value: &str) -> Option<ResourceKind> {
    match value {
        "structured_public" => Some(ResourceKind::StructuredPublic),
        "structured_protected" => Some(ResourceKind::StructuredProtected),
        "media" => Some(ResourceKind::Media),
        _ => None,
    }
}

/// Declaration-time description of one resource.
///
/// The locator is relative; transport and base location are the concern of
/// the `ResourceSource` implementation resolving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Stable logical name, e.g. `license` or `profile.protected`.
    pub name: ResourceName,
    /// Expected kind of the resolved payload.
    pub kind: ResourceKind,
    /// Relative source locator resolved by the loading environment.
    pub locator: String,
}

impl ResourceDescriptor {
    /// Creates a descriptor from name, kind and locator.
    pub fn new(
        name: impl Into<ResourceName>,
        kind: ResourceKind,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            locator: locator.into(),
        }
    }
}

/// A loaded, immutable resource.
///
/// Emptiness of the payload is a data-quality concern for the renderer, not
/// a load failure; the loader treats zero bytes as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Stable logical name copied from the descriptor.
    pub name: ResourceName,
    /// Kind copied from the descriptor.
    pub kind: ResourceKind,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl ResourceRecord {
    /// Creates a loaded record for a descriptor and its resolved payload.
    pub fn new(descriptor: &ResourceDescriptor, payload: Vec<u8>) -> Self {
        Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            payload,
        }
    }

    /// Returns whether this record may be handed to the renderer verbatim.
    pub fn is_public(&self) -> bool {
        self.kind.is_public()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_resource_kind, ResourceDescriptor, ResourceKind, ResourceRecord};

    #[test]
    fn kind_string_ids_round_trip() {
        for kind in [
            ResourceKind::StructuredPublic,
            ResourceKind::StructuredProtected,
            ResourceKind::Media,
        ] {
            assert_eq!(parse_resource_kind(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(parse_resource_kind("script"), None);
        assert_eq!(parse_resource_kind("Media"), None);
    }

    #[test]
    fn protected_kind_is_not_public() {
        assert!(ResourceKind::StructuredPublic.is_public());
        assert!(ResourceKind::Media.is_public());
        assert!(!ResourceKind::StructuredProtected.is_public());
    }

    #[test]
    fn record_copies_descriptor_identity() {
        let descriptor =
            ResourceDescriptor::new("license", ResourceKind::StructuredPublic, "license.data.json");
        let record = ResourceRecord::new(&descriptor, b"[]".to_vec());
        assert_eq!(record.name, "license");
        assert_eq!(record.kind, ResourceKind::StructuredPublic);
        assert!(record.is_public());
    }

    #[test]
    fn empty_payload_is_a_valid_record() {
        let descriptor = ResourceDescriptor::new("icon.svg", ResourceKind::Media, "icon.svg");
        let record = ResourceRecord::new(&descriptor, Vec::new());
        assert!(record.payload.is_empty());
    }
}
