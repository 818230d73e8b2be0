//! Version-parameterized manifest declaration.
//!
//! # Responsibility
//! - Define the built-in resource sets for each site version.
//! - Validate declaration-level invariants before any load attempt.
//!
//! # Invariants
//! - Version N+1 is built as version N plus an additive delta, so the
//!   additive-superset evolution rule holds by construction.
//! - At most one structured-protected resource per declaration.

use crate::model::resource::{ResourceDescriptor, ResourceKind, ResourceName};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the external-links record.
pub const RESOURCE_LINK: &str = "link";
/// Name of the qualifications record.
pub const RESOURCE_QUALIFICATION: &str = "qualification";
/// Name of the license record.
pub const RESOURCE_LICENSE: &str = "license";
/// Name of the public (redacted) profile record.
pub const RESOURCE_PROFILE: &str = "profile";
/// Name of the protected profile record.
pub const RESOURCE_PROFILE_PROTECTED: &str = "profile.protected";
/// Name of the works record, added in version 2.
pub const RESOURCE_WORKS: &str = "works";

/// Site manifest version tag.
///
/// Versions only ever add resources; removing or renaming one would be a
/// breaking change and must become a new variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SiteVersion {
    /// Initial build: records, icon, partner logos, protected profile.
    V1,
    /// Adds works data, the works dependency graph and a raster icon.
    V2,
}

impl SiteVersion {
    /// Latest shipped manifest version.
    pub const LATEST: SiteVersion = SiteVersion::V2;

    /// Stable string id used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Version this one extends, if any.
    pub fn prior(self) -> Option<SiteVersion> {
        match self {
            Self::V1 => None,
            Self::V2 => Some(Self::V1),
        }
    }
}

/// Parses one site version from its stable string id.
pub fn parse_site_version(value: &str) -> Option<SiteVersion> {
    match value.trim() {
        "v1" | "1" => Some(SiteVersion::V1),
        "v2" | "2" => Some(SiteVersion::V2),
        _ => None,
    }
}

impl Display for SiteVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources introduced by one version on top of its prior version.
fn version_delta(version: SiteVersion) -> Vec<ResourceDescriptor> {
    match version {
        SiteVersion::V1 => vec![
            ResourceDescriptor::new(
                RESOURCE_LINK,
                ResourceKind::StructuredPublic,
                "link.data.json",
            ),
            ResourceDescriptor::new(
                RESOURCE_QUALIFICATION,
                ResourceKind::StructuredPublic,
                "qualification.data.json",
            ),
            ResourceDescriptor::new(
                RESOURCE_LICENSE,
                ResourceKind::StructuredPublic,
                "license.data.json",
            ),
            ResourceDescriptor::new(
                RESOURCE_PROFILE,
                ResourceKind::StructuredPublic,
                "profile.data.json",
            ),
            ResourceDescriptor::new(
                RESOURCE_PROFILE_PROTECTED,
                ResourceKind::StructuredProtected,
                "profile.data.enc.bin",
            ),
            ResourceDescriptor::new("icon.svg", ResourceKind::Media, "icon.svg"),
            ResourceDescriptor::new(
                "logo.twitter",
                ResourceKind::Media,
                "Twitter_Logo_WhiteOnBlue.png",
            ),
            ResourceDescriptor::new(
                "logo.github",
                ResourceKind::Media,
                "GitHub-Mark-120px-plus.png",
            ),
        ],
        SiteVersion::V2 => vec![
            ResourceDescriptor::new(
                RESOURCE_WORKS,
                ResourceKind::StructuredPublic,
                "works.data.json",
            ),
            ResourceDescriptor::new("works.graph", ResourceKind::Media, "works.graph.svg"),
            ResourceDescriptor::new("icon.png", ResourceKind::Media, "icon.png"),
        ],
    }
}

/// Ordered, validated resource declaration for one site version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDeclaration {
    version: SiteVersion,
    descriptors: Vec<ResourceDescriptor>,
}

impl ManifestDeclaration {
    /// Builds the built-in declaration for one site version.
    ///
    /// The descriptor list is assembled by chaining every prior version's
    /// delta in order, then this version's delta, and validating the result.
    pub fn for_version(version: SiteVersion) -> Result<Self, DeclarationError> {
        let mut descriptors = Vec::new();
        collect_deltas(version, &mut descriptors);
        Self::new(version, descriptors)
    }

    /// Builds a declaration from caller-provided descriptors.
    ///
    /// # Errors
    /// - `DuplicateResourceName` when two descriptors share a name.
    /// - `EmptyResourceName` / `EmptyLocator` for blank declaration fields.
    /// - `SecondProtectedResource` when more than one protected descriptor
    ///   is declared.
    pub fn new(
        version: SiteVersion,
        descriptors: Vec<ResourceDescriptor>,
    ) -> Result<Self, DeclarationError> {
        let mut declaration = Self {
            version,
            descriptors: Vec::with_capacity(descriptors.len()),
        };
        for descriptor in descriptors {
            declaration.push(descriptor)?;
        }
        Ok(declaration)
    }

    /// Appends one descriptor, enforcing declaration invariants.
    pub fn push(&mut self, descriptor: ResourceDescriptor) -> Result<(), DeclarationError> {
        if descriptor.name.trim().is_empty() {
            return Err(DeclarationError::EmptyResourceName);
        }
        if descriptor.locator.trim().is_empty() {
            return Err(DeclarationError::EmptyLocator {
                name: descriptor.name,
            });
        }
        if self.descriptors.iter().any(|d| d.name == descriptor.name) {
            return Err(DeclarationError::DuplicateResourceName(descriptor.name));
        }
        if descriptor.kind == ResourceKind::StructuredProtected {
            if let Some(existing) = self.protected_descriptor() {
                return Err(DeclarationError::SecondProtectedResource {
                    first: existing.name.clone(),
                    second: descriptor.name,
                });
            }
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Declared site version.
    pub fn version(&self) -> SiteVersion {
        self.version
    }

    /// Ordered declared descriptors.
    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        &self.descriptors
    }

    /// Declared resource names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// The single protected descriptor, when declared.
    pub fn protected_descriptor(&self) -> Option<&ResourceDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.kind == ResourceKind::StructuredProtected)
    }

    /// Returns whether this declaration keeps every public and media
    /// resource of `earlier` (the additive-evolution rule).
    pub fn is_additive_over(&self, earlier: &ManifestDeclaration) -> bool {
        let names: BTreeSet<&str> = self.names().collect();
        earlier
            .descriptors
            .iter()
            .filter(|d| d.kind.is_public())
            .all(|d| names.contains(d.name.as_str()))
    }
}

fn collect_deltas(version: SiteVersion, out: &mut Vec<ResourceDescriptor>) {
    if let Some(prior) = version.prior() {
        collect_deltas(prior, out);
    }
    out.extend(version_delta(version));
}

/// Declaration-time configuration errors.
///
/// All of these are caught before any load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    DuplicateResourceName(ResourceName),
    EmptyResourceName,
    EmptyLocator { name: ResourceName },
    SecondProtectedResource { first: ResourceName, second: ResourceName },
}

impl Display for DeclarationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateResourceName(name) => {
                write!(f, "resource name is declared twice: {name}")
            }
            Self::EmptyResourceName => write!(f, "resource name must not be empty"),
            Self::EmptyLocator { name } => {
                write!(f, "resource locator must not be empty: {name}")
            }
            Self::SecondProtectedResource { first, second } => write!(
                f,
                "only one protected resource is allowed; {second} conflicts with {first}"
            ),
        }
    }
}

impl Error for DeclarationError {}
