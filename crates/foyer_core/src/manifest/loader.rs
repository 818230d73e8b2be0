//! Manifest loading over a resource source seam.
//!
//! # Responsibility
//! - Resolve every declared descriptor to its payload bytes.
//! - Produce a complete `Manifest` or fail as a whole.
//!
//! # Invariants
//! - No undeclared resource is ever fetched.
//! - Load order is unspecified and not observable through the `Manifest`;
//!   records are stored in declaration order regardless of fetch order.
//! - An empty payload counts as loaded.

use crate::manifest::declaration::{ManifestDeclaration, SiteVersion};
use crate::model::resource::{ResourceKind, ResourceName, ResourceRecord};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

pub type LoadResult<T> = Result<T, LoadError>;

/// Transport-level failure while resolving one locator.
#[derive(Debug)]
pub enum SourceError {
    /// The locator did not resolve to any resource.
    NotFound { locator: String },
    /// The locator resolved but the bytes could not be read.
    Unreadable {
        locator: String,
        source: std::io::Error,
    },
    /// The locator is outside the shape this source accepts.
    InvalidLocator { locator: String },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { locator } => write!(f, "no resource at locator `{locator}`"),
            Self::Unreadable { locator, source } => {
                write!(f, "resource at locator `{locator}` is unreadable: {source}")
            }
            Self::InvalidLocator { locator } => write!(f, "locator is invalid: `{locator}`"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            Self::NotFound { .. } | Self::InvalidLocator { .. } => None,
        }
    }
}

/// Manifest load failure.
///
/// A single missing resource fails the whole load; the renderer assumes a
/// fixed resource set exists, so there is no partial-manifest mode.
#[derive(Debug)]
pub enum LoadError {
    ResourceMissing {
        name: ResourceName,
        cause: SourceError,
    },
}

impl LoadError {
    /// Name of the resource that failed to resolve.
    pub fn resource_name(&self) -> &str {
        match self {
            Self::ResourceMissing { name, .. } => name,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceMissing { name, cause } => {
                write!(f, "declared resource `{name}` is missing: {cause}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ResourceMissing { cause, .. } => Some(cause),
        }
    }
}

/// Transport seam resolving locators to payload bytes.
///
/// The core only defines the name-to-kind mapping; how a locator is reached
/// (directory, archive, host fetch layer) is the implementor's concern.
pub trait ResourceSource {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, SourceError>;
}

/// Filesystem-backed resource source rooted at one directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source resolving locators under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(locator);
        // Locators are relative names inside the site build; anything that
        // escapes the root is a declaration mistake, not a lookup miss.
        let escapes = relative.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if locator.trim().is_empty() || escapes {
            return Err(SourceError::InvalidLocator {
                locator: locator.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceSource for DirectorySource {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.resolve(locator)?;
        fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => SourceError::NotFound {
                locator: locator.to_string(),
            },
            _ => SourceError::Unreadable {
                locator: locator.to_string(),
                source: err,
            },
        })
    }
}

/// Ordered, versioned set of loaded resource records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    version: SiteVersion,
    records: Vec<ResourceRecord>,
}

impl Manifest {
    /// Declared site version this manifest was loaded for.
    pub fn version(&self) -> SiteVersion {
        self.version
    }

    /// All records in declaration order.
    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the manifest holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up one record by its declared name.
    pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Records the renderer may receive verbatim, in declaration order.
    pub fn public_records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(|record| record.is_public())
    }

    /// The single protected record, when the declaration carries one.
    pub fn protected_record(&self) -> Option<&ResourceRecord> {
        self.records
            .iter()
            .find(|record| record.kind == ResourceKind::StructuredProtected)
    }
}

impl ManifestDeclaration {
    /// Resolves every declared descriptor through `source`.
    ///
    /// All-or-nothing join over the declared resources: the first descriptor
    /// that fails to resolve fails the whole load with `ResourceMissing`.
    ///
    /// # Side effects
    /// - Fetches exactly the declared locators, nothing else.
    /// - Emits `manifest_load` logging events with duration and status.
    pub fn load(&self, source: &dyn ResourceSource) -> LoadResult<Manifest> {
        let started_at = Instant::now();
        info!(
            "event=manifest_load module=manifest status=start version={} resources={}",
            self.version(),
            self.descriptors().len()
        );

        let mut records = Vec::with_capacity(self.descriptors().len());
        for descriptor in self.descriptors() {
            match source.fetch(&descriptor.locator) {
                Ok(payload) => records.push(ResourceRecord::new(descriptor, payload)),
                Err(cause) => {
                    error!(
                        "event=manifest_load module=manifest status=error version={} duration_ms={} resource={} error={}",
                        self.version(),
                        started_at.elapsed().as_millis(),
                        descriptor.name,
                        cause
                    );
                    return Err(LoadError::ResourceMissing {
                        name: descriptor.name.clone(),
                        cause,
                    });
                }
            }
        }

        info!(
            "event=manifest_load module=manifest status=ok version={} duration_ms={} resources={}",
            self.version(),
            started_at.elapsed().as_millis(),
            records.len()
        );
        Ok(Manifest {
            version: self.version(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectorySource, ResourceSource, SourceError};

    #[test]
    fn directory_source_reads_relative_locators() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("icon.svg"), b"<svg/>").expect("fixture write");

        let source = DirectorySource::new(dir.path());
        let payload = source.fetch("icon.svg").expect("fetch should succeed");
        assert_eq!(payload, b"<svg/>");
    }

    #[test]
    fn directory_source_reports_missing_locators() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = DirectorySource::new(dir.path());
        let err = source
            .fetch("absent.json")
            .expect_err("missing file must fail");
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn directory_source_rejects_escaping_locators() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = DirectorySource::new(dir.path());
        for locator in ["../outside.json", "/etc/hosts", ""] {
            let err = source
                .fetch(locator)
                .expect_err("escaping locator must be rejected");
            assert!(matches!(err, SourceError::InvalidLocator { .. }));
        }
    }

    #[test]
    fn directory_source_accepts_empty_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("empty.json"), b"").expect("fixture write");

        let source = DirectorySource::new(dir.path());
        let payload = source.fetch("empty.json").expect("empty file is loadable");
        assert!(payload.is_empty());
    }
}
