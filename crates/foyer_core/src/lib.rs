//! Bootstrap core for the foyer profile site.
//! This crate is the single source of truth for the asset manifest and
//! disclosure contracts handed to the external rendering engine.

pub mod bootstrap;
pub mod disclosure;
pub mod logging;
pub mod manifest;
pub mod model;

pub use bootstrap::{ActivationSet, BootstrapError, BootstrapState, Renderer, SiteBootstrap};
pub use disclosure::{seal, DiscloseKey, DisclosureError, DisclosureGate};
pub use logging::{default_log_level, init_logging, logging_status};
pub use manifest::declaration::{
    parse_site_version, DeclarationError, ManifestDeclaration, SiteVersion, RESOURCE_LICENSE,
    RESOURCE_LINK, RESOURCE_PROFILE, RESOURCE_PROFILE_PROTECTED, RESOURCE_QUALIFICATION,
    RESOURCE_WORKS,
};
pub use manifest::loader::{
    DirectorySource, LoadError, LoadResult, Manifest, ResourceSource, SourceError,
};
pub use model::profile::{DisclosedProfile, ProfileField, ProfileSection, ProfileText, RubySpan};
pub use model::resource::{ResourceDescriptor, ResourceKind, ResourceName, ResourceRecord};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
