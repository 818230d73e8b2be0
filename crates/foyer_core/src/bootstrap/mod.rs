//! One-pass bootstrap from declaration to renderer activation.
//!
//! # Responsibility
//! - Drive the linear flow: declare, load all resources, disclose the
//!   protected profile, activate the renderer exactly once.
//! - Keep degraded (public-only) activation an explicit caller decision.
//!
//! # Invariants
//! - The renderer never observes an undisclosed protected payload.
//! - No backward state transitions; one pass per activation.
//!
//! # See also
//! - docs/architecture/manifest.md

use crate::disclosure::{DiscloseKey, DisclosureError, DisclosureGate};
use crate::manifest::declaration::{
    DeclarationError, ManifestDeclaration, SiteVersion, RESOURCE_PROFILE,
};
use crate::manifest::loader::{LoadError, Manifest, ResourceSource};
use crate::model::profile::DisclosedProfile;
use crate::model::resource::ResourceRecord;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Bootstrap progress for one activation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// Declared but nothing resolved yet.
    Unloaded,
    /// Every declared resource is resolved.
    Loaded,
    /// The protected profile is decoded.
    Disclosed,
    /// The renderer has been handed the resource set. Terminal.
    Activated,
    /// A transition failed without a degraded path. Terminal.
    Failed,
}

impl BootstrapState {
    /// Stable string id used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Disclosed => "disclosed",
            Self::Activated => "activated",
            Self::Failed => "failed",
        }
    }
}

impl Display for BootstrapState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bootstrap failure wrapper across the pipeline stages.
#[derive(Debug)]
pub enum BootstrapError {
    Declaration(DeclarationError),
    Load(LoadError),
    Disclosure(DisclosureError),
    /// The manifest carries no protected record to disclose.
    NothingToDisclose { version: SiteVersion },
    /// An operation was invoked from a state that does not allow it.
    InvalidTransition {
        state: BootstrapState,
        operation: &'static str,
    },
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declaration(err) => write!(f, "{err}"),
            Self::Load(err) => write!(f, "{err}"),
            Self::Disclosure(err) => write!(f, "{err}"),
            Self::NothingToDisclose { version } => {
                write!(f, "manifest {version} declares no protected record")
            }
            Self::InvalidTransition { state, operation } => {
                write!(f, "cannot {operation} from bootstrap state `{state}`")
            }
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Declaration(err) => Some(err),
            Self::Load(err) => Some(err),
            Self::Disclosure(err) => Some(err),
            Self::NothingToDisclose { .. } | Self::InvalidTransition { .. } => None,
        }
    }
}

impl From<DeclarationError> for BootstrapError {
    fn from(value: DeclarationError) -> Self {
        Self::Declaration(value)
    }
}

impl From<LoadError> for BootstrapError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<DisclosureError> for BootstrapError {
    fn from(value: DisclosureError) -> Self {
        Self::Disclosure(value)
    }
}

/// Resource set handed to the renderer at activation.
///
/// Public records appear in declaration order. When a disclosed profile is
/// present it supersedes the plain `profile` record, which is then omitted
/// from the public set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSet {
    version: SiteVersion,
    public: Vec<ResourceRecord>,
    profile: Option<DisclosedProfile>,
}

impl ActivationSet {
    /// Manifest version this set was assembled from.
    pub fn version(&self) -> SiteVersion {
        self.version
    }

    /// Public-kind records, in declaration order.
    pub fn public_records(&self) -> &[ResourceRecord] {
        &self.public
    }

    /// The disclosed profile, absent in degraded activations.
    pub fn profile(&self) -> Option<&DisclosedProfile> {
        self.profile.as_ref()
    }

    /// Returns whether this is a public-only (degraded) set.
    pub fn is_degraded(&self) -> bool {
        self.profile.is_none()
    }

    /// Looks up one public record by name.
    pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
        self.public.iter().find(|record| record.name == name)
    }
}

/// External rendering engine seam.
///
/// The bootstrap invokes `activate` exactly once per pass; everything the
/// engine needs is inside the `ActivationSet`.
pub trait Renderer {
    fn activate(&mut self, set: &ActivationSet);
}

/// Drives one declaration through load, disclosure and activation.
pub struct SiteBootstrap {
    declaration: ManifestDeclaration,
    state: BootstrapState,
    manifest: Option<Manifest>,
    profile: Option<DisclosedProfile>,
    disclosure_failed: bool,
}

impl SiteBootstrap {
    /// Starts a pass over an already validated declaration.
    pub fn new(declaration: ManifestDeclaration) -> Self {
        Self {
            declaration,
            state: BootstrapState::Unloaded,
            manifest: None,
            profile: None,
            disclosure_failed: false,
        }
    }

    /// Starts a pass over the built-in declaration for `version`.
    pub fn for_version(version: SiteVersion) -> Result<Self, BootstrapError> {
        Ok(Self::new(ManifestDeclaration::for_version(version)?))
    }

    /// Current bootstrap state.
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// The loaded manifest, available from `Loaded` onward.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Resolves every declared resource through `source`.
    ///
    /// A load failure is terminal for this pass; there is no retry at this
    /// layer.
    pub fn load(&mut self, source: &dyn ResourceSource) -> Result<(), BootstrapError> {
        self.require_state(BootstrapState::Unloaded, "load")?;
        match self.declaration.load(source) {
            Ok(manifest) => {
                self.manifest = Some(manifest);
                self.transition(BootstrapState::Loaded);
                Ok(())
            }
            Err(err) => {
                self.transition(BootstrapState::Failed);
                Err(err.into())
            }
        }
    }

    /// Decodes the protected profile through the disclosure gate.
    ///
    /// On failure the manifest and its public records stay intact and the
    /// pass remains in `Loaded`; the caller decides between aborting and an
    /// explicit `activate_public_only`.
    pub fn disclose(&mut self, key: &DiscloseKey) -> Result<(), BootstrapError> {
        self.require_state(BootstrapState::Loaded, "disclose")?;
        let manifest = self
            .manifest
            .as_ref()
            .ok_or(BootstrapError::InvalidTransition {
                state: self.state,
                operation: "disclose",
            })?;
        let record = manifest
            .protected_record()
            .ok_or(BootstrapError::NothingToDisclose {
                version: manifest.version(),
            })?;

        let gate = DisclosureGate::over(record)?;
        match gate.disclose(key) {
            Ok(profile) => {
                self.profile = Some(profile);
                self.transition(BootstrapState::Disclosed);
                Ok(())
            }
            Err(err) => {
                self.disclosure_failed = true;
                warn!(
                    "event=bootstrap module=bootstrap status=degradable state={} error={}",
                    self.state, err
                );
                Err(err.into())
            }
        }
    }

    /// Hands the full resource set to the renderer. Requires a prior
    /// successful disclosure; invoked at most once per pass.
    pub fn activate(&mut self, renderer: &mut dyn Renderer) -> Result<(), BootstrapError> {
        self.require_state(BootstrapState::Disclosed, "activate")?;
        let set = self.assemble(false)?;
        renderer.activate(&set);
        self.transition(BootstrapState::Activated);
        info!(
            "event=activate module=bootstrap status=ok version={} public_records={} degraded=false",
            set.version(),
            set.public_records().len()
        );
        Ok(())
    }

    /// Explicit degraded activation after a disclosure failure.
    ///
    /// The plain profile record stays in the public set and no disclosed
    /// profile is handed over. Refused unless a disclosure was attempted
    /// and failed; the bootstrap never degrades implicitly.
    pub fn activate_public_only(
        &mut self,
        renderer: &mut dyn Renderer,
    ) -> Result<(), BootstrapError> {
        self.require_state(BootstrapState::Loaded, "activate_public_only")?;
        if !self.disclosure_failed {
            return Err(BootstrapError::InvalidTransition {
                state: self.state,
                operation: "activate_public_only without a failed disclosure",
            });
        }
        let set = self.assemble(true)?;
        renderer.activate(&set);
        self.transition(BootstrapState::Activated);
        info!(
            "event=activate module=bootstrap status=ok version={} public_records={} degraded=true",
            set.version(),
            set.public_records().len()
        );
        Ok(())
    }

    /// Convenience driver for the full pass: load, disclose, activate.
    ///
    /// Stops at the first failure; after a disclosure failure the caller
    /// may still pick `activate_public_only` on this same value.
    pub fn run(
        &mut self,
        source: &dyn ResourceSource,
        key: &DiscloseKey,
        renderer: &mut dyn Renderer,
    ) -> Result<(), BootstrapError> {
        self.load(source)?;
        self.disclose(key)?;
        self.activate(renderer)
    }

    fn assemble(&self, degraded: bool) -> Result<ActivationSet, BootstrapError> {
        let manifest = self
            .manifest
            .as_ref()
            .ok_or(BootstrapError::InvalidTransition {
                state: self.state,
                operation: "assemble",
            })?;

        let profile = if degraded {
            None
        } else {
            self.profile.clone()
        };
        let public: Vec<ResourceRecord> = manifest
            .public_records()
            // A disclosed profile supersedes the plain record.
            .filter(|record| profile.is_none() || record.name != RESOURCE_PROFILE)
            .cloned()
            .collect();

        Ok(ActivationSet {
            version: manifest.version(),
            public,
            profile,
        })
    }

    fn require_state(
        &self,
        expected: BootstrapState,
        operation: &'static str,
    ) -> Result<(), BootstrapError> {
        if self.state != expected {
            error!(
                "event=bootstrap module=bootstrap status=error state={} operation={}",
                self.state, operation
            );
            return Err(BootstrapError::InvalidTransition {
                state: self.state,
                operation,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: BootstrapState) {
        info!(
            "event=bootstrap module=bootstrap status=transition from={} to={}",
            self.state, next
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivationSet, BootstrapError, BootstrapState, Renderer, SiteBootstrap};
    use crate::disclosure::DiscloseKey;
    use crate::manifest::declaration::{ManifestDeclaration, SiteVersion};
    use crate::manifest::loader::{ResourceSource, SourceError};

    /// Source that resolves every locator to the same bytes.
    struct UniformSource(Vec<u8>);

    impl ResourceSource for UniformSource {
        fn fetch(&self, _locator: &str) -> Result<Vec<u8>, SourceError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        sets: Vec<ActivationSet>,
    }

    impl Renderer for RecordingRenderer {
        fn activate(&mut self, set: &ActivationSet) {
            self.sets.push(set.clone());
        }
    }

    #[test]
    fn starts_unloaded() {
        let bootstrap = SiteBootstrap::for_version(SiteVersion::V1).expect("v1 bootstrap");
        assert_eq!(bootstrap.state(), BootstrapState::Unloaded);
        assert!(bootstrap.manifest().is_none());
    }

    #[test]
    fn disclose_before_load_is_rejected() {
        let mut bootstrap = SiteBootstrap::for_version(SiteVersion::V1).expect("v1 bootstrap");
        let err = bootstrap
            .disclose(&DiscloseKey::from_passphrase("やまだ"))
            .expect_err("disclose before load must fail");
        assert!(matches!(err, BootstrapError::InvalidTransition { .. }));
        // Misuse does not poison the pass.
        assert_eq!(bootstrap.state(), BootstrapState::Unloaded);
    }

    #[test]
    fn public_only_activation_requires_a_failed_disclosure() {
        let mut bootstrap = SiteBootstrap::for_version(SiteVersion::V1).expect("v1 bootstrap");
        bootstrap
            .load(&UniformSource(b"[]".to_vec()))
            .expect("uniform source satisfies every locator");

        let mut renderer = RecordingRenderer::default();
        let err = bootstrap
            .activate_public_only(&mut renderer)
            .expect_err("degraded activation without failed disclosure must be refused");
        assert!(matches!(err, BootstrapError::InvalidTransition { .. }));
        assert!(renderer.sets.is_empty());
    }

    #[test]
    fn manifest_without_protected_record_cannot_disclose() {
        let declaration = ManifestDeclaration::new(SiteVersion::V1, Vec::new())
            .expect("empty declaration is valid");
        let mut bootstrap = SiteBootstrap::new(declaration);
        bootstrap
            .load(&UniformSource(Vec::new()))
            .expect("nothing to load");

        let err = bootstrap
            .disclose(&DiscloseKey::from_passphrase("やまだ"))
            .expect_err("nothing to disclose");
        assert!(matches!(err, BootstrapError::NothingToDisclose { .. }));
    }
}
