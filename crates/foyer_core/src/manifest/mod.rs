//! Manifest declaration and loading entry points.
//!
//! # Responsibility
//! - Declare the complete, typed resource set for one site version.
//! - Resolve every declared resource before the bootstrap may proceed.
//!
//! # Invariants
//! - Duplicate names are rejected at declaration time, never at load time.
//! - A load either yields every declared resource or fails as a whole;
//!   there is no partial-manifest mode.
//!
//! # See also
//! - docs/architecture/manifest.md

pub mod declaration;
pub mod loader;
