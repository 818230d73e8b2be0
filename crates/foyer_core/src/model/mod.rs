//! Domain model for declared resources and the disclosed profile.
//!
//! # Responsibility
//! - Define the canonical resource record shared by manifest and bootstrap.
//! - Define the structured profile shape produced by disclosure.
//!
//! # Invariants
//! - Every resource is identified by a stable `ResourceName`.
//! - Records are immutable once loaded; there is no mutation API.
//!
//! # See also
//! - docs/architecture/manifest.md

pub mod profile;
pub mod resource;
