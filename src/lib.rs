//! The library for the buildpush CLI.
//!
//! Resolves the final set of `image:tag` references for a CI
//! build from one of several input modes, validates the build
//! configuration, and hands the build over to a container engine.

shadow_rs::shadow!(shadow);

pub mod commands;
pub mod error;
pub mod labels;
pub mod request;
pub mod resolver;
pub mod summary;
pub mod target;
