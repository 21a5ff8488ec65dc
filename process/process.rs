//! This module is responsible for managing processes spawned
//! by this tool. It contains drivers for reading the CI environment,
//! generating image metadata, and building images with tools
//! like docker or podman.

pub mod drivers;
pub mod labels;
pub mod logging;
