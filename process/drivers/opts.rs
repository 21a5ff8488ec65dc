pub use build::*;
pub use metadata::*;

mod build;
mod metadata;
