use bon::Builder;

use crate::drivers::types::CiContext;

/// Options for generating image metadata.
#[derive(Debug, Clone, Copy, Builder)]
pub struct MetadataOpts<'scope> {
    /// The image names without tags.
    pub images: &'scope [String],

    pub tags: &'scope [String],

    /// Custom `key=value` labels, these
    /// win over generated ones.
    #[builder(default)]
    pub labels: &'scope [(String, String)],

    pub context: &'scope CiContext,
}
