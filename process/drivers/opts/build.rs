use std::{borrow::Cow, path::Path};

use bon::Builder;

/// Options for building
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Builder)]
pub struct BuildOpts<'scope> {
    /// The build context directory.
    #[builder(into)]
    pub context: Cow<'scope, Path>,

    /// The Containerfile to build. The build engine
    /// picks its default when unset.
    #[builder(into)]
    pub containerfile: Option<Cow<'scope, Path>>,

    /// The platforms to build for, i.e. `linux/amd64`.
    #[builder(default)]
    pub platforms: &'scope [String],

    /// `KEY=value` build arguments.
    #[builder(default)]
    pub build_args: &'scope [String],

    /// The stage of the Containerfile to build.
    pub target: Option<&'scope str>,

    #[builder(default)]
    pub cache_from: &'scope [String],

    #[builder(default)]
    pub cache_to: &'scope [String],

    /// Enable pushing the image.
    #[builder(default)]
    pub push: bool,

    /// Load the image into the local image store.
    #[builder(default)]
    pub load: bool,

    /// The full `image:tag` references for the image.
    #[builder(default)]
    pub tags: &'scope [String],

    /// `key=value` labels to apply.
    #[builder(default)]
    pub labels: &'scope [String],
}
