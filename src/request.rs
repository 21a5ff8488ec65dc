use bon::Builder;

use crate::error::ConfigurationError;

/// Where the targets of a build come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetMode {
    /// Literal `image:tag` references.
    ExplicitTags(Vec<String>),

    /// Tags generated for every repository from a base tag
    /// and the CI context.
    AutoGenerated {
        repositories: Vec<String>,
        base_tag: String,
    },

    /// A JSON array of `{"image", "tag"}` objects.
    JsonTargets(String),
}

impl TargetMode {
    pub const EXPLICIT_TAGS: &'static str = "explicit_tags";
    pub const AUTO_GENERATED: &'static str = "auto_generated";
    pub const JSON_TARGETS: &'static str = "json_targets";

    /// Picks the one mode the inputs were given for.
    ///
    /// A mode counts as given when any of its inputs is
    /// non-blank. Blank values are treated as unset since
    /// CI systems pass empty strings for unset inputs.
    ///
    /// # Errors
    /// Will error if no mode or more than one mode was given,
    /// or if `auto_generated` is missing one of its inputs.
    pub fn select(
        tags: Vec<String>,
        repositories: Vec<String>,
        base_tag: Option<String>,
        json_targets: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let base_tag = base_tag.filter(|tag| !tag.trim().is_empty());
        let json_targets = json_targets.filter(|json| !json.trim().is_empty());

        let explicit = !tags.is_empty();
        let auto = !repositories.is_empty() || base_tag.is_some();

        let present = [
            (Self::EXPLICIT_TAGS, explicit),
            (Self::AUTO_GENERATED, auto),
            (Self::JSON_TARGETS, json_targets.is_some()),
        ]
        .into_iter()
        .filter_map(|(mode, present)| present.then_some(mode))
        .collect::<Vec<_>>();

        if present.len() > 1 {
            return Err(ConfigurationError::MultipleModes { modes: present });
        }

        if explicit {
            return Ok(Self::ExplicitTags(tags));
        }

        if let Some(json_targets) = json_targets {
            return Ok(Self::JsonTargets(json_targets));
        }

        if !auto {
            return Err(ConfigurationError::NoMode);
        }

        match base_tag {
            _ if repositories.is_empty() => Err(ConfigurationError::MissingField {
                mode: Self::AUTO_GENERATED,
                field: "repositories",
            }),
            None => Err(ConfigurationError::MissingField {
                mode: Self::AUTO_GENERATED,
                field: "base_tag",
            }),
            Some(base_tag) => Ok(Self::AutoGenerated {
                repositories,
                base_tag: base_tag.trim().to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ExplicitTags(_) => Self::EXPLICIT_TAGS,
            Self::AutoGenerated { .. } => Self::AUTO_GENERATED,
            Self::JsonTargets(_) => Self::JSON_TARGETS,
        }
    }
}

/// Switches for the optional steps of tag generation.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Builder)]
pub struct TagFlags {
    /// Tag `latest` when building the default branch.
    #[builder(default)]
    pub tag_latest_on_default_branch: bool,

    /// Tag `sha-<short sha>`.
    #[builder(default)]
    pub tag_sha: bool,

    /// Tag the sanitized branch name or `pr-<number>`.
    #[builder(default)]
    pub include_ref_tags: bool,

    /// Tag `MAJOR` and `MAJOR.MINOR` when the base
    /// tag is a semantic version.
    #[builder(default)]
    pub include_semver_tags: bool,
}

/// Everything needed to resolve and build one set of targets.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct BuildRequest {
    pub mode: TargetMode,

    #[builder(default)]
    pub flags: TagFlags,

    #[builder(default)]
    pub push: bool,

    #[builder(default)]
    pub load: bool,

    /// Custom `key=value` labels.
    #[builder(default)]
    pub labels: Vec<String>,

    /// Generate labels with the metadata driver instead
    /// of the fallback label set.
    #[builder(default)]
    pub metadata_labels: bool,
}
