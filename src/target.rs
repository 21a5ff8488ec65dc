use std::{collections::HashSet, fmt};

use buildpush_utils::container::Tag;
use indexmap::IndexSet;
use serde::Serialize;

/// A single `repository:tag` reference to build and push.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedTarget {
    #[serde(rename = "image")]
    pub repository: String,
    pub tag: Tag,
}

impl ResolvedTarget {
    #[must_use]
    pub fn new<S: Into<String>>(repository: S, tag: Tag) -> Self {
        Self {
            repository: repository.into(),
            tag,
        }
    }

    /// Splits an `image:tag` reference into its repository and tag.
    ///
    /// The tag is whatever follows the last `:` after the last `/`,
    /// so a registry port like `localhost:5000/app` isn't taken
    /// for a tag. Digest references aren't targets.
    #[must_use]
    pub fn split_reference(reference: &str) -> Option<(&str, &str)> {
        let (repository, tag) = reference.rsplit_once(':')?;

        (!repository.is_empty()
            && !tag.contains('/')
            && !repository.contains('@')
            && !reference.contains(char::is_whitespace))
        .then_some((repository, tag))
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Drops repeated targets, keeping the first
/// occurrence of each in its original position.
#[must_use]
pub fn dedup_targets(targets: Vec<ResolvedTarget>) -> Vec<ResolvedTarget> {
    let mut seen = HashSet::with_capacity(targets.len());

    targets
        .into_iter()
        .filter(|target| seen.insert(target.clone()))
        .collect()
}

/// Renders targets as one `image:tag` per line.
#[must_use]
pub fn tags_list(targets: &[ResolvedTarget]) -> String {
    targets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The distinct repositories of the targets in order of appearance.
#[must_use]
pub fn repositories(targets: &[ResolvedTarget]) -> Vec<String> {
    targets
        .iter()
        .map(|target| target.repository.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// The distinct tags of the targets in order of appearance.
#[must_use]
pub fn tags(targets: &[ResolvedTarget]) -> Vec<String> {
    targets
        .iter()
        .map(|target| target.tag.to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
