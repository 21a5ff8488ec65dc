use std::str::FromStr;

use lazy_regex::regex_is_match;
use miette::miette;
use serde::{Deserialize, Serialize};

use crate::constants::LATEST_TAG;

/// The max length of a tag allowed by the OCI distribution spec.
const MAX_TAG_LEN: usize = 128;

/// A validated image tag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Turns an arbitrary git ref name into a tag.
    ///
    /// Every character outside of `[a-zA-Z0-9._-]` is replaced
    /// with `-`. A tag can't start with `.` or `-` so a leading
    /// one of those is replaced with `_`, and the result is cut
    /// down to the max tag length.
    ///
    /// Returns `None` if `raw` is empty.
    #[must_use]
    pub fn sanitized(raw: &str) -> Option<Self> {
        let mut tag = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .take(MAX_TAG_LEN)
            .collect::<String>();

        if tag.starts_with(['.', '-']) {
            tag.replace_range(..1, "_");
        }

        (!tag.is_empty()).then_some(Self(tag))
    }
}

impl FromStr for Tag {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        regex_is_match!(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$", s)
            .then(|| Self(s.into()))
            .ok_or_else(|| miette!("Invalid tag: {s}"))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Self::from_str(&String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self(String::from(LATEST_TAG))
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.0
    }
}

impl From<&Tag> for String {
    fn from(value: &Tag) -> Self {
        value.0.clone()
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::Tag;

    #[rstest]
    #[case("latest")]
    #[case("v1.2.3")]
    #[case("sha-1234567")]
    #[case("_private")]
    #[case("1.0")]
    fn valid_tags(#[case] tag: &str) {
        assert_eq!(tag.parse::<Tag>().unwrap().as_str(), tag);
    }

    #[rstest]
    #[case("")]
    #[case("-leading-dash")]
    #[case(".leading-dot")]
    #[case("has space")]
    #[case("feature/branch")]
    #[case("ünïcode")]
    fn invalid_tags(#[case] tag: &str) {
        assert!(tag.parse::<Tag>().is_err());
    }

    #[test]
    fn too_long_tag() {
        assert!("a".repeat(128).parse::<Tag>().is_ok());
        assert!("a".repeat(129).parse::<Tag>().is_err());
    }

    #[rstest]
    #[case("main", "main")]
    #[case("feature/new-thing", "feature-new-thing")]
    #[case("pr-12", "pr-12")]
    #[case("user@fix#1", "user-fix-1")]
    #[case("release_1.x", "release_1.x")]
    #[case("-weird", "_weird")]
    fn sanitize_refs(#[case] raw: &str, #[case] expected: &str) {
        let tag = Tag::sanitized(raw).unwrap();

        assert_eq!(tag.as_str(), expected);
        assert!(tag.as_str().parse::<Tag>().is_ok());
    }

    #[test]
    fn sanitize_empty() {
        assert!(Tag::sanitized("").is_none());
    }

    #[test]
    fn sanitize_truncates() {
        assert_eq!(Tag::sanitized(&"b".repeat(300)).unwrap().as_str().len(), 128);
    }

    #[test]
    fn default_is_latest() {
        assert_eq!(Tag::default().as_str(), "latest");
    }
}
