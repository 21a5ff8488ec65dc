use miette::{IntoDiagnostic, Result};
use serde::Deserialize;

/// The keys of the `--metadata-file` written by
/// `docker buildx build` that we care about.
#[derive(Deserialize, Debug, Clone)]
struct BuildxMetadata {
    #[serde(rename = "containerimage.digest")]
    digest: Option<String>,
}

/// Pulls the image digest out of buildx metadata.
///
/// The metadata itself is returned untouched so it can be
/// passed along. Buildx leaves the file empty when there
/// is no image result, which is treated as `{}`.
pub(super) fn parse(raw: &str) -> Result<(Option<String>, String)> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Ok((None, String::from("{}")));
    }

    let metadata: BuildxMetadata = serde_json::from_str(raw).into_diagnostic()?;

    Ok((metadata.digest, raw.to_string()))
}
