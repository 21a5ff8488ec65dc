use buildpush_process_management::{
    drivers::{opts::MetadataOpts, types::CiContext, MetadataDriver},
    labels::aggregate_labels,
};
use buildpush_utils::{
    constants::{
        IMAGE_AUTHORS_LABEL, IMAGE_CREATED_LABEL, IMAGE_REVISION_LABEL, IMAGE_SOURCE_LABEL,
        IMAGE_URL_LABEL, IMAGE_VERSION_LABEL,
    },
    current_timestamp,
};
use indexmap::IndexMap;
use log::{debug, trace};
use miette::Result;

use crate::{
    error::ConfigurationError,
    target::{self, ResolvedTarget},
};

/// Parses `key=value` label strings.
///
/// Only the first `=` splits, so values may contain `=`.
///
/// # Errors
/// Will error if a label has no `=` or an empty key.
pub fn parse_labels(raw: &[String]) -> Result<Vec<(String, String)>, ConfigurationError> {
    raw.iter()
        .map(|label| match label.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(ConfigurationError::InvalidLabel(label.clone())),
        })
        .collect()
}

/// The labels applied when the metadata driver isn't used.
///
/// Labels with an unknown value are left out.
#[must_use]
pub fn fallback_labels(ctx: &CiContext, targets: &[ResolvedTarget]) -> IndexMap<String, String> {
    [
        (IMAGE_CREATED_LABEL, Some(current_timestamp())),
        (IMAGE_REVISION_LABEL, ctx.sha.clone()),
        (IMAGE_SOURCE_LABEL, ctx.repo_url.clone()),
        (IMAGE_URL_LABEL, ctx.run_url.clone()),
        (
            IMAGE_VERSION_LABEL,
            targets.first().map(|target| target.tag.to_string()),
        ),
        (IMAGE_AUTHORS_LABEL, ctx.actor.clone()),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
    .collect()
}

/// Builds the final labels for the targets.
///
/// The labels come from the metadata driver `M` when
/// `use_metadata` is set, which is handed the custom labels
/// to merge itself. Otherwise the fallback set is used.
/// Custom labels always take precedence.
///
/// # Errors
/// Will error if the metadata driver fails.
pub fn assemble_labels<M: MetadataDriver>(
    use_metadata: bool,
    targets: &[ResolvedTarget],
    custom_labels: &[(String, String)],
    ctx: &CiContext,
) -> Result<IndexMap<String, String>> {
    trace!("assemble_labels({use_metadata}, {targets:?}, {custom_labels:?})");

    let generated = if use_metadata {
        let images = target::repositories(targets);
        let tags = target::tags(targets);

        let metadata = M::generate(
            &MetadataOpts::builder()
                .images(&images)
                .tags(&tags)
                .labels(custom_labels)
                .context(ctx)
                .build(),
        )?;
        debug!("Metadata driver tags {:?}", metadata.tags);
        metadata.labels
    } else {
        fallback_labels(ctx, targets)
    };

    Ok(aggregate_labels(generated, custom_labels))
}

/// Renders labels as `key=value` lines.
#[must_use]
pub fn label_args(labels: &IndexMap<String, String>) -> Vec<String> {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect()
}
