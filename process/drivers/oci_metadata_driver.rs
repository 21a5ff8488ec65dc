use buildpush_utils::{
    constants::{
        IMAGE_CREATED_LABEL, IMAGE_REVISION_LABEL, IMAGE_SOURCE_LABEL, IMAGE_TITLE_LABEL,
        IMAGE_URL_LABEL, IMAGE_VERSION_LABEL,
    },
    current_timestamp,
};
use indexmap::IndexMap;
use log::trace;
use miette::Result;

use crate::labels::aggregate_labels;

use super::{opts::MetadataOpts, types::GeneratedMetadata, MetadataDriver};

/// Generates the `org.opencontainers.image.*`
/// annotation labels for an image.
pub struct OciMetadataDriver;

impl MetadataDriver for OciMetadataDriver {
    fn generate(opts: &MetadataOpts) -> Result<GeneratedMetadata> {
        trace!("OciMetadataDriver::generate({opts:#?})");

        let tags = opts
            .images
            .iter()
            .flat_map(|image| opts.tags.iter().map(move |tag| format!("{image}:{tag}")))
            .collect::<Vec<_>>();

        let ctx = opts.context;
        let labels = [
            (
                IMAGE_TITLE_LABEL,
                opts.images
                    .first()
                    .and_then(|image| image.rsplit('/').next())
                    .map(ToOwned::to_owned),
            ),
            (IMAGE_SOURCE_LABEL, ctx.repo_url.clone()),
            (IMAGE_URL_LABEL, ctx.repo_url.clone()),
            (IMAGE_VERSION_LABEL, opts.tags.first().cloned()),
            (IMAGE_CREATED_LABEL, Some(current_timestamp())),
            (IMAGE_REVISION_LABEL, ctx.sha.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect::<IndexMap<_, _>>();
        let labels = aggregate_labels(labels, opts.labels);

        Ok(GeneratedMetadata { tags, labels })
    }
}
