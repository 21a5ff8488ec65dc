use std::fs;

use buildpush_utils::cmd;
use log::{debug, info, trace, warn};
use miette::{bail, IntoDiagnostic, Result};
use semver::Version;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::logging::CommandLogging;

use super::{opts::BuildOpts, types::BuildOutput, BuildDriver, DriverVersion};

#[derive(Debug, Deserialize)]
struct PodmanVersionJsonClient {
    #[serde(alias = "Version")]
    pub version: Version,
}

#[derive(Debug, Deserialize)]
struct PodmanVersionJson {
    #[serde(alias = "Client")]
    pub client: PodmanVersionJsonClient,
}

#[derive(Debug)]
pub struct PodmanDriver;

/// Podman only understands a plain registry repository for
/// its layer cache. A buildx style `type=registry,ref=<repo>`
/// spec is reduced to the repository and other cache types
/// are unsupported.
fn cache_ref(spec: &str) -> Option<&str> {
    if !spec.contains('=') {
        return Some(spec);
    }

    let mut cache_type = None;
    let mut cache_ref = None;

    for (key, value) in spec.split(',').filter_map(|kv| kv.split_once('=')) {
        match key.trim() {
            "type" => cache_type = Some(value.trim()),
            "ref" => cache_ref = Some(value.trim()),
            _ => {}
        }
    }

    match cache_type {
        None | Some("registry") => cache_ref,
        Some(_) => None,
    }
}

impl DriverVersion for PodmanDriver {
    // First podman version to have stable
    // cache and iidfile support.
    const VERSION_REQ: &'static str = ">=4";

    fn version() -> Result<Version> {
        trace!("PodmanDriver::version()");

        let output = cmd!("podman", "version", "-f", "json")
            .output()
            .into_diagnostic()?;

        let version_json: PodmanVersionJson =
            serde_json::from_slice(&output.stdout).into_diagnostic()?;

        Ok(version_json.client.version)
    }
}

impl BuildDriver for PodmanDriver {
    fn build(opts: &BuildOpts) -> Result<BuildOutput> {
        trace!("PodmanDriver::build({opts:#?})");

        if opts.platforms.len() > 1 {
            bail!("The podman driver can only build for a single platform, use docker for multi-platform builds");
        }

        let iid_file = NamedTempFile::new().into_diagnostic()?;
        let mut command = cmd!("podman", "build", "--iidfile", iid_file.path());

        if let Some(containerfile) = opts.containerfile.as_deref() {
            cmd!(command, "--file", containerfile);
        }

        if let Some(platform) = opts.platforms.first() {
            cmd!(command, "--platform", platform);
        }

        if let Some(target) = opts.target {
            cmd!(command, "--target", target);
        }

        for build_arg in opts.build_args {
            cmd!(command, "--build-arg", build_arg);
        }

        for (flag, specs) in [("--cache-from", opts.cache_from), ("--cache-to", opts.cache_to)] {
            for spec in specs {
                match cache_ref(spec) {
                    Some(cache_ref) => cmd!(command, flag, cache_ref),
                    None => warn!("Ignoring unsupported {flag} spec for podman: {spec}"),
                }
            }
        }

        for tag in opts.tags {
            cmd!(command, "--tag", tag);
        }

        for label in opts.labels {
            cmd!(command, "--label", label);
        }

        cmd!(command, &*opts.context);

        let image = opts.tags.first().map_or("image", String::as_str);
        trace!("{command:?}");
        let status = command
            .build_status(image, "Building Image")
            .into_diagnostic()?;

        if !status.success() {
            bail!("Failed to build {image}");
        }
        info!("Successfully built {image}");

        if opts.load {
            debug!("Podman builds straight into local storage, nothing to load");
        }

        let image_id = fs::read_to_string(iid_file.path())
            .into_diagnostic()?
            .trim()
            .to_string();

        let digest = if opts.push {
            Self::push_all(opts.tags)?
        } else {
            None
        };

        let metadata = serde_json::json!({
            "imageid": image_id,
            "digest": digest,
        })
        .to_string();

        Ok(BuildOutput {
            image_id,
            digest: digest.unwrap_or_default(),
            metadata,
        })
    }
}

impl PodmanDriver {
    /// Pushes every tag, returning the digest of the first push.
    fn push_all(tags: &[String]) -> Result<Option<String>> {
        let mut digest = None;

        for tag in tags {
            let digest_file = NamedTempFile::new().into_diagnostic()?;

            trace!("podman push --digestfile {} {tag}", digest_file.path().display());
            let status = cmd!("podman", "push", "--digestfile", digest_file.path(), tag)
                .message_status(tag, format!("Pushing {tag}"))
                .into_diagnostic()?;

            if !status.success() {
                bail!("Failed to push image {tag}");
            }
            info!("Successfully pushed {tag}!");

            if digest.is_none() {
                digest = Some(
                    fs::read_to_string(digest_file.path())
                        .into_diagnostic()?
                        .trim()
                        .to_string(),
                );
            }
        }

        Ok(digest)
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::cache_ref;

    #[rstest]
    #[case::plain("ghcr.io/test/app-cache", Some("ghcr.io/test/app-cache"))]
    #[case::registry("type=registry,ref=ghcr.io/test/cache", Some("ghcr.io/test/cache"))]
    #[case::ref_only("ref=ghcr.io/test/cache,mode=max", Some("ghcr.io/test/cache"))]
    #[case::gha("type=gha", None)]
    #[case::local("type=local,src=/tmp/cache", None)]
    fn cache_refs(#[case] spec: &str, #[case] expected: Option<&str>) {
        assert_eq!(cache_ref(spec), expected);
    }
}
