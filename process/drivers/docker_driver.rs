use std::fs;

use buildpush_utils::cmd;
use log::{info, trace, warn};
use miette::{bail, IntoDiagnostic, Result};
use semver::Version;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::logging::CommandLogging;

use super::{opts::BuildOpts, types::BuildOutput, BuildDriver, DriverVersion};

mod metadata;

#[derive(Debug, Deserialize)]
struct DockerVersionJsonClient {
    #[serde(alias = "Version")]
    pub version: Version,
}

#[derive(Debug, Deserialize)]
struct DockerVersionJson {
    #[serde(alias = "Client")]
    pub client: DockerVersionJsonClient,
}

#[derive(Debug)]
pub struct DockerDriver;

impl DockerDriver {
    /// Checks that the buildx plugin is installed.
    pub fn has_buildx() -> bool {
        trace!("DockerDriver::has_buildx()");

        cmd!("docker", "buildx", "version")
            .output()
            .is_ok_and(|output| output.status.success())
    }
}

impl DriverVersion for DockerDriver {
    // First docker verison to use buildkit
    // https://docs.docker.com/build/buildkit/
    const VERSION_REQ: &'static str = ">=23";

    fn version() -> Result<Version> {
        trace!("DockerDriver::version()");

        let output = cmd!("docker", "version", "-f", "json")
            .output()
            .into_diagnostic()?;

        let version_json: DockerVersionJson =
            serde_json::from_slice(&output.stdout).into_diagnostic()?;

        Ok(version_json.client.version)
    }
}

impl BuildDriver for DockerDriver {
    fn build(opts: &BuildOpts) -> Result<BuildOutput> {
        trace!("DockerDriver::build({opts:#?})");

        if opts.platforms.len() > 1 && !opts.push && !opts.load {
            warn!("Building for multiple platforms without push or load, the result will only remain in the build cache");
        }

        let iid_file = NamedTempFile::new().into_diagnostic()?;
        let metadata_file = NamedTempFile::new().into_diagnostic()?;

        let mut command = cmd!(
            "docker",
            "buildx",
            "build",
            "--iidfile",
            iid_file.path(),
            "--metadata-file",
            metadata_file.path(),
        );

        if let Some(containerfile) = opts.containerfile.as_deref() {
            cmd!(command, "--file", containerfile);
        }

        if !opts.platforms.is_empty() {
            cmd!(command, "--platform", opts.platforms.join(","));
        }

        if let Some(target) = opts.target {
            cmd!(command, "--target", target);
        }

        for build_arg in opts.build_args {
            cmd!(command, "--build-arg", build_arg);
        }

        for cache_from in opts.cache_from {
            cmd!(command, "--cache-from", cache_from);
        }

        for cache_to in opts.cache_to {
            cmd!(command, "--cache-to", cache_to);
        }

        for tag in opts.tags {
            cmd!(command, "--tag", tag);
        }

        for label in opts.labels {
            cmd!(command, "--label", label);
        }

        if opts.push {
            cmd!(command, "--push");
        }

        if opts.load {
            cmd!(command, "--load");
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

        let image_id = fs::read_to_string(iid_file.path())
            .into_diagnostic()?
            .trim()
            .to_string();
        let (digest, metadata) =
            metadata::parse(&fs::read_to_string(metadata_file.path()).into_diagnostic()?)?;

        Ok(BuildOutput {
            image_id,
            digest: digest.unwrap_or_default(),
            metadata,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use semver::Version;

    use super::DockerVersionJson;

    #[test]
    fn reads_client_version() {
        let json: DockerVersionJson = serde_json::from_str(
            r#"{"Client":{"Version":"27.3.1","ApiVersion":"1.47"},"Server":null}"#,
        )
        .unwrap();

        assert_eq!(json.client.version, Version::new(27, 3, 1));
    }
}
