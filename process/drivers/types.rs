use std::borrow::Cow;

use bon::Builder;
use buildpush_utils::{
    constants::{GITHUB_ACTIONS, GITLAB_CI, SHORT_SHA_LEN},
    get_env_var,
};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::trace;

use super::{
    docker_driver::DockerDriver, podman_driver::PodmanDriver, DetermineDriver, DriverVersion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildDriverType {
    Docker,
    Podman,
}

impl DetermineDriver<BuildDriverType> for Option<BuildDriverType> {
    fn determine_driver(&mut self) -> BuildDriverType {
        *self.get_or_insert_with(|| {
            match (
                buildpush_utils::check_command_exists("docker"),
                buildpush_utils::check_command_exists("podman"),
            ) {
                (Ok(()), _) if DockerDriver::is_supported_version() && DockerDriver::has_buildx() => {
                    BuildDriverType::Docker
                }
                (_, Ok(())) if PodmanDriver::is_supported_version() => BuildDriverType::Podman,
                _ => panic!(
                    "{}{}{}",
                    "Could not determine build strategy, ",
                    format_args!(
                        "need either docker version {} with buildx ",
                        DockerDriver::VERSION_REQ,
                    ),
                    format_args!("or podman version {} to continue", PodmanDriver::VERSION_REQ),
                ),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiDriverType {
    Local,
    Gitlab,
    Github,
}

impl DetermineDriver<CiDriverType> for Option<CiDriverType> {
    fn determine_driver(&mut self) -> CiDriverType {
        trace!("CiDriverType::determine_driver()");

        *self.get_or_insert(
            match (
                get_env_var(GITLAB_CI).ok(),
                get_env_var(GITHUB_ACTIONS).ok(),
            ) {
                (Some(_gitlab_ci), None) => CiDriverType::Gitlab,
                (None, Some(_github_actions)) => CiDriverType::Github,
                _ => CiDriverType::Local,
            },
        )
    }
}

/// The ref that triggered the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    Branch(String),
    Tag(String),
    PullRequest(u64),
}

impl GitRef {
    /// The name used for ref based image tags.
    ///
    /// Pull requests are named `pr-<number>`.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Branch(name) | Self::Tag(name) => Cow::Borrowed(name),
            Self::PullRequest(number) => Cow::Owned(format!("pr-{number}")),
        }
    }
}

/// Information about the current run
/// that tags and labels are derived from.
///
/// Every field is optional as not every
/// environment can supply all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct CiContext {
    /// The full commit SHA.
    #[builder(into)]
    pub sha: Option<String>,

    pub git_ref: Option<GitRef>,

    #[builder(into)]
    pub default_branch: Option<String>,

    /// The web URL of the source repository.
    #[builder(into)]
    pub repo_url: Option<String>,

    /// The web URL of the CI run.
    #[builder(into)]
    pub run_url: Option<String>,

    /// The user that triggered the run.
    #[builder(into)]
    pub actor: Option<String>,
}

impl CiContext {
    /// Whether the run is for the repository's default branch.
    ///
    /// False if either the ref or the default branch is unknown.
    #[must_use]
    pub fn on_default_branch(&self) -> bool {
        matches!(
            (&self.git_ref, &self.default_branch),
            (Some(GitRef::Branch(branch)), Some(default_branch)) if branch == default_branch
        )
    }

    /// The first 7 characters of the commit SHA.
    ///
    /// Returns `None` if there is no SHA or it doesn't start
    /// with 7 hex characters.
    #[must_use]
    pub fn short_sha(&self) -> Option<&str> {
        self.sha
            .as_deref()
            .and_then(|sha| sha.get(..SHORT_SHA_LEN))
            .filter(|short| short.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

/// The values reported back by the build engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub image_id: String,
    pub digest: String,

    /// The raw metadata JSON of the build.
    pub metadata: String,
}

/// The output of a metadata driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedMetadata {
    /// Every `image:tag` combination.
    pub tags: Vec<String>,
    pub labels: IndexMap<String, String>,
}
