use std::path::PathBuf;

use buildpush_utils::{
    constants::{
        BP_BASE_TAG, BP_INCLUDE_REF_TAGS, BP_INCLUDE_SEMVER_TAGS, BP_JSON_TARGETS, BP_LABELS,
        BP_LOAD, BP_LOG_OUT, BP_METADATA_LABELS, BP_PUSH, BP_REPOSITORIES, BP_TAGS,
        BP_TAG_LATEST, BP_TAG_SHA,
    },
    split_lines, split_list,
};
use clap::{crate_authors, Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::error;

use crate::{
    error::ResolveError,
    request::{BuildRequest, TagFlags, TargetMode},
    resolver::check_push_load,
    shadow,
};

pub mod build;
pub mod completions;
pub mod tags;

pub trait BuildPushCommand {
    /// Runs the command and returns a result
    /// of the execution
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> miette::Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("Failed:\n{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "buildpush",
    about,
    long_about = None,
    author=crate_authors!(),
    version=shadow::PKG_VERSION,
    long_version=shadow::CLAP_LONG_VERSION,
)]
pub struct BuildPushArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    /// Also write logs to a `buildpush.log`
    /// file in this directory.
    #[arg(long, env = BP_LOG_OUT)]
    pub log_out: Option<PathBuf>,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Resolve the image tags and build the image
    Build(build::BuildCommand),

    /// Resolve and validate the image tags
    /// without building anything
    Tags(tags::TagsCommand),

    /// Generate shell completions for your shell to stdout
    Completions(completions::CompletionsCommand),
}

/// The inputs that decide which tags an image gets.
///
/// Every list accepts comma or newline separated values
/// so they can be passed straight from CI inputs.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone, Args)]
pub struct ResolveArgs {
    /// Full `image:tag` references to use as is.
    #[arg(short, long, env = BP_TAGS)]
    pub tags: Vec<String>,

    /// The repositories to generate tags for.
    ///
    /// Requires `--base-tag`.
    #[arg(short, long, env = BP_REPOSITORIES)]
    pub repositories: Vec<String>,

    /// The tag every repository gets. Other
    /// generated tags are added after it.
    #[arg(long, env = BP_BASE_TAG)]
    pub base_tag: Option<String>,

    /// A JSON array of `{"image": "...", "tag": "..."}`
    /// objects to use as targets.
    #[arg(long, env = BP_JSON_TARGETS)]
    pub json_targets: Option<String>,

    /// Add a `latest` tag when building
    /// the default branch.
    #[arg(long, env = BP_TAG_LATEST)]
    pub tag_latest: bool,

    /// Add a `sha-<short sha>` tag.
    #[arg(long, env = BP_TAG_SHA)]
    pub tag_sha: bool,

    /// Add a tag for the branch name or
    /// `pr-<number>` for pull requests.
    #[arg(long, env = BP_INCLUDE_REF_TAGS)]
    pub include_ref_tags: bool,

    /// Add `MAJOR` and `MAJOR.MINOR` tags when
    /// the base tag is a semantic version.
    #[arg(long, env = BP_INCLUDE_SEMVER_TAGS)]
    pub include_semver_tags: bool,

    /// Push the image with all the tags.
    #[arg(short, long, env = BP_PUSH)]
    pub push: bool,

    /// Load the image into the local image store.
    #[arg(long, env = BP_LOAD)]
    pub load: bool,

    /// Custom `key=value` labels, one per line.
    /// These win over generated labels.
    #[arg(short, long, env = BP_LABELS)]
    pub labels: Vec<String>,

    /// Generate labels from the image names and tags
    /// instead of the fallback label set.
    #[arg(long, env = BP_METADATA_LABELS)]
    pub metadata_labels: bool,
}

impl ResolveArgs {
    /// Builds the request for these args.
    ///
    /// # Errors
    /// Will error if push and load are both set or if
    /// the inputs don't select exactly one tag mode.
    pub fn request(&self) -> Result<BuildRequest, ResolveError> {
        check_push_load(self.push, self.load)?;

        let mode = TargetMode::select(
            split_list(&self.tags),
            split_list(&self.repositories),
            self.base_tag.clone(),
            self.json_targets.clone(),
        )?;

        Ok(BuildRequest::builder()
            .mode(mode)
            .flags(
                TagFlags::builder()
                    .tag_latest_on_default_branch(self.tag_latest)
                    .tag_sha(self.tag_sha)
                    .include_ref_tags(self.include_ref_tags)
                    .include_semver_tags(self.include_semver_tags)
                    .build(),
            )
            .push(self.push)
            .load(self.load)
            .labels(split_lines(&self.labels))
            .metadata_labels(self.metadata_labels)
            .build())
    }
}
