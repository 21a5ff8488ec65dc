use std::path::PathBuf;

use buildpush_process_management::drivers::{
    opts::BuildOpts, types::BuildOutput, BuildDriver, CiDriver, Driver, DriverArgs,
    MetadataDriver,
};
use buildpush_utils::{
    constants::{
        BP_BUILD_ARGS, BP_CACHE_FROM, BP_CACHE_TO, BP_CONTEXT, BP_DRY_RUN, BP_FILE, BP_PLATFORMS,
        BP_TARGET, DIGEST_OUTPUT, IMAGE_ID_OUTPUT, LABELS_OUTPUT, METADATA_OUTPUT,
        TAGS_LIST_OUTPUT,
    },
    split_lines, split_list,
};
use clap::Args;
use log::{debug, info, trace, warn};
use miette::Result;

use crate::{
    commands::ResolveArgs,
    labels::{assemble_labels, label_args, parse_labels},
    request::BuildRequest,
    resolver::resolve,
    summary::Summary,
    target::tags_list,
};

use super::BuildPushCommand;

#[derive(Debug, Args)]
pub struct BuildCommand {
    #[clap(flatten)]
    pub resolve: ResolveArgs,

    /// The build context directory.
    #[arg(default_value = ".", env = BP_CONTEXT)]
    context: PathBuf,

    /// The Containerfile to build.
    #[arg(short, long, env = BP_FILE)]
    file: Option<PathBuf>,

    /// Build for specific platforms,
    /// i.e. `linux/amd64,linux/arm64`.
    ///
    /// NOTE: Building for a different architecture
    /// than your hardware will require installing
    /// qemu.
    #[arg(long, env = BP_PLATFORMS)]
    platforms: Vec<String>,

    /// `KEY=value` build arguments, one per line.
    #[arg(long, env = BP_BUILD_ARGS)]
    build_args: Vec<String>,

    /// The Containerfile stage to build.
    #[arg(long, env = BP_TARGET)]
    target: Option<String>,

    /// External cache sources, one per line,
    /// i.e. `type=registry,ref=ghcr.io/owner/app:cache`.
    #[arg(long, env = BP_CACHE_FROM)]
    cache_from: Vec<String>,

    /// External cache destinations, one per line.
    #[arg(long, env = BP_CACHE_TO)]
    cache_to: Vec<String>,

    /// Resolve tags and labels and write the outputs
    /// without running the build.
    #[arg(long, env = BP_DRY_RUN)]
    dry_run: bool,

    #[clap(flatten)]
    drivers: DriverArgs,
}

impl BuildPushCommand for BuildCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("BuildCommand::try_run()");

        Driver::init(self.drivers);

        self.run_with::<Driver>()
    }
}

impl BuildCommand {
    /// Resolves, builds, and reports using the drivers of `D`.
    fn run_with<D>(&self) -> Result<()>
    where
        D: CiDriver + BuildDriver + MetadataDriver,
    {
        let request = self.resolve.request()?;
        let ctx = D::context()?;
        debug!("Using CI context {ctx:?}");

        let targets = resolve(&request, &ctx)?;
        let custom_labels = parse_labels(&request.labels)?;
        let labels =
            assemble_labels::<D>(request.metadata_labels, &targets, &custom_labels, &ctx)?;

        let tags = targets.iter().map(ToString::to_string).collect::<Vec<_>>();
        let label_args = label_args(&labels);
        info!("Resolved tags:\n{}", tags.join("\n"));

        let output = if self.dry_run {
            warn!("Dry run, skipping the build");
            None
        } else {
            Some(self.build::<D>(&request, &tags, &label_args)?)
        };
        let passthrough = output.clone().unwrap_or_default();
        let tags_list = tags_list(&targets);
        let labels_list = label_args.join("\n");

        D::set_outputs(&[
            (TAGS_LIST_OUTPUT, tags_list.as_str()),
            (LABELS_OUTPUT, labels_list.as_str()),
            (IMAGE_ID_OUTPUT, passthrough.image_id.as_str()),
            (DIGEST_OUTPUT, passthrough.digest.as_str()),
            (METADATA_OUTPUT, passthrough.metadata.as_str()),
        ])?;

        D::write_summary(
            &Summary::builder()
                .targets(&targets)
                .labels(&labels)
                .ctx(&ctx)
                .maybe_output(output.as_ref())
                .push(request.push)
                .load(request.load)
                .build()
                .to_markdown(),
        )?;

        Ok(())
    }

    fn build<D: BuildDriver>(
        &self,
        request: &BuildRequest,
        tags: &[String],
        labels: &[String],
    ) -> Result<BuildOutput> {
        let platforms = split_list(&self.platforms);
        let build_args = split_lines(&self.build_args);
        let cache_from = split_lines(&self.cache_from);
        let cache_to = split_lines(&self.cache_to);

        D::build(
            &BuildOpts::builder()
                .context(self.context.as_path())
                .maybe_containerfile(self.file.as_deref())
                .platforms(&platforms)
                .build_args(&build_args)
                .maybe_target(self.target.as_deref())
                .cache_from(&cache_from)
                .cache_to(&cache_to)
                .push(request.push)
                .load(request.load)
                .tags(tags)
                .labels(labels)
                .build(),
        )
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use buildpush_process_management::drivers::{
        opts::{BuildOpts, MetadataOpts},
        types::{BuildOutput, CiContext, GeneratedMetadata, GitRef},
        BuildDriver, CiDriver, MetadataDriver,
    };
    use buildpush_utils::{
        constants::{
            DIGEST_OUTPUT, IMAGE_CREATED_LABEL, IMAGE_ID_OUTPUT, IMAGE_REVISION_LABEL,
            IMAGE_VERSION_LABEL, LABELS_OUTPUT, METADATA_OUTPUT, TAGS_LIST_OUTPUT,
        },
        string_vec,
    };
    use clap::Parser;
    use indexmap::IndexMap;
    use miette::Result;
    use pretty_assertions::assert_eq;

    use crate::commands::{BuildPushArgs, CommandArgs};

    use super::BuildCommand;

    const COMMIT_SHA: &str = "1234567890abcdef1234567890abcdef12345678";

    thread_local! {
        static OUTPUTS: RefCell<Vec<(String, String)>> = const { RefCell::new(Vec::new()) };
        static SUMMARY: RefCell<Option<String>> = const { RefCell::new(None) };
        static BUILDS: RefCell<Vec<(Vec<String>, Vec<String>, bool)>> =
            const { RefCell::new(Vec::new()) };
    }

    struct TestDriver;

    impl CiDriver for TestDriver {
        fn context() -> Result<CiContext> {
            Ok(CiContext::builder()
                .sha(COMMIT_SHA)
                .git_ref(GitRef::Branch("main".into()))
                .default_branch("main")
                .build())
        }

        fn set_outputs(outputs: &[(&str, &str)]) -> Result<()> {
            OUTPUTS.with_borrow_mut(|recorded| {
                recorded.extend(
                    outputs
                        .iter()
                        .map(|(name, value)| ((*name).to_string(), (*value).to_string())),
                );
            });
            Ok(())
        }

        fn write_summary(markdown: &str) -> Result<()> {
            SUMMARY.with_borrow_mut(|summary| *summary = Some(markdown.to_string()));
            Ok(())
        }
    }

    impl BuildDriver for TestDriver {
        fn build(opts: &BuildOpts) -> Result<BuildOutput> {
            BUILDS.with_borrow_mut(|builds| {
                builds.push((opts.tags.to_vec(), opts.labels.to_vec(), opts.push));
            });
            Ok(BuildOutput {
                image_id: "sha256:image".into(),
                digest: "sha256:digest".into(),
                metadata: r#"{"containerimage.digest":"sha256:digest"}"#.into(),
            })
        }
    }

    impl MetadataDriver for TestDriver {
        fn generate(opts: &MetadataOpts) -> Result<GeneratedMetadata> {
            let mut labels = IndexMap::from([(
                IMAGE_VERSION_LABEL.to_string(),
                opts.tags.join(","),
            )]);
            labels.extend(opts.labels.iter().cloned());

            Ok(GeneratedMetadata {
                tags: vec![],
                labels,
            })
        }
    }

    fn build_command(args: &[&str]) -> BuildCommand {
        let args = BuildPushArgs::try_parse_from(
            ["buildpush", "build"].into_iter().chain(args.iter().copied()),
        )
        .unwrap();

        let CommandArgs::Build(command) = args.command else {
            panic!("Expected build command");
        };
        command
    }

    fn recorded_outputs() -> Vec<(String, String)> {
        OUTPUTS.with_borrow(Clone::clone)
    }

    fn output<'a>(outputs: &'a [(String, String)], name: &str) -> &'a str {
        outputs
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value.as_str()))
            .unwrap()
    }

    #[test]
    fn dry_run_outputs() {
        build_command(&[
            "--tags",
            "ghcr.io/o/app:v1,docker.io/o/app:v1",
            "--labels",
            "k=v",
            "--dry-run",
        ])
        .run_with::<TestDriver>()
        .unwrap();

        let outputs = recorded_outputs();
        assert_eq!(
            outputs.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            vec![
                TAGS_LIST_OUTPUT,
                LABELS_OUTPUT,
                IMAGE_ID_OUTPUT,
                DIGEST_OUTPUT,
                METADATA_OUTPUT
            ]
        );
        assert_eq!(
            output(&outputs, TAGS_LIST_OUTPUT),
            "ghcr.io/o/app:v1\ndocker.io/o/app:v1"
        );

        let labels = output(&outputs, LABELS_OUTPUT).lines().collect::<Vec<_>>();
        assert!(labels[0].starts_with(&format!("{IMAGE_CREATED_LABEL}=")));
        assert_eq!(
            labels[1..].to_vec(),
            vec![
                format!("{IMAGE_REVISION_LABEL}={COMMIT_SHA}"),
                format!("{IMAGE_VERSION_LABEL}=v1"),
                "k=v".to_string(),
            ]
        );

        assert_eq!(output(&outputs, IMAGE_ID_OUTPUT), "");
        assert_eq!(output(&outputs, DIGEST_OUTPUT), "");
        assert_eq!(output(&outputs, METADATA_OUTPUT), "");
        assert!(BUILDS.with_borrow(Vec::is_empty));

        let summary = SUMMARY.with_borrow(Clone::clone).unwrap();
        assert!(summary.contains("ghcr.io/o/app:v1"), "{summary}");
    }

    #[test]
    fn build_outputs_pass_through() {
        build_command(&[
            "--repositories",
            "ghcr.io/o/app",
            "--base-tag",
            "v1.2.3",
            "--tag-latest",
            "--metadata-labels",
            "--labels",
            "k=v",
            "--push",
        ])
        .run_with::<TestDriver>()
        .unwrap();

        let builds = BUILDS.with_borrow(Clone::clone);
        assert_eq!(
            builds,
            vec![(
                string_vec!["ghcr.io/o/app:v1.2.3", "ghcr.io/o/app:latest"],
                string_vec![
                    format!("{IMAGE_VERSION_LABEL}=v1.2.3,latest"),
                    "k=v",
                ],
                true,
            )]
        );

        let outputs = recorded_outputs();
        assert_eq!(
            output(&outputs, TAGS_LIST_OUTPUT),
            "ghcr.io/o/app:v1.2.3\nghcr.io/o/app:latest"
        );
        assert_eq!(
            output(&outputs, LABELS_OUTPUT),
            format!("{IMAGE_VERSION_LABEL}=v1.2.3,latest\nk=v")
        );
        assert_eq!(output(&outputs, IMAGE_ID_OUTPUT), "sha256:image");
        assert_eq!(output(&outputs, DIGEST_OUTPUT), "sha256:digest");
        assert_eq!(
            output(&outputs, METADATA_OUTPUT),
            r#"{"containerimage.digest":"sha256:digest"}"#
        );
    }

    #[test]
    fn push_and_load_fail_before_build() {
        let err = build_command(&["--tags", "app:v1", "--push", "--load"])
            .run_with::<TestDriver>()
            .unwrap_err();

        assert_eq!(err.to_string(), "Push and load can't both be enabled");
        assert!(OUTPUTS.with_borrow(Vec::is_empty));
        assert!(BUILDS.with_borrow(Vec::is_empty));
    }
}
