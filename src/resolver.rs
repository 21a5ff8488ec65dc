//! Turns a [`BuildRequest`] into the final list of targets.

use buildpush_process_management::drivers::types::CiContext;
use buildpush_utils::container::Tag;
use log::{debug, trace, warn};
use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{ConfigurationError, MalformedInputError, ResolveError},
    request::{BuildRequest, TagFlags, TargetMode},
    target::{dedup_targets, ResolvedTarget},
};

/// Resolves the de-duplicated, ordered targets of a request.
///
/// # Errors
/// Will error if push and load are both set, if an input is
/// malformed, or if no targets are left at the end.
pub fn resolve(
    request: &BuildRequest,
    ctx: &CiContext,
) -> Result<Vec<ResolvedTarget>, ResolveError> {
    trace!("resolve({request:#?}, {ctx:#?})");

    check_push_load(request.push, request.load)?;

    let candidates = match &request.mode {
        TargetMode::ExplicitTags(tags) => explicit_targets(tags)?,
        TargetMode::AutoGenerated {
            repositories,
            base_tag,
        } => auto_targets(repositories, base_tag, request.flags, ctx)?,
        TargetMode::JsonTargets(json) => json_targets(json)?,
    };

    let targets = dedup_targets(candidates);

    if targets.is_empty() {
        return Err(ConfigurationError::NoTargets.into());
    }

    debug!(
        "Resolved {} target(s) from {}",
        targets.len(),
        request.mode.name()
    );
    Ok(targets)
}

/// An image can't be both pushed and loaded.
///
/// # Errors
/// Will error if both are set.
pub const fn check_push_load(push: bool, load: bool) -> Result<(), ConfigurationError> {
    if push && load {
        Err(ConfigurationError::PushAndLoad)
    } else {
        Ok(())
    }
}

fn explicit_targets(tags: &[String]) -> Result<Vec<ResolvedTarget>, MalformedInputError> {
    collect_entries(TargetMode::EXPLICIT_TAGS, tags.iter(), |reference| {
        let (repository, tag) = ResolvedTarget::split_reference(reference)
            .ok_or_else(|| format!("`{reference}` is not an `image:tag` reference"))?;
        let tag = parse_tag(tag)?;

        Ok(ResolvedTarget::new(repository, tag))
    })
}

#[derive(Debug, Deserialize)]
struct JsonTarget {
    image: Option<String>,
    tag: Option<String>,
}

fn json_targets(raw: &str) -> Result<Vec<ResolvedTarget>, MalformedInputError> {
    let entries =
        serde_json::from_str::<Vec<Value>>(raw).map_err(MalformedInputError::InvalidJson)?;

    collect_entries(TargetMode::JSON_TARGETS, entries, |entry| {
        let JsonTarget { image, tag } = serde_json::from_value(entry)
            .map_err(|e| format!("is not an object with string `image` and `tag`: {e}"))?;

        let image = image.filter(|image| !image.trim().is_empty());
        let tag = tag.filter(|tag| !tag.trim().is_empty());

        let (image, tag) = match (image, tag) {
            (Some(image), Some(tag)) => (image, tag),
            (None, None) => return Err("is missing `image` and `tag`".into()),
            (None, Some(_)) => return Err("is missing `image`".into()),
            (Some(_), None) => return Err("is missing `tag`".into()),
        };
        let image = image.trim();
        check_repository(image)?;

        Ok(ResolvedTarget::new(image, parse_tag(tag.trim())?))
    })
}

fn auto_targets(
    repositories: &[String],
    base_tag: &str,
    flags: TagFlags,
    ctx: &CiContext,
) -> Result<Vec<ResolvedTarget>, ResolveError> {
    let base_tag = base_tag
        .parse::<Tag>()
        .map_err(|_| ConfigurationError::InvalidBaseTag(base_tag.into()))?;

    let repositories = collect_entries("repositories", repositories.iter(), |repository| {
        check_repository(repository).map(|()| repository.as_str())
    })?;

    let tags = generate_tags(&base_tag, flags, ctx)?;
    trace!("Generated tags {tags:?}");

    Ok(repositories
        .into_iter()
        .flat_map(|repository| {
            tags.iter()
                .map(move |tag| ResolvedTarget::new(repository, tag.clone()))
        })
        .collect())
}

/// The tags every repository gets, in order:
/// the base tag, `sha-<short sha>`, `latest`,
/// the ref tag, then `MAJOR` and `MAJOR.MINOR`.
fn generate_tags(
    base_tag: &Tag,
    flags: TagFlags,
    ctx: &CiContext,
) -> Result<Vec<Tag>, ConfigurationError> {
    let sha_tag = if flags.tag_sha {
        let short_sha = ctx
            .short_sha()
            .ok_or(ConfigurationError::MissingContext {
                flag: "tag_sha",
                what: "a commit SHA of at least 7 hex characters",
            })?;
        Tag::sanitized(&format!("sha-{short_sha}"))
    } else {
        None
    };

    let latest_tag = (flags.tag_latest_on_default_branch && ctx.on_default_branch())
        .then(Tag::default);

    let ref_tag = if flags.include_ref_tags {
        let tag = ctx
            .git_ref
            .as_ref()
            .and_then(|git_ref| Tag::sanitized(&git_ref.name()));
        if tag.is_none() {
            warn!("No git ref was found, skipping the ref tag");
        }
        tag
    } else {
        None
    };

    let semver_tags = if flags.include_semver_tags {
        semver_tags(base_tag)
    } else {
        Vec::new()
    };

    Ok([Some(base_tag.clone()), sha_tag, latest_tag, ref_tag]
        .into_iter()
        .flatten()
        .chain(semver_tags)
        .collect())
}

/// `MAJOR` and `MAJOR.MINOR` for a `[v]MAJOR.MINOR.PATCH` tag.
///
/// Pre-releases don't move the floating tags. Versions with
/// leading zeros like `v01.2.3` aren't semantic versions.
fn semver_tags(base_tag: &Tag) -> Vec<Tag> {
    let raw = base_tag.as_str();

    match Version::parse(raw.strip_prefix('v').unwrap_or(raw)) {
        Ok(version) if version.pre.is_empty() => [
            version.major.to_string(),
            format!("{}.{}", version.major, version.minor),
        ]
        .iter()
        .filter_map(|tag| Tag::sanitized(tag))
        .collect(),
        Ok(version) => {
            debug!("Skipping semver tags for pre-release {version}");
            Vec::new()
        }
        Err(e) => {
            debug!("Base tag {base_tag} is not a semantic version: {e}");
            Vec::new()
        }
    }
}

fn parse_tag(tag: &str) -> Result<Tag, String> {
    tag.parse()
        .map_err(|_| format!("has an invalid tag {tag:?}"))
}

fn check_repository(repository: &str) -> Result<(), String> {
    let name = repository.rsplit('/').next().unwrap_or(repository);

    if repository.is_empty()
        || repository.contains(char::is_whitespace)
        || repository.contains('@')
        || name.contains(':')
    {
        Err(format!("`{repository}` is not a valid image name"))
    } else {
        Ok(())
    }
}

/// Runs `parse` over every entry, collecting all
/// of the offending entries into one error.
fn collect_entries<I, T, U, F>(
    input: &'static str,
    entries: I,
    mut parse: F,
) -> Result<Vec<U>, MalformedInputError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Result<U, String>,
{
    let mut parsed = Vec::new();
    let mut problems = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        match parse(entry) {
            Ok(value) => parsed.push(value),
            Err(problem) => problems.push((index, problem)),
        }
    }

    if problems.is_empty() {
        return Ok(parsed);
    }

    Err(MalformedInputError::InvalidEntries {
        input,
        indices: problems.iter().map(|(index, _)| *index).collect(),
        details: problems
            .iter()
            .map(|(index, problem)| format!("[{index}] {problem}"))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

#[cfg(test)]
mod test {
    use buildpush_process_management::drivers::types::{CiContext, GitRef};
    use buildpush_utils::string_vec;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        error::{ConfigurationError, MalformedInputError, ResolveError},
        request::{BuildRequest, TagFlags, TargetMode},
        target::ResolvedTarget,
    };

    use super::resolve;

    const COMMIT_SHA: &str = "1234567890abcdef1234567890abcdef12345678";

    fn ctx(git_ref: Option<GitRef>) -> CiContext {
        CiContext::builder()
            .sha(COMMIT_SHA)
            .maybe_git_ref(git_ref)
            .default_branch("main")
            .build()
    }

    fn main_ctx() -> CiContext {
        ctx(Some(GitRef::Branch("main".into())))
    }

    fn auto(repositories: &[&str], base_tag: &str) -> TargetMode {
        TargetMode::AutoGenerated {
            repositories: repositories.iter().map(ToString::to_string).collect(),
            base_tag: base_tag.into(),
        }
    }

    fn resolve_strings(request: &BuildRequest, ctx: &CiContext) -> Vec<String> {
        resolve(request, ctx)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[rstest]
    #[case::single(string_vec!["x:latest"], string_vec!["x:latest"])]
    #[case::duplicates(string_vec!["x:latest", "x:latest"], string_vec!["x:latest"])]
    #[case::order_kept(
        string_vec!["b:1", "a:1", "b:1", "a:2", "a:1"],
        string_vec!["b:1", "a:1", "a:2"],
    )]
    #[case::registry_port(
        string_vec!["localhost:5000/app:dev", "ghcr.io/o/app:v1.0.0"],
        string_vec!["localhost:5000/app:dev", "ghcr.io/o/app:v1.0.0"],
    )]
    fn explicit_tags(#[case] tags: Vec<String>, #[case] expected: Vec<String>) {
        let request = BuildRequest::builder()
            .mode(TargetMode::ExplicitTags(tags))
            .build();

        assert_eq!(resolve_strings(&request, &main_ctx()), expected);
    }

    #[test]
    fn explicit_tags_aggregate_malformed() {
        let request = BuildRequest::builder()
            .mode(TargetMode::ExplicitTags(string_vec![
                "ok:latest",
                "no-tag",
                "bad:-tag",
                "also:fine",
            ]))
            .build();

        let err = resolve(&request, &main_ctx()).unwrap_err();

        assert!(
            matches!(
                &err,
                ResolveError::MalformedInput(MalformedInputError::InvalidEntries { input, indices, .. })
                    if *input == TargetMode::EXPLICIT_TAGS && *indices == vec![1, 2]
            ),
            "{err:?}"
        );
    }

    #[test]
    fn two_repositories_no_flags() {
        let request = BuildRequest::builder().mode(auto(&["a", "b"], "v1.0.0")).build();

        assert_eq!(
            resolve_strings(&request, &main_ctx()),
            string_vec!["a:v1.0.0", "b:v1.0.0"]
        );
    }

    #[rstest]
    #[case::one(&["ghcr.io/o/app"])]
    #[case::three(&["a", "b", "c"])]
    fn one_tag_per_repository_without_flags(#[case] repositories: &[&str]) {
        let request = BuildRequest::builder().mode(auto(repositories, "dev")).build();

        let targets = resolve(&request, &main_ctx()).unwrap();

        assert_eq!(targets.len(), repositories.len());
        for (target, repository) in targets.iter().zip(repositories) {
            assert_eq!(target.repository, *repository);
            assert_eq!(target.tag.as_str(), "dev");
        }
    }

    #[test]
    fn tag_sha_adds_one_tag_per_repository() {
        let request = BuildRequest::builder()
            .mode(auto(&["a", "b"], "v1.0.0"))
            .flags(TagFlags::builder().tag_sha(true).build())
            .build();

        assert_eq!(
            resolve_strings(&request, &main_ctx()),
            string_vec!["a:v1.0.0", "a:sha-1234567", "b:v1.0.0", "b:sha-1234567"]
        );
    }

    #[test]
    fn tag_sha_requires_sha() {
        let request = BuildRequest::builder()
            .mode(auto(&["a"], "v1.0.0"))
            .flags(TagFlags::builder().tag_sha(true).build())
            .build();

        let err = resolve(&request, &CiContext::default()).unwrap_err();

        assert!(
            matches!(
                err,
                ResolveError::Configuration(ConfigurationError::MissingContext { flag: "tag_sha", .. })
            ),
            "{err:?}"
        );
    }

    #[rstest]
    #[case::default_branch(Some(GitRef::Branch("main".into())), string_vec!["a:v1", "a:latest"])]
    #[case::other_branch(Some(GitRef::Branch("dev".into())), string_vec!["a:v1"])]
    #[case::pull_request(Some(GitRef::PullRequest(4)), string_vec!["a:v1"])]
    #[case::unknown_ref(None, string_vec!["a:v1"])]
    fn latest_on_default_branch(#[case] git_ref: Option<GitRef>, #[case] expected: Vec<String>) {
        let request = BuildRequest::builder()
            .mode(auto(&["a"], "v1"))
            .flags(TagFlags::builder().tag_latest_on_default_branch(true).build())
            .build();

        assert_eq!(resolve_strings(&request, &ctx(git_ref)), expected);
    }

    #[rstest]
    #[case::branch(Some(GitRef::Branch("feature/new thing".into())), string_vec!["a:v1", "a:feature-new-thing"])]
    #[case::pull_request(Some(GitRef::PullRequest(42)), string_vec!["a:v1", "a:pr-42"])]
    #[case::tag(Some(GitRef::Tag("v1.2.3".into())), string_vec!["a:v1", "a:v1.2.3"])]
    #[case::no_ref(None, string_vec!["a:v1"])]
    fn ref_tags(#[case] git_ref: Option<GitRef>, #[case] expected: Vec<String>) {
        let request = BuildRequest::builder()
            .mode(auto(&["a"], "v1"))
            .flags(TagFlags::builder().include_ref_tags(true).build())
            .build();

        assert_eq!(resolve_strings(&request, &ctx(git_ref)), expected);
    }

    #[rstest]
    #[case::prefixed("v1.2.3", string_vec!["repo:v1.2.3", "repo:1", "repo:1.2"])]
    #[case::bare("2.10.0", string_vec!["repo:2.10.0", "repo:2", "repo:2.10"])]
    #[case::latest("latest", string_vec!["repo:latest"])]
    #[case::partial("v1.2", string_vec!["repo:v1.2"])]
    #[case::pre_release("v1.2.3-rc.1", string_vec!["repo:v1.2.3-rc.1"])]
    #[case::leading_zero("v01.2.3", string_vec!["repo:v01.2.3"])]
    fn semver_tags(#[case] base_tag: &str, #[case] expected: Vec<String>) {
        let request = BuildRequest::builder()
            .mode(auto(&["repo"], base_tag))
            .flags(TagFlags::builder().include_semver_tags(true).build())
            .build();

        assert_eq!(resolve_strings(&request, &main_ctx()), expected);
    }

    #[test]
    fn all_flags_in_order() {
        let request = BuildRequest::builder()
            .mode(auto(&["a", "b"], "v1.2.3"))
            .flags(
                TagFlags::builder()
                    .tag_sha(true)
                    .tag_latest_on_default_branch(true)
                    .include_ref_tags(true)
                    .include_semver_tags(true)
                    .build(),
            )
            .build();

        assert_eq!(
            resolve_strings(&request, &main_ctx()),
            string_vec![
                "a:v1.2.3",
                "a:sha-1234567",
                "a:latest",
                "a:main",
                "a:1",
                "a:1.2",
                "b:v1.2.3",
                "b:sha-1234567",
                "b:latest",
                "b:main",
                "b:1",
                "b:1.2",
            ]
        );
    }

    #[test]
    fn generated_duplicates_are_dropped() {
        let request = BuildRequest::builder()
            .mode(auto(&["a", "a"], "latest"))
            .flags(TagFlags::builder().tag_latest_on_default_branch(true).build())
            .build();

        assert_eq!(resolve_strings(&request, &main_ctx()), string_vec!["a:latest"]);
    }

    #[rstest]
    #[case::invalid_base_tag(auto(&["a"], "-bad"))]
    #[case::spaces(auto(&["a"], "has space"))]
    fn invalid_base_tag(#[case] mode: TargetMode) {
        let request = BuildRequest::builder().mode(mode).build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::Configuration(ConfigurationError::InvalidBaseTag(_)))
        ));
    }

    #[test]
    fn repository_with_tag_is_malformed() {
        let request = BuildRequest::builder()
            .mode(auto(&["a", "b:v1"], "v2"))
            .build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::MalformedInput(MalformedInputError::InvalidEntries { input: "repositories", indices, .. }))
                if indices == vec![1]
        ));
    }

    #[rstest]
    #[case::explicit(TargetMode::ExplicitTags(string_vec!["x:latest"]))]
    #[case::auto(auto(&["a"], "v1"))]
    #[case::json(TargetMode::JsonTargets(r#"[{"image": "a", "tag": "v1"}]"#.into()))]
    #[case::empty_json(TargetMode::JsonTargets("[]".into()))]
    #[case::bad_json(TargetMode::JsonTargets("{".into()))]
    fn push_and_load_always_fails(#[case] mode: TargetMode) {
        let request = BuildRequest::builder()
            .mode(mode)
            .push(true)
            .load(true)
            .build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::Configuration(ConfigurationError::PushAndLoad))
        ));
    }

    #[test]
    fn push_or_load_alone_is_fine() {
        for (push, load) in [(true, false), (false, true)] {
            let request = BuildRequest::builder()
                .mode(TargetMode::ExplicitTags(string_vec!["x:latest"]))
                .push(push)
                .load(load)
                .build();

            assert!(resolve(&request, &main_ctx()).is_ok());
        }
    }

    #[test]
    fn json_targets() {
        let request = BuildRequest::builder()
            .mode(TargetMode::JsonTargets(
                r#"[
                    {"image": "ghcr.io/o/app", "tag": "v1"},
                    {"image": "docker.io/o/app", "tag": "v1"},
                    {"image": "ghcr.io/o/app", "tag": "v1"}
                ]"#
                .into(),
            ))
            .build();

        assert_eq!(
            resolve(&request, &main_ctx()).unwrap(),
            vec![
                ResolvedTarget::new("ghcr.io/o/app", "v1".parse().unwrap()),
                ResolvedTarget::new("docker.io/o/app", "v1".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn json_target_missing_tag() {
        let request = BuildRequest::builder()
            .mode(TargetMode::JsonTargets(r#"[{"image": "app"}]"#.into()))
            .build();

        let err = resolve(&request, &main_ctx()).unwrap_err();

        match err {
            ResolveError::MalformedInput(MalformedInputError::InvalidEntries {
                input,
                indices,
                details,
            }) => {
                assert_eq!(input, TargetMode::JSON_TARGETS);
                assert_eq!(indices, vec![0]);
                assert_eq!(details, "[0] is missing `tag`");
            }
            err => panic!("Unexpected error {err:?}"),
        }
    }

    #[test]
    fn json_targets_aggregate_every_bad_entry() {
        let request = BuildRequest::builder()
            .mode(TargetMode::JsonTargets(
                r#"[
                    {"image": "ok", "tag": "v1"},
                    {"image": "", "tag": "v1"},
                    {"tag": "v1"},
                    "app:v1",
                    {"image": "ok", "tag": ".bad"},
                    {}
                ]"#
                .into(),
            ))
            .build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::MalformedInput(MalformedInputError::InvalidEntries { indices, .. }))
                if indices == vec![1, 2, 3, 4, 5]
        ));
    }

    #[rstest]
    #[case::not_json("image: app")]
    #[case::object(r#"{"image": "app", "tag": "v1"}"#)]
    fn json_targets_must_be_an_array(#[case] json: &str) {
        let request = BuildRequest::builder()
            .mode(TargetMode::JsonTargets(json.into()))
            .build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::MalformedInput(MalformedInputError::InvalidJson(_)))
        ));
    }

    #[rstest]
    #[case::empty_json(TargetMode::JsonTargets("[]".into()))]
    #[case::empty_explicit(TargetMode::ExplicitTags(vec![]))]
    #[case::empty_repositories(TargetMode::AutoGenerated { repositories: vec![], base_tag: "v1".into() })]
    fn no_targets(#[case] mode: TargetMode) {
        let request = BuildRequest::builder().mode(mode).build();

        assert!(matches!(
            resolve(&request, &main_ctx()),
            Err(ResolveError::Configuration(ConfigurationError::NoTargets))
        ));
    }
}
