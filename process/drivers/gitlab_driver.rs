use buildpush_utils::constants::{
    CI_COMMIT_REF_NAME, CI_COMMIT_SHA, CI_COMMIT_TAG, CI_DEFAULT_BRANCH, CI_MERGE_REQUEST_IID,
    CI_PIPELINE_SOURCE, CI_PIPELINE_URL, CI_PROJECT_URL, GITLAB_USER_LOGIN,
};
use log::trace;
use miette::Result;

#[cfg(not(test))]
use buildpush_utils::get_env_var;

#[cfg(test)]
use buildpush_utils::test_utils::get_env_var;

use super::{
    types::{CiContext, GitRef},
    CiDriver,
};

const MR_EVENT: &str = "merge_request_event";

pub struct GitlabDriver;

impl GitlabDriver {
    fn git_ref() -> Option<GitRef> {
        match (
            get_env_var(CI_PIPELINE_SOURCE).inspect(|v| trace!("{CI_PIPELINE_SOURCE}={v}")),
            get_env_var(CI_MERGE_REQUEST_IID)
                .inspect(|v| trace!("{CI_MERGE_REQUEST_IID}={v}"))
                .ok()
                .and_then(|iid| iid.parse::<u64>().ok()),
            get_env_var(CI_COMMIT_TAG).inspect(|v| trace!("{CI_COMMIT_TAG}={v}")),
        ) {
            (Ok(pipeline_source), Some(mr_iid), _) if pipeline_source == MR_EVENT => {
                Some(GitRef::PullRequest(mr_iid))
            }
            (_, _, Ok(tag)) if !tag.is_empty() => Some(GitRef::Tag(tag)),
            _ => get_env_var(CI_COMMIT_REF_NAME)
                .inspect(|v| trace!("{CI_COMMIT_REF_NAME}={v}"))
                .ok()
                .map(GitRef::Branch),
        }
    }
}

impl CiDriver for GitlabDriver {
    fn context() -> Result<CiContext> {
        let ctx = CiContext::builder()
            .maybe_sha(get_env_var(CI_COMMIT_SHA).ok())
            .maybe_git_ref(Self::git_ref())
            .maybe_default_branch(get_env_var(CI_DEFAULT_BRANCH).ok())
            .maybe_repo_url(get_env_var(CI_PROJECT_URL).ok())
            .maybe_run_url(get_env_var(CI_PIPELINE_URL).ok())
            .maybe_actor(get_env_var(GITLAB_USER_LOGIN).ok())
            .build();
        trace!("{ctx:#?}");

        Ok(ctx)
    }
}

#[cfg(test)]
mod test {
    use buildpush_utils::{
        constants::{
            CI_COMMIT_REF_NAME, CI_COMMIT_SHA, CI_COMMIT_TAG, CI_DEFAULT_BRANCH,
            CI_MERGE_REQUEST_IID, CI_PIPELINE_SOURCE, CI_PIPELINE_URL, CI_PROJECT_URL,
            GITLAB_USER_LOGIN,
        },
        test_utils::set_env_var,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        drivers::{
            types::{CiContext, GitRef},
            CiDriver,
        },
        test::{BR_REF_NAME, COMMIT_SHA},
    };

    use super::GitlabDriver;

    fn setup_default_branch() {
        setup();
        set_env_var(CI_COMMIT_REF_NAME, "main");
    }

    fn setup_mr_branch() {
        setup();
        set_env_var(CI_MERGE_REQUEST_IID, "12");
        set_env_var(CI_PIPELINE_SOURCE, "merge_request_event");
        set_env_var(CI_COMMIT_REF_NAME, BR_REF_NAME);
    }

    fn setup_branch() {
        setup();
        set_env_var(CI_COMMIT_REF_NAME, BR_REF_NAME);
    }

    fn setup_tag() {
        setup();
        set_env_var(CI_COMMIT_REF_NAME, "v1.2.3");
        set_env_var(CI_COMMIT_TAG, "v1.2.3");
    }

    fn setup() {
        set_env_var(CI_PIPELINE_SOURCE, "push");
        set_env_var(CI_DEFAULT_BRANCH, "main");
        set_env_var(CI_COMMIT_SHA, COMMIT_SHA);
        set_env_var(CI_PROJECT_URL, "https://gitlab.example.com/test-project/test");
        set_env_var(
            CI_PIPELINE_URL,
            "https://gitlab.example.com/test-project/test/-/pipelines/7",
        );
        set_env_var(GITLAB_USER_LOGIN, "tester");
    }

    #[test]
    fn context_default_branch() {
        setup_default_branch();

        assert_eq!(
            GitlabDriver::context().unwrap(),
            CiContext::builder()
                .sha(COMMIT_SHA)
                .git_ref(GitRef::Branch("main".into()))
                .default_branch("main")
                .repo_url("https://gitlab.example.com/test-project/test")
                .run_url("https://gitlab.example.com/test-project/test/-/pipelines/7")
                .actor("tester")
                .build()
        );
        assert!(GitlabDriver::context().unwrap().on_default_branch());
    }

    #[rstest]
    #[case::mr_branch(setup_mr_branch, GitRef::PullRequest(12))]
    #[case::branch(setup_branch, GitRef::Branch(BR_REF_NAME.into()))]
    #[case::tag(setup_tag, GitRef::Tag("v1.2.3".into()))]
    fn context_refs(#[case] setup: fn(), #[case] expected: GitRef) {
        setup();

        let ctx = GitlabDriver::context().unwrap();

        assert_eq!(ctx.git_ref, Some(expected));
        assert!(!ctx.on_default_branch());
    }
}
