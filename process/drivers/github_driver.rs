use buildpush_utils::constants::{
    GITHUB_ACTOR, GITHUB_EVENT_NAME, GITHUB_EVENT_PATH, GITHUB_OUTPUT, GITHUB_REF_NAME,
    GITHUB_REF_TYPE, GITHUB_REPOSITORY, GITHUB_RUN_ID, GITHUB_SERVER_URL, GITHUB_SHA,
    GITHUB_STEP_SUMMARY,
};
use event::Event;
use log::{debug, info, trace, warn};
use miette::Result;

#[cfg(not(test))]
use buildpush_utils::get_env_var;

#[cfg(test)]
use buildpush_utils::test_utils::get_env_var;

use super::{
    functions::{format_github_outputs, print_outputs},
    types::{CiContext, GitRef},
    CiDriver,
};

mod event;

const PR_EVENTS: [&str; 2] = ["pull_request", "pull_request_target"];

pub struct GithubDriver;

impl GithubDriver {
    fn event() -> Option<Event> {
        get_env_var(GITHUB_EVENT_PATH)
            .and_then(Event::try_new)
            .inspect_err(|e| warn!("Unable to read GitHub event payload: {e}"))
            .ok()
    }

    fn git_ref(event: Option<&Event>) -> Option<GitRef> {
        let event_name = get_env_var(GITHUB_EVENT_NAME)
            .inspect(|v| trace!("{GITHUB_EVENT_NAME}={v}"))
            .ok();

        if event_name.is_some_and(|name| PR_EVENTS.contains(&name.as_str())) {
            if let Some(number) = event.and_then(Event::pr_number) {
                return Some(GitRef::PullRequest(number));
            }
        }

        let ref_name = get_env_var(GITHUB_REF_NAME)
            .inspect(|v| trace!("{GITHUB_REF_NAME}={v}"))
            .ok()?;

        Some(match get_env_var(GITHUB_REF_TYPE).ok().as_deref() {
            Some("tag") => GitRef::Tag(ref_name),
            _ => GitRef::Branch(ref_name),
        })
    }
}

impl CiDriver for GithubDriver {
    fn context() -> Result<CiContext> {
        let event = Self::event();
        let server_url = get_env_var(GITHUB_SERVER_URL).ok();
        let repository = get_env_var(GITHUB_REPOSITORY).ok();

        let repo_url = event
            .as_ref()
            .and_then(|e| e.repository.as_ref())
            .map(|repo| repo.html_url.clone())
            .or_else(|| match (&server_url, &repository) {
                (Some(server), Some(repo)) => Some(format!("{server}/{repo}")),
                _ => None,
            });

        let run_url = match (&server_url, &repository, get_env_var(GITHUB_RUN_ID).ok()) {
            (Some(server), Some(repo), Some(run_id)) => {
                Some(format!("{server}/{repo}/actions/runs/{run_id}"))
            }
            _ => None,
        };

        let ctx = CiContext::builder()
            .maybe_sha(get_env_var(GITHUB_SHA).ok())
            .maybe_git_ref(Self::git_ref(event.as_ref()))
            .maybe_default_branch(
                event
                    .as_ref()
                    .and_then(|e| e.repository.as_ref())
                    .map(|repo| repo.default_branch.clone()),
            )
            .maybe_repo_url(repo_url)
            .maybe_run_url(run_url)
            .maybe_actor(get_env_var(GITHUB_ACTOR).ok())
            .build();
        trace!("{ctx:#?}");

        Ok(ctx)
    }

    fn set_outputs(outputs: &[(&str, &str)]) -> Result<()> {
        match get_env_var(GITHUB_OUTPUT) {
            Ok(path) => {
                debug!("Writing outputs to {path}");
                buildpush_utils::append_to_file(path, format_github_outputs(outputs).trim_end())
            }
            Err(_) => {
                warn!("{GITHUB_OUTPUT} is not set, printing outputs instead");
                print_outputs(outputs);
                Ok(())
            }
        }
    }

    fn write_summary(markdown: &str) -> Result<()> {
        match get_env_var(GITHUB_STEP_SUMMARY) {
            Ok(path) => {
                debug!("Writing summary to {path}");
                buildpush_utils::append_to_file(path, markdown)
            }
            Err(_) => {
                info!("Summary:\n{markdown}");
                Ok(())
            }
        }
    }
}
