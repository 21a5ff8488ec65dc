use buildpush_utils::{
    cmd,
    constants::{BP_DEFAULT_BRANCH, DEFAULT_BRANCH, USER},
    get_env_var,
};
use log::{debug, trace};
use miette::Result;

use super::{
    types::{CiContext, GitRef},
    CiDriver,
};

pub struct LocalDriver;

impl LocalDriver {
    /// Runs a git command, returning its trimmed stdout
    /// if it succeeded with any output.
    fn git(args: &[&str]) -> Option<String> {
        trace!("git {}", args.join(" "));

        let mut command = cmd!("git");
        command.args(args);

        command
            .output()
            .inspect_err(|e| debug!("Failed to run git: {e}"))
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|stdout| stdout.trim().to_string())
            .filter(|stdout| !stdout.is_empty())
    }
}

/// A detached `HEAD` has no branch to tag with.
fn branch_ref(abbrev_ref: String) -> Option<GitRef> {
    (abbrev_ref != "HEAD").then_some(GitRef::Branch(abbrev_ref))
}

impl CiDriver for LocalDriver {
    fn context() -> Result<CiContext> {
        trace!("LocalDriver::context()");

        let ctx = CiContext::builder()
            .maybe_sha(Self::git(&["rev-parse", "HEAD"]))
            .maybe_git_ref(Self::git(&["rev-parse", "--abbrev-ref", "HEAD"]).and_then(branch_ref))
            .default_branch(get_env_var(BP_DEFAULT_BRANCH).unwrap_or_else(|_| DEFAULT_BRANCH.into()))
            .maybe_repo_url(Self::git(&["remote", "get-url", "origin"]))
            .maybe_actor(get_env_var(USER).ok())
            .build();
        trace!("{ctx:#?}");

        Ok(ctx)
    }
}
