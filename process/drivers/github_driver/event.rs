use std::{fs, path::Path};

use miette::{IntoDiagnostic, Result};
use serde::Deserialize;

/// The parts of the GitHub event payload
/// found at `$GITHUB_EVENT_PATH` that we use.
#[derive(Debug, Deserialize, Clone)]
pub(super) struct Event {
    pub repository: Option<EventRepository>,
    pub pull_request: Option<EventPullRequest>,
    pub number: Option<u64>,
}

impl Event {
    pub fn try_new<P: AsRef<Path>>(event_path: P) -> Result<Self> {
        serde_json::from_str::<Self>(&fs::read_to_string(event_path).into_diagnostic()?)
            .into_diagnostic()
    }

    /// The pull request number for `pull_request`
    /// and `pull_request_target` events.
    pub fn pr_number(&self) -> Option<u64> {
        self.pull_request
            .as_ref()
            .map(|pr| pr.number)
            .or(self.number)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct EventRepository {
    pub default_branch: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct EventPullRequest {
    pub number: u64,
}
