use std::fs;

use anyhow::Context;
use serde::Deserialize;
use shared::github::RepoInfo;

use crate::config::RunnerEnv;

/// Subset of the webhook payload the runner stores at `GITHUB_EVENT_PATH`.
#[derive(Deserialize, Debug, Default)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestRef>,
    #[serde(default)]
    repository: Option<RepositoryRef>,
}

#[derive(Deserialize, Debug)]
struct PullRequestRef {
    number: u64,
}

#[derive(Deserialize, Debug)]
struct RepositoryRef {
    name: String,
    owner: OwnerRef,
}

#[derive(Deserialize, Debug)]
struct OwnerRef {
    login: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slug {
    pub owner: String,
    pub repo: String,
}

impl std::str::FromStr for Slug {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Format: owner/repo
        let err = "Expected repository in owner/repo format";
        let (owner, repo) = s.split_once('/').ok_or(err)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(err);
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// What started this run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    PullRequest(RepoInfo),
    Other { event_name: String },
}

impl Trigger {
    pub fn load(env: &RunnerEnv) -> anyhow::Result<Self> {
        let event_name = env.github_event_name.clone().unwrap_or_default();
        let Some(path) = &env.github_event_path else {
            return Ok(Self::Other { event_name });
        };

        let payload = fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?;
        Self::from_payload(event_name, env.github_repository.as_deref(), &payload)
    }

    pub fn from_payload(
        event_name: String,
        repository: Option<&str>,
        payload: &str,
    ) -> anyhow::Result<Self> {
        let payload: EventPayload =
            serde_json::from_str(payload).context("Failed to parse event payload")?;

        let Some(pull_request) = payload.pull_request else {
            return Ok(Self::Other { event_name });
        };

        let slug = match repository.map(str::parse::<Slug>) {
            Some(Ok(slug)) => slug,
            Some(Err(e)) => anyhow::bail!("Invalid GITHUB_REPOSITORY: {e}"),
            None => {
                let repository = payload
                    .repository
                    .ok_or_else(|| anyhow::anyhow!("Event payload has no repository"))?;
                Slug {
                    owner: repository.owner.login,
                    repo: repository.name,
                }
            }
        };

        Ok(Self::PullRequest(RepoInfo::new(
            slug.owner,
            slug.repo,
            pull_request.number,
        )))
    }
}
