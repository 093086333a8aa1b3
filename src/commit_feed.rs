//! Build-provenance lookup for the footer.
//!
//! Fetches the single most recent commit of the public repository for
//! display. Best effort only: any failure (transport error, non-success
//! status, empty or malformed payload) logs a warning and yields `None`,
//! which renders as a "no information" state. No retry, no caching, no
//! authentication.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Commit feed fetcher configuration.
#[derive(Debug, Clone)]
pub struct CommitFeedConfig {
    /// User agent string; the GitHub API rejects requests without one.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CommitFeedConfig {
    fn default() -> Self {
        Self {
            user_agent: "lunchpoll/0.1 (commit feed)".to_string(),
            timeout_secs: 10,
        }
    }
}

/// The latest commit, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Full commit message.
    pub message: String,
    /// Author date.
    pub date: DateTime<Utc>,
    /// Link to the commit on the hosting site.
    pub url: String,
}

impl CommitInfo {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: DateTime<Utc>,
}

impl From<CommitEntry> for CommitInfo {
    fn from(entry: CommitEntry) -> Self {
        Self {
            message: entry.commit.message,
            date: entry.commit.author.date,
            url: entry.html_url,
        }
    }
}

/// Fetch the repository's most recent commit.
pub async fn fetch_latest_commit(
    owner: &str,
    repo: &str,
    config: &CommitFeedConfig,
) -> Option<CommitInfo> {
    let url = format!("https://api.github.com/repos/{owner}/{repo}/commits?per_page=1");

    let client = match Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!("Failed to build commit feed client: {}", err);
            return None;
        }
    };

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!("Commit feed request failed: {}", err);
            return None;
        }
    };

    if !response.status().is_success() {
        warn!(status = %response.status(), "Commit feed request rejected");
        return None;
    }

    let commits: Vec<CommitEntry> = match response.json().await {
        Ok(commits) => commits,
        Err(err) => {
            warn!("Failed to parse commit feed payload: {}", err);
            return None;
        }
    };

    let latest = commits.into_iter().next()?;
    debug!(sha = %latest.sha, "Fetched latest commit");
    Some(latest.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_github_commits_payload() {
        let payload = r#"[
            {
                "sha": "7b1e3c9",
                "commit": {
                    "message": "Fix deadline check\n\nCompare against the stored instant.",
                    "author": {
                        "name": "dev",
                        "date": "2024-05-04T12:30:00Z"
                    }
                },
                "html_url": "https://github.com/example/lunchpoll/commit/7b1e3c9"
            }
        ]"#;

        let commits: Vec<CommitEntry> = serde_json::from_str(payload).unwrap();
        let info: CommitInfo = commits.into_iter().next().unwrap().into();

        assert_eq!(info.subject(), "Fix deadline check");
        assert_eq!(info.url, "https://github.com/example/lunchpoll/commit/7b1e3c9");
        assert_eq!(info.date.to_rfc3339(), "2024-05-04T12:30:00+00:00");
    }

    #[test]
    fn empty_payload_yields_no_commit() {
        let commits: Vec<CommitEntry> = serde_json::from_str("[]").unwrap();
        assert!(commits.is_empty());
    }
}
