// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Look up ticket keys found in commit messages and attach typed tickets to commits
// role: enrichment/issue-tracker
// inputs: commits, TicketPattern, a TicketSource (Jira REST, JSON fixture, or cached wrapper), IssueTypeFilter
// outputs: commits with `tickets` populated in mention order
// side_effects: Network calls to the Jira REST API (JiraHttpSource); reads fixture files
// invariants:
// - each distinct key is fetched at most once per run
// - unknown keys (404 / absent from fixture) are skipped with a warning
// - excluded issue types never reach the transform
// errors: Transport and non-404 HTTP failures are fatal; a partial changelog is never produced
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::{Commit, Reporter, Ticket};
use crate::tickets::TicketPattern;

// --- Jira REST payloads ---

#[derive(Debug, Deserialize)]
pub struct JiraIssue {
  pub key: String,
  pub fields: JiraFields,
}

#[derive(Debug, Deserialize)]
pub struct JiraFields {
  #[serde(default)]
  pub summary: String,
  pub status: JiraNamed,
  pub issuetype: JiraNamed,
  #[serde(default)]
  pub reporter: Option<JiraUser>,
}

#[derive(Debug, Deserialize)]
pub struct JiraNamed {
  pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
  #[serde(default)]
  pub email_address: Option<String>,
  #[serde(default)]
  pub display_name: String,
}

impl From<JiraIssue> for Ticket {
  fn from(issue: JiraIssue) -> Self {
    let reporter = match issue.fields.reporter {
      Some(u) => Reporter {
        email: u.email_address,
        display_name: u.display_name,
      },
      None => Reporter {
        email: None,
        display_name: String::new(),
      },
    };

    Ticket {
      key: issue.key,
      issue_type: issue.fields.issuetype.name,
      status: issue.fields.status.name,
      summary: issue.fields.summary,
      reporter,
      chat_user: None,
    }
  }
}

// --- Trait seam for ticket lookups ---

pub trait TicketSource: Send + Sync {
  /// `Ok(None)` when the tracker has no such issue.
  fn fetch(&self, key: &str) -> Result<Option<Ticket>>;
}

pub struct JiraHttpSource {
  base: String,
  authorization: String,
  agent: ureq::Agent,
}

impl JiraHttpSource {
  pub fn new(host: &str, email: &str, token: &str) -> Self {
    let base = if host.starts_with("http://") || host.starts_with("https://") {
      host.trim_end_matches('/').to_string()
    } else {
      format!("https://{}", host.trim_end_matches('/'))
    };
    let credentials = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", email, token));
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(Duration::from_secs(30)))
      .build()
      .into();

    Self {
      base,
      authorization: format!("Basic {}", credentials),
      agent,
    }
  }

  pub fn issue_url(&self, key: &str) -> String {
    format!("{}/rest/api/2/issue/{}", self.base, key)
  }
}

impl TicketSource for JiraHttpSource {
  fn fetch(&self, key: &str) -> Result<Option<Ticket>> {
    let url = self.issue_url(key);
    debug!(%key, %url, "fetching Jira issue");

    let resp = self
      .agent
      .get(&url)
      .query("fields", "summary,status,issuetype,reporter")
      .header("Accept", "application/json")
      .header("User-Agent", "release-changelog")
      .header("Authorization", &self.authorization)
      .call();

    match resp {
      Ok(mut r) => {
        let issue = r
          .body_mut()
          .read_json::<JiraIssue>()
          .with_context(|| format!("decoding Jira issue {}", key))?;
        Ok(Some(issue.into()))
      }
      Err(ureq::Error::StatusCode(404)) => Ok(None),
      Err(e) => Err(anyhow::Error::new(e).context(format!("fetching Jira issue {}", key))),
    }
  }
}

/// Offline source backed by a JSON array of Jira issue documents.
#[derive(Debug, Default)]
pub struct FixtureTicketSource {
  tickets: HashMap<String, Ticket>,
}

impl FixtureTicketSource {
  pub fn from_issues(issues: Vec<JiraIssue>) -> Self {
    let tickets = issues
      .into_iter()
      .map(|issue| (issue.key.clone(), Ticket::from(issue)))
      .collect();
    Self { tickets }
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let buf = std::fs::read(path).with_context(|| format!("reading tickets file {}", path.display()))?;
    let issues: Vec<JiraIssue> =
      serde_json::from_slice(&buf).with_context(|| format!("parsing tickets file {}", path.display()))?;
    Ok(Self::from_issues(issues))
  }
}

impl TicketSource for FixtureTicketSource {
  fn fetch(&self, key: &str) -> Result<Option<Ticket>> {
    Ok(self.tickets.get(key).cloned())
  }
}

// Memoizes lookups per run; keys repeat across commits.
pub struct CachedTicketSource<S> {
  inner: S,
  cache: Mutex<HashMap<String, Option<Ticket>>>,
}

impl<S: TicketSource> CachedTicketSource<S> {
  pub fn new(inner: S) -> Self {
    Self {
      inner,
      cache: Mutex::new(HashMap::new()),
    }
  }
}

impl<S: TicketSource> TicketSource for CachedTicketSource<S> {
  fn fetch(&self, key: &str) -> Result<Option<Ticket>> {
    if let Some(hit) = self.cache.lock().ok().and_then(|m| m.get(key).cloned()) {
      return Ok(hit);
    }
    let fetched = self.inner.fetch(key)?;
    if let Ok(mut m) = self.cache.lock() {
      m.insert(key.to_string(), fetched.clone());
    }
    Ok(fetched)
  }
}

/// Issue types to drop (`exclude`) or, when `include` is non-empty, the only ones to keep.
#[derive(Debug, Clone, Default)]
pub struct IssueTypeFilter {
  pub exclude: Vec<String>,
  pub include: Vec<String>,
}

impl IssueTypeFilter {
  pub fn admits(&self, ticket: &Ticket) -> bool {
    if self.exclude.iter().any(|t| *t == ticket.issue_type) {
      return false;
    }
    self.include.is_empty() || self.include.iter().any(|t| *t == ticket.issue_type)
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotateStats {
  pub keys_found: usize,
  pub keys_unknown: usize,
  pub tickets_filtered: usize,
}

/// Find ticket keys in every commit message and attach the matching tickets.
pub fn annotate_commits(
  commits: &mut [Commit],
  pattern: &TicketPattern,
  source: &dyn TicketSource,
  filter: &IssueTypeFilter,
) -> Result<AnnotateStats> {
  // Phase 1: keys per commit, and the distinct set in first-mention order
  let refs: Vec<Vec<String>> = commits.iter().map(|c| pattern.keys_in(&c.message())).collect();
  let mut seen: HashSet<&str> = HashSet::new();
  let distinct: Vec<&str> = refs
    .iter()
    .flatten()
    .map(String::as_str)
    .filter(|k| seen.insert(*k))
    .collect();
  info!(commits = commits.len(), keys = distinct.len(), "looking up ticket keys");

  // Phase 2: fetch each key once
  let fetched: Vec<(&str, Option<Ticket>)> = distinct
    .par_iter()
    .map(|k| source.fetch(k).map(|t| (*k, t)))
    .collect::<Result<Vec<_>>>()?;

  let mut stats = AnnotateStats {
    keys_found: distinct.len(),
    ..AnnotateStats::default()
  };
  let mut known: HashMap<&str, Ticket> = HashMap::new();
  for (key, ticket) in fetched {
    match ticket {
      Some(t) if filter.admits(&t) => {
        known.insert(key, t);
      }
      Some(t) => {
        debug!(%key, issue_type = %t.issue_type, "issue type filtered out");
        stats.tickets_filtered += 1;
      }
      None => {
        warn!(%key, "no such ticket; ignoring reference");
        stats.keys_unknown += 1;
      }
    }
  }

  // Phase 3: attach in each commit's mention order
  for (commit, keys) in commits.iter_mut().zip(refs.iter()) {
    commit.tickets = keys.iter().filter_map(|k| known.get(k.as_str()).cloned()).collect();
  }

  Ok(stats)
}
