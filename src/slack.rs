// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Best-effort resolution of ticket reporters to chat (Slack) users by email
// role: enrichment/chat-identity
// inputs: commits with tickets; a ChatDirectory (Slack Web API or in-memory)
// outputs: Ticket.chat_user populated where a match exists
// side_effects: Network calls to slack.com (SlackHttpDirectory)
// invariants:
// - one directory lookup per distinct reporter email
// - lookup failures leave chat_user as None; never an error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::model::{ChatUser, Commit};

pub trait ChatDirectory {
  fn lookup_by_email(&self, email: &str) -> Option<ChatUser>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
  ok: bool,
  #[serde(default)]
  error: Option<String>,
  #[serde(default)]
  user: Option<SlackUser>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
  id: String,
  name: String,
}

fn parse_lookup(resp: LookupResponse) -> Option<ChatUser> {
  if !resp.ok {
    debug!(error = ?resp.error, "slack lookup rejected");
    return None;
  }
  resp.user.map(|u| ChatUser { id: u.id, name: u.name })
}

pub struct SlackHttpDirectory {
  token: String,
  agent: ureq::Agent,
}

impl SlackHttpDirectory {
  pub fn new(token: String) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(Duration::from_secs(15)))
      .build()
      .into();
    Self { token, agent }
  }
}

impl ChatDirectory for SlackHttpDirectory {
  fn lookup_by_email(&self, email: &str) -> Option<ChatUser> {
    let resp = self
      .agent
      .get("https://slack.com/api/users.lookupByEmail")
      .query("email", email)
      .header("User-Agent", "release-changelog")
      .header("Authorization", &format!("Bearer {}", self.token))
      .call();

    match resp {
      Ok(mut r) => match r.body_mut().read_json::<LookupResponse>() {
        Ok(parsed) => parse_lookup(parsed),
        Err(e) => {
          debug!(%email, error = %e, "slack lookup returned unreadable body");
          None
        }
      },
      Err(e) => {
        debug!(%email, error = %e, "slack lookup failed");
        None
      }
    }
  }
}

/// Directory loaded from a JSON object of `email -> {id, name}` (offline runs).
#[derive(Debug, Default)]
pub struct StaticDirectory {
  pub users: HashMap<String, ChatUser>,
}

impl StaticDirectory {
  pub fn from_file(path: &Path) -> Result<Self> {
    let buf = std::fs::read(path).with_context(|| format!("reading chat users file {}", path.display()))?;
    let users: HashMap<String, ChatUser> =
      serde_json::from_slice(&buf).with_context(|| format!("parsing chat users file {}", path.display()))?;
    Ok(Self { users })
  }
}

impl ChatDirectory for StaticDirectory {
  fn lookup_by_email(&self, email: &str) -> Option<ChatUser> {
    self.users.get(email).cloned()
  }
}

/// Fill `chat_user` on every ticket whose reporter email resolves. Returns the number resolved.
///
/// Tickets that already carry a chat user keep it.
pub fn resolve_chat_users(commits: &mut [Commit], directory: &dyn ChatDirectory) -> usize {
  let mut resolved: HashMap<String, Option<ChatUser>> = HashMap::new();
  let mut matched = 0;

  for ticket in commits.iter_mut().flat_map(|c| c.tickets.iter_mut()) {
    if ticket.chat_user.is_some() {
      continue;
    }
    let Some(email) = ticket.reporter.email.as_deref() else { continue };
    let user = resolved
      .entry(email.to_string())
      .or_insert_with(|| directory.lookup_by_email(email))
      .clone();
    if user.is_some() {
      matched += 1;
      ticket.chat_user = user;
    }
  }

  info!(emails = resolved.len(), matched, "resolved chat identities");
  matched
}
