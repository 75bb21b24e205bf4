// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the changelog model (commits, tickets, owner groups, transform output) shared by every stage
// role: model/types
// outputs: Serializable input records and borrowed, read-only transform output views
// invariants: Input records are owned and validated by serde at the boundary; output views only borrow input
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Person {
  pub name: String,
  pub email: String,
  pub date: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Commit {
  pub sha: String,
  pub short_sha: String,
  pub author: Person,
  /// Author time, seconds since the epoch.
  pub timestamp: i64,
  pub subject: String,
  #[serde(default)]
  pub body: String,
  #[serde(default)]
  pub tickets: Vec<Ticket>,
}

impl Commit {
  /// Full commit message (subject, blank line, body).
  pub fn message(&self) -> String {
    if self.body.is_empty() {
      self.subject.clone()
    } else {
      format!("{}\n\n{}", self.subject, self.body)
    }
  }

  pub fn has_tickets(&self) -> bool {
    !self.tickets.is_empty()
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Reporter {
  // Jira omits the address when the reporter hides it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatUser {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Ticket {
  pub key: String,
  pub issue_type: String,
  pub status: String,
  pub summary: String,
  pub reporter: Reporter,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chat_user: Option<ChatUser>,
}

/// A canonical ticket together with every commit that references it.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TrackedTicket<'a> {
  #[serde(flatten)]
  pub ticket: &'a Ticket,
  #[serde(serialize_with = "commit_shas")]
  pub commits: Vec<&'a Commit>,
}

impl TrackedTicket<'_> {
  pub fn key(&self) -> &str {
    &self.ticket.key
  }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OwnerGroup<'a> {
  pub email: &'a str,
  pub name: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chat_user: Option<&'a ChatUser>,
  pub tickets: Vec<TrackedTicket<'a>>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CommitSets<'a> {
  pub all: &'a [Commit],
  #[serde(serialize_with = "commit_shas")]
  pub with_tickets: Vec<&'a Commit>,
  #[serde(serialize_with = "commit_shas")]
  pub without_tickets: Vec<&'a Commit>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TicketSets<'a> {
  pub all: Vec<TrackedTicket<'a>>,
  pub approved: Vec<TrackedTicket<'a>>,
  pub pending: Vec<TrackedTicket<'a>>,
  pub pending_by_owner: Vec<OwnerGroup<'a>>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TransformOutput<'a> {
  pub commits: CommitSets<'a>,
  pub tickets: TicketSets<'a>,
}

fn commit_shas<S: Serializer>(commits: &[&Commit], serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_seq(commits.iter().map(|c| c.sha.as_str()))
}
