// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn annotated commits into the changelog report (ticket registry, approval split, owner groups)
// role: core/transform
// inputs: &[Commit] with tickets attached; set of approved status names
// outputs: TransformOutput borrowing the input commits and tickets
// side_effects: None (pure, synchronous, no IO)
// invariants:
// - one TrackedTicket per key; commits attached in input order
// - all tickets stable-sorted by issue type; approved/pending preserve that order
// - owner groups keep first-seen order and first-seen reporter metadata
// errors: TransformError::MissingReporterEmail when a pending ticket cannot be grouped
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::model::{Commit, CommitSets, OwnerGroup, Ticket, TicketSets, TrackedTicket, TransformOutput};

/// Workflow status names that count as approved. Matched exactly.
pub type ApprovalStatuses = BTreeSet<String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
  #[error("ticket {key} has no reporter email; it cannot be assigned to an owner")]
  MissingReporterEmail { key: String },
}

/// Deduplicates tickets by key, remembering which commits reference each one.
#[derive(Debug, Default)]
pub struct TicketRegistry<'a> {
  index: HashMap<&'a str, usize>,
  tickets: Vec<TrackedTicket<'a>>,
}

impl<'a> TicketRegistry<'a> {
  pub fn from_commits(commits: &'a [Commit]) -> Self {
    let mut registry = Self::default();
    for commit in commits {
      for ticket in &commit.tickets {
        registry.record(ticket, commit);
      }
    }
    registry
  }

  /// The first record seen for a key is canonical; later ones only add the commit.
  pub fn record(&mut self, ticket: &'a Ticket, commit: &'a Commit) {
    let slot = *self.index.entry(ticket.key.as_str()).or_insert_with(|| {
      self.tickets.push(TrackedTicket { ticket, commits: Vec::new() });
      self.tickets.len() - 1
    });
    self.tickets[slot].commits.push(commit);
  }

  /// Tickets in first-seen order.
  pub fn into_tickets(self) -> Vec<TrackedTicket<'a>> {
    self.tickets
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<'a> {
  pub all: Vec<TrackedTicket<'a>>,
  pub approved: Vec<TrackedTicket<'a>>,
  pub pending: Vec<TrackedTicket<'a>>,
}

/// Sort by issue type (stable) and split on status membership.
pub fn classify<'a>(mut tickets: Vec<TrackedTicket<'a>>, approved: &ApprovalStatuses) -> Classified<'a> {
  tickets.sort_by(|a, b| a.ticket.issue_type.cmp(&b.ticket.issue_type));

  let (approved_tickets, pending): (Vec<_>, Vec<_>) = tickets
    .iter()
    .cloned()
    .partition(|t| approved.contains(&t.ticket.status));

  Classified {
    all: tickets,
    approved: approved_tickets,
    pending,
  }
}

/// Group pending tickets by reporter email, in first-seen owner order.
///
/// The first ticket seen for an email decides the group's display name and
/// chat identity; later tickets from the same reporter are only appended.
pub fn group_by_owner<'a>(pending: &[TrackedTicket<'a>]) -> Result<Vec<OwnerGroup<'a>>, TransformError> {
  let mut index: HashMap<&'a str, usize> = HashMap::new();
  let mut groups: Vec<OwnerGroup<'a>> = Vec::new();

  for tracked in pending {
    let ticket: &'a Ticket = tracked.ticket;
    let email = match ticket.reporter.email.as_deref() {
      Some(e) if !e.is_empty() => e,
      _ => {
        return Err(TransformError::MissingReporterEmail {
          key: ticket.key.clone(),
        })
      }
    };

    match index.get(email) {
      Some(&i) => groups[i].tickets.push(tracked.clone()),
      None => {
        index.insert(email, groups.len());
        groups.push(OwnerGroup {
          email,
          name: &ticket.reporter.display_name,
          chat_user: ticket.chat_user.as_ref(),
          tickets: vec![tracked.clone()],
        });
      }
    }
  }

  Ok(groups)
}

pub fn assemble<'a>(
  commits: &'a [Commit],
  classified: Classified<'a>,
  pending_by_owner: Vec<OwnerGroup<'a>>,
) -> TransformOutput<'a> {
  let (with_tickets, without_tickets): (Vec<&Commit>, Vec<&Commit>) = commits.iter().partition(|c| c.has_tickets());

  TransformOutput {
    commits: CommitSets {
      all: commits,
      with_tickets,
      without_tickets,
    },
    tickets: TicketSets {
      all: classified.all,
      approved: classified.approved,
      pending: classified.pending,
      pending_by_owner,
    },
  }
}

/// Run the whole pipeline: registry -> classify -> group -> assemble.
pub fn transform_commit_logs<'a>(
  commits: &'a [Commit],
  approved: &ApprovalStatuses,
) -> Result<TransformOutput<'a>, TransformError> {
  let registry = TicketRegistry::from_commits(commits);
  let classified = classify(registry.into_tickets(), approved);
  let owners = group_by_owner(&classified.pending)?;
  Ok(assemble(commits, classified, owners))
}
