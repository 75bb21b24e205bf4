// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one changelog run: load commits, attach tickets and chat users, transform, render, deliver
// role: processing/orchestrator
// inputs: EffectiveConfig
// outputs: Delivered (stdout text or artifact directory + file list)
// side_effects: git subprocesses; Jira/Slack HTTP calls; writes artifacts and action outputs
// invariants:
// - nothing is written or printed until the transform has succeeded
// - out == "-" without email recipients ⇒ stdout text; otherwise ⇒ artifact directory
// errors: Any stage failure aborts the run with context; no partial changelog is delivered
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{ChatInput, EffectiveConfig, Emit, TicketInput};
use crate::delivery::{Artifacts, EmailMessage, write_action_output, write_artifacts};
use crate::gitio;
use crate::jira::{CachedTicketSource, FixtureTicketSource, JiraHttpSource, TicketSource, annotate_commits};
use crate::model::Commit;
use crate::release::{configured_version, release_name};
use crate::render::{RenderContext, render_html, render_message};
use crate::slack::{SlackHttpDirectory, StaticDirectory, resolve_chat_users};
use crate::transform::transform_commit_logs;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
  Stdout(String),
  Artifacts { dir: String, files: Vec<String> },
}

impl Delivered {
  /// What the binary prints: the text itself, or a `{dir, files}` pointer.
  pub fn to_stdout(&self) -> Result<String> {
    match self {
      Delivered::Stdout(text) => Ok(text.clone()),
      Delivered::Artifacts { dir, files } => {
        let pointer = serde_json::json!({ "dir": dir, "files": files });
        Ok(format!("{}\n", serde_json::to_string_pretty(&pointer)?))
      }
    }
  }
}

pub fn read_annotated_commits(path: &Path) -> Result<Vec<Commit>> {
  let buf = std::fs::read(path).with_context(|| format!("reading commits file {}", path.display()))?;
  serde_json::from_slice(&buf).with_context(|| format!("parsing commits file {}", path.display()))
}

fn fetch_and_annotate(cfg: &EffectiveConfig, source: &dyn TicketSource) -> Result<Vec<Commit>> {
  info!(repo = %cfg.repo, range = %cfg.range.spec(), "reading commit logs");
  let mut commits = gitio::commit_logs(&cfg.repo, &cfg.range)?;
  info!(count = commits.len(), pattern = cfg.ticket_pattern.as_str(), "found commit logs");

  let stats = annotate_commits(&mut commits, &cfg.ticket_pattern, source, &cfg.issue_types)?;
  info!(
    keys = stats.keys_found,
    unknown = stats.keys_unknown,
    filtered = stats.tickets_filtered,
    "attached tickets"
  );
  Ok(commits)
}

pub fn load_commits(cfg: &EffectiveConfig) -> Result<Vec<Commit>> {
  match &cfg.input {
    TicketInput::Annotated(path) => read_annotated_commits(path),
    TicketInput::Fixture(path) => {
      let source = FixtureTicketSource::from_file(path)?;
      fetch_and_annotate(cfg, &source)
    }
    TicketInput::Jira(creds) => {
      let source = CachedTicketSource::new(JiraHttpSource::new(&creds.host, &creds.email, creds.token.expose()));
      fetch_and_annotate(cfg, &source)
    }
  }
}

pub fn generate(cfg: &EffectiveConfig) -> Result<Delivered> {
  // Phase 1: commits with tickets (and chat identities when a directory is configured)
  let mut commits = load_commits(cfg)?;
  match &cfg.chat {
    Some(ChatInput::Slack(token)) => {
      resolve_chat_users(&mut commits, &SlackHttpDirectory::new(token.expose().to_string()));
    }
    Some(ChatInput::File(path)) => {
      resolve_chat_users(&mut commits, &StaticDirectory::from_file(path)?);
    }
    None => {}
  }

  // Only an explicit version is printed; a generated name is just logged.
  let configured = configured_version(cfg.release_version.as_deref());
  let release = release_name(configured);
  info!(%release, configured = configured.is_some(), "release version");

  // Phase 2: transform
  let output = transform_commit_logs(&commits, &cfg.approval_statuses).context("generating changelog")?;
  info!(
    commits = output.commits.all.len(),
    tickets = output.tickets.all.len(),
    approved = output.tickets.approved.len(),
    pending = output.tickets.pending.len(),
    owners = output.tickets.pending_by_owner.len(),
    "changelog assembled"
  );

  // Phase 3: render
  let ctx = RenderContext {
    base_url: &cfg.base_url,
    release_name: configured,
    include_pending_section: cfg.include_pending_section,
  };
  let message = render_message(&output, &ctx);
  let html = render_html(&message);

  // Phase 4: deliver
  if let Some(path) = &cfg.action_output {
    write_action_output(path, "changelog_message", &message)?;
  }

  let email = if cfg.email_to.is_empty() {
    None
  } else {
    Some(EmailMessage::release_notes(&cfg.email_to, &cfg.email_from, &cfg.app_name, &html, &message))
  };

  if cfg.out == "-" && email.is_none() {
    let text = match cfg.emit {
      Emit::Message => message,
      Emit::Json => format!("{}\n", serde_json::to_string_pretty(&output)?),
    };
    return Ok(Delivered::Stdout(text));
  }

  let dir = util::prepare_out_dir(&cfg.out, None)?;
  let files = write_artifacts(
    Path::new(&dir),
    &Artifacts {
      message: &message,
      html: &html,
      transform: &output,
      email: email.as_ref(),
    },
  )?;
  info!(%dir, files = files.len(), "wrote changelog artifacts");

  Ok(Delivered::Artifacts { dir, files })
}
