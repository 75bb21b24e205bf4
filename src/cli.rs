use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::gitio::RevRange;
use crate::jira::IssueTypeFilter;
use crate::tickets::TicketPattern;
use crate::transform::ApprovalStatuses;
use crate::util;

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Emit {
  /// Rendered Markdown changelog
  Message,
  /// Transform output as JSON
  Json,
}

// Options mirror the CI action inputs; GitHub exposes those as INPUT_<NAME>.
#[derive(Parser, Debug)]
#[command(
    name = "release-changelog",
    version,
    about = "Build a release changelog from git history and Jira tickets",
    long_about = None
)]
pub struct Cli {
  /// Path to a Git repository (default: current dir)
  #[arg(long, default_value = ".")]
  pub repo: PathBuf,

  /// Range start (tag, branch or sha); empty means from the first commit
  #[arg(long, env = "INPUT_SOURCE_CONTROL_RANGE_FROM", default_value = "")]
  pub from: String,

  /// Range end (tag, branch or sha)
  #[arg(long, env = "INPUT_SOURCE_CONTROL_RANGE_TO", default_value = "HEAD")]
  pub to: String,

  /// Jira host, e.g. acme.atlassian.net
  #[arg(long, env = "INPUT_JIRA_HOST")]
  pub jira_host: Option<String>,

  /// Jira account email (basic auth user)
  #[arg(long, env = "INPUT_JIRA_EMAIL")]
  pub jira_email: Option<String>,

  /// Jira API token
  #[arg(long, env = "INPUT_JIRA_TOKEN", hide_env_values = true)]
  pub jira_token: Option<String>,

  /// Base URL for ticket links (default: https://<jira-host>)
  #[arg(long, env = "INPUT_JIRA_BASE_URL")]
  pub jira_base_url: Option<String>,

  /// Ticket key regex; bare (PROJ-\d+) or /literal/flags
  #[arg(long, env = "INPUT_JIRA_TICKET_ID_PATTERN")]
  pub ticket_pattern: Option<String>,

  /// Comma-separated workflow statuses that count as approved (matched exactly)
  #[arg(long, env = "INPUT_APPROVAL_STATUSES")]
  pub approval_statuses: Option<String>,

  /// Comma-separated issue types to leave out of the changelog
  #[arg(long, env = "INPUT_EXCLUDE_ISSUE_TYPES")]
  pub exclude_issue_types: Option<String>,

  /// Comma-separated issue types to keep (default: all)
  #[arg(long, env = "INPUT_INCLUDE_ISSUE_TYPES")]
  pub include_issue_types: Option<String>,

  /// Slack bot token; enables @mentions for pending-ticket owners
  #[arg(long, env = "INPUT_SLACK_TOKEN", hide_env_values = true)]
  pub slack_token: Option<String>,

  /// Resolve owners from a JSON object of email -> {id, name} instead of Slack
  #[arg(long)]
  pub chat_users_file: Option<PathBuf>,

  /// Comma-separated email recipients; produces email.json when set
  #[arg(long, env = "INPUT_EMAIL_TO")]
  pub email_to: Option<String>,

  /// Sender address for the email payload
  #[arg(long, env = "INPUT_EMAIL_FROM", default_value = "releases@localhost")]
  pub email_from: String,

  /// Application name used in the email subject
  #[arg(long, env = "INPUT_APP_NAME", default_value = "")]
  pub app_name: String,

  /// Add the "Pending Approval" section ("true" to enable)
  #[arg(
    long,
    env = "INPUT_INCLUDE_PENDING_APPROVAL_SECTION",
    num_args = 0..=1,
    default_missing_value = "true"
  )]
  pub include_pending_approval_section: Option<String>,

  /// Release version; a name is generated when unset
  #[arg(long, env = "VERSION")]
  pub release_version: Option<String>,

  /// Read already-annotated commits (JSON array) instead of git + Jira
  #[arg(long)]
  pub commits_json: Option<PathBuf>,

  /// Resolve tickets from a JSON array of Jira issues instead of the Jira API
  #[arg(long)]
  pub tickets_file: Option<PathBuf>,

  /// Output location: "-" prints to stdout; otherwise a directory for changelog artifacts
  #[arg(long, default_value = "-")]
  pub out: String,

  /// What to print when writing to stdout
  #[arg(long, value_enum, default_value_t = Emit::Message)]
  pub emit: Emit,

  /// GitHub Actions output file; receives `changelog_message`
  #[arg(long, env = "GITHUB_OUTPUT", hide = true)]
  pub action_output: Option<PathBuf>,

  /// Emit logs as JSON lines on stderr
  #[arg(long)]
  pub log_json: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

/// A credential that never shows up in `Debug` output (and so never in logs).
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<redacted>")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraCredentials {
  pub host: String,
  pub email: String,
  pub token: Secret,
}

/// Where tickets come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketInput {
  Jira(JiraCredentials),
  Fixture(PathBuf),
  /// Commits already carry their tickets; git and Jira are skipped.
  Annotated(PathBuf),
}

/// Where pending-ticket owners get their chat identity from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
  Slack(Secret),
  File(PathBuf),
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub repo: String,
  pub range: RevRange,
  pub input: TicketInput,
  pub base_url: String,
  pub ticket_pattern: TicketPattern,
  pub approval_statuses: ApprovalStatuses,
  pub issue_types: IssueTypeFilter,
  pub chat: Option<ChatInput>,
  pub email_to: Vec<String>,
  pub email_from: String,
  pub app_name: String,
  pub include_pending_section: bool,
  pub release_version: Option<String>,
  pub out: String,
  pub emit: Emit,
  pub action_output: Option<PathBuf>,
}

fn non_empty(v: Option<String>) -> Option<String> {
  v.filter(|s| !s.trim().is_empty())
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let jira_host = non_empty(cli.jira_host);

  let input = match (cli.commits_json, cli.tickets_file) {
    (Some(_), Some(_)) => bail!("Ambiguous input: choose only one of --commits-json | --tickets-file"),
    (Some(p), None) => TicketInput::Annotated(p),
    (None, Some(p)) => TicketInput::Fixture(p),
    (None, None) => match (&jira_host, non_empty(cli.jira_email), non_empty(cli.jira_token)) {
      (Some(host), Some(email), Some(token)) => TicketInput::Jira(JiraCredentials {
        host: host.clone(),
        email,
        token: Secret(token),
      }),
      _ => bail!("Provide --jira-host, --jira-email and --jira-token (or --tickets-file / --commits-json for offline runs)"),
    },
  };

  let base_url = match (non_empty(cli.jira_base_url), &jira_host) {
    (Some(url), _) => url,
    (None, Some(host)) if host.starts_with("http://") || host.starts_with("https://") => host.clone(),
    (None, Some(host)) => format!("https://{}", host),
    (None, None) => String::new(),
  };

  let ticket_pattern = match non_empty(cli.ticket_pattern) {
    Some(p) => TicketPattern::parse(&p)?,
    None => TicketPattern::default(),
  };

  let chat = match (non_empty(cli.slack_token), cli.chat_users_file) {
    (Some(_), Some(_)) => bail!("Ambiguous chat input: choose only one of --slack-token | --chat-users-file"),
    (Some(token), None) => Some(ChatInput::Slack(Secret(token))),
    (None, Some(path)) => Some(ChatInput::File(path)),
    (None, None) => None,
  };

  let include_pending_section = cli.include_pending_approval_section.as_deref() == Some("true");

  Ok(EffectiveConfig {
    repo: util::canonicalize_lossy(&cli.repo),
    range: RevRange {
      from: cli.from,
      to: cli.to,
    },
    input,
    base_url,
    ticket_pattern,
    approval_statuses: util::split_list(cli.approval_statuses.as_deref()).into_iter().collect(),
    issue_types: IssueTypeFilter {
      exclude: util::split_list(cli.exclude_issue_types.as_deref()),
      include: util::split_list(cli.include_issue_types.as_deref()),
    },
    chat,
    email_to: util::split_list(cli.email_to.as_deref()),
    email_from: cli.email_from,
    app_name: cli.app_name,
    include_pending_section,
    release_version: cli.release_version,
    out: cli.out,
    emit: cli.emit,
    action_output: cli.action_output.filter(|p| !p.as_os_str().is_empty()),
  })
}
