use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::model::{Commit, Person};
use crate::util::iso_from_epoch;

const FIELD_SEP: char = '\u{0}';
const RECORD_SEP: char = '\u{1e}';

/// Revision range for `git log`; an empty `from` means "everything reachable from `to`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevRange {
  pub from: String,
  pub to: String,
}

impl RevRange {
  pub fn spec(&self) -> String {
    if self.from.is_empty() {
      self.to.clone()
    } else {
      format!("{}...{}", self.from, self.to)
    }
  }
}

/// Run `git <args>` inside `repo` and return stdout. A non-zero exit carries git's stderr.
pub fn git(repo: &str, args: &[String]) -> Result<String> {
  let output = Command::new("git")
    .current_dir(repo)
    .args(args)
    .output()
    .with_context(|| format!("running git {} in {}", args.join(" "), repo))?;

  if !output.status.success() {
    bail!(
      "git {} exited with {}: {}",
      args.join(" "),
      output.status,
      String::from_utf8_lossy(&output.stderr).trim()
    );
  }
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Abbreviated sha used in reports (first 12 hex digits).
pub fn short_sha(sha: &str) -> String {
  sha.get(..12).unwrap_or(sha).to_string()
}

/// Commits in `range`, newest first (git's default order), with no tickets attached yet.
pub fn commit_logs(repo: &str, range: &RevRange) -> Result<Vec<Commit>> {
  let fmt = "%H%x00%an%x00%ae%x00%aI%x00%at%x00%s%x00%b%x1e";
  let args: Vec<String> = vec![
    "-c".into(), "log.showSignature=false".into(),
    "log".into(),
    format!("--pretty=format:{}", fmt),
    range.spec(),
    "--".into(),
  ];
  let out = git(repo, &args)?;
  Ok(parse_log(&out))
}

pub fn parse_log(out: &str) -> Vec<Commit> {
  out
    .split(RECORD_SEP)
    .map(|rec| rec.trim_start_matches('\n'))
    .filter(|rec| !rec.trim().is_empty())
    .map(parse_record)
    .collect()
}

fn parse_record(rec: &str) -> Commit {
  let parts: Vec<&str> = rec.split(FIELD_SEP).collect();
  let get = |i: usize| -> String { parts.get(i).unwrap_or(&"").to_string() };
  let sha = get(0);
  let timestamp: i64 = get(4).parse().unwrap_or(0);
  let date = match get(3) {
    d if d.is_empty() => iso_from_epoch(timestamp),
    d => d,
  };

  Commit {
    short_sha: short_sha(&sha),
    sha,
    author: Person { name: get(1), email: get(2), date },
    timestamp,
    subject: get(5),
    body: get(6).trim_end().to_string(),
    tickets: Vec::new(),
  }
}
