// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Persist the rendered changelog (markdown, html, transform json, email payload) and CI action outputs
// role: persistence/delivery
// inputs: output directory, rendered message + html, &TransformOutput, optional EmailMessage
// outputs: Files written under the output directory; `$GITHUB_OUTPUT` entries
// side_effects: Writes to filesystem
// invariants:
// - email.json uses the SES SendEmail request shape and is written only when recipients exist
// - action outputs use a heredoc delimiter that does not occur in the value
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::TransformOutput;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EmailMessage {
  pub destination: Destination,
  pub message: MessageContent,
  pub source: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Destination {
  pub to_addresses: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MessageContent {
  pub subject: Content,
  pub body: Body,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Body {
  pub html: Content,
  pub text: Content,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Content {
  pub charset: String,
  pub data: String,
}

impl Content {
  fn utf8(data: String) -> Self {
    Self {
      charset: "UTF-8".into(),
      data,
    }
  }
}

impl EmailMessage {
  pub fn release_notes(to: &[String], from: &str, app_name: &str, html: &str, text: &str) -> Self {
    let subject = if app_name.is_empty() {
      "Release Notes".to_string()
    } else {
      format!("{} Release Notes", app_name)
    };

    Self {
      destination: Destination {
        to_addresses: to.to_vec(),
      },
      message: MessageContent {
        subject: Content::utf8(subject),
        body: Body {
          html: Content::utf8(html.to_string()),
          text: Content::utf8(text.to_string()),
        },
      },
      source: from.to_string(),
    }
  }
}

pub struct Artifacts<'r, 'a> {
  pub message: &'r str,
  pub html: &'r str,
  pub transform: &'r TransformOutput<'a>,
  pub email: Option<&'r EmailMessage>,
}

/// Write every artifact into `dir`; returns file names relative to `dir`.
pub fn write_artifacts(dir: &Path, artifacts: &Artifacts<'_, '_>) -> Result<Vec<String>> {
  let mut written = Vec::new();

  write_file(dir, "changelog.md", artifacts.message.as_bytes(), &mut written)?;
  write_file(dir, "changelog.html", artifacts.html.as_bytes(), &mut written)?;
  write_file(dir, "transform.json", &serde_json::to_vec_pretty(artifacts.transform)?, &mut written)?;
  if let Some(email) = artifacts.email {
    write_file(dir, "email.json", &serde_json::to_vec_pretty(email)?, &mut written)?;
  }

  Ok(written)
}

fn write_file(dir: &Path, name: &str, contents: &[u8], written: &mut Vec<String>) -> Result<()> {
  let path: PathBuf = dir.join(name);
  std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
  written.push(name.to_string());
  Ok(())
}

/// Append `name<<DELIM ... DELIM` to a GitHub Actions output file.
pub fn write_action_output(path: &Path, name: &str, value: &str) -> Result<()> {
  let mut delimiter = String::from("CHANGELOG_EOF");
  while value.contains(&delimiter) {
    delimiter.push('_');
  }

  let mut file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening action output file {}", path.display()))?;
  writeln!(file, "{}<<{}", name, delimiter)?;
  writeln!(file, "{}", value)?;
  writeln!(file, "{}", delimiter)?;

  Ok(())
}
