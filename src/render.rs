// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render the transform output as a Markdown changelog message and convert it to HTML
// role: rendering
// inputs: &TransformOutput (read-only), RenderContext (tracker base URL, release name, section toggles)
// outputs: Markdown text; HTML body
// invariants:
// - ticket bullets follow tickets.all order; owner blocks follow pending_by_owner order
// - empty sections render a placeholder line instead of disappearing
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use pulldown_cmark::{Parser, html};

use crate::model::{OwnerGroup, TransformOutput};

const RULE: &str = "---------------------";

#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
  pub base_url: &'a str,
  pub release_name: Option<&'a str>,
  pub include_pending_section: bool,
}

impl RenderContext<'_> {
  fn browse_url(&self, key: &str) -> String {
    format!("{}/browse/{}", self.base_url.trim_end_matches('/'), key)
  }
}

pub fn render_message(output: &TransformOutput<'_>, ctx: &RenderContext<'_>) -> String {
  let mut lines: Vec<String> = Vec::new();

  if let Some(name) = ctx.release_name {
    lines.push(format!("Release version: {}", name));
    lines.push(String::new());
  }

  lines.push("Jira Tickets".into());
  lines.push(RULE.into());
  lines.push(String::new());
  for tracked in &output.tickets.all {
    let t = tracked.ticket;
    lines.push(format!(
      "* [{}] - [{}]({}) {}",
      t.issue_type,
      t.key,
      ctx.browse_url(&t.key),
      t.summary
    ));
  }
  if output.tickets.all.is_empty() {
    lines.push("~ None ~".into());
  }

  if ctx.include_pending_section {
    lines.push(String::new());
    lines.push("Pending Approval".into());
    lines.push(RULE.into());
    for owner in &output.tickets.pending_by_owner {
      lines.push(String::new());
      lines.push(owner_label(owner));
      for tracked in &owner.tickets {
        lines.push(format!("* {}", ctx.browse_url(tracked.key())));
      }
    }
    if output.tickets.pending_by_owner.is_empty() {
      lines.push(String::new());
      lines.push("~ None. Yay! ~".into());
    }
  }

  lines.push(String::new());
  lines.join("\n")
}

/// Chat mention when the owner was resolved, otherwise their email.
fn owner_label(owner: &OwnerGroup<'_>) -> String {
  match owner.chat_user {
    Some(user) => format!("@{}", user.name),
    None => owner.email.to_string(),
  }
}

pub fn render_html(markdown: &str) -> String {
  let parser = Parser::new(markdown);
  let mut out = String::with_capacity(markdown.len() * 2);
  html::push_html(&mut out, parser);
  out
}
