use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub const DEFAULT_TICKET_PATTERN: &str = r"[A-Z][A-Z0-9]+-\d+";

static RE_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(.+)/([a-z]*)$").expect("literal pattern regex"));

/// Compiled ticket-key matcher.
///
/// Accepts either a bare regex (`PROJ-\d+`) or a JavaScript-style literal
/// (`/proj-\d+/i`), which is how CI inputs usually spell it.
#[derive(Debug, Clone)]
pub struct TicketPattern {
  re: Regex,
}

impl TicketPattern {
  pub fn parse(raw: &str) -> Result<Self> {
    let raw = raw.trim();
    if raw.is_empty() {
      bail!("ticket pattern is empty");
    }

    let (source, flags) = match RE_LITERAL.captures(raw) {
      Some(c) => (c[1].to_string(), c[2].to_string()),
      None => (raw.to_string(), String::new()),
    };

    let mut builder = RegexBuilder::new(&source);
    for flag in flags.chars() {
      match flag {
        'i' => {
          builder.case_insensitive(true);
        }
        'm' => {
          builder.multi_line(true);
        }
        's' => {
          builder.dot_matches_new_line(true);
        }
        // global/unicode/sticky only matter to JavaScript's matcher
        'g' | 'u' | 'y' => {}
        other => bail!("unsupported flag '{}' in ticket pattern {}", other, raw),
      }
    }

    let re = builder
      .build()
      .with_context(|| format!("compiling ticket pattern {}", raw))?;

    Ok(Self { re })
  }

  pub fn as_str(&self) -> &str {
    self.re.as_str()
  }

  /// Ticket keys mentioned in `message`, deduplicated, in order of first mention.
  pub fn keys_in(&self, message: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for m in self.re.find_iter(message) {
      let key = m.as_str();
      if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
      }
    }
    keys
  }
}

impl Default for TicketPattern {
  fn default() -> Self {
    Self {
      re: Regex::new(DEFAULT_TICKET_PATTERN).expect("default ticket pattern"),
    }
  }
}
