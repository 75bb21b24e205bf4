// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small shared helpers: repo path resolution, epoch formatting, comma-list inputs, output dirs, man page
// role: utilities/helpers
// inputs: CLI strings and paths; clap CommandFactory
// outputs: Absolute repo path, RFC3339 strings, split lists, ready output directory, troff text
// side_effects: prepare_out_dir creates directories
// invariants:
// - split_list keeps items byte-for-byte (statuses and issue types are matched exactly)
// - prepare_out_dir("-") always yields a fresh changelog-<timestamp> directory under the temp dir
// errors: Directory creation and man rendering failures bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use clap::CommandFactory;

/// Absolute form of `p`; falls back to joining onto the cwd when the path does not exist yet.
pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let resolved = std::fs::canonicalize(p)
    .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(p)))
    .unwrap_or_else(|_| p.to_path_buf());
  resolved.display().to_string()
}

/// RFC3339 (UTC) for a Unix epoch; the raw number when it is out of range.
pub fn iso_from_epoch(epoch: i64) -> String {
  Utc
    .timestamp_opt(epoch, 0)
    .single()
    .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    .unwrap_or_else(|| epoch.to_string())
}

/// Split a comma-separated input, dropping empty items. Items are kept verbatim.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
  match raw {
    Some(s) => s.split(',').filter(|item| !item.is_empty()).map(str::to_owned).collect(),
    None => Vec::new(),
  }
}

/// Directory that receives changelog artifacts.
///
/// `out` other than "-" is used as given (created if missing). For "-" a
/// `changelog-YYYYMMDD-HHMMSS` directory is made under the system temp dir.
pub fn prepare_out_dir(out: &str, now: Option<DateTime<Local>>) -> Result<String> {
  let dir = match out {
    "-" => {
      let stamp = now.unwrap_or_else(Local::now).format("%Y%m%d-%H%M%S");
      std::env::temp_dir().join(format!("changelog-{}", stamp)).display().to_string()
    }
    given => given.to_string(),
  };
  std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir))?;
  Ok(dir)
}

/// troff man page (section 1) for the clap command `T`.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let mut page = Vec::new();
  clap_mangen::Man::new(T::command())
    .render(&mut page)
    .context("rendering man page")?;
  String::from_utf8(page).context("man page is not UTF-8")
}
