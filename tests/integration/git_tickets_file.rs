use test_support::{changelog_cmd, fixture_path, init_fixture_repo};

fn fixture_cmd(repo: &std::path::Path) -> assert_cmd::Command {
  let mut cmd = changelog_cmd();
  cmd.arg("--repo")
    .arg(repo)
    .args(["--from", "v1.0.0", "--to", "main"])
    .arg("--tickets-file")
    .arg(fixture_path("tickets.json"))
    .args(["--jira-base-url", "https://acme.atlassian.net"])
    .args(["--approval-statuses", "Done"])
    .args(["--release-version", "2.0.0"]);
  cmd
}

#[test]
fn git_range_with_tickets_file_renders_changelog() {
  let repo = init_fixture_repo();

  let out = fixture_cmd(repo.path())
    .arg("--include-pending-approval-section")
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  insta::assert_snapshot!(String::from_utf8(out.stdout).unwrap(), @r"
  Release version: 2.0.0

  Jira Tickets
  ---------------------

  * [Bug] - [PROJ-2](https://acme.atlassian.net/browse/PROJ-2) Extract payment service
  * [Story] - [PROJ-1](https://acme.atlassian.net/browse/PROJ-1) Add user model
  * [Sub-task] - [PROJ-3](https://acme.atlassian.net/browse/PROJ-3) Wire payment webhooks

  Pending Approval
  ---------------------

  bob@acme.test
  * https://acme.atlassian.net/browse/PROJ-2

  alice@acme.test
  * https://acme.atlassian.net/browse/PROJ-3
  ");
}

#[test]
fn unknown_keys_are_skipped_and_commits_partitioned() {
  let repo = init_fixture_repo();

  let out = fixture_cmd(repo.path()).args(["--emit", "json"]).output().unwrap();
  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  // four commits after the tag; the tagged commit itself is outside the range
  assert_eq!(v["commits"]["all"].as_array().unwrap().len(), 4);
  assert_eq!(v["commits"]["with_tickets"].as_array().unwrap().len(), 2);
  assert_eq!(v["commits"]["without_tickets"].as_array().unwrap().len(), 2);

  let subjects: Vec<&str> = v["commits"]["all"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["subject"].as_str().unwrap())
    .collect();
  assert_eq!(
    subjects,
    vec![
      "OPS-9 rotate keys",
      "chore: bump dependencies",
      "PROJ-2 extract payment service",
      "PROJ-1 add user model"
    ]
  );

  let all = v["tickets"]["all"].as_array().unwrap();
  assert!(all.iter().all(|t| t["key"] != "OPS-9"));
  // PROJ-1 is mentioned in two commits
  let proj1 = all.iter().find(|t| t["key"] == "PROJ-1").unwrap();
  assert_eq!(proj1["commits"].as_array().unwrap().len(), 2);
}

#[test]
fn excluded_issue_types_never_reach_the_changelog() {
  let repo = init_fixture_repo();

  let out = fixture_cmd(repo.path())
    .args(["--exclude-issue-types", "Sub-task"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let s = String::from_utf8(out.stdout).unwrap();
  assert!(s.contains("[PROJ-1]"));
  assert!(!s.contains("PROJ-3"));
}

#[test]
fn custom_ticket_pattern_limits_keys() {
  let repo = init_fixture_repo();

  let out = fixture_cmd(repo.path())
    .args(["--ticket-pattern", "/proj-1\\b/i", "--emit", "json"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let keys: Vec<&str> = v["tickets"]["all"]
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["key"].as_str().unwrap())
    .collect();
  assert_eq!(keys, vec!["PROJ-1"]);
}
