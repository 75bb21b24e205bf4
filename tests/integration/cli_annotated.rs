use test_support::{changelog_cmd, fixture_path};

fn annotated_cmd() -> assert_cmd::Command {
  let mut cmd = changelog_cmd();
  cmd.arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .args(["--jira-base-url", "https://acme.atlassian.net"])
    .args(["--approval-statuses", "Done,Ready for QA"])
    .args(["--release-version", "4.2.0"]);
  cmd
}

#[test]
fn message_lists_tickets_and_pending_owners() {
  let out = annotated_cmd().arg("--include-pending-approval-section").output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  insta::assert_snapshot!(String::from_utf8(out.stdout).unwrap(), @r"
  Release version: 4.2.0

  Jira Tickets
  ---------------------

  * [Bug] - [PROJ-12](https://acme.atlassian.net/browse/PROJ-12) Retries exhaust the connection pool
  * [Bug] - [PROJ-11](https://acme.atlassian.net/browse/PROJ-11) Checkout crashes on empty cart
  * [Task] - [PROJ-10](https://acme.atlassian.net/browse/PROJ-10) New checkout flow

  Pending Approval
  ---------------------

  @bob
  * https://acme.atlassian.net/browse/PROJ-11
  ");
}

#[test]
fn pending_section_is_off_by_default() {
  let out = annotated_cmd().output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8(out.stdout).unwrap();
  assert!(s.contains("Jira Tickets"));
  assert!(!s.contains("Pending Approval"));
}

#[test]
fn json_emit_exposes_transform_output() {
  let out = annotated_cmd().args(["--emit", "json"]).output().unwrap();
  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  let keys = |arr: &serde_json::Value| -> Vec<String> {
    arr
      .as_array()
      .unwrap()
      .iter()
      .map(|t| t["key"].as_str().unwrap().to_string())
      .collect()
  };
  assert_eq!(keys(&v["tickets"]["all"]), vec!["PROJ-12", "PROJ-11", "PROJ-10"]);
  assert_eq!(keys(&v["tickets"]["approved"]), vec!["PROJ-12", "PROJ-10"]);
  assert_eq!(keys(&v["tickets"]["pending"]), vec!["PROJ-11"]);

  // a ticket mentioned by two commits lists both, in input order
  assert_eq!(
    v["tickets"]["all"][2]["commits"],
    serde_json::json!(["a2d3c4b5a6f7e8d9c0b1a2f3e4d5c6b7a8f9e0d1", "f1e2d3c4b5a6f7e8d9c0b1a2f3e4d5c6b7a8f9e0"])
  );

  assert_eq!(v["commits"]["all"].as_array().unwrap().len(), 4);
  assert_eq!(
    v["commits"]["without_tickets"],
    serde_json::json!(["b3e2d1c0b9a8f7e6d5c4b3a2f1e0d9c8b7a6f5e4"])
  );

  let owners = v["tickets"]["pending_by_owner"].as_array().unwrap();
  assert_eq!(owners.len(), 1);
  assert_eq!(owners[0]["email"], "bob@acme.test");
  assert_eq!(owners[0]["chat_user"]["id"], "U02BOB");
}

#[test]
fn action_inputs_are_read_from_environment() {
  let out = changelog_cmd()
    .arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .env("INPUT_JIRA_BASE_URL", "https://jira.internal")
    .env("INPUT_APPROVAL_STATUSES", "Done")
    .env("INPUT_INCLUDE_PENDING_APPROVAL_SECTION", "true")
    .env("VERSION", "9.9.9")
    .output()
    .unwrap();
  assert!(out.status.success());
  let s = String::from_utf8(out.stdout).unwrap();
  assert!(s.starts_with("Release version: 9.9.9\n"));
  assert!(s.contains("(https://jira.internal/browse/PROJ-12)"));
  // "Ready for QA" is not approved here, so carol owns a pending ticket too
  assert!(s.contains("carol@acme.test\n* https://jira.internal/browse/PROJ-12"));
}

#[test]
fn empty_action_input_leaves_pending_section_off() {
  let out = annotated_cmd()
    .env("INPUT_INCLUDE_PENDING_APPROVAL_SECTION", "")
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(!String::from_utf8(out.stdout).unwrap().contains("Pending Approval"));
}

#[test]
fn generated_release_name_stays_out_of_the_message() {
  let out = changelog_cmd()
    .arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .output()
    .unwrap();
  assert!(out.status.success());
  let s = String::from_utf8(out.stdout).unwrap();
  assert!(s.starts_with("Jira Tickets\n"), "message was: {s}");
  assert!(!s.contains("Release version"));
}

#[test]
fn chat_users_file_mentions_pending_owners() {
  let out = changelog_cmd()
    .arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .arg("--chat-users-file")
    .arg(fixture_path("chat_users.json"))
    .args(["--jira-base-url", "https://acme.atlassian.net"])
    .args(["--approval-statuses", "Done"])
    .arg("--include-pending-approval-section")
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let s = String::from_utf8(out.stdout).unwrap();
  // carol resolves from the file; bob keeps the chat user already on his ticket
  assert!(s.contains("@carol\n* https://acme.atlassian.net/browse/PROJ-12"), "message was: {s}");
  assert!(s.contains("@bob\n* https://acme.atlassian.net/browse/PROJ-11"), "message was: {s}");
}
