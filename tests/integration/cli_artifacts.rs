use test_support::{changelog_cmd, fixture_path, tempdir};

#[test]
fn out_dir_receives_markdown_html_json_and_email() {
  let td = tempdir();
  let out_dir = td.path().join("release");
  let action_output = td.path().join("github_output");

  let out = changelog_cmd()
    .arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .args(["--jira-base-url", "https://acme.atlassian.net"])
    .args(["--approval-statuses", "Done"])
    .args(["--release-version", "4.2.0"])
    .args(["--email-to", "team@acme.test,qa@acme.test"])
    .args(["--email-from", "releases@acme.test"])
    .args(["--app-name", "Storefront"])
    .arg("--out")
    .arg(&out_dir)
    .env("GITHUB_OUTPUT", &action_output)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let pointer: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(pointer["dir"], out_dir.to_string_lossy().as_ref());
  assert_eq!(
    pointer["files"],
    serde_json::json!(["changelog.md", "changelog.html", "transform.json", "email.json"])
  );

  let md = std::fs::read_to_string(out_dir.join("changelog.md")).unwrap();
  assert!(md.starts_with("Release version: 4.2.0\n"));

  let html = std::fs::read_to_string(out_dir.join("changelog.html")).unwrap();
  assert!(html.contains("<h2>Jira Tickets</h2>"));
  assert!(html.contains("<a href=\"https://acme.atlassian.net/browse/PROJ-10\">PROJ-10</a>"));

  let transform: serde_json::Value =
    serde_json::from_slice(&std::fs::read(out_dir.join("transform.json")).unwrap()).unwrap();
  assert_eq!(transform["tickets"]["all"].as_array().unwrap().len(), 3);

  let email: serde_json::Value = serde_json::from_slice(&std::fs::read(out_dir.join("email.json")).unwrap()).unwrap();
  assert_eq!(
    email["Destination"]["ToAddresses"],
    serde_json::json!(["team@acme.test", "qa@acme.test"])
  );
  assert_eq!(email["Source"], "releases@acme.test");
  assert_eq!(email["Message"]["Subject"]["Data"], "Storefront Release Notes");
  assert_eq!(email["Message"]["Body"]["Html"]["Data"], html.as_str());
  assert_eq!(email["Message"]["Body"]["Text"]["Data"], md.as_str());

  let action = std::fs::read_to_string(&action_output).unwrap();
  assert!(action.starts_with("changelog_message<<CHANGELOG_EOF\nRelease version: 4.2.0\n"));
  assert!(action.ends_with("\nCHANGELOG_EOF\n"));
}

#[test]
fn out_dir_without_recipients_skips_email() {
  let td = tempdir();
  let out_dir = td.path().join("release");

  let out = changelog_cmd()
    .arg("--commits-json")
    .arg(fixture_path("commits.json"))
    .arg("--out")
    .arg(&out_dir)
    .output()
    .unwrap();
  assert!(out.status.success());

  let pointer: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(pointer["files"].as_array().unwrap().len(), 3);
  assert!(!out_dir.join("email.json").exists());
}
