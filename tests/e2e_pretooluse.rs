use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn run_pretooluse(dir: &Path, config: &str, hook_input: serde_json::Value) -> serde_json::Value {
    let config_path = dir.join("agentkit.yaml");
    std::fs::write(&config_path, config).expect("write config");

    let bin_path = env!("CARGO_BIN_EXE_pretooluse");
    let mut child = Command::new(bin_path)
        .current_dir(dir)
        .env("AGENTKIT_CONFIG", &config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn pretooluse");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(hook_input.to_string().as_bytes())
            .expect("write stdin");
    }

    let output = child.wait_with_output().expect("wait output");
    assert!(output.status.success(), "pretooluse exited with {:?}", output.status.code());
    let stdout_str = String::from_utf8(output.stdout).expect("utf8 stdout");
    let v: serde_json::Value = serde_json::from_str(&stdout_str).expect("parse json");
    assert_eq!(v["hookSpecificOutput"]["hookEventName"], "PreToolUse");
    v["hookSpecificOutput"].clone()
}

fn bash(command: &str, cwd: &Path) -> serde_json::Value {
    serde_json::json!({
        "tool_name": "Bash",
        "tool_input": { "command": command },
        "session_id": "e2e",
        "cwd": cwd.to_string_lossy(),
        "hook_event_name": "PreToolUse"
    })
}

#[test]
fn e2e_pretooluse_denies_force_push() {
    let temp = tempdir().expect("tempdir");
    let out = run_pretooluse(temp.path(), "", bash("git push --force origin feat/x", temp.path()));
    assert_eq!(out["permissionDecision"], "deny");
    let reason = out["permissionDecisionReason"].as_str().unwrap();
    assert!(reason.starts_with("BLOCKED: Force push is forbidden."));
}

#[test]
fn e2e_pretooluse_denies_kargo_apply() {
    let temp = tempdir().expect("tempdir");
    let out = run_pretooluse(temp.path(), "", bash("kubectl apply -f promotion.yaml", temp.path()));
    assert_eq!(out["permissionDecision"], "deny");
    assert!(out["permissionDecisionReason"]
        .as_str()
        .unwrap()
        .contains("Kargo promotion"));
}

#[test]
fn e2e_pretooluse_package_policy_follows_config() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();

    let out = run_pretooluse(dir, "", bash("npm install", dir));
    assert_eq!(out["permissionDecision"], "deny");

    let out = run_pretooluse(dir, "pkg-police:\n  enabled: false\n", bash("npm install", dir));
    assert_eq!(out["permissionDecision"], "allow");
    assert!(out.get("permissionDecisionReason").is_none());
}

#[test]
fn e2e_pretooluse_allows_safe_and_non_bash() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();

    // cwd is not a git repository, so the branch is unknown and never blocks
    let out = run_pretooluse(dir, "", bash("git commit -m 'wip'", dir));
    assert_eq!(out["permissionDecision"], "allow");

    let write = serde_json::json!({
        "tool_name": "Write",
        "tool_input": { "file_path": "a.ts", "content": "npm install" }
    });
    let out = run_pretooluse(dir, "", write);
    assert_eq!(out["permissionDecision"], "allow");
}
