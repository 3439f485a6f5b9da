mod common;

use common::{Fixture, additional_context, common, new_session_id};

#[test]
fn unhandled_event_passes_through() {
    let fx = Fixture::new();
    fx.write_session("s", "## Aim\n");
    let common = common(fx.cwd(), "test-session");
    let input = format!(
        r#"{{ {common},
            "hook_event_name": "PostToolUseFailure",
            "tool_name": "Bash",
            "tool_input": {{ "command": "false" }},
            "tool_use_id": "toolu_003",
            "error": "exit code 1",
            "is_interrupt": false
        }}"#
    );
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
}

#[test]
fn invalid_json_is_skipped_without_blocking() {
    let fx = Fixture::new();
    let (code, stdout, stderr) = fx.hook("not json");
    assert_eq!(code, 0);
    assert!(stdout.is_empty(), "expected no stdout, got: {stdout}");
    assert!(stderr.contains("parsing hook input"), "got: {stderr}");
}

#[test]
fn unknown_event_passes_through() {
    let fx = Fixture::new();
    fx.write_session("s", "## Execute\n");
    let common = common(fx.cwd(), "test-session");
    let input = format!(r#"{{ {common}, "hook_event_name": "BogusEvent", "prompt": "ship it" }}"#);
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
}

#[test]
fn unlisted_permission_mode_still_gets_advice() {
    let fx = Fixture::new();
    fx.write_session("s", "## Execute\n");
    let input = format!(
        r#"{{ "session_id": "{}", "transcript_path": "/tmp/t.jsonl", "cwd": "{}",
            "permission_mode": "auto",
            "hook_event_name": "UserPromptSubmit", "prompt": "ship it" }}"#,
        new_session_id(),
        fx.cwd()
    );
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
    assert!(additional_context(&stdout).contains("Suggested: /ship"));
}

#[test]
fn missing_transcript_path_still_gets_advice() {
    let fx = Fixture::new();
    fx.write_session("s", "## Execute\n");
    let input = format!(
        r#"{{ "session_id": "{}", "cwd": "{}",
            "hook_event_name": "UserPromptSubmit", "prompt": "ship it" }}"#,
        new_session_id(),
        fx.cwd()
    );
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
    assert!(additional_context(&stdout).contains("Suggested: /ship"));
}

#[test]
fn prompt_event_without_prompt_is_skipped() {
    let fx = Fixture::new();
    let common = common(fx.cwd(), "test-session");
    let input = format!(r#"{{ {common}, "hook_event_name": "UserPromptSubmit" }}"#);
    let (code, stdout, _) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn missing_project_directory_is_quiet_about_sessions() {
    let fx = Fixture::new();
    let gone = fx.project.path().join("does-not-exist");
    let common = common(gone.to_str().unwrap(), "test-session");
    let input = format!(
        r#"{{ {common}, "hook_event_name": "UserPromptSubmit", "prompt": "ship it" }}"#
    );
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
    let output: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let block = output["hookSpecificOutput"]["additionalContext"].as_str().unwrap();
    assert!(block.contains("Suggested: /ship"), "got: {block}");
    assert!(block.contains("No active session"), "got: {block}");
}
