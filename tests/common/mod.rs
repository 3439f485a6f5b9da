#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A project directory plus a private state directory for the advisory memo.
/// Both `TempDir`s must be kept alive for the duration of the test.
pub struct Fixture {
    pub project: tempfile::TempDir,
    pub state: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            project: tempfile::tempdir().unwrap(),
            state: tempfile::tempdir().unwrap(),
        }
    }

    pub fn cwd(&self) -> &str {
        self.project.path().to_str().unwrap()
    }

    /// Write `.oh/<name>.md`.
    pub fn write_session(&self, name: &str, body: &str) -> PathBuf {
        let dir = self.project.path().join(".oh");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.md"));
        fs::write(&path, body).unwrap();
        path
    }

    /// Write `.oh/config.json`.
    pub fn write_config(&self, json: &str) {
        let dir = self.project.path().join(".oh");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.json"), json).unwrap();
    }

    pub fn run(&self, args: &[&str], stdin: &str) -> (i32, String, String) {
        run_cli(args, stdin, self.state.path())
    }

    /// Run the default hook mode with one event.
    pub fn hook(&self, stdin: &str) -> (i32, String, String) {
        self.run(&[], stdin)
    }
}

pub fn run_cli(args: &[&str], stdin: &str, state_dir: &Path) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_oh-advisor"))
        .args(args)
        .env("OH_ADVISOR_STATE_DIR", state_dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

pub fn common(cwd: &str, session_id: &str) -> String {
    format!(
        r#"
    "session_id": "{session_id}",
    "transcript_path": "/tmp/t.jsonl",
    "cwd": "{cwd}",
    "permission_mode": "default"
"#
    )
}

pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn prompt_event(cwd: &str, session_id: &str, prompt: &str) -> String {
    let common = common(cwd, session_id);
    let prompt = serde_json::to_string(prompt).unwrap();
    format!(r#"{{ {common}, "hook_event_name": "UserPromptSubmit", "prompt": {prompt} }}"#)
}

pub fn session_start_event(cwd: &str, session_id: &str, source: &str) -> String {
    let common = common(cwd, session_id);
    format!(r#"{{ {common}, "hook_event_name": "SessionStart", "source": "{source}" }}"#)
}

pub fn session_end_event(cwd: &str, session_id: &str) -> String {
    let common = common(cwd, session_id);
    format!(r#"{{ {common}, "hook_event_name": "SessionEnd", "reason": "other" }}"#)
}

/// The advisory block from a hook reply.
pub fn additional_context(stdout: &str) -> String {
    let output: serde_json::Value = serde_json::from_str(stdout).unwrap();
    output["hookSpecificOutput"]["additionalContext"]
        .as_str()
        .unwrap_or_else(|| panic!("no additionalContext in {stdout}"))
        .to_string()
}
