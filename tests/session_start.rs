mod common;

use common::{
    Fixture, additional_context, new_session_id, prompt_event, session_end_event,
    session_start_event,
};

#[test]
fn session_start_shows_current_advice() {
    let fx = Fixture::new();
    fx.write_session("s", "## Aim\n");
    let input = session_start_event(fx.cwd(), &new_session_id(), "startup");
    let (code, stdout, stderr) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
    let output: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        output["hookSpecificOutput"]["hookEventName"].as_str(),
        Some("SessionStart")
    );
    assert_eq!(output["systemMessage"].as_str(), Some("[oh] next: /problem-space"));
    assert!(additional_context(&stdout).contains("Phase status: Session s: completed aim"));
}

#[test]
fn first_plain_prompt_after_start_is_not_repeated() {
    let fx = Fixture::new();
    fx.write_session("s", "## Aim\n");
    let session_id = new_session_id();
    let (_, started, _) = fx.hook(&session_start_event(fx.cwd(), &session_id, "startup"));
    assert!(!started.is_empty());
    let (code, stdout, _) = fx.hook(&prompt_event(fx.cwd(), &session_id, "ok, continue"));
    assert_eq!(code, 0);
    assert!(stdout.is_empty(), "expected suppression, got: {stdout}");
}

#[test]
fn startup_and_clear_reset_the_memo() {
    let fx = Fixture::new();
    fx.write_session("s", "## Aim\n");
    let session_id = new_session_id();
    let prompt = prompt_event(fx.cwd(), &session_id, "ok");
    let (_, first, _) = fx.hook(&prompt);
    assert!(!first.is_empty());

    // Resume keeps the conversation, so the advice is still in view.
    let (_, resumed, _) = fx.hook(&session_start_event(fx.cwd(), &session_id, "resume"));
    assert!(resumed.is_empty(), "expected suppression, got: {resumed}");

    let (_, cleared, _) = fx.hook(&session_start_event(fx.cwd(), &session_id, "clear"));
    assert!(!cleared.is_empty());
}

#[test]
fn session_end_forgets_the_memo() {
    let fx = Fixture::new();
    fx.write_session("s", "## Aim\n");
    let session_id = new_session_id();
    let prompt = prompt_event(fx.cwd(), &session_id, "ok");
    assert!(!fx.hook(&prompt).1.is_empty());

    let (code, stdout, stderr) = fx.hook(&session_end_event(fx.cwd(), &session_id));
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
    assert_eq!(std::fs::read_dir(fx.state.path()).unwrap().count(), 0);

    assert!(!fx.hook(&prompt).1.is_empty());
}

#[test]
fn session_start_in_subdirectory_of_git_repo() {
    let fx = Fixture::new();
    git2::Repository::init(fx.project.path()).unwrap();
    fx.write_session("s", "## Execute\n");
    let nested = fx.project.path().join("crates").join("core");
    std::fs::create_dir_all(&nested).unwrap();
    let input = session_start_event(nested.to_str().unwrap(), &new_session_id(), "startup");
    let (code, stdout, _) = fx.hook(&input);
    assert_eq!(code, 0);
    assert!(additional_context(&stdout).contains("Suggested: /ship"));
}
