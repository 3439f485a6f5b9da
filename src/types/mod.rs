use serde::{Deserialize, Serialize};

// ===================================================================
// Shared Enums
// ===================================================================

/// Permission mode for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    Default,
    Plan,
    AcceptEdits,
    DontAsk,
    BypassPermissions,
    /// A mode this build does not know about.
    #[serde(other)]
    Unknown,
}

/// How a session was started (used by SessionStart).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStartSource {
    Startup,
    Resume,
    Clear,
    Compact,
    #[serde(other)]
    Other,
}

impl SessionStartSource {
    /// Whether the host starts this session with an empty conversation, so
    /// nothing the advisor said before is still visible.
    pub fn starts_fresh(&self) -> bool {
        matches!(self, Self::Startup | Self::Clear)
    }
}

// ===================================================================
// Hook Input Types (received via stdin, snake_case JSON)
// ===================================================================

/// Fields shared by all hook event inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonInput {
    pub session_id: String,
    #[serde(default)]
    pub transcript_path: String,
    pub cwd: String,
    #[serde(default)]
    pub permission_mode: Option<PermissionMode>,
}

#[derive(Debug, Deserialize)]
pub struct SessionStartInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub source: SessionStartSource,
}

#[derive(Debug, Deserialize)]
pub struct UserPromptSubmitInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionEndInput {
    #[serde(flatten)]
    pub common: CommonInput,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Top-level hook input, deserialized from stdin JSON.
///
/// Tagged by the `hook_event_name` field. Events the advisor does not act on
/// keep only their common fields; their remaining payload is ignored. Event
/// names this build does not know deserialize to `Unknown`.
#[derive(Debug, Deserialize)]
#[serde(tag = "hook_event_name")]
pub enum HookInput {
    SessionStart(SessionStartInput),
    UserPromptSubmit(UserPromptSubmitInput),
    SessionEnd(SessionEndInput),
    PreToolUse(CommonInput),
    PermissionRequest(CommonInput),
    PostToolUse(CommonInput),
    PostToolUseFailure(CommonInput),
    Notification(CommonInput),
    SubagentStart(CommonInput),
    SubagentStop(CommonInput),
    Stop(CommonInput),
    TeammateIdle(CommonInput),
    TaskCompleted(CommonInput),
    PreCompact(CommonInput),
    #[serde(other)]
    Unknown,
}

impl HookInput {
    /// Access the common fields shared by all known hook events.
    pub fn common(&self) -> Option<&CommonInput> {
        match self {
            Self::SessionStart(e) => Some(&e.common),
            Self::UserPromptSubmit(e) => Some(&e.common),
            Self::SessionEnd(e) => Some(&e.common),
            Self::PreToolUse(c)
            | Self::PermissionRequest(c)
            | Self::PostToolUse(c)
            | Self::PostToolUseFailure(c)
            | Self::Notification(c)
            | Self::SubagentStart(c)
            | Self::SubagentStop(c)
            | Self::Stop(c)
            | Self::TeammateIdle(c)
            | Self::TaskCompleted(c)
            | Self::PreCompact(c) => Some(c),
            Self::Unknown => None,
        }
    }
}

// ===================================================================
// Hook Output Types (written to stdout as JSON, camelCase)
// ===================================================================

/// Top-level hook output written to stdout on exit code 0.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// If `true`, hides stdout from verbose mode output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_output: Option<bool>,

    /// Message shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    /// Event-specific output fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

/// Event-specific output, tagged by `hookEventName`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "hookEventName")]
pub enum HookSpecificOutput {
    SessionStart(AdditionalContext),
    UserPromptSubmit(AdditionalContext),
}

/// Text added to the model's context for this turn.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}
