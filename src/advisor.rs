use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

use crate::config::{DATA_DIR, ProjectConfig};
use crate::detector::{SessionState, detect_session};
use crate::intent::detect_intents;
use crate::present::{Presenter, StatusSurface};
use crate::recommend::{RecommendContext, Recommendation, recommend};
use crate::types::{
    AdditionalContext, HookInput, HookOutput, HookSpecificOutput, SessionStartInput,
    UserPromptSubmitInput,
};

const STATUS_PREFIX: &str = "[oh]";

/// Whether the prompt invokes a slash command such as `/aim`. The user is
/// already choosing a skill, so there is nothing to suggest.
pub fn is_slash_command(prompt: &str) -> bool {
    let mut chars = prompt.trim_start().chars();
    chars.next() == Some('/') && chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
}

/// Resolve the directory that holds `.oh/` for a working directory.
///
/// `cwd` wins when it has its own `.oh/`. Otherwise the enclosing git work
/// tree is used, falling back to `cwd` outside a repository.
pub fn project_root(cwd: &Path) -> PathBuf {
    if cwd.join(DATA_DIR).is_dir() {
        return cwd.to_path_buf();
    }
    match git2::Repository::discover(cwd) {
        Ok(repo) => match repo.workdir() {
            Some(workdir) => workdir.to_path_buf(),
            None => cwd.to_path_buf(),
        },
        Err(err) => {
            trace!("no git work tree above {}: {}", cwd.display(), err.message());
            cwd.to_path_buf()
        }
    }
}

/// Collects the status line into the hook reply's `systemMessage`.
#[derive(Debug, Default)]
struct SystemMessage(Option<String>);

impl StatusSurface for SystemMessage {
    fn set_status(&mut self, line: &str) {
        self.0 = Some(format!("{STATUS_PREFIX} {line}"));
    }
}

/// Skill advice for one project. Configuration is read once, here, and
/// reused for every prompt; session documents are re-read on each call.
pub struct Advisor {
    root: PathBuf,
    config: ProjectConfig,
}

impl Advisor {
    pub fn open(cwd: &Path) -> Self {
        let root = project_root(cwd);
        let config = ProjectConfig::load(&root);
        debug!("advising for {}", root.display());
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn session(&self) -> Option<SessionState> {
        detect_session(&self.root)
    }

    pub fn recommend(&self, prompt: &str) -> Recommendation {
        let session = self.session();
        let intents = detect_intents(prompt);
        trace!(?session, ?intents, "recommending");
        recommend(&RecommendContext {
            session: session.as_ref(),
            intents: &intents,
            config: &self.config,
        })
    }

    /// The advisory block for `prompt`, or `None` when the prompt is a slash
    /// command, there is nothing to say, or the block repeats the last one.
    pub fn advise(
        &self,
        prompt: &str,
        presenter: &mut Presenter,
        status: Option<&mut dyn StatusSurface>,
    ) -> Option<String> {
        if is_slash_command(prompt) {
            trace!("slash command, no advice");
            return None;
        }
        presenter.present(&self.recommend(prompt), status)
    }

    // ---------------------------------------------------------------
    // Hook handlers
    // ---------------------------------------------------------------

    /// Dispatch one hook event. `presenter` holds the host session's last
    /// shown block and is reset when the host starts or ends a session.
    pub fn handle_event(&self, input: &HookInput, presenter: &mut Presenter) -> Option<HookOutput> {
        match input {
            HookInput::SessionStart(e) => self.handle_session_start(e, presenter),
            HookInput::UserPromptSubmit(e) => self.handle_user_prompt_submit(e, presenter),
            HookInput::SessionEnd(_) => {
                *presenter = Presenter::new();
                None
            }
            _ => None,
        }
    }

    pub fn handle_session_start(
        &self,
        input: &SessionStartInput,
        presenter: &mut Presenter,
    ) -> Option<HookOutput> {
        if input.source.starts_fresh() {
            *presenter = Presenter::new();
        }
        let mut status = SystemMessage::default();
        let block = self.advise("", presenter, Some(&mut status))?;
        Some(HookOutput {
            system_message: status.0,
            hook_specific_output: Some(HookSpecificOutput::SessionStart(AdditionalContext {
                additional_context: Some(block),
            })),
            ..Default::default()
        })
    }

    pub fn handle_user_prompt_submit(
        &self,
        input: &UserPromptSubmitInput,
        presenter: &mut Presenter,
    ) -> Option<HookOutput> {
        let mut status = SystemMessage::default();
        let block = self.advise(&input.prompt, presenter, Some(&mut status))?;
        Some(HookOutput {
            system_message: status.0,
            hook_specific_output: Some(HookSpecificOutput::UserPromptSubmit(AdditionalContext {
                additional_context: Some(block),
            })),
            ..Default::default()
        })
    }
}

// ---------------------------------------------------------------
// Last-shown block between hook processes
// ---------------------------------------------------------------

pub const STATE_DIR_ENV: &str = "OH_ADVISOR_STATE_DIR";

/// Memos older than this belong to host sessions that are gone.
const MEMO_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Keeps each host session's last shown block on disk, so that one process
/// per hook event still suppresses a repeat of the previous turn.
pub struct MemoStore {
    dir: PathBuf,
}

impl MemoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_dir() -> PathBuf {
        env::temp_dir().join("oh-advisor")
    }

    fn path(&self, session_id: &str) -> PathBuf {
        let safe: String = session_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("last-{safe}.txt"))
    }

    /// A presenter primed with the session's last block. Read failures give
    /// a fresh presenter.
    pub fn load(&self, session_id: &str) -> Presenter {
        match self.read(session_id) {
            Ok(previous) => Presenter::with_previous(previous),
            Err(err) => {
                debug!("ignoring advisory memo: {err:#}");
                Presenter::new()
            }
        }
    }

    fn read(&self, session_id: &str) -> Result<Option<String>> {
        let path = self.path(session_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Persist the presenter's last block, or forget it when there is none.
    /// Writing also drops memos left behind by host sessions that never
    /// sent SessionEnd.
    pub fn store(&self, session_id: &str, presenter: &Presenter) {
        let result = match presenter.previous() {
            Some(block) => self.write(session_id, block),
            None => self.clear(session_id),
        };
        if let Err(err) = result {
            debug!("not keeping advisory memo: {err:#}");
            return;
        }
        if presenter.previous().is_some() {
            if let Err(err) = self.prune(SystemTime::now()) {
                debug!("not pruning advisory memos: {err:#}");
            }
        }
    }

    /// Remove memo files last written more than `MEMO_MAX_AGE` before `now`.
    fn prune(&self, now: SystemTime) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).with_context(|| format!("listing {}", self.dir.display())),
        };
        for entry in entries {
            let entry = entry.with_context(|| format!("listing {}", self.dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !(name.starts_with("last-") && name.ends_with(".txt")) {
                continue;
            }
            let path = entry.path();
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .with_context(|| format!("reading mtime of {}", path.display()))?;
            let stale = now
                .duration_since(modified)
                .is_ok_and(|age| age > MEMO_MAX_AGE);
            if stale {
                trace!("pruning {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(e).with_context(|| format!("removing {}", path.display()));
                    }
                }
            }
        }
        Ok(())
    }

    fn write(&self, session_id: &str, block: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path(session_id);
        fs::write(&path, block).with_context(|| format!("writing {}", path.display()))
    }

    fn clear(&self, session_id: &str) -> Result<()> {
        let path = self.path(session_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}
