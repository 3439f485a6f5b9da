use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

use crate::config::DATA_DIR;
use crate::phase::Phase;

const SESSION_EXT: &str = "md";

/// What the active session document says has been done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// File stem of the session document.
    pub name: String,
    /// Phases whose heading appears in the document, in document order.
    pub completed: Vec<Phase>,
    /// Furthest main-flow phase among `completed`.
    pub last_phase: Option<Phase>,
}

impl SessionState {
    fn from_text(name: String, text: &str) -> Self {
        let completed = completed_phases(text);
        let last_phase = last_main_flow_phase(&completed);
        Self {
            name,
            completed,
            last_phase,
        }
    }
}

pub fn sessions_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

/// Find the most recently modified session document under `root` and parse
/// its headings.
///
/// Returns `None` when there is no session directory or it holds no session
/// documents. A document that exists but cannot be read is still the active
/// session, just with nothing completed.
pub fn detect_session(root: &Path) -> Option<SessionState> {
    let (name, path) = latest_session(&sessions_dir(root))?;
    match fs::read_to_string(&path) {
        Ok(text) => Some(SessionState::from_text(name, &text)),
        Err(err) => {
            debug!("reading session {}: {err}", path.display());
            Some(SessionState {
                name,
                completed: Vec::new(),
                last_phase: None,
            })
        }
    }
}

/// Pick the session document with the latest modification time.
///
/// Entries are visited in file name order and only a strictly later time
/// replaces the pick, so equal times resolve to the smallest name.
fn latest_session(dir: &Path) -> Option<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            trace!("no session directory at {}: {err}", dir.display());
            return None;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == SESSION_EXT))
        .collect();
    paths.sort();

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for path in paths {
        let modified = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => match meta.modified() {
                Ok(t) => t,
                Err(err) => {
                    debug!("skipping {}: {err}", path.display());
                    continue;
                }
            },
            Ok(_) => continue,
            Err(err) => {
                debug!("skipping {}: {err}", path.display());
                continue;
            }
        };
        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, path));
        }
    }

    let (_, path) = best?;
    let name = path.file_stem()?.to_string_lossy().into_owned();
    Some((name, path))
}

/// Phases whose `## <Heading>` line appears in `text`, in document order.
///
/// The heading must fill the whole line apart from trailing whitespace, and
/// lines inside fenced code blocks are not considered, so examples quoted in
/// a session document do not count as progress.
pub fn completed_phases(text: &str) -> Vec<Phase> {
    let mut found = Vec::new();
    let mut fence: Option<Fence> = None;

    for line in text.lines() {
        if let Some(open) = &fence {
            if open.closed_by(line) {
                fence = None;
            }
            continue;
        }
        if let Some(opened) = Fence::opened_by(line) {
            fence = Some(opened);
            continue;
        }
        if let Some(phase) = heading_phase(line) {
            if !found.contains(&phase) {
                found.push(phase);
            }
        }
    }
    found
}

fn heading_phase(line: &str) -> Option<Phase> {
    let rest = line.strip_prefix("## ")?;
    Phase::from_heading(rest.trim_end())
}

/// Furthest main-flow phase in `phases`. Cross-cutting phases never count.
pub fn last_main_flow_phase(phases: &[Phase]) -> Option<Phase> {
    phases
        .iter()
        .copied()
        .filter_map(|p| p.flow_index().map(|i| (i, p)))
        .max_by_key(|(i, _)| *i)
        .map(|(_, p)| p)
}

/// An open fenced code block: the fence character and its run length.
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Fence { marker, len })
    }

    fn closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|c| *c == self.marker).count();
        len >= self.len && len == trimmed.chars().count()
    }
}
