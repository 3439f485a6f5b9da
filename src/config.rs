use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::phase::Phase;

pub const DATA_DIR: &str = ".oh";
const FILENAME: &str = "config.json";

/// Per-project skill preferences stored in `.oh/config.json`.
///
/// ```json
/// {
///   "projectSkills": ["aim", "execute", "ship"],
///   "disabledSkills": ["salvage"],
///   "phaseOverrides": { "execute": ["review"] }
/// }
/// ```
///
/// Every key is optional. Names are plain strings so that a config written
/// for a newer skill set still loads; names that are not phases never match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Allow-list. `None` allows every skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_skills: Option<Vec<String>>,

    /// Deny-list. Always wins over `project_skills`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_skills: Vec<String>,

    /// Extra skills appended when the key phase is suggested.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phase_overrides: BTreeMap<String, Vec<String>>,
}

impl ProjectConfig {
    /// Load `.oh/config.json` under `root`.
    ///
    /// A missing file and a malformed one are treated the same: defaults,
    /// with the reason logged at debug level.
    pub fn load(root: &Path) -> Self {
        match Self::read(root) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                debug!("ignoring project config: {err:#}");
                Self::default()
            }
        }
    }

    fn read(root: &Path) -> Result<Option<Self>> {
        let path = root.join(DATA_DIR).join(FILENAME);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = serde_json::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn is_allowed(&self, phase: Phase) -> bool {
        let name = phase.as_str();
        if self.disabled_skills.iter().any(|s| s == name) {
            return false;
        }
        match &self.project_skills {
            Some(allowed) => allowed.iter().any(|s| s == name),
            None => true,
        }
    }

    /// Extra phases configured for `phase`, in file order. Unknown names are
    /// dropped.
    pub fn overrides_for(&self, phase: Phase) -> Vec<Phase> {
        self.phase_overrides
            .get(phase.as_str())
            .map(|extras| extras.iter().filter_map(|s| s.parse().ok()).collect())
            .unwrap_or_default()
    }
}
