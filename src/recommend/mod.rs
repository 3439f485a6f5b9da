use serde::Serialize;

use crate::config::ProjectConfig;
use crate::detector::SessionState;
use crate::phase::{CROSS_CUTTING, MAIN_FLOW, Phase};

const MAX_PRIMARY: usize = 3;
const MAX_INTENTS_WITHOUT_SESSION: usize = 2;

pub const NO_SESSION_NOTE: &str =
    "No active session. Start one with /aim to set the outcome you're after.";
pub const FLOW_COMPLETE_NOTE: &str = "All phases complete. Ready for final review before shipping.";

// ===================================================================
// Input: everything gathered from disk, the prompt and the config
// ===================================================================

pub struct RecommendContext<'a> {
    pub session: Option<&'a SessionState>,
    pub intents: &'a [Phase],
    pub config: &'a ProjectConfig,
}

// ===================================================================
// Output
// ===================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Skills to suggest now. At most three from state and intent, plus any
    /// configured overrides.
    pub primary: Vec<Phase>,
    /// Cross-cutting skills that remain available.
    pub available: Vec<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Recommendation {
    /// Nothing to suggest and nothing to say.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
            && self.available.is_empty()
            && self.phase_status.is_none()
            && self.note.is_none()
    }
}

// ===================================================================
// Pure entry point
// ===================================================================

/// Combine session state and prompt intent into a suggestion.
///
/// Recorded state decides the main-flow suggestion. Intent only adds
/// cross-cutting skills on top of it, or fills in when there is no session.
pub fn recommend(ctx: &RecommendContext) -> Recommendation {
    match ctx.session {
        None => recommend_without_session(ctx),
        Some(session) => recommend_for_session(ctx, session),
    }
}

/// The phase the recorded state points at: the main-flow phase after
/// `last_phase`, `aim` for a fresh session, and `review` once the main flow
/// is complete.
pub fn next_phase(last_phase: Option<Phase>) -> Phase {
    match last_phase {
        None => MAIN_FLOW[0],
        Some(last) => last.next().unwrap_or(Phase::Review),
    }
}

fn is_flow_complete(last_phase: Option<Phase>) -> bool {
    last_phase.is_some_and(|p| p.next().is_none())
}

fn recommend_without_session(ctx: &RecommendContext) -> Recommendation {
    let primary: Vec<Phase> = if ctx.intents.is_empty() {
        [Phase::Aim]
            .into_iter()
            .filter(|p| ctx.config.is_allowed(*p))
            .collect()
    } else {
        ctx.intents
            .iter()
            .copied()
            .filter(|p| ctx.config.is_allowed(*p))
            .take(MAX_INTENTS_WITHOUT_SESSION)
            .collect()
    };

    if primary.is_empty() {
        return Recommendation::default();
    }
    Recommendation {
        primary,
        note: Some(NO_SESSION_NOTE.to_string()),
        ..Default::default()
    }
}

fn recommend_for_session(ctx: &RecommendContext, session: &SessionState) -> Recommendation {
    // 1. State-derived suggestion. There is no search forward for the next
    //    allowed phase: a filtered-out next phase is simply missing.
    let next = next_phase(session.last_phase);
    let note = is_flow_complete(session.last_phase).then(|| FLOW_COMPLETE_NOTE.to_string());

    // 2. Cross-cutting intents enrich, never replace.
    let candidates = std::iter::once(next).chain(
        ctx.intents
            .iter()
            .copied()
            .filter(|p| p.is_cross_cutting()),
    );

    let mut primary: Vec<Phase> = Vec::new();
    for phase in candidates {
        if primary.len() == MAX_PRIMARY {
            break;
        }
        if ctx.config.is_allowed(phase) && !primary.contains(&phase) {
            primary.push(phase);
        }
    }

    let available: Vec<Phase> = CROSS_CUTTING
        .iter()
        .copied()
        .filter(|p| !primary.contains(p) && ctx.config.is_allowed(*p))
        .collect();

    // 3. Overrides are appended after the cap.
    let capped = primary.clone();
    for phase in capped {
        for extra in ctx.config.overrides_for(phase) {
            if ctx.config.is_allowed(extra) && !primary.contains(&extra) {
                primary.push(extra);
            }
        }
    }

    Recommendation {
        primary,
        available,
        phase_status: Some(phase_status(session)),
        note,
    }
}

fn phase_status(session: &SessionState) -> String {
    let completed = if session.completed.is_empty() {
        "none".to_string()
    } else {
        session
            .completed
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("Session {}: completed {completed}", session.name)
}
