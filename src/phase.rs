use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One stage of the workflow. The first six form the main flow in canonical
/// order; the last three are cross-cutting and may apply at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Aim,
    ProblemSpace,
    ProblemStatement,
    SolutionSpace,
    Execute,
    Ship,
    Review,
    Dissent,
    Salvage,
}

pub const MAIN_FLOW: &[Phase] = &[
    Phase::Aim,
    Phase::ProblemSpace,
    Phase::ProblemStatement,
    Phase::SolutionSpace,
    Phase::Execute,
    Phase::Ship,
];

pub const CROSS_CUTTING: &[Phase] = &[Phase::Review, Phase::Dissent, Phase::Salvage];

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Aim,
            Phase::ProblemSpace,
            Phase::ProblemStatement,
            Phase::SolutionSpace,
            Phase::Execute,
            Phase::Ship,
            Phase::Review,
            Phase::Dissent,
            Phase::Salvage,
        ]
    }

    /// Position in the main flow, or `None` for cross-cutting phases.
    pub fn flow_index(self) -> Option<usize> {
        MAIN_FLOW.iter().position(|p| *p == self)
    }

    pub fn is_cross_cutting(self) -> bool {
        self.flow_index().is_none()
    }

    /// The main-flow phase that follows this one. `None` after `Ship` and for
    /// cross-cutting phases.
    pub fn next(self) -> Option<Phase> {
        self.flow_index().and_then(|i| MAIN_FLOW.get(i + 1).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Aim => "aim",
            Phase::ProblemSpace => "problem-space",
            Phase::ProblemStatement => "problem-statement",
            Phase::SolutionSpace => "solution-space",
            Phase::Execute => "execute",
            Phase::Ship => "ship",
            Phase::Review => "review",
            Phase::Dissent => "dissent",
            Phase::Salvage => "salvage",
        }
    }

    /// Heading text a skill writes into the session document, without the
    /// leading `## `.
    pub fn heading(self) -> &'static str {
        match self {
            Phase::Aim => "Aim",
            Phase::ProblemSpace => "Problem Space",
            Phase::ProblemStatement => "Problem Statement",
            Phase::SolutionSpace => "Solution Space",
            Phase::Execute => "Execute",
            Phase::Ship => "Ship",
            Phase::Review => "Review",
            Phase::Dissent => "Dissent",
            Phase::Salvage => "Salvage",
        }
    }

    pub fn from_heading(text: &str) -> Option<Phase> {
        Phase::all().iter().copied().find(|p| p.heading() == text)
    }

    pub fn command(self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase: {}", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}
