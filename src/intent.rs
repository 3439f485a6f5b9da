use regex::Regex;
use std::sync::OnceLock;

use crate::phase::Phase;

/// Phrases that signal each phase. Matched case-insensitively anywhere in
/// the prompt.
const INTENT_PATTERNS: &[(Phase, &str)] = &[
    (
        Phase::Aim,
        r"what(?:'s| is) the (?:goal|aim|point)|clarify (?:the )?(?:goal|aim|outcome)|set (?:an |the )?aim|desired outcome|why are we",
    ),
    (
        Phase::ProblemSpace,
        r"problem space|explore the problem|map (?:out )?the (?:problem|terrain)|constraints|assumptions|what(?:'s| is) really going on",
    ),
    (
        Phase::ProblemStatement,
        r"problem statement|(?:frame|define|reframe) the problem|what problem are we solving",
    ),
    (
        Phase::SolutionSpace,
        r"solution space|options|alternatives|approaches|trade-?offs|how (?:should|could|might) we",
    ),
    (
        Phase::Execute,
        r"implement(?:s|ed|ing|ation)?|build it|let's build|start coding|write the code|execut(?:e|es|ed|ing)",
    ),
    (
        Phase::Ship,
        r"ship(?:s|ped|ping)?|releas(?:e|es|ed|ing)|deploy(?:s|ed|ing|ment)?|open (?:a )?pr|pull request|merg(?:e|es|ed|ing)",
    ),
    (
        Phase::Review,
        r"review(?:s|ed|ing)?|check (?:my|the) work|look over|sanity check",
    ),
    (
        Phase::Dissent,
        r"stress[- ]?test(?:s|ed|ing)?|devil'?s advocate|poke holes|challeng(?:e|es|ed|ing)|what could go wrong|push back",
    ),
    (
        Phase::Salvage,
        r"salvage|start over|scrap|this isn'?t working|abandon|lessons learned",
    ),
];

static INTENT_RES: OnceLock<Vec<(Phase, Regex)>> = OnceLock::new();

fn intent_res() -> &'static [(Phase, Regex)] {
    INTENT_RES.get_or_init(|| {
        INTENT_PATTERNS
            .iter()
            .map(|(phase, pattern)| {
                let re = Regex::new(&format!(r"(?i)\b(?:{pattern})\b"))
                    .expect("intent patterns are valid regexes");
                (*phase, re)
            })
            .collect()
    })
}

/// Phases whose phrases appear in `prompt`, in canonical phase order.
pub fn detect_intents(prompt: &str) -> Vec<Phase> {
    intent_res()
        .iter()
        .filter(|(_, re)| re.is_match(prompt))
        .map(|(phase, _)| *phase)
        .collect()
}
