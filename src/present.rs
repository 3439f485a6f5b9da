use minijinja::{Environment, context};
use tracing::debug;

use crate::phase::Phase;
use crate::recommend::Recommendation;

const TEMPLATE: &str = "\
<skill-advisor>
{% if phase_status %}
Phase status: {{ phase_status }}
{% endif %}
{% if primary %}
Suggested: {{ primary|join(\", \") }}
{% endif %}
{% if available %}
Also available: {{ available|join(\", \") }}
{% endif %}
{% if note %}
Note: {{ note }}
{% endif %}
</skill-advisor>";

/// Somewhere a single line of status can be shown to the user.
pub trait StatusSurface {
    fn set_status(&mut self, line: &str);
}

/// Render a recommendation as the tagged advisory block.
///
/// Returns `None` for an empty recommendation.
pub fn render(rec: &Recommendation) -> Option<String> {
    if rec.is_empty() {
        return None;
    }
    let commands =
        |phases: &[Phase]| -> Vec<String> { phases.iter().map(|p| p.command()).collect() };

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    let rendered = env.template_from_str(TEMPLATE).and_then(|tmpl| {
        tmpl.render(context! {
            phase_status => &rec.phase_status,
            primary => commands(&rec.primary),
            available => commands(&rec.available),
            note => &rec.note,
        })
    });
    match rendered {
        Ok(text) => Some(text),
        Err(err) => {
            debug!("rendering advisory block: {err:#}");
            None
        }
    }
}

/// The line shown on a status surface: the first primary suggestion only.
pub fn status_line(rec: &Recommendation) -> Option<String> {
    rec.primary.first().map(|p| format!("next: {}", p.command()))
}

/// Renders recommendations for one host session and drops a block that is
/// identical to the one shown on the previous turn.
#[derive(Debug, Default)]
pub struct Presenter {
    previous: Option<String>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with the block shown last, e.g. one kept between hook processes.
    pub fn with_previous(previous: Option<String>) -> Self {
        Self { previous }
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Render `rec` and return the block to emit, or `None` when there is
    /// nothing to say or the block repeats the previous one.
    pub fn present(
        &mut self,
        rec: &Recommendation,
        status: Option<&mut dyn StatusSurface>,
    ) -> Option<String> {
        let block = render(rec)?;
        if self.previous.as_deref() == Some(block.as_str()) {
            debug!("advisory unchanged since last turn, suppressing");
            return None;
        }
        self.previous = Some(block.clone());
        if let (Some(surface), Some(line)) = (status, status_line(rec)) {
            surface.set_status(&line);
        }
        Some(block)
    }
}
