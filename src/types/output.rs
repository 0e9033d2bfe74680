//! Output structures for display and the API

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{Language, Material, ReasonCode, Step};

/// View of the session after an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current step
    pub step: Step,
    /// Step before the event
    pub previous: Step,
    pub language: Language,
    pub material: Material,
    pub count: u32,
    /// Always count × rate(material), never stored
    pub points: u64,
    /// Fact from the last completed processing, may be empty
    pub fact: Option<String>,
    /// Why the state is what it is
    pub reason: ReasonCode,
    /// Transition generation after the event
    pub generation: u64,
}

impl StepOutput {
    /// Did the step change with this event?
    pub fn step_changed(&self) -> bool {
        self.step != self.previous
    }

    /// Fact text, empty when none was fetched
    pub fn fact_text(&self) -> &str {
        self.fact.as_deref().unwrap_or("")
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{} {} | lang={} | {} x{} = {} pts | {}",
            self.step.emoji(),
            self.step,
            self.language,
            self.material,
            self.count,
            self.points,
            self.reason.code()
        )
        .color(self.step.color())
        .to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "step={} | lang={} | material={} | count={} | points={} | reason={}",
            self.step,
            self.language.code(),
            self.material,
            self.count,
            self.points,
            self.reason.code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionMachine;
    use crate::types::KioskEvent;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parseable_string() {
        let mut machine = SessionMachine::new(Language::Eng);
        machine.apply(KioskEvent::Start);
        machine.apply(KioskEvent::CardDetected);
        machine.apply(KioskEvent::ChooseMaterial(Material::Paper));
        let output = machine.apply(KioskEvent::Increment);

        assert_eq!(
            output.to_parseable_string(),
            "step=INSERTING | lang=eng | material=paper | count=1 | points=5 | reason=T005_COUNT_INCREMENTED"
        );
    }
}
