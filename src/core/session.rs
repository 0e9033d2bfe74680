//! Session state machine
//!
//! Legal transitions:
//! - WELCOME: select_language → WELCOME, start → SCAN_CARD
//! - SCAN_CARD: card_detected → SELECT_TYPE
//! - SELECT_TYPE: choose_material → INSERTING (count reset)
//! - INSERTING: increment/decrement → INSERTING, confirm (count > 0) → PROCESSING
//! - PROCESSING: processing_done → SUCCESS
//! - SUCCESS: dwell_elapsed → WELCOME (reset)
//! - cancel → WELCOME (reset) from SCAN_CARD, SELECT_TYPE, INSERTING, SUCCESS
//!
//! Anything else is a no-op.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::core::fact::FactRequest;
use crate::types::{KioskEvent, Language, Material, ReasonCode, Step, StepOutput};

/// One user's in-progress interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub step: Step,
    pub language: Language,
    pub material: Material,
    pub count: u32,
    pub last_fact: Option<String>,
}

impl Session {
    /// Fresh session on the Welcome screen
    pub fn new(language: Language) -> Self {
        Self {
            step: Step::Welcome,
            language,
            material: Material::default(),
            count: 0,
            last_fact: None,
        }
    }

    /// Points for the current count and material
    pub fn points(&self) -> u64 {
        self.material.points_for(self.count)
    }
}

/// Owner of the single kiosk session
#[derive(Debug)]
pub struct SessionMachine {
    session: Session,
    /// Language restored on every reset
    default_language: Language,
    /// Bumped on every applied event
    generation: u64,
    /// Sessions that reached SUCCESS since start
    completed: u64,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl SessionMachine {
    /// Create a machine on the Welcome screen
    pub fn new(default_language: Language) -> Self {
        Self {
            session: Session::new(default_language),
            default_language,
            generation: 0,
            completed: 0,
        }
    }

    /// Apply an event and return the resulting view
    pub fn apply(&mut self, event: KioskEvent) -> StepOutput {
        let previous = self.session.step;
        let event_name = event.name();
        let reason = self.transition(event);

        if reason.is_ignored() {
            trace!(step = %previous, event = event_name, reason = reason.code(), "event ignored");
        } else {
            self.generation += 1;
            debug!(
                from = %previous,
                to = %self.session.step,
                event = event_name,
                reason = reason.code(),
                generation = self.generation,
                "transition applied"
            );
        }

        self.output(previous, reason)
    }

    /// Mutate the session for one event, return the reason
    fn transition(&mut self, event: KioskEvent) -> ReasonCode {
        let s = &mut self.session;
        match (s.step, event) {
            (Step::Welcome, KioskEvent::SelectLanguage(language)) => {
                s.language = language;
                ReasonCode::T001_LANGUAGE_SELECTED
            }
            (Step::Welcome, KioskEvent::Start) => {
                s.step = Step::ScanCard;
                ReasonCode::T002_SESSION_STARTED
            }
            (Step::ScanCard, KioskEvent::CardDetected) => {
                s.step = Step::SelectType;
                ReasonCode::T003_CARD_DETECTED
            }
            (Step::SelectType, KioskEvent::ChooseMaterial(material)) => {
                s.material = material;
                s.count = 0;
                s.step = Step::Inserting;
                ReasonCode::T004_MATERIAL_CHOSEN
            }
            (Step::Inserting, KioskEvent::Increment) => {
                s.count = s.count.saturating_add(1);
                ReasonCode::T005_COUNT_INCREMENTED
            }
            (Step::Inserting, KioskEvent::Decrement) => {
                if s.count == 0 {
                    ReasonCode::G002_COUNT_AT_FLOOR
                } else {
                    s.count -= 1;
                    ReasonCode::T006_COUNT_DECREMENTED
                }
            }
            (Step::Inserting, KioskEvent::Confirm) => {
                if s.count == 0 {
                    ReasonCode::G001_COUNT_ZERO
                } else {
                    s.step = Step::Processing;
                    ReasonCode::T007_CONFIRMED
                }
            }
            (Step::Processing, KioskEvent::ProcessingDone { fact }) => {
                s.last_fact = Some(fact);
                s.step = Step::Success;
                self.completed += 1;
                info!(
                    count = s.count,
                    material = %s.material,
                    points = s.points(),
                    "session completed"
                );
                ReasonCode::T008_PROCESSING_COMPLETE
            }
            (Step::Success, KioskEvent::DwellElapsed) => {
                self.reset();
                ReasonCode::T009_DWELL_ELAPSED
            }
            (
                Step::ScanCard | Step::SelectType | Step::Inserting | Step::Success,
                KioskEvent::Cancel,
            ) => {
                self.reset();
                ReasonCode::T010_CANCELLED
            }
            _ => ReasonCode::I001_NOT_VALID_FOR_STEP,
        }
    }

    /// Back to Welcome with default selections
    fn reset(&mut self) {
        self.session = Session::new(self.default_language);
    }

    fn output(&self, previous: Step, reason: ReasonCode) -> StepOutput {
        StepOutput {
            timestamp: Utc::now(),
            step: self.session.step,
            previous,
            language: self.session.language,
            material: self.session.material,
            count: self.session.count,
            points: self.session.points(),
            fact: self.session.last_fact.clone(),
            reason,
            generation: self.generation,
        }
    }

    /// Get current output without applying anything
    pub fn current_output(&self) -> StepOutput {
        self.report(ReasonCode::S001_STATE_REPORTED)
    }

    /// Current state with a caller-supplied reason
    pub fn report(&self, reason: ReasonCode) -> StepOutput {
        self.output(self.session.step, reason)
    }

    /// Inputs the orchestrator needs, by value
    pub fn fact_request(&self) -> FactRequest {
        FactRequest {
            count: self.session.count,
            material: self.session.material,
            language: self.session.language,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn points(&self) -> u64 {
        self.session.points()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_at_inserting(material: Material) -> SessionMachine {
        let mut machine = SessionMachine::new(Language::Aze);
        machine.apply(KioskEvent::Start);
        machine.apply(KioskEvent::CardDetected);
        machine.apply(KioskEvent::ChooseMaterial(material));
        machine
    }

    #[test]
    fn test_initial_state_is_welcome() {
        let machine = SessionMachine::new(Language::Ru);
        assert_eq!(machine.step(), Step::Welcome);
        assert_eq!(machine.session().language, Language::Ru);
        assert_eq!(machine.session().count, 0);
        assert_eq!(machine.session().last_fact, None);
    }

    #[test]
    fn test_language_only_changes_on_welcome() {
        let mut machine = SessionMachine::new(Language::Aze);
        let output = machine.apply(KioskEvent::SelectLanguage(Language::Eng));
        assert_eq!(output.language, Language::Eng);
        assert_eq!(output.reason, ReasonCode::T001_LANGUAGE_SELECTED);

        machine.apply(KioskEvent::Start);
        let output = machine.apply(KioskEvent::SelectLanguage(Language::Ru));
        assert_eq!(output.language, Language::Eng);
        assert_eq!(output.reason, ReasonCode::I001_NOT_VALID_FOR_STEP);
    }

    #[test]
    fn test_step_order_is_strict() {
        let mut machine = SessionMachine::new(Language::Aze);
        // Cannot skip ahead from Welcome
        assert!(machine.apply(KioskEvent::CardDetected).reason.is_ignored());
        assert!(machine
            .apply(KioskEvent::ChooseMaterial(Material::Paper))
            .reason
            .is_ignored());
        assert!(machine.apply(KioskEvent::Increment).reason.is_ignored());
        assert_eq!(machine.step(), Step::Welcome);

        machine.apply(KioskEvent::Start);
        assert!(machine.apply(KioskEvent::Increment).reason.is_ignored());
        assert_eq!(machine.step(), Step::ScanCard);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut machine = machine_at_inserting(Material::Plastic);
        let output = machine.apply(KioskEvent::Decrement);
        assert_eq!(output.count, 0);
        assert_eq!(output.reason, ReasonCode::G002_COUNT_AT_FLOOR);

        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Decrement);
        machine.apply(KioskEvent::Decrement);
        assert_eq!(machine.session().count, 0);
    }

    #[test]
    fn test_count_never_negative_over_sequences() {
        let sequences: [&[bool]; 4] = [
            &[false, false, true, false, false],
            &[true, true, false, false, false, true],
            &[false; 8],
            &[true, false, true, false, false, true, true],
        ];
        for sequence in sequences {
            let mut machine = machine_at_inserting(Material::Paper);
            let mut expected: i64 = 0;
            for &up in sequence {
                if up {
                    machine.apply(KioskEvent::Increment);
                    expected += 1;
                } else {
                    machine.apply(KioskEvent::Decrement);
                    expected = (expected - 1).max(0);
                }
                assert_eq!(i64::from(machine.session().count), expected);
            }
        }
    }

    #[test]
    fn test_points_follow_count_and_material() {
        let mut machine = machine_at_inserting(Material::Paper);
        for expected in 1..=4u64 {
            let output = machine.apply(KioskEvent::Increment);
            assert_eq!(output.points, expected * 5);
            assert_eq!(machine.points(), expected * 5);
        }

        let mut machine = machine_at_inserting(Material::Plastic);
        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Increment);
        assert_eq!(machine.points(), 20);
    }

    #[test]
    fn test_confirm_with_zero_count_is_noop() {
        let mut machine = machine_at_inserting(Material::Plastic);
        let generation = machine.generation();
        let output = machine.apply(KioskEvent::Confirm);
        assert_eq!(output.step, Step::Inserting);
        assert_eq!(output.reason, ReasonCode::G001_COUNT_ZERO);
        assert_eq!(machine.generation(), generation);
    }

    #[test]
    fn test_processing_accepts_only_completion() {
        let mut machine = machine_at_inserting(Material::Plastic);
        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Confirm);
        assert_eq!(machine.step(), Step::Processing);

        for event in [
            KioskEvent::Increment,
            KioskEvent::Decrement,
            KioskEvent::Confirm,
            KioskEvent::Cancel,
            KioskEvent::DwellElapsed,
        ] {
            assert!(machine.apply(event).reason.is_ignored());
        }
        assert_eq!(machine.session().count, 1);

        let output = machine.apply(KioskEvent::ProcessingDone {
            fact: "Nice work".to_string(),
        });
        assert_eq!(output.step, Step::Success);
        assert_eq!(output.fact_text(), "Nice work");
        assert_eq!(machine.completed(), 1);
    }

    #[test]
    fn test_dwell_resets_session() {
        let mut machine = SessionMachine::new(Language::Aze);
        machine.apply(KioskEvent::SelectLanguage(Language::Eng));
        machine.apply(KioskEvent::Start);
        machine.apply(KioskEvent::CardDetected);
        machine.apply(KioskEvent::ChooseMaterial(Material::Paper));
        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Confirm);
        machine.apply(KioskEvent::ProcessingDone {
            fact: String::new(),
        });

        let output = machine.apply(KioskEvent::DwellElapsed);
        assert_eq!(output.step, Step::Welcome);
        assert_eq!(output.reason, ReasonCode::T009_DWELL_ELAPSED);
        assert_eq!(machine.session(), &Session::new(Language::Aze));
    }

    #[test]
    fn test_cancel_edges() {
        let mut machine = SessionMachine::new(Language::Aze);
        // Not offered on Welcome
        assert!(machine.apply(KioskEvent::Cancel).reason.is_ignored());

        machine.apply(KioskEvent::Start);
        let output = machine.apply(KioskEvent::Cancel);
        assert_eq!(output.step, Step::Welcome);
        assert_eq!(output.reason, ReasonCode::T010_CANCELLED);

        let mut machine = machine_at_inserting(Material::Paper);
        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Cancel);
        assert_eq!(machine.step(), Step::Welcome);
        assert_eq!(machine.session().count, 0);
        assert_eq!(machine.session().material, Material::Plastic);
    }

    #[test]
    fn test_generation_bumps_only_on_applied_events() {
        let mut machine = SessionMachine::new(Language::Aze);
        assert_eq!(machine.generation(), 0);
        machine.apply(KioskEvent::Confirm);
        assert_eq!(machine.generation(), 0);
        machine.apply(KioskEvent::Start);
        assert_eq!(machine.generation(), 1);
        machine.apply(KioskEvent::Start);
        assert_eq!(machine.generation(), 1);
    }

    #[test]
    fn test_fact_request_snapshot() {
        let mut machine = machine_at_inserting(Material::Paper);
        machine.apply(KioskEvent::Increment);
        machine.apply(KioskEvent::Increment);
        let request = machine.fact_request();
        assert_eq!(request.count, 2);
        assert_eq!(request.material, Material::Paper);
        assert_eq!(request.language, Language::Aze);
    }
}
