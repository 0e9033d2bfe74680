//! Reason codes for transitions, guard refusals and ignored events

use serde::{Deserialize, Serialize};

/// Reason attached to every state machine output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // T: Applied transitions
    // =========================================================================
    /// Language changed on the Welcome screen
    T001_LANGUAGE_SELECTED,
    /// Session started, waiting for card
    T002_SESSION_STARTED,
    /// Card read, choose material
    T003_CARD_DETECTED,
    /// Material chosen, count reset
    T004_MATERIAL_CHOSEN,
    /// One more item counted
    T005_COUNT_INCREMENTED,
    /// One item removed
    T006_COUNT_DECREMENTED,
    /// Deposit confirmed, processing
    T007_CONFIRMED,
    /// Processing finished, points shown
    T008_PROCESSING_COMPLETE,
    /// Success dwell elapsed, session reset
    T009_DWELL_ELAPSED,
    /// Session cancelled, reset
    T010_CANCELLED,

    // =========================================================================
    // G: Guards
    // =========================================================================
    /// Confirm refused, nothing counted
    G001_COUNT_ZERO,
    /// Decrement clamped at zero
    G002_COUNT_AT_FLOOR,

    // =========================================================================
    // I: Ignored
    // =========================================================================
    /// Event not valid for the current step
    I001_NOT_VALID_FOR_STEP,

    // =========================================================================
    // P: Pending
    // =========================================================================
    /// Card tapped, detection scheduled
    P001_CARD_READING,

    // =========================================================================
    // S: Status
    // =========================================================================
    /// No event, current state reported
    S001_STATE_REPORTED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::T001_LANGUAGE_SELECTED => "T001_LANGUAGE_SELECTED",
            Self::T002_SESSION_STARTED => "T002_SESSION_STARTED",
            Self::T003_CARD_DETECTED => "T003_CARD_DETECTED",
            Self::T004_MATERIAL_CHOSEN => "T004_MATERIAL_CHOSEN",
            Self::T005_COUNT_INCREMENTED => "T005_COUNT_INCREMENTED",
            Self::T006_COUNT_DECREMENTED => "T006_COUNT_DECREMENTED",
            Self::T007_CONFIRMED => "T007_CONFIRMED",
            Self::T008_PROCESSING_COMPLETE => "T008_PROCESSING_COMPLETE",
            Self::T009_DWELL_ELAPSED => "T009_DWELL_ELAPSED",
            Self::T010_CANCELLED => "T010_CANCELLED",
            Self::G001_COUNT_ZERO => "G001_COUNT_ZERO",
            Self::G002_COUNT_AT_FLOOR => "G002_COUNT_AT_FLOOR",
            Self::I001_NOT_VALID_FOR_STEP => "I001_NOT_VALID_FOR_STEP",
            Self::P001_CARD_READING => "P001_CARD_READING",
            Self::S001_STATE_REPORTED => "S001_STATE_REPORTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::T001_LANGUAGE_SELECTED => "Language selected",
            Self::T002_SESSION_STARTED => "Session started",
            Self::T003_CARD_DETECTED => "Card detected",
            Self::T004_MATERIAL_CHOSEN => "Material chosen",
            Self::T005_COUNT_INCREMENTED => "Item added",
            Self::T006_COUNT_DECREMENTED => "Item removed",
            Self::T007_CONFIRMED => "Deposit confirmed",
            Self::T008_PROCESSING_COMPLETE => "Points credited",
            Self::T009_DWELL_ELAPSED => "Returning to welcome screen",
            Self::T010_CANCELLED => "Session cancelled",
            Self::G001_COUNT_ZERO => "Nothing to confirm",
            Self::G002_COUNT_AT_FLOOR => "Count already zero",
            Self::I001_NOT_VALID_FOR_STEP => "Not available on this screen",
            Self::P001_CARD_READING => "Reading card",
            Self::S001_STATE_REPORTED => "Current state",
        }
    }

    /// Did the event leave the session untouched?
    ///
    /// `G002_COUNT_AT_FLOOR` is a legal decrement that clamps, so it counts
    /// as applied. `P001_CARD_READING` changes nothing until the read completes.
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            Self::G001_COUNT_ZERO
                | Self::I001_NOT_VALID_FOR_STEP
                | Self::P001_CARD_READING
                | Self::S001_STATE_REPORTED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
