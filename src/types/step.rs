//! Kiosk step definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The six screens of a kiosk session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Initial screen, language can be changed here
    #[default]
    Welcome,
    /// Waiting for the card tap
    ScanCard,
    /// Choosing plastic or paper
    SelectType,
    /// Counting deposited items
    Inserting,
    /// Fact call and floor timer in flight, no input accepted
    Processing,
    /// Points shown, resets to Welcome after the dwell time
    Success,
}

impl Step {
    /// Terminal color for this step
    pub fn color(&self) -> Color {
        match self {
            Step::Welcome => Color::BrightWhite,
            Step::ScanCard => Color::Cyan,
            Step::SelectType => Color::Blue,
            Step::Inserting => Color::Yellow,
            Step::Processing => Color::Magenta,
            Step::Success => Color::Green,
        }
    }

    /// Glyph for this step
    pub fn emoji(&self) -> &'static str {
        match self {
            Step::Welcome => "♻",
            Step::ScanCard => "💳",
            Step::SelectType => "🗂",
            Step::Inserting => "📥",
            Step::Processing => "⏳",
            Step::Success => "✅",
        }
    }

    /// Does this step accept user input at all?
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Step::Processing)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Welcome => "WELCOME",
            Step::ScanCard => "SCAN_CARD",
            Step::SelectType => "SELECT_TYPE",
            Step::Inserting => "INSERTING",
            Step::Processing => "PROCESSING",
            Step::Success => "SUCCESS",
        };
        write!(f, "{}", name)
    }
}
