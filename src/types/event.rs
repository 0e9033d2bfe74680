//! Events driving the kiosk
//!
//! `UserEvent` is what an input surface (terminal, HTTP) can send.
//! `KioskEvent` is what the session state machine consumes; timers and the
//! orchestrator produce the events a user cannot send directly.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::{Language, Material};

/// Event consumed by the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskEvent {
    SelectLanguage(Language),
    Start,
    /// Fired by the card-read timer, not by the user
    CardDetected,
    ChooseMaterial(Material),
    Increment,
    Decrement,
    Confirm,
    /// Fired when the orchestrator resolves; fact may be empty
    ProcessingDone { fact: String },
    /// Fired by the success dwell timer
    DwellElapsed,
    Cancel,
}

impl KioskEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            KioskEvent::SelectLanguage(_) => "select_language",
            KioskEvent::Start => "start",
            KioskEvent::CardDetected => "card_detected",
            KioskEvent::ChooseMaterial(_) => "choose_material",
            KioskEvent::Increment => "increment",
            KioskEvent::Decrement => "decrement",
            KioskEvent::Confirm => "confirm",
            KioskEvent::ProcessingDone { .. } => "processing_done",
            KioskEvent::DwellElapsed => "dwell_elapsed",
            KioskEvent::Cancel => "cancel",
        }
    }
}

/// Discrete input offered by the kiosk screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UserEvent {
    SelectLanguage { language: Language },
    Start,
    /// Simulated card tap; detection follows after the card-read delay
    TapCard,
    ChooseMaterial { material: Material },
    Increment,
    Decrement,
    Confirm,
    Cancel,
}

impl UserEvent {
    /// Parse a terminal command such as `lang eng`, `tap`, `plastic`, `+`
    pub fn parse_command(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(ParseError::UnknownCommand(String::new()));
        };
        let arg = parts.next();

        match head.to_ascii_lowercase().as_str() {
            "lang" | "language" => {
                let language = arg.ok_or(ParseError::MissingArgument("lang"))?.parse()?;
                Ok(UserEvent::SelectLanguage { language })
            }
            "start" => Ok(UserEvent::Start),
            "tap" | "card" | "scan" => Ok(UserEvent::TapCard),
            "material" => {
                let material = arg.ok_or(ParseError::MissingArgument("material"))?.parse()?;
                Ok(UserEvent::ChooseMaterial { material })
            }
            "plastic" => Ok(UserEvent::ChooseMaterial {
                material: Material::Plastic,
            }),
            "paper" => Ok(UserEvent::ChooseMaterial {
                material: Material::Paper,
            }),
            "+" | "inc" | "add" => Ok(UserEvent::Increment),
            "-" | "dec" | "remove" => Ok(UserEvent::Decrement),
            "confirm" | "ok" => Ok(UserEvent::Confirm),
            "cancel" | "back" => Ok(UserEvent::Cancel),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

impl From<UserEvent> for KioskEvent {
    /// Direct mapping. `TapCard` maps to `CardDetected`; the controller
    /// delays it instead of applying it immediately.
    fn from(event: UserEvent) -> Self {
        match event {
            UserEvent::SelectLanguage { language } => KioskEvent::SelectLanguage(language),
            UserEvent::Start => KioskEvent::Start,
            UserEvent::TapCard => KioskEvent::CardDetected,
            UserEvent::ChooseMaterial { material } => KioskEvent::ChooseMaterial(material),
            UserEvent::Increment => KioskEvent::Increment,
            UserEvent::Decrement => KioskEvent::Decrement,
            UserEvent::Confirm => KioskEvent::Confirm,
            UserEvent::Cancel => KioskEvent::Cancel,
        }
    }
}
