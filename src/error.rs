//! Error types for EcoPay
//!
//! None of these are fatal to a session. Fact errors are swallowed by the
//! orchestrator and parse errors only reach the input surfaces.

use thiserror::Error;

/// Failure of the fact-generation collaborator
#[derive(Debug, Error)]
pub enum FactError {
    #[error("fact generation is not configured (missing API key)")]
    MissingCredentials,
    #[error("fact request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("fact service returned HTTP {status}")]
    Upstream { status: u16 },
    #[error("fact service returned no text")]
    EmptyResponse,
}

/// Failure to parse user input into a kiosk value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown language '{0}' (expected aze, eng or ru)")]
    UnknownLanguage(String),
    #[error("unknown material '{0}' (expected plastic or paper)")]
    UnknownMaterial(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{0}' needs an argument")]
    MissingArgument(&'static str),
}
