//! Core types for EcoPay

mod event;
mod language;
mod material;
mod output;
mod reason;
mod step;
mod translation;

pub use event::{KioskEvent, UserEvent};
pub use language::Language;
pub use material::Material;
pub use output::StepOutput;
pub use reason::ReasonCode;
pub use step::Step;
pub use translation::{texts, Translation};
