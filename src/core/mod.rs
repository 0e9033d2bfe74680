//! Core modules for EcoPay

pub mod api;
pub mod controller;
pub mod fact;
pub mod orchestrator;
pub mod session;

pub use api::{create_router, run_server};
pub use controller::KioskController;
pub use fact::{DisabledFactGenerator, FactGenerator, FactRequest, GeminiFactGenerator};
pub use orchestrator::{Orchestrator, SuccessResult};
pub use session::{Session, SessionMachine};
