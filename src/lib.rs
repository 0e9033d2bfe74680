//! EcoPay: simulated self-service recycling kiosk
//!
//! Welcome → ScanCard → SelectType → Inserting → Processing → Success → Welcome

pub mod config;
pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// POINT RATES
// =============================================================================

/// Points awarded per plastic item
pub const POINTS_PER_PLASTIC: u32 = 10;

/// Points awarded per paper item
pub const POINTS_PER_PAPER: u32 = 5;

// =============================================================================
// TIMINGS - defaults, overridable in config
// =============================================================================

/// Simulated card-read latency before the card counts as detected (milliseconds)
pub const CARD_READ_DELAY_MS: u64 = 800;

/// Minimum time the Processing screen stays up (milliseconds)
/// Applies even when the fact arrives instantly
pub const PROCESSING_FLOOR_MS: u64 = 2000;

/// Time on the Success screen before the kiosk resets (milliseconds)
/// 8 seconds - enough to read the fact
pub const SUCCESS_DWELL_MS: u64 = 8000;

// =============================================================================
// FACT GENERATION
// =============================================================================

/// Upper bound on fact length requested from the model
pub const FACT_MAX_WORDS: usize = 20;

/// Default text-generation model
pub const DEFAULT_FACT_MODEL: &str = "gemini-2.5-flash";

/// Default text-generation endpoint
pub const DEFAULT_FACT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";
