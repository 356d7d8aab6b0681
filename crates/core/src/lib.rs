#![forbid(unsafe_code)]

//! Domain model and decision engines for the Smart Restart learning core.
//!
//! Everything here is synchronous and pure: engines take the state they need
//! as arguments and return plain values. Mutation and sequencing live in the
//! `services` crate.

pub mod badges;
pub mod confidence;
pub mod decision;
pub mod model;
pub mod settings;
pub mod time;

pub use badges::{BadgeStats, evaluate_badges};
pub use confidence::{ConfidenceLevel, ConfidenceResult, compute_confidence, review_questions};
pub use decision::{DecisionEngine, DecisionInput, active_course};
pub use settings::{EngineSettings, SettingsError};
pub use time::Clock;
