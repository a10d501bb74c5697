//! Assessment orchestration.

mod engine;

pub use engine::{Assessment, RiskLevel, RiskService};
