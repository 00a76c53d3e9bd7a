//! Analysis run orchestration and the state built from it

pub mod orchestrator;
pub mod outcome;
pub mod session;
pub mod view;

pub use orchestrator::{AnalysisOrchestrator, AnalysisUpdate, MISSING_SYMBOL};
pub use outcome::AnalysisOutcome;
pub use session::AnalysisSession;
pub use view::{AnalysisView, InfoCard};
