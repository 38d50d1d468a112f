//! Conversation handling: small talk, sessions and the turn pipeline

pub mod orchestrator;
pub mod session;
pub mod small_talk;

pub use orchestrator::{combine, Orchestrator, SqlOutcome};
pub use session::{Session, SessionHandle, SessionStore};
pub use small_talk::SmallTalkDetector;
