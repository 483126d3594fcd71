//! The conversational intake agent.
//!
//! [`IntakeAgent`] is the per-turn control flow: classify the utterance,
//! extract fields, fold them into the session, rank when the session allows
//! it, and compose a reply.

pub mod intake;
pub mod reply;
pub mod scripted;

pub use intake::{IntakeAgent, TurnOutcome};
pub use scripted::ScriptedExtractor;
