//! Session state for multi-turn intake conversations.
//!
//! [`SessionStore`] owns every live conversation. It is an injected instance,
//! not a global: the caller constructs it, shares it behind an `Arc`, and
//! decides whether to run the [`spawn_sweeper`] loop.

pub mod clock;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{SessionSettings, SessionStats, SessionStore};
pub use sweeper::spawn_sweeper;
