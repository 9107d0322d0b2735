//! Brio Common - conversational core for getting unstuck on creative work.
//!
//! Pure, deterministic pieces: text classifiers, protocol catalog, week
//! tracker, the brain state machine, and long-term memory with its stores.
//! No I/O happens here except in `store`.
//! v0.1.0: Two-classifier analysis, resumable 7-day protocol.

pub mod blockage;
pub mod brain;
pub mod clock;
pub mod context;
pub mod error;
pub mod memory;
pub mod mental;
pub mod protocol;
pub mod store;
pub mod week;

pub use blockage::{BlockageId, ProblemScale, ScoredBlockage, TextAnalysis};
pub use brain::{Brain, BrainAction, BrainResponse};
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{Choice, ContextPatch, Feedback, ProtocolVote, SessionContext, Step, TurnInput};
pub use error::{BrioError, Result};
pub use memory::{LongTermMemory, Outcome, SessionRecord};
pub use mental::MentalState;
pub use protocol::{Protocol, ProtocolState, WEEK_PROTOCOL_ID};
pub use store::{InMemoryStore, JsonFileStore, MemoryStore};
pub use week::WeekState;
