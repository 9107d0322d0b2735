//! Brain output types.

use crate::blockage::{BlockageId, ProblemScale};
use crate::context::{Choice, ContextPatch};
use crate::memory::Outcome;
use serde::Serialize;

/// What the caller should do after a turn. Closed set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrainAction {
    AskFreeInput,
    SuggestBlockage {
        candidates: Vec<BlockageId>,
        scale: ProblemScale,
    },
    AskBlockage {
        options: Vec<BlockageId>,
    },
    FetchExercise {
        blockage_id: BlockageId,
        last_technique_id: Option<String>,
    },
    StartProtocol {
        protocol_id: String,
        resumed: bool,
        expects_input: bool,
    },
    ProtocolStep {
        protocol_id: String,
        step_index: usize,
        expects_input: bool,
    },
    AskUserResponse,
    AskFeedback {
        /// Generate ideas for this topic before asking
        ideas_topic: Option<String>,
    },
    OfferNext {
        options: Vec<Choice>,
    },
    EndSession {
        outcome: Outcome,
    },
}

impl BrainAction {
    pub fn kind(&self) -> &'static str {
        match self {
            BrainAction::AskFreeInput => "ASK_FREE_INPUT",
            BrainAction::SuggestBlockage { .. } => "SUGGEST_BLOCKAGE",
            BrainAction::AskBlockage { .. } => "ASK_BLOCKAGE",
            BrainAction::FetchExercise { .. } => "FETCH_EXERCISE",
            BrainAction::StartProtocol { .. } => "START_PROTOCOL",
            BrainAction::ProtocolStep { .. } => "PROTOCOL_STEP",
            BrainAction::AskUserResponse => "ASK_USER_RESPONSE",
            BrainAction::AskFeedback { .. } => "ASK_FEEDBACK",
            BrainAction::OfferNext { .. } => "OFFER_NEXT",
            BrainAction::EndSession { .. } => "END_SESSION",
        }
    }

    /// Protocol step that should be advanced without user input
    pub fn is_auto_advance(&self) -> bool {
        matches!(
            self,
            BrainAction::StartProtocol { expects_input: false, .. }
                | BrainAction::ProtocolStep { expects_input: false, .. }
        )
    }
}

/// Result of one brain turn
#[derive(Debug, Clone, PartialEq)]
pub struct BrainResponse {
    /// At most two lines
    pub messages: Vec<String>,
    pub action: BrainAction,
    pub patch: ContextPatch,
}
