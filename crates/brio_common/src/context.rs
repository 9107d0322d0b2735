//! Per-session conversation context.
//!
//! The context is owned by the caller. The brain never mutates it directly:
//! each turn returns a `ContextPatch` that the caller applies whole.

use crate::blockage::{BlockageId, ProblemScale, TextAnalysis};
use crate::mental::MentalState;
use crate::protocol::ProtocolState;
use crate::week::WeekState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation states. Every transition lands on one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Welcome,
    ReturningWeek,
    FreeInput,
    SuggestBlockage,
    ChooseBlockage,
    ShowExercise,
    UserResponse,
    ProtocolStep,
    ProtocolOffer,
    IdeasOffer,
    Feedback,
    NextAction,
    End,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::ReturningWeek => "returning_week",
            Step::FreeInput => "free_input",
            Step::SuggestBlockage => "suggest_blockage",
            Step::ChooseBlockage => "choose_blockage",
            Step::ShowExercise => "show_exercise",
            Step::UserResponse => "user_response",
            Step::ProtocolStep => "protocol_step",
            Step::ProtocolOffer => "protocol_offer",
            Step::IdeasOffer => "ideas_offer",
            Step::Feedback => "feedback",
            Step::NextAction => "next_action",
            Step::End => "end",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Yes/no answer to "did this help?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Yes,
    No,
}

/// A yes/no answer given right after a protocol finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVote {
    pub protocol_id: String,
    pub feedback: Feedback,
}

/// A discrete user choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Yes,
    No,
    Another,
    Deepen,
    End,
    Blockage(BlockageId),
}

impl Choice {
    /// Interpret a typed answer. Unknown text is not a choice.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().trim_end_matches(['.', '!']).to_lowercase();
        let choice = match lowered.as_str() {
            "sí" | "si" | "s" | "vale" | "claro" | "yes" | "y" => Choice::Yes,
            "no" | "n" | "nop" => Choice::No,
            "otra" | "otro" | "otra técnica" | "otra tecnica" | "another" => Choice::Another,
            "profundizar" | "más" | "mas" | "deepen" => Choice::Deepen,
            "terminar" | "fin" | "salir" | "adiós" | "adios" | "end" => Choice::End,
            other => return BlockageId::parse(other).map(Choice::Blockage),
        };
        Some(choice)
    }

    pub fn feedback(&self) -> Option<Feedback> {
        match self {
            Choice::Yes => Some(Feedback::Yes),
            Choice::No => Some(Feedback::No),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Choice::Yes => "sí",
            Choice::No => "no",
            Choice::Another => "otra",
            Choice::Deepen => "profundizar",
            Choice::End => "terminar",
            Choice::Blockage(b) => b.label(),
        }
    }
}

/// What the user sent this turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnInput {
    pub text: Option<String>,
    pub choice: Option<Choice>,
}

impl TurnInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            choice: None,
        }
    }

    pub fn choice(choice: Choice) -> Self {
        Self {
            text: None,
            choice: Some(choice),
        }
    }

    /// A raw typed line: kept as text and also read as a choice when it is one
    pub fn line(line: &str) -> Self {
        Self {
            text: Some(line.to_string()),
            choice: Choice::parse(line),
        }
    }

    /// Trimmed text, `None` when missing or blank
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Explicit choice, falling back to parsing the text
    pub fn resolved_choice(&self) -> Option<Choice> {
        self.choice
            .or_else(|| self.text.as_deref().and_then(Choice::parse))
    }
}

/// Transient per-session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub started_at: DateTime<Utc>,
    pub step: Step,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub mental: MentalState,
    #[serde(default)]
    pub candidates: Vec<BlockageId>,
    #[serde(default)]
    pub blockage_id: Option<BlockageId>,
    #[serde(default)]
    pub problem_scale: Option<ProblemScale>,
    #[serde(default)]
    pub detected_topic: Option<String>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub helpful_no_count: u32,
    #[serde(default)]
    pub last_technique_id: Option<String>,
    #[serde(default)]
    pub protocol: Option<ProtocolState>,
    #[serde(default)]
    pub has_completed_protocol: bool,
    #[serde(default)]
    pub last_feedback: Option<Feedback>,
    /// Protocol whose verdict the next yes/no answer gives
    #[serde(default)]
    pub pending_protocol_feedback: Option<String>,
    #[serde(default)]
    pub protocol_votes: Vec<ProtocolVote>,
    #[serde(default)]
    pub week: Option<WeekState>,
}

impl SessionContext {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            step: Step::Welcome,
            raw_text: None,
            mental: MentalState::default(),
            candidates: Vec::new(),
            blockage_id: None,
            problem_scale: None,
            detected_topic: None,
            attempts: 0,
            helpful_no_count: 0,
            last_technique_id: None,
            protocol: None,
            has_completed_protocol: false,
            last_feedback: None,
            pending_protocol_feedback: None,
            protocol_votes: Vec::new(),
            week: None,
        }
    }

    /// Start a session that knows about an in-progress week
    pub fn with_week(mut self, week: Option<WeekState>) -> Self {
        self.week = week;
        self
    }

    /// Apply a patch in full
    pub fn apply(&mut self, patch: ContextPatch) {
        patch.apply_to(self);
    }
}

/// Field updates produced by one brain turn.
///
/// `None` leaves a field alone. Clearable fields use `Option<Option<T>>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPatch {
    pub step: Option<Step>,
    pub raw_text: Option<String>,
    pub mental: Option<MentalState>,
    pub candidates: Option<Vec<BlockageId>>,
    pub blockage_id: Option<BlockageId>,
    pub problem_scale: Option<ProblemScale>,
    pub detected_topic: Option<Option<String>>,
    pub attempts: Option<u32>,
    pub helpful_no_count: Option<u32>,
    pub last_technique_id: Option<String>,
    pub protocol: Option<ProtocolState>,
    pub has_completed_protocol: Option<bool>,
    pub last_feedback: Option<Option<Feedback>>,
    pub pending_protocol_feedback: Option<Option<String>>,
    /// Appended to `protocol_votes`
    pub protocol_vote: Option<ProtocolVote>,
    pub week: Option<Option<WeekState>>,
}

impl ContextPatch {
    /// Patch that only moves to `step`
    pub fn to(step: Step) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    /// Patch that changes nothing (re-prompt in place)
    pub fn stay() -> Self {
        Self::default()
    }

    /// Store the classifier outputs for the opening text
    pub fn with_analysis(mut self, text: &str, analysis: TextAnalysis) -> Self {
        self.raw_text = Some(text.to_string());
        self.mental = Some(analysis.mental);
        self.candidates = Some(analysis.candidates);
        self.problem_scale = Some(analysis.scale);
        self.detected_topic = Some(analysis.topic);
        self
    }

    fn apply_to(self, ctx: &mut SessionContext) {
        if let Some(step) = self.step {
            ctx.step = step;
        }
        if let Some(raw_text) = self.raw_text {
            ctx.raw_text = Some(raw_text);
        }
        if let Some(mental) = self.mental {
            ctx.mental = mental;
        }
        if let Some(candidates) = self.candidates {
            ctx.candidates = candidates;
        }
        if let Some(blockage_id) = self.blockage_id {
            ctx.blockage_id = Some(blockage_id);
        }
        if let Some(scale) = self.problem_scale {
            ctx.problem_scale = Some(scale);
        }
        if let Some(topic) = self.detected_topic {
            ctx.detected_topic = topic;
        }
        if let Some(attempts) = self.attempts {
            ctx.attempts = attempts;
        }
        if let Some(count) = self.helpful_no_count {
            ctx.helpful_no_count = count;
        }
        if let Some(technique) = self.last_technique_id {
            ctx.last_technique_id = Some(technique);
        }
        if let Some(protocol) = self.protocol {
            ctx.protocol = Some(protocol);
        }
        if let Some(done) = self.has_completed_protocol {
            ctx.has_completed_protocol = done;
        }
        if let Some(feedback) = self.last_feedback {
            ctx.last_feedback = feedback;
        }
        if let Some(pending) = self.pending_protocol_feedback {
            ctx.pending_protocol_feedback = pending;
        }
        if let Some(vote) = self.protocol_vote {
            ctx.protocol_votes.push(vote);
        }
        if let Some(week) = self.week {
            ctx.week = week;
        }
    }
}
