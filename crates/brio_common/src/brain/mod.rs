//! Brio's brain: the conversation state machine (v0.1.0).
//!
//! `Brain::transition` takes the current context and this turn's input and
//! returns messages, one action for the caller, and a context patch. It
//! never fails: missing input re-prompts in place, and anything it cannot
//! make sense of ends the session with a closing message.
//!
//! Randomness (protocol selection) and time (week resumption) are injected
//! so a seeded brain with a fixed clock is fully deterministic.

pub mod action;
pub mod tone;

pub use action::{BrainAction, BrainResponse};
pub use tone::{Bundle, Phrase, Tone, MAX_LINES};

use crate::blockage::{score_blockage, BlockageId, TextAnalysis};
use crate::clock::{Clock, SystemClock};
use crate::context::{
    Choice, ContextPatch, Feedback, ProtocolVote, SessionContext, Step, TurnInput,
};
use crate::memory::Outcome;
use crate::protocol::{self, select_protocol, Protocol, ProtocolState, WEEK_PROTOCOL_ID};
use crate::week::{self, day_for_deliverable, Resumption, WeekState, DAYS_IN_WEEK};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// "No" answers in a row before the session is closed
pub const MAX_HELPFUL_NO: u32 = 3;
/// Exercise attempts before a "no" closes the session
pub const MAX_ATTEMPTS: u32 = 4;

const PROJECT_TITLE_MAX_CHARS: usize = 60;
const DEFAULT_PROJECT_TITLE: &str = "Mi proyecto";

fn respond(messages: Vec<String>, action: BrainAction, patch: ContextPatch) -> BrainResponse {
    BrainResponse {
        messages,
        action,
        patch,
    }
}

fn yes_no() -> Vec<Choice> {
    vec![Choice::Yes, Choice::No]
}

fn blockage_menu() -> String {
    BlockageId::ALL
        .iter()
        .enumerate()
        .map(|(i, b)| format!("{}) {}", i + 1, b.label()))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn candidate_labels(candidates: &[BlockageId]) -> String {
    candidates
        .iter()
        .map(|b| b.label())
        .collect::<Vec<_>>()
        .join(" · ")
}

pub struct Brain<C: Clock = SystemClock> {
    rng: StdRng,
    clock: C,
}

impl Brain<SystemClock> {
    /// Brain with system time and an entropy-seeded RNG
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Brain<C> {
    pub fn new(clock: C) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            clock,
        }
    }

    /// Deterministic protocol selection
    pub fn with_seed(clock: C, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one turn of the conversation.
    pub fn transition(&mut self, ctx: &SessionContext, input: &TurnInput) -> BrainResponse {
        let tone = Tone::from_mental(&ctx.mental);
        let response = match ctx.step {
            Step::Welcome => self.welcome(ctx, tone),
            Step::ReturningWeek => self.returning_week(ctx, input, tone),
            Step::FreeInput => self.free_input(input, tone),
            Step::SuggestBlockage => self.suggest_blockage(ctx, input, tone),
            Step::ChooseBlockage => self.choose_blockage(ctx, input, tone),
            Step::ShowExercise => self.show_exercise(tone),
            Step::UserResponse => self.user_response(ctx, input, tone),
            Step::ProtocolStep => self.protocol_step(ctx, input, tone),
            Step::ProtocolOffer => self.protocol_offer(ctx, input, tone),
            Step::IdeasOffer => self.ideas_offer(ctx, input, tone),
            Step::Feedback => self.feedback(ctx, input, tone),
            Step::NextAction => self.next_action(ctx, input, tone),
            Step::End => self.end(ctx, tone),
        };

        debug!(
            from = %ctx.step,
            to = %response.patch.step.unwrap_or(ctx.step),
            action = response.action.kind(),
            "brain transition"
        );
        response
    }

    // === Opening ===

    fn welcome(&self, ctx: &SessionContext, tone: Tone) -> BrainResponse {
        match week::resumption(ctx.week.as_ref(), self.clock.now()) {
            Resumption::Silent { step_index, .. } => self.resume_week(ctx, tone, step_index),
            Resumption::AskConsent { .. } => respond(
                Bundle::new(tone).say(Phrase::AskResumeWeek).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch::to(Step::ReturningWeek),
            ),
            Resumption::None => self.ask_free_input(tone),
        }
    }

    fn ask_free_input(&self, tone: Tone) -> BrainResponse {
        respond(
            Bundle::new(tone).say(Phrase::Opening).finish(),
            BrainAction::AskFreeInput,
            ContextPatch::to(Step::FreeInput),
        )
    }

    fn returning_week(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        match input.resolved_choice() {
            Some(Choice::Yes) => match ctx.week.as_ref() {
                Some(w) if w.is_in_progress() => {
                    self.resume_week(ctx, tone, week::day_start_step(w.current_day))
                }
                _ => self.ask_free_input(tone),
            },
            Some(Choice::No) | Some(Choice::End) => self.ask_free_input(tone),
            _ => respond(
                Bundle::new(tone).say(Phrase::AskResumeWeek).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch::stay(),
            ),
        }
    }

    fn resume_week(&self, ctx: &SessionContext, tone: Tone, step_index: usize) -> BrainResponse {
        let Some(protocol) = protocol::find(WEEK_PROTOCOL_ID) else {
            return self.ask_free_input(tone);
        };
        let Some(step) = protocol.step(step_index) else {
            return self.ask_free_input(tone);
        };
        let state = ProtocolState::at(protocol, step_index);
        debug!(
            step_index,
            title = ctx.week.as_ref().map(|w| w.project_title.as_str()),
            "resuming week"
        );

        respond(
            Bundle::new(tone).say(Phrase::ResumeDay).line(step.text()).finish(),
            BrainAction::StartProtocol {
                protocol_id: protocol.id.to_string(),
                resumed: true,
                expects_input: step.expects_input(),
            },
            ContextPatch {
                protocol: Some(state),
                ..ContextPatch::to(Step::ProtocolStep)
            },
        )
    }

    fn free_input(&self, input: &TurnInput, tone: Tone) -> BrainResponse {
        let Some(text) = input.non_empty_text() else {
            return respond(
                Bundle::new(tone).say(Phrase::EmptyText).finish(),
                BrainAction::AskFreeInput,
                ContextPatch::stay(),
            );
        };

        let analysis = TextAnalysis::of(text);
        let tone = Tone::from_mental(&analysis.mental);
        let messages = Bundle::new(tone)
            .say(Phrase::Suggest)
            .line(candidate_labels(&analysis.candidates))
            .finish();
        let action = BrainAction::SuggestBlockage {
            candidates: analysis.candidates.clone(),
            scale: analysis.scale,
        };
        respond(
            messages,
            action,
            ContextPatch::to(Step::SuggestBlockage).with_analysis(text, analysis),
        )
    }

    // === Blockage selection ===

    fn suggest_blockage(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        let chosen = match input.resolved_choice() {
            Some(Choice::Blockage(b)) => Some(b),
            Some(Choice::Yes) => ctx.candidates.first().copied(),
            Some(Choice::No) => return self.ask_blockage(tone, Step::ChooseBlockage),
            _ => None,
        };

        match chosen.or(ctx.blockage_id) {
            Some(blockage) => self.fetch_exercise(ctx, tone, blockage, Phrase::ExerciseComing),
            None => {
                let mut response = self.ask_blockage(tone, Step::SuggestBlockage);
                response.patch = ContextPatch::stay();
                response
            }
        }
    }

    fn choose_blockage(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        let chosen = match input.resolved_choice() {
            Some(Choice::Blockage(b)) => Some(b),
            _ => input
                .non_empty_text()
                .and_then(score_blockage)
                .map(|scored| scored.blockage),
        };

        match chosen.or(ctx.blockage_id) {
            Some(blockage) => self.fetch_exercise(ctx, tone, blockage, Phrase::ExerciseComing),
            None => {
                let mut response = self.ask_blockage(tone, Step::ChooseBlockage);
                response.patch = ContextPatch::stay();
                response
            }
        }
    }

    fn ask_blockage(&self, tone: Tone, next: Step) -> BrainResponse {
        respond(
            Bundle::new(tone).say(Phrase::AskBlockage).line(blockage_menu()).finish(),
            BrainAction::AskBlockage {
                options: BlockageId::ALL.to_vec(),
            },
            ContextPatch::to(next),
        )
    }

    // === Single-shot exercises ===

    fn fetch_exercise(
        &self,
        ctx: &SessionContext,
        tone: Tone,
        blockage: BlockageId,
        intro: Phrase,
    ) -> BrainResponse {
        respond(
            Bundle::new(tone).say(intro).finish(),
            BrainAction::FetchExercise {
                blockage_id: blockage,
                last_technique_id: ctx.last_technique_id.clone(),
            },
            ContextPatch {
                blockage_id: Some(blockage),
                ..ContextPatch::to(Step::ShowExercise)
            },
        )
    }

    fn show_exercise(&self, tone: Tone) -> BrainResponse {
        respond(
            Bundle::new(tone).say(Phrase::AskResponse).finish(),
            BrainAction::AskUserResponse,
            ContextPatch::to(Step::UserResponse),
        )
    }

    fn user_response(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        if input.non_empty_text().is_none() {
            return respond(
                Bundle::new(tone).say(Phrase::AskResponse).finish(),
                BrainAction::AskUserResponse,
                ContextPatch::stay(),
            );
        }

        respond(
            Bundle::new(tone).say(Phrase::AskFeedback).finish(),
            BrainAction::AskFeedback { ideas_topic: None },
            ContextPatch {
                attempts: Some(ctx.attempts.saturating_add(1)),
                ..ContextPatch::to(Step::Feedback)
            },
        )
    }

    // === Feedback and what comes next ===

    fn feedback(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        match input.resolved_choice().and_then(|c| c.feedback()) {
            Some(Feedback::No) => {
                let helpful_no_count = ctx.helpful_no_count.saturating_add(1);
                let counters = ContextPatch {
                    helpful_no_count: Some(helpful_no_count),
                    ..recorded_feedback(ctx, Feedback::No)
                };

                if helpful_no_count >= MAX_HELPFUL_NO || ctx.attempts >= MAX_ATTEMPTS {
                    debug!(helpful_no_count, attempts = ctx.attempts, "guardrail reached");
                    return respond(
                        Bundle::new(tone).say(Phrase::Guardrail).finish(),
                        BrainAction::EndSession {
                            outcome: Outcome::NotHelpful,
                        },
                        ContextPatch {
                            step: Some(Step::End),
                            ..counters
                        },
                    );
                }

                let mut response = match ctx.blockage_id {
                    Some(blockage) => self.fetch_exercise(ctx, tone, blockage, Phrase::TryAnother),
                    None => self.ask_blockage(tone, Step::ChooseBlockage),
                };
                response.patch = ContextPatch {
                    step: response.patch.step,
                    blockage_id: response.patch.blockage_id,
                    ..counters
                };
                response
            }
            Some(Feedback::Yes) => respond(
                Bundle::new(tone).say(Phrase::OfferNext).finish(),
                BrainAction::OfferNext {
                    options: vec![Choice::Another, Choice::Deepen, Choice::End],
                },
                ContextPatch {
                    step: Some(Step::NextAction),
                    helpful_no_count: Some(0),
                    ..recorded_feedback(ctx, Feedback::Yes)
                },
            ),
            None => respond(
                Bundle::new(tone).say(Phrase::FeedbackNeedsYesNo).finish(),
                BrainAction::AskFeedback { ideas_topic: None },
                ContextPatch::stay(),
            ),
        }
    }

    fn next_action(&mut self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        match input.resolved_choice() {
            Some(Choice::Another) => match ctx.blockage_id {
                Some(blockage) => self.fetch_exercise(ctx, tone, blockage, Phrase::ExerciseComing),
                None => self.ask_blockage(tone, Step::ChooseBlockage),
            },
            Some(Choice::Deepen) => self.deepen(ctx, tone),
            Some(Choice::End) | Some(Choice::No) => self.end(ctx, tone),
            _ => respond(
                Bundle::new(tone).say(Phrase::OfferNext).finish(),
                BrainAction::OfferNext {
                    options: vec![Choice::Another, Choice::Deepen, Choice::End],
                },
                ContextPatch::stay(),
            ),
        }
    }

    fn deepen(&mut self, ctx: &SessionContext, tone: Tone) -> BrainResponse {
        let Some(blockage) = ctx.blockage_id else {
            return self.ask_blockage(tone, Step::ChooseBlockage);
        };
        match select_protocol(blockage, ctx.problem_scale, &mut self.rng) {
            Some(protocol) => self.start_protocol(tone, protocol, ContextPatch::default()),
            None => self.fetch_exercise(ctx, tone, blockage, Phrase::ExerciseComing),
        }
    }

    // === Protocols ===

    fn start_protocol(&self, tone: Tone, protocol: &Protocol, extra: ContextPatch) -> BrainResponse {
        let state = ProtocolState::new(protocol);
        let first = protocol.step(0);
        let intro = format!("{} {}", tone::phrase(Phrase::ProtocolIntro, tone), protocol.name);
        let mut bundle = Bundle::new(tone).line(intro);
        if let Some(step) = first {
            bundle = bundle.line(step.text());
        }

        respond(
            bundle.finish(),
            BrainAction::StartProtocol {
                protocol_id: protocol.id.to_string(),
                resumed: false,
                expects_input: first.is_some_and(|s| s.expects_input()),
            },
            ContextPatch {
                step: Some(Step::ProtocolStep),
                protocol: Some(state),
                last_feedback: Some(None),
                pending_protocol_feedback: Some(None),
                ..extra
            },
        )
    }

    fn protocol_step(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        let Some(state) = ctx.protocol.as_ref() else {
            return self.end(ctx, tone);
        };
        let Some(protocol) = protocol::find(&state.protocol_id) else {
            return self.end(ctx, tone);
        };
        let Some(step) = state.current_step(protocol) else {
            return self.complete_protocol(ctx, tone, protocol, state.clone());
        };

        let response = if step.expects_input() {
            match input.non_empty_text() {
                Some(text) => Some(text.to_string()),
                None => {
                    return respond(
                        Bundle::new(tone)
                            .say(Phrase::ProtocolNeedsAnswer)
                            .line(step.text())
                            .finish(),
                        BrainAction::ProtocolStep {
                            protocol_id: protocol.id.to_string(),
                            step_index: state.current_step_index,
                            expects_input: true,
                        },
                        ContextPatch::stay(),
                    );
                }
            }
        } else {
            None
        };

        let captured_at = state.current_step_index;
        let mut next = state.clone();
        next.advance(protocol, response.clone());

        if protocol.id == WEEK_PROTOCOL_ID {
            if let (Some(day), Some(result)) = (day_for_deliverable(captured_at), response) {
                return self.finish_week_day(ctx, tone, next, day, result);
            }
        }

        if next.is_complete {
            return self.complete_protocol(ctx, tone, protocol, next);
        }

        let Some(upcoming) = next.current_step(protocol) else {
            return self.complete_protocol(ctx, tone, protocol, next);
        };
        respond(
            Bundle::new(tone).line(upcoming.text()).finish(),
            BrainAction::ProtocolStep {
                protocol_id: protocol.id.to_string(),
                step_index: next.current_step_index,
                expects_input: upcoming.expects_input(),
            },
            ContextPatch {
                protocol: Some(next),
                ..ContextPatch::to(Step::ProtocolStep)
            },
        )
    }

    fn finish_week_day(
        &self,
        ctx: &SessionContext,
        tone: Tone,
        state: ProtocolState,
        day: u8,
        result: String,
    ) -> BrainResponse {
        let mut week = ctx
            .week
            .clone()
            .unwrap_or_else(|| WeekState::start(project_title(ctx), self.clock.now()));
        week.record_day(day, result);
        debug!(day, title = %week.project_title, "week day captured");

        if day < DAYS_IN_WEEK {
            return respond(
                Bundle::new(tone)
                    .say(Phrase::DayDone)
                    .line(format!("Próxima sesión: día {} de {}.", day + 1, DAYS_IN_WEEK))
                    .finish(),
                BrainAction::EndSession {
                    outcome: Outcome::Unknown,
                },
                ContextPatch {
                    protocol: Some(state),
                    last_feedback: Some(None),
                    week: Some(Some(week)),
                    ..ContextPatch::to(Step::End)
                },
            );
        }

        respond(
            Bundle::new(tone).say(Phrase::WeekDone).say(Phrase::AskFeedback).finish(),
            BrainAction::AskFeedback { ideas_topic: None },
            ContextPatch {
                protocol: Some(state),
                has_completed_protocol: Some(true),
                pending_protocol_feedback: Some(Some(WEEK_PROTOCOL_ID.to_string())),
                week: Some(None),
                ..ContextPatch::to(Step::Feedback)
            },
        )
    }

    fn complete_protocol(
        &self,
        ctx: &SessionContext,
        tone: Tone,
        protocol: &Protocol,
        state: ProtocolState,
    ) -> BrainResponse {
        let done = ContextPatch {
            protocol: Some(state),
            has_completed_protocol: Some(true),
            pending_protocol_feedback: Some(Some(protocol.id.to_string())),
            ..ContextPatch::default()
        };
        debug!(protocol = protocol.id, "protocol complete");

        if protocol.offers_week {
            return respond(
                Bundle::new(tone).say(Phrase::OfferWeek).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch {
                    step: Some(Step::ProtocolOffer),
                    ..done
                },
            );
        }

        if ctx.detected_topic.is_some() {
            return respond(
                Bundle::new(tone).say(Phrase::OfferIdeas).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch {
                    step: Some(Step::IdeasOffer),
                    ..done
                },
            );
        }

        respond(
            Bundle::new(tone).say(Phrase::AskFeedback).finish(),
            BrainAction::AskFeedback { ideas_topic: None },
            ContextPatch {
                step: Some(Step::Feedback),
                ..done
            },
        )
    }

    fn protocol_offer(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        match input.resolved_choice() {
            Some(Choice::Yes) => match protocol::find(WEEK_PROTOCOL_ID) {
                Some(protocol) => {
                    let week = WeekState::start(project_title(ctx), self.clock.now());
                    let vote = ctx.pending_protocol_feedback.clone().map(|protocol_id| {
                        ProtocolVote {
                            protocol_id,
                            feedback: Feedback::Yes,
                        }
                    });
                    self.start_protocol(
                        tone,
                        protocol,
                        ContextPatch {
                            protocol_vote: vote,
                            week: Some(Some(week)),
                            ..ContextPatch::default()
                        },
                    )
                }
                None => self.ask_feedback(tone, None),
            },
            Some(Choice::No) => self.ask_feedback(tone, None),
            _ => respond(
                Bundle::new(tone).say(Phrase::OfferWeek).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch::stay(),
            ),
        }
    }

    fn ideas_offer(&self, ctx: &SessionContext, input: &TurnInput, tone: Tone) -> BrainResponse {
        match input.resolved_choice() {
            Some(Choice::Yes) => {
                let topic = ctx
                    .detected_topic
                    .clone()
                    .filter(|_| ctx.has_completed_protocol);
                self.ask_feedback(tone, topic)
            }
            Some(Choice::No) => self.ask_feedback(tone, None),
            _ => respond(
                Bundle::new(tone).say(Phrase::OfferIdeas).finish(),
                BrainAction::OfferNext { options: yes_no() },
                ContextPatch::stay(),
            ),
        }
    }

    fn ask_feedback(&self, tone: Tone, ideas_topic: Option<String>) -> BrainResponse {
        let mut bundle = Bundle::new(tone);
        if let Some(topic) = ideas_topic.as_deref() {
            bundle = bundle.line(format!("Unas ideas sobre «{topic}»:"));
        }
        respond(
            bundle.say(Phrase::AskFeedback).finish(),
            BrainAction::AskFeedback { ideas_topic },
            ContextPatch::to(Step::Feedback),
        )
    }

    fn end(&self, ctx: &SessionContext, tone: Tone) -> BrainResponse {
        respond(
            Bundle::new(tone).say(Phrase::Closing).finish(),
            BrainAction::EndSession {
                outcome: Outcome::from_feedback(ctx.last_feedback),
            },
            ContextPatch::to(Step::End),
        )
    }
}

/// Record a yes/no, crediting the protocol that just finished if any
fn recorded_feedback(ctx: &SessionContext, feedback: Feedback) -> ContextPatch {
    let vote = ctx
        .pending_protocol_feedback
        .clone()
        .map(|protocol_id| ProtocolVote {
            protocol_id,
            feedback,
        });
    ContextPatch {
        last_feedback: Some(Some(feedback)),
        pending_protocol_feedback: vote.as_ref().map(|_| None),
        protocol_vote: vote,
        ..ContextPatch::default()
    }
}

/// Title for a new week: detected topic, else the opening text, else a default
fn project_title(ctx: &SessionContext) -> String {
    ctx.detected_topic
        .clone()
        .or_else(|| {
            ctx.raw_text
                .as_deref()
                .map(|t| t.trim().chars().take(PROJECT_TITLE_MAX_CHARS).collect())
        })
        .filter(|t: &String| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn brain() -> Brain<FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap());
        Brain::with_seed(clock, 3)
    }

    fn at(step: Step) -> SessionContext {
        let mut ctx = SessionContext::new(Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap());
        ctx.step = step;
        ctx
    }

    #[test]
    fn test_every_state_answers_without_input() {
        let mut b = brain();
        let steps = [
            Step::Welcome,
            Step::ReturningWeek,
            Step::FreeInput,
            Step::SuggestBlockage,
            Step::ChooseBlockage,
            Step::ShowExercise,
            Step::UserResponse,
            Step::ProtocolStep,
            Step::ProtocolOffer,
            Step::IdeasOffer,
            Step::Feedback,
            Step::NextAction,
            Step::End,
        ];
        for step in steps {
            let r = b.transition(&at(step), &TurnInput::none());
            assert!(!r.messages.is_empty(), "{step}");
            assert!(r.messages.len() <= MAX_LINES, "{step}");
        }
    }

    #[test]
    fn test_project_title_fallbacks() {
        let mut ctx = at(Step::ProtocolOffer);
        assert_eq!(project_title(&ctx), DEFAULT_PROJECT_TITLE);
        ctx.raw_text = Some("x".repeat(80));
        assert_eq!(project_title(&ctx).chars().count(), PROJECT_TITLE_MAX_CHARS);
        ctx.detected_topic = Some("dragones".to_string());
        assert_eq!(project_title(&ctx), "dragones");
    }

    #[test]
    fn test_protocol_step_without_protocol_ends() {
        let mut b = brain();
        let r = b.transition(&at(Step::ProtocolStep), &TurnInput::text("hola"));
        assert_eq!(r.patch.step, Some(Step::End));
        assert!(matches!(r.action, BrainAction::EndSession { .. }));
    }
}
