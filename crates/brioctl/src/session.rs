//! Session driver: runs the brain against a store and collaborators.
//!
//! One user line may produce several brain turns: fetched exercises are shown
//! and immediately followed by the "tell me how it went" prompt, and system
//! steps of a protocol advance on their own. Persistence and collaborator
//! failures never reach the user as errors.

use crate::collaborators::{ExerciseSource, IdeaSource};
use brio_common::brain::tone::{phrase, Phrase, Tone};
use brio_common::{
    Brain, BrainAction, BrainResponse, Clock, ContextPatch, LongTermMemory, MemoryStore,
    SessionContext, Step, SystemClock, TurnInput,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Guard against a runaway chain of automatic turns
const MAX_CHAINED_TURNS: usize = 64;

const FETCH_APOLOGY: &str = "Perdona, no he podido preparar el ejercicio ahora mismo.";
const IDEAS_APOLOGY: &str = "Perdona, hoy no me salen ideas para ese tema.";

/// Everything produced for one user line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub messages: Vec<String>,
    /// Extra lines (ideas) shown as a list
    pub ideas: Vec<String>,
    /// What the session is waiting for now
    pub action: Option<BrainAction>,
    pub finished: bool,
}

pub struct SessionDriver<C: Clock = SystemClock> {
    id: Uuid,
    user: String,
    brain: Brain<C>,
    ctx: SessionContext,
    memory: LongTermMemory,
    store: Arc<dyn MemoryStore>,
    exercises: Arc<dyn ExerciseSource>,
    ideas: Arc<dyn IdeaSource>,
    finished: bool,
}

impl<C: Clock> SessionDriver<C> {
    pub fn new(
        user: impl Into<String>,
        brain: Brain<C>,
        store: Arc<dyn MemoryStore>,
        exercises: Arc<dyn ExerciseSource>,
        ideas: Arc<dyn IdeaSource>,
    ) -> Self {
        let ctx = SessionContext::new(brain.clock().now());
        Self {
            id: Uuid::new_v4(),
            user: user.into(),
            brain,
            ctx,
            memory: LongTermMemory::default(),
            store,
            exercises,
            ideas,
            finished: false,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn memory(&self) -> &LongTermMemory {
        &self.memory
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Load durable state and produce the opening messages
    pub async fn start(&mut self) -> Reply {
        self.memory = self.store.load_memory(&self.user).unwrap_or_else(|e| {
            warn!(user = %self.user, kind = e.kind(), "memory load failed: {}", e);
            LongTermMemory::default()
        });
        let week = self.store.load_week(&self.user).unwrap_or_else(|e| {
            warn!(user = %self.user, kind = e.kind(), "week load failed: {}", e);
            None
        });

        self.ctx = SessionContext::new(self.brain.clock().now()).with_week(week);
        self.finished = false;
        info!(
            session = %self.id,
            user = %self.user,
            past_sessions = self.memory.sessions.len(),
            "session start"
        );
        self.run(TurnInput::none()).await
    }

    /// Feed one user turn
    pub async fn turn(&mut self, input: TurnInput) -> Reply {
        if self.finished {
            return Reply {
                finished: true,
                ..Reply::default()
            };
        }
        self.run(input).await
    }

    async fn run(&mut self, mut input: TurnInput) -> Reply {
        let mut reply = Reply::default();

        for _ in 0..MAX_CHAINED_TURNS {
            let BrainResponse {
                messages,
                action,
                patch,
            } = self.brain.transition(&self.ctx, &input);
            reply.messages.extend(messages);
            self.apply(patch);
            input = TurnInput::none();

            match &action {
                BrainAction::FetchExercise {
                    blockage_id,
                    last_technique_id,
                } => {
                    match self
                        .exercises
                        .fetch_exercise(*blockage_id, last_technique_id.as_deref())
                        .await
                    {
                        Ok(exercise) => {
                            debug!(technique = %exercise.technique_id, "exercise fetched");
                            reply.messages.push(exercise.title);
                            reply.messages.push(exercise.instructions);
                            self.apply(ContextPatch {
                                last_technique_id: Some(exercise.technique_id),
                                ..ContextPatch::default()
                            });
                            continue;
                        }
                        Err(e) => {
                            warn!(blockage = %blockage_id, "exercise fetch failed: {:#}", e);
                            let next = self.recover_from_fetch(&mut reply);
                            reply.action = Some(next);
                            break;
                        }
                    }
                }
                BrainAction::AskFeedback {
                    ideas_topic: Some(topic),
                } => {
                    match self.ideas.ideas_for(topic).await {
                        Ok(ideas) => reply.ideas = ideas,
                        Err(e) => {
                            warn!(topic = %topic, "idea generation failed: {:#}", e);
                            reply.messages.push(IDEAS_APOLOGY.to_string());
                        }
                    }
                    reply.action = Some(action);
                    break;
                }
                BrainAction::EndSession { .. } => {
                    reply.action = Some(action);
                    self.finish();
                    break;
                }
                a if a.is_auto_advance() => continue,
                _ => {
                    reply.action = Some(action);
                    break;
                }
            }
        }

        reply.finished = self.finished;
        reply
    }

    /// Apply a patch and persist the week when it changed
    fn apply(&mut self, patch: ContextPatch) {
        let week_changed = patch.week.is_some();
        self.ctx.apply(patch);
        if week_changed {
            self.persist_week();
        }
    }

    fn persist_week(&self) {
        let result = match &self.ctx.week {
            Some(week) => self.store.save_week(&self.user, week),
            None => self.store.clear_week(&self.user),
        };
        if let Err(e) = result {
            warn!(user = %self.user, kind = e.kind(), "week save failed: {}", e);
        }
    }

    /// After a failed fetch: ask about the last exercise if there was one, else close
    fn recover_from_fetch(&mut self, reply: &mut Reply) -> BrainAction {
        let tone = Tone::from_mental(&self.ctx.mental);
        reply.messages.push(FETCH_APOLOGY.to_string());

        if self.ctx.attempts > 0 {
            self.apply(ContextPatch::to(Step::Feedback));
            reply.messages.push(phrase(Phrase::AskFeedback, tone).to_string());
            return BrainAction::AskFeedback { ideas_topic: None };
        }

        self.apply(ContextPatch::to(Step::End));
        reply.messages.push(phrase(Phrase::Closing, tone).to_string());
        let action = BrainAction::EndSession {
            outcome: brio_common::Outcome::from_feedback(self.ctx.last_feedback),
        };
        self.finish();
        action
    }

    /// Record the session in long-term memory and save it
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let ended_at = self.brain.clock().now();
        let outcome = self.memory.record_session(&self.ctx, ended_at).outcome;
        if let Err(e) = self.store.save_memory(&self.user, &self.memory) {
            warn!(user = %self.user, kind = e.kind(), "memory save failed: {}", e);
        }
        info!(
            session = %self.id,
            outcome = outcome.as_str(),
            attempts = self.ctx.attempts,
            blockage = self.ctx.blockage_id.map(|b| b.as_str()),
            "session end"
        );
    }
}
