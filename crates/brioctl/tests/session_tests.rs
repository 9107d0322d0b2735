//! Tests for the session driver with fake collaborators

use anyhow::{bail, Result};
use async_trait::async_trait;
use brio_common::{
    BlockageId, Brain, BrainAction, BrioError, FixedClock, InMemoryStore, LongTermMemory,
    MemoryStore, Outcome, Step, TurnInput, WeekState, WEEK_PROTOCOL_ID,
};
use brioctl::collaborators::{Exercise, ExerciseSource, IdeaSource};
use brioctl::session::SessionDriver;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 5, 10, 0, 0).unwrap()
}

/// Serves `t1`, `t2`, ... and fails from call number `fail_from` on
struct FakeExercises {
    calls: AtomicUsize,
    fail_from: usize,
}

impl FakeExercises {
    fn ok() -> Self {
        Self::failing_from(usize::MAX)
    }

    fn failing_from(fail_from: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_from,
        }
    }
}

#[async_trait]
impl ExerciseSource for FakeExercises {
    async fn fetch_exercise(
        &self,
        blockage: BlockageId,
        _last_technique_id: Option<&str>,
    ) -> Result<Exercise> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.fail_from {
            bail!("catalog offline");
        }
        Ok(Exercise {
            technique_id: format!("t{n}"),
            title: format!("Técnica {n} para {}", blockage.label()),
            instructions: "Haz algo pequeño.".to_string(),
        })
    }
}

struct FakeIdeas;

#[async_trait]
impl IdeaSource for FakeIdeas {
    async fn ideas_for(&self, topic: &str) -> Result<Vec<String>> {
        Ok(vec![format!("idea sobre {topic}")])
    }
}

/// Every operation fails
struct BrokenStore;

impl MemoryStore for BrokenStore {
    fn load_memory(&self, _user: &str) -> brio_common::Result<LongTermMemory> {
        Err(BrioError::Store("disk on fire".to_string()))
    }
    fn save_memory(&self, _user: &str, _memory: &LongTermMemory) -> brio_common::Result<()> {
        Err(BrioError::Store("disk on fire".to_string()))
    }
    fn load_week(&self, _user: &str) -> brio_common::Result<Option<WeekState>> {
        Err(BrioError::Store("disk on fire".to_string()))
    }
    fn save_week(&self, _user: &str, _week: &WeekState) -> brio_common::Result<()> {
        Err(BrioError::Store("disk on fire".to_string()))
    }
    fn clear_week(&self, _user: &str) -> brio_common::Result<()> {
        Err(BrioError::Store("disk on fire".to_string()))
    }
}

fn driver_with(
    store: Arc<dyn MemoryStore>,
    exercises: FakeExercises,
) -> SessionDriver<FixedClock> {
    SessionDriver::new(
        "tester",
        Brain::with_seed(FixedClock::new(now()), 2),
        store,
        Arc::new(exercises),
        Arc::new(FakeIdeas),
    )
}

#[tokio::test]
async fn test_full_session_is_remembered() {
    let store = Arc::new(InMemoryStore::new());
    let mut driver = driver_with(store.clone(), FakeExercises::ok());

    let reply = driver.start().await;
    assert_eq!(reply.action, Some(BrainAction::AskFreeInput));

    let reply = driver.turn(TurnInput::line("tengo la página en blanco")).await;
    assert!(matches!(reply.action, Some(BrainAction::SuggestBlockage { .. })));

    let reply = driver.turn(TurnInput::line("sí")).await;
    assert_eq!(reply.action, Some(BrainAction::AskUserResponse));
    assert!(reply
        .messages
        .iter()
        .any(|m| m == "Técnica 1 para Página en blanco"));
    assert_eq!(driver.context().last_technique_id.as_deref(), Some("t1"));

    driver.turn(TurnInput::line("escribí un párrafo")).await;
    driver.turn(TurnInput::line("sí")).await;
    let reply = driver.turn(TurnInput::line("terminar")).await;
    assert!(reply.finished);
    assert!(driver.is_finished());

    let memory = store.load_memory("tester").unwrap();
    assert_eq!(memory.sessions.len(), 1);
    assert_eq!(memory.sessions[0].outcome, Outcome::Helpful);
    assert_eq!(memory.sessions[0].ended_at, now());
    assert_eq!(memory.stats.blockage_counts[&BlockageId::BlankPage], 1);

    let reply = driver.turn(TurnInput::line("hola")).await;
    assert!(reply.finished);
    assert!(reply.messages.is_empty());
    assert_eq!(store.load_memory("tester").unwrap().sessions.len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_before_any_attempt_ends() {
    let store = Arc::new(InMemoryStore::new());
    let mut driver = driver_with(store.clone(), FakeExercises::failing_from(1));

    driver.start().await;
    driver.turn(TurnInput::line("me distraigo con todo")).await;
    let reply = driver.turn(TurnInput::line("sí")).await;

    assert!(reply.finished);
    assert!(reply.messages.iter().any(|m| m.starts_with("Perdona")));
    assert_eq!(driver.context().step, Step::End);
    assert_eq!(
        store.load_memory("tester").unwrap().sessions[0].outcome,
        Outcome::Unknown
    );
}

#[tokio::test]
async fn test_fetch_failure_after_attempt_asks_feedback() {
    let mut driver = driver_with(Arc::new(InMemoryStore::new()), FakeExercises::failing_from(2));

    driver.start().await;
    driver.turn(TurnInput::line("me distraigo con todo")).await;
    driver.turn(TurnInput::line("sí")).await;
    driver.turn(TurnInput::line("lo hice")).await;
    let reply = driver.turn(TurnInput::line("no")).await;

    assert!(!reply.finished);
    assert_eq!(reply.action, Some(BrainAction::AskFeedback { ideas_topic: None }));
    assert_eq!(driver.context().step, Step::Feedback);
    assert_eq!(driver.context().helpful_no_count, 1);
}

#[tokio::test]
async fn test_store_failures_are_swallowed() {
    let mut driver = driver_with(Arc::new(BrokenStore), FakeExercises::ok());

    let reply = driver.start().await;
    assert_eq!(reply.action, Some(BrainAction::AskFreeInput));
    driver.turn(TurnInput::line("estoy agotada y sin ganas")).await;
    driver.turn(TurnInput::line("sí")).await;
    driver.turn(TurnInput::line("salí a pasear")).await;
    driver.turn(TurnInput::line("no")).await;

    // "terminar" at user_response is just an answer; the session goes on
    let reply = driver.turn(TurnInput::line("terminar")).await;
    assert!(!reply.finished);
    assert_eq!(driver.context().attempts, 2);

    driver.turn(TurnInput::line("sí")).await;
    let reply = driver.turn(TurnInput::line("terminar")).await;
    assert!(reply.finished);
    assert_eq!(driver.memory().sessions.len(), 1);
}

#[tokio::test]
async fn test_ideas_are_generated_after_protocol() {
    let mut driver = driver_with(Arc::new(InMemoryStore::new()), FakeExercises::ok());

    driver.start().await;
    driver
        .turn(TurnInput::line("quiero que mi cómic sobre dragones sea perfecto"))
        .await;
    assert_eq!(driver.context().candidates, vec![BlockageId::Perfectionism]);
    let topic = driver.context().detected_topic.clone().unwrap();

    driver.turn(TurnInput::line("sí")).await;
    driver.turn(TurnInput::line("hecho")).await;
    driver.turn(TurnInput::line("sí")).await;

    let reply = driver.turn(TurnInput::line("profundizar")).await;
    assert!(matches!(
        reply.action,
        Some(BrainAction::ProtocolStep {
            step_index: 1,
            expects_input: true,
            ..
        })
    ));

    let reply = driver.turn(TurnInput::line("un dragón deforme")).await;
    assert_eq!(driver.context().step, Step::IdeasOffer);
    assert!(matches!(reply.action, Some(BrainAction::OfferNext { .. })));

    let reply = driver.turn(TurnInput::line("sí")).await;
    assert_eq!(reply.ideas, vec![format!("idea sobre {topic}")]);
    assert_eq!(driver.context().step, Step::Feedback);
}

#[tokio::test]
async fn test_week_day_is_saved_and_cleared() {
    let store = Arc::new(InMemoryStore::new());
    let started = Utc.with_ymd_and_hms(2026, 5, 5, 8, 0, 0).unwrap();
    store
        .save_week("tester", &WeekState::start("Fanzine", started))
        .unwrap();

    let mut driver = driver_with(store.clone(), FakeExercises::ok());
    let reply = driver.start().await;
    assert_eq!(
        reply.action,
        Some(BrainAction::ProtocolStep {
            protocol_id: WEEK_PROTOCOL_ID.to_string(),
            step_index: 3,
            expects_input: true,
        })
    );

    let reply = driver.turn(TurnInput::line("Un fanzine de plantas")).await;
    assert!(reply.finished);
    let week = store.load_week("tester").unwrap().unwrap();
    assert_eq!(week.current_day, 2);

    // Last day: the stored week goes away
    let mut week = week;
    for day in 2..=6 {
        week.record_day(day, "hecho");
    }
    store.save_week("tester", &week).unwrap();

    let mut driver = driver_with(store.clone(), FakeExercises::ok());
    driver.start().await;
    let reply = driver.turn(TurnInput::line("imprimir diez copias")).await;
    assert_eq!(reply.action, Some(BrainAction::AskFeedback { ideas_topic: None }));
    assert_eq!(store.load_week("tester").unwrap(), None);
}
