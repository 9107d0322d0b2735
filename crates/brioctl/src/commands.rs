//! Subcommand handlers.

use crate::collaborators::{LocalExerciseSource, LocalIdeaSource};
use crate::config::BrioConfig;
use crate::display;
use crate::repl;
use crate::session::SessionDriver;
use anyhow::Result;
use brio_common::blockage::TextAnalysis;
use brio_common::store::validate_user;
use brio_common::{protocol, Brain, InMemoryStore, JsonFileStore, MemoryStore, SystemClock};
use std::sync::Arc;
use std::time::Duration;

fn open_store(config: &BrioConfig, ephemeral: bool) -> Arc<dyn MemoryStore> {
    if ephemeral {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(&config.data_dir))
    }
}

pub async fn chat(config: &BrioConfig, ephemeral: bool, no_pacing: bool) -> Result<()> {
    validate_user(&config.user)?;

    let (brain, exercises) = match config.seed {
        Some(seed) => (
            Brain::with_seed(SystemClock, seed),
            LocalExerciseSource::with_seed(seed),
        ),
        None => (Brain::new(SystemClock), LocalExerciseSource::new()),
    };
    let mut driver = SessionDriver::new(
        config.user.clone(),
        brain,
        open_store(config, ephemeral),
        Arc::new(exercises),
        Arc::new(LocalIdeaSource),
    );

    let pacing = if no_pacing {
        Duration::ZERO
    } else {
        Duration::from_millis(config.pacing_ms)
    };
    repl::run(&mut driver, pacing).await
}

pub fn classify(text: &str, json: bool) -> Result<()> {
    let analysis = TextAnalysis::of(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        display::print_analysis(text, &analysis);
    }
    Ok(())
}

pub fn stats(config: &BrioConfig) -> Result<()> {
    let memory = open_store(config, false).load_memory(&config.user)?;
    display::print_stats(&config.user, &memory);
    Ok(())
}

pub fn week(config: &BrioConfig, reset: bool) -> Result<()> {
    let store = open_store(config, false);
    if reset {
        store.clear_week(&config.user)?;
        println!("Plan de 7 días borrado.");
        return Ok(());
    }
    let week = store.load_week(&config.user)?;
    display::print_week(week.as_ref());
    Ok(())
}

pub fn protocols() -> Result<()> {
    display::print_protocols(protocol::protocols());
    Ok(())
}
