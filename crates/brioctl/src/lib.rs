//! Brio Control - terminal driver for the Brio conversation core.
//!
//! Wires the brain to a store, exercise/idea providers, config and logging.

pub mod collaborators;
pub mod commands;
pub mod config;
pub mod display;
pub mod logging;
pub mod repl;
pub mod session;

pub use collaborators::{Exercise, ExerciseSource, IdeaSource, LocalExerciseSource, LocalIdeaSource};
pub use config::BrioConfig;
pub use session::{Reply, SessionDriver};
