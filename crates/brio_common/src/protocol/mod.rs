//! Protocol engine: scripted multi-step guided exercises.
//!
//! Protocols are static data (see `catalog`). A session walks one through a
//! `ProtocolState`, which only moves forward.

pub mod catalog;

use crate::blockage::{BlockageId, ProblemScale};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use catalog::{find, protocols, WEEK_PROTOCOL_ID};

/// One step of a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStep {
    /// Shown and advanced without waiting for the user
    System(&'static str),
    /// Needs captured user text before advancing
    Prompt(&'static str),
}

impl ProtocolStep {
    pub fn text(&self) -> &'static str {
        match *self {
            ProtocolStep::System(text) | ProtocolStep::Prompt(text) => text,
        }
    }

    pub fn expects_input(&self) -> bool {
        matches!(self, ProtocolStep::Prompt(_))
    }
}

/// A predefined guided exercise sequence
#[derive(Debug, Clone, Copy)]
pub struct Protocol {
    pub id: &'static str,
    pub name: &'static str,
    /// Blockages this protocol applies to; empty means offer-only
    pub blockages: &'static [BlockageId],
    pub scale: Option<ProblemScale>,
    pub steps: &'static [ProtocolStep],
    /// Completing it offers the 7-day protocol
    pub offers_week: bool,
}

impl Protocol {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&ProtocolStep> {
        self.steps.get(index)
    }

    pub fn applies_to(&self, blockage: BlockageId) -> bool {
        self.blockages.contains(&blockage)
    }
}

/// Progress through one protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolState {
    pub protocol_id: String,
    pub current_step_index: usize,
    #[serde(default)]
    pub user_responses: Vec<String>,
    #[serde(default)]
    pub is_complete: bool,
}

impl ProtocolState {
    pub fn new(protocol: &Protocol) -> Self {
        Self::at(protocol, 0)
    }

    /// Start at a given step (used when resuming the week protocol)
    pub fn at(protocol: &Protocol, step_index: usize) -> Self {
        Self {
            protocol_id: protocol.id.to_string(),
            current_step_index: step_index,
            user_responses: Vec::new(),
            is_complete: step_index >= protocol.step_count(),
        }
    }

    /// Record an optional response and move to the next step.
    ///
    /// A completed state is left untouched.
    pub fn advance(&mut self, protocol: &Protocol, response: Option<String>) {
        if self.is_complete {
            return;
        }
        if let Some(response) = response {
            self.user_responses.push(response);
        }
        self.current_step_index += 1;
        self.is_complete = self.current_step_index >= protocol.step_count();
    }

    /// Step currently shown to the user
    pub fn current_step<'p>(&self, protocol: &'p Protocol) -> Option<&'p ProtocolStep> {
        protocol.step(self.current_step_index)
    }
}

/// Pick a protocol for a blockage, preferring ones sized for `scale`.
///
/// Returns `None` when no protocol applies; the caller then uses a
/// single-shot exercise.
pub fn select_protocol<R: Rng + ?Sized>(
    blockage: BlockageId,
    scale: Option<ProblemScale>,
    rng: &mut R,
) -> Option<&'static Protocol> {
    let candidates: Vec<&'static Protocol> =
        protocols().iter().filter(|p| p.applies_to(blockage)).collect();

    let scaled: Vec<&'static Protocol> = match scale {
        Some(scale) => candidates
            .iter()
            .copied()
            .filter(|p| p.scale == Some(scale))
            .collect(),
        None => Vec::new(),
    };

    let pool = if scaled.is_empty() { candidates } else { scaled };
    let picked = pool.choose(rng).copied();
    debug!(
        blockage = %blockage,
        scale = scale.map(|s| s.as_str()),
        pool = pool.len(),
        picked = picked.map(|p| p.id),
        "protocol selection"
    );
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn short() -> &'static Protocol {
        find("primer_trazo").unwrap()
    }

    #[test]
    fn test_advance_collects_responses() {
        let protocol = short();
        let mut state = ProtocolState::new(protocol);
        assert!(!state.is_complete);

        state.advance(protocol, None);
        state.advance(protocol, Some("luna".to_string()));
        assert_eq!(state.current_step_index, 2);
        assert_eq!(state.user_responses, vec!["luna".to_string()]);
    }

    #[test]
    fn test_advance_completes_and_stays_complete() {
        let protocol = short();
        let mut state = ProtocolState::new(protocol);
        for _ in 0..protocol.step_count() {
            state.advance(protocol, Some("x".to_string()));
        }
        assert!(state.is_complete);
        let index = state.current_step_index;

        state.advance(protocol, Some("extra".to_string()));
        assert!(state.is_complete);
        assert_eq!(state.current_step_index, index);
        assert_eq!(state.user_responses.len(), protocol.step_count());
    }

    #[test]
    fn test_select_narrows_by_scale() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let p = select_protocol(BlockageId::IdeaOverload, Some(ProblemScale::Large), &mut rng)
                .unwrap();
            assert_eq!(p.id, "mapa_proyecto");
        }
    }

    #[test]
    fn test_select_falls_back_to_all_for_blockage() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = select_protocol(BlockageId::CreativeFatigue, Some(ProblemScale::Large), &mut rng)
            .unwrap();
        assert!(p.applies_to(BlockageId::CreativeFatigue));
    }

    #[test]
    fn test_week_protocol_never_selected() {
        let mut rng = StdRng::seed_from_u64(1);
        for blockage in BlockageId::ALL {
            for _ in 0..10 {
                let p = select_protocol(blockage, None, &mut rng).unwrap();
                assert_ne!(p.id, WEEK_PROTOCOL_ID);
            }
        }
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..5)
                .map(|_| select_protocol(BlockageId::BlankPage, None, &mut rng).unwrap().id)
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(42), pick(42));
    }
}
