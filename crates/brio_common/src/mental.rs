//! Mental state estimation from free text.
//!
//! Pure substring heuristics over the lowercased text. There is no
//! tokenization, so "para" also matches inside "parar"; that is accepted.

use serde::{Deserialize, Serialize};

/// Helplessness phrases that flag high resistance
const HELPLESSNESS: &[&str] = &[
    "no sé",
    "no se",
    "da igual",
    "no puedo",
    "no tengo ganas",
    "me rindo",
    "no sirve",
    "nada funciona",
    "imposible",
    "no me sale",
    "para qué",
    "para que sirve",
];

/// Markers of a structured, goal-oriented text
const STRUCTURE_MARKERS: &[&str] = &[
    "porque",
    "para",
    "objetivo",
    "quiero",
    "necesito",
    "meta",
    "primero",
    "después",
    "plan",
];

const LOW_ENERGY_MAX_CHARS: usize = 12;
const LOW_ENERGY_MAX_WORDS: usize = 3;
const HIGH_ENERGY_MIN_CHARS: usize = 140;
const HIGH_ENERGY_MIN_WORDS: usize = 30;
const HIGH_CLARITY_MIN_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resistance {
    Low,
    High,
}

/// Heuristic {energy, clarity, resistance} estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentalState {
    pub energy: Level,
    pub clarity: Level,
    pub resistance: Resistance,
}

impl Default for MentalState {
    fn default() -> Self {
        Self {
            energy: Level::Medium,
            clarity: Level::Medium,
            resistance: Resistance::Low,
        }
    }
}

/// Case-insensitive check against a phrase table
pub(crate) fn contains_any(lowered: &str, table: &[&str]) -> bool {
    table.iter().any(|p| lowered.contains(p))
}

/// Estimate the mental state of a single text.
pub fn estimate(text: &str) -> MentalState {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    let chars = trimmed.chars().count();
    let words = trimmed.split_whitespace().count();

    let energy = if chars <= LOW_ENERGY_MAX_CHARS || words <= LOW_ENERGY_MAX_WORDS {
        Level::Low
    } else if chars >= HIGH_ENERGY_MIN_CHARS || words >= HIGH_ENERGY_MIN_WORDS {
        Level::High
    } else {
        Level::Medium
    };

    let resistance = if contains_any(&lowered, HELPLESSNESS) {
        Resistance::High
    } else {
        Resistance::Low
    };

    let clarity = if energy == Level::Low && resistance == Resistance::High {
        Level::Low
    } else if contains_any(&lowered, STRUCTURE_MARKERS) || chars >= HIGH_CLARITY_MIN_CHARS {
        Level::High
    } else {
        Level::Medium
    };

    MentalState {
        energy,
        clarity,
        resistance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_low_energy() {
        assert_eq!(estimate("hola").energy, Level::Low);
        assert_eq!(estimate("").energy, Level::Low);
        // Long characters but only three words
        assert_eq!(estimate("extraordinariamente complicado todo").energy, Level::Low);
    }

    #[test]
    fn test_long_text_is_high_energy() {
        let text = "palabra ".repeat(31);
        assert_eq!(estimate(&text).energy, Level::High);
    }

    #[test]
    fn test_medium_energy() {
        let s = estimate("tengo un proyecto de dibujo pendiente");
        assert_eq!(s.energy, Level::Medium);
        assert_eq!(s.resistance, Resistance::Low);
        assert_eq!(s.clarity, Level::Medium);
    }

    #[test]
    fn test_low_clarity_needs_low_energy_and_resistance() {
        let s = estimate("no sé");
        assert_eq!(s.energy, Level::Low);
        assert_eq!(s.resistance, Resistance::High);
        assert_eq!(s.clarity, Level::Low);
    }

    #[test]
    fn test_structure_marker_raises_clarity() {
        let s = estimate("quiero terminar la portada porque la entrego el lunes");
        assert_eq!(s.clarity, Level::High);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(estimate("DA IGUAL lo que haga hoy").resistance, Resistance::High);
    }
}
