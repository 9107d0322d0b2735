//! Blockage classification (v0.1.0).
//!
//! Two classifiers live here:
//! - `detect_blockages`: multi-label boolean matcher for the freeform flow.
//! - `score_blockage`: single-best confidence scorer used by the exercise
//!   catalog side.
//!
//! Their phrase tables overlap but are not identical. Problem scale and topic
//! extraction use their own tables. All tables are literal and ordered.

use crate::mental::{self, contains_any, MentalState};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Category of creative obstacle, in fixed declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockageId {
    BlankPage,
    LackOfFocus,
    IdeaOverload,
    Perfectionism,
    CreativeFatigue,
}

impl BlockageId {
    pub const ALL: [BlockageId; 5] = [
        BlockageId::BlankPage,
        BlockageId::LackOfFocus,
        BlockageId::IdeaOverload,
        BlockageId::Perfectionism,
        BlockageId::CreativeFatigue,
    ];

    /// Stable identifier used in storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockageId::BlankPage => "blank_page",
            BlockageId::LackOfFocus => "lack_of_focus",
            BlockageId::IdeaOverload => "idea_overload",
            BlockageId::Perfectionism => "perfectionism",
            BlockageId::CreativeFatigue => "creative_fatigue",
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            BlockageId::BlankPage => "Página en blanco",
            BlockageId::LackOfFocus => "Falta de foco",
            BlockageId::IdeaOverload => "Exceso de ideas",
            BlockageId::Perfectionism => "Perfeccionismo",
            BlockageId::CreativeFatigue => "Fatiga creativa",
        }
    }

    /// Parse a stored id, a label, or a 1-based menu number
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        if let Ok(n) = lowered.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == lowered || b.label().to_lowercase() == lowered)
    }
}

impl fmt::Display for BlockageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse sizing of the user's problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemScale {
    #[default]
    Small,
    Medium,
    Large,
}

impl ProblemScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemScale::Small => "small",
            ProblemScale::Medium => "medium",
            ProblemScale::Large => "large",
        }
    }
}

// === Multi-label matcher (freeform flow) ===

const BLANK_PAGE_PATTERNS: &[&str] = &[
    "página en blanco",
    "pagina en blanco",
    "en blanco",
    "por dónde empezar",
    "por donde empezar",
    "no sé qué hacer",
    "no se que hacer",
    "no tengo ideas",
    "sin ideas",
    "no se me ocurre",
    "no me sale nada",
];

const LACK_OF_FOCUS_PATTERNS: &[&str] = &[
    "me distraigo",
    "distrae",
    "distracción",
    "distraccion",
    "concentrar",
    "enfocar",
    "foco",
    "disperso",
    "dispersa",
    "procrastin",
    "saltando de",
];

const IDEA_OVERLOAD_PATTERNS: &[&str] = &[
    "demasiadas ideas",
    "muchas ideas",
    "no sé cuál",
    "no se cual",
    "elegir",
    "mezclad",
    "abrumad",
    "todo a la vez",
    "mil cosas",
];

const PERFECTIONISM_PATTERNS: &[&str] = &[
    "perfect",
    "nunca está bien",
    "nunca esta bien",
    "no es suficiente",
    "no es lo bastante",
    "miedo a equivocarme",
    "miedo al error",
    "me juzg",
    "borro todo",
    "rehago",
];

const CREATIVE_FATIGUE_PATTERNS: &[&str] = &[
    "cansad",
    "agotad",
    "sin energía",
    "sin energia",
    "sin ganas",
    "quemad",
    "aburrid",
    "rutina",
    "sin inspiración",
    "sin inspiracion",
];

/// Texts shorter than this read as a blank page
const VERY_SHORT_CHARS: usize = 15;
/// Texts at least this long read as idea overload
const VERY_LONG_CHARS: usize = 280;
/// Most categories the multi-label matcher returns
const MAX_CANDIDATES: usize = 3;

fn multi_label_table(blockage: BlockageId) -> &'static [&'static str] {
    match blockage {
        BlockageId::BlankPage => BLANK_PAGE_PATTERNS,
        BlockageId::LackOfFocus => LACK_OF_FOCUS_PATTERNS,
        BlockageId::IdeaOverload => IDEA_OVERLOAD_PATTERNS,
        BlockageId::Perfectionism => PERFECTIONISM_PATTERNS,
        BlockageId::CreativeFatigue => CREATIVE_FATIGUE_PATTERNS,
    }
}

/// Multi-label blockage detection. Never returns an empty list.
pub fn detect_blockages(text: &str) -> Vec<BlockageId> {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    let chars = trimmed.chars().count();

    let found: Vec<BlockageId> = BlockageId::ALL
        .iter()
        .copied()
        .filter(|b| match b {
            BlockageId::BlankPage if chars < VERY_SHORT_CHARS => true,
            BlockageId::IdeaOverload if chars >= VERY_LONG_CHARS => true,
            _ => contains_any(&lowered, multi_label_table(*b)),
        })
        .take(MAX_CANDIDATES)
        .collect();

    if found.is_empty() {
        vec![BlockageId::LackOfFocus]
    } else {
        found
    }
}

// === Confidence scorer (exercise catalog side) ===

const SCORED_PATTERNS: &[(BlockageId, &[&str])] = &[
    (
        BlockageId::BlankPage,
        &["en blanco", "empezar", "no se me ocurre", "vacío", "vacio", "idea inicial"],
    ),
    (
        BlockageId::LackOfFocus,
        &["distra", "concentr", "foco", "enfoc", "procrastin", "móvil"],
    ),
    (
        BlockageId::IdeaOverload,
        &["demasiadas", "muchas ideas", "elegir", "cuál", "abrum", "mezcl"],
    ),
    (
        BlockageId::Perfectionism,
        &["perfect", "suficiente", "miedo", "juzg", "error", "crític"],
    ),
    (
        BlockageId::CreativeFatigue,
        &["cansad", "agotad", "energía", "ganas", "quemad", "inspiraci"],
    ),
];

const MATCHES_FOR_FULL_CONFIDENCE: f32 = 3.0;

/// Best-match result of the confidence scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBlockage {
    pub blockage: BlockageId,
    /// 0.0-1.0
    pub confidence: f32,
}

/// Score every category as `matches / 3` and return the best one.
///
/// The winner is the category with the most matches; ties keep the earlier
/// category. The reported confidence is clamped to 1.0. Returns `None` when
/// nothing matched.
pub fn score_blockage(text: &str) -> Option<ScoredBlockage> {
    let lowered = text.to_lowercase();
    let mut best: Option<(BlockageId, usize)> = None;

    for (blockage, patterns) in SCORED_PATTERNS {
        let matches = patterns.iter().filter(|p| lowered.contains(*p)).count();
        if matches == 0 {
            continue;
        }
        if best.map_or(true, |(_, top)| matches > top) {
            best = Some((*blockage, matches));
        }
    }

    best.map(|(blockage, matches)| ScoredBlockage {
        blockage,
        confidence: (matches as f32 / MATCHES_FOR_FULL_CONFIDENCE).min(1.0),
    })
}

// === Problem scale ===

const LARGE_SCALE_PATTERNS: &[&str] = &[
    "negocio",
    "empresa",
    "estrategia",
    "marca",
    "clientes",
    "lanzar",
    "lanzamiento",
    "carrera profesional",
    "startup",
    "emprend",
    "mercado",
    "portfolio",
    "portafolio",
];

const MEDIUM_SCALE_PATTERNS: &[&str] = &[
    "confus",
    "mezclad",
    "foco",
    "enfoc",
    "no sé cuál",
    "no se cual",
    "perdid",
    "desorden",
    "prioridad",
    "priorizar",
    "disperso",
    "concentrar",
    "abrumad",
];

/// Problem scale from its own pattern table; defaults to `Small`.
pub fn detect_scale(text: &str) -> ProblemScale {
    let lowered = text.to_lowercase();
    if contains_any(&lowered, LARGE_SCALE_PATTERNS) {
        ProblemScale::Large
    } else if contains_any(&lowered, MEDIUM_SCALE_PATTERNS) {
        ProblemScale::Medium
    } else {
        ProblemScale::Small
    }
}

// === Topic extraction ===

const TOPIC_MIN_CHARS: usize = 3;

fn topic_regex() -> Option<&'static Regex> {
    static TOPIC_RE: OnceLock<Option<Regex>> = OnceLock::new();
    TOPIC_RE
        .get_or_init(|| {
            Regex::new(
                r"(?i)\b(?:sobre|acerca de|proyecto de|novela de|libro de|serie de|tema)\s+(?:(?:el|la|los|las|un|una|mi|mis)\s+)?([^.,;:!?¿¡\n]{3,60})",
            )
            .ok()
        })
        .as_ref()
}

/// Extract a concrete topic ("un cómic sobre dragones" -> "dragones").
pub fn extract_topic(text: &str) -> Option<String> {
    let caps = topic_regex()?.captures(text)?;
    let raw = caps.get(1)?.as_str();
    let topic = raw
        .split(" pero ")
        .next()
        .unwrap_or(raw)
        .trim()
        .to_string();

    if topic.chars().count() < TOPIC_MIN_CHARS {
        return None;
    }
    Some(topic)
}

/// Every classifier output for one free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub mental: MentalState,
    pub candidates: Vec<BlockageId>,
    pub best: Option<ScoredBlockage>,
    pub scale: ProblemScale,
    pub topic: Option<String>,
}

impl TextAnalysis {
    pub fn of(text: &str) -> Self {
        Self {
            mental: mental::estimate(text),
            candidates: detect_blockages(text),
            best: score_blockage(text),
            scale: detect_scale(text),
            topic: extract_topic(text),
        }
    }
}
