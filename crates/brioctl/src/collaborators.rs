//! Exercise and idea providers used by the session driver.
//!
//! The brain only asks for "an exercise for this blockage" or "ideas for this
//! topic"; where they come from is behind these traits. The local sources
//! ship a static catalog. Tests use fakes.

use anyhow::{bail, Result};
use async_trait::async_trait;
use brio_common::BlockageId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

/// A single-shot technique shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub technique_id: String,
    pub title: String,
    pub instructions: String,
}

#[async_trait]
pub trait ExerciseSource: Send + Sync {
    /// Exercise for `blockage`, avoiding `last_technique_id` when possible
    async fn fetch_exercise(
        &self,
        blockage: BlockageId,
        last_technique_id: Option<&str>,
    ) -> Result<Exercise>;
}

#[async_trait]
pub trait IdeaSource: Send + Sync {
    async fn ideas_for(&self, topic: &str) -> Result<Vec<String>>;
}

struct Technique {
    id: &'static str,
    title: &'static str,
    instructions: &'static str,
}

const BLANK_PAGE: &[Technique] = &[
    Technique {
        id: "escritura_libre",
        title: "Escritura libre de 5 minutos",
        instructions: "Escribe sin parar durante 5 minutos sobre tu proyecto, sin corregir nada.",
    },
    Technique {
        id: "palabra_semilla",
        title: "Palabra semilla",
        instructions: "Elige una palabra al azar de un libro cercano y crea algo a partir de ella.",
    },
    Technique {
        id: "primera_linea_robada",
        title: "Primera línea prestada",
        instructions: "Copia la primera frase de un libro que te guste y continúala con tu tema.",
    },
];

const LACK_OF_FOCUS: &[Technique] = &[
    Technique {
        id: "una_sola_tarea",
        title: "Una sola tarea",
        instructions: "Escribe en un papel la única tarea de los próximos 15 minutos y cierra todo lo demás.",
    },
    Technique {
        id: "vaciado_mental",
        title: "Vaciado mental",
        instructions: "Anota en 3 minutos todo lo que te ronda la cabeza y luego elige un solo punto.",
    },
    Technique {
        id: "modo_avion",
        title: "Modo avión",
        instructions: "Pon el móvil en modo avión fuera de la habitación y trabaja 10 minutos seguidos.",
    },
];

const IDEA_OVERLOAD: &[Technique] = &[
    Technique {
        id: "tres_columnas",
        title: "Tres columnas",
        instructions: "Reparte tus ideas en: ahora, más adelante y nunca. Solo una puede ir en 'ahora'.",
    },
    Technique {
        id: "moneda",
        title: "Lanza una moneda",
        instructions: "Enfrenta tus dos ideas favoritas a cara o cruz y fíjate en cuál deseabas que saliera.",
    },
    Technique {
        id: "aparcamiento",
        title: "Aparcamiento de ideas",
        instructions: "Crea una nota llamada 'después' y mueve allí todas las ideas menos una.",
    },
];

const PERFECTIONISM: &[Technique] = &[
    Technique {
        id: "version_cero",
        title: "Versión cero",
        instructions: "Haz una versión que nadie verá nunca, en la mitad del tiempo que te parece razonable.",
    },
    Technique {
        id: "limite_de_cambios",
        title: "Tres cambios y fuera",
        instructions: "Permítete solo tres correcciones. Después, la pieza se da por terminada.",
    },
    Technique {
        id: "error_a_proposito",
        title: "Error a propósito",
        instructions: "Introduce un fallo deliberado en tu trabajo y déjalo ahí.",
    },
];

const CREATIVE_FATIGUE: &[Technique] = &[
    Technique {
        id: "paseo_sensorial",
        title: "Paseo sensorial",
        instructions: "Sal 10 minutos y anota tres sonidos, tres colores y tres texturas.",
    },
    Technique {
        id: "cambio_de_medio",
        title: "Cambio de medio",
        instructions: "Trabaja tu idea en un formato distinto al habitual: dibújala, cántala o modélala.",
    },
    Technique {
        id: "micro_descanso",
        title: "Descanso con intención",
        instructions: "Túmbate 5 minutos sin pantallas y piensa solo en lo que te gustaba de este proyecto.",
    },
];

fn techniques(blockage: BlockageId) -> &'static [Technique] {
    match blockage {
        BlockageId::BlankPage => BLANK_PAGE,
        BlockageId::LackOfFocus => LACK_OF_FOCUS,
        BlockageId::IdeaOverload => IDEA_OVERLOAD,
        BlockageId::Perfectionism => PERFECTIONISM,
        BlockageId::CreativeFatigue => CREATIVE_FATIGUE,
    }
}

/// Static technique catalog with random rotation
pub struct LocalExerciseSource {
    rng: Mutex<StdRng>,
}

impl LocalExerciseSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for LocalExerciseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExerciseSource for LocalExerciseSource {
    async fn fetch_exercise(
        &self,
        blockage: BlockageId,
        last_technique_id: Option<&str>,
    ) -> Result<Exercise> {
        let all = techniques(blockage);
        let fresh: Vec<&Technique> = all
            .iter()
            .filter(|t| Some(t.id) != last_technique_id)
            .collect();
        let pool: Vec<&Technique> = if fresh.is_empty() {
            all.iter().collect()
        } else {
            fresh
        };

        let picked = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(_) => bail!("technique picker lock poisoned"),
            };
            pool.choose(&mut *rng).copied()
        };
        let Some(technique) = picked else {
            bail!("no techniques for {}", blockage);
        };

        Ok(Exercise {
            technique_id: technique.id.to_string(),
            title: technique.title.to_string(),
            instructions: technique.instructions.to_string(),
        })
    }
}

const IDEA_TEMPLATES: &[&str] = &[
    "Cuenta {topic} desde el punto de vista de algo que nadie mira.",
    "Haz una versión de {topic} que quepa en una sola página.",
    "Mezcla {topic} con el último sueño que recuerdes.",
    "Imagina {topic} dentro de cien años.",
    "Quita a {topic} su elemento más obvio y mira qué queda.",
];

const IDEAS_PER_REQUEST: usize = 3;

/// Topic templates filled with the user's own words
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalIdeaSource;

#[async_trait]
impl IdeaSource for LocalIdeaSource {
    async fn ideas_for(&self, topic: &str) -> Result<Vec<String>> {
        let topic = topic.trim();
        if topic.is_empty() {
            bail!("empty topic");
        }
        // Rotate the starting template with the topic so repeats differ
        let offset = topic.chars().count() % IDEA_TEMPLATES.len();
        Ok(IDEA_TEMPLATES
            .iter()
            .cycle()
            .skip(offset)
            .take(IDEAS_PER_REQUEST)
            .map(|t| t.replace("{topic}", topic))
            .collect())
    }
}
