//! Tone-adjusted phrasing.
//!
//! Every phrase has a neutral, a minimal (low energy) and a reassuring (high
//! resistance) variant. Bundles never exceed two lines.

use crate::mental::{Level, MentalState, Resistance};

/// Lines per message bundle
pub const MAX_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    /// Low energy: one small step at a time
    Minimal,
    /// High resistance: lower the stakes first
    Reassuring,
}

impl Tone {
    pub fn from_mental(mental: &MentalState) -> Self {
        if mental.energy == Level::Low {
            Tone::Minimal
        } else if mental.resistance == Resistance::High {
            Tone::Reassuring
        } else {
            Tone::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Opening,
    EmptyText,
    Suggest,
    AskBlockage,
    ExerciseComing,
    AskResponse,
    AskFeedback,
    FeedbackNeedsYesNo,
    TryAnother,
    Guardrail,
    OfferNext,
    ProtocolIntro,
    ProtocolNeedsAnswer,
    OfferWeek,
    OfferIdeas,
    DayDone,
    WeekDone,
    AskResumeWeek,
    ResumeDay,
    Closing,
}

/// (neutral, minimal, reassuring)
fn variants(phrase: Phrase) -> (&'static str, &'static str, &'static str) {
    match phrase {
        Phrase::Opening => (
            "Cuéntame qué te está frenando ahora mismo con tu proyecto.",
            "¿Qué te frena? Con una frase basta.",
            "Cuéntame qué te frena, sin filtros. No hay respuestas malas.",
        ),
        Phrase::EmptyText => (
            "Necesito que me escribas algo para poder ayudarte.",
            "Escribe aunque sea una palabra.",
            "No pasa nada si no sabes explicarlo bien. Escribe lo que salga.",
        ),
        Phrase::Suggest => (
            "Por lo que cuentas, parece que esto es lo que te bloquea:",
            "Creo que es esto:",
            "Es normal atascarse así. Creo que lo que te pasa es:",
        ),
        Phrase::AskBlockage => (
            "¿Cuál de estos bloqueos se parece más a lo que te pasa?",
            "Elige uno:",
            "Elige el que más se parezca, no tiene que ser exacto:",
        ),
        Phrase::ExerciseComing => (
            "Te propongo un ejercicio para esto.",
            "Un ejercicio corto:",
            "Vamos con algo sencillo, sin presión.",
        ),
        Phrase::AskResponse => (
            "Cuando lo hayas hecho, escribe aquí lo que salió.",
            "Escribe lo que salió.",
            "Escribe lo que salió, aunque te parezca poco.",
        ),
        Phrase::AskFeedback => (
            "¿Te ha ayudado? (sí / no)",
            "¿Ayudó? (sí / no)",
            "¿Te ha servido, aunque sea un poco? (sí / no)",
        ),
        Phrase::FeedbackNeedsYesNo => (
            "Respóndeme con sí o no, por favor.",
            "¿Sí o no?",
            "Con un sí o un no me basta.",
        ),
        Phrase::TryAnother => (
            "Vale, probemos con otra técnica distinta.",
            "Probemos otra.",
            "No pasa nada, no todas las técnicas sirven a todo el mundo. Probemos otra.",
        ),
        Phrase::Guardrail => (
            "Creo que hoy no es el día para forzarlo. Lo dejamos aquí y volvemos otro rato.",
            "Lo dejamos por hoy.",
            "Está bien parar. Descansar también es parte del proceso.",
        ),
        Phrase::OfferNext => (
            "¡Genial! ¿Quieres otra técnica, profundizar o terminar aquí?",
            "¿Otra, profundizar o terminar?",
            "Bien hecho. ¿Quieres otra técnica, profundizar o lo dejamos aquí?",
        ),
        Phrase::ProtocolIntro => (
            "Vamos a profundizar con un ejercicio guiado:",
            "Ejercicio guiado:",
            "Vamos paso a paso, a tu ritmo:",
        ),
        Phrase::ProtocolNeedsAnswer => (
            "Escribe tu respuesta para seguir.",
            "Escribe algo para seguir.",
            "Cualquier respuesta vale para seguir.",
        ),
        Phrase::OfferWeek => (
            "¿Quieres convertir este mapa en un plan de 7 días? (sí / no)",
            "¿Plan de 7 días? (sí / no)",
            "Si te apetece, podemos convertir esto en un plan de 7 días, sin compromiso. (sí / no)",
        ),
        Phrase::OfferIdeas => (
            "¿Quieres que te proponga algunas ideas sobre tu tema? (sí / no)",
            "¿Te doy ideas? (sí / no)",
            "Si quieres, te propongo unas ideas para arrancar. (sí / no)",
        ),
        Phrase::DayDone => (
            "Día completado. Mañana seguimos con el siguiente.",
            "Hecho por hoy.",
            "Día completado. Ir poco a poco también es avanzar.",
        ),
        Phrase::WeekDone => (
            "¡Has completado los 7 días!",
            "7 días completados.",
            "Has completado los 7 días. Eso tiene mucho mérito.",
        ),
        Phrase::AskResumeWeek => (
            "Tienes un plan de 7 días a medias. ¿Quieres continuar? (sí / no)",
            "¿Seguimos con tu plan? (sí / no)",
            "Tu plan de 7 días sigue aquí, sin prisa. ¿Quieres continuar? (sí / no)",
        ),
        Phrase::ResumeDay => (
            "Retomamos tu plan de 7 días.",
            "Seguimos.",
            "Retomamos tu plan, a tu ritmo.",
        ),
        Phrase::Closing => (
            "Gracias por pasar. Aquí estaré cuando quieras seguir.",
            "Hasta la próxima.",
            "Gracias por intentarlo hoy. Aquí estaré cuando quieras.",
        ),
    }
}

pub fn phrase(phrase: Phrase, tone: Tone) -> &'static str {
    let (neutral, minimal, reassuring) = variants(phrase);
    match tone {
        Tone::Neutral => neutral,
        Tone::Minimal => minimal,
        Tone::Reassuring => reassuring,
    }
}

/// Message bundle builder, capped at `MAX_LINES`
#[derive(Debug, Clone)]
pub struct Bundle {
    tone: Tone,
    lines: Vec<String>,
}

impl Bundle {
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            lines: Vec::with_capacity(MAX_LINES),
        }
    }

    pub fn say(mut self, p: Phrase) -> Self {
        self.lines.push(phrase(p, self.tone).to_string());
        self
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn finish(mut self) -> Vec<String> {
        self.lines.truncate(MAX_LINES);
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_priority() {
        let mut m = MentalState::default();
        assert_eq!(Tone::from_mental(&m), Tone::Neutral);
        m.resistance = Resistance::High;
        assert_eq!(Tone::from_mental(&m), Tone::Reassuring);
        m.energy = Level::Low;
        assert_eq!(Tone::from_mental(&m), Tone::Minimal);
    }

    #[test]
    fn test_bundle_capped() {
        let lines = Bundle::new(Tone::Neutral)
            .say(Phrase::Opening)
            .line("dos")
            .line("tres")
            .finish();
        assert_eq!(lines.len(), MAX_LINES);
        assert_eq!(lines[1], "dos");
    }
}
