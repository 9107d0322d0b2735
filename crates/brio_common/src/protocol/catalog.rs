//! Static protocol catalog.

use super::ProtocolStep::{Prompt, System};
use super::{Protocol, ProtocolStep};
use crate::blockage::{BlockageId, ProblemScale};

/// Id of the 7-day protocol, tracked across sessions by the week tracker
pub const WEEK_PROTOCOL_ID: &str = "primeros_7_dias";

static PRIMER_TRAZO: [ProtocolStep; 4] = [
    System("Vamos con algo mínimo: nada de lo que escribas ahora tiene que quedarse."),
    Prompt("Escribe una sola palabra que tenga que ver con tu proyecto."),
    Prompt("Ahora escribe una frase que empiece con esa palabra."),
    System("Eso ya es material real. La página dejó de estar en blanco."),
];

static TRES_PREGUNTAS: [ProtocolStep; 5] = [
    System("Tres preguntas rápidas para encontrar la puerta de entrada."),
    Prompt("¿Para quién es esto que quieres crear?"),
    Prompt("¿Qué debería sentir esa persona al verlo?"),
    Prompt("¿Cuál es la parte más pequeña que podrías hacer hoy?"),
    System("Con esas tres respuestas ya tienes un punto de partida."),
];

static FOCO_25: [ProtocolStep; 5] = [
    System("Vamos a acotar el foco a una sola cosa durante 25 minutos."),
    Prompt("¿Qué es lo único que vas a trabajar en este bloque?"),
    Prompt("¿Qué vas a apartar de tu vista mientras tanto?"),
    System("Pon un temporizador de 25 minutos y trabaja solo en eso."),
    Prompt("¿Qué conseguiste en ese bloque?"),
];

static EMBUDO_DE_IDEAS: [ProtocolStep; 5] = [
    System("Vamos a pasar tus ideas por un embudo."),
    Prompt("Escribe todas las ideas que tienes en la cabeza, separadas por comas."),
    Prompt("De esa lista, ¿cuáles son las tres que más te ilusionan?"),
    Prompt("Si solo pudieras hacer una este mes, ¿cuál sería?"),
    System("Las demás no se pierden: quedan aparcadas para después."),
];

static SUFICIENTEMENTE_BUENO: [ProtocolStep; 4] = [
    System("Hoy el objetivo es terminar, no que quede perfecto."),
    Prompt("¿Qué significaría que esta pieza esté \"suficientemente bien\"?"),
    Prompt("¿Qué detalle vas a dejar imperfecto a propósito?"),
    System("Terminar algo imperfecto enseña más que pulir algo sin fin."),
];

static BORRADOR_FEO: [ProtocolStep; 3] = [
    System("Reto: haz la versión más fea posible en 10 minutos."),
    Prompt("Cuéntame qué hiciste en ese borrador feo."),
    System("Ahora tienes algo que mejorar, que es más fácil que crear de cero."),
];

static RECARGA_CREATIVA: [ProtocolStep; 4] = [
    System("Cuando la energía está baja, toca recargar antes de producir."),
    Prompt("¿Qué te inspiraba cuando empezaste con esto?"),
    Prompt("Elige algo pequeño y ajeno a tu proyecto que te apetezca hacer hoy."),
    System("Date permiso para eso. La energía vuelve con estímulos nuevos."),
];

static MAPA_PROYECTO: [ProtocolStep; 6] = [
    System("Es un proyecto grande, así que vamos a dibujar el mapa completo."),
    Prompt("¿Cuál es el resultado final que imaginas?"),
    Prompt("¿Cuáles son las tres o cuatro grandes partes del proyecto?"),
    Prompt("¿Qué parte depende de las demás y debería ir primero?"),
    Prompt("¿Qué primer paso concreto cabe en una semana?"),
    System("Ya tienes el mapa. Ahora se trata de recorrerlo día a día."),
];

/// Four steps per day; the fourth captures the day's deliverable.
static PRIMEROS_7_DIAS: [ProtocolStep; 28] = [
    // Day 1
    System("Día 1: definir el proyecto en una frase."),
    System("Piensa en qué harías si solo tuvieras esta semana."),
    System("No busques la frase perfecta, busca una honesta."),
    Prompt("Escribe tu proyecto en una sola frase."),
    // Day 2
    System("Día 2: reunir referencias."),
    System("Busca cinco cosas que se parezcan a lo que quieres hacer."),
    System("Fíjate en qué tienen en común."),
    Prompt("¿Qué tienen en común tus referencias?"),
    // Day 3
    System("Día 3: primer boceto."),
    System("Haz una versión rápida, sin detalles."),
    System("Lo importante es que exista, no que esté bien."),
    Prompt("Describe tu primer boceto."),
    // Day 4
    System("Día 4: elegir la pieza central."),
    System("Mira el boceto y busca la parte con más vida."),
    System("Esa parte será el centro de todo lo demás."),
    Prompt("¿Cuál es la pieza central de tu proyecto?"),
    // Day 5
    System("Día 5: desarrollar la pieza central."),
    System("Dedica una sesión solo a esa parte."),
    System("Ignora el resto por hoy."),
    Prompt("¿Cómo avanzó la pieza central?"),
    // Day 6
    System("Día 6: mostrarlo a alguien."),
    System("Elige a una persona de confianza y enséñale lo que tienes."),
    System("Escucha sin defenderte."),
    Prompt("¿Qué te dijeron y qué te llevas?"),
    // Day 7
    System("Día 7: cerrar la semana."),
    System("Repasa todo lo que hiciste estos días."),
    System("Decide cuál es el siguiente paso después de esta semana."),
    Prompt("¿Cuál es tu siguiente paso?"),
];

static PROTOCOLS: [Protocol; 9] = [
    Protocol {
        id: "primer_trazo",
        name: "Primer trazo",
        blockages: &[BlockageId::BlankPage],
        scale: Some(ProblemScale::Small),
        steps: &PRIMER_TRAZO,
        offers_week: false,
    },
    Protocol {
        id: "tres_preguntas",
        name: "Tres preguntas",
        blockages: &[BlockageId::BlankPage, BlockageId::LackOfFocus],
        scale: Some(ProblemScale::Medium),
        steps: &TRES_PREGUNTAS,
        offers_week: false,
    },
    Protocol {
        id: "foco_25",
        name: "Foco de 25 minutos",
        blockages: &[BlockageId::LackOfFocus],
        scale: Some(ProblemScale::Small),
        steps: &FOCO_25,
        offers_week: false,
    },
    Protocol {
        id: "embudo_de_ideas",
        name: "Embudo de ideas",
        blockages: &[BlockageId::IdeaOverload],
        scale: Some(ProblemScale::Medium),
        steps: &EMBUDO_DE_IDEAS,
        offers_week: false,
    },
    Protocol {
        id: "suficientemente_bueno",
        name: "Suficientemente bueno",
        blockages: &[BlockageId::Perfectionism],
        scale: None,
        steps: &SUFICIENTEMENTE_BUENO,
        offers_week: false,
    },
    Protocol {
        id: "borrador_feo",
        name: "Borrador feo",
        blockages: &[BlockageId::Perfectionism, BlockageId::BlankPage],
        scale: Some(ProblemScale::Small),
        steps: &BORRADOR_FEO,
        offers_week: false,
    },
    Protocol {
        id: "recarga_creativa",
        name: "Recarga creativa",
        blockages: &[BlockageId::CreativeFatigue],
        scale: None,
        steps: &RECARGA_CREATIVA,
        offers_week: false,
    },
    Protocol {
        id: "mapa_proyecto",
        name: "Mapa del proyecto",
        blockages: &[
            BlockageId::BlankPage,
            BlockageId::LackOfFocus,
            BlockageId::IdeaOverload,
        ],
        scale: Some(ProblemScale::Large),
        steps: &MAPA_PROYECTO,
        offers_week: true,
    },
    Protocol {
        id: WEEK_PROTOCOL_ID,
        name: "Primeros 7 días",
        blockages: &[],
        scale: Some(ProblemScale::Large),
        steps: &PRIMEROS_7_DIAS,
        offers_week: false,
    },
];

/// Every known protocol
pub fn protocols() -> &'static [Protocol] {
    &PROTOCOLS
}

/// Look up a protocol by id
pub fn find(id: &str) -> Option<&'static Protocol> {
    PROTOCOLS.iter().find(|p| p.id == id)
}
