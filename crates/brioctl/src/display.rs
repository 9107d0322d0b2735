//! Terminal rendering for brioctl.

use crate::session::Reply;
use brio_common::blockage::TextAnalysis;
use brio_common::week::{WeekState, DAYS_IN_WEEK};
use brio_common::{BrainAction, Choice, LongTermMemory, Protocol};
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::Duration;

const KEY_WIDTH: usize = 18;

fn print_kv(key: &str, value: &str) {
    println!("{:width$} {}", key.dimmed(), value, width = KEY_WIDTH);
}

/// Print a reply line by line, pausing `pacing` between lines
pub async fn show_reply(reply: &Reply, pacing: Duration) {
    let mut first = true;
    for line in &reply.messages {
        if !first && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
        first = false;
        println!("{} {}", "brio>".cyan().bold(), line);
    }
    for idea in &reply.ideas {
        println!("      {} {}", "*".yellow(), idea);
    }
    if let Some(hint) = reply.action.as_ref().and_then(options_hint) {
        println!("      {}", hint.dimmed());
    }
}

fn options_hint(action: &BrainAction) -> Option<String> {
    match action {
        BrainAction::OfferNext { options } => Some(
            options
                .iter()
                .map(|c| format!("[{}]", c.label()))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        BrainAction::SuggestBlockage { .. } => Some(format!(
            "[{}] [{}] o escribe el número de otro bloqueo",
            Choice::Yes.label(),
            Choice::No.label()
        )),
        _ => None,
    }
}

pub fn prompt() {
    print!("{} ", "tú>".green().bold());
    let _ = std::io::stdout().flush();
}

pub fn print_analysis(text: &str, analysis: &TextAnalysis) {
    println!("{}", text.italic());
    println!();
    print_kv("energy", &format!("{:?}", analysis.mental.energy).to_lowercase());
    print_kv("clarity", &format!("{:?}", analysis.mental.clarity).to_lowercase());
    print_kv(
        "resistance",
        &format!("{:?}", analysis.mental.resistance).to_lowercase(),
    );
    let candidates = analysis
        .candidates
        .iter()
        .map(|b| b.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    print_kv("candidates", &candidates);
    match analysis.best {
        Some(best) => print_kv(
            "best_match",
            &format!("{} ({:.2})", best.blockage, best.confidence),
        ),
        None => print_kv("best_match", "-"),
    }
    print_kv("scale", analysis.scale.as_str());
    print_kv("topic", analysis.topic.as_deref().unwrap_or("-"));
}

pub fn print_stats(user: &str, memory: &LongTermMemory) {
    println!("{} {}", "Brio stats for".bold(), user.cyan());
    println!();
    print_kv("sessions", &memory.sessions.len().to_string());
    match memory.helpful_rate() {
        Some(rate) => print_kv("helpful_rate", &format!("{:.0}%", rate * 100.0)),
        None => print_kv("helpful_rate", "-"),
    }
    match memory.most_frequent_blockage() {
        Some((blockage, count)) => print_kv(
            "most_frequent",
            &format!("{} ({}x)", blockage.label(), count),
        ),
        None => print_kv("most_frequent", "-"),
    }

    if !memory.stats.protocol_scores.is_empty() {
        println!();
        println!("{}", "Protocol scores".bold());
        for (id, score) in &memory.stats.protocol_scores {
            let score = if *score > 0 {
                format!("+{}", score).green().to_string()
            } else if *score < 0 {
                score.to_string().red().to_string()
            } else {
                score.to_string()
            };
            print_kv(id, &score);
        }
    }

    if let Some(last) = memory.sessions.last() {
        println!();
        print_kv(
            "last_session",
            &format!(
                "{} ({})",
                last.ended_at.format("%Y-%m-%d %H:%M"),
                last.outcome.as_str()
            ),
        );
    }
}

pub fn print_week(week: Option<&WeekState>) {
    let Some(week) = week else {
        println!("No hay ningún plan de 7 días en marcha.");
        return;
    };

    println!("{} {}", "Plan de 7 días:".bold(), week.project_title.cyan());
    print_kv("started", &week.started_at.format("%Y-%m-%d").to_string());
    print_kv(
        "progress",
        &format!("{}/{}", week.days_done(), DAYS_IN_WEEK),
    );
    println!();
    for day in 1..=DAYS_IN_WEEK {
        let entry = week.days.get(&day);
        let mark = match entry {
            Some(e) if e.done => "[x]".green().to_string(),
            _ if day == week.current_day => "[>]".yellow().to_string(),
            _ => "[ ]".dimmed().to_string(),
        };
        let result = entry.and_then(|e| e.result.as_deref()).unwrap_or("");
        println!("  {} día {}  {}", mark, day, result);
    }
}

pub fn print_protocols(protocols: &[Protocol]) {
    for p in protocols {
        let blockages = if p.blockages.is_empty() {
            "(solo por invitación)".to_string()
        } else {
            p.blockages
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let scale = p.scale.map(|s| s.as_str()).unwrap_or("any");
        println!(
            "{:24} {:>2} pasos  {:6}  {}",
            p.id.cyan(),
            p.step_count(),
            scale,
            blockages.dimmed()
        );
    }
}
