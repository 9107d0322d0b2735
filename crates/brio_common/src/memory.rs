//! Long-term memory: session history and cross-session counters.
//!
//! Sessions are append-only; counters are incremental. These counters are
//! the only learning signal kept between sessions.

use crate::blockage::BlockageId;
use crate::context::{Feedback, SessionContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a session ended, from its last feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Helpful,
    NotHelpful,
    #[default]
    Unknown,
}

impl Outcome {
    pub fn from_feedback(feedback: Option<Feedback>) -> Self {
        match feedback {
            Some(Feedback::Yes) => Outcome::Helpful,
            Some(Feedback::No) => Outcome::NotHelpful,
            None => Outcome::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Helpful => "helpful",
            Outcome::NotHelpful => "not_helpful",
            Outcome::Unknown => "unknown",
        }
    }
}

/// A finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockage_id: Option<BlockageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub blockage_counts: BTreeMap<BlockageId, u32>,
    #[serde(default)]
    pub protocol_scores: BTreeMap<String, i32>,
}

/// Durable per-user memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub stats: MemoryStats,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

impl LongTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the session and update the counters.
    ///
    /// Protocol scores only move on votes given right after a protocol.
    pub fn record_session(&mut self, ctx: &SessionContext, ended_at: DateTime<Utc>) -> SessionRecord {
        let record = SessionRecord {
            started_at: ctx.started_at,
            ended_at,
            blockage_id: ctx.blockage_id,
            protocol_id: ctx.protocol.as_ref().map(|p| p.protocol_id.clone()),
            outcome: Outcome::from_feedback(ctx.last_feedback),
        };

        if let Some(blockage) = ctx.blockage_id {
            *self.stats.blockage_counts.entry(blockage).or_insert(0) += 1;
        }
        for vote in &ctx.protocol_votes {
            let delta = match vote.feedback {
                Feedback::Yes => 1,
                Feedback::No => -1,
            };
            *self
                .stats
                .protocol_scores
                .entry(vote.protocol_id.clone())
                .or_insert(0) += delta;
        }

        self.sessions.push(record.clone());
        record
    }

    /// Blockage seen most often (ties keep the earlier category)
    pub fn most_frequent_blockage(&self) -> Option<(BlockageId, u32)> {
        self.stats
            .blockage_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .fold(None, |best: Option<(BlockageId, u32)>, (b, c)| match best {
                Some((_, best_count)) if best_count >= *c => best,
                _ => Some((*b, *c)),
            })
    }

    pub fn protocol_score(&self, protocol_id: &str) -> i32 {
        self.stats.protocol_scores.get(protocol_id).copied().unwrap_or(0)
    }

    /// Share of sessions with a known outcome that helped
    pub fn helpful_rate(&self) -> Option<f64> {
        let known: Vec<&SessionRecord> = self
            .sessions
            .iter()
            .filter(|s| s.outcome != Outcome::Unknown)
            .collect();
        if known.is_empty() {
            return None;
        }
        let helpful = known.iter().filter(|s| s.outcome == Outcome::Helpful).count();
        Some(helpful as f64 / known.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProtocolVote;
    use crate::protocol::{find, ProtocolState};
    use chrono::TimeZone;

    fn ctx() -> SessionContext {
        SessionContext::new(Utc.with_ymd_and_hms(2026, 2, 1, 18, 0, 0).unwrap())
    }

    #[test]
    fn test_record_unknown_session() {
        let mut memory = LongTermMemory::new();
        let ended = Utc.with_ymd_and_hms(2026, 2, 1, 18, 5, 0).unwrap();
        let record = memory.record_session(&ctx(), ended);
        assert_eq!(record.outcome, Outcome::Unknown);
        assert_eq!(record.ended_at, ended);
        assert!(memory.stats.blockage_counts.is_empty());
        assert!(memory.stats.protocol_scores.is_empty());
    }

    fn vote(protocol_id: &str, feedback: Feedback) -> ProtocolVote {
        ProtocolVote {
            protocol_id: protocol_id.to_string(),
            feedback,
        }
    }

    #[test]
    fn test_counters_follow_feedback() {
        let mut memory = LongTermMemory::new();
        let protocol = find("foco_25").unwrap();

        let mut c = ctx();
        c.blockage_id = Some(BlockageId::LackOfFocus);
        c.protocol = Some(ProtocolState::new(protocol));
        c.last_feedback = Some(Feedback::Yes);
        c.protocol_votes = vec![vote("foco_25", Feedback::Yes)];
        memory.record_session(&c, c.started_at);
        memory.record_session(&c, c.started_at);

        c.last_feedback = Some(Feedback::No);
        c.protocol_votes = vec![vote("foco_25", Feedback::No)];
        memory.record_session(&c, c.started_at);

        assert_eq!(memory.stats.blockage_counts[&BlockageId::LackOfFocus], 3);
        assert_eq!(memory.protocol_score("foco_25"), 1);
        assert_eq!(memory.sessions.len(), 3);
        assert_eq!(memory.sessions[2].outcome, Outcome::NotHelpful);
        assert!((memory.helpful_rate().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_feedback_without_vote_leaves_protocol_score() {
        let mut memory = LongTermMemory::new();
        let mut c = ctx();
        c.protocol = Some(ProtocolState::new(find("primeros_7_dias").unwrap()));
        c.last_feedback = Some(Feedback::Yes);

        let record = memory.record_session(&c, c.started_at);
        assert_eq!(record.outcome, Outcome::Helpful);
        assert_eq!(record.protocol_id.as_deref(), Some("primeros_7_dias"));
        assert!(memory.stats.protocol_scores.is_empty());

        c.protocol_votes = vec![
            vote("mapa_proyecto", Feedback::Yes),
            vote("primeros_7_dias", Feedback::No),
        ];
        memory.record_session(&c, c.started_at);
        assert_eq!(memory.protocol_score("mapa_proyecto"), 1);
        assert_eq!(memory.protocol_score("primeros_7_dias"), -1);
    }

    #[test]
    fn test_most_frequent_blockage() {
        let mut memory = LongTermMemory::new();
        assert_eq!(memory.most_frequent_blockage(), None);
        memory.stats.blockage_counts.insert(BlockageId::Perfectionism, 2);
        memory.stats.blockage_counts.insert(BlockageId::BlankPage, 2);
        memory.stats.blockage_counts.insert(BlockageId::CreativeFatigue, 1);
        assert_eq!(memory.most_frequent_blockage(), Some((BlockageId::BlankPage, 2)));
    }

    #[test]
    fn test_json_keys_are_snake_case() {
        let mut memory = LongTermMemory::new();
        memory.stats.blockage_counts.insert(BlockageId::IdeaOverload, 1);
        let json = serde_json::to_string(&memory).unwrap();
        assert!(json.contains("\"idea_overload\":1"));
        let back: LongTermMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, memory);
    }
}
