//! Tests for protocol/ and week.rs

use brio_common::protocol::{find, protocols, ProtocolState, WEEK_PROTOCOL_ID};
use brio_common::week::{
    day_for_deliverable, day_start_step, deliverable_step, resumption, Resumption, WeekState,
    DAYS_IN_WEEK,
};
use chrono::{Duration, TimeZone, Utc};

#[test]
fn test_advance_past_completion_is_a_no_op_for_every_protocol() {
    for protocol in protocols() {
        let mut state = ProtocolState::new(protocol);
        for i in 0..protocol.step_count() + 3 {
            let before = state.current_step_index;
            state.advance(protocol, Some(format!("r{i}")));
            assert!(state.current_step_index >= before, "{}", protocol.id);
        }
        assert!(state.is_complete, "{}", protocol.id);
        assert_eq!(state.current_step_index, protocol.step_count());
        assert!(state.current_step(protocol).is_none());
    }
}

#[test]
fn test_every_protocol_opens_with_a_system_step() {
    for protocol in protocols() {
        let first = protocol.step(0).unwrap();
        assert!(!first.expects_input(), "{}", protocol.id);
        assert!(protocol.steps.iter().any(|s| s.expects_input()), "{}", protocol.id);
    }
}

#[test]
fn test_week_deliverables_are_prompts() {
    let week = find(WEEK_PROTOCOL_ID).unwrap();
    for day in 1..=DAYS_IN_WEEK {
        let step = week.step(deliverable_step(day)).unwrap();
        assert!(step.expects_input(), "day {day}");
        assert!(!week.step(day_start_step(day)).unwrap().expects_input());
        assert_eq!(day_for_deliverable(deliverable_step(day)), Some(day));
    }
}

#[test]
fn test_resume_at_mid_week() {
    let week = find(WEEK_PROTOCOL_ID).unwrap();
    let state = ProtocolState::at(week, day_start_step(5));
    assert_eq!(state.current_step_index, 16);
    assert!(!state.is_complete);
    assert!(state.current_step(week).unwrap().text().starts_with("Día 5"));
}

#[test]
fn test_resumption_rules() {
    let start = Utc.with_ymd_and_hms(2026, 7, 10, 22, 30, 0).unwrap();
    let mut week = WeekState::start("Mural", start);
    week.record_day(1, "un mural para el patio");

    assert_eq!(resumption(None, start), Resumption::None);
    assert_eq!(
        resumption(Some(&week), start + Duration::hours(2)),
        Resumption::AskConsent {
            day: 2,
            step_index: 4
        }
    );
    assert_eq!(
        resumption(Some(&week), start + Duration::minutes(20)),
        Resumption::Silent {
            day: 2,
            step_index: 4
        }
    );

    for day in 2..=DAYS_IN_WEEK {
        week.record_day(day, "hecho");
    }
    assert!(!week.is_in_progress());
    assert_eq!(resumption(Some(&week), start), Resumption::None);
}
