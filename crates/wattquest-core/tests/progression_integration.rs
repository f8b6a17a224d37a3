//! Integration tests for the progression engine.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use wattquest_core::{
    EngineSettings, Event, GamificationSession, NewGoal, Rank, StreakChange,
};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(offset)
}

fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

#[test]
fn test_xp_rollover_example() {
    let mut session = GamificationSession::new();
    session.add_xp(80).unwrap();
    let award = session.add_xp(30).unwrap();

    let progress = session.user_progress();
    assert!(award.leveled_up());
    assert_eq!(progress.level, 2);
    assert_eq!(progress.xp, 10);
    assert_eq!(progress.xp_to_next_level, 190);
    assert_eq!(progress.total_xp, 110);
}

#[test]
fn test_rank_climbs_with_levels() {
    let mut session = GamificationSession::new();
    // Levels 1..=4 need 100+200+300+400 = 1000 XP
    session.add_xp(1000).unwrap();
    assert_eq!(session.user_progress().level, 5);
    assert_eq!(session.user_progress().rank, Rank::Apprentice);

    let events = session.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::LeveledUp { to_level: 5, .. })));
}

#[test]
fn test_streak_lifecycle() {
    let mut session = GamificationSession::new();
    let id = "calculation_streak";

    assert_eq!(
        session.update_streak_on(id, day(0), at(day(0), 9)),
        Some(StreakChange::Started)
    );
    assert_eq!(
        session.update_streak_on(id, day(0), at(day(0), 21)),
        Some(StreakChange::SameDay)
    );
    assert_eq!(
        session.update_streak_on(id, day(1), at(day(1), 7)),
        Some(StreakChange::Extended)
    );
    assert_eq!(
        session.update_streak_on(id, day(6), at(day(6), 7)),
        Some(StreakChange::Reset)
    );

    let streak = session.streaks().iter().find(|s| s.id == id).unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 2);
    assert!(streak.longest_streak >= streak.current_streak);
}

#[test]
fn test_late_night_and_early_morning_are_consecutive() {
    let mut session = GamificationSession::new();
    let late = Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap();
    let early = Utc.with_ymd_and_hms(2024, 6, 2, 0, 1, 0).unwrap();

    session.update_streak_on("daily_usage", late.date_naive(), late);
    let change = session.update_streak_on("daily_usage", early.date_naive(), early);
    assert_eq!(change, Some(StreakChange::Extended));
}

#[test]
fn test_unknown_ids_are_silent_noops() {
    let mut session = GamificationSession::new();
    let before = session.stats();

    assert!(session.update_streak_on("nope", day(0), at(day(0), 8)).is_none());
    assert!(session.update_goal_progress("nope", 3.0).is_none());
    assert!(session.complete_goal("nope").is_none());
    assert!(session.delete_goal("nope").is_none());
    assert!(session.unlock_achievement("nope").is_none());
    assert!(session.earn_badge("nope").is_none());

    assert_eq!(session.stats(), before);
    assert!(session.take_events().is_empty());
}

#[test]
fn test_completed_goal_count_tracks_goal_flags() {
    let mut session = GamificationSession::new();
    let mut ids = Vec::new();
    for n in 0..3 {
        let spec = NewGoal::custom(&format!("Goal {n}"), None, 2.0, None, 7, 100, Utc::now()).unwrap();
        ids.push(session.add_goal(spec).unwrap().id.clone());
    }

    let count = |s: &GamificationSession| s.goals().iter().filter(|g| g.is_completed).count();

    session.complete_goal_at(&ids[0], day(0), at(day(0), 10));
    assert_eq!(session.stats().completed_goals, count(&session));
    session.update_goal_progress(&ids[1], 1.0);
    assert_eq!(session.stats().completed_goals, count(&session));
    session.complete_goal_at(&ids[2], day(0), at(day(0), 11));
    assert_eq!(session.stats().completed_goals, 2);
    session.delete_goal(&ids[0]);
    assert_eq!(session.stats().completed_goals, count(&session));
    assert_eq!(session.stats().completed_goals, 1);
}

#[test]
fn test_goal_completion_grants_reward_exactly_once() {
    let mut session = GamificationSession::new();
    let spec = NewGoal::custom("Unplug", None, 1.0, None, 7, 100, Utc::now()).unwrap();
    let id = session.add_goal(spec).unwrap().id.clone();

    let before = session.user_progress().total_xp;
    session.complete_goal_at(&id, day(0), at(day(0), 10));
    assert_eq!(session.user_progress().total_xp, before + 100);

    // Repeated completion is a no-op by default.
    session.complete_goal_at(&id, day(0), at(day(0), 11));
    assert_eq!(session.user_progress().total_xp, before + 100);
}

#[test]
fn test_five_completed_goals_unlock_goal_achiever() {
    let mut session = GamificationSession::new();
    for n in 0..5 {
        let spec = NewGoal::custom(&format!("Goal {n}"), None, 1.0, None, 7, 10, Utc::now()).unwrap();
        let id = session.add_goal(spec).unwrap().id.clone();
        session.complete_goal_at(&id, day(n), at(day(n), 10));
    }

    let achiever = session
        .achievements()
        .iter()
        .find(|a| a.id == "goal_achiever")
        .unwrap();
    assert!(achiever.is_unlocked);
    // 5 goals x 10 XP + 250 for the achievement
    assert_eq!(session.user_progress().total_xp, 300);
}

#[test]
fn test_template_goal_flow() {
    let mut session = GamificationSession::new();
    let now = at(day(0), 12);
    let goal = session.add_goal_from_template("quick_learner", now).unwrap();
    assert_eq!(goal.target, 5.0);
    assert_eq!(goal.end_date, now + Duration::days(1));
    let id = goal.id.clone();

    session.refresh(now + Duration::days(2), day(2));
    assert!(!session.goal(&id).unwrap().is_active);
}

#[test]
fn test_settings_switch_recompletion() {
    let mut session = GamificationSession::new().with_settings(EngineSettings {
        allow_recompletion: true,
        auto_check: false,
    });
    let spec = NewGoal::custom("Again", None, 1.0, None, 7, 40, Utc::now()).unwrap();
    let id = session.add_goal(spec).unwrap().id.clone();

    let first = session.complete_goal_at(&id, day(0), at(day(0), 8)).unwrap();
    let second = session.complete_goal_at(&id, day(0), at(day(0), 9)).unwrap();
    assert!(!first.already_completed);
    assert!(second.already_completed);
    assert!(second.xp_award.is_some());
    assert_eq!(session.user_progress().total_xp, 80);
}
