//! Integration tests for on-disk storage.

use chrono::Utc;
use wattquest_core::{Config, Database, GamificationSession, NewGoal};

#[test]
fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wattquest.db");

    {
        let db = Database::open_at(&path).unwrap();
        let mut session = GamificationSession::new();
        session.add_xp(250).unwrap();
        session.unlock_achievement("energy_saver");
        db.record_events(&session.take_events()).unwrap();
        db.save_session(&session).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let session = db.load_session().unwrap().expect("session stored");
    assert_eq!(session.user_progress().total_xp, 450);
    assert_eq!(session.stats().unlocked_achievements, 1);
    assert!(!db.recent_events(50).unwrap().is_empty());
}

#[test]
fn test_config_drives_engine_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[goals]\nallow_recompletion = true\n\n[achievements]\nauto_check = false\n").unwrap();

    let cfg = Config::load_from(&path).unwrap();
    let session = GamificationSession::new().with_settings(cfg.engine_settings());
    assert!(session.settings().allow_recompletion);
    assert!(!session.settings().auto_check);
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[goals\nbroken").unwrap();
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_non_finite_input_keeps_snapshot_loadable() {
    let db = Database::open_memory().unwrap();
    let mut session = GamificationSession::new();

    let spec = NewGoal::custom("Save", None, 5.0, None, 7, 50, Utc::now()).unwrap();
    let id = session.add_goal(spec).unwrap().id.clone();
    session.update_goal_progress(&id, f64::INFINITY);
    session.update_goal_progress(&id, f64::NAN);
    session.record_savings(f64::INFINITY);

    let mut bad = NewGoal::custom("Inf", None, 1.0, None, 7, 50, Utc::now()).unwrap();
    bad.target = f64::INFINITY;
    assert!(session.add_goal(bad).is_err());

    let events = session.take_events();
    db.persist(&session, &events).unwrap();

    let restored = db.load_session().unwrap().expect("session stored");
    assert_eq!(restored.goal(&id).unwrap().current, 0.0);
    assert_eq!(restored.metrics().savings, 0.0);
    assert_eq!(restored.goals().len(), 1);
}
