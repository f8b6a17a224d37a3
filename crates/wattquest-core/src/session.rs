//! The gamification session: one owned store for every ledger.
//!
//! All operations take `&mut self` and finish before returning, so a
//! check-and-set (unlock an achievement, complete a goal) always reads
//! the same state it writes. Operations on unknown ids return `None`
//! and leave the session untouched.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::achievement::{default_achievements, default_badges, Achievement, ActivityMetrics, Badge};
use crate::error::ValidationError;
use crate::events::Event;
use crate::goal::{find_template, Goal, NewGoal};
use crate::progress::{UserProgress, XpAward};
use crate::stats::GamificationStats;
use crate::streak::{default_streaks, Streak, StreakChange, CALCULATION_STREAK, DAILY_USAGE, GOAL_STREAK};

/// Behaviour switches, normally taken from [`Config`](crate::Config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Re-award XP when an already completed goal is completed again.
    pub allow_recompletion: bool,
    /// Evaluate achievement rules after every metric change.
    pub auto_check: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            allow_recompletion: false,
            auto_check: true,
        }
    }
}

/// Result of [`GamificationSession::complete_goal`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalCompletion {
    pub goal_id: String,
    /// The goal was already completed and nothing changed.
    pub already_completed: bool,
    pub xp_award: Option<XpAward>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationSession {
    achievements: Vec<Achievement>,
    badges: Vec<Badge>,
    streaks: Vec<Streak>,
    goals: Vec<Goal>,
    progress: UserProgress,
    #[serde(default)]
    metrics: ActivityMetrics,
    #[serde(skip)]
    settings: EngineSettings,
    #[serde(skip)]
    events: Vec<Event>,
}

impl Default for GamificationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GamificationSession {
    /// Fresh session seeded from the built-in catalogs.
    pub fn new() -> Self {
        Self {
            achievements: default_achievements(),
            badges: default_badges(),
            streaks: default_streaks(),
            goals: Vec::new(),
            progress: UserProgress::new(Utc::now()),
            metrics: ActivityMetrics::default(),
            settings: EngineSettings::default(),
            events: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Append catalog entries missing from a restored snapshot.
    pub fn reconcile_catalogs(&mut self) -> usize {
        let mut added = 0;
        for a in default_achievements() {
            if !self.achievements.iter().any(|x| x.id == a.id) {
                self.achievements.push(a);
                added += 1;
            }
        }
        for b in default_badges() {
            if !self.badges.iter().any(|x| x.id == b.id) {
                self.badges.push(b);
                added += 1;
            }
        }
        for s in default_streaks() {
            if !self.streaks.iter().any(|x| x.id == s.id) {
                self.streaks.push(s);
                added += 1;
            }
        }
        added
    }

    // ── Read-only projections ──────────────────────────────────────────

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn streaks(&self) -> &[Streak] {
        &self.streaks
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn user_progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn metrics(&self) -> &ActivityMetrics {
        &self.metrics
    }

    pub fn stats(&self) -> GamificationStats {
        GamificationStats::project(
            &self.achievements,
            &self.badges,
            &self.streaks,
            &self.goals,
            &self.progress,
        )
    }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Progress ───────────────────────────────────────────────────────

    /// # Errors
    /// Rejects a zero award.
    pub fn add_xp(&mut self, amount: u32) -> Result<XpAward, ValidationError> {
        self.award_xp(amount, "manual")
    }

    fn award_xp(&mut self, amount: u32, reason: &str) -> Result<XpAward, ValidationError> {
        let award = self.progress.add_xp(amount)?;
        let now = Utc::now();

        self.events.push(Event::XpAwarded {
            amount,
            reason: reason.to_string(),
            total_xp: award.total_xp,
            at: now,
        });
        if award.leveled_up() {
            info!(
                from = award.level_before,
                to = award.level_after,
                rank = %award.rank_after,
                "level up"
            );
            self.events.push(Event::LeveledUp {
                from_level: award.level_before,
                to_level: award.level_after,
                rank: award.rank_after,
                at: now,
            });
        }
        Ok(award)
    }

    // ── Goals ──────────────────────────────────────────────────────────

    /// # Errors
    /// Returns the validation failure of `spec`.
    pub fn add_goal(&mut self, spec: NewGoal) -> Result<&Goal, ValidationError> {
        spec.validate()?;
        let goal = Goal::from_new(format!("goal-{}", Uuid::new_v4()), spec);
        debug!(goal_id = %goal.id, title = %goal.title, "goal added");

        self.events.push(Event::GoalAdded {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            at: Utc::now(),
        });
        self.goals.push(goal);
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// # Errors
    /// Fails when `template_id` is not a known template.
    pub fn add_goal_from_template(
        &mut self,
        template_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&Goal, ValidationError> {
        let template = find_template(template_id).ok_or_else(|| {
            ValidationError::UnknownCatalogEntry {
                kind: "goal template",
                id: template_id.to_string(),
            }
        })?;
        self.add_goal(template.instantiate(now))
    }

    /// Set progress, clamped to `0..=target`.
    ///
    /// A non-finite `value` leaves the goal unchanged.
    pub fn update_goal_progress(&mut self, id: &str, value: f64) -> Option<&Goal> {
        let Some(idx) = self.goal_index(id) else {
            debug!(goal_id = id, "progress update for unknown goal ignored");
            return None;
        };
        let goal = &mut self.goals[idx];
        if !goal.set_progress(value) {
            debug!(goal_id = id, value, "non-finite goal progress ignored");
            return Some(&self.goals[idx]);
        }

        self.events.push(Event::GoalProgressed {
            goal_id: goal.id.clone(),
            current: goal.current,
            target: goal.target,
            at: Utc::now(),
        });
        Some(&self.goals[idx])
    }

    pub fn complete_goal(&mut self, id: &str) -> Option<GoalCompletion> {
        self.complete_goal_at(id, Local::now().date_naive(), Utc::now())
    }

    /// Complete a goal and award its XP.
    ///
    /// A goal that is already completed is left alone unless
    /// [`EngineSettings::allow_recompletion`] is set.
    pub fn complete_goal_at(
        &mut self,
        id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<GoalCompletion> {
        let Some(idx) = self.goal_index(id) else {
            debug!(goal_id = id, "completion of unknown goal ignored");
            return None;
        };

        let was_completed = self.goals[idx].is_completed;
        if was_completed && !self.settings.allow_recompletion {
            debug!(goal_id = id, "goal already completed");
            return Some(GoalCompletion {
                goal_id: id.to_string(),
                already_completed: true,
                xp_award: None,
            });
        }

        let goal = &mut self.goals[idx];
        goal.mark_completed(now);
        let reward = goal.xp_reward;
        info!(goal_id = id, xp = reward, "goal completed");

        self.events.push(Event::GoalCompleted {
            goal_id: id.to_string(),
            xp_reward: reward,
            at: now,
        });

        let xp_award = if reward > 0 {
            self.award_xp(reward, &format!("goal:{id}")).ok()
        } else {
            None
        };

        if !was_completed {
            self.metrics.goals_completed += 1;
        }
        self.update_streak_on(GOAL_STREAK, today, now);

        Some(GoalCompletion {
            goal_id: id.to_string(),
            already_completed: was_completed,
            xp_award,
        })
    }

    /// Remove a goal. Achievements and lifetime counters are unaffected.
    pub fn delete_goal(&mut self, id: &str) -> Option<Goal> {
        let Some(idx) = self.goal_index(id) else {
            debug!(goal_id = id, "delete of unknown goal ignored");
            return None;
        };
        let goal = self.goals.remove(idx);
        self.events.push(Event::GoalDeleted {
            goal_id: goal.id.clone(),
            at: Utc::now(),
        });
        Some(goal)
    }

    fn goal_index(&self, id: &str) -> Option<usize> {
        self.goals.iter().position(|g| g.id == id)
    }

    // ── Streaks ────────────────────────────────────────────────────────

    /// Record a streak action for the current local date.
    pub fn update_streak(&mut self, id: &str) -> Option<StreakChange> {
        self.update_streak_on(id, Local::now().date_naive(), Utc::now())
    }

    pub fn update_streak_on(
        &mut self,
        id: &str,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Option<StreakChange> {
        let Some(streak) = self.streaks.iter_mut().find(|s| s.id == id) else {
            debug!(streak_id = id, "update of unknown streak ignored");
            return None;
        };
        let change = streak.record(today, at);
        debug!(streak_id = id, ?change, current = streak.current_streak, "streak recorded");

        self.events.push(Event::StreakUpdated {
            streak_id: streak.id.clone(),
            change,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            at,
        });

        self.refresh_streak_metric(today);
        self.after_metrics_change();
        Some(change)
    }

    fn refresh_streak_metric(&mut self, today: NaiveDate) {
        self.metrics.streak_days = self
            .streaks
            .iter()
            .find(|s| s.id == DAILY_USAGE && s.is_alive_on(today))
            .map_or(0, |s| s.current_streak);
    }

    // ── Achievements & badges ──────────────────────────────────────────

    /// Unlock an achievement and award its XP.
    ///
    /// `Some(true)` when this call unlocked it, `Some(false)` when it was
    /// already unlocked (no XP), `None` for an unknown id.
    pub fn unlock_achievement(&mut self, id: &str) -> Option<bool> {
        let Some(achievement) = self.achievements.iter_mut().find(|a| a.id == id) else {
            debug!(achievement_id = id, "unlock of unknown achievement ignored");
            return None;
        };
        let now = Utc::now();
        if !achievement.unlock(now) {
            return Some(false);
        }
        let reward = achievement.xp_reward;
        info!(achievement_id = id, xp = reward, "achievement unlocked");

        self.events.push(Event::AchievementUnlocked {
            achievement_id: id.to_string(),
            xp_reward: reward,
            at: now,
        });
        if reward > 0 {
            // Non-zero, cannot fail validation.
            let _ = self.award_xp(reward, &format!("achievement:{id}"));
        }
        Some(true)
    }

    /// Same contract as [`unlock_achievement`](Self::unlock_achievement), without XP.
    pub fn earn_badge(&mut self, id: &str) -> Option<bool> {
        let Some(badge) = self.badges.iter_mut().find(|b| b.id == id) else {
            debug!(badge_id = id, "earn of unknown badge ignored");
            return None;
        };
        let now = Utc::now();
        if !badge.earn(now) {
            return Some(false);
        }
        info!(badge_id = id, tier = ?badge.tier, "badge earned");
        self.events.push(Event::BadgeEarned {
            badge_id: id.to_string(),
            at: now,
        });
        Some(true)
    }

    /// Evaluate every locked achievement against the current metrics.
    ///
    /// Returns the ids unlocked by this call.
    pub fn check_achievements(&mut self) -> Vec<String> {
        let mut satisfied = Vec::new();
        for achievement in self.achievements.iter_mut().filter(|a| !a.is_unlocked) {
            if achievement.criteria.evaluate(&self.metrics) {
                satisfied.push(achievement.id.clone());
            }
        }

        satisfied
            .into_iter()
            .filter(|id| self.unlock_achievement(id) == Some(true))
            .collect()
    }

    fn after_metrics_change(&mut self) {
        if self.settings.auto_check {
            self.check_achievements();
        }
    }

    // ── Activity feed ──────────────────────────────────────────────────

    /// Daily app open.
    pub fn check_in(&mut self, today: NaiveDate, at: DateTime<Utc>) -> Option<StreakChange> {
        self.update_streak_on(DAILY_USAGE, today, at)
    }

    /// One appliance cost calculation.
    pub fn record_calculation(&mut self, today: NaiveDate, at: DateTime<Utc>) -> Option<StreakChange> {
        self.metrics.calculations += 1;
        self.update_streak_on(CALCULATION_STREAK, today, at)
    }

    /// Current monthly savings figure; negative values count as zero.
    ///
    /// Returns false, leaving the metric alone, for a non-finite figure.
    pub fn record_savings(&mut self, monthly_savings: f64) -> bool {
        if !monthly_savings.is_finite() {
            debug!(monthly_savings, "non-finite savings figure ignored");
            return false;
        }
        self.metrics.savings = monthly_savings.max(0.0);
        self.after_metrics_change();
        true
    }

    pub fn set_appliances_tracked(&mut self, count: u32) {
        self.metrics.appliances_tracked = count;
        self.after_metrics_change();
    }

    // ── Housekeeping ───────────────────────────────────────────────────

    /// Deactivate goals past their deadline and streaks that lapsed.
    ///
    /// Returns how many entries changed.
    pub fn refresh(&mut self, now: DateTime<Utc>, today: NaiveDate) -> usize {
        let mut changed = 0;

        for goal in self.goals.iter_mut().filter(|g| g.is_active) {
            if goal.is_expired(now) {
                goal.is_active = false;
                changed += 1;
                self.events.push(Event::GoalExpired {
                    goal_id: goal.id.clone(),
                    at: now,
                });
            }
        }

        for streak in self.streaks.iter_mut() {
            if streak.refresh(today) {
                changed += 1;
                self.events.push(Event::StreakLapsed {
                    streak_id: streak.id.clone(),
                    at: now,
                });
            }
        }

        self.refresh_streak_metric(today);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
    }

    fn add_custom_goal(session: &mut GamificationSession, target: f64, xp: u32) -> String {
        let spec = NewGoal::custom("Unplug chargers", None, target, None, 7, xp, Utc::now()).unwrap();
        session.add_goal(spec).unwrap().id.clone()
    }

    #[test]
    fn add_goal_generates_id_and_event() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 5.0, 100);
        assert!(id.starts_with("goal-"));
        assert_eq!(s.goals().len(), 1);
        assert!(matches!(s.take_events()[0], Event::GoalAdded { .. }));
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn add_goal_rejects_invalid_spec() {
        let mut s = GamificationSession::new();
        let spec = NewGoal::custom("Bad", None, -1.0, None, 7, 100, Utc::now()).unwrap();
        assert!(s.add_goal(spec).is_err());
        assert!(s.goals().is_empty());
    }

    #[test]
    fn unknown_template_is_rejected() {
        let mut s = GamificationSession::new();
        let err = s.add_goal_from_template("nope", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownCatalogEntry { .. }));
    }

    #[test]
    fn goal_progress_clamps() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 10.0, 100);
        assert_eq!(s.update_goal_progress(&id, 50.0).unwrap().current, 10.0);
        assert!(s.update_goal_progress("goal-missing", 1.0).is_none());
    }

    #[test]
    fn nan_progress_leaves_goal_untouched() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 10.0, 100);
        s.update_goal_progress(&id, 3.0);
        s.take_events();

        let goal = s.update_goal_progress(&id, f64::NAN).unwrap();
        assert_eq!(goal.current, 3.0);
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn infinite_target_is_rejected() {
        let mut s = GamificationSession::new();
        let spec = NewGoal::custom("Bad", None, f64::INFINITY, None, 7, 100, Utc::now()).unwrap();
        assert!(matches!(
            s.add_goal(spec),
            Err(ValidationError::InvalidTarget(_))
        ));
        assert!(s.goals().is_empty());
    }

    #[test]
    fn non_finite_savings_are_ignored() {
        let mut s = GamificationSession::new();
        assert!(s.record_savings(120.0));
        assert!(!s.record_savings(f64::INFINITY));
        assert!(!s.record_savings(f64::NAN));
        assert_eq!(s.metrics().savings, 120.0);

        let json = serde_json::to_string(&s).unwrap();
        let restored: GamificationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.metrics().savings, 120.0);
    }

    #[test]
    fn complete_goal_awards_xp_once() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 3.0, 100);

        let first = s.complete_goal_at(&id, day(1), at(day(1))).unwrap();
        assert!(!first.already_completed);
        assert_eq!(s.user_progress().total_xp, 100);
        assert_eq!(s.goal(&id).unwrap().current, 3.0);

        let second = s.complete_goal_at(&id, day(1), at(day(1))).unwrap();
        assert!(second.already_completed);
        assert!(second.xp_award.is_none());
        assert_eq!(s.user_progress().total_xp, 100);
        assert_eq!(s.metrics().goals_completed, 1);
    }

    #[test]
    fn recompletion_re_awards_when_allowed() {
        let mut s = GamificationSession::new().with_settings(EngineSettings {
            allow_recompletion: true,
            auto_check: true,
        });
        let id = add_custom_goal(&mut s, 3.0, 100);
        s.complete_goal_at(&id, day(1), at(day(1)));
        s.complete_goal_at(&id, day(1), at(day(1)));
        assert_eq!(s.user_progress().total_xp, 200);
        assert_eq!(s.metrics().goals_completed, 1);
    }

    #[test]
    fn completing_goal_records_goal_streak() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 1.0, 10);
        s.complete_goal_at(&id, day(3), at(day(3)));
        let streak = s.streaks().iter().find(|x| x.id == GOAL_STREAK).unwrap();
        assert_eq!(streak.current_streak, 1);
        assert!(streak.is_active);
    }

    #[test]
    fn delete_goal_keeps_lifetime_counter() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 1.0, 10);
        s.complete_goal_at(&id, day(1), at(day(1)));
        assert_eq!(s.stats().completed_goals, 1);

        assert!(s.delete_goal(&id).is_some());
        assert_eq!(s.stats().completed_goals, 0);
        assert_eq!(s.metrics().goals_completed, 1);
        assert!(s.delete_goal(&id).is_none());
    }

    #[test]
    fn unlock_awards_xp_at_most_once() {
        let mut s = GamificationSession::new();
        assert_eq!(s.unlock_achievement("energy_saver"), Some(true));
        assert_eq!(s.unlock_achievement("energy_saver"), Some(false));
        assert_eq!(s.user_progress().total_xp, 200);
        assert_eq!(s.unlock_achievement("missing"), None);
    }

    #[test]
    fn earn_badge_once() {
        let mut s = GamificationSession::new();
        assert_eq!(s.earn_badge("saver_gold"), Some(true));
        assert_eq!(s.earn_badge("saver_gold"), Some(false));
        assert_eq!(s.earn_badge("missing"), None);
        assert_eq!(s.stats().earned_badges, 1);
        assert_eq!(s.user_progress().total_xp, 0);
    }

    #[test]
    fn first_calculation_unlocks_automatically() {
        let mut s = GamificationSession::new();
        s.record_calculation(day(1), at(day(1)));
        let a = s.achievements().iter().find(|a| a.id == "first_calculation").unwrap();
        assert!(a.is_unlocked);
        assert_eq!(s.user_progress().total_xp, 50);
    }

    #[test]
    fn manual_check_when_auto_check_disabled() {
        let mut s = GamificationSession::new().with_settings(EngineSettings {
            allow_recompletion: false,
            auto_check: false,
        });
        s.record_savings(750.0);
        assert_eq!(s.stats().unlocked_achievements, 0);

        let unlocked = s.check_achievements();
        assert_eq!(unlocked, vec!["energy_saver".to_string()]);
        assert!(s.check_achievements().is_empty());
    }

    #[test]
    fn check_updates_locked_criteria_current() {
        let mut s = GamificationSession::new();
        s.set_appliances_tracked(4);
        let a = s.achievements().iter().find(|a| a.id == "appliance_master").unwrap();
        assert!(!a.is_unlocked);
        assert_eq!(a.criteria.current, 4.0);
    }

    #[test]
    fn week_of_check_ins_unlocks_week_warrior() {
        let mut s = GamificationSession::new();
        for d in 1..=7 {
            s.check_in(day(d), at(day(d)));
        }
        let a = s.achievements().iter().find(|a| a.id == "week_warrior").unwrap();
        assert!(a.is_unlocked);
    }

    #[test]
    fn only_daily_usage_counts_toward_streak_days() {
        let mut s = GamificationSession::new();
        for d in 1..=7 {
            s.record_calculation(day(d), at(day(d)));
        }
        let calc = s.streaks().iter().find(|x| x.id == CALCULATION_STREAK).unwrap();
        assert_eq!(calc.current_streak, 7);
        assert_eq!(s.metrics().streak_days, 0);
        let a = s.achievements().iter().find(|a| a.id == "week_warrior").unwrap();
        assert!(!a.is_unlocked);

        s.check_in(day(7), at(day(7)));
        assert_eq!(s.metrics().streak_days, 1);
    }

    #[test]
    fn refresh_expires_goals_and_lapses_streaks() {
        let mut s = GamificationSession::new();
        let id = add_custom_goal(&mut s, 1.0, 10);
        s.check_in(day(1), at(day(1)));
        s.take_events();

        let later = Utc::now() + Duration::days(10);
        let changed = s.refresh(later, day(5));

        assert_eq!(changed, 2);
        assert!(!s.goal(&id).unwrap().is_active);
        assert_eq!(s.stats().active_streaks, 0);
        assert_eq!(s.metrics().streak_days, 0);
        let kinds: Vec<_> = s.take_events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["goal_expired", "streak_lapsed"]);
    }

    #[test]
    fn snapshot_roundtrip_keeps_state() {
        let mut s = GamificationSession::new();
        s.add_xp(150).unwrap();
        s.earn_badge("efficiency_bronze");
        let json = serde_json::to_string(&s).unwrap();

        let restored: GamificationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.user_progress().level, 2);
        assert_eq!(restored.stats().earned_badges, 1);
        assert!(restored.events.is_empty());
    }

    #[test]
    fn reconcile_restores_missing_catalog_entries() {
        let mut s = GamificationSession::new();
        s.achievements.retain(|a| a.id != "goal_achiever");
        assert_eq!(s.reconcile_catalogs(), 1);
        assert_eq!(s.reconcile_catalogs(), 0);
        assert_eq!(s.achievements().len(), 5);
    }
}
