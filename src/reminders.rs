use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Days between weekly check-ins
pub const CHECKIN_INTERVAL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedReminder {
    pub enabled: bool,
    /// `HH:MM`, local time
    pub time: String,
}

impl TimedReminder {
    fn at(time: &str) -> Self {
        Self {
            enabled: false,
            time: time.to_string(),
        }
    }

    fn is_due(&self, now: NaiveDateTime) -> bool {
        if !self.enabled {
            return false;
        }
        match NaiveTime::parse_from_str(&self.time, "%H:%M") {
            Ok(t) => t.hour() == now.hour() && t.minute() == now.minute(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinReminder {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub breakfast: TimedReminder,
    pub lunch: TimedReminder,
    pub dinner: TimedReminder,
    pub workout: TimedReminder,
    pub checkin: CheckinReminder,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            breakfast: TimedReminder::at("08:00"),
            lunch: TimedReminder::at("13:00"),
            dinner: TimedReminder::at("19:00"),
            workout: TimedReminder::at("17:00"),
            checkin: CheckinReminder { enabled: true },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReminderKind {
    Breakfast,
    Lunch,
    Dinner,
    Workout,
    Checkin,
}

impl ReminderKind {
    pub fn title(self) -> &'static str {
        match self {
            ReminderKind::Breakfast => "Breakfast Time!",
            ReminderKind::Lunch => "Lunch Break!",
            ReminderKind::Dinner => "Dinner is Served!",
            ReminderKind::Workout => "Time to Work Out!",
            ReminderKind::Checkin => "Weekly Check-in Time!",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            ReminderKind::Breakfast => "Time to log your breakfast and fuel your day!",
            ReminderKind::Lunch => "Don't forget to log your lunch.",
            ReminderKind::Dinner => "Time to log your final meal of the day.",
            ReminderKind::Workout => "Your scheduled workout is starting now. Let's get moving!",
            ReminderKind::Checkin => {
                "It's time to update your weight and get a new plan for the week."
            }
        }
    }
}

/// Reminders that fire in the minute containing `now`
pub fn due_reminders(
    settings: &ReminderSettings,
    last_checkin: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Vec<ReminderKind> {
    let mut due: Vec<ReminderKind> = [
        (ReminderKind::Breakfast, &settings.breakfast),
        (ReminderKind::Lunch, &settings.lunch),
        (ReminderKind::Dinner, &settings.dinner),
        (ReminderKind::Workout, &settings.workout),
    ]
    .into_iter()
    .filter(|(_, r)| r.is_due(now))
    .map(|(kind, _)| kind)
    .collect();

    if settings.checkin.enabled && checkin_due(last_checkin, now) {
        due.push(ReminderKind::Checkin);
    }
    due
}

/// Polls reminders from a running loop, reporting each due minute once
#[derive(Debug, Clone)]
pub struct ReminderWatch {
    settings: ReminderSettings,
    last_checkin: Option<NaiveDate>,
    last_polled: Option<NaiveDateTime>,
}

impl ReminderWatch {
    pub fn new(settings: ReminderSettings, last_checkin: Option<NaiveDate>) -> Self {
        Self {
            settings,
            last_checkin,
            last_polled: None,
        }
    }

    /// Reminders due at `now`, empty when this minute was already polled
    pub fn poll(&mut self, now: NaiveDateTime) -> Vec<ReminderKind> {
        let minute = now.with_second(0).and_then(|t| t.with_nanosecond(0));
        if minute.is_some() && minute == self.last_polled {
            return Vec::new();
        }
        self.last_polled = minute;
        due_reminders(&self.settings, self.last_checkin, now)
    }
}

impl Default for ReminderWatch {
    fn default() -> Self {
        Self::new(ReminderSettings::default(), None)
    }
}

/// The weekly check-in nudges at noon once a full week has passed
fn checkin_due(last_checkin: Option<NaiveDate>, now: NaiveDateTime) -> bool {
    let Some(last) = last_checkin else {
        return false;
    };
    let days = (now.date() - last).num_days();
    days >= CHECKIN_INTERVAL_DAYS && now.hour() == 12 && now.minute() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn enabled_settings() -> ReminderSettings {
        let mut s = ReminderSettings::default();
        s.breakfast.enabled = true;
        s.lunch.enabled = true;
        s.dinner.enabled = true;
        s.workout.enabled = true;
        s
    }

    #[test]
    fn defaults_only_enable_checkin() {
        let s = ReminderSettings::default();
        assert!(!s.breakfast.enabled);
        assert_eq!(s.workout.time, "17:00");
        assert!(s.checkin.enabled);
        assert!(due_reminders(&s, None, at("2024-05-01", "08:00")).is_empty());
    }

    #[test]
    fn fires_only_on_exact_minute() {
        let s = enabled_settings();
        assert_eq!(
            due_reminders(&s, None, at("2024-05-01", "13:00")),
            vec![ReminderKind::Lunch]
        );
        assert!(due_reminders(&s, None, at("2024-05-01", "13:01")).is_empty());
        assert_eq!(
            due_reminders(&s, None, at("2024-05-01", "17:00")),
            vec![ReminderKind::Workout]
        );
    }

    #[test]
    fn malformed_time_never_matches() {
        let mut s = ReminderSettings::default();
        s.dinner = TimedReminder {
            enabled: true,
            time: "dinner-ish".into(),
        };
        assert!(due_reminders(&s, None, at("2024-05-01", "19:00")).is_empty());
    }

    #[test]
    fn checkin_needs_a_week_and_noon() {
        let s = ReminderSettings::default();
        let last = NaiveDate::from_ymd_opt(2024, 5, 1);

        assert_eq!(
            due_reminders(&s, last, at("2024-05-08", "12:00")),
            vec![ReminderKind::Checkin]
        );
        assert!(due_reminders(&s, last, at("2024-05-07", "12:00")).is_empty());
        assert!(due_reminders(&s, last, at("2024-05-09", "12:01")).is_empty());
        assert!(due_reminders(&s, None, at("2024-05-09", "12:00")).is_empty());
    }

    #[test]
    fn disabled_checkin_never_fires() {
        let mut s = ReminderSettings::default();
        s.checkin.enabled = false;
        let last = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(due_reminders(&s, last, at("2024-05-09", "12:00")).is_empty());
    }

    #[test]
    fn watch_reports_each_minute_once() {
        let mut watch = ReminderWatch::new(enabled_settings(), None);
        let noon_ish = at("2024-05-01", "13:00");

        assert_eq!(watch.poll(noon_ish), vec![ReminderKind::Lunch]);
        // the loop ticks every second; later polls in the same minute stay quiet
        assert!(watch.poll(noon_ish + chrono::Duration::seconds(30)).is_empty());
        assert!(watch.poll(noon_ish + chrono::Duration::seconds(59)).is_empty());
        assert!(watch.poll(at("2024-05-01", "13:01")).is_empty());

        assert_eq!(watch.poll(at("2024-05-01", "17:00")), vec![ReminderKind::Workout]);
        assert_eq!(
            watch.poll(at("2024-05-02", "13:00")),
            vec![ReminderKind::Lunch]
        );
    }

    #[test]
    fn watch_uses_last_checkin() {
        let last = NaiveDate::from_ymd_opt(2024, 5, 1);
        let mut watch = ReminderWatch::new(ReminderSettings::default(), last);
        assert_eq!(
            watch.poll(at("2024-05-10", "12:00")),
            vec![ReminderKind::Checkin]
        );
        assert!(ReminderWatch::default()
            .poll(at("2024-05-10", "12:00"))
            .is_empty());
    }

    #[test]
    fn reminder_copy() {
        assert_eq!(ReminderKind::Workout.title(), "Time to Work Out!");
        assert_eq!(ReminderKind::Checkin.to_string(), "checkin");
    }
}
