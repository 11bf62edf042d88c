use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{StatsError, StatsResult},
    model::{Category, TimeEntry},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Started(String),
    Stopped { id: String, duration_ms: i64 },
    Resumed(String),
    Deleted(String),
}

impl TimerEvent {
    pub fn entry_id(&self) -> &str {
        match self {
            TimerEvent::Started(id) | TimerEvent::Resumed(id) | TimerEvent::Deleted(id) => id.as_str(),
            TimerEvent::Stopped { id, .. } => id.as_str(),
        }
    }
}

/// One user's timer sessions, newest first. At most one entry runs at a
/// time.
#[derive(Clone, Debug, Default)]
pub struct TimerBoard {
    user_id: String,
    entries: Vec<TimeEntry>,
}

impl TimerBoard {
    pub fn new(user_id: impl Into<String>, mut entries: Vec<TimeEntry>) -> Self {
        let user_id = user_id.into();
        entries.retain(|entry| entry.user_id == user_id);
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Self { user_id, entries }
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&TimeEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn active(&self) -> Option<&TimeEntry> {
        self.entries.iter().find(|entry| entry.is_running)
    }

    pub fn start(
        &mut self,
        title: &str,
        category: Category,
        now: DateTime<Utc>,
    ) -> StatsResult<Vec<TimerEvent>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StatsError::EmptyTitle);
        }

        let mut events = self.stop_active(now);
        let entry = TimeEntry {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            title: title.to_string(),
            category,
            start_time: now,
            end_time: None,
            duration_ms: None,
            is_running: true,
        };
        events.push(TimerEvent::Started(entry.id.clone()));
        self.entries.insert(0, entry);
        Ok(events)
    }

    pub fn stop(&mut self, id: &str, now: DateTime<Utc>) -> Vec<TimerEvent> {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id && entry.is_running)
        else {
            return Vec::new();
        };

        let duration_ms = (now - entry.start_time).num_milliseconds().max(0);
        entry.end_time = Some(now);
        entry.duration_ms = Some(duration_ms);
        entry.is_running = false;
        vec![TimerEvent::Stopped {
            id: id.to_string(),
            duration_ms,
        }]
    }

    /// Continues a stopped entry by shifting its start back by the time
    /// already recorded.
    pub fn resume(&mut self, id: &str, now: DateTime<Utc>) -> StatsResult<Vec<TimerEvent>> {
        if self.entry(id).is_none() {
            return Err(StatsError::EntryNotFound(id.to_string()));
        }

        let mut events = self.stop_active(now);
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            let previous = chrono::Duration::milliseconds(entry.recorded_ms());
            entry.start_time = now - previous;
            entry.end_time = None;
            entry.duration_ms = None;
            entry.is_running = true;
            events.push(TimerEvent::Resumed(id.to_string()));
        }
        Ok(events)
    }

    pub fn delete(&mut self, id: &str, now: DateTime<Utc>) -> StatsResult<Vec<TimerEvent>> {
        if self.entry(id).is_none() {
            return Err(StatsError::EntryNotFound(id.to_string()));
        }

        let mut events = self.stop(id, now);
        self.entries.retain(|entry| entry.id != id);
        events.push(TimerEvent::Deleted(id.to_string()));
        Ok(events)
    }

    pub fn entries_on(&self, day: NaiveDate, offset: FixedOffset) -> Vec<&TimeEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.start_time.with_timezone(&offset).date_naive() == day)
            .collect()
    }

    /// Milliseconds logged on `day`, counting running entries up to `now`.
    pub fn total_on(&self, day: NaiveDate, offset: FixedOffset, now: DateTime<Utc>) -> i64 {
        self.entries_on(day, offset)
            .into_iter()
            .map(|entry| entry.elapsed_ms(now))
            .sum()
    }

    fn stop_active(&mut self, now: DateTime<Utc>) -> Vec<TimerEvent> {
        let Some(active_id) = self.active().map(|entry| entry.id.clone()) else {
            return Vec::new();
        };
        self.stop(&active_id, now)
    }
}

pub fn format_duration(ms: i64) -> String {
    let seconds = ms.max(0) / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn at(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn started_id(events: &[TimerEvent]) -> String {
        events
            .iter()
            .find_map(|event| match event {
                TimerEvent::Started(id) => Some(id.clone()),
                _ => None,
            })
            .expect("start event")
    }

    #[test]
    fn starting_stops_the_running_entry() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let t0 = at("2024-03-04T09:00:00Z");

        let first = started_id(&board.start("Calculus", Category::Study, t0).expect("start"));
        let events = board
            .start("Run", Category::Exercise, t0 + Duration::minutes(45))
            .expect("start");

        assert_eq!(
            events[0],
            TimerEvent::Stopped {
                id: first.clone(),
                duration_ms: 45 * 60_000,
            }
        );
        let second = started_id(&events);
        assert_eq!(board.active().map(|entry| entry.id.as_str()), Some(second.as_str()));
        assert_eq!(board.entries()[1].id, first);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let result = board.start("   ", Category::Study, at("2024-03-04T09:00:00Z"));
        assert!(matches!(result, Err(StatsError::EmptyTitle)));
        assert!(board.entries().is_empty());
    }

    #[test]
    fn stop_is_noop_for_stopped_entry() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let t0 = at("2024-03-04T09:00:00Z");
        let id = started_id(&board.start("Essay", Category::Work, t0).expect("start"));

        assert_eq!(board.stop(&id, t0 + Duration::minutes(10)).len(), 1);
        assert!(board.stop(&id, t0 + Duration::minutes(20)).is_empty());
        assert_eq!(board.entry(&id).and_then(|entry| entry.duration_ms), Some(600_000));
    }

    #[test]
    fn resume_continues_from_recorded_duration() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let t0 = at("2024-03-04T09:00:00Z");
        let id = started_id(&board.start("Physics", Category::Study, t0).expect("start"));
        board.stop(&id, t0 + Duration::minutes(30));

        let resumed_at = t0 + Duration::hours(2);
        let events = board.resume(&id, resumed_at).expect("resume");
        assert_eq!(events, vec![TimerEvent::Resumed(id.clone())]);

        let entry = board.entry(&id).expect("entry");
        assert!(entry.is_running);
        assert_eq!(entry.start_time, resumed_at - Duration::minutes(30));
        assert_eq!(entry.elapsed_ms(resumed_at + Duration::minutes(15)), 45 * 60_000);
    }

    #[test]
    fn delete_unknown_entry_fails() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let result = board.delete("missing", at("2024-03-04T09:00:00Z"));
        assert!(matches!(result, Err(StatsError::EntryNotFound(id)) if id == "missing"));
    }

    #[test]
    fn delete_running_entry_stops_it_first() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let t0 = at("2024-03-04T09:00:00Z");
        let id = started_id(&board.start("Notes", Category::Other, t0).expect("start"));

        let events = board.delete(&id, t0 + Duration::minutes(5)).expect("delete");
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], TimerEvent::Deleted(id));
        assert!(board.entries().is_empty());
    }

    #[test]
    fn today_total_counts_running_time() {
        let mut board = TimerBoard::new("u1", Vec::new());
        let offset = FixedOffset::east_opt(0).expect("offset");
        let t0 = at("2024-03-04T09:00:00Z");
        let id = started_id(&board.start("Reading", Category::Study, t0).expect("start"));
        board.stop(&id, t0 + Duration::hours(1));
        board
            .start("Chemistry", Category::Study, t0 + Duration::hours(2))
            .expect("start");

        let day = t0.date_naive();
        let now = t0 + Duration::hours(2) + Duration::minutes(20);
        assert_eq!(board.entries_on(day, offset).len(), 2);
        assert_eq!(format_duration(board.total_on(day, offset, now)), "01:20:00");
    }

    #[test]
    fn board_keeps_only_its_user() {
        let start = at("2024-03-04T09:00:00Z");
        let other = TimeEntry {
            id: "x".into(),
            user_id: "u2".into(),
            title: "Other".into(),
            category: Category::Study,
            start_time: start,
            end_time: None,
            duration_ms: Some(1_000),
            is_running: false,
        };
        let board = TimerBoard::new("u1", vec![other]);
        assert!(board.entries().is_empty());
    }

    #[test]
    fn durations_format_as_clock() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3_723_000), "01:02:03");
        assert_eq!(format_duration(-5), "00:00:00");
    }
}
