use chrono::{Datelike, Local, NaiveDateTime, TimeDelta};

use crate::events::LightEventData;

/// Source of the current local wall-clock time.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Cadences of the display: how often the displayed time is refreshed and
/// how fast the sun marker blinks.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: TimeDelta,
    blink_rate_hz: f64,
    last_refresh: NaiveDateTime,
}

impl RefreshScheduler {
    pub fn new(interval: TimeDelta, blink_rate_hz: f64, started: NaiveDateTime) -> Self {
        Self {
            interval,
            blink_rate_hz,
            last_refresh: started,
        }
    }

    pub fn last_refresh(&self) -> NaiveDateTime {
        self.last_refresh
    }

    /// True once strictly more than the interval has passed since the last
    /// refresh.
    pub fn should_refresh(&self, wall: NaiveDateTime) -> bool {
        wall - self.last_refresh > self.interval
    }

    pub fn mark_refreshed(&mut self, wall: NaiveDateTime) {
        self.last_refresh = wall;
    }

    pub fn marker_visible(&self, wall: NaiveDateTime) -> bool {
        blink_phase(epoch_seconds(wall), self.blink_rate_hz)
    }
}

/// `floor(seconds * rate) mod 2 == 1`.
pub fn blink_phase(seconds: f64, rate_hz: f64) -> bool {
    ((seconds * rate_hz).floor() as i64).rem_euclid(2) == 1
}

/// The cached record is stale once its day of month no longer matches.
pub fn needs_rollover(today: &LightEventData, now: NaiveDateTime) -> bool {
    today.date().day() != now.day()
}

fn epoch_seconds(wall: NaiveDateTime) -> f64 {
    wall.and_utc().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::fixtures::{date, hms, summer_day};

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        date(2024, 6, 21).and_time(hms(hour, minute, second))
    }

    #[test]
    fn refreshes_only_after_the_interval() {
        let start = at(12, 0, 0);
        let mut scheduler = RefreshScheduler::new(TimeDelta::seconds(10), 1.5, start);

        assert!(!scheduler.should_refresh(start));
        assert!(!scheduler.should_refresh(at(12, 0, 10)));
        assert!(scheduler.should_refresh(at(12, 0, 10) + TimeDelta::milliseconds(1)));

        scheduler.mark_refreshed(at(12, 0, 11));
        assert_eq!(scheduler.last_refresh(), at(12, 0, 11));
        assert!(!scheduler.should_refresh(at(12, 0, 20)));
        assert!(scheduler.should_refresh(at(12, 0, 22)));
    }

    #[test]
    fn blink_toggles_every_two_thirds_of_a_second() {
        let samples: Vec<bool> = (0..12)
            .map(|step| blink_phase(step as f64 / 3.0 + 0.01, 1.5))
            .collect();
        // one sample per third of a second, two samples per phase
        assert_eq!(
            samples,
            [false, false, true, true, false, false, true, true, false, false, true, true]
        );
    }

    #[test]
    fn blink_follows_the_wall_clock() {
        let scheduler = RefreshScheduler::new(TimeDelta::seconds(10), 1.5, at(0, 0, 0));
        let base = at(12, 0, 0);
        // whole days and the 43200 s up to noon both scale to an even count
        assert!(!scheduler.marker_visible(base));
        assert!(scheduler.marker_visible(base + TimeDelta::milliseconds(700)));
        assert!(!scheduler.marker_visible(base + TimeDelta::milliseconds(1400)));
    }

    #[test]
    fn rollover_compares_day_of_month() {
        let today = summer_day(date(2024, 6, 21));
        assert!(!needs_rollover(&today, at(23, 59, 59)));
        assert!(needs_rollover(
            &today,
            date(2024, 6, 22).and_time(hms(0, 0, 0))
        ));
        // same day of month in a later month does not count as a new day
        assert!(!needs_rollover(
            &today,
            date(2024, 7, 21).and_time(hms(8, 0, 0))
        ));
    }
}
