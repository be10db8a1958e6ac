use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::events::LightEventData;

const CLOCK_FORMAT: &str = "%H:%M";

/// Names of the events the side panel can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventLabel {
    Sunrise,
    Sunset,
    Dawn,
    Dusk,
}

impl EventLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunrise => "Sunrise",
            Self::Sunset => "Sunset",
            Self::Dawn => "Dawn",
            Self::Dusk => "Dusk",
        }
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabeledTime {
    pub label: EventLabel,
    pub time: NaiveDateTime,
}

impl LabeledTime {
    pub fn new(label: EventLabel, time: NaiveDateTime) -> Self {
        Self { label, time }
    }

    /// Zero-padded 24-hour `HH:MM`.
    pub fn time_text(&self) -> String {
        self.time.format(CLOCK_FORMAT).to_string()
    }
}

/// What the display shows for one instant: the clock in the middle of the
/// dial and the next two events on the side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    pub center: String,
    pub top: LabeledTime,
    pub bottom: LabeledTime,
}

/// Chooses the upcoming events for `now`.
///
/// The day is split into half-open windows:
/// - `[sunrise, dusk)`: today's sunset and dusk;
/// - `[dusk, ..)`: tomorrow's dawn and sunrise;
/// - `(.., sunrise)`: today's dawn and sunrise.
pub fn select_window(
    now: NaiveDateTime,
    today: &LightEventData,
    tomorrow: &LightEventData,
) -> DisplayWindow {
    let (top, bottom) = if now >= today.sunrise() && now < today.dusk() {
        (
            LabeledTime::new(EventLabel::Sunset, today.sunset()),
            LabeledTime::new(EventLabel::Dusk, today.dusk()),
        )
    } else if now >= today.sunrise() {
        (
            LabeledTime::new(EventLabel::Dawn, tomorrow.dawn()),
            LabeledTime::new(EventLabel::Sunrise, tomorrow.sunrise()),
        )
    } else {
        (
            LabeledTime::new(EventLabel::Dawn, today.dawn()),
            LabeledTime::new(EventLabel::Sunrise, today.sunrise()),
        )
    };

    DisplayWindow {
        center: now.format(CLOCK_FORMAT).to_string(),
        top,
        bottom,
    }
}
