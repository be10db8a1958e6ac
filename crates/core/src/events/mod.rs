use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::{Result, SunMatrixError};

/// Fixed point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Wall-clock times of the daily light events, before they are pinned to a
/// calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightEventTimes {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub first_light: NaiveTime,
    pub last_light: NaiveTime,
    pub dawn: NaiveTime,
    pub dusk: NaiveTime,
    pub golden_hour: NaiveTime,
}

/// One day's sun and twilight events for a coordinate.
///
/// Every timestamp lies on [`LightEventData::date`]: the record is assembled
/// from a date and a set of times, and cannot be mutated afterwards. A new
/// day means a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightEventData {
    date: NaiveDate,
    sunrise: NaiveDateTime,
    sunset: NaiveDateTime,
    first_light: NaiveDateTime,
    last_light: NaiveDateTime,
    dawn: NaiveDateTime,
    dusk: NaiveDateTime,
    golden_hour: NaiveDateTime,
    #[serde(serialize_with = "serialize_seconds")]
    day_length: TimeDelta,
    #[serde(serialize_with = "serialize_seconds")]
    light_length: TimeDelta,
}

impl LightEventData {
    /// Pins `times` to `date`. `light_length` is derived as `dusk - dawn`.
    pub fn new(date: NaiveDate, times: LightEventTimes, day_length: TimeDelta) -> Self {
        let at = |time: NaiveTime| date.and_time(time);
        let dawn = at(times.dawn);
        let dusk = at(times.dusk);

        Self {
            date,
            sunrise: at(times.sunrise),
            sunset: at(times.sunset),
            first_light: at(times.first_light),
            last_light: at(times.last_light),
            dawn,
            dusk,
            golden_hour: at(times.golden_hour),
            day_length,
            light_length: dusk - dawn,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sunrise(&self) -> NaiveDateTime {
        self.sunrise
    }

    pub fn sunset(&self) -> NaiveDateTime {
        self.sunset
    }

    pub fn first_light(&self) -> NaiveDateTime {
        self.first_light
    }

    pub fn last_light(&self) -> NaiveDateTime {
        self.last_light
    }

    pub fn dawn(&self) -> NaiveDateTime {
        self.dawn
    }

    pub fn dusk(&self) -> NaiveDateTime {
        self.dusk
    }

    pub fn golden_hour(&self) -> NaiveDateTime {
        self.golden_hour
    }

    /// Sunrise to sunset, as reported upstream.
    pub fn day_length(&self) -> TimeDelta {
        self.day_length
    }

    /// Dawn to dusk.
    pub fn light_length(&self) -> TimeDelta {
        self.light_length
    }
}

/// Parses an `H:MM:SS` duration such as `"12:34:56"`.
pub fn parse_day_length(value: &str) -> Result<TimeDelta> {
    let invalid = || SunMatrixError::InvalidDayLength(value.to_string());

    let parts = value
        .trim()
        .split(':')
        .map(|part| part.parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;

    let [hours, minutes, seconds] = parts[..] else {
        return Err(invalid());
    };

    let total = i64::from(hours) * 3600 + i64::from(minutes) * 60 + i64::from(seconds);
    Ok(TimeDelta::seconds(total))
}

fn serialize_seconds<S>(value: &TimeDelta, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.num_seconds())
}
