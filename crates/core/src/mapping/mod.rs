//! Time-of-day to geometry mapping.
//!
//! A full day maps onto one turn of the dial. Midnight sits at the bottom of
//! the circle and the day proceeds clockwise, so six in the morning is on the
//! left and noon at the top.

use std::f64::consts::TAU;

use chrono::{NaiveTime, Timelike};

use crate::render::Point;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Position of the sun marker for `now` on a circle of `radius` around
/// `center`. Coordinates are truncated towards zero.
pub fn sun_position(now: NaiveTime, center: Point, radius: f64) -> Point {
    let theta = f64::from(now.num_seconds_from_midnight()) / SECONDS_PER_DAY * TAU;
    let x = f64::from(center.x) - radius * theta.sin();
    let y = f64::from(center.y) + radius * theta.cos();
    Point::new(x as i32, y as i32)
}

/// Arc angle in degrees for a time of day, at minute resolution. Angles are
/// measured clockwise from 3 o'clock, which puts midnight at 90°.
pub fn arc_angle(time: NaiveTime) -> f32 {
    let hours = time.hour() as f32 + time.minute() as f32 / 60.0;
    hours / 24.0 * 360.0 + 90.0
}
