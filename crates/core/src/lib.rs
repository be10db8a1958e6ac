//! Core library for the Sun Matrix display.
//!
//! The crate turns a day's light events (dawn, sunrise, sunset, dusk and
//! friends) and the wall clock into a 64×32 frame: a dial of day, twilight
//! and night arcs, a blinking sun marker travelling around it, and the next
//! two events on the side. Fetching the events and putting pixels on real
//! hardware sit behind small traits so the composition logic can be driven
//! deterministically.

pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod mapping;
pub mod provider;
pub mod render;
pub mod timeline;
pub mod window;

pub use composer::FrameComposer;
pub use config::{
    AppConfig, DisplayConfig, LabelLayout, LocationConfig, Palette, ProviderConfig, RunConfig,
};
pub use error::{Result, SunMatrixError};
pub use events::{parse_day_length, Coordinates, LightEventData, LightEventTimes};
pub use mapping::{arc_angle, sun_position};
pub use provider::{LightEventProvider, SunriseSunsetClient};
pub use render::{Bounds, DrawingSurface, FrameCanvas, Point, Rgba};
pub use timeline::{RefreshScheduler, SystemClock, WallClock};
pub use window::{select_window, DisplayWindow, EventLabel, LabeledTime};
