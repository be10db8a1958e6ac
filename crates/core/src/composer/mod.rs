use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::{
    config::DisplayConfig,
    events::{Coordinates, LightEventData},
    mapping::{arc_angle, sun_position},
    provider::LightEventProvider,
    render::{DrawingSurface, FrameCanvas},
    timeline::{needs_rollover, RefreshScheduler},
    window::{select_window, DisplayWindow},
    Result, SunMatrixError,
};

const HALO: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Builds one frame per tick from the cached light events and the clock.
///
/// The displayed time only moves every `refresh_interval_seconds`; each
/// refresh also checks whether the calendar day rolled over and, if so,
/// fetches a fresh pair of records. The sun marker blinks on its own
/// cadence, evaluated on every tick.
#[derive(Debug)]
pub struct FrameComposer<P> {
    config: DisplayConfig,
    coordinates: Coordinates,
    provider: P,
    scheduler: RefreshScheduler,
    now: NaiveDateTime,
    today: LightEventData,
    tomorrow: LightEventData,
    show_sun_marker: bool,
}

impl<P: LightEventProvider> FrameComposer<P> {
    /// Fetches today's and tomorrow's events for `wall` and sets up the
    /// cadences. Fails if either record is unavailable.
    pub fn new(
        config: DisplayConfig,
        coordinates: Coordinates,
        provider: P,
        wall: NaiveDateTime,
    ) -> Result<Self> {
        config.validate()?;
        let scheduler =
            RefreshScheduler::new(config.refresh_interval()?, config.blink_rate_hz, wall);
        let (today, tomorrow) = fetch_pair(&provider, coordinates, wall.date())?;
        let show_sun_marker = scheduler.marker_visible(wall);

        info!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            date = %today.date(),
            "light events loaded"
        );

        Ok(Self {
            config,
            coordinates,
            provider,
            scheduler,
            now: wall,
            today,
            tomorrow,
            show_sun_marker,
        })
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// The instant currently shown, at refresh-interval resolution.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> &LightEventData {
        &self.today
    }

    pub fn tomorrow(&self) -> &LightEventData {
        &self.tomorrow
    }

    pub fn show_sun_marker(&self) -> bool {
        self.show_sun_marker
    }

    pub fn window(&self) -> DisplayWindow {
        select_window(self.now, &self.today, &self.tomorrow)
    }

    /// Advances the state to `wall` and renders the resulting frame.
    pub fn compose_frame(&mut self, wall: NaiveDateTime) -> FrameCanvas {
        self.advance(wall);
        self.render()
    }

    /// Applies both cadences for a wall-clock reading.
    pub fn advance(&mut self, wall: NaiveDateTime) {
        if self.scheduler.should_refresh(wall) {
            self.now = wall;
            self.scheduler.mark_refreshed(wall);
            debug!(now = %self.now, "refreshed display time");

            if needs_rollover(&self.today, self.now) {
                self.reload();
            }
        }
        self.show_sun_marker = self.scheduler.marker_visible(wall);
    }

    /// Replaces both records for the current date. On failure the previous
    /// pair stays in place and `false` is returned.
    pub fn reload(&mut self) -> bool {
        match fetch_pair(&self.provider, self.coordinates, self.now.date()) {
            Ok((today, tomorrow)) => {
                info!(date = %today.date(), "day rolled over, light events reloaded");
                self.today = today;
                self.tomorrow = tomorrow;
                true
            }
            Err(err) => {
                warn!(error = %err, date = %self.now.date(), "keeping previous light events");
                false
            }
        }
    }

    /// Renders the current state onto a fresh canvas.
    pub fn render(&self) -> FrameCanvas {
        let mut canvas = FrameCanvas::new(self.config.canvas_width, self.config.canvas_height);
        self.draw(&mut canvas);
        canvas
    }

    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        self.draw_arcs(surface);
        self.draw_strip(surface);
        self.draw_labels(surface);
        if self.show_sun_marker {
            self.draw_sun(surface);
        }
    }

    fn draw_arcs<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let colors = &self.config.colors;
        let bounds = self.config.arc_bounds;
        let width = self.config.arc_width;
        let angle = |at: NaiveDateTime| arc_angle(at.time());
        let today = &self.today;

        surface.draw_arc(bounds, angle(today.sunset()), angle(today.sunrise()), colors.night, width);
        surface.draw_arc(bounds, angle(today.dawn()), angle(today.dusk()), colors.twilight, width);
        surface.draw_arc(bounds, angle(today.sunrise()), angle(today.sunset()), colors.day, width);
    }

    fn draw_strip<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let layout = &self.config.layout;
        for (column, color) in self.config.colors.rainbow.iter().enumerate() {
            let top = layout
                .strip_origin
                .offset(column as i32 * layout.strip_spacing, 0);
            surface.draw_point(top, *color);
            surface.draw_point(top.offset(0, 1), *color);
        }
    }

    fn draw_labels<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let layout = &self.config.layout;
        let text = self.config.colors.text;
        let window = self.window();

        surface.draw_text(layout.center_time, &window.center, text);
        surface.draw_text(layout.top_label, window.top.label.as_str(), text);
        surface.draw_text(layout.top_time, &window.top.time_text(), text);
        surface.draw_text(layout.bottom_label, window.bottom.label.as_str(), text);
        surface.draw_text(layout.bottom_time, &window.bottom.time_text(), text);
    }

    fn draw_sun<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let colors = &self.config.colors;
        let sun = sun_position(self.now.time(), self.config.center, self.config.radius);
        let halo = colors.sun.with_alpha(colors.sun_halo_alpha);

        surface.draw_point(sun, colors.sun);
        for (dx, dy) in HALO {
            surface.draw_point(sun.offset(dx, dy), halo);
        }
    }
}

fn fetch_pair<P: LightEventProvider + ?Sized>(
    provider: &P,
    coordinates: Coordinates,
    date: NaiveDate,
) -> Result<(LightEventData, LightEventData)> {
    let next = date
        .succ_opt()
        .ok_or(SunMatrixError::InvalidInput("date has no successor"))?;
    let fetch = |on: NaiveDate| -> Result<LightEventData> {
        provider
            .fetch(coordinates, on)?
            .ok_or(SunMatrixError::MissingData { date: on })
    };
    Ok((fetch(date)?, fetch(next)?))
}
