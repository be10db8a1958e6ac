use std::convert::Infallible;

use embedded_graphics::{
    geometry::{Angle, OriginDimensions, Point as EgPoint, Size},
    mono_font::{ascii::FONT_4X6, MonoTextStyle},
    pixelcolor::{Rgb888, RgbColor},
    prelude::{DrawTarget, Primitive},
    primitives::{Arc, PrimitiveStyleBuilder, StrokeAlignment},
    text::{Baseline, Text},
    Drawable, Pixel,
};
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate, origin in the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Inclusive bounding box of an ellipse, the way arcs are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Bounds {
    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Diameter of the largest circle that fits the box.
    pub fn diameter(&self) -> u32 {
        let width = self.bottom_right.x - self.top_left.x + 1;
        let height = self.bottom_right.y - self.top_left.y + 1;
        width.min(height).max(0) as u32
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Builds an opaque colour from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Composites the colour over black, dropping the alpha channel.
    pub fn flatten(self) -> [u8; 3] {
        let scale = |channel: u8| ((channel as u16 * self.a as u16 + 127) / 255) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }

    fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

/// Drawing capability the frame composer renders onto. Angles are in
/// degrees, measured clockwise from the 3 o'clock position; an arc runs
/// clockwise from `start_deg` to `end_deg`.
pub trait DrawingSurface {
    fn clear(&mut self);
    fn draw_arc(&mut self, bounds: Bounds, start_deg: f32, end_deg: f32, color: Rgba, width: u32);
    fn draw_text(&mut self, origin: Point, text: &str, color: Rgba);
    fn draw_point(&mut self, point: Point, color: Rgba);
}

/// Fixed-size RGBA frame buffer. Arcs and text are rasterised through
/// `embedded-graphics`; points are stored verbatim, alpha included.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl FrameCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Writes a pixel; coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = color;
        }
    }

    /// Row-major RGB rendition for display devices without an alpha channel.
    pub fn to_rgb(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|pixel| pixel.flatten()).collect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn layer(&mut self, alpha: u8) -> Layer<'_> {
        Layer {
            canvas: self,
            alpha,
        }
    }
}

impl DrawingSurface for FrameCanvas {
    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn draw_arc(&mut self, bounds: Bounds, start_deg: f32, end_deg: f32, color: Rgba, width: u32) {
        let sweep = (end_deg - start_deg).rem_euclid(360.0);
        let diameter = bounds.diameter();
        if sweep <= f32::EPSILON || diameter == 0 || width == 0 {
            return;
        }

        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color.to_rgb888())
            .stroke_width(width)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        let top_left = EgPoint::new(bounds.top_left.x, bounds.top_left.y);
        let arc = Arc::new(
            top_left,
            diameter,
            Angle::from_degrees(start_deg),
            Angle::from_degrees(sweep),
        );

        let mut layer = self.layer(color.a);
        let _ = arc.into_styled(style).draw(&mut layer);
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Rgba) {
        let style = MonoTextStyle::new(&FONT_4X6, color.to_rgb888());
        let position = EgPoint::new(origin.x, origin.y);

        let mut layer = self.layer(color.a);
        let _ = Text::with_baseline(text, position, style, Baseline::Top).draw(&mut layer);
    }

    fn draw_point(&mut self, point: Point, color: Rgba) {
        self.set_pixel(point.x, point.y, color);
    }
}

impl std::fmt::Debug for FrameCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field(
                "lit_pixels",
                &self.pixels.iter().filter(|pixel| pixel.a > 0).count(),
            )
            .finish()
    }
}

/// `embedded-graphics` target writing into a canvas with a fixed alpha.
struct Layer<'a> {
    canvas: &'a mut FrameCanvas,
    alpha: u8,
}

impl OriginDimensions for Layer<'_> {
    fn size(&self) -> Size {
        Size::new(self.canvas.width, self.canvas.height)
    }
}

impl DrawTarget for Layer<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let rgba = Rgba::new(color.r(), color.g(), color.b(), self.alpha);
            self.canvas.set_pixel(point.x, point.y, rgba);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(canvas: &FrameCanvas) -> usize {
        canvas.pixels().iter().filter(|pixel| pixel.a > 0).count()
    }

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = FrameCanvas::new(64, 32);
        assert_eq!(canvas.pixels().len(), 64 * 32);
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn ignores_out_of_bounds_points() {
        let mut canvas = FrameCanvas::new(4, 4);
        canvas.draw_point(Point::new(-1, 0), Rgba::WHITE);
        canvas.draw_point(Point::new(4, 2), Rgba::WHITE);
        canvas.draw_point(Point::new(2, 2), Rgba::WHITE);

        assert_eq!(lit(&canvas), 1);
        assert_eq!(canvas.pixel(2, 2), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(4, 2), None);
    }

    #[test]
    fn points_keep_their_alpha() {
        let mut canvas = FrameCanvas::new(4, 4);
        let halo = Rgba::hex(0xffe921).with_alpha(70);
        canvas.draw_point(Point::new(1, 1), halo);
        assert_eq!(canvas.pixel(1, 1), Some(halo));
    }

    #[test]
    fn draws_text_inside_the_canvas() {
        let mut canvas = FrameCanvas::new(64, 32);
        canvas.draw_text(Point::new(33, 1), "Dawn", Rgba::WHITE);

        assert!(lit(&canvas) > 0);
        let outside = canvas
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, pixel)| pixel.a > 0)
            .any(|(index, _)| {
                let x = (index % 64) as i32;
                let y = (index / 64) as i32;
                x < 33 || y < 1 || y > 7
            });
        assert!(!outside, "text escaped its cell");
    }

    #[test]
    fn full_arc_stays_inside_bounds() {
        let mut canvas = FrameCanvas::new(64, 32);
        let bounds = Bounds::new(Point::new(1, 1), Point::new(30, 30));
        let color = Rgba::hex(0x57b9fa);
        canvas.draw_arc(bounds, 0.0, 359.0, color, 2);

        assert!(lit(&canvas) > 0);
        for (index, pixel) in canvas.pixels().iter().enumerate() {
            if pixel.a == 0 {
                continue;
            }
            let x = (index % 64) as i32;
            let y = (index / 64) as i32;
            assert!((1..=30).contains(&x) && (1..=30).contains(&y));
            assert_eq!(*pixel, color);
        }
    }

    #[test]
    fn empty_sweep_draws_nothing() {
        let mut canvas = FrameCanvas::new(64, 32);
        let bounds = Bounds::new(Point::new(1, 1), Point::new(30, 30));
        canvas.draw_arc(bounds, 90.0, 90.0, Rgba::WHITE, 2);
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn clear_resets_every_pixel() {
        let mut canvas = FrameCanvas::new(8, 8);
        canvas.draw_text(Point::new(0, 0), "12", Rgba::WHITE);
        canvas.clear();
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn flattens_onto_black() {
        assert_eq!(Rgba::hex(0x57b9fa).flatten(), [0x57, 0xb9, 0xfa]);
        assert_eq!(Rgba::TRANSPARENT.flatten(), [0, 0, 0]);

        let half = Rgba::new(200, 100, 0, 128).flatten();
        assert_eq!(half, [100, 50, 0]);
    }
}
