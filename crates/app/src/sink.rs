use std::{
    fs,
    io::{self, Stdout, Write},
    path::PathBuf,
};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use sun_matrix_core::{FrameCanvas, Result};

/// Destination of composed frames: the stand-in for the LED matrix.
pub trait FrameSink {
    fn present(&mut self, frame: &FrameCanvas) -> Result<()>;
}

/// Previews frames in a truecolor terminal, two matrix rows per text row.
pub struct TerminalSink<W: Write> {
    out: W,
    cleared: bool,
}

impl TerminalSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cleared: false,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn present(&mut self, frame: &FrameCanvas) -> Result<()> {
        if !self.cleared {
            queue!(self.out, Clear(ClearType::All))?;
            self.cleared = true;
        }
        queue!(self.out, MoveTo(0, 0))?;

        let rgb = frame.to_rgb();
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        for y in (0..height).step_by(2) {
            for x in 0..width {
                let [r, g, b] = rgb[y * width + x];
                let [br, bg, bb] = if y + 1 < height {
                    rgb[(y + 1) * width + x]
                } else {
                    [0, 0, 0]
                };
                queue!(
                    self.out,
                    SetForegroundColor(Color::Rgb { r, g, b }),
                    SetBackgroundColor(Color::Rgb {
                        r: br,
                        g: bg,
                        b: bb
                    }),
                    Print('▀')
                )?;
            }
            queue!(self.out, ResetColor, Print("\r\n"))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Writes every frame to a binary PPM file, replacing the previous one.
pub struct PpmSink {
    path: PathBuf,
}

impl PpmSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FrameSink for PpmSink {
    fn present(&mut self, frame: &FrameCanvas) -> Result<()> {
        fs::write(&self.path, encode_ppm(frame))?;
        Ok(())
    }
}

pub fn encode_ppm(frame: &FrameCanvas) -> Vec<u8> {
    let mut bytes = format!("P6\n{} {}\n255\n", frame.width(), frame.height()).into_bytes();
    bytes.extend(frame.to_rgb().into_iter().flatten());
    bytes
}
