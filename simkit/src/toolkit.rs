//! The seam between back-ends and the GUI toolkit they host.
//!
//! The toolkit owns widgets, styling and drawing. Back-ends only pump it:
//! timer passes, input events and, for back-ends with pixel output, a
//! render target.

use std::time::Duration;

use crate::config::Settings;

/// The display surface that is ready to receive drawable content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SurfaceInfo {
    pub backend: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f64, y: f64 },
    PointerButton { pressed: bool },
    Key { name: String, pressed: bool },
}

pub trait Toolkit {
    /// Called exactly once, before any back-end is initialized.
    fn init(&mut self, settings: &Settings);

    /// Called once all back-ends are up and before the run loop starts.
    fn build_screen(&mut self, surface: &SurfaceInfo);

    /// Runs due timers and returns how long the caller may idle before the
    /// next pass.
    fn handle_timers(&mut self) -> Duration;

    fn feed_input(&mut self, _event: InputEvent) {}

    /// Draws into `target`. Returns `false` when nothing changed since the
    /// previous call.
    fn render(&mut self, _target: &mut PixelBuffer) -> bool {
        false
    }
}

/// XRGB8888 pixels, row-major, no padding.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fills the intersection of the rectangle with the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        let x0 = x.clamp(0, self.width as i32) as usize;
        let y0 = y.clamp(0, self.height as i32) as usize;
        let x1 = (x as i64 + w as i64).clamp(0, self.width as i64) as usize;
        let y1 = (y as i64 + h as i64).clamp(0, self.height as i64) as usize;

        for row in y0..y1 {
            let start = row * self.width as usize;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_buffer() {
        let mut buffer = PixelBuffer::new(4, 3);
        buffer.fill_rect(-2, 1, 4, 10, 0xff);

        assert_eq!(buffer.row(0), &[0, 0, 0, 0]);
        assert_eq!(buffer.row(1), &[0xff, 0xff, 0, 0]);
        assert_eq!(buffer.row(2), &[0xff, 0xff, 0, 0]);
    }

    #[test]
    fn fill_rect_outside_is_a_no_op() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.fill_rect(5, 5, 3, 3, 0xff);
        buffer.fill_rect(-10, 0, 3, 3, 0xff);
        assert!(buffer.pixels().iter().all(|p| *p == 0));
    }
}
