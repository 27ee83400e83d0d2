//! Linux framebuffer display back-end.
//!
//! The device mode is read from sysfs instead of the `FBIOGET_*` ioctls:
//! `/sys/class/graphics/<dev>/{virtual_size,bits_per_pixel,stride}`.
//! The whole frame is rewritten from offset zero whenever the toolkit
//! reports a change.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{Backend, BackendKind};
use crate::config::Settings;
use crate::error::BackendError;
use crate::runtime::{ShutdownSignal, run_timer_loop};
use crate::toolkit::{PixelBuffer, Toolkit};

pub const NAME: &str = "fbdev";
pub const KIND: BackendKind = BackendKind::Display;

const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

pub fn create() -> Box<dyn Backend> {
    Box::new(Fbdev::new())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per line, including padding.
    pub stride: u32,
}

pub struct Fbdev {
    sysfs_root: PathBuf,
    device: Option<File>,
    geometry: Option<Geometry>,
    frame_limit: Option<u64>,
}

impl Fbdev {
    pub fn new() -> Self {
        Self::with_sysfs_root(SYSFS_GRAPHICS)
    }

    pub fn with_sysfs_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: root.into(),
            device: None,
            geometry: None,
            frame_limit: None,
        }
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }
}

impl Default for Fbdev {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Fbdev {
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError> {
        let path = &settings.fbdev_device;
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| BackendError::device(path, err))?;

        let Some(node) = path.file_name() else {
            return Err(BackendError::Unavailable(format!(
                "{} is not a device node",
                path.display()
            )));
        };
        let geometry = read_geometry(&self.sysfs_root.join(node))?;
        debug!("{}: {:?}", path.display(), geometry);

        self.device = Some(device);
        self.geometry = Some(geometry);
        self.frame_limit = settings.frame_limit;
        Ok(())
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.geometry.map(|g| (g.width, g.height))
    }

    fn run_loop(
        &mut self,
        toolkit: &mut dyn Toolkit,
    ) -> Result<(), BackendError> {
        let (Some(device), Some(geometry)) =
            (self.device.as_mut(), self.geometry)
        else {
            return Err(BackendError::NotInitialized);
        };

        let shutdown = ShutdownSignal::install()?;
        let mut buffer = PixelBuffer::new(geometry.width, geometry.height);
        let mut frame = Vec::with_capacity(
            geometry.stride as usize * geometry.height as usize,
        );

        let report =
            run_timer_loop(toolkit, self.frame_limit, &shutdown, |toolkit| {
                if !toolkit.render(&mut buffer) {
                    return Ok(());
                }
                encode_frame(&buffer, geometry, &mut frame);
                device
                    .seek(SeekFrom::Start(0))
                    .and_then(|_| device.write_all(&frame))
                    .map_err(|err| BackendError::io("framebuffer write", err))
            })?;

        info!(
            "fbdev loop stopped after {} frames ({:?})",
            report.frames, report.stopped_by
        );
        Ok(())
    }
}

pub fn read_geometry(dir: &Path) -> Result<Geometry, BackendError> {
    let read = |file: &str| {
        let path = dir.join(file);
        fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|err| {
                BackendError::io(format!("cannot read {}", path.display()), err)
            })
    };

    let size = read("virtual_size")?;
    let (width, height) = parse_virtual_size(&size).ok_or_else(|| {
        BackendError::Unsupported {
            what: "framebuffer size",
            detail: size.clone(),
        }
    })?;

    let bpp = read("bits_per_pixel")?;
    let bits_per_pixel = match bpp.parse::<u32>() {
        Ok(bits @ (16 | 32)) => bits,
        _ => {
            return Err(BackendError::Unsupported {
                what: "pixel depth",
                detail: format!("{} bpp", bpp),
            });
        }
    };

    let packed = width * bits_per_pixel / 8;
    let stride = match read("stride") {
        Ok(stride) => stride.parse::<u32>().unwrap_or(packed).max(packed),
        Err(_) => packed,
    };

    Ok(Geometry {
        width,
        height,
        bits_per_pixel,
        stride,
    })
}

/// Parses sysfs `virtual_size`, e.g. `1920,1080`.
pub fn parse_virtual_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(',')?;
    let width = w.trim().parse::<u32>().ok().filter(|w| *w > 0)?;
    let height = h.trim().parse::<u32>().ok().filter(|h| *h > 0)?;
    Some((width, height))
}

/// XRGB8888 to RGB565.
pub fn rgb565(pixel: u32) -> u16 {
    let r = ((pixel >> 16) & 0xff) as u16;
    let g = ((pixel >> 8) & 0xff) as u16;
    let b = (pixel & 0xff) as u16;
    ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)
}

/// Lays `buffer` out in the device's native little-endian format.
pub fn encode_frame(
    buffer: &PixelBuffer,
    geometry: Geometry,
    out: &mut Vec<u8>,
) {
    out.clear();
    let stride = geometry.stride as usize;

    for y in 0..buffer.height() {
        let line_start = out.len();
        for &pixel in buffer.row(y) {
            match geometry.bits_per_pixel {
                16 => out.extend_from_slice(&rgb565(pixel).to_le_bytes()),
                _ => out.extend_from_slice(&pixel.to_le_bytes()),
            }
        }
        out.resize(line_start + stride, 0);
    }
}
