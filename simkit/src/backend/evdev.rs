//! Linux evdev pointer input, initialized next to the display back-end.
//!
//! A reader thread blocks on the device and decodes its events with
//! `input-linux`; the display back-end's loop drains them without blocking.

use std::fs::File;
use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use input_linux::sys::input_event;
use input_linux::{
    AbsoluteAxis, EvdevHandle, Event, InputEvent as RawEvent, Key, KeyState,
    RelativeAxis, SynchronizeKind,
};
use log::{debug, warn};

use super::{Backend, BackendKind};
use crate::config::Settings;
use crate::config::settings::ENV_EVDEV_DEVICE;
use crate::error::BackendError;
use crate::toolkit::InputEvent;

pub const NAME: &str = "evdev";
pub const KIND: BackendKind = BackendKind::Input;

const READ_BATCH: usize = 32;

pub fn create() -> Box<dyn Backend> {
    Box::new(Evdev::default())
}

#[derive(Default)]
pub struct Evdev {
    events: Option<Receiver<InputEvent>>,
}

impl Backend for Evdev {
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError> {
        let Some(path) = settings.evdev_device.as_ref() else {
            return Err(BackendError::Unavailable(format!(
                "no pointer device configured, set {}",
                ENV_EVDEV_DEVICE
            )));
        };

        let device =
            File::open(path).map_err(|err| BackendError::device(path, err))?;
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("evdev-reader".to_string())
            .spawn(move || read_device(EvdevHandle::new(device), tx))
            .map_err(|err| BackendError::io("cannot spawn evdev reader", err))?;

        debug!("reading pointer events from {}", path.display());
        self.events = Some(rx);
        Ok(())
    }

    fn poll_input(&mut self, sink: &mut dyn FnMut(InputEvent)) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        while let Ok(event) = events.try_recv() {
            sink(event);
        }
    }
}

fn read_device(device: EvdevHandle<File>, tx: Sender<InputEvent>) {
    let mut decoder = PointerDecoder::default();
    // SAFETY: `input_event` is plain integers, all zeroes is a valid value.
    let mut records: [input_event; READ_BATCH] = unsafe { mem::zeroed() };
    let mut decoded = Vec::new();

    loop {
        let count = match device.read(&mut records) {
            Ok(0) => {
                debug!("evdev device reached end of input");
                return;
            }
            Ok(count) => count,
            Err(err) => {
                warn!("evdev reader stopped: {}", err);
                return;
            }
        };

        for record in &records[..count] {
            let Ok(raw) = RawEvent::from_raw(record) else {
                continue;
            };
            let Ok(event) = Event::new(*raw) else {
                continue;
            };
            decoder.feed(&event, &mut decoded);
        }

        for event in decoded.drain(..) {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

/// Folds absolute or relative axis updates into one position per
/// `SYN_REPORT`.
#[derive(Debug, Default)]
pub struct PointerDecoder {
    x: f64,
    y: f64,
    moved: bool,
}

impl PointerDecoder {
    pub fn feed(&mut self, event: &Event, out: &mut Vec<InputEvent>) {
        match event {
            Event::Absolute(abs) => match abs.axis {
                AbsoluteAxis::X => self.set_x(abs.value as f64),
                AbsoluteAxis::Y => self.set_y(abs.value as f64),
                _ => {}
            },
            Event::Relative(rel) => match rel.axis {
                RelativeAxis::X => self.set_x(self.x + rel.value as f64),
                RelativeAxis::Y => self.set_y(self.y + rel.value as f64),
                _ => {}
            },
            Event::Key(key) if key.value == KeyState::AUTOREPEAT => {}
            Event::Key(key) => {
                let pressed = key.value == KeyState::PRESSED;
                out.push(match key.key {
                    Key::ButtonLeft | Key::ButtonTouch => {
                        InputEvent::PointerButton { pressed }
                    }
                    other => InputEvent::Key {
                        name: format!("{:?}", other),
                        pressed,
                    },
                });
            }
            Event::Synchronize(sync)
                if matches!(sync.kind, SynchronizeKind::Report) && self.moved =>
            {
                self.moved = false;
                out.push(InputEvent::PointerMoved {
                    x: self.x,
                    y: self.y,
                });
            }
            _ => {}
        }
    }

    fn set_x(&mut self, x: f64) {
        self.x = x.max(0.0);
        self.moved = true;
    }

    fn set_y(&mut self, y: f64) {
        self.y = y.max(0.0);
        self.moved = true;
    }
}
