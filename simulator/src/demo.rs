//! Demo screen: three static labels above a horizontally scrolling panel of
//! image buttons. Text is drawn as solid bars; only geometry and colours
//! matter here.

use std::time::Duration;

use log::{debug, info};
use simkit::prelude::*;
use simkit::version::BUILD_TAG;

const BACKGROUND: u32 = 0x121212;
const LABEL_COLOR: u32 = 0xe0e0e0;
const PANEL_COLOR: u32 = 0x1e1e1e;
const BUTTON_COLOR: u32 = 0x2d5f8b;
const PRESSED_COLOR: u32 = 0x4a90d9;

const TITLE: &str = "Scritte Statiche";
const COLOR_DEPTH: u32 = 32;
const BUTTON_STYLE: &str = "imgbtn";

const MARGIN: i32 = 10;
const LINE_HEIGHT: u32 = 16;
const GLYPH_WIDTH: u32 = 8;
const BUTTON_SIZE: u32 = 96;
const BUTTON_GAP: u32 = 12;
/// Pointer travel below this is a click, not a drag.
const DRAG_THRESHOLD: f64 = 6.0;
const TIMER_PERIOD: Duration = Duration::from_millis(5);

pub const ICONS: [&str; 10] = [
    "blender",
    "clock",
    "coffee_pot",
    "cooktop",
    "espresso",
    "home",
    "mixer",
    "oven",
    "settings",
    "tea_maker",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < self.x as f64 + self.w as f64
            && y < self.y as f64 + self.h as f64
    }

    fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w as i32).min(other.x + other.w as i32);
        let y1 = (self.y + self.h as i32).min(other.y + other.h as i32);
        (x1 > x0 && y1 > y0).then(|| Rect {
            x: x0,
            y: y0,
            w: (x1 - x0) as u32,
            h: (y1 - y0) as u32,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageButton {
    pub text: String,
    pub icon: &'static str,
    /// Position inside the panel content, before scrolling.
    pub offset: i32,
}

#[derive(Debug)]
pub struct Screen {
    pub labels: Vec<Label>,
    pub panel: Rect,
    pub buttons: Vec<ImageButton>,
    scroll: i32,
    pressed: Option<usize>,
}

impl Screen {
    pub fn new(surface: &SurfaceInfo) -> Self {
        let label = |row: i32, text: String| Label {
            rect: Rect {
                x: MARGIN,
                y: MARGIN + row * (LINE_HEIGHT as i32 + MARGIN),
                w: text.chars().count() as u32 * GLYPH_WIDTH,
                h: LINE_HEIGHT,
            },
            text,
        };
        let labels = vec![
            label(0, TITLE.to_string()),
            label(1, format!("Config: {}bpp, {}", COLOR_DEPTH, BUTTON_STYLE)),
            label(2, format!("Build: {}", BUILD_TAG)),
        ];

        let top = MARGIN + 3 * (LINE_HEIGHT as i32 + MARGIN);
        let panel = Rect {
            x: 0,
            y: top,
            w: surface.width,
            h: (BUTTON_SIZE + 2 * BUTTON_GAP)
                .min(surface.height.saturating_sub(top as u32)),
        };

        let buttons = ICONS
            .iter()
            .enumerate()
            .map(|(i, &icon)| ImageButton {
                text: format!("Scritte {}", i),
                icon,
                offset: (BUTTON_GAP + i as u32 * (BUTTON_SIZE + BUTTON_GAP))
                    as i32,
            })
            .collect();

        Self {
            labels,
            panel,
            buttons,
            scroll: 0,
            pressed: None,
        }
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    fn max_scroll(&self) -> i32 {
        let content = BUTTON_GAP
            + self.buttons.len() as u32 * (BUTTON_SIZE + BUTTON_GAP);
        content.saturating_sub(self.panel.w) as i32
    }

    fn scroll_to(&mut self, scroll: i32) -> bool {
        let scroll = scroll.clamp(0, self.max_scroll());
        let changed = scroll != self.scroll;
        self.scroll = scroll;
        changed
    }

    /// Screen-space rectangle of button `index`, unclipped.
    pub fn button_rect(&self, index: usize) -> Rect {
        Rect {
            x: self.panel.x + self.buttons[index].offset - self.scroll,
            y: self.panel.y + BUTTON_GAP as i32,
            w: BUTTON_SIZE,
            h: BUTTON_SIZE,
        }
    }

    pub fn button_at(&self, x: f64, y: f64) -> Option<usize> {
        if !self.panel.contains(x, y) {
            return None;
        }
        (0..self.buttons.len()).find(|&i| self.button_rect(i).contains(x, y))
    }

    fn draw(&self, target: &mut PixelBuffer) {
        target.fill(BACKGROUND);

        for label in &self.labels {
            let r = label.rect;
            target.fill_rect(r.x, r.y, r.w, r.h, LABEL_COLOR);
        }

        let p = self.panel;
        target.fill_rect(p.x, p.y, p.w, p.h, PANEL_COLOR);

        for i in 0..self.buttons.len() {
            let Some(r) = self.button_rect(i).intersect(&self.panel) else {
                continue;
            };
            let color = if self.pressed == Some(i) {
                PRESSED_COLOR
            } else {
                BUTTON_COLOR
            };
            target.fill_rect(r.x, r.y, r.w, r.h, color);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    start_x: f64,
    start_scroll: i32,
    moved: bool,
}

/// A minimal retained-mode toolkit hosting the demo screen.
#[derive(Default)]
pub struct DemoToolkit {
    screen: Option<Screen>,
    pointer: (f64, f64),
    drag: Option<Drag>,
    dirty: bool,
    timer_passes: u64,
    clicked: Vec<usize>,
}

impl DemoToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    /// Buttons activated so far, in order.
    pub fn clicked(&self) -> &[usize] {
        &self.clicked
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
        let (Some(screen), Some(drag)) =
            (self.screen.as_mut(), self.drag.as_mut())
        else {
            return;
        };

        let travel = drag.start_x - x;
        if travel.abs() >= DRAG_THRESHOLD {
            drag.moved = true;
        }
        if drag.moved {
            let target = drag.start_scroll + travel.round() as i32;
            if screen.scroll_to(target) {
                screen.pressed = None;
                self.dirty = true;
            }
        }
    }

    fn pointer_button(&mut self, pressed: bool) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        let (x, y) = self.pointer;

        if pressed {
            if screen.panel.contains(x, y) {
                self.drag = Some(Drag {
                    start_x: x,
                    start_scroll: screen.scroll,
                    moved: false,
                });
                screen.pressed = screen.button_at(x, y);
                self.dirty = true;
            }
            return;
        }

        let drag = self.drag.take();
        let was_pressed = screen.pressed.take();
        if let (Some(drag), Some(index)) = (drag, was_pressed) {
            if !drag.moved && screen.button_at(x, y) == Some(index) {
                let button = &screen.buttons[index];
                info!("{} ({})", button.text, button.icon);
                self.clicked.push(index);
            }
        }
        self.dirty = true;
    }
}

impl Toolkit for DemoToolkit {
    fn init(&mut self, settings: &Settings) {
        debug!(
            "toolkit up, requested window {}x{}",
            settings.window_width, settings.window_height
        );
    }

    fn build_screen(&mut self, surface: &SurfaceInfo) {
        let screen = Screen::new(surface);
        debug!(
            "screen: {} labels, {} buttons, panel {:?}",
            screen.labels.len(),
            screen.buttons.len(),
            screen.panel
        );
        self.screen = Some(screen);
        self.dirty = true;
    }

    fn handle_timers(&mut self) -> Duration {
        self.timer_passes += 1;
        TIMER_PERIOD
    }

    fn feed_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            InputEvent::PointerButton { pressed } => {
                self.pointer_button(pressed);
            }
            InputEvent::Key { name, pressed } => {
                debug!("key {} {}", name, if pressed { "down" } else { "up" });
            }
        }
    }

    fn render(&mut self, target: &mut PixelBuffer) -> bool {
        let Some(screen) = self.screen.as_ref() else {
            return false;
        };
        if !self.dirty {
            return false;
        }
        screen.draw(target);
        self.dirty = false;
        true
    }
}
