//! Bouncing-logo splash screen shown before the catalogue.
//!
//! The logo moves diagonally across the terminal, reverses on each edge it
//! touches and picks a new random colour on every bounce.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::{backend::CrosstermBackend, layout::Rect, text::Span, Terminal};
use std::io;
use std::time::Duration;

use crate::config::SplashConfig;

/// Colour the logo starts with
pub const START_COLOR: (u8, u8, u8) = (255, 255, 0);

/// Rows taken by the logo box (border + text + border)
const LOGO_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashOutcome {
    /// Continue into the catalogue
    Continue,
    /// Quit the program
    Quit,
}

/// Which axes reversed during a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

#[derive(Debug, Clone)]
pub struct Bouncer {
    canvas_width: i32,
    canvas_height: i32,
    // Requested logo size; `width`/`height` are this clamped to the canvas
    full_width: i32,
    full_height: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub dx: i32,
    pub dy: i32,
    pub color: (u8, u8, u8),
}

impl Bouncer {
    /// Centre a `width` x `height` logo on the canvas with a random diagonal heading
    pub fn new<R: Rng>(
        canvas_width: u16,
        canvas_height: u16,
        width: u16,
        height: u16,
        speed: u16,
        rng: &mut R,
    ) -> Self {
        let speed = i32::from(speed.max(1));
        let dx = if rng.gen_bool(0.5) { speed } else { -speed };
        let dy = if rng.gen_bool(0.5) { speed } else { -speed };

        let canvas_width = i32::from(canvas_width);
        let canvas_height = i32::from(canvas_height);
        let full_width = i32::from(width);
        let full_height = i32::from(height);
        let width = full_width.min(canvas_width);
        let height = full_height.min(canvas_height);

        Self {
            canvas_width,
            canvas_height,
            full_width,
            full_height,
            x: (canvas_width - width) / 2,
            y: (canvas_height - height) / 2,
            width,
            height,
            dx,
            dy,
            color: START_COLOR,
        }
    }

    /// Advance one frame
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Bounce {
        let bounce = Bounce {
            horizontal: advance_axis(&mut self.x, &mut self.dx, self.width, self.canvas_width),
            vertical: advance_axis(&mut self.y, &mut self.dy, self.height, self.canvas_height),
        };

        if bounce.any() {
            self.color = (rng.gen(), rng.gen(), rng.gen());
        }
        bounce
    }

    /// Fit the logo into a new canvas size
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.canvas_width = i32::from(canvas_width);
        self.canvas_height = i32::from(canvas_height);
        self.width = self.full_width.min(self.canvas_width);
        self.height = self.full_height.min(self.canvas_height);
        self.x = self.x.clamp(0, self.canvas_width - self.width);
        self.y = self.y.clamp(0, self.canvas_height - self.height);
    }

    /// Logo position relative to the canvas origin
    pub fn logo_area(&self) -> Rect {
        Rect::new(
            self.x as u16,
            self.y as u16,
            self.width as u16,
            self.height as u16,
        )
    }
}

/// Move along one axis, reversing on edge contact. Returns true on a bounce.
///
/// Velocity only reverses while it points into the wall that was hit, so a
/// single contact flips it exactly once.
fn advance_axis(pos: &mut i32, vel: &mut i32, size: i32, limit: i32) -> bool {
    let max = limit - size;
    if max <= 0 {
        *pos = 0;
        return false;
    }

    *pos += *vel;
    if *pos <= 0 && *vel < 0 {
        *pos = 0;
        *vel = -*vel;
        true
    } else if *pos >= max && *vel > 0 {
        *pos = max;
        *vel = -*vel;
        true
    } else {
        *pos = (*pos).clamp(0, max);
        false
    }
}

/// Width of the boxed logo for `text`, in terminal columns
pub fn logo_width(text: &str) -> u16 {
    u16::try_from(Span::raw(text).width())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
}

/// Map a key press to a splash outcome; other keys are ignored
pub fn outcome_for_key(key: KeyEvent) -> Option<SplashOutcome> {
    match key.code {
        KeyCode::Enter => Some(SplashOutcome::Continue),
        KeyCode::Esc | KeyCode::Char('q') => Some(SplashOutcome::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SplashOutcome::Quit)
        }
        _ => None,
    }
}

/// Run the animation until the user continues or quits
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &SplashConfig,
) -> Result<SplashOutcome> {
    let mut rng = StdRng::from_entropy();
    let size = terminal.size()?;
    let mut bouncer = Bouncer::new(
        size.width,
        size.height,
        logo_width(&config.text),
        LOGO_HEIGHT,
        config.speed,
        &mut rng,
    );
    let frame = Duration::from_millis(config.frame_ms.max(1));

    loop {
        terminal.draw(|f| crate::ui::draw_splash(f, &bouncer, &config.text))?;

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(outcome) = outcome_for_key(key) {
                        tracing::debug!("Splash finished: {:?}", outcome);
                        return Ok(outcome);
                    }
                }
                Event::Resize(w, h) => bouncer.resize(w, h),
                _ => {}
            }
        }

        bouncer.step(&mut rng);
        tokio::time::sleep(frame).await;
    }
}
