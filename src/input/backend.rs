//! Input backend abstraction for synthetic desktop input.
//!
//! This module provides a unified interface for the ways primitives reach a
//! target:
//! - `DesktopBackend` injects real pointer and keyboard events through enigo
//! - `RecordingBackend` records primitives for dry runs and tests

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use std::thread;
use std::time::Duration;

use super::types::{DispatchError, DispatchResult};
use crate::plan::{ActionStep, Key, Modifier};

/// Pause after every injected event so the target's input queue keeps up
const DEFAULT_SETTLE: Duration = Duration::from_millis(5);

/// Trait for input backends
///
/// Implementations deliver primitives to some target:
/// - `DesktopBackend` for the real desktop session
/// - `RecordingBackend` for dry runs and tests
pub trait InputBackend {
    /// Left click at an absolute screen position
    fn click(&mut self, x: i32, y: i32) -> DispatchResult<()>;

    /// Press and release one key
    fn press(&mut self, key: Key) -> DispatchResult<()>;

    /// Press `key` while holding `modifier`
    fn hotkey(&mut self, modifier: Modifier, key: Key) -> DispatchResult<()>;

    /// Inject literal text
    fn type_text(&mut self, text: &str) -> DispatchResult<()>;

    /// Block for `duration`
    fn wait(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Current pointer position in screen coordinates
    fn pointer_position(&self) -> DispatchResult<(i32, i32)>;

    /// Size of the main display in pixels
    fn screen_size(&self) -> DispatchResult<(i32, i32)>;

    /// Get the source type identifier (e.g., "desktop", "recording")
    fn source_type(&self) -> &str;
}

/// Injects real input events into the desktop session
pub struct DesktopBackend {
    enigo: Enigo,
    settle: Duration,
}

impl DesktopBackend {
    /// Connect to the platform input system.
    ///
    /// On macOS this requires the Accessibility permission for the terminal.
    pub fn new() -> DispatchResult<Self> {
        let enigo = Enigo::new(&Settings::default())?;
        Ok(Self {
            enigo,
            settle: DEFAULT_SETTLE,
        })
    }

    /// Set the pause after every injected event
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn settle_pause(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}

fn to_enigo_key(key: Key) -> enigo::Key {
    match key {
        Key::Tab => enigo::Key::Tab,
        Key::Enter => enigo::Key::Return,
        Key::Up => enigo::Key::UpArrow,
        Key::Down => enigo::Key::DownArrow,
        Key::Left => enigo::Key::LeftArrow,
        Key::F6 => enigo::Key::F6,
        Key::Char(c) => enigo::Key::Unicode(c),
    }
}

fn to_enigo_modifier(modifier: Modifier) -> enigo::Key {
    match modifier {
        Modifier::Ctrl => enigo::Key::Control,
        Modifier::Alt => enigo::Key::Alt,
    }
}

impl InputBackend for DesktopBackend {
    fn click(&mut self, x: i32, y: i32) -> DispatchResult<()> {
        self.enigo.move_mouse(x, y, Coordinate::Abs)?;
        self.enigo.button(Button::Left, Direction::Click)?;
        self.settle_pause();
        Ok(())
    }

    fn press(&mut self, key: Key) -> DispatchResult<()> {
        self.enigo.key(to_enigo_key(key), Direction::Click)?;
        self.settle_pause();
        Ok(())
    }

    fn hotkey(&mut self, modifier: Modifier, key: Key) -> DispatchResult<()> {
        let modifier = to_enigo_modifier(modifier);
        self.enigo.key(modifier, Direction::Press)?;
        let clicked = self.enigo.key(to_enigo_key(key), Direction::Click);
        // Release the modifier even when the key itself failed
        let released = self.enigo.key(modifier, Direction::Release);
        clicked?;
        released?;
        self.settle_pause();
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> DispatchResult<()> {
        self.enigo.text(text)?;
        self.settle_pause();
        Ok(())
    }

    fn pointer_position(&self) -> DispatchResult<(i32, i32)> {
        Ok(self.enigo.location()?)
    }

    fn screen_size(&self) -> DispatchResult<(i32, i32)> {
        Ok(self.enigo.main_display()?)
    }

    fn source_type(&self) -> &str {
        "desktop"
    }
}

/// A backend that records primitives instead of delivering them
///
/// Never sleeps. Failures can be scripted to reproduce operator aborts and
/// injection faults at a chosen point of a run:
/// - `pointer_after()` - move the pointer once N primitives were recorded
/// - `fail_after()` - fail every primitive after the first N
/// - `discard_log()` - count primitives without keeping them
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    /// Every primitive delivered so far, in order
    log: Vec<ActionStep>,
    /// Primitives delivered, including any not kept in `log`
    delivered: usize,
    keep_log: bool,
    pointer: (i32, i32),
    screen: (i32, i32),
    pointer_script: Option<(usize, (i32, i32))>,
    failure_script: Option<(usize, String)>,
}

impl RecordingBackend {
    /// Create a recorder with a 1920x1080 main display and the pointer centered
    pub fn new() -> Self {
        Self::with_screen(1920, 1080)
    }

    pub fn with_screen(width: i32, height: i32) -> Self {
        Self {
            log: Vec::new(),
            delivered: 0,
            keep_log: true,
            pointer: (width / 2, height / 2),
            screen: (width, height),
            pointer_script: None,
            failure_script: None,
        }
    }

    /// Report the pointer at `position` once `count` primitives were recorded
    pub fn pointer_after(mut self, count: usize, position: (i32, i32)) -> Self {
        self.pointer_script = Some((count, position));
        self
    }

    /// Fail every primitive once `count` primitives were recorded
    pub fn fail_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.failure_script = Some((count, message.into()));
        self
    }

    /// Count primitives without keeping them, for runs of any length
    pub fn discard_log(mut self) -> Self {
        self.keep_log = false;
        self
    }

    /// Number of primitives delivered so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Primitives recorded so far
    pub fn recorded(&self) -> &[ActionStep] {
        &self.log
    }

    pub fn into_recorded(self) -> Vec<ActionStep> {
        self.log
    }

    fn record(&mut self, step: ActionStep) -> DispatchResult<()> {
        if let Some((count, message)) = &self.failure_script {
            if self.delivered >= *count {
                return Err(DispatchError::Injection(message.clone()));
            }
        }
        if let ActionStep::Click { x, y } = step {
            self.pointer = (x, y);
        }
        self.push(step);
        Ok(())
    }

    fn push(&mut self, step: ActionStep) {
        self.delivered += 1;
        if self.keep_log {
            self.log.push(step);
        }
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for RecordingBackend {
    fn click(&mut self, x: i32, y: i32) -> DispatchResult<()> {
        self.record(ActionStep::Click { x, y })
    }

    fn press(&mut self, key: Key) -> DispatchResult<()> {
        self.record(ActionStep::Press { key })
    }

    fn hotkey(&mut self, modifier: Modifier, key: Key) -> DispatchResult<()> {
        self.record(ActionStep::Hotkey { modifier, key })
    }

    fn type_text(&mut self, text: &str) -> DispatchResult<()> {
        self.record(ActionStep::Type {
            text: text.to_string(),
        })
    }

    fn wait(&mut self, duration: Duration) {
        // Waits cannot fail; record unconditionally
        self.push(ActionStep::Wait { duration });
    }

    fn pointer_position(&self) -> DispatchResult<(i32, i32)> {
        match self.pointer_script {
            Some((count, position)) if self.delivered >= count => Ok(position),
            _ => Ok(self.pointer),
        }
    }

    fn screen_size(&self) -> DispatchResult<(i32, i32)> {
        Ok(self.screen)
    }

    fn source_type(&self) -> &str {
        "recording"
    }
}
