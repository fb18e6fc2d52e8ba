use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Everything the user asked for since the previous poll
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    /// quit key, Esc or Ctrl+C
    pub stop: bool,
    pub toggle_invert: bool,
    pub toggle_mirror: bool,
    /// export the current grid as a PNG
    pub snapshot: bool,
}

impl Controls {
    pub fn stop() -> Self {
        Self {
            stop: true,
            ..Default::default()
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop
    }

    /// Fold one key press into the pending requests
    pub fn apply_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.stop = true
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.stop = true,
            // two presses between polls cancel out
            KeyCode::Char('i') => self.toggle_invert ^= true,
            KeyCode::Char('m') => self.toggle_mirror ^= true,
            KeyCode::Char('s') => self.snapshot = true,
            _ => {}
        }
    }
}

/// Polled once per loop iteration; never blocks
pub trait ControlSource {
    fn poll(&mut self) -> io::Result<Controls>;
}

impl<T: ControlSource + ?Sized> ControlSource for Box<T> {
    fn poll(&mut self) -> io::Result<Controls> {
        (**self).poll()
    }
}

/// Key presses read from the terminal.
///
/// Raw mode is held for the lifetime of the value so single key presses
/// arrive without Enter and Ctrl+C is delivered as a key instead of killing
/// the process.
pub struct KeyboardControls {
    _private: (),
}

impl KeyboardControls {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        debug!("raw mode enabled");
        Ok(Self { _private: () })
    }
}

impl ControlSource for KeyboardControls {
    fn poll(&mut self) -> io::Result<Controls> {
        let mut controls = Controls::default();

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                controls.apply_key(key);
            }
        }

        Ok(controls)
    }
}

impl Drop for KeyboardControls {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to leave raw mode: {}", e);
        }
    }
}

/// Replays a fixed sequence of polls, then reports nothing forever.
///
/// Used when stdin is not a terminal, and to drive the loop in tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedControls {
    script: VecDeque<Controls>,
    polls: usize,
}

impl ScriptedControls {
    pub fn new(script: impl IntoIterator<Item = Controls>) -> Self {
        Self {
            script: script.into_iter().collect(),
            polls: 0,
        }
    }

    /// Request a stop on poll number `n` (1-based)
    pub fn stop_on_poll(n: usize) -> Self {
        let mut script = vec![Controls::default(); n.saturating_sub(1)];
        script.push(Controls::stop());
        Self::new(script)
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl ControlSource for ScriptedControls {
    fn poll(&mut self) -> io::Result<Controls> {
        self.polls += 1;
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

/// Wraps another control source and turns a termination signal into a stop
/// request, so the loop still closes its source on SIGINT or SIGTERM.
pub struct InterruptControls<C> {
    inner: C,
    interrupted: Arc<AtomicBool>,
}

impl<C> InterruptControls<C> {
    /// Stop once `interrupted` is set, by a signal handler or anyone else
    pub fn new(inner: C, interrupted: Arc<AtomicBool>) -> Self {
        Self { inner, interrupted }
    }
}

impl<C: ControlSource> ControlSource for InterruptControls<C> {
    fn poll(&mut self) -> io::Result<Controls> {
        let mut controls = self.inner.poll()?;
        if self.interrupted.load(Ordering::Relaxed) {
            debug!("interrupted");
            controls.stop = true;
        }
        Ok(controls)
    }
}

/// A flag raised by the process termination signals (SIGINT, SIGTERM, and
/// SIGQUIT on Unix) instead of their default action
pub fn termination_flag() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for &signal in signal_hook::consts::TERM_SIGNALS {
        // a second signal while the first is still pending exits at once
        signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(&flag))?;
        signal_hook::flag::register(signal, Arc::clone(&flag))?;
    }
    debug!("termination signals routed to the loop");
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_keys_request_stop() {
        for key in [
            press(KeyCode::Char('q'), KeyModifiers::NONE),
            press(KeyCode::Esc, KeyModifiers::NONE),
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut controls = Controls::default();
            controls.apply_key(key);
            assert!(controls.is_stop_requested(), "{key:?}");
        }
    }

    #[test]
    fn plain_c_is_not_interrupt() {
        let mut controls = Controls::default();
        controls.apply_key(press(KeyCode::Char('c'), KeyModifiers::NONE));
        assert_eq!(controls, Controls::default());
    }

    #[test]
    fn toggles_cancel_in_pairs() {
        let mut controls = Controls::default();
        controls.apply_key(press(KeyCode::Char('i'), KeyModifiers::NONE));
        controls.apply_key(press(KeyCode::Char('m'), KeyModifiers::NONE));
        controls.apply_key(press(KeyCode::Char('i'), KeyModifiers::NONE));

        assert!(!controls.toggle_invert);
        assert!(controls.toggle_mirror);
    }

    #[test]
    fn scripted_controls_run_out_quietly() {
        let mut controls = ScriptedControls::stop_on_poll(2);
        assert!(!controls.poll().unwrap().is_stop_requested());
        assert!(controls.poll().unwrap().is_stop_requested());
        assert!(!controls.poll().unwrap().is_stop_requested());
        assert_eq!(controls.polls(), 3);
    }

    #[test]
    fn interrupt_flag_becomes_stop() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut controls = InterruptControls::new(
            ScriptedControls::new([Controls {
                toggle_mirror: true,
                ..Default::default()
            }]),
            Arc::clone(&flag),
        );

        let first = controls.poll().unwrap();
        assert!(first.toggle_mirror);
        assert!(!first.is_stop_requested());

        flag.store(true, Ordering::Relaxed);
        assert!(controls.poll().unwrap().is_stop_requested());
        // stays stopped
        assert!(controls.poll().unwrap().is_stop_requested());
    }

    #[cfg(unix)]
    #[test]
    fn sigterm_raises_the_flag() {
        let flag = termination_flag().unwrap();
        assert!(!flag.load(Ordering::Relaxed));

        signal_hook::low_level::raise(signal_hook::consts::SIGTERM).unwrap();
        assert!(flag.load(Ordering::Relaxed));
    }
}
