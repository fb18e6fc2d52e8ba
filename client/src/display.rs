use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{QueueableCommand, cursor};
use std::io::{self, Stdout, Write};
use tracing::warn;

/// ANSI escape sequence that clears the screen and positions the cursor in
/// the top-left corner (1, 1)
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Somewhere a rendered frame can be shown
pub trait DisplaySurface {
    /// Replace whatever is currently shown with `text` (lines separated by
    /// `\n`)
    fn clear_and_write(&mut self, text: &str) -> io::Result<()>;

    /// Visible area in character cells, when known
    fn size(&self) -> Option<(usize, usize)> {
        None
    }
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Box<T> {
    fn clear_and_write(&mut self, text: &str) -> io::Result<()> {
        (**self).clear_and_write(text)
    }

    fn size(&self) -> Option<(usize, usize)> {
        (**self).size()
    }
}

fn terminal_size() -> Option<(usize, usize)> {
    terminal::size()
        .ok()
        .filter(|&(cols, rows)| cols > 0 && rows > 0)
        .map(|(cols, rows)| (cols as usize, rows as usize))
}

/// Clears the whole screen with an escape sequence before every frame.
///
/// Works on any writer, including pipes; lines end with `\r\n` so output
/// lines up whether or not the terminal is in raw mode.
pub struct AnsiSurface<W: Write> {
    out: W,
    /// fixed size instead of asking the terminal
    size: Option<(usize, usize)>,
}

impl AnsiSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, size: None }
    }

    pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
        self.size = Some((cols, rows));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for AnsiSurface<W> {
    fn clear_and_write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(CLEAR_SCREEN.as_bytes())?;

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.out.write_all(b"\r\n")?;
            }
            self.out.write_all(line.as_bytes())?;
        }

        // flushed to print to the terminal as soon as possible
        self.out.flush()
    }

    fn size(&self) -> Option<(usize, usize)> {
        self.size.or_else(terminal_size)
    }
}

/// Full-screen terminal output on the alternate screen.
///
/// Each frame overwrites the previous one in place (cursor to origin, write
/// rows, clear what is left), which avoids the flicker of a full clear.
/// The terminal is restored when the surface is dropped.
pub struct TerminalSurface {
    stdout: Stdout,
}

impl TerminalSurface {
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        stdout.queue(terminal::EnterAlternateScreen)?;
        stdout.queue(cursor::Hide)?;
        stdout.queue(terminal::DisableLineWrap)?;
        stdout.queue(terminal::Clear(ClearType::All))?;
        stdout.flush()?;

        Ok(Self { stdout })
    }

    fn leave(&mut self) -> io::Result<()> {
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()
    }
}

impl DisplaySurface for TerminalSurface {
    fn clear_and_write(&mut self, text: &str) -> io::Result<()> {
        for (y, line) in text.split('\n').enumerate() {
            let y = u16::try_from(y).unwrap_or(u16::MAX);
            self.stdout.queue(cursor::MoveTo(0, y))?;
            self.stdout.queue(Print(line))?;
            self.stdout.queue(terminal::Clear(ClearType::UntilNewLine))?;
        }
        self.stdout.queue(terminal::Clear(ClearType::FromCursorDown))?;

        self.stdout.flush()
    }

    fn size(&self) -> Option<(usize, usize)> {
        terminal_size()
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!("failed to restore terminal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ansi_surface_clears_then_writes_lines() {
        let mut surface = AnsiSurface::new(Vec::new());
        surface.clear_and_write("ab\ncd").unwrap();

        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(out, format!("{CLEAR_SCREEN}ab\r\ncd"));
    }

    #[test]
    fn every_frame_starts_with_a_clear() {
        let mut surface = AnsiSurface::new(Vec::new());
        surface.clear_and_write("1").unwrap();
        surface.clear_and_write("2").unwrap();

        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(out.matches(CLEAR_SCREEN).count(), 2);
        assert!(out.ends_with(&format!("{CLEAR_SCREEN}2")));
    }

    #[test]
    fn fixed_size_overrides_terminal() {
        let surface = AnsiSurface::new(Vec::new()).with_size(100, 30);
        assert_eq!(surface.size(), Some((100, 30)));
    }
}
