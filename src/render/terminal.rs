//! Full-screen terminal surface with panic-safe cleanup.

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use glam::Vec2;
use std::io::{self, Stdout, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::canvas::CharCanvas;
use super::surface::{RenderError, Surface};

/// Whether the terminal is currently switched over (for the panic hook)
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Log output written while the alternate screen is up
static HELD_LOG: Mutex<Vec<u8>> = Mutex::new(Vec::new());

/// Guard that puts the terminal back on drop.
/// This handles both normal exits and panics.
pub struct ScreenGuard {
    active: bool,
}

impl ScreenGuard {
    /// Enter raw mode and the alternate screen.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            release_held(&SCREEN_ACTIVE, &HELD_LOG, &mut io::stderr());
            return Err(e);
        }

        Ok(Self { active: true })
    }

    /// Leave the alternate screen and raw mode now.
    /// After calling this, the guard's drop is a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            restore_terminal()?;
        }
        Ok(())
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if self.active {
            // Best-effort cleanup - ignore errors during drop
            let _ = restore_terminal();
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    let shown = execute!(io::stdout(), Show, LeaveAlternateScreen);
    let raw = disable_raw_mode();
    release_held(&SCREEN_ACTIVE, &HELD_LOG, &mut io::stderr());
    raw?;
    shown
}

/// Log target that keeps records off the alternate screen.
///
/// Writes go to stderr, except while a [`ScreenGuard`] is active: then they
/// are held and printed once the terminal is restored.
pub struct ScreenLogWriter;

impl Write for ScreenLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_or_hold(&SCREEN_ACTIVE, &HELD_LOG, &mut io::stderr(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn write_or_hold<W: Write>(
    active: &AtomicBool,
    held: &Mutex<Vec<u8>>,
    out: &mut W,
    buf: &[u8],
) -> io::Result<usize> {
    let mut held = held.lock().unwrap_or_else(PoisonError::into_inner);
    if active.load(Ordering::SeqCst) {
        held.extend_from_slice(buf);
        return Ok(buf.len());
    }
    drop(held);
    out.write(buf)
}

/// Clear the active flag and print whatever was held meanwhile.
fn release_held<W: Write>(active: &AtomicBool, held: &Mutex<Vec<u8>>, out: &mut W) {
    let pending = {
        let mut held = held.lock().unwrap_or_else(PoisonError::into_inner);
        active.store(false, Ordering::SeqCst);
        std::mem::take(&mut *held)
    };
    if !pending.is_empty() {
        let _ = out.write_all(&pending);
        let _ = out.flush();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if SCREEN_ACTIVE.load(Ordering::SeqCst) {
            let _ = restore_terminal();
        }
        original_hook(panic_info);
    }));
}

/// Whether a key press is a request to close the view.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('d') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Draws frames into the terminal's alternate screen.
pub struct TerminalSurface {
    canvas: CharCanvas,
    stdout: Stdout,
    guard: ScreenGuard,
}

impl TerminalSurface {
    /// Take over the terminal. It is handed back when the surface drops.
    pub fn new() -> Result<Self, RenderError> {
        let guard = ScreenGuard::enter()?;
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        Ok(Self {
            canvas: CharCanvas::new(cols, rows),
            stdout: io::stdout(),
            guard,
        })
    }

    /// Give the terminal back before the surface is dropped.
    pub fn close(mut self) -> Result<(), RenderError> {
        self.guard.exit()?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (u16, u16) {
        (self.canvas.width(), self.canvas.height())
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        let (cols, rows) = crossterm::terminal::size()?;
        self.canvas.resize(cols, rows);
        self.canvas.clear();
        Ok(())
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, glyph: char) {
        self.canvas.draw_line(from, to, glyph);
    }

    fn draw_text(&mut self, col: u16, row: u16, text: &str) {
        self.canvas.draw_text(col, row, text);
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        for (row, line) in self.canvas.rows().enumerate() {
            queue!(self.stdout, MoveTo(0, row as u16), Print(line))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, RenderError> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if is_quit_key(&key) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(is_quit_key(&key(KeyCode::Char('d'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_other_keys_do_not_quit() {
        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&key(KeyCode::Char('x'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn test_release_does_not_quit() {
        let mut release = key(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }

    #[test]
    fn test_screen_guard_enter_and_drop() {
        // Skip when not running in a terminal (CI, captured test output)
        match ScreenGuard::enter() {
            Ok(guard) => {
                assert!(SCREEN_ACTIVE.load(Ordering::SeqCst));
                drop(guard);
                assert!(!SCREEN_ACTIVE.load(Ordering::SeqCst));
            }
            Err(e) => {
                eprintln!("Skipping test (no TTY): {}", e);
            }
        }
    }

    #[test]
    fn test_log_is_held_while_screen_active() {
        let active = AtomicBool::new(true);
        let held = Mutex::new(Vec::new());
        let mut out = Vec::new();

        let n = write_or_hold(&active, &held, &mut out, b"link lost\n").unwrap();
        assert_eq!(n, 10);
        assert!(out.is_empty());

        release_held(&active, &held, &mut out);
        assert!(!active.load(Ordering::SeqCst));
        assert_eq!(out, b"link lost\n");
        assert!(held.lock().unwrap().is_empty());
    }

    #[test]
    fn test_log_passes_through_when_screen_inactive() {
        let active = AtomicBool::new(false);
        let held = Mutex::new(Vec::new());
        let mut out = Vec::new();

        write_or_hold(&active, &held, &mut out, b"opened\n").unwrap();
        assert_eq!(out, b"opened\n");
        assert!(held.lock().unwrap().is_empty());

        // Nothing held: release writes nothing
        release_held(&active, &held, &mut out);
        assert_eq!(out, b"opened\n");
    }

    #[test]
    fn test_panic_hook_installation() {
        install_panic_hook();
        install_panic_hook(); // Second call should be no-op
    }
}
