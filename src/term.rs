use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::style::{self, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal, ErrorKind};
use tracing::error;

use snake_arena::{Alignment, Color, Platform};

/// Terminal implementation of [`Platform`]. One grid cell is two characters
/// wide and one high; pixel coordinates from the game are scaled down
/// accordingly.
pub struct TermManager {
    width: u16,
    height: u16,
    cell_size: u32,
    stdout: Stdout,
    background: Color,
    /// First write error since the last flush.
    failed: Option<ErrorKind>,
}

impl TermManager {
    pub fn new(cell_size: u32) -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(TermManager {
            width,
            height,
            cell_size,
            stdout: stdout(),
            background: Color::WHITE_COFFEE,
            failed: None,
        })
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
    }

    pub fn read_key_events_queue(&self) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Pixel size of the drawable surface handed to the game.
    pub fn surface_size(&self) -> (u32, u32) {
        (
            u32::from(self.width / 2) * self.cell_size,
            u32::from(self.height) * self.cell_size,
        )
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn column(&self, x: u32) -> u16 {
        (x.saturating_mul(2) / self.cell_size).min(u32::from(self.width)) as u16
    }

    fn row(&self, y: u32) -> u16 {
        (y / self.cell_size).min(u32::from(self.height)) as u16
    }

    fn print_at(&mut self, pos: (u16, u16), text: &str, fg: Color, bg: Color) {
        let res = queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            SetForegroundColor(rgb(fg)),
            SetBackgroundColor(rgb(bg)),
            style::Print(text)
        );

        if let Err(err) = res {
            if self.failed.is_none() {
                self.failed = Some(err);
            }
        }
    }
}

impl Platform for TermManager {
    fn draw_rectangle(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color, fill: bool) {
        let (left, top) = (self.column(x), self.row(y));
        let right = self.column(x.saturating_add(width));
        let bottom = self.row(y.saturating_add(height));
        let span = usize::from(right.saturating_sub(left));

        if span == 0 || bottom <= top {
            return;
        }

        if fill {
            let (surface_width, surface_height) = self.surface_size();
            if x == 0 && y == 0 && width >= surface_width && height >= surface_height {
                self.background = color;
            }

            let blank = " ".repeat(span);
            for row in top..bottom {
                self.print_at((left, row), &blank, color, color);
            }
            return;
        }

        // Outlines narrower than a box would just hide the fill underneath.
        if span < 3 || bottom - top < 3 {
            return;
        }

        let background = self.background;
        let edge = format!("+{}+", "-".repeat(span - 2));
        self.print_at((left, top), &edge, color, background);
        self.print_at((left, bottom - 1), &edge, color, background);

        for row in top + 1..bottom - 1 {
            self.print_at((left, row), "|", color, background);
            self.print_at((right - 1, row), "|", color, background);
        }
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        _size: u32,
        color: Color,
        _fill: bool,
        alignment: Alignment,
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let len = text.chars().count() as u16;
        let anchor = self.column(x);
        let start = match alignment {
            Alignment::Left => anchor,
            Alignment::Center => anchor.saturating_sub(len / 2),
            Alignment::Right => anchor.saturating_sub(len),
        }
        .min(self.width - 1);
        let row = self.row(y).min(self.height - 1);

        let visible: String = text.chars().take(usize::from(self.width - start)).collect();
        let background = self.background;
        self.print_at((start, row), &visible, color, background);
    }

    fn throw_error(&mut self, message: &str) {
        error!(reason = message, "fatal error reported to terminal host");
        let _ = self.restore();
        eprintln!("fatal: {}", message);
    }
}

fn rgb(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r(),
        g: color.g(),
        b: color.b(),
    }
}
