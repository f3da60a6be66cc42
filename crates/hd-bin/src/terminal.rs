//! Crossterm backend: raw mode + alternate screen with restore on drop, and a
//! whole-frame draw of the document plus a bottom status row.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{Write, stdout};
use unicode_width::UnicodeWidthChar;

#[derive(Default)]
pub struct CrosstermBackend {
    entered: bool,
}

/// Restores the terminal when dropped, including on early return or panic.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter_guard(&mut self, title: &str) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        execute!(stdout(), SetTitle(title))?;
        Ok(TerminalGuard { backend: self })
    }

    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}

/// Truncate `text` to at most `width` terminal columns.
pub fn fit_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// `status` truncated and space-padded to exactly `width` columns.
pub fn status_row(status: &str, width: usize) -> String {
    let shown = fit_width(status, width);
    let mut row = shown.to_string();
    row.extend(std::iter::repeat_n(' ', width - display_width(shown)));
    row
}

/// Draw the tail of `document` that fits above the status row.
pub fn draw(document: &str, status: &str, cols: u16, rows: u16) -> Result<()> {
    let mut out = stdout();
    let width = cols as usize;
    let body_rows = rows.saturating_sub(1) as usize;
    let lines: Vec<String> = document
        .split('\n')
        .map(|line| line.replace('\t', "    "))
        .collect();
    let first = lines.len().saturating_sub(body_rows);
    let visible = &lines[first..];

    queue!(out, Hide, Clear(ClearType::All))?;
    for (row, line) in visible.iter().enumerate() {
        queue!(out, MoveTo(0, row as u16), Print(fit_width(line, width)))?;
    }
    if rows > 0 {
        queue!(
            out,
            MoveTo(0, rows - 1),
            SetAttribute(Attribute::Reverse),
            Print(status_row(status, width)),
            SetAttribute(Attribute::Reset)
        )?;
    }
    let cursor_row = visible.len().saturating_sub(1) as u16;
    let cursor_col = visible
        .last()
        .map(|line| display_width(fit_width(line, width.saturating_sub(1))))
        .unwrap_or(0) as u16;
    queue!(out, MoveTo(cursor_col, cursor_row), Show)?;
    out.flush()?;
    Ok(())
}
