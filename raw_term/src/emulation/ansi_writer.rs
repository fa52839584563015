// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words DECTCEM DECSC DECRC SGR CUU CUD CUF CUB CNL CPL CHA CUP HVP VPA

//! [`AnsiWriter`] parses the ANSI/VT byte stream a program writes and re-issues each
//! recognized sequence as a [`crossterm`] command.
//!
//! ```text
//! program writes "\x1b[2;5H"   →  vte::Parser  →  csi_dispatch('H', [2, 5])
//!                                              →  cursor::MoveTo(4, 1)
//!                                              →  WinAPI call (legacy console)
//!                                                 or ANSI bytes (everywhere else)
//! ```
//!
//! | Kind    | Handled                                                              |
//! | :------ | :------------------------------------------------------------------- |
//! | Print   | all printable characters                                             |
//! | C0      | `BEL`, `BS`, `HT`, `LF`, `CR`                                        |
//! | CSI     | `CUU` `CUD` `CUF` `CUB` `CNL` `CPL` `CHA` `CUP` `HVP` `VPA`          |
//! |         | `ED` `EL` `SU` `SD` `SGR`, save / restore cursor                     |
//! | DEC     | `?25` cursor visibility, `?7` line wrap, `?1049` alternate screen    |
//! | ESC     | `DECSC` (`ESC 7`), `DECRC` (`ESC 8`), `RIS` (`ESC c`)                |
//! | OSC     | `0` and `2` window title                                             |
//!
//! Anything else is dropped with a trace event.

use crossterm::{QueueableCommand,
                cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveTo, MoveToColumn,
                         MoveToNextLine, MoveToPreviousLine, MoveToRow, MoveUp,
                         RestorePosition, SavePosition, Show},
                style::{Attribute, Color, Print, ResetColor, SetAttribute,
                        SetBackgroundColor, SetForegroundColor},
                terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap,
                           EnterAlternateScreen, LeaveAlternateScreen, ScrollDown,
                           ScrollUp, SetTitle}};
use std::io::{self, Write};
use vte::{Params, Perform};

/// Software VT processing in front of a writer.
pub struct AnsiWriter<W: Write> {
    parser: vte::Parser,
    performer: CommandPerformer<W>,
}

impl<W: Write> AnsiWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            parser: vte::Parser::new(),
            performer: CommandPerformer { out, error: None },
        }
    }

    pub fn get_ref(&self) -> &W { &self.performer.out }

    pub fn into_inner(self) -> W { self.performer.out }
}

impl<W: Write> std::fmt::Debug for AnsiWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsiWriter").finish_non_exhaustive()
    }
}

impl<W: Write> Write for AnsiWriter<W> {
    /// Consumes all of `buf`. A sequence split across two writes is completed by the
    /// second one.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.parser.advance(&mut self.performer, buf);
        match self.performer.error.take() {
            Some(error) => Err(error),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> { self.performer.out.flush() }
}

struct CommandPerformer<W: Write> {
    out: W,
    /// First error since the last `write()`. Later commands are skipped.
    error: Option<io::Error>,
}

impl<W: Write> CommandPerformer<W> {
    fn queue(&mut self, command: impl crossterm::Command) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.queue(command) {
            self.error = Some(error);
        }
    }

    fn sgr(&mut self, params: &Params) {
        if params.is_empty() {
            self.queue(ResetColor);
            self.queue(SetAttribute(Attribute::Reset));
            return;
        }
        let mut groups = params.iter();
        while let Some(group) = groups.next() {
            match group {
                [] | [0] => {
                    self.queue(ResetColor);
                    self.queue(SetAttribute(Attribute::Reset));
                }
                [1] => self.queue(SetAttribute(Attribute::Bold)),
                [2] => self.queue(SetAttribute(Attribute::Dim)),
                [3] => self.queue(SetAttribute(Attribute::Italic)),
                [4, ..] => self.queue(SetAttribute(Attribute::Underlined)),
                [5] => self.queue(SetAttribute(Attribute::SlowBlink)),
                [6] => self.queue(SetAttribute(Attribute::RapidBlink)),
                [7] => self.queue(SetAttribute(Attribute::Reverse)),
                [8] => self.queue(SetAttribute(Attribute::Hidden)),
                [9] => self.queue(SetAttribute(Attribute::CrossedOut)),
                [22] => self.queue(SetAttribute(Attribute::NormalIntensity)),
                [23] => self.queue(SetAttribute(Attribute::NoItalic)),
                [24] => self.queue(SetAttribute(Attribute::NoUnderline)),
                [25] => self.queue(SetAttribute(Attribute::NoBlink)),
                [27] => self.queue(SetAttribute(Attribute::NoReverse)),
                [28] => self.queue(SetAttribute(Attribute::NoHidden)),
                [29] => self.queue(SetAttribute(Attribute::NotCrossedOut)),
                [n @ 30..=37] => self.queue(SetForegroundColor(base_color(*n - 30))),
                [n @ 90..=97] => self.queue(SetForegroundColor(bright_color(*n - 90))),
                [39] => self.queue(SetForegroundColor(Color::Reset)),
                [n @ 40..=47] => self.queue(SetBackgroundColor(base_color(*n - 40))),
                [n @ 100..=107] => {
                    self.queue(SetBackgroundColor(bright_color(*n - 100)));
                }
                [49] => self.queue(SetBackgroundColor(Color::Reset)),
                [selector @ (38 | 48), rest @ ..] => {
                    // Colon form carries the color in the same group, semicolon form in
                    // the following groups.
                    let color = if rest.is_empty() {
                        extended_color_from_groups(&mut groups)
                    } else {
                        extended_color(rest)
                    };
                    match (*selector, color) {
                        (38, Some(color)) => self.queue(SetForegroundColor(color)),
                        (_, Some(color)) => self.queue(SetBackgroundColor(color)),
                        (_, None) => tracing::trace!(message = "Dropped malformed SGR color"),
                    }
                }
                other => tracing::trace!(message = "Dropped unsupported SGR", ?other),
            }
        }
    }
}

/// First parameter of a CSI sequence, where both a missing and a `0` parameter mean
/// `default`.
fn first_param(params: &Params, default: u16) -> u16 { nth_param(params, 0, default) }

fn nth_param(params: &Params, index: usize, default: u16) -> u16 {
    match params.iter().nth(index).and_then(|group| group.first()) {
        Some(&value) if value != 0 => value,
        _ => default,
    }
}

fn base_color(index: u16) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::DarkRed,
        2 => Color::DarkGreen,
        3 => Color::DarkYellow,
        4 => Color::DarkBlue,
        5 => Color::DarkMagenta,
        6 => Color::DarkCyan,
        _ => Color::Grey,
    }
}

fn bright_color(index: u16) -> Color {
    match index {
        0 => Color::DarkGrey,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::White,
    }
}

/// `5;n` or `2;r;g;b` (with an optional color space id before `r` in colon form).
fn extended_color(args: &[u16]) -> Option<Color> {
    let byte = |value: &u16| u8::try_from(*value).ok();
    match args {
        [5, index] => byte(index).map(Color::AnsiValue),
        [2, r, g, b] | [2, _, r, g, b] => Some(Color::Rgb {
            r: byte(r)?,
            g: byte(g)?,
            b: byte(b)?,
        }),
        _ => None,
    }
}

fn extended_color_from_groups<'a>(groups: &mut impl Iterator<Item = &'a [u16]>) -> Option<Color> {
    let kind = *groups.next()?.first()?;
    let arity = match kind {
        5 => 1,
        2 => 3,
        _ => return None,
    };
    let mut args = vec![kind];
    for _ in 0..arity {
        args.push(*groups.next()?.first()?);
    }
    extended_color(&args)
}

impl<W: Write> Perform for CommandPerformer<W> {
    fn print(&mut self, ch: char) { self.queue(Print(ch)); }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 | b'\t' | b'\n' | b'\r' => self.queue(Print(char::from(byte))),
            0x08 => self.queue(MoveLeft(1)),
            other => tracing::trace!(message = "Dropped C0 control", byte = other),
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        if intermediates.first() == Some(&b'?') {
            let mode = first_param(params, 0);
            match (mode, action) {
                (25, 'h') => self.queue(Show),
                (25, 'l') => self.queue(Hide),
                (7, 'h') => self.queue(EnableLineWrap),
                (7, 'l') => self.queue(DisableLineWrap),
                (1049, 'h') => self.queue(EnterAlternateScreen),
                (1049, 'l') => self.queue(LeaveAlternateScreen),
                _ => tracing::trace!(message = "Dropped private mode", mode, %action),
            }
            return;
        }

        let count = first_param(params, 1);
        match action {
            'A' => self.queue(MoveUp(count)),
            'B' => self.queue(MoveDown(count)),
            'C' => self.queue(MoveRight(count)),
            'D' => self.queue(MoveLeft(count)),
            'E' => self.queue(MoveToNextLine(count)),
            'F' => self.queue(MoveToPreviousLine(count)),
            'G' => self.queue(MoveToColumn(count - 1)),
            'd' => self.queue(MoveToRow(count - 1)),
            'H' | 'f' => {
                let row = nth_param(params, 0, 1);
                let col = nth_param(params, 1, 1);
                self.queue(MoveTo(col - 1, row - 1));
            }
            'J' => match first_param(params, 0) {
                0 => self.queue(Clear(ClearType::FromCursorDown)),
                1 => self.queue(Clear(ClearType::FromCursorUp)),
                2 => self.queue(Clear(ClearType::All)),
                3 => self.queue(Clear(ClearType::Purge)),
                other => tracing::trace!(message = "Dropped ED", mode = other),
            },
            'K' => match first_param(params, 0) {
                0 => self.queue(Clear(ClearType::UntilNewLine)),
                2 => self.queue(Clear(ClearType::CurrentLine)),
                other => tracing::trace!(message = "Dropped EL", mode = other),
            },
            'S' => self.queue(ScrollUp(count)),
            'T' => self.queue(ScrollDown(count)),
            'm' => self.sgr(params),
            's' => self.queue(SavePosition),
            'u' => self.queue(RestorePosition),
            other => tracing::trace!(message = "Dropped CSI", action = %other),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        match (intermediates, byte) {
            ([], b'7') => self.queue(SavePosition),
            ([], b'8') => self.queue(RestorePosition),
            ([], b'c') => {
                self.queue(ResetColor);
                self.queue(SetAttribute(Attribute::Reset));
                self.queue(Clear(ClearType::All));
                self.queue(MoveTo(0, 0));
                self.queue(Show);
            }
            _ => tracing::trace!(message = "Dropped ESC", byte),
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        match params {
            [b"0" | b"2", title, ..] => {
                self.queue(SetTitle(String::from_utf8_lossy(title)));
            }
            _ => tracing::trace!(message = "Dropped OSC"),
        }
    }
}
