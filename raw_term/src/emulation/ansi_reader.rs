// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words BackTab

//! [`AnsiReader`] reads console key events and hands out the byte sequences a VT
//! capable terminal would have sent for the same keys.
//!
//! | Key                      | Bytes                                   |
//! | :----------------------- | :-------------------------------------- |
//! | printable character      | its UTF-8 encoding                      |
//! | Ctrl + letter            | C0 control `0x01` to `0x1a`             |
//! | Alt + key                | `ESC` followed by the key's bytes       |
//! | Enter, Tab, Backspace    | `CR`, `HT`, `DEL`                        |
//! | Shift + Tab              | `ESC [ Z`                                |
//! | arrows, Home, End        | `ESC [ A` .. `ESC [ 1 ; m A`            |
//! | Insert, Delete, PgUp/Dn  | `ESC [ n ~` .. `ESC [ n ; m ~`          |
//! | F1 to F4                 | `ESC O P` .. (`ESC [ 1 ; m P` modified) |
//! | F5 to F12                | `ESC [ 15 ~` .. `ESC [ 24 ~`            |
//!
//! `m` is the xterm modifier parameter: `1 + shift + 2*alt + 4*ctrl`. Key release
//! events, mouse, focus and resize events produce no bytes.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{collections::VecDeque,
          io::{self, Read}};

const ESC: u8 = 0x1b;

/// Where [`AnsiReader`] gets its events from.
pub trait EventSource: Send {
    /// Blocks until the next event.
    ///
    /// # Errors
    ///
    /// When the console can't be read.
    fn next_event(&mut self) -> io::Result<Event>;
}

/// The process console, through [`crossterm::event::read()`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEvents;

impl EventSource for ConsoleEvents {
    fn next_event(&mut self) -> io::Result<Event> { crossterm::event::read() }
}

/// Software VT input on top of console key events.
#[derive(Debug)]
pub struct AnsiReader<E: EventSource = ConsoleEvents> {
    source: E,
    pending: VecDeque<u8>,
}

impl AnsiReader<ConsoleEvents> {
    #[must_use]
    pub fn console() -> Self { Self::new(ConsoleEvents) }
}

impl<E: EventSource> AnsiReader<E> {
    pub fn new(source: E) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }
}

impl<E: EventSource> Read for AnsiReader<E> {
    /// Blocks until at least one byte is available. Bytes of a sequence that don't fit
    /// in `buf` are handed out by the next call.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pending.is_empty() {
            let event = self.source.next_event()?;
            self.pending.extend(encode_event(&event));
        }
        let count = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

/// The VT bytes for one console event. Empty for events a terminal wouldn't send.
#[must_use]
pub fn encode_event(event: &Event) -> Vec<u8> {
    match event {
        Event::Key(key) => encode_key(key),
        Event::Paste(text) => text.as_bytes().to_vec(),
        _ => Vec::new(),
    }
}

fn encode_key(key: &KeyEvent) -> Vec<u8> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return Vec::new();
    }

    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let modifier = modifier_param(key.modifiers);

    let plain = match key.code {
        KeyCode::Char(ch) if ctrl => match control_byte(ch) {
            Some(byte) => vec![byte],
            None => encode_char(ch),
        },
        KeyCode::Char(ch) => encode_char(ch),
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![ESC],
        KeyCode::BackTab => return b"\x1b[Z".to_vec(),
        KeyCode::Up => return letter_sequence(b'A', modifier),
        KeyCode::Down => return letter_sequence(b'B', modifier),
        KeyCode::Right => return letter_sequence(b'C', modifier),
        KeyCode::Left => return letter_sequence(b'D', modifier),
        KeyCode::Home => return letter_sequence(b'H', modifier),
        KeyCode::End => return letter_sequence(b'F', modifier),
        KeyCode::Insert => return tilde_sequence(2, modifier),
        KeyCode::Delete => return tilde_sequence(3, modifier),
        KeyCode::PageUp => return tilde_sequence(5, modifier),
        KeyCode::PageDown => return tilde_sequence(6, modifier),
        KeyCode::F(number) => return function_key(number, modifier),
        _ => return Vec::new(),
    };

    if alt {
        let mut bytes = Vec::with_capacity(plain.len() + 1);
        bytes.push(ESC);
        bytes.extend(plain);
        bytes
    } else {
        plain
    }
}

fn encode_char(ch: char) -> Vec<u8> {
    let mut utf8 = [0; 4];
    ch.encode_utf8(&mut utf8).as_bytes().to_vec()
}

/// Ctrl + key as a C0 control, the way a VT keyboard maps it.
fn control_byte(ch: char) -> Option<u8> {
    match ch {
        'a'..='z' | 'A'..='Z' => u8::try_from(ch.to_ascii_lowercase())
            .ok()
            .map(|byte| byte - b'a' + 1),
        ' ' | '@' | '2' => Some(0x00),
        '[' | '3' => Some(ESC),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '-' => Some(0x1f),
        '8' | '?' => Some(0x7f),
        _ => None,
    }
}

/// `1` means no modifier, and is left out of the sequence.
fn modifier_param(modifiers: KeyModifiers) -> u8 {
    let mut param = 1;
    if modifiers.contains(KeyModifiers::SHIFT) {
        param += 1;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        param += 2;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        param += 4;
    }
    param
}

fn letter_sequence(letter: u8, modifier: u8) -> Vec<u8> {
    if modifier == 1 {
        vec![ESC, b'[', letter]
    } else {
        format!("\x1b[1;{modifier}{}", char::from(letter)).into_bytes()
    }
}

fn tilde_sequence(number: u8, modifier: u8) -> Vec<u8> {
    if modifier == 1 {
        format!("\x1b[{number}~").into_bytes()
    } else {
        format!("\x1b[{number};{modifier}~").into_bytes()
    }
}

fn function_key(number: u8, modifier: u8) -> Vec<u8> {
    match number {
        1..=4 => {
            let letter = b'P' + (number - 1);
            if modifier == 1 {
                vec![ESC, b'O', letter]
            } else {
                letter_sequence(letter, modifier)
            }
        }
        5 => tilde_sequence(15, modifier),
        6..=10 => tilde_sequence(number + 11, modifier),
        11 | 12 => tilde_sequence(number + 12, modifier),
        _ => Vec::new(),
    }
}
