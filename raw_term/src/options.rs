// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Session configuration.
//!
//! ## Environment Variables Checked
//!
//! | Variable                           | Effect when truthy                          |
//! | :--------------------------------- | :------------------------------------------ |
//! | `R3BL_RAW_TERM_FORCE_EMULATION`    | treat every terminal as lacking native VT   |
//! | `R3BL_RAW_TERM_NO_INTERRUPT_GUARD` | don't arm the interrupt guard               |
//! | `R3BL_RAW_TERM_DUPLICATE_INPUT`    | duplicate stdin (`0`/`false` turns it off)  |
//!
//! Truthy values are `1`, `true`, `yes` and `on` (any case). Falsy values are `0`,
//! `false`, `no` and `off`. Anything else is ignored.

use crate::stream_selector::duplicate_input_by_default;
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_FORCE_EMULATION: &str = "R3BL_RAW_TERM_FORCE_EMULATION";
pub const ENV_NO_INTERRUPT_GUARD: &str = "R3BL_RAW_TERM_NO_INTERRUPT_GUARD";
pub const ENV_DUPLICATE_INPUT: &str = "R3BL_RAW_TERM_DUPLICATE_INPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Restore the managed streams and exit when the process is interrupted.
    pub arm_interrupt_guard: bool,
    /// Use the software emulator even where VT processing is native.
    pub force_emulation: bool,
    /// `None` picks the platform default (Windows duplicates, Unix does not).
    pub duplicate_input: Option<bool>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            arm_interrupt_guard: true,
            force_emulation: false,
            duplicate_input: None,
        }
    }
}

impl SessionOptions {
    /// Defaults, overlaid with the process environment.
    #[must_use]
    pub fn from_env() -> Self { Self::default().overlay(|key| env::var(key).ok()) }

    /// Overlays the variables that `lookup` returns on top of `self`.
    #[must_use]
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).as_deref().and_then(parse_flag);
        if let Some(force) = flag(ENV_FORCE_EMULATION) {
            self.force_emulation = force;
        }
        if let Some(no_guard) = flag(ENV_NO_INTERRUPT_GUARD) {
            self.arm_interrupt_guard = !no_guard;
        }
        if let Some(duplicate) = flag(ENV_DUPLICATE_INPUT) {
            self.duplicate_input = Some(duplicate);
        }
        self
    }

    #[must_use]
    pub fn effective_duplicate_input(&self) -> bool {
        self.duplicate_input
            .unwrap_or_else(duplicate_input_by_default)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
