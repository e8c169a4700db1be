//! Workbench configuration.
//!
//! Everything has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "flags": "ix", "backtrack_limit": 100000 }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Default bound on backtracking steps per match attempt.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub flags: Flags,
    pub backtrack_limit: usize,
    /// CSS class of the span wrapping each replacement in HTML output.
    pub highlight_class: String,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            flags: Flags::default(),
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            highlight_class: "highlight".to_string(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Ruby regex options: `i` ignore case, `m` dot matches newline, `x` extended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub ignore_case: bool,
    pub multiline: bool,
    pub extended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown regex option '{0}'")]
pub struct UnknownFlag(pub char);

impl FromStr for Flags {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::default();
        for ch in s.chars() {
            match ch {
                'i' => flags.ignore_case = true,
                'm' => flags.multiline = true,
                'x' => flags.extended = true,
                other => return Err(UnknownFlag(other)),
            }
        }
        Ok(flags)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignore_case {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        if self.extended {
            f.write_str("x")?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Flags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
