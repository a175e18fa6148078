//! Theme preference and the human-mode palette derived from it.

use std::fmt;

use clap::ValueEnum;
use console::Style;
use serde::{Deserialize, Serialize};

/// Visual mode, persisted under the `theme` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Interpret a stored value. Only `"dark"` selects dark mode.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Palette used by human-mode output.
    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette::light(),
            Self::Dark => Palette::dark(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Centralized terminal styles for human-mode output.
#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,
    pub header: Style,
    pub index: Style,
    pub record_id: Style,
}

impl Palette {
    #[must_use]
    pub fn light() -> Self {
        Self {
            accent: Style::new().blue(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warning: Style::new().yellow(),
            muted: Style::new().dim(),
            header: Style::new().blue().bold().underlined(),
            index: Style::new().yellow().bold(),
            record_id: Style::new().cyan(),
        }
    }

    #[must_use]
    pub fn dark() -> Self {
        Self {
            accent: Style::new().cyan().bright(),
            success: Style::new().green().bright().bold(),
            error: Style::new().red().bright().bold(),
            warning: Style::new().yellow().bright(),
            muted: Style::new().white().dim(),
            header: Style::new().cyan().bright().bold().underlined(),
            index: Style::new().magenta().bright().bold(),
            record_id: Style::new().blue().bright(),
        }
    }

    /// Strip all styling, for `--no-color` and non-TTY output.
    #[must_use]
    pub fn plain() -> Self {
        let none = Style::new;
        Self {
            accent: none(),
            success: none(),
            error: none(),
            warning: none(),
            muted: none(),
            header: none(),
            index: none(),
            record_id: none(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}
