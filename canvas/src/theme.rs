//! Fixed visual themes for the drawing area.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use serde::{Deserialize, Serialize};

/// Drawing-area theme. The key is passed to drawing programs as `theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Board,
}

impl Theme {
    pub const ALL: [Self; 3] = [Self::Dark, Self::Light, Self::Board];

    /// Parse a theme key. Unknown keys yield `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Board => "board",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "Темна",
            Self::Light => "Светла",
            Self::Board => "Табла",
        }
    }

    /// Background color, also used as the SVG export background.
    #[must_use]
    pub fn background_hex(self) -> &'static str {
        match self {
            Self::Dark => "#0f172a",
            Self::Light => "#ffffff",
            Self::Board => "#064e3b",
        }
    }

    #[must_use]
    pub fn background_class(self) -> &'static str {
        match self {
            Self::Dark => "bg-slate-900",
            Self::Light => "bg-white",
            Self::Board => "bg-emerald-900",
        }
    }

    #[must_use]
    pub fn border_class(self) -> &'static str {
        match self {
            Self::Dark => "border-slate-800",
            Self::Light => "border-slate-200",
            Self::Board => "border-emerald-800",
        }
    }

    /// Color of the "generating" placeholder text.
    #[must_use]
    pub fn placeholder_color(self) -> &'static str {
        match self {
            Self::Light => "#64748b",
            Self::Dark | Self::Board => "#94a3b8",
        }
    }
}
