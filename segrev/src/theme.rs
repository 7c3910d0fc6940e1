//! Color theme system for segrev.
//!
//! Two built-in themes:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including 256-color SSH
//!   sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use segrev_core::error::Severity;
use segrev_core::types::SegmentState;

/// All color values used across segrev's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Segment list
    pub state_untranslated: Color,
    pub state_translated: Color,
    pub state_confirmed: Color,
    /// Marker for segments flagged by the tag or space checks.
    pub error_flag: Color,
    /// Background of the focused segment (after a go-to).
    pub focus_bg: Color,

    // Error tables
    /// Background of the selected error row.
    pub selected_bg: Color,
    /// "Loading" / "still working" hints and other secondary text.
    pub muted: Color,

    // Notices
    pub notice_info: Color,
    pub notice_warning: Color,
    pub notice_error: Color,

    // Dialogs
    /// The field that currently receives typed input.
    pub field_active: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color.
    pub status_mode: Color,
}

impl Theme {
    /// ANSI 16 colors. The fallback when config names an unknown theme.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            state_untranslated: Color::Red,
            state_translated: Color::Yellow,
            state_confirmed: Color::Green,
            error_flag: Color::Magenta,
            focus_bg: Color::Blue,

            selected_bg: Color::DarkGray,
            muted: Color::DarkGray,

            notice_info: Color::Cyan,
            notice_warning: Color::Yellow,
            notice_error: Color::Red,

            field_active: Color::Cyan,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode: Color::Cyan,
        }
    }

    /// Catppuccin Mocha in RGB truecolor.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            state_untranslated: red,
            state_translated: yellow,
            state_confirmed: green,
            error_flag: mauve,
            focus_bg: surface0,

            selected_bg: surface1,
            muted: overlay1,

            notice_info: blue,
            notice_warning: peach,
            notice_error: red,

            field_active: lavender,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode: lavender,
        }
    }

    /// Resolves a theme name from config. Unknown names fall back to `dark()` with a
    /// logged warning rather than failing startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    pub fn state_color(&self, state: SegmentState) -> Color {
        match state {
            SegmentState::Untranslated => self.state_untranslated,
            SegmentState::Translated => self.state_translated,
            SegmentState::Confirmed => self.state_confirmed,
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => self.notice_info,
            Severity::Warning => self.notice_warning,
            Severity::Error => self.notice_error,
        }
    }
}
