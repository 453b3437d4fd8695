//! Color palette.

use ratatui::style::Color;

// --- Background layers ---
pub const DEEPEST_BG: Color = Color::Black;
pub const POPUP_BG: Color = Color::Rgb(28, 33, 43);
pub const SHADOW: Color = Color::Rgb(5, 6, 8);

// --- Borders ---
pub const BORDER_DIM: Color = Color::DarkGray;
pub const BORDER_ACTIVE: Color = Color::Cyan;

// --- Accent ---
pub const ACCENT: Color = Color::Cyan;
/// Foreground on accent backgrounds
pub const CONTRAST_FG: Color = Color::Black;

// --- Text ---
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Gray;
pub const TEXT_MUTED: Color = Color::DarkGray;

// --- Status ---
pub const STATUS_GREEN: Color = Color::Green;
pub const STATUS_RED: Color = Color::Red;
pub const STATUS_YELLOW: Color = Color::Yellow;
pub const STATUS_BLUE: Color = Color::Blue;

// --- File browser ---
pub const FOLDER: Color = Color::LightBlue;
pub const MARKED: Color = Color::LightGreen;

// --- Log level colors ---
pub const LOG_ERROR: Color = Color::Red;
pub const LOG_WARNING: Color = Color::Yellow;
pub const LOG_INFO: Color = Color::Green;
pub const LOG_DEBUG: Color = Color::DarkGray;
