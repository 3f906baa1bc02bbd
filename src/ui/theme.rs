//! Theme colors and sizes for the menu popup

use egui::Color32;

/// Lockdown light theme
pub struct Theme;

impl Theme {
    // ─────────────────────────────────────────────────────────────
    // Background
    // ─────────────────────────────────────────────────────────────

    /// Window background
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(248, 248, 250);

    /// Identity row / toggle row background
    pub const MAIN_BACKGROUND: Color32 = Color32::from_rgb(240, 240, 244);

    // ─────────────────────────────────────────────────────────────
    // Buttons
    // ─────────────────────────────────────────────────────────────

    /// Confirmed blue - primary buttons, toggle on
    pub const CONFIRMED_BLUE: Color32 = Color32::from_rgb(0, 173, 231);

    /// Gray button (Quit)
    pub const GRAY_BUTTON: Color32 = Color32::from_rgb(142, 142, 147);

    /// Toggle off track
    pub const LIGHT_GRAY: Color32 = Color32::from_rgb(214, 214, 218);

    /// Button text
    pub const BUTTON_TEXT: Color32 = Color32::WHITE;

    // ─────────────────────────────────────────────────────────────
    // Text
    // ─────────────────────────────────────────────────────────────

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(30, 30, 35);

    /// Footer
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(140, 140, 150);

    /// Login errors
    pub const ERROR: Color32 = Color32::from_rgb(255, 69, 58);

    pub const SEPARATOR: Color32 = Color32::from_rgb(225, 225, 230);
}

/// Font sizes
pub struct FontSize;

impl FontSize {
    pub const SMALL: f32 = 10.0;
    pub const SUBTITLE2: f32 = 13.0;
    pub const SUBTITLE: f32 = 14.0;
}

pub const CORNER_RADIUS: f32 = 8.0;

/// Popup size in logical pixels
pub const PANEL_SIZE: [f32; 2] = [290.0, 275.0];
