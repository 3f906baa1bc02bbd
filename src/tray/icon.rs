//! Tray icon rendering
//!
//! Draws a small padlock tinted by the VPN connection status

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::vpn::ConnectionStatus;

pub const ICON_SIZE: u32 = 32;

/// Status color for icon tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLevel {
    /// Tunnel up - blue
    Protected,
    /// Tunnel changing state - amber
    Transitioning,
    /// Tunnel down or not configured - gray
    Unprotected,
}

impl StatusLevel {
    pub fn from_status(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => StatusLevel::Protected,
            ConnectionStatus::Connecting
            | ConnectionStatus::Reasserting
            | ConnectionStatus::Disconnecting => StatusLevel::Transitioning,
            ConnectionStatus::Disconnected | ConnectionStatus::Invalid => StatusLevel::Unprotected,
        }
    }

    /// Get RGB color for this level
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            StatusLevel::Protected => (0, 173, 231),      // Confirmed blue
            StatusLevel::Transitioning => (255, 193, 7),  // Amber
            StatusLevel::Unprotected => (158, 158, 158),  // Gray
        }
    }
}

/// Render the padlock for a status
pub fn render_status_icon(status: ConnectionStatus) -> RgbaImage {
    let (r, g, b) = StatusLevel::from_status(status).color();
    let fill = Rgba([r, g, b, 255]);
    let mut img: RgbaImage = ImageBuffer::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 0, 0]));

    // Shackle: ring from y=4 to y=16, 3px thick, bottom half hidden by the body
    let (cx, cy) = (15.5f32, 13.0f32);
    for y in 3..16 {
        for x in 6..26 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if (6.0..=9.0).contains(&dist) && (y as f32) <= cy {
                img.put_pixel(x, y, fill);
            }
        }
        // Shackle legs
        if y as f32 > cy {
            for x in [7u32, 8, 9, 22, 23, 24] {
                img.put_pixel(x, y, fill);
            }
        }
    }

    // Body
    for y in 14..29 {
        for x in 5..27 {
            img.put_pixel(x, y, fill);
        }
    }

    // Keyhole
    let hole = Rgba([255, 255, 255, 255]);
    for y in 18..25 {
        for x in 15..17 {
            img.put_pixel(x, y, hole);
        }
    }

    img
}

/// Tooltip text for a status
pub fn tooltip(status: ConnectionStatus) -> String {
    format!("Lockdown - {}", status.label())
}
