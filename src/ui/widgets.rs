//! Small custom widgets: filled buttons and the launch-on-login switch

use eframe::egui::{self, Color32, RichText, Rounding, Stroke, Vec2};

use super::theme::{FontSize, Theme, CORNER_RADIUS};

/// Filled rounded button, full available width
pub fn filled_button(ui: &mut egui::Ui, label: &str, fill: Color32, height: f32) -> bool {
    let width = ui.available_width();
    ui.add(
        egui::Button::new(
            RichText::new(label)
                .size(FontSize::SUBTITLE2)
                .color(Theme::BUTTON_TEXT),
        )
        .fill(fill)
        .stroke(Stroke::NONE)
        .rounding(Rounding::same(CORNER_RADIUS))
        .min_size(Vec2::new(width, height)),
    )
    .clicked()
}

/// Two equal buttons side by side. Returns which one was clicked.
pub fn button_pair(ui: &mut egui::Ui, left: &str, right: &str) -> (bool, bool) {
    let spacing = ui.spacing().item_spacing.x;
    let half = (ui.available_width() - spacing) / 2.0;
    let mut clicked = (false, false);

    ui.horizontal(|ui| {
        ui.allocate_ui(Vec2::new(half, 40.0), |ui| {
            clicked.0 = filled_button(ui, left, Theme::CONFIRMED_BLUE, 40.0);
        });
        ui.allocate_ui(Vec2::new(half, 40.0), |ui| {
            clicked.1 = filled_button(ui, right, Theme::CONFIRMED_BLUE, 40.0);
        });
    });

    clicked
}

/// iOS-style switch, 50x29. Returns true when clicked.
pub fn toggle_switch(ui: &mut egui::Ui, on: bool) -> bool {
    let size = Vec2::new(50.0, 29.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let how_on = ui.ctx().animate_bool_with_time(response.id, on, 0.1);
        let track = if on { Theme::CONFIRMED_BLUE } else { Theme::LIGHT_GRAY };
        let radius = rect.height() / 2.0;

        let painter = ui.painter();
        painter.rect_filled(rect, Rounding::same(radius), track);

        let knob_radius = radius - 1.5;
        let knob_x = egui::lerp((rect.center().x - 10.0)..=(rect.center().x + 10.0), how_on);
        let center = egui::pos2(knob_x, rect.center().y);
        painter.circle_filled(center + Vec2::new(0.0, 1.0), knob_radius, Color32::from_black_alpha(40));
        painter.circle_filled(center, knob_radius, Color32::WHITE);
    }

    response.clicked()
}
