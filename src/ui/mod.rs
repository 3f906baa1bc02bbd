//! Native egui popup for Lockdown Menu

mod app;
mod theme;
mod widgets;

pub use app::run;
