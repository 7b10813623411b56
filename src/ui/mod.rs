// UI module - egui shell around the piano session

pub mod app;
pub mod keyboard;
