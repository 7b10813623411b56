// Messaging - Lock-free UI ↔ audio thread communication

pub mod channels;
pub mod command;
pub mod notification;
