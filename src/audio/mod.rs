// Audio module - cpal backend and real-time callback

pub mod dsp_utils;
pub mod engine;
pub mod parameters;
pub mod timing;
