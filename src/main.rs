use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use virtual_piano::ui::app::PianoApp;
use virtual_piano::{AudioEngine, PianoConfig, create_command_channel, create_ui_channel};

// Ringbuffer capacity constants
// A burst of key presses plus transport commands stays far below this
const COMMAND_RINGBUFFER_CAPACITY: usize = 256;
// Key highlights and status lines for a whole looped pass of a dense take
const UI_RINGBUFFER_CAPACITY: usize = 1024;

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match PianoConfig::load_or_default(config_path_from_args().as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (ui_tx, ui_rx) = create_ui_channel(UI_RINGBUFFER_CAPACITY);
    let ui_tx = Arc::new(Mutex::new(ui_tx));

    let audio_engine = match AudioEngine::new(&config, command_rx, ui_tx) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 420.0])
            .with_title("Virtual Piano"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Virtual Piano",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(PianoApp::new(
                audio_engine,
                &config,
                command_tx,
                ui_rx,
            )))
        }),
    ) {
        log::error!("UI error: {}", e);
    }
}
