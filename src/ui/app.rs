// Main piano window

use crate::audio::engine::AudioEngine;
use crate::config::PianoConfig;
use crate::messaging::channels::{CommandProducer, UiUpdateConsumer};
use crate::messaging::command::Command;
use crate::messaging::notification::{
    Notification, NotificationCategory, NotificationLevel, TransportSnapshot, UiUpdate,
};
use crate::note::NoteName;
use crate::synth::oscillator::WaveType;
use crate::ui::keyboard::{KeyboardInput, egui_key};
use eframe::egui;
use ringbuf::traits::{Consumer, Producer};
use std::collections::{HashSet, VecDeque};

const KEY_SIZE: egui::Vec2 = egui::vec2(40.0, 110.0);
const MAX_NOTIFICATIONS: usize = 10;

pub struct PianoApp {
    engine: AudioEngine,
    command_tx: CommandProducer,
    ui_rx: UiUpdateConsumer,
    input: KeyboardInput,
    // Keys the engine reports as sounding
    lit: HashSet<NoteName>,
    mouse_note: Option<NoteName>,
    transport: TransportSnapshot,
    notifications: VecDeque<Notification>,
    dropped_seen: usize,
    // Control state
    volume_ui: f32,
    speed_ui: f64,
    speed_range: (f64, f64),
    loop_ui: bool,
    sustain_ui: bool,
    wave_ui: WaveType,
}

impl PianoApp {
    pub fn new(
        engine: AudioEngine,
        config: &PianoConfig,
        command_tx: CommandProducer,
        ui_rx: UiUpdateConsumer,
    ) -> Self {
        let volume_ui = engine.volume.get();

        Self {
            engine,
            command_tx,
            ui_rx,
            input: KeyboardInput::new(config.layout()),
            lit: HashSet::new(),
            mouse_note: None,
            transport: TransportSnapshot {
                loop_enabled: config.loop_enabled,
                speed: config.speed,
                ..TransportSnapshot::default()
            },
            notifications: VecDeque::new(),
            dropped_seen: 0,
            volume_ui,
            speed_ui: config.speed,
            speed_range: config.speed_range,
            loop_ui: config.loop_enabled,
            sustain_ui: false,
            wave_ui: config.wave_type,
        }
    }

    /// Resume the audio context, then queue the command
    fn send(&mut self, command: Command) {
        if let Err(e) = self.engine.resume() {
            self.push_notification(Notification::error(NotificationCategory::Audio, e.to_string()));
            return;
        }
        if self.command_tx.try_push(command).is_err() {
            log::warn!("Command queue full, dropping command");
        }
    }

    fn send_opt(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            self.send(command);
        }
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    fn drain_updates(&mut self) {
        while let Some(update) = self.ui_rx.try_pop() {
            match update {
                UiUpdate::Status(notification) => self.push_notification(notification),
                UiUpdate::KeyPressed(note) => {
                    self.lit.insert(note);
                }
                UiUpdate::KeyReleased(note) => {
                    self.lit.remove(&note);
                }
                UiUpdate::Transport(snapshot) => {
                    self.transport = snapshot;
                    self.sustain_ui = snapshot.sustain;
                }
            }
        }

        let lost = self.engine.dropped_updates().since(&mut self.dropped_seen);
        if lost > 0 {
            log::warn!("{} updates from the audio thread were lost", lost);
            self.push_notification(Notification::warning(
                NotificationCategory::Generic,
                format!("Display may be out of date ({} updates lost)", lost),
            ));
        }
    }

    fn handle_computer_keyboard(&mut self, ctx: &egui::Context) {
        let shortcuts: Vec<(char, egui::Key)> = self
            .input
            .layout()
            .keys()
            .iter()
            .filter_map(|key| key.shortcut)
            .filter_map(|c| egui_key(c).map(|k| (c, k)))
            .collect();

        for (shortcut, key) in shortcuts {
            if ctx.input(|i| i.key_pressed(key)) {
                let command = self.input.press_shortcut(shortcut);
                self.send_opt(command);
            }
            if ctx.input(|i| i.key_released(key)) {
                let command = self.input.release_shortcut(shortcut);
                self.send_opt(command);
            }
        }

        let shift = ctx.input(|i| i.modifiers.shift);
        let command = self.input.shift(shift);
        self.send_opt(command);

        if !ctx.input(|i| i.focused) {
            for command in self.input.release_all() {
                self.send(command);
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        let t = self.transport;
        let idle = !t.recording && !t.playing_back;

        ui.horizontal(|ui| {
            let record = egui::Button::new("⏺ Record")
                .fill(if t.recording {
                    egui::Color32::from_rgb(200, 50, 50)
                } else {
                    egui::Color32::from_gray(60)
                })
                .min_size(egui::vec2(90.0, 30.0));
            if ui.add_enabled(idle, record).clicked() {
                self.send(Command::StartRecording);
            }
            if ui
                .add_enabled(t.recording, egui::Button::new("⏹ Stop").min_size(egui::vec2(90.0, 30.0)))
                .clicked()
            {
                self.send(Command::StopRecording);
            }
            if ui
                .add_enabled(idle, egui::Button::new("▶ Play").min_size(egui::vec2(90.0, 30.0)))
                .clicked()
            {
                self.send(Command::Play);
            }
            if ui
                .add_enabled(
                    t.playing_back,
                    egui::Button::new("⏹ Stop playback").min_size(egui::vec2(120.0, 30.0)),
                )
                .clicked()
            {
                self.send(Command::StopPlayback);
            }
            if ui
                .add_enabled(
                    idle && !t.lesson_running,
                    egui::Button::new("🎓 Lesson").min_size(egui::vec2(90.0, 30.0)),
                )
                .clicked()
            {
                self.send(Command::StartLesson);
            }
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.checkbox(&mut self.sustain_ui, "Sustain (Shift)").changed() {
                let on = self.sustain_ui;
                self.send(Command::SetSustain(on));
            }
            if ui.checkbox(&mut self.loop_ui, "Loop").changed() {
                let on = self.loop_ui;
                self.send(Command::SetLoop(on));
            }

            ui.label("Speed:");
            let (low, high) = self.speed_range;
            if ui
                .add(
                    egui::Slider::new(&mut self.speed_ui, low..=high)
                        .step_by(0.1)
                        .custom_formatter(|v, _| format!("{:.1}x", v)),
                )
                .changed()
            {
                let speed = self.speed_ui;
                self.send(Command::SetSpeed(speed));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Sound:");
            let previous = self.wave_ui;
            egui::ComboBox::from_id_salt("wave_selector")
                .selected_text(self.wave_ui.as_str())
                .show_ui(ui, |ui| {
                    for wave in WaveType::ALL {
                        ui.selectable_value(&mut self.wave_ui, wave, wave.as_str());
                    }
                });
            if previous != self.wave_ui {
                let wave = self.wave_ui;
                self.send(Command::SetWaveType(wave));
            }

            ui.label("Volume:");
            if ui.add(egui::Slider::new(&mut self.volume_ui, 0.0..=1.0)).changed() {
                self.engine.volume.set(self.volume_ui);
            }
        });
    }

    fn draw_keyboard(&mut self, ui: &mut egui::Ui) {
        let mut pointer_on: Option<NoteName> = None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            for key in self.input.layout().keys() {
                let lit = self.lit.contains(&key.note);
                let black = key.note.is_sharp();

                let label = match key.shortcut {
                    Some(c) => format!("{}\n\n{}", key.note, c.to_ascii_uppercase()),
                    None => key.note.to_string(),
                };
                let (fill, text) = match (black, lit) {
                    (_, true) => (egui::Color32::from_rgb(120, 170, 255), egui::Color32::BLACK),
                    (true, false) => (egui::Color32::from_gray(30), egui::Color32::WHITE),
                    (false, false) => (egui::Color32::WHITE, egui::Color32::BLACK),
                };

                let size = if black {
                    egui::vec2(KEY_SIZE.x, KEY_SIZE.y * 0.65)
                } else {
                    KEY_SIZE
                };
                let button = egui::Button::new(egui::RichText::new(label).color(text).small())
                    .fill(fill)
                    .stroke(egui::Stroke::new(1.0, egui::Color32::BLACK))
                    .min_size(size)
                    .sense(egui::Sense::drag());

                if ui.add(button).is_pointer_button_down_on() {
                    pointer_on = Some(key.note.clone());
                }
            }
        });

        // Mouse/touch: the key under a held pointer sounds, leaving it releases
        if pointer_on != self.mouse_note {
            if let Some(old) = self.mouse_note.take() {
                let command = self.input.release(&old);
                self.send_opt(command);
            }
            if let Some(new) = &pointer_on {
                let command = self.input.press(new);
                self.send_opt(command);
            }
            self.mouse_note = pointer_on;
        }
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| match self.notifications.back() {
            None => {
                ui.label("Click a key or use your keyboard to start.");
            }
            Some(notification) => {
                let color = match notification.level {
                    NotificationLevel::Info => egui::Color32::from_rgb(100, 150, 255),
                    NotificationLevel::Warning => egui::Color32::from_rgb(255, 165, 0),
                    NotificationLevel::Error => egui::Color32::RED,
                };
                ui.colored_label(color, &notification.message);
            }
        });
    }
}

impl eframe::App for PianoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep polling key events and engine updates
        ctx.request_repaint();

        self.drain_updates();
        self.handle_computer_keyboard(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Virtual Piano");
            ui.separator();
            ui.add_space(10.0);

            self.draw_controls(ui);

            ui.add_space(16.0);
            self.draw_keyboard(ui);

            ui.add_space(10.0);
            ui.label("Keys: A W S E D F T G Y H U J (octave 4), Z 1 X 2 C V 3 B 4 N 5 M (octave 5)");

            self.draw_status_bar(ui);
        });
    }
}
