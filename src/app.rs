use eframe::egui;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::interpreter::{CaptureMode, Effect, Interpreter, LineKind};
use crate::launcher;
use crate::line_editor::LineEditor;
use crate::submit::FormSubmitter;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);
const FONT_SIZE: f32 = 16.0;

pub struct VinylCodeApp {
    interpreter: Interpreter,
    submitter: FormSubmitter,
    editor: LineEditor,
    show_cursor: bool,
    last_cursor_blink: Instant,
}

impl VinylCodeApp {
    pub fn new(config: &Config, submitter: FormSubmitter) -> Self {
        Self {
            interpreter: Interpreter::new(config.create_url.clone()),
            submitter,
            editor: LineEditor::new(),
            show_cursor: true,
            last_cursor_blink: Instant::now(),
        }
    }

    fn execute_line(&mut self) {
        let line = self.editor.take_line();
        self.run_line(&line);
    }

    fn run_line(&mut self, line: &str) {
        for effect in self.interpreter.dispatch(line) {
            self.run_effect(effect);
        }
    }

    fn handle_event(&mut self, event: &egui::Event) {
        match event {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => self.handle_key(*key, *modifiers),
            egui::Event::Text(text) => self.editor.insert_text(text),
            // egui-winit turns Ctrl+C into Copy before any Key event is sent.
            egui::Event::Copy => self.editor.discard(),
            egui::Event::Paste(text) => {
                for line in self.editor.paste(text) {
                    self.run_line(&line);
                }
            }
            _ => {}
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::OpenUrl(url) => {
                if let Err(err) = launcher::open_url(&url) {
                    tracing::warn!(%url, error = %err, "failed to open browser");
                    self.interpreter
                        .record_error(format!("Could not open {} ({}). Visit it manually.", url, err));
                }
            }
            Effect::Submit(code) => self.submitter.submit_async(code),
        }
    }

    fn drain_reports(&mut self) {
        for report in self.submitter.poll_reports() {
            self.interpreter.record_submission(&report.outcome);
        }
    }

    fn handle_key(&mut self, key: egui::Key, modifiers: egui::Modifiers) {
        if modifiers.ctrl {
            match key {
                egui::Key::C => {
                    // Ctrl+C drops the line being typed
                    self.editor.discard();
                }
                egui::Key::L => {
                    self.editor.discard();
                    self.run_line("clear");
                }
                _ => {}
            }
            return;
        }

        match key {
            egui::Key::Enter => self.execute_line(),
            egui::Key::Backspace => self.editor.backspace(),
            egui::Key::Delete => self.editor.delete(),
            egui::Key::ArrowLeft => self.editor.move_left(),
            egui::Key::ArrowRight => self.editor.move_right(),
            egui::Key::Home => self.editor.move_home(),
            egui::Key::End => self.editor.move_end(),
            egui::Key::ArrowUp => self.editor.history_prev(),
            egui::Key::ArrowDown => self.editor.history_next(),
            egui::Key::Tab => {
                self.editor.complete();
            }
            egui::Key::Escape => self.editor.hide_suggestions(),
            _ => {}
        }
        self.show_cursor = true;
        self.last_cursor_blink = Instant::now();
    }

    fn line_color(kind: LineKind) -> egui::Color32 {
        match kind {
            LineKind::Echo => egui::Color32::from_rgb(255, 255, 100),
            LineKind::Output => egui::Color32::from_rgb(74, 222, 128),
            LineKind::Success => egui::Color32::from_rgb(100, 200, 255),
            LineKind::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }

    fn mode_label(&self) -> String {
        let lines = self.interpreter.code().lines().count();
        match self.interpreter.mode() {
            CaptureMode::Idle => "idle".to_string(),
            CaptureMode::Capturing { .. } => {
                format!("pasting, {} lines (type \"end\" to finish)", lines)
            }
            CaptureMode::Ready => format!("code ready, {} lines", lines),
        }
    }

    fn prompt_row(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(">")
                    .font(egui::FontId::monospace(FONT_SIZE))
                    .color(egui::Color32::from_rgb(100, 255, 150)),
            );

            let mut display_input: String = self.editor.text().to_string();
            if self.show_cursor {
                let offset = display_input
                    .char_indices()
                    .nth(self.editor.cursor())
                    .map_or(display_input.len(), |(offset, _)| offset);
                display_input.insert(offset, '█');
            }

            ui.label(
                egui::RichText::new(display_input)
                    .font(egui::FontId::monospace(FONT_SIZE))
                    .color(egui::Color32::WHITE),
            );
        });

        if self.editor.suggestions().is_empty() {
            return;
        }
        ui.horizontal(|ui| {
            ui.add_space(20.0);
            ui.vertical(|ui| {
                for (i, suggestion) in self.editor.suggestions().iter().enumerate() {
                    let color = if self.editor.selected_suggestion() == Some(i) {
                        egui::Color32::from_rgb(255, 255, 100)
                    } else {
                        egui::Color32::from_rgb(180, 180, 180)
                    };
                    ui.label(
                        egui::RichText::new(suggestion)
                            .font(egui::FontId::monospace(FONT_SIZE))
                            .color(color),
                    );
                }
            });
        });
    }
}

impl eframe::App for VinylCodeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.last_cursor_blink.elapsed() > Duration::from_millis(500) {
            self.show_cursor = !self.show_cursor;
            self.last_cursor_blink = Instant::now();
        }
        ctx.request_repaint_after(Duration::from_millis(500));

        self.drain_reports();
        if self.submitter.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        ctx.input(|i| {
            for event in &i.events {
                self.handle_event(event);
            }
        });

        egui::TopBottomPanel::bottom("status")
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(egui::Margin::same(6.0)))
            .show(ctx, |ui| {
                let pending = self.submitter.in_flight();
                let status = if pending > 0 {
                    format!("{} | submitting {} | Ctrl+L: clear", self.mode_label(), pending)
                } else {
                    format!("{} | Ctrl+L: clear", self.mode_label())
                };
                ui.small(egui::RichText::new(status).color(egui::Color32::GRAY));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(egui::Margin::same(12.0)))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("VinylCode CLI")
                        .font(egui::FontId::monospace(22.0))
                        .color(egui::Color32::from_rgb(74, 222, 128))
                        .strong(),
                );
                ui.separator();

                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.with_layout(egui::Layout::top_down_justified(egui::Align::LEFT), |ui| {
                            for line in self.interpreter.transcript() {
                                ui.label(
                                    egui::RichText::new(&line.text)
                                        .font(egui::FontId::monospace(FONT_SIZE))
                                        .color(Self::line_color(line.kind)),
                                );
                            }
                            self.prompt_row(ui);
                        });
                    });
            });
    }
}
