use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use image::Rgba;

use doodlepad::components::colors::{PALETTE, StrokeColor, rainbow_at};
use doodlepad::components::tools::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, Tool};
use doodlepad::pad::{Clock, SystemClock};
use doodlepad::{DrawingPad, PadSettings, StampAssets, log_info, log_warn};

const SWATCH_SIZE: f32 = 22.0;
const TOOL_BUTTON_SIZE: f32 = 34.0;

pub struct DoodlePadApp {
    pad: DrawingPad,
    canvas_texture: Option<TextureHandle>,
    /// Surface generation last uploaded to `canvas_texture`.
    uploaded_generation: Option<u64>,
    stamp_loader: Option<JoinHandle<usize>>,
}

impl DoodlePadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: PadSettings) -> Self {
        let assets = StampAssets::new();
        let stamp_loader = Some(assets.spawn_loader(PathBuf::from(&settings.stamp_dir)));
        let pad = DrawingPad::new(&settings, assets);

        Self {
            pad,
            canvas_texture: None,
            uploaded_generation: None,
            stamp_loader,
        }
    }

    fn poll_stamp_loader(&mut self, ctx: &egui::Context) {
        let Some(handle) = self.stamp_loader.as_ref() else { return };
        if !handle.is_finished() {
            // Stamps show up as soon as they decode; keep repainting until done
            ctx.request_repaint_after(Duration::from_millis(250));
            return;
        }
        if let Some(handle) = self.stamp_loader.take() {
            match handle.join() {
                Ok(count) => log_info!("Stamp loader finished: {} bitmap(s)", count),
                Err(_) => log_warn!("Stamp loader thread panicked"),
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let z = i.key_pressed(egui::Key::Z);
            let y = i.key_pressed(egui::Key::Y);
            (
                cmd && z && !i.modifiers.shift,
                cmd && (y || (z && i.modifiers.shift)),
            )
        });
        if undo {
            self.pad.undo();
        }
        if redo {
            self.pad.redo();
        }
    }

    // -- Panels -----------------------------------------------------------

    fn show_tools(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tools");
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::all() {
                let selected = self.pad.tool() == tool;
                let loading = tool
                    .stamp_kind()
                    .is_some_and(|kind| !self.pad.assets().contains(kind));
                let tip = if loading {
                    format!("{}: {} (loading…)", tool.label(), tool.tooltip())
                } else {
                    format!("{}: {}", tool.label(), tool.tooltip())
                };
                let button = egui::Button::new(egui::RichText::new(tool.emoji()).size(20.0))
                    .selected(selected)
                    .min_size(Vec2::splat(TOOL_BUTTON_SIZE));
                if ui.add(button).on_hover_text(tip).clicked() {
                    self.pad.set_tool(tool);
                }
            }
        });
    }

    fn show_colors(&mut self, ui: &mut egui::Ui, now_millis: u64) {
        ui.heading("Colors");
        ui.horizontal_wrapped(|ui| {
            for entry in PALETTE {
                let (rect, response) =
                    ui.allocate_exact_size(Vec2::splat(SWATCH_SIZE), Sense::click());
                if ui.is_rect_visible(rect) {
                    let painter = ui.painter();
                    let fill = match entry.color {
                        StrokeColor::Solid(c) => to_color32(c),
                        StrokeColor::Rainbow => to_color32(rainbow_at(now_millis)),
                    };
                    let radius = SWATCH_SIZE * 0.5 - 2.0;
                    painter.circle_filled(rect.center(), radius, fill);
                    let stroke = if self.pad.color() == entry.color {
                        Stroke::new(2.0, ui.visuals().selection.stroke.color)
                    } else {
                        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
                    };
                    painter.circle_stroke(rect.center(), radius, stroke);
                }
                if response.on_hover_text(entry.name).clicked() {
                    self.pad.set_color(entry.color);
                }
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut size = self.pad.brush_size();
            if ui
                .add(egui::Slider::new(&mut size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).text("Brush Size"))
                .changed()
            {
                self.pad.set_brush_size(size);
            }
            ui.label(format!("{}px", self.pad.brush_size()));
            ui.separator();

            if ui
                .add_enabled(self.pad.can_rotate(), egui::Button::new("Rotate Last Shape"))
                .clicked()
            {
                self.pad.rotate_last_shape();
            }
            if ui
                .add_enabled(self.pad.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                self.pad.undo();
            }
            if ui
                .add_enabled(self.pad.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                self.pad.redo();
            }
            if ui.button("Clear Canvas").clicked() {
                self.pad.clear();
            }
        });
    }

    // -- Canvas -----------------------------------------------------------

    fn upload_canvas(&mut self, ctx: &egui::Context) {
        let generation = self.pad.generation();
        if self.uploaded_generation == Some(generation) && self.canvas_texture.is_some() {
            return;
        }
        let image = self.pad.image();
        let size = [image.width() as usize, image.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        match self.canvas_texture.as_mut() {
            Some(texture) => texture.set(color_image, TextureOptions::LINEAR),
            None => {
                self.canvas_texture =
                    Some(ctx.load_texture("doodle_canvas", color_image, TextureOptions::LINEAR));
            }
        }
        self.uploaded_generation = Some(generation);
    }

    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        self.upload_canvas(ui.ctx());

        let surface = self.pad.surface();
        let logical = Vec2::new(surface.width() as f32, surface.height() as f32);
        let available = ui.available_size();
        let scale = (available.x / logical.x).min(available.y / logical.y).clamp(0.1, 1.0);
        let (rect, _response) = ui.allocate_exact_size(logical * scale, Sense::click_and_drag());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 6.0, Color32::WHITE);
        if let Some(texture) = &self.canvas_texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        painter.rect_stroke(rect, 6.0, Stroke::new(2.0, Color32::from_gray(200)));

        let to_canvas = |p: Pos2| Pos2::new((p.x - rect.min.x) / scale, (p.y - rect.min.y) / scale);
        let (pressed, down, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        let inside = pointer.is_some_and(|p| rect.contains(p));

        if pressed && inside {
            if let Some(p) = pointer {
                self.pad.begin_stroke(to_canvas(p));
            }
        } else if down && self.pad.is_drawing() {
            match pointer {
                Some(p) if inside => self.pad.extend_stroke(to_canvas(p)),
                // Leaving the canvas ends the stroke
                _ => self.pad.end_stroke(),
            }
        }
        if released && self.pad.is_drawing() {
            self.pad.end_stroke();
        }
    }
}

impl eframe::App for DoodlePadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_stamp_loader(ctx);
        self.handle_shortcuts(ctx);

        let now_millis = SystemClock.now_millis();
        if self.pad.color() == StrokeColor::Rainbow {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("palette").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| self.show_tools(ui));
                ui.separator();
                ui.vertical(|ui| self.show_colors(ui, now_millis));
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_controls(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| self.show_canvas(ui));
        });
    }
}

fn to_color32(c: Rgba<u8>) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}
