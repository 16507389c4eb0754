// src/gui.rs
use anyhow::Result;
use eframe::egui;
use egui::{Align, Color32, Layout, RichText, ScrollArea, Stroke, Ui, Vec2};
use log::{error, info};
use std::sync::{Arc, Mutex};
use std::thread;

#[cfg(feature = "clipboard")]
use arboard::Clipboard;

use crate::analysis::classifier::WasteClassifier;
use crate::analysis::gemini::GeminiClassifier;
use crate::analysis::types::{DustbinColor, WasteClassification};
use crate::capture::file::load_image;
use crate::capture::source::ImagePayload;
use crate::config::ScanConfig;
use crate::report;
use crate::scanner::{Phase, Scanner};

const SIDEBAR_WIDTH: f32 = 230.0;
const WINDOW_WIDTH: f32 = 1100.0;
const WINDOW_HEIGHT: f32 = 720.0;

const ACCENT: Color32 = Color32::from_rgb(16, 185, 129);
const PANEL_BG: Color32 = Color32::from_rgb(10, 16, 24);
const CARD_BG: Color32 = Color32::from_rgb(17, 24, 34);

#[derive(Clone, Copy, PartialEq, Eq)]
enum AppTab {
    Classification,
    Materials,
    Disposal,
    EcoTips,
    Upcycling,
}

impl AppTab {
    const ALL: [AppTab; 5] = [
        AppTab::Classification,
        AppTab::Materials,
        AppTab::Disposal,
        AppTab::EcoTips,
        AppTab::Upcycling,
    ];

    fn label(&self) -> &'static str {
        match self {
            AppTab::Classification => "🗑 Classification",
            AppTab::Materials => "🔬 Material Composition",
            AppTab::Disposal => "📖 Disposal Protocol",
            AppTab::EcoTips => "🌿 Eco Strategy",
            AppTab::Upcycling => "💡 Upcycling Lab",
        }
    }
}

struct ThreadSafeState {
    scanner: Scanner,
    payload: Option<ImagePayload>,
    image_data: Vec<u8>,
    current_image: Option<egui::TextureHandle>,
    scanned_at: Option<chrono::DateTime<chrono::Local>>,
}

pub struct EcoScanApp {
    state: Arc<Mutex<ThreadSafeState>>,
    config: ScanConfig,
    active_tab: AppTab,
    was_style_initialized: bool,
}

impl Default for EcoScanApp {
    fn default() -> Self {
        let state = Arc::new(Mutex::new(ThreadSafeState {
            scanner: Scanner::new(),
            payload: None,
            image_data: Vec::new(),
            current_image: None,
            scanned_at: None,
        }));

        Self {
            state,
            config: ScanConfig::from_env(),
            active_tab: AppTab::Classification,
            was_style_initialized: false,
        }
    }
}

impl eframe::App for EcoScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.was_style_initialized {
            let mut style = (*ctx.style()).clone();
            style.visuals.window_fill = Color32::from_rgb(5, 8, 13);
            style.visuals.panel_fill = PANEL_BG;
            style.visuals.widgets.noninteractive.bg_fill = CARD_BG;
            style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(24, 32, 44);
            style.visuals.widgets.hovered.bg_fill = Color32::from_rgb(32, 42, 56);
            style.visuals.widgets.active.bg_fill = Color32::from_rgb(40, 52, 68);
            style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
            style.visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);
            style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);
            style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.4);
            style.text_styles.insert(
                egui::TextStyle::Body,
                egui::FontId::new(15.0, egui::FontFamily::Proportional),
            );
            style.text_styles.insert(
                egui::TextStyle::Button,
                egui::FontId::new(15.0, egui::FontFamily::Proportional),
            );
            style.text_styles.insert(
                egui::TextStyle::Heading,
                egui::FontId::new(22.0, egui::FontFamily::Proportional),
            );
            ctx.set_style(style);
            self.was_style_initialized = true;
        }

        self.load_pending_texture(ctx);

        let is_analyzing = self.state.lock().unwrap().scanner.is_analyzing();
        if is_analyzing {
            // Worker thread owns no repaint handle; poll until it finishes
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::SidePanel::left("nav")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                self.draw_sidebar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.draw_input_pane(&mut columns[0]);
                self.draw_output_pane(&mut columns[1]);
            });
        });
    }
}

impl EcoScanApp {
    fn draw_sidebar(&mut self, ui: &mut Ui) {
        ui.add_space(14.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("🌿").size(22.0).color(ACCENT));
            ui.heading(RichText::new("EcoScan").size(22.0));
        });
        ui.add_space(6.0);
        ui.separator();
        ui.add_space(10.0);

        for tab in AppTab::ALL {
            let selected = self.active_tab == tab;
            let text = if selected {
                RichText::new(tab.label()).color(ACCENT).strong()
            } else {
                RichText::new(tab.label())
            };
            if ui
                .add_sized(
                    [ui.available_width(), 34.0],
                    egui::SelectableLabel::new(selected, text),
                )
                .clicked()
            {
                self.active_tab = tab;
            }
            ui.add_space(4.0);
        }

        ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
            ui.add_space(12.0);
            if ui
                .add_sized(
                    [ui.available_width(), 36.0],
                    egui::Button::new(RichText::new("⟲ Reset Core").size(14.0)).rounding(8.0),
                )
                .clicked()
            {
                self.reset_scanner();
            }
            if self.config.api_key.is_none() {
                ui.add_space(6.0);
                ui.label(
                    RichText::new("⚠ GEMINI_API_KEY not set")
                        .color(Color32::from_rgb(234, 179, 8))
                        .small(),
                );
            }
        });
    }

    fn draw_input_pane(&mut self, ui: &mut Ui) {
        ui.add_space(4.0);
        ui.heading(RichText::new("Scanner").size(18.0));
        ui.label(
            RichText::new("Align the item in a photo, then run the analysis.")
                .color(Color32::from_rgb(148, 163, 184))
                .small(),
        );
        ui.add_space(8.0);

        let (texture, has_payload, is_analyzing, error, scanned_at) = {
            let state = self.state.lock().unwrap();
            (
                state.current_image.clone(),
                state.payload.is_some(),
                state.scanner.is_analyzing(),
                state.scanner.error().map(|e| e.to_string()),
                state.scanned_at,
            )
        };

        egui::Frame::none()
            .fill(Color32::BLACK)
            .rounding(10.0)
            .stroke(Stroke::new(1.0, Color32::from_rgb(40, 52, 68)))
            .inner_margin(6.0)
            .show(ui, |ui| {
                let available_width = ui.available_width();
                if let Some(texture) = &texture {
                    let aspect_ratio = texture.size_vec2().x / texture.size_vec2().y;
                    let image_height = if aspect_ratio > 0.0 {
                        available_width / aspect_ratio
                    } else {
                        available_width
                    };
                    let image_size = Vec2::new(available_width, image_height.min(360.0));
                    ui.image((texture.id(), image_size));
                } else {
                    ui.allocate_ui(Vec2::new(available_width, 220.0), |ui| {
                        ui.centered_and_justified(|ui| {
                            ui.label(
                                RichText::new("No image loaded")
                                    .color(Color32::from_rgb(70, 82, 96)),
                            );
                        });
                    });
                }
            });

        if let Some(at) = scanned_at {
            ui.label(
                RichText::new(format!("Scanned at {}", at.format("%H:%M:%S")))
                    .color(Color32::from_rgb(100, 116, 139))
                    .small(),
            );
        }
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let button_size = egui::vec2(ui.available_width() * 0.5 - 4.0, 36.0);
            if ui
                .add_sized(
                    button_size,
                    egui::Button::new(RichText::new("📂 Open Image").size(14.0)).rounding(8.0),
                )
                .clicked()
            {
                self.open_image();
            }
            ui.add_space(8.0);
            if is_analyzing {
                ui.spinner();
                ui.label(RichText::new("Analyzing...").color(ACCENT).small());
            } else {
                let analyze = egui::Button::new(
                    RichText::new("⚡ Analyze").size(14.0).color(Color32::WHITE),
                )
                .fill(ACCENT.linear_multiply(0.8))
                .rounding(8.0);
                if ui
                    .add_enabled_ui(has_payload, |ui| ui.add_sized(button_size, analyze))
                    .inner
                    .clicked()
                {
                    self.analyze_image();
                }
            }
        });

        if let Some(error) = error {
            ui.add_space(8.0);
            egui::Frame::none()
                .fill(Color32::from_rgb(60, 20, 24))
                .rounding(8.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(error).color(Color32::from_rgb(252, 165, 165)));
                });
        }
    }

    fn draw_output_pane(&mut self, ui: &mut Ui) {
        let (classification, phase) = {
            let state = self.state.lock().unwrap();
            (state.scanner.classification().cloned(), state.scanner.phase())
        };

        ui.add_space(4.0);

        if phase == Phase::AwaitingResult {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.35);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(RichText::new("Decompiling molecular data...").color(ACCENT));
                    ui.label(
                        RichText::new("Parsing the image for material signatures")
                            .color(Color32::from_rgb(100, 116, 139))
                            .small(),
                    );
                });
            });
            return;
        }

        let Some(classification) = classification else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Select an input source to initiate scan")
                        .color(Color32::from_rgb(70, 82, 96)),
                );
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match self.active_tab {
                AppTab::Classification => self.draw_classification_tab(ui, &classification),
                AppTab::Materials => draw_materials_tab(ui, &classification),
                AppTab::Disposal => draw_disposal_tab(ui, &classification),
                AppTab::EcoTips => draw_list_tab(ui, "Eco Strategy", &classification.eco_tips),
                AppTab::Upcycling => {
                    draw_list_tab(ui, "Upcycling Lab", &classification.upcycling_ideas)
                }
            });
    }

    fn draw_classification_tab(&mut self, ui: &mut Ui, classification: &WasteClassification) {
        card(ui, |ui| {
            ui.label(RichText::new("NEURAL ID SUCCESS").color(ACCENT).small());
            ui.heading(RichText::new(&classification.item_name).size(26.0));
            ui.label(
                RichText::new(format!("{} stream identified", classification.category))
                    .color(Color32::from_rgb(148, 163, 184)),
            );
        });
        ui.add_space(10.0);

        ui.columns(2, |columns| {
            card(&mut columns[0], |ui| {
                ui.label(
                    RichText::new("RECYCLABILITY")
                        .color(Color32::from_rgb(100, 116, 139))
                        .small(),
                );
                let rating = if classification.recyclability.is_empty() {
                    "Not rated"
                } else {
                    classification.recyclability.as_str()
                };
                ui.label(RichText::new(rating).strong());
            });
            card(&mut columns[1], |ui| {
                ui.label(
                    RichText::new("ENV. IMPACT")
                        .color(Color32::from_rgb(100, 116, 139))
                        .small(),
                );
                ui.label(RichText::new(&classification.environmental_impact).strong());
            });
        });
        ui.add_space(10.0);

        card(ui, |ui| {
            ui.label(RichText::new("SORT TARGET MAPPING").color(ACCENT).small());
            ui.add_space(6.0);
            draw_bin_strip(ui, classification.dustbin_color);
            ui.add_space(6.0);
            ui.label(
                RichText::new(format!(
                    "Dispose in the {} bin",
                    classification.dustbin_color.as_str()
                ))
                .strong(),
            );
        });

        #[cfg(feature = "clipboard")]
        {
            ui.add_space(10.0);
            if ui
                .add_sized(
                    [140.0, 32.0],
                    egui::Button::new(RichText::new("📋 Copy Report").size(14.0)).rounding(8.0),
                )
                .clicked()
            {
                self.copy_report(classification);
            }
        }
    }

    fn load_pending_texture(&mut self, ctx: &egui::Context) {
        let image_to_load = {
            let state = self.state.lock().unwrap();
            if state.current_image.is_none() && !state.image_data.is_empty() {
                image::load_from_memory(&state.image_data).ok()
            } else {
                None
            }
        };
        if let Some(decoded) = image_to_load {
            let size = [decoded.width() as usize, decoded.height() as usize];
            let egui_image = egui::ColorImage::from_rgba_unmultiplied(
                size,
                decoded.to_rgba8().as_flat_samples().as_slice(),
            );
            let mut state = self.state.lock().unwrap();
            state.current_image =
                Some(ctx.load_texture("scan_preview", egui_image, egui::TextureOptions::LINEAR));
        }
    }

    fn open_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp"])
            .pick_file()
        else {
            return;
        };

        let state_clone = Arc::clone(&self.state);
        thread::spawn(move || {
            {
                let mut state = state_clone.lock().unwrap();
                if !state.scanner.begin_capture() {
                    return;
                }
            }

            let loaded = load_image(&path).and_then(|payload| {
                let bytes = std::fs::read(&path)?;
                Ok((payload, bytes))
            });

            let mut state = state_clone.lock().unwrap();
            match loaded {
                Ok((payload, bytes)) => {
                    state.payload = Some(payload);
                    state.image_data = bytes;
                    state.current_image = None;
                    info!("Image loaded for scanning: {}", path.display());
                }
                Err(e) => {
                    error!("Failed to load image: {}", e);
                    state
                        .scanner
                        .note_capture_error(format!("Could not read image: {}", e));
                }
            }
        });
    }

    fn analyze_image(&mut self) {
        let (payload, generation) = {
            let mut state = self.state.lock().unwrap();
            let Some(payload) = state.payload.clone() else {
                state
                    .scanner
                    .note_capture_error("Load an image first.".to_string());
                return;
            };
            let Some(generation) = state.scanner.begin_analysis() else {
                return;
            };
            (payload, generation)
        };

        let config = self.config.clone();
        let state_clone = Arc::clone(&self.state);
        info!("Starting AI analysis for image.");
        thread::spawn(move || {
            let result =
                GeminiClassifier::new(config).and_then(|classifier| classifier.classify(&payload));

            let mut state = state_clone.lock().unwrap();
            if state.scanner.apply_result(generation, result) {
                state.scanned_at = Some(chrono::Local::now());
            }
        });
    }

    fn reset_scanner(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.scanner.reset();
        state.payload = None;
        state.image_data.clear();
        state.current_image = None;
        state.scanned_at = None;
        self.active_tab = AppTab::Classification;
    }

    #[cfg(feature = "clipboard")]
    fn copy_report(&self, classification: &WasteClassification) {
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(report::render_text(classification)) {
                    error!("Failed to copy report to clipboard: {}", e);
                } else {
                    info!("Report copied to clipboard");
                }
            }
            Err(e) => {
                error!("Failed to access clipboard: {}", e);
            }
        }
    }
}

fn card(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::none()
        .fill(CARD_BG)
        .rounding(10.0)
        .stroke(Stroke::new(1.0, Color32::from_rgb(34, 44, 58)))
        .inner_margin(14.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
}

fn draw_bin_strip(ui: &mut Ui, assigned: DustbinColor) {
    ui.horizontal(|ui| {
        let slot_width = (ui.available_width() - 4.0 * 8.0) / 5.0;
        for color in DustbinColor::ALL {
            let (r, g, b) = report::bin_rgb(color);
            let fill = Color32::from_rgb(r, g, b);
            let is_assigned = color == assigned;
            let (fill, height) = if is_assigned {
                (fill, 26.0)
            } else {
                (fill.linear_multiply(0.12), 14.0)
            };
            let (rect, _) =
                ui.allocate_exact_size(Vec2::new(slot_width, 26.0), egui::Sense::hover());
            let bar = egui::Rect::from_center_size(rect.center(), Vec2::new(slot_width, height));
            ui.painter().rect_filled(bar, egui::Rounding::same(4.0), fill);
            if is_assigned {
                ui.painter().rect_stroke(
                    bar,
                    egui::Rounding::same(4.0),
                    Stroke::new(1.5, Color32::WHITE),
                );
            }
        }
    });
}

fn draw_materials_tab(ui: &mut Ui, classification: &WasteClassification) {
    if !classification.material_composition.is_empty() {
        card(ui, |ui| {
            ui.label(RichText::new("🔬").size(18.0));
            ui.label(&classification.material_composition);
        });
        ui.add_space(10.0);
    }
    for (i, material) in classification.detailed_materials.iter().enumerate() {
        card(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(material).strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(
                        RichText::new("DETECTION STRENGTH")
                            .color(Color32::from_rgb(100, 116, 139))
                            .small(),
                    );
                });
            });
            let strength = (1.0 - i as f32 * 0.12).max(0.1);
            ui.add(egui::ProgressBar::new(strength).desired_width(ui.available_width()));
        });
        ui.add_space(8.0);
    }
}

fn draw_disposal_tab(ui: &mut Ui, classification: &WasteClassification) {
    for (i, step) in classification.disposal_instructions.iter().enumerate() {
        card(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{:02}", i + 1))
                        .size(24.0)
                        .color(ACCENT.linear_multiply(0.5))
                        .italics(),
                );
                ui.add_space(10.0);
                ui.label(RichText::new(step).strong());
            });
        });
        ui.add_space(8.0);
    }
}

fn draw_list_tab(ui: &mut Ui, title: &str, entries: &[String]) {
    if entries.is_empty() {
        ui.label(
            RichText::new(format!("No {} entries for this item", title.to_lowercase()))
                .color(Color32::from_rgb(100, 116, 139)),
        );
        return;
    }
    for entry in entries {
        card(ui, |ui| {
            ui.label(RichText::new(entry).strong());
        });
        ui.add_space(8.0);
    }
}

pub fn run_gui() -> Result<()> {
    info!("EcoScan GUI starting up...");

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(WINDOW_WIDTH, WINDOW_HEIGHT)),
        min_window_size: Some(egui::vec2(760.0, 520.0)),
        ..eframe::NativeOptions::default()
    };

    eframe::run_native(
        "EcoScan",
        native_options,
        Box::new(|_cc| Box::new(EcoScanApp::default())),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start GUI: {}", e))?;

    Ok(())
}
