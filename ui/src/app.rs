use crate::config::DemoConfig;
use crate::export;
use crate::widgets::QrCodeView;
use egui::Color32;
use qrview_render::config::{MAX_ICON_SCALE, MIN_ICON_SCALE};
use qrview_render::{EccLevel, EncodeError, ImageData, Stretch, StretchDirection};
use std::path::PathBuf;
use std::sync::Arc;

/// Edge length of the built-in icon used when no icon file is configured.
const BADGE_SIZE: u32 = 64;

/// Demo window: controls on the left, the QR code view in the middle.
pub struct QrViewApp {
    view: QrCodeView,
    // Widget-bound copies of the view's settings.
    data: String,
    color: Color32,
    space_color: Color32,
    show_icon: bool,
    icon: Arc<ImageData>,
    icon_scale: i32,
    quiet_zone: i32,
    ecc_level: EccLevel,
    stretch: Stretch,
    direction: StretchDirection,
    export_path: PathBuf,
    status: Option<String>,
}

impl QrViewApp {
    /// Called once before the first frame.
    pub fn new(config: DemoConfig) -> Self {
        let render_config = config.render_config();
        let show_icon = render_config.icon.is_some();
        let icon = render_config.icon.clone().unwrap_or_else(|| Arc::new(badge_icon()));
        let view = QrCodeView::with_config(render_config);

        Self {
            data: view.data(),
            color: view.color(),
            space_color: view.space_color(),
            show_icon,
            icon,
            icon_scale: i32::from(view.icon_scale()),
            quiet_zone: i32::try_from(view.quiet_zone_size()).unwrap_or(i32::MAX),
            ecc_level: view.ecc_level(),
            stretch: view.stretch(),
            direction: view.stretch_direction(),
            export_path: config.export_path,
            status: None,
            view,
        }
    }

    /// The view shown in the central panel.
    pub fn view(&self) -> &QrCodeView {
        &self.view
    }

    /// Last export message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Draws one frame.
    pub fn show(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = self.view.last_error() {
                ui.colored_label(ui.visuals().error_fg_color, format!("Encoding failed: {err}"));
            }
            ui.add(&self.view);
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("QR code");

        ui.label("Text");
        if ui.text_edit_multiline(&mut self.data).changed() {
            let data = self.data.clone();
            self.apply(|view| view.set_data(data));
        }

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Foreground");
            if ui.color_edit_button_srgba(&mut self.color).changed() {
                let color = self.color;
                self.apply(|view| view.set_color(color));
            }
        });
        ui.horizontal(|ui| {
            ui.label("Background");
            if ui.color_edit_button_srgba(&mut self.space_color).changed() {
                let color = self.space_color;
                self.apply(|view| view.set_space_color(color));
            }
        });

        if ui.checkbox(&mut self.show_icon, "Icon").changed() {
            let icon = self.show_icon.then(|| Arc::clone(&self.icon));
            self.apply(|view| view.set_icon(icon));
        }

        let scale_range = i32::from(MIN_ICON_SCALE)..=i32::from(MAX_ICON_SCALE);
        let scale_slider = egui::Slider::new(&mut self.icon_scale, scale_range)
            .text("Icon scale")
            .suffix("%");
        if ui.add_enabled(self.show_icon, scale_slider).changed() {
            let scale = self.icon_scale;
            self.apply(|view| view.set_icon_scale(scale));
        }

        if ui
            .add(egui::Slider::new(&mut self.quiet_zone, 0..=16).text("Quiet zone"))
            .changed()
        {
            let size = self.quiet_zone;
            self.apply(|view| view.set_quiet_zone_size(size));
        }

        let previous_level = self.ecc_level;
        egui::ComboBox::from_label("Error correction")
            .selected_text(self.ecc_level.to_string())
            .show_ui(ui, |ui| {
                for level in EccLevel::ALL {
                    ui.selectable_value(&mut self.ecc_level, level, level.to_string());
                }
            });
        if self.ecc_level != previous_level {
            let level = self.ecc_level;
            self.apply(|view| view.set_ecc_level(level));
        }

        ui.separator();

        egui::ComboBox::from_label("Stretch")
            .selected_text(format!("{:?}", self.stretch))
            .show_ui(ui, |ui| {
                for mode in Stretch::ALL {
                    ui.selectable_value(&mut self.stretch, mode, format!("{mode:?}"));
                }
            });
        egui::ComboBox::from_label("Direction")
            .selected_text(format!("{:?}", self.direction))
            .show_ui(ui, |ui| {
                for direction in [
                    StretchDirection::UpOnly,
                    StretchDirection::DownOnly,
                    StretchDirection::Both,
                ] {
                    ui.selectable_value(&mut self.direction, direction, format!("{direction:?}"));
                }
            });
        if self.view.stretch() != self.stretch {
            self.view.set_stretch(self.stretch);
        }
        if self.view.stretch_direction() != self.direction {
            self.view.set_stretch_direction(self.direction);
        }

        ui.separator();

        if ui
            .add_enabled(self.view.snapshot().is_some(), egui::Button::new("Export"))
            .clicked()
        {
            self.export();
        }
        if let Some(status) = &self.status {
            ui.label(status);
        }
    }

    /// Runs a view setter. The outcome is shown from `last_error` on the next frame.
    fn apply(&self, update: impl FnOnce(&QrCodeView) -> Result<(), EncodeError>) {
        if let Err(err) = update(&self.view) {
            log::debug!("Setter left the view empty: {err}");
        }
    }

    fn export(&mut self) {
        let status = match export::export_png(&self.view, &self.export_path) {
            Ok(path) => {
                if let Err(err) = export::reveal_in_file_manager(&path) {
                    log::warn!("{err}");
                }
                format!("Saved to {}", path.display())
            }
            Err(err) => {
                log::warn!("Export failed: {err}");
                format!("Export failed: {err}")
            }
        };
        self.status = Some(status);
    }
}

impl eframe::App for QrViewApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

/// A round badge drawn in code so the icon toggle works without any assets.
fn badge_icon() -> ImageData {
    let radius = BADGE_SIZE as f32 / 2.0;
    let fill = Color32::from_rgb(0x2b, 0x6c, 0xb0);

    let mut bytes = Vec::with_capacity((BADGE_SIZE * BADGE_SIZE * 4) as usize);
    for y in 0..BADGE_SIZE {
        for x in 0..BADGE_SIZE {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let distance = (dx * dx + dy * dy).sqrt();
            let pixel = if distance <= radius * 0.7 {
                fill
            } else if distance <= radius {
                Color32::WHITE
            } else {
                Color32::TRANSPARENT
            };
            bytes.extend_from_slice(&pixel.to_srgba_unmultiplied());
        }
    }

    ImageData::new(BADGE_SIZE as usize, BADGE_SIZE as usize, bytes)
}
