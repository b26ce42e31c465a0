//! QR code view widget.
//!
//! `QrCodeView` keeps a render configuration and a cached raster. Every
//! configuration setter regenerates the raster right away; the stretch
//! setters only affect how the cached raster is fitted on the next paint.
//!
//! # Threading
//!
//! The view is a cheap handle (`Clone` shares the same state), so setters can
//! be called from any thread while the UI thread paints. Four locks are used:
//!
//! - `regeneration`: serializes regenerations and owns the generation counter
//! - `settings`: the configuration and stretch policy
//! - `raster`: the slot holding the current image, held only to swap or draw
//! - `texture`: the uploaded texture for the current image
//!
//! Lock order is `regeneration` → `settings` and `raster` → `texture`.
//! Regeneration from another thread repaints the context that painted the
//! view most recently.
//!
//! # Usage
//!
//! ```no_run
//! # fn show(ui: &mut egui::Ui) {
//! use qrview_ui::widgets::QrCodeView;
//!
//! let view = QrCodeView::new();
//! view.set_data("https://github.com/emilk/egui").ok();
//! ui.add(&view);
//! # }
//! ```

use egui::{
    Color32, Context, Rect, Response, Sense, TextureFilter, TextureHandle, TextureId,
    TextureOptions, Ui, Vec2, pos2,
};
use parking_lot::Mutex;
use qrview_render::config::{clamp_icon_scale, clamp_quiet_zone};
use qrview_render::{
    EccLevel, EncodeError, Encoder, FitLayout, ImageData, QrEncoder, RasterImage, Rasterizer,
    RenderConfig, Stretch, StretchDirection, StretchPolicy, layout,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for texture names.
static VIEW_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const TEXTURE_OPTIONS: TextureOptions = TextureOptions {
    magnification: TextureFilter::Nearest,
    ..TextureOptions::LINEAR
};

struct Settings {
    config: RenderConfig,
    stretch: StretchPolicy,
}

struct RasterSlot {
    image: Arc<RasterImage>,
    generation: u64,
}

struct CachedTexture {
    generation: u64,
    handle: TextureHandle,
}

struct Shared {
    id: u64,
    rasterizer: Rasterizer,
    encoder: Box<dyn Encoder>,
    settings: Mutex<Settings>,
    regeneration: Mutex<u64>,
    raster: Mutex<Option<RasterSlot>>,
    texture: Mutex<Option<CachedTexture>>,
    last_error: Mutex<Option<EncodeError>>,
    repaint: Mutex<Option<Context>>,
}

/// A QR code that fits itself into whatever rectangle it is given.
#[derive(Clone)]
pub struct QrCodeView {
    shared: Arc<Shared>,
}

impl Default for QrCodeView {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QrCodeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.shared.settings.lock();
        f.debug_struct("QrCodeView")
            .field("id", &self.shared.id)
            .field("config", &settings.config)
            .field("stretch", &settings.stretch)
            .finish_non_exhaustive()
    }
}

impl QrCodeView {
    /// Creates an empty view with the default configuration.
    pub fn new() -> Self {
        Self::build(RenderConfig::default(), Box::new(QrEncoder), Rasterizer::default())
    }

    /// Creates a view and renders `config` immediately.
    ///
    /// An encoding failure leaves the view blank; see [`Self::last_error`].
    pub fn with_config(config: RenderConfig) -> Self {
        Self::with_encoder(config, QrEncoder)
    }

    /// Like [`Self::with_config`] but with a custom encoder.
    pub fn with_encoder(config: RenderConfig, encoder: impl Encoder + 'static) -> Self {
        Self::build(config, Box::new(encoder), Rasterizer::default())
    }

    /// Like [`Self::with_encoder`] with a non-default raster size.
    pub fn with_rasterizer(
        config: RenderConfig,
        encoder: impl Encoder + 'static,
        rasterizer: Rasterizer,
    ) -> Self {
        Self::build(config, Box::new(encoder), rasterizer)
    }

    fn build(config: RenderConfig, encoder: Box<dyn Encoder>, rasterizer: Rasterizer) -> Self {
        let render_now = config.has_data();
        let view = Self {
            shared: Arc::new(Shared {
                id: VIEW_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
                rasterizer,
                encoder,
                settings: Mutex::new(Settings {
                    config,
                    stretch: StretchPolicy::default(),
                }),
                regeneration: Mutex::new(0),
                raster: Mutex::new(None),
                texture: Mutex::new(None),
                last_error: Mutex::new(None),
                repaint: Mutex::new(None),
            }),
        };

        if render_now {
            // Failure is recorded in `last_error`.
            view.regenerate().ok();
        }

        view
    }

    // ---- configuration setters -------------------------------------------

    /// Sets the text to encode. Empty or whitespace clears the view.
    pub fn set_data(&self, data: impl Into<String>) -> Result<(), EncodeError> {
        let data = data.into();
        self.update_config(|config| config.data = data)
    }

    /// Sets the color of the dark modules.
    pub fn set_color(&self, color: Color32) -> Result<(), EncodeError> {
        self.update_config(|config| config.color = color)
    }

    /// Sets the color of the light modules.
    pub fn set_space_color(&self, color: Color32) -> Result<(), EncodeError> {
        self.update_config(|config| config.space_color = color)
    }

    /// Sets or clears the icon drawn in the middle of the code.
    pub fn set_icon(&self, icon: Option<Arc<ImageData>>) -> Result<(), EncodeError> {
        self.update_config(|config| config.icon = icon)
    }

    /// Decodes an encoded image and uses it as the icon.
    ///
    /// An undecodable image is logged and treated as no icon.
    pub fn set_icon_bytes(&self, bytes: &[u8]) -> Result<(), EncodeError> {
        let icon = match ImageData::from_encoded(bytes) {
            Ok(icon) => Some(Arc::new(icon)),
            Err(err) => {
                log::warn!("Ignoring icon: {err}");
                None
            }
        };
        self.set_icon(icon)
    }

    /// Sets how much of the code the icon covers, in percent, clamped to `1..=99`.
    pub fn set_icon_scale(&self, scale: i32) -> Result<(), EncodeError> {
        let scale = clamp_icon_scale(scale);
        self.update_config(|config| config.icon_scale = scale)
    }

    /// Sets the quiet zone in modules; negative values become 0.
    pub fn set_quiet_zone_size(&self, size: i32) -> Result<(), EncodeError> {
        let size = clamp_quiet_zone(size);
        self.update_config(|config| config.quiet_zone_size = size)
    }

    pub fn set_ecc_level(&self, level: EccLevel) -> Result<(), EncodeError> {
        self.update_config(|config| config.ecc_level = level)
    }

    // ---- layout setters ----------------------------------------------------

    pub fn set_stretch(&self, stretch: Stretch) {
        self.shared.settings.lock().stretch.mode = stretch;
        self.request_repaint();
    }

    pub fn set_stretch_direction(&self, direction: StretchDirection) {
        self.shared.settings.lock().stretch.direction = direction;
        self.request_repaint();
    }

    pub fn set_stretch_policy(&self, policy: StretchPolicy) {
        self.shared.settings.lock().stretch = policy;
        self.request_repaint();
    }

    // ---- getters -----------------------------------------------------------

    /// Snapshot of the whole configuration.
    pub fn config(&self) -> RenderConfig {
        self.shared.settings.lock().config.clone()
    }

    pub fn data(&self) -> String {
        self.shared.settings.lock().config.data.clone()
    }

    pub fn has_data(&self) -> bool {
        self.shared.settings.lock().config.has_data()
    }

    pub fn color(&self) -> Color32 {
        self.shared.settings.lock().config.color
    }

    pub fn space_color(&self) -> Color32 {
        self.shared.settings.lock().config.space_color
    }

    pub fn icon(&self) -> Option<Arc<ImageData>> {
        self.shared.settings.lock().config.icon.clone()
    }

    pub fn icon_scale(&self) -> u8 {
        self.shared.settings.lock().config.icon_scale
    }

    pub fn quiet_zone_size(&self) -> u32 {
        self.shared.settings.lock().config.quiet_zone_size
    }

    pub fn ecc_level(&self) -> EccLevel {
        self.shared.settings.lock().config.ecc_level
    }

    pub fn stretch(&self) -> Stretch {
        self.shared.settings.lock().stretch.mode
    }

    pub fn stretch_direction(&self) -> StretchDirection {
        self.shared.settings.lock().stretch.direction
    }

    pub fn stretch_policy(&self) -> StretchPolicy {
        self.shared.settings.lock().stretch
    }

    /// Error from the most recent regeneration, if it failed.
    pub fn last_error(&self) -> Option<EncodeError> {
        self.shared.last_error.lock().clone()
    }

    /// Logical size of the raster, independent of the on-screen size.
    pub fn source_size(&self) -> Vec2 {
        self.shared.rasterizer.source_size()
    }

    /// The current raster, if any.
    pub fn snapshot(&self) -> Option<Arc<RasterImage>> {
        self.shared
            .raster
            .lock()
            .as_ref()
            .map(|slot| Arc::clone(&slot.image))
    }

    /// Number of regenerations that produced the current raster.
    pub fn raster_generation(&self) -> Option<u64> {
        self.shared.raster.lock().as_ref().map(|slot| slot.generation)
    }

    // ---- measure / arrange -------------------------------------------------

    /// Desired size within `constraint`; zero when there is nothing to show.
    ///
    /// An infinite constraint axis is treated as unconstrained.
    pub fn measure(&self, constraint: Vec2) -> Vec2 {
        let settings = self.shared.settings.lock();
        if !settings.config.has_data() {
            return Vec2::ZERO;
        }
        settings.stretch.size(constraint, self.source_size())
    }

    /// Size occupied once given `final_size`; zero when there is nothing to show.
    ///
    /// Never larger than `final_size` on a finite axis. Modes that overflow
    /// (`None`, `UniformToFill`) are cropped when painted.
    pub fn arrange(&self, final_size: Vec2) -> Vec2 {
        let desired = self.measure(final_size);
        let clamp = |desired: f32, available: f32| {
            if available.is_finite() {
                desired.min(available.max(0.0))
            } else {
                desired
            }
        };
        Vec2::new(clamp(desired.x, final_size.x), clamp(desired.y, final_size.y))
    }

    /// Layout the next paint into `viewport` would use.
    pub fn fit(&self, viewport: Rect) -> Option<FitLayout> {
        layout::layout(self.source_size(), viewport, self.stretch_policy())
    }

    // ---- regeneration ------------------------------------------------------

    fn update_config(&self, update: impl FnOnce(&mut RenderConfig)) -> Result<(), EncodeError> {
        update(&mut self.shared.settings.lock().config);
        self.regenerate()
    }

    /// Re-renders the raster from the current configuration.
    ///
    /// On failure the view is cleared rather than left showing a code that no
    /// longer matches its configuration.
    pub fn regenerate(&self) -> Result<(), EncodeError> {
        let mut generation = self.shared.regeneration.lock();
        let config = self.shared.settings.lock().config.clone();

        let result = self
            .shared
            .rasterizer
            .regenerate(self.shared.encoder.as_ref(), &config);

        *generation += 1;
        let (next, outcome) = match result {
            Ok(Some(image)) => {
                log::debug!(
                    "QR view {} regenerated (generation {})",
                    self.shared.id,
                    *generation
                );
                let slot = RasterSlot {
                    image: Arc::new(image),
                    generation: *generation,
                };
                (Some(slot), Ok(()))
            }
            Ok(None) => (None, Ok(())),
            Err(err) => {
                log::warn!("QR view {} cleared: {err}", self.shared.id);
                (None, Err(err))
            }
        };

        let previous = std::mem::replace(&mut *self.shared.raster.lock(), next);
        *self.shared.last_error.lock() = outcome.as_ref().err().cloned();
        drop(generation);
        drop(previous);

        self.request_repaint();
        outcome
    }

    fn request_repaint(&self) {
        if let Some(ctx) = self.shared.repaint.lock().as_ref() {
            ctx.request_repaint();
        }
    }

    // ---- painting ----------------------------------------------------------

    /// Draws the cached raster fitted into `viewport`.
    pub fn paint(&self, ui: &Ui, viewport: Rect) {
        *self.shared.repaint.lock() = Some(ui.ctx().clone());

        let Some(fit) = self.fit(viewport) else {
            return;
        };

        let raster = self.shared.raster.lock();
        let Some(slot) = raster.as_ref() else {
            self.shared.texture.lock().take();
            return;
        };

        let texture_id = self.texture_for(ui.ctx(), slot);
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        ui.painter().with_clip_rect(fit.dest_rect).image(
            texture_id,
            fit.image_rect(slot.image.size()),
            uv,
            Color32::WHITE,
        );
    }

    fn texture_for(&self, ctx: &Context, slot: &RasterSlot) -> TextureId {
        let mut cache = self.shared.texture.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.generation == slot.generation {
                return cached.handle.id();
            }
        }

        log::debug!(
            "Uploading QR texture for view {} (generation {})",
            self.shared.id,
            slot.generation
        );
        let handle = ctx.load_texture(
            format!("qr_code_{}", self.shared.id),
            slot.image.to_color_image(),
            TEXTURE_OPTIONS,
        );
        let id = handle.id();
        *cache = Some(CachedTexture {
            generation: slot.generation,
            handle,
        });
        id
    }
}

impl egui::Widget for &QrCodeView {
    fn ui(self, ui: &mut Ui) -> Response {
        let desired = self.arrange(ui.available_size());
        let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect);
        }

        response
    }
}
