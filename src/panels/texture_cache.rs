use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rustc_hash::FxHashMap;

/// Text drawing parameters for the label glyph pass.
///
/// Glyphs are rasterized by the host (it owns the fonts); the cache only
/// bakes the badge background.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_family: String,
    pub bold: bool,
    pub font_size_px: f32,
    pub color: [u8; 4],
    /// Text anchor in texture pixels.
    pub anchor: [f32; 2],
}

/// A label badge: RGBA background plus the text to draw over it.
#[derive(Debug, Clone)]
pub struct LabelTexture {
    pub text: String,
    pub image: RgbaImage,
    pub style: LabelStyle,
}

impl LabelTexture {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Read-through cache of label textures keyed by label text. Entries are
/// never evicted.
#[derive(Debug)]
pub struct LabelTextureCache {
    width: u32,
    height: u32,
    corner_radius: f32,
    background: [u8; 4],
    textures: FxHashMap<String, Arc<LabelTexture>>,
}

impl Default for LabelTextureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTextureCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 256,
            height: 128,
            corner_radius: 20.0,
            background: [38, 111, 255, 255],
            textures: FxHashMap::default(),
        }
    }

    /// Returns the texture for `text`, rendering it on first use.
    pub fn get_or_create(&mut self, text: &str) -> Arc<LabelTexture> {
        if let Some(texture) = self.textures.get(text) {
            return texture.clone();
        }
        let texture = Arc::new(self.render(text));
        self.textures.insert(text.to_string(), texture.clone());
        texture
    }

    #[must_use]
    pub fn get(&self, text: &str) -> Option<&Arc<LabelTexture>> {
        self.textures.get(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn render(&self, text: &str) -> LabelTexture {
        log::debug!("Rendering label texture for '{text}'");
        let (w, h) = (self.width as f32, self.height as f32);
        let r = self.corner_radius;
        let [red, green, blue, alpha] = self.background;

        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            // sample at pixel centres
            let coverage = rounded_rect_coverage(x as f32 + 0.5, y as f32 + 0.5, w, h, r);
            Rgba([red, green, blue, (f32::from(alpha) * coverage).round() as u8])
        });

        LabelTexture {
            text: text.to_string(),
            image,
            style: LabelStyle {
                font_family: "Arial".to_string(),
                bold: true,
                font_size_px: 42.0,
                color: [255, 255, 255, 255],
                anchor: [w / 2.0, h / 2.0],
            },
        }
    }
}

/// Fraction of the pixel at `(px, py)` covered by a `w`×`h` rectangle with
/// corners rounded to radius `r`, using a one-pixel linear falloff.
fn rounded_rect_coverage(px: f32, py: f32, w: f32, h: f32, r: f32) -> f32 {
    let cx = px.clamp(r, w - r);
    let cy = py.clamp(r, h - r);
    let dx = px - cx;
    let dy = py - cy;
    let distance = (dx * dx + dy * dy).sqrt();
    (r - distance + 0.5).clamp(0.0, 1.0)
}
