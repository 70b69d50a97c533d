//! Drawing surfaces.
//!
//! [`Surface`] is the narrow stateful 2D API the render pipeline draws
//! through. This module is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]; it also provides
//! [`RecordingSurface`], which keeps every draw call as data so tests and the
//! CLI can inspect a frame without a browser.
//!
//! All text is drawn centered, horizontally and vertically, on the given point.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::HashMap;

use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::error::CanvasError;
use crate::geom::{Point, Size};
use crate::render::IconSource;

/// Per-character width used when real text metrics are unavailable.
pub const ESTIMATED_CHAR_WIDTH: f64 = 6.0;

/// Stateful 2D drawing target, modeled on the Canvas2D API.
pub trait Surface {
    /// Image handle accepted by [`Surface::draw_image`].
    type Image;

    /// Reset the transform to a uniform `scale` (the device pixel ratio).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] if the backend rejects the transform.
    fn reset_transform(&mut self, scale: f64) -> Result<(), CanvasError>;
    /// Erase the whole surface.
    fn clear(&mut self, size: Size);
    /// Push the current style state.
    fn save(&mut self);
    /// Pop the style state pushed by the matching [`Surface::save`].
    fn restore(&mut self);
    fn set_stroke(&mut self, color: &str, width: f64);
    fn set_fill(&mut self, color: &str);
    fn set_alpha(&mut self, alpha: f64);
    /// Halo around subsequent fills. A blur of `0.0` turns it off.
    fn set_glow(&mut self, color: &str, blur: f64);
    /// Dash pattern for subsequent strokes. Empty means solid.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] if the backend rejects the pattern.
    fn set_dash(&mut self, segments: &[f64]) -> Result<(), CanvasError>;
    fn set_font(&mut self, font: &str);
    fn line(&mut self, from: Point, to: Point);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] on a negative radius.
    fn fill_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError>;
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] on a negative radius.
    fn stroke_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError>;
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] if the backend fails to draw text.
    fn fill_text(&mut self, text: &str, center: Point) -> Result<(), CanvasError>;
    /// Width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] if the backend rejects the image.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, w: f64, h: f64) -> Result<(), CanvasError>;
}

#[allow(clippy::cast_precision_loss)]
fn estimate_text_width(text: &str) -> f64 {
    text.chars().count() as f64 * ESTIMATED_CHAR_WIDTH
}

// =============================================================
// Canvas2D
// =============================================================

fn js_err(err: JsValue) -> CanvasError {
    CanvasError::Surface(format!("{err:?}"))
}

impl Surface for CanvasRenderingContext2d {
    type Image = HtmlImageElement;

    fn reset_transform(&mut self, scale: f64) -> Result<(), CanvasError> {
        self.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0).map_err(js_err)
    }

    fn clear(&mut self, size: Size) {
        self.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.set_stroke_style_str(color);
        self.set_line_width(width);
    }

    fn set_fill(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.set_global_alpha(alpha);
    }

    fn set_glow(&mut self, color: &str, blur: f64) {
        self.set_shadow_color(color);
        self.set_shadow_blur(blur);
    }

    fn set_dash(&mut self, segments: &[f64]) -> Result<(), CanvasError> {
        let dash_array = js_sys::Array::new();
        for seg in segments {
            dash_array.push(&JsValue::from_f64(*seg));
        }
        self.set_line_dash(&dash_array).map_err(js_err)
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn line(&mut self, from: Point, to: Point) {
        self.begin_path();
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }

    fn fill_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError> {
        self.begin_path();
        self.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
            .map_err(js_err)?;
        self.fill();
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError> {
        self.begin_path();
        self.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
            .map_err(js_err)?;
        self.stroke();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, center: Point) -> Result<(), CanvasError> {
        self.set_text_align("center");
        self.set_text_baseline("middle");
        CanvasRenderingContext2d::fill_text(self, text, center.x, center.y).map_err(js_err)
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        match CanvasRenderingContext2d::measure_text(self, text) {
            Ok(metrics) => metrics.width(),
            Err(_) => estimate_text_width(text),
        }
    }

    fn draw_image(&mut self, image: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) -> Result<(), CanvasError> {
        self.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h)
            .map_err(js_err)
    }
}

/// Browser icon images keyed by asset reference.
///
/// An image counts as ready once the browser reports it complete with a
/// non-zero natural width; until then, and after a failed load, the renderer
/// draws the fallback glyph.
#[derive(Debug, Clone, Default)]
pub struct WebIcons {
    images: HashMap<String, HtmlImageElement>,
}

impl WebIcons {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image element the host created.
    pub fn insert(&mut self, reference: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(reference.into(), image);
    }

    /// Start loading `url` for `reference`. The image becomes ready
    /// asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Surface`] if the image element cannot be created.
    pub fn load(&mut self, reference: impl Into<String>, url: &str) -> Result<(), CanvasError> {
        let image = HtmlImageElement::new().map_err(js_err)?;
        image.set_src(url);
        self.insert(reference, image);
        Ok(())
    }
}

impl IconSource<HtmlImageElement> for WebIcons {
    fn ready_icon(&self, reference: &str) -> Option<&HtmlImageElement> {
        self.images
            .get(reference)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }
}

// =============================================================
// Recording
// =============================================================

/// One recorded draw call, with the style that was active when it was issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    Clear { width: f64, height: f64 },
    Line { from: Point, to: Point, color: String, width: f64, dashed: bool },
    FillRect { x: f64, y: f64, w: f64, h: f64, color: String, alpha: f64 },
    StrokeRect { x: f64, y: f64, w: f64, h: f64, color: String, width: f64 },
    FillCircle { center: Point, radius: f64, color: String, glow: Option<String> },
    StrokeCircle { center: Point, radius: f64, color: String, width: f64 },
    Text { text: String, at: Point, color: String, font: String },
    Image { reference: String, x: f64, y: f64, w: f64, h: f64 },
}

#[derive(Debug, Clone)]
struct RecordedStyle {
    stroke: String,
    line_width: f64,
    fill: String,
    alpha: f64,
    glow: Option<String>,
    dashed: bool,
    font: String,
}

impl Default for RecordedStyle {
    fn default() -> Self {
        Self {
            stroke: "#000000".into(),
            line_width: 1.0,
            fill: "#000000".into(),
            alpha: 1.0,
            glow: None,
            dashed: false,
            font: "10px sans-serif".into(),
        }
    }
}

/// A surface that records draw calls instead of producing pixels.
///
/// Images are identified by their asset reference string. Text width is
/// estimated at [`ESTIMATED_CHAR_WIDTH`] per character.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    style: RecordedStyle,
    stack: Vec<RecordedStyle>,
    scale: f64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self { calls: Vec::new(), style: RecordedStyle::default(), stack: Vec::new(), scale: 1.0 }
    }
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale set by the last [`Surface::reset_transform`].
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Every call recorded so far, in issue order.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drop recorded calls, keeping the current style.
    pub fn reset(&mut self) {
        self.calls.clear();
    }

    /// Recorded lines as `(from, to, dashed)`.
    #[must_use]
    pub fn lines(&self) -> Vec<(Point, Point, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Line { from, to, dashed, .. } => Some((*from, *to, *dashed)),
                _ => None,
            })
            .collect()
    }

    /// Recorded text as `(text, center)`.
    #[must_use]
    pub fn texts(&self) -> Vec<(&str, Point)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, at, .. } => Some((text.as_str(), *at)),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, call: DrawCall) {
        self.calls.push(call);
    }
}

impl Surface for RecordingSurface {
    type Image = String;

    fn reset_transform(&mut self, scale: f64) -> Result<(), CanvasError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CanvasError::Surface(format!("invalid scale {scale}")));
        }
        self.scale = scale;
        Ok(())
    }

    fn clear(&mut self, size: Size) {
        self.push(DrawCall::Clear { width: size.width, height: size.height });
    }

    fn save(&mut self) {
        self.stack.push(self.style.clone());
    }

    fn restore(&mut self) {
        if let Some(style) = self.stack.pop() {
            self.style = style;
        }
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        color.clone_into(&mut self.style.stroke);
        self.style.line_width = width;
    }

    fn set_fill(&mut self, color: &str) {
        color.clone_into(&mut self.style.fill);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.style.alpha = alpha;
    }

    fn set_glow(&mut self, color: &str, blur: f64) {
        self.style.glow = (blur > 0.0).then(|| color.to_owned());
    }

    fn set_dash(&mut self, segments: &[f64]) -> Result<(), CanvasError> {
        if segments.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(CanvasError::Surface(format!("invalid dash pattern {segments:?}")));
        }
        self.style.dashed = !segments.is_empty();
        Ok(())
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.style.font);
    }

    fn line(&mut self, from: Point, to: Point) {
        self.push(DrawCall::Line {
            from,
            to,
            color: self.style.stroke.clone(),
            width: self.style.line_width,
            dashed: self.style.dashed,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCall::FillRect { x, y, w, h, color: self.style.fill.clone(), alpha: self.style.alpha });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCall::StrokeRect { x, y, w, h, color: self.style.stroke.clone(), width: self.style.line_width });
    }

    fn fill_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError> {
        if radius < 0.0 {
            return Err(CanvasError::Surface(format!("negative radius {radius}")));
        }
        self.push(DrawCall::FillCircle {
            center,
            radius,
            color: self.style.fill.clone(),
            glow: self.style.glow.clone(),
        });
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) -> Result<(), CanvasError> {
        if radius < 0.0 {
            return Err(CanvasError::Surface(format!("negative radius {radius}")));
        }
        self.push(DrawCall::StrokeCircle {
            center,
            radius,
            color: self.style.stroke.clone(),
            width: self.style.line_width,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, center: Point) -> Result<(), CanvasError> {
        self.push(DrawCall::Text {
            text: text.to_owned(),
            at: center,
            color: self.style.fill.clone(),
            font: self.style.font.clone(),
        });
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        estimate_text_width(text)
    }

    fn draw_image(&mut self, image: &String, x: f64, y: f64, w: f64, h: f64) -> Result<(), CanvasError> {
        self.push(DrawCall::Image { reference: image.clone(), x, y, w, h });
        Ok(())
    }
}
