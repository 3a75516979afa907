//! Replaced images
//!
//! Layout only needs an image's intrinsic pixel size; decoding and embedding
//! is the painter's job. [`ImageProvider`] is the seam between the two.

use press_css::ComputedStyle;

/// Points per CSS pixel
const PT_PER_PX: f32 = 0.75;

/// Source of intrinsic image sizes
pub trait ImageProvider {
    /// Pixel size of the image referenced by `src`, or `None` when it is
    /// missing or undecodable
    fn intrinsic_size(&self, src: &str) -> Option<(u32, u32)>;
}

/// Provider that knows no images
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn intrinsic_size(&self, _src: &str) -> Option<(u32, u32)> {
        None
    }
}

/// Used size of an image in points
///
/// Explicit `width`/`height` win, a single explicit side keeps the aspect
/// ratio, then `max-width`/`max-height` and the available width scale the
/// image down proportionally.
pub fn image_size(
    style: &ComputedStyle,
    intrinsic: (u32, u32),
    available_width: f32,
    containing_height: Option<f32>,
) -> (f32, f32) {
    let iw = intrinsic.0 as f32 * PT_PER_PX;
    let ih = intrinsic.1 as f32 * PT_PER_PX;
    let ratio = if iw > 0.0 { ih / iw } else { 1.0 };

    let explicit_w = style.width.resolve(Some(available_width));
    let explicit_h = style.height.resolve(containing_height);

    let (mut w, mut h) = match (explicit_w, explicit_h) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * ratio),
        (None, Some(h)) if ratio > 0.0 => (h / ratio, h),
        (None, Some(h)) => (iw, h),
        (None, None) => (iw, ih),
    };

    let max_w = style.max_width.resolve(Some(available_width)).unwrap_or(f32::INFINITY);
    let max_w = if style.overflow_visible { max_w } else { max_w.min(available_width) };
    if w > max_w && w > 0.0 {
        h *= max_w / w;
        w = max_w;
    }
    if let Some(max_h) = style.max_height.resolve(containing_height) {
        if h > max_h && h > 0.0 {
            w *= max_h / h;
            h = max_h;
        }
    }
    (w.max(0.0), h.max(0.0))
}
