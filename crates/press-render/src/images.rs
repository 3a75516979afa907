//! Image resources
//!
//! Images are decoded (or, for JPEG, only probed) once when they are
//! added to a [`ResourceSet`]. Layout asks the set for intrinsic sizes and
//! the painter embeds the same data, so both agree on what exists.

use std::collections::HashMap;
use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder, ImageFormat};
use pdf_writer::{Filter, Pdf, Ref};
use press_layout::ImageProvider;

use crate::{PaintError, Result};

#[derive(Debug, Clone, PartialEq)]
enum ImageData {
    /// Baseline or progressive JPEG embedded as-is
    Jpeg { bytes: Vec<u8>, gray: bool },
    /// Decoded 8-bit RGB with an optional alpha channel
    Raw { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded image ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    pub width: u32,
    pub height: u32,
    data: ImageData,
}

impl ImageResource {
    /// Decode encoded image bytes; `src` is only used in errors
    pub fn decode(src: &str, bytes: &[u8]) -> Result<Self> {
        let fail = |reason: String| PaintError::ImageDecode {
            src: src.chars().take(64).collect(),
            reason,
        };
        let format = image::guess_format(bytes).map_err(|e| fail(e.to_string()))?;

        if format == ImageFormat::Jpeg {
            let decoder = JpegDecoder::new(Cursor::new(bytes)).map_err(|e| fail(e.to_string()))?;
            let (width, height) = decoder.dimensions();
            match decoder.original_color_type() {
                ExtendedColorType::L8 | ExtendedColorType::Rgb8 => {
                    return Ok(Self {
                        width,
                        height,
                        data: ImageData::Jpeg {
                            bytes: bytes.to_vec(),
                            gray: decoder.original_color_type() == ExtendedColorType::L8,
                        },
                    });
                }
                // CMYK and friends are converted to RGB below
                _ => {}
            }
        }

        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| fail(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        let alpha = rgba
            .pixels()
            .any(|p| p.0[3] < 255)
            .then(|| rgba.pixels().map(|p| p.0[3]).collect());
        Ok(Self {
            width,
            height,
            data: ImageData::Raw { rgb, alpha },
        })
    }

    pub fn is_jpeg(&self) -> bool {
        matches!(self.data, ImageData::Jpeg { .. })
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.data, ImageData::Raw { alpha: Some(_), .. })
    }

    /// Write the image XObject (and its soft mask)
    pub(crate) fn write(&self, pdf: &mut Pdf, alloc: &mut Ref, id: Ref) {
        let (width, height) = (self.width as i32, self.height as i32);
        match &self.data {
            ImageData::Jpeg { bytes, gray } => {
                let mut xobj = pdf.image_xobject(id, bytes);
                xobj.filter(Filter::DctDecode);
                xobj.width(width);
                xobj.height(height);
                if *gray {
                    xobj.color_space().device_gray();
                } else {
                    xobj.color_space().device_rgb();
                }
                xobj.bits_per_component(8);
            }
            ImageData::Raw { rgb, alpha } => {
                let mask = alpha.as_ref().map(|alpha| {
                    let mask_id = alloc.bump();
                    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
                    let mut mask = pdf.image_xobject(mask_id, &compressed);
                    mask.filter(Filter::FlateDecode);
                    mask.width(width);
                    mask.height(height);
                    mask.color_space().device_gray();
                    mask.bits_per_component(8);
                    mask_id
                });

                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb, 6);
                let mut xobj = pdf.image_xobject(id, &compressed);
                xobj.filter(Filter::FlateDecode);
                xobj.width(width);
                xobj.height(height);
                xobj.color_space().device_rgb();
                xobj.bits_per_component(8);
                if let Some(mask_id) = mask {
                    xobj.s_mask(mask_id);
                }
            }
        }
    }
}

/// Images available to one render, keyed by their `src`
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    images: HashMap<String, ImageResource>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and add an image
    pub fn insert_bytes(&mut self, src: &str, bytes: &[u8]) -> Result<()> {
        let image = ImageResource::decode(src, bytes)?;
        tracing::debug!("decoded image {}x{} for {:.48}", image.width, image.height, src);
        self.images.insert(src.to_string(), image);
        Ok(())
    }

    pub fn insert(&mut self, src: impl Into<String>, image: ImageResource) {
        self.images.insert(src.into(), image);
    }

    pub fn get(&self, src: &str) -> Option<&ImageResource> {
        self.images.get(src)
    }

    pub fn contains(&self, src: &str) -> bool {
        self.images.contains_key(src)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageProvider for ResourceSet {
    fn intrinsic_size(&self, src: &str) -> Option<(u32, u32)> {
        self.get(src).map(|i| (i.width, i.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, alpha]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = ImageResource::decode("a.png", &png(4, 3, 255)).unwrap();
        assert_eq!((image.width, image.height), (4, 3));
        assert!(!image.is_jpeg());
        assert!(!image.has_alpha());
    }

    #[test]
    fn test_png_with_alpha_keeps_mask() {
        let image = ImageResource::decode("a.png", &png(2, 2, 128)).unwrap();
        assert!(image.has_alpha());
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = ImageResource::decode("broken", b"definitely not an image").unwrap_err();
        assert!(matches!(err, PaintError::ImageDecode { .. }));
    }

    #[test]
    fn test_resource_set_provides_sizes() {
        let mut set = ResourceSet::new();
        set.insert_bytes("logo.png", &png(8, 6, 255)).unwrap();
        assert_eq!(set.intrinsic_size("logo.png"), Some((8, 6)));
        assert_eq!(set.intrinsic_size("missing.png"), None);
    }
}
