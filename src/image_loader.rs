//! # Logo Loading and Decoding
//!
//! Loads the report logo from a data URI, a file path or raw base64 and
//! prepares it for PDF embedding. JPEG passes through without re-encoding
//! (DCTDecode); PNG is decoded to RGB with a separate alpha channel for the
//! SMask.
//!
//! Every page shows a logo: the caller's when it decodes, otherwise the
//! built-in brand mark.

use std::io::Cursor;

/// The brand mark drawn when no usable custom logo is supplied.
static DEFAULT_LOGO: &[u8] = include_bytes!("../assets/default_logo.png");

/// Sentinel that explicitly asks for the default logo.
const NO_LOGO: &str = "none";

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        self.height_px as f64 / self.width_px as f64
    }
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Normalize a caller-supplied logo: blank and `none` mean "no custom
/// logo"; raw base64 loses its line breaks.
pub fn sanitize_logo(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_LOGO) {
        return None;
    }
    if trimmed.starts_with("data:image") || looks_like_path(trimmed) {
        return Some(trimmed.to_string());
    }
    Some(trimmed.replace(['\r', '\n'], ""))
}

/// Load the logo for the page header.
///
/// A custom logo that fails to load is logged and replaced by the default;
/// `None` only when the default itself cannot be decoded.
pub fn resolve_logo(custom: Option<&str>) -> Option<LoadedImage> {
    if let Some(src) = sanitize_logo(custom) {
        match load_image(&src) {
            Ok(image) => return Some(image),
            Err(e) => log::warn!("No se pudo cargar el logotipo personalizado: {}", e),
        }
    }
    match decode_image_bytes(DEFAULT_LOGO) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("No se pudo cargar el logotipo predeterminado: {}", e);
            None
        }
    }
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path: absolute, `./` or `../` relative, or ending in an image extension
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, String> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Paths are recognized by explicit prefixes or an image extension, so
/// base64 text (which may contain '/') is not mistaken for one.
fn looks_like_path(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    src.starts_with('/')
        || src.starts_with("./")
        || src.starts_with("../")
        || [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, String> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    if looks_like_path(src) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src)
                .map_err(|e| format!("Failed to read image file '{}': {}", src, e));
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(format!(
                "File path images not supported in WASM: '{}'. Use data URIs or base64.",
                src
            ));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("Unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("Failed to read JPEG dimensions: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the Start of Frame segment and read its component
/// count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        // length(2) + precision(1) + height(2) + width(2) + components(1)
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?;

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        has_transparency |= pixel[3] != 255;
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn png_bytes(color: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba(color));
        img.put_pixel(1, 0, image::Rgba(color));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 1, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image("data:image/png;base64").is_err());
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_sanitize_logo() {
        assert_eq!(sanitize_logo(None), None);
        assert_eq!(sanitize_logo(Some("  ")), None);
        assert_eq!(sanitize_logo(Some("NONE")), None);
        assert_eq!(sanitize_logo(Some("iVBO\r\nRw0K")).as_deref(), Some("iVBORw0K"));
        assert_eq!(sanitize_logo(Some("./logo.png")).as_deref(), Some("./logo.png"));
    }

    #[test]
    fn test_png_with_alpha_gets_a_mask() {
        let loaded = decode_image_bytes(&png_bytes([255, 0, 0, 128])).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (2, 1));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0, 255, 0, 0]);
                assert_eq!(alpha.as_deref(), Some(&[128u8, 128][..]));
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_jpeg_passes_through() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();
        let loaded = decode_image_bytes(&buf).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert!(matches!(color_space, JpegColorSpace::DeviceRGB));
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_custom_logo_from_raw_base64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255]));
        let logo = resolve_logo(Some(&b64)).unwrap();
        assert_eq!(logo.width_px, 2);
        assert_eq!(logo.aspect_ratio(), 0.5);
    }

    #[test]
    fn test_broken_logo_falls_back_to_default() {
        let logo = resolve_logo(Some("data:image/png;base64,AAAA")).unwrap();
        let default = decode_image_bytes(DEFAULT_LOGO).unwrap();
        assert_eq!(logo.width_px, default.width_px);
        assert!(resolve_logo(Some("none")).is_some());
    }
}
