//! Image item for placed reference pictures.

use super::{ItemId, ItemTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Image format detected from pasted or dropped image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// A placed image. `src` is either a durable URL or an inline `data:` URL
/// while an upload is still pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    pub src: String,
    #[serde(default = "ImageItem::default_extent")]
    pub width: f64,
    #[serde(default = "ImageItem::default_extent")]
    pub height: f64,
}

impl ImageItem {
    /// Default display width and height of a newly placed image.
    pub const DEFAULT_SIZE: f64 = 300.0;

    pub fn new(id: ItemId, position: Point, src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            parent_id: None,
            src: src.into(),
            width,
            height,
        }
    }

    fn default_extent() -> f64 {
        Self::DEFAULT_SIZE
    }

    /// Whether `src` still holds inline image data.
    pub fn is_inline(&self) -> bool {
        self.src.starts_with("data:")
    }

    /// Width divided by height, if the height is positive.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }
}

impl ItemTrait for ImageItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    fn parent_id(&self) -> Option<ItemId> {
        self.parent_id
    }

    fn set_parent_id(&mut self, parent_id: Option<ItemId>) {
        self.parent_id = parent_id;
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"abc"), None);
    }

    #[test]
    fn test_image_bounds() {
        let image = ImageItem::new(1, Point::new(10.0, 20.0), "https://x/y.png", 300.0, 150.0);
        let bounds = image.bounds();
        assert!((bounds.x1 - 310.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 170.0).abs() < f64::EPSILON);
        assert!(!image.is_inline());
        assert!((image.aspect_ratio().unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_size_defaults() {
        let image: ImageItem = serde_json::from_str(r#"{"id":4,"src":"data:image/png;base64,AA=="}"#).unwrap();
        assert!((image.width - ImageItem::DEFAULT_SIZE).abs() < f64::EPSILON);
        assert!(image.is_inline());
        assert_eq!(image.parent_id, None);
    }
}
