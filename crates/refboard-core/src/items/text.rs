//! Free text notes.

use super::{ItemId, ItemTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A free-floating text note. Its size is derived from the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub content: String,
    #[serde(default = "TextItem::default_font_size")]
    pub font_size: f64,
    #[serde(default = "TextItem::default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

impl TextItem {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_COLOR: &'static str = "#333333";
    /// Content of text created by double-clicking the empty canvas.
    pub const PLACEHOLDER: &'static str = "New text";
    /// Average glyph advance as a fraction of the font size.
    pub const CHAR_WIDTH_FACTOR: f64 = 0.6;
    pub const LINE_HEIGHT_FACTOR: f64 = 1.5;
    /// Extra margin around the derived box for hit tests.
    pub const HIT_PADDING: f64 = 4.0;

    pub fn new(id: ItemId, position: Point, content: impl Into<String>) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            parent_id: None,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            color: Self::DEFAULT_COLOR.to_string(),
            font_weight: None,
        }
    }

    fn default_font_size() -> f64 {
        Self::DEFAULT_FONT_SIZE
    }

    fn default_color() -> String {
        Self::DEFAULT_COLOR.to_string()
    }

    /// Approximate width from the longest line.
    pub fn approximate_width(&self) -> f64 {
        let max_line_chars = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_line_chars as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR
    }

    /// Approximate height from the number of lines.
    pub fn approximate_height(&self) -> f64 {
        // Empty content still occupies one line
        let line_count = self.content.lines().count().max(1);
        let line_count = if self.content.ends_with('\n') {
            line_count + 1
        } else {
            line_count
        };
        line_count as f64 * self.font_size * Self::LINE_HEIGHT_FACTOR
    }

    /// Whether the note holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl ItemTrait for TextItem {
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
        Rect::new(
            self.x,
            self.y,
            self.x + self.approximate_width(),
            self.y + self.approximate_height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_metrics() {
        let text = TextItem::new(1, Point::ZERO, "hi");
        assert!((text.approximate_width() - 19.2).abs() < 1e-9);
        assert!((text.approximate_height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiline_uses_longest_line() {
        let text = TextItem::new(1, Point::new(5.0, 5.0), "a\nlonger\nb");
        let bounds = text.bounds();
        assert!((bounds.width() - 6.0 * 16.0 * 0.6).abs() < 1e-9);
        assert!((bounds.height() - 3.0 * 16.0 * 1.5).abs() < 1e-9);
        assert!((bounds.x0 - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let text = TextItem::new(1, Point::ZERO, "");
        assert!(text.is_blank());
        assert!(text.approximate_width().abs() < f64::EPSILON);
        assert!((text.approximate_height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_newline_adds_line() {
        let text = TextItem::new(1, Point::ZERO, "x\n");
        assert!((text.approximate_height() - 48.0).abs() < 1e-9);
    }
}
