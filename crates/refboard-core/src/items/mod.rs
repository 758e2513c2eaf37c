//! Scene item definitions for the reference canvas.

mod group;
mod image;
mod sticky;
mod text;

pub use group::CanvasGroup;
pub use image::{ImageFormat, ImageItem};
pub use sticky::StickyNote;
pub use text::TextItem;

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Unique identifier for scene items (and boards), unique across a document.
pub type ItemId = u64;

/// Common trait for all scene items.
pub trait ItemTrait {
    /// Get the unique identifier.
    fn id(&self) -> ItemId;

    /// Position of the top-left corner in the containing frame.
    fn position(&self) -> Point;

    /// Move the item within its containing frame.
    fn set_position(&mut self, position: Point);

    /// Enclosing canvas group, if any.
    fn parent_id(&self) -> Option<ItemId>;

    /// Set the enclosing canvas group.
    fn set_parent_id(&mut self, parent_id: Option<ItemId>);

    /// Bounding box in the containing frame.
    fn bounds(&self) -> Rect;
}

/// Discriminant of a [`SceneItem`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Image,
    Text,
    Sticky,
    Canvas,
}

/// A placed object on a board.
///
/// Serialized with a `type` discriminator (`"image"`, `"text"`, `"sticky"`,
/// `"canvas"`) and camelCase fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneItem {
    Image(ImageItem),
    Text(TextItem),
    Sticky(StickyNote),
    Canvas(CanvasGroup),
}

impl SceneItem {
    pub fn id(&self) -> ItemId {
        match self {
            SceneItem::Image(i) => i.id(),
            SceneItem::Text(i) => i.id(),
            SceneItem::Sticky(i) => i.id(),
            SceneItem::Canvas(i) => i.id(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            SceneItem::Image(_) => ItemKind::Image,
            SceneItem::Text(_) => ItemKind::Text,
            SceneItem::Sticky(_) => ItemKind::Sticky,
            SceneItem::Canvas(_) => ItemKind::Canvas,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            SceneItem::Image(i) => i.position(),
            SceneItem::Text(i) => i.position(),
            SceneItem::Sticky(i) => i.position(),
            SceneItem::Canvas(i) => i.position(),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            SceneItem::Image(i) => i.set_position(position),
            SceneItem::Text(i) => i.set_position(position),
            SceneItem::Sticky(i) => i.set_position(position),
            SceneItem::Canvas(i) => i.set_position(position),
        }
    }

    /// Translate the item within its containing frame.
    pub fn translate(&mut self, delta: Vec2) {
        let position = self.position() + delta;
        self.set_position(position);
    }

    pub fn parent_id(&self) -> Option<ItemId> {
        match self {
            SceneItem::Image(i) => i.parent_id(),
            SceneItem::Text(i) => i.parent_id(),
            SceneItem::Sticky(i) => i.parent_id(),
            SceneItem::Canvas(i) => i.parent_id(),
        }
    }

    pub fn set_parent_id(&mut self, parent_id: Option<ItemId>) {
        match self {
            SceneItem::Image(i) => i.set_parent_id(parent_id),
            SceneItem::Text(i) => i.set_parent_id(parent_id),
            SceneItem::Sticky(i) => i.set_parent_id(parent_id),
            SceneItem::Canvas(i) => i.set_parent_id(parent_id),
        }
    }

    /// Bounding box in the containing frame.
    ///
    /// Text boxes are derived from the content and font size; every other
    /// variant uses its stored width and height.
    pub fn bounds(&self) -> Rect {
        match self {
            SceneItem::Image(i) => i.bounds(),
            SceneItem::Text(i) => i.bounds(),
            SceneItem::Sticky(i) => i.bounds(),
            SceneItem::Canvas(i) => i.bounds(),
        }
    }

    /// Bounding box used for intersection tests.
    ///
    /// Derived text boxes are approximate, so they get a fixed padding.
    pub fn hit_bounds(&self) -> Rect {
        match self {
            SceneItem::Text(t) => t.bounds().inflate(TextItem::HIT_PADDING, TextItem::HIT_PADDING),
            _ => self.bounds(),
        }
    }

    /// Explicit size for variants that store one (text has none).
    pub fn size(&self) -> Option<Size> {
        match self {
            SceneItem::Image(i) => Some(Size::new(i.width, i.height)),
            SceneItem::Sticky(s) => Some(Size::new(s.width, s.height)),
            SceneItem::Canvas(g) => Some(Size::new(g.width, g.height)),
            SceneItem::Text(_) => None,
        }
    }

    /// Whether this item can be resized with corner handles.
    pub fn is_resizable(&self) -> bool {
        self.size().is_some()
    }

    pub fn is_group(&self) -> bool {
        matches!(self, SceneItem::Canvas(_))
    }

    pub fn as_group(&self) -> Option<&CanvasGroup> {
        match self {
            SceneItem::Canvas(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut CanvasGroup> {
        match self {
            SceneItem::Canvas(g) => Some(g),
            _ => None,
        }
    }

    /// Text content for text and sticky items.
    pub fn content(&self) -> Option<&str> {
        match self {
            SceneItem::Text(t) => Some(&t.content),
            SceneItem::Sticky(s) => Some(&s.content),
            _ => None,
        }
    }

    /// Whether this item supports in-place text editing.
    pub fn is_editable(&self) -> bool {
        matches!(self, SceneItem::Text(_) | SceneItem::Sticky(_))
    }

    /// Whether this item (a group) is locked.
    pub fn is_locked(&self) -> bool {
        matches!(self, SceneItem::Canvas(g) if g.locked)
    }

    /// Replace the item's id. Group children keep their own ids but have
    /// their parent link rewritten.
    pub fn set_id(&mut self, id: ItemId) {
        match self {
            SceneItem::Image(i) => i.id = id,
            SceneItem::Text(i) => i.id = id,
            SceneItem::Sticky(i) => i.id = id,
            SceneItem::Canvas(g) => {
                g.id = id;
                for child in &mut g.items {
                    child.set_parent_id(Some(id));
                }
            }
        }
    }

    /// Ids of this item and, for groups, every child.
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids = vec![self.id()];
        if let SceneItem::Canvas(g) = self {
            ids.extend(g.items.iter().map(SceneItem::id));
        }
        ids
    }

    /// Apply a partial update. Fields that do not apply to this variant are ignored.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        let mut position = self.position();
        if let Some(x) = patch.x {
            position.x = x;
        }
        if let Some(y) = patch.y {
            position.y = y;
        }
        self.set_position(position);

        match self {
            SceneItem::Image(i) => {
                if let Some(width) = patch.width {
                    i.width = width;
                }
                if let Some(height) = patch.height {
                    i.height = height;
                }
                if let Some(src) = &patch.src {
                    i.src = src.clone();
                }
            }
            SceneItem::Text(t) => {
                if let Some(content) = &patch.content {
                    t.content = content.clone();
                }
                if let Some(font_size) = patch.font_size {
                    t.font_size = font_size;
                }
                if let Some(color) = &patch.color {
                    t.color = color.clone();
                }
                if let Some(weight) = &patch.font_weight {
                    t.font_weight = Some(weight.clone());
                }
            }
            SceneItem::Sticky(s) => {
                if let Some(content) = &patch.content {
                    s.content = content.clone();
                }
                if let Some(width) = patch.width {
                    s.width = width;
                }
                if let Some(height) = patch.height {
                    s.height = height;
                }
                if let Some(color) = &patch.color {
                    s.color = color.clone();
                }
            }
            SceneItem::Canvas(g) => {
                if let Some(name) = &patch.name {
                    g.name = name.clone();
                }
                if let Some(width) = patch.width {
                    g.width = width;
                }
                if let Some(height) = patch.height {
                    g.height = height;
                }
                if let Some(background) = &patch.background_color {
                    g.background_color = background.clone();
                }
                if let Some(locked) = patch.locked {
                    g.locked = locked;
                }
            }
        }
    }
}

impl From<ImageItem> for SceneItem {
    fn from(item: ImageItem) -> Self {
        SceneItem::Image(item)
    }
}

impl From<TextItem> for SceneItem {
    fn from(item: TextItem) -> Self {
        SceneItem::Text(item)
    }
}

impl From<StickyNote> for SceneItem {
    fn from(item: StickyNote) -> Self {
        SceneItem::Sticky(item)
    }
}

impl From<CanvasGroup> for SceneItem {
    fn from(item: CanvasGroup) -> Self {
        SceneItem::Canvas(item)
    }
}

/// A partial update to a scene item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    /// Text color for text items, background color for stickies.
    pub color: Option<String>,
    pub src: Option<String>,
    pub name: Option<String>,
    pub background_color: Option<String>,
    pub locked: Option<bool>,
}

impl ItemPatch {
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }

    pub fn frame(rect: Rect) -> Self {
        Self {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tags() {
        let item = SceneItem::from(ImageItem::new(7, Point::new(1.0, 2.0), "data:x", 100.0, 50.0));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["parentId"], serde_json::Value::Null);

        let group = SceneItem::from(CanvasGroup::new(8, "Canvas 1", Rect::new(0.0, 0.0, 200.0, 100.0)));
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["type"], "canvas");
        assert_eq!(json["backgroundColor"], CanvasGroup::DEFAULT_BACKGROUND);
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_text_item() {
        let json = r##"{"type":"text","id":3,"x":10,"y":20,"parentId":null,
            "content":"hello","fontSize":18,"color":"#333","fontWeight":"bold"}"##;
        let item: SceneItem = serde_json::from_str(json).unwrap();
        let SceneItem::Text(text) = &item else {
            panic!("expected text item");
        };
        assert_eq!(text.content, "hello");
        assert_eq!(text.font_weight.as_deref(), Some("bold"));
        assert_eq!(item.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_patch_ignores_foreign_fields() {
        let mut item = SceneItem::from(TextItem::new(1, Point::ZERO, "a"));
        item.apply_patch(&ItemPatch {
            width: Some(500.0),
            content: Some("b".into()),
            ..ItemPatch::default()
        });
        assert_eq!(item.content(), Some("b"));
        assert!(item.size().is_none());
    }

    #[test]
    fn test_set_id_relinks_children() {
        let mut group = CanvasGroup::new(1, "G", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut child = SceneItem::from(TextItem::new(2, Point::ZERO, "x"));
        child.set_parent_id(Some(1));
        group.items.push(child);

        let mut item = SceneItem::from(group);
        item.set_id(10);
        let group = item.as_group().unwrap();
        assert_eq!(group.items[0].parent_id(), Some(10));
        assert_eq!(item.ids(), vec![10, 2]);
    }

    #[test]
    fn test_hit_bounds_pad_text_only() {
        let text = SceneItem::from(TextItem::new(1, Point::ZERO, "hi"));
        assert!(text.hit_bounds().x0 < text.bounds().x0);

        let sticky = SceneItem::from(StickyNote::new(2, Point::ZERO, 100.0, 100.0));
        assert_eq!(sticky.hit_bounds(), sticky.bounds());
    }
}
