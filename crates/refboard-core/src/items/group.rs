//! Canvas groups: titled container frames holding a flat list of children.

use super::{ItemId, ItemTrait, SceneItem};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A container item. Children store positions relative to the group origin
/// and never include another group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasGroup {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "CanvasGroup::default_extent")]
    pub width: f64,
    #[serde(default = "CanvasGroup::default_extent")]
    pub height: f64,
    #[serde(default = "CanvasGroup::default_background")]
    pub background_color: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub items: Vec<SceneItem>,
}

impl CanvasGroup {
    pub const DEFAULT_BACKGROUND: &'static str = "#f5f5f5";
    pub const DEFAULT_SIZE: f64 = 400.0;

    /// Create an empty group covering `frame`.
    pub fn new(id: ItemId, name: impl Into<String>, frame: Rect) -> Self {
        let frame = frame.abs();
        Self {
            id,
            x: frame.x0,
            y: frame.y0,
            parent_id: None,
            name: name.into(),
            width: frame.width(),
            height: frame.height(),
            background_color: Self::DEFAULT_BACKGROUND.to_string(),
            locked: false,
            items: Vec::new(),
        }
    }

    fn default_extent() -> f64 {
        Self::DEFAULT_SIZE
    }

    fn default_background() -> String {
        Self::DEFAULT_BACKGROUND.to_string()
    }

    /// Offset that converts child-local coordinates to the group's frame.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn child(&self, id: ItemId) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn child_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains_child(&self, id: ItemId) -> bool {
        self.child(id).is_some()
    }
}

impl ItemTrait for CanvasGroup {
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
