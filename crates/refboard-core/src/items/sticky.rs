//! Sticky notes: fixed-size colored text cards.

use super::{ItemId, ItemTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub content: String,
    #[serde(default = "StickyNote::default_extent")]
    pub width: f64,
    #[serde(default = "StickyNote::default_extent")]
    pub height: f64,
    /// Background color.
    #[serde(default = "StickyNote::default_color")]
    pub color: String,
}

impl StickyNote {
    pub const DEFAULT_SIZE: f64 = 200.0;
    pub const DEFAULT_COLOR: &'static str = "#fff59d";

    pub fn new(id: ItemId, position: Point, width: f64, height: f64) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            parent_id: None,
            content: String::new(),
            width,
            height,
            color: Self::DEFAULT_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    fn default_extent() -> f64 {
        Self::DEFAULT_SIZE
    }

    fn default_color() -> String {
        Self::DEFAULT_COLOR.to_string()
    }
}

impl ItemTrait for StickyNote {
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
