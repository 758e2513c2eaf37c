//! Selection set, hit-testing and resize handles.

use crate::board::Board;
use crate::items::ItemId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Ordered set of selected item ids.
///
/// Insertion order is kept; the most recently added item is the primary one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    pub fn primary(&self) -> Option<ItemId> {
        self.ids.last().copied()
    }

    /// The selected item when exactly one is selected.
    pub fn single(&self) -> Option<ItemId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn select_only(&mut self, id: ItemId) {
        self.ids.clear();
        self.ids.push(id);
    }

    pub fn add(&mut self, id: ItemId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: ItemId) {
        self.ids.retain(|&i| i != id);
    }

    /// Add the id if absent, remove it otherwise.
    pub fn toggle(&mut self, id: ItemId) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.ids.push(id);
        }
    }

    pub fn replace_with(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.ids.clear();
        self.extend_with(ids);
    }

    pub fn extend_with(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        for id in ids {
            self.add(id);
        }
    }

    pub fn toggle_all(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        for id in ids {
            self.toggle(id);
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&ItemId) -> bool) {
        self.ids.retain(keep);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Inclusive rectangle overlap: touching edges count.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Inclusive containment.
fn contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Ids of unlocked items at any depth whose world bounds overlap `rect`,
/// in paint order.
pub fn items_in_rect(board: &Board, rect: Rect) -> Vec<ItemId> {
    let rect = rect.abs();
    board
        .items_flat()
        .into_iter()
        .filter(|f| !f.is_locked() && overlaps(f.world_hit_bounds(), rect))
        .map(|f| f.item.id())
        .collect()
}

/// Ids of unlocked items whose world bounds contain `point`, topmost first.
///
/// Children come before their group and later items before earlier ones.
pub fn items_at_point(board: &Board, point: Point) -> Vec<ItemId> {
    board
        .items_flat()
        .into_iter()
        .rev()
        .filter(|f| !f.is_locked() && contains(f.world_hit_bounds(), point))
        .map(|f| f.item.id())
        .collect()
}

/// Topmost unlocked item under `point`.
pub fn topmost_item_at(board: &Board, point: Point) -> Option<ItemId> {
    items_at_point(board, point).into_iter().next()
}

/// Topmost unlocked group containing `point`, skipping `exclude`.
pub fn group_at_point(board: &Board, point: Point, exclude: Option<ItemId>) -> Option<ItemId> {
    board
        .items()
        .iter()
        .rev()
        .filter_map(|item| item.as_group())
        .find(|g| {
            let frame = Rect::new(g.x, g.y, g.x + g.width, g.y + g.height);
            !g.locked && Some(g.id) != exclude && contains(frame, point)
        })
        .map(|g| g.id)
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of this corner on `rect`.
    pub fn point(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// A resize handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub corner: Corner,
}

impl Handle {
    pub fn new(position: Point, corner: Corner) -> Self {
        Self { position, corner }
    }

    /// Check if a point hits this handle. Point and handle share one space.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Corner handles for a bounding rectangle.
pub fn corner_handles(bounds: Rect) -> Vec<Handle> {
    Corner::ALL
        .iter()
        .map(|&corner| Handle::new(corner.point(bounds), corner))
        .collect()
}

/// Find which corner handle (if any) is hit.
pub fn hit_test_handles(bounds: Rect, point: Point, tolerance: f64) -> Option<Corner> {
    corner_handles(bounds)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.corner)
}

/// Resize `original` by dragging `corner` by `delta`, anchored at the
/// opposite corner.
///
/// The result is at least `min` in both dimensions. With `aspect`
/// (width / height) the height follows the width.
pub fn resize_from_corner(original: Rect, corner: Corner, delta: Vec2, min: Size, aspect: Option<f64>) -> Rect {
    let anchor = corner.opposite().point(original);
    let dx = if corner.is_left() { -delta.x } else { delta.x };
    let dy = if corner.is_top() { -delta.y } else { delta.y };

    let mut width = (original.width() + dx).max(min.width);
    let mut height = (original.height() + dy).max(min.height);

    if let Some(aspect) = aspect.filter(|a| a.is_finite() && *a > 0.0) {
        height = width / aspect;
        if height < min.height {
            height = min.height;
            width = height * aspect;
        }
    }

    let x0 = if corner.is_left() { anchor.x - width } else { anchor.x };
    let y0 = if corner.is_top() { anchor.y - height } else { anchor.y };
    Rect::new(x0, y0, x0 + width, y0 + height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasGroup, ImageItem, ItemPatch, TextItem};

    fn sample_board() -> Board {
        let mut board = Board::new(1, "Board 1");
        board
            .add_item(CanvasGroup::new(10, "G", Rect::new(100.0, 100.0, 400.0, 400.0)).into(), None)
            .unwrap();
        board
            .add_item(ImageItem::new(11, Point::new(20.0, 20.0), "a", 100.0, 100.0).into(), Some(10))
            .unwrap();
        board
            .add_item(TextItem::new(12, Point::ZERO, "hi").into(), None)
            .unwrap();
        board
    }

    #[test]
    fn test_text_rect_hits() {
        let board = sample_board();
        let hits = items_in_rect(&board, Rect::new(-5.0, -5.0, 50.0, 50.0));
        assert_eq!(hits, vec![12]);
        assert!(items_in_rect(&board, Rect::new(450.0, 450.0, 500.0, 500.0)).is_empty());
    }

    #[test]
    fn test_text_far_rect_misses() {
        let mut board = Board::new(1, "Board 1");
        board.add_item(TextItem::new(1, Point::ZERO, "hi").into(), None).unwrap();
        assert_eq!(items_in_rect(&board, Rect::new(-5.0, -5.0, 50.0, 50.0)), vec![1]);
        assert!(items_in_rect(&board, Rect::new(100.0, 100.0, 200.0, 200.0)).is_empty());
    }

    #[test]
    fn test_touching_edge_counts() {
        let board = sample_board();
        let hits = items_in_rect(&board, Rect::new(400.0, 400.0, 420.0, 420.0));
        assert_eq!(hits, vec![10]);
    }

    #[test]
    fn test_point_order_child_first() {
        let board = sample_board();
        assert_eq!(items_at_point(&board, Point::new(150.0, 150.0)), vec![11, 10]);
        assert_eq!(topmost_item_at(&board, Point::new(300.0, 300.0)), Some(10));
        assert_eq!(topmost_item_at(&board, Point::new(900.0, 900.0)), None);
    }

    #[test]
    fn test_locked_group_excluded() {
        let mut board = sample_board();
        board.update_item(10, &ItemPatch::locked(true)).unwrap();
        assert!(items_at_point(&board, Point::new(150.0, 150.0)).is_empty());
        assert!(items_in_rect(&board, Rect::new(90.0, 90.0, 500.0, 500.0)).is_empty());
        assert_eq!(group_at_point(&board, Point::new(150.0, 150.0), None), None);
    }

    #[test]
    fn test_selection_toggle_and_primary() {
        let mut selection = Selection::new();
        selection.replace_with([1, 2, 3]);
        selection.toggle(2);
        assert_eq!(selection.ids(), &[1, 3]);
        selection.toggle(4);
        assert_eq!(selection.primary(), Some(4));
        selection.select_only(9);
        assert_eq!(selection.single(), Some(9));
    }

    #[test]
    fn test_handle_hit() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(hit_test_handles(bounds, Point::new(103.0, 52.0), 8.0), Some(Corner::BottomRight));
        assert_eq!(hit_test_handles(bounds, Point::new(50.0, 25.0), 8.0), None);
    }

    #[test]
    fn test_resize_bottom_right() {
        let rect = resize_from_corner(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Corner::BottomRight,
            Vec2::new(50.0, 20.0),
            Size::new(50.0, 50.0),
            None,
        );
        assert_eq!(rect, Rect::new(0.0, 0.0, 250.0, 120.0));
    }

    #[test]
    fn test_resize_top_left_anchors_opposite() {
        let rect = resize_from_corner(
            Rect::new(100.0, 100.0, 200.0, 200.0),
            Corner::TopLeft,
            Vec2::new(80.0, 80.0),
            Size::new(50.0, 50.0),
            None,
        );
        assert_eq!(rect, Rect::new(150.0, 150.0, 200.0, 200.0));
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let rect = resize_from_corner(
            Rect::new(0.0, 0.0, 300.0, 150.0),
            Corner::BottomRight,
            Vec2::new(100.0, 0.0),
            Size::new(100.0, 100.0),
            Some(2.0),
        );
        assert!((rect.width() - 400.0).abs() < 1e-9);
        assert!((rect.height() - 200.0).abs() < 1e-9);

        let shrunk = resize_from_corner(
            Rect::new(0.0, 0.0, 300.0, 150.0),
            Corner::BottomRight,
            Vec2::new(-250.0, 0.0),
            Size::new(100.0, 100.0),
            Some(2.0),
        );
        assert!((shrunk.height() - 100.0).abs() < 1e-9);
        assert!((shrunk.width() - 200.0).abs() < 1e-9);
    }
}
