//! Alignment and distribution of selected items.
//!
//! Geometry is computed on world bounds; the resulting translation is
//! applied in each item's own frame, which is the same vector for nested
//! items.

use crate::board::Board;
use crate::items::ItemId;
use kurbo::{Rect, Vec2};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Left,
    Right,
    Top,
    Bottom,
    /// Line up horizontal centers (x axis).
    CenterHorizontal,
    /// Line up vertical centers (y axis).
    CenterVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributeMode {
    Horizontal,
    Vertical,
}

/// World bounds of the targets, skipping unknown ids and children whose
/// group is also a target.
fn target_bounds(board: &Board, ids: &[ItemId]) -> Vec<(ItemId, Rect)> {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    let mut seen = HashSet::new();
    ids.iter()
        .filter_map(|&id| board.find_flat(id))
        .filter(|f| !f.parent.is_some_and(|g| targets.contains(&g.id)))
        .filter(|f| seen.insert(f.item.id()))
        .map(|f| (f.item.id(), f.world_bounds()))
        .collect()
}

fn apply(board: &mut Board, moves: Vec<(ItemId, Vec2)>) -> bool {
    let mut changed = false;
    for (id, delta) in moves {
        if delta == Vec2::ZERO {
            continue;
        }
        if let Some(position) = board.find(id).map(|item| item.position() + delta) {
            changed |= board.move_item(id, position).is_ok();
        }
    }
    changed
}

/// Align at least two items. Returns whether anything moved.
pub fn align_items(board: &mut Board, ids: &[ItemId], mode: AlignMode) -> bool {
    let items = target_bounds(board, ids);
    if items.len() < 2 {
        return false;
    }
    let count = items.len() as f64;
    let min_x = items.iter().map(|(_, b)| b.x0).fold(f64::INFINITY, f64::min);
    let max_x = items.iter().map(|(_, b)| b.x1).fold(f64::NEG_INFINITY, f64::max);
    let min_y = items.iter().map(|(_, b)| b.y0).fold(f64::INFINITY, f64::min);
    let max_y = items.iter().map(|(_, b)| b.y1).fold(f64::NEG_INFINITY, f64::max);
    let mean_cx = items.iter().map(|(_, b)| b.center().x).sum::<f64>() / count;
    let mean_cy = items.iter().map(|(_, b)| b.center().y).sum::<f64>() / count;

    let moves = items
        .into_iter()
        .map(|(id, b)| {
            let delta = match mode {
                AlignMode::Left => Vec2::new(min_x - b.x0, 0.0),
                AlignMode::Right => Vec2::new(max_x - b.x1, 0.0),
                AlignMode::Top => Vec2::new(0.0, min_y - b.y0),
                AlignMode::Bottom => Vec2::new(0.0, max_y - b.y1),
                AlignMode::CenterHorizontal => Vec2::new(mean_cx - b.center().x, 0.0),
                AlignMode::CenterVertical => Vec2::new(0.0, mean_cy - b.center().y),
            };
            (id, delta)
        })
        .collect();
    apply(board, moves)
}

/// Spread at least three items so the gaps between neighbouring bounding
/// boxes are equal. The first and last items stay in place.
pub fn distribute_items(board: &mut Board, ids: &[ItemId], mode: DistributeMode) -> bool {
    let mut items = target_bounds(board, ids);
    if items.len() < 3 {
        return false;
    }
    let span = |r: &Rect| match mode {
        DistributeMode::Horizontal => (r.x0, r.x1),
        DistributeMode::Vertical => (r.y0, r.y1),
    };
    items.sort_by(|a, b| span(&a.1).0.total_cmp(&span(&b.1).0));

    let first = span(&items[0].1).0;
    let last_index = items.len() - 1;
    let last = span(&items[last_index].1).1;
    let occupied: f64 = items.iter().map(|(_, b)| span(b).1 - span(b).0).sum();
    let gap = (last - first - occupied) / last_index as f64;

    let mut cursor = first;
    let mut moves = Vec::with_capacity(items.len());
    for (index, (id, b)) in items.into_iter().enumerate() {
        let (start, end) = span(&b);
        if index != 0 && index != last_index {
            let shift = cursor - start;
            let delta = match mode {
                DistributeMode::Horizontal => Vec2::new(shift, 0.0),
                DistributeMode::Vertical => Vec2::new(0.0, shift),
            };
            moves.push((id, delta));
        }
        cursor += end - start + gap;
    }
    apply(board, moves)
}
