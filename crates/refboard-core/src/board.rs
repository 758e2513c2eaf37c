//! Boards: named scenes holding an ordered list of top-level items.

use crate::camera::{local_to_world, world_to_local};
use crate::items::{CanvasGroup, ItemId, ItemPatch, SceneItem};
use crate::scene::{SceneError, SceneResult};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub type BoardId = u64;

/// Shared, immutable copy of a board's item list.
pub type Snapshot = Arc<Vec<SceneItem>>;

/// An item together with the world offset of its containing frame.
#[derive(Debug, Clone, Copy)]
pub struct FlatItem<'a> {
    pub item: &'a SceneItem,
    /// Enclosing group, for nested items.
    pub parent: Option<&'a CanvasGroup>,
    /// Offset from the item's frame to world space.
    pub offset: Vec2,
}

impl FlatItem<'_> {
    pub fn world_bounds(&self) -> Rect {
        self.item.bounds() + self.offset
    }

    pub fn world_hit_bounds(&self) -> Rect {
        self.item.hit_bounds() + self.offset
    }

    pub fn world_position(&self) -> Point {
        local_to_world(self.item.position(), self.offset)
    }

    /// Whether the item or its enclosing group is locked.
    pub fn is_locked(&self) -> bool {
        self.item.is_locked() || self.parent.is_some_and(|g| g.locked)
    }
}

/// Index path to an item: top-level index plus child index for nested items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    top: usize,
    child: Option<usize>,
}

/// A named scene ("tab").
///
/// The item list sits behind an `Arc`; mutations go through
/// [`Arc::make_mut`] so snapshots taken earlier never observe later edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    items: Arc<Vec<SceneItem>>,
}

impl Board {
    pub fn new(id: BoardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            items: Arc::new(Vec::new()),
        }
    }

    /// Top-level items in paint order.
    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    /// Cheap shared copy of the current item list.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.items)
    }

    /// Install a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.items = snapshot;
    }

    fn items_mut(&mut self) -> &mut Vec<SceneItem> {
        Arc::make_mut(&mut self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items including nested ones.
    pub fn item_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| 1 + item.as_group().map_or(0, |g| g.items.len()))
            .sum()
    }

    /// Depth-first walk in paint order: each group is followed by its children.
    pub fn items_flat(&self) -> Vec<FlatItem<'_>> {
        let mut flat = Vec::with_capacity(self.item_count());
        for item in self.items.iter() {
            flat.push(FlatItem {
                item,
                parent: None,
                offset: Vec2::ZERO,
            });
            if let Some(group) = item.as_group() {
                for child in &group.items {
                    flat.push(FlatItem {
                        item: child,
                        parent: Some(group),
                        offset: group.origin(),
                    });
                }
            }
        }
        flat
    }

    /// Every id on the board, nested included, in paint order.
    pub fn all_ids(&self) -> Vec<ItemId> {
        self.items_flat().iter().map(|f| f.item.id()).collect()
    }

    fn locate(&self, id: ItemId) -> Option<Slot> {
        for (top, item) in self.items.iter().enumerate() {
            if item.id() == id {
                return Some(Slot { top, child: None });
            }
            if let Some(group) = item.as_group() {
                if let Some(child) = group.items.iter().position(|c| c.id() == id) {
                    return Some(Slot {
                        top,
                        child: Some(child),
                    });
                }
            }
        }
        None
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.locate(id).is_some()
    }

    /// Find an item at any depth.
    pub fn find(&self, id: ItemId) -> Option<&SceneItem> {
        let slot = self.locate(id)?;
        let top = &self.items[slot.top];
        match slot.child {
            None => Some(top),
            Some(child) => top.as_group().map(|g| &g.items[child]),
        }
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        let slot = self.locate(id)?;
        let top = &mut self.items_mut()[slot.top];
        match slot.child {
            None => Some(top),
            Some(child) => top.as_group_mut().map(|g| &mut g.items[child]),
        }
    }

    /// Flattened view of a single item.
    pub fn find_flat(&self, id: ItemId) -> Option<FlatItem<'_>> {
        let slot = self.locate(id)?;
        let top = &self.items[slot.top];
        match slot.child {
            None => Some(FlatItem {
                item: top,
                parent: None,
                offset: Vec2::ZERO,
            }),
            Some(child) => {
                let group = top.as_group()?;
                Some(FlatItem {
                    item: &group.items[child],
                    parent: Some(group),
                    offset: group.origin(),
                })
            }
        }
    }

    /// Top-level group with the given id.
    pub fn group(&self, id: ItemId) -> Option<&CanvasGroup> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .and_then(SceneItem::as_group)
    }

    /// World offset of a frame: zero for the board, the group origin otherwise.
    pub fn frame_origin(&self, parent: Option<ItemId>) -> SceneResult<Vec2> {
        match parent {
            None => Ok(Vec2::ZERO),
            Some(group_id) => self
                .group(group_id)
                .map(CanvasGroup::origin)
                .ok_or(SceneError::ItemNotFound(group_id)),
        }
    }

    pub fn world_bounds(&self, id: ItemId) -> Option<Rect> {
        self.find_flat(id).map(|f| f.world_bounds())
    }

    pub fn world_position(&self, id: ItemId) -> Option<Point> {
        self.find_flat(id).map(|f| f.world_position())
    }

    /// Append an item at top level or inside a group.
    ///
    /// The item's `parent_id` is overwritten with `parent`. Groups may only
    /// be added at top level and their children must not be groups.
    pub fn add_item(&mut self, mut item: SceneItem, parent: Option<ItemId>) -> SceneResult<ItemId> {
        let id = item.id();
        for new_id in item.ids() {
            if self.contains(new_id) {
                return Err(SceneError::InvariantViolation(format!("duplicate item id {new_id}")));
            }
        }
        if let Some(group) = item.as_group() {
            if parent.is_some() {
                return Err(SceneError::InvariantViolation(format!(
                    "group {id} cannot be nested"
                )));
            }
            if group.items.iter().any(SceneItem::is_group) {
                return Err(SceneError::InvariantViolation(format!(
                    "group {id} contains a nested group"
                )));
            }
        }
        item.set_parent_id(parent);
        if let Some(group) = item.as_group_mut() {
            for child in &mut group.items {
                child.set_parent_id(Some(id));
            }
        }

        match parent {
            None => self.items_mut().push(item),
            Some(group_id) => {
                let group = self
                    .find_mut(group_id)
                    .and_then(SceneItem::as_group_mut)
                    .ok_or(SceneError::ItemNotFound(group_id))?;
                group.items.push(item);
            }
        }
        Ok(id)
    }

    /// Apply a partial update to an item at any depth.
    pub fn update_item(&mut self, id: ItemId, patch: &ItemPatch) -> SceneResult<()> {
        let item = self.find_mut(id).ok_or(SceneError::ItemNotFound(id))?;
        item.apply_patch(patch);
        Ok(())
    }

    /// Set an item's position within its containing frame.
    pub fn move_item(&mut self, id: ItemId, position: Point) -> SceneResult<()> {
        let item = self.find_mut(id).ok_or(SceneError::ItemNotFound(id))?;
        item.set_position(position);
        Ok(())
    }

    /// Translate several items by the same delta in one list replacement.
    pub fn translate_items(&mut self, ids: &[ItemId], delta: Vec2) {
        for &id in ids {
            if let Some(item) = self.find_mut(id) {
                item.translate(delta);
            }
        }
    }

    /// Remove items, cascading into group children.
    ///
    /// Returns the removed items; a removed group carries its children.
    /// Unknown ids are skipped.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Vec<SceneItem> {
        let targets: HashSet<ItemId> = ids.iter().copied().collect();
        if !targets.iter().any(|&id| self.contains(id)) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        let items = self.items_mut();
        let mut kept = Vec::with_capacity(items.len());
        for mut item in items.drain(..) {
            if targets.contains(&item.id()) {
                removed.push(item);
                continue;
            }
            if let Some(group) = item.as_group_mut() {
                let (gone, stay): (Vec<_>, Vec<_>) = group
                    .items
                    .drain(..)
                    .partition(|child| targets.contains(&child.id()));
                group.items = stay;
                removed.extend(gone);
            }
            kept.push(item);
        }
        *items = kept;
        removed
    }

    /// Move an item between frames, converting its position so it stays put
    /// in world space. `to == None` promotes it to top level.
    pub fn reparent(&mut self, id: ItemId, from: Option<ItemId>, to: Option<ItemId>) -> SceneResult<()> {
        let item = self.find(id).ok_or(SceneError::ItemNotFound(id))?;
        if item.parent_id() != from {
            return Err(SceneError::PreconditionFailed(format!(
                "item {id} is not in frame {from:?}"
            )));
        }
        if from == to {
            return Ok(());
        }
        if to.is_some() && item.is_group() {
            return Err(SceneError::InvariantViolation(format!(
                "group {id} cannot be nested"
            )));
        }
        if let Some(target) = to {
            let group = self.group(target).ok_or(SceneError::ItemNotFound(target))?;
            if group.locked {
                return Err(SceneError::PreconditionFailed(format!("group {target} is locked")));
            }
        }

        let absolute = local_to_world(item.position(), self.frame_origin(from)?);
        let local = world_to_local(absolute, self.frame_origin(to)?);

        let mut item = self
            .remove_items(&[id])
            .pop()
            .ok_or(SceneError::ItemNotFound(id))?;
        item.set_position(local);
        self.add_item(item, to)?;
        Ok(())
    }

    /// Check the structural invariants: unique ids, one level of nesting,
    /// children linked to their group.
    pub fn validate(&self) -> SceneResult<()> {
        let mut seen = HashSet::new();
        for flat in self.items_flat() {
            let id = flat.item.id();
            if !seen.insert(id) {
                return Err(SceneError::InvariantViolation(format!("duplicate item id {id}")));
            }
            match flat.parent {
                None if flat.item.parent_id().is_some() => {
                    return Err(SceneError::InvariantViolation(format!(
                        "top-level item {id} has a parent"
                    )));
                }
                Some(group) => {
                    if flat.item.is_group() {
                        return Err(SceneError::InvariantViolation(format!(
                            "group {id} is nested in group {}",
                            group.id
                        )));
                    }
                    if flat.item.parent_id() != Some(group.id) {
                        return Err(SceneError::InvariantViolation(format!(
                            "item {id} is not linked to group {}",
                            group.id
                        )));
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}
