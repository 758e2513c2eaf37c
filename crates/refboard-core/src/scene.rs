//! The reference document: a list of boards, one of them active.

use crate::board::{Board, BoardId, Snapshot};
use crate::items::{ItemId, ItemPatch, SceneItem};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Scene store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("Board not found: {0}")]
    BoardNotFound(BoardId),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Serialized form of a [`Scene`] before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneDocument {
    #[serde(default)]
    boards: Vec<Board>,
    #[serde(default)]
    active_board_id: Option<BoardId>,
}

/// A document of boards.
///
/// There is always at least one board and the active id always names one
/// of them. Ids of boards and items come from one counter seeded past the
/// largest id in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SceneDocument")]
pub struct Scene {
    boards: Vec<Board>,
    active_board_id: BoardId,
    #[serde(skip)]
    next_id: u64,
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.boards == other.boards && self.active_board_id == other.active_board_id
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SceneDocument> for Scene {
    fn from(document: SceneDocument) -> Self {
        Self::from_boards(document.boards, document.active_board_id)
    }
}

impl Scene {
    /// A document with a single empty board.
    pub fn new() -> Self {
        Self {
            boards: vec![Board::new(1, "Board 1")],
            active_board_id: 1,
            next_id: 2,
        }
    }

    /// Build a document from loaded boards. An empty list yields the default
    /// document; an unknown active id falls back to the first board.
    pub fn from_boards(boards: Vec<Board>, active_board_id: Option<BoardId>) -> Self {
        if boards.is_empty() {
            return Self::new();
        }
        let active_board_id = active_board_id
            .filter(|id| boards.iter().any(|b| b.id == *id))
            .unwrap_or(boards[0].id);
        let mut scene = Self {
            boards,
            active_board_id,
            next_id: 0,
        };
        scene.next_id = scene.max_id() + 1;
        scene
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    /// Direct board access for multi-item edits. Callers keep ids unique.
    pub(crate) fn board_mut(&mut self, id: BoardId) -> SceneResult<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(SceneError::BoardNotFound(id))
    }

    pub fn active_board_id(&self) -> BoardId {
        self.active_board_id
    }

    pub fn active_board(&self) -> &Board {
        self.board(self.active_board_id).unwrap_or(&self.boards[0])
    }

    pub fn set_active_board(&mut self, id: BoardId) -> SceneResult<()> {
        if self.board(id).is_none() {
            return Err(SceneError::BoardNotFound(id));
        }
        self.active_board_id = id;
        Ok(())
    }

    fn max_id(&self) -> u64 {
        self.boards
            .iter()
            .flat_map(|b| std::iter::once(b.id).chain(b.all_ids()))
            .max()
            .unwrap_or(0)
    }

    /// Allocate a fresh document-wide id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn note_ids(&mut self, ids: impl IntoIterator<Item = u64>) {
        for id in ids {
            if id >= self.next_id {
                self.next_id = id + 1;
            }
        }
    }

    /// Add an empty board named `Board N` and return its id.
    pub fn add_board(&mut self) -> BoardId {
        let id = self.allocate_id();
        let mut n = self.boards.len() + 1;
        let name = loop {
            let candidate = format!("Board {n}");
            if !self.boards.iter().any(|b| b.name == candidate) {
                break candidate;
            }
            n += 1;
        };
        self.boards.push(Board::new(id, name));
        log::debug!("Added board {id}");
        id
    }

    /// Remove a board with all its items. The last board cannot be removed.
    ///
    /// If the removed board was active, the board that takes its place in the
    /// list (or the previous one) becomes active.
    pub fn remove_board(&mut self, id: BoardId) -> SceneResult<Board> {
        let index = self
            .boards
            .iter()
            .position(|b| b.id == id)
            .ok_or(SceneError::BoardNotFound(id))?;
        if self.boards.len() == 1 {
            return Err(SceneError::PreconditionFailed(
                "cannot delete the only board".to_string(),
            ));
        }
        let board = self.boards.remove(index);
        if self.active_board_id == id {
            let next = index.min(self.boards.len() - 1);
            self.active_board_id = self.boards[next].id;
        }
        log::debug!("Removed board {id}");
        Ok(board)
    }

    pub fn rename_board(&mut self, id: BoardId, name: &str) -> SceneResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::PreconditionFailed(
                "board name cannot be empty".to_string(),
            ));
        }
        self.board_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Board holding the given item at any depth.
    pub fn board_of_item(&self, id: ItemId) -> Option<BoardId> {
        self.boards.iter().find(|b| b.contains(id)).map(|b| b.id)
    }

    pub fn contains_id(&self, id: ItemId) -> bool {
        self.board_of_item(id).is_some()
    }

    pub fn find_item(&self, id: ItemId) -> Option<&SceneItem> {
        self.boards.iter().find_map(|b| b.find(id))
    }

    fn board_with_item_mut(&mut self, id: ItemId) -> SceneResult<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.contains(id))
            .ok_or(SceneError::ItemNotFound(id))
    }

    /// Add an item to a board, at top level or inside `parent`.
    pub fn add_item(&mut self, board_id: BoardId, item: SceneItem, parent: Option<ItemId>) -> SceneResult<ItemId> {
        let ids = item.ids();
        if let Some(&dup) = ids.iter().find(|&&id| self.contains_id(id)) {
            return Err(SceneError::InvariantViolation(format!("duplicate item id {dup}")));
        }
        let id = self.board_mut(board_id)?.add_item(item, parent)?;
        self.note_ids(ids);
        Ok(id)
    }

    pub fn update_item(&mut self, id: ItemId, patch: &ItemPatch) -> SceneResult<()> {
        self.board_with_item_mut(id)?.update_item(id, patch)
    }

    pub fn move_item(&mut self, id: ItemId, position: Point) -> SceneResult<()> {
        self.board_with_item_mut(id)?.move_item(id, position)
    }

    /// Remove items from whichever boards hold them, cascading into groups.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Vec<SceneItem> {
        let mut removed = Vec::new();
        for board in &mut self.boards {
            removed.extend(board.remove_items(ids));
        }
        removed
    }

    pub fn reparent(&mut self, id: ItemId, from: Option<ItemId>, to: Option<ItemId>) -> SceneResult<()> {
        self.board_with_item_mut(id)?.reparent(id, from, to)
    }

    /// Replace a board's item list with a snapshot.
    ///
    /// Fails without touching the board if the snapshot repeats an id or
    /// holds an id that another board already uses.
    pub fn restore_board(&mut self, board_id: BoardId, snapshot: Snapshot) -> SceneResult<()> {
        let mut seen = HashSet::new();
        let ids: Vec<ItemId> = snapshot.iter().flat_map(SceneItem::ids).collect();
        for &id in &ids {
            let taken = self
                .boards
                .iter()
                .any(|b| b.id != board_id && (b.id == id || b.contains(id)));
            if !seen.insert(id) || taken {
                return Err(SceneError::InvariantViolation(format!("duplicate item id {id}")));
            }
        }
        self.board_mut(board_id)?.restore(snapshot);
        self.note_ids(ids);
        Ok(())
    }

    /// Whether any board holds items.
    pub fn has_content(&self) -> bool {
        self.boards.iter().any(|b| !b.is_empty())
    }

    pub fn validate(&self) -> SceneResult<()> {
        let mut seen = HashSet::new();
        for board in &self.boards {
            board.validate()?;
            for id in board.all_ids() {
                if !seen.insert(id) {
                    return Err(SceneError::InvariantViolation(format!("duplicate item id {id}")));
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasGroup, ImageItem, TextItem};
    use kurbo::Rect;

    #[test]
    fn test_new_scene_has_one_board() {
        let scene = Scene::new();
        assert_eq!(scene.boards().len(), 1);
        assert_eq!(scene.active_board().name, "Board 1");
        assert!(!scene.has_content());
    }

    #[test]
    fn test_board_names_skip_used() {
        let mut scene = Scene::new();
        let second = scene.add_board();
        scene.rename_board(second, "Board 3").unwrap();
        let third = scene.add_board();
        assert_eq!(scene.board(third).unwrap().name, "Board 4");
        assert_ne!(second, third);
    }

    #[test]
    fn test_cannot_remove_last_board() {
        let mut scene = Scene::new();
        let id = scene.active_board_id();
        assert!(matches!(scene.remove_board(id), Err(SceneError::PreconditionFailed(_))));
        assert_eq!(scene.boards().len(), 1);
    }

    #[test]
    fn test_remove_active_board_activates_neighbour() {
        let mut scene = Scene::new();
        let first = scene.active_board_id();
        let second = scene.add_board();
        scene.set_active_board(second).unwrap();
        scene.remove_board(second).unwrap();
        assert_eq!(scene.active_board_id(), first);
    }

    #[test]
    fn test_rename_rejects_empty() {
        let mut scene = Scene::new();
        let id = scene.active_board_id();
        assert!(scene.rename_board(id, "   ").is_err());
        scene.rename_board(id, " Moodboard ").unwrap();
        assert_eq!(scene.active_board().name, "Moodboard");
        assert_eq!(scene.rename_board(99, "x"), Err(SceneError::BoardNotFound(99)));
    }

    #[test]
    fn test_ids_unique_across_boards() {
        let mut scene = Scene::new();
        let first = scene.active_board_id();
        let second = scene.add_board();
        let id = scene.allocate_id();
        scene
            .add_item(first, TextItem::new(id, Point::ZERO, "a").into(), None)
            .unwrap();
        let result = scene.add_item(second, TextItem::new(id, Point::ZERO, "b").into(), None);
        assert!(matches!(result, Err(SceneError::InvariantViolation(_))));
    }

    #[test]
    fn test_allocation_seeded_from_loaded_ids() {
        let json = r#"{"boards":[{"id":1,"name":"Board 1","items":[
            {"type":"image","id":40,"x":0,"y":0,"parentId":null,"src":"a","width":10,"height":10}
        ]}]}"#;
        let mut scene = Scene::from_json(json).unwrap();
        assert_eq!(scene.active_board_id(), 1);
        assert_eq!(scene.allocate_id(), 41);
    }

    #[test]
    fn test_allocation_skips_ids_freed_after_load() {
        let json = r#"{"boards":[{"id":1,"name":"A","items":[
            {"type":"image","id":3,"x":0,"y":0,"parentId":null,"src":"a","width":10,"height":10}
        ]},{"id":2,"name":"B","items":[
            {"type":"image","id":5,"x":0,"y":0,"parentId":null,"src":"b","width":10,"height":10}
        ]}]}"#;
        let mut scene = Scene::from_json(json).unwrap();
        scene.remove_items(&[5]);
        assert_eq!(scene.allocate_id(), 6);
    }

    #[test]
    fn test_restore_rejects_ids_held_by_other_board() {
        let mut scene = Scene::new();
        let first = scene.active_board_id();
        let second = scene.add_board();
        let id = scene.allocate_id();
        scene
            .add_item(second, TextItem::new(id, Point::ZERO, "b").into(), None)
            .unwrap();
        let snapshot = scene.board(second).unwrap().snapshot();

        let result = scene.restore_board(first, snapshot);
        assert!(matches!(result, Err(SceneError::InvariantViolation(_))));
        assert!(scene.board(first).unwrap().is_empty());
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_routing_and_remove() {
        let mut scene = Scene::new();
        let board = scene.active_board_id();
        let group = scene.allocate_id();
        scene
            .add_item(board, CanvasGroup::new(group, "G", Rect::new(0.0, 0.0, 200.0, 200.0)).into(), None)
            .unwrap();
        let image = scene.allocate_id();
        scene
            .add_item(board, ImageItem::new(image, Point::new(1.0, 1.0), "x", 50.0, 50.0).into(), Some(group))
            .unwrap();
        scene.move_item(image, Point::new(7.0, 8.0)).unwrap();
        assert_eq!(scene.find_item(image).unwrap().position(), Point::new(7.0, 8.0));

        scene.remove_items(&[group]);
        assert!(!scene.contains_id(image));
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let mut scene = Scene::new();
        let board = scene.active_board_id();
        let id = scene.allocate_id();
        scene
            .add_item(board, TextItem::new(id, Point::new(3.0, 4.0), "note").into(), None)
            .unwrap();
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"activeBoardId\""));
        let loaded = Scene::from_json(&json).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_empty_document_gets_default_board() {
        let scene = Scene::from_json(r#"{"boards":[]}"#).unwrap();
        assert_eq!(scene.boards().len(), 1);
    }
}
