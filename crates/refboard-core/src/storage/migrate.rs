//! Upgrading stored documents to the current board layout.
//!
//! Works on `serde_json::Value` so older layouts parse without extra types:
//! separate `refImages`/`refTexts` arrays, two-page tabs
//! (`pages` or `leftItems`/`rightItems`), and items without a `type`.
//! Items that break the scene invariants are dropped and reported.

use super::{StorageError, StorageResult};
use crate::board::Board;
use crate::items::{ItemId, SceneItem};
use crate::scene::{Scene, SceneError};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A migrated document and the repairs applied on the way.
#[derive(Debug, Clone)]
pub struct Migration {
    pub scene: Scene,
    /// One entry per dropped or rewritten item.
    pub repairs: Vec<String>,
}

const NUMERIC_FIELDS: [&str; 5] = ["x", "y", "width", "height", "fontSize"];

/// Read an id from a number or a numeric string.
fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Largest id anywhere in the tree.
fn max_id(value: &Value) -> u64 {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| {
                let own = if key == "id" { as_id(v).unwrap_or(0) } else { 0 };
                own.max(max_id(v))
            })
            .max()
            .unwrap_or(0),
        Value::Array(values) => values.iter().map(max_id).max().unwrap_or(0),
        _ => 0,
    }
}

struct Migrator {
    used: HashSet<u64>,
    next_id: u64,
    repairs: Vec<String>,
}

impl Migrator {
    fn new(root: &Value) -> Self {
        Self {
            used: HashSet::new(),
            next_id: max_id(root) + 1,
            repairs: Vec::new(),
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.used.insert(id);
        id
    }

    fn repair(&mut self, message: String) {
        log::warn!("{}", SceneError::InvariantViolation(message.clone()));
        self.repairs.push(message);
    }

    fn board(&mut self, index: usize, value: &Value, board_ids: &mut HashSet<u64>) -> Option<Board> {
        let Some(map) = value.as_object() else {
            self.repair(format!("board {index} is not an object"));
            return None;
        };

        let id = match map.get("id").and_then(as_id) {
            Some(id) if board_ids.insert(id) => id,
            _ => {
                let id = self.fresh_id();
                board_ids.insert(id);
                id
            }
        };
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Board {}", index + 1));

        let mut board = Board::new(id, name);
        let mut orphans = Vec::new();
        for raw in board_item_values(map) {
            let Some(item) = self.item(raw, None) else {
                continue;
            };
            let declared_parent = raw.get("parentId").and_then(as_id);
            match declared_parent {
                Some(parent) if !item.is_group() => orphans.push((parent, item)),
                _ => self.add_to_board(&mut board, item, None),
            }
        }

        // Flat layouts list children at top level with a parentId
        for (parent, item) in orphans {
            if board.group(parent).is_some() {
                self.add_to_board(&mut board, item, Some(parent));
            } else {
                self.repair(format!("item {} referenced missing group {parent}", item.id()));
                self.add_to_board(&mut board, item, None);
            }
        }
        Some(board)
    }

    fn add_to_board(&mut self, board: &mut Board, item: SceneItem, parent: Option<ItemId>) {
        let id = item.id();
        if let Err(e) = board.add_item(item, parent) {
            self.repair(format!("item {id} dropped: {e}"));
        }
    }

    /// Parse one item, assigning a fresh id when its own is missing or taken.
    fn item(&mut self, value: &Value, parent: Option<ItemId>) -> Option<SceneItem> {
        let Some(source) = value.as_object() else {
            self.repair("item is not an object".to_string());
            return None;
        };
        let mut map = source.clone();

        let kind = match map.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => match infer_type(&map) {
                Some(kind) => kind.to_string(),
                None => {
                    self.repair("item of unknown type dropped".to_string());
                    return None;
                }
            },
        };
        if kind == "canvas" && parent.is_some() {
            self.repair(format!("nested group inside group {parent:?} dropped"));
            return None;
        }
        map.insert("type".to_string(), Value::String(kind.clone()));

        let id = match map.get("id").and_then(as_id) {
            Some(id) if !self.used.contains(&id) => {
                self.used.insert(id);
                id
            }
            Some(id) => {
                self.repair(format!("duplicate item id {id} dropped"));
                return None;
            }
            None => self.fresh_id(),
        };
        map.insert("id".to_string(), Value::from(id));
        map.insert(
            "parentId".to_string(),
            parent.map(Value::from).unwrap_or(Value::Null),
        );
        normalize_numbers(&mut map);

        let children = match map.remove("items") {
            Some(Value::Array(children)) if kind == "canvas" => children,
            _ => Vec::new(),
        };

        let mut item: SceneItem = match serde_json::from_value(Value::Object(map)) {
            Ok(item) => item,
            Err(e) => {
                self.repair(format!("item {id} dropped: {e}"));
                return None;
            }
        };

        if let Some(group) = item.as_group_mut() {
            for child in &children {
                if let Some(child) = self.item(child, Some(id)) {
                    group.items.push(child);
                }
            }
        }
        Some(item)
    }
}

/// Item arrays of a board in any known layout.
fn board_item_values(board: &Map<String, Value>) -> Vec<&Value> {
    let mut values = Vec::new();
    if let Some(Value::Array(items)) = board.get("items") {
        values.extend(items);
    }
    if let Some(Value::Array(pages)) = board.get("pages") {
        for page in pages {
            let items = match page {
                Value::Array(items) => Some(items),
                Value::Object(page) => page.get("items").and_then(Value::as_array),
                _ => None,
            };
            values.extend(items.into_iter().flatten());
        }
    }
    for key in ["leftItems", "rightItems"] {
        if let Some(Value::Array(items)) = board.get(key) {
            values.extend(items);
        }
    }
    values
}

/// Infer a missing `type` discriminator from the fields present.
fn infer_type(map: &Map<String, Value>) -> Option<&'static str> {
    if map.contains_key("src") {
        Some("image")
    } else if map.contains_key("items") {
        Some("canvas")
    } else if map.contains_key("content") && map.get("width").is_some_and(Value::is_number) {
        Some("sticky")
    } else if map.contains_key("content") {
        Some("text")
    } else {
        None
    }
}

/// Coerce numeric strings to numbers and drop values that are neither,
/// leaving the field to its default.
fn normalize_numbers(map: &mut Map<String, Value>) {
    for key in NUMERIC_FIELDS {
        let replacement = match map.get(key) {
            None | Some(Value::Number(_)) => continue,
            Some(Value::String(s)) => s
                .trim()
                .trim_end_matches("px")
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from),
            Some(_) => None,
        };
        match replacement {
            Some(value) => {
                map.insert(key.to_string(), value);
            }
            None => {
                map.remove(key);
            }
        }
    }
}

/// Migrate a stored document of any known layout to a [`Scene`].
pub fn migrate_document(root: &Value) -> StorageResult<Migration> {
    let (boards, active) = match root {
        Value::Object(map) => {
            let boards = map
                .get("boards")
                .or_else(|| map.get("tabs"))
                .and_then(Value::as_array)
                .ok_or_else(|| StorageError::Corrupt("document has no boards".to_string()))?;
            let active = map
                .get("activeBoardId")
                .or_else(|| map.get("activeTabId"))
                .and_then(as_id);
            (boards, active)
        }
        Value::Array(boards) => (boards, None),
        _ => return Err(StorageError::Corrupt("document is not an object".to_string())),
    };

    let mut migrator = Migrator::new(root);
    let mut board_ids = HashSet::new();
    let boards: Vec<Board> = boards
        .iter()
        .enumerate()
        .filter_map(|(index, value)| migrator.board(index, value, &mut board_ids))
        .collect();

    let scene = Scene::from_boards(boards, active);
    Ok(Migration {
        scene,
        repairs: migrator.repairs,
    })
}

/// Build a document from the first panel layout, which stored images and
/// texts as two separate arrays.
pub fn migrate_legacy(images: Option<&str>, texts: Option<&str>) -> StorageResult<Migration> {
    let mut items = Vec::new();
    for (json, kind) in [(images, "image"), (texts, "text")] {
        let Some(json) = json else {
            continue;
        };
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StorageError::Corrupt(format!("legacy {kind} list: {e}")))?;
        let Value::Array(list) = value else {
            return Err(StorageError::Corrupt(format!("legacy {kind} list is not an array")));
        };
        for mut item in list {
            if let Value::Object(map) = &mut item {
                map.insert("type".to_string(), Value::String(kind.to_string()));
            }
            items.push(item);
        }
    }
    let root = serde_json::json!({ "boards": [{ "name": "Board 1", "items": items }] });
    migrate_document(&root)
}
