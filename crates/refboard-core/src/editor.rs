//! Interaction controller.
//!
//! The [`Editor`] owns the document and everything that is only meaningful
//! while editing it: viewport, selection, current tool, per-board undo
//! history and clipboard. Hosts feed it pointer, wheel and key events in
//! client coordinates and render from its accessors.

use crate::align::{AlignMode, DistributeMode, align_items, distribute_items};
use crate::board::{Board, BoardId, Snapshot};
use crate::camera::{Viewport, world_to_local};
use crate::config::EditorConfig;
use crate::history::History;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent, is_space};
use crate::items::{
    CanvasGroup, ImageFormat, ImageItem, ItemId, ItemKind, ItemPatch, SceneItem, StickyNote, TextItem,
};
use crate::scene::Scene;
use crate::selection::{
    Corner, Handle, Selection, corner_handles, group_at_point, hit_test_handles, items_in_rect,
    resize_from_corner, topmost_item_at,
};
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::tools::{ToolKind, ToolManager};
use crate::upload::{PendingUpload, UploadResult, to_data_url};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;
use std::fmt::Display;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A short user-facing message the host may show once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What the pointer is currently doing.
///
/// Points are in world coordinates except for panning, which tracks the
/// last screen position.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    DraggingItem {
        item_id: ItemId,
        last: Point,
        moved: bool,
    },
    ResizingItem {
        item_id: ItemId,
        corner: Corner,
        start: Point,
        /// Frame at gesture start, in the item's own coordinate frame.
        original: Rect,
        aspect: Option<f64>,
    },
    DrawingSelectionBox {
        start: Point,
        current: Point,
        /// Toggle hits instead of replacing the selection.
        toggle: bool,
        /// Create a canvas group from the box instead of selecting.
        creates_group: bool,
    },
    EditingText {
        item_id: ItemId,
    },
}

/// Editor state around a [`Scene`].
pub struct Editor {
    scene: Scene,
    viewport: Viewport,
    config: EditorConfig,
    tools: ToolManager,
    selection: Selection,
    input: InputState,
    state: InteractionState,
    /// Undo history per board, created when a board is first activated.
    histories: HashMap<BoardId, History>,
    /// Copied items in absolute coordinates.
    clipboard: Vec<SceneItem>,
    paste_count: u32,
    /// Client position of the canvas' top-left corner.
    canvas_origin: Point,
    /// Bumped on every document change.
    revision: u64,
    notice: Option<Notice>,
    asset_deletions: Vec<ItemId>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Scene::new(), EditorConfig::default())
    }
}

impl Editor {
    pub fn new(scene: Scene, config: EditorConfig) -> Self {
        let viewport = Viewport::with_zoom_range(config.min_zoom, config.max_zoom);
        let mut editor = Self {
            scene,
            viewport,
            config,
            tools: ToolManager::new(),
            selection: Selection::new(),
            input: InputState::new(),
            state: InteractionState::Idle,
            histories: HashMap::new(),
            clipboard: Vec::new(),
            paste_count: 0,
            canvas_origin: Point::ZERO,
            revision: 0,
            notice: None,
            asset_deletions: Vec::new(),
        };
        editor.history_mut();
        editor
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn active_board(&self) -> &Board {
        self.scene.active_board()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Document revision, for change detection and auto-save.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The text item being edited, if any.
    pub fn editing_item(&self) -> Option<ItemId> {
        match self.state {
            InteractionState::EditingText { item_id } => Some(item_id),
            _ => None,
        }
    }

    /// The rubber band or canvas frame being drawn, in world coordinates.
    pub fn selection_box(&self) -> Option<Rect> {
        match self.state {
            InteractionState::DrawingSelectionBox { start, current, .. } => {
                Some(Rect::from_points(start, current))
            }
            _ => None,
        }
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Take the ids of removed images whose uploaded assets can be deleted.
    pub fn take_asset_deletions(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.asset_deletions)
    }

    pub fn can_undo(&self) -> bool {
        self.histories
            .get(&self.scene.active_board_id())
            .is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.histories
            .get(&self.scene.active_board_id())
            .is_some_and(History::can_redo)
    }

    fn history_mut(&mut self) -> &mut History {
        let board = self.scene.active_board();
        let (board_id, snapshot) = (board.id, board.snapshot());
        let capacity = self.config.history_capacity;
        self.histories
            .entry(board_id)
            .or_insert_with(|| History::seeded(snapshot, capacity))
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Close a gesture: record the active board in its history.
    fn commit(&mut self) {
        let snapshot = self.scene.active_board().snapshot();
        self.history_mut().record(snapshot);
        self.touch();
    }

    fn report(&mut self, context: &str, error: impl Display) {
        log::warn!("{context}: {error}");
        self.notice = Some(Notice {
            level: NoticeLevel::Warning,
            message: format!("{context}: {error}"),
        });
    }

    // Coordinates

    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas_origin = origin;
    }

    fn to_screen(&self, client: Point) -> Point {
        client - self.canvas_origin.to_vec2()
    }

    pub fn client_to_world(&self, client: Point) -> Point {
        self.viewport.screen_to_world(self.to_screen(client))
    }

    fn screen_rect(&self, world: Rect) -> Rect {
        Rect::from_points(
            self.viewport.world_to_screen(Point::new(world.x0, world.y0)),
            self.viewport.world_to_screen(Point::new(world.x1, world.y1)),
        )
    }

    /// Parent group and local position for an item placed at `world`.
    fn placement(&self, world: Point) -> (Option<ItemId>, Point) {
        let board = self.scene.active_board();
        match group_at_point(board, world, None) {
            Some(group_id) => {
                let origin = board.frame_origin(Some(group_id)).unwrap_or(Vec2::ZERO);
                (Some(group_id), world_to_local(world, origin))
            }
            None => (None, world),
        }
    }

    // Pointer

    /// Process a pointer event from the host.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        self.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            PointerEvent::Wheel {
                position,
                delta,
                modifiers,
            } => self.wheel(position, delta, modifiers),
        }
    }

    fn pointer_down(&mut self, client: Point, button: MouseButton, modifiers: Modifiers) {
        let screen = self.to_screen(client);
        let world = self.viewport.screen_to_world(screen);

        if button != MouseButton::Left || self.input.is_space_held() {
            self.state = InteractionState::Panning { last: screen };
            return;
        }

        let hit = topmost_item_at(self.scene.active_board(), world);

        // Clicking the item being edited keeps editing
        if let InteractionState::EditingText { item_id } = self.state {
            if hit == Some(item_id) {
                return;
            }
            self.finish_text_edit();
        }

        if self.input.is_double_click() {
            match hit {
                Some(id) if self.scene.find_item(id).is_some_and(SceneItem::is_editable) => {
                    self.begin_text_edit(id);
                    return;
                }
                None if self.tools.current_tool == ToolKind::Select => {
                    self.create_text(world, TextItem::PLACEHOLDER);
                    return;
                }
                _ => {}
            }
        }

        match self.tools.current_tool {
            ToolKind::Text => {
                let editable = hit.filter(|&id| self.scene.find_item(id).is_some_and(SceneItem::is_editable));
                match editable {
                    Some(id) => {
                        self.begin_text_edit(id);
                        self.tools.finish_use();
                    }
                    None => self.create_text(world, ""),
                }
                return;
            }
            ToolKind::CanvasGroup => {
                self.state = InteractionState::DrawingSelectionBox {
                    start: world,
                    current: world,
                    toggle: false,
                    creates_group: true,
                };
                return;
            }
            _ => {}
        }

        if let Some((item_id, corner)) = self.handle_at(screen) {
            self.begin_resize(item_id, corner, world);
            return;
        }

        match hit {
            Some(id) if modifiers.toggles_selection() => self.selection.toggle(id),
            Some(id) => {
                if !self.selection.contains(id) {
                    self.selection.select_only(id);
                }
                self.state = InteractionState::DraggingItem {
                    item_id: id,
                    last: world,
                    moved: false,
                };
            }
            None => {
                self.state = InteractionState::DrawingSelectionBox {
                    start: world,
                    current: world,
                    toggle: modifiers.toggles_selection(),
                    creates_group: false,
                };
            }
        }
    }

    fn pointer_move(&mut self, client: Point) {
        let screen = self.to_screen(client);
        let world = self.viewport.screen_to_world(screen);

        match self.state.clone() {
            InteractionState::Panning { last } => {
                self.viewport.pan(screen - last);
                self.state = InteractionState::Panning { last: screen };
            }
            InteractionState::DraggingItem { item_id, last, .. } => {
                let delta = world - last;
                if delta == Vec2::ZERO {
                    return;
                }
                let targets = self.drag_targets();
                let board_id = self.scene.active_board_id();
                if let Ok(board) = self.scene.board_mut(board_id) {
                    board.translate_items(&targets, delta);
                }
                self.state = InteractionState::DraggingItem {
                    item_id,
                    last: world,
                    moved: true,
                };
                self.touch();
            }
            InteractionState::ResizingItem {
                item_id,
                corner,
                start,
                original,
                aspect,
            } => {
                let min = self.min_size(item_id);
                let frame = resize_from_corner(original, corner, world - start, min, aspect);
                if let Err(e) = self.scene.update_item(item_id, &ItemPatch::frame(frame)) {
                    log::warn!("Resize of {item_id} aborted: {e}");
                    self.state = InteractionState::Idle;
                    return;
                }
                self.touch();
            }
            InteractionState::DrawingSelectionBox {
                start,
                toggle,
                creates_group,
                ..
            } => {
                self.state = InteractionState::DrawingSelectionBox {
                    start,
                    current: world,
                    toggle,
                    creates_group,
                };
            }
            InteractionState::Idle | InteractionState::EditingText { .. } => {}
        }
    }

    fn pointer_up(&mut self, client: Point) {
        let world = self.client_to_world(client);
        match std::mem::take(&mut self.state) {
            InteractionState::Idle | InteractionState::Panning { .. } => {}
            InteractionState::DraggingItem { moved, .. } => {
                if moved {
                    self.reparent_dropped();
                    self.commit();
                }
            }
            InteractionState::ResizingItem { .. } => self.commit(),
            InteractionState::DrawingSelectionBox {
                start,
                toggle,
                creates_group,
                ..
            } => {
                let rect = Rect::from_points(start, world);
                if creates_group {
                    self.create_group(rect);
                } else {
                    let hits = items_in_rect(self.scene.active_board(), rect);
                    if toggle {
                        self.selection.toggle_all(hits);
                    } else {
                        self.selection.replace_with(hits);
                    }
                }
            }
            state @ InteractionState::EditingText { .. } => self.state = state,
        }
    }

    fn wheel(&mut self, client: Point, delta: Vec2, modifiers: Modifiers) {
        let screen = self.to_screen(client);
        if modifiers.command() {
            if delta.y == 0.0 {
                return;
            }
            let step = if delta.y > 0.0 {
                -self.config.wheel_zoom_step
            } else {
                self.config.wheel_zoom_step
            };
            self.viewport.zoom_to_at(screen, self.viewport.zoom + step);
        } else {
            self.viewport.pan(Vec2::new(0.0, -delta.y));
        }
    }

    /// Selected items that move together: unlocked, and not inside a group
    /// that is itself selected.
    fn drag_targets(&self) -> Vec<ItemId> {
        let board = self.scene.active_board();
        self.selection
            .iter()
            .filter(|&id| match board.find_flat(id) {
                Some(flat) => {
                    !flat.is_locked() && !flat.parent.is_some_and(|g| self.selection.contains(g.id))
                }
                None => false,
            })
            .collect()
    }

    /// Move dropped text and images into the group under their center, or
    /// out to the top level.
    fn reparent_dropped(&mut self) {
        let moves: Vec<(ItemId, Option<ItemId>, Option<ItemId>)> = {
            let board = self.scene.active_board();
            self.drag_targets()
                .into_iter()
                .filter_map(|id| {
                    let flat = board.find_flat(id)?;
                    if !matches!(flat.item.kind(), ItemKind::Text | ItemKind::Image) {
                        return None;
                    }
                    let target = group_at_point(board, flat.world_bounds().center(), None);
                    let current = flat.item.parent_id();
                    (target != current).then_some((id, current, target))
                })
                .collect()
        };
        for (id, from, to) in moves {
            match self.scene.reparent(id, from, to) {
                Ok(()) => log::debug!("Moved item {id} from {from:?} to {to:?}"),
                Err(e) => log::warn!("Could not reparent item {id}: {e}"),
            }
        }
    }

    fn min_size(&self, id: ItemId) -> Size {
        match self.scene.find_item(id).map(SceneItem::kind) {
            Some(ItemKind::Image) => self.config.min_image_size,
            _ => self.config.min_frame_size,
        }
    }

    /// Corner handle of the single selected item under `screen`.
    fn handle_at(&self, screen: Point) -> Option<(ItemId, Corner)> {
        let id = self.selection.single()?;
        let flat = self.scene.active_board().find_flat(id)?;
        if !flat.item.is_resizable() || flat.is_locked() {
            return None;
        }
        let bounds = self.screen_rect(flat.world_bounds());
        hit_test_handles(bounds, screen, self.config.handle_tolerance).map(|corner| (id, corner))
    }

    /// Resize handles of the selected item, in screen coordinates.
    pub fn handles(&self) -> Vec<Handle> {
        let Some(flat) = self
            .selection
            .single()
            .and_then(|id| self.scene.active_board().find_flat(id))
        else {
            return Vec::new();
        };
        if !flat.item.is_resizable() || flat.is_locked() {
            return Vec::new();
        }
        corner_handles(self.screen_rect(flat.world_bounds()))
    }

    fn begin_resize(&mut self, item_id: ItemId, corner: Corner, world: Point) {
        let Some(item) = self.scene.find_item(item_id) else {
            return;
        };
        let Some(size) = item.size() else {
            return;
        };
        let aspect = match item {
            SceneItem::Image(image) => image.aspect_ratio(),
            _ => None,
        };
        self.state = InteractionState::ResizingItem {
            item_id,
            corner,
            start: world,
            original: Rect::from_origin_size(item.position(), size),
            aspect,
        };
    }

    // Creation

    fn create_text(&mut self, world: Point, content: &str) {
        let (parent, position) = self.placement(world);
        let id = self.scene.allocate_id();
        let mut text = TextItem::new(id, position, content);
        text.font_size = self.config.default_font_size;
        text.color = self.config.default_text_color.clone();

        let board_id = self.scene.active_board_id();
        match self.scene.add_item(board_id, text.into(), parent) {
            Ok(id) => {
                self.selection.select_only(id);
                self.state = InteractionState::EditingText { item_id: id };
                self.tools.finish_use();
                self.touch();
            }
            Err(e) => self.report("Could not add text", e),
        }
    }

    fn create_group(&mut self, rect: Rect) {
        self.tools.finish_use();
        let min = self.config.min_frame_size;
        if rect.width() < min.width || rect.height() < min.height {
            log::debug!("Canvas frame {rect:?} below minimum size, ignored");
            return;
        }
        let board = self.scene.active_board();
        let board_id = board.id;
        let count = board.items().iter().filter(|item| item.is_group()).count();

        let id = self.scene.allocate_id();
        let mut group = CanvasGroup::new(id, format!("Canvas {}", count + 1), rect);
        group.background_color = self.config.default_group_background.clone();
        match self.scene.add_item(board_id, group.into(), None) {
            Ok(id) => {
                self.selection.select_only(id);
                self.commit();
            }
            Err(e) => self.report("Could not add canvas", e),
        }
    }

    /// Add a sticky note with the configured size and color at `world`.
    pub fn add_sticky(&mut self, world: Point) -> Option<ItemId> {
        let size = self.config.default_sticky_size;
        let id = self.scene.allocate_id();
        let sticky = StickyNote::new(id, world, size.width, size.height)
            .with_color(self.config.default_sticky_color.clone());
        let board_id = self.scene.active_board_id();
        match self.scene.add_item(board_id, sticky.into(), None) {
            Ok(id) => {
                self.selection.select_only(id);
                self.commit();
                Some(id)
            }
            Err(e) => {
                self.report("Could not add sticky note", e);
                None
            }
        }
    }

    /// Update an item's properties as one undoable step.
    pub fn update_item(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        match self.scene.update_item(id, patch) {
            Ok(()) => {
                self.commit();
                true
            }
            Err(e) => {
                self.report("Could not update item", e);
                false
            }
        }
    }

    // Text editing

    /// Start editing a text item or sticky note on the active board.
    pub fn begin_text_edit(&mut self, id: ItemId) -> bool {
        if !self.scene.active_board().find(id).is_some_and(SceneItem::is_editable) {
            return false;
        }
        if self.editing_item() != Some(id) {
            self.finish_text_edit();
        }
        self.selection.select_only(id);
        self.state = InteractionState::EditingText { item_id: id };
        true
    }

    /// Replace the content of the item being edited.
    pub fn set_text_content(&mut self, content: &str) -> bool {
        let Some(item_id) = self.editing_item() else {
            return false;
        };
        match self.scene.update_item(item_id, &ItemPatch::content(content)) {
            Ok(()) => {
                self.touch();
                true
            }
            Err(e) => {
                log::warn!("Text edit of {item_id} failed: {e}");
                false
            }
        }
    }

    /// End text editing. A text item left blank is removed.
    pub fn finish_text_edit(&mut self) {
        let Some(item_id) = self.editing_item() else {
            return;
        };
        self.state = InteractionState::Idle;
        let blank = matches!(self.scene.find_item(item_id), Some(SceneItem::Text(text)) if text.is_blank());
        if blank {
            self.scene.remove_items(&[item_id]);
            self.selection.remove(item_id);
            log::debug!("Removed empty text {item_id}");
        }
        self.commit();
    }

    // Keyboard and commands

    /// Process a key event. Returns whether it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match event {
            KeyEvent::Released(key) => {
                self.input.handle_key_event(event);
                if is_space(key) && matches!(self.state, InteractionState::Panning { .. }) {
                    self.state = InteractionState::Idle;
                    return true;
                }
                false
            }
            KeyEvent::Pressed(press) => {
                if !press.text_field_focused {
                    self.input.handle_key_event(event);
                    if is_space(&press.key) {
                        return true;
                    }
                }
                match ShortcutRegistry::resolve(press) {
                    Some(command) => {
                        self.execute(command);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn execute(&mut self, command: Command) {
        log::trace!("Executing {command:?}");
        match command {
            Command::SetTool(tool) => self.set_tool(tool),
            Command::DeleteSelection => {
                self.delete_selection();
            }
            Command::Escape => self.escape(),
            Command::SelectAll => self.select_all(),
            Command::Copy => self.copy_selection(),
            Command::Paste => {
                self.paste();
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ZoomReset => self.viewport.reset(),
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.finish_text_edit();
        if matches!(self.state, InteractionState::DrawingSelectionBox { .. }) {
            self.state = InteractionState::Idle;
        }
        self.tools.set_tool(tool);
    }

    /// Leave text editing and any gesture, clear the selection and return
    /// to the select tool.
    pub fn escape(&mut self) {
        self.finish_text_edit();
        self.state = InteractionState::Idle;
        self.selection.clear();
        self.tools.set_tool(ToolKind::Select);
    }

    /// Select every unlocked item on the active board, children included.
    pub fn select_all(&mut self) {
        let ids: Vec<ItemId> = self
            .scene
            .active_board()
            .items_flat()
            .into_iter()
            .filter(|f| !f.is_locked())
            .map(|f| f.item.id())
            .collect();
        self.selection.replace_with(ids);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.set_zoom(self.viewport.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.set_zoom(self.viewport.zoom - self.config.zoom_step);
    }

    // Deletion

    pub fn delete_selection(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        self.delete_items(&ids)
    }

    pub fn delete_item(&mut self, id: ItemId) -> bool {
        self.delete_items(&[id])
    }

    fn delete_items(&mut self, ids: &[ItemId]) -> bool {
        let board_id = self.scene.active_board_id();
        let targets: Vec<ItemId> = {
            let board = self.scene.active_board();
            ids.iter()
                .copied()
                .filter(|&id| {
                    board
                        .find_flat(id)
                        .is_some_and(|f| !f.parent.is_some_and(|g| g.locked))
                })
                .collect()
        };
        if targets.is_empty() {
            return false;
        }
        if let Some(item_id) = self.editing_item() {
            if targets.contains(&item_id) {
                self.state = InteractionState::Idle;
            }
        }
        let removed = match self.scene.board_mut(board_id) {
            Ok(board) => board.remove_items(&targets),
            Err(_) => Vec::new(),
        };
        if removed.is_empty() {
            return false;
        }
        log::debug!("Deleted {} items", removed.len());
        self.queue_asset_deletions(&removed);
        let board = self.scene.active_board();
        self.selection.retain(|id| board.contains(*id));
        self.commit();
        true
    }

    fn queue_asset_deletions(&mut self, removed: &[SceneItem]) {
        for item in removed {
            match item {
                SceneItem::Image(image) if !image.is_inline() => self.asset_deletions.push(image.id),
                SceneItem::Canvas(group) => self.queue_asset_deletions(&group.items),
                _ => {}
            }
        }
    }

    // Clipboard

    /// Copy the selection. Items are stored in absolute coordinates without
    /// a parent; children of a selected group travel with the group.
    pub fn copy_selection(&mut self) {
        let board = self.scene.active_board();
        let clipboard: Vec<SceneItem> = self
            .selection
            .iter()
            .filter_map(|id| board.find_flat(id))
            .filter(|f| !f.parent.is_some_and(|g| self.selection.contains(g.id)))
            .map(|f| {
                let mut item = f.item.clone();
                item.set_position(f.world_position());
                item.set_parent_id(None);
                item
            })
            .collect();
        if clipboard.is_empty() {
            return;
        }
        log::debug!("Copied {} items", clipboard.len());
        self.clipboard = clipboard;
        self.paste_count = 0;
    }

    pub fn has_clipboard(&self) -> bool {
        !self.clipboard.is_empty()
    }

    /// Paste the clipboard onto the active board at the top level with
    /// fresh ids. Each paste since the last copy moves one offset further.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        self.finish_text_edit();
        self.paste_count += 1;
        let offset = self.config.paste_offset * f64::from(self.paste_count);
        let board_id = self.scene.active_board_id();

        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for mut item in self.clipboard.clone() {
            self.assign_fresh_ids(&mut item);
            item.translate(offset);
            match self.scene.add_item(board_id, item, None) {
                Ok(id) => pasted.push(id),
                Err(e) => log::warn!("Skipping pasted item: {e}"),
            }
        }
        if pasted.is_empty() {
            return false;
        }
        self.selection.replace_with(pasted);
        self.commit();
        true
    }

    fn assign_fresh_ids(&mut self, item: &mut SceneItem) {
        item.set_id(self.scene.allocate_id());
        if let Some(group) = item.as_group_mut() {
            for child in &mut group.items {
                child.set_id(self.scene.allocate_id());
            }
        }
    }

    // History

    pub fn undo(&mut self) -> bool {
        self.finish_text_edit();
        let snapshot = self.history_mut().undo();
        self.apply_snapshot(snapshot)
    }

    pub fn redo(&mut self) -> bool {
        self.finish_text_edit();
        let snapshot = self.history_mut().redo();
        self.apply_snapshot(snapshot)
    }

    fn apply_snapshot(&mut self, snapshot: Option<Snapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        let board_id = self.scene.active_board_id();
        if let Err(e) = self.scene.restore_board(board_id, snapshot) {
            self.report("Could not restore board", e);
            return false;
        }
        self.state = InteractionState::Idle;
        let board = self.scene.active_board();
        self.selection.retain(|id| board.contains(*id));
        self.touch();
        true
    }

    // Boards

    /// Add a board and switch to it.
    pub fn add_board(&mut self) -> BoardId {
        let id = self.scene.add_board();
        self.switch_board(id);
        id
    }

    pub fn switch_board(&mut self, id: BoardId) -> bool {
        if id == self.scene.active_board_id() {
            return true;
        }
        self.finish_text_edit();
        if let Err(e) = self.scene.set_active_board(id) {
            self.report("Could not switch board", e);
            return false;
        }
        self.state = InteractionState::Idle;
        self.selection.clear();
        self.history_mut();
        self.touch();
        log::info!("Switched to board {id}");
        true
    }

    pub fn remove_board(&mut self, id: BoardId) -> bool {
        let was_active = id == self.scene.active_board_id();
        if was_active && self.scene.boards().len() > 1 {
            self.finish_text_edit();
        }
        match self.scene.remove_board(id) {
            Ok(board) => {
                self.histories.remove(&id);
                self.queue_asset_deletions(board.items());
                if was_active {
                    self.state = InteractionState::Idle;
                    self.selection.clear();
                    self.history_mut();
                }
                self.touch();
                true
            }
            Err(e) => {
                self.report("Could not delete board", e);
                false
            }
        }
    }

    pub fn rename_board(&mut self, id: BoardId, name: &str) -> bool {
        match self.scene.rename_board(id, name) {
            Ok(()) => {
                self.touch();
                true
            }
            Err(e) => {
                self.report("Could not rename board", e);
                false
            }
        }
    }

    // Groups

    /// Lock or unlock a canvas group. Locking drops the group and its
    /// children from the selection.
    pub fn toggle_lock(&mut self, group_id: ItemId) -> bool {
        let Some(locked) = self
            .scene
            .find_item(group_id)
            .and_then(SceneItem::as_group)
            .map(|g| g.locked)
        else {
            return false;
        };
        let ids = self.scene.find_item(group_id).map(SceneItem::ids).unwrap_or_default();
        if !locked && self.editing_item().is_some_and(|id| ids.contains(&id)) {
            self.finish_text_edit();
        }
        if let Err(e) = self.scene.update_item(group_id, &ItemPatch::locked(!locked)) {
            self.report("Could not lock canvas", e);
            return false;
        }
        if !locked {
            self.selection.retain(|id| !ids.contains(id));
        }
        self.commit();
        true
    }

    pub fn align_selection(&mut self, mode: AlignMode) -> bool {
        let ids = self.selection.ids().to_vec();
        let board_id = self.scene.active_board_id();
        let changed = self
            .scene
            .board_mut(board_id)
            .is_ok_and(|board| align_items(board, &ids, mode));
        if changed {
            self.commit();
        }
        changed
    }

    pub fn distribute_selection(&mut self, mode: DistributeMode) -> bool {
        let ids = self.selection.ids().to_vec();
        let board_id = self.scene.active_board_id();
        let changed = self
            .scene
            .board_mut(board_id)
            .is_ok_and(|board| distribute_items(board, &ids, mode));
        if changed {
            self.commit();
        }
        changed
    }

    // Images

    /// Insert a pasted image near the top-left of the view.
    ///
    /// The image shows inline data until [`Editor::finish_upload`] swaps in
    /// the uploaded URL.
    pub fn paste_image(&mut self, data: Vec<u8>) -> Option<PendingUpload> {
        let world = self.viewport.screen_to_world(Point::new(50.0, 50.0));
        let pending = self.insert_image(data, world)?;
        self.selection.select_only(pending.item_id);
        self.commit();
        Some(pending)
    }

    /// Insert dropped or picked image files, cascading from the top-left of
    /// the view. Unsupported files are skipped.
    pub fn import_images(&mut self, files: Vec<Vec<u8>>) -> Vec<PendingUpload> {
        let mut pending = Vec::new();
        for (index, data) in files.into_iter().enumerate() {
            let offset = 20.0 + index as f64 * 20.0;
            let world = self.viewport.screen_to_world(Point::new(offset, offset));
            pending.extend(self.insert_image(data, world));
        }
        if !pending.is_empty() {
            self.selection.replace_with(pending.iter().map(|p| p.item_id));
            self.commit();
        }
        pending
    }

    fn insert_image(&mut self, data: Vec<u8>, world: Point) -> Option<PendingUpload> {
        let Some(format) = ImageFormat::from_magic_bytes(&data) else {
            self.report("Could not add image", "unsupported image format");
            return None;
        };
        let board_id = self.scene.active_board_id();
        let id = self.scene.allocate_id();
        let size = self.config.default_image_size;
        let image = ImageItem::new(id, world, to_data_url(&data, format), size.width, size.height);
        match self.scene.add_item(board_id, image.into(), None) {
            Ok(item_id) => Some(PendingUpload {
                board_id,
                item_id,
                format,
                data,
            }),
            Err(e) => {
                self.report("Could not add image", e);
                None
            }
        }
    }

    /// Apply the outcome of an image upload. On success the image's source
    /// is replaced with the durable URL; this is not an undo step.
    pub fn finish_upload(&mut self, item_id: ItemId, result: UploadResult<String>) -> bool {
        match result {
            Ok(url) => {
                if !matches!(self.scene.find_item(item_id), Some(SceneItem::Image(_))) {
                    log::debug!("Uploaded image {item_id} was removed meanwhile");
                    self.asset_deletions.push(item_id);
                    return false;
                }
                match self.scene.update_item(item_id, &ItemPatch::src(url)) {
                    Ok(()) => {
                        self.touch();
                        true
                    }
                    Err(e) => {
                        log::warn!("Could not store upload of {item_id}: {e}");
                        false
                    }
                }
            }
            Err(e) => {
                self.report("Image upload failed, keeping the local copy", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyPress;
    use crate::upload::{MemoryUploader, UploadError};

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn editor_with(items: Vec<(SceneItem, Option<ItemId>)>) -> Editor {
        let mut scene = Scene::new();
        for (item, parent) in items {
            scene.add_item(1, item, parent).unwrap();
        }
        Editor::new(scene, EditorConfig::default())
    }

    fn image(id: ItemId, x: f64, y: f64, w: f64, h: f64) -> SceneItem {
        ImageItem::new(id, Point::new(x, y), "https://example.com/a.png", w, h).into()
    }

    fn group(id: ItemId, rect: Rect) -> SceneItem {
        CanvasGroup::new(id, "G", rect).into()
    }

    fn down_with(editor: &mut Editor, x: f64, y: f64, modifiers: Modifiers) {
        editor.handle_pointer(&PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers,
        });
    }

    fn down(editor: &mut Editor, x: f64, y: f64) {
        down_with(editor, x, y, Modifiers::NONE);
    }

    fn move_to(editor: &mut Editor, x: f64, y: f64) {
        editor.handle_pointer(&PointerEvent::Move {
            position: Point::new(x, y),
        });
    }

    fn up(editor: &mut Editor, x: f64, y: f64) {
        editor.handle_pointer(&PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        down(editor, from.0, from.1);
        move_to(editor, to.0, to.1);
        up(editor, to.0, to.1);
    }

    fn key(editor: &mut Editor, key: &str, modifiers: Modifiers) -> bool {
        editor.handle_key(&KeyEvent::Pressed(KeyPress::new(key).with_modifiers(modifiers)))
    }

    fn position(editor: &Editor, id: ItemId) -> Point {
        editor.scene().find_item(id).unwrap().position()
    }

    #[test]
    fn test_drag_moves_item_and_undo_restores() {
        let mut editor = editor_with(vec![(image(10, 100.0, 100.0, 100.0, 100.0), None)]);
        let revision = editor.revision();

        drag(&mut editor, (150.0, 150.0), (200.0, 170.0));

        assert_eq!(editor.selection().ids(), &[10]);
        assert_eq!(position(&editor, 10), Point::new(150.0, 120.0));
        assert!(editor.revision() > revision);
        assert!(editor.can_undo());

        assert!(editor.undo());
        assert_eq!(position(&editor, 10), Point::new(100.0, 100.0));
        assert!(editor.redo());
        assert_eq!(position(&editor, 10), Point::new(150.0, 120.0));
    }

    #[test]
    fn test_drag_group_moves_children_once() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(0.0, 0.0, 400.0, 400.0)), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);
        editor.execute(Command::SelectAll);
        assert_eq!(editor.selection().len(), 2);

        drag(&mut editor, (50.0, 50.0), (60.0, 60.0));

        assert_eq!(position(&editor, 10), Point::new(10.0, 10.0));
        assert_eq!(position(&editor, 11), Point::new(20.0, 20.0));
        assert_eq!(editor.scene().find_item(11).unwrap().parent_id(), Some(10));
    }

    #[test]
    fn test_rubber_band_replace_and_toggle() {
        let mut editor = editor_with(vec![
            (image(10, 0.0, 0.0, 100.0, 100.0), None),
            (image(11, 300.0, 0.0, 100.0, 100.0), None),
        ]);

        drag(&mut editor, (-50.0, -50.0), (150.0, 150.0));
        assert_eq!(editor.selection().ids(), &[10]);
        assert_eq!(editor.selection_box(), None);

        down_with(&mut editor, 250.0, -50.0, Modifiers::shift());
        move_to(&mut editor, 450.0, 50.0);
        assert_eq!(
            editor.selection_box(),
            Some(Rect::new(250.0, -50.0, 450.0, 50.0))
        );
        up(&mut editor, 450.0, 50.0);
        assert_eq!(editor.selection().ids(), &[10, 11]);

        // Clicking empty canvas clears
        drag(&mut editor, (700.0, 700.0), (700.0, 700.0));
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_locked_group_rejects_selection() {
        let mut locked = CanvasGroup::new(10, "Locked", Rect::new(0.0, 0.0, 400.0, 400.0));
        locked.locked = true;
        let mut editor = editor_with(vec![
            (locked.into(), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);

        drag(&mut editor, (50.0, 50.0), (80.0, 80.0));
        assert!(editor.selection().is_empty());
        assert_eq!(position(&editor, 11), Point::new(20.0, 20.0));

        editor.execute(Command::SelectAll);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_canvas_tool_creates_group() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::CanvasGroup);
        drag(&mut editor, (0.0, 0.0), (200.0, 150.0));

        let board = editor.active_board();
        assert_eq!(board.items().len(), 1);
        let created = board.items()[0].as_group().unwrap();
        assert_eq!(created.name, "Canvas 1");
        assert_eq!((created.width, created.height), (200.0, 150.0));
        assert_eq!(editor.selection().ids(), &[created.id]);
        assert_eq!(editor.tool(), ToolKind::Select);

        // Too small: nothing created, tool still reverts
        editor.set_tool(ToolKind::CanvasGroup);
        drag(&mut editor, (500.0, 500.0), (520.0, 520.0));
        assert_eq!(editor.active_board().items().len(), 1);
        assert_eq!(editor.tool(), ToolKind::Select);
    }

    #[test]
    fn test_text_tool_discards_empty_text() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Text);
        down(&mut editor, 10.0, 10.0);
        up(&mut editor, 10.0, 10.0);

        let id = editor.editing_item().unwrap();
        assert_eq!(editor.scene().find_item(id).unwrap().content(), Some(""));
        assert_eq!(editor.tool(), ToolKind::Select);

        let consumed = editor.handle_key(&KeyEvent::Pressed(KeyPress::new("Escape").in_text_field()));
        assert!(consumed);
        assert_eq!(editor.editing_item(), None);
        assert!(editor.active_board().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_text_edit_commits_content() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Text);
        down(&mut editor, 10.0, 10.0);
        let id = editor.editing_item().unwrap();

        assert!(editor.set_text_content("hello"));
        editor.finish_text_edit();

        assert_eq!(editor.scene().find_item(id).unwrap().content(), Some("hello"));
        assert_eq!(position(&editor, id), Point::new(10.0, 10.0));
        assert!(editor.can_undo());
    }

    #[test]
    fn test_escape_commits_typed_text() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Text);
        down(&mut editor, 10.0, 10.0);
        let id = editor.editing_item().unwrap();
        editor.set_text_content("palette ideas");

        assert!(editor.handle_key(&KeyEvent::Pressed(KeyPress::new("Escape").in_text_field())));
        assert_eq!(editor.editing_item(), None);
        assert_eq!(editor.scene().find_item(id).unwrap().content(), Some("palette ideas"));
        assert!(editor.selection().is_empty());

        assert!(editor.undo());
        assert!(editor.active_board().is_empty());
    }

    #[test]
    fn test_text_tool_places_inside_group() {
        let mut editor = editor_with(vec![(group(10, Rect::new(100.0, 100.0, 500.0, 500.0)), None)]);
        editor.set_tool(ToolKind::Text);
        down(&mut editor, 150.0, 130.0);

        let id = editor.editing_item().unwrap();
        let text = editor.scene().find_item(id).unwrap();
        assert_eq!(text.parent_id(), Some(10));
        assert_eq!(text.position(), Point::new(50.0, 30.0));
    }

    #[test]
    fn test_double_click_empty_creates_placeholder() {
        let mut editor = Editor::default();
        down(&mut editor, 300.0, 300.0);
        up(&mut editor, 300.0, 300.0);
        down(&mut editor, 300.0, 300.0);

        let id = editor.editing_item().unwrap();
        let text = editor.scene().find_item(id).unwrap();
        assert_eq!(text.content(), Some(TextItem::PLACEHOLDER));
        assert_eq!(text.position(), Point::new(300.0, 300.0));
    }

    #[test]
    fn test_double_click_sticky_edits() {
        let sticky = StickyNote::new(10, Point::ZERO, 200.0, 200.0);
        let mut editor = editor_with(vec![(sticky.into(), None)]);
        down(&mut editor, 50.0, 50.0);
        up(&mut editor, 50.0, 50.0);
        down(&mut editor, 50.0, 50.0);
        assert_eq!(editor.editing_item(), Some(10));

        // Clicking the edited item keeps editing
        up(&mut editor, 50.0, 50.0);
        down(&mut editor, 120.0, 120.0);
        assert_eq!(editor.editing_item(), Some(10));
    }

    #[test]
    fn test_drop_reparents_image() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(200.0, 0.0, 600.0, 400.0)), None),
            (image(11, 0.0, 0.0, 100.0, 100.0), None),
        ]);

        drag(&mut editor, (50.0, 50.0), (350.0, 150.0));
        let item = editor.scene().find_item(11).unwrap();
        assert_eq!(item.parent_id(), Some(10));
        assert_eq!(item.position(), Point::new(100.0, 100.0));

        drag(&mut editor, (350.0, 150.0), (-150.0, 150.0));
        let item = editor.scene().find_item(11).unwrap();
        assert_eq!(item.parent_id(), None);
        assert_eq!(item.position(), Point::new(-200.0, 100.0));
        assert!(editor.scene().validate().is_ok());
    }

    #[test]
    fn test_sticky_not_reparented() {
        let sticky = StickyNote::new(11, Point::ZERO, 100.0, 100.0);
        let mut editor = editor_with(vec![
            (group(10, Rect::new(200.0, 0.0, 600.0, 400.0)), None),
            (sticky.into(), None),
        ]);
        drag(&mut editor, (50.0, 50.0), (350.0, 150.0));
        assert_eq!(editor.scene().find_item(11).unwrap().parent_id(), None);
    }

    #[test]
    fn test_resize_image_keeps_aspect() {
        let mut editor = editor_with(vec![(image(10, 0.0, 0.0, 200.0, 100.0), None)]);
        down(&mut editor, 100.0, 50.0);
        up(&mut editor, 100.0, 50.0);
        assert_eq!(editor.handles().len(), 4);

        drag(&mut editor, (200.0, 100.0), (300.0, 100.0));
        let size = editor.scene().find_item(10).unwrap().size().unwrap();
        assert_eq!(size, Size::new(300.0, 150.0));
        assert_eq!(position(&editor, 10), Point::ZERO);

        // Shrinking stops at the minimum height, width follows the aspect
        drag(&mut editor, (300.0, 150.0), (0.0, 0.0));
        let size = editor.scene().find_item(10).unwrap().size().unwrap();
        assert_eq!(size, Size::new(200.0, 100.0));
    }

    #[test]
    fn test_copy_paste_offsets_cumulatively() {
        let mut editor = editor_with(vec![(image(10, 10.0, 10.0, 100.0, 100.0), None)]);
        down(&mut editor, 50.0, 50.0);
        up(&mut editor, 50.0, 50.0);

        assert!(key(&mut editor, "c", Modifiers::ctrl()));
        assert!(key(&mut editor, "v", Modifiers::ctrl()));

        let board = editor.active_board();
        assert_eq!(board.items().len(), 2);
        let pasted = board.items()[1].id();
        assert_ne!(pasted, 10);
        assert_eq!(position(&editor, pasted), Point::new(30.0, 30.0));
        assert_eq!(editor.selection().ids(), &[pasted]);

        key(&mut editor, "v", Modifiers::ctrl());
        let second = editor.active_board().items()[2].id();
        assert_eq!(position(&editor, second), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_paste_group_gets_fresh_child_ids() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(0.0, 0.0, 400.0, 400.0)), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);
        down(&mut editor, 300.0, 300.0);
        up(&mut editor, 300.0, 300.0);
        assert_eq!(editor.selection().ids(), &[10]);

        editor.copy_selection();
        assert!(editor.paste());

        let copy = editor.active_board().items()[1].as_group().unwrap();
        assert_ne!(copy.id, 10);
        assert_eq!((copy.x, copy.y), (20.0, 20.0));
        let child = &copy.items[0];
        assert_ne!(child.id(), 11);
        assert_eq!(child.parent_id(), Some(copy.id));
        assert_eq!(child.position(), Point::new(20.0, 20.0));
        assert!(editor.scene().validate().is_ok());
    }

    #[test]
    fn test_paste_child_lands_at_world_position() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(100.0, 100.0, 500.0, 500.0)), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);
        down(&mut editor, 150.0, 150.0);
        up(&mut editor, 150.0, 150.0);
        assert_eq!(editor.selection().ids(), &[11]);

        editor.copy_selection();
        editor.paste();
        let pasted = editor.selection().ids()[0];
        let item = editor.scene().find_item(pasted).unwrap();
        assert_eq!(item.parent_id(), None);
        assert_eq!(item.position(), Point::new(140.0, 140.0));
    }

    #[test]
    fn test_delete_cascades_and_undo_restores() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(0.0, 0.0, 400.0, 400.0)), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);
        down(&mut editor, 300.0, 300.0);
        up(&mut editor, 300.0, 300.0);

        assert!(key(&mut editor, "Delete", Modifiers::NONE));
        assert!(editor.active_board().is_empty());
        assert!(editor.selection().is_empty());
        assert_eq!(editor.take_asset_deletions(), vec![11]);

        assert!(editor.undo());
        assert!(editor.scene().find_item(11).is_some());
        assert_eq!(editor.scene().find_item(11).unwrap().parent_id(), Some(10));
    }

    #[test]
    fn test_escape_clears_selection_and_tool() {
        let mut editor = editor_with(vec![(image(10, 0.0, 0.0, 100.0, 100.0), None)]);
        editor.execute(Command::SelectAll);
        key(&mut editor, "t", Modifiers::NONE);
        assert_eq!(editor.tool(), ToolKind::Text);

        key(&mut editor, "Escape", Modifiers::NONE);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.tool(), ToolKind::Select);
    }

    #[test]
    fn test_keys_ignored_in_text_field() {
        let mut editor = Editor::default();
        let consumed = editor.handle_key(&KeyEvent::Pressed(KeyPress::new("t").in_text_field()));
        assert!(!consumed);
        assert_eq!(editor.tool(), ToolKind::Select);

        editor.handle_key(&KeyEvent::Pressed(KeyPress::new(" ").in_text_field()));
        assert!(!editor.input().is_space_held());
    }

    #[test]
    fn test_space_drag_pans() {
        let mut editor = editor_with(vec![(image(10, 0.0, 0.0, 300.0, 300.0), None)]);
        assert!(key(&mut editor, " ", Modifiers::NONE));

        drag(&mut editor, (100.0, 100.0), (130.0, 110.0));
        assert_eq!(editor.viewport().pan, Vec2::new(30.0, 10.0));
        assert_eq!(position(&editor, 10), Point::ZERO);
        assert!(editor.selection().is_empty());

        editor.handle_key(&KeyEvent::Released(" ".to_string()));
        assert!(!editor.input().is_space_held());
    }

    #[test]
    fn test_space_release_ends_pan() {
        let mut editor = Editor::default();
        key(&mut editor, " ", Modifiers::NONE);
        down(&mut editor, 10.0, 10.0);
        assert!(matches!(editor.state(), InteractionState::Panning { .. }));

        assert!(editor.handle_key(&KeyEvent::Released(" ".to_string())));
        assert_eq!(*editor.state(), InteractionState::Idle);

        move_to(&mut editor, 60.0, 60.0);
        assert_eq!(editor.viewport().pan, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zoom_and_pan() {
        let mut editor = Editor::default();
        let anchor = Point::new(200.0, 100.0);
        editor.handle_pointer(&PointerEvent::Wheel {
            position: anchor,
            delta: Vec2::new(0.0, -100.0),
            modifiers: Modifiers::ctrl(),
        });
        assert!((editor.viewport().zoom - 1.05).abs() < 1e-9);
        let world = editor.client_to_world(anchor);
        assert!((world - anchor).hypot() < 1e-9);

        let pan = editor.viewport().pan;
        editor.handle_pointer(&PointerEvent::Wheel {
            position: anchor,
            delta: Vec2::new(25.0, 40.0),
            modifiers: Modifiers::NONE,
        });
        assert_eq!(editor.viewport().pan, pan - Vec2::new(0.0, 40.0));
    }

    #[test]
    fn test_zoom_commands_clamp() {
        let mut editor = Editor::default();
        for _ in 0..50 {
            key(&mut editor, "=", Modifiers::ctrl());
        }
        assert!((editor.viewport().zoom - editor.config().max_zoom).abs() < 1e-9);
        key(&mut editor, "0", Modifiers::ctrl());
        assert!((editor.viewport().zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_origin_offsets_clicks() {
        let mut editor = editor_with(vec![(image(10, 0.0, 0.0, 100.0, 100.0), None)]);
        editor.set_canvas_origin(Point::new(100.0, 50.0));
        down(&mut editor, 150.0, 100.0);
        up(&mut editor, 150.0, 100.0);
        assert_eq!(editor.selection().ids(), &[10]);
    }

    #[test]
    fn test_boards_keep_separate_history() {
        let mut editor = Editor::default();
        editor.add_sticky(Point::new(10.0, 10.0)).unwrap();
        assert!(editor.can_undo());

        let second = editor.add_board();
        assert_eq!(editor.scene().active_board_id(), second);
        assert!(editor.selection().is_empty());
        assert!(!editor.can_undo());

        assert!(editor.switch_board(1));
        assert!(editor.can_undo());
        assert!(editor.undo());
        assert!(editor.active_board().is_empty());
    }

    #[test]
    fn test_loaded_ids_not_reused_after_delete() {
        let json = r#"{"boards":[
            {"id":1,"name":"A","items":[
                {"type":"image","id":3,"x":0,"y":0,"parentId":null,"src":"a","width":10,"height":10},
                {"type":"image","id":4,"x":20,"y":0,"parentId":null,"src":"b","width":10,"height":10}
            ]},
            {"id":2,"name":"B","items":[
                {"type":"image","id":5,"x":0,"y":0,"parentId":null,"src":"c","width":10,"height":10}
            ]}
        ],"activeBoardId":1}"#;
        let mut editor = Editor::new(Scene::from_json(json).unwrap(), EditorConfig::default());

        assert!(editor.switch_board(2));
        assert!(editor.delete_item(5));
        assert!(editor.switch_board(1));
        let sticky = editor.add_sticky(Point::new(100.0, 100.0)).unwrap();
        assert_ne!(sticky, 5);

        assert!(editor.switch_board(2));
        assert!(editor.undo());
        assert!(editor.scene().contains_id(5));
        assert!(editor.scene().contains_id(sticky));
        assert!(editor.scene().validate().is_ok());
    }

    #[test]
    fn test_editing_session_keeps_scene_valid() {
        fn check(editor: &Editor) {
            assert!(editor.scene().validate().is_ok());
        }

        let mut editor = editor_with(vec![
            (group(10, Rect::new(200.0, 0.0, 600.0, 400.0)), None),
            (image(11, 0.0, 0.0, 100.0, 100.0), None),
        ]);
        editor.add_sticky(Point::new(0.0, 500.0));
        check(&editor);

        drag(&mut editor, (50.0, 50.0), (350.0, 150.0));
        check(&editor);

        editor.execute(Command::SelectAll);
        editor.copy_selection();
        assert!(editor.paste());
        check(&editor);
        assert!(editor.paste());
        check(&editor);

        assert!(editor.delete_selection());
        check(&editor);
        assert!(editor.undo());
        check(&editor);
        assert!(editor.redo());
        check(&editor);

        editor.add_board();
        assert!(editor.paste());
        check(&editor);
        assert!(editor.switch_board(1));
        while editor.undo() {
            check(&editor);
        }
        assert_eq!(editor.active_board().item_count(), 2);
        check(&editor);
    }

    #[test]
    fn test_board_errors_become_notices() {
        let mut editor = Editor::default();
        assert!(!editor.remove_board(1));
        let notice = editor.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(editor.take_notice().is_none());

        assert!(!editor.rename_board(1, "   "));
        assert!(editor.take_notice().is_some());
        assert!(editor.rename_board(1, "Moodboard"));
        assert_eq!(editor.active_board().name, "Moodboard");
    }

    #[test]
    fn test_remove_active_board_activates_neighbour() {
        let mut editor = Editor::default();
        let second = editor.add_board();
        editor.add_sticky(Point::ZERO);
        assert!(editor.remove_board(second));
        assert_eq!(editor.scene().active_board_id(), 1);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_lock_drops_selection() {
        let mut editor = editor_with(vec![
            (group(10, Rect::new(0.0, 0.0, 400.0, 400.0)), None),
            (image(11, 20.0, 20.0, 100.0, 100.0), Some(10)),
        ]);
        editor.execute(Command::SelectAll);
        assert!(editor.toggle_lock(10));
        assert!(editor.selection().is_empty());
        assert!(editor.scene().find_item(10).unwrap().is_locked());

        assert!(editor.toggle_lock(10));
        assert!(!editor.scene().find_item(10).unwrap().is_locked());
        assert!(!editor.toggle_lock(11));
    }

    #[test]
    fn test_align_selection_records_history() {
        let mut editor = editor_with(vec![
            (StickyNote::new(10, Point::new(0.0, 0.0), 100.0, 100.0).into(), None),
            (StickyNote::new(11, Point::new(50.0, 200.0), 100.0, 100.0).into(), None),
        ]);
        editor.execute(Command::SelectAll);
        assert!(editor.align_selection(AlignMode::Left));
        assert_eq!(position(&editor, 11), Point::new(0.0, 200.0));
        assert!(editor.undo());
        assert_eq!(position(&editor, 11), Point::new(50.0, 200.0));
    }

    #[test]
    fn test_paste_image_then_upload() {
        let mut editor = Editor::default();
        let pending = editor.paste_image(PNG_HEADER.to_vec()).unwrap();

        let item = editor.scene().find_item(pending.item_id).unwrap();
        assert_eq!(item.position(), Point::new(50.0, 50.0));
        assert_eq!(item.size(), Some(Size::new(300.0, 300.0)));
        match item {
            SceneItem::Image(image) => assert!(image.src.starts_with("data:image/png;base64,")),
            other => panic!("expected image, got {other:?}"),
        }

        let uploader = MemoryUploader::new();
        let item_id = pending.item_id;
        let result = pollster::block_on(pending.start(&uploader));
        assert!(editor.finish_upload(item_id, result));
        match editor.scene().find_item(item_id).unwrap() {
            SceneItem::Image(image) => assert_eq!(image.src, format!("memory://images/{item_id}")),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_image_rejected() {
        let mut editor = Editor::default();
        assert!(editor.paste_image(b"plain text".to_vec()).is_none());
        assert!(editor.take_notice().is_some());
        assert!(editor.active_board().is_empty());
    }

    #[test]
    fn test_import_images_cascade() {
        let mut editor = Editor::default();
        let pending = editor.import_images(vec![PNG_HEADER.to_vec(), b"nope".to_vec(), PNG_HEADER.to_vec()]);
        assert_eq!(pending.len(), 2);
        assert_eq!(position(&editor, pending[0].item_id), Point::new(20.0, 20.0));
        assert_eq!(position(&editor, pending[1].item_id), Point::new(60.0, 60.0));
        assert_eq!(editor.selection().len(), 2);
    }

    #[test]
    fn test_upload_failures() {
        let mut editor = Editor::default();
        let pending = editor.paste_image(PNG_HEADER.to_vec()).unwrap();
        assert!(!editor.finish_upload(pending.item_id, Err(UploadError::Timeout)));
        assert!(editor.take_notice().is_some());

        editor.delete_item(pending.item_id);
        assert!(!editor.finish_upload(pending.item_id, Ok("memory://images/x".to_string())));
        assert_eq!(editor.take_asset_deletions(), vec![pending.item_id]);
    }
}
