//! Editor configuration.

use crate::camera::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, ZOOM_STEP};
use crate::history::MAX_UNDO_HISTORY;
use crate::items::{CanvasGroup, ImageItem, StickyNote, TextItem};
use crate::selection::HANDLE_HIT_TOLERANCE;
use kurbo::{Size, Vec2};

/// Tunables for the interaction controller.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change for the zoom in/out commands.
    pub zoom_step: f64,
    /// Zoom change per ctrl+wheel notch.
    pub wheel_zoom_step: f64,
    pub history_capacity: usize,
    /// Offset applied to each successive paste.
    pub paste_offset: Vec2,
    /// Minimum size of canvas groups and sticky notes.
    pub min_frame_size: Size,
    pub min_image_size: Size,
    /// Resize handle tolerance in screen pixels.
    pub handle_tolerance: f64,
    pub default_image_size: Size,
    pub default_sticky_size: Size,
    pub default_font_size: f64,
    pub default_text_color: String,
    pub default_sticky_color: String,
    pub default_group_background: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            wheel_zoom_step: 0.05,
            history_capacity: MAX_UNDO_HISTORY,
            paste_offset: Vec2::new(20.0, 20.0),
            min_frame_size: Size::new(50.0, 50.0),
            min_image_size: Size::new(100.0, 100.0),
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            default_image_size: Size::new(ImageItem::DEFAULT_SIZE, ImageItem::DEFAULT_SIZE),
            default_sticky_size: Size::new(StickyNote::DEFAULT_SIZE, StickyNote::DEFAULT_SIZE),
            default_font_size: TextItem::DEFAULT_FONT_SIZE,
            default_text_color: TextItem::DEFAULT_COLOR.to_string(),
            default_sticky_color: StickyNote::DEFAULT_COLOR.to_string(),
            default_group_background: CanvasGroup::DEFAULT_BACKGROUND.to_string(),
        }
    }
}
