//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
pub const DEFAULT_MAX_ZOOM: f64 = 3.0;
/// Zoom change applied by the zoom in/out commands.
pub const ZOOM_STEP: f64 = 0.1;

/// Viewport manages the view transform shared by every board.
///
/// It handles panning (translation) and zooming (scaling),
/// converting between screen coordinates and world coordinates:
/// `world = (screen - pan) / zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset in screen pixels
    pub pan: Vec2,
    /// Current zoom level (1.0 = 100%)
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport with custom zoom bounds.
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Transform from world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Transform from screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen-space distance to world units.
    pub fn screen_to_world_delta(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Pan by a delta in screen coordinates. Pan is unconstrained.
    pub fn pan(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom level directly, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom by a factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.zoom_to_at(screen_point, self.zoom * factor);
    }

    /// Zoom to an absolute level, keeping the given screen point fixed.
    pub fn zoom_to_at(&mut self, screen_point: Point, zoom: f64) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust pan so world_point stays under screen_point
        let new_screen = self.world_to_screen(world_point);
        self.pan += screen_point - new_screen;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Reset to 100% zoom and no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Zoom level as a whole percentage for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }
}

/// Convert a point in a group's local frame to world coordinates.
pub fn local_to_world(local: Point, frame_origin: Vec2) -> Point {
    local + frame_origin
}

/// Convert a world point into a group's local frame.
pub fn world_to_local(world: Point, frame_origin: Vec2) -> Point {
    world - frame_origin
}
