//! Image layers and their selection/transform management.

use crate::geometry::{
    Anchor, ANCHORS, local_to_world_delta, rotated_bounds, rotated_rect_contains,
    world_to_local_delta,
};
use crate::input::Gesture;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// Stagger applied to newly added layers so successive insertions land
/// offset down-right instead of stacking invisibly.
pub const STAGGER_BASE: f64 = 50.0;
pub const STAGGER_STEP: f64 = 40.0;

/// Hit tolerance around transform anchors, in canvas units.
pub const ANCHOR_HIT_TOLERANCE: f64 = 12.0;

/// Distance from the top edge to the rotation handle, in canvas units.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// A decoded raster source. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A uniformly colored image. Handy for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, pixels)
    }

    /// RGBA of the pixel at (x, y), or None outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// A placed, independently transformable raster image.
///
/// Rotation is in degrees about the layer's own origin (`position`, the
/// unscaled top-left corner), matching the stage semantics the session
/// exposes to hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    /// Decoded raster source.
    pub image: ImageData,
    /// Top-left corner / rotation origin in canvas space.
    pub position: Point,
    /// Per-axis scale factors, each >= 0.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Insertion index; render order is ascending z and never reordered.
    pub z: usize,
}

impl Layer {
    fn new(image: ImageData, position: Point, z: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            position,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            z,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display width under the current scale.
    pub fn scaled_width(&self) -> f64 {
        self.image.width as f64 * self.scale.x
    }

    /// Display height under the current scale.
    pub fn scaled_height(&self) -> f64 {
        self.image.height as f64 * self.scale.y
    }

    /// Axis-aligned bounding rect in canvas space, accounting for scale and
    /// rotation (rotated-rect bounding box, not the unrotated size).
    pub fn bounds(&self) -> Rect {
        rotated_bounds(
            self.position,
            self.scaled_width(),
            self.scaled_height(),
            self.rotation,
        )
    }

    /// Whether a canvas-space point lies on the layer's rendered area.
    pub fn contains(&self, point: Point) -> bool {
        rotated_rect_contains(
            self.position,
            self.scaled_width(),
            self.scaled_height(),
            self.rotation,
            point,
        )
    }

    /// World-space position of a corner anchor.
    pub fn anchor_position(&self, anchor: Anchor) -> Point {
        let local = anchor.local_position(self.scaled_width(), self.scaled_height());
        let offset = local_to_world_delta(Vec2::new(local.x, local.y), self.rotation);
        Point::new(self.position.x + offset.x, self.position.y + offset.y)
    }

    /// World-space position of the rotation handle (above the top edge,
    /// rotated with the layer).
    pub fn rotate_handle_position(&self) -> Point {
        let local = Vec2::new(self.scaled_width() / 2.0, -ROTATE_HANDLE_OFFSET);
        let offset = local_to_world_delta(local, self.rotation);
        Point::new(self.position.x + offset.x, self.position.y + offset.y)
    }

    /// Which corner anchor (if any) is hit at `point`.
    pub fn hit_anchor(&self, point: Point) -> Option<Anchor> {
        ANCHORS.into_iter().find(|&anchor| {
            let pos = self.anchor_position(anchor);
            let dx = point.x - pos.x;
            let dy = point.y - pos.y;
            dx * dx + dy * dy <= ANCHOR_HIT_TOLERANCE * ANCHOR_HIT_TOLERANCE
        })
    }

    /// Whether the rotation handle is hit at `point`.
    pub fn hit_rotate_handle(&self, point: Point) -> bool {
        let pos = self.rotate_handle_position();
        let dx = point.x - pos.x;
        let dy = point.y - pos.y;
        dx * dx + dy * dy <= ANCHOR_HIT_TOLERANCE * ANCHOR_HIT_TOLERANCE
    }

    /// Resize by dragging `anchor` by a world-space `delta`.
    ///
    /// The drag is evaluated in the layer's local rotated frame, so the
    /// opposite corner stays fixed in world space regardless of rotation.
    pub fn resize_from_anchor(&mut self, anchor: Anchor, delta: Vec2) {
        let width = self.scaled_width();
        let height = self.scaled_height();
        let local = world_to_local_delta(delta, self.rotation);

        let (new_width, new_height, origin_shift) = match anchor {
            Anchor::TopLeft => (
                width - local.x,
                height - local.y,
                Vec2::new(local.x, local.y),
            ),
            Anchor::TopRight => (width + local.x, height - local.y, Vec2::new(0.0, local.y)),
            Anchor::BottomLeft => (width - local.x, height + local.y, Vec2::new(local.x, 0.0)),
            Anchor::BottomRight => (width + local.x, height + local.y, Vec2::ZERO),
        };

        let shift = local_to_world_delta(origin_shift, self.rotation);
        self.position = Point::new(self.position.x + shift.x, self.position.y + shift.y);
        self.scale = Vec2::new(
            new_width.max(0.0) / self.image.width as f64,
            new_height.max(0.0) / self.image.height as f64,
        );
    }

    /// Set rotation so the rotation handle points at `cursor`.
    /// Returns the new rotation in degrees.
    pub fn rotate_towards(&mut self, cursor: Point) -> f64 {
        let v = Vec2::new(cursor.x - self.position.x, cursor.y - self.position.y);
        let handle = Vec2::new(self.scaled_width() / 2.0, -ROTATE_HANDLE_OFFSET);
        let degrees = (v.y.atan2(v.x) - handle.y.atan2(handle.x)).to_degrees();
        self.rotation = degrees;
        degrees
    }
}

/// What the active drag gesture is manipulating.
#[derive(Debug, Clone, Copy)]
enum DragMode {
    Move,
    Resize(Anchor),
    Rotate,
}

#[derive(Debug, Clone)]
struct DragState {
    id: LayerId,
    mode: DragMode,
    last: Point,
}

/// Owns the ordered layer set, selection state, and drag/resize/rotate
/// transforms. Consumes the gesture stream only while the drag tool is
/// active; the session routes gestures here or to the stroke engine, never
/// both.
#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    next_z: usize,
    drag: Option<DragState>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer for a decoded image.
    ///
    /// z is the next insertion index and the default position staggers
    /// down-right per index so new layers stay visually distinguishable.
    pub fn add_layer(&mut self, image: ImageData) -> LayerId {
        let z = self.next_z;
        self.next_z += 1;
        let offset = STAGGER_BASE + STAGGER_STEP * z as f64;
        let layer = Layer::new(image, Point::new(offset, offset), z);
        let id = layer.id;
        log::debug!("layer {id} added at z {z}");
        self.layers.push(layer);
        id
    }

    /// Remove a layer. Clears the selection if it pointed at the removed
    /// layer, so a dangling selection can never survive.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self
            .drag
            .as_ref()
            .is_some_and(|drag| drag.id == id)
        {
            self.drag = None;
        }
        Some(self.layers.remove(index))
    }

    /// Layers in ascending z order (render order).
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Select a layer, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<LayerId>) {
        self.selected = id.filter(|id| self.layer(*id).is_some());
    }

    /// Clear the selection. Idempotent.
    pub fn deselect_all(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layer(id))
    }

    /// Index of the selected layer in z order, for cross-component sync.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.layers.iter().position(|l| l.id == id)
    }

    /// Select by z-order index, for cross-component sync.
    pub fn set_selected_index(&mut self, index: Option<usize>) {
        self.selected = index.and_then(|i| self.layers.get(i)).map(|l| l.id);
    }

    /// Translate a layer by a canvas-space delta.
    pub fn translate(&mut self, id: LayerId, delta: Vec2) {
        if let Some(layer) = self.layer_mut(id) {
            layer.position = Point::new(layer.position.x + delta.x, layer.position.y + delta.y);
        }
    }

    /// Resize a layer by dragging one of its corner anchors.
    pub fn resize(&mut self, id: LayerId, anchor: Anchor, delta: Vec2) {
        if let Some(layer) = self.layer_mut(id) {
            layer.resize_from_anchor(anchor, delta);
        }
    }

    /// Set a layer's absolute rotation in degrees.
    pub fn rotate(&mut self, id: LayerId, degrees: f64) {
        if let Some(layer) = self.layer_mut(id) {
            layer.rotation = degrees;
        }
    }

    /// Topmost layer whose rendered bounds contain `point`, front to back.
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.contains(point))
            .map(|l| l.id)
    }

    /// Feed a gesture event while the drag tool is active.
    pub fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Start(point) => self.gesture_start(point),
            Gesture::Move(point) => self.gesture_move(point),
            Gesture::End => self.drag = None,
        }
    }

    fn gesture_start(&mut self, point: Point) {
        // Anchors of the selected layer win over layer bodies, so a handle
        // overlapping another layer still resizes.
        if let Some(layer) = self.selected_layer() {
            let id = layer.id;
            if let Some(anchor) = layer.hit_anchor(point) {
                self.drag = Some(DragState {
                    id,
                    mode: DragMode::Resize(anchor),
                    last: point,
                });
                return;
            }
            if layer.hit_rotate_handle(point) {
                self.drag = Some(DragState {
                    id,
                    mode: DragMode::Rotate,
                    last: point,
                });
                return;
            }
        }

        match self.hit_test(point) {
            Some(id) => {
                self.selected = Some(id);
                self.drag = Some(DragState {
                    id,
                    mode: DragMode::Move,
                    last: point,
                });
            }
            None => {
                // Empty canvas space clears the selection.
                self.selected = None;
                self.drag = None;
            }
        }
    }

    fn gesture_move(&mut self, point: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = Vec2::new(point.x - drag.last.x, point.y - drag.last.y);
        drag.last = point;
        let (id, mode) = (drag.id, drag.mode);
        match mode {
            DragMode::Move => self.translate(id, delta),
            DragMode::Resize(anchor) => self.resize(id, anchor, delta),
            DragMode::Rotate => {
                if let Some(layer) = self.layer_mut(id) {
                    layer.rotate_towards(point);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_layer(width: u32, height: u32) -> (LayerManager, LayerId) {
        let mut manager = LayerManager::new();
        let id = manager.add_layer(ImageData::solid(width, height, [255, 0, 0, 255]));
        (manager, id)
    }

    #[test]
    fn test_add_layer_staggers_positions() {
        let mut manager = LayerManager::new();
        let a = manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));
        let b = manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));

        assert_eq!(manager.layer(a).unwrap().position, Point::new(50.0, 50.0));
        assert_eq!(manager.layer(b).unwrap().position, Point::new(90.0, 90.0));
        assert_eq!(manager.layer(a).unwrap().z, 0);
        assert_eq!(manager.layer(b).unwrap().z, 1);
    }

    #[test]
    fn test_z_stays_monotonic_after_removal() {
        let mut manager = LayerManager::new();
        let a = manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));
        manager.remove(a);
        let b = manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));
        assert_eq!(manager.layer(b).unwrap().z, 1);
    }

    #[test]
    fn test_selection_requires_live_layer() {
        let (mut manager, id) = manager_with_layer(10, 10);
        manager.select(Some(id));
        assert_eq!(manager.selected_id(), Some(id));

        manager.select(Some(Uuid::new_v4()));
        assert_eq!(manager.selected_id(), None);
    }

    #[test]
    fn test_remove_clears_dangling_selection() {
        let (mut manager, id) = manager_with_layer(10, 10);
        manager.select(Some(id));
        manager.remove(id);
        assert_eq!(manager.selected_id(), None);
    }

    #[test]
    fn test_deselect_is_idempotent() {
        let (mut manager, _) = manager_with_layer(10, 10);
        manager.deselect_all();
        let before = manager.selected_id();
        manager.deselect_all();
        assert_eq!(manager.selected_id(), before);
    }

    #[test]
    fn test_selected_index_round_trip() {
        let mut manager = LayerManager::new();
        manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));
        let b = manager.add_layer(ImageData::solid(4, 4, [0, 0, 0, 255]));

        manager.set_selected_index(Some(1));
        assert_eq!(manager.selected_id(), Some(b));
        assert_eq!(manager.selected_index(), Some(1));

        manager.set_selected_index(None);
        assert_eq!(manager.selected_id(), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut manager = LayerManager::new();
        let a = manager.add_layer(ImageData::solid(100, 100, [0, 0, 0, 255]));
        let b = manager.add_layer(ImageData::solid(100, 100, [0, 0, 0, 255]));

        // Both layers cover (100, 100); the later insertion wins.
        assert_eq!(manager.hit_test(Point::new(100.0, 100.0)), Some(b));
        // Only the first layer covers (60, 60).
        assert_eq!(manager.hit_test(Point::new(60.0, 60.0)), Some(a));
        assert_eq!(manager.hit_test(Point::new(1000.0, 1000.0)), None);
    }

    #[test]
    fn test_resize_bottom_right_unrotated() {
        let (mut manager, id) = manager_with_layer(100, 50);
        manager.resize(id, Anchor::BottomRight, Vec2::new(50.0, 25.0));

        let layer = manager.layer(id).unwrap();
        assert!((layer.scaled_width() - 150.0).abs() < 1e-9);
        assert!((layer.scaled_height() - 75.0).abs() < 1e-9);
        // Opposite corner (the origin) did not move.
        assert_eq!(layer.position, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_resize_top_left_moves_origin() {
        let (mut manager, id) = manager_with_layer(100, 100);
        let old_br = manager.layer(id).unwrap().anchor_position(Anchor::BottomRight);

        manager.resize(id, Anchor::TopLeft, Vec2::new(10.0, 20.0));

        let layer = manager.layer(id).unwrap();
        assert!((layer.scaled_width() - 90.0).abs() < 1e-9);
        assert!((layer.scaled_height() - 80.0).abs() < 1e-9);
        assert_eq!(layer.position, Point::new(60.0, 70.0));
        // The pinned corner stayed put.
        let new_br = layer.anchor_position(Anchor::BottomRight);
        assert!((new_br.x - old_br.x).abs() < 1e-9);
        assert!((new_br.y - old_br.y).abs() < 1e-9);
    }

    #[test]
    fn test_resize_respects_rotated_frame() {
        // At 90 degrees the anchor drag must be evaluated in the layer's
        // local frame: a world delta (dx, dy) becomes local (dy, -dx).
        let (mut manager, id) = manager_with_layer(100, 100);
        manager.rotate(id, 90.0);
        manager.resize(id, Anchor::BottomRight, Vec2::new(-10.0, 20.0));

        let layer = manager.layer(id).unwrap();
        assert!((layer.scaled_width() - 120.0).abs() < 1e-9);
        assert!((layer.scaled_height() - 110.0).abs() < 1e-9);
        assert_eq!(layer.position, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_resize_pins_opposite_corner_under_rotation() {
        let (mut manager, id) = manager_with_layer(80, 60);
        manager.rotate(id, 30.0);
        let pinned = manager.layer(id).unwrap().anchor_position(Anchor::BottomRight);

        manager.resize(id, Anchor::TopLeft, Vec2::new(12.0, -7.0));

        let after = manager.layer(id).unwrap().anchor_position(Anchor::BottomRight);
        assert!((after.x - pinned.x).abs() < 1e-9);
        assert!((after.y - pinned.y).abs() < 1e-9);
    }

    #[test]
    fn test_resize_never_goes_negative() {
        let (mut manager, id) = manager_with_layer(10, 10);
        manager.resize(id, Anchor::BottomRight, Vec2::new(-100.0, -100.0));

        let layer = manager.layer(id).unwrap();
        assert_eq!(layer.scale, Vec2::ZERO);
    }

    #[test]
    fn test_drag_gesture_selects_and_moves() {
        let (mut manager, id) = manager_with_layer(100, 100);

        manager.handle_gesture(Gesture::Start(Point::new(75.0, 75.0)));
        assert_eq!(manager.selected_id(), Some(id));

        manager.handle_gesture(Gesture::Move(Point::new(85.0, 70.0)));
        manager.handle_gesture(Gesture::End);

        assert_eq!(manager.layer(id).unwrap().position, Point::new(60.0, 45.0));
    }

    #[test]
    fn test_gesture_on_empty_space_clears_selection() {
        let (mut manager, id) = manager_with_layer(10, 10);
        manager.select(Some(id));

        manager.handle_gesture(Gesture::Start(Point::new(500.0, 500.0)));
        assert_eq!(manager.selected_id(), None);
    }

    #[test]
    fn test_anchor_drag_resizes_selected_layer() {
        let (mut manager, id) = manager_with_layer(100, 100);
        manager.select(Some(id));

        // Bottom-right anchor of the unrotated layer sits at (150, 150).
        manager.handle_gesture(Gesture::Start(Point::new(150.0, 150.0)));
        manager.handle_gesture(Gesture::Move(Point::new(170.0, 160.0)));
        manager.handle_gesture(Gesture::End);

        let layer = manager.layer(id).unwrap();
        assert!((layer.scaled_width() - 120.0).abs() < 1e-9);
        assert!((layer.scaled_height() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_handle_drag_sets_rotation() {
        let (mut manager, id) = manager_with_layer(100, 100);
        manager.select(Some(id));

        let handle = manager.layer(id).unwrap().rotate_handle_position();
        manager.handle_gesture(Gesture::Start(handle));
        // Drag so the handle direction points along +x from the origin.
        manager.handle_gesture(Gesture::Move(Point::new(150.0, 78.0)));
        manager.handle_gesture(Gesture::End);

        let rotation = manager.layer(id).unwrap().rotation;
        assert!(rotation.abs() > 1.0, "rotation should have changed: {rotation}");
    }

    #[test]
    fn test_move_without_start_is_noop() {
        let (mut manager, id) = manager_with_layer(10, 10);
        let before = manager.layer(id).unwrap().position;
        manager.handle_gesture(Gesture::Move(Point::new(60.0, 60.0)));
        assert_eq!(manager.layer(id).unwrap().position, before);
    }
}
