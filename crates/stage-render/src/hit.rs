//! Hit testing: point → entity lookup.
//!
//! Entity geometry is expressed as a local box (unscaled units, relative to
//! the registration point) mapped into display space (y-down) by an affine
//! transform. A stage point (y-up) is flipped into display space, mapped
//! back through the inverse transform and tested against the local box.

use kurbo::{Affine, Point, Rect};
use stage_core::{DisplayKind, DisplayTree, EntityId, EntityStore, EntityTransform, NodeIndex, TextAlign};

/// Centre of the entity's box relative to its registration point, in
/// unscaled local units.
fn local_center(t: &EntityTransform) -> (f64, f64) {
    match t.text_align() {
        None => (t.width / 2.0 - t.reg_x, t.height / 2.0 - t.reg_y),
        Some(_) if t.line_break() => (-t.reg_x, -t.reg_y),
        Some(TextAlign::Left) => (t.width / 2.0, -t.reg_y),
        Some(TextAlign::Center) => (-t.reg_x, -t.reg_y),
        Some(TextAlign::Right) => (-t.width / 2.0, -t.reg_y),
    }
}

/// The entity's box in local units, centred per its object type.
pub fn local_bounds(t: &EntityTransform) -> Rect {
    let (cx, cy) = local_center(t);
    Rect::from_center_size((cx, cy), (t.width, t.height))
}

/// Local → display-space transform of an entity.
pub fn entity_affine(t: &EntityTransform) -> Affine {
    Affine::translate((t.x, -t.y))
        * Affine::rotate(t.rotation.to_radians())
        * Affine::scale_non_uniform(t.scale_x, t.scale_y)
}

/// Axis-aligned display-space bounds of the rotated entity box.
pub fn display_bounds(t: &EntityTransform) -> Rect {
    entity_affine(t).transform_rect_bbox(local_bounds(t))
}

/// Whether `point` (stage space, y-up) lies inside the entity.
///
/// Hidden entities and entities with a degenerate transform are never hit.
pub fn entity_contains(t: &EntityTransform, point: Point) -> bool {
    if !t.visible || t.width == 0.0 || t.height == 0.0 {
        return false;
    }
    let affine = entity_affine(t);
    if affine.determinant() == 0.0 {
        return false;
    }
    let local = affine.inverse() * Point::new(point.x, -point.y);
    local_bounds(t).contains(local)
}

/// Find the topmost entity of `container` accepted by `hit`.
///
/// Children are walked in reverse paint order (last painted = topmost).
pub fn topmost_entity(
    display: &DisplayTree,
    container: NodeIndex,
    entities: &EntityStore,
    mut hit: impl FnMut(&EntityTransform) -> bool,
) -> Option<EntityId> {
    display.children(container).iter().rev().find_map(|&idx| {
        let DisplayKind::Entity(id) = display.node(idx)?.kind else {
            return None;
        };
        let transform = entities.transform(id)?;
        hit(transform).then_some(id)
    })
}
