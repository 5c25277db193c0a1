//! Affine transform math for scene items.
//!
//! Canvas space has y pointing down, so a positive rotation turns items
//! clockwise on screen. An item's *box transform* maps the unit square onto
//! its on-canvas quad; its *draw transform* maps its cropped content pixels
//! (or a group's children) into the parent's space.

use bevy::math::{Affine2, Vec2};

use crate::common::{Alignment, Handle};
use crate::constants::{
    CLOSE_EPSILON, FINE_ROTATION_STEP, SINGULAR_EPSILON,
};
use crate::scene::{BoundsType, ItemInfo};

/// Unit-square corners in clockwise order starting top-left.
pub const UNIT_CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Parent-then-local composition, as a matrix stack would apply it.
pub fn compose(parent: Affine2, local: Affine2) -> Affine2 {
    parent * local
}

/// Inverse of `m`, or `None` when it is singular.
pub fn invert(m: Affine2) -> Option<Affine2> {
    if m.matrix2.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(m.inverse())
}

pub fn transform_point(m: &Affine2, point: Vec2) -> Vec2 {
    m.transform_point2(point)
}

pub fn rotate_vector(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}

/// Rotate a point around a center by the given angle (radians).
pub fn rotate_point(point: Vec2, center: Vec2, radians: f32) -> Vec2 {
    center + rotate_vector(point - center, radians)
}

/// Offset of the alignment anchor inside a box of `size`.
pub fn anchor_offset(alignment: Alignment, size: Vec2) -> Vec2 {
    alignment.fraction() * size
}

/// On-canvas size of an item: bounds when fixed, else cropped content times scale.
pub fn item_size(info: &ItemInfo) -> Vec2 {
    let t = &info.transform;
    match t.bounds_type {
        BoundsType::Fixed => t.bounds,
        BoundsType::None => info.cropped_size() * t.scale,
    }
}

/// Scale applied to content pixels when drawing the item.
pub fn content_scale(info: &ItemInfo) -> Vec2 {
    let t = &info.transform;
    match t.bounds_type {
        BoundsType::None => t.scale,
        BoundsType::Fixed => {
            let cropped = info.cropped_size();
            let axis = |bounds: f32, content: f32| {
                if content.abs() > f32::EPSILON {
                    bounds / content
                } else {
                    0.0
                }
            };
            Vec2::new(axis(t.bounds.x, cropped.x), axis(t.bounds.y, cropped.y))
        }
    }
}

/// Map from the unit square to the item's quad in parent space.
pub fn box_transform(info: &ItemInfo) -> Affine2 {
    let t = &info.transform;
    let size = item_size(info);
    Affine2::from_translation(t.position)
        * Affine2::from_angle(t.rotation.to_radians())
        * Affine2::from_translation(-anchor_offset(t.alignment, size))
        * Affine2::from_scale(size)
}

/// Map from cropped content pixels to parent space.
pub fn draw_transform(info: &ItemInfo) -> Affine2 {
    let t = &info.transform;
    let size = item_size(info);
    Affine2::from_translation(t.position)
        * Affine2::from_angle(t.rotation.to_radians())
        * Affine2::from_translation(-anchor_offset(t.alignment, size))
        * Affine2::from_scale(content_scale(info))
}

/// Item-local point for `point` if the inverse round-trips back to it.
pub fn round_trip(m: &Affine2, point: Vec2) -> Option<Vec2> {
    let inverse = invert(*m)?;
    let local = inverse.transform_point2(point);
    let back = m.transform_point2(local);
    back.abs_diff_eq(point, CLOSE_EPSILON).then_some(local)
}

/// Whether all four unit corners survive a forward-then-inverse round trip.
pub fn is_valid_box(m: &Affine2) -> bool {
    let Some(inverse) = invert(*m) else {
        return false;
    };
    UNIT_CORNERS.iter().all(|corner| {
        inverse
            .transform_point2(m.transform_point2(*corner))
            .abs_diff_eq(*corner, CLOSE_EPSILON)
    })
}

/// The quad's four corners in the transform's output space.
pub fn box_corners(m: &Affine2) -> [Vec2; 4] {
    UNIT_CORNERS.map(|c| m.transform_point2(c))
}

/// Axis-aligned bounding box of a set of points.
pub fn bounds_of(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
    )
}

/// `m` with its translation removed, for mapping offsets rather than points.
pub fn linear_part(m: &Affine2) -> Affine2 {
    Affine2::from_mat2(m.matrix2)
}

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Replace `angle` with the nearest candidate if it lies within `threshold`.
///
/// Distances wrap around the circle; the result stays in the same turn as
/// `angle` so callers do not see a jump of 360 degrees.
pub fn snap_rotation(angle: f32, candidates: &[f32], threshold: f32) -> f32 {
    let nearest = candidates
        .iter()
        .map(|c| wrap_degrees(angle - c))
        .min_by(|a, b| a.abs().total_cmp(&b.abs()));

    match nearest {
        Some(diff) if diff.abs() < threshold => angle - diff,
        _ => angle,
    }
}

/// Every multiple of the fine step around the circle.
pub fn fine_rotation_candidates() -> Vec<f32> {
    let steps = (360.0 / FINE_ROTATION_STEP) as usize;
    (0..steps).map(|i| i as f32 * FINE_ROTATION_STEP).collect()
}

/// The rotation at drag start plus the right and diagonal angles.
pub fn default_rotation_candidates(previous: f32) -> Vec<f32> {
    vec![
        previous, 0.0, 45.0, -45.0, 90.0, -90.0, 135.0, -135.0, 180.0,
    ]
}

/// Constrain `size` to the aspect ratio of `base_size`.
///
/// Corner handles keep whichever axis makes the box larger; edge handles
/// derive the orthogonal axis from the dragged one. The resulting size is
/// rounded and the dragged corner of `tl`/`br` is moved to match it.
pub fn clamp_aspect(
    tl: &mut Vec2,
    br: &mut Vec2,
    size: Vec2,
    base_size: Vec2,
    handle: Handle,
) -> Vec2 {
    if base_size.x.abs() < f32::EPSILON || base_size.y.abs() < f32::EPSILON {
        return size;
    }
    let base_aspect = base_size.x / base_size.y;
    let aspect = size.x / size.y;
    // Keep the sign of the axis being recomputed.
    let sign = if (size.x >= 0.0) == (size.y >= 0.0) {
        1.0
    } else {
        -1.0
    };

    let mut size = size;
    if handle.is_corner() {
        if aspect.abs() < base_aspect {
            size.x = size.y * base_aspect * sign;
        } else {
            size.y = size.x / base_aspect * sign;
        }
    } else if handle.top() || handle.bottom() {
        size.x = size.y * base_aspect * sign;
    } else if handle.left() || handle.right() {
        size.y = size.x / base_aspect * sign;
    }

    size = size.round();

    if handle.left() {
        tl.x = br.x - size.x;
    } else if handle.right() {
        br.x = tl.x + size.x;
    }
    if handle.top() {
        tl.y = br.y - size.y;
    } else if handle.bottom() {
        br.y = tl.y + size.y;
    }
    size
}
