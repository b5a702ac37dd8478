//! Approximate collision tests in the X/Y plane.
//!
//! The camera looks straight down -Z with an orthographic projection, so
//! gameplay overlap ignores depth. Objects collide through their axis-aligned
//! boxes (position +/- half extents); gift boxes are delivered when they come
//! within a small planar distance of a chimney opening.

use glam::{Vec2, Vec3};
use gd_core::math::transform_point;

use crate::entities::{GiftBox, House, HouseRow};
use crate::model::ObjectDimensions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_object(position: Vec3, dimensions: ObjectDimensions) -> Self {
        Self {
            center_x: position.x,
            center_y: position.y,
            half_w: dimensions.x / 2.0,
            half_h: dimensions.y / 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn bottom(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn top(&self) -> f32 {
        self.center_y + self.half_h
    }

    /// Closed-interval overlap on both axes. Touching edges count as a hit.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.bottom() <= other.top()
            && other.bottom() <= self.top()
    }
}

pub fn aabb_overlaps(
    position_a: Vec3,
    dimensions_a: ObjectDimensions,
    position_b: Vec3,
    dimensions_b: ObjectDimensions,
) -> bool {
    Aabb::from_object(position_a, dimensions_a).overlaps(&Aabb::from_object(position_b, dimensions_b))
}

/// True when `point` lies within `threshold` of any chimney opening of `house`,
/// measured in the X/Y plane after placing the loci in world space.
pub fn is_in_chimney_proximity(point: Vec3, house: &House, threshold: f32) -> bool {
    let transform = house.world_transform();
    house.chimney_loci.iter().any(|&locus| {
        let world = transform_point(&transform, locus);
        Vec2::new(point.x - world.x, point.y - world.y).length() < threshold
    })
}

/// Index of the house in `row` receiving `gift`, scanning from the rightmost
/// house and stopping at the first match.
pub fn find_delivery(gift: &GiftBox, row: &HouseRow, threshold: f32) -> Option<usize> {
    row.houses
        .iter()
        .enumerate()
        .rev()
        .find(|(_, house)| is_in_chimney_proximity(gift.position, house, threshold))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house_at(x: f32, loci: Vec<Vec3>) -> House {
        House {
            model_index: 0,
            position: Vec3::new(x, -1.0, 0.2),
            dimensions: ObjectDimensions::new(0.3, 0.3, 0.3),
            chimney_loci: loci,
        }
    }

    fn gift_at(position: Vec3) -> GiftBox {
        GiftBox {
            position,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            dimensions: ObjectDimensions::new(0.02, 0.02, 0.02),
        }
    }

    #[test]
    fn overlap_is_symmetric() {
        let dims = [
            ObjectDimensions::new(0.2, 0.1, 0.1),
            ObjectDimensions::new(0.05, 0.4, 0.0),
            ObjectDimensions::new(0.0, 0.0, 0.0),
        ];
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.1, 0.05, 3.0),
            Vec3::new(-0.3, 0.2, 0.0),
            Vec3::new(0.125, -0.25, -1.0),
        ];
        for &pa in &positions {
            for &pb in &positions {
                for &da in &dims {
                    for &db in &dims {
                        assert_eq!(aabb_overlaps(pa, da, pb, db), aabb_overlaps(pb, db, pa, da));
                    }
                }
            }
        }
    }

    #[test]
    fn overlap_needs_both_axes() {
        let dims = ObjectDimensions::new(1.0, 1.0, 1.0);
        assert!(aabb_overlaps(Vec3::ZERO, dims, Vec3::new(0.9, 0.9, 0.0), dims));
        assert!(!aabb_overlaps(Vec3::ZERO, dims, Vec3::new(0.9, 1.1, 0.0), dims));
        assert!(!aabb_overlaps(Vec3::ZERO, dims, Vec3::new(1.1, 0.0, 0.0), dims));
    }

    #[test]
    fn depth_is_ignored() {
        let dims = ObjectDimensions::new(1.0, 1.0, 0.1);
        assert!(aabb_overlaps(Vec3::ZERO, dims, Vec3::new(0.0, 0.0, 50.0), dims));
    }

    #[test]
    fn touching_edges_overlap() {
        let dims = ObjectDimensions::new(1.0, 1.0, 1.0);
        assert!(aabb_overlaps(Vec3::ZERO, dims, Vec3::new(1.0, 0.0, 0.0), dims));
    }

    #[test]
    fn contained_box_overlaps() {
        let big = ObjectDimensions::new(2.0, 2.0, 1.0);
        let small = ObjectDimensions::new(0.1, 0.1, 0.1);
        assert!(aabb_overlaps(Vec3::ZERO, big, Vec3::new(0.2, -0.3, 0.0), small));
        assert!(aabb_overlaps(Vec3::new(0.2, -0.3, 0.0), small, Vec3::ZERO, big));
    }

    #[test]
    fn gift_exactly_on_locus_is_delivered() {
        let locus = Vec3::new(0.05, 0.12, -0.04);
        let house = house_at(0.4, vec![locus]);
        let world = transform_point(&house.world_transform(), locus);
        assert!(is_in_chimney_proximity(world, &house, 0.1));
    }

    #[test]
    fn proximity_ignores_depth_and_respects_threshold() {
        let house = house_at(0.0, vec![Vec3::new(0.0, 0.1, 0.0)]);
        assert!(is_in_chimney_proximity(Vec3::new(0.05, -0.9, 9.0), &house, 0.1));
        assert!(!is_in_chimney_proximity(Vec3::new(0.1, -0.9, 0.0), &house, 0.1));
    }

    #[test]
    fn house_without_chimneys_never_receives() {
        let house = house_at(0.0, Vec::new());
        assert!(!is_in_chimney_proximity(house.position, &house, 10.0));
    }

    #[test]
    fn delivery_prefers_rightmost_matching_house() {
        let mut row = HouseRow::new(-1.15, 0.2, 2.0);
        row.houses.push(house_at(0.00, vec![Vec3::ZERO]));
        row.houses.push(house_at(0.08, vec![Vec3::ZERO]));
        row.houses.push(house_at(1.50, vec![Vec3::ZERO]));
        let gift = gift_at(Vec3::new(0.04, -1.0, 0.0));
        assert_eq!(find_delivery(&gift, &row, 0.1), Some(1));
        let miss = gift_at(Vec3::new(0.8, -1.0, 0.0));
        assert_eq!(find_delivery(&miss, &row, 0.1), None);
    }
}
