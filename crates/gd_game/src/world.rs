//! Endless house-row scrolling.
//!
//! A row holds only the few houses that cover `[-outer_extent, outer_extent]`.
//! Houses scroll left, drop off once past the left extent, and are replaced
//! at the right end with randomly chosen models.

use glam::Vec3;
use gd_core::random::SceneRng;

use crate::entities::{House, HouseRow, ModelTemplate};

/// Instance of `template` whose bottom rests on the row baseline.
pub fn house_from_template(
    row: &HouseRow,
    model_index: usize,
    template: &ModelTemplate,
    center_x: f32,
) -> House {
    House {
        model_index,
        position: Vec3::new(
            center_x,
            row.baseline_y + template.dimensions.y / 2.0,
            row.z,
        ),
        dimensions: template.dimensions,
        chimney_loci: template.chimney_loci.clone(),
    }
}

fn pick_template<'a>(
    templates: &'a [ModelTemplate],
    rng: &mut SceneRng,
) -> Option<(usize, &'a ModelTemplate)> {
    let index = rng.index(templates.len())?;
    Some((index, &templates[index]))
}

/// Fill a fresh row from the right extent leftwards until the left extent is covered.
pub fn build_house_row(
    baseline_y: f32,
    z: f32,
    outer_extent: f32,
    gap: f32,
    templates: &[ModelTemplate],
    rng: &mut SceneRng,
) -> HouseRow {
    let mut row = HouseRow::new(baseline_y, z, outer_extent);
    let mut right_edge = outer_extent;
    let mut placed = Vec::new();

    while right_edge > -outer_extent {
        let Some((index, template)) = pick_template(templates, rng) else {
            log::warn!("No house models available; row left empty");
            break;
        };
        let width = template.dimensions.x;
        if width + gap <= 0.0 {
            log::warn!("House '{}' has no width; stopping row construction", template.key);
            break;
        }
        let house = house_from_template(&row, index, template, right_edge - width / 2.0);
        right_edge = house.left_edge() - gap;
        placed.push(house);
    }

    placed.reverse();
    row.houses = placed;
    row
}

/// Scroll `row` left by `scroll_rate * dt_ms`, drop houses whose right edge
/// reached the left extent, then append houses until the right extent is covered.
pub fn advance_row(
    row: &mut HouseRow,
    scroll_rate: f32,
    dt_ms: f32,
    gap: f32,
    templates: &[ModelTemplate],
    rng: &mut SceneRng,
) {
    let shift = scroll_rate * dt_ms;
    for house in &mut row.houses {
        house.position.x -= shift;
    }
    let left_limit = -row.outer_extent;
    row.houses.retain(|house| house.right_edge() > left_limit);

    loop {
        let next_left_edge = match row.rightmost_edge() {
            Some(edge) if edge >= row.outer_extent => break,
            Some(edge) => Some(edge + gap),
            None => None,
        };
        let Some((index, template)) = pick_template(templates, rng) else {
            log::warn!("No house models available; cannot extend row");
            break;
        };
        let center_x = match next_left_edge {
            Some(left) => left + template.dimensions.x / 2.0,
            None => row.outer_extent,
        };
        if next_left_edge.is_some() && template.dimensions.x + gap <= 0.0 {
            log::warn!("House '{}' has no width; cannot extend row", template.key);
            break;
        }
        let house = house_from_template(row, index, template, center_x);
        row.houses.push(house);
    }
}
