//! OBJ model parsing and normalisation.
//!
//! Models are authored at arbitrary size. `parse_obj_model` recentres each
//! one on the origin and scales it so its largest extent equals the requested
//! scale factor. Auxiliary points (chimney openings) go through the identical
//! transform so they stay registered to the geometry.

use glam::{Vec2, Vec3};
use gd_render::geometry::{Triangle, TriangleVertex, DEFAULT_VERTEX_COLOR};

use crate::resources::{MODEL_HOUSE_1, MODEL_HOUSE_2, MODEL_HOUSE_3, MODEL_HOUSE_4};

/// Axis-aligned extents of a model after normalisation and scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectDimensions {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl ObjectDimensions {
    /// Stand-in for models that failed to load.
    pub const UNIT: ObjectDimensions = ObjectDimensions {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
            z: z.max(0.0),
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z) * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct ParsedModel {
    pub triangles: Vec<Triangle>,
    pub dimensions: ObjectDimensions,
    pub aux_points: Vec<Vec3>,
}

pub fn parse_obj_model(text: &str, scale: f32, aux_points: &[Vec3]) -> Result<ParsedModel, String> {
    let load_opts = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj_buf(&mut text.as_bytes(), &load_opts, |_| {
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|e| format!("Failed to parse OBJ text: {e}"))?;

    let mut raw: Vec<[TriangleVertex; 3]> = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        let vertex_at = |index: usize| -> TriangleVertex {
            let position = Vec3::new(
                mesh.positions[3 * index],
                mesh.positions[3 * index + 1],
                mesh.positions[3 * index + 2],
            );
            let normal = (mesh.normals.len() >= 3 * (index + 1)).then(|| {
                Vec3::new(
                    mesh.normals[3 * index],
                    mesh.normals[3 * index + 1],
                    mesh.normals[3 * index + 2],
                )
            });
            let tex_coords = if mesh.texcoords.len() >= 2 * (index + 1) {
                // OBJ texcoords have their origin at the bottom-left.
                Vec2::new(mesh.texcoords[2 * index], 1.0 - mesh.texcoords[2 * index + 1])
            } else {
                Vec2::ZERO
            };
            let color = if mesh.vertex_color.len() >= 3 * (index + 1) {
                [
                    mesh.vertex_color[3 * index],
                    mesh.vertex_color[3 * index + 1],
                    mesh.vertex_color[3 * index + 2],
                    1.0,
                ]
            } else {
                DEFAULT_VERTEX_COLOR
            };
            TriangleVertex {
                position,
                normal,
                tex_coords,
                color,
            }
        };

        let vertex_count = mesh.positions.len() / 3;
        let indices: Vec<usize> = if mesh.indices.is_empty() {
            (0..vertex_count).collect()
        } else {
            mesh.indices.iter().map(|&i| i as usize).collect()
        };
        if let Some(bad) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(format!(
                "OBJ model '{}' references vertex {bad} of {vertex_count}",
                model.name
            ));
        }
        for face in indices.chunks_exact(3) {
            raw.push([vertex_at(face[0]), vertex_at(face[1]), vertex_at(face[2])]);
        }
    }

    if raw.is_empty() {
        return Err("OBJ text contains no triangles".to_string());
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for vertex in raw.iter().flatten() {
        min = min.min(vertex.position);
        max = max.max(vertex.position);
    }
    let extent = max - min;
    let max_extent = extent.max_element();
    if !(max_extent > 0.0) || !max_extent.is_finite() {
        return Err(format!("OBJ model has degenerate extents {extent:?}"));
    }

    let factor = scale / max_extent;
    let normalize = |p: Vec3| (p - min - extent / 2.0) * factor;

    let triangles = raw
        .into_iter()
        .map(|mut vertices| {
            for vertex in &mut vertices {
                vertex.position = normalize(vertex.position);
            }
            Triangle { vertices }
        })
        .collect();

    Ok(ParsedModel {
        triangles,
        dimensions: ObjectDimensions::new(extent.x * factor, extent.y * factor, extent.z * factor),
        aux_points: aux_points.iter().map(|&p| normalize(p)).collect(),
    })
}

/// Authored chimney top-centre points, in each house model's own coordinates.
pub fn chimney_loci_for(model_key: &str) -> Vec<Vec3> {
    let centre = |x0: f32, x1: f32, y: f32, z0: f32, z1: f32| {
        Vec3::new((x0 + x1) / 2.0, y, (z0 + z1) / 2.0)
    };
    match model_key {
        MODEL_HOUSE_1 => vec![centre(10.6596, 1.33324, 52.7885, -29.512, -20.1856)],
        MODEL_HOUSE_2 => vec![
            centre(9.220391, 7.568391, 6.482349, -1.905688, -2.417518),
            centre(4.070392, 2.618392, 8.382350, -3.435688, -3.947518),
        ],
        MODEL_HOUSE_3 => vec![centre(-7.500005, -1.499999, 78.500053, -50.650486, -38.528778)],
        MODEL_HOUSE_4 => vec![centre(3.698494, 2.000001, 14.499999, 10.801508, 12.500001)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_OBJ: &str = "\
# 4 x 2 x 1 box, one coloured corner
v 0 0 0 1 0 0
v 4 0 0 1 1 1
v 4 2 0 1 1 1
v 0 2 0 1 1 1
v 0 0 -1 1 1 1
v 4 0 -1 1 1 1
v 4 2 -1 1 1 1
v 0 2 -1 1 1 1
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 4 3 7 8
f 1 4 8 5
f 2 6 7 3
";

    #[test]
    fn normalises_largest_extent_to_scale() {
        let model = parse_obj_model(BOX_OBJ, 0.5, &[]).expect("box parses");
        assert_eq!(model.triangles.len(), 12);
        assert!((model.dimensions.x - 0.5).abs() < 1e-6);
        assert!((model.dimensions.y - 0.25).abs() < 1e-6);
        assert!((model.dimensions.z - 0.125).abs() < 1e-6);
    }

    #[test]
    fn geometry_is_centred_on_origin() {
        let model = parse_obj_model(BOX_OBJ, 2.0, &[]).expect("box parses");
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in model.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min = min.min(v.position);
            max = max.max(v.position);
        }
        assert!((min + max).length() < 1e-5);
        assert!((max.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn aux_points_follow_the_same_transform() {
        let corner = Vec3::new(4.0, 2.0, 0.0);
        let model = parse_obj_model(BOX_OBJ, 2.0, &[corner]).expect("box parses");
        let expected = Vec3::new(1.0, 0.5, 0.25);
        assert!((model.aux_points[0] - expected).length() < 1e-6);
    }

    #[test]
    fn vertex_colours_are_carried_through() {
        let model = parse_obj_model(BOX_OBJ, 1.0, &[]).expect("box parses");
        let has_red = model
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .any(|v| v.color == [1.0, 0.0, 0.0, 1.0]);
        assert!(has_red);
    }

    #[test]
    fn empty_or_flat_models_are_rejected() {
        assert!(parse_obj_model("# nothing\n", 1.0, &[]).is_err());
        let point = "v 1 1 1\nv 1 1 1\nv 1 1 1\nf 1 2 3\n";
        let err = parse_obj_model(point, 1.0, &[]).expect_err("degenerate model");
        assert!(err.contains("degenerate"));
    }

    #[test]
    fn every_house_has_chimneys() {
        assert_eq!(chimney_loci_for(MODEL_HOUSE_1).len(), 1);
        assert_eq!(chimney_loci_for(MODEL_HOUSE_2).len(), 2);
        assert_eq!(chimney_loci_for(MODEL_HOUSE_3).len(), 1);
        assert_eq!(chimney_loci_for(MODEL_HOUSE_4).len(), 1);
        assert!(chimney_loci_for("models/sleigh.obj").is_empty());
        let top = chimney_loci_for(MODEL_HOUSE_1)[0];
        assert!((top.y - 52.7885).abs() < 1e-4);
    }
}
