use glam::{Mat4, Vec3};
use gd_core::math::transformation_matrix;
use gd_render::graphics::MeshHandle;

use crate::model::ObjectDimensions;

/// Geometry shared by every instance of one model. `mesh` is `None` when the
/// model failed to load; such instances are simulated but never drawn.
#[derive(Debug, Clone)]
pub struct ModelTemplate {
    pub key: &'static str,
    pub mesh: Option<MeshHandle>,
    pub dimensions: ObjectDimensions,
    /// Chimney openings in normalised model space. Empty for non-houses.
    pub chimney_loci: Vec<Vec3>,
}

impl ModelTemplate {
    pub fn placeholder(key: &'static str) -> Self {
        Self {
            key,
            mesh: None,
            dimensions: ObjectDimensions::UNIT,
            chimney_loci: Vec::new(),
        }
    }
}

/// Every model the scene instantiates. House instances refer to `houses`
/// by index.
#[derive(Debug, Clone)]
pub struct SceneModels {
    pub sleigh: ModelTemplate,
    pub gift_box: ModelTemplate,
    pub grinch: ModelTemplate,
    pub houses: Vec<ModelTemplate>,
}

impl SceneModels {
    pub fn house(&self, model_index: usize) -> Option<&ModelTemplate> {
        self.houses.get(model_index)
    }
}

#[derive(Debug, Clone)]
pub struct Sleigh {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub dimensions: ObjectDimensions,
    /// Per-axis input intensity in [-1, 1]; z is unused.
    pub thrust: Vec3,
}

impl Sleigh {
    pub fn new(position: Vec3, dimensions: ObjectDimensions) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            dimensions,
            thrust: Vec3::ZERO,
        }
    }

    pub fn world_transform(&self) -> Mat4 {
        transformation_matrix(self.position, self.rotation)
    }
}

#[derive(Debug, Clone)]
pub struct GiftBox {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub dimensions: ObjectDimensions,
}

impl GiftBox {
    pub fn world_transform(&self) -> Mat4 {
        transformation_matrix(self.position, self.rotation)
    }
}

#[derive(Debug, Clone)]
pub struct EnemyGrinch {
    pub position: Vec3,
    /// Only x is integrated; grinches move straight left.
    pub velocity: Vec3,
    pub dimensions: ObjectDimensions,
}

impl EnemyGrinch {
    pub fn world_transform(&self) -> Mat4 {
        transformation_matrix(self.position, Vec3::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct House {
    /// Index into the scene's house model table.
    pub model_index: usize,
    pub position: Vec3,
    pub dimensions: ObjectDimensions,
    pub chimney_loci: Vec<Vec3>,
}

impl House {
    pub fn world_transform(&self) -> Mat4 {
        transformation_matrix(self.position, Vec3::ZERO)
    }

    pub fn left_edge(&self) -> f32 {
        self.position.x - self.dimensions.x / 2.0
    }

    pub fn right_edge(&self) -> f32 {
        self.position.x + self.dimensions.x / 2.0
    }
}

/// Houses sharing one baseline, ordered left to right by construction.
#[derive(Debug, Clone)]
pub struct HouseRow {
    pub houses: Vec<House>,
    pub baseline_y: f32,
    pub z: f32,
    /// Houses are kept covering `[-outer_extent, outer_extent]` on x.
    pub outer_extent: f32,
}

impl HouseRow {
    pub fn new(baseline_y: f32, z: f32, outer_extent: f32) -> Self {
        Self {
            houses: Vec::new(),
            baseline_y,
            z,
            outer_extent,
        }
    }

    pub fn rightmost_edge(&self) -> Option<f32> {
        self.houses.iter().map(House::right_edge).reduce(f32::max)
    }
}

/// Small box-shaped models with authored chimneys, shared by scene tests.
#[cfg(test)]
pub(crate) fn sample_models() -> SceneModels {
    let template = |key, x: f32, y: f32, z: f32| ModelTemplate {
        key,
        mesh: None,
        dimensions: ObjectDimensions::new(x, y, z),
        chimney_loci: Vec::new(),
    };
    let houses = [(0.27, 0.30), (0.226, 0.09), (0.145, 0.19), (0.117, 0.072)]
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| ModelTemplate {
            chimney_loci: vec![Vec3::new(w * 0.15, h * 0.5, 0.0)],
            ..template(crate::resources::HOUSE_MODEL_KEYS[i], w, h, w * 0.6)
        })
        .collect();
    SceneModels {
        sleigh: template(crate::resources::MODEL_SLEIGH, 0.4, 0.12, 0.2),
        gift_box: template(crate::resources::MODEL_GIFT_BOX, 0.12, 0.12, 0.12),
        grinch: template(crate::resources::MODEL_GRINCH, 0.125, 0.25, 0.0625),
        houses,
    }
}
