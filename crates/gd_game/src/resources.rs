//! Keyed store of already-loaded resource data.
//!
//! Everything the scene consumes (model text, shader source, decoded images)
//! is read once at startup into a `ResourceStore`, which is then passed by
//! reference to the scene. Missing or undecodable files are logged and simply
//! absent from the store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;

pub const MODEL_SLEIGH: &str = "models/sleigh.obj";
pub const MODEL_HOUSE_1: &str = "models/house1.obj";
pub const MODEL_HOUSE_2: &str = "models/house2.obj";
pub const MODEL_HOUSE_3: &str = "models/house3.obj";
pub const MODEL_HOUSE_4: &str = "models/house4.obj";
pub const MODEL_GIFT_BOX: &str = "models/gift_box.obj";
pub const MODEL_GRINCH: &str = "models/grinch.obj";
pub const TEXTURE_SKY_BACKDROP: &str = "textures/sky_backdrop.png";
pub const SHADER_MODEL: &str = "shaders/model.wgsl";
pub const SHADER_OVERLAY: &str = "shaders/overlay.wgsl";

pub const HOUSE_MODEL_KEYS: [&str; 4] = [MODEL_HOUSE_1, MODEL_HOUSE_2, MODEL_HOUSE_3, MODEL_HOUSE_4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Text,
    Image,
    Bytes,
}

/// Files read from the asset root at startup.
pub const ASSET_MANIFEST: &[(&str, ResourceKind)] = &[
    (MODEL_SLEIGH, ResourceKind::Text),
    (MODEL_HOUSE_1, ResourceKind::Text),
    (MODEL_HOUSE_2, ResourceKind::Text),
    (MODEL_HOUSE_3, ResourceKind::Text),
    (MODEL_HOUSE_4, ResourceKind::Text),
    (MODEL_GIFT_BOX, ResourceKind::Text),
    (MODEL_GRINCH, ResourceKind::Text),
    (TEXTURE_SKY_BACKDROP, ResourceKind::Image),
];

#[derive(Debug, Clone)]
pub enum RawResource {
    Text(String),
    Bytes(Vec<u8>),
    Image(RgbaImage),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Counts arrivals of a known number of loads and fires its completion
/// callback exactly once, after the last one.
pub struct LoadBarrier<'a> {
    expected: usize,
    summary: LoadSummary,
    on_complete: Option<Box<dyn FnOnce(LoadSummary) + 'a>>,
}

impl<'a> LoadBarrier<'a> {
    /// A barrier expecting zero loads completes immediately.
    pub fn new(expected: usize, on_complete: impl FnOnce(LoadSummary) + 'a) -> Self {
        let mut barrier = Self {
            expected,
            summary: LoadSummary::default(),
            on_complete: Some(Box::new(on_complete)),
        };
        if expected == 0 {
            barrier.fire();
        }
        barrier
    }

    /// Record one finished load. Returns true if this arrival completed the barrier.
    /// Arrivals after completion are ignored.
    pub fn arrive(&mut self, success: bool) -> bool {
        if self.is_complete() {
            log::warn!("Load barrier received an arrival after completion");
            return false;
        }
        if success {
            self.summary.loaded += 1;
        } else {
            self.summary.failed += 1;
        }
        if self.arrived() == self.expected {
            self.fire();
            return true;
        }
        false
    }

    pub fn arrived(&self) -> usize {
        self.summary.loaded + self.summary.failed
    }

    pub fn is_complete(&self) -> bool {
        self.on_complete.is_none()
    }

    fn fire(&mut self) {
        if let Some(callback) = self.on_complete.take() {
            callback(self.summary);
        }
    }
}

#[derive(Debug, Default)]
pub struct ResourceStore {
    entries: HashMap<&'static str, RawResource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding only the shaders compiled into the binary.
    pub fn with_builtin_shaders() -> Self {
        let mut store = Self::new();
        store.insert(SHADER_MODEL, RawResource::Text(gd_render::MODEL_SHADER_WGSL.to_string()));
        store.insert(
            SHADER_OVERLAY,
            RawResource::Text(gd_render::OVERLAY_SHADER_WGSL.to_string()),
        );
        store
    }

    /// Read every manifest entry below `root` on top of the built-in shaders.
    pub fn load_from_dir(root: &Path) -> (Self, LoadSummary) {
        let mut store = Self::with_builtin_shaders();
        let mut summary = LoadSummary::default();
        {
            let mut barrier = LoadBarrier::new(ASSET_MANIFEST.len(), |done| {
                summary = done;
                log::info!(
                    "Resource loading complete: {} loaded, {} failed",
                    done.loaded,
                    done.failed
                );
            });
            for &(key, kind) in ASSET_MANIFEST {
                let path = root.join(key);
                match read_resource(&path, kind) {
                    Ok(resource) => {
                        store.insert(key, resource);
                        barrier.arrive(true);
                    }
                    Err(err) => {
                        if path.exists() {
                            log::error!("{err}");
                        } else {
                            log::warn!("{err}");
                        }
                        barrier.arrive(false);
                    }
                }
            }
        }
        (store, summary)
    }

    pub fn insert(&mut self, key: &'static str, resource: RawResource) {
        self.entries.insert(key, resource);
    }

    pub fn get(&self, key: &str) -> Option<&RawResource> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            RawResource::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn image(&self, key: &str) -> Option<&RgbaImage> {
        match self.get(key)? {
            RawResource::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_resource(path: &Path, kind: ResourceKind) -> Result<RawResource, String> {
    match kind {
        ResourceKind::Text => fs::read_to_string(path)
            .map(RawResource::Text)
            .map_err(|e| format!("Failed to read text resource {}: {e}", path.display())),
        ResourceKind::Bytes => fs::read(path)
            .map(RawResource::Bytes)
            .map_err(|e| format!("Failed to read resource {}: {e}", path.display())),
        ResourceKind::Image => image::open(path)
            .map(|img| RawResource::Image(img.to_rgba8()))
            .map_err(|e| format!("Failed to load image {}: {e}", path.display())),
    }
}

/// Asset root: `GD_ASSET_ROOT` if set, otherwise `assets` in the working directory.
pub fn asset_root() -> PathBuf {
    std::env::var_os("GD_ASSET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}
