use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode,
    foundation::error::{FramefitError, FramefitResult},
    foundation::math::Fnv1a64,
};

/// Relative path of the overlay served when a product image cannot be.
pub const DEFAULT_FRAME_ASSET: &str = "frames/classic-round.png";

/// Directory prefix all product overlays must live under.
const PRODUCT_PREFIX: &str = "frames/";

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// A product overlay in both prepared forms.
pub struct FrameAsset {
    /// The image as shipped, for fallback and export surfaces.
    pub source: PreparedImage,
    /// The transparency-baked variant that sits over live video.
    pub transparent: PreparedImage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier for prepared overlay assets.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Construct an [`AssetId`] from a raw 64-bit value.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
/// Immutable store of prepared overlay assets keyed by normalized path.
///
/// `prepare` front-loads all IO and decoding so per-frame code never touches
/// the filesystem. Lookup never fails: paths outside the product convention
/// and products that failed to prepare are served the default overlay.
pub struct FrameAssetStore {
    root: PathBuf,
    ids_by_path: HashMap<String, AssetId>,
    assets_by_id: HashMap<AssetId, FrameAsset>,
}

impl FrameAssetStore {
    /// Prepare the default overlay plus every listed product overlay.
    ///
    /// The default overlay must prepare cleanly; a broken product entry is
    /// logged and remapped to the default instead of failing the store.
    #[tracing::instrument(skip_all, fields(products = product_paths.len()))]
    pub fn prepare(root: impl Into<PathBuf>, product_paths: &[String]) -> FramefitResult<Self> {
        let root = root.into();
        let mut out = Self {
            root,
            ids_by_path: HashMap::new(),
            assets_by_id: HashMap::new(),
        };

        out.load(DEFAULT_FRAME_ASSET).map_err(|err| {
            FramefitError::asset(format!(
                "default overlay '{DEFAULT_FRAME_ASSET}' failed to prepare: {err}"
            ))
        })?;

        for raw in product_paths {
            let Some(norm) = conventional_path(raw) else {
                tracing::warn!(path = %raw, "product path outside '{PRODUCT_PREFIX}', serving default");
                continue;
            };
            if let Err(err) = out.load(&norm) {
                tracing::warn!(path = %norm, error = %err, "product overlay failed to prepare, serving default");
                out.ids_by_path.insert(norm, Self::hash_id(DEFAULT_FRAME_ASSET));
            }
        }

        Ok(out)
    }

    /// Root directory used when resolving relative overlay paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Id of the built-in default overlay. Always present after `prepare`.
    pub fn default_id(&self) -> AssetId {
        Self::hash_id(DEFAULT_FRAME_ASSET)
    }

    /// Resolve a product path to a prepared overlay id.
    ///
    /// Never fails: unknown or non-conventional paths get the default.
    pub fn id_for_path(&self, path: &str) -> AssetId {
        let Some(norm) = conventional_path(path) else {
            tracing::warn!(path = %path, "overlay path outside '{PRODUCT_PREFIX}', serving default");
            return self.default_id();
        };
        match self.ids_by_path.get(&norm) {
            Some(id) => *id,
            None => {
                tracing::warn!(path = %norm, "overlay not prepared, serving default");
                self.default_id()
            }
        }
    }

    /// Lookup a prepared overlay by id.
    pub fn get(&self, id: AssetId) -> FramefitResult<&FrameAsset> {
        self.assets_by_id
            .get(&id)
            .ok_or_else(|| FramefitError::asset(format!("unknown AssetId {}", id.as_u64())))
    }

    fn load(&mut self, norm_path: &str) -> FramefitResult<AssetId> {
        let id = Self::hash_id(norm_path);
        if !self.assets_by_id.contains_key(&id) {
            let path = self.root.join(Path::new(norm_path));
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read overlay bytes from '{}'", path.display()))?;
            let asset = decode::decode_frame_asset(&bytes)?;
            self.assets_by_id.insert(id, asset);
        }
        self.ids_by_path.insert(norm_path.to_string(), id);
        Ok(id)
    }

    fn hash_id(norm_path: &str) -> AssetId {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(b'F');
        hasher.write_bytes(norm_path.as_bytes());
        AssetId(hasher.finish())
    }
}

/// Normalize a product path, returning `None` when it leaves the convention.
fn conventional_path(source: &str) -> Option<String> {
    let norm = normalize_rel_path(source).ok()?;
    norm.starts_with(PRODUCT_PREFIX).then_some(norm)
}

/// Normalize and validate store-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> FramefitResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(FramefitError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(FramefitError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FramefitError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FramefitError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
