//! Flat inner-product vector index with a persisted ordinal-to-chunk-id map
//!
//! The index and id map are build artifacts: written together by the offline
//! build step and loaded together, read-only, at service start. Loading one
//! without the other, or a pair whose counts disagree, fails initialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

const INDEX_FILE: &str = "index.json";
const ID_MAP_FILE: &str = "ids.json";

/// Exact nearest-neighbor index over dense vectors, scored by inner product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    /// Embedding model the vectors were built with; pinned so a query-time
    /// model mismatch is detectable
    model: String,
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Create an empty index for the given model and dimensionality
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
            vectors: Vec::new(),
        }
    }

    /// Append vectors in order; each is assigned the next available ordinal
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        for vector in &vectors {
            if vector.len() != self.dimensions {
                return Err(Error::Index(format!(
                    "Vector length {} does not match index dimensionality {}",
                    vector.len(),
                    self.dimensions
                )));
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Return the `k` nearest ordinals with their scores, most similar first,
    /// ties broken by lower ordinal. `k` may exceed the number of indexed
    /// vectors, in which case all ordinals are returned.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimensions {
            return Err(Error::Index(format!(
                "Query vector length {} does not match index dimensionality {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(ordinal, vector)| (ordinal, dot(query, vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Pinned embedding model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Index dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Ordinal-to-chunk-id map
///
/// Serialized as a JSON object with stringified ordinal keys
/// (`{"0": "a_0", "1": "b_0", ...}`); the key set must be exactly `0..N-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: Vec<String>,
}

impl IdMap {
    /// Build from ids in ordinal order
    pub fn from_ids(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// Resolve an ordinal to its chunk id
    pub fn get(&self, ordinal: usize) -> Option<&str> {
        self.ids.get(ordinal).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn to_json_map(&self) -> BTreeMap<String, String> {
        self.ids
            .iter()
            .enumerate()
            .map(|(ordinal, id)| (ordinal.to_string(), id.clone()))
            .collect()
    }

    fn from_json_map(map: BTreeMap<String, String>) -> Result<Self> {
        let mut ids = vec![None; map.len()];
        for (key, id) in map {
            let ordinal: usize = key
                .parse()
                .map_err(|_| Error::Index(format!("Id map has non-numeric ordinal key '{}'", key)))?;
            match ids.get_mut(ordinal) {
                Some(slot) => *slot = Some(id),
                None => {
                    return Err(Error::Index(format!(
                        "Id map ordinal {} is out of range for {} entries",
                        ordinal,
                        ids.len()
                    )))
                }
            }
        }
        // A BTreeMap cannot hold duplicate keys, so after the range check
        // every slot must be filled.
        let ids = ids
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Index("Id map ordinals are not contiguous".to_string()))?;
        Ok(Self { ids })
    }
}

/// The index/id-map pair persisted by the offline build
#[derive(Debug)]
pub struct IndexArtifacts {
    /// The vector index
    pub index: FlatIndex,
    /// Ordinal-to-chunk-id map
    pub id_map: IdMap,
}

impl IndexArtifacts {
    /// Assemble artifacts, checking that index and map agree on entry count
    pub fn new(index: FlatIndex, id_map: IdMap) -> Result<Self> {
        if index.len() != id_map.len() {
            return Err(Error::Index(format!(
                "Index holds {} vectors but id map has {} entries",
                index.len(),
                id_map.len()
            )));
        }
        Ok(Self { index, id_map })
    }

    /// Persist both artifacts into `dir`, atomically per file (temp write
    /// plus rename) so a partial build is never visible to the serving path
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        write_atomic(&dir.join(INDEX_FILE), &serde_json::to_vec(&self.index)?)?;
        write_atomic(
            &dir.join(ID_MAP_FILE),
            &serde_json::to_vec_pretty(&self.id_map.to_json_map())?,
        )?;

        tracing::info!(
            "Saved index artifacts to {} ({} vectors, model {})",
            dir.display(),
            self.index.len(),
            self.index.model()
        );
        Ok(())
    }

    /// Load both artifacts from `dir`, failing fast on a missing file, an
    /// index/id-map count mismatch, or a dimensionality different from
    /// `expected_dimensions` (the configured embedding provider's)
    pub fn load(dir: impl AsRef<Path>, expected_dimensions: usize) -> Result<Self> {
        let dir = dir.as_ref();
        let index_path = dir.join(INDEX_FILE);
        let id_map_path = dir.join(ID_MAP_FILE);

        if !index_path.exists() || !id_map_path.exists() {
            return Err(Error::Index(format!(
                "Index artifacts missing in {} - run the build-index step first",
                dir.display()
            )));
        }

        let index: FlatIndex = serde_json::from_slice(&std::fs::read(&index_path)?)?;
        let id_map =
            IdMap::from_json_map(serde_json::from_slice(&std::fs::read(&id_map_path)?)?)?;

        if index.dimensions() != expected_dimensions {
            return Err(Error::Index(format!(
                "Index was built with {}-dimensional embeddings (model {}) but the configured embedder produces {} dimensions",
                index.dimensions(),
                index.model(),
                expected_dimensions
            )));
        }
        if let Some(bad) = index.vectors.iter().position(|v| v.len() != index.dimensions) {
            return Err(Error::Index(format!(
                "Index vector at ordinal {} has wrong length",
                bad
            )));
        }

        tracing::info!(
            "Loaded index artifacts from {} ({} vectors, {} dims, model {})",
            dir.display(),
            index.len(),
            index.dimensions(),
            index.model()
        );

        Self::new(index, id_map)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
