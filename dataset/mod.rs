//! GeoJSON feature loading.
//!
//! Reads a FeatureCollection and turns every feature into an `(id, bounding box)` pair that
//! can be fed to a [`QuadtreeIndex`].

use crate::geometry::Rectangle;
use crate::quadtree::{IndexError, QuadtreeIndex};
use geo::BoundingRect;
use geojson::{feature::Id, Feature, GeoJson};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    #[error("feature #{index} has no geometry")]
    MissingGeometry { index: usize },

    #[error("feature #{index} has no id")]
    MissingId { index: usize },

    #[error("cannot compute a bounding box for an empty geometry")]
    EmptyGeometry,

    #[error("failed to index feature '{id}': {source}")]
    Index {
        id: String,
        #[source]
        source: IndexError,
    },
}

pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

// ============================================================================
// Conversion
// ============================================================================

/// Bounding box of a geometry.
pub fn geometry_to_bbox(geometry: &geo::Geometry<f64>) -> DatasetResult<Rectangle> {
    match geometry.bounding_rect() {
        Some(rect) => Ok(Rectangle::new(
            rect.min().x,
            rect.max().x,
            rect.min().y,
            rect.max().y,
        )),
        None => Err(DatasetError::EmptyGeometry),
    }
}

/// Feature id: `Feature.id` if present, otherwise a string or number `id` property.
fn feature_id(feature: &Feature, index: usize) -> DatasetResult<String> {
    match &feature.id {
        Some(Id::String(s)) => return Ok(s.clone()),
        Some(Id::Number(n)) => return Ok(n.to_string()),
        None => {}
    }

    match feature.property("id") {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(DatasetError::MissingId { index }),
    }
}

/// Parses a GeoJSON FeatureCollection into `(id, bounding box)` pairs, in document order.
pub fn parse_feature_collection(content: &str) -> DatasetResult<Vec<(String, Rectangle)>> {
    let collection = match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        _ => return Err(DatasetError::NotFeatureCollection),
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let id = feature_id(&feature, index)?;
        let geometry = feature
            .geometry
            .ok_or(DatasetError::MissingGeometry { index })?;
        let geometry: geo::Geometry<f64> = geometry.try_into()?;
        let bbox = geometry_to_bbox(&geometry)?;
        debug!("Feature '{}' bbox {}", id, bbox);
        features.push((id, bbox));
    }
    Ok(features)
}

/// Reads and parses a GeoJSON FeatureCollection file.
pub fn load_feature_collection<P: AsRef<Path>>(
    path: P,
) -> DatasetResult<Vec<(String, Rectangle)>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let features = parse_feature_collection(&content)?;
    info!(
        "Loaded {} features from {}",
        features.len(),
        path.as_ref().display()
    );
    Ok(features)
}

/// Inserts every feature into `index` under its position in `features`, returning how many
/// were inserted.
///
/// Positions rather than ids are stored, since ids are not required to be unique.
pub fn index_features(
    index: &mut QuadtreeIndex<usize>,
    features: &[(String, Rectangle)],
) -> DatasetResult<usize> {
    for (position, (id, bbox)) in features.iter().enumerate() {
        index
            .insert(*bbox, position)
            .map_err(|source| DatasetError::Index {
                id: id.clone(),
                source,
            })?;
    }
    info!(
        "Indexed {} features (depth {}, {} nodes)",
        features.len(),
        index.depth(),
        index.node_count()
    );
    Ok(features.len())
}

/// Features returned by a window query on an index built with [`index_features`], sorted by
/// id. With `exact`, candidates whose bounding box misses `window` are dropped.
pub fn query_features<'a>(
    index: &QuadtreeIndex<usize>,
    features: &'a [(String, Rectangle)],
    window: &Rectangle,
    exact: bool,
) -> Vec<(&'a str, Rectangle)> {
    let mut hits: Vec<(&str, Rectangle)> = index
        .query(window)
        .into_iter()
        .filter_map(|&position| features.get(position))
        .filter(|(_, bbox)| !exact || bbox.intersects(window))
        .map(|(id, bbox)| (id.as_str(), *bbox))
        .collect();
    hits.sort_by(|a, b| a.0.cmp(b.0));
    hits
}
