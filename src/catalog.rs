//! The static landmark catalog.
//!
//! Loaded once at startup and never mutated; lookups go through an id index
//! while listing keeps the order of the source document.

use crate::models::landmark::Landmark;
use serde::Deserialize;
use std::collections::HashMap;

const BUILTIN_CATALOG: &str = include_str!("../data/landmarks.json");

/// Name reported for comments that reference an id missing from the catalog.
pub const UNKNOWN_LANDMARK_NAME: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse landmark catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate landmark id in catalog: {0}")]
    DuplicateId(i64),
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, Default)]
pub struct LandmarkCatalog {
    landmarks: Vec<Landmark>,
    index: HashMap<i64, usize>,
}

impl LandmarkCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_landmarks(document.landmarks)
    }

    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(landmarks.len());
        for (position, landmark) in landmarks.iter().enumerate() {
            if index.insert(landmark.id, position).is_some() {
                return Err(CatalogError::DuplicateId(landmark.id));
            }
        }

        Ok(Self { landmarks, index })
    }

    pub fn all(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, id: i64) -> Option<&Landmark> {
        self.index.get(&id).map(|&position| &self.landmarks[position])
    }

    pub fn name_of(&self, id: i64) -> &str {
        self.get(id)
            .map(|landmark| landmark.name.as_str())
            .unwrap_or(UNKNOWN_LANDMARK_NAME)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}
