use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::data::CoreError;
use crate::embedding::cosine_similarity;
use crate::traits::{ScoredPoint, VectorIndex, VectorPoint};

/// In-process vector index with exact cosine search
#[derive(Debug, Default, Clone)]
pub struct InMemoryVectorIndex {
    points: Arc<RwLock<HashMap<Uuid, VectorPoint>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<usize, CoreError> {
        let mut stored = self.points.write();
        let count = points.len();
        for point in points {
            stored.insert(point.id, point);
        }
        Ok(count)
    }

    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, CoreError> {
        let stored = self.points.read();

        let mut scored: Vec<ScoredPoint> = stored
            .values()
            .map(|p| ScoredPoint {
                id: p.id,
                score: cosine_similarity(vector, &p.vector),
                text: p.text.clone(),
                metadata: p.metadata.clone(),
            })
            .filter(|p| score_threshold.map_or(true, |t| p.score >= t))
            .collect();

        // Ties are broken by id so results do not depend on map iteration order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(k);

        Ok(scored)
    }
}
