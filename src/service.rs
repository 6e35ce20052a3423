use std::sync::OnceLock;

use crate::domain::{CanonicalEntity, EntityLink, IdEntry};
use crate::error::TransformerError;
use crate::index::Index;

/// Read-only queries over a taxonomy index.
///
/// Empty results come back as `None`, so an empty taxonomy and an unknown
/// identifier are absences rather than errors.
pub trait TaxonomyQuery: Send + Sync {
    fn list_all(&self) -> Option<&[EntityLink]>;
    /// Ordered by identifier.
    fn list_ids(&self) -> Option<Vec<IdEntry>>;
    fn get_by_id(&self, id: &str) -> Option<&CanonicalEntity>;
    fn count(&self) -> usize;
    /// `Ok` once a built index has been published.
    fn check_connectivity(&self) -> Result<(), TransformerError>;
}

#[derive(Debug)]
enum Readiness {
    Ready(Index),
    Failed(String),
}

/// Holds the index behind a one-shot publication. Readers see either nothing
/// or the complete index, never a partially built one.
#[derive(Debug, Default)]
pub struct TaxonomyService {
    state: OnceLock<Readiness>,
}

impl TaxonomyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: Index) -> Self {
        let service = Self::new();
        service.publish(Ok(index));
        service
    }

    /// Stores the build outcome. Only the first call has any effect; returns
    /// whether this call was it.
    pub fn publish(&self, outcome: Result<Index, TransformerError>) -> bool {
        let readiness = match outcome {
            Ok(index) => Readiness::Ready(index),
            Err(err) => Readiness::Failed(err.to_string()),
        };
        self.state.set(readiness).is_ok()
    }

    pub fn index(&self) -> Option<&Index> {
        match self.state.get() {
            Some(Readiness::Ready(index)) => Some(index),
            _ => None,
        }
    }
}

impl TaxonomyQuery for TaxonomyService {
    fn list_all(&self) -> Option<&[EntityLink]> {
        self.index()
            .map(Index::links)
            .filter(|links| !links.is_empty())
    }

    fn list_ids(&self) -> Option<Vec<IdEntry>> {
        self.index()
            .filter(|index| !index.is_empty())
            .map(Index::ids)
    }

    fn get_by_id(&self, id: &str) -> Option<&CanonicalEntity> {
        self.index().and_then(|index| index.get(id))
    }

    fn count(&self) -> usize {
        self.index().map(Index::len).unwrap_or(0)
    }

    fn check_connectivity(&self) -> Result<(), TransformerError> {
        match self.state.get() {
            Some(Readiness::Ready(_)) => Ok(()),
            Some(Readiness::Failed(message)) => {
                Err(TransformerError::IndexBuildFailed(message.clone()))
            }
            None => Err(TransformerError::IndexNotReady),
        }
    }
}
