use std::collections::HashMap;
use std::collections::hash_map::Entry;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{CanonicalEntity, EntityKind, EntityLink, IdEntry};
use crate::error::TransformerError;
use crate::tme::TermSource;
use crate::transform::transform_term;

/// What to do when two different terms derive the same identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the later entity and log a warning.
    #[default]
    Overwrite,
    /// Abort the build.
    Reject,
}

#[derive(Debug, Clone)]
pub struct TaxonomySettings {
    pub kind: EntityKind,
    pub taxonomy_name: String,
    /// Prefix for link URLs, ending in `/`.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub page_size: usize,
    pub collision_policy: CollisionPolicy,
}

/// Every entity of one taxonomy, keyed by identifier, plus list links in the
/// order the source delivered the terms.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entities: HashMap<String, CanonicalEntity>,
    links: Vec<EntityLink>,
}

impl Index {
    pub fn get(&self, id: &str) -> Option<&CanonicalEntity> {
        self.entities.get(id)
    }

    pub fn links(&self) -> &[EntityLink] {
        &self.links
    }

    /// Identifiers sorted ascending.
    pub fn ids(&self) -> Vec<IdEntry> {
        let mut ids = self
            .entities
            .keys()
            .map(|id| IdEntry { id: id.clone() })
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn insert(
        &mut self,
        entity: CanonicalEntity,
        base_url: &str,
        policy: CollisionPolicy,
    ) -> Result<(), TransformerError> {
        let link = EntityLink::new(base_url, &entity.uuid);
        match self.entities.entry(entity.uuid.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(entity);
            }
            Entry::Occupied(mut slot) => {
                let first = tme_key(slot.get());
                let second = tme_key(&entity);
                if first != second {
                    if policy == CollisionPolicy::Reject {
                        return Err(TransformerError::IdentifierCollision {
                            id: entity.uuid,
                            first,
                            second,
                        });
                    }
                    warn!(
                        id = %entity.uuid,
                        %first,
                        %second,
                        "identifier collision, keeping later term"
                    );
                }
                slot.insert(entity);
            }
        }
        self.links.push(link);
        Ok(())
    }
}

impl FromIterator<(CanonicalEntity, EntityLink)> for Index {
    fn from_iter<I: IntoIterator<Item = (CanonicalEntity, EntityLink)>>(iter: I) -> Self {
        let mut index = Index::default();
        for (entity, link) in iter {
            index.entities.insert(entity.uuid.clone(), entity);
            index.links.push(link);
        }
        index
    }
}

fn tme_key(entity: &CanonicalEntity) -> String {
    entity
        .alternative_identifiers
        .tme
        .first()
        .cloned()
        .unwrap_or_default()
}

/// Drains `source` page by page until it returns an empty page. Any fetch
/// error aborts the build; no partial index is returned.
pub fn build_index<S: TermSource + ?Sized>(
    source: &S,
    taxonomy: &TaxonomySettings,
    options: &BuildOptions,
) -> Result<Index, TransformerError> {
    if options.page_size == 0 {
        return Err(TransformerError::InvalidConfig(
            "page size must be greater than zero".to_string(),
        ));
    }

    info!(kind = %taxonomy.kind, taxonomy = %taxonomy.taxonomy_name, "fetching terms from TME");
    let mut index = Index::default();
    let mut offset = 0usize;
    loop {
        let terms = source.fetch_page(offset)?;
        if terms.is_empty() {
            break;
        }
        debug!(offset, terms = terms.len(), "transforming page");
        for term in &terms {
            let entity = transform_term(term, taxonomy.kind, &taxonomy.taxonomy_name);
            index.insert(entity, &taxonomy.base_url, options.collision_policy)?;
        }
        offset += options.page_size;
    }
    info!(
        links = index.links.len(),
        entities = index.len(),
        "finished fetching terms from TME"
    );
    Ok(index)
}
