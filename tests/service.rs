use assert_matches::assert_matches;

use taxonomy_transformer::domain::{EntityKind, RawTerm};
use taxonomy_transformer::error::TransformerError;
use taxonomy_transformer::index::{BuildOptions, CollisionPolicy, Index, TaxonomySettings, build_index};
use taxonomy_transformer::service::{TaxonomyQuery, TaxonomyService};
use taxonomy_transformer::tme::TermSource;

struct OnePageSource(Vec<RawTerm>);

impl TermSource for OnePageSource {
    fn fetch_page(&self, offset: usize) -> Result<Vec<RawTerm>, TransformerError> {
        if offset > 0 {
            return Ok(Vec::new());
        }
        Ok(self.0.clone())
    }
}

fn built_index(terms: Vec<RawTerm>) -> Index {
    let taxonomy = TaxonomySettings {
        kind: EntityKind::AlphavilleSeries,
        taxonomy_name: "Series".to_string(),
        base_url: String::new(),
    };
    let options = BuildOptions {
        page_size: 10000,
        collision_policy: CollisionPolicy::Overwrite,
    };
    build_index(&OnePageSource(terms), &taxonomy, &options).unwrap()
}

fn sample_terms() -> Vec<RawTerm> {
    vec![
        RawTerm::new("Z_Archive", "b8337559-ac08-3404-9025-bad51ebe2fc7"),
        RawTerm::new(
            "Feature",
            "TkdRMk1XUTBORE10TURjNU1pMDBOV0V4TFRsa01HUXROV1poWmprME5HRXhPV1UyLVoyVnVjbVZ6-U2VjdGlvbnM=]",
        ),
    ]
}

#[test]
fn get_by_id_finds_entity() {
    let service = TaxonomyService::with_index(built_index(sample_terms()));
    let entity = service
        .get_by_id("41c03fd4-8f24-3130-9f20-4d25c0909594")
        .unwrap();

    assert_eq!(entity.pref_label, "Z_Archive");
    assert_eq!(entity.entity_type, "AlphavilleSeries");
    assert_eq!(
        entity.alternative_identifiers.tme,
        vec!["YjgzMzc1NTktYWMwOC0zNDA0LTkwMjUtYmFkNTFlYmUyZmM3-U2VyaWVz".to_string()]
    );
}

#[test]
fn get_by_id_unknown_is_absent() {
    let service = TaxonomyService::with_index(built_index(sample_terms()));
    assert!(service.get_by_id("some uuid").is_none());
}

#[test]
fn list_all_keeps_fetch_order() {
    let service = TaxonomyService::with_index(built_index(sample_terms()));
    let links = service.list_all().unwrap();

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].id, "41c03fd4-8f24-3130-9f20-4d25c0909594");
    assert_eq!(links[0].api_url, "41c03fd4-8f24-3130-9f20-4d25c0909594");
}

#[test]
fn list_ids_matches_entities() {
    let service = TaxonomyService::with_index(built_index(sample_terms()));
    let mut ids = service
        .list_ids()
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    let mut expected = service
        .list_all()
        .unwrap()
        .iter()
        .map(|link| link.id.clone())
        .collect::<Vec<_>>();
    ids.sort();
    expected.sort();

    assert_eq!(ids, expected);
    assert_eq!(service.count(), 2);
}

#[test]
fn empty_index_reports_nothing_found() {
    let service = TaxonomyService::with_index(built_index(Vec::new()));

    assert!(service.check_connectivity().is_ok());
    assert!(service.list_all().is_none());
    assert!(service.list_ids().is_none());
    assert_eq!(service.count(), 0);
}

#[test]
fn unpublished_service_is_not_ready() {
    let service = TaxonomyService::new();

    assert_matches!(
        service.check_connectivity(),
        Err(TransformerError::IndexNotReady)
    );
    assert!(service.list_all().is_none());
    assert!(service.index().is_none());
    assert_eq!(service.count(), 0);
}

#[test]
fn failed_build_is_reported() {
    let service = TaxonomyService::new();
    let published = service.publish(Err(TransformerError::TmeHttp(
        "Error getting taxonomy".to_string(),
    )));

    assert!(published);
    assert_matches!(
        service.check_connectivity(),
        Err(TransformerError::IndexBuildFailed(message))
            if message == "TME request failed: Error getting taxonomy"
    );
    assert!(service.get_by_id("41c03fd4-8f24-3130-9f20-4d25c0909594").is_none());
}

#[test]
fn publish_happens_once() {
    let service = TaxonomyService::with_index(built_index(sample_terms()));
    let published = service.publish(Ok(built_index(Vec::new())));

    assert!(!published);
    assert_eq!(service.count(), 2);
}
