use taxonomy_transformer::domain::{AlternativeIdentifiers, CanonicalEntity, EntityKind, RawTerm};
use taxonomy_transformer::identity::derive_identity;
use taxonomy_transformer::transform::transform_term;

#[test]
fn transform_term_to_alphaville_series() {
    let term = RawTerm::new("Africa Series", "Nstein_GL_AFTM_GL_164835");
    let entity = transform_term(&term, EntityKind::AlphavilleSeries, "Series");

    assert_eq!(
        entity,
        CanonicalEntity {
            uuid: "56a141a4-9894-3559-b25b-d0142f8148ff".to_string(),
            alternative_identifiers: AlternativeIdentifiers {
                tme: vec!["TnN0ZWluX0dMX0FGVE1fR0xfMTY0ODM1-U2VyaWVz".to_string()],
                uuids: vec!["56a141a4-9894-3559-b25b-d0142f8148ff".to_string()],
            },
            pref_label: "Africa Series".to_string(),
            entity_type: "AlphavilleSeries".to_string(),
        }
    );
}

#[test]
fn transform_term_to_wsod() {
    let term = RawTerm::new("Z_Archive", "b8337559-ac08-3404-9025-bad51ebe2fc7");
    let entity = transform_term(&term, EntityKind::Wsod, "Series");

    assert_eq!(entity.uuid, "41c03fd4-8f24-3130-9f20-4d25c0909594");
    assert_eq!(entity.entity_type, "WSOD");
    assert_eq!(
        entity.alternative_identifiers.tme,
        vec!["YjgzMzc1NTktYWMwOC0zNDA0LTkwMjUtYmFkNTFlYmUyZmM3-U2VyaWVz".to_string()]
    );
}

#[test]
fn uuids_hold_the_derived_identity() {
    let term = RawTerm::new("Feature", "mNGQ2MWQ0NDMtMDc5Mi00NWExLTlkMGQtNWZhZjk0NGExOWU2-Z2VucVz");
    let entity = transform_term(&term, EntityKind::AlphavilleSeries, "Series");

    assert_eq!(
        entity.alternative_identifiers.uuids,
        vec![derive_identity(&term.raw_id, "Series").to_string()]
    );
    assert_eq!(entity.uuid, "44dc1ad7-76f1-39be-8ff1-3d5da91520ee");
}

#[test]
fn entity_serializes_in_wire_shape() {
    let term = RawTerm::new("Global Alphaville Series", "117");
    let entity = transform_term(&term, EntityKind::AlphavilleSeries, "Subjects");
    let json = serde_json::to_value(&entity).unwrap();

    assert_eq!(json["prefLabel"], "Global Alphaville Series");
    assert_eq!(json["type"], "AlphavilleSeries");
    assert_eq!(json["alternativeIdentifiers"]["TME"][0], "MTE3-U3ViamVjdHM=");
    assert_eq!(json["alternativeIdentifiers"]["uuids"][0], json["uuid"]);
}
