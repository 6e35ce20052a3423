use crate::domain::{AlternativeIdentifiers, CanonicalEntity, EntityKind, RawTerm};
use crate::identity::{composite_key, identifier_for_key};

pub fn transform_term(term: &RawTerm, kind: EntityKind, taxonomy_name: &str) -> CanonicalEntity {
    let tme_identifier = composite_key(&term.raw_id, taxonomy_name);
    let uuid = identifier_for_key(&tme_identifier).to_string();

    CanonicalEntity {
        uuid: uuid.clone(),
        alternative_identifiers: AlternativeIdentifiers {
            tme: vec![tme_identifier],
            uuids: vec![uuid],
        },
        pref_label: term.canonical_name.clone(),
        entity_type: kind.type_tag().to_string(),
    }
}
