//! Decoded identifiers against the process-wide default root. Kept in its own
//! test binary so no other test observes the global.

use aecg_model::{Identifier, clear_default_root, set_default_root};
use aecg_validate::{DefectKind, NeverCancel, ValidationOutcome, validate};

const FIXTURE: &str = include_str!("../../aecg-xml/tests/data/annotated_ecg.xml");

fn extension_only_document() -> String {
    FIXTURE.replacen(
        r#"<id root="61d1a24f-b47e-41aa-ae95-f8ac302f4eeb"/>"#,
        r#"<id extension="ECG-1"/>"#,
        1,
    )
}

#[test]
fn decoded_extension_only_identifier_uses_default_root() {
    let xml = extension_only_document();
    assert_ne!(xml, FIXTURE);

    clear_default_root();
    let doc = aecg_xml::decode(xml.as_bytes()).unwrap();
    let ValidationOutcome::Invalid(defects) = validate(&doc, &NeverCancel) else {
        panic!("rootless identifier must be reported");
    };
    assert_eq!(defects.len(), 1);
    assert_eq!(
        defects[0].kind,
        DefectKind::IdentifierWithoutRoot {
            extension: Some("ECG-1".to_string())
        }
    );
    assert_eq!(
        defects[0].to_string(),
        "[AECG0007] /AnnotatedECG/id: identifier 'ECG-1' has no root"
    );

    set_default_root("2.16.840.1.113883.3.1");
    let doc = aecg_xml::decode(xml.as_bytes()).unwrap();
    clear_default_root();
    assert_eq!(
        doc.id,
        Some(Identifier::new("2.16.840.1.113883.3.1", "ECG-1"))
    );
    assert_eq!(validate(&doc, &NeverCancel), ValidationOutcome::Valid);
}
