//! Process-wide default root. Kept in its own test binary so no other test
//! observes the global.

use aecg_model::{Document, Identifier, clear_default_root, default_root};

#[test]
fn root_id_becomes_default_for_extension_only_identifiers() {
    clear_default_root();
    assert!(!Identifier::extension("S-1").has_root());

    let mut doc = Document::new();
    doc.set_root_id("2.16.840.1.113883.3.1", Some("ECG-0001"));
    assert_eq!(default_root().as_deref(), Some("2.16.840.1.113883.3.1"));
    assert_eq!(
        doc.id,
        Some(Identifier::new("2.16.840.1.113883.3.1", "ECG-0001"))
    );

    doc.set_location("SITE-7", None, None, None, None);
    let site_id = doc
        .trial()
        .and_then(|trial| trial.site.as_ref())
        .and_then(|site| site.id.clone())
        .unwrap();
    assert_eq!(site_id.to_string(), "2.16.840.1.113883.3.1^SITE-7");

    clear_default_root();
    assert_eq!(default_root(), None);
}
