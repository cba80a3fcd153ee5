use proptest::prelude::*;
use pushbind_types::{normalize_id, normalize_id_ref, Platform};
use std::time::Duration;

#[test]
fn platform_names() {
    assert_eq!(Platform::Android.name(), "Android");
    assert_eq!(Platform::Ios.name(), "iOS");
    assert_eq!(Platform::Android.slug(), "android");
    assert_eq!(Platform::Ios.slug(), "ios");
    assert_eq!(Platform::Ios.to_string(), "iOS");
}

#[test]
fn platform_warm_up_defaults() {
    assert_eq!(Platform::Android.default_warm_up(), Duration::from_secs(3));
    assert_eq!(Platform::Ios.default_warm_up(), Duration::from_secs(5));
}

#[test]
fn platform_serde_is_lowercase() {
    assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), r#""ios""#);
    let parsed: Platform = serde_json::from_str(r#""android""#).unwrap();
    assert_eq!(parsed, Platform::Android);
}

#[test]
fn normalize_rejects_blank_and_null() {
    assert_eq!(normalize_id(None), None);
    assert_eq!(normalize_id(Some(String::new())), None);
    assert_eq!(normalize_id(Some("   ".into())), None);
    assert_eq!(normalize_id(Some("null".into())), None);
    assert_eq!(normalize_id(Some("NULL".into())), None);
    assert_eq!(normalize_id_ref(Some(" ps-123 ")), Some("ps-123".to_string()));
}

proptest! {
    #[test]
    fn normalize_keeps_non_blank_alphanumerics(id in "[a-z0-9]{1,24}") {
        prop_assume!(id != "null");
        prop_assert_eq!(normalize_id(Some(id.clone())), Some(id));
    }
}
