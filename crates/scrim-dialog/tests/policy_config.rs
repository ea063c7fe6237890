use scrim_dialog::{DEFAULT_PORTAL_ATTRIBUTE, DialogConfig};

#[test]
fn empty_policy_is_default() {
    let config = DialogConfig::from_toml_str("").expect("empty policy parses");
    assert_eq!(config, DialogConfig::default());
}

#[test]
fn partial_policy_overrides_named_keys() {
    let config = DialogConfig::from_toml_str(
        r#"
        close_on_backdrop = false
        portal_attribute = "data-app-portal"
        "#,
    )
    .expect("policy parses");
    assert!(!config.close_on_backdrop);
    assert!(config.close_on_escape);
    assert_eq!(config.portal_attribute, "data-app-portal");
    assert_ne!(config.portal_attribute, DEFAULT_PORTAL_ATTRIBUTE);
}

#[test]
fn wrong_type_is_rejected() {
    assert!(DialogConfig::from_toml_str("contain_focus = \"yes\"").is_err());
}
