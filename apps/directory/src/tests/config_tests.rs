use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_public_endpoint() {
    let settings = Settings::default();
    assert_eq!(settings.endpoint_url, DEFAULT_USERS_ENDPOINT);
    assert_eq!(settings.snapshot_key, "users");
    assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    assert!(settings.store_options().snapshot_max_age.is_none());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
endpoint_url = "http://localhost:9000/users"
snapshot_key = "people"
request_timeout_secs = "3"
snapshot_max_age_secs = "600"
"#,
    );

    assert_eq!(settings.endpoint_url, "http://localhost:9000/users");
    assert_eq!(settings.snapshot_key, "people");
    assert_eq!(settings.request_timeout_secs, 3);
    assert_eq!(
        settings.store_options().snapshot_max_age,
        Some(ChronoDuration::seconds(600))
    );
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "endpoint_url = [1, 2");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("DIRECTORY_ENDPOINT", "http://plain/users"),
            ("APP__ENDPOINT_URL", "http://prefixed/users"),
            ("DATABASE_URL", "sqlite://plain.db"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );

    assert_eq!(settings.endpoint_url, "http://prefixed/users");
    assert_eq!(settings.database_url, "sqlite://plain.db");
    assert_eq!(settings.request_timeout_secs, 10);
}

#[test]
fn endpoint_must_be_a_url() {
    let settings = Settings {
        endpoint_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(settings.checked_endpoint().is_err());
}

#[test]
fn database_setting_resolves_to_sqlite_url() {
    let mut settings = Settings {
        database_url: "./data/test.db".into(),
        ..Settings::default()
    };
    assert_eq!(settings.resolved_database_url(), "sqlite://./data/test.db");

    settings.database_url = "sqlite::memory:".into();
    assert_eq!(settings.resolved_database_url(), "sqlite::memory:");

    settings.database_url = "  ".into();
    assert_eq!(settings.resolved_database_url(), Settings::default().database_url);
}
