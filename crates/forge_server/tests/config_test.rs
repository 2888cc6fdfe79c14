use forge_models::ProviderKind;
use forge_server::{AuthBackend, DatabaseBackend, ForgeConfig, StorageBackend};
use std::collections::HashMap;
use std::io::Write;

fn user_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn local_config() -> ForgeConfig {
    let file = user_file(
        r#"
[database]
backend = "memory"
starting_credits = 3

[storage]
backend = "filesystem"
root = "/tmp/forge-artifacts"

[auth]
backend = "static"

[[auth.static_accounts]]
token = "dev"
account = "6f1c7c2e-2d8f-4a44-9d0e-5b0c1f3f4a11"

[pricing]
slides = 2

[providers.region_routes]
CN = "deepseek"
"#,
    );
    ForgeConfig::from_layers(Some(file.path())).expect("config loads")
}

#[test]
fn user_file_overrides_bundled_defaults() {
    let config = local_config();

    assert_eq!(*config.database().backend(), DatabaseBackend::Memory);
    assert_eq!(*config.database().starting_credits(), 3);
    assert_eq!(*config.storage().backend(), StorageBackend::Filesystem);
    assert_eq!(*config.auth().backend(), AuthBackend::Static);
    assert_eq!(config.auth().static_accounts().len(), 1);
    assert_eq!(*config.pricing().prices().slides(), 2);
    assert_eq!(*config.pricing().prices().lesson(), 1);
    assert_eq!(config.server().routing_header(), "x-vercel-ip-country");
    assert_eq!(config.storage().bucket(), "generated-files");
    assert!(config.validate().is_ok());
}

#[test]
fn region_routes_select_backends() {
    let config = local_config();
    let routes = config.providers().region_routes();
    let route = routes
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("cn"))
        .map(|(_, kind)| *kind);
    assert_eq!(route, Some(ProviderKind::DeepSeek));
}

#[test]
fn missing_user_file_is_an_error_when_named() {
    let result = ForgeConfig::from_layers(Some(std::path::Path::new("/nonexistent/forge.toml")));
    assert!(result.is_err());
}

#[test]
fn deployment_secrets_fill_backends() {
    let env: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://forge@localhost/forge"),
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ("GEMINI_KEY", "g-key"),
        ("MOCK_AI", "true"),
    ]
    .into_iter()
    .collect();

    let mut config = ForgeConfig::default();
    assert!(config.validate().is_err());

    config.apply_secrets(|name| env.get(name).map(|value| value.to_string()));
    assert!(config.validate().is_ok());
    assert!(*config.providers().mock());
    assert!(config.providers().is_configured(ProviderKind::Gemini));
    assert!(!config.providers().is_configured(ProviderKind::DeepSeek));
    assert_eq!(
        config.database().url().as_deref(),
        Some("postgres://forge@localhost/forge")
    );
}

#[test]
fn static_auth_needs_accounts() {
    let file = user_file(
        r#"
[database]
backend = "memory"

[storage]
backend = "filesystem"

[auth]
backend = "static"
"#,
    );
    let config = ForgeConfig::from_layers(Some(file.path())).expect("config loads");
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn local_backends_wire_without_network() {
    let artifacts = tempfile::tempdir().expect("temp dir");
    let file = user_file(&format!(
        r#"
[database]
backend = "memory"

[storage]
backend = "filesystem"
root = "{}"

[auth]
backend = "static"

[[auth.static_accounts]]
token = "dev"
account = "6f1c7c2e-2d8f-4a44-9d0e-5b0c1f3f4a11"

[providers]
mock = true
"#,
        artifacts.path().display()
    ));
    let config = ForgeConfig::from_layers(Some(file.path())).expect("config loads");
    config.validate().expect("valid");

    let limiter = std::sync::Arc::new(
        forge_rate_limit::FixedWindowLimiter::new(config.rate_limit().clone()).expect("limiter"),
    );
    let state = forge_server::build_state(&config, limiter).expect("state builds");
    assert_eq!(state.routing_header(), "x-vercel-ip-country");
}
