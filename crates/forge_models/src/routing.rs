//! Backend selection.

use crate::ProvidersConfig;
use serde::{Deserialize, Serialize};

/// The closed set of content backends.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Google Gemini `generateContent`
    Gemini,
    /// DeepSeek chat completions
    DeepSeek,
    /// Deterministic local stub
    Stub,
}

/// Backends tried, in order, when neither a region route nor a default applies.
const PREFERENCE: [ProviderKind; 2] = [ProviderKind::DeepSeek, ProviderKind::Gemini];

/// Picks exactly one backend for a request.
///
/// Order of precedence: the mock override, a configured region route for the
/// routing key, the configured default, then the first configured backend in
/// [`PREFERENCE`] order. A route or default naming an unconfigured backend is
/// skipped. When nothing is configured the stub is returned.
///
/// ```
/// use forge_models::{ProviderKind, ProvidersConfig, select_provider};
///
/// let config = ProvidersConfig::default();
/// assert_eq!(select_provider(Some("US"), &config), ProviderKind::Stub);
///
/// let config = config.with_api_key(ProviderKind::Gemini, "key");
/// assert_eq!(select_provider(None, &config), ProviderKind::Gemini);
/// ```
pub fn select_provider(routing_key: Option<&str>, config: &ProvidersConfig) -> ProviderKind {
    if *config.mock() {
        return ProviderKind::Stub;
    }

    let routed = routing_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .and_then(|key| {
            config
                .region_routes()
                .iter()
                .find(|(region, _)| region.eq_ignore_ascii_case(key))
                .map(|(_, kind)| *kind)
        });

    routed
        .into_iter()
        .chain(*config.default_provider())
        .chain(PREFERENCE)
        .find(|kind| config.is_configured(*kind))
        .unwrap_or(ProviderKind::Stub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn both_keys() -> ProvidersConfig {
        ProvidersConfig::default()
            .with_api_key(ProviderKind::Gemini, "g")
            .with_api_key(ProviderKind::DeepSeek, "d")
    }

    #[test]
    fn mock_wins_over_everything() {
        let config = both_keys().with_mock(true);
        assert_eq!(select_provider(Some("CN"), &config), ProviderKind::Stub);
    }

    #[test]
    fn region_route_is_case_insensitive() {
        let config = ProvidersConfig::builder()
            .region_routes(HashMap::from([("us".to_string(), ProviderKind::Gemini)]))
            .build()
            .unwrap()
            .with_api_key(ProviderKind::Gemini, "g")
            .with_api_key(ProviderKind::DeepSeek, "d");
        assert_eq!(select_provider(Some("US"), &config), ProviderKind::Gemini);
        assert_eq!(select_provider(Some("FR"), &config), ProviderKind::DeepSeek);
    }

    #[test]
    fn unconfigured_route_falls_through() {
        let config = ProvidersConfig::builder()
            .region_routes(HashMap::from([("CN".to_string(), ProviderKind::DeepSeek)]))
            .build()
            .unwrap()
            .with_api_key(ProviderKind::Gemini, "g");
        assert_eq!(select_provider(Some("CN"), &config), ProviderKind::Gemini);
    }

    #[test]
    fn default_provider_beats_preference() {
        let config = ProvidersConfig::builder()
            .default_provider(Some(ProviderKind::Gemini))
            .build()
            .unwrap()
            .with_api_key(ProviderKind::Gemini, "g")
            .with_api_key(ProviderKind::DeepSeek, "d");
        assert_eq!(select_provider(None, &config), ProviderKind::Gemini);
    }

    #[test]
    fn deepseek_preferred_when_both_configured() {
        assert_eq!(select_provider(None, &both_keys()), ProviderKind::DeepSeek);
    }

    #[test]
    fn blank_key_does_not_count() {
        let config = ProvidersConfig::default().with_api_key(ProviderKind::DeepSeek, "  ");
        assert_eq!(select_provider(None, &config), ProviderKind::Stub);
    }
}
