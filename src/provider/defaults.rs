//! Server-side per-provider defaults consulted when a request does not override them.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	provider::{API_VERSION_PARAM, RequestParams, resolve_param},
};

/// Server-configured values for a single provider context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// Default downstream API version.
	pub api_version: Option<String>,
	/// Additional overridable parameters keyed by request parameter name.
	pub params: BTreeMap<String, String>,
}
impl ProviderConfig {
	/// Sets the default API version.
	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Sets the default for another overridable parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Server default for `key`; the API version key maps to [`api_version`](Self::api_version).
	pub fn default_for(&self, key: &str) -> Option<&str> {
		if key == API_VERSION_PARAM {
			return self.api_version.as_deref();
		}

		self.params.get(key).map(String::as_str)
	}
}

/// Registry of [`ProviderConfig`] values keyed by provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderDefaults(BTreeMap<ProviderId, ProviderConfig>);
impl ProviderDefaults {
	/// Parses a registry from a JSON object keyed by provider identifier.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de).map_err(ConfigError::malformed)
	}

	/// Registers (or replaces) the config for `provider`.
	pub fn with_provider(mut self, provider: ProviderId, config: ProviderConfig) -> Self {
		self.0.insert(provider, config);

		self
	}

	/// Returns the config registered for `provider`.
	pub fn get(&self, provider: &ProviderId) -> Option<&ProviderConfig> {
		self.0.get(provider)
	}

	/// Resolves `key` for a request routed to `provider`.
	pub fn resolve<P>(&self, provider: &ProviderId, params: &P, key: &str) -> String
	where
		P: ?Sized + RequestParams,
	{
		let server_default = self.get(provider).and_then(|config| config.default_for(key));

		resolve_param(params, key, server_default)
	}

	/// Resolves the API version for a request routed to `provider`.
	pub fn resolve_api_version<P>(&self, provider: &ProviderId, params: &P) -> String
	where
		P: ?Sized + RequestParams,
	{
		self.resolve(provider, params, API_VERSION_PARAM)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn provider(id: &str) -> ProviderId {
		ProviderId::new(id).expect("Provider fixture should be valid.")
	}

	#[test]
	fn registry_resolves_per_provider_defaults() {
		let defaults = ProviderDefaults::default()
			.with_provider(provider("azure"), ProviderConfig::default().with_api_version("2023-05-15"));
		let bare = Url::parse("https://relay.example/v1/chat").expect("URL fixture should parse.");
		let pinned = Url::parse("https://relay.example/v1/chat?api-version=2024-01-01")
			.expect("URL fixture should parse.");

		assert_eq!(defaults.resolve_api_version(&provider("azure"), &bare), "2023-05-15");
		assert_eq!(defaults.resolve_api_version(&provider("azure"), &pinned), "2024-01-01");
		assert_eq!(defaults.resolve_api_version(&provider("openai"), &bare), "");
		assert_eq!(defaults.resolve_api_version(&provider("openai"), &pinned), "2024-01-01");
	}

	#[test]
	fn loads_from_json() {
		let defaults = ProviderDefaults::from_json_str(
			r#"{ "azure": { "api_version": "2023-05-15", "params": { "deployment": "gpt-35" } } }"#,
		)
		.expect("Provider defaults should parse.");
		let params: BTreeMap<String, String> = BTreeMap::new();

		assert_eq!(defaults.resolve(&provider("azure"), &params, "deployment"), "gpt-35");
		assert_eq!(defaults.resolve_api_version(&provider("azure"), &params), "2023-05-15");
	}

	#[test]
	fn invalid_provider_keys_are_rejected() {
		let err = ProviderDefaults::from_json_str(r#"{ "bad key": {} }"#)
			.expect_err("Provider ids with whitespace should be rejected.");

		assert!(matches!(err, ConfigError::Malformed { .. }));
	}
}
