//! Request parameter lookup and the override precedence rule.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Query parameter carrying the downstream API version.
pub const API_VERSION_PARAM: &str = "api-version";

/// Read-only view over a request's parameters.
pub trait RequestParams {
	/// Returns the first value supplied for `key`, if any.
	fn param(&self, key: &str) -> Option<Cow<'_, str>>;
}
impl RequestParams for Url {
	fn param(&self, key: &str) -> Option<Cow<'_, str>> {
		self.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value)
	}
}
impl RequestParams for BTreeMap<String, String> {
	fn param(&self, key: &str) -> Option<Cow<'_, str>> {
		self.get(key).map(|value| Cow::Borrowed(value.as_str()))
	}
}
impl RequestParams for HashMap<String, String> {
	fn param(&self, key: &str) -> Option<Cow<'_, str>> {
		self.get(key).map(|value| Cow::Borrowed(value.as_str()))
	}
}
impl<T> RequestParams for &T
where
	T: ?Sized + RequestParams,
{
	fn param(&self, key: &str) -> Option<Cow<'_, str>> {
		(**self).param(key)
	}
}

/// Resolves `key`: the request's non-empty value wins, then `server_default`, then empty.
///
/// Callers decide whether an empty result is itself an error.
pub fn resolve_param<P>(params: &P, key: &str, server_default: Option<&str>) -> String
where
	P: ?Sized + RequestParams,
{
	match params.param(key) {
		Some(value) if !value.is_empty() => value.into_owned(),
		_ => server_default.unwrap_or_default().to_owned(),
	}
}

/// Resolves the downstream API version for a request.
pub fn resolve_api_version<P>(params: &P, server_default: &str) -> String
where
	P: ?Sized + RequestParams,
{
	resolve_param(params, API_VERSION_PARAM, Some(server_default))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse request URL fixture.")
	}

	#[test]
	fn request_value_wins_over_default() {
		let empty: BTreeMap<String, String> = BTreeMap::new();
		let overridden =
			BTreeMap::from([(API_VERSION_PARAM.to_owned(), "2024-01-01".to_owned())]);

		assert_eq!(resolve_api_version(&empty, "2023-05-15"), "2023-05-15");
		assert_eq!(resolve_api_version(&overridden, "2023-05-15"), "2024-01-01");
	}

	#[test]
	fn empty_request_value_falls_back() {
		let request = url("https://relay.example/v1/chat?api-version=&model=gpt");

		assert_eq!(resolve_api_version(&request, "2023-05-15"), "2023-05-15");
	}

	#[test]
	fn absent_everywhere_yields_empty() {
		let request = url("https://relay.example/v1/chat");

		assert_eq!(resolve_api_version(&request, ""), "");
		assert_eq!(resolve_param(&request, "deployment", None), "");
	}

	#[test]
	fn query_values_are_percent_decoded_and_first_wins() {
		let request =
			url("https://relay.example/v1/chat?api-version=2024%2D02%2D01&api-version=2020-01-01");

		assert_eq!(resolve_api_version(&request, "2023-05-15"), "2024-02-01");
	}

	#[test]
	fn hash_maps_are_supported() {
		let params = HashMap::from([("deployment".to_owned(), "gpt-4o".to_owned())]);

		assert_eq!(resolve_param(&params, "deployment", Some("gpt-35")), "gpt-4o");
	}
}
