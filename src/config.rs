//! Gate settings and their JSON loader.

// self
use crate::{_prelude::*, error::ConfigError};

/// Tunables shared by every gate operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
	/// Scheme marker stripped from presented credentials before lookup.
	pub scheme_prefix: String,
	/// Length of generated secrets.
	pub secret_len: usize,
	/// Page size used when callers do not ask for one.
	pub default_page_size: usize,
	/// Upper bound applied to caller-supplied page sizes.
	pub max_page_size: usize,
}
impl GateSettings {
	const MIN_SECRET_LEN: usize = 16;

	/// Parses settings from JSON, reporting the path of the first malformed field.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let settings: Self = serde_path_to_error::deserialize(de).map_err(ConfigError::malformed)?;

		settings.validate()?;

		Ok(settings)
	}

	/// Checks cross-field constraints.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.secret_len < Self::MIN_SECRET_LEN {
			return Err(ConfigError::Invalid {
				field: "secret_len",
				reason: format!("must be at least {}", Self::MIN_SECRET_LEN),
			});
		}
		if self.default_page_size == 0 {
			return Err(ConfigError::Invalid {
				field: "default_page_size",
				reason: "must be positive".into(),
			});
		}
		if self.max_page_size < self.default_page_size {
			return Err(ConfigError::Invalid {
				field: "max_page_size",
				reason: "must not be smaller than default_page_size".into(),
			});
		}

		Ok(())
	}

	/// Clamps a caller-supplied page size; `None` or zero selects the default.
	pub fn page_size(&self, requested: Option<usize>) -> usize {
		match requested {
			Some(0) | None => self.default_page_size,
			Some(size) => size.min(self.max_page_size),
		}
	}
}
impl Default for GateSettings {
	fn default() -> Self {
		Self {
			scheme_prefix: "Bearer ".into(),
			secret_len: 48,
			default_page_size: 10,
			max_page_size: 100,
		}
	}
}
