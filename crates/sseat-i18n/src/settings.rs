//! Localization settings.
//!
//! ```toml
//! language = "System"        # or a locale such as "de_DE"
//! source_locale = "en_US"
//! catalog_dir = "res/loc"
//! unknown_plural_rule = "fallback"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{I18nError, I18nResult};
use crate::locale::{LocaleId, system_locale};

/// The user's language choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LanguageSetting {
	/// Follow the operating system locale.
	#[default]
	System,
	/// A fixed locale.
	Locale(LocaleId),
}

impl TryFrom<String> for LanguageSetting {
	type Error = I18nError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.trim().eq_ignore_ascii_case("system") {
			return Ok(Self::System);
		}
		LocaleId::parse(&value).map(Self::Locale)
	}
}

impl From<LanguageSetting> for String {
	fn from(value: LanguageSetting) -> Self {
		value.to_string()
	}
}

impl fmt::Display for LanguageSetting {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::System => f.write_str("System"),
			Self::Locale(locale) => write!(f, "{locale}"),
		}
	}
}

/// What to do with a catalog whose language has no known plural rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPluralRule {
	/// Use the one/other rule and log a warning.
	#[default]
	Fallback,
	/// Fail the load with `UnsupportedLocale`.
	Reject,
}

/// Localization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationSettings {
	/// Selected language.
	pub language: LanguageSetting,
	/// Language the source strings are written in. Selecting it loads no catalog.
	pub source_locale: LocaleId,
	/// Directory holding `<locale>.ts` catalogs.
	pub catalog_dir: PathBuf,
	/// Policy for languages without a plural rule.
	pub unknown_plural_rule: UnknownPluralRule,
}

impl Default for LocalizationSettings {
	fn default() -> Self {
		Self {
			language: LanguageSetting::System,
			source_locale: LocaleId::en_us(),
			catalog_dir: PathBuf::from("res/loc"),
			unknown_plural_rule: UnknownPluralRule::Fallback,
		}
	}
}

impl LocalizationSettings {
	/// Parse settings from TOML. Missing keys keep their defaults.
	pub fn from_toml_str(input: &str) -> I18nResult<Self> {
		toml::from_str(input).map_err(|e| I18nError::Settings(format!("Invalid TOML: {e}")))
	}

	/// Read settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> I18nResult<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|e| {
			I18nError::Settings(format!("Failed to read {}: {e}", path.display()))
		})?;
		Self::from_toml_str(&contents)
	}

	/// Serialize to TOML.
	pub fn to_toml_string(&self) -> I18nResult<String> {
		toml::to_string(self).map_err(|e| I18nError::Settings(e.to_string()))
	}

	/// The locale to activate, given the locales catalogs exist for.
	///
	/// `System` is resolved through the process environment. See
	/// [`effective_locale_with`](Self::effective_locale_with).
	pub fn effective_locale(&self, available: &[LocaleId]) -> LocaleId {
		let detected = match &self.language {
			LanguageSetting::System => system_locale(),
			LanguageSetting::Locale(_) => None,
		};
		self.effective_locale_with(available, detected)
	}

	/// The locale to activate, with `detected` standing in for the system locale.
	///
	/// The requested locale is used when it is the source locale or has a
	/// catalog. Otherwise a catalog of the same language is used, and failing
	/// that the source locale.
	pub fn effective_locale_with(
		&self,
		available: &[LocaleId],
		detected: Option<LocaleId>,
	) -> LocaleId {
		let requested = match &self.language {
			LanguageSetting::Locale(locale) => locale.clone(),
			LanguageSetting::System => match detected {
				Some(locale) => locale,
				None => {
					tracing::info!(
						"No system locale detected, using {}",
						self.source_locale
					);
					return self.source_locale.clone();
				}
			},
		};

		if requested == self.source_locale || available.contains(&requested) {
			return requested;
		}

		if requested.same_language(&self.source_locale) {
			return self.source_locale.clone();
		}

		if let Some(similar) = available.iter().find(|l| l.same_language(&requested)) {
			tracing::info!("No catalog for {}, using {} instead", requested, similar);
			return similar.clone();
		}

		tracing::warn!(
			"Locale {} is not supported, falling back to {}",
			requested,
			self.source_locale
		);
		self.source_locale.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	fn locale(tag: &str) -> LocaleId {
		LocaleId::parse(tag).unwrap()
	}

	#[fixture]
	fn available() -> Vec<LocaleId> {
		vec![locale("de_DE"), locale("ru_RU"), locale("zh_CN")]
	}

	#[rstest]
	fn test_defaults() {
		let settings = LocalizationSettings::default();

		assert_eq!(settings.language, LanguageSetting::System);
		assert_eq!(settings.source_locale.to_string(), "en_US");
		assert_eq!(settings.catalog_dir, PathBuf::from("res/loc"));
		assert_eq!(settings.unknown_plural_rule, UnknownPluralRule::Fallback);
	}

	#[rstest]
	fn test_from_toml_partial() {
		// Arrange
		let input = r#"
language = "de_DE"
unknown_plural_rule = "reject"
"#;

		// Act
		let settings = LocalizationSettings::from_toml_str(input).unwrap();

		// Assert
		assert_eq!(settings.language, LanguageSetting::Locale(locale("de_DE")));
		assert_eq!(settings.unknown_plural_rule, UnknownPluralRule::Reject);
		assert_eq!(settings.catalog_dir, PathBuf::from("res/loc"));
	}

	#[rstest]
	#[case("language = \"System\"", LanguageSetting::System)]
	#[case("language = \"system\"", LanguageSetting::System)]
	#[case("language = \"ru-RU\"", LanguageSetting::Locale(locale("ru_RU")))]
	fn test_language_values(#[case] input: &str, #[case] expected: LanguageSetting) {
		let settings = LocalizationSettings::from_toml_str(input).unwrap();

		assert_eq!(settings.language, expected);
	}

	#[rstest]
	#[case("language = \"C\"")]
	#[case("language = 3")]
	#[case("unknown_plural_rule = \"ignore\"")]
	#[case("catalog_dir = [")]
	fn test_invalid_settings(#[case] input: &str) {
		let result = LocalizationSettings::from_toml_str(input);

		assert!(matches!(result, Err(I18nError::Settings(_))));
	}

	#[rstest]
	fn test_toml_round_trip() {
		let settings = LocalizationSettings {
			language: LanguageSetting::Locale(locale("zh_CN")),
			..LocalizationSettings::default()
		};

		let written = settings.to_toml_string().unwrap();
		let parsed = LocalizationSettings::from_toml_str(&written).unwrap();

		assert!(written.contains("language = \"zh_CN\""));
		assert_eq!(parsed, settings);
	}

	#[rstest]
	fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("i18n.toml");
		std::fs::write(&path, "language = \"de_DE\"\ncatalog_dir = \"loc\"\n").unwrap();

		let settings = LocalizationSettings::from_file(&path).unwrap();

		assert_eq!(settings.catalog_dir, PathBuf::from("loc"));
	}

	#[rstest]
	fn test_from_missing_file() {
		let dir = tempfile::tempdir().unwrap();

		let result = LocalizationSettings::from_file(dir.path().join("missing.toml"));

		assert!(matches!(result, Err(I18nError::Settings(_))));
	}

	#[rstest]
	#[case(LanguageSetting::Locale(locale("de_DE")), None, "de_DE")]
	#[case(LanguageSetting::Locale(locale("en_US")), None, "en_US")]
	#[case(LanguageSetting::Locale(locale("en_GB")), None, "en_US")]
	#[case(LanguageSetting::Locale(locale("de_AT")), None, "de_DE")]
	#[case(LanguageSetting::Locale(locale("fr_FR")), None, "en_US")]
	#[case(LanguageSetting::System, Some(locale("ru_RU")), "ru_RU")]
	#[case(LanguageSetting::System, Some(locale("ja_JP")), "en_US")]
	#[case(LanguageSetting::System, None, "en_US")]
	fn test_effective_locale(
		available: Vec<LocaleId>,
		#[case] language: LanguageSetting,
		#[case] detected: Option<LocaleId>,
		#[case] expected: &str,
	) {
		// Arrange
		let settings = LocalizationSettings {
			language,
			..LocalizationSettings::default()
		};

		// Act
		let effective = settings.effective_locale_with(&available, detected);

		// Assert
		assert_eq!(effective.to_string(), expected);
	}
}
