//! Locale identifiers and system locale detection.
//!
//! Locales are written the way the catalogs name them (`de_DE`, `ru_RU`,
//! `zh_CN`). Parsing also accepts BCP 47 style tags (`de-DE`) and POSIX
//! locale strings (`de_DE.UTF-8@euro`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unic_langid::{LanguageIdentifier, langid};

use crate::error::I18nError;

/// Environment variables consulted for the system locale, in priority order.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// A validated locale identifier.
///
/// # Example
/// ```
/// use sseat_i18n::LocaleId;
///
/// let locale: LocaleId = "de-de".parse().unwrap();
/// assert_eq!(locale.to_string(), "de_DE");
/// assert_eq!(locale.language(), "de");
/// assert_eq!(locale.region(), Some("DE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId(LanguageIdentifier);

impl LocaleId {
	/// Parse a locale tag.
	///
	/// Encoding (`.UTF-8`) and modifier (`@euro`) suffixes are ignored.
	/// `C`, `POSIX` and the undetermined language are rejected.
	pub fn parse(tag: &str) -> Result<Self, I18nError> {
		let trimmed = tag.trim();
		let base = trimmed
			.split(['.', '@'])
			.next()
			.unwrap_or_default()
			.trim();

		if base.is_empty() || base == "C" || base == "POSIX" {
			return Err(I18nError::InvalidLocale(tag.to_string()));
		}

		let langid: LanguageIdentifier = base
			.parse()
			.map_err(|_| I18nError::InvalidLocale(tag.to_string()))?;

		if langid.language.as_str() == "und" {
			return Err(I18nError::InvalidLocale(tag.to_string()));
		}

		Ok(Self(langid))
	}

	/// `en_US`, the language the application's source strings are written in.
	pub fn en_us() -> Self {
		Self(langid!("en-US"))
	}

	/// The lowercase language subtag (`de`).
	pub fn language(&self) -> &str {
		self.0.language.as_str()
	}

	/// The script subtag, if any (`Hans`).
	pub fn script(&self) -> Option<&str> {
		self.0.script.as_ref().map(|s| s.as_str())
	}

	/// The uppercase region subtag, if any (`DE`).
	pub fn region(&self) -> Option<&str> {
		self.0.region.as_ref().map(|r| r.as_str())
	}

	/// The underlying language identifier.
	pub fn as_langid(&self) -> &LanguageIdentifier {
		&self.0
	}

	/// Whether both locales share the language subtag.
	pub fn same_language(&self, other: &LocaleId) -> bool {
		self.language() == other.language()
	}

	/// Thousands separator used when formatting localized counts (`%Ln`).
	pub fn group_separator(&self) -> char {
		match self.language() {
			"de" | "da" | "nl" | "it" | "es" | "pt" | "id" | "tr" | "el" | "ro" | "sl" | "hr" => {
				'.'
			}
			"ru" | "uk" | "be" | "pl" | "cs" | "sk" | "fi" | "sv" | "nb" | "nn" | "no" | "bg"
			| "lt" | "lv" | "et" | "hu" => '\u{a0}',
			"fr" => '\u{202f}',
			_ => ',',
		}
	}
}

impl fmt::Display for LocaleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.language())?;
		if let Some(script) = self.script() {
			write!(f, "_{script}")?;
		}
		if let Some(region) = self.region() {
			write!(f, "_{region}")?;
		}
		Ok(())
	}
}

impl FromStr for LocaleId {
	type Err = I18nError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for LocaleId {
	type Error = I18nError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<LocaleId> for String {
	fn from(value: LocaleId) -> Self {
		value.to_string()
	}
}

/// Detect the user's locale from the process environment.
///
/// Returns `None` when no variable is set or the value is not a usable locale.
pub fn system_locale() -> Option<LocaleId> {
	detect_locale_with(|name| std::env::var(name).ok())
}

/// Detect a locale using the given environment lookup.
///
/// The first non-empty variable of `LC_ALL`, `LC_MESSAGES`, `LANG` decides.
pub fn detect_locale_with<F>(get_env: F) -> Option<LocaleId>
where
	F: Fn(&str) -> Option<String>,
{
	tracing::info!("Detecting system locale...");

	let (name, value) = LOCALE_ENV_VARS.iter().find_map(|name| {
		get_env(name)
			.filter(|v| !v.trim().is_empty())
			.map(|v| (*name, v))
	})?;

	match LocaleId::parse(&value) {
		Ok(locale) => {
			tracing::debug!("Detected system locale {} from {}", locale, name);
			Some(locale)
		}
		Err(_) => {
			tracing::warn!("Ignoring unusable locale '{}' from {}", value, name);
			None
		}
	}
}
