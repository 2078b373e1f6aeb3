//! Localization error types.
//!
//! Lookup misses and unfinished entries are not errors: they resolve to the
//! source text. The variants here cover broken catalogs, locales without a
//! plural rule, and callers that break the plural contract.

use thiserror::Error;

/// Result type for localization operations.
pub type I18nResult<T> = Result<T, I18nError>;

/// Localization errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
	/// A catalog could not be parsed. The previously active catalog stays in place.
	#[error(transparent)]
	CatalogParse(#[from] CatalogParseError),

	/// No plural rule family is known for the locale.
	#[error("no plural rule for locale: {0}")]
	UnsupportedLocale(String),

	/// A plural message was resolved without a count.
	#[error("plural message '{source_text}' in context '{context}' resolved without a count")]
	MissingPluralCount {
		/// Context the message was looked up in.
		context: String,
		/// Source text of the plural message.
		source_text: String,
	},

	/// A locale tag could not be parsed.
	#[error("invalid locale: {0}")]
	InvalidLocale(String),

	/// The catalog source has nothing for the locale.
	#[error("no catalog available for locale: {0}")]
	CatalogNotFound(String),

	/// Settings could not be read or deserialized.
	#[error("settings error: {0}")]
	Settings(String),

	/// A background load task did not complete.
	#[error("background catalog load failed: {0}")]
	Background(String),

	/// IO error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// A malformed catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog parse error at line {line}: {message}")]
pub struct CatalogParseError {
	/// 1-based line the problem was detected on (0 when not tied to a position).
	pub line: usize,
	/// Description of the problem.
	pub message: String,
}

impl CatalogParseError {
	/// Create a parse error at the given line.
	pub fn new(line: usize, message: impl Into<String>) -> Self {
		Self {
			line,
			message: message.into(),
		}
	}

	/// Create a parse error not tied to a position in the document.
	pub fn structural(message: impl Into<String>) -> Self {
		Self::new(0, message)
	}
}
