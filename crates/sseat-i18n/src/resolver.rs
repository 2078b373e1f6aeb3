//! Message resolution.
//!
//! Turns a [`Message`] (context, source text, optional comment, count and
//! arguments) into display text using the active catalog:
//!
//! 1. Without an active catalog the source text is used.
//! 2. The entry is looked up by `(context, source, comment)`, then by
//!    `(context, source)` if a comment was given and did not match.
//! 3. Missing, unfinished and obsolete entries use the source text.
//! 4. Plural entries pick the variant of the count's plural category.
//! 5. An empty variant uses the source text.
//! 6. Placeholders are substituted in whatever text was chosen.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{I18nError, I18nResult};
use crate::format::substitute;
use crate::locale::LocaleId;
use crate::manager::{ActiveLocale, LocaleManager};

/// A message to resolve.
///
/// # Example
/// ```
/// use sseat_i18n::Message;
///
/// let message = Message::new("EditorTab", "Translated %n String with database.")
///     .with_comment("Translated %n Strings with database.")
///     .with_count(5);
/// assert_eq!(message.count(), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
	context: Cow<'a, str>,
	source: Cow<'a, str>,
	comment: Option<Cow<'a, str>>,
	count: Option<i64>,
	args: Vec<String>,
}

impl<'a> Message<'a> {
	pub fn new(context: impl Into<Cow<'a, str>>, source: impl Into<Cow<'a, str>>) -> Self {
		Self {
			context: context.into(),
			source: source.into(),
			comment: None,
			count: None,
			args: Vec::new(),
		}
	}

	/// Set the disambiguating comment.
	pub fn with_comment(mut self, comment: impl Into<Cow<'a, str>>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	/// Set the count for plural selection and `%n`.
	pub fn with_count(mut self, count: i64) -> Self {
		self.count = Some(count);
		self
	}

	/// Append a positional argument.
	pub fn with_arg(mut self, arg: impl ToString) -> Self {
		self.args.push(arg.to_string());
		self
	}

	/// Append positional arguments.
	pub fn with_args<I, T>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: ToString,
	{
		self.args.extend(args.into_iter().map(|a| a.to_string()));
		self
	}

	pub fn context(&self) -> &str {
		&self.context
	}

	pub fn source_text(&self) -> &str {
		&self.source
	}

	pub fn comment(&self) -> Option<&str> {
		self.comment.as_deref()
	}

	pub fn count(&self) -> Option<i64> {
		self.count
	}

	pub fn args(&self) -> &[String] {
		&self.args
	}

	/// Detach from borrowed strings.
	pub fn into_owned(self) -> Message<'static> {
		Message {
			context: Cow::Owned(self.context.into_owned()),
			source: Cow::Owned(self.source.into_owned()),
			comment: self.comment.map(|c| Cow::Owned(c.into_owned())),
			count: self.count,
			args: self.args,
		}
	}
}

/// What to do with a plural message that has no count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingCount {
	Fail,
	FirstCategory,
}

/// Resolve `message` against an active locale, or in fallback mode if `None`.
///
/// # Errors
///
/// [`I18nError::MissingPluralCount`] when a finished plural entry is resolved
/// without a count.
pub fn resolve_with(active: Option<&ActiveLocale>, message: &Message<'_>) -> I18nResult<String> {
	render(active, message, MissingCount::Fail)
}

/// Like [`resolve_with`], but never fails.
///
/// A plural message without a count is logged as an error and uses the
/// first plural form.
pub fn resolve_lenient_with(active: Option<&ActiveLocale>, message: &Message<'_>) -> String {
	render(active, message, MissingCount::FirstCategory).unwrap_or_else(|e| {
		tracing::error!("{}", e);
		fallback(active.map(ActiveLocale::locale), message)
	})
}

fn render(
	active: Option<&ActiveLocale>,
	message: &Message<'_>,
	missing_count: MissingCount,
) -> I18nResult<String> {
	let Some(active) = active else {
		return Ok(fallback(None, message));
	};
	let locale = active.locale();
	let Some(catalog) = active.catalog() else {
		return Ok(fallback(Some(locale), message));
	};

	let context = message.context();
	let source = message.source_text();
	let entry = catalog
		.lookup(context, source, message.comment())
		.or_else(|| {
			message
				.comment()
				.and_then(|_| catalog.lookup(context, source, None))
		});

	let Some(entry) = entry else {
		tracing::trace!("No translation for '{}' in context '{}'", source, context);
		return Ok(fallback(Some(locale), message));
	};
	if !entry.is_finished() {
		return Ok(fallback(Some(locale), message));
	}

	let index = if entry.is_plural() {
		match (message.count(), missing_count) {
			(Some(count), _) => catalog.plural_rule().category_index(count),
			(None, MissingCount::Fail) => {
				return Err(I18nError::MissingPluralCount {
					context: context.to_string(),
					source_text: source.to_string(),
				});
			}
			(None, MissingCount::FirstCategory) => {
				tracing::error!(
					"Plural message '{}' in context '{}' resolved without a count",
					source,
					context
				);
				0
			}
		}
	} else {
		0
	};

	match entry.variant(index) {
		Some(text) if !text.is_empty() => Ok(substitute(
			text,
			message.count(),
			message.args(),
			Some(locale),
		)),
		_ => Ok(fallback(Some(locale), message)),
	}
}

fn fallback(locale: Option<&LocaleId>, message: &Message<'_>) -> String {
	substitute(message.source_text(), message.count(), message.args(), locale)
}

/// Resolves messages against the active locale of a [`LocaleManager`].
///
/// Each call works on one snapshot of the active catalog, so a concurrent
/// locale switch never mixes two catalogs in one result.
#[derive(Debug, Clone)]
pub struct MessageResolver {
	manager: Arc<LocaleManager>,
}

impl MessageResolver {
	pub fn new(manager: Arc<LocaleManager>) -> Self {
		Self { manager }
	}

	pub fn manager(&self) -> &Arc<LocaleManager> {
		&self.manager
	}

	/// Resolve a message.
	///
	/// # Errors
	///
	/// [`I18nError::MissingPluralCount`] for a plural message without a count.
	pub fn resolve(&self, message: &Message<'_>) -> I18nResult<String> {
		let snapshot = self.manager.snapshot();
		resolve_with(snapshot.as_deref(), message)
	}

	/// Resolve a message, logging instead of failing.
	pub fn resolve_lenient(&self, message: &Message<'_>) -> String {
		let snapshot = self.manager.snapshot();
		resolve_lenient_with(snapshot.as_deref(), message)
	}

	/// Translate `source` in `context`.
	pub fn tr(&self, context: &str, source: &str) -> String {
		self.resolve_lenient(&Message::new(context, source))
	}

	/// Translate a plural message, substituting `%n` with `count`.
	pub fn tr_n(&self, context: &str, source: &str, comment: Option<&str>, count: i64) -> String {
		let mut message = Message::new(context, source).with_count(count);
		if let Some(comment) = comment {
			message = message.with_comment(comment);
		}
		self.resolve_lenient(&message)
	}
}
