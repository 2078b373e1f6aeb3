//! Message catalog for one locale.
//!
//! A [`Catalog`] maps context names to the messages translated within them.
//! It is assembled once through a [`CatalogBuilder`], which enforces the
//! catalog invariants, and is read-only afterwards so it can be shared
//! between threads behind an `Arc`.

use std::collections::HashMap;

use crate::error::CatalogParseError;
use crate::locale::LocaleId;
use crate::plural::PluralRule;

/// Translation state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageStatus {
	/// Reviewed translation, used at runtime.
	#[default]
	Finished,
	/// Missing or still needs work. Resolves to the source text.
	Unfinished,
	/// The message no longer exists in the application. Resolves to the source text.
	Obsolete,
}

/// Where a message occurs in the application sources. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
	/// Source file path as written by the extraction tool.
	pub filename: String,
	/// Line number, when recorded.
	pub line: Option<u32>,
}

/// One translatable message within a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
	source: String,
	comment: Option<String>,
	numerus: bool,
	variants: Vec<String>,
	status: MessageStatus,
	locations: Vec<SourceLocation>,
}

impl MessageEntry {
	/// A finished, non-plural translation.
	pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			comment: None,
			numerus: false,
			variants: vec![translation.into()],
			status: MessageStatus::Finished,
			locations: Vec::new(),
		}
	}

	/// A finished plural translation with one variant per plural form.
	pub fn plural<I, S>(source: impl Into<String>, variants: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			source: source.into(),
			comment: None,
			numerus: true,
			variants: variants.into_iter().map(Into::into).collect(),
			status: MessageStatus::Finished,
			locations: Vec::new(),
		}
	}

	/// An untranslated message.
	pub fn unfinished(source: impl Into<String>) -> Self {
		Self {
			status: MessageStatus::Unfinished,
			..Self::new(source, "")
		}
	}

	/// Set the disambiguating comment. An empty comment means none.
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		let comment = comment.into();
		self.comment = (!comment.is_empty()).then_some(comment);
		self
	}

	/// Set the translation status.
	pub fn with_status(mut self, status: MessageStatus) -> Self {
		self.status = status;
		self
	}

	/// Add a source location.
	pub fn with_location(mut self, filename: impl Into<String>, line: Option<u32>) -> Self {
		self.locations.push(SourceLocation {
			filename: filename.into(),
			line,
		});
		self
	}

	pub(crate) fn set_numerus(&mut self, numerus: bool) {
		self.numerus = numerus;
	}

	pub(crate) fn set_variants(&mut self, variants: Vec<String>) {
		self.variants = variants;
	}

	/// The untranslated text; primary lookup key.
	pub fn source_text(&self) -> &str {
		&self.source
	}

	/// The disambiguating comment, if any.
	pub fn comment(&self) -> Option<&str> {
		self.comment.as_deref()
	}

	/// Whether the message has one variant per plural form.
	pub fn is_plural(&self) -> bool {
		self.numerus
	}

	/// Translated variants, indexed by plural form.
	pub fn variants(&self) -> &[String] {
		&self.variants
	}

	/// A single variant.
	pub fn variant(&self, index: usize) -> Option<&str> {
		self.variants.get(index).map(String::as_str)
	}

	/// Translation status.
	pub fn status(&self) -> MessageStatus {
		self.status
	}

	/// Source locations recorded for the message.
	pub fn locations(&self) -> &[SourceLocation] {
		&self.locations
	}

	/// Whether the translation may be shown to users.
	pub fn is_finished(&self) -> bool {
		self.status == MessageStatus::Finished
	}
}

#[derive(Debug, Clone, Default)]
struct ContextMessages {
	messages: Vec<MessageEntry>,
	by_source: HashMap<String, Vec<usize>>,
}

impl ContextMessages {
	fn find(&self, source: &str, comment: Option<&str>) -> Option<&MessageEntry> {
		self.by_source
			.get(source)?
			.iter()
			.map(|&i| &self.messages[i])
			.find(|entry| entry.comment() == comment)
	}
}

/// Translations of one locale, grouped by context.
///
/// # Example
/// ```
/// use sseat_i18n::{Catalog, LocaleId, MessageEntry};
///
/// let locale: LocaleId = "de_DE".parse().unwrap();
/// let catalog = Catalog::builder(locale)
///     .message("TranslationsWidget", MessageEntry::new("Rename translation", "Übersetzung umbenennen"))
///     .unwrap()
///     .build();
///
/// let entry = catalog.lookup("TranslationsWidget", "Rename translation", None).unwrap();
/// assert_eq!(entry.variant(0), Some("Übersetzung umbenennen"));
/// assert!(catalog.lookup("TranslationsWidget", "Delete", None).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
	locale: LocaleId,
	plural_rule: PluralRule,
	contexts: HashMap<String, ContextMessages>,
	len: usize,
}

impl Catalog {
	/// Start building a catalog. The plural rule is derived from the locale.
	pub fn builder(locale: LocaleId) -> CatalogBuilder {
		CatalogBuilder::new(locale)
	}

	/// The locale this catalog translates into.
	pub fn locale(&self) -> &LocaleId {
		&self.locale
	}

	/// The plural rule used to pick variants.
	pub fn plural_rule(&self) -> PluralRule {
		self.plural_rule
	}

	/// Exact lookup by context, source text and comment.
	///
	/// A miss is a normal outcome. An empty comment is the same as no comment.
	pub fn lookup(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&MessageEntry> {
		let comment = comment.filter(|c| !c.is_empty());
		self.contexts.get(context)?.find(source, comment)
	}

	/// Context names.
	pub fn contexts(&self) -> impl Iterator<Item = &str> {
		self.contexts.keys().map(String::as_str)
	}

	/// Messages of a context in document order.
	pub fn messages(&self, context: &str) -> &[MessageEntry] {
		self.contexts
			.get(context)
			.map(|c| c.messages.as_slice())
			.unwrap_or_default()
	}

	/// All `(context, message)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageEntry)> {
		self.contexts
			.iter()
			.flat_map(|(name, ctx)| ctx.messages.iter().map(move |m| (name.as_str(), m)))
	}

	/// Number of messages.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Whether the catalog has no messages.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Number of finished messages.
	pub fn finished_count(&self) -> usize {
		self.iter().filter(|(_, m)| m.is_finished()).count()
	}
}

/// Assembles a [`Catalog`], rejecting entries that break its invariants.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
	locale: LocaleId,
	plural_rule: PluralRule,
	contexts: HashMap<String, ContextMessages>,
	len: usize,
}

impl CatalogBuilder {
	/// Create a builder; unknown languages degrade to the one/other plural rule.
	pub fn new(locale: LocaleId) -> Self {
		let plural_rule = PluralRule::for_locale_or_default(&locale);
		Self::with_plural_rule(locale, plural_rule)
	}

	/// Create a builder with an explicit plural rule.
	pub fn with_plural_rule(locale: LocaleId, plural_rule: PluralRule) -> Self {
		Self {
			locale,
			plural_rule,
			contexts: HashMap::new(),
			len: 0,
		}
	}

	/// The plural rule entries are validated against.
	pub fn plural_rule(&self) -> PluralRule {
		self.plural_rule
	}

	/// Add a message to a context.
	///
	/// # Errors
	///
	/// Fails when the `(source, comment)` pair already exists in the context,
	/// or when the number of variants does not fit the plural rule.
	/// Obsolete entries are not checked for plural shape.
	pub fn add(
		&mut self,
		context: impl Into<String>,
		entry: MessageEntry,
	) -> Result<&mut Self, CatalogParseError> {
		let context = context.into();
		self.check_shape(&context, &entry)?;

		let ctx = self.contexts.entry(context.clone()).or_default();
		if ctx.find(entry.source_text(), entry.comment()).is_some() {
			return Err(CatalogParseError::structural(format!(
				"duplicate message '{}'{} in context '{}'",
				entry.source_text(),
				entry
					.comment()
					.map(|c| format!(" (comment '{c}')"))
					.unwrap_or_default(),
				context
			)));
		}

		let index = ctx.messages.len();
		ctx.by_source
			.entry(entry.source_text().to_string())
			.or_default()
			.push(index);
		ctx.messages.push(entry);
		self.len += 1;
		Ok(self)
	}

	/// Chaining form of [`CatalogBuilder::add`].
	pub fn message(
		mut self,
		context: impl Into<String>,
		entry: MessageEntry,
	) -> Result<Self, CatalogParseError> {
		self.add(context, entry)?;
		Ok(self)
	}

	/// Make sure a context exists even if it has no messages.
	pub fn context(&mut self, context: impl Into<String>) -> &mut Self {
		self.contexts.entry(context.into()).or_default();
		self
	}

	/// Finish the catalog.
	pub fn build(self) -> Catalog {
		Catalog {
			locale: self.locale,
			plural_rule: self.plural_rule,
			contexts: self.contexts,
			len: self.len,
		}
	}

	fn check_shape(&self, context: &str, entry: &MessageEntry) -> Result<(), CatalogParseError> {
		if entry.status() == MessageStatus::Obsolete {
			return Ok(());
		}

		let found = entry.variants().len();
		let expected = if entry.is_plural() {
			if found == 0 && entry.status() == MessageStatus::Unfinished {
				return Ok(());
			}
			self.plural_rule.category_count()
		} else {
			1
		};

		if found != expected {
			return Err(CatalogParseError::structural(format!(
				"message '{}' in context '{}' has {} translation variant(s), {} expects {}",
				entry.source_text(),
				context,
				found,
				self.locale,
				expected
			)));
		}
		Ok(())
	}
}
