//! Qt Linguist `.ts` catalog reader.
//!
//! The reader is a single pass over `quick-xml` events. It keeps a stack
//! of open elements, each tagged with what its text is collected for, and
//! hands finished messages to a [`CatalogBuilder`], which enforces the
//! catalog invariants.
//!
//! ```xml
//! <TS version="2.1" language="de_DE">
//! <context>
//!     <name>EditorTab</name>
//!     <message numerus="yes">
//!         <location filename="src/ui/editor_tab.py" line="384"/>
//!         <source>Translated %n String with database.</source>
//!         <comment>Translated %n Strings with database.</comment>
//!         <translation>
//!             <numerusform>%n String wurde mit der Datenbank übersetzt.</numerusform>
//!             <numerusform>%n Strings wurden mit der Datenbank übersetzt.</numerusform>
//!         </translation>
//!     </message>
//! </context>
//! </TS>
//! ```

use std::cell::Cell;
use std::io::Read;
use std::mem;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::catalog::{Catalog, CatalogBuilder, MessageEntry, MessageStatus, SourceLocation};
use crate::error::{CatalogParseError, I18nResult};
use crate::locale::LocaleId;
use crate::plural::PluralRule;

/// Options for reading a catalog.
#[derive(Debug, Clone, Default)]
pub struct TsOptions {
	/// Reject catalogs whose `language` attribute names another locale.
	pub expected_locale: Option<LocaleId>,
	/// Fail with `UnsupportedLocale` instead of using the one/other rule
	/// for languages without a known plural rule.
	pub strict_plural_rule: bool,
}

/// Parse a `.ts` document with default options.
///
/// # Example
/// ```
/// use sseat_i18n::ts::parse_ts;
///
/// let catalog = parse_ts(r#"<TS version="2.1" language="de_DE">
/// <context>
///     <name>AboutDialog</name>
///     <message>
///         <source>About</source>
///         <translation>Über</translation>
///     </message>
/// </context>
/// </TS>"#).unwrap();
///
/// let entry = catalog.lookup("AboutDialog", "About", None).unwrap();
/// assert_eq!(entry.variant(0), Some("Über"));
/// ```
pub fn parse_ts(input: &str) -> I18nResult<Catalog> {
	parse_ts_with(input, &TsOptions::default())
}

/// Parse a `.ts` document.
///
/// # Errors
///
/// `CatalogParse` for malformed XML, missing required elements or
/// attributes, duplicate messages and plural variant counts that do not fit
/// the locale; `UnsupportedLocale` under [`TsOptions::strict_plural_rule`].
pub fn parse_ts_with(input: &str, options: &TsOptions) -> I18nResult<Catalog> {
	TsParser::new(input, options).run()
}

/// Read and parse a `.ts` document from a reader.
pub fn read_ts<R: Read>(mut reader: R, options: &TsOptions) -> I18nResult<Catalog> {
	let mut input = String::new();
	reader.read_to_string(&mut input)?;
	parse_ts_with(&input, options)
}

/// What the text of an open element is collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
	Root,
	Context,
	ContextName,
	Message,
	Source,
	Comment,
	Translation,
	NumerusForm,
	LengthVariant,
	Skip,
}

impl Slot {
	fn collects_text(self) -> bool {
		matches!(
			self,
			Self::ContextName
				| Self::Source
				| Self::Comment
				| Self::Translation
				| Self::NumerusForm
				| Self::LengthVariant
		)
	}
}

#[derive(Debug, Default)]
struct MessageDraft {
	line: usize,
	numerus: bool,
	source: Option<String>,
	comment: Option<String>,
	status: Option<MessageStatus>,
	translation: String,
	forms: Vec<String>,
	locations: Vec<SourceLocation>,
}

struct TsParser<'a> {
	input: &'a str,
	/// Last resolved `(byte position, line)`, so line lookups only scan forward.
	line_cursor: Cell<(usize, usize)>,
	reader: Reader<&'a [u8]>,
	options: &'a TsOptions,
	builder: Option<CatalogBuilder>,
	stack: Vec<Slot>,
	text: String,
	first_variant: Option<String>,
	variant_taken: bool,
	context: Option<String>,
	message: Option<MessageDraft>,
}

impl<'a> TsParser<'a> {
	fn new(input: &'a str, options: &'a TsOptions) -> Self {
		let mut reader = Reader::from_str(input);
		reader.config_mut().trim_text(false);

		Self {
			input,
			line_cursor: Cell::new((0, 1)),
			reader,
			options,
			builder: None,
			stack: Vec::new(),
			text: String::new(),
			first_variant: None,
			variant_taken: false,
			context: None,
			message: None,
		}
	}

	fn run(mut self) -> I18nResult<Catalog> {
		loop {
			let event = match self.reader.read_event() {
				Ok(event) => event,
				Err(e) => {
					let line = self.line_at(self.reader.error_position());
					return Err(CatalogParseError::new(line, format!("malformed XML: {e}")).into());
				}
			};

			match event {
				Event::Start(e) => self.open(&e)?,
				Event::Empty(e) => self.empty(&e)?,
				Event::End(_) => self.close()?,
				Event::Text(e) => {
					if self.collecting() {
						let text = e
							.unescape()
							.map_err(|err| self.error(format!("bad text content: {err}")))?;
						self.text.push_str(&text);
					}
				}
				Event::CData(e) => {
					if self.collecting() {
						self.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
					}
				}
				Event::Eof => break,
				_ => {}
			}
		}

		if !self.stack.is_empty() {
			return Err(self.error("unexpected end of document").into());
		}

		match self.builder.take() {
			Some(builder) => Ok(builder.build()),
			None => Err(CatalogParseError::new(1, "missing <TS> root element").into()),
		}
	}

	fn collecting(&self) -> bool {
		self.stack.last().is_some_and(|slot| slot.collects_text())
	}

	fn line_at<P: TryInto<usize>>(&self, position: P) -> usize {
		let end = position
			.try_into()
			.ok()
			.unwrap_or(usize::MAX)
			.min(self.input.len());
		let (start, line) = match self.line_cursor.get() {
			(pos, line) if pos <= end => (pos, line),
			_ => (0, 1),
		};

		let line = line
			+ self.input.as_bytes()[start..end]
				.iter()
				.filter(|&&b| b == b'\n')
				.count();
		self.line_cursor.set((end, line));
		line
	}

	fn line(&self) -> usize {
		self.line_at(self.reader.buffer_position())
	}

	fn error(&self, message: impl Into<String>) -> CatalogParseError {
		CatalogParseError::new(self.line(), message)
	}

	fn attribute(&self, e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CatalogParseError> {
		let attr = e
			.try_get_attribute(name)
			.map_err(|err| self.error(format!("bad attribute '{name}': {err}")))?;

		attr.map(|a| {
			a.decode_and_unescape_value(self.reader.decoder())
				.map(|v| v.into_owned())
				.map_err(|err| self.error(format!("bad attribute '{name}': {err}")))
		})
		.transpose()
	}

	fn open(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
		let parent = self.stack.last().copied();

		let slot = match (parent, name.as_str()) {
			(None, "TS") => {
				self.start_catalog(e)?;
				Slot::Root
			}
			(None, other) => {
				return Err(self
					.error(format!("expected <TS> root element, found <{other}>"))
					.into());
			}
			(Some(Slot::Root), "context") => {
				self.context = None;
				Slot::Context
			}
			(Some(Slot::Context), "name") => {
				self.text.clear();
				Slot::ContextName
			}
			(Some(Slot::Context), "message") => {
				if self.context.is_none() {
					return Err(self.error("<message> before the context <name>").into());
				}
				self.start_message(e)?;
				Slot::Message
			}
			(Some(Slot::Message), "source") => {
				self.text.clear();
				Slot::Source
			}
			(Some(Slot::Message), "comment") => {
				self.text.clear();
				Slot::Comment
			}
			(Some(Slot::Message), "location") => {
				self.add_location(e)?;
				Slot::Skip
			}
			(Some(Slot::Message), "translation") => {
				self.start_translation(e)?;
				Slot::Translation
			}
			(Some(Slot::Translation), "numerusform") => {
				self.text.clear();
				self.first_variant = None;
				self.variant_taken = false;
				Slot::NumerusForm
			}
			(Some(Slot::Translation | Slot::NumerusForm), "lengthvariant") => {
				if self.variant_taken {
					Slot::Skip
				} else {
					self.text.clear();
					Slot::LengthVariant
				}
			}
			_ => Slot::Skip,
		};

		self.stack.push(slot);
		Ok(())
	}

	fn empty(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let parent = self.stack.last().copied();

		match (parent, e.local_name().as_ref()) {
			(Some(slot), b"byte") if slot.collects_text() => {
				let value = self.attribute(e, "value")?.unwrap_or_default();
				let ch = decode_byte(&value)
					.ok_or_else(|| self.error(format!("bad <byte> value '{value}'")))?;
				self.text.push(ch);
				Ok(())
			}
			_ => {
				self.open(e)?;
				self.close()
			}
		}
	}

	fn close(&mut self) -> I18nResult<()> {
		let Some(slot) = self.stack.pop() else {
			return Err(self.error("unexpected closing tag").into());
		};

		match slot {
			Slot::ContextName => {
				let name = normalize_newlines(mem::take(&mut self.text));
				if let Some(builder) = self.builder.as_mut() {
					builder.context(name.clone());
				}
				self.context = Some(name);
			}
			Slot::Context => {
				if self.context.is_none() {
					return Err(self.error("<context> without <name>").into());
				}
				self.context = None;
			}
			Slot::Message => self.finish_message()?,
			Slot::Source => {
				let text = normalize_newlines(mem::take(&mut self.text));
				if let Some(message) = self.message.as_mut() {
					message.source = Some(text);
				}
			}
			Slot::Comment => {
				let text = normalize_newlines(mem::take(&mut self.text));
				if let Some(message) = self.message.as_mut() {
					message.comment = Some(text);
				}
			}
			Slot::LengthVariant => {
				self.first_variant = Some(mem::take(&mut self.text));
				self.variant_taken = true;
			}
			Slot::NumerusForm => {
				let text = self.take_leaf_text();
				if let Some(message) = self.message.as_mut() {
					message.forms.push(text);
				}
			}
			Slot::Translation => {
				let text = self.take_leaf_text();
				if let Some(message) = self.message.as_mut() {
					message.translation = text;
				}
			}
			Slot::Root | Slot::Skip => {}
		}
		Ok(())
	}

	fn start_catalog(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let declared = match self.attribute(e, "language")? {
			Some(language) if !language.trim().is_empty() => Some(
				LocaleId::parse(&language)
					.map_err(|_| self.error(format!("invalid language attribute '{language}'")))?,
			),
			_ => None,
		};

		let locale = match (declared, &self.options.expected_locale) {
			(Some(declared), Some(expected)) if &declared != expected => {
				return Err(self
					.error(format!(
						"catalog declares language {declared} but was loaded for {expected}"
					))
					.into());
			}
			(Some(declared), _) => declared,
			(None, Some(expected)) => {
				tracing::debug!("Catalog has no language attribute, assuming {}", expected);
				expected.clone()
			}
			(None, None) => return Err(self.error("<TS> has no language attribute").into()),
		};

		let rule = if self.options.strict_plural_rule {
			PluralRule::for_locale(&locale)?
		} else {
			PluralRule::for_locale_or_default(&locale)
		};

		tracing::debug!("Reading catalog for {} ({:?} plural rule)", locale, rule);
		self.builder = Some(CatalogBuilder::with_plural_rule(locale, rule));
		Ok(())
	}

	fn start_message(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let numerus = self.attribute(e, "numerus")?.as_deref() == Some("yes");
		self.message = Some(MessageDraft {
			line: self.line(),
			numerus,
			..MessageDraft::default()
		});
		Ok(())
	}

	fn add_location(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let filename = self.attribute(e, "filename")?.unwrap_or_default();
		let line = self
			.attribute(e, "line")?
			.and_then(|l| l.trim().parse::<u32>().ok());
		if let Some(message) = self.message.as_mut() {
			message.locations.push(SourceLocation { filename, line });
		}
		Ok(())
	}

	fn start_translation(&mut self, e: &BytesStart<'_>) -> I18nResult<()> {
		let status = match self.attribute(e, "type")?.as_deref() {
			None | Some("") => MessageStatus::Finished,
			Some("unfinished") => MessageStatus::Unfinished,
			Some("vanished") | Some("obsolete") => MessageStatus::Obsolete,
			Some(other) => {
				return Err(self
					.error(format!("unknown translation type '{other}'"))
					.into());
			}
		};

		if let Some(message) = self.message.as_mut() {
			message.status = Some(status);
		}
		self.text.clear();
		self.first_variant = None;
		self.variant_taken = false;
		Ok(())
	}

	/// Text of a translation or numerus form; the first length variant wins.
	fn take_leaf_text(&mut self) -> String {
		let text = mem::take(&mut self.text);
		let chosen = self.first_variant.take().unwrap_or(text);
		self.variant_taken = false;
		normalize_newlines(chosen)
	}

	fn finish_message(&mut self) -> I18nResult<()> {
		let Some(draft) = self.message.take() else {
			return Ok(());
		};
		let line = draft.line;

		let source = draft
			.source
			.ok_or_else(|| CatalogParseError::new(line, "message without <source>"))?;

		if !draft.numerus && !draft.forms.is_empty() {
			return Err(CatalogParseError::new(
				line,
				format!("message '{source}' has <numerusform> but is not numerus"),
			)
			.into());
		}

		let status = draft.status.unwrap_or(MessageStatus::Unfinished);
		let variants = if !draft.numerus {
			vec![draft.translation]
		} else if !draft.forms.is_empty() {
			draft.forms
		} else if draft.translation.trim().is_empty() {
			Vec::new()
		} else {
			vec![draft.translation]
		};

		let mut entry = MessageEntry::new(source, "").with_status(status);
		entry.set_numerus(draft.numerus);
		entry.set_variants(variants);
		if let Some(comment) = draft.comment {
			entry = entry.with_comment(comment);
		}
		for location in draft.locations {
			entry = entry.with_location(location.filename, location.line);
		}

		let (Some(builder), Some(context)) = (self.builder.as_mut(), self.context.as_deref()) else {
			return Err(CatalogParseError::new(line, "message outside of a context").into());
		};
		builder
			.add(context, entry)
			.map_err(|err| CatalogParseError::new(line, err.message))?;
		Ok(())
	}
}

/// Decode the `value` of a `<byte>` element: `x1F` (hex) or `31` (decimal).
fn decode_byte(value: &str) -> Option<char> {
	let code = match value.strip_prefix(['x', 'X']) {
		Some(hex) => u32::from_str_radix(hex, 16).ok()?,
		None => value.parse::<u32>().ok()?,
	};
	char::from_u32(code)
}

fn normalize_newlines(text: String) -> String {
	if text.contains('\r') {
		text.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		text
	}
}
