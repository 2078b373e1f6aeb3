//! # sseat-i18n
//!
//! Localization engine for SSE Auto Translator.
//!
//! Translations come from Qt Linguist `.ts` catalogs, one per locale. A
//! message is identified by its context (the UI component that shows it),
//! its source text and an optional disambiguating comment. Plural messages
//! carry one translation per plural form of the locale.
//!
//! ## Components
//!
//! - [`Catalog`]: the parsed messages of one locale, see [`ts`] for the file format
//! - [`PluralRule`]: maps a count to the plural form index of a locale
//! - [`LocaleManager`]: the active locale, swapped atomically, plus a catalog cache
//! - [`MessageResolver`]: turns a [`Message`] into display text with fallback
//!   to the source text
//! - [`global`]: process-wide `tr`/`tr_n` for code without a resolver at hand
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use sseat_i18n::{LocaleId, LocaleManager, MemorySource, Message, MessageResolver};
//!
//! let de = LocaleId::parse("de_DE").unwrap();
//! let source = MemorySource::new().with_catalog(de.clone(), r#"
//! <TS version="2.1" language="de_DE">
//! <context>
//!     <name>EditorTab</name>
//!     <message numerus="yes">
//!         <source>Translated %n String with database.</source>
//!         <comment>Translated %n Strings with database.</comment>
//!         <translation>
//!             <numerusform>%n String wurde mit der Datenbank übersetzt.</numerusform>
//!             <numerusform>%n Strings wurden mit der Datenbank übersetzt.</numerusform>
//!         </translation>
//!     </message>
//! </context>
//! </TS>"#);
//!
//! let manager = Arc::new(LocaleManager::new(source, LocaleId::en_us()));
//! manager.set_locale(&de).unwrap();
//!
//! let resolver = MessageResolver::new(manager);
//! let message = Message::new("EditorTab", "Translated %n String with database.")
//!     .with_comment("Translated %n Strings with database.")
//!     .with_count(5);
//! assert_eq!(
//!     resolver.resolve(&message).unwrap(),
//!     "5 Strings wurden mit der Datenbank übersetzt."
//! );
//! ```

pub mod catalog;
pub mod error;
pub mod format;
pub mod global;
pub mod locale;
pub mod manager;
pub mod plural;
pub mod resolver;
pub mod settings;
pub mod source;
pub mod ts;

pub use catalog::{Catalog, CatalogBuilder, MessageEntry, MessageStatus, SourceLocation};
pub use error::{CatalogParseError, I18nError, I18nResult};
pub use global::{GlobalGuard, LazyMessage, tr, tr_lazy, tr_n};
pub use locale::{LocaleId, detect_locale_with, system_locale};
pub use manager::{ActiveLocale, LocaleManager, PendingSwitch, SwitchOutcome};
pub use plural::{PluralCategory, PluralRule};
pub use resolver::{Message, MessageResolver, resolve_lenient_with, resolve_with};
pub use settings::{LanguageSetting, LocalizationSettings, UnknownPluralRule};
pub use source::{CatalogSource, DirectorySource, MemorySource};
pub use ts::{TsOptions, parse_ts, parse_ts_with, read_ts};
