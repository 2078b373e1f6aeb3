//! # SSE Auto Translator
//!
//! Core libraries of SSE Auto Translator, a tool that manages translations
//! of Skyrim Special Edition mods.
//!
//! ## Feature Flags
//!
//! - `i18n` (default) - Localization engine: Qt Linguist catalogs, plural
//!   rules, locale switching and message resolution
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sseat::prelude::*;
//!
//! let settings = LocalizationSettings::from_file("i18n.toml").unwrap_or_default();
//! let manager = Arc::new(LocaleManager::from_settings(&settings));
//! let _guard = sseat::i18n::global::install(manager);
//!
//! println!("{}", tr_n("EditorTab", "Translated %n String with database.",
//!     Some("Translated %n Strings with database."), 5));
//! ```

#[cfg(feature = "i18n")]
pub mod i18n;

#[cfg(feature = "i18n")]
pub use sseat_i18n::{
	Catalog, I18nError, I18nResult, LocaleId, LocaleManager, LocalizationSettings, Message,
	MessageResolver, PluralRule,
};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "i18n")]
	pub use crate::i18n::{
		LazyMessage, LocaleId, LocaleManager, LocalizationSettings, Message, MessageResolver,
		SwitchOutcome, tr, tr_lazy, tr_n,
	};
}
