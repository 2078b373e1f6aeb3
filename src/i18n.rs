//! Localization module.
//!
//! This module provides catalog loading, plural rules, the active locale
//! and message resolution.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "i18n")]
//! use sseat::i18n::{LocaleManager, LocalizationSettings, MessageResolver};
//! ```

#[cfg(feature = "i18n")]
pub use sseat_i18n::*;
