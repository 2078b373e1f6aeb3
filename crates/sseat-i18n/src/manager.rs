//! Active locale management.
//!
//! [`LocaleManager`] owns the one active locale of a process (or of a test)
//! and the catalogs loaded so far. Readers take a [`snapshot`] of the active
//! state: an `Arc` that stays valid and unchanged for as long as they hold
//! it, no matter how often the locale is switched meanwhile.
//!
//! Every switch takes a ticket from a generation counter before it starts
//! loading. A finished load is installed only if its ticket is still the
//! newest, so a slow load that was overtaken by a later switch is dropped.
//!
//! [`snapshot`]: LocaleManager::snapshot

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::catalog::Catalog;
use crate::error::{I18nError, I18nResult};
use crate::locale::LocaleId;
use crate::plural::PluralRule;
use crate::settings::{LocalizationSettings, UnknownPluralRule};
use crate::source::{CatalogSource, DirectorySource};

/// The installed locale together with its catalog.
///
/// The catalog is `None` when the locale is the source language, in which
/// case every message resolves to its source text.
#[derive(Debug, Clone)]
pub struct ActiveLocale {
	locale: LocaleId,
	catalog: Option<Arc<Catalog>>,
}

impl ActiveLocale {
	pub fn new(locale: LocaleId, catalog: Option<Arc<Catalog>>) -> Self {
		Self { locale, catalog }
	}

	pub fn locale(&self) -> &LocaleId {
		&self.locale
	}

	pub fn catalog(&self) -> Option<&Catalog> {
		self.catalog.as_deref()
	}

	/// Plural rule of the catalog, or of the locale when no catalog is loaded.
	pub fn plural_rule(&self) -> PluralRule {
		match &self.catalog {
			Some(catalog) => catalog.plural_rule(),
			None => PluralRule::for_locale_or_default(&self.locale),
		}
	}
}

/// Result of a locale switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
	/// The locale is now active.
	Installed,
	/// A newer switch or reset happened while loading; nothing was installed.
	Superseded,
}

/// Holds the active locale and a cache of loaded catalogs.
///
/// # Example
/// ```
/// use sseat_i18n::{LocaleId, LocaleManager, MemorySource};
///
/// let de = LocaleId::parse("de_DE").unwrap();
/// let source = MemorySource::new().with_catalog(
///     de.clone(),
///     r#"<TS version="2.1" language="de_DE"></TS>"#,
/// );
/// let manager = LocaleManager::new(source, LocaleId::en_us());
///
/// assert_eq!(manager.active_locale(), None);
/// manager.set_locale(&de).unwrap();
/// assert_eq!(manager.active_locale(), Some(de));
/// ```
pub struct LocaleManager {
	source: Arc<dyn CatalogSource>,
	source_locale: LocaleId,
	active: RwLock<Option<Arc<ActiveLocale>>>,
	cache: Mutex<HashMap<LocaleId, Arc<Catalog>>>,
	generation: AtomicU64,
}

impl LocaleManager {
	/// Create a manager in fallback mode (no active locale).
	///
	/// `source_locale` is the language of the source strings; switching to it
	/// installs no catalog.
	pub fn new(source: impl CatalogSource + 'static, source_locale: LocaleId) -> Self {
		Self {
			source: Arc::new(source),
			source_locale,
			active: RwLock::new(None),
			cache: Mutex::new(HashMap::new()),
			generation: AtomicU64::new(0),
		}
	}

	/// Create a manager from settings and activate the configured language.
	///
	/// A locale that fails to load is logged; the manager then stays in
	/// fallback mode.
	pub fn from_settings(settings: &LocalizationSettings) -> Self {
		let source = DirectorySource::new(&settings.catalog_dir)
			.strict_plural_rule(settings.unknown_plural_rule == UnknownPluralRule::Reject);
		let manager = Self::new(source, settings.source_locale.clone());

		let available = manager.available_locales().unwrap_or_else(|e| {
			tracing::error!("Failed to list catalogs: {}", e);
			vec![settings.source_locale.clone()]
		});
		let locale = settings.effective_locale(&available);

		match manager.set_locale(&locale) {
			Ok(_) => tracing::info!("Active locale: {}", locale),
			Err(e) => tracing::error!("Failed to activate locale {}: {}", locale, e),
		}
		manager
	}

	/// The language of the source strings.
	pub fn source_locale(&self) -> &LocaleId {
		&self.source_locale
	}

	/// The active locale, `None` in fallback mode.
	pub fn active_locale(&self) -> Option<LocaleId> {
		self.active.read().as_ref().map(|a| a.locale.clone())
	}

	/// The active state. Holding it keeps the catalog alive across switches.
	pub fn snapshot(&self) -> Option<Arc<ActiveLocale>> {
		self.active.read().clone()
	}

	/// Load (or take from the cache) the catalog for `locale` and make it active.
	///
	/// # Errors
	///
	/// Load and parse errors. The previously active locale stays in place.
	pub fn set_locale(&self, locale: &LocaleId) -> I18nResult<SwitchOutcome> {
		let ticket = self.next_ticket();
		let active = self.prepare(locale)?;
		Ok(self.install(ticket, active))
	}

	/// Like [`set_locale`](Self::set_locale), loading on tokio's blocking pool.
	///
	/// The switch counts as started immediately: a later `set_locale` or
	/// `reset` supersedes it even if it finishes first. Must be called from
	/// within a tokio runtime.
	pub fn set_locale_in_background(self: &Arc<Self>, locale: LocaleId) -> PendingSwitch {
		let ticket = self.next_ticket();
		let manager = Arc::clone(self);

		let handle = tokio::task::spawn_blocking(move || {
			let active = manager.prepare(&locale)?;
			Ok(manager.install(ticket, active))
		});
		PendingSwitch { handle }
	}

	/// Return to fallback mode. Pending switches are superseded.
	pub fn reset(&self) {
		self.next_ticket();
		*self.active.write() = None;
		tracing::info!("Locale reset, messages resolve to source text");
	}

	/// Load a catalog into the cache without activating it.
	pub fn preload(&self, locale: &LocaleId) -> I18nResult<()> {
		if locale != &self.source_locale {
			self.catalog(locale)?;
		}
		Ok(())
	}

	/// Locales whose catalogs are cached.
	pub fn cached_locales(&self) -> Vec<LocaleId> {
		let mut locales: Vec<LocaleId> = self.cache.lock().keys().cloned().collect();
		locales.sort_by_key(|l| l.to_string());
		locales
	}

	/// Drop cached catalogs. The active catalog stays in use.
	pub fn clear_cache(&self) {
		self.cache.lock().clear();
	}

	/// Locales that can be activated: the source locale and every catalog.
	pub fn available_locales(&self) -> I18nResult<Vec<LocaleId>> {
		let mut locales = self.source.available_locales()?;
		if !locales.contains(&self.source_locale) {
			locales.push(self.source_locale.clone());
		}
		locales.sort_by_key(|l| l.to_string());
		Ok(locales)
	}

	fn next_ticket(&self) -> u64 {
		self.generation.fetch_add(1, Ordering::SeqCst) + 1
	}

	fn prepare(&self, locale: &LocaleId) -> I18nResult<ActiveLocale> {
		let catalog = if locale == &self.source_locale {
			None
		} else {
			Some(self.catalog(locale)?)
		};

		Ok(ActiveLocale::new(locale.clone(), catalog))
	}

	fn install(&self, ticket: u64, active: ActiveLocale) -> SwitchOutcome {
		let mut slot = self.active.write();
		if self.generation.load(Ordering::SeqCst) != ticket {
			tracing::debug!("Discarding superseded load of {}", active.locale);
			return SwitchOutcome::Superseded;
		}

		tracing::info!("Switched locale to {}", active.locale);
		*slot = Some(Arc::new(active));
		SwitchOutcome::Installed
	}

	fn catalog(&self, locale: &LocaleId) -> I18nResult<Arc<Catalog>> {
		if let Some(catalog) = self.cache.lock().get(locale) {
			tracing::debug!("Catalog cache hit for {}", locale);
			return Ok(Arc::clone(catalog));
		}

		let catalog = match self.source.load(locale) {
			Ok(catalog) => Arc::new(catalog),
			Err(e) => {
				tracing::error!("Failed to load catalog for {}: {}", locale, e);
				return Err(e);
			}
		};

		let mut cache = self.cache.lock();
		Ok(Arc::clone(cache.entry(locale.clone()).or_insert(catalog)))
	}
}

impl fmt::Debug for LocaleManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocaleManager")
			.field("source_locale", &self.source_locale)
			.field("active_locale", &self.active_locale())
			.field("cached_locales", &self.cached_locales())
			.finish_non_exhaustive()
	}
}

/// A locale switch running in the background.
///
/// Resolves to the switch result once the load finished.
#[derive(Debug)]
pub struct PendingSwitch {
	handle: JoinHandle<I18nResult<SwitchOutcome>>,
}

impl PendingSwitch {
	/// Whether the load has finished.
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}
}

impl Future for PendingSwitch {
	type Output = I18nResult<SwitchOutcome>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.handle).poll(cx).map(|joined| {
			joined
				.map_err(|e| I18nError::Background(e.to_string()))
				.and_then(|result| result)
		})
	}
}
