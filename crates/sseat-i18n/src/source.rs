//! Where catalogs come from.
//!
//! A [`CatalogSource`] turns a locale into a parsed [`Catalog`]. The
//! [`LocaleManager`](crate::LocaleManager) only talks to this trait, so
//! catalogs can live on disk ([`DirectorySource`]) or be compiled into the
//! binary ([`MemorySource`]).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::{I18nError, I18nResult};
use crate::locale::LocaleId;
use crate::ts::{TsOptions, parse_ts_with};

/// Provides catalogs by locale.
pub trait CatalogSource: Send + Sync {
	/// Load and parse the catalog for `locale`.
	///
	/// # Errors
	///
	/// `CatalogNotFound` when the source has nothing for the locale, or the
	/// parse error of a broken catalog.
	fn load(&self, locale: &LocaleId) -> I18nResult<Catalog>;

	/// Locales this source has catalogs for.
	fn available_locales(&self) -> I18nResult<Vec<LocaleId>>;
}

/// Loads `<dir>/<locale>.ts` files.
///
/// # Example
/// ```no_run
/// use sseat_i18n::{CatalogSource, DirectorySource, LocaleId};
///
/// let source = DirectorySource::new("res/loc");
/// let catalog = source.load(&LocaleId::parse("de_DE").unwrap()).unwrap();
/// println!("{} messages", catalog.len());
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
	dir: PathBuf,
	strict_plural_rule: bool,
}

impl DirectorySource {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			strict_plural_rule: false,
		}
	}

	/// Fail loads of locales without a known plural rule.
	pub fn strict_plural_rule(mut self, strict: bool) -> Self {
		self.strict_plural_rule = strict;
		self
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Path of the catalog file for `locale`.
	pub fn catalog_path(&self, locale: &LocaleId) -> PathBuf {
		self.dir.join(format!("{locale}.ts"))
	}
}

impl CatalogSource for DirectorySource {
	fn load(&self, locale: &LocaleId) -> I18nResult<Catalog> {
		let path = self.catalog_path(locale);
		if !path.is_file() {
			return Err(I18nError::CatalogNotFound(locale.to_string()));
		}

		let input = fs::read_to_string(&path)?;
		let options = TsOptions {
			expected_locale: Some(locale.clone()),
			strict_plural_rule: self.strict_plural_rule,
		};
		let catalog = parse_ts_with(&input, &options)?;

		tracing::info!(
			"Loaded catalog for {} ({} messages) from {}",
			locale,
			catalog.len(),
			path.display()
		);
		Ok(catalog)
	}

	fn available_locales(&self) -> I18nResult<Vec<LocaleId>> {
		let entries = match fs::read_dir(&self.dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!("Catalog directory {} does not exist", self.dir.display());
				return Ok(Vec::new());
			}
			Err(e) => return Err(e.into()),
		};

		let mut locales = Vec::new();
		for entry in entries {
			let path = entry?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("ts") {
				continue;
			}
			let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			match LocaleId::parse(stem) {
				Ok(locale) => locales.push(locale),
				Err(_) => tracing::debug!("Skipping {}: not a locale name", path.display()),
			}
		}

		locales.sort_by_key(|l| l.to_string());
		Ok(locales)
	}
}

/// Catalogs held in memory as `.ts` text, e.g. from `include_str!`.
///
/// Catalogs are parsed on every [`load`](CatalogSource::load); the manager
/// caches the result.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	catalogs: HashMap<LocaleId, String>,
	strict_plural_rule: bool,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a catalog document for `locale`.
	pub fn with_catalog(mut self, locale: LocaleId, document: impl Into<String>) -> Self {
		self.insert(locale, document);
		self
	}

	/// Add or replace a catalog document.
	pub fn insert(&mut self, locale: LocaleId, document: impl Into<String>) {
		self.catalogs.insert(locale, document.into());
	}

	/// Fail loads of locales without a known plural rule.
	pub fn strict_plural_rule(mut self, strict: bool) -> Self {
		self.strict_plural_rule = strict;
		self
	}
}

impl CatalogSource for MemorySource {
	fn load(&self, locale: &LocaleId) -> I18nResult<Catalog> {
		let document = self
			.catalogs
			.get(locale)
			.ok_or_else(|| I18nError::CatalogNotFound(locale.to_string()))?;

		let options = TsOptions {
			expected_locale: Some(locale.clone()),
			strict_plural_rule: self.strict_plural_rule,
		};
		let catalog = parse_ts_with(document, &options)?;

		tracing::info!(
			"Loaded in-memory catalog for {} ({} messages)",
			locale,
			catalog.len()
		);
		Ok(catalog)
	}

	fn available_locales(&self) -> I18nResult<Vec<LocaleId>> {
		let mut locales: Vec<LocaleId> = self.catalogs.keys().cloned().collect();
		locales.sort_by_key(|l| l.to_string());
		Ok(locales)
	}
}
