//! Locale switching under concurrency, background loading and startup from settings.

use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use rstest::rstest;
use sseat_i18n::{
	Catalog, CatalogSource, I18nResult, LanguageSetting, LocaleId, LocaleManager,
	LocalizationSettings, MemorySource, Message, MessageResolver, SwitchOutcome,
	UnknownPluralRule,
};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const DE_PAIR: &str = r#"<TS version="2.1" language="de_DE"><context><name>Switch</name>
<message numerus="yes"><source>%n file</source><translation>
<numerusform>de:one:%n</numerusform><numerusform>de:other:%n</numerusform>
</translation></message>
<message><source>Title</source><translation>de:title</translation></message>
</context></TS>"#;

const RU_PAIR: &str = r#"<TS version="2.1" language="ru_RU"><context><name>Switch</name>
<message numerus="yes"><source>%n file</source><translation>
<numerusform>ru:one:%n</numerusform><numerusform>ru:few:%n</numerusform><numerusform>ru:many:%n</numerusform>
</translation></message>
<message><source>Title</source><translation>ru:title</translation></message>
</context></TS>"#;

fn locale(tag: &str) -> LocaleId {
	LocaleId::parse(tag).unwrap()
}

fn pair_source() -> MemorySource {
	MemorySource::new()
		.with_catalog(locale("de_DE"), DE_PAIR)
		.with_catalog(locale("ru_RU"), RU_PAIR)
}

/// Blocks loads of one locale until released.
struct GatedSource {
	inner: MemorySource,
	gated: LocaleId,
	gate: Mutex<Receiver<()>>,
}

impl GatedSource {
	fn new(inner: MemorySource, gated: LocaleId) -> (Self, Sender<()>) {
		let (release, gate) = mpsc::channel();
		let source = Self {
			inner,
			gated,
			gate: Mutex::new(gate),
		};
		(source, release)
	}
}

impl CatalogSource for GatedSource {
	fn load(&self, locale: &LocaleId) -> I18nResult<Catalog> {
		if locale == &self.gated {
			let _ = self.gate.lock().unwrap().recv();
		}
		self.inner.load(locale)
	}

	fn available_locales(&self) -> I18nResult<Vec<LocaleId>> {
		self.inner.available_locales()
	}
}

#[rstest]
fn test_concurrent_switch_never_mixes_catalogs() {
	// Arrange
	let manager = Arc::new(LocaleManager::new(pair_source(), LocaleId::en_us()));
	manager.preload(&locale("de_DE")).unwrap();
	manager.preload(&locale("ru_RU")).unwrap();
	let resolver = MessageResolver::new(Arc::clone(&manager));
	let done = AtomicBool::new(false);
	let allowed: HashSet<&str> = ["2 file", "de:other:2", "ru:few:2"].into_iter().collect();

	// Act
	let results: Vec<String> = thread::scope(|scope| {
		let readers: Vec<_> = (0..4)
			.map(|_| {
				let resolver = resolver.clone();
				let done = &done;
				scope.spawn(move || {
					let mut seen = Vec::new();
					while !done.load(Ordering::Acquire) {
						let message = Message::new("Switch", "%n file").with_count(2);
						seen.push(resolver.resolve(&message).unwrap());
					}
					seen
				})
			})
			.collect();

		for i in 0..500 {
			let tag = if i % 2 == 0 { "de_DE" } else { "ru_RU" };
			manager.set_locale(&locale(tag)).unwrap();
			if i % 50 == 0 {
				manager.reset();
			}
		}
		done.store(true, Ordering::Release);

		readers
			.into_iter()
			.flat_map(|r| r.join().unwrap())
			.collect()
	});

	// Assert
	for result in &results {
		assert!(allowed.contains(result.as_str()), "mixed result: {result}");
	}
}

#[rstest]
fn test_snapshot_is_consistent() {
	let manager = LocaleManager::new(pair_source(), LocaleId::en_us());
	manager.set_locale(&locale("ru_RU")).unwrap();

	let snapshot = manager.snapshot().unwrap();
	manager.set_locale(&locale("de_DE")).unwrap();

	let catalog = snapshot.catalog().unwrap();
	assert_eq!(catalog.locale(), snapshot.locale());
	assert_eq!(
		catalog.lookup("Switch", "Title", None).unwrap().variant(0),
		Some("ru:title")
	);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_superseded_background_load_is_discarded() {
	// Arrange
	let (source, release) = GatedSource::new(pair_source(), locale("de_DE"));
	let manager = Arc::new(LocaleManager::new(source, LocaleId::en_us()));

	// Act
	let pending = manager.set_locale_in_background(locale("de_DE"));
	let newer = manager.set_locale(&locale("ru_RU")).unwrap();
	release.send(()).unwrap();
	let outcome = pending.await.unwrap();

	// Assert
	assert_eq!(newer, SwitchOutcome::Installed);
	assert_eq!(outcome, SwitchOutcome::Superseded);
	assert_eq!(manager.active_locale(), Some(locale("ru_RU")));
	assert!(manager.cached_locales().contains(&locale("de_DE")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_supersedes_background_load() {
	let (source, release) = GatedSource::new(pair_source(), locale("de_DE"));
	let manager = Arc::new(LocaleManager::new(source, LocaleId::en_us()));

	let pending = manager.set_locale_in_background(locale("de_DE"));
	manager.reset();
	release.send(()).unwrap();

	assert_eq!(pending.await.unwrap(), SwitchOutcome::Superseded);
	assert_eq!(manager.active_locale(), None);
}

#[rstest]
#[tokio::test]
async fn test_background_load_installs_when_not_superseded() {
	let manager = Arc::new(LocaleManager::new(pair_source(), LocaleId::en_us()));

	let outcome = manager
		.set_locale_in_background(locale("de_DE"))
		.await
		.unwrap();

	assert_eq!(outcome, SwitchOutcome::Installed);
	let resolver = MessageResolver::new(manager);
	assert_eq!(resolver.tr("Switch", "Title"), "de:title");
}

fn settings_in(dir: &std::path::Path, language: &str) -> LocalizationSettings {
	LocalizationSettings {
		language: LanguageSetting::Locale(locale(language)),
		catalog_dir: dir.to_path_buf(),
		..LocalizationSettings::default()
	}
}

#[rstest]
fn test_from_settings_activates_catalog() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	fs::copy(
		format!("{FIXTURES}/de_DE.ts"),
		dir.path().join("de_DE.ts"),
	)
	.unwrap();

	// Act
	let manager = Arc::new(LocaleManager::from_settings(&settings_in(dir.path(), "de_DE")));

	// Assert
	assert_eq!(manager.active_locale(), Some(locale("de_DE")));
	let resolver = MessageResolver::new(manager);
	assert_eq!(resolver.tr("EditorPage", "Close"), "Schließen");
}

#[rstest]
fn test_from_settings_unsupported_language_uses_source_locale() {
	let dir = tempfile::tempdir().unwrap();
	fs::copy(
		format!("{FIXTURES}/de_DE.ts"),
		dir.path().join("de_DE.ts"),
	)
	.unwrap();

	let manager = LocaleManager::from_settings(&settings_in(dir.path(), "fr_FR"));

	let active = manager.snapshot().unwrap();
	assert_eq!(active.locale(), &LocaleId::en_us());
	assert!(active.catalog().is_none());
}

#[rstest]
fn test_from_settings_broken_catalog_stays_in_fallback() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(
		dir.path().join("de_DE.ts"),
		"<TS version=\"2.1\" language=\"de_DE\"><context>",
	)
	.unwrap();

	let manager = LocaleManager::from_settings(&settings_in(dir.path(), "de_DE"));

	assert_eq!(manager.active_locale(), None);
}

#[rstest]
fn test_from_settings_reject_policy() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(
		dir.path().join("xx_YY.ts"),
		"<TS version=\"2.1\" language=\"xx_YY\"></TS>",
	)
	.unwrap();
	let lenient = settings_in(dir.path(), "xx_YY");
	let strict = LocalizationSettings {
		unknown_plural_rule: UnknownPluralRule::Reject,
		..lenient.clone()
	};

	let lenient_manager = LocaleManager::from_settings(&lenient);
	let strict_manager = LocaleManager::from_settings(&strict);

	assert_eq!(lenient_manager.active_locale(), Some(locale("xx_YY")));
	assert_eq!(strict_manager.active_locale(), None);
}

#[rstest]
fn test_failed_switch_keeps_active_catalog() {
	let source = pair_source().with_catalog(locale("zh_CN"), "<TS language=\"zh_CN\"><context>");
	let manager = Arc::new(LocaleManager::new(source, LocaleId::en_us()));
	let resolver = MessageResolver::new(Arc::clone(&manager));
	manager.set_locale(&locale("ru_RU")).unwrap();

	let result = manager.set_locale(&locale("zh_CN"));

	assert!(result.is_err());
	assert_eq!(resolver.tr("Switch", "Title"), "ru:title");
}
