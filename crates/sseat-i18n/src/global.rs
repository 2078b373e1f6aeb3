//! Process-wide manager for code that cannot carry a resolver around.
//!
//! Widgets and background workers call [`tr`] and [`tr_n`] directly. They
//! consult the manager installed with [`install`]; with none installed every
//! message resolves to its source text.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::I18nResult;
use crate::manager::LocaleManager;
use crate::resolver::{Message, resolve_lenient_with, resolve_with};

/// Installed managers, newest last. The last one is in effect.
static INSTALLED: Lazy<RwLock<Vec<(u64, Arc<LocaleManager>)>>> =
	Lazy::new(|| RwLock::new(Vec::new()));

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Uninstalls its manager when dropped.
///
/// Guards may be dropped in any order: dropping a guard removes only its
/// own installation, and the newest remaining one stays in effect.
#[must_use = "the manager is uninstalled when the guard is dropped"]
pub struct GlobalGuard {
	id: u64,
}

impl Drop for GlobalGuard {
	fn drop(&mut self) {
		INSTALLED.write().retain(|(id, _)| *id != self.id);
	}
}

impl fmt::Debug for GlobalGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GlobalGuard").field("id", &self.id).finish()
	}
}

/// Install `manager` as the process-wide manager.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use sseat_i18n::{LocaleId, LocaleManager, MemorySource, global};
///
/// let manager = Arc::new(LocaleManager::new(MemorySource::new(), LocaleId::en_us()));
/// let _guard = global::install(manager);
///
/// assert_eq!(global::tr("AboutDialog", "About"), "About");
/// ```
pub fn install(manager: Arc<LocaleManager>) -> GlobalGuard {
	let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
	INSTALLED.write().push((id, manager));
	GlobalGuard { id }
}

/// The installed manager, if any.
pub fn installed() -> Option<Arc<LocaleManager>> {
	INSTALLED.read().last().map(|(_, manager)| Arc::clone(manager))
}

/// Resolve a message with the installed manager.
///
/// # Errors
///
/// `MissingPluralCount` for a plural message without a count.
pub fn resolve(message: &Message<'_>) -> I18nResult<String> {
	let snapshot = installed().and_then(|m| m.snapshot());
	resolve_with(snapshot.as_deref(), message)
}

fn resolve_lenient(message: &Message<'_>) -> String {
	let snapshot = installed().and_then(|m| m.snapshot());
	resolve_lenient_with(snapshot.as_deref(), message)
}

/// Translate `source` in `context`.
pub fn tr(context: &str, source: &str) -> String {
	resolve_lenient(&Message::new(context, source))
}

/// Translate a plural message, substituting `%n` with `count`.
pub fn tr_n(context: &str, source: &str, comment: Option<&str>, count: i64) -> String {
	let mut message = Message::new(context, source).with_count(count);
	if let Some(comment) = comment {
		message = message.with_comment(comment);
	}
	resolve_lenient(&message)
}

/// A message resolved each time it is displayed.
///
/// Useful for texts defined before the locale is known, such as static error
/// messages: the translation follows the locale active at display time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyMessage {
	message: Message<'static>,
}

impl LazyMessage {
	pub fn new(message: Message<'static>) -> Self {
		Self { message }
	}

	pub fn message(&self) -> &Message<'static> {
		&self.message
	}

	/// Resolve now.
	pub fn resolve(&self) -> String {
		resolve_lenient(&self.message)
	}
}

impl fmt::Display for LazyMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.resolve())
	}
}

impl From<Message<'static>> for LazyMessage {
	fn from(message: Message<'static>) -> Self {
		Self::new(message)
	}
}

/// Lazy form of [`tr`].
pub fn tr_lazy(context: &'static str, source: &'static str) -> LazyMessage {
	LazyMessage::new(Message::new(context, source))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::locale::LocaleId;
	use crate::source::MemorySource;
	use rstest::rstest;
	use serial_test::serial;

	fn manager() -> Arc<LocaleManager> {
		let de = LocaleId::parse("de_DE").unwrap();
		let source = MemorySource::new().with_catalog(
			de.clone(),
			r#"<TS version="2.1" language="de_DE"><context><name>AboutDialog</name>
<message><source>About</source><translation>Über</translation></message>
</context></TS>"#,
		);
		let manager = Arc::new(LocaleManager::new(source, LocaleId::en_us()));
		manager.set_locale(&de).unwrap();
		manager
	}

	#[rstest]
	#[serial(i18n)]
	fn test_without_manager_is_identity() {
		assert!(installed().is_none());
		assert_eq!(tr("AboutDialog", "About"), "About");
	}

	#[rstest]
	#[serial(i18n)]
	fn test_guard_restores_previous() {
		// Arrange
		let outer = install(manager());

		// Act
		{
			let empty = Arc::new(LocaleManager::new(MemorySource::new(), LocaleId::en_us()));
			let _inner = install(empty);
			assert_eq!(tr("AboutDialog", "About"), "About");
		}

		// Assert
		assert_eq!(tr("AboutDialog", "About"), "Über");
		drop(outer);
		assert!(installed().is_none());
	}

	#[rstest]
	#[serial(i18n)]
	fn test_guards_dropped_out_of_order() {
		// Arrange
		let german = manager();
		let empty = Arc::new(LocaleManager::new(MemorySource::new(), LocaleId::en_us()));
		let outer = install(Arc::clone(&german));
		let inner = install(Arc::clone(&empty));

		// Act
		drop(outer);

		// Assert
		assert!(Arc::ptr_eq(&installed().unwrap(), &empty));
		drop(inner);
		assert!(installed().is_none());
	}

	#[rstest]
	#[serial(i18n)]
	fn test_lazy_message_follows_installed_manager() {
		let lazy = tr_lazy("AboutDialog", "About");

		assert_eq!(lazy.to_string(), "About");
		let _guard = install(manager());
		assert_eq!(format!("{lazy}"), "Über");
	}
}
