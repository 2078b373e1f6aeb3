//! Placeholder substitution.
//!
//! Supported placeholders:
//!
//! | Token | Replaced by |
//! |-------|-------------|
//! | `{N}` | positional argument `N` (zero-based) |
//! | `%n`  | the count, plain digits |
//! | `%Ln` | the count with the locale's digit grouping |
//!
//! Substitution is a single left-to-right pass: replacement text is never
//! scanned again. Tokens without a value (`{7}` with two arguments, `%n`
//! without a count) and any other `{`/`%` are copied verbatim.

use crate::locale::LocaleId;

/// Separator used when no locale is given.
const DEFAULT_GROUP_SEPARATOR: char = ',';

/// Substitute placeholders in `template`.
///
/// # Example
/// ```
/// use sseat_i18n::format::substitute;
///
/// let args = ["3", "unlimited"];
/// assert_eq!(
///     substitute("API: Hourly: {0} | Daily: {1}", None, &args, None),
///     "API: Hourly: 3 | Daily: unlimited"
/// );
/// assert_eq!(
///     substitute("%n String(s)", Some(5), &[] as &[&str], None),
///     "5 String(s)"
/// );
/// ```
pub fn substitute<S: AsRef<str>>(
	template: &str,
	count: Option<i64>,
	args: &[S],
	locale: Option<&LocaleId>,
) -> String {
	let separator = locale.map_or(DEFAULT_GROUP_SEPARATOR, LocaleId::group_separator);
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(pos) = rest.find(['%', '{']) {
		out.push_str(&rest[..pos]);
		let tail = &rest[pos..];

		let (replacement, consumed) = if tail.starts_with('%') {
			count_token(tail, count, separator)
		} else {
			positional_token(tail, args)
		};

		match replacement {
			Some(text) => out.push_str(&text),
			None => out.push_str(&tail[..consumed]),
		}
		rest = &tail[consumed..];
	}

	out.push_str(rest);
	out
}

/// Format an integer with a thousands separator every three digits.
pub fn group_digits(value: i64, separator: char) -> String {
	let digits = value.unsigned_abs().to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

	if value < 0 {
		out.push('-');
	}
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(separator);
		}
		out.push(ch);
	}
	out
}

fn count_token(tail: &str, count: Option<i64>, separator: char) -> (Option<String>, usize) {
	match count {
		Some(n) if tail.starts_with("%n") => (Some(n.to_string()), 2),
		Some(n) if tail.starts_with("%Ln") => (Some(group_digits(n, separator)), 3),
		_ => (None, 1),
	}
}

fn positional_token<S: AsRef<str>>(tail: &str, args: &[S]) -> (Option<String>, usize) {
	let Some(close) = tail.find('}') else {
		return (None, 1);
	};

	let inner = &tail[1..close];
	if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
		return (None, 1);
	}

	match inner.parse::<usize>().ok().and_then(|i| args.get(i)) {
		Some(arg) => (Some(arg.as_ref().to_string()), close + 1),
		None => (None, 1),
	}
}
