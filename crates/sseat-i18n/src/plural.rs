//! Cardinal plural rules.
//!
//! A [`PluralRule`] maps a count to the index of the plural form a catalog
//! stores for it. Form order follows the order Qt Linguist writes
//! `<numerusform>` elements in, so the index can be used on a message's
//! variants directly.
//!
//! Counts are classified by magnitude: `-3` selects the same form as `3`.

use crate::error::I18nError;
use crate::locale::LocaleId;

/// CLDR plural category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
	/// Zero items.
	Zero,
	/// Singular.
	One,
	/// Dual.
	Two,
	/// Paucal.
	Few,
	/// Large quantities.
	Many,
	/// Everything else.
	Other,
}

/// A plural rule family.
///
/// # Example
/// ```
/// use sseat_i18n::{LocaleId, PluralRule};
///
/// let ru = PluralRule::for_locale(&"ru_RU".parse::<LocaleId>().unwrap()).unwrap();
/// assert_eq!(ru.category_count(), 3);
/// assert_eq!(ru.category_index(1), 0);
/// assert_eq!(ru.category_index(3), 1);
/// assert_eq!(ru.category_index(11), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
	/// One form for every count (zh, ja, ko, vi, th, tr, ...).
	Single,
	/// `n == 1` singular, the rest plural (en, de, nl, sv, it, es, ...).
	OneOther,
	/// `n == 0 || n == 1` singular, the rest plural (fr, pt_BR, ...).
	ZeroOneOther,
	/// ru, uk, be, sr, hr, bs.
	/// form 0: `n%10==1 && n%100!=11`,
	/// form 1: `n%10 in 2..=4 && n%100 not in 12..=14`,
	/// form 2: everything else.
	EastSlavic,
	/// form 0: `n==1`, form 1: `n%10 in 2..=4 && n%100 not in 12..=14`, form 2: rest.
	Polish,
	/// cs, sk. form 0: `n==1`, form 1: `n in 2..=4`, form 2: rest.
	CzechSlovak,
	/// form 0: `n%10==1 && n%100!=11`, form 1: `n%10>=2 && n%100 not in 10..=19`, form 2: rest.
	Lithuanian,
	/// form 0: `n%10==1 && n%100!=11`, form 1: `n!=0`, form 2: `n==0`.
	Latvian,
	/// form 0: `n==1`, form 1: `n==0 || n%100 in 1..=19`, form 2: rest.
	Romanian,
	/// form 0: `n%100==1`, form 1: `n%100==2`, form 2: `n%100 in 3..=4`, form 3: rest.
	Slovenian,
	/// Six forms: zero, one, two, `n%100 in 3..=10`, `n%100 >= 11`, rest.
	Arabic,
}

impl PluralRule {
	/// Select the rule family for a locale.
	///
	/// # Errors
	///
	/// Returns [`I18nError::UnsupportedLocale`] when the language has no known family.
	pub fn for_locale(locale: &LocaleId) -> Result<Self, I18nError> {
		let rule = match locale.language() {
			"zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" | "fa" | "ka" | "hu" | "lo"
			| "my" | "km" | "jv" | "su" | "bo" | "dz" | "yo" | "tt" => Self::Single,

			"pt" if locale.region() == Some("BR") => Self::ZeroOneOther,
			"fr" | "hy" | "br" | "fil" | "ti" | "wa" => Self::ZeroOneOther,

			"ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
			"pl" => Self::Polish,
			"cs" | "sk" => Self::CzechSlovak,
			"lt" => Self::Lithuanian,
			"lv" => Self::Latvian,
			"ro" => Self::Romanian,
			"sl" => Self::Slovenian,
			"ar" => Self::Arabic,

			"en" | "de" | "nl" | "sv" | "da" | "nb" | "nn" | "no" | "fi" | "et" | "it" | "es"
			| "pt" | "el" | "bg" | "ca" | "eu" | "gl" | "he" | "hi" | "af" | "sq" | "fo" | "fy"
			| "is" | "lb" | "eo" | "bn" | "ur" | "sw" => Self::OneOther,

			_ => return Err(I18nError::UnsupportedLocale(locale.to_string())),
		};
		Ok(rule)
	}

	/// Select the rule family for a locale, degrading to [`PluralRule::OneOther`].
	///
	/// The degradation is logged; callers that must not guess use [`PluralRule::for_locale`].
	pub fn for_locale_or_default(locale: &LocaleId) -> Self {
		match Self::for_locale(locale) {
			Ok(rule) => rule,
			Err(err) => {
				tracing::warn!("{}; using the one/other plural rule", err);
				Self::OneOther
			}
		}
	}

	/// Categories in form order.
	pub fn categories(&self) -> &'static [PluralCategory] {
		use PluralCategory::*;

		match self {
			Self::Single => &[Other],
			Self::OneOther | Self::ZeroOneOther => &[One, Other],
			Self::EastSlavic | Self::Polish => &[One, Few, Many],
			Self::CzechSlovak | Self::Lithuanian | Self::Romanian => &[One, Few, Other],
			Self::Latvian => &[One, Other, Zero],
			Self::Slovenian => &[One, Two, Few, Other],
			Self::Arabic => &[Zero, One, Two, Few, Many, Other],
		}
	}

	/// Number of plural forms a message needs under this rule.
	pub fn category_count(&self) -> usize {
		self.categories().len()
	}

	/// Form index for a count. Always `< self.category_count()`.
	pub fn category_index(&self, count: i64) -> usize {
		let n = count.unsigned_abs();
		let n10 = n % 10;
		let n100 = n % 100;

		match self {
			Self::Single => 0,

			Self::OneOther => usize::from(n != 1),

			Self::ZeroOneOther => usize::from(n > 1),

			Self::EastSlavic => {
				if n10 == 1 && n100 != 11 {
					0
				} else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
					1
				} else {
					2
				}
			}

			Self::Polish => {
				if n == 1 {
					0
				} else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
					1
				} else {
					2
				}
			}

			Self::CzechSlovak => {
				if n == 1 {
					0
				} else if (2..=4).contains(&n) {
					1
				} else {
					2
				}
			}

			Self::Lithuanian => {
				if n10 == 1 && n100 != 11 {
					0
				} else if n10 >= 2 && !(10..20).contains(&n100) {
					1
				} else {
					2
				}
			}

			Self::Latvian => {
				if n10 == 1 && n100 != 11 {
					0
				} else if n != 0 {
					1
				} else {
					2
				}
			}

			Self::Romanian => {
				if n == 1 {
					0
				} else if n == 0 || (1..20).contains(&n100) {
					1
				} else {
					2
				}
			}

			Self::Slovenian => match n100 {
				1 => 0,
				2 => 1,
				3 | 4 => 2,
				_ => 3,
			},

			Self::Arabic => {
				if n == 0 {
					0
				} else if n == 1 {
					1
				} else if n == 2 {
					2
				} else if (3..=10).contains(&n100) {
					3
				} else if n100 >= 11 {
					4
				} else {
					5
				}
			}
		}
	}

	/// Category for a count.
	pub fn category(&self, count: i64) -> PluralCategory {
		self.categories()[self.category_index(count)]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	fn rule(tag: &str) -> PluralRule {
		PluralRule::for_locale(&LocaleId::parse(tag).unwrap()).unwrap()
	}

	#[rstest]
	#[case("de_DE", PluralRule::OneOther)]
	#[case("en_US", PluralRule::OneOther)]
	#[case("ru_RU", PluralRule::EastSlavic)]
	#[case("uk_UA", PluralRule::EastSlavic)]
	#[case("zh_CN", PluralRule::Single)]
	#[case("ja_JP", PluralRule::Single)]
	#[case("fr_FR", PluralRule::ZeroOneOther)]
	#[case("pt_BR", PluralRule::ZeroOneOther)]
	#[case("pt_PT", PluralRule::OneOther)]
	#[case("pl_PL", PluralRule::Polish)]
	#[case("cs_CZ", PluralRule::CzechSlovak)]
	fn test_rule_selection(#[case] tag: &str, #[case] expected: PluralRule) {
		assert_eq!(rule(tag), expected);
	}

	#[rstest]
	#[case("de_DE", 2)]
	#[case("ru_RU", 3)]
	#[case("zh_CN", 1)]
	#[case("sl_SI", 4)]
	#[case("ar_EG", 6)]
	fn test_category_count(#[case] tag: &str, #[case] expected: usize) {
		assert_eq!(rule(tag).category_count(), expected);
	}

	#[rstest]
	fn test_unknown_language_is_unsupported() {
		// Arrange
		let locale = LocaleId::parse("xx_YY").unwrap();

		// Act
		let result = PluralRule::for_locale(&locale);

		// Assert
		assert!(matches!(result, Err(I18nError::UnsupportedLocale(ref l)) if l == "xx_YY"));
	}

	#[rstest]
	fn test_unknown_language_degrades_to_one_other() {
		let locale = LocaleId::parse("xx_YY").unwrap();

		assert_eq!(PluralRule::for_locale_or_default(&locale), PluralRule::OneOther);
	}

	#[rstest]
	#[case(0, 1)]
	#[case(1, 0)]
	#[case(2, 1)]
	#[case(5, 1)]
	#[case(-1, 0)]
	fn test_one_other(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(PluralRule::OneOther.category_index(count), expected);
	}

	#[rstest]
	#[case(1, 0)]
	#[case(2, 1)]
	#[case(4, 1)]
	#[case(5, 2)]
	#[case(11, 2)]
	#[case(12, 2)]
	#[case(14, 2)]
	#[case(21, 0)]
	#[case(22, 1)]
	#[case(25, 2)]
	#[case(111, 2)]
	#[case(112, 2)]
	#[case(121, 0)]
	#[case(0, 2)]
	#[case(-2, 1)]
	fn test_east_slavic(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(
			PluralRule::EastSlavic.category_index(count),
			expected,
			"Russian plural form for count={}",
			count
		);
	}

	#[rstest]
	fn test_east_slavic_categories() {
		let ru = PluralRule::EastSlavic;

		assert_eq!(ru.category(1), PluralCategory::One);
		assert_eq!(ru.category(2), PluralCategory::Few);
		assert_eq!(ru.category(5), PluralCategory::Many);
	}

	#[rstest]
	#[case(1, 0)]
	#[case(2, 1)]
	#[case(5, 2)]
	#[case(12, 2)]
	#[case(22, 1)]
	#[case(0, 2)]
	fn test_polish(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(PluralRule::Polish.category_index(count), expected);
	}

	#[rstest]
	#[case(0, 0)]
	#[case(1, 0)]
	#[case(2, 1)]
	fn test_zero_one_other(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(PluralRule::ZeroOneOther.category_index(count), expected);
	}

	#[rstest]
	#[case(0, 0)]
	#[case(1, 1)]
	#[case(2, 2)]
	#[case(3, 3)]
	#[case(10, 3)]
	#[case(11, 4)]
	#[case(99, 4)]
	#[case(100, 5)]
	fn test_arabic(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(PluralRule::Arabic.category_index(count), expected);
	}

	#[rstest]
	#[case(0, 2)]
	#[case(1, 0)]
	#[case(11, 1)]
	#[case(21, 0)]
	fn test_latvian(#[case] count: i64, #[case] expected: usize) {
		assert_eq!(PluralRule::Latvian.category_index(count), expected);
	}

	#[rstest]
	fn test_single_form_is_always_zero() {
		for count in [0, 1, 2, 5, 100, -7] {
			assert_eq!(PluralRule::Single.category_index(count), 0);
		}
	}

	const ALL_RULES: [PluralRule; 11] = [
		PluralRule::Single,
		PluralRule::OneOther,
		PluralRule::ZeroOneOther,
		PluralRule::EastSlavic,
		PluralRule::Polish,
		PluralRule::CzechSlovak,
		PluralRule::Lithuanian,
		PluralRule::Latvian,
		PluralRule::Romanian,
		PluralRule::Slovenian,
		PluralRule::Arabic,
	];

	proptest! {
		#[test]
		fn prop_index_in_range_and_deterministic(count in any::<i64>(), which in 0usize..11) {
			let rule = ALL_RULES[which];
			let first = rule.category_index(count);

			prop_assert!(first < rule.category_count());
			prop_assert_eq!(first, rule.category_index(count));
		}

		#[test]
		fn prop_negative_matches_magnitude(count in 0i64..1_000_000, which in 0usize..11) {
			let rule = ALL_RULES[which];

			prop_assert_eq!(rule.category_index(-count), rule.category_index(count));
		}
	}
}
