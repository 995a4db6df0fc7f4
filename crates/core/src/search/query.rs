//! Query tokenizer and filter classifier.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::schema::ReferenceKind;

/// `key:"quoted phrase"`, `key:value`, `"bare phrase"` or a bare word.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\w+:"[^"]+"|\w+:\S+|"(?P<phrase>[^"]+)"|\S+"#)
        .expect("token pattern is valid")
});

/// One of the seven recognized query fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    Tag,
    Character,
    Artist,
    Group,
    Parody,
    Title,
    Id,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Tag,
        FilterKey::Character,
        FilterKey::Artist,
        FilterKey::Group,
        FilterKey::Parody,
        FilterKey::Title,
        FilterKey::Id,
    ];

    /// Parse a field prefix (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tag" => Some(FilterKey::Tag),
            "character" => Some(FilterKey::Character),
            "artist" => Some(FilterKey::Artist),
            "mgroup" => Some(FilterKey::Group),
            "parody" => Some(FilterKey::Parody),
            "title" => Some(FilterKey::Title),
            "id" => Some(FilterKey::Id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Tag => "tag",
            FilterKey::Character => "character",
            FilterKey::Artist => "artist",
            FilterKey::Group => "mgroup",
            FilterKey::Parody => "parody",
            FilterKey::Title => "title",
            FilterKey::Id => "id",
        }
    }

    /// The reference entity backing this key, if any.
    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        match self {
            FilterKey::Tag => Some(ReferenceKind::Tag),
            FilterKey::Character => Some(ReferenceKind::Character),
            FilterKey::Artist => Some(ReferenceKind::Artist),
            FilterKey::Group => Some(ReferenceKind::Group),
            FilterKey::Parody => Some(ReferenceKind::Parody),
            FilterKey::Title | FilterKey::Id => None,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single term of a raw query, casing preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The matched text.
    pub raw: String,
    /// Text before the first colon, if the term has a field prefix.
    pub key: Option<String>,
    /// Text after the first colon, or the whole term.
    pub value: String,
}

/// Split a raw query into terms, keeping quoted phrases together.
pub fn tokenize(input: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .captures_iter(input)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str();
            if caps.name("phrase").is_some() {
                return Some(Token {
                    raw: raw.to_string(),
                    key: None,
                    value: raw.to_string(),
                });
            }

            let (key, value) = match raw.split_once(':') {
                Some((key, value)) => (Some(key.to_string()), value.to_string()),
                None => (None, raw.to_string()),
            };
            Some(Token {
                raw: raw.to_string(),
                key,
                value,
            })
        })
        .collect()
}

/// Normalized filter values grouped by key.
///
/// Values keep their order and repeats; resolvers treat a repeat as a
/// redundant AND operand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<FilterKey, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize and classify a raw query.
    pub fn parse(input: &str) -> Self {
        Self::from_tokens(&tokenize(input))
    }

    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut set = Self::new();
        for token in tokens {
            match token.key.as_deref() {
                None => set.push_split(FilterKey::Title, &token.value),
                Some(name) => match FilterKey::parse(name) {
                    Some(key) => set.push_split(key, &token.value),
                    // Unknown prefix: the whole term is title text.
                    None => set.push(FilterKey::Title, token.raw.trim().to_lowercase()),
                },
            }
        }
        set
    }

    /// Append a single already-normalized value. Empty values are ignored.
    pub fn push(&mut self, key: FilterKey, value: String) {
        if value.is_empty() {
            return;
        }
        self.values.entry(key).or_default().push(value);
    }

    fn push_split(&mut self, key: FilterKey, raw_value: &str) {
        for part in strip_quotes(raw_value).split('%') {
            self.push(key, part.trim().to_lowercase());
        }
    }

    /// Values for `key`, empty when the key was not used.
    pub fn values(&self, key: FilterKey) -> &[String] {
        self.values.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when no key carries a value.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Keys that carry at least one value.
    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.values
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, _)| *key)
    }
}

/// Remove wrapping double quotes, including the lone one an unterminated
/// phrase (`tag:"big cat`) leaves on each of its words.
fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tokens(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.raw).collect()
    }

    #[test]
    fn test_tokenize_forms() {
        assert_eq!(
            raw_tokens(r#"artist:"hyji" tag:"big cat" parody:original lonely"#),
            vec![r#"artist:"hyji""#, r#"tag:"big cat""#, "parody:original", "lonely"]
        );
    }

    #[test]
    fn test_tokenize_preserves_case() {
        let tokens = tokenize("Tag:Dog");
        assert_eq!(tokens[0].key.as_deref(), Some("Tag"));
        assert_eq!(tokens[0].value, "Dog");
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_tokenize_splits_on_first_colon_only() {
        let tokens = tokenize("title:foo:bar");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].key.as_deref(), Some("title"));
        assert_eq!(tokens[0].value, "foo:bar");
    }

    #[test]
    fn test_tokenize_trailing_colon() {
        let tokens = tokenize("tag:");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].key.as_deref(), Some("tag"));
        assert_eq!(tokens[0].value, "");
    }

    #[test]
    fn test_tokenize_bare_quoted_phrase() {
        let tokens = tokenize(r#""re:zero" other"#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].key, None);
        assert_eq!(tokens[0].value, r#""re:zero""#);
    }

    #[test]
    fn test_classify_lowercases_and_strips_quotes() {
        let filters = FilterSet::parse(r#"ARTIST:"Hyji""#);
        assert_eq!(filters.values(FilterKey::Artist), ["hyji"]);
    }

    #[test]
    fn test_classify_splits_percent_values() {
        let filters = FilterSet::parse(r#"tag:"dog% Cat ""#);
        assert_eq!(filters.values(FilterKey::Tag), ["dog", "cat"]);
    }

    #[test]
    fn test_classify_bare_terms_are_title() {
        let filters = FilterSet::parse("Cat dog");
        assert_eq!(filters.values(FilterKey::Title), ["cat", "dog"]);
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec![FilterKey::Title]);
    }

    #[test]
    fn test_classify_unknown_key_keeps_whole_token_as_title() {
        let filters = FilterSet::parse(r#"Circle:"A%B""#);
        assert_eq!(filters.values(FilterKey::Title), [r#"circle:"a%b""#]);
        assert!(filters.values(FilterKey::Tag).is_empty());
    }

    #[test]
    fn test_classify_mgroup_maps_to_group() {
        let filters = FilterSet::parse("mgroup:circle-k");
        assert_eq!(filters.values(FilterKey::Group), ["circle-k"]);
    }

    #[test]
    fn test_classify_keeps_repeats() {
        let filters = FilterSet::parse("tag:dog tag:dog");
        assert_eq!(filters.values(FilterKey::Tag), ["dog", "dog"]);
    }

    #[test]
    fn test_classify_title_value_with_colon() {
        let filters = FilterSet::parse("title:foo:bar");
        assert_eq!(filters.values(FilterKey::Title), ["foo:bar"]);
    }

    #[test]
    fn test_classify_unterminated_quote() {
        let filters = FilterSet::parse(r#"tag:"big cat"#);
        assert_eq!(filters.values(FilterKey::Tag), ["big"]);
        assert_eq!(filters.values(FilterKey::Title), ["cat"]);

        let filters = FilterSet::parse(r#"artist:"hyji"#);
        assert_eq!(filters.values(FilterKey::Artist), ["hyji"]);
    }

    #[test]
    fn test_classify_drops_empty_values() {
        let filters = FilterSet::parse(r#"tag: tag:"" artist:"a%%b""#);
        assert!(filters.values(FilterKey::Tag).is_empty());
        assert_eq!(filters.values(FilterKey::Artist), ["a", "b"]);
    }

    #[test]
    fn test_empty_query_has_no_filters() {
        assert!(FilterSet::parse("").is_empty());
        assert!(FilterSet::parse("tag:").is_empty());
        assert!(!FilterSet::parse("x").is_empty());
    }

    #[test]
    fn test_filter_key_parse_roundtrip() {
        for key in FilterKey::ALL {
            assert_eq!(FilterKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(FilterKey::parse("group"), None);
    }

    #[test]
    fn test_reference_kinds() {
        assert_eq!(FilterKey::Tag.reference_kind(), Some(ReferenceKind::Tag));
        assert_eq!(FilterKey::Group.reference_kind(), Some(ReferenceKind::Group));
        assert_eq!(FilterKey::Title.reference_kind(), None);
        assert_eq!(FilterKey::Id.reference_kind(), None);
    }
}
