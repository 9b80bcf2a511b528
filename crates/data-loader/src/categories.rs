//! The fixed universe of restaurant categories.
//!
//! Each category key comes with the keywords that signal it in names, review
//! text or a search term. The preference tracker only ever accumulates weight
//! for keys in this universe; anything else is ignored.

use std::collections::BTreeSet;

/// Category keys and their trigger keywords.
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("halal", &["halal", "muslim-friendly", "muslim", "halal-certified", "shariah-compliant"]),
    ("vegetarian", &["vege", "vegetarian", "vegan", "vegetarian-friendly", "vegetarian option", "meat-free"]),
    ("vegan", &["vegan", "plant-based", "vegan-friendly", "cruelty-free", "dairy-free"]),
    ("beef-free", &["beef-free", "no beef", "without beef", "beefless"]),
    ("chinese", &[
        "chinese", "szechuan", "dim sum", "cantonese", "dumplings", "fried rice",
        "chicken rice", "charsiew", "horfun", "kopitiam", "mala",
    ]),
    ("malay", &["nasi lemak", "satay", "rendang", "keropok", "nasi kerabu", "roti jala"]),
    ("indian", &["indian restaurant", "khorma", "masala", "naan", "briyani", "tandoori", "nasi kandar"]),
    ("korean", &["korean", "kimchi", "bibimbap", "bulgogi", "tteokbokki", "jajangmyeon", "samgyeopsal"]),
    ("japanese", &[
        "japan", "japanese", "sushi", "wasabi", "udon", "miso", "shabu-shabu",
        "bento", "sukiya", "takoyaki", "onigiri",
    ]),
    ("thai", &["thai", "pad thai", "green curry", "tom yum", "som tam", "satay", "red curry"]),
    ("western", &["western", "steak", "burger", "pasta", "pizza", "fish n' chips"]),
    ("eastern", &["eastern cuisine", "middle eastern", "falafel", "shawarma", "hummus", "kebab"]),
    ("cafe", &["café", "coffee shop", "espresso", "latte", "pastry", "bakery", "barista"]),
    ("bar", &["bar", "pub", "tavern", "brewery", "cocktail"]),
    ("buffet", &["buffet", "all-you-can-eat", "unlimited food", "buffet-style"]),
    ("fast-food", &[
        "fast food", "drive-thru", "mcdonald's", "kfc", "burger king", "a&w",
        "taco bell", "subway", "pizza hut", "domino's", "texas chicken",
    ]),
];

/// An ordered set of known categories with their keywords.
///
/// Order matters: it fixes the layout of one-hot category features.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUniverse {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryUniverse {
    /// Build a universe from bare category keys (no inference keywords).
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        for key in keys {
            let key = key.into();
            if !entries.iter().any(|(k, _)| *k == key) {
                entries.push((key, Vec::new()));
            }
        }
        Self { entries }
    }

    /// Category keys in universe order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.position(category).is_some()
    }

    /// Index of a category in universe order
    pub fn position(&self, category: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == category)
    }

    /// Infer categories from free text and an optional search keyword.
    ///
    /// A category matches when the search keyword equals its key or one of its
    /// keywords, or when any keyword occurs as a substring of one of `texts`.
    /// Matching is case-insensitive.
    pub fn infer<'a, I>(&self, texts: I, search_keyword: Option<&str>) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let texts: Vec<String> = texts.into_iter().map(str::to_lowercase).collect();
        let search = search_keyword.map(str::to_lowercase);
        let mut found = BTreeSet::new();

        for (key, keywords) in &self.entries {
            let by_search = search
                .as_deref()
                .is_some_and(|s| s == key || keywords.iter().any(|kw| kw == s));
            let by_text = keywords
                .iter()
                .any(|kw| texts.iter().any(|text| text.contains(kw.as_str())));
            if by_search || by_text {
                found.insert(key.clone());
            }
        }
        found
    }
}

impl Default for CategoryUniverse {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CATEGORIES
                .iter()
                .map(|(key, keywords)| {
                    (
                        key.to_string(),
                        keywords.iter().map(|kw| kw.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe_order() {
        let universe = CategoryUniverse::default();
        assert_eq!(universe.len(), 16);
        assert_eq!(universe.keys().next(), Some("halal"));
        assert_eq!(universe.position("fast-food"), Some(15));
        assert!(!universe.contains("italian"));
    }

    #[test]
    fn test_infer_from_text() {
        let universe = CategoryUniverse::default();
        let found = universe.infer(["Warung Nasi Lemak Corner", "Great satay and coffee shop vibes"], None);

        assert!(found.contains("malay"));
        assert!(found.contains("thai")); // satay is listed under both
        assert!(found.contains("cafe"));
        assert!(!found.contains("japanese"));
    }

    #[test]
    fn test_infer_from_search_keyword() {
        let universe = CategoryUniverse::default();
        let found = universe.infer(std::iter::empty(), Some("Sushi"));
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["japanese".to_string()]);

        let found = universe.infer(std::iter::empty(), Some("halal"));
        assert!(found.contains("halal"));
    }

    #[test]
    fn test_from_keys_dedups() {
        let universe = CategoryUniverse::from_keys(["a", "b", "a"]);
        assert_eq!(universe.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(universe.infer(["a b"], None).is_empty());
    }
}
