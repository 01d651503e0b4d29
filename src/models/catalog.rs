//! Catalog domain records
//!
//! Typed forms of the entities fetched from the upstream catalog. Records are
//! immutable once built; the cache hands out clones.

use serde::{Deserialize, Serialize};

/// Language used when the preferred one has no entry.
pub const FALLBACK_LANGUAGE: &str = "en";

// == Catalog Item ==
/// A single creature as returned by the item-detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable upstream identifier
    pub id: u32,
    /// Lowercase slug
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base experience yield, absent for some alternate forms
    pub base_experience: Option<u32>,
    /// Category tags ordered by slot
    pub categories: Vec<CategoryTag>,
    /// Trait references ordered by slot
    pub traits: Vec<TraitRef>,
    /// Named numeric attributes
    pub stats: Vec<StatValue>,
    pub images: ImageBundle,
}

impl CatalogItem {
    /// Returns true if any category tag matches `name`, ignoring case.
    pub fn has_category(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|tag| tag.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if the height lies within the inclusive bounds.
    ///
    /// A missing bound is unbounded on that side.
    pub fn height_within(&self, min: Option<u32>, max: Option<u32>) -> bool {
        min.map_or(true, |min| self.height >= min) && max.map_or(true, |max| self.height <= max)
    }

    /// Category names in slot order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|tag| tag.name.as_str()).collect()
    }

    /// Looks up a stat by name.
    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.base_value)
    }
}

/// A category (type) tag with its display slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTag {
    pub name: String,
    pub slot: u8,
}

/// A trait (ability) reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRef {
    pub name: String,
    pub hidden: bool,
    pub slot: u8,
}

/// A named numeric attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub base_value: u32,
    pub effort: u32,
}

/// Image references for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBundle {
    /// Default sprite; upstream leaves it null for a handful of forms
    pub primary: Option<String>,
    /// Higher quality official artwork
    pub artwork: Option<String>,
    /// Alternate colouring
    pub alternate: Option<String>,
}

// == Species Info ==
/// Secondary species data for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub habitat: Option<String>,
    pub generation: String,
    /// First rare tier (legendary)
    pub is_legendary: bool,
    /// Second rare tier (mythical)
    pub is_mythical: bool,
    /// Capture difficulty, higher is easier
    pub capture_rate: u32,
    pub base_happiness: Option<u32>,
    pub growth_rate: String,
    /// Description text per language
    pub flavor_texts: Vec<LocalizedText>,
    /// Category label per language
    pub genera: Vec<LocalizedText>,
}

impl SpeciesInfo {
    /// Description in `language`, falling back to English.
    pub fn flavor_text(&self, language: &str) -> Option<&str> {
        select_localized(&self.flavor_texts, language)
    }

    /// Category label in `language`, falling back to English.
    pub fn category_label(&self, language: &str) -> Option<&str> {
        select_localized(&self.genera, language)
    }
}

/// Text tagged with a language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: String,
    pub text: String,
}

fn select_localized<'a>(entries: &'a [LocalizedText], language: &str) -> Option<&'a str> {
    let pick = |lang: &str| {
        entries
            .iter()
            .find(|entry| entry.language == lang)
            .map(|entry| entry.text.as_str())
    };
    pick(language).or_else(|| pick(FALLBACK_LANGUAGE))
}

// == Listing Types ==
/// One row of an upstream page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    pub url: String,
}

impl ItemSummary {
    /// Numeric id parsed from the summary URL.
    pub fn id(&self) -> Option<u32> {
        id_from_url(&self.url)
    }
}

/// Reference to a category member, id already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub id: u32,
    pub name: String,
}

impl ItemReference {
    /// Builds a reference from a resource URL such as `.../pokemon/25/`.
    ///
    /// Returns `None` when the trailing path segment is not a number.
    pub fn from_url(name: impl Into<String>, url: &str) -> Option<Self> {
        id_from_url(url).map(|id| Self {
            id,
            name: name.into(),
        })
    }
}

/// One page of item summaries plus the upstream pagination envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEnvelope {
    pub items: Vec<ItemSummary>,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Parses the trailing numeric path segment of a resource URL.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_item;

    #[test]
    fn test_id_from_url_with_trailing_slash() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/25/"), Some(25));
    }

    #[test]
    fn test_id_from_url_without_trailing_slash() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/133"), Some(133));
    }

    #[test]
    fn test_id_from_url_non_numeric() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/pikachu/"), None);
        assert!(ItemReference::from_url("pikachu", "").is_none());
    }

    #[test]
    fn test_has_category_ignores_case() {
        let item = sample_item(7, "squirtle", 5, &["water"]);
        assert!(item.has_category("Water"));
        assert!(!item.has_category("fire"));
    }

    #[test]
    fn test_height_within_inclusive() {
        let item = sample_item(25, "pikachu", 4, &["electric"]);
        assert!(item.height_within(Some(4), Some(4)));
        assert!(item.height_within(None, Some(10)));
        assert!(!item.height_within(Some(5), None));
        assert!(!item.height_within(None, Some(3)));
    }

    #[test]
    fn test_stat_lookup() {
        let item = sample_item(25, "pikachu", 4, &["electric"]);
        assert_eq!(item.stat("speed"), Some(90));
        assert_eq!(item.stat("attack"), None);
    }

    #[test]
    fn test_localized_text_fallback() {
        let species = SpeciesInfo {
            id: 25,
            name: "pikachu".to_string(),
            color: "yellow".to_string(),
            habitat: Some("forest".to_string()),
            generation: "generation-i".to_string(),
            is_legendary: false,
            is_mythical: false,
            capture_rate: 190,
            base_happiness: Some(50),
            growth_rate: "medium".to_string(),
            flavor_texts: vec![
                LocalizedText {
                    language: "en".to_string(),
                    text: "It stores electricity.".to_string(),
                },
                LocalizedText {
                    language: "fr".to_string(),
                    text: "Il stocke l'électricité.".to_string(),
                },
            ],
            genera: vec![LocalizedText {
                language: "en".to_string(),
                text: "Mouse Pokémon".to_string(),
            }],
        };

        assert_eq!(species.flavor_text("fr"), Some("Il stocke l'électricité."));
        assert_eq!(species.flavor_text("de"), Some("It stores electricity."));
        assert_eq!(species.category_label("ja"), Some("Mouse Pokémon"));
    }
}
