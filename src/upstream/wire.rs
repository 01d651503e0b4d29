//! JSON shapes returned by the catalog API and their conversion into domain
//! records. Only the fields this service reads are declared.

use std::collections::HashSet;

use serde::Deserialize;

use crate::models::{
    CatalogItem, CategoryTag, ImageBundle, ItemReference, ItemSummary, LocalizedText, PageEnvelope,
    SpeciesInfo, StatValue, TraitRef,
};

#[derive(Debug, Deserialize)]
pub(super) struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResourceList {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

impl From<ResourceList> for PageEnvelope {
    fn from(list: ResourceList) -> Self {
        PageEnvelope {
            total_count: list.count,
            has_next: list.next.is_some(),
            has_previous: list.previous.is_some(),
            items: list
                .results
                .into_iter()
                .map(|r| ItemSummary {
                    name: r.name,
                    url: r.url,
                })
                .collect(),
        }
    }
}

// == Item ==
#[derive(Debug, Deserialize)]
pub(super) struct ItemPayload {
    id: u32,
    name: String,
    height: u32,
    weight: u32,
    base_experience: Option<u32>,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    stats: Vec<StatSlot>,
    #[serde(default)]
    sprites: Sprites,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    slot: u8,
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
    is_hidden: bool,
    slot: u8,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u32,
    effort: u32,
    stat: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct Sprites {
    front_default: Option<String>,
    front_shiny: Option<String>,
    #[serde(default)]
    other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<ArtworkSprite>,
}

#[derive(Debug, Deserialize)]
struct ArtworkSprite {
    front_default: Option<String>,
}

impl From<ItemPayload> for CatalogItem {
    fn from(payload: ItemPayload) -> Self {
        let mut categories: Vec<CategoryTag> = payload
            .types
            .into_iter()
            .map(|t| CategoryTag {
                name: t.kind.name,
                slot: t.slot,
            })
            .collect();
        categories.sort_by_key(|tag| tag.slot);

        let mut traits: Vec<TraitRef> = payload
            .abilities
            .into_iter()
            .map(|a| TraitRef {
                name: a.ability.name,
                hidden: a.is_hidden,
                slot: a.slot,
            })
            .collect();
        traits.sort_by_key(|t| t.slot);

        let artwork = payload
            .sprites
            .other
            .and_then(|other| other.official_artwork)
            .and_then(|art| art.front_default);

        CatalogItem {
            id: payload.id,
            name: payload.name,
            height: payload.height,
            weight: payload.weight,
            base_experience: payload.base_experience,
            categories,
            traits,
            stats: payload
                .stats
                .into_iter()
                .map(|s| StatValue {
                    name: s.stat.name,
                    base_value: s.base_stat,
                    effort: s.effort,
                })
                .collect(),
            images: ImageBundle {
                primary: payload.sprites.front_default,
                artwork,
                alternate: payload.sprites.front_shiny,
            },
        }
    }
}

// == Species ==
#[derive(Debug, Deserialize)]
pub(super) struct SpeciesPayload {
    id: u32,
    name: String,
    color: NamedResource,
    habitat: Option<NamedResource>,
    generation: NamedResource,
    is_legendary: bool,
    is_mythical: bool,
    capture_rate: u32,
    base_happiness: Option<u32>,
    growth_rate: NamedResource,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

/// Collapses the form-feed and newline runs upstream embeds in flavor text.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl From<SpeciesPayload> for SpeciesInfo {
    fn from(payload: SpeciesPayload) -> Self {
        // Upstream repeats the text once per game version; keep the first per language.
        let mut seen = HashSet::new();
        let flavor_texts = payload
            .flavor_text_entries
            .into_iter()
            .filter(|entry| seen.insert(entry.language.name.clone()))
            .map(|entry| LocalizedText {
                text: clean_text(&entry.flavor_text),
                language: entry.language.name,
            })
            .collect();

        SpeciesInfo {
            id: payload.id,
            name: payload.name,
            color: payload.color.name,
            habitat: payload.habitat.map(|h| h.name),
            generation: payload.generation.name,
            is_legendary: payload.is_legendary,
            is_mythical: payload.is_mythical,
            capture_rate: payload.capture_rate,
            base_happiness: payload.base_happiness,
            growth_rate: payload.growth_rate.name,
            flavor_texts,
            genera: payload
                .genera
                .into_iter()
                .map(|g| LocalizedText {
                    text: g.genus,
                    language: g.language.name,
                })
                .collect(),
        }
    }
}

// == Category ==
#[derive(Debug, Deserialize)]
pub(super) struct CategoryPayload {
    #[serde(rename = "pokemon", default)]
    members: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    #[serde(rename = "pokemon")]
    resource: NamedResource,
}

impl CategoryPayload {
    /// Member references; entries whose URL carries no numeric id are skipped.
    pub(super) fn into_members(self) -> Vec<ItemReference> {
        self.members
            .into_iter()
            .filter_map(|m| ItemReference::from_url(m.resource.name, &m.resource.url))
            .collect()
    }
}
