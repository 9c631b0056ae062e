//! Tag vocabulary, counts and AND-filtering for the gallery view.
//!
//! Everything here is pure and works on the artwork list already fetched for the
//! request. Inputs are small (tens of tags, hundreds of artworks), so plain linear
//! scans are used throughout.

use std::collections::HashSet;

use serde::Serialize;

use crate::artworks::repo_types::Artwork;

/// One entry of the tag bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagChip {
    pub tag: String,
    /// Artworks carrying the tag, counted over the unfiltered list.
    pub count: usize,
    pub active: bool,
    /// Active selection after clicking this chip.
    pub toggled: Vec<String>,
}

/// Union of all tags, in first-seen order.
pub fn tag_vocabulary(artworks: &[Artwork]) -> Vec<String> {
    let mut seen = HashSet::new();
    artworks
        .iter()
        .flat_map(|a| a.tags.iter())
        .filter(|&t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

pub fn tag_count(artworks: &[Artwork], tag: &str) -> usize {
    artworks
        .iter()
        .filter(|a| a.tags.iter().any(|t| t == tag))
        .count()
}

/// Artworks carrying every active tag. An empty selection keeps the whole list.
pub fn apply_filter<'a>(artworks: &'a [Artwork], active: &[String]) -> Vec<&'a Artwork> {
    artworks
        .iter()
        .filter(|a| active.iter().all(|tag| a.tags.contains(tag)))
        .collect()
}

/// Removes `tag` when selected, otherwise puts it at the front of the selection.
pub fn toggle_tag(active: &[String], tag: &str) -> Vec<String> {
    if active.iter().any(|t| t == tag) {
        active.iter().filter(|t| *t != tag).cloned().collect()
    } else {
        std::iter::once(tag.to_string())
            .chain(active.iter().cloned())
            .collect()
    }
}

/// Case-insensitive substring search over the vocabulary.
pub fn search_tags(vocabulary: &[String], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return vocabulary.to_vec();
    }
    vocabulary
        .iter()
        .filter(|t| t.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Drops repeated tags while keeping the first occurrence.
pub fn dedup_selection(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Builds the tag bar: active chips first in selection order, then the rest in
/// vocabulary order.
pub fn tag_chips(artworks: &[Artwork], active: &[String], query: &str) -> Vec<TagChip> {
    let visible = search_tags(&tag_vocabulary(artworks), query);

    let chip = |tag: &String| TagChip {
        tag: tag.clone(),
        count: tag_count(artworks, tag),
        active: active.contains(tag),
        toggled: toggle_tag(active, tag),
    };

    let selected = active.iter().filter(|t| visible.contains(t)).map(chip);
    let rest = visible.iter().filter(|t| !active.contains(t)).map(chip);
    selected.chain(rest).collect()
}
