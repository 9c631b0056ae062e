use serde::Serialize;
use tracing::debug;

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 50;
pub const CARD_MAX_TAGS: usize = 3;
pub const CARD_TAG_CHARS: usize = 10;

/// Which form a tag is typed into. The two forms disagree on duplicate detection:
/// submission compares case-insensitively and puts new tags in front, edit
/// compares exactly and appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    Submission,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRejection {
    Empty,
    TooLong,
    Duplicate,
    Full,
}

pub fn add_tag(
    existing: &[String],
    candidate: &str,
    form: TagForm,
) -> Result<Vec<String>, TagRejection> {
    let tag = candidate.trim();
    if tag.is_empty() {
        return Err(TagRejection::Empty);
    }
    if tag.chars().count() > MAX_TAG_CHARS {
        return Err(TagRejection::TooLong);
    }
    let duplicate = match form {
        TagForm::Submission => {
            let lower = tag.to_lowercase();
            existing.iter().any(|t| t.to_lowercase() == lower)
        }
        TagForm::Edit => existing.iter().any(|t| t == tag),
    };
    if duplicate {
        return Err(TagRejection::Duplicate);
    }
    if existing.len() >= MAX_TAGS {
        return Err(TagRejection::Full);
    }

    let mut tags = Vec::with_capacity(existing.len() + 1);
    match form {
        TagForm::Submission => {
            tags.push(tag.to_string());
            tags.extend_from_slice(existing);
        }
        TagForm::Edit => {
            tags.extend_from_slice(existing);
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

/// Replays submitted tags through [`add_tag`] in entry order. Rejected tags are
/// dropped without failing the request.
pub fn collect_tags(candidates: &[String], form: TagForm) -> Vec<String> {
    candidates
        .iter()
        .fold(Vec::new(), |tags, candidate| match add_tag(&tags, candidate, form) {
            Ok(next) => next,
            Err(reason) => {
                debug!(?reason, tag = %candidate, "tag dropped");
                tags
            }
        })
}

/// Tag preview for a gallery card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTags {
    pub shown: Vec<String>,
    pub hidden: usize,
}

pub fn display_tags(tags: &[String]) -> CardTags {
    let shown = tags
        .iter()
        .take(CARD_MAX_TAGS)
        .map(|t| {
            if t.chars().count() > CARD_TAG_CHARS {
                format!("{}...", t.chars().take(CARD_TAG_CHARS).collect::<String>())
            } else {
                t.clone()
            }
        })
        .collect::<Vec<_>>();
    CardTags {
        hidden: tags.len() - shown.len(),
        shown,
    }
}
