use kaleido_utils::label_slug;
use serde::Serialize;
use tracing::debug;

use crate::variations::{VariationCategory, VariationSet};

pub const SINGLE_LABEL: &str = "single";

/// Hard ceiling on the number of variants produced per run.
pub const MAX_COMBINATIONS: usize = 4;

/// Only this many leading categories take part in a combination.
pub const MAX_COMBINED_CATEGORIES: usize = 4;

/// Option index per category for each canonical combination.
pub const COMBINATIONS: [[usize; MAX_COMBINED_CATEGORIES]; MAX_COMBINATIONS] = [
    [0, 0, 0, 0],
    [1, 1, 1, 1],
    [2, 0, 1, 2],
    [3, 1, 0, 3],
];

const MOOD_CLAUSES: [(&str, &str); 4] = [
    ("sacred", "bathed in reverent, luminous light"),
    ("mysterious", "shrouded in drifting shadow and quiet intrigue"),
    ("serene", "with soft, calm tones and gentle stillness"),
    ("ominous", "beneath a heavy, foreboding sky"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptVariant {
    pub text: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phrase {
    CameraAngle,
    BackgroundIntensity,
    CircuitDetail,
    Mood,
}

// Checked in order; the first key found in the category name wins.
const PHRASE_KEYS: [(&str, Phrase); 4] = [
    ("camera angle", Phrase::CameraAngle),
    ("background intensity", Phrase::BackgroundIntensity),
    ("circuit detail", Phrase::CircuitDetail),
    ("mood", Phrase::Mood),
];

impl Phrase {
    fn for_category(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        PHRASE_KEYS
            .iter()
            .find(|(key, _)| name.contains(key))
            .map(|(_, phrase)| *phrase)
    }

    fn render(self, option: &str) -> String {
        match self {
            Self::CameraAngle => format!("viewed from a {option} perspective"),
            Self::BackgroundIntensity => format!("set against a {option} background"),
            Self::CircuitDetail => format!("featuring {option} circuit patterns"),
            Self::Mood => match mood_clause(option) {
                Some(extra) => format!("evoking a {option} mood, {extra}"),
                None => format!("evoking a {option} mood"),
            },
        }
    }
}

fn mood_clause(option: &str) -> Option<&'static str> {
    let option = option.to_lowercase();
    MOOD_CLAUSES
        .iter()
        .find(|(mood, _)| *mood == option)
        .map(|(_, clause)| *clause)
}

/// Expand a base prompt into concrete variants.
///
/// Without categories this yields the base prompt once, labelled
/// [`SINGLE_LABEL`], whatever `requested_count` says. Otherwise it yields
/// the first `min(requested_count, MAX_COMBINATIONS)` rows of
/// [`COMBINATIONS`] applied to the first [`MAX_COMBINED_CATEGORIES`]
/// categories.
pub fn expand(
    base_prompt: &str,
    variations: &VariationSet,
    requested_count: usize,
) -> Vec<PromptVariant> {
    if variations.is_empty() {
        return vec![PromptVariant {
            text: base_prompt.to_string(),
            label: SINGLE_LABEL.to_string(),
        }];
    }

    let categories: Vec<&VariationCategory> =
        variations.iter().take(MAX_COMBINED_CATEGORIES).collect();
    if variations.len() > MAX_COMBINED_CATEGORIES {
        debug!(
            ignored = variations.len() - MAX_COMBINED_CATEGORIES,
            "categories beyond the combination width are not used"
        );
    }

    COMBINATIONS
        .iter()
        .take(requested_count.min(MAX_COMBINATIONS))
        .map(|combination| combine(base_prompt, &categories, combination))
        .collect()
}

fn combine(
    base_prompt: &str,
    categories: &[&VariationCategory],
    combination: &[usize; MAX_COMBINED_CATEGORIES],
) -> PromptVariant {
    let mut clauses = Vec::new();
    let mut fragments = Vec::with_capacity(categories.len());

    for (category, &index) in categories.iter().zip(combination) {
        let option = category.option_cycled(index);
        if let Some(phrase) = Phrase::for_category(category.name()) {
            clauses.push(phrase.render(option));
        }
        fragments.push(format!(
            "{}-{}",
            label_slug(category.name()),
            label_slug(option)
        ));
    }

    let text = if clauses.is_empty() {
        base_prompt.to_string()
    } else {
        format!("{base_prompt}, {}", clauses.join(", "))
    };

    PromptVariant {
        text,
        label: fragments.join("_"),
    }
}
