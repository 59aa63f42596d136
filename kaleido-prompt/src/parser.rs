//! Tokenizer for raw prompt text.
//!
//! Input is split in three passes, each with a strict precedence over the
//! next: the `-variations` marker first, then the first flag marker inside
//! the base section, then category lines inside the variations section.

use std::num::IntErrorKind;

use tracing::debug;

use crate::Warning;
use crate::params::FlagMap;
use crate::variations::{VariationCategory, VariationSet};

pub const VARIATIONS_MARKER: &str = "-variations";
pub const FLAG_MARKER: &str = " -";
pub const DEFAULT_VARIATION_COUNT: usize = 1;
const VARIATIONS_KEY: &str = "variations";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub base_prompt: String,
    pub flags: FlagMap,
    pub variations: VariationSet,
    pub requested_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub input: ParsedInput,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsOutcome {
    pub flags: FlagMap,
    pub warnings: Vec<Warning>,
}

/// Raw text cut at the first variations marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    pub base: &'a str,
    pub variations: Option<&'a str>,
}

/// Parse raw text into a base prompt, flags as written and variation axes.
///
/// Always succeeds. Bad fragments are dropped or defaulted and reported in
/// [`ParseOutcome::warnings`].
pub fn parse(raw: &str) -> ParseOutcome {
    let mut warnings = Vec::new();
    let sections = split_sections(raw);

    let base = normalize_base(sections.base);
    let (base_prompt, flag_part) = split_flag_marker(&base);
    let flags = match flag_part {
        Some(flag_part) => parse_flag_fragments(flag_part, &mut warnings),
        None => FlagMap::new(),
    };

    let (requested_count, variations) = match sections.variations {
        Some(section) => parse_variation_section(section, &mut warnings),
        None => (DEFAULT_VARIATION_COUNT, VariationSet::new()),
    };

    debug!(
        flags = flags.len(),
        categories = variations.len(),
        requested_count,
        "parsed prompt input"
    );

    ParseOutcome {
        input: ParsedInput {
            base_prompt: base_prompt.to_string(),
            flags,
            variations,
            requested_count,
        },
        warnings,
    }
}

/// Parse text holding only flags, such as `-size landscape -style natural`.
pub fn parse_flags(text: &str) -> FlagsOutcome {
    let mut warnings = Vec::new();
    let padded = format!(" {}", text.trim());
    let flags = match split_flag_marker(&padded) {
        (_, Some(flag_part)) => parse_flag_fragments(flag_part, &mut warnings),
        (_, None) => FlagMap::new(),
    };
    FlagsOutcome { flags, warnings }
}

pub fn split_sections(raw: &str) -> Sections<'_> {
    match raw.split_once(VARIATIONS_MARKER) {
        Some((base, variations)) => Sections {
            base,
            variations: Some(variations),
        },
        None => Sections {
            base: raw,
            variations: None,
        },
    }
}

/// Join non-blank lines with single spaces.
pub fn normalize_base(base: &str) -> String {
    base.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split at the first flag marker. The returned flag part keeps its marker.
pub fn split_flag_marker(base: &str) -> (&str, Option<&str>) {
    match base.find(FLAG_MARKER) {
        Some(index) => (base[..index].trim(), Some(&base[index..])),
        None => (base.trim(), None),
    }
}

fn parse_flag_fragments(flag_part: &str, warnings: &mut Vec<Warning>) -> FlagMap {
    let mut flags = FlagMap::new();

    // The flag part starts with the marker, so the first piece is always empty.
    for fragment in flag_part.split(FLAG_MARKER).skip(1) {
        let fragment = fragment.trim();
        let Some((key, value)) = fragment.split_once(' ') else {
            warnings.push(Warning::MalformedFlag {
                fragment: fragment.to_string(),
            });
            continue;
        };

        let key = key.trim().to_lowercase();
        let value = value.trim().to_lowercase();
        if key == VARIATIONS_KEY {
            debug!("ignoring variations key inside flags");
            continue;
        }

        flags.insert(key, value);
    }

    flags
}

fn parse_variation_section(section: &str, warnings: &mut Vec<Warning>) -> (usize, VariationSet) {
    let mut lines = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let requested_count = match lines.next() {
        Some(value) => match value.parse::<usize>() {
            Ok(count) => count,
            // Too large to store, but still a count; the expander caps it.
            Err(error) if *error.kind() == IntErrorKind::PosOverflow => usize::MAX,
            Err(_) => {
                warnings.push(Warning::InvalidVariationCount {
                    value: value.to_string(),
                    default: DEFAULT_VARIATION_COUNT,
                });
                DEFAULT_VARIATION_COUNT
            }
        },
        None => {
            warnings.push(Warning::MissingVariationCount {
                default: DEFAULT_VARIATION_COUNT,
            });
            DEFAULT_VARIATION_COUNT
        }
    };

    let mut variations = VariationSet::new();
    for line in lines {
        match parse_category_line(line) {
            CategoryLine::Category(category) => {
                let name = category.name().to_string();
                if variations.insert(category).is_some() {
                    warnings.push(Warning::DuplicateCategory { name });
                }
            }
            CategoryLine::Empty { name } => warnings.push(Warning::EmptyCategory { name }),
            CategoryLine::Unnamed => warnings.push(Warning::UnnamedCategory {
                line: line.to_string(),
            }),
            CategoryLine::NotACategory => warnings.push(Warning::IgnoredVariationLine {
                line: line.to_string(),
            }),
        }
    }

    (requested_count, variations)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLine {
    Category(VariationCategory),
    Empty { name: String },
    Unnamed,
    NotACategory,
}

/// Classify one line of the variations section.
pub fn parse_category_line(line: &str) -> CategoryLine {
    let (Some(open), Some(close)) = (line.find('('), line.rfind(')')) else {
        return CategoryLine::NotACategory;
    };
    if close < open {
        return CategoryLine::NotACategory;
    }

    let name = line[..open].trim();
    if name.is_empty() {
        return CategoryLine::Unnamed;
    }

    match VariationCategory::new(name, line[open + 1..close].split(',')) {
        Some(category) => CategoryLine::Category(category),
        None => CategoryLine::Empty {
            name: name.to_string(),
        },
    }
}
