use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::Warning;

/// Flags exactly as the user wrote them: lower-cased `key -> value`.
pub type FlagMap = BTreeMap<String, String>;

/// A closed set of values accepted by one generation flag.
pub trait FlagValue: Copy + Default + 'static {
    const KEY: &'static str;
    const ALLOWED: &'static [Self];

    fn as_str(self) -> &'static str;

    fn from_flag(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALLOWED
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl Size {
    /// Pixel dimensions understood by the DALL-E 3 images endpoint.
    pub fn dimensions(self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Portrait => "1024x1792",
            Self::Landscape => "1792x1024",
        }
    }
}

impl FlagValue for Size {
    const KEY: &'static str = "size";
    const ALLOWED: &'static [Self] = &[Self::Square, Self::Portrait, Self::Landscape];

    fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    Hd,
}

impl FlagValue for Quality {
    const KEY: &'static str = "quality";
    const ALLOWED: &'static [Self] = &[Self::Standard, Self::Hd];

    fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Vivid,
    Natural,
}

impl FlagValue for Style {
    const KEY: &'static str = "style";
    const ALLOWED: &'static [Self] = &[Self::Vivid, Self::Natural];

    fn as_str(self) -> &'static str {
        match self {
            Self::Vivid => "vivid",
            Self::Natural => "natural",
        }
    }
}

/// Generation parameters. Every field always holds a permitted value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterSet {
    pub size: Size,
    pub quality: Quality,
    pub style: Style,
}

impl ParameterSet {
    pub fn is_recognized_key(key: &str) -> bool {
        key == Size::KEY || key == Quality::KEY || key == Style::KEY
    }

    /// Apply the recognized keys present in `flags`, leaving the others untouched.
    ///
    /// A rejected value resets its field to the fixed default.
    pub fn update_from(&mut self, flags: &FlagMap) -> Vec<Warning> {
        let mut warnings = Vec::new();
        update_field(&mut self.size, flags, &mut warnings);
        update_field(&mut self.quality, flags, &mut warnings);
        update_field(&mut self.style, flags, &mut warnings);
        warnings
    }

    pub fn to_flag_map(&self) -> FlagMap {
        [
            (Size::KEY, self.size.as_str()),
            (Quality::KEY, self.quality.as_str()),
            (Style::KEY, self.style.as_str()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size {}, quality {}, style {}",
            self.size.as_str(),
            self.quality.as_str(),
            self.style.as_str()
        )
    }
}

fn update_field<T: FlagValue>(field: &mut T, flags: &FlagMap, warnings: &mut Vec<Warning>) {
    let Some(value) = flags.get(T::KEY) else {
        return;
    };

    match T::from_flag(value) {
        Some(parsed) => *field = parsed,
        None => {
            let default = T::default();
            warnings.push(Warning::InvalidFlagValue {
                key: T::KEY,
                value: value.clone(),
                default: default.as_str(),
            });
            *field = default;
        }
    }
}

/// Flags after validation: the three generation parameters plus any
/// unrecognized keys, which are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFlags {
    pub parameters: ParameterSet,
    pub passthrough: FlagMap,
}

impl ValidatedFlags {
    pub fn to_flag_map(&self) -> FlagMap {
        let mut flags = self.passthrough.clone();
        flags.extend(self.parameters.to_flag_map());
        flags
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub flags: ValidatedFlags,
    pub warnings: Vec<Warning>,
}

/// Validate flags as written, substituting defaults for rejected values.
pub fn validate(flags: &FlagMap) -> ValidationOutcome {
    let mut parameters = ParameterSet::default();
    let warnings = parameters.update_from(flags);
    let passthrough = flags
        .iter()
        .filter(|(key, _)| !ParameterSet::is_recognized_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    ValidationOutcome {
        flags: ValidatedFlags {
            parameters,
            passthrough,
        },
        warnings,
    }
}
