//! Turn one line of user text into a bounded list of image prompts.
//!
//! Raw input looks like
//!
//! ```text
//! A robot shrine -size landscape -quality hd -variations
//! 3
//! Camera Angle (low, high, aerial)
//! Mood (sacred, mysterious)
//! ```
//!
//! [`parse_and_validate`] reads it into a [`PromptPlan`] and
//! [`PromptPlan::variants`] expands the plan into labelled prompts. Neither
//! step can fail: problems are reported as [`Warning`] values.

pub mod expander;
pub mod params;
pub mod parser;
pub mod request;
pub mod session;
pub mod variations;
mod warning;

pub use expander::{COMBINATIONS, MAX_COMBINATIONS, PromptVariant, SINGLE_LABEL, expand};
pub use params::{
    FlagMap, FlagValue, ParameterSet, Quality, Size, Style, ValidatedFlags, ValidationOutcome,
    validate,
};
pub use parser::{ParseOutcome, ParsedInput, parse, parse_flags};
pub use request::GenerationRequest;
pub use session::Session;
pub use variations::{VariationCategory, VariationSet};
pub use warning::Warning;

/// Everything needed to expand and submit one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPlan {
    pub base_prompt: String,
    pub variations: VariationSet,
    pub requested_count: usize,
    pub parameters: ParameterSet,
    /// Flags with no meaning here, kept for collaborators that understand them.
    pub passthrough: FlagMap,
}

impl PromptPlan {
    pub fn variants(&self) -> Vec<PromptVariant> {
        expand(&self.base_prompt, &self.variations, self.requested_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub plan: PromptPlan,
    pub warnings: Vec<Warning>,
}

pub fn parse_and_validate(raw: &str) -> PlanOutcome {
    parse_and_validate_with_defaults(raw, "")
}

/// Like [`parse_and_validate`], with `default_flags` (flag-only text)
/// applied underneath the flags written in `raw`.
pub fn parse_and_validate_with_defaults(raw: &str, default_flags: &str) -> PlanOutcome {
    let defaults = parse_flags(default_flags);
    let ParseOutcome { input, warnings } = parse(raw);

    let mut flags = defaults.flags;
    flags.extend(input.flags);
    let validation = validate(&flags);

    let mut all_warnings = defaults.warnings;
    all_warnings.extend(warnings);
    all_warnings.extend(validation.warnings);

    PlanOutcome {
        plan: PromptPlan {
            base_prompt: input.base_prompt,
            variations: input.variations,
            requested_count: input.requested_count,
            parameters: validation.flags.parameters,
            passthrough: validation.flags.passthrough,
        },
        warnings: all_warnings,
    }
}
