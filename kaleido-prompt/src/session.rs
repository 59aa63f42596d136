use kaleido_utils::trimmed_or_none;

use crate::expander::PromptVariant;
use crate::params::validate;
use crate::parser::{FlagsOutcome, parse_flags};
use crate::request::GenerationRequest;
use crate::{PromptPlan, Warning};

/// A prompt plan that evolves through follow-up edits.
///
/// Variations and the requested count are fixed when the session starts;
/// tweaks and flag changes only touch the base prompt and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    plan: PromptPlan,
}

impl Session {
    pub fn new(plan: PromptPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &PromptPlan {
        &self.plan
    }

    /// Append a modification sentence to the base prompt.
    ///
    /// Returns `false` and leaves the prompt alone when `tweak` is blank.
    pub fn tweak(&mut self, tweak: &str) -> bool {
        let Some(tweak) = trimmed_or_none(Some(tweak)) else {
            return false;
        };
        self.plan.base_prompt = format!("{}. {tweak}", self.plan.base_prompt);
        true
    }

    /// Change parameters from flag-only text such as `-size landscape`.
    ///
    /// The parameters are rebuilt from `text` alone, so a key that is not
    /// written goes back to its default. Passthrough flags accumulate.
    pub fn apply_flags(&mut self, text: &str) -> Vec<Warning> {
        let FlagsOutcome { flags, mut warnings } = parse_flags(text);
        let validation = validate(&flags);
        warnings.extend(validation.warnings);
        self.plan.parameters = validation.flags.parameters;
        self.plan.passthrough.extend(validation.flags.passthrough);
        warnings
    }

    pub fn variants(&self) -> Vec<PromptVariant> {
        self.plan.variants()
    }

    pub fn requests<'a>(
        &self,
        model: &'a str,
        variants: &'a [PromptVariant],
    ) -> Vec<GenerationRequest<'a>> {
        variants
            .iter()
            .map(|variant| GenerationRequest::new(model, &variant.text, &self.plan.parameters))
            .collect()
    }
}
