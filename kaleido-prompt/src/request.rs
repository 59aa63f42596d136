use serde::Serialize;

use crate::params::{ParameterSet, Quality, Style};

pub const IMAGES_PER_REQUEST: u32 = 1;

/// Body of one image generation call, in the DALL-E 3 payload shape.
///
/// One request is planned per prompt variant. Sending it, and handling the
/// provider's answer, is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u32,
    pub size: &'static str,
    pub quality: Quality,
    pub style: Style,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, parameters: &ParameterSet) -> Self {
        Self {
            model,
            prompt,
            n: IMAGES_PER_REQUEST,
            size: parameters.size.dimensions(),
            quality: parameters.quality,
            style: parameters.style,
        }
    }
}
