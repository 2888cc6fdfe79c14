//! Credit pricing.

use crate::{Credits, GenerationMode, GenerationRequest};
use serde::{Deserialize, Serialize};

/// Credit price list.
///
/// Quotes are a pure function of the request's mode and image flag.
///
/// # Examples
///
/// ```
/// use forge_core::{GenerationMode, GenerationRequest, Pricing};
///
/// let pricing = Pricing::default();
/// let lesson = GenerationRequest::new("Food vocabulary", GenerationMode::Lesson);
/// let deck = GenerationRequest::new("Food vocabulary", GenerationMode::Slides).with_images(true);
///
/// assert_eq!(*pricing.quote(&lesson).amount(), 1);
/// assert_eq!(*pricing.quote(&deck).amount(), 2);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(default)]
#[serde(default)]
pub struct Pricing {
    /// Base cost of a lesson plan
    lesson: Credits,
    /// Base cost of a slide deck
    slides: Credits,
    /// Added to slide decks that request images
    image_surcharge: Credits,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            lesson: 1,
            slides: 1,
            image_surcharge: 1,
        }
    }
}

impl Pricing {
    /// Creates a new pricing builder.
    pub fn builder() -> PricingBuilder {
        PricingBuilder::default()
    }

    /// Prices a request.
    pub fn quote(&self, request: &GenerationRequest) -> CostQuote {
        let base = match request.mode {
            GenerationMode::Lesson => self.lesson,
            GenerationMode::Slides => self.slides,
        };
        let surcharge = if request.mode == GenerationMode::Slides && request.include_images {
            self.image_surcharge
        } else {
            0
        };
        CostQuote {
            amount: base + surcharge,
            mode: request.mode,
            include_images: request.include_images,
        }
    }

    /// Checks every price is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns a description of the first non-positive price.
    pub fn validate(&self) -> Result<(), String> {
        if self.lesson <= 0 {
            return Err(format!("lesson price must be positive, got {}", self.lesson));
        }
        if self.slides <= 0 {
            return Err(format!("slides price must be positive, got {}", self.slides));
        }
        if self.image_surcharge < 0 {
            return Err(format!(
                "image surcharge must not be negative, got {}",
                self.image_surcharge
            ));
        }
        Ok(())
    }
}

/// Credits a specific request will cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct CostQuote {
    amount: Credits,
    mode: GenerationMode,
    include_images: bool,
}
