pub mod html;
pub mod numeric;
pub mod person;
pub mod route;
pub mod token;

use crate::config::SanitizePolicy;
use crate::placeholder::{PlaceholderStore, SourceType};

pub use html::{HtmlSanitizer, SanitizationResult};

/// Per-value state threaded through the scalar layers.
pub struct ScrubContext<'a> {
    pub store: &'a mut PlaceholderStore,
    /// Where the value lives: an attribute or a text node.
    pub origin: SourceType,
    /// Value belongs to a person/author/user field; enables name replacement.
    pub personish: bool,
}

impl<'a> ScrubContext<'a> {
    pub fn attr(store: &'a mut PlaceholderStore, personish: bool) -> Self {
        Self {
            store,
            origin: SourceType::Attr,
            personish,
        }
    }

    pub fn text(store: &'a mut PlaceholderStore, personish: bool) -> Self {
        Self {
            store,
            origin: SourceType::Text,
            personish,
        }
    }
}

/// A single scalar redaction layer.
pub trait ScalarLayer: Send + Sync {
    /// Rewrite `input`, allocating placeholders from the context's store.
    fn apply(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String;

    /// Name of this layer (for logging/debugging).
    fn name(&self) -> &str;
}

/// The scalar redaction pipeline. Runs all layers in sequence.
pub struct ScalarPipeline {
    layers: Vec<Box<dyn ScalarLayer>>,
}

impl ScalarPipeline {
    /// Pipeline with the built-in tables only.
    pub fn default_pipeline() -> Self {
        Self::from_policy(&SanitizePolicy::default())
    }

    /// Order: tokens -> routes/query -> whole numeric value -> person names -> numeric runs.
    pub fn from_policy(policy: &SanitizePolicy) -> Self {
        Self {
            layers: vec![
                Box::new(token::TokenLayer::new()),
                Box::new(route::RouteLayer::new(&policy.extra_tracking_keys)),
                Box::new(numeric::NumericLayer::whole_value()),
                Box::new(person::PersonLayer::new(&policy.extra_person_stopwords)),
                Box::new(numeric::NumericLayer::runs()),
            ],
        }
    }

    /// Create a pipeline from custom layers.
    pub fn new(layers: Vec<Box<dyn ScalarLayer>>) -> Self {
        Self { layers }
    }

    pub fn scrub(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String {
        let mut result = input.to_string();
        for layer in &self.layers {
            result = layer.apply(&result, ctx);
        }
        result
    }

    /// Whether scrubbing would change `input`, without touching any real store.
    pub fn would_change(&self, input: &str, personish: bool) -> bool {
        let mut scratch = PlaceholderStore::new();
        let mut ctx = ScrubContext::text(&mut scratch, personish);
        self.scrub(input, &mut ctx) != input
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

impl Default for ScalarPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
