use std::sync::Arc;

use crate::study_guide::generator::StudyGuideGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Mock or live generator, chosen once at startup by `build_generator`.
    pub generator: Arc<dyn StudyGuideGenerator>,
}
