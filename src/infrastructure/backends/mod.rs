pub mod gemini;

use std::sync::Arc;

use crate::domain::models::BackendArc;

pub struct BackendManager {}

impl BackendManager {
    pub fn get() -> BackendArc {
        return Arc::new(gemini::Gemini::default());
    }
}
