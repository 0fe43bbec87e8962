//! Classifier listing.

use axum::extract::State;
use axum::Json;
use dfd_models::ClassifierVariant;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelInfo {
    pub name: ClassifierVariant,
    pub description: &'static str,
    pub output_format: &'static str,
    pub loaded: bool,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub available_models: Vec<ModelInfo>,
    pub default_model: ClassifierVariant,
}

/// `GET /api/v1/models`
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let registry = state.registry();
    let available_models = ClassifierVariant::ALL
        .into_iter()
        .map(|variant| ModelInfo {
            name: variant,
            description: variant.description(),
            output_format: variant.output_format(),
            loaded: registry.is_loaded(variant),
        })
        .collect();

    Json(ModelsResponse {
        available_models,
        default_model: state.config.default_model,
    })
}
