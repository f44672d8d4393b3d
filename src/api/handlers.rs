use crate::api::AppState;
use crate::assessment::{APP_TITLE, DISCLAIMER};
use crate::catalog::Category;
use crate::error::{AppError, Result};
use crate::ml::{FeatureEncoding, ModelMetadata};
use crate::models::{Assessment, Severity, SymptomSelection};
use axum::{
    extract::{FromRequest, Query, State},
    http::Uri,
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body extractor whose rejections go through `AppError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Everything a form needs to render its inputs
pub async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>> {
    let catalog = state.engine.catalog();

    Ok(Json(CatalogResponse {
        title: APP_TITLE.to_string(),
        disclaimer: DISCLAIMER.to_string(),
        severities: Severity::SELECTABLE.to_vec(),
        categories: catalog.categories().to_vec(),
        features: catalog.features().to_vec(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub title: String,
    pub disclaimer: String,
    pub severities: Vec<Severity>,
    pub categories: Vec<Category>,
    /// Feature order used by the model
    pub features: Vec<String>,
}

/// Symptoms offered for a set of categories
pub async fn list_symptoms(
    State(state): State<AppState>,
    Query(query): Query<SymptomsQuery>,
) -> Result<Json<SymptomsResponse>> {
    let catalog = state.engine.catalog();

    let categories: Vec<String> = match &query.categories {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect(),
        None => catalog.categories().iter().map(|c| c.name.clone()).collect(),
    };

    let symptoms = catalog.symptoms_in(&categories)?;

    Ok(Json(SymptomsResponse {
        categories,
        symptoms,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SymptomsQuery {
    /// Comma-separated category names; all categories when absent
    pub categories: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymptomsResponse {
    pub categories: Vec<String>,
    pub symptoms: Vec<String>,
}

/// Fitted model description
pub async fn get_model(State(state): State<AppState>) -> Result<Json<ModelResponse>> {
    let classifier = state.engine.classifier();

    Ok(Json(ModelResponse {
        metadata: classifier.metadata().clone(),
        classes: classifier.classes().to_vec(),
        features: classifier.feature_names().to_vec(),
        encoding: state.engine.encoding(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelResponse {
    pub metadata: ModelMetadata,
    pub classes: Vec<String>,
    pub features: Vec<String>,
    pub encoding: FeatureEncoding,
}

/// Score a symptom selection
pub async fn create_assessment(
    State(state): State<AppState>,
    AppJson(selection): AppJson<SymptomSelection>,
) -> Result<Json<Assessment>> {
    let assessment = state.engine.assess(&selection)?;
    Ok(Json(assessment))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
