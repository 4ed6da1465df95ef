//! Pet API endpoints
//!
//! - POST /pets - Register a pet (owner is the authenticated user)
//! - GET /pets - List all pet profiles, or one via the `petId` query
//!   parameter, with owners and comment authors resolved

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthIdentity};
use crate::models::{CreatePetInput, Pet, PetProfile};
use crate::services::pet::PetServiceError;

/// Request body for pet registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    pub name: String,
    pub death_date: NaiveDate,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Response for successful pet registration
#[derive(Debug, Serialize)]
pub struct CreatePetResponse {
    pub ok: bool,
    pub pet: Pet,
}

/// Query parameters for the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListPetsQuery {
    #[serde(rename = "petId")]
    pub pet_id: Option<i64>,
}

/// Response for a single pet lookup
#[derive(Debug, Serialize)]
pub struct SinglePetResponse {
    pub pet: PetProfile,
}

/// Response for the full listing
#[derive(Debug, Serialize)]
pub struct PetListResponse {
    pub pets: Vec<PetProfile>,
}

/// POST /pets - Register a pet
pub async fn create_pet(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(body): Json<CreatePetRequest>,
) -> Result<Json<CreatePetResponse>, ApiError> {
    let input = CreatePetInput {
        name: body.name,
        death_date: body.death_date,
        favorites: body.favorites,
        image: body.image,
    };

    let pet = state
        .pet_service
        .register(input, identity.0.user_id)
        .await
        .map_err(pet_error_to_api)?;

    Ok(Json(CreatePetResponse { ok: true, pet }))
}

/// GET /pets - List pet profiles
///
/// With `petId`, responds `{pet}` for that profile; without it, responds
/// `{pets}` for every profile, or 404 when none are registered yet.
pub async fn list_pets(
    State(state): State<AppState>,
    _identity: AuthIdentity,
    Query(query): Query<ListPetsQuery>,
) -> Result<Response, ApiError> {
    match query.pet_id {
        Some(pet_id) => {
            let pet = state
                .pet_service
                .profile(pet_id)
                .await
                .map_err(pet_error_to_api)?;

            Ok(Json(SinglePetResponse { pet }).into_response())
        }
        None => {
            let pets = state
                .pet_service
                .list_profiles()
                .await
                .map_err(pet_error_to_api)?;

            if pets.is_empty() {
                return Err(ApiError::not_found("No pets registered yet"));
            }

            Ok(Json(PetListResponse { pets }).into_response())
        }
    }
}

/// Map pet service errors onto the documented failure contract.
fn pet_error_to_api(e: PetServiceError) -> ApiError {
    match e {
        PetServiceError::NotFound(_) => ApiError::not_found(e.to_string()),
        PetServiceError::Validation(_) | PetServiceError::NameTaken(_) => {
            ApiError::bad_request(e.to_string())
        }
        PetServiceError::Internal(err) => {
            tracing::error!("Pet service error: {:#}", err);
            ApiError::bad_request("Request failed")
        }
    }
}
