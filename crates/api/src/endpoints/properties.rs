//! Property listing and management endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use rentora_common::{AppError, AppResult};
use rentora_core::{PhotoUpload, PropertyInput};
use rentora_db::{
    entities::{photo, property},
    repositories::PropertyFilter,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Photo metadata with its public URL.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: String,
    pub url: String,
    pub original_name: String,
    pub content_type: String,
    pub size: i64,
}

/// Full property view.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub owner_id: String,
    pub created_at: String,
    pub photos: Vec<PhotoResponse>,
}

pub(crate) fn photo_response(state: &AppState, p: photo::Model) -> PhotoResponse {
    PhotoResponse {
        url: state.storage.public_url(&p.filename),
        id: p.id,
        original_name: p.original_name,
        content_type: p.content_type,
        size: p.size,
    }
}

pub(crate) fn property_response(
    state: &AppState,
    p: property::Model,
    photos: Vec<photo::Model>,
) -> PropertyResponse {
    PropertyResponse {
        id: p.id,
        title: p.title,
        description: p.description,
        location: p.location,
        price: p.price,
        latitude: p.latitude,
        longitude: p.longitude,
        owner_id: p.owner_id,
        created_at: p.created_at.to_rfc3339(),
        photos: photos
            .into_iter()
            .map(|ph| photo_response(state, ph))
            .collect(),
    }
}

/// Browse filter query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub has_photos: Option<bool>,
}

/// Browse properties. Public.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<PropertyResponse>>> {
    let filter = PropertyFilter {
        min_price: query.min_price,
        max_price: query.max_price,
        has_photos: query.has_photos,
    };

    let listed = state.listing_service.list(filter).await?;
    let responses = listed
        .into_iter()
        .map(|(p, photos)| property_response(&state, p, photos))
        .collect();

    Ok(ApiResponse::ok(responses))
}

/// Fetch one property. Public.
async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PropertyResponse>> {
    let (property, photos) = state.listing_service.get(&id).await?;
    Ok(ApiResponse::ok(property_response(&state, property, photos)))
}

/// Parsed multipart property form: scalar fields, uploaded photos, and
/// (on edit) photo record ids to remove.
struct PropertyForm {
    input: PropertyInput,
    photos: Vec<PhotoUpload>,
    delete_photo_ids: Vec<String>,
}

impl PropertyForm {
    async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut title = None;
        let mut description = None;
        let mut location = None;
        let mut price = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut photos = Vec::new();
        let mut delete_photo_ids = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "photo" => {
                    let original_name = field
                        .file_name()
                        .map_or_else(|| "upload".to_string(), ToString::to_string);
                    let content_type = field
                        .content_type()
                        .map_or_else(String::new, ToString::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec();
                    photos.push(PhotoUpload {
                        original_name,
                        content_type,
                        data,
                    });
                }
                "delete_photo" => {
                    let text = Self::text(field).await?;
                    if !text.is_empty() {
                        delete_photo_ids.push(text);
                    }
                }
                "title" => title = Some(Self::text(field).await?),
                "description" => description = Some(Self::text(field).await?),
                "location" => location = Some(Self::text(field).await?),
                "price" => price = Some(Self::number(field, "price").await?),
                "latitude" => latitude = Some(Self::number(field, "latitude").await?),
                "longitude" => longitude = Some(Self::number(field, "longitude").await?),
                _ => {}
            }
        }

        let input = PropertyInput {
            title: title.ok_or_else(|| AppError::BadRequest("Missing field: title".to_string()))?,
            description: description
                .ok_or_else(|| AppError::BadRequest("Missing field: description".to_string()))?,
            location: location
                .ok_or_else(|| AppError::BadRequest("Missing field: location".to_string()))?,
            price: price.ok_or_else(|| AppError::BadRequest("Missing field: price".to_string()))?,
            latitude,
            longitude,
        };

        Ok(Self {
            input,
            photos,
            delete_photo_ids,
        })
    }

    async fn text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
        field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }

    async fn number(field: axum::extract::multipart::Field<'_>, name: &str) -> AppResult<f64> {
        let text = Self::text(field).await?;
        text.parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid number in field: {name}")))
    }
}

/// Create a property with photos. Owner or admin only.
async fn create_property(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<PropertyResponse>> {
    let form = PropertyForm::parse(multipart).await?;

    let (property, photos) = state
        .property_service
        .create(&user, form.input, form.photos)
        .await?;

    Ok(ApiResponse::ok(property_response(&state, property, photos)))
}

/// Edit a property: scalar fields, new photos, photos to remove.
async fn update_property(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<PropertyResponse>> {
    let form = PropertyForm::parse(multipart).await?;

    state
        .property_service
        .update(&user, &id, form.input, form.photos, &form.delete_photo_ids)
        .await?;

    // Re-read for the authoritative photo set after the edit
    let (property, photos) = state.listing_service.get(&id).await?;
    Ok(ApiResponse::ok(property_response(&state, property, photos)))
}

/// Delete a property and everything attached to it. Admin only.
async fn delete_property(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.property_service.delete(&user, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create_property))
        .route(
            "/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
}
