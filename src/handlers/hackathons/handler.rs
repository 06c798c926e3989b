//! Hackathon handler implementations

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::{CurrentUser, OptionalUser},
    models::record::{to_value, Projection},
    services::HackathonService,
    state::AppState,
    utils::hackathon_path,
};

use super::{
    request::{FormErrors, HackathonForm, ProjectionQuery},
    response::{user_value, FormResponse, HackathonResponse, IndexResponse, UpdateResponse},
};

/// List every hackathon
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Json<IndexResponse>> {
    let hackathons = HackathonService::list(state.db()).await?;

    let user = match user {
        Some(mut user) => {
            user.hackathons = HackathonService::organized_by(state.db(), &user.id).await?;
            Some(user_value(&user))
        }
        None => None,
    };

    Ok(Json(IndexResponse {
        hackathons: hackathons
            .iter()
            .map(|h| to_value(h, &Projection::new()))
            .collect(),
        user,
    }))
}

/// Hackathon with its leaderboard
pub async fn show(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ProjectionQuery>,
) -> AppResult<Json<HackathonResponse>> {
    let hackathon = HackathonService::leaderboard(state.db(), &name).await?;
    let projection = Projection::from_query(query.show.as_deref(), query.hide.as_deref());

    Ok(Json(HackathonResponse::new(&hackathon, &projection)))
}

/// Sync the signed-in user's coding time and show the refreshed leaderboard
pub async fn join(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<HackathonResponse>> {
    let hackathon = HackathonService::join(&state, &user, &name).await?;

    Ok(Json(HackathonResponse::new(&hackathon, &Projection::new())))
}

/// Empty creation form
pub async fn new_form(CurrentUser(_user): CurrentUser) -> Json<FormResponse> {
    Json(FormResponse::new(HackathonForm::default(), FormErrors::new()))
}

/// Create a hackathon, or echo the form back with its errors
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<HackathonForm>,
) -> AppResult<Response> {
    let valid = match form.validate_form() {
        Ok(valid) => valid,
        Err(errors) => return Ok(Json(FormResponse::new(form, errors)).into_response()),
    };

    let created = HackathonService::create(
        state.db(),
        &user.id,
        &valid.name,
        valid.coding_starts_at,
        valid.coding_ends_at,
        &valid.timezone,
    )
    .await;

    match created {
        Ok(hackathon) => Ok(Redirect::to(&hackathon_path(&hackathon.name)).into_response()),
        Err(AppError::AlreadyExists(_)) => {
            let mut errors = FormErrors::new();
            errors.insert(
                "name".to_string(),
                vec!["A hackathon with this name already exists.".to_string()],
            );
            Ok(Json(FormResponse::new(form, errors)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Organizer edits: name, coding window and timezone
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> AppResult<Json<UpdateResponse>> {
    let (hackathon, changes) = HackathonService::update(state.db(), &user, &name, &input).await?;

    Ok(Json(UpdateResponse {
        hackathon: to_value(&hackathon, &Projection::new()),
        changes,
    }))
}
