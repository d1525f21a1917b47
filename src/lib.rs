use std::iter::once;

use axum::extract::{FromRef, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthenticatedUser, TokenVerifier};
use crate::configuration::DatabaseConfiguration;
use crate::error::ApiError;
use crate::structs::api;
use crate::structs::profile::UserProfile;

pub mod auth;
pub mod configuration;
pub mod error;
pub mod structs;

pub const PROFILES_COLLECTION: &str = "user_profiles";

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub token_verifier: TokenVerifier,
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.token_verifier.clone()
    }
}

fn profiles_store(database: &Database) -> Collection<UserProfile> {
    database.collection(PROFILES_COLLECTION)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

// `GET /` serves two audiences: anonymous callers get the welcome message,
// callers presenting credentials get the active-profile listing (and a 401
// when those credentials do not verify).
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Ok(Json(serde_json::json!({
            "message": "Welcome to version 1 of this API!"
        }))
        .into_response());
    }

    state.token_verifier.authenticate(&headers)?;

    let cursor = profiles_store(&state.database)
        .find(doc! { "active": true }, None)
        .await?;
    let found: Vec<UserProfile> = cursor.try_collect().await?;

    Ok(Json(
        found
            .into_iter()
            .map(api::ProfileBody::from)
            .collect::<Vec<_>>(),
    )
    .into_response())
}

async fn list_profiles(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<api::ProfileBody>>, ApiError> {
    let cursor = profiles_store(&state.database).find(None, None).await?;
    let found: Vec<UserProfile> = cursor.try_collect().await?;

    Ok(Json(found.into_iter().map(api::ProfileBody::from).collect()))
}

async fn find_own_profile(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Option<api::ProfileBody>>, ApiError> {
    let found = profiles_store(&state.database)
        .find_one(doc! { "userId": &user.subject }, None)
        .await?;

    Ok(Json(found.map(api::ProfileBody::from)))
}

async fn find_profile(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<api::ProfileBody>, ApiError> {
    let profile = load_profile(&state.database, &id).await?;

    Ok(Json(api::ProfileBody::from(profile)))
}

async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<api::CreateProfileBody>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = UserProfile::create(body);
    profile.validate()?;

    // No uniqueness pre-check: the unique index on `userId` is the safety
    // net for duplicate-subject races.
    profiles_store(&state.database)
        .insert_one(&profile, None)
        .await?;

    let id = profile.id.to_hex();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/{}", id))],
        Json(api::CreatedBody { id }),
    ))
}

async fn update_profile(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<api::UpdateProfileBody>,
) -> Result<StatusCode, ApiError> {
    let mut profile = load_profile(&state.database, &id).await?;
    authorize_owner(&user, &profile)?;

    profile.apply_update(body);
    profile.validate()?;
    profiles_store(&state.database)
        .replace_one(doc! { "_id": profile.id }, &profile, None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_profile(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let profile = load_profile(&state.database, &id).await?;
    authorize_owner(&user, &profile)?;

    profiles_store(&state.database)
        .delete_one(doc! { "_id": profile.id }, None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// An id that does not parse as an ObjectId cannot name a record, so it gets
// the same 404 as a well-formed id with no document behind it.
async fn load_profile(database: &Database, id: &str) -> Result<UserProfile, ApiError> {
    let object_id = ObjectId::parse_str(id)
        .map_err(|_| ApiError::NotFound(format!("no profile with id {}", id)))?;

    profiles_store(database)
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no profile with id {}", id)))
}

fn authorize_owner(user: &AuthenticatedUser, profile: &UserProfile) -> Result<(), ApiError> {
    if user.subject != profile.user_id {
        return Err(ApiError::Forbidden(String::from(
            "only the profile owner may modify it",
        )));
    }

    Ok(())
}

pub async fn run(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

pub async fn get_database_connection(
    database_config: DatabaseConfiguration,
) -> Result<Database, mongodb::error::Error> {
    let client_options = ClientOptions::parse(database_config.connection_string()).await?;
    let client = Client::with_options(client_options)?;
    Ok(client.database(&database_config.database_name))
}

pub async fn ensure_indexes(database: &Database) -> Result<(), mongodb::error::Error> {
    let user_id_unique = IndexModel::builder()
        .keys(doc! { "userId": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    profiles_store(database)
        .create_index(user_id_unique, None)
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/users", get(list_profiles))
        .route("/my-profile", get(find_own_profile))
        .route("/", get(index).post(create_profile))
        .route(
            "/:id",
            get(find_profile).patch(update_profile).delete(delete_profile),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new(once(
                    header::AUTHORIZATION,
                )))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
