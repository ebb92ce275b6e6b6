use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::user_service::UserService;
use crate::domain::ports::Storage;
use crate::domain::user::{User, UserProfile};
use crate::errors::AppError;

/// Profile obtained from the identity provider after login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    pub external_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_member: bool,
}

impl From<UpsertUserRequest> for UserProfile {
    fn from(body: UpsertUserRequest) -> Self {
        UserProfile {
            external_id: body.external_id,
            display_name: body.display_name,
            email: body.email,
            access_token: body.access_token,
            phone: body.phone,
            is_member: body.is_member,
        }
    }
}

/// The access token is never echoed back.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub is_member: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            external_id: u.external_id,
            display_name: u.display_name,
            email: u.email,
            phone: u.phone,
            is_member: u.is_member,
        }
    }
}

/// PUT /users
///
/// Creates the user, or updates the one already linked to `external_id`.
#[utoipa::path(
    put,
    path = "/users",
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "User stored", body = UserResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn upsert_user<S: Storage>(
    service: web::Data<UserService<S>>,
    body: web::Json<UpsertUserRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = UserProfile::from(body.into_inner());

    let user = web::block(move || service.save_or_update(profile))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user<S: Storage>(
    service: web::Data<UserService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let user = web::block(move || service.get_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn list_users<S: Storage>(
    service: web::Data<UserService<S>>,
) -> Result<HttpResponse, AppError> {
    let users = web::block(move || service.list_users())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /users/{id}
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user<S: Storage>(
    service: web::Data<UserService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    web::block(move || service.delete_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
