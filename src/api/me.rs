use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

use crate::config::Config;
use crate::database::MongoDB;
use crate::services::auth_service::{ChangePasswordRequest, Claims};
use crate::services::{auth_service, user_service};

// Claims are placed in the request extensions by AuthMiddleware
fn current_username(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<Claims>().map(|claims| claims.sub.clone())
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Me",
    responses(
        (status = 200, description = "Current user", body = crate::models::User),
        (status = 401, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("👤 GET /me");

    let username = match current_username(&req) {
        Some(username) => username,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": "Could not validate credentials"
            }));
        }
    };

    match user_service::get_user(&db, &username).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => {
            log::warn!("❌ Token subject no longer exists: {}", username);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": "Could not validate credentials"
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to load user {}: {}", username, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/me/change-password",
    tag = "Me",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = crate::models::User),
        (status = 401, description = "Incorrect old password or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn change_password(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<ChangePasswordRequest>,
) -> HttpResponse {
    log::info!("🔑 PATCH /me/change-password");

    let username = match current_username(&req) {
        Some(username) => username,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": "Could not validate credentials"
            }));
        }
    };

    // Re-check the old password before accepting the new one
    if let Err(e) = auth_service::authenticate_user(&db, &username, &request.old_password).await {
        log::warn!("❌ Password change refused for {}: {}", username, e);
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "success": false,
            "error": "Incorrect username or password"
        }));
    }

    match user_service::change_password(&db, &username, &request.new_password).await {
        Ok(user) => {
            log::info!("✅ Password changed: {}", username);
            HttpResponse::Ok().json(user)
        }
        Err(e) => {
            log::error!("❌ Password change failed for {}: {}", username, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}
