//! In-memory stand-in for the campus mail REST server.
//!
//! Serves the same routes under `/api` as the real backend so the client
//! core can be exercised end-to-end. `/api/auth/*` is public; everything
//! else needs `Authorization: Bearer <token>` from a prior login.

mod handlers;
pub mod model;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub use model::{Attachment, Contact, Db, Mail, MailAccount, Store};

use handlers::{account, attachment, auth, contact, mail};

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new().nest("/api", api()).with_state(db)
}

fn api() -> Router<Db> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/mails", post(mail::send))
        .route("/mails/drafts", post(mail::save_draft))
        .route("/mails/drafts/{id}/send", post(mail::send_draft))
        .route("/mails/user/{user_id}", get(mail::list))
        .route("/mails/search", get(mail::search))
        .route("/mails/batch", delete(mail::batch_delete))
        .route("/mails/trash", delete(mail::delete_permanently))
        .route("/mails/trash/restore", put(mail::restore))
        .route("/mails/stats/{user_id}", get(mail::stats))
        .route("/mails/{id}", get(mail::detail).delete(mail::delete))
        .route("/mails/{id}/read", put(mail::mark_as_read))
        .route("/mails/{id}/star", put(mail::toggle_star))
        .route("/contacts", post(contact::create))
        .route("/contacts/search", get(contact::search))
        .route("/contacts/user/{user_id}", get(contact::list))
        .route("/contacts/{id}", put(contact::update).delete(contact::delete))
        .route("/mail-accounts", post(account::create))
        .route("/mail-accounts/user/{user_id}", get(account::list))
        .route("/mail-accounts/{id}", put(account::update).delete(account::delete))
        .route("/attachments/upload", post(attachment::upload))
        .route("/attachments/upload/batch", post(attachment::upload_batch))
        .route("/attachments/mail/{mail_id}", get(attachment::list_by_mail))
        .route("/attachments/download/{id}", get(attachment::download))
        .route("/attachments/{id}", get(attachment::get).delete(attachment::delete))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The user behind the request's bearer token.
pub struct CurrentUser(pub i64);

impl FromRequestParts<Db> for CurrentUser {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let store = db.read().await;
        store
            .tokens
            .get(token.trim())
            .copied()
            .map(CurrentUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

impl CurrentUser {
    /// 403 unless the path's user is the caller.
    pub fn require(&self, user_id: i64) -> Result<(), StatusCode> {
        if self.0 == user_id {
            Ok(())
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }
}
