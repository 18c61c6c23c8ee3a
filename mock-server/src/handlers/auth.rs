use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::model::{Db, LoginInput, MailAccount, RegisterInput, User, INTERNAL_DOMAIN};

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "success": false, "message": message })))
}

/// Creates the user together with a default sending account for their
/// campus address.
pub async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Result<Json<Value>, Rejection> {
    if input.username.trim().is_empty() || input.password.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "username and password are required"));
    }
    let email = input.email.trim();
    let local_part = email.strip_suffix(INTERNAL_DOMAIN).unwrap_or_default();
    if local_part.is_empty() || local_part.contains('@') {
        return Err(reject(StatusCode::BAD_REQUEST, "email must end with @campus.mail"));
    }

    let mut store = db.write().await;
    if store.users.values().any(|u| u.username == input.username) {
        return Err(reject(StatusCode::CONFLICT, "username already taken"));
    }
    if store.user_by_email(email).is_some() {
        return Err(reject(StatusCode::CONFLICT, "email already registered"));
    }

    let user_id = store.next_id();
    store.users.insert(
        user_id,
        User {
            id: user_id,
            username: input.username.clone(),
            password: input.password,
            email: email.to_string(),
            phone: input.phone,
        },
    );
    let account_id = store.next_id();
    store.accounts.insert(
        account_id,
        MailAccount {
            id: Some(account_id),
            user_id: Some(user_id),
            email_address: email.to_string(),
            display_name: Some(input.username.clone()),
            smtp_host: None,
            smtp_port: None,
            is_default: true,
        },
    );
    info!(user_id, username = %input.username, "user registered");
    Ok(Json(json!({
        "success": true,
        "message": "注册成功",
        "userId": user_id,
        "username": input.username,
    })))
}

pub async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let user = store
        .users
        .values()
        .find(|u| u.username == input.username && u.password == input.password)
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid username or password"))?;
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), user.id);
    info!(user_id = user.id, "user logged in");
    Ok(Json(json!({
        "token": token,
        "userId": user.id,
        "username": user.username,
        "email": user.email,
        "nickname": Value::Null,
        "phone": user.phone,
    })))
}
