use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::model::{Db, MailAccount, Store};
use crate::CurrentUser;

/// A user's first account becomes the default; naming a new default
/// demotes the previous one.
fn settle_default(store: &mut Store, user_id: i64, account_id: i64) {
    let owned: Vec<i64> = store
        .accounts
        .iter()
        .filter(|(_, a)| a.user_id == Some(user_id))
        .map(|(id, _)| *id)
        .collect();
    let promote = owned.len() == 1 || store.accounts.get(&account_id).is_some_and(|a| a.is_default);
    if !promote {
        return;
    }
    for id in owned {
        if let Some(account) = store.accounts.get_mut(&id) {
            account.is_default = id == account_id;
        }
    }
}

pub async fn create(
    State(db): State<Db>,
    user: CurrentUser,
    Json(mut account): Json<MailAccount>,
) -> Result<Json<MailAccount>, StatusCode> {
    if account.email_address.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let id = store.next_id();
    account.id = Some(id);
    account.user_id = Some(user.0);
    store.accounts.insert(id, account);
    settle_default(&mut store, user.0, id);
    let created = store.accounts.get(&id).cloned().ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(created))
}

pub async fn update(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(mut account): Json<MailAccount>,
) -> Result<Json<MailAccount>, StatusCode> {
    if account.email_address.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let existing = store
        .accounts
        .get_mut(&id)
        .filter(|a| a.user_id == Some(user.0))
        .ok_or(StatusCode::NOT_FOUND)?;
    account.id = Some(id);
    account.user_id = Some(user.0);
    *existing = account;
    settle_default(&mut store, user.0, id);
    let updated = store.accounts.get(&id).cloned().ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(updated))
}

pub async fn delete(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let owned = store.accounts.get(&id).is_some_and(|a| a.user_id == Some(user.0));
    if !owned {
        return Err(StatusCode::NOT_FOUND);
    }
    store.accounts.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(db): State<Db>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<MailAccount>>, StatusCode> {
    user.require(user_id)?;
    let store = db.read().await;
    let accounts = store
        .accounts
        .values()
        .filter(|a| a.user_id == Some(user.0))
        .cloned()
        .collect();
    Ok(Json(accounts))
}
