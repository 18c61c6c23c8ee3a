use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::model::{Contact, Db};
use crate::CurrentUser;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    user_id: i64,
    #[serde(default)]
    keyword: String,
}

fn validate(contact: &Contact) -> Result<(), StatusCode> {
    if contact.contact_name.trim().is_empty() || contact.email.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

pub async fn create(
    State(db): State<Db>,
    user: CurrentUser,
    Json(mut contact): Json<Contact>,
) -> Result<Json<Contact>, StatusCode> {
    validate(&contact)?;
    let mut store = db.write().await;
    let id = store.next_id();
    contact.id = Some(id);
    contact.user_id = Some(user.0);
    store.contacts.insert(id, contact.clone());
    Ok(Json(contact))
}

pub async fn update(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(mut contact): Json<Contact>,
) -> Result<Json<Contact>, StatusCode> {
    validate(&contact)?;
    let mut store = db.write().await;
    let existing = store
        .contacts
        .get_mut(&id)
        .filter(|c| c.user_id == Some(user.0))
        .ok_or(StatusCode::NOT_FOUND)?;
    contact.id = Some(id);
    contact.user_id = Some(user.0);
    *existing = contact.clone();
    Ok(Json(contact))
}

pub async fn delete(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let owned = store.contacts.get(&id).is_some_and(|c| c.user_id == Some(user.0));
    if !owned {
        return Err(StatusCode::NOT_FOUND);
    }
    store.contacts.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(db): State<Db>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Contact>>, StatusCode> {
    user.require(user_id)?;
    let store = db.read().await;
    let contacts = store
        .contacts
        .values()
        .filter(|c| c.user_id == Some(user.0))
        .cloned()
        .collect();
    Ok(Json(contacts))
}

/// Case-insensitive match on name or address; an empty keyword lists all.
pub async fn search(
    State(db): State<Db>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Contact>>, StatusCode> {
    user.require(params.user_id)?;
    let needle = params.keyword.trim().to_lowercase();
    let store = db.read().await;
    let contacts = store
        .contacts
        .values()
        .filter(|c| c.user_id == Some(user.0))
        .filter(|c| {
            needle.is_empty()
                || c.contact_name.to_lowercase().contains(&needle)
                || c.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    Ok(Json(contacts))
}
