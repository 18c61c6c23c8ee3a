use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::model::{Attachment, Db, StoredAttachment};
use crate::CurrentUser;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    #[serde(default)]
    mail_id: Option<i64>,
}

struct Upload {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Collect every file part named `field`.
async fn read_files(mut multipart: Multipart, field: &str) -> Result<Vec<Upload>, StatusCode> {
    let mut files = Vec::new();
    while let Some(part) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().unwrap_or("unnamed").to_string();
        let content_type = part.content_type().unwrap_or(OCTET_STREAM).to_string();
        let data = part.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        files.push(Upload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }
    Ok(files)
}

async fn store_files(db: &Db, files: Vec<Upload>, mail_id: Option<i64>) -> Vec<Attachment> {
    let mut store = db.write().await;
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let id = store.next_id();
        let meta = Attachment {
            id,
            mail_id,
            storage_path: format!("uploads/{}_{}", Uuid::new_v4().simple(), file.file_name),
            file_size: file.data.len() as i64,
            file_name: file.file_name,
            file_type: file.content_type,
        };
        store.attachments.insert(
            id,
            StoredAttachment {
                meta: meta.clone(),
                data: file.data,
            },
        );
        stored.push(meta);
    }
    if let Some(mail) = mail_id.and_then(|id| store.mails.get_mut(&id)) {
        mail.has_attachment = true;
    }
    stored
}

pub async fn upload(
    State(db): State<Db>,
    _user: CurrentUser,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<Json<Attachment>, StatusCode> {
    let mut files = read_files(multipart, "file").await?;
    if files.len() != 1 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let file = files.remove(0);
    let mut stored = store_files(&db, vec![file], params.mail_id).await;
    stored.pop().map(Json).ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn upload_batch(
    State(db): State<Db>,
    _user: CurrentUser,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<Json<Vec<Attachment>>, StatusCode> {
    let files = read_files(multipart, "files").await?;
    if files.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(store_files(&db, files, params.mail_id).await))
}

pub async fn list_by_mail(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(mail_id): Path<i64>,
) -> Json<Vec<Attachment>> {
    let store = db.read().await;
    Json(
        store
            .attachments
            .values()
            .filter(|a| a.meta.mail_id == Some(mail_id))
            .map(|a| a.meta.clone())
            .collect(),
    )
}

pub async fn get(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Attachment>, StatusCode> {
    let store = db.read().await;
    store
        .attachments
        .get(&id)
        .map(|a| Json(a.meta.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Raw bytes with an RFC 5987 encoded file name.
pub async fn download(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = db.read().await;
    let stored = store.attachments.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&stored.meta.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, stored.meta.file_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.data.clone(),
    ))
}

pub async fn delete(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    store.attachments.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "success": true, "message": "附件删除成功" })))
}
