use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{Attachment, Db, Mail, MailAccount, MailInput, Store, INTERNAL_DOMAIN};
use crate::CurrentUser;

const DRAFTS: &str = "drafts";
const MAX_PAGE_SIZE: usize = 200;

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    keyword: String,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    account_id: Option<i64>,
    #[serde(default)]
    page: i64,
    #[serde(default = "default_size")]
    size: i64,
}

fn default_size() -> i64 {
    20
}

#[derive(Serialize)]
pub struct MailDetail {
    mail: Mail,
    attachments: Vec<Attachment>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailStats {
    unread_count: usize,
    drafts_count: usize,
}

/// Folder filter shared by list and search. `starred` and `trash` are
/// virtual folders.
fn in_folder(mail: &Mail, folder: &str) -> bool {
    match folder.to_ascii_lowercase().as_str() {
        "" => !mail.is_deleted,
        "starred" => mail.is_starred && !mail.is_deleted,
        "trash" => mail.is_deleted,
        other => !mail.is_deleted && mail.folder.eq_ignore_ascii_case(other),
    }
}

fn resolve_account(store: &Store, user_id: i64, account_id: Option<i64>) -> Result<MailAccount, StatusCode> {
    let account = match account_id {
        Some(id) => store.accounts.get(&id).filter(|a| a.user_id == Some(user_id)),
        None => store.default_account(user_id),
    };
    account.cloned().ok_or(StatusCode::BAD_REQUEST)
}

fn link_attachments(store: &mut Store, attachment_ids: &[i64], mail_id: i64) {
    for id in attachment_ids {
        if let Some(stored) = store.attachments.get_mut(id) {
            stored.meta.mail_id = Some(mail_id);
        }
    }
}

/// Drop an inbox copy into every local recipient's mailbox.
fn deliver(store: &mut Store, mail: &Mail) {
    let recipients: BTreeSet<i64> = mail
        .recipients()
        .map(|addr| {
            addr.rsplit_once('<')
                .map_or(addr, |(_, rest)| rest.trim_end_matches('>'))
                .trim()
        })
        .filter(|addr| addr.to_ascii_lowercase().ends_with(INTERNAL_DOMAIN))
        .filter_map(|addr| store.user_by_email(addr).map(|u| u.id))
        .collect();
    for user_id in recipients {
        let id = store.next_id();
        let copy = Mail {
            id,
            user_id,
            account_id: None,
            folder: "inbox".to_string(),
            is_read: false,
            is_starred: false,
            is_deleted: false,
            ..mail.clone()
        };
        store.mails.insert(id, copy);
    }
}

pub async fn send(
    State(db): State<Db>,
    user: CurrentUser,
    Json(input): Json<MailInput>,
) -> Result<Json<Mail>, StatusCode> {
    if !input.has_recipient() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let account = resolve_account(&store, user.0, input.account_id)?;
    let id = store.next_id();
    let mail = Mail {
        id,
        user_id: user.0,
        account_id: account.id,
        folder: "sent".to_string(),
        from_address: Some(account.sender()),
        to_address: input.to_address,
        cc_address: input.cc_address,
        bcc_address: input.bcc_address,
        subject: input.subject,
        content: input.content,
        plain_content: input.plain_content,
        is_read: true,
        is_starred: false,
        is_deleted: false,
        has_attachment: !input.attachment_ids.is_empty(),
        priority: input.priority.unwrap_or(3),
    };
    store.mails.insert(id, mail.clone());
    link_attachments(&mut store, &input.attachment_ids, id);
    deliver(&mut store, &mail);

    if let Some(draft_id) = input.id {
        let is_own_draft = store
            .mails
            .get(&draft_id)
            .is_some_and(|m| m.user_id == user.0 && m.folder == DRAFTS);
        if is_own_draft {
            store.mails.remove(&draft_id);
        }
    }
    info!(id, from = ?mail.from_address, to = ?mail.to_address, "mail sent");
    Ok(Json(mail))
}

pub async fn save_draft(
    State(db): State<Db>,
    user: CurrentUser,
    Json(input): Json<MailInput>,
) -> Result<Json<Mail>, StatusCode> {
    let mut store = db.write().await;
    let account = resolve_account(&store, user.0, input.account_id).ok();
    let id = match input.id {
        Some(id) => {
            store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
            id
        }
        None => store.next_id(),
    };
    let draft = Mail {
        id,
        user_id: user.0,
        account_id: account.as_ref().and_then(|a| a.id),
        folder: DRAFTS.to_string(),
        from_address: account.as_ref().map(MailAccount::sender),
        to_address: input.to_address,
        cc_address: input.cc_address,
        bcc_address: input.bcc_address,
        subject: input.subject,
        content: input.content,
        plain_content: input.plain_content,
        is_read: true,
        is_starred: false,
        is_deleted: false,
        has_attachment: !input.attachment_ids.is_empty(),
        priority: input.priority.unwrap_or(3),
    };
    store.mails.insert(id, draft.clone());
    link_attachments(&mut store, &input.attachment_ids, id);
    Ok(Json(draft))
}

pub async fn send_draft(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Mail>, StatusCode> {
    let mut store = db.write().await;
    let draft = store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
    if !draft.folder.eq_ignore_ascii_case(DRAFTS) || draft.recipients().next().is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    draft.folder = "sent".to_string();
    draft.is_read = true;
    let sent = draft.clone();
    deliver(&mut store, &sent);
    Ok(Json(sent))
}

pub async fn list(
    State(db): State<Db>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Mail>>, StatusCode> {
    user.require(user_id)?;
    let folder = params.folder.unwrap_or_default();
    let store = db.read().await;
    let mails = store
        .mails
        .values()
        .rev()
        .filter(|m| m.user_id == user.0 && in_folder(m, &folder))
        .cloned()
        .collect();
    Ok(Json(mails))
}

pub async fn search(
    State(db): State<Db>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Mail>> {
    let keyword = params.keyword.trim();
    if keyword.is_empty() {
        return Json(Vec::new());
    }
    let size = params.size.clamp(1, MAX_PAGE_SIZE as i64) as usize;
    let page = params.page.max(0) as usize;
    let folder = params.folder.unwrap_or_default();
    let store = db.read().await;
    let mails = store
        .mails
        .values()
        .rev()
        .filter(|m| m.user_id == user.0 && in_folder(m, &folder))
        .filter(|m| params.account_id.is_none() || m.account_id == params.account_id)
        .filter(|m| m.matches_keyword(keyword))
        .skip(page.saturating_mul(size))
        .take(size)
        .cloned()
        .collect();
    Json(mails)
}

/// Returns the mail with its attachments and marks it read.
pub async fn detail(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MailDetail>, StatusCode> {
    let mut store = db.write().await;
    let mail = store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
    mail.is_read = true;
    let mail = mail.clone();
    let attachments = store
        .attachments
        .values()
        .filter(|a| a.meta.mail_id == Some(id))
        .map(|a| a.meta.clone())
        .collect();
    Ok(Json(MailDetail { mail, attachments }))
}

pub async fn mark_as_read(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let mail = store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
    mail.is_read = true;
    Ok(StatusCode::OK)
}

pub async fn toggle_star(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let mail = store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
    mail.is_starred = !mail.is_starred;
    Ok(StatusCode::OK)
}

/// Moves a mail to the trash.
pub async fn delete(
    State(db): State<Db>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let mail = store.owned_mail_mut(id, user.0).ok_or(StatusCode::NOT_FOUND)?;
    mail.is_deleted = true;
    Ok(StatusCode::OK)
}

fn require_all_owned(store: &Store, ids: &[i64], user_id: i64) -> Result<(), StatusCode> {
    let all_owned = ids
        .iter()
        .all(|id| store.mails.get(id).is_some_and(|m| m.user_id == user_id));
    if all_owned {
        Ok(())
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub async fn batch_delete(
    State(db): State<Db>,
    user: CurrentUser,
    Json(ids): Json<Vec<i64>>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    require_all_owned(&store, &ids, user.0)?;
    for id in &ids {
        if let Some(mail) = store.mails.get_mut(id) {
            mail.is_deleted = true;
        }
    }
    Ok(StatusCode::OK)
}

/// Removes mails and their attachments for good.
pub async fn delete_permanently(
    State(db): State<Db>,
    user: CurrentUser,
    Json(ids): Json<Vec<i64>>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    require_all_owned(&store, &ids, user.0)?;
    for id in &ids {
        store.mails.remove(id);
    }
    store
        .attachments
        .retain(|_, a| a.meta.mail_id.map_or(true, |mail_id| !ids.contains(&mail_id)));
    info!(?ids, "mails permanently deleted");
    Ok(StatusCode::OK)
}

/// Un-deletes trashed mails. Unknown ids are skipped; someone else's mail
/// rejects the whole batch.
pub async fn restore(
    State(db): State<Db>,
    user: CurrentUser,
    Json(ids): Json<Vec<i64>>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let foreign = ids
        .iter()
        .filter_map(|id| store.mails.get(id))
        .any(|m| m.user_id != user.0);
    if foreign {
        return Err(StatusCode::FORBIDDEN);
    }
    for id in &ids {
        if let Some(mail) = store.mails.get_mut(id) {
            mail.is_deleted = false;
        }
    }
    Ok(StatusCode::OK)
}

pub async fn stats(
    State(db): State<Db>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<MailStats>, StatusCode> {
    user.require(user_id)?;
    let store = db.read().await;
    let owned = || store.mails.values().filter(|m| m.user_id == user.0 && !m.is_deleted);
    Ok(Json(MailStats {
        unread_count: owned().filter(|m| !m.is_read).count(),
        drafts_count: owned().filter(|m| m.folder == DRAFTS).count(),
    }))
}
