//! Wire types and in-memory state of the mock campus mail server.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const INTERNAL_DOMAIN: &str = "@campus.mail";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    pub id: i64,
    pub user_id: i64,
    pub account_id: Option<i64>,
    pub folder: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub cc_address: Option<String>,
    pub bcc_address: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub plain_content: Option<String>,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_deleted: bool,
    pub has_attachment: bool,
    pub priority: i32,
}

impl Mail {
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        [&self.to_address, &self.cc_address, &self.bcc_address]
            .into_iter()
            .flatten()
            .flat_map(|list| list.split([',', ';']))
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [
            &self.subject,
            &self.content,
            &self.plain_content,
            &self.from_address,
            &self.to_address,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Send / save-draft payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailInput {
    pub id: Option<i64>,
    pub account_id: Option<i64>,
    pub to_address: Option<String>,
    pub cc_address: Option<String>,
    pub bcc_address: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub plain_content: Option<String>,
    pub priority: Option<i32>,
    #[serde(default)]
    pub attachment_ids: Vec<i64>,
}

impl MailInput {
    pub fn has_recipient(&self) -> bool {
        [&self.to_address, &self.cc_address, &self.bcc_address]
            .into_iter()
            .flatten()
            .any(|addr| !addr.trim().is_empty())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailAccount {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub email_address: String,
    pub display_name: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub is_default: bool,
}

impl MailAccount {
    /// `Display Name <address>` when a display name is set.
    pub fn sender(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name} <{}>", self.email_address),
            _ => self.email_address.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub mail_id: Option<i64>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub storage_path: String,
}

#[derive(Clone, Debug)]
pub struct StoredAttachment {
    pub meta: Attachment,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    pub users: BTreeMap<i64, User>,
    /// Bearer token to user id. Tokens never expire or get revoked.
    pub tokens: HashMap<String, i64>,
    pub mails: BTreeMap<i64, Mail>,
    pub contacts: BTreeMap<i64, Contact>,
    pub accounts: BTreeMap<i64, MailAccount>,
    pub attachments: BTreeMap<i64, StoredAttachment>,
}

impl Store {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn owned_mail_mut(&mut self, id: i64, user_id: i64) -> Option<&mut Mail> {
        self.mails.get_mut(&id).filter(|m| m.user_id == user_id)
    }

    pub fn default_account(&self, user_id: i64) -> Option<&MailAccount> {
        let owned = || self.accounts.values().filter(move |a| a.user_id == Some(user_id));
        owned().find(|a| a.is_default).or_else(|| owned().next())
    }
}

pub type Db = Arc<RwLock<Store>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> Mail {
        Mail {
            id: 1,
            user_id: 1,
            account_id: None,
            folder: "inbox".to_string(),
            from_address: Some("Alice <alice@campus.mail>".to_string()),
            to_address: Some("bob@campus.mail, carol@campus.mail".to_string()),
            cc_address: None,
            bcc_address: Some(" ".to_string()),
            subject: Some("Exam Schedule".to_string()),
            content: None,
            plain_content: None,
            is_read: false,
            is_starred: false,
            is_deleted: false,
            has_attachment: false,
            priority: 3,
        }
    }

    #[test]
    fn mail_serializes_camel_case() {
        let json = serde_json::to_value(mail()).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["isRead"], false);
        assert_eq!(json["toAddress"], "bob@campus.mail, carol@campus.mail");
    }

    #[test]
    fn recipients_split_and_skip_blanks() {
        let m = mail();
        let all: Vec<&str> = m.recipients().collect();
        assert_eq!(all, vec!["bob@campus.mail", "carol@campus.mail"]);
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(mail().matches_keyword("exam"));
        assert!(mail().matches_keyword("ALICE"));
        assert!(!mail().matches_keyword("holiday"));
    }

    #[test]
    fn sender_includes_display_name() {
        let mut account = MailAccount {
            id: Some(1),
            user_id: Some(1),
            email_address: "a@campus.mail".to_string(),
            display_name: Some("Alice".to_string()),
            smtp_host: None,
            smtp_port: None,
            is_default: true,
        };
        assert_eq!(account.sender(), "Alice <a@campus.mail>");
        account.display_name = None;
        assert_eq!(account.sender(), "a@campus.mail");
    }

    #[test]
    fn mail_input_requires_non_blank_recipient() {
        let input: MailInput = serde_json::from_str(r#"{"toAddress":"  "}"#).unwrap();
        assert!(!input.has_recipient());
        let input: MailInput = serde_json::from_str(r#"{"ccAddress":"x@campus.mail"}"#).unwrap();
        assert!(input.has_recipient());
    }
}
