use crate::client::{parse_ack, parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::service::MailClient;
use crate::transport::Transport;
use crate::types::{Mail, MailDetail, MailDraft, MailStats, SearchQuery};

/// Request builders for `/mails`.
#[derive(Debug, Clone, Copy)]
pub struct MailRequests<'a> {
    client: &'a ApiClient,
}

impl<'a> MailRequests<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_send(&self, draft: &MailDraft) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/mails", draft)
    }

    pub fn build_save_draft(&self, draft: &MailDraft) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/mails/drafts", draft)
    }

    pub fn build_send_draft(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Post, &format!("/mails/drafts/{id}/send"))
    }

    /// `folder` is always sent; an empty value asks for every folder.
    pub fn build_list(&self, user_id: i64, folder: &str) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/mails/user/{user_id}"))
            .query_param("folder", folder)
    }

    pub fn build_search(&self, query: &SearchQuery) -> HttpRequest {
        let mut req = self
            .client
            .request(HttpMethod::Get, "/mails/search")
            .query_param("keyword", query.keyword.as_str())
            .query_param("folder", query.folder.as_str())
            .query_param("page", query.page.to_string())
            .query_param("size", query.size.to_string());
        if let Some(account_id) = query.account_id {
            req = req.query_param("accountId", account_id.to_string());
        }
        req
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/mails/{id}"))
    }

    pub fn build_mark_as_read(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Put, &format!("/mails/{id}/read"))
    }

    pub fn build_toggle_star(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Put, &format!("/mails/{id}/star"))
    }

    /// Moves the mail to the trash.
    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Delete, &format!("/mails/{id}"))
    }

    pub fn build_batch_delete(&self, ids: &[i64]) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Delete, "/mails/batch", ids)
    }

    /// Removes trashed mails for good.
    pub fn build_delete_permanently(&self, ids: &[i64]) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Delete, "/mails/trash", ids)
    }

    pub fn build_restore(&self, ids: &[i64]) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Put, "/mails/trash/restore", ids)
    }

    pub fn build_stats(&self, user_id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/mails/stats/{user_id}"))
    }

    /// Parses the answer to send, save-draft and send-draft.
    pub fn parse_mail(&self, response: HttpResponse) -> Result<Mail, ApiError> {
        parse_json(response)
    }

    /// Parses the answer to list and search.
    pub fn parse_mails(&self, response: HttpResponse) -> Result<Vec<Mail>, ApiError> {
        parse_json(response)
    }

    pub fn parse_detail(&self, response: HttpResponse) -> Result<MailDetail, ApiError> {
        parse_json(response)
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<MailStats, ApiError> {
        parse_json(response)
    }

    /// Parses the bodiless answers to flag, delete and restore calls.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }
}

/// Async mail operations, one request each.
pub struct MailApi<'a, T: Transport> {
    client: &'a MailClient<T>,
}

impl<'a, T: Transport> MailApi<'a, T> {
    pub(crate) fn new(client: &'a MailClient<T>) -> Self {
        Self { client }
    }

    fn requests(&self) -> MailRequests<'a> {
        self.client.api().mail()
    }

    pub async fn send(&self, draft: &MailDraft) -> Result<Mail, ApiError> {
        let req = self.requests().build_send(draft)?;
        self.requests().parse_mail(self.client.execute(req).await?)
    }

    pub async fn save_draft(&self, draft: &MailDraft) -> Result<Mail, ApiError> {
        let req = self.requests().build_save_draft(draft)?;
        self.requests().parse_mail(self.client.execute(req).await?)
    }

    pub async fn send_draft(&self, id: i64) -> Result<Mail, ApiError> {
        let req = self.requests().build_send_draft(id);
        self.requests().parse_mail(self.client.execute(req).await?)
    }

    pub async fn list(&self, user_id: i64, folder: &str) -> Result<Vec<Mail>, ApiError> {
        let req = self.requests().build_list(user_id, folder);
        self.requests().parse_mails(self.client.execute(req).await?)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Mail>, ApiError> {
        let req = self.requests().build_search(query);
        self.requests().parse_mails(self.client.execute(req).await?)
    }

    pub async fn get(&self, id: i64) -> Result<MailDetail, ApiError> {
        let req = self.requests().build_get(id);
        self.requests().parse_detail(self.client.execute(req).await?)
    }

    pub async fn mark_as_read(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_mark_as_read(id);
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn toggle_star(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_toggle_star(id);
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_delete(id);
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn batch_delete(&self, ids: &[i64]) -> Result<(), ApiError> {
        let req = self.requests().build_batch_delete(ids)?;
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn delete_permanently(&self, ids: &[i64]) -> Result<(), ApiError> {
        let req = self.requests().build_delete_permanently(ids)?;
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn restore(&self, ids: &[i64]) -> Result<(), ApiError> {
        let req = self.requests().build_restore(ids)?;
        self.requests().parse_ack(self.client.execute(req).await?)
    }

    pub async fn stats(&self, user_id: i64) -> Result<MailStats, ApiError> {
        let req = self.requests().build_stats(user_id);
        self.requests().parse_stats(self.client.execute(req).await?)
    }
}
