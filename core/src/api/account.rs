use crate::client::{parse_ack, parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::service::MailClient;
use crate::transport::Transport;
use crate::types::MailAccount;

/// Request builders for `/mail-accounts`.
#[derive(Debug, Clone, Copy)]
pub struct AccountRequests<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountRequests<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_list_by_user(&self, user_id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/mail-accounts/user/{user_id}"))
    }

    pub fn build_create(&self, account: &MailAccount) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/mail-accounts", account)
    }

    /// Also used to rename an account or make it the default.
    pub fn build_update(&self, id: i64, account: &MailAccount) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Put, &format!("/mail-accounts/{id}"), account)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Delete, &format!("/mail-accounts/{id}"))
    }

    pub fn parse_account(&self, response: HttpResponse) -> Result<MailAccount, ApiError> {
        parse_json(response)
    }

    pub fn parse_accounts(&self, response: HttpResponse) -> Result<Vec<MailAccount>, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }
}

pub struct AccountApi<'a, T: Transport> {
    client: &'a MailClient<T>,
}

impl<'a, T: Transport> AccountApi<'a, T> {
    pub(crate) fn new(client: &'a MailClient<T>) -> Self {
        Self { client }
    }

    fn requests(&self) -> AccountRequests<'a> {
        self.client.api().accounts()
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<MailAccount>, ApiError> {
        let req = self.requests().build_list_by_user(user_id);
        self.requests().parse_accounts(self.client.execute(req).await?)
    }

    pub async fn create(&self, account: &MailAccount) -> Result<MailAccount, ApiError> {
        let req = self.requests().build_create(account)?;
        self.requests().parse_account(self.client.execute(req).await?)
    }

    pub async fn update(&self, id: i64, account: &MailAccount) -> Result<MailAccount, ApiError> {
        let req = self.requests().build_update(id, account)?;
        self.requests().parse_account(self.client.execute(req).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_delete(id);
        self.requests().parse_delete(self.client.execute(req).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_by_user_path() {
        let client = ApiClient::new("http://localhost:8080/api");
        let req = client.accounts().build_list_by_user(5);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/mail-accounts/user/5");
    }

    #[test]
    fn parse_accounts_defaults_is_default() {
        let client = ApiClient::new("http://localhost:8080/api");
        let body = r#"[{"id":1,"userId":5,"emailAddress":"a@campus.mail"}]"#;
        let accounts = client.accounts().parse_accounts(HttpResponse::new(200, body)).unwrap();
        assert_eq!(accounts[0].email_address, "a@campus.mail");
        assert!(!accounts[0].is_default);
    }
}
