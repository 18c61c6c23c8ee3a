use crate::client::{parse_ack, parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::service::MailClient;
use crate::transport::Transport;
use crate::types::Contact;

/// Request builders for `/contacts`.
#[derive(Debug, Clone, Copy)]
pub struct ContactRequests<'a> {
    client: &'a ApiClient,
}

impl<'a> ContactRequests<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_search(&self, user_id: i64, keyword: &str) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, "/contacts/search")
            .query_param("userId", user_id.to_string())
            .query_param("keyword", keyword)
    }

    pub fn build_list(&self, user_id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/contacts/user/{user_id}"))
    }

    pub fn build_create(&self, contact: &Contact) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/contacts", contact)
    }

    pub fn build_update(&self, id: i64, contact: &Contact) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Put, &format!("/contacts/{id}"), contact)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Delete, &format!("/contacts/{id}"))
    }

    pub fn parse_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        parse_json(response)
    }

    pub fn parse_contacts(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }
}

pub struct ContactApi<'a, T: Transport> {
    client: &'a MailClient<T>,
}

impl<'a, T: Transport> ContactApi<'a, T> {
    pub(crate) fn new(client: &'a MailClient<T>) -> Self {
        Self { client }
    }

    fn requests(&self) -> ContactRequests<'a> {
        self.client.api().contacts()
    }

    pub async fn search(&self, user_id: i64, keyword: &str) -> Result<Vec<Contact>, ApiError> {
        let req = self.requests().build_search(user_id, keyword);
        self.requests().parse_contacts(self.client.execute(req).await?)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Contact>, ApiError> {
        let req = self.requests().build_list(user_id);
        self.requests().parse_contacts(self.client.execute(req).await?)
    }

    pub async fn create(&self, contact: &Contact) -> Result<Contact, ApiError> {
        let req = self.requests().build_create(contact)?;
        self.requests().parse_contact(self.client.execute(req).await?)
    }

    pub async fn update(&self, id: i64, contact: &Contact) -> Result<Contact, ApiError> {
        let req = self.requests().build_update(id, contact)?;
        self.requests().parse_contact(self.client.execute(req).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_delete(id);
        self.requests().parse_delete(self.client.execute(req).await?)
    }
}
