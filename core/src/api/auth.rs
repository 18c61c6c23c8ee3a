use tracing::debug;

use crate::client::{parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::service::MailClient;
use crate::transport::Transport;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Request builders for `/auth`.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequests<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthRequests<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_login(&self, credentials: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/auth/login", credentials)
    }

    pub fn build_register(&self, registration: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, "/auth/register", registration)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<RegisterResponse, ApiError> {
        parse_json(response)
    }
}

pub struct AuthApi<'a, T: Transport> {
    client: &'a MailClient<T>,
}

impl<'a, T: Transport> AuthApi<'a, T> {
    pub(crate) fn new(client: &'a MailClient<T>) -> Self {
        Self { client }
    }

    fn requests(&self) -> AuthRequests<'a> {
        self.client.api().auth()
    }

    /// Logs in and stores the returned token in the client's session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let req = self.requests().build_login(credentials)?;
        let login = self.requests().parse_login(self.client.execute(req).await?)?;
        self.client.session().store(&login.token)?;
        debug!(user_id = login.user_id, "session credential stored");
        Ok(login)
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let req = self.requests().build_register(registration)?;
        self.requests().parse_register(self.client.execute(req).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_posts_credentials() {
        let client = ApiClient::new("http://localhost:8080/api");
        let req = client
            .auth()
            .build_login(&LoginRequest {
                username: "alice".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/auth/login");
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"username": "alice", "password": "secret"}));
    }

    #[test]
    fn register_omits_missing_phone() {
        let client = ApiClient::new("http://localhost:8080/api");
        let req = client
            .auth()
            .build_register(&RegisterRequest {
                username: "bob".to_string(),
                password: "pw".to_string(),
                email: "bob@campus.mail".to_string(),
                phone: None,
            })
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("phone").is_none());
    }

    #[test]
    fn parse_login_rejects_unauthorized() {
        let client = ApiClient::new("http://localhost:8080/api");
        let err = client.auth().parse_login(HttpResponse::new(401, "bad credentials")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 401, .. }));
    }
}
