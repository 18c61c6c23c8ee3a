//! Async client: executes façade requests on tokio's blocking pool.
//!
//! # Design
//! `MailClient` owns the pieces a call needs (request builder, transport,
//! session store) and nothing else. Every façade operation is one request;
//! there is no retry, no queueing and no ordering between concurrent calls.
//! Dropping a returned future does not abort a request already handed to
//! the transport.

use std::sync::Arc;

use tracing::debug;

use crate::api::{AccountApi, AttachmentApi, AuthApi, ContactApi, MailApi};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, AUTHORIZATION};
use crate::progress::UploadProgress;
use crate::session::{FileSessionStore, SessionStore};
use crate::transport::{Transport, UreqTransport};

pub struct MailClient<T: Transport> {
    api: ApiClient,
    transport: Arc<T>,
    session: Arc<dyn SessionStore>,
}

impl<T: Transport> Clone for MailClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
        }
    }
}

impl MailClient<UreqTransport> {
    /// ureq transport plus the file-backed session store named by `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            ApiClient::new(&config.base_url),
            UreqTransport::from_config(config),
            Arc::new(FileSessionStore::new(&config.session_dir)),
        )
    }
}

impl<T: Transport> MailClient<T> {
    pub fn new(api: ApiClient, transport: T, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            transport: Arc::new(transport),
            session,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn mail(&self) -> MailApi<'_, T> {
        MailApi::new(self)
    }

    pub fn contacts(&self) -> ContactApi<'_, T> {
        ContactApi::new(self)
    }

    pub fn attachments(&self) -> AttachmentApi<'_, T> {
        AttachmentApi::new(self)
    }

    pub fn accounts(&self) -> AccountApi<'_, T> {
        AccountApi::new(self)
    }

    pub fn auth(&self) -> AuthApi<'_, T> {
        AuthApi::new(self)
    }

    /// Forget the stored credential. The server is not contacted.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        debug!("session credential cleared");
        Ok(())
    }

    /// Run one request, attaching the bearer credential when present.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = self.authorize(request)?;
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.execute(request, None))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }

    /// Like `execute`, reporting upload progress as whole percentages.
    pub async fn execute_with_progress<F>(&self, request: HttpRequest, on_progress: F) -> Result<HttpResponse, ApiError>
    where
        F: FnMut(u8) + Send + 'static,
    {
        let request = self.authorize(request)?;
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || {
            let total = request.body.as_ref().map_or(0, |b| b.len() as u64);
            let mut progress = UploadProgress::new(on_progress);
            let mut report = |sent: u64, size: u64| progress.update(sent, size);
            let response = transport.execute(request, Some(&mut report))?;
            progress.finish(total);
            Ok(response)
        })
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?
    }

    fn authorize(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Ok(match self.session.token()? {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        })
    }
}
