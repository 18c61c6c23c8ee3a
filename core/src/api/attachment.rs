use crate::client::{check_status, parse_ack, parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, CONTENT_DISPOSITION, CONTENT_TYPE};
use crate::service::MailClient;
use crate::transport::Transport;
use crate::types::{Attachment, Download, UploadFile};

/// Request builders for `/attachments`.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentRequests<'a> {
    client: &'a ApiClient,
}

impl<'a> AttachmentRequests<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Multipart upload with the file under the `file` field. `mail_id`
    /// links the attachment to an existing mail right away.
    pub fn build_upload(&self, file: &UploadFile, mail_id: Option<i64>) -> HttpRequest {
        let form = MultipartForm::new().file("file", &file.file_name, &file.content_type, file.data.clone());
        with_mail_id(self.client.request(HttpMethod::Post, "/attachments/upload"), mail_id).multipart_body(form)
    }

    pub fn build_upload_batch(&self, files: &[UploadFile], mail_id: Option<i64>) -> HttpRequest {
        let form = files.iter().fold(MultipartForm::new(), |form, file| {
            form.file("files", &file.file_name, &file.content_type, file.data.clone())
        });
        with_mail_id(self.client.request(HttpMethod::Post, "/attachments/upload/batch"), mail_id)
            .multipart_body(form)
    }

    pub fn build_download(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/attachments/download/{id}"))
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/attachments/{id}"))
    }

    pub fn build_list_by_mail(&self, mail_id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Get, &format!("/attachments/mail/{mail_id}"))
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.client.request(HttpMethod::Delete, &format!("/attachments/{id}"))
    }

    pub fn parse_attachment(&self, response: HttpResponse) -> Result<Attachment, ApiError> {
        parse_json(response)
    }

    pub fn parse_attachments(&self, response: HttpResponse) -> Result<Vec<Attachment>, ApiError> {
        parse_json(response)
    }

    /// Keeps the raw bytes and recovers the file name from
    /// `Content-Disposition`.
    pub fn parse_download(&self, response: HttpResponse) -> Result<Download, ApiError> {
        check_status(&response)?;
        let file_name = response.header(CONTENT_DISPOSITION).and_then(disposition_file_name);
        let content_type = response.header(CONTENT_TYPE).map(str::to_string);
        Ok(Download {
            file_name,
            content_type,
            bytes: response.body,
        })
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }
}

fn with_mail_id(req: HttpRequest, mail_id: Option<i64>) -> HttpRequest {
    match mail_id {
        Some(id) => req.query_param("mailId", id.to_string()),
        None => req,
    }
}

/// Extract the file name from a `Content-Disposition` value, preferring the
/// RFC 5987 `filename*=UTF-8''...` form over a plain `filename=`.
fn disposition_file_name(value: &str) -> Option<String> {
    let params = value.split(';').map(str::trim);
    let mut plain = None;
    for param in params {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let encoded = encoded
                .split_once("''")
                .map_or(encoded, |(_, rest)| rest);
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return Some(decoded.into_owned());
            }
        } else if let Some(name) = param.strip_prefix("filename=") {
            plain = Some(name.trim_matches('"').to_string());
        }
    }
    plain
}

pub struct AttachmentApi<'a, T: Transport> {
    client: &'a MailClient<T>,
}

impl<'a, T: Transport> AttachmentApi<'a, T> {
    pub(crate) fn new(client: &'a MailClient<T>) -> Self {
        Self { client }
    }

    fn requests(&self) -> AttachmentRequests<'a> {
        self.client.api().attachments()
    }

    /// Uploads one file. `on_progress` receives whole percentages as the
    /// transport writes the body.
    pub async fn upload<F>(
        &self,
        file: &UploadFile,
        mail_id: Option<i64>,
        on_progress: Option<F>,
    ) -> Result<Attachment, ApiError>
    where
        F: FnMut(u8) + Send + 'static,
    {
        let req = self.requests().build_upload(file, mail_id);
        let response = match on_progress {
            Some(callback) => self.client.execute_with_progress(req, callback).await?,
            None => self.client.execute(req).await?,
        };
        self.requests().parse_attachment(response)
    }

    pub async fn upload_batch(&self, files: &[UploadFile], mail_id: Option<i64>) -> Result<Vec<Attachment>, ApiError> {
        let req = self.requests().build_upload_batch(files, mail_id);
        self.requests().parse_attachments(self.client.execute(req).await?)
    }

    pub async fn download(&self, id: i64) -> Result<Download, ApiError> {
        let req = self.requests().build_download(id);
        self.requests().parse_download(self.client.execute(req).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Attachment, ApiError> {
        let req = self.requests().build_get(id);
        self.requests().parse_attachment(self.client.execute(req).await?)
    }

    pub async fn list_by_mail(&self, mail_id: i64) -> Result<Vec<Attachment>, ApiError> {
        let req = self.requests().build_list_by_mail(mail_id);
        self.requests().parse_attachments(self.client.execute(req).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let req = self.requests().build_delete(id);
        self.requests().parse_delete(self.client.execute(req).await?)
    }
}
