//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector names an operation, its input, the request it must produce,
//! a simulated response and the expected parse result or error. Bodies and
//! results are compared as parsed JSON or typed values, never raw strings.

use std::fmt::Debug;

use campusmail_core::{
    ApiClient, ApiError, Attachment, Contact, HttpMethod, HttpRequest, HttpResponse, LoginRequest, LoginResponse,
    Mail, MailAccount, MailDetail, MailDraft, MailStats, RegisterRequest, RegisterResponse, SearchQuery,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080/api";

fn client() -> ApiClient {
    ApiClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let arr = pair.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn input<T: DeserializeOwned>(case: &Value, key: &str) -> T {
    serde_json::from_value(case["input"][key].clone()).unwrap()
}

fn id(case: &Value) -> i64 {
    case["input"]["id"].as_i64().unwrap()
}

fn user_id(case: &Value) -> i64 {
    case["input"]["userId"].as_i64().unwrap()
}

fn ids(case: &Value) -> Vec<i64> {
    input(case, "ids")
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    assert_eq!(req.query, pairs(&expected["query"]), "{name}: query");
    assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
    match &expected["body"] {
        Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
        body => {
            let sent: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    let mut response = HttpResponse::new(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap());
    if !sim["headers"].is_null() {
        response.headers = pairs(&sim["headers"]);
    }
    response
}

fn check_error(name: &str, err: &ApiError, expected: &str) {
    match (err, expected.split_once(':')) {
        (ApiError::NotFound, None) if expected == "NotFound" => {}
        (ApiError::HttpError { status, .. }, Some(("HttpError", code))) => {
            assert_eq!(status.to_string(), code, "{name}: status");
        }
        (other, _) => panic!("{name}: expected {expected}, got {other:?}"),
    }
}

/// Compare a parse result with the case's `expected_result` or `expected_error`.
fn check_result<T: DeserializeOwned + PartialEq + Debug>(name: &str, case: &Value, result: Result<T, ApiError>) {
    if let Some(expected) = case["expected_error"].as_str() {
        check_error(name, &result.unwrap_err(), expected);
        return;
    }
    let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
    assert_eq!(result.unwrap(), expected, "{name}: parsed result");
}

// ---------------------------------------------------------------------------
// Mail
// ---------------------------------------------------------------------------

#[test]
fn mail_test_vectors() {
    let c = client();
    let mail = c.mail();
    for case in load(include_str!("../../test-vectors/mail.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["operation"].as_str().unwrap();
        let req = match op {
            "send" => mail.build_send(&input::<MailDraft>(&case, "draft")).unwrap(),
            "save_draft" => mail.build_save_draft(&input::<MailDraft>(&case, "draft")).unwrap(),
            "send_draft" => mail.build_send_draft(id(&case)),
            "list" => mail.build_list(user_id(&case), case["input"]["folder"].as_str().unwrap()),
            "search" => {
                let raw = &case["input"];
                let mut query = SearchQuery::new(raw["keyword"].as_str().unwrap());
                if let Some(folder) = raw["folder"].as_str() {
                    query = query.folder(folder);
                }
                if let Some(account) = raw["accountId"].as_i64() {
                    query = query.account(account);
                }
                if let (Some(page), Some(size)) = (raw["page"].as_u64(), raw["size"].as_u64()) {
                    query = query.page(page as u32, size as u32);
                }
                mail.build_search(&query)
            }
            "get" => mail.build_get(id(&case)),
            "mark_as_read" => mail.build_mark_as_read(id(&case)),
            "toggle_star" => mail.build_toggle_star(id(&case)),
            "delete" => mail.build_delete(id(&case)),
            "batch_delete" => mail.build_batch_delete(&ids(&case)).unwrap(),
            "delete_permanently" => mail.build_delete_permanently(&ids(&case)).unwrap(),
            "restore" => mail.build_restore(&ids(&case)).unwrap(),
            "stats" => mail.build_stats(user_id(&case)),
            other => panic!("{name}: unknown operation {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        match op {
            "send" | "save_draft" | "send_draft" => check_result::<Mail>(name, &case, mail.parse_mail(response)),
            "list" | "search" => check_result::<Vec<Mail>>(name, &case, mail.parse_mails(response)),
            "get" => check_result::<MailDetail>(name, &case, mail.parse_detail(response)),
            "stats" => check_result::<MailStats>(name, &case, mail.parse_stats(response)),
            _ => check_result::<()>(name, &case, mail.parse_ack(response)),
        }
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[test]
fn contact_test_vectors() {
    let c = client();
    let contacts = c.contacts();
    for case in load(include_str!("../../test-vectors/contacts.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["operation"].as_str().unwrap();
        let req = match op {
            "search" => contacts.build_search(user_id(&case), case["input"]["keyword"].as_str().unwrap()),
            "list" => contacts.build_list(user_id(&case)),
            "create" => contacts.build_create(&input::<Contact>(&case, "contact")).unwrap(),
            "update" => contacts.build_update(id(&case), &input::<Contact>(&case, "contact")).unwrap(),
            "delete" => contacts.build_delete(id(&case)),
            other => panic!("{name}: unknown operation {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        match op {
            "search" | "list" => check_result::<Vec<Contact>>(name, &case, contacts.parse_contacts(response)),
            "create" | "update" => check_result::<Contact>(name, &case, contacts.parse_contact(response)),
            _ => check_result::<()>(name, &case, contacts.parse_delete(response)),
        }
    }
}

// ---------------------------------------------------------------------------
// Mail accounts
// ---------------------------------------------------------------------------

#[test]
fn account_test_vectors() {
    let c = client();
    let accounts = c.accounts();
    for case in load(include_str!("../../test-vectors/accounts.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["operation"].as_str().unwrap();
        let req = match op {
            "list_by_user" => accounts.build_list_by_user(user_id(&case)),
            "create" => accounts.build_create(&input::<MailAccount>(&case, "account")).unwrap(),
            "update" => accounts.build_update(id(&case), &input::<MailAccount>(&case, "account")).unwrap(),
            "delete" => accounts.build_delete(id(&case)),
            other => panic!("{name}: unknown operation {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        match op {
            "list_by_user" => check_result::<Vec<MailAccount>>(name, &case, accounts.parse_accounts(response)),
            "create" | "update" => check_result::<MailAccount>(name, &case, accounts.parse_account(response)),
            _ => check_result::<()>(name, &case, accounts.parse_delete(response)),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[test]
fn auth_test_vectors() {
    let c = client();
    let auth = c.auth();
    for case in load(include_str!("../../test-vectors/auth.json")) {
        let name = case["name"].as_str().unwrap();
        match case["operation"].as_str().unwrap() {
            "login" => {
                let req = auth.build_login(&input::<LoginRequest>(&case, "credentials")).unwrap();
                check_request(name, &req, &case["expected_request"]);
                check_result::<LoginResponse>(name, &case, auth.parse_login(simulated(&case)));
            }
            "register" => {
                let req = auth.build_register(&input::<RegisterRequest>(&case, "registration")).unwrap();
                check_request(name, &req, &case["expected_request"]);
                check_result::<RegisterResponse>(name, &case, auth.parse_register(simulated(&case)));
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[test]
fn attachment_test_vectors() {
    let c = client();
    let attachments = c.attachments();
    for case in load(include_str!("../../test-vectors/attachments.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["operation"].as_str().unwrap();
        let req = match op {
            "get" => attachments.build_get(id(&case)),
            "list_by_mail" => attachments.build_list_by_mail(id(&case)),
            "download" => attachments.build_download(id(&case)),
            "delete" => attachments.build_delete(id(&case)),
            other => panic!("{name}: unknown operation {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        match op {
            "get" => check_result::<Attachment>(name, &case, attachments.parse_attachment(response)),
            "list_by_mail" => check_result::<Vec<Attachment>>(name, &case, attachments.parse_attachments(response)),
            "download" => {
                let download = attachments.parse_download(response).unwrap();
                let expected = &case["expected_result"];
                assert_eq!(download.file_name.as_deref(), expected["fileName"].as_str(), "{name}: file name");
                assert_eq!(download.content_type.as_deref(), expected["contentType"].as_str(), "{name}: content type");
                assert_eq!(download.bytes, expected["body"].as_str().unwrap().as_bytes(), "{name}: bytes");
            }
            _ => check_result::<()>(name, &case, attachments.parse_delete(response)),
        }
    }
}
