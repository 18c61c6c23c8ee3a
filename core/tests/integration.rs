//! End-to-end run against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every resource
//! through `MailClient` with the real ureq transport and a file-backed
//! session. Validates request building, bearer handling and response
//! parsing against the actual server.

use std::sync::{Arc, Mutex};

use campusmail_core::{
    ApiClient, ApiError, Contact, FileSessionStore, LoginRequest, MailAccount, MailClient, MailDraft,
    MemorySessionStore, RegisterRequest, SearchQuery, SessionStore, UploadFile, UreqTransport,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

fn client(base_url: &str, session: Arc<dyn SessionStore>) -> MailClient<UreqTransport> {
    MailClient::new(ApiClient::new(base_url), UreqTransport::default(), session)
}

fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: "pw".to_string(),
        email: format!("{username}@campus.mail"),
        phone: None,
    }
}

fn credentials(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: "pw".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle() {
    let base_url = start_server();
    let session_dir = tempfile::tempdir().unwrap();
    let alice_session = Arc::new(FileSessionStore::new(session_dir.path()));
    let alice = client(&base_url, alice_session.clone());
    let bob = client(&base_url, Arc::new(MemorySessionStore::new()));

    // Step 1: register both users; duplicates are refused.
    let registered = alice.auth().register(&registration("alice")).await.unwrap();
    assert!(registered.success);
    let bob_id = bob.auth().register(&registration("bob")).await.unwrap().user_id;
    let err = alice.auth().register(&registration("alice")).await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 409, .. }), "{err:?}");

    // Step 2: nothing works before login.
    let err = alice.mail().list(registered.user_id, "inbox").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 401, .. }), "{err:?}");

    // Step 3: login persists the token on disk.
    let login = alice.auth().login(&credentials("alice")).await.unwrap();
    let alice_id = login.user_id;
    assert_eq!(alice_id, registered.user_id);
    assert!(alice_session.path().exists());
    assert_eq!(alice_session.token().unwrap(), Some(login.token.clone()));
    bob.auth().login(&credentials("bob")).await.unwrap();

    // Step 4: upload an attachment with progress, then send it to bob.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let file = UploadFile::new("notes v1.txt", "text/plain", b"bring a pencil".to_vec());
    let attachment = alice
        .attachments()
        .upload(&file, None, Some(move |p: u8| sink.lock().unwrap().push(p)))
        .await
        .unwrap();
    assert_eq!(attachment.file_name, "notes v1.txt");
    assert_eq!(attachment.file_size, 14);
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");

    let sent = alice
        .mail()
        .send(&MailDraft {
            to_address: Some("bob@campus.mail".to_string()),
            subject: Some("Exam tomorrow".to_string()),
            content: Some("<p>Room 101</p>".to_string()),
            attachment_ids: vec![attachment.id],
            ..MailDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(sent.folder, "sent");
    assert!(sent.has_attachment);

    // Step 5: the sent mail carries its attachment; the download round-trips.
    let detail = alice.mail().get(sent.id).await.unwrap();
    assert_eq!(detail.attachments.len(), 1);
    let download = alice.attachments().download(attachment.id).await.unwrap();
    assert_eq!(download.file_name.as_deref(), Some("notes v1.txt"));
    assert_eq!(download.bytes, b"bring a pencil");
    let linked = alice.attachments().list_by_mail(sent.id).await.unwrap();
    assert_eq!(linked[0].id, attachment.id);

    // Step 6: bob receives an unread copy.
    let stats = bob.mail().stats(bob_id).await.unwrap();
    assert_eq!(stats.unread_count, 1);
    let inbox = bob.mail().list(bob_id, "inbox").await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].subject.as_deref(), Some("Exam tomorrow"));
    bob.mail().mark_as_read(inbox[0].id).await.unwrap();
    assert_eq!(bob.mail().stats(bob_id).await.unwrap().unread_count, 0);

    // Step 7: search finds the mail with and without an account filter.
    let found = alice.mail().search(&SearchQuery::new("exam")).await.unwrap();
    assert_eq!(found.len(), 1);
    let account_id = sent.account_id.unwrap();
    let found = alice
        .mail()
        .search(&SearchQuery::new("exam").folder("sent").account(account_id).page(0, 10))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let found = alice.mail().search(&SearchQuery::new("exam").folder("drafts")).await.unwrap();
    assert!(found.is_empty());

    // Step 8: drafts.
    let draft = alice
        .mail()
        .save_draft(&MailDraft {
            subject: Some("Notes".to_string()),
            ..MailDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(alice.mail().stats(alice_id).await.unwrap().drafts_count, 1);
    let draft = alice
        .mail()
        .save_draft(&MailDraft {
            id: Some(draft.id),
            to_address: Some("outside@example.org".to_string()),
            subject: Some("Notes".to_string()),
            ..MailDraft::default()
        })
        .await
        .unwrap();
    let delivered = alice.mail().send_draft(draft.id).await.unwrap();
    assert_eq!(delivered.folder, "sent");
    assert_eq!(alice.mail().stats(alice_id).await.unwrap().drafts_count, 0);

    // Step 9: star, trash, restore, purge.
    alice.mail().toggle_star(sent.id).await.unwrap();
    assert_eq!(alice.mail().list(alice_id, "starred").await.unwrap().len(), 1);
    alice.mail().delete(sent.id).await.unwrap();
    assert_eq!(alice.mail().list(alice_id, "trash").await.unwrap().len(), 1);
    alice.mail().restore(&[sent.id]).await.unwrap();
    assert!(alice.mail().list(alice_id, "trash").await.unwrap().is_empty());
    alice.mail().batch_delete(&[sent.id, delivered.id]).await.unwrap();
    assert_eq!(alice.mail().list(alice_id, "trash").await.unwrap().len(), 2);
    alice.mail().delete_permanently(&[sent.id]).await.unwrap();
    let err = alice.mail().get(sent.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");
    let err = alice.attachments().get(attachment.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");

    // Step 10: contacts.
    let contact = alice
        .contacts()
        .create(&Contact::new("Bob", "bob@campus.mail"))
        .await
        .unwrap();
    let contact_id = contact.id.unwrap();
    let hits = alice.contacts().search(alice_id, "BOB").await.unwrap();
    assert_eq!(hits.len(), 1);
    let mut renamed = contact.clone();
    renamed.contact_name = "Robert".to_string();
    let updated = alice.contacts().update(contact_id, &renamed).await.unwrap();
    assert_eq!(updated.contact_name, "Robert");
    alice.contacts().delete(contact_id).await.unwrap();
    assert!(alice.contacts().list(alice_id).await.unwrap().is_empty());

    // Step 11: mail accounts.
    let accounts = alice.accounts().list_by_user(alice_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].is_default);
    let mut club = MailAccount::new("club@campus.mail");
    club.display_name = Some("Chess Club".to_string());
    let club = alice.accounts().create(&club).await.unwrap();
    assert!(!club.is_default);
    let mut promoted = club.clone();
    promoted.is_default = true;
    alice.accounts().update(club.id.unwrap(), &promoted).await.unwrap();
    let accounts = alice.accounts().list_by_user(alice_id).await.unwrap();
    assert_eq!(accounts.iter().filter(|a| a.is_default).count(), 1);
    alice.accounts().delete(club.id.unwrap()).await.unwrap();

    // Step 12: another user's mailbox is off limits.
    let err = bob.mail().list(alice_id, "").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 403, .. }), "{err:?}");

    // Step 13: logout drops the credential.
    alice.logout().unwrap();
    assert!(!alice_session.path().exists());
    assert!(!alice_session.has_credential());
    let err = alice.mail().stats(alice_id).await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 401, .. }), "{err:?}");
}
