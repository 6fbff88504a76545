#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use notekeeper::configuration::NoteAccessPolicy;
use notekeeper::models::note::{NewNote, NoteChanges, NoteModel};
use notekeeper::models::user::{NewUser, UserModel};
use notekeeper::services::token::TokenService;
use notekeeper::startup::{AppState, build_router};
use notekeeper::store::{NoteStore, UserStore};
use notekeeper::telemetry::{get_subscriber, init_subscriber};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

// Set TEST_LOG=1 to see the logs of a failing test.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserModel>>,
}

impl InMemoryUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn by_email(&self, email: &str) -> Vec<UserModel> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.email == email)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>> {
        Ok(self.by_email(email).into_iter().next())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserModel>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(UserModel {
            id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            username: user.email.clone(),
            password_hash: user.password_hash.clone(),
            token: None,
            created_at: user.created_at,
        });
        Ok(id)
    }

    async fn set_token(&self, id: Uuid, token: &str) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(user) = rows.iter_mut().find(|u| u.id == id) {
            user.token = Some(token.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotes {
    rows: Mutex<Vec<NoteModel>>,
    broken: AtomicBool,
    panicking: AtomicBool,
}

impl InMemoryNotes {
    /// Makes every later call fail the way a lost database connection would.
    pub fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Makes the next listing panic inside the handler.
    pub fn panic_on_list(&self) {
        self.panicking.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: Uuid) -> Option<NoteModel> {
        self.rows.lock().unwrap().iter().find(|n| n.id == id).cloned()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused (os error 111) at 10.0.0.5:5432");
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for InMemoryNotes {
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<NoteModel>> {
        if self.panicking.load(Ordering::SeqCst) {
            panic!("note store blew up");
        }
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|n| n.user_id == user_id).cloned().collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<NoteModel>> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn create(&self, note: &NewNote) -> anyhow::Result<Uuid> {
        self.check()?;
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(NoteModel {
            id,
            title: note.title.clone(),
            content: note.content.clone(),
            user_id: note.user_id,
            created_at: note.created_at,
            updated_at: None,
        });
        Ok(id)
    }

    async fn update(&self, id: Uuid, changes: &NoteChanges) -> anyhow::Result<()> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(note) = rows.iter_mut().find(|n| n.id == id) {
            if let Some(title) = &changes.title {
                note.title = title.clone();
            }
            if let Some(content) = &changes.content {
                note.content = content.clone();
            }
            note.updated_at = Some(changes.updated_at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        self.rows.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub notes: Arc<InMemoryNotes>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_policy(NoteAccessPolicy::Shared)
    }

    pub fn with_policy(note_access: NoteAccessPolicy) -> Self {
        Self::with_stores(
            Arc::new(InMemoryUsers::default()),
            Arc::new(InMemoryNotes::default()),
            note_access,
        )
    }

    pub fn with_stores(
        users: Arc<InMemoryUsers>,
        notes: Arc<InMemoryNotes>,
        note_access: NoteAccessPolicy,
    ) -> Self {
        LazyLock::force(&TRACING);

        let tokens = TokenService::new(&SecretString::from(TEST_SECRET.to_string()));
        let state = AppState::new(users.clone(), notes.clone(), tokens, note_access);
        Self {
            router: build_router(state),
            users,
            notes,
        }
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = self.raw(request).await;
        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/signup",
            None,
            Some(serde_json::json!({
                "firstname": "Test",
                "lastname": "User",
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs up a fresh user and returns `(user_id, token)`.
    pub async fn register(&self, email: &str) -> (Uuid, String) {
        let response = self.signup(email, "correct horse battery staple").await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        let data = &response.body["data"];
        let user_id = Uuid::parse_str(data["userId"].as_str().unwrap()).unwrap();
        (user_id, data["token"].as_str().unwrap().to_string())
    }

    pub async fn create_note(&self, token: &str, title: &str, content: &str) -> Uuid {
        let response = self
            .send(
                "POST",
                "/notes",
                Some(token),
                Some(serde_json::json!({ "title": title, "content": content })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        Uuid::parse_str(response.body["data"]["id"].as_str().unwrap()).unwrap()
    }
}
