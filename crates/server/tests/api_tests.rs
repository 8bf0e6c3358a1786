use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use bytes::Bytes;
use secrecy::SecretString;
use tower::ServiceExt;

use guides_blob::{BlobError, ObjectStore, StoredObject};
use guides_blob_memory::MemoryObjectStore;
use guides_core::{FormState, Guide, GuideForm, GuideUpdate, ImageField, Step};
use guides_editor::{EditorServices, FlashMessage};
use guides_server::api::AppState;
use guides_server::auth::SessionManager;
use guides_server::config::AuthConfig;
use guides_store::{GuideStore, StoreError};
use guides_store_memory::MemoryGuideStore;

const BASE_URL: &str = "https://cdn.example.com/guides";
const BOUNDARY: &str = "guides-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

// -- Mock store -----------------------------------------------------------

/// Reads succeed; every update fails.
struct FailingUpdateStore {
    inner: MemoryGuideStore,
}

#[async_trait]
impl GuideStore for FailingUpdateStore {
    async fn fetch(&self, id: &str) -> Result<Guide, StoreError> {
        self.inner.fetch(id).await
    }

    async fn update(&self, _id: &str, _update: &GuideUpdate) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }
}

/// Stores the cover; every step upload fails.
struct FailingStepObjects {
    inner: MemoryObjectStore,
}

#[async_trait]
impl ObjectStore for FailingStepObjects {
    fn public_url(&self, key: &str) -> Result<String, BlobError> {
        self.inner.public_url(key)
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BlobError> {
        if key.starts_with("step-") {
            return Err(BlobError::Storage("bucket unavailable".into()));
        }
        self.inner.upload(key, content_type, data).await
    }
}

// -- Helpers --------------------------------------------------------------

fn seeded_guide() -> Guide {
    Guide {
        id: "g-1".into(),
        user_id: "alice".into(),
        title: "Bread".into(),
        description: "How to bake bread".into(),
        image: "alice_cover.png".into(),
        steps: vec![
            Step::new("Mix", "Mix flour and water", "step-1_a.png"),
            Step::new("Bake", "Bake for 40 minutes", ""),
        ],
    }
}

fn sessions() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        &SecretString::new("test-secret".to_owned()),
        &AuthConfig::default(),
    ))
}

struct TestApp {
    state: AppState,
    guides: Arc<MemoryGuideStore>,
    objects: Arc<MemoryObjectStore>,
}

fn build_test_app() -> TestApp {
    let guides = Arc::new(MemoryGuideStore::with_guides([seeded_guide()]));
    let objects = Arc::new(MemoryObjectStore::new(BASE_URL));
    let state = AppState {
        services: EditorServices::new(guides.clone(), objects.clone()),
        sessions: sessions(),
        max_body_bytes: 1024 * 1024,
    };
    TestApp {
        state,
        guides,
        objects,
    }
}

fn session_cookie(state: &AppState) -> String {
    format!("session={}", state.sessions.issue("bob").unwrap())
}

fn build_app(state: AppState) -> axum::Router {
    guides_server::api::router(state)
}

enum Part {
    Text(&'static str, &'static str),
    File(&'static str, &'static str, &'static str, &'static [u8]),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, content_type, data) => {
                let disposition =
                    format!("form-data; name=\"{name}\"; filename=\"{file_name}\"");
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: {disposition}\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn valid_parts() -> Vec<Part> {
    vec![
        Part::Text("title", "Sourdough"),
        Part::Text("description", "A slower bread"),
        Part::File("image", "cover.png", "image/png", PNG),
        Part::Text("steps[0].name", "Feed starter"),
        Part::Text("steps[0].description", "Feed it the night before"),
        Part::Text(
            "steps[0].imageUrl",
            "https://cdn.example.com/guides/step-1_a.png",
        ),
        Part::Text("steps[1].name", "Bake"),
        Part::Text("steps[1].description", "Bake for 45 minutes"),
        Part::File("steps[1].image", "", "application/octet-stream", b""),
    ]
}

fn get_edit(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_edit(uri: &str, cookie: Option<&str>, parts: &[Part]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn set_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(http::header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_owned())
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = build_app(build_test_app().state);

    let response = app.oneshot(get_edit("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn edit_page_without_session_redirects_to_signin() {
    let app = build_app(build_test_app().state);

    let response = app
        .oneshot(get_edit("/guides/g-1/edit?tab=steps", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[http::header::LOCATION],
        "/signin?redirectTo=%2Fguides%2Fg-1%2Fedit%3Ftab%3Dsteps"
    );
}

#[tokio::test]
async fn token_signed_with_another_secret_redirects() {
    let app = build_app(build_test_app().state);
    let other = SessionManager::new(
        &SecretString::new("other-secret".to_owned()),
        &AuthConfig::default(),
    );
    let cookie = format!("session={}", other.issue("bob").unwrap());

    let response = app
        .oneshot(get_edit("/guides/g-1/edit", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn edit_page_returns_urls_and_prefilled_form() {
    let test = build_test_app();
    let cookie = session_cookie(&test.state);
    let app = build_app(test.state);

    let response = app
        .oneshot(get_edit("/guides/g-1/edit", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["guide"]["imageUrl"],
        "https://cdn.example.com/guides/alice_cover.png"
    );
    assert_eq!(
        json["guide"]["steps"][0]["imageUrl"],
        "https://cdn.example.com/guides/step-1_a.png"
    );
    assert!(json["guide"]["steps"][1]["imageUrl"].is_null());
    assert!(json["guide"].get("image").is_none());
    assert_eq!(json["updateForm"]["id"], "update-guide");
    assert_eq!(json["updateForm"]["valid"], true);
    assert_eq!(json["updateForm"]["data"]["title"], "Bread");
    assert!(json["flash"].is_null());
}

#[tokio::test]
async fn missing_guide_returns_500_with_flash() {
    let test = build_test_app();
    let cookie = session_cookie(&test.state);
    let app = build_app(test.state);

    let response = app
        .oneshot(get_edit("/guides/nope/edit", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let flash = set_cookie(&response).expect("flash cookie");
    assert!(flash.starts_with("flash="));
    let json = json_body(response).await;
    assert_eq!(
        json["error"],
        "Error fetching guide, please try again later."
    );
}

#[tokio::test]
async fn pending_flash_is_shown_once() {
    let test = build_test_app();
    let flash = guides_server::flash::flash_cookie(&FlashMessage::error("Upload failed")).unwrap();
    let flash_pair = flash.to_str().unwrap().split(';').next().unwrap().to_owned();
    let cookie = format!("{}; {flash_pair}", session_cookie(&test.state));
    let app = build_app(test.state);

    let response = app
        .oneshot(get_edit("/guides/g-1/edit", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookie(&response).expect("clearing cookie");
    assert!(cleared.starts_with("flash=;"));
    assert!(cleared.contains("Max-Age=0"));
    let json = json_body(response).await;
    assert_eq!(json["flash"]["type"], "error");
    assert_eq!(json["flash"]["message"], "Upload failed");
}

#[tokio::test]
async fn valid_submission_redirects_to_guide() {
    let test = build_test_app();
    let cookie = session_cookie(&test.state);
    let app = build_app(test.state);

    let response = app
        .oneshot(post_edit("/guides/g-1/edit", Some(&cookie), &valid_parts()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[http::header::LOCATION], "/guides/g-1");

    assert_eq!(test.objects.len(), 1);
    let saved = test.guides.fetch("g-1").await.unwrap();
    assert_eq!(saved.user_id, "bob");
    assert_eq!(saved.title, "Sourdough");
    assert!(saved.image.starts_with("bob_"));
    assert_eq!(test.objects.keys(), vec![saved.image.clone()]);
    assert_eq!(saved.steps[0].image, "step-1_a.png");
    assert!(saved.steps[1].image.is_empty());
}

#[tokio::test]
async fn invalid_submission_returns_400_with_errors() {
    let test = build_test_app();
    let cookie = session_cookie(&test.state);
    let app = build_app(test.state);

    let parts = vec![
        Part::Text("title", ""),
        Part::Text("description", "A slower bread"),
        Part::File("image", "cover.png", "image/png", PNG),
        Part::Text("steps[0].name", "Feed starter"),
    ];
    let response = app
        .oneshot(post_edit("/guides/g-1/edit", Some(&cookie), &parts))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["form"]["valid"], false);
    assert!(json["form"]["errors"]["title"].is_array());
    assert!(json["form"]["errors"]["steps[0].description"].is_array());
    assert_eq!(json["form"]["data"]["image"]["kind"], "none");

    assert!(test.objects.is_empty());
    assert_eq!(test.guides.fetch("g-1").await.unwrap().title, "Bread");
}

#[tokio::test]
async fn store_failure_returns_resubmittable_form() {
    let objects = Arc::new(MemoryObjectStore::new(BASE_URL));
    let guides = Arc::new(FailingUpdateStore {
        inner: MemoryGuideStore::with_guides([seeded_guide()]),
    });
    let state = AppState {
        services: EditorServices::new(guides, objects),
        sessions: sessions(),
        max_body_bytes: 1024 * 1024,
    };
    let cookie = session_cookie(&state);
    let app = build_app(state);

    let response = app
        .oneshot(post_edit("/guides/g-1/edit", Some(&cookie), &valid_parts()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookie(&response).unwrap().starts_with("flash="));
    let json = json_body(response).await;
    assert_eq!(json["message"], "backend error: connection reset");

    let form: FormState<GuideForm> = serde_json::from_value(json["form"].clone()).unwrap();
    let ImageField::Upload(file) = &form.data.image else {
        panic!("expected the cover file back, got {:?}", form.data.image);
    };
    assert_eq!(file.file_name, "cover.png");
    assert_eq!(&file.data[..], PNG);
    assert_eq!(form.data.steps.len(), 2);
}

#[tokio::test]
async fn step_upload_failure_returns_500_without_saving() {
    let guides = Arc::new(MemoryGuideStore::with_guides([seeded_guide()]));
    let objects = Arc::new(FailingStepObjects {
        inner: MemoryObjectStore::new(BASE_URL),
    });
    let state = AppState {
        services: EditorServices::new(guides.clone(), objects),
        sessions: sessions(),
        max_body_bytes: 1024 * 1024,
    };
    let cookie = session_cookie(&state);
    let app = build_app(state);

    let mut parts = valid_parts();
    parts.pop();
    parts.push(Part::File("steps[1].image", "crust.png", "image/png", PNG));
    let response = app
        .oneshot(post_edit("/guides/g-1/edit", Some(&cookie), &parts))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookie(&response).unwrap().starts_with("flash="));
    let json = json_body(response).await;
    assert_eq!(json["message"], "object storage error: bucket unavailable");

    let form: FormState<GuideForm> = serde_json::from_value(json["form"].clone()).unwrap();
    let ImageField::Upload(file) = &form.data.steps[1].image else {
        panic!("expected the step file back, got {:?}", form.data.steps[1].image);
    };
    assert_eq!(file.file_name, "crust.png");
    assert_eq!(&file.data[..], PNG);

    let saved = guides.fetch("g-1").await.unwrap();
    assert_eq!(saved.title, "Bread");
    assert_eq!(saved.user_id, "alice");
}

#[tokio::test]
async fn submission_without_session_redirects() {
    let test = build_test_app();
    let app = build_app(test.state);

    let response = app
        .oneshot(post_edit("/guides/g-1/edit", None, &valid_parts()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(test.objects.is_empty());
    assert_eq!(test.guides.fetch("g-1").await.unwrap().user_id, "alice");
}
