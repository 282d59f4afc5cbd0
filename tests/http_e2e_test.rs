use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rusty_library_lending::adapters::memory::InMemoryLibrary;
use rusty_library_lending::api::handlers::AppState;
use rusty_library_lending::api::router::create_router;
use rusty_library_lending::api::types::*;
use rusty_library_lending::application::LendingSettings;
use rusty_library_lending::auth::TokenIssuer;
use rusty_library_lending::domain::{Book, BookId, Role, User};
use rusty_library_lending::ports::CatalogStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{author, book_with_stock, memory_deps, reader};

const SECRET: &str = "e2e-secret";

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

struct TestApp {
    router: axum::Router,
    library: Arc<InMemoryLibrary>,
    issuer: TokenIssuer,
}

impl TestApp {
    fn new() -> Self {
        let library = Arc::new(InMemoryLibrary::new());
        let issuer = TokenIssuer::new(SECRET.to_string(), 3600);
        let state = Arc::new(AppState {
            service_deps: memory_deps(library.clone(), LendingSettings::default()),
            token_issuer: issuer.clone(),
        });

        Self {
            router: create_router(state),
            library,
            issuer,
        }
    }

    fn token_for(&self, user: &User) -> String {
        self.issuer.issue(user.id, user.role).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec(), headers)
    }

    async fn book(&self, book_id: BookId) -> Book {
        CatalogStore::find_by_id(self.library.as_ref(), book_id)
            .await
            .unwrap()
            .unwrap()
    }
}

fn json_post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn error_code(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body).unwrap().code
}

async fn app_with_reader_and_book(stock: u32) -> (TestApp, User, Book) {
    let app = TestApp::new();
    let writer = author("Ursula");
    let user = reader("Ada");
    let book = book_with_stock(writer.id, "The Dispossessed", stock);
    app.library.seed_user(writer).await;
    app.library.seed_user(user.clone()).await;
    app.library.seed_book(book.clone()).await;
    (app, user, book)
}

// ============================================================================
// 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body, _) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_full_flow_signup_login_publish_list_borrow_return() {
    let app = TestApp::new();

    // Step 1: 著者と読者の会員登録
    for (name, email, role) in [
        ("Ursula", "ursula@example.com", "Author"),
        ("Ada", "ada@example.com", "Reader"),
    ] {
        let (status, body, _) = app
            .send(json_post(
                "/users/signup",
                None,
                json!({ "name": name, "email": email, "password": "pw", "role": role }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, b"User registered successfully");
    }

    // Step 2: ログイン（ボディとヘッダーの両方でトークンを受け取る）
    let (status, body, headers) = app
        .send(json_post(
            "/users/login",
            None,
            json!({ "email": "ursula@example.com", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let author_token = serde_json::from_slice::<LoginResponse>(&body).unwrap().token;
    assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), author_token.as_str());

    let (_, body, _) = app
        .send(json_post(
            "/users/login",
            None,
            json!({ "email": "ada@example.com", "password": "pw" }),
        ))
        .await;
    let reader_token = serde_json::from_slice::<LoginResponse>(&body).unwrap().token;

    // Step 3: 書籍の追加
    let (status, body, _) = app
        .send(json_post(
            "/books/create",
            Some(&author_token),
            json!({ "title": "The Dispossessed", "genre": "SF", "stock": 1 }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, b"Book added successfully");

    // Step 4: 一覧から書籍IDを取得
    let request = Request::builder()
        .uri("/books?author=ursula")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let books: Vec<BookResponse> = serde_json::from_slice(&body).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].author_name.as_deref(), Some("Ursula"));
    let book_id = books[0].id;

    // Step 5: 貸出（Bearer接頭辞つき）
    let bearer = format!("Bearer {}", reader_token);
    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&bearer),
            json!({ "bookId": book_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Book borrowed successfully");
    assert_eq!(app.book(BookId::from_uuid(book_id)).await.stock.value(), 0);

    // Step 6: 在庫切れ
    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&reader_token),
            json!({ "bookId": book_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "UNAVAILABLE");

    // Step 7: 返却
    let (status, body, _) = app
        .send(json_post(
            "/reader/books/return",
            Some(&reader_token),
            json!({ "bookId": book_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Book returned successfully");

    let book = app.book(BookId::from_uuid(book_id)).await;
    assert_eq!(book.stock.value(), 1);
    assert!(book.borrowed_by.is_empty());
}

// ============================================================================
// 認証エラー
// ============================================================================

#[tokio::test]
async fn test_borrow_without_token_is_unauthorized() {
    let (app, _, book) = app_with_reader_and_book(1).await;

    let (status, body, _) = app
        .send(json_post("/reader/books/borrow", None, json!({ "bookId": book.id })))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "MISSING_CREDENTIAL");
}

#[tokio::test]
async fn test_borrow_with_forged_token_is_bad_request() {
    let (app, user, book) = app_with_reader_and_book(1).await;
    let forged = TokenIssuer::new("other-secret".to_string(), 3600)
        .issue(user.id, Role::Reader)
        .unwrap();

    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&forged),
            json!({ "bookId": book.id }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_CREDENTIAL");
    assert_eq!(app.book(book.id).await.stock.value(), 1);
}

// ============================================================================
// 貸出エラー
// ============================================================================

#[tokio::test]
async fn test_author_cannot_borrow() {
    let (app, _, book) = app_with_reader_and_book(1).await;
    let writer = author("Octavia");
    app.library.seed_user(writer.clone()).await;

    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&app.token_for(&writer)),
            json!({ "bookId": book.id }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_malformed_and_missing_book_ids_are_bad_requests() {
    let (app, user, _) = app_with_reader_and_book(1).await;
    let token = app.token_for(&user);

    let (status, body, _) = app
        .send(json_post(
            "/reader/books/return",
            Some(&token),
            json!({ "bookId": "not-an-id" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_ARGUMENT");

    let (status, body, _) = app
        .send(json_post("/reader/books/borrow", Some(&token), json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_ARGUMENT");

    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&token),
            json!({ "bookId": BookId::new() }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_non_string_book_ids_are_invalid_arguments() {
    let (app, user, book) = app_with_reader_and_book(1).await;
    let token = app.token_for(&user);

    for body in [json!({ "bookId": 123 }), json!({ "bookId": null }), json!([])] {
        let (status, response, _) = app
            .send(json_post("/reader/books/borrow", Some(&token), body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(error_code(&response), "INVALID_ARGUMENT", "body: {}", body);
    }

    assert_eq!(app.book(book.id).await.stock.value(), 1);
}

#[tokio::test]
async fn test_book_id_body_without_content_type_is_invalid_argument() {
    let (app, user, book) = app_with_reader_and_book(1).await;

    let request = Request::builder()
        .method("POST")
        .uri("/reader/books/return")
        .header(header::AUTHORIZATION, app.token_for(&user))
        .body(Body::from(json!({ "bookId": book.id }).to_string()))
        .unwrap();
    let (status, body, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "INVALID_ARGUMENT");
    assert_eq!(app.book(book.id).await.stock.value(), 1);
}

#[tokio::test]
async fn test_author_with_unreadable_body_is_still_forbidden() {
    let (app, _, _) = app_with_reader_and_book(1).await;
    let writer = author("Octavia");
    app.library.seed_user(writer.clone()).await;

    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&app.token_for(&writer)),
            json!({ "bookId": 42 }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_signup_with_malformed_body_returns_structured_error() {
    let app = TestApp::new();

    let (status, body, _) = app
        .send(json_post("/users/signup", None, json!({ "name": 7 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_BODY");

    let request = Request::builder()
        .method("POST")
        .uri("/users/login")
        .body(Body::from("email=ada@example.com"))
        .unwrap();
    let (status, body, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_BODY");
}

#[tokio::test]
async fn test_sixth_borrow_hits_limit() {
    let (app, user, _) = app_with_reader_and_book(1).await;
    let token = app.token_for(&user);
    let writer = author("Octavia");
    app.library.seed_user(writer.clone()).await;

    for i in 0..5 {
        let book = book_with_stock(writer.id, &format!("Volume {}", i), 1);
        app.library.seed_book(book.clone()).await;
        let (status, _, _) = app
            .send(json_post(
                "/reader/books/borrow",
                Some(&token),
                json!({ "bookId": book.id }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let sixth = book_with_stock(writer.id, "Volume 6", 10);
    app.library.seed_book(sixth.clone()).await;
    let (status, body, _) = app
        .send(json_post(
            "/reader/books/borrow",
            Some(&token),
            json!({ "bookId": sixth.id }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "LIMIT_EXCEEDED");
    assert_eq!(app.book(sixth.id).await.stock.value(), 10);
}

#[tokio::test]
async fn test_reader_cannot_create_book() {
    let (app, user, _) = app_with_reader_and_book(1).await;

    let (status, body, _) = app
        .send(json_post(
            "/books/create",
            Some(&app.token_for(&user)),
            json!({ "title": "Notes", "genre": "Essay", "stock": 1 }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_login_with_unknown_email_is_bad_request() {
    let app = TestApp::new();

    let (status, body, _) = app
        .send(json_post(
            "/users/login",
            None,
            json!({ "email": "nobody@example.com", "password": "pw" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "EMAIL_NOT_FOUND");
    assert_eq!(error.message, "Email not found");
}
