use crate::application::{ServiceDependencies, accounts, catalog, lending};
use crate::auth::TokenIssuer;
use crate::domain::commands::{BorrowBook, PublishBook, RegisterUser, ReturnBook};
use crate::ports::BookFilter;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    auth::AuthenticatedCaller,
    error::ApiError,
    types::{
        BookIdRequest, BookResponse, CreateBookRequest, ListBooksQuery, LoginRequest,
        LoginResponse, SignupRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub token_issuer: TokenIssuer,
}

// ============================================================================
// Lending handlers
// ============================================================================

/// POST /reader/books/borrow - 書籍を借りる
///
/// 強制されるビジネスルール:
/// - 呼び出し元がReaderであること
/// - 書籍IDが正しい形式で、書籍が存在すること
/// - 在庫が1冊以上あること
/// - 貸出中の冊数が上限（5冊）未満であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    payload: Result<Json<BookIdRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let cmd = BorrowBook {
        caller_id: caller.user_id,
        caller_role: caller.role,
        book_id: raw_book_id(payload),
        requested_at: chrono::Utc::now(),
    };

    lending::borrow_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, "Book borrowed successfully"))
}

/// POST /reader/books/return - 書籍を返す
///
/// 強制されるビジネスルール:
/// - 呼び出し元がReaderであること
/// - 書籍IDが正しい形式で、書籍が存在すること
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    payload: Result<Json<BookIdRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let cmd = ReturnBook {
        caller_id: caller.user_id,
        caller_role: caller.role,
        book_id: raw_book_id(payload),
        requested_at: chrono::Utc::now(),
    };

    lending::return_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, "Book returned successfully"))
}

/// 読み取れないボディは空のIDとして扱う
///
/// 役割の判定を先に行うため、ここではエラーにせずアプリケーション層に任せる。
fn raw_book_id(payload: Result<Json<BookIdRequest>, JsonRejection>) -> String {
    match payload {
        Ok(Json(req)) => req.into_raw_id(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable book id body");
            String::new()
        }
    }
}

// ============================================================================
// Catalog handlers
// ============================================================================

/// POST /books/create - 書籍をカタログに追加（Authorのみ）
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Json(req) = payload?;
    let cmd = PublishBook {
        caller_id: caller.user_id,
        caller_role: caller.role,
        title: req.title,
        genre: req.genre,
        stock: req.stock,
        requested_at: chrono::Utc::now(),
    };

    catalog::publish_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, "Book added successfully"))
}

/// GET /books - 書籍一覧
///
/// title・authorは大文字小文字を区別しない部分一致、genreは完全一致。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let filter = BookFilter::from(query);

    let listings = catalog::list_books(&state.service_deps, &filter).await?;

    Ok(Json(listings.into_iter().map(BookResponse::from).collect()))
}

// ============================================================================
// Account handlers
// ============================================================================

/// POST /users/signup - 会員登録
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Json(req) = payload?;
    let cmd = RegisterUser {
        name: req.name,
        email: req.email,
        password: req.password,
        role: req.role,
    };

    accounts::register(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, "User registered successfully"))
}

/// POST /users/login - ログイン
///
/// トークンはボディと`Authorization`ヘッダーの両方で返す。
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let token = accounts::login(
        &state.service_deps,
        &state.token_issuer,
        &req.email,
        &req.password,
    )
    .await?;

    let mut response = Json(LoginResponse {
        token: token.clone(),
    })
    .into_response();

    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(AUTHORIZATION, value);
    }

    Ok(response)
}
