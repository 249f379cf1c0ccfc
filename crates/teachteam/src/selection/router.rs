use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus, CourseId, UnavailabilityNotice, UserRole};
use super::filter::SearchCriteria;
use super::ranking::RankingError;
use super::repository::{ApplicationStore, NoticePublisher, RepositoryError};
use super::service::{SelectionService, SelectionServiceError};
use crate::session::{Session, SessionRegistry, SessionToken};

pub const SESSION_HEADER: &str = "x-session-token";

/// Shared state handed to every selection handler.
pub struct SelectionState<S, N> {
    pub service: Arc<SelectionService<S, N>>,
    pub sessions: Arc<SessionRegistry>,
}

impl<S, N> Clone for SelectionState<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Router builder exposing search, ranking, statistics, and session endpoints.
pub fn selection_router<S, N>(
    service: Arc<SelectionService<S, N>>,
    sessions: Arc<SessionRegistry>,
) -> Router
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(login_handler::<S, N>))
        .route("/api/v1/sessions/:token", delete(logout_handler::<S, N>))
        .route("/api/v1/applications", get(list_handler::<S, N>))
        .route(
            "/api/v1/applications/selected",
            get(selected_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/statistics",
            get(statistics_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/ranking",
            put(ranking_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(status_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/comments",
            post(comment_handler::<S, N>),
        )
        .route(
            "/api/v1/courses/:course_id/applications",
            get(course_handler::<S, N>),
        )
        .route(
            "/api/v1/candidates/unavailable",
            post(unavailable_handler::<S, N>),
        )
        .with_state(SelectionState { service, sessions })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: SessionToken,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub rank: u32,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

pub(crate) async fn login_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    let Some(user) = state.service.user(request.email.trim()) else {
        return error_body(StatusCode::UNAUTHORIZED, "unknown user");
    };

    let session = state.sessions.open(user);
    let body = LoginResponse {
        token: session.token,
        name: session.name,
        role: session.role,
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

pub(crate) async fn logout_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    Path(token): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if state.sessions.close(&SessionToken(token)) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_body(StatusCode::NOT_FOUND, "session not found")
    }
}

pub(crate) async fn list_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Query(criteria): Query<SearchCriteria>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authenticate(&state.sessions, &headers) {
        return response;
    }
    respond(state.service.all_applications(&criteria), StatusCode::OK)
}

pub(crate) async fn selected_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authenticate(&state.sessions, &headers) {
        return response;
    }
    respond(state.service.selected_applications(), StatusCode::OK)
}

pub(crate) async fn statistics_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Query(criteria): Query<SearchCriteria>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authenticate(&state.sessions, &headers) {
        return response;
    }
    respond(state.service.statistics(&criteria), StatusCode::OK)
}

pub(crate) async fn course_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
    Query(criteria): Query<SearchCriteria>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authenticate(&state.sessions, &headers) {
        return response;
    }
    respond(
        state
            .service
            .applications_for_course(&CourseId(course_id), &criteria),
        StatusCode::OK,
    )
}

pub(crate) async fn ranking_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<RankingRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authorize(&state.sessions, &headers, Session::can_review) {
        return response;
    }
    respond(
        state
            .service
            .set_ranking(&ApplicationId(application_id), request.rank),
        StatusCode::OK,
    )
}

pub(crate) async fn status_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authorize(&state.sessions, &headers, Session::can_review) {
        return response;
    }
    respond(
        state.service.change_status(
            &ApplicationId(application_id),
            request.status,
            request.rank,
        ),
        StatusCode::OK,
    )
}

pub(crate) async fn comment_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authorize(&state.sessions, &headers, Session::can_review) {
        return response;
    }
    match state
        .service
        .add_comment(&ApplicationId(application_id), &request.text)
    {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn unavailable_handler<S, N>(
    State(state): State<SelectionState<S, N>>,
    headers: HeaderMap,
    Json(notice): Json<UnavailabilityNotice>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    if let Err(response) = authorize(&state.sessions, &headers, Session::is_admin) {
        return response;
    }
    match state.service.mark_unavailable(notice) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) => error_response(err),
    }
}

fn authenticate(sessions: &SessionRegistry, headers: &HeaderMap) -> Result<Session, Response> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|token| sessions.resolve(&SessionToken(token.trim().to_string())))
        .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "login required"))
}

fn authorize(
    sessions: &SessionRegistry,
    headers: &HeaderMap,
    allowed: fn(&Session) -> bool,
) -> Result<Session, Response> {
    let session = authenticate(sessions, headers)?;
    if allowed(&session) {
        Ok(session)
    } else {
        Err(error_body(
            StatusCode::FORBIDDEN,
            &format!("role {} may not perform this action", session.role.label()),
        ))
    }
}

fn respond<T: Serialize>(result: Result<T, SelectionServiceError>, status: StatusCode) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: SelectionServiceError) -> Response {
    let status = match &err {
        SelectionServiceError::Ranking(RankingError::UnknownApplication(_))
        | SelectionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SelectionServiceError::Ranking(_)
        | SelectionServiceError::EmptyComment
        | SelectionServiceError::MissingCandidate => StatusCode::UNPROCESSABLE_ENTITY,
        SelectionServiceError::Repository(RepositoryError::Unavailable(_))
        | SelectionServiceError::RankingNotSaved(_)
        | SelectionServiceError::Notice(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_body(status, &err.to_string())
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
