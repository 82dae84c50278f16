use axum::{
	Json, Router,
	extract::{DefaultBodyLimit, Multipart, Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use folio_service::{
	AskRequest, AskResponse, DocumentDetail, DocumentListResponse, Error as ServiceError,
	PurgeReport, ReindexRequest, ReindexResponse, SessionTurn, UploadRequest, UploadResponse,
};

pub fn router(state: AppState, max_upload_bytes: u64) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/documents", post(upload_document).get(list_documents))
		.route("/v1/documents/{doc_id}", get(get_document).delete(delete_document))
		.route("/v1/ask", post(ask))
		.route("/v1/sessions/{session_id}/history", get(session_history))
		.layer(DefaultBodyLimit::max(max_upload_bytes as usize + 64 * 1_024))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/reindex", post(reindex))
		.route("/v1/admin/purge_query_log", post(purge_query_log))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct TenantParams {
	tenant_id: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn upload_document(
	State(state): State<AppState>,
	multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
	let request = upload_request_from_multipart(multipart).await?;
	let response = state.service.upload(request).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn list_documents(
	State(state): State<AppState>,
	Query(params): Query<TenantParams>,
) -> Result<Json<DocumentListResponse>, ApiError> {
	let response = state.service.list_documents(&params.tenant_id).await?;

	Ok(Json(response))
}

async fn get_document(
	State(state): State<AppState>,
	Path(doc_id): Path<Uuid>,
	Query(params): Query<TenantParams>,
) -> Result<Json<DocumentDetail>, ApiError> {
	let response = state.service.get_document(&params.tenant_id, doc_id).await?;

	Ok(Json(response))
}

async fn delete_document(
	State(state): State<AppState>,
	Path(doc_id): Path<Uuid>,
	Query(params): Query<TenantParams>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_document(&params.tenant_id, doc_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.service.ask(payload).await?;

	Ok(Json(response))
}

async fn session_history(
	State(state): State<AppState>,
	Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<SessionTurn>>, ApiError> {
	let response = state.service.session_history(session_id).await?;

	Ok(Json(response))
}

async fn reindex(
	State(state): State<AppState>,
	Json(payload): Json<ReindexRequest>,
) -> Result<Json<ReindexResponse>, ApiError> {
	let response = state.service.reindex(payload).await?;

	Ok(Json(response))
}

async fn purge_query_log(State(state): State<AppState>) -> Result<Json<PurgeReport>, ApiError> {
	let response = state.service.purge_query_log().await?;

	Ok(Json(response))
}

async fn upload_request_from_multipart(mut multipart: Multipart) -> Result<UploadRequest, ApiError> {
	let mut tenant_id = None;
	let mut declared_format = None;
	let mut password = None;
	let mut filename = None;
	let mut content = None;

	while let Some(field) = multipart.next_field().await.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string(), None)
	})? {
		match field.name() {
			Some("tenant_id") => tenant_id = Some(read_text_field(field).await?),
			Some("declared_format") => declared_format = Some(read_text_field(field).await?),
			Some("password") => password = Some(read_text_field(field).await?),
			Some("file") => {
				filename = field.file_name().map(|name| name.to_string());
				content = Some(
					field
						.bytes()
						.await
						.map_err(|err| {
							json_error(
								StatusCode::BAD_REQUEST,
								"invalid_multipart",
								err.to_string(),
								None,
							)
						})?
						.to_vec(),
				);
			},
			_ => {},
		}
	}

	let tenant_id = tenant_id.ok_or_else(|| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"tenant_id field is required.",
			Some(vec!["tenant_id".to_string()]),
		)
	})?;
	let content = content.ok_or_else(|| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"file field is required.",
			Some(vec!["file".to_string()]),
		)
	})?;
	let filename = filename.unwrap_or_else(|| "upload".to_string());

	Ok(UploadRequest { tenant_id, filename, declared_format, password, content })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
	field.text().await.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string(), None)
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let status = match &err {
			ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
			ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
			ServiceError::EncryptedDocument | ServiceError::TextTooLong { .. } =>
				StatusCode::UNPROCESSABLE_ENTITY,
			ServiceError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
			ServiceError::Provider { .. } => StatusCode::BAD_GATEWAY,
			ServiceError::InvalidConfiguration { .. } | ServiceError::Storage { .. } =>
				StatusCode::INTERNAL_SERVER_ERROR,
		};
		// Operator-facing detail stays out of user responses.
		let message = match &err {
			ServiceError::InvalidConfiguration { .. } =>
				"The service is misconfigured; contact the operator.".to_string(),
			ServiceError::Storage { .. } => "The request could not be completed.".to_string(),
			ServiceError::ProviderUnavailable { .. } =>
				"The AI provider is unavailable; try again later.".to_string(),
			other => other.to_string(),
		};

		json_error(status, err.audit_code(), message, None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};

		(self.status, Json(body)).into_response()
	}
}
