// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The HTTP API used by the PromptDrop web front end.

use std::{future::Future, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use promptdrop_core::{
    Aggregator, Collection, ExtractedContent, GalleryConfig, OwnershipProber,
};
use promptdrop_ethereum::{client::NftQueries, Address};
use promptdrop_generation::{
    GeneratedImage, GeneratedPrompt, GenerationError, ImageGenerator, PromptGenerator,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// The shared state of the request handlers.
pub struct AppState<Q> {
    pub queries: Arc<Q>,
    pub contract_address: Address,
    pub aggregator: Aggregator<Q>,
    pub prompts: PromptGenerator,
    pub images: ImageGenerator,
}

impl<Q: NftQueries> AppState<Q> {
    pub fn new(
        queries: Arc<Q>,
        contract_address: Address,
        config: &GalleryConfig,
        prompts: PromptGenerator,
        images: ImageGenerator,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(queries.clone(), config),
            queries,
            contract_address,
            prompts,
            images,
        }
    }
}

/// An error response: `{ "error": …, "details": … }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details: None,
        }
    }

    fn upstream(error: impl Into<String>, details: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            details: Some(details.to_string()),
        }
    }

    fn generation(error: &str, source: GenerationError) -> Self {
        if source.is_invalid_input() {
            return Self::bad_request(source.to_string());
        }
        warn!(%source, "{error}");
        Self::upstream(error, source)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.error, "details": self.details });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct GeneratePromptRequest {
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    result: T,
}

impl<T> Success<T> {
    fn new(result: T) -> Json<Self> {
        Json(Self {
            success: true,
            result,
        })
    }
}

#[derive(Deserialize)]
pub struct RefinePromptRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize, Deserialize)]
pub struct RefinePromptResponse {
    pub prompt: String,
}

#[derive(Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

/// A token id given either as a JSON number or as a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum TokenIdParam {
    Number(u64),
    Text(String),
}

impl TokenIdParam {
    fn parse(&self) -> Option<u64> {
        match self {
            TokenIdParam::Number(token_id) => Some(*token_id),
            TokenIdParam::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOwnerRequest {
    pub token_id: Option<TokenIdParam>,
    pub user_address: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOwnerResponse {
    pub token_id: u64,
    pub is_owner: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ExtractedContent>,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub message: String,
    pub contract: Address,
    pub timestamp: DateTime<Utc>,
}

async fn generate_prompt<Q>(
    State(state): State<Arc<AppState<Q>>>,
    Json(request): Json<GeneratePromptRequest>,
) -> Result<Json<Success<GeneratedPrompt>>, ApiError> {
    let generated = state
        .prompts
        .generate(&request.direction, request.style.as_deref())
        .await
        .map_err(|error| ApiError::generation("Failed to generate prompt", error))?;
    Ok(Success::new(generated))
}

async fn refine_prompt<Q>(
    State(state): State<Arc<AppState<Q>>>,
    Json(request): Json<RefinePromptRequest>,
) -> Result<Json<RefinePromptResponse>, ApiError> {
    let prompt = state
        .prompts
        .refine(&request.prompt)
        .await
        .map_err(|error| ApiError::generation("Failed to refine prompt", error))?;
    Ok(Json(RefinePromptResponse { prompt }))
}

async fn generate_image<Q>(
    State(state): State<Arc<AppState<Q>>>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<Success<GeneratedImage>>, ApiError> {
    let image = state
        .images
        .generate(
            &request.prompt,
            request.size.as_deref(),
            request.style.as_deref(),
        )
        .await
        .map_err(|error| ApiError::generation("Failed to generate image", error))?;
    Ok(Success::new(image))
}

async fn check_owner<Q: NftQueries>(
    State(state): State<Arc<AppState<Q>>>,
    Json(request): Json<CheckOwnerRequest>,
) -> Result<Json<CheckOwnerResponse>, ApiError> {
    let (Some(token_id), Some(user_address)) = (request.token_id, request.user_address) else {
        return Err(ApiError::bad_request("tokenId and userAddress are required"));
    };
    let token_id = token_id
        .parse()
        .ok_or_else(|| ApiError::bad_request("tokenId must be a non-negative integer"))?;
    let user: Address = user_address
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("userAddress is not a valid address"))?;

    let prober = OwnershipProber::new(state.queries.clone());
    let response = match prober.probe(token_id, user).await {
        None => CheckOwnerResponse {
            token_id,
            is_owner: false,
            exists: false,
            owner: None,
            descriptor: None,
            content: None,
            message: "Token does not exist or could not be read".to_string(),
        },
        Some(probe) if !probe.record.is_owner => CheckOwnerResponse {
            token_id,
            is_owner: false,
            exists: true,
            owner: Some(probe.record.owner),
            descriptor: None,
            content: None,
            message: "Token not owned by user".to_string(),
        },
        Some(probe) => {
            let content = probe
                .descriptor
                .as_deref()
                .map(|descriptor| state.aggregator.extractor().extract(descriptor));
            CheckOwnerResponse {
                token_id,
                is_owner: true,
                exists: true,
                owner: Some(probe.record.owner),
                descriptor: probe.descriptor,
                content,
                message: "Token owned by user".to_string(),
            }
        }
    };
    Ok(Json(response))
}

async fn check_owner_info<Q>(State(state): State<Arc<AppState<Q>>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "NFT ownership check API".to_string(),
        contract: state.contract_address,
        timestamp: Utc::now(),
    })
}

async fn gallery<Q: NftQueries>(
    State(state): State<Arc<AppState<Q>>>,
    Path(address): Path<String>,
) -> Result<Json<Collection>, ApiError> {
    let owner: Address = address
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("invalid address"))?;
    let balance = state
        .queries
        .balance_of(owner)
        .await
        .map_err(|error| ApiError::upstream("Failed to read the balance", error))?;
    let tokens = state.aggregator.collect(owner, balance).await;
    Ok(Json(Collection {
        owner,
        balance,
        tokens,
    }))
}

/// Builds the API router.
pub fn router<Q: NftQueries + 'static>(state: Arc<AppState<Q>>) -> Router {
    Router::new()
        .route("/api/generate-prompt", post(generate_prompt::<Q>))
        .route("/api/llm-generate", post(refine_prompt::<Q>))
        .route("/api/generate-image", post(generate_image::<Q>))
        .route(
            "/api/check-nft-owner",
            post(check_owner::<Q>).get(check_owner_info::<Q>),
        )
        .route("/api/gallery/{address}", get(gallery::<Q>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` completes.
pub async fn serve<Q: NftQueries + 'static>(
    listener: TcpListener,
    state: Arc<AppState<Q>>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!(address = %listener.local_addr()?, "Serving the PromptDrop API");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
