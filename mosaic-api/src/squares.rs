use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mosaic_core::data_uri::parse_data_uri;
use mosaic_core::payment::CheckoutData;
use mosaic_core::reservation::is_reservation_active;
use mosaic_core::square::{image_key, range_cache_key, Square};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    start: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    id: Option<i64>,
    title: Option<String>,
    image_url: Option<String>,
    redirect_link: Option<String>,
    owner: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReserveResponse {
    payment_link: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/squares", get(list_squares).post(reserve_square))
}

/// GET /v1/squares?start=<id>&end=<id>
/// List the display projection of every cell in the inclusive id range
async fn list_squares(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Response, AppError> {
    let (Some(start), Some(end)) = (params.start, params.end) else {
        return Err(AppError::ValidationError(
            "Both start and end parameters are required".to_string(),
        ));
    };

    let cache_key = range_cache_key(start, end);

    // 1. Try the result cache; a read failure counts as a miss
    match state.cache.get(&cache_key).await {
        Ok(Some(cached)) => {
            debug!("Cache hit for {}", cache_key);
            return Ok(raw_json(cached));
        }
        Ok(None) => {
            debug!("Cache miss for {}, falling back to the store", cache_key);
        }
        Err(e) => {
            warn!("Cache read for {} failed, falling back to the store: {}", cache_key, e);
        }
    }

    // 2. Query the store and serialize once; the cache holds the exact
    //    payload we return, so hits and misses stay byte-identical
    let summaries = state
        .squares
        .find_range(start, end)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let payload = serde_json::to_string(&summaries)?;

    // 3. Populate the cache without holding up the response
    let cache = state.cache.clone();
    let ttl = state.business_rules.range_cache_ttl_seconds;
    let body = payload.clone();
    tokio::spawn(async move {
        if let Err(e) = cache.set(&cache_key, &body, ttl).await {
            warn!("Error caching range payload for {}: {}", cache_key, e);
        }
    });

    Ok(raw_json(payload))
}

/// POST /v1/squares
/// Claim a cell: reserve it in the store, upload its image, and hand the
/// customer a payment link. The claim self-expires if payment never lands.
async fn reserve_square(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReserveResponse>), AppError> {
    // 1. Validate required fields; empty strings count as absent
    let (Some(id), Some(title), Some(image_uri), Some(redirect_link), Some(owner)) = (
        req.id,
        non_empty(req.title),
        non_empty(req.image_url),
        non_empty(req.redirect_link),
        non_empty(req.owner),
    ) else {
        return Err(AppError::ValidationError(
            "Required fields are absent".to_string(),
        ));
    };

    let now = state.clock.now();
    let window =
        chrono::Duration::seconds(state.business_rules.reservation_window_seconds as i64);

    // 2. Conflict check against any existing claim
    if let Some(existing) = state
        .squares
        .find_by_id(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
    {
        if existing.is_purchased {
            return Err(AppError::ConflictError(
                "Square is already purchased, please try another one.".to_string(),
            ));
        }
        if is_reservation_active(&existing, now, window) {
            // Buffer period for the current claimant to finish paying
            return Err(AppError::ConflictError(
                "Square is being purchased by another customer, please try another one."
                    .to_string(),
            ));
        }

        // The claim lapsed: release it and proceed as a fresh one. The
        // old image stays in the media store; the new upload lands on
        // the same key.
        state
            .squares
            .delete_expired(id, now - window)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        info!("Expired claim on square {} released", id);
    }

    // 3. Decode the data-URI and enforce the upload size ceiling
    let image = parse_data_uri(&image_uri)?;
    let max_bytes = state.business_rules.max_image_bytes;
    let compressed = state
        .compressor
        .compress(image.bytes, max_bytes)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if compressed.len() > max_bytes {
        return Err(AppError::InternalServerError(format!(
            "Image for square {} is {} bytes after compression, ceiling is {}",
            id,
            compressed.len(),
            max_bytes
        )));
    }

    let key = image_key(id, &image.extension);
    let record = Square {
        id,
        title,
        image_url: format!("/{}", key),
        redirect_link,
        owner,
        is_purchased: false,
        reserved_at: now,
    };
    let checkout = CheckoutData { square_id: id };

    // 4. Commit in parallel: payment link, media upload, store insert.
    //    No rollback ties them together; a partial failure can leave an
    //    orphaned upload or row behind.
    let (link, uploaded, created) = tokio::join!(
        state.payments.create_payment_link(&checkout),
        state.media.put(&key, compressed, &image.content_type),
        state.squares.create_if_absent(&record),
    );

    uploaded.map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let created = created.map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !created {
        // A concurrent claim won the insert between the conflict check
        // and the commit
        return Err(AppError::ConflictError(
            "Square is being purchased by another customer, please try another one."
                .to_string(),
        ));
    }

    let payment_link = link
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|url| !url.is_empty())
        .ok_or(AppError::PaymentLinkUnavailable)?;

    info!("Square {} reserved by {}", id, record.owner);

    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse {
            payment_link,
        }),
    ))
}

// Respond with an already-serialized JSON payload
fn raw_json(payload: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

// Query values arrive as strings; a present-but-empty one counts as
// missing, the same as an omitted parameter
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
