//! Response cache middleware.
//!
//! Serves whitelisted GETs from the cache, populates it from successful misses and
//! purges tagged entries after successful mutations. Caching is a side effect: the
//! downstream response always reaches the client, whatever the cache layer does.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::{stream, StreamExt};
use http_body_util::BodyExt;
use tracing::{debug, instrument, warn};

use super::envelope::{self, Verdict};
use crate::cache::{CacheKey, CacheService, CachedResponse};
use crate::error::ProxyError;
use crate::routing::{Classification, Tag};

/// Request header forcing a fresh read; honored when its value is `true`.
pub const BYPASS_HEADER: &str = "x-bypass-cache";

/// Response header reporting how a cacheable read was served.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

// == Cache Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Hit,
    Miss,
    Bypass,
}

impl Outcome {
    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(match self {
            Outcome::Hit => "HIT",
            Outcome::Miss => "MISS",
            Outcome::Bypass => "BYPASS",
        })
    }
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
#[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheService>,
    request: Request,
    next: Next,
) -> Response {
    if !cache.settings().enabled {
        return next.run(request).await;
    }

    match cache.classify(request.method(), request.uri()) {
        Classification::Cacheable { key } => serve_read(&cache, key, request, next).await,
        Classification::Mutation { tags } => serve_mutation(&cache, &tags, request, next).await,
        Classification::Uncached => next.run(request).await,
    }
}

/// True when the request carries the bypass header set to `true`.
pub fn wants_bypass(headers: &HeaderMap) -> bool {
    headers
        .get(BYPASS_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

// == Body Buffering ==
/// A downstream body read up to a size limit.
enum Buffered {
    Complete(Bytes),
    /// Limit exceeded: the bytes read so far chained with the unread remainder
    Oversize(Body),
}

async fn buffer_body(mut body: Body, limit: usize) -> Result<Buffered, axum::Error> {
    if body.size_hint().lower() > limit as u64 {
        return Ok(Buffered::Oversize(body));
    }

    let mut buf: Vec<u8> = Vec::new();
    while let Some(frame) = body.frame().await {
        // Trailers carry no payload.
        let Ok(data) = frame?.into_data() else {
            continue;
        };
        buf.extend_from_slice(&data);

        if buf.len() > limit {
            let head = stream::iter([Ok::<_, axum::Error>(Bytes::from(buf))]);
            let rest = head.chain(body.into_data_stream());
            return Ok(Buffered::Oversize(Body::from_stream(rest)));
        }
    }

    Ok(Buffered::Complete(Bytes::from(buf)))
}

// == Reads ==
async fn serve_read(cache: &CacheService, key: CacheKey, request: Request, next: Next) -> Response {
    let outcome = if wants_bypass(request.headers()) {
        let evicted = cache.bypass(&key).await;
        debug!(key = %key, evicted, "cache bypass requested");
        Outcome::Bypass
    } else if let Some(cached) = cache.lookup(&key).await {
        debug!(key = %key, outcome = "hit", "serving cached response");
        return cached_response(cached);
    } else {
        debug!(key = %key, outcome = "miss", "cache miss, executing handler");
        Outcome::Miss
    };

    // Read before the fetch: an invalidation landing while the handler runs voids the fill.
    let generation = cache.generation(key.family()).await;

    let (mut parts, body) = next.run(request).await.into_parts();
    parts
        .headers
        .insert(CACHE_STATUS_HEADER, outcome.header_value());

    // Non-200 responses are never stored; hand them back untouched.
    if parts.status != StatusCode::OK {
        return Response::from_parts(parts, body);
    }

    let limit = cache.settings().max_cacheable_bytes;
    let bytes = match buffer_body(body, limit).await {
        Ok(Buffered::Complete(bytes)) => bytes,
        Ok(Buffered::Oversize(body)) => {
            debug!(key = %key, limit, "response exceeds cacheable size, not stored");
            return Response::from_parts(parts, body);
        }
        Err(err) => {
            warn!(key = %key, error = %err, "failed to read downstream response body");
            return ProxyError::Upstream(format!("failed to read response body: {}", err))
                .into_response();
        }
    };

    if let Some(value) = cacheable_value(cache, &key, &parts.headers, &bytes) {
        cache.populate(key, value, generation).await;
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Builds the stored payload, or `None` when the envelope rules it out.
fn cacheable_value(
    cache: &CacheService,
    key: &CacheKey,
    headers: &HeaderMap,
    body: &Bytes,
) -> Option<CachedResponse> {
    match envelope::judge(cache.settings().success_policy, body) {
        Verdict::Success => {}
        Verdict::Failure => {
            debug!(key = %key, "response envelope reports failure, not stored");
            return None;
        }
        Verdict::Opaque => {
            debug!(key = %key, "response body is not JSON, not stored");
            return None;
        }
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Some(CachedResponse::new(content_type, body.clone()))
}

/// Rebuilds a response from a stored payload.
fn cached_response(cached: CachedResponse) -> Response {
    let mut response = Response::new(Body::from(cached.body));

    if let Some(content_type) = cached
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, Outcome::Hit.header_value());

    response
}

// == Mutations ==
async fn serve_mutation(
    cache: &CacheService,
    tags: &[Tag],
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !response.status().is_success() {
        debug!(status = %response.status(), "mutation failed, cache left untouched");
        return response;
    }

    let (parts, body) = response.into_parts();
    let limit = cache.settings().max_cacheable_bytes;

    // Over-invalidation only costs a miss, so mutations are always judged fail-open
    // and a body too large to inspect counts as success.
    let (verdict, body) = match buffer_body(body, limit).await {
        Ok(Buffered::Complete(bytes)) => (
            envelope::judge(envelope::SuccessPolicy::FailOpen, &bytes),
            Body::from(bytes),
        ),
        Ok(Buffered::Oversize(body)) => (Verdict::Opaque, body),
        Err(err) => {
            // The backend may have committed; purge rather than risk stale reads.
            warn!(error = %err, "failed to read mutation response body");
            cache.invalidate(tags).await;
            return ProxyError::Upstream(format!("failed to read response body: {}", err))
                .into_response();
        }
    };

    match verdict {
        Verdict::Failure => {
            debug!("mutation envelope reports failure, cache left untouched");
        }
        Verdict::Success | Verdict::Opaque => {
            let removed = cache.invalidate(tags).await;
            debug!(?tags, removed, "mutation succeeded, tags invalidated");
        }
    }

    Response::from_parts(parts, body)
}
