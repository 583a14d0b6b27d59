use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

/// CORS policy for the browser form.
///
/// With a configured origin, only that origin is allowed and credentials are
/// permitted. Without one, any origin may call the API without credentials.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let origin = match origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS_ORIGIN value: {}", origin);
                None
            }
        },
        None => None,
    };

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any),
    }
}
