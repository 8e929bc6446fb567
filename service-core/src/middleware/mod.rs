pub mod cors;
pub mod tracing;

pub use self::cors::cors_headers_middleware;
pub use self::tracing::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
