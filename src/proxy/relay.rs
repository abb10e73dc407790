//! Relay of the upstream response to the caller.
//!
//! Status, headers (repeated values and hop-by-hop headers included), and
//! the body bytes are copied without modification. The one exception is
//! transfer framing: the body was read in full, so `Transfer-Encoding`
//! (and any `Content-Length` sent alongside it) is dropped and hyper
//! frames the buffered bytes.

use axum::body::Body;
use axum::response::Response;

use super::forward::UpstreamResponse;
use super::headers::strip_transfer_framing;

#[must_use]
pub fn relay(upstream: UpstreamResponse) -> Response {
    let mut headers = upstream.headers;
    strip_transfer_framing(&mut headers);

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    response
}
