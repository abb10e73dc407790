//! Header handling for the forwarded request and the relayed response.
//!
//! Inbound headers are forwarded as-is, `Host` and `Authorization`
//! included. Only the body framing headers are dropped: the inbound body
//! is never sent upstream, so a copied `Content-Length` or
//! `Transfer-Encoding` would describe bytes that never arrive. The relay
//! side uses [`strip_transfer_framing`] because the upstream body has
//! already been de-chunked into a single buffer.

use axum::http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName};

static BODY_FRAMING: [HeaderName; 2] = [CONTENT_LENGTH, TRANSFER_ENCODING];

#[must_use]
pub fn build_forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in BODY_FRAMING.iter() {
        headers.remove(name);
    }
    headers
}

/// Drop `Transfer-Encoding` from a response whose body is fully buffered.
///
/// A `Content-Length` sent next to it is meaningless, so it goes too and
/// hyper frames the buffered body itself. A lone `Content-Length` stays:
/// the client already checked it against the bytes read, and it is the
/// only length a `HEAD` response carries.
pub fn strip_transfer_framing(headers: &mut HeaderMap) {
    if headers.remove(TRANSFER_ENCODING).is_some() {
        headers.remove(CONTENT_LENGTH);
    }
}
