//! Success classification for completed exchanges.
//!
//! The classifier is a pure function from method and status code to a
//! tri-state success indication:
//!
//! - `Some(false)` - the exchange explicitly did not succeed.
//! - `None` - success. Successful classifications deliberately leave the
//!   indication *unset* rather than returning `Some(true)`; downstream code
//!   treats "not explicitly false" as success. See [`Response::is_success`].
//!
//! [`Response::is_success`]: crate::Response::is_success

use http::{Method, StatusCode};

/// Classifies an exchange as successful or not.
///
/// A missing status code is an explicit failure. Statuses in `200..=299`
/// are successes. A `DELETE` answered with 404 or 410 also counts as a
/// success: the resource being already gone is the outcome an idempotent
/// delete asked for.
#[must_use]
pub fn is_success(method: &Method, status: Option<StatusCode>) -> Option<bool> {
    let Some(status) = status else {
        return Some(false);
    };

    if status.is_success() {
        return None;
    }

    if method == Method::DELETE
        && (status == StatusCode::NOT_FOUND || status == StatusCode::GONE)
    {
        return None;
    }

    Some(false)
}
