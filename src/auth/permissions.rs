use axum::http::Method;

use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Entity with a single owning user
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// GET, HEAD and OPTIONS never mutate
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Owner-or-read-only: safe methods always pass, anything else only for the owner
pub fn is_owner_or_read_only<T: Owned + ?Sized>(method: &Method, user: &AuthUser, target: &T) -> bool {
    is_safe_method(method) || target.owner_id() == user.id
}

pub fn ensure_owner_or_read_only<T: Owned + ?Sized>(method: &Method, user: &AuthUser, target: &T) -> Result<(), ApiError> {
    if is_owner_or_read_only(method, user, target) {
        Ok(())
    } else {
        tracing::debug!("User {} denied {} on object owned by {}", user.id, method, target.owner_id());
        Err(ApiError::forbidden("You do not have permission to perform this action."))
    }
}
