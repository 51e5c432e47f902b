//! Current user profile.

use axum::Json;

use seeklit_core::UserProfile;

use crate::middleware::RequireUser;

/// `GET /api/me`: the signed-in user, without their token.
pub async fn me(RequireUser(user): RequireUser) -> Json<UserProfile> {
    Json(user.profile())
}
