use tracing::{debug, info};

use crate::auth::Auth;

pub async fn get_profile(Auth(user): Auth) -> &'static str {
    debug!(username = %user.username, "Profile requested");
    "User profile data"
}

pub async fn update_profile(Auth(user): Auth, body: String) -> &'static str {
    info!(username = %user.username, bytes = body.len(), "Profile updated");
    "Profile updated successfully"
}
