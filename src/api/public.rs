pub async fn get_info() -> &'static str {
    "This is public information - no CSRF required"
}
