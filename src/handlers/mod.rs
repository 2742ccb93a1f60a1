pub mod comments;
pub mod interactions;

pub async fn health() -> &'static str {
    "ok"
}
