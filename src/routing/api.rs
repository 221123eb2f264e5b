use axum::Router;
use axum::routing::get;
use gate_api::error::GeneralKind;

use crate::net::error;
use crate::state::ArcShared;

mod oauth;
mod option;
mod status;

pub async fn not_found() -> error::Error {
    error::Error::api(GeneralKind::NotFound)
}

pub fn routes() -> Router<ArcShared> {
    Router::new()
        .route("/oauth/wechat", get(oauth::wechat::login))
        .route("/oauth/wechat/bind", get(oauth::wechat::bind))
        .route("/status", get(status::get))
        .route(
            "/option",
            get(option::get)
                .put(option::put)
        )
        .fallback(not_found)
}
