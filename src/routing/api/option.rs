use axum::debug_handler;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use gate_api::{Reply, Validator};
use gate_api::options::{OptionItem, UpdateOption};
use gate_lib::users::Role;

use crate::net::error;
use crate::sec::authn::initiator::Initiator;
use crate::state::ArcShared;

#[debug_handler]
pub async fn get(
    State(state): State<ArcShared>,
    initiator: Initiator,
) -> error::Result<impl IntoResponse> {
    initiator.require_role(Role::Root)?;

    let list: Vec<OptionItem> = state.options()
        .public()
        .into_iter()
        .map(|(key, value)| OptionItem { key, value })
        .collect();

    Ok(Reply::new(list))
}

#[debug_handler]
pub async fn put(
    State(state): State<ArcShared>,
    initiator: Initiator,
    json: Result<axum::Json<UpdateOption>, JsonRejection>,
) -> error::Result<impl IntoResponse> {
    initiator.require_role(Role::Root)?;

    let axum::Json(json) = json?;

    json.validate()?;

    state.options().set(&json.key, &json.value).await?;

    tracing::info!(user_id = initiator.user.id, key = %json.key, "option updated");

    Ok(Reply::empty())
}
