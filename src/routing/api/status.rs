use axum::extract::State;
use gate_api::Reply;
use gate_api::status::Status;

use crate::state::ArcShared;

pub async fn get(State(state): State<ArcShared>) -> Reply<Status> {
    let status = state.options().with_snapshot(|snapshot| {
        let typed = &snapshot.typed;

        Status {
            password_login: typed.password_login_enabled,
            password_register: typed.password_register_enabled,
            email_verification: typed.email_verification_enabled,
            github_oauth: typed.github_oauth_enabled,
            github_client_id: typed.github_client_id.clone(),
            wechat_login: typed.wechat_auth_enabled,
            wechat_qrcode: typed.wechat_account_qrcode_image_url.clone(),
            server_address: typed.server_address.clone(),
            footer: typed.footer.clone(),
        }
    });

    Reply::new(status)
}
