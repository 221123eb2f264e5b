pub mod wechat {
    use axum::debug_handler;
    use axum::extract::{State, Query};
    use axum::extract::rejection::QueryRejection;
    use axum::response::IntoResponse;
    use gate_api::Reply;
    use gate_api::auth::wechat::CodeQuery;
    use gate_api::error::{AuthKind, ExternalKind};

    use crate::net::error;
    use crate::sec::authn::initiator::Initiator;
    use crate::sec::authn::link::Login;
    use crate::sec::authn::session::{self, Session};
    use crate::state::ArcShared;

    #[debug_handler]
    pub async fn login(
        State(state): State<ArcShared>,
        query: Result<Query<CodeQuery>, QueryRejection>,
    ) -> error::Result<impl IntoResponse> {
        let Query(query) = query?;

        let user = match state.linker().login_or_register(&query.code).await? {
            Login::Granted(user) => user,
            Login::Disabled => {
                return Err(error::Error::api(ExternalKind::FeatureDisabled));
            }
            Login::Banned(_) => {
                return Err(error::Error::api(AuthKind::AccountDisabled));
            }
        };

        let (session, token) = Session::issue(state.sessions(), user.id).await?;
        let cookie = session::create_session_cookie(state.session(), &token, &session);

        tracing::info!(user_id = user.id, "issued session for wechat login");

        Ok((
            cookie,
            Reply::new(gate_api::users::User::from(user))
        ))
    }

    #[debug_handler]
    pub async fn bind(
        State(state): State<ArcShared>,
        initiator: Initiator,
        query: Result<Query<CodeQuery>, QueryRejection>,
    ) -> error::Result<impl IntoResponse> {
        let Query(query) = query?;

        state.linker().bind(initiator.user.id, &query.code).await?;

        Ok(Reply::empty())
    }
}
