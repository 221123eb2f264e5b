use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use gate_lib::ids;
use gate_lib::sec::authn::{SESSION_ID_BYTES, SESSION_COOKIE, SESSION_DAYS};
use rand::RngCore;

use crate::config;
use crate::db::StoreError;
use crate::net::cookie::{SameSite, SetCookie};

mod pg;

pub use pg::PgSessionStore;

const TOKEN_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("ran out of attempts to generate a unique session token")]
    TokenAttempts,

    #[error("session expiration overflowed")]
    UtcOverflow,

    #[error(transparent)]
    Rand(#[from] rand::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("session id is not valid base64")]
    InvalidString,

    #[error("session id has the wrong length")]
    InvalidLength,
}

/// the secret handed to the client. only its hash is ever stored
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SessionToken([u8; SESSION_ID_BYTES]);

impl SessionToken {
    pub fn generate() -> Result<Self, rand::Error> {
        let mut bytes = [0; SESSION_ID_BYTES];

        rand::thread_rng().try_fill_bytes(&mut bytes)?;

        Ok(SessionToken(bytes))
    }

    pub fn hash(&self) -> blake3::Hash {
        blake3::hash(&self.0)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn decode<S>(session_id: S) -> Result<Self, DecodeError>
    where
        S: AsRef<[u8]>
    {
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(session_id) else {
            return Err(DecodeError::InvalidString);
        };

        let Ok(array) = <[u8; SESSION_ID_BYTES]>::try_from(bytes) else {
            return Err(DecodeError::InvalidLength);
        };

        Ok(SessionToken(array))
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: blake3::Hash,
    pub user_id: ids::UserId,
    pub dropped: bool,
    pub issued_on: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// where sessions are kept. rows are keyed by the hash of the token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// fails with [`StoreError::Conflict`] if the token hash is already
    /// taken
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    async fn retrieve(&self, token_hash: &blake3::Hash) -> Result<Option<Session>, StoreError>;
}

impl Session {
    /// create and store a new session for the user. the returned token is
    /// the only copy of the secret
    pub async fn issue(
        sessions: &dyn SessionStore,
        user_id: ids::UserId
    ) -> Result<(Session, SessionToken), SessionError> {
        let issued_on = Utc::now();
        let duration = chrono::Duration::days(SESSION_DAYS);

        let Some(expires) = issued_on.checked_add_signed(duration) else {
            return Err(SessionError::UtcOverflow);
        };

        for _ in 0..TOKEN_ATTEMPTS {
            let token = SessionToken::generate()?;
            let session = Session {
                token_hash: token.hash(),
                user_id,
                dropped: false,
                issued_on,
                expires,
            };

            match sessions.create(&session).await {
                Ok(()) => return Ok((session, token)),
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!("session token collided, generating another");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SessionError::TokenAttempts)
    }

    pub async fn retrieve_token(
        sessions: &dyn SessionStore,
        token: &SessionToken
    ) -> Result<Option<Session>, StoreError> {
        sessions.retrieve(&token.hash()).await
    }

    pub fn is_active(&self, now: &DateTime<Utc>) -> bool {
        !self.dropped && self.expires > *now
    }
}

pub fn create_session_cookie(
    settings: &config::Session,
    token: &SessionToken,
    session: &Session
) -> SetCookie {
    let mut cookie = SetCookie::new(SESSION_COOKIE, token.encode())
        .with_expires(session.expires)
        .with_path("/")
        .with_http_only(true)
        .with_secure(settings.secure)
        .with_same_site(SameSite::Strict);

    if let Some(domain) = &settings.domain {
        cookie.set_domain(domain);
    }

    cookie
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::MemorySessionStore;

    #[test]
    fn tokens_encode_and_decode() {
        let token = SessionToken::generate().unwrap();
        let encoded = token.encode();

        assert_eq!(encoded.len(), 64);
        assert!(!encoded.contains(['=', ';', ' ']));
        assert_eq!(SessionToken::decode(&encoded).unwrap(), token);
        assert_ne!(SessionToken::generate().unwrap(), token);
    }

    #[test]
    fn decode_rejects_bad_ids() {
        assert!(matches!(SessionToken::decode("not base64!"), Err(DecodeError::InvalidString)));
        assert!(matches!(
            SessionToken::decode(URL_SAFE_NO_PAD.encode([1u8; 12])),
            Err(DecodeError::InvalidLength)
        ));
    }

    #[tokio::test]
    async fn issue_stores_only_the_hash() {
        let sessions = MemorySessionStore::default();

        let (session, token) = Session::issue(&sessions, 7).await.unwrap();

        assert_eq!(session.user_id, 7);
        assert_eq!(session.expires - session.issued_on, chrono::Duration::days(SESSION_DAYS));

        let found = Session::retrieve_token(&sessions, &token).await.unwrap()
            .expect("issued session was not stored");

        assert_eq!(found.token_hash, token.hash());
        assert_eq!(found.user_id, 7);
        assert!(found.is_active(&Utc::now()));
    }

    #[tokio::test]
    async fn issue_retries_token_collisions() {
        let sessions = MemorySessionStore::default();

        sessions.collide_next(TOKEN_ATTEMPTS - 1);

        assert!(Session::issue(&sessions, 1).await.is_ok());
        assert_eq!(sessions.count(), 1);

        sessions.collide_next(TOKEN_ATTEMPTS);

        assert!(matches!(Session::issue(&sessions, 1).await, Err(SessionError::TokenAttempts)));
        assert_eq!(sessions.count(), 1);
    }

    #[test]
    fn expired_and_dropped_sessions_are_inactive() {
        let now = Utc::now();
        let mut session = Session {
            token_hash: SessionToken::generate().unwrap().hash(),
            user_id: 1,
            dropped: false,
            issued_on: now,
            expires: now + chrono::Duration::days(SESSION_DAYS),
        };

        assert!(session.is_active(&now));
        assert!(!session.is_active(&(now + chrono::Duration::days(SESSION_DAYS + 1))));

        session.dropped = true;
        assert!(!session.is_active(&now));
    }

    #[test]
    fn session_cookie_follows_settings() {
        let now = Utc::now();
        let token = SessionToken::generate().unwrap();
        let session = Session {
            token_hash: token.hash(),
            user_id: 1,
            dropped: false,
            issued_on: now,
            expires: now,
        };
        let settings = config::Session {
            secure: false,
            domain: Some("example.com".into()),
        };

        let cookie = create_session_cookie(&settings, &token, &session).to_string();

        assert!(cookie.starts_with(&format!("session_id={}", token.encode())));
        assert!(cookie.contains("Domain=example.com"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }
}
