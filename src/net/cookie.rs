use axum::http::HeaderValue;
use axum::http::header::{HeaderMap, COOKIE, SET_COOKIE};
use axum::response::{IntoResponseParts, ResponseParts};
use chrono::{DateTime, Utc};

use crate::net::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetCookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        SetCookie {
            name: name.into(),
            value: value.into(),
            expires: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_path<P>(mut self, path: P) -> Self
    where
        P: Into<String>
    {
        self.path = Some(path.into());
        self
    }

    pub fn set_domain<D>(&mut self, domain: D)
    where
        D: Into<String>
    {
        self.domain = Some(domain.into());
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
        HeaderValue::try_from(self.to_string())
    }
}

impl std::fmt::Display for SetCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }

        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }

        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }

        if self.secure {
            f.write_str("; Secure")?;
        }

        if self.http_only {
            f.write_str("; HttpOnly")?;
        }

        if let Some(same_site) = &self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }

        Ok(())
    }
}

impl IntoResponseParts for SetCookie {
    type Error = error::Error;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().append(SET_COOKIE, self.to_header_value()?);

        Ok(res)
    }
}

/// value of the first cookie with the given name across every `cookie`
/// header in the request
pub fn find<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, axum::http::header::ToStrError> {
    for header in headers.get_all(COOKIE) {
        for pair in header.to_str()?.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Ok(Some(value));
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn set_cookie_attributes() {
        let expires = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut cookie = SetCookie::new("session_id", "abc")
            .with_expires(expires)
            .with_path("/")
            .with_http_only(true)
            .with_secure(true)
            .with_same_site(SameSite::Strict);

        cookie.set_domain("example.com");

        assert_eq!(
            cookie.to_string(),
            "session_id=abc; Expires=Tue, 02 Jan 2024 03:04:05 GMT; Domain=example.com; Path=/; Secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn find_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(COOKIE, HeaderValue::from_static("session_id=token==; other=1"));

        assert_eq!(find(&headers, "session_id").unwrap(), Some("token=="));
        assert_eq!(find(&headers, "lang").unwrap(), Some("en"));
        assert_eq!(find(&headers, "missing").unwrap(), None);
    }
}
