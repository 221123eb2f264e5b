use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};

use crate::response::{serialize_json, error_json};

/// the envelope every route answers with
#[derive(Debug, Serialize, Deserialize)]
pub struct Reply<T> {
    success: bool,
    message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> Reply<T> {
    pub fn new(data: T) -> Self {
        Reply {
            success: true,
            message: String::new(),
            kind: None,
            data: Some(data),
        }
    }

    pub fn failure<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Reply {
            success: false,
            message: message.into(),
            kind: None,
            data: None,
        }
    }

    pub fn with_message<M>(mut self, message: M) -> Self
    where
        M: Into<String>
    {
        self.message = message.into();
        self
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<String>
    {
        self.kind = Some(kind.into());
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl Reply<()> {
    pub fn empty() -> Self {
        Reply {
            success: true,
            message: String::new(),
            kind: None,
            data: None,
        }
    }
}

impl<T> IntoResponse for Reply<T>
where
    T: Serialize
{
    fn into_response(self) -> Response {
        match serialize_json(StatusCode::OK, &self) {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("Reply<T> serialization error {:?}", err);
                error_json()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_reply_has_no_data() {
        let json = serde_json::to_value(Reply::empty()).unwrap();

        assert_eq!(json, serde_json::json!({"success": true, "message": ""}));
    }

    #[test]
    fn failure_reply_shape() {
        let reply: Reply<()> = Reply::failure("已被封禁").with_kind("AccountDisabled");
        let json = serde_json::to_value(reply).unwrap();

        assert_eq!(json, serde_json::json!({
            "success": false,
            "message": "已被封禁",
            "kind": "AccountDisabled"
        }));
    }
}
