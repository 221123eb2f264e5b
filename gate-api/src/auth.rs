pub mod wechat {
    use serde::{Serialize, Deserialize};

    /// query string carried by both the login and the bind route
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CodeQuery {
        #[serde(default)]
        pub code: String,
    }
}
