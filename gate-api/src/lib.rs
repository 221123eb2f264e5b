mod response;

pub mod error;
pub use error::{ApiError, ApiErrorKind, Detail};

pub mod traits;
pub use traits::Validator;

pub mod auth;
pub mod users;
pub mod options;
pub mod status;

mod reply;
pub use reply::Reply;
