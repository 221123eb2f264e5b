pub mod error;
pub mod cookie;
pub mod layer;
