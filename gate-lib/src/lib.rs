pub mod error;
pub mod ids;
pub mod validation;

pub mod users;
pub mod options;
pub mod sec;
