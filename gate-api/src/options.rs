use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, Detail};
use crate::error::OptionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOption {
    pub key: String,
    pub value: String,
}

impl Validator for UpdateOption {
    fn validate(&self) -> Result<(), ApiError> {
        if !gate_lib::options::key_valid(&self.key) {
            return Err(ApiError::from((
                OptionKind::InvalidKey,
                Detail::with_key("key")
            )));
        }

        Ok(())
    }
}
