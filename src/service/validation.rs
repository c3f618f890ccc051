//! Request body validation against catalog definitions.

use crate::catalog::ResourceDef;
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Every required column must be present and non-null. Used on create.
    pub fn validate_create(
        resource: &ResourceDef,
        body: &HashMap<String, Value>,
    ) -> Result<(), AppError> {
        for col in resource.required {
            match body.get(*col) {
                None | Some(Value::Null) => {
                    return Err(AppError::Validation(format!("{} is required", col)));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
