pub mod auth;
pub mod category;
pub mod course;
pub mod lecture;
pub mod order;
pub mod review;
pub mod section;
pub mod user;

use uuid::Uuid;

use crate::error::MarketplaceError;

/// Trimmed value of a required text field.
pub fn required(
    value: Option<String>,
    field: &'static str,
) -> Result<String, MarketplaceError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(MarketplaceError::MissingField(field))
}

/// Trimmed value of an optional text field; blank counts as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Identifier sent as a body field.
pub fn required_id(value: Option<String>, field: &'static str) -> Result<Uuid, MarketplaceError> {
    required(value, field)?
        .parse()
        .map_err(|_| MarketplaceError::InvalidId(field))
}

/// Identifier sent as an optional body field; blank counts as absent.
pub fn optional_id(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<Uuid>, MarketplaceError> {
    optional(value)
        .map(|v| v.parse().map_err(|_| MarketplaceError::InvalidId(field)))
        .transpose()
}
