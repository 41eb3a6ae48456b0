use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to run the prediction pipeline
///
/// `measurements` is the raw field map handed to the input normalizer as-is;
/// the normalizer (not serde) decides what is missing or non-numeric so that
/// every bad field can be reported at once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    /// Address for the best-effort outcome notification; nothing is
    /// dispatched when absent.
    #[validate(email)]
    #[serde(default)]
    #[serde(alias = "contact_email", rename = "contactEmail")]
    pub contact_email: Option<String>,
    pub measurements: serde_json::Map<String, serde_json::Value>,
}

/// Query parameters for owner-scoped listings
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerQuery {
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
}
