use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleDoseRequest {
    /// Entry id of the form `{supplementId}:{slot}`.
    pub entry_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleDoseResponse {
    /// New membership state after the flip.
    pub taken: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseLogResponse {
    pub taken_entry_ids: Vec<String>,
}
