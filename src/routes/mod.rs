use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod deployments;
pub mod health_check;

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = "an error occurred in the api")]
    pub error: String,
}
