//! Clinical-records server API models

use crate::domain::Concept;
use serde::{Deserialize, Serialize};

/// Response of the procedure-order concept read endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptListResponse {
    #[serde(default)]
    pub results: Vec<Concept>,
}

/// Body of the concept push request
#[derive(Debug, Clone, Serialize)]
pub struct PushConceptsRequest<'a> {
    pub concepts: &'a [Concept],
}
