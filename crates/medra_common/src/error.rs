//! Error types for the Medra analysis engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Knowledge base contains no diseases")]
    EmptyKnowledgeBase,

    #[error("Disease '{0}' has no symptoms")]
    NoSymptoms(String),

    #[error("Duplicate disease '{0}' in knowledge base")]
    DuplicateDisease(String),

    #[error("Non-finite weight {weight} for symptom '{symptom}' of disease '{disease}'")]
    NonFiniteWeight {
        disease: String,
        symptom: String,
        weight: f64,
    },

    #[error("Non-finite bias {bias} for disease '{disease}'")]
    NonFiniteBias { disease: String, bias: f64 },

    #[error("Scoring model failed for disease '{disease}': {source}")]
    Scorer {
        disease: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Scoring model returned probability {probability} outside [0, 1] for disease '{disease}'")]
    ProbabilityOutOfRange { disease: String, probability: f64 },

    #[error("Failed to parse knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
}
