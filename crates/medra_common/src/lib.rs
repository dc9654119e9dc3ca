//! Medra Common - Dataset bias & coverage analysis engine.
//!
//! Inspects a hand-authored disease → symptom weighted knowledge base and
//! produces quantitative diagnostics: class imbalance, symptom coverage,
//! underrepresentation flags, simulated per-disease classifier performance,
//! and inequality/balance indicators. The predictive model is an injected
//! collaborator; the engine never mutates the knowledge base.

pub mod bias;
pub mod error;
pub mod knowledge;
pub mod scoring;

pub use bias::{AnalysisResult, BiasAnalyzer, SimulationConfig};
pub use error::AnalysisError;
pub use knowledge::{DiseaseRecord, KnowledgeBase};
pub use scoring::{LogisticScorer, Prediction, ScoringModel};
