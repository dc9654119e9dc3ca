//! Scoring collaborator boundary.
//!
//! The analysis engine treats the predictive model as opaque: anything that
//! can turn a (disease, symptom subset) query into a probability works. The
//! simulator requires determinism — the same query must always yield the
//! same probability — so implementations must be free of hidden randomness.

use crate::knowledge::KnowledgeBase;
use std::sync::Arc;

/// One scored query.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Probability in [0, 1] that the queried disease matches the symptoms.
    pub raw_probability: f64,
}

/// A predictive model queried by the performance simulator.
///
/// `symptoms` may be empty (a knowledge base with a single disease produces
/// only empty negative-case samples).
pub trait ScoringModel: Send + Sync {
    fn predict(&self, disease: &str, symptoms: &[String]) -> anyhow::Result<Prediction>;
}

/// Default scoring model: sigmoid of the summed weights of the reported
/// symptoms that the disease actually lists, plus the disease bias.
///
/// Unknown diseases and symptoms contribute nothing; an empty symptom list
/// scores sigmoid(bias) alone.
pub struct LogisticScorer {
    knowledge: Arc<KnowledgeBase>,
}

impl LogisticScorer {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

impl ScoringModel for LogisticScorer {
    fn predict(&self, disease: &str, symptoms: &[String]) -> anyhow::Result<Prediction> {
        let record = self
            .knowledge
            .get(disease)
            .ok_or_else(|| anyhow::anyhow!("unknown disease '{disease}'"))?;

        let mut evidence = record.bias;
        for symptom in symptoms {
            if let Some(weight) = record.symptoms.get(symptom) {
                evidence += weight;
            }
        }

        Ok(Prediction {
            raw_probability: sigmoid(evidence),
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
