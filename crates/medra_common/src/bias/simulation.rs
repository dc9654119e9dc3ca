//! Simulated per-disease classifier performance.
//!
//! There is no held-out test dataset, so performance is approximated by
//! sampling synthetic cases against the scoring model:
//!
//! - positive cases: random subsets of the disease's own symptoms
//! - negative cases: random symptoms drawn only from *other* diseases
//!
//! Sampling runs off an injected seed, so an unchanged knowledge base and
//! scorer always reproduce the same confusion tallies bit for bit.

use crate::bias::math::{mean, round_to};
use crate::error::AnalysisError;
use crate::knowledge::{display_name, KnowledgeBase};
use crate::scoring::ScoringModel;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of trials per disease per case polarity, and the sampling seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub runs: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { runs: 200, seed: 42 }
    }
}

/// TP/FP/TN/FN counters plus the raw probabilities observed, scoped to one
/// disease within one simulation run.
#[derive(Debug, Clone, Default)]
struct ConfusionTally {
    true_positives: usize,
    false_positives: usize,
    true_negatives: usize,
    false_negatives: usize,
    positive_probs: Vec<f64>,
    negative_probs: Vec<f64>,
}

/// Derived performance metrics for one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseMetrics {
    pub display_name: String,
    pub accuracy: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub precision: f64,
    pub f1_score: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub avg_positive_probability: f64,
    pub avg_negative_probability: f64,
    pub symptom_count: usize,
    pub bias: f64,
}

/// Run the full simulation for every disease, in knowledge-base order.
pub fn simulate_per_disease_metrics(
    kb: &KnowledgeBase,
    scorer: &dyn ScoringModel,
    config: SimulationConfig,
) -> Result<BTreeMap<String, DiseaseMetrics>, AnalysisError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut metrics = BTreeMap::new();

    for record in kb.iter() {
        let own_symptoms = record.symptom_names();
        let other_symptoms: Vec<String> = kb
            .symptoms_of_others(&record.name)
            .into_iter()
            .filter(|s| !record.symptoms.contains_key(s))
            .collect();

        let mut tally = ConfusionTally::default();

        // Positive cases: subsets of this disease's own symptoms. A disease
        // with a single symptom samples that symptom every trial.
        for _ in 0..config.runs {
            let k = rng.gen_range(1..=own_symptoms.len());
            let sample: Vec<String> = own_symptoms
                .choose_multiple(&mut rng, k)
                .cloned()
                .collect();
            let probability = score(scorer, &record.name, &sample)?;
            tally.positive_probs.push(probability);
            if probability >= 0.5 {
                tally.true_positives += 1;
            } else {
                tally.false_negatives += 1;
            }
        }

        // Negative cases: symptoms this disease does not list. With a
        // single-disease knowledge base the pool is empty and every query
        // runs with no symptoms at all.
        for _ in 0..config.runs {
            let sample: Vec<String> = if other_symptoms.is_empty() {
                Vec::new()
            } else {
                let k = rng.gen_range(1..=other_symptoms.len().min(5));
                other_symptoms
                    .choose_multiple(&mut rng, k)
                    .cloned()
                    .collect()
            };
            let probability = score(scorer, &record.name, &sample)?;
            tally.negative_probs.push(probability);
            if probability < 0.5 {
                tally.true_negatives += 1;
            } else {
                tally.false_positives += 1;
            }
        }

        debug!(
            disease = %record.name,
            tp = tally.true_positives,
            fp = tally.false_positives,
            tn = tally.true_negatives,
            fn_ = tally.false_negatives,
            "simulation tally"
        );

        metrics.insert(record.name.clone(), derive_metrics(record.name.as_str(), record.symptom_count(), record.bias, &tally));
    }

    Ok(metrics)
}

fn score(
    scorer: &dyn ScoringModel,
    disease: &str,
    symptoms: &[String],
) -> Result<f64, AnalysisError> {
    let prediction = scorer
        .predict(disease, symptoms)
        .map_err(|source| AnalysisError::Scorer {
            disease: disease.to_string(),
            source,
        })?;
    let probability = prediction.raw_probability;
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(AnalysisError::ProbabilityOutOfRange {
            disease: disease.to_string(),
            probability,
        });
    }
    Ok(probability)
}

fn derive_metrics(name: &str, symptom_count: usize, bias: f64, tally: &ConfusionTally) -> DiseaseMetrics {
    let tp = tally.true_positives as f64;
    let fp = tally.false_positives as f64;
    let tn = tally.true_negatives as f64;
    let fn_ = tally.false_negatives as f64;

    let accuracy = ratio(tp + tn, tp + fp + tn + fn_);
    let sensitivity = ratio(tp, tp + fn_);
    let specificity = ratio(tn, tn + fp);
    let precision = ratio(tp, tp + fp);
    let f1 = ratio(2.0 * precision * sensitivity, precision + sensitivity);

    DiseaseMetrics {
        display_name: display_name(name),
        accuracy: round_to(accuracy, 3),
        sensitivity: round_to(sensitivity, 3),
        specificity: round_to(specificity, 3),
        precision: round_to(precision, 3),
        f1_score: round_to(f1, 3),
        true_positives: tally.true_positives,
        false_positives: tally.false_positives,
        true_negatives: tally.true_negatives,
        false_negatives: tally.false_negatives,
        avg_positive_probability: round_to(mean(&tally.positive_probs), 3),
        avg_negative_probability: round_to(mean(&tally.negative_probs), 3),
        symptom_count,
        bias,
    }
}

/// Degenerate denominators yield 0 rather than NaN.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
