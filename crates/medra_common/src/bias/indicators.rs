//! Knowledge-base-wide bias indicators and the overall balance grade.

use crate::bias::detector::{EXTREME_BIAS_THRESHOLD, MIN_SYMPTOMS_THRESHOLD};
use crate::bias::math::{gini_coefficient, max, mean, min, round_to, std_dev};
use crate::knowledge::KnowledgeBase;
use serde::{Deserialize, Serialize};

/// Composite 0–100 balance metric. Higher = more balanced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceScore {
    pub overall: f64,
    pub symptom_count_balance: f64,
    pub bias_balance: f64,
    pub grade: char,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiasIndicators {
    /// Inequality of the per-disease symptom counts, in [0, 1].
    pub gini_coefficient: f64,
    pub coefficient_of_variation: f64,
    pub symptom_count_range: [usize; 2],
    pub weight_average_range: [f64; 2],
    pub bias_range: [f64; 2],
    pub bias_std: f64,
    pub diseases_with_few_symptoms: usize,
    pub diseases_with_extreme_bias: usize,
    pub overall_balance_score: BalanceScore,
}

pub fn bias_indicators(kb: &KnowledgeBase) -> BiasIndicators {
    let mut symptom_counts = Vec::with_capacity(kb.len());
    let mut weight_averages = Vec::with_capacity(kb.len());
    let mut biases = Vec::with_capacity(kb.len());

    for record in kb.iter() {
        let weights = record.weights();
        symptom_counts.push(weights.len() as f64);
        weight_averages.push(mean(&weights));
        biases.push(record.bias);
    }

    let count_mean = mean(&symptom_counts);
    let cv = if count_mean > 0.0 {
        std_dev(&symptom_counts) / count_mean
    } else {
        0.0
    };

    BiasIndicators {
        gini_coefficient: round_to(gini_coefficient(&symptom_counts), 4),
        coefficient_of_variation: round_to(cv, 4),
        symptom_count_range: [min(&symptom_counts) as usize, max(&symptom_counts) as usize],
        weight_average_range: [
            round_to(min(&weight_averages), 3),
            round_to(max(&weight_averages), 3),
        ],
        bias_range: [round_to(min(&biases), 2), round_to(max(&biases), 2)],
        bias_std: round_to(std_dev(&biases), 3),
        diseases_with_few_symptoms: symptom_counts
            .iter()
            .filter(|&&c| (c as usize) < MIN_SYMPTOMS_THRESHOLD)
            .count(),
        diseases_with_extreme_bias: biases
            .iter()
            .filter(|&&b| b <= EXTREME_BIAS_THRESHOLD)
            .count(),
        overall_balance_score: balance_score(&symptom_counts, &biases),
    }
}

/// 0.6 × symptom-count balance + 0.4 × bias balance, graded A–D.
fn balance_score(counts: &[f64], biases: &[f64]) -> BalanceScore {
    let count_mean = mean(counts);
    let cv = if count_mean > 0.0 {
        std_dev(counts) / count_mean
    } else {
        1.0
    };
    let count_score = (100.0 - cv * 100.0).max(0.0);
    let bias_score = (100.0 - std_dev(biases) * 50.0).max(0.0);
    let overall = round_to(count_score * 0.6 + bias_score * 0.4, 1);

    BalanceScore {
        overall,
        symptom_count_balance: round_to(count_score, 1),
        bias_balance: round_to(bias_score, 1),
        grade: letter_grade(overall),
    }
}

/// Inclusive lower bounds: 80 → A, 65 → B, 50 → C, below → D.
pub(crate) fn letter_grade(overall: f64) -> char {
    if overall >= 80.0 {
        'A'
    } else if overall >= 65.0 {
        'B'
    } else if overall >= 50.0 {
        'C'
    } else {
        'D'
    }
}
