//! Rule-based flagging of underrepresented diseases and symptoms.

use crate::bias::math::{mean, round_to};
use crate::bias::stats::aggregate_symptoms;
use crate::knowledge::{display_name, KnowledgeBase};
use serde::{Deserialize, Serialize};

/// Diseases with fewer symptoms than this are flagged.
pub const MIN_SYMPTOMS_THRESHOLD: usize = 4;
/// Mean weights below this are considered weak.
pub const LOW_WEIGHT_THRESHOLD: f64 = 0.65;
/// Biases at or below this are considered extreme.
pub const EXTREME_BIAS_THRESHOLD: f64 = -4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnderrepresentedDisease {
    pub disease: String,
    pub display_name: String,
    pub symptom_count: usize,
    pub avg_weight: f64,
    pub bias: f64,
    pub reasons: Vec<String>,
    pub severity: Severity,
}

/// Flag diseases with too few symptoms, weak weights, or extreme bias.
/// Ordered high severity first, then ascending symptom count.
pub fn underrepresented_diseases(kb: &KnowledgeBase) -> Vec<UnderrepresentedDisease> {
    let counts: Vec<f64> = kb.symptom_counts().iter().map(|&c| c as f64).collect();
    let avg_count = mean(&counts);

    let mut flagged: Vec<UnderrepresentedDisease> = Vec::new();
    for record in kb.iter() {
        let mut reasons = Vec::new();
        let count = record.symptom_count();
        let weights = record.weights();
        let avg_weight = mean(&weights);

        if count < MIN_SYMPTOMS_THRESHOLD {
            reasons.push(format!("Very few symptoms ({count})"));
        }
        if (count as f64) < avg_count * 0.6 {
            reasons.push(format!(
                "Below 60% of average symptom count ({count} vs avg {avg_count:.1})"
            ));
        }
        if avg_weight < LOW_WEIGHT_THRESHOLD {
            reasons.push(format!("Low average weight ({avg_weight:.3})"));
        }
        if record.bias <= EXTREME_BIAS_THRESHOLD {
            reasons.push(format!(
                "Very strong negative bias ({}), harder to diagnose",
                record.bias
            ));
        }

        if !reasons.is_empty() {
            let severity = if reasons.len() >= 2 {
                Severity::High
            } else {
                Severity::Medium
            };
            flagged.push(UnderrepresentedDisease {
                disease: record.name.clone(),
                display_name: display_name(&record.name),
                symptom_count: count,
                avg_weight: round_to(avg_weight, 3),
                bias: record.bias,
                reasons,
                severity,
            });
        }
    }

    flagged.sort_by(|a, b| {
        let rank = |s: Severity| if s == Severity::High { 0 } else { 1 };
        rank(a.severity)
            .cmp(&rank(b.severity))
            .then(a.symptom_count.cmp(&b.symptom_count))
    });
    flagged
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnderrepresentedSymptom {
    pub symptom: String,
    pub display_name: String,
    pub disease_count: usize,
    pub diseases: Vec<String>,
    pub avg_weight: f64,
    pub reasons: Vec<String>,
}

/// Flag symptoms that appear in a single disease or carry a weak mean
/// weight. Ordered by ascending disease count, then ascending mean weight.
pub fn underrepresented_symptoms(kb: &KnowledgeBase) -> Vec<UnderrepresentedSymptom> {
    let mut flagged: Vec<UnderrepresentedSymptom> = Vec::new();

    for (symptom, diseases, weights) in aggregate_symptoms(kb) {
        let mut reasons = Vec::new();

        if diseases.len() == 1 {
            reasons.push(format!("Unique to only one disease ({})", diseases[0]));
        }
        let avg_weight = mean(&weights);
        if avg_weight < LOW_WEIGHT_THRESHOLD {
            reasons.push(format!("Low average weight ({avg_weight:.3})"));
        }

        if !reasons.is_empty() {
            flagged.push(UnderrepresentedSymptom {
                display_name: display_name(&symptom),
                symptom,
                disease_count: diseases.len(),
                diseases,
                avg_weight: round_to(avg_weight, 3),
                reasons,
            });
        }
    }

    flagged.sort_by(|a, b| {
        a.disease_count
            .cmp(&b.disease_count)
            .then(a.avg_weight.total_cmp(&b.avg_weight))
    });
    flagged
}
