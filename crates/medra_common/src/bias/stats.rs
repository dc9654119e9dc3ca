//! Aggregate statistics over the knowledge base.
//!
//! Everything in this module is a pure function of the knowledge base — no
//! randomness, no scorer calls. Sections that specify an ordering are
//! emitted as vectors; every sort is stable, so equal keys keep the
//! knowledge-base authoring order.

use crate::bias::math::{max, mean, median, min, round_to, std_dev};
use crate::knowledge::{display_name, KnowledgeBase};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// High-level counts and spread of the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_diseases: usize,
    pub total_unique_symptoms: usize,
    pub total_symptom_slots: usize,
    pub avg_symptoms_per_disease: f64,
    pub median_symptoms_per_disease: i64,
    pub min_symptoms: usize,
    pub max_symptoms: usize,
    pub std_symptoms: f64,
    pub avg_bias: f64,
    pub bias_range: [f64; 2],
}

pub fn summary(kb: &KnowledgeBase) -> Summary {
    let mut all_symptoms = BTreeSet::new();
    let mut total_symptom_slots = 0;
    let mut biases = Vec::with_capacity(kb.len());

    for record in kb.iter() {
        all_symptoms.extend(record.symptoms.keys().cloned());
        total_symptom_slots += record.symptom_count();
        biases.push(record.bias);
    }

    let counts: Vec<f64> = kb.symptom_counts().iter().map(|&c| c as f64).collect();

    Summary {
        total_diseases: kb.len(),
        total_unique_symptoms: all_symptoms.len(),
        total_symptom_slots,
        avg_symptoms_per_disease: round_to(mean(&counts), 2),
        median_symptoms_per_disease: median(&counts).trunc() as i64,
        min_symptoms: min(&counts) as usize,
        max_symptoms: max(&counts) as usize,
        std_symptoms: round_to(std_dev(&counts), 2),
        avg_bias: round_to(mean(&biases), 2),
        bias_range: [round_to(min(&biases), 2), round_to(max(&biases), 2)],
    }
}

/// Weight-profile statistics for one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseDistribution {
    pub disease: String,
    pub symptom_count: usize,
    pub avg_weight: f64,
    pub max_weight: f64,
    pub min_weight: f64,
    pub weight_std: f64,
    pub total_weight: f64,
    pub bias: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDistribution {
    /// Ordered by descending symptom count.
    pub diseases: Vec<DiseaseDistribution>,
    /// symptom count → number of diseases with that count.
    pub histogram: BTreeMap<usize, usize>,
    /// max symptom count / min symptom count, denominator clamped to 1.
    pub imbalance_ratio: f64,
}

pub fn class_distribution(kb: &KnowledgeBase) -> ClassDistribution {
    let mut diseases: Vec<DiseaseDistribution> = kb
        .iter()
        .map(|record| {
            let weights = record.weights();
            DiseaseDistribution {
                disease: record.name.clone(),
                symptom_count: record.symptom_count(),
                avg_weight: round_to(mean(&weights), 3),
                max_weight: round_to(max(&weights), 3),
                min_weight: round_to(min(&weights), 3),
                weight_std: round_to(std_dev(&weights), 3),
                total_weight: round_to(weights.iter().sum(), 3),
                bias: record.bias,
            }
        })
        .collect();

    let counts: Vec<usize> = diseases.iter().map(|d| d.symptom_count).collect();
    diseases.sort_by(|a, b| b.symptom_count.cmp(&a.symptom_count));

    let mut histogram = BTreeMap::new();
    for &count in &counts {
        *histogram.entry(count).or_insert(0) += 1;
    }

    let max_count = counts.iter().copied().max().unwrap_or(0);
    let min_count = counts.iter().copied().min().unwrap_or(0);
    let imbalance_ratio = round_to(max_count as f64 / min_count.max(1) as f64, 2);

    ClassDistribution {
        diseases,
        histogram,
        imbalance_ratio,
    }
}

/// Cross-disease view of a single symptom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomCoverageEntry {
    pub symptom: String,
    pub disease_count: usize,
    pub diseases: Vec<String>,
    pub avg_weight: f64,
    pub max_weight: f64,
    pub min_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomCoverage {
    /// Ordered by descending disease count (most shared first).
    pub symptoms: Vec<SymptomCoverageEntry>,
    pub total_unique_symptoms: usize,
    pub shared_symptoms: usize,
    pub unique_to_one_disease: usize,
    pub most_shared_count: usize,
}

/// Per-symptom aggregation in first-encounter order. Shared with the
/// underrepresentation detector.
pub(crate) fn aggregate_symptoms(kb: &KnowledgeBase) -> Vec<(String, Vec<String>, Vec<f64>)> {
    let mut order: Vec<String> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut aggregated: Vec<(Vec<String>, Vec<f64>)> = Vec::new();

    for record in kb.iter() {
        for (symptom, &weight) in &record.symptoms {
            let slot = *slots.entry(symptom.clone()).or_insert_with(|| {
                order.push(symptom.clone());
                aggregated.push((Vec::new(), Vec::new()));
                aggregated.len() - 1
            });
            aggregated[slot].0.push(record.name.clone());
            aggregated[slot].1.push(weight);
        }
    }

    order
        .into_iter()
        .zip(aggregated)
        .map(|(symptom, (diseases, weights))| (symptom, diseases, weights))
        .collect()
}

pub fn symptom_coverage(kb: &KnowledgeBase) -> SymptomCoverage {
    let mut symptoms: Vec<SymptomCoverageEntry> = aggregate_symptoms(kb)
        .into_iter()
        .map(|(symptom, diseases, weights)| SymptomCoverageEntry {
            symptom,
            disease_count: diseases.len(),
            diseases,
            avg_weight: round_to(mean(&weights), 3),
            max_weight: round_to(max(&weights), 3),
            min_weight: round_to(min(&weights), 3),
        })
        .collect();

    let total_unique_symptoms = symptoms.len();
    let shared_symptoms = symptoms.iter().filter(|s| s.disease_count > 1).count();
    let unique_to_one_disease = symptoms.iter().filter(|s| s.disease_count == 1).count();
    let most_shared_count = symptoms.iter().map(|s| s.disease_count).max().unwrap_or(0);

    symptoms.sort_by(|a, b| b.disease_count.cmp(&a.disease_count));

    SymptomCoverage {
        symptoms,
        total_unique_symptoms,
        shared_symptoms,
        unique_to_one_disease,
        most_shared_count,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlappingDisease {
    pub disease: String,
    pub shared_symptoms: Vec<String>,
    pub shared_count: usize,
}

/// How entangled a disease is with the rest of the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseComplexity {
    pub disease: String,
    pub display_name: String,
    /// Sum of shared-symptom counts over every overlapping disease, so a
    /// symptom shared with three other diseases contributes 3.
    pub total_overlap_count: usize,
    /// Fraction of this disease's symptoms that no other disease lists.
    pub unique_symptom_ratio: f64,
    pub top_overlapping_diseases: Vec<OverlappingDisease>,
    pub symptom_count: usize,
}

pub fn disease_complexity(kb: &KnowledgeBase) -> Vec<DiseaseComplexity> {
    let mut complexity: Vec<DiseaseComplexity> = kb
        .iter()
        .map(|record| {
            let my_symptoms: BTreeSet<&String> = record.symptoms.keys().collect();
            let mut total_overlap_count = 0;
            let mut overlapping: Vec<OverlappingDisease> = Vec::new();

            for other in kb.iter() {
                if other.name == record.name {
                    continue;
                }
                let shared: Vec<String> = other
                    .symptoms
                    .keys()
                    .filter(|s| my_symptoms.contains(s))
                    .cloned()
                    .collect();
                if !shared.is_empty() {
                    total_overlap_count += shared.len();
                    overlapping.push(OverlappingDisease {
                        disease: other.name.clone(),
                        shared_count: shared.len(),
                        shared_symptoms: shared,
                    });
                }
            }

            overlapping.sort_by(|a, b| b.shared_count.cmp(&a.shared_count));
            overlapping.truncate(5);

            let others = kb.symptoms_of_others(&record.name);
            let exclusive = record
                .symptoms
                .keys()
                .filter(|s| !others.contains(*s))
                .count();
            let unique_symptom_ratio = if record.symptom_count() > 0 {
                round_to(exclusive as f64 / record.symptom_count() as f64, 3)
            } else {
                0.0
            };

            DiseaseComplexity {
                disease: record.name.clone(),
                display_name: display_name(&record.name),
                total_overlap_count,
                unique_symptom_ratio,
                top_overlapping_diseases: overlapping,
                symptom_count: record.symptom_count(),
            }
        })
        .collect();

    complexity.sort_by(|a, b| b.total_overlap_count.cmp(&a.total_overlap_count));
    complexity
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlapPair {
    pub disease_1: String,
    pub disease_2: String,
    pub shared_symptoms: Vec<String>,
    pub shared_count: usize,
    pub jaccard_index: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomOverlap {
    pub total_overlapping_pairs: usize,
    /// Top 20 pairs by shared count descending.
    pub top_overlapping_pairs: Vec<OverlapPair>,
    pub avg_shared_symptoms: f64,
}

pub fn symptom_overlap(kb: &KnowledgeBase) -> SymptomOverlap {
    let records: Vec<_> = kb.iter().collect();
    let mut pairs: Vec<OverlapPair> = Vec::new();

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let s1: BTreeSet<&String> = records[i].symptoms.keys().collect();
            let s2: BTreeSet<&String> = records[j].symptoms.keys().collect();
            let shared: Vec<String> = s1.intersection(&s2).map(|s| (*s).clone()).collect();
            if shared.is_empty() {
                continue;
            }
            let union_size = s1.union(&s2).count();
            pairs.push(OverlapPair {
                disease_1: records[i].name.clone(),
                disease_2: records[j].name.clone(),
                shared_count: shared.len(),
                jaccard_index: round_to(shared.len() as f64 / union_size as f64, 3),
                shared_symptoms: shared,
            });
        }
    }

    let total_overlapping_pairs = pairs.len();
    let avg_shared_symptoms = if pairs.is_empty() {
        0.0
    } else {
        let counts: Vec<f64> = pairs.iter().map(|p| p.shared_count as f64).collect();
        round_to(mean(&counts), 2)
    };

    pairs.sort_by(|a, b| b.shared_count.cmp(&a.shared_count));
    pairs.truncate(20);

    SymptomOverlap {
        total_overlapping_pairs,
        top_overlapping_pairs: pairs,
        avg_shared_symptoms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::DiseaseRecord;
    use approx::assert_relative_eq;

    fn record(name: &str, symptoms: &[(&str, f64)], bias: f64) -> DiseaseRecord {
        DiseaseRecord {
            name: name.to_string(),
            symptoms: symptoms
                .iter()
                .map(|(s, w)| (s.to_string(), *w))
                .collect(),
            bias,
        }
    }

    /// D1={fever,cough}, D2={fever,rash}, D3={cough} — the canonical
    /// coverage/overlap fixture.
    fn three_disease_kb() -> KnowledgeBase {
        KnowledgeBase::from_records(vec![
            record("d1", &[("fever", 0.9), ("cough", 0.7)], -1.0),
            record("d2", &[("fever", 0.8), ("rash", 0.6)], -2.0),
            record("d3", &[("cough", 0.5)], -3.0),
        ])
        .unwrap()
    }

    #[test]
    fn summary_counts() {
        let s = summary(&three_disease_kb());
        assert_eq!(s.total_diseases, 3);
        assert_eq!(s.total_unique_symptoms, 3);
        assert_eq!(s.total_symptom_slots, 5);
        assert_eq!(s.min_symptoms, 1);
        assert_eq!(s.max_symptoms, 2);
        assert_eq!(s.median_symptoms_per_disease, 2);
        assert_relative_eq!(s.avg_symptoms_per_disease, 1.67);
        assert_relative_eq!(s.avg_bias, -2.0);
        assert_eq!(s.bias_range, [-3.0, -1.0]);
    }

    #[test]
    fn class_distribution_orders_and_guards() {
        let dist = class_distribution(&three_disease_kb());
        // Descending symptom count, insertion order on ties.
        let names: Vec<&str> = dist.diseases.iter().map(|d| d.disease.as_str()).collect();
        assert_eq!(names, vec!["d1", "d2", "d3"]);
        assert_eq!(dist.histogram.get(&2), Some(&2));
        assert_eq!(dist.histogram.get(&1), Some(&1));
        assert_relative_eq!(dist.imbalance_ratio, 2.0);
    }

    #[test]
    fn imbalance_ratio_clamps_denominator() {
        // A single disease: max == min, ratio 1. The clamp matters for the
        // degenerate min-count-zero case, which validation already excludes,
        // but the guard must never divide by zero.
        let kb = KnowledgeBase::from_records(vec![record("only", &[("a", 1.0)], 0.0)]).unwrap();
        assert_relative_eq!(class_distribution(&kb).imbalance_ratio, 1.0);
    }

    #[test]
    fn coverage_completeness() {
        let cov = symptom_coverage(&three_disease_kb());
        let by_name: HashMap<&str, &SymptomCoverageEntry> = cov
            .symptoms
            .iter()
            .map(|e| (e.symptom.as_str(), e))
            .collect();
        assert_eq!(by_name["fever"].disease_count, 2);
        assert_eq!(by_name["cough"].disease_count, 2);
        assert_eq!(by_name["rash"].disease_count, 1);
        assert_eq!(cov.total_unique_symptoms, 3);
        assert_eq!(cov.shared_symptoms, 2);
        assert_eq!(cov.unique_to_one_disease, 1);
        assert_eq!(cov.most_shared_count, 2);
        // Most shared first.
        assert!(cov.symptoms[0].disease_count >= cov.symptoms[1].disease_count);
    }

    #[test]
    fn coverage_weight_stats() {
        let cov = symptom_coverage(&three_disease_kb());
        let fever = cov.symptoms.iter().find(|e| e.symptom == "fever").unwrap();
        assert_relative_eq!(fever.avg_weight, 0.85);
        assert_relative_eq!(fever.max_weight, 0.9);
        assert_relative_eq!(fever.min_weight, 0.8);
        assert_eq!(fever.diseases, vec!["d1".to_string(), "d2".to_string()]);
    }

    #[test]
    fn overlap_correctness() {
        let overlap = symptom_overlap(&three_disease_kb());
        assert_eq!(overlap.total_overlapping_pairs, 2);
        assert_relative_eq!(overlap.avg_shared_symptoms, 1.0);

        let pair_keys: Vec<(&str, &str)> = overlap
            .top_overlapping_pairs
            .iter()
            .map(|p| (p.disease_1.as_str(), p.disease_2.as_str()))
            .collect();
        assert!(pair_keys.contains(&("d1", "d2")));
        assert!(pair_keys.contains(&("d1", "d3")));
        // (d2, d3) share nothing and must be excluded.
        assert!(!pair_keys.contains(&("d2", "d3")));

        let d1_d2 = overlap
            .top_overlapping_pairs
            .iter()
            .find(|p| p.disease_1 == "d1" && p.disease_2 == "d2")
            .unwrap();
        assert_eq!(d1_d2.shared_symptoms, vec!["fever".to_string()]);
        // |{fever}| / |{cough, fever, rash}|
        assert_relative_eq!(d1_d2.jaccard_index, round_to(1.0 / 3.0, 3));

        let d1_d3 = overlap
            .top_overlapping_pairs
            .iter()
            .find(|p| p.disease_1 == "d1" && p.disease_2 == "d3")
            .unwrap();
        assert_eq!(d1_d3.shared_symptoms, vec!["cough".to_string()]);
        // |{cough}| / |{cough, fever}|
        assert_relative_eq!(d1_d3.jaccard_index, 0.5);
    }

    #[test]
    fn overlap_handles_disjoint_kb() {
        let kb = KnowledgeBase::from_records(vec![
            record("a", &[("x", 1.0)], 0.0),
            record("b", &[("y", 1.0)], 0.0),
        ])
        .unwrap();
        let overlap = symptom_overlap(&kb);
        assert_eq!(overlap.total_overlapping_pairs, 0);
        assert!(overlap.top_overlapping_pairs.is_empty());
        assert_relative_eq!(overlap.avg_shared_symptoms, 0.0);
    }

    #[test]
    fn complexity_counts_shared_per_disease() {
        let complexity = disease_complexity(&three_disease_kb());
        // d1 shares fever with d2 and cough with d3: total 2, ranked first.
        assert_eq!(complexity[0].disease, "d1");
        assert_eq!(complexity[0].total_overlap_count, 2);
        assert_relative_eq!(complexity[0].unique_symptom_ratio, 0.0);

        let d2 = complexity.iter().find(|c| c.disease == "d2").unwrap();
        assert_eq!(d2.total_overlap_count, 1);
        // rash is exclusive to d2.
        assert_relative_eq!(d2.unique_symptom_ratio, 0.5);

        let d3 = complexity.iter().find(|c| c.disease == "d3").unwrap();
        assert_relative_eq!(d3.unique_symptom_ratio, 0.0);
        assert_eq!(d3.top_overlapping_diseases.len(), 1);
        assert_eq!(d3.top_overlapping_diseases[0].disease, "d1");
    }

    #[test]
    fn complexity_caps_top_overlaps_at_five() {
        let mut records = vec![record(
            "hub",
            &[("s0", 1.0), ("s1", 1.0), ("s2", 1.0), ("s3", 1.0), ("s4", 1.0), ("s5", 1.0), ("s6", 1.0)],
            0.0,
        )];
        for i in 0..7 {
            let symptom = format!("s{i}");
            records.push(DiseaseRecord {
                name: format!("spoke_{i}"),
                symptoms: [(symptom, 1.0)].into_iter().collect(),
                bias: 0.0,
            });
        }
        let kb = KnowledgeBase::from_records(records).unwrap();
        let complexity = disease_complexity(&kb);
        assert_eq!(complexity[0].disease, "hub");
        assert_eq!(complexity[0].total_overlap_count, 7);
        assert_eq!(complexity[0].top_overlapping_diseases.len(), 5);
    }
}
