//! Read-only knowledge base of weighted disease → symptom profiles.
//!
//! The knowledge base is hand-authored data: each disease carries a mapping
//! of symptom identifiers to weights plus a scalar bias interpreted by the
//! scoring model. The engine never mutates it; validation happens once at
//! construction so the analysis code can assume every record is well-formed.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Weighted symptom profile for one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRecord {
    /// Unique identifier, e.g. `"chronic_kidney_disease"`.
    pub name: String,
    /// Symptom identifier → weight. Non-empty, all weights finite.
    pub symptoms: BTreeMap<String, f64>,
    /// Scalar offset interpreted by the scoring model. May be negative.
    pub bias: f64,
}

impl DiseaseRecord {
    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    /// Symptom identifiers in deterministic (sorted) order.
    pub fn symptom_names(&self) -> Vec<String> {
        self.symptoms.keys().cloned().collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.symptoms.values().copied().collect()
    }
}

/// Insertion-ordered, validated collection of disease records.
///
/// Ordering matters: report sections break metric ties by the order diseases
/// were authored in, so records are kept in a `Vec` rather than a map.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    records: Vec<DiseaseRecord>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// Build a knowledge base, rejecting records that would poison the
    /// statistics downstream (empty set, empty symptom map, NaN/infinite
    /// weights or biases, duplicate names).
    pub fn from_records(records: Vec<DiseaseRecord>) -> Result<Self, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyKnowledgeBase);
        }

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.name.clone(), i).is_some() {
                return Err(AnalysisError::DuplicateDisease(record.name.clone()));
            }
            if record.symptoms.is_empty() {
                return Err(AnalysisError::NoSymptoms(record.name.clone()));
            }
            for (symptom, &weight) in &record.symptoms {
                if !weight.is_finite() {
                    return Err(AnalysisError::NonFiniteWeight {
                        disease: record.name.clone(),
                        symptom: symptom.clone(),
                        weight,
                    });
                }
            }
            if !record.bias.is_finite() {
                return Err(AnalysisError::NonFiniteBias {
                    disease: record.name.clone(),
                    bias: record.bias,
                });
            }
        }

        Ok(Self { records, index })
    }

    /// Parse the JSON array form: `[{"name": …, "symptoms": {…}, "bias": …}, …]`.
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let records: Vec<DiseaseRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DiseaseRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Records in insertion (authoring) order.
    pub fn iter(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.records.iter()
    }

    /// Per-disease symptom counts, in insertion order.
    pub fn symptom_counts(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.symptoms.len()).collect()
    }

    /// Union of all symptoms across every *other* disease.
    pub fn symptoms_of_others(&self, exclude: &str) -> BTreeSet<String> {
        let mut symptoms = BTreeSet::new();
        for record in &self.records {
            if record.name != exclude {
                symptoms.extend(record.symptoms.keys().cloned());
            }
        }
        symptoms
    }
}

/// Turn a snake_case identifier into a display name, e.g.
/// `"chronic_kidney_disease"` → `"Chronic Kidney Disease"`.
pub fn display_name(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
