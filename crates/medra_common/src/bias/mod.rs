//! Dataset bias & coverage analysis engine.
//!
//! `BiasAnalyzer` orchestrates the statistics, detector, simulator, and
//! indicator modules into one memoized `AnalysisResult`. The knowledge base
//! and scoring model are read-only collaborators injected at construction;
//! the only mutable state is the result cache.

pub mod detector;
pub mod indicators;
pub mod math;
pub mod simulation;
pub mod stats;

use crate::error::AnalysisError;
use crate::knowledge::KnowledgeBase;
use crate::scoring::ScoringModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::info;

pub use detector::{UnderrepresentedDisease, UnderrepresentedSymptom};
pub use indicators::{BalanceScore, BiasIndicators};
pub use simulation::{DiseaseMetrics, SimulationConfig};
pub use stats::{
    ClassDistribution, DiseaseComplexity, Summary, SymptomCoverage, SymptomOverlap,
};

/// The complete analysis, immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub class_distribution: ClassDistribution,
    pub symptom_coverage: SymptomCoverage,
    pub underrepresented_diseases: Vec<UnderrepresentedDisease>,
    pub underrepresented_symptoms: Vec<UnderrepresentedSymptom>,
    pub per_disease_metrics: BTreeMap<String, DiseaseMetrics>,
    pub bias_indicators: BiasIndicators,
    pub disease_complexity: Vec<DiseaseComplexity>,
    pub symptom_overlap: SymptomOverlap,
}

/// Caching facade over the analysis pipeline.
///
/// The whole read-or-compute-and-store sequence runs under one lock, so
/// concurrent callers never race to build the result twice and `invalidate`
/// can never expose a half-built cache.
pub struct BiasAnalyzer {
    knowledge: Arc<KnowledgeBase>,
    scorer: Arc<dyn ScoringModel>,
    config: SimulationConfig,
    cache: Mutex<Option<Arc<AnalysisResult>>>,
}

impl BiasAnalyzer {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        scorer: Arc<dyn ScoringModel>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            knowledge,
            scorer,
            config,
            cache: Mutex::new(None),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Return the cached analysis, computing it first if needed.
    pub fn run_full_analysis(&self) -> Result<Arc<AnalysisResult>, AnalysisError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(result) = cache.as_ref() {
            return Ok(Arc::clone(result));
        }

        let start = Instant::now();
        let result = Arc::new(self.compute()?);
        info!(
            diseases = self.knowledge.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bias analysis computed"
        );
        *cache = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Drop the cached analysis. The next call recomputes from scratch.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    fn compute(&self) -> Result<AnalysisResult, AnalysisError> {
        let kb = self.knowledge.as_ref();
        if kb.is_empty() {
            return Err(AnalysisError::EmptyKnowledgeBase);
        }

        Ok(AnalysisResult {
            summary: stats::summary(kb),
            class_distribution: stats::class_distribution(kb),
            symptom_coverage: stats::symptom_coverage(kb),
            underrepresented_diseases: detector::underrepresented_diseases(kb),
            underrepresented_symptoms: detector::underrepresented_symptoms(kb),
            per_disease_metrics: simulation::simulate_per_disease_metrics(
                kb,
                self.scorer.as_ref(),
                self.config,
            )?,
            bias_indicators: indicators::bias_indicators(kb),
            disease_complexity: stats::disease_complexity(kb),
            symptom_overlap: stats::symptom_overlap(kb),
        })
    }
}
