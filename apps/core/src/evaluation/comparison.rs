//! Side-by-side comparison of several models' predictions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

use super::metrics::{evaluate, LabeledPrediction, ModelMetrics};
use super::stats::{confidence_interval_95, two_proportion_significance, SignificanceTest};
use crate::error::EngineError;

/// Predictions of one named model over a shared test set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub name: String,
    pub predictions: Vec<LabeledPrediction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRanking {
    /// 1-based.
    pub rank: usize,
    pub name: String,
    pub metrics: ModelMetrics,
    pub accuracy_interval: Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub rankings: Vec<ModelRanking>,
    pub best_model: String,
    /// First model passed in.
    pub baseline_model: String,
    /// Best vs. baseline; absent when the baseline ranks first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance: Option<SignificanceTest>,
    pub summary: String,
}

/// Rank models by accuracy, then macro F1, and test the best against the baseline.
pub fn compare_models(models: &[ModelComparison]) -> Result<ComparisonReport, EngineError> {
    let baseline = models
        .first()
        .ok_or_else(|| EngineError::InvalidInput("No models to compare".to_string()))?;

    let mut scored: Vec<(usize, &ModelComparison, ModelMetrics)> = models
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m, evaluate(&m.predictions)))
        .collect();
    let baseline_metrics = scored[0].2.clone();

    // Stable sort keeps input order between exact ties.
    scored.sort_by(|a, b| {
        b.2.accuracy
            .partial_cmp(&a.2.accuracy)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.2.f1
                    .macro_avg
                    .partial_cmp(&a.2.f1.macro_avg)
                    .unwrap_or(Ordering::Equal)
            })
    });

    let (best_index, best, best_metrics) = &scored[0];
    let significance = (*best_index != 0).then(|| {
        two_proportion_significance(
            best_metrics.accuracy,
            baseline_metrics.accuracy,
            best_metrics.sample_count,
        )
    });

    let summary = match &significance {
        Some(test) => format!(
            "{} leads {} by {:.1} accuracy points (z = {:.2}, p = {:.4}, {})",
            best.name,
            baseline.name,
            (best_metrics.accuracy - baseline_metrics.accuracy) * 100.0,
            test.z_score,
            test.p_value,
            if test.significant {
                "significant"
            } else {
                "not significant"
            }
        ),
        None => format!("Baseline {} ranks first", baseline.name),
    };
    let best_model = best.name.clone();

    let rankings = scored
        .into_iter()
        .enumerate()
        .map(|(position, (_, model, metrics))| {
            let (lower, upper) = confidence_interval_95(metrics.accuracy, metrics.sample_count);
            ModelRanking {
                rank: position + 1,
                name: model.name.clone(),
                metrics,
                accuracy_interval: Interval { lower, upper },
            }
        })
        .collect();

    info!("Model comparison: {}", summary);

    Ok(ComparisonReport {
        rankings,
        best_model,
        baseline_model: baseline.name.clone(),
        significance,
        summary,
    })
}
