//! Evaluation Tests
//!
//! Metric invariants, the erf approximation, model comparison and dataset reports.

use crate::config::EngineConfig;
use crate::engine::SentimentEngine;
use crate::evaluation::{compare_models, erf, evaluate, LabeledPrediction, ModelComparison};
use crate::models::{AnalysisMethod, SentimentLabel, TrainingExample};

const LABELS: [SentimentLabel; 3] = SentimentLabel::CLASSES;

#[cfg(test)]
mod metric_invariant_tests {
    use super::*;

    #[test]
    fn test_kappa_is_one_for_perfect_predictions() {
        let predictions: Vec<LabeledPrediction> = (0..300)
            .map(|i| LabeledPrediction::new(LABELS[i % 3], LABELS[i % 3]))
            .collect();
        let metrics = evaluate(&predictions);
        assert!((metrics.cohen_kappa - 1.0).abs() < 1e-9);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn test_kappa_is_zero_for_independent_predictions() {
        // Every (actual, predicted) pair occurs equally often.
        let predictions: Vec<LabeledPrediction> = (0..9000)
            .map(|i| LabeledPrediction::new(LABELS[i % 3], LABELS[(i / 3) % 3]))
            .collect();
        let metrics = evaluate(&predictions);
        assert!(metrics.cohen_kappa.abs() < 1e-9, "kappa {}", metrics.cohen_kappa);
        assert!((metrics.accuracy - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_confusion_matrix_sums() {
        let predictions: Vec<LabeledPrediction> = (0..97)
            .map(|i| LabeledPrediction::new(LABELS[(i * 7) % 3], LABELS[(i * 5 + 1) % 3]))
            .collect();
        let metrics = evaluate(&predictions);

        let total: usize = metrics.confusion_matrix.iter().flatten().sum();
        assert_eq!(total, 97);
        for (class, label) in LABELS.iter().enumerate() {
            let support = predictions.iter().filter(|p| p.actual == *label).count();
            assert_eq!(metrics.confusion_matrix[class].iter().sum::<usize>(), support);
        }
    }

    #[test]
    fn test_normalization_in_every_metric() {
        let plain = evaluate(&[
            LabeledPrediction::new(SentimentLabel::Positive, SentimentLabel::Positive),
            LabeledPrediction::new(SentimentLabel::Negative, SentimentLabel::Neutral),
        ]);
        let strong = evaluate(&[
            LabeledPrediction::new(SentimentLabel::VeryPositive, SentimentLabel::Positive),
            LabeledPrediction::new(SentimentLabel::Negative, SentimentLabel::Neutral),
        ]);
        assert_eq!(plain.confusion_matrix, strong.confusion_matrix);
        assert_eq!(plain.f1, strong.f1);
        assert_eq!(plain.cohen_kappa, strong.cohen_kappa);
    }

    #[test]
    fn test_erf_properties() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(f64::INFINITY) - 1.0).abs() < 1e-6);
        assert!((erf(6.0) - 1.0).abs() < 1e-6);
        let mut x = -4.0;
        while x <= 4.0 {
            assert!((erf(-x) + erf(x)).abs() < 1e-6);
            x += 0.25;
        }
    }
}

#[cfg(test)]
mod comparison_tests {
    use super::*;

    fn model(name: &str, wrong_every: usize) -> ModelComparison {
        let predictions = (0..120)
            .map(|i| {
                let actual = LABELS[i % 3];
                let predicted = if wrong_every > 0 && i % wrong_every == 0 {
                    LABELS[(i + 1) % 3]
                } else {
                    actual
                };
                LabeledPrediction::new(actual, predicted)
            })
            .collect();
        ModelComparison {
            name: name.to_string(),
            predictions,
        }
    }

    #[test]
    fn test_rankings_are_sorted() {
        let report = compare_models(&[model("rule", 4), model("naive", 2), model("hybrid", 10)])
            .unwrap();
        let accuracies: Vec<f64> = report.rankings.iter().map(|r| r.metrics.accuracy).collect();
        assert!(accuracies.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.best_model, "hybrid");
        assert!(report.significance.is_some());

        for ranking in &report.rankings {
            assert!(ranking.accuracy_interval.lower <= ranking.metrics.accuracy);
            assert!(ranking.accuracy_interval.upper >= ranking.metrics.accuracy);
        }
    }

    #[test]
    fn test_report_serializes() {
        let report = compare_models(&[model("rule", 3), model("hybrid", 0)]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bestModel"], "hybrid");
        assert!(json["significance"]["pValue"].is_number());
    }
}

#[cfg(test)]
mod dataset_report_tests {
    use super::*;

    fn dataset() -> Vec<TrainingExample> {
        vec![
            TrainingExample::new("I love this phone", SentimentLabel::Positive),
            TrainingExample::new("excellent camera and great screen", SentimentLabel::Positive),
            TrainingExample::new("terrible battery, it crashed twice", SentimentLabel::Negative),
            TrainingExample::new("I hate the awful support", SentimentLabel::Negative),
            TrainingExample::new("the box arrived on monday", SentimentLabel::Neutral),
            TrainingExample::new("it has a blue cover", SentimentLabel::Neutral),
        ]
    }

    #[test]
    fn test_evaluate_dataset_report() {
        let engine = SentimentEngine::new(EngineConfig::default()).unwrap();
        engine.train(&dataset()).unwrap();

        let report = engine.evaluate_dataset(&dataset()).unwrap();
        assert_eq!(report.overall.total, 6);
        assert_eq!(report.detailed_results.len(), 6);
        assert_eq!(report.overall.correct, report.by_method.hybrid.correct);
        assert_eq!(
            report.confusion_matrix.iter().flatten().sum::<usize>(),
            6
        );
        assert!(report.overall.accuracy >= 0.5);
        assert!((0.0..=1.0).contains(&report.insights.disagreement_rate));
        assert!(report.insights.average_confidence > 0.0);
        assert!(matches!(
            report.insights.strongest_method,
            AnalysisMethod::Rule | AnalysisMethod::Naive | AnalysisMethod::Hybrid
        ));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["byMethod"]["naive"]["metrics"]["cohenKappa"].is_number());
        assert!(json["detailedResults"][0]["ruleLabel"].is_string());
        assert!(json["reportId"].is_string());
    }
}
