//! Confusion matrix, precision/recall/F1 and Cohen's Kappa.
//!
//! Every label goes through [`SentimentLabel::index`], so `very_*` predictions
//! count as their base class.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::models::SentimentLabel;

/// One (actual, predicted) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPrediction {
    pub actual: SentimentLabel,
    pub predicted: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl LabeledPrediction {
    pub fn new(actual: SentimentLabel, predicted: SentimentLabel) -> Self {
        Self {
            actual,
            predicted,
            confidence: None,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.actual.agrees_with(self.predicted)
    }
}

/// A metric broken down by class plus its two averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    /// Unweighted mean over the three classes.
    #[serde(rename = "macro")]
    pub macro_avg: f64,
    /// Mean weighted by class support.
    pub weighted: f64,
}

impl ClassScores {
    fn from_per_class(values: [f64; 3], support: [usize; 3]) -> Self {
        let total: usize = support.iter().sum();
        let weighted = if total == 0 {
            0.0
        } else {
            values
                .iter()
                .zip(support)
                .map(|(v, s)| v * s as f64)
                .sum::<f64>()
                / total as f64
        };
        Self {
            positive: values[0],
            negative: values[1],
            neutral: values[2],
            macro_avg: values.iter().sum::<f64>() / 3.0,
            weighted,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label.index() {
            0 => self.positive,
            1 => self.negative,
            _ => self.neutral,
        }
    }
}

/// 3x3 matrix, rows = actual, columns = predicted, order positive/negative/neutral.
pub type ConfusionMatrix = [[usize; 3]; 3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: ClassScores,
    pub recall: ClassScores,
    pub f1: ClassScores,
    pub cohen_kappa: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub sample_count: usize,
    /// Mean of the confidences that were supplied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    pub processing_time_ms: u64,
}

impl ModelMetrics {
    pub fn correct(&self) -> usize {
        (0..3).map(|i| self.confusion_matrix[i][i]).sum()
    }

    pub fn support(&self) -> [usize; 3] {
        [0, 1, 2].map(|i| self.confusion_matrix[i].iter().sum())
    }
}

pub fn confusion_matrix(predictions: &[LabeledPrediction]) -> ConfusionMatrix {
    let mut matrix = [[0usize; 3]; 3];
    for p in predictions {
        matrix[p.actual.index()][p.predicted.index()] += 1;
    }
    matrix
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// `(po - pe) / (1 - pe)`; 0 when chance agreement is total.
pub fn cohen_kappa(matrix: &ConfusionMatrix) -> f64 {
    let n: usize = matrix.iter().flatten().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let observed = (0..3).map(|i| matrix[i][i]).sum::<usize>() as f64 / n;
    let expected: f64 = (0..3)
        .map(|i| {
            let row: usize = matrix[i].iter().sum();
            let col: usize = (0..3).map(|r| matrix[r][i]).sum();
            (row as f64 / n) * (col as f64 / n)
        })
        .sum();

    if (1.0 - expected).abs() < f64::EPSILON {
        0.0
    } else {
        (observed - expected) / (1.0 - expected)
    }
}

/// Compute all metrics for a list of predictions. An empty list yields zeros.
pub fn evaluate(predictions: &[LabeledPrediction]) -> ModelMetrics {
    let start = Instant::now();
    let matrix = confusion_matrix(predictions);

    let mut precision = [0.0; 3];
    let mut recall = [0.0; 3];
    let mut f1 = [0.0; 3];
    let mut support = [0usize; 3];

    for class in 0..3 {
        let tp = matrix[class][class];
        let actual_total: usize = matrix[class].iter().sum();
        let predicted_total: usize = (0..3).map(|r| matrix[r][class]).sum();

        precision[class] = ratio(tp, predicted_total);
        recall[class] = ratio(tp, actual_total);
        f1[class] = if precision[class] == 0.0 || recall[class] == 0.0 {
            0.0
        } else {
            2.0 * precision[class] * recall[class] / (precision[class] + recall[class])
        };
        support[class] = actual_total;
    }

    let correct = (0..3).map(|i| matrix[i][i]).sum();
    let confidences: Vec<f64> = predictions.iter().filter_map(|p| p.confidence).collect();
    let average_confidence = (!confidences.is_empty())
        .then(|| confidences.iter().sum::<f64>() / confidences.len() as f64);

    ModelMetrics {
        accuracy: ratio(correct, predictions.len()),
        precision: ClassScores::from_per_class(precision, support),
        recall: ClassScores::from_per_class(recall, support),
        f1: ClassScores::from_per_class(f1, support),
        cohen_kappa: cohen_kappa(&matrix),
        confusion_matrix: matrix,
        sample_count: predictions.len(),
        average_confidence,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}
