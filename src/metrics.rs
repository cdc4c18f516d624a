//! Classification metrics: accuracy, confusion matrix, per-class report.

use crate::dataset::N_CLASSES;

/// Fraction of predictions matching their targets.
///
/// Returns 0.0 for empty input.
#[must_use]
pub fn accuracy_score(predictions: &[u8], targets: &[u8]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / predictions.len() as f64
}

/// Row-per-true-class, column-per-predicted-class confusion matrix.
#[must_use]
pub fn confusion_matrix(predictions: &[u8], targets: &[u8]) -> [[usize; N_CLASSES]; N_CLASSES] {
    let mut matrix = [[0usize; N_CLASSES]; N_CLASSES];
    for (&p, &t) in predictions.iter().zip(targets.iter()) {
        matrix[usize::from(t)][usize::from(p)] += 1;
    }
    matrix
}

/// Precision, recall, f1 and support for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/f1 derived from the confusion matrix.
///
/// Classes with no predicted (or no true) samples report 0.0 for the
/// affected ratio rather than NaN.
#[must_use]
pub fn classification_report(predictions: &[u8], targets: &[u8]) -> [ClassReport; N_CLASSES] {
    let matrix = confusion_matrix(predictions, targets);
    let mut reports = [ClassReport {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
        support: 0,
    }; N_CLASSES];

    for class in 0..N_CLASSES {
        let true_positive = matrix[class][class];
        let predicted: usize = (0..N_CLASSES).map(|t| matrix[t][class]).sum();
        let actual: usize = matrix[class].iter().sum();

        let precision = if predicted == 0 {
            0.0
        } else {
            true_positive as f64 / predicted as f64
        };
        let recall = if actual == 0 {
            0.0
        } else {
            true_positive as f64 / actual as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        reports[class] = ClassReport {
            precision,
            recall,
            f1,
            support: actual,
        };
    }

    reports
}

/// Render the report in the usual tabular form.
#[must_use]
pub fn format_report(reports: &[ClassReport; N_CLASSES], class_names: &[&str; N_CLASSES]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>9} {:>9} {:>9} {:>9}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    for (name, report) in class_names.iter().zip(reports.iter()) {
        out.push_str(&format!(
            "{:<12} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name, report.precision, report.recall, report.f1, report.support
        ));
    }
    out
}

/// Render the confusion matrix, one row per true class.
#[must_use]
pub fn format_confusion_matrix(matrix: &[[usize; N_CLASSES]; N_CLASSES]) -> String {
    let mut out = String::new();
    for row in matrix {
        out.push('[');
        for (col, count) in row.iter().enumerate() {
            if col > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{count:>3}"));
        }
        out.push_str("]\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_perfect() {
        assert_eq!(accuracy_score(&[0, 1, 2], &[0, 1, 2]), 1.0);
    }

    #[test]
    fn test_accuracy_partial() {
        let acc = accuracy_score(&[0, 1, 2, 2], &[0, 1, 1, 1]);
        assert!((acc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_empty() {
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix_diagonal() {
        let matrix = confusion_matrix(&[0, 1, 2, 0], &[0, 1, 2, 0]);
        assert_eq!(matrix[0][0], 2);
        assert_eq!(matrix[1][1], 1);
        assert_eq!(matrix[2][2], 1);
        assert_eq!(matrix[0][1], 0);
    }

    #[test]
    fn test_confusion_matrix_off_diagonal() {
        // True class 1 predicted as 2.
        let matrix = confusion_matrix(&[2], &[1]);
        assert_eq!(matrix[1][2], 1);
        assert_eq!(matrix[2][1], 0);
    }

    #[test]
    fn test_report_perfect_predictions() {
        let reports = classification_report(&[0, 0, 1, 1, 2, 2], &[0, 0, 1, 1, 2, 2]);
        for report in &reports {
            assert_eq!(report.precision, 1.0);
            assert_eq!(report.recall, 1.0);
            assert_eq!(report.f1, 1.0);
            assert_eq!(report.support, 2);
        }
    }

    #[test]
    fn test_report_absent_class_no_nan() {
        // Class 2 never appears in targets or predictions.
        let reports = classification_report(&[0, 1], &[0, 1]);
        assert_eq!(reports[2].precision, 0.0);
        assert_eq!(reports[2].recall, 0.0);
        assert_eq!(reports[2].f1, 0.0);
        assert_eq!(reports[2].support, 0);
    }

    #[test]
    fn test_format_report_contains_names() {
        let reports = classification_report(&[0, 1, 2], &[0, 1, 2]);
        let text = format_report(&reports, &["setosa", "versicolor", "virginica"]);
        assert!(text.contains("setosa"));
        assert!(text.contains("precision"));
    }

    #[test]
    fn test_format_confusion_matrix_rows() {
        let matrix = confusion_matrix(&[0, 1, 2], &[0, 1, 2]);
        let text = format_confusion_matrix(&matrix);
        assert_eq!(text.lines().count(), 3);
    }
}
