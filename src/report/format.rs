//! Formatted terminal output.
//!
//! Formatting lives in one place so the numerical code stays free of
//! presentation concerns.

use crate::domain::FitReport;
use crate::fit::PolynomialFit;

/// Format a linear fit report as a table of coefficients plus diagnostics.
pub fn format_fit_report(report: &FitReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== doasfit - linear fit ({}) ===\n", report.mode));
    let q = &report.quality;
    out.push_str(&format!(
        "Samples: {} | unknowns: {} | rank: {} | dof: {}\n",
        q.n_samples, q.n_unknowns, q.rank, q.dof
    ));
    out.push_str(&format!("Chi-square: {:.6e} | RMS: {:.6e}\n", q.chi_square, q.rms));

    out.push_str(&format!(
        "\n{:<16} {:>16} {:>16} {:>14}\n",
        "unknown", "value", "std.dev", "norm"
    ));
    for c in &report.coefficients {
        out.push_str(&format!(
            "{:<16} {:>16.6e} {:>16.6e} {:>14.6e}\n",
            truncate(&c.label, 16),
            c.value,
            c.std_dev,
            c.norm
        ));
    }

    if let Some(w) = &report.singular_values {
        out.push_str(&format!("\nSingular values: {}\n", fmt_vec(w)));
    }
    if let Some(cov) = &report.covariance {
        out.push_str("\nCovariance:\n");
        out.push_str(&fmt_matrix(cov));
    }
    if let Some(pinv) = &report.pseudo_inverse {
        out.push_str("\nPseudo-inverse:\n");
        out.push_str(&fmt_matrix(pinv));
    }

    out
}

/// Format a polynomial fit.
pub fn format_polynomial(fit: &PolynomialFit) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== doasfit - polynomial fit (order {}) ===\n", fit.order()));
    for (k, (c, v)) in fit.coefficients.iter().zip(&fit.variance).enumerate() {
        out.push_str(&format!("c{k:<3} {:>16.8e} ± {:.3e}\n", c, v.max(0.0).sqrt()));
    }
    out
}

/// Side-by-side true vs fitted coefficients for the synthetic demo.
pub fn format_demo_comparison(report: &FitReport, truth: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:<16} {:>16} {:>16} {:>10}\n",
        "unknown", "true", "fitted", "z-score"
    ));
    for (c, t) in report.coefficients.iter().zip(truth) {
        let z = if c.std_dev > 0.0 { (c.value - t) / c.std_dev } else { f64::NAN };
        out.push_str(&format!(
            "{:<16} {:>16.6e} {:>16.6e} {:>10.2}\n",
            truncate(&c.label, 16),
            t,
            c.value,
            z
        ));
    }
    out
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_matrix(rows: &[Vec<f64>]) -> String {
    let mut out = String::new();
    for row in rows {
        let parts: Vec<String> = row.iter().map(|v| format!("{v:>14.6e}")).collect();
        out.push_str(&parts.join(" "));
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).chain(std::iter::once('~')).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficient, FitQuality};
    use crate::linear::DecompositionMode;
    use chrono::Utc;

    fn report() -> FitReport {
        FitReport {
            tool: "doasfit".into(),
            generated_at: Utc::now(),
            mode: DecompositionMode::Qr,
            coefficients: vec![Coefficient {
                label: "a_very_long_absorber_name".into(),
                value: 2.0,
                std_dev: 0.5,
                norm: 1.0,
            }],
            quality: FitQuality {
                n_samples: 10,
                n_unknowns: 1,
                rank: 1,
                dof: 9,
                chi_square: 0.1,
                rms: 0.1,
            },
            singular_values: None,
            covariance: Some(vec![vec![0.25]]),
            pseudo_inverse: None,
        }
    }

    #[test]
    fn fit_report_mentions_mode_and_labels() {
        let text = format_fit_report(&report());
        assert!(text.contains("(QR)"));
        assert!(text.contains("a_very_long_abs~"));
        assert!(text.contains("Covariance:"));
        assert!(!text.contains("Pseudo-inverse:"));
    }

    #[test]
    fn demo_comparison_reports_z_score() {
        let text = format_demo_comparison(&report(), &[1.0]);
        assert!(text.contains("2.00"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("NO2", 16), "NO2");
        assert_eq!(truncate("abcdef", 4), "abc~");
    }
}
