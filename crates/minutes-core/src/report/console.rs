use crate::model::{bar_fill, EvaluationResult, ScoreBand};
use std::fmt::Write;

const BAR_CELLS: usize = 10;

fn bar(score: i64) -> String {
    let filled = bar_fill(score) as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_CELLS - filled))
}

/// Plain-text scorecard. Scores print as stored; only the bars are clamped.
pub fn render_scorecard(eval: &EvaluationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Judge's Scorecard");
    let _ = writeln!(
        out,
        "  Overall       [{}] {:>3}/10  {}",
        bar(eval.overall_score),
        eval.overall_score,
        ScoreBand::of(eval.overall_score).as_str()
    );
    let _ = writeln!(out);

    for (name, metric) in eval.metrics() {
        let _ = writeln!(
            out,
            "  {:<13} [{}] {:>3}/10  {}",
            name.label(),
            bar(metric.score),
            metric.score,
            metric.band().as_str()
        );
        for line in metric.reasoning.lines().filter(|l| !l.trim().is_empty()) {
            let _ = writeln!(out, "      {}", line.trim());
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Verdict: {}", eval.overall_comment.trim());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metric;

    #[test]
    fn renders_unclamped_scores_with_clamped_bars() {
        let eval = EvaluationResult {
            accuracy: Metric::new(12, "Owners match.\n\nDates match."),
            completeness: Metric::new(7, "Hiring deadline missing."),
            coverage: Metric::new(-1, ""),
            structure: Metric::new(9, "Both headers present."),
            overall_score: 8,
            overall_comment: "Good.".into(),
        };
        let out = render_scorecard(&eval);
        assert!(out.contains("Accuracy      [##########]  12/10  strong"), "{out}");
        assert!(out.contains("Coverage      [----------]  -1/10  weak"), "{out}");
        assert!(out.contains("      Dates match."));
        assert!(out.contains("Overall       [########--]   8/10  strong"));
        assert!(out.ends_with("Verdict: Good.\n"));
    }
}
