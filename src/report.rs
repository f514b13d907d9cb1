//! Text table rendering for the group effect-size report

use crate::analysis::AnalysisReport;
use std::fmt::Write;

fn fmt_stat(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "NA".to_string(),
    }
}

/// Render the report as a fixed-width text table
///
/// Missing estimates print as NA, visibly distinct from 0. Column set
/// follows the families the run computed.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut header = format!("{:<12} {:<9} {:<9}", "participant", "condition", "item_type");
    let mut rule = format!("{:-<12} {:-<9} {:-<9}", "", "", "");
    if report.options.smd {
        write!(header, " {:>9} {:>9} {:>8}", "smd", "base_sd", "imputed").ok();
        write!(rule, " {:->9} {:->9} {:->8}", "", "", "").ok();
    }
    if report.options.pmg {
        write!(header, " {:>9}", "pmg").ok();
        write!(rule, " {:->9}", "").ok();
    }
    if report.options.tau {
        write!(header, " {:>9}", "tau").ok();
        write!(rule, " {:->9}", "").ok();
    }
    if report.options.compare {
        write!(header, " {:>9} {:>9}", "t", "p").ok();
        write!(rule, " {:->9} {:->9}", "", "").ok();
    }

    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in &report.groups {
        let mut line = format!(
            "{:<12} {:<9} {:<9}",
            row.group.participant,
            row.group.condition.as_str(),
            row.group.item_type.as_str()
        );
        if report.options.smd {
            let (estimate, sd, imputed) = match &row.smd {
                Some(smd) => (smd.estimate, smd.baseline_sd, smd.imputed),
                None => (None, None, false),
            };
            write!(
                line,
                " {:>9} {:>9} {:>8}",
                fmt_stat(estimate),
                fmt_stat(sd),
                if imputed { "yes" } else { "no" }
            )
            .ok();
        }
        if report.options.pmg {
            write!(line, " {:>9}", fmt_stat(row.pmg)).ok();
        }
        if report.options.tau {
            write!(line, " {:>9}", fmt_stat(row.tau)).ok();
        }
        if report.options.compare {
            let (t, p) = match &row.comparison {
                Some(cmp) => (Some(cmp.statistic), Some(cmp.pvalue)),
                None => (None, None),
            };
            write!(line, " {:>9} {:>9}", fmt_stat(t), fmt_stat(p)).ok();
        }
        out.push_str(&line);
        out.push('\n');
    }

    let imputed = report
        .groups
        .iter()
        .filter(|g| g.smd.as_ref().is_some_and(|s| s.imputed))
        .count();
    out.push_str(&rule);
    out.push('\n');
    write!(
        out,
        "{} groups, {} imputed, {} observations\n",
        report.n_groups, imputed, report.n_observations
    )
    .ok();
    out
}
