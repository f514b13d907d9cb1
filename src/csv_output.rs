//! CSV output for the effect-size table and the design-matrix export

use crate::analysis::AnalysisReport;
use crate::design::DesignRow;

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn stat_field(value: Option<f32>) -> String {
    // missing estimates stay empty cells, never 0
    value.map(|v| format!("{}", v)).unwrap_or_default()
}

/// Render the group table as CSV
///
/// Column set follows the families the run computed; missing estimates are
/// empty fields.
pub fn to_csv(report: &AnalysisReport) -> String {
    let mut headers = vec!["participant", "condition", "item_type"];
    if report.options.smd {
        headers.extend(["smd", "baseline_sd", "imputed"]);
    }
    if report.options.pmg {
        headers.push("pmg");
    }
    if report.options.tau {
        headers.push("tau");
    }
    if report.options.compare {
        headers.extend(["t", "p"]);
    }

    let mut out = headers.join(",");
    out.push('\n');

    for row in &report.groups {
        let mut fields = vec![
            escape_field(&row.group.participant),
            row.group.condition.as_str().to_string(),
            row.group.item_type.as_str().to_string(),
        ];
        if report.options.smd {
            let (estimate, sd, imputed) = match &row.smd {
                Some(smd) => (smd.estimate, smd.baseline_sd, smd.imputed),
                None => (None, None, false),
            };
            fields.push(stat_field(estimate));
            fields.push(stat_field(sd));
            fields.push(if imputed { "true" } else { "false" }.to_string());
        }
        if report.options.pmg {
            fields.push(stat_field(row.pmg));
        }
        if report.options.tau {
            fields.push(stat_field(row.tau));
        }
        if report.options.compare {
            let (t, p) = match &row.comparison {
                Some(cmp) => (Some(cmp.statistic), Some(cmp.pvalue)),
                None => (None, None),
            };
            fields.push(stat_field(t));
            fields.push(stat_field(p));
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Render the hierarchical-model design matrix as CSV
pub fn design_to_csv(rows: &[DesignRow]) -> String {
    let mut out = String::from(
        "participant,item,session,response,baseline_slope,level_change,slope_change\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape_field(&row.participant),
            escape_field(&row.item),
            row.session,
            row.response,
            row.baseline_slope,
            row.level_change,
            row.slope_change
        ));
    }
    out
}
