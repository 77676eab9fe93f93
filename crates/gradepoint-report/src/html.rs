//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use gradepoint_core::engine::{TermReport, TranscriptAnalysis};
use gradepoint_core::model::display_name;
use gradepoint_core::numeric::{fmt_credits, fmt_gpa};
use gradepoint_core::report::TranscriptReport;
use gradepoint_core::resolver::RetakeGroup;
use gradepoint_core::selector::select_best;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a transcript report.
pub fn generate_html(report: &TranscriptReport) -> String {
    let analysis = &report.analysis;
    let title = if report.transcript_name.trim().is_empty() {
        "Transcript"
    } else {
        report.transcript_name.as_str()
    };
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>gradepoint report: {}</title>\n",
        html_escape(title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} terms | as of term {} | {}</p>\n",
        analysis.terms.len(),
        report.as_of,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    let summary = &analysis.summary;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Attempted</th><th>Earned</th><th>Quality Points</th><th>GPA</th><th>Transfer Earned</th><th>Overall Earned</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td class=\"gpa\">{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        fmt_credits(summary.institution.attempted),
        fmt_credits(summary.institution.earned),
        fmt_credits(summary.institution.quality_points),
        fmt_gpa(summary.institution.gpa),
        fmt_credits(summary.transfer_earned),
        fmt_credits(summary.overall_earned),
    ));
    html.push_str("</table>\n");
    html.push_str("</section>\n");

    // Per-term tables
    html.push_str("<section class=\"terms\">\n");
    html.push_str("<h2>Terms</h2>\n");
    for term in &analysis.terms {
        html.push_str(&term_section(term, report.as_of));
    }
    html.push_str("</section>\n");

    // Retake groups
    let names: HashMap<&str, &str> = analysis
        .terms
        .iter()
        .flat_map(|t| t.term.rows.iter())
        .map(|r| (r.row_id.as_str(), display_name(&r.name)))
        .collect();
    let retaken: Vec<&RetakeGroup> = analysis.groups.retaken_groups().collect();
    if !retaken.is_empty() {
        html.push_str("<section class=\"groups\">\n");
        html.push_str("<h2>Retaken Courses</h2>\n");
        html.push_str("<table id=\"groups\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('groups', 0)\">Course</th><th onclick=\"sortTable('groups', 1)\">Attempts</th><th onclick=\"sortTable('groups', 2)\">Kept</th><th>Excluded</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for group in retaken {
            html.push_str(&group_row(group, report.as_of, &names, analysis));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn term_section(term: &TermReport, as_of: u32) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<h3>{} <span class=\"meta\">(term {})</span></h3>\n",
        html_escape(&term.name),
        term.index
    ));
    html.push_str("<table class=\"term\">\n");
    html.push_str("<thead><tr><th>Course</th><th>Units</th><th>Grade</th><th>Quality Points</th><th>Status</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for row in &term.term.rows {
        let (class, status) = match row.exclusion_start {
            Some(start) if start <= as_of => (
                "excluded",
                format!("excluded from term {start}"),
            ),
            Some(start) => ("", format!("excluded after term {}", start - 1)),
            None if !row.value.is_numeric() => ("nonpunitive", "not in GPA".to_string()),
            None => ("", String::new()),
        };
        let name = display_name(&row.name);
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(name),
            fmt_credits(row.units),
            html_escape(row.grade.trim()),
            fmt_credits(row.quality_points),
            status,
        ));
    }
    html.push_str("</tbody>\n");

    let t = &term.term;
    let c = &term.cumulative;
    html.push_str("<tfoot>\n");
    html.push_str(&format!(
        "<tr><th>Term</th><td>{} attempted</td><td>{} earned</td><td>{}</td><td class=\"gpa\">GPA {}</td></tr>\n",
        fmt_credits(t.attempted),
        fmt_credits(t.earned),
        fmt_credits(t.quality_points),
        fmt_gpa(t.gpa),
    ));
    html.push_str(&format!(
        "<tr><th>Cumulative</th><td>{} attempted</td><td>{} earned</td><td>{}</td><td class=\"gpa\">GPA {}</td></tr>\n",
        fmt_credits(c.attempted),
        fmt_credits(c.earned),
        fmt_credits(c.quality_points),
        fmt_gpa(c.gpa),
    ));
    html.push_str("</tfoot></table>\n");
    html
}

fn group_row(
    group: &RetakeGroup,
    as_of: u32,
    names: &HashMap<&str, &str>,
    analysis: &TranscriptAnalysis,
) -> String {
    let label = |row_id: &str| -> String {
        let name = names.get(row_id).copied().unwrap_or_else(|| display_name(""));
        format!("{} (#{})", html_escape(name), html_escape(row_id))
    };
    let course = group
        .members
        .iter()
        .find_map(|m| names.get(m.row_id.as_str()).copied())
        .unwrap_or_else(|| display_name(""));
    let kept = select_best(group, as_of)
        .map(|m| format!("{}, term {}", label(&m.row_id), m.term_index))
        .unwrap_or_else(|| "-".to_string());
    let excluded: Vec<String> = group
        .members
        .iter()
        .filter_map(|m| {
            let start = analysis.exclusions.exclusion_start(&m.row_id)?;
            (start <= as_of).then(|| format!("{} from term {start}", label(&m.row_id)))
        })
        .collect();

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        html_escape(course),
        group.len(),
        kept,
        if excluded.is_empty() {
            "-".to_string()
        } else {
            excluded.join("<br>")
        },
    )
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &TranscriptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; --excluded: #fde2e2; --nonpunitive: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --muted: #9ca3af; --excluded: #7f1d1d; --nonpunitive: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); font-weight: normal; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
thead th[onclick] { cursor: pointer; }
.excluded { background: var(--excluded); text-decoration: line-through; }
.nonpunitive { background: var(--nonpunitive); color: var(--muted); }
.gpa { font-weight: bold; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
