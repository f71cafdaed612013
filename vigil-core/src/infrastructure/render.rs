// vigil-core/src/infrastructure/render.rs

use crate::application::alert::AlertPayload;

// Inline style block so the table survives every mail client that strips
// external CSS. Classes line up with AlertIssue::style_class().
const STYLE: &str = r#"
    <style>
        table { border-collapse: collapse; width: 100%; font-family: Arial, sans-serif; font-size: 14px; }
        th { background-color: #333; color: white; padding: 10px; border: 1px solid #ddd; text-align: left; }
        td { padding: 8px; border: 1px solid #ddd; }
        .critical { background-color: #ffe6e6; color: #b30000; font-weight: bold; }
        .warning { background-color: #fff4e6; color: #cc7a00; }
        .error { background-color: #e0e0e0; color: #333; font-style: italic; }
        .header { background-color: #d32f2f; color: white; padding: 15px; text-align: center; border-radius: 5px; }
    </style>
"#;

/// Render the alert payload as a self-contained HTML document, ready for
/// whatever transport ships it (email body, file on disk, webhook).
pub fn render_html(payload: &AlertPayload) -> String {
    let mut rows_html = String::new();

    for issue in &payload.issues {
        let error_txt = if issue.error_msg.is_empty() {
            String::new()
        } else {
            format!("<br><small>{}</small>", escape(&issue.error_msg))
        };

        rows_html.push_str(&format!(
            r#"
        <tr class="{}">
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}{}</td>
        </tr>"#,
            issue.style_class(),
            escape(&issue.lender),
            escape(&issue.table),
            escape(&issue.test_name),
            issue.failed_rows,
            issue.severity.as_str().to_uppercase(),
            issue.status,
            error_txt,
        ));
    }

    format!(
        r#"<html>
    <head>{STYLE}</head>
    <body>
        <div class="header"><h2>🚨 Data Quality Alert</h2></div>
        <p>Issues detected in <b>{}</b> tests.</p>
        <table>
            <thead>
                <tr><th>Lender</th><th>Table</th><th>Test Case</th><th>Failures</th><th>Severity</th><th>Status</th></tr>
            </thead>
            <tbody>{rows_html}
            </tbody>
        </table>
    </body>
</html>"#,
        payload.issue_count,
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::alert::compose_alert;
    use crate::domain::check::{CheckResult, CheckStatus, FleetReport};
    use crate::domain::rule::Severity;

    fn report() -> FleetReport {
        FleetReport::new(vec![
            CheckResult {
                lender: "acme".into(),
                table: "loans".into(),
                test_name: "not_null (loan_id)".into(),
                status: CheckStatus::Fail,
                failed_rows: 12,
                total_rows: 1000,
                severity: Severity::Critical,
                error_msg: "Found 12 data failures".into(),
            },
            CheckResult::system_failure("globex", "connection <refused>"),
        ])
    }

    #[test]
    fn test_html_carries_classes_and_counts() {
        let payload = compose_alert(&report()).unwrap();
        let html = render_html(&payload);

        assert!(html.contains("Issues detected in <b>2</b> tests."));
        assert!(html.contains("class=\"critical\""));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("CRITICAL_ERROR"));
        assert!(html.contains("not_null (loan_id)"));
    }

    #[test]
    fn test_html_escapes_error_messages() {
        let payload = compose_alert(&report()).unwrap();
        let html = render_html(&payload);

        assert!(html.contains("connection &lt;refused&gt;"));
        assert!(!html.contains("connection <refused>"));
    }
}
