// Report rendering for page summaries

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use webanalyse_scanner::PageSummary;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

const PAGE_STYLE: &str = "body{font-family:sans-serif;margin:2em auto;max-width:48em;color:#222}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.3em .8em;text-align:left}\
.error{color:#b00020}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Html,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "html" => Some(ReportFormat::Html),
            _ => None,
        }
    }
}

pub fn generate_report(summary: &PageSummary, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(summary)),
        ReportFormat::Json => generate_json_report(summary),
        ReportFormat::Html => Ok(generate_html_report(summary)),
    }
}

pub fn generate_text_report(summary: &PageSummary) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                          WEB PAGE ANALYSIS\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("URL:          {}\n", summary.url));
    report.push_str(&format!("Title:        {}\n", display_or_dash(&summary.title)));
    report.push_str(&format!("Version:      {}\n", display_or_dash(&summary.version)));
    report.push_str(&format!("Login form:   {}\n", summary.login_label()));
    report.push('\n');

    report.push_str(RULE);
    report.push('\n');
    report.push_str("HEADINGS\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    if summary.headings.is_empty() {
        report.push_str("  (none)\n");
    } else {
        for (tag, count) in &summary.headings {
            report.push_str(&format!("  {:<4} {}\n", tag, count));
        }
    }
    report.push('\n');

    report.push_str(RULE);
    report.push('\n');
    report.push_str("LINKS\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("  Internal:      {}\n", summary.links.internal));
    report.push_str(&format!("  External:      {}\n", summary.links.external));
    report.push_str(&format!("  Inaccessible:  {}\n", summary.links.inaccessible));
    report.push('\n');

    report
}

pub fn generate_json_report(summary: &PageSummary) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "webanalyse",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "page": {
                "url": summary.url,
                "title": summary.title,
                "version": summary.version,
                "has_login_form": summary.has_login_form
            },
            "headings": summary.headings,
            "links": summary.links
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// Result page served after a successful analysis.
pub fn generate_html_report(summary: &PageSummary) -> String {
    let mut body = String::new();

    body.push_str("<h1>Analysis summary</h1>\n<table>\n");
    push_row(&mut body, "URL", &escape_html(&summary.url));
    push_row(&mut body, "Title", &escape_html(&summary.title));
    push_row(&mut body, "Version", &escape_html(&summary.version));
    push_row(&mut body, "Login form", summary.login_label());
    push_row(&mut body, "Internal links", &summary.links.internal.to_string());
    push_row(&mut body, "External links", &summary.links.external.to_string());
    push_row(
        &mut body,
        "Inaccessible links",
        &summary.links.inaccessible.to_string(),
    );
    body.push_str("</table>\n");

    body.push_str("<h2>Headings</h2>\n");
    if summary.headings.is_empty() {
        body.push_str("<p>No headings found.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Level</th><th>Count</th></tr>\n");
        for (tag, count) in &summary.headings {
            push_row(&mut body, tag, &count.to_string());
        }
        body.push_str("</table>\n");
    }

    body.push_str("<p><a href=\"/\">Analyse another page</a></p>\n");
    html_page("Analysis summary", &body)
}

pub fn generate_error_page(message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Try again</a></p>\n",
        escape_html(message)
    );
    html_page("Error", &body)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

// Cell values must already be escaped.
fn push_row(body: &mut String, label: &str, value: &str) {
    body.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>\n", label, value));
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}
