use chrono::{Datelike, Utc};

use crate::extract::{datetime_utc, REGISTRY};
use crate::negotiate::Format;
use crate::report::InfoReport;

/// Serialize a full report into the requested representation
pub fn render(format: Format, report: &InfoReport, host: &str) -> String {
    match format {
        Format::Text => render_text(report, host),
        Format::TextShort => render_text_short(report),
        Format::Json => render_json(report),
        Format::Xml => render_xml(report),
    }
}

// One line per attribute: description left-padded with dots to the widest
// description, then ".: " and the value. Newline terminated.
fn render_text_short(report: &InfoReport) -> String {
    let width = report
        .iter()
        .map(|(_, result)| result.description.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();

    for (_, result) in report.iter() {
        out.push_str(&format!(
            "{desc:.<width$}.: {value}\n",
            desc = result.description,
            value = result.value,
        ));
    }

    out
}

fn render_text(report: &InfoReport, host: &str) -> String {
    let now = Utc::now();
    let mut usage = String::new();

    for (path, comment) in [
        ("/info", "Full information"),
        ("/info.txt", "Full information (plain text format)"),
        ("/info.json", "Full information (JSON format)"),
        ("/info.xml", "Full information (XML format)"),
    ] {
        usage.push_str(&usage_line(host, path, comment));
    }

    for key in REGISTRY {
        let path = format!("/info/{}", key.as_str());
        let comment = format!("{} only", key.description());
        usage.push_str(&usage_line(host, &path, &comment));
    }

    format!(
        "\
# (C) {year} client-info. All rights reserved.
#
# This page reports what the server sees of the requesting client:
# IP address, location, user agent and connection details.
# For system administrators who use curl:
#
{usage}#
{info}\
# NOTICE: This banner is not shown when the page is requested
# through a curl or wget client.
# If you request this page with the X-Requested-With header set
# to XMLHttpRequest, \"/info\" is returned in JSON format.
#
# Last update: {date}
# EOF
",
        year = now.year(),
        usage = usage,
        info = render_text_short(report),
        date = datetime_utc(),
    )
}

fn usage_line(host: &str, path: &str, comment: &str) -> String {
    // "/info.json" is the widest route, pad to it plus a little air
    format!("#   curl {host}{path:<12}# {comment}\n")
}

fn render_json(report: &InfoReport) -> String {
    serde_json::to_string(report).expect("a report always serializes to json")
}

// Fixed two-level document, pretty printed: one element per key holding a
// value and a description element.
fn render_xml(report: &InfoReport) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n");

    for (key, result) in report.iter() {
        let key = key.as_str();

        out.push_str(&format!("  <{key}>\n"));
        out.push_str(&format!(
            "    <value>{}</value>\n",
            escape_xml(&result.value)
        ));
        out.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(result.description)
        ));
        out.push_str(&format!("  </{key}>\n"));
    }

    out.push_str("</root>\n");
    out
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
