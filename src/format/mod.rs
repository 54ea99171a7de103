//! Output formatting for reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::listing::{Annotation, Cell, Report, ReportGroup};

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a whole report. Every cell is rendered; absent values show as NIL.
    pub fn format_report(&self, report: &Report) -> String {
        match self.format {
            OutputFormat::Json => self.json_report(report),
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_report(report),
        }
    }

    /// Formats a plain list, one item per line (brand listings and the like).
    pub fn format_list(&self, title: &str, items: &[String]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => {
                let mut lines = vec![title.to_string(), format!("{:-<width$}", "", width = title.len())];
                lines.extend(items.iter().cloned());
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![format!("## {}", title), String::new()];
                lines.extend(items.iter().map(|item| format!("- {}", item)));
                lines.join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec![Self::csv_escape(title)];
                lines.extend(items.iter().map(|item| Self::csv_escape(item)));
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json_report(&self, report: &Report) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_report(&self, report: &Report) -> String {
        if report.groups.is_empty() && report.annotations.is_empty() {
            return "No listings found.".to_string();
        }

        let mut sections: Vec<String> = report.groups.iter().map(Self::table_group).collect();

        if !report.annotations.is_empty() {
            sections.push(Self::table_annotations(&report.annotations));
        }

        sections.join("\n\n")
    }

    fn table_group(group: &ReportGroup) -> String {
        let mut lines = vec![format!("{} ({} listings)", group.name, group.len())];

        if group.is_empty() {
            lines.push("No listings found.".to_string());
            return lines.join("\n");
        }

        let rendered: Vec<Vec<String>> =
            group.rows.iter().map(|row| row.iter().map(Cell::to_string).collect()).collect();

        // Column widths
        let widths: Vec<usize> = group
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                rendered
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let pad = |values: &[String]| {
            values
                .iter()
                .zip(&widths)
                .map(|(value, &width)| format!("{:<width$}", value, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        lines.push(pad(&group.columns));
        lines.push(
            widths.iter().map(|&w| format!("{:-<w$}", "", w = w)).collect::<Vec<_>>().join("  "),
        );
        for row in &rendered {
            lines.push(pad(row));
        }

        lines.join("\n")
    }

    fn table_annotations(annotations: &[Annotation]) -> String {
        let width = annotations.iter().map(|a| a.label.chars().count()).max().unwrap_or(0);
        annotations
            .iter()
            .map(|a| format!("{:<width$}  {}", a.label, a.value, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Markdown formatting

    fn markdown_report(&self, report: &Report) -> String {
        let mut lines = Vec::new();

        for group in &report.groups {
            lines.push(format!("## {}", group.name));
            lines.push(String::new());

            if group.is_empty() {
                lines.push("*No listings found*".to_string());
                lines.push(String::new());
                continue;
            }

            lines.push(format!(
                "| {} |",
                group.columns.iter().map(|c| Self::markdown_escape(c)).collect::<Vec<_>>().join(" | ")
            ));
            lines.push(format!("|{}|", vec!["---"; group.columns.len()].join("|")));

            for row in &group.rows {
                let cells: Vec<String> =
                    row.iter().map(|cell| Self::markdown_escape(&cell.to_string())).collect();
                lines.push(format!("| {} |", cells.join(" | ")));
            }

            lines.push(String::new());
            lines.push(format!("*{} listings*", group.len()));
            lines.push(String::new());
        }

        for annotation in &report.annotations {
            lines.push(format!("- **{}**: {}", annotation.label, annotation.value));
        }

        if lines.is_empty() {
            return "No listings found.".to_string();
        }

        lines.join("\n").trim_end().to_string()
    }

    fn markdown_escape(s: &str) -> String {
        s.replace('|', "\\|").replace('\n', " ")
    }

    // CSV formatting

    fn csv_header(report: &Report) -> String {
        let mut header = vec!["Group".to_string()];
        if let Some(group) = report.groups.first() {
            header.extend(group.columns.iter().map(|c| Self::csv_escape(c)));
        }
        header.join(",")
    }

    fn csv_report(&self, report: &Report) -> String {
        // A report of annotations only, such as the COE summary
        if report.groups.is_empty() && !report.annotations.is_empty() {
            let mut lines = vec!["Label,Value".to_string()];
            for annotation in &report.annotations {
                lines.push(format!(
                    "{},{}",
                    Self::csv_escape(&annotation.label),
                    Self::csv_escape(&annotation.value.to_string())
                ));
            }
            return lines.join("\n");
        }

        let mut lines = vec![Self::csv_header(report)];

        for group in &report.groups {
            let name = Self::csv_escape(&group.name);
            for row in &group.rows {
                let mut fields = vec![name.clone()];
                fields.extend(row.iter().map(|cell| Self::csv_escape(&cell.to_string())));
                lines.push(fields.join(","));
            }
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
