//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use labscan_domain::{BiomarkerReading, BiomarkerStatus, ExtractionResult, HealthRecord};
use labscan_extractor::{Bounds, Catalog, ValidationReport};
use std::collections::BTreeMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one extraction result.
    pub fn format_extraction(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Quiet => Ok(self.format_readings_quiet(&result.biomarkers)),
            OutputFormat::Table => {
                let header = self.summary(
                    &result.test_type,
                    &result.facility,
                    &result.date.to_string(),
                    result.confidence_score,
                );
                Ok(format!("{}\n{}", header, self.format_readings_table(&result.biomarkers)))
            }
        }
    }

    /// Format processed health records.
    pub fn format_records(&self, records: &[HealthRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let sections: Vec<String> = records
                    .iter()
                    .map(|record| {
                        let title = record.original_document.as_deref().unwrap_or("(unnamed)");
                        let header = self.summary(
                            &record.record_type,
                            &record.facility,
                            &record.date.to_string(),
                            record.processing_metadata.extraction_confidence,
                        );
                        format!(
                            "{}\n{}\n{}",
                            self.colorize(title, "cyan"),
                            header,
                            self.format_readings_table(&record.biomarkers)
                        )
                    })
                    .collect();
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a validation report.
    pub fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }
        if report.is_clean() {
            return Ok(self.success("Validation passed"));
        }

        let lines: Vec<String> = report
            .errors
            .iter()
            .map(|e| self.error(e))
            .chain(report.warnings.iter().map(|w| self.warning(w)))
            .chain(report.suggestions.iter().map(|s| self.info(s)))
            .collect();
        Ok(lines.join("\n"))
    }

    /// Format the biomarker catalog.
    pub fn format_catalog(&self, catalog: &Catalog) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = catalog
                    .iter()
                    .map(|spec| {
                        serde_json::json!({
                            "name": spec.name,
                            "unit": spec.canonical_unit,
                            "range": spec.range_label,
                            "composite": spec.bounds.is_composite(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(catalog
                .iter()
                .map(|spec| spec.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Biomarker", "Unit", "Range", "Normal bounds"]);

                for spec in catalog.iter() {
                    let bounds = match spec.bounds {
                        Bounds::Range { min, max } => format!("{} - {}", min, max),
                        Bounds::Composite {
                            systolic_max,
                            diastolic_max,
                        } => format!("<= {}/{}", systolic_max, diastolic_max),
                    };
                    builder.push_record([
                        spec.name.as_str(),
                        spec.canonical_unit.as_str(),
                        spec.range_label.as_str(),
                        bounds.as_str(),
                    ]);
                }

                Ok(self.render(builder))
            }
        }
    }

    /// Format readings as a table.
    fn format_readings_table(&self, readings: &BTreeMap<String, BiomarkerReading>) -> String {
        if readings.is_empty() {
            return self.colorize("No biomarkers found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Biomarker", "Value", "Unit", "Range", "Status"]);

        for (name, reading) in readings {
            builder.push_record([
                name.clone(),
                reading.display_value(),
                reading.unit.clone(),
                reading.range_label.clone(),
                self.status(reading.status),
            ]);
        }

        self.render(builder)
    }

    /// Format readings one per line: name, value, unit, status.
    fn format_readings_quiet(&self, readings: &BTreeMap<String, BiomarkerReading>) -> String {
        readings
            .iter()
            .map(|(name, r)| format!("{}\t{}\t{}\t{}", name, r.display_value(), r.unit, r.status))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn summary(&self, test_type: &str, facility: &str, date: &str, confidence: f64) -> String {
        format!(
            "{} | {} | {} | confidence {:.2}",
            test_type, facility, date, confidence
        )
    }

    /// Render a status, colored by severity.
    pub fn status(&self, status: BiomarkerStatus) -> String {
        let color = match status {
            BiomarkerStatus::Normal => "green",
            BiomarkerStatus::Borderline => "yellow",
            BiomarkerStatus::Abnormal => "red",
        };
        self.colorize(status.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
