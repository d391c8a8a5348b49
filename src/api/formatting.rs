//! Location estimate output formatting
//!
//! Human-readable text, JSON and CSV renderings of a [`LocationEstimate`].

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::api::types::LocationEstimate;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown output format: {s}")),
        }
    }
}

/// Renders an estimate to a string
pub trait EstimateFormatter {
    fn format(&self, estimate: &LocationEstimate) -> Result<String, serde_json::Error>;
}

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// Single-line output
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    pub fn format_text(&self, estimate: &LocationEstimate) -> String {
        let result = &estimate.estimate;
        let mut output = String::new();

        if self.compact {
            let _ = write!(
                output,
                "{:.6},{:.6} ±{:.1}m [{}] anchors:{}",
                result.position.lat,
                result.position.lon,
                result.confidence_radius_m,
                result.method,
                estimate.anchors_used
            );
            if let Some(score) = estimate.spoofing.score {
                let _ = write!(output, " spoof:{:.2}", score);
                if estimate.is_spoofing_suspected() {
                    output.push_str(" SUSPECTED");
                }
            }
            return output;
        }

        output.push_str("Estimated position:\n");
        let _ = writeln!(output, "  Latitude:   {:.6}°", result.position.lat);
        let _ = writeln!(output, "  Longitude:  {:.6}°", result.position.lon);
        let _ = writeln!(output, "  Radius:     {:.1} m", result.confidence_radius_m);
        let _ = writeln!(output, "  Method:     {}", result.method);
        let _ = writeln!(
            output,
            "  Anchors:    {} used, {} dropped",
            estimate.anchors_used, estimate.anchors_dropped
        );
        if let Some(residual) = result.mean_residual_error_m {
            let _ = writeln!(output, "  Residual:   {:.1} m", residual);
        }
        if let Some(separation) = result.anchor_separation_m {
            let _ = writeln!(output, "  Baseline:   {:.1} m", separation);
        }

        output.push_str("\nAnchor distances:\n");
        for distance in &result.estimated_distances {
            let _ = writeln!(output, "  {:<12} {:.1} m", distance.anchor_id, distance.distance_m);
        }

        if let (Some(reference), Some(error)) = (estimate.reference, estimate.error_meters) {
            output.push_str("\nReported position:\n");
            let _ = writeln!(output, "  Position:   {}", reference);
            let _ = writeln!(output, "  Error:      {:.1} m", error);
        }

        if let (Some(score), Some(suspected)) = (estimate.spoofing.score, estimate.spoofing.suspected) {
            output.push_str("\nSpoofing:\n");
            let _ = writeln!(output, "  Score:      {:.2}", score);
            let _ = writeln!(output, "  Suspected:  {}", if suspected { "yes" } else { "no" });
            if let Some(reason) = &estimate.spoofing.reason {
                let _ = writeln!(output, "  Reason:     {}", reason);
            }
        }

        output
    }
}

impl EstimateFormatter for TextFormatter {
    fn format(&self, estimate: &LocationEstimate) -> Result<String, serde_json::Error> {
        Ok(self.format_text(estimate))
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl EstimateFormatter for JsonFormatter {
    fn format(&self, estimate: &LocationEstimate) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(estimate)
        } else {
            serde_json::to_string(estimate)
        }
    }
}

/// CSV formatter for data logging
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> &'static str {
        "latitude,longitude,confidence_radius_m,method,anchors_used,mean_residual_m,error_m,spoofing_score,spoofing_suspected"
    }

    pub fn format_row(&self, estimate: &LocationEstimate) -> String {
        let result = &estimate.estimate;
        format!(
            "{:.6},{:.6},{:.1},{},{},{},{},{},{}",
            result.position.lat,
            result.position.lon,
            result.confidence_radius_m,
            result.method,
            estimate.anchors_used,
            optional(result.mean_residual_error_m.map(|v| format!("{:.1}", v))),
            optional(estimate.error_meters.map(|v| format!("{:.1}", v))),
            optional(estimate.spoofing.score.map(|v| format!("{:.2}", v))),
            optional(estimate.spoofing.suspected.map(|v| v.to_string())),
        )
    }
}

impl EstimateFormatter for CsvFormatter {
    fn format(&self, estimate: &LocationEstimate) -> Result<String, serde_json::Error> {
        if self.include_header {
            Ok(format!("{}\n{}", self.header(), self.format_row(estimate)))
        } else {
            Ok(self.format_row(estimate))
        }
    }
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Formatter for the requested output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn EstimateFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::pretty()),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnchorDistance, EstimationMethod, EstimationResult, GeoPoint, SpoofingAssessment};

    fn sample() -> LocationEstimate {
        LocationEstimate {
            estimate: EstimationResult {
                position: GeoPoint::new(34.05, -118.24),
                confidence_radius_m: 52.5,
                method: EstimationMethod::Trilateration,
                estimated_distances: vec![
                    AnchorDistance { anchor_id: "kit-1".to_string(), distance_m: 353.6 },
                    AnchorDistance { anchor_id: "kit-2".to_string(), distance_m: 301.2 },
                    AnchorDistance { anchor_id: "kit-3".to_string(), distance_m: 410.0 },
                ],
                mean_residual_error_m: Some(3.84),
                anchor_separation_m: None,
            },
            reference: Some(GeoPoint::new(34.06, -118.24)),
            error_meters: Some(1112.0),
            spoofing: SpoofingAssessment {
                score: Some(1.0),
                suspected: Some(true),
                reason: Some("Position error (1112m) is 21.2x the expected accuracy (52m)".to_string()),
            },
            anchors_used: 3,
            anchors_dropped: 0,
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_format() {
        let text = TextFormatter::new().format_text(&sample());
        assert!(text.contains("Latitude:   34.050000°"));
        assert!(text.contains("Method:     trilateration"));
        assert!(text.contains("Residual:   3.8 m"));
        assert!(text.contains("kit-2"));
        assert!(text.contains("Suspected:  yes"));
        assert!(text.contains("21.2x"));
    }

    #[test]
    fn test_compact_text_format() {
        let text = TextFormatter::compact().format_text(&sample());
        assert_eq!(text, "34.050000,-118.240000 ±52.5m [trilateration] anchors:3 spoof:1.00 SUSPECTED");
    }

    #[test]
    fn test_json_format() {
        let json = JsonFormatter::new().format(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["estimate"]["method"], "trilateration");
        assert_eq!(value["spoofing"]["suspected"], true);
        assert!(value["estimate"].get("anchor_separation_m").is_none());

        let parsed: LocationEstimate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_csv_format() {
        let csv = CsvFormatter::new().format(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), lines[1].split(',').count());
        assert_eq!(lines[1], "34.050000,-118.240000,52.5,trilateration,3,3.8,1112.0,1.00,true");

        let mut no_opinion = sample();
        no_opinion.spoofing = SpoofingAssessment::no_opinion();
        no_opinion.error_meters = None;
        let row = CsvFormatter { include_header: false }.format(&no_opinion).unwrap();
        assert!(row.ends_with(",3.8,,,"));
    }
}
