//! Report rendering

use mcast_common::{AnalysisError, CommandOutputs, NarrativeResult};
use owo_colors::OwoColorize;
use serde::Serialize;

pub const REPORT_HEADER: &str = "Multicast State Analysis:";
const RULE_WIDTH: usize = 50;

#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    device: &'a str,
    outputs: &'a CommandOutputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisJson<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum AnalysisJson<'a> {
    Ok {
        narrative: &'a str,
    },
    Error {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl<'a> From<&'a NarrativeResult> for AnalysisJson<'a> {
    fn from(result: &'a NarrativeResult) -> Self {
        match result {
            Ok(narrative) => Self::Ok {
                narrative: narrative.as_str(),
            },
            Err(e) => Self::Error {
                reason: e.to_string(),
                status_code: e.status_code(),
            },
        }
    }
}

/// Narrative under the report header. `color` bolds the header.
pub fn render_narrative(narrative: &str, color: bool) -> String {
    let header = if color {
        REPORT_HEADER.bold().to_string()
    } else {
        REPORT_HEADER.to_string()
    };
    format!("\n{}\n{}\n{}\n", header, "-".repeat(RULE_WIDTH), narrative)
}

/// Analysis failure line for stderr
pub fn render_failure(error: &AnalysisError, color: bool) -> String {
    if color {
        format!("{}\n", error.to_string().red())
    } else {
        format!("{}\n", error)
    }
}

/// Raw collected output, one block per command
pub fn render_outputs(outputs: &CommandOutputs, color: bool) -> String {
    let mut text = String::new();
    for (command, lines) in outputs.iter() {
        let label = format!("{}:", command);
        if color {
            text.push_str(&label.cyan().bold().to_string());
        } else {
            text.push_str(&label);
        }
        text.push('\n');
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
    }
    text
}

pub fn render_json(
    device: &str,
    outputs: &CommandOutputs,
    narrative: Option<&NarrativeResult>,
) -> serde_json::Result<String> {
    let report = ReportJson {
        device,
        outputs,
        analysis: narrative.map(AnalysisJson::from),
    };
    serde_json::to_string_pretty(&report)
}
