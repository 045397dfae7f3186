//! Prompt composition for the completion service

use crate::types::{AnalysisPrompt, CommandOutputs};

/// Instructions placed ahead of the collected data
pub const ANALYSIS_PREAMBLE: &str = "\
Analyze the following Cisco multicast state information and provide a clear,
concise summary that would help a network operator understand:
1. The current multicast state
2. Any potential issues or anomalies
3. Key statistics and active groups

Data:
";

/// Build the prompt: preamble, then one `command:` block per entry, blocks
/// separated by a blank line
pub fn build_prompt(outputs: &CommandOutputs) -> AnalysisPrompt {
    let data = outputs
        .iter()
        .map(|(command, lines)| format!("{}:\n{}", command, lines.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n");

    AnalysisPrompt::new(format!("{}{}", ANALYSIS_PREAMBLE, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blocks_follow_preamble_in_order() {
        let mut outputs = CommandOutputs::new();
        outputs.insert("show ip mroute", lines(&["line1", "line2"]));
        outputs.insert("show ip igmp groups", lines(&["Error: timeout"]));

        let prompt = build_prompt(&outputs);
        let data = prompt.as_str().strip_prefix(ANALYSIS_PREAMBLE).unwrap();

        assert_eq!(
            data,
            "show ip mroute:\nline1\nline2\n\nshow ip igmp groups:\nError: timeout"
        );
    }

    #[test]
    fn test_each_label_appears_once() {
        let mut outputs = CommandOutputs::new();
        outputs.insert("show ip pim neighbor", lines(&["Neighbor  Interface"]));
        outputs.insert("show ip mroute count", lines(&["IP Multicast Statistics"]));

        let prompt = build_prompt(&outputs);
        for command in outputs.commands() {
            let label = format!("{}:\n", command);
            assert_eq!(prompt.as_str().matches(&label).count(), 1, "{}", command);
        }
        assert_eq!(prompt.as_str().matches("\n\n").count(), 2);
    }

    #[test]
    fn test_empty_outputs_yield_preamble_only() {
        let prompt = build_prompt(&CommandOutputs::new());
        assert_eq!(prompt.as_str(), ANALYSIS_PREAMBLE);
    }
}
