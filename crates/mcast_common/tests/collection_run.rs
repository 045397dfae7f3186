//! Full collection and analysis runs over scripted sessions

use mcast_common::llm_client::FakeCompletionClient;
use mcast_common::session::{ScriptedConnector, ScriptedSession};
use mcast_common::{
    build_prompt, run_analysis, AnalysisError, CommandExecutionError, CommandSpec,
    DeviceEndpoint, NarrativeAnalyzer, StateCollector, MULTICAST_COMMANDS,
};

fn endpoint() -> DeviceEndpoint {
    DeviceEndpoint::new("198.51.100.7", "netops", Some("secret".to_string()))
}

#[test]
fn failed_command_becomes_error_entry() {
    let spec = CommandSpec::new(["show ip mroute", "show ip igmp groups"]).unwrap();
    let mut session = ScriptedSession::new().reply("show ip mroute", "line1\nline2").fail(
        "show ip igmp groups",
        CommandExecutionError::Device("timeout".to_string()),
    );

    let outputs = StateCollector::new(spec).collect(&mut session);

    let entries: Vec<(&str, Vec<String>)> = outputs
        .iter()
        .map(|(command, lines)| (command, lines.to_vec()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("show ip mroute", vec!["line1".to_string(), "line2".to_string()]),
            ("show ip igmp groups", vec!["Error: timeout".to_string()]),
        ]
    );
}

#[test]
fn full_run_over_multicast_commands() {
    let session = MULTICAST_COMMANDS
        .iter()
        .fold(ScriptedSession::new(), |session, command| {
            session.reply(command, &format!("{} output", command))
        });
    let connector = ScriptedConnector::new(session);
    let analyzer = NarrativeAnalyzer::new(Box::new(FakeCompletionClient::always(
        "Two PIM neighbors are up and group 239.1.1.1 has active receivers.",
    )));

    let report =
        run_analysis(&connector, &endpoint(), &StateCollector::default(), &analyzer).unwrap();

    assert_eq!(connector.sent(), MULTICAST_COMMANDS.to_vec());
    assert!(connector.session_closed());
    assert_eq!(
        report.outputs.commands().collect::<Vec<_>>(),
        MULTICAST_COMMANDS.to_vec()
    );
    assert!(report.narrative.unwrap().contains("239.1.1.1"));
}

#[test]
fn every_command_failing_still_reaches_analysis() {
    let connector = ScriptedConnector::new(ScriptedSession::new());
    let analyzer = NarrativeAnalyzer::new(Box::new(FakeCompletionClient::always_error(
        AnalysisError::Service(404),
    )));

    let report =
        run_analysis(&connector, &endpoint(), &StateCollector::default(), &analyzer).unwrap();

    assert_eq!(report.outputs.len(), MULTICAST_COMMANDS.len());
    for (_, lines) in report.outputs.iter() {
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error: "));
    }
    assert_eq!(report.narrative, Err(AnalysisError::Service(404)));

    // The prompt still lists every command block
    let prompt = build_prompt(&report.outputs);
    for command in MULTICAST_COMMANDS {
        assert!(prompt.as_str().contains(&format!("{}:\nError: ", command)));
    }
}
