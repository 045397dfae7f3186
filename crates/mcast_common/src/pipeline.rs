//! One collection and analysis run against a single device

use crate::analyzer::NarrativeAnalyzer;
use crate::collector::StateCollector;
use crate::error::ConnectionError;
use crate::session::{DeviceSession, SessionConnector};
use crate::types::{AnalysisReport, CommandOutputs, DeviceEndpoint};
use tracing::{error, info};

/// Connect, run the command list and release the session
pub fn collect_state<C>(
    connector: &C,
    endpoint: &DeviceEndpoint,
    collector: &StateCollector,
) -> Result<CommandOutputs, ConnectionError>
where
    C: SessionConnector,
{
    info!("Connecting to device {}", endpoint.host());
    let mut session = connector.connect(endpoint).map_err(|e| {
        error!("Failed to connect to device: {}", e);
        e
    })?;

    let outputs = collector.collect(&mut session);
    session.close();
    info!("Disconnected from {}", endpoint.host());

    Ok(outputs)
}

/// Connect, collect, release the session, then analyze.
///
/// Only a failed connect is returned as an error. Command and analysis
/// failures are carried inside the report.
pub fn run_analysis<C>(
    connector: &C,
    endpoint: &DeviceEndpoint,
    collector: &StateCollector,
    analyzer: &NarrativeAnalyzer,
) -> Result<AnalysisReport, ConnectionError>
where
    C: SessionConnector,
{
    let outputs = collect_state(connector, endpoint, collector)?;
    let narrative = analyzer.analyze(&outputs);

    Ok(AnalysisReport { outputs, narrative })
}
