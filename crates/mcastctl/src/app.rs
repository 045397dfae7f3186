//! Run orchestration for the mcastctl binary

use crate::cli::Cli;
use crate::errors::{
    EXIT_ANALYSIS_FAILED, EXIT_CONFIG_INVALID, EXIT_DEVICE_UNREACHABLE, EXIT_SUCCESS,
};
use crate::output::{render_failure, render_json, render_narrative, render_outputs};
use crate::ssh_session::SshConnector;
use anyhow::{Context, Result};
use mcast_common::{
    collect_state, run_analysis, AppConfig, ConfigError, ConnectionError, DeviceEndpoint,
    NarrativeAnalyzer, SessionConnector, StateCollector,
};
use std::io::{IsTerminal, Write};
use tracing::error;

/// Where a run writes its report and failures
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub color: bool,
}

/// Load the config file, apply command line overrides, then validate the result
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Load configuration, reach the device over ssh and print the report
pub fn run(cli: &Cli) -> Result<i32> {
    let config = match resolve_config(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(EXIT_CONFIG_INVALID);
        }
    };

    let analyzer = if cli.collect_only {
        None
    } else {
        Some(
            NarrativeAnalyzer::from_config(&config.llm)
                .context("Failed to set up completion client")?,
        )
    };

    let connector = SshConnector::new(config.ssh.clone());
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    let mut console = Console {
        color: std::io::stdout().is_terminal(),
        out: &mut stdout,
        err: &mut stderr,
    };

    execute(cli, &config, &connector, analyzer.as_ref(), &mut console)
}

/// Collect from the device and, given an analyzer, summarize.
///
/// Returns the process exit code.
pub fn execute<C>(
    cli: &Cli,
    config: &AppConfig,
    connector: &C,
    analyzer: Option<&NarrativeAnalyzer>,
    console: &mut Console<'_>,
) -> Result<i32>
where
    C: SessionConnector,
{
    let endpoint = DeviceEndpoint::new(&cli.host, &cli.username, cli.password.clone());
    let collector = StateCollector::new(config.command_spec()?);

    let Some(analyzer) = analyzer else {
        let outputs = match collect_state(connector, &endpoint, &collector) {
            Ok(outputs) => outputs,
            Err(e) => return device_unreachable(&e, console),
        };

        if cli.json {
            writeln!(console.out, "{}", render_json(&cli.host, &outputs, None)?)?;
        } else {
            write!(console.out, "{}", render_outputs(&outputs, console.color))?;
        }
        return Ok(EXIT_SUCCESS);
    };

    let report = match run_analysis(connector, &endpoint, &collector, analyzer) {
        Ok(report) => report,
        Err(e) => return device_unreachable(&e, console),
    };

    if cli.json {
        writeln!(
            console.out,
            "{}",
            render_json(&cli.host, &report.outputs, Some(&report.narrative))?
        )?;
    } else {
        match &report.narrative {
            Ok(narrative) => write!(console.out, "{}", render_narrative(narrative, console.color))?,
            Err(e) => write!(console.err, "{}", render_failure(e, console.color))?,
        }
    }

    Ok(if report.narrative.is_ok() {
        EXIT_SUCCESS
    } else {
        EXIT_ANALYSIS_FAILED
    })
}

fn device_unreachable(e: &ConnectionError, console: &mut Console<'_>) -> Result<i32> {
    writeln!(console.err, "Failed to connect to device: {}", e)?;
    Ok(EXIT_DEVICE_UNREACHABLE)
}
