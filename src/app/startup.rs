//! Application startup sequence
//!
//! Staged startup: parse arguments, initialize logging, discover and
//! register plugins, then either answer an informational query or run the
//! scan pipeline end to end. Pre-scan failures (bad arguments, malformed
//! queries, registration problems) exit with code 2; a scan that ran maps
//! its final status to 0 or 1.

use std::sync::Arc;

use clap::Parser;

use crate::app::cli::args::Args;
use crate::app::cli::display;
use crate::app::spinner;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::query;
use crate::plugin::api::{ApiKeyStore, PluginContext, PluginDiscovery, PluginRegistry};
use crate::scanner::api::{
    CancelToken, ScanOptions, ScanReport, ScanScheduler, ScanStatus,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_SCAN_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Initialize application startup
pub fn startup() {
    std::process::exit(run());
}

fn run() -> i32 {
    // Stage 1: Argument parsing and validation
    let args = Args::parse();
    if let Err(message) = args.validate() {
        eprintln!("error: {message}");
        return EXIT_USAGE;
    }

    let use_color = args.color_enabled();
    if !use_color {
        colored::control::set_override(false);
    }

    // Stage 2: Logging
    let log_file = args.log_file.as_deref().and_then(|path| path.to_str());
    if let Err(err) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        log_file,
        use_color,
    ) {
        eprintln!("error: failed to initialize logging: {err}");
        return EXIT_USAGE;
    }
    log::info!("intelscan starting");

    // Stage 3: Async runtime
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("FATAL: failed to start async runtime");
            log::debug!("DETAIL: {err}");
            eprintln!("error: failed to start async runtime: {err}");
            return EXIT_USAGE;
        }
    };

    runtime.block_on(run_app(args, use_color))
}

async fn run_app(args: Args, use_color: bool) -> i32 {
    // Stage 4: Plugin discovery and registration
    let discovery = PluginDiscovery::with_excludes(args.plugin_exclusions.clone());
    let discovered = discovery.discover_plugins();

    let keys = Arc::new(ApiKeyStore::from_env(
        discovered
            .iter()
            .flat_map(|plugin| plugin.metadata.api_key_requirements.iter()),
    ));

    let context = match PluginContext::new(keys.clone()) {
        Ok(context) => Arc::new(context),
        Err(err) => {
            log::error!("FATAL: failed to build plugin HTTP context");
            log::debug!("DETAIL: {err}");
            eprintln!("error: failed to build plugin HTTP context: {err}");
            return EXIT_USAGE;
        }
    };

    let mut registry = PluginRegistry::new(context);
    match discovery.register_all(&mut registry) {
        Ok(count) => log::info!("Registered {count} plugins"),
        Err(err) => {
            log_error_with_context(&err, "Plugin registration");
            eprintln!("error: {err}");
            return EXIT_USAGE;
        }
    }
    let registry = Arc::new(registry);

    // Stage 5: Informational modes exit before any scan is scheduled
    if args.list_plugins {
        display::render_plugin_list(&registry, &keys, use_color);
        return EXIT_SUCCESS;
    }
    if args.key_status {
        display::render_key_status(&registry, &keys, use_color);
        return EXIT_SUCCESS;
    }

    // Stage 6: Query parsing
    let Some(raw_target) = args.target.as_deref() else {
        // validate() enforces this before the runtime starts
        return EXIT_USAGE;
    };
    let target = match query::parse(raw_target) {
        Ok(target) => target,
        Err(err) => {
            log_error_with_context(&err, "Parsing target query");
            eprintln!("error: {err}");
            eprintln!("{}", err.suggestion());
            return EXIT_USAGE;
        }
    };
    log::info!(
        "Scanning {} as {} query",
        target.normalized_value,
        target.scan_type
    );

    // Stage 7: Cancellation on Ctrl-C
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, cancelling scan");
                cancel.cancel();
            }
        });
    }

    // Stage 8: Progress spinner (text mode only; JSON consumers get no decoration)
    let (progress_tx, progress_rx) = tokio::sync::watch::channel(0.0);
    let spinner_task = if args.format == "text" {
        Some(tokio::spawn(spinner::run_spinner(progress_rx)))
    } else {
        None
    };

    // Stage 9: Run the scan
    let options = ScanOptions {
        timeout: args.scan_timeout(),
        max_concurrent: args.max_concurrent,
        include_unconfigured: args.include_unconfigured,
        cancel: cancel.clone(),
        progress: Some(progress_tx),
    };

    let scheduler = ScanScheduler::new(registry, keys);
    let session = match scheduler.run_scan(target, options).await {
        Ok(session) => session,
        Err(err) => {
            log_error_with_context(&err, "Running scan");
            eprintln!("error: {err}");
            return EXIT_USAGE;
        }
    };

    // The sender side dropped with run_scan; wait for the spinner to clear
    // its line before printing the report.
    if let Some(task) = spinner_task {
        let _ = task.await;
    }

    // Stage 10: Report rendering and exit status
    let report = ScanReport::from_session(session);
    if args.format == "json" {
        match display::render_json(&report, args.min_threat) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                log::error!("FATAL: failed to serialize report");
                log::debug!("DETAIL: {err}");
                eprintln!("error: failed to serialize report: {err}");
                return EXIT_USAGE;
            }
        }
    } else {
        display::render_report(&report, args.min_threat, use_color);
    }

    exit_code_for(&report)
}

/// Map the final scan status to a process exit code.
///
/// A partial scan still counts as success when it produced findings; an
/// interrupted or failed scan that yielded nothing does not.
fn exit_code_for(report: &ScanReport) -> i32 {
    match report.status {
        ScanStatus::Completed => EXIT_SUCCESS,
        ScanStatus::Partial if report.has_findings() => EXIT_SUCCESS,
        _ => EXIT_SCAN_FAILED,
    }
}
