//! Mosaic: fractal network orchestrator server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use mosaic_core::MosaicConfig;
use mosaic_runtime::{run_demo, DemoOptions, NetworkOrchestrator};
use mosaic_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = MosaicConfig::from_env();
    config.validate()?;

    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "demo" => {
                let defaults = DemoOptions::default();
                let options = DemoOptions {
                    primary_requests: parse_arg(&args, 2).unwrap_or(defaults.primary_requests),
                    extended_requests: parse_arg(&args, 3).unwrap_or(defaults.extended_requests),
                };
                let orchestrator = NetworkOrchestrator::new(&config);
                let report = run_demo(&orchestrator, options).await?;
                print_demo_report(&report);
                std::process::exit(if report.success { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                println!("Mosaic: fractal network orchestrator");
                println!();
                println!("Usage: mosaic [command]");
                println!();
                println!("Commands:");
                println!("  (none) | serve                Start the RPC server");
                println!("  demo [primary] [extended]     Run the 27-dimension demo");
                println!("  help                          Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT, MOSAIC_DISPATCH_TIMEOUT_SECS, MOSAIC_RETENTION_SECS,");
                println!("  MOSAIC_MAX_SAMPLES, MOSAIC_MAX_NODES, MOSAIC_BOOTSTRAP_DIMENSION");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'mosaic help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mosaic orchestrator listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_arg(args: &[String], index: usize) -> Option<usize> {
    args.get(index).and_then(|a| a.parse().ok())
}

fn print_demo_report(report: &mosaic_runtime::DemoReport) {
    println!();
    println!("{}", "=".repeat(50));
    println!("Mosaic Demo Results");
    println!("{}", "=".repeat(50));
    println!("Total Nodes: {}", report.total_nodes);
    println!("Total Requests: {}", report.total_requests);
    println!(
        "Overall Success Rate: {:.2}%",
        report.latency.overall_success_rate * 100.0
    );
    for band in &report.latency.bands {
        println!(
            "{} Avg TCPR: {:.3}s, max {:.3}s (target: <={:.1}s) {}",
            band.label,
            band.avg_tcpr,
            band.max_tcpr,
            band.target_tcpr,
            if band.meets_target { "ok" } else { "MISSED" }
        );
    }
    println!();
    if report.success {
        println!("All TCPR targets met!");
    } else {
        println!("TCPR targets not met");
    }
}
