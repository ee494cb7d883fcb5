//! ecubevis - Coordinate normalization and seam-aware slicing for gridded climate data
//!
//! This is the main entry point for the ecubevis command-line tool. It loads a
//! dataset, prepares one variable for plotting and prints the resulting plan.

use serde::Serialize;
use std::time::Instant;
use tracing::info;

use ecubevis::data_loader::open_dataset;
use ecubevis::{
    init_tracing, log_error, log_operation_end, log_operation_start, prepare_plot, CoordKind, Config,
    PlotPlan, PlotSummary,
};

/// JSON document printed with `--json`
#[derive(Serialize)]
struct Report<'a> {
    summary: &'a PlotSummary,
    groupby: &'a [CoordKind],
    plan: &'a PlotPlan,
}

fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, args) = Config::load()?;

    // Validate configuration
    config.validate()?;

    init_tracing(&config.log_level);
    info!("Starting ecubevis v{}", env!("CARGO_PKG_VERSION"));

    let start = Instant::now();
    log_operation_start("plot", Some(&args.dataset.display().to_string()));

    let result = (|| -> ecubevis::Result<_> {
        let dataset = open_dataset(&args.dataset)?;
        info!("Found {} variables", dataset.variables.len());

        let request = config.plot_request(&args)?;
        prepare_plot(&dataset, &request, &config)
    })();

    let prepared = match result {
        Ok(prepared) => {
            log_operation_end("plot", start, true);
            prepared
        }
        Err(e) => {
            log_operation_end("plot", start, false);
            log_error(&e, "Failed to prepare plot");
            return Err(e.into());
        }
    };

    if args.json {
        let report = Report {
            summary: &prepared.summary,
            groupby: &prepared.groupby,
            plan: &prepared.plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", prepared.summary);
        match &prepared.plan {
            PlotPlan::Interactive(plan) => println!(
                "Interactive plot: {}x{} px, {} frames, grouped by {:?}",
                plan.width, plan.height, plan.frames, prepared.groupby
            ),
            PlotPlan::Static(plan) => println!(
                "Static mosaic: {} rows x {} cols, figure {:.1}x{:.1} in",
                plan.rows, plan.cols, plan.figsize.0, plan.figsize.1
            ),
        }
    }

    Ok(())
}
