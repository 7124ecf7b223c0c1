mod report;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use warpath_core::logging::init_logging;
use warpath_core::{Inspector, PathRepo, Warfile, run_inspectors};
use warpath_servlet::ServletInspector;
use warpath_spring::SpringInspector;

#[derive(Parser)]
#[command(
    name = "warpath",
    version,
    about = "Static route-table extraction for packaged Java web applications",
    long_about = "Warpath reconstructs the routing table of a WAR without executing it: \
                  every URL pattern, the HTTP methods it accepts, and the servlet class, \
                  static file, or Spring bean that serves it. Only the deployment \
                  descriptor, compiled class metadata, and framework configuration \
                  inside the archive are read."
)]
pub struct Cli {
    /// Path to the WAR file to inspect
    #[arg(value_name = "WAR_FILE")]
    pub war: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging("cli", true, if cli.verbose { "debug" } else { "info" });

    info!("inspecting {}", cli.war.display());
    let war = Warfile::open(&cli.war)?;

    // fixed pipeline order: baseline entries first, framework resolution after
    let inspectors: Vec<Box<dyn Inspector>> =
        vec![Box::new(ServletInspector), Box::new(SpringInspector)];
    let mut paths = PathRepo::new();
    run_inspectors(&war, &inspectors, &mut paths)?;

    print!("{}", report::render(&paths));
    Ok(())
}
