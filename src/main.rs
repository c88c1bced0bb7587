use carbon_lot_sizing::io::demand::generate_normal_demand;
use carbon_lot_sizing::io::reporting;
use carbon_lot_sizing::logging;
use carbon_lot_sizing::planning::config::PlanConfig;
use carbon_lot_sizing::planning::engine::Planner;
use carbon_lot_sizing::solver::implementations::backend_by_name;
use carbon_lot_sizing::ProductionMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct LotSizingTools {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve one production mode and print the plan
    Solve(SolveArgs),
    /// Solve both production modes on the same inputs
    Compare(CommonArgs),
    /// Print the sampled demand table
    Demand(CommonArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Fixed,
    Decision,
}

impl From<ModeArg> for ProductionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fixed => ProductionMode::Fixed,
            ModeArg::Decision => ProductionMode::Decision,
        }
    }
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// JSON file with the instance; the reference instance when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the demand seed of the config
    #[arg(short, long)]
    seed: Option<u64>,
    /// Solver backend name
    #[arg(long, default_value = "microlp")]
    solver: String,
}

#[derive(Debug, Args)]
struct SolveArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Whether production rates are fixed inputs or decisions
    #[arg(short, long, value_enum, default_value = "decision")]
    mode: ModeArg,
    /// Directory for the CSV export
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_config(args: &CommonArgs) -> Result<PlanConfig, Box<dyn Error>> {
    let mut config = match args.config.as_ref() {
        Some(path) => PlanConfig::from_json_file(path)?,
        None => PlanConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.demand.seed = seed;
    }
    Ok(config)
}

fn solve(args: &SolveArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.common)?;
    let params = config.parameter_set()?;
    let backend = backend_by_name(&args.common.solver)?;

    let report = Planner::new(backend.as_ref()).run(&params, args.mode.into())?;
    reporting::print_plan(&report);

    if let Some(dir) = args.output.as_ref() {
        reporting::write_plan_csv(dir, &report)?;
    }
    Ok(())
}

fn compare(args: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args)?;
    let params = config.parameter_set()?;
    let backend = backend_by_name(&args.solver)?;

    let comparison = Planner::new(backend.as_ref()).compare_modes(&params)?;
    reporting::print_comparison(&comparison);
    Ok(())
}

fn demand(args: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args)?;
    let table = generate_normal_demand(
        &config.catalog(),
        config.demand.mean,
        config.demand.std_dev,
        config.demand.seed,
    )?;

    println!("Demand table (seed {}):", config.demand.seed);
    for ((product, period), value) in &table {
        println!("  {} period {}: {}", product, period, value);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let cli = LotSizingTools::parse();
    match &cli.command {
        Command::Solve(args) => solve(args),
        Command::Compare(args) => compare(args),
        Command::Demand(args) => demand(args),
    }
}
