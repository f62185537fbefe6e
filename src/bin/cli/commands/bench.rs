//! Write throughput benchmark command

use clap::{Arg, ArgMatches, Command};
use region_bench::bench::{BenchmarkRun, BenchmarkSession, IndexRange, Strategy};
use region_bench::config::{BenchConfig, PreSplit, RECORD_KEY_WIDTH};
use region_bench::store::{CompressionType, MemoryStore};

use crate::cli::utils::{
    format_duration, format_rate, parse_i64, parse_positive_usize, parse_u64, print_header,
    print_progress, print_success, print_warning, share_bar, validate_bench_params,
    validate_name, validate_region_count, CliError, CliResult, JsonOutput,
};
use crate::cli::GlobalOptions;

/// Build the 'bench' subcommand
pub fn bench_command() -> Command {
    Command::new("bench")
        .about("Run a write throughput benchmark against the in-memory store")
        .arg(
            Arg::new("strategy")
                .help("Write strategy")
                .long("strategy")
                .short('s')
                .value_parser(["serial", "concurrent", "batched", "all"])
                .default_value("batched"),
        )
        .arg(
            Arg::new("start")
                .help("First record index (inclusive)")
                .long("start")
                .default_value("0"),
        )
        .arg(
            Arg::new("end")
                .help("Last record index (exclusive)")
                .long("end")
                .default_value("100000"),
        )
        .arg(
            Arg::new("batch-size")
                .help("Records per batched write call")
                .long("batch-size"),
        )
        .arg(
            Arg::new("threads")
                .help("Writer threads for the concurrent strategies")
                .long("threads"),
        )
        .arg(
            Arg::new("attempts")
                .help("Attempts per write unit (1 disables retries)")
                .long("attempts"),
        )
        .arg(Arg::new("table").help("Target table").long("table"))
        .arg(
            Arg::new("compression")
                .help("Column family compression when the table is created")
                .long("compression")
                .value_parser(["none", "gz", "lz4", "snappy", "zstd"]),
        )
        .arg(
            Arg::new("pre-split-regions")
                .help("Pre-split a new table into this many regions over the benchmark key range")
                .long("pre-split-regions"),
        )
}

/// Execute the 'bench' command
pub fn run_bench(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    let mut config = global.load_config()?;

    let strategies: Vec<Strategy> = match matches
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("batched")
    {
        "all" => Strategy::ALL.to_vec(),
        name => vec![name.parse::<Strategy>()?],
    };
    let start = parse_u64(
        matches
            .get_one::<String>("start")
            .ok_or("start argument is required")?,
        "start",
    )?;
    let end = parse_u64(
        matches
            .get_one::<String>("end")
            .ok_or("end argument is required")?,
        "end",
    )?;
    apply_overrides(matches, &mut config)?;

    // Each strategy writes its own slice of the key space.
    let base = IndexRange::new(start, end).map_err(CliError::from)?;
    if base.is_empty() {
        return Err(CliError::Validation("end must be greater than start".into()).into());
    }
    let ranges = strategies
        .iter()
        .enumerate()
        .map(|(slot, _)| {
            let offset = base.len() * slot as u64;
            IndexRange::new(start + offset, end + offset)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(CliError::from)?;

    if let Some(regions) = matches.get_one::<String>("pre-split-regions") {
        let regions = parse_i64(regions, "pre-split-regions")?;
        validate_region_count(regions)?;
        let last = ranges.last().map_or(end, IndexRange::end);
        config.table.pre_split = Some(PreSplit {
            start: start.to_string(),
            end: (last - 1).to_string(),
            regions,
            width: Some(RECORD_KEY_WIDTH),
        });
    }

    let harness = config.harness_config();
    validate_bench_params(harness.concurrency, harness.batch_size, harness.retry.max_attempts)?;

    if global.chatty() {
        println!("Running benchmark...");
        println!("  Table:      {}", config.table.name);
        println!("  Records:    {} per strategy", base.len());
        println!("  Threads:    {}", harness.concurrency);
        println!("  Batch size: {}", harness.batch_size);
        println!();
    }

    let store = MemoryStore::new();
    let session = BenchmarkSession::open(&store, &config).map_err(CliError::from)?;

    let plan: Vec<(Strategy, IndexRange)> = strategies.into_iter().zip(ranges).collect();
    let outcome = run_plan(&session, &plan, &global);
    let teardown = close_session(session, &global);
    let runs = outcome.map_err(CliError::from)?;

    let regions = store
        .region_writes(&config.table.name)
        .map_err(CliError::from)?;

    if global.is_json() {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("table", &config.table.name);
        let summaries: Vec<_> = runs.iter().map(BenchmarkRun::summary).collect();
        output.add_value("runs", &summaries);
        let distribution: Vec<_> = regions
            .iter()
            .map(|(region, writes)| serde_json::json!({ "region": region.to_string(), "writes": writes }))
            .collect();
        output.add_value("regions", &distribution);
        let teardown: Vec<String> = teardown.iter().map(ToString::to_string).collect();
        output.add_string_array("teardown_errors", &teardown);
        output.print();
        return Ok(());
    }

    if global.quiet {
        return Ok(());
    }

    print_header("Benchmark Summary");
    for run in &runs {
        println!(
            "  {:<10} {:>10} records  {:>12}  {:>16}",
            run.strategy.to_string(),
            run.record_count,
            format_duration(run.elapsed),
            format_rate(run.throughput())
        );
        if !run.failures.is_empty() {
            print_warning(&format!(
                "{}: {} of {} units failed ({} records); throughput counts dispatched records",
                run.strategy,
                run.failed_units(),
                run.dispatched_units,
                run.failed_records()
            ));
        }
    }

    if regions.len() > 1 {
        print_header("Region Distribution");
        let total: u64 = regions.iter().map(|(_, writes)| writes).sum();
        for (region, writes) in &regions {
            println!("  {:<24} {:>10}  {}", region.to_string(), writes, share_bar(*writes, total, 30));
        }
    }
    print_success("Benchmark complete");
    Ok(())
}

/// Run each strategy over its range, stopping at the first fatal error.
fn run_plan(
    session: &BenchmarkSession,
    plan: &[(Strategy, IndexRange)],
    global: &GlobalOptions,
) -> region_bench::Result<Vec<BenchmarkRun>> {
    let mut runs = Vec::with_capacity(plan.len());
    for (strategy, range) in plan {
        if global.chatty() {
            print_progress(&format!("{} [{}, {})", strategy, range.start(), range.end()));
        }
        let run = session.run(*strategy, *range)?;
        if global.chatty() {
            println!(
                "{} in {}",
                format_rate(run.throughput()),
                format_duration(run.elapsed)
            );
        }
        runs.push(run);
    }
    Ok(runs)
}

/// Close the session whether or not the runs succeeded. Teardown problems
/// never fail the command; text output shows them as warnings.
fn close_session(session: BenchmarkSession, global: &GlobalOptions) -> Vec<region_bench::Error> {
    let errors = session.close();
    if !global.is_json() {
        for error in &errors {
            print_warning(&format!("teardown: {}", error));
        }
    }
    errors
}

fn apply_overrides(matches: &ArgMatches, config: &mut BenchConfig) -> CliResult<()> {
    if let Some(threads) = matches.get_one::<String>("threads") {
        config.harness.concurrency = Some(parse_positive_usize(threads, "threads")?);
    }
    if let Some(batch_size) = matches.get_one::<String>("batch-size") {
        config.harness.batch_size = parse_positive_usize(batch_size, "batch-size")?;
    }
    if let Some(attempts) = matches.get_one::<String>("attempts") {
        config.harness.max_attempts = u32::try_from(parse_positive_usize(attempts, "attempts")?)
            .map_err(|_| "attempts is out of range")?;
    }
    if let Some(table) = matches.get_one::<String>("table") {
        validate_name(table, "table")?;
        config.table.name = table.clone();
    }
    if let Some(compression) = matches.get_one::<String>("compression") {
        config.table.compression = compression.parse::<CompressionType>()?;
    }
    Ok(())
}
