//! Table lifecycle command: create (optionally pre-split), inspect, drop

use clap::{Arg, ArgMatches, Command};
use region_bench::splitter::{BoundaryEncoding, KeyInterval, RangeSplitter, SplitAlgorithm};
use region_bench::store::{
    ColumnFamilyDescriptor, CompressionType, MemoryStore, StoreClient, TableDescriptor,
};

use crate::cli::utils::{
    parse_i64, parse_positive_usize, print_header, print_success, validate_name,
    validate_region_count, CliError, CliResult, JsonOutput,
};
use crate::cli::GlobalOptions;

/// Build the 'table' subcommand
pub fn table_command() -> Command {
    Command::new("table")
        .about("Create a table, show its regions, then disable and delete it")
        .arg(Arg::new("name").help("Table name").long("name"))
        .arg(Arg::new("family").help("Column family").long("family"))
        .arg(
            Arg::new("compression")
                .help("Column family compression")
                .long("compression")
                .value_parser(["none", "gz", "lz4", "snappy", "zstd"]),
        )
        .arg(
            Arg::new("split-count")
                .help("Pre-split into this many regions")
                .long("split-count"),
        )
        .arg(
            Arg::new("start")
                .help("First key of the split interval (inclusive)")
                .long("start")
                .default_value("0"),
        )
        .arg(
            Arg::new("end")
                .help("Last key of the split interval (inclusive)")
                .long("end")
                .default_value("9999"),
        )
        .arg(
            Arg::new("width")
                .help("Zero-pad split keys to this many digits")
                .long("width"),
        )
        .arg(
            Arg::new("keep")
                .help("Leave the table enabled instead of dropping it")
                .long("keep")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Execute the 'table' command
pub fn run_table(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    let config = global.load_config()?;

    let name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(|| config.table.name.clone());
    validate_name(&name, "table")?;
    let family = matches
        .get_one::<String>("family")
        .cloned()
        .unwrap_or_else(|| config.table.family.clone());
    validate_name(&family, "family")?;
    let compression = match matches.get_one::<String>("compression") {
        Some(value) => value.parse::<CompressionType>()?,
        None => config.table.compression,
    };

    let split_keys = match matches.get_one::<String>("split-count") {
        Some(count) => {
            let count = parse_i64(count, "split-count")?;
            validate_region_count(count)?;
            let start = matches
                .get_one::<String>("start")
                .ok_or("start argument is required")?;
            let end = matches
                .get_one::<String>("end")
                .ok_or("end argument is required")?;
            let encoding = match matches.get_one::<String>("width") {
                Some(width) => BoundaryEncoding::FixedWidth(parse_positive_usize(width, "width")?),
                None => BoundaryEncoding::Canonical,
            };
            let interval = KeyInterval::parse(start, end).map_err(CliError::from)?;
            let splitter = RangeSplitter::new(interval).with_encoding(encoding);
            Some(splitter.split(count).map_err(CliError::from)?)
        }
        None => None,
    };

    let store = MemoryStore::new();
    let connection = store.connect(&config.store).map_err(CliError::from)?;
    let admin = connection.admin().map_err(CliError::from)?;

    if admin.table_exists(&name).map_err(CliError::from)? {
        return Err(CliError::TableExists(name).into());
    }
    let descriptor = TableDescriptor::new(name.clone())
        .add_family(ColumnFamilyDescriptor::new(family.clone()).with_compression(compression));
    admin
        .create_table(&descriptor, split_keys.as_deref())
        .map_err(CliError::from)?;

    let regions: Vec<String> = store
        .region_writes(&name)
        .map_err(CliError::from)?
        .into_iter()
        .map(|(region, _)| region.to_string())
        .collect();

    let keep = matches.get_flag("keep");
    if !keep {
        admin.disable_table(&name).map_err(CliError::from)?;
        admin.delete_table(&name).map_err(CliError::from)?;
    }
    let exists = admin.table_exists(&name).map_err(CliError::from)?;
    admin.close().map_err(CliError::from)?;
    connection.close().map_err(CliError::from)?;

    if global.is_json() {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("table", &name);
        output.add_str("family", &family);
        output.add_str("compression", &compression.to_string());
        output.add_string_array("regions", &regions);
        output.add_bool("exists", exists);
        output.print();
        return Ok(());
    }
    if global.quiet {
        return Ok(());
    }

    print_success(&format!(
        "Created table '{}' (family '{}', compression {})",
        name, family, compression
    ));
    print_header(&format!("{} regions", regions.len()));
    for region in &regions {
        println!("  {}", region);
    }
    if keep {
        print_success(&format!("Table '{}' left enabled", name));
    } else {
        print_success(&format!("Disabled and deleted table '{}'", name));
    }
    Ok(())
}
