//! Region boundary computation command

use clap::{Arg, ArgMatches, Command};
use region_bench::splitter::{
    is_strictly_increasing, regions_from_boundaries, BoundaryEncoding, BoundaryKey, KeyInterval,
    RangeSplitter, SplitAlgorithm,
};

use crate::cli::utils::{
    parse_i64, parse_positive_usize, print_header, print_warning, validate_region_count,
    CliError, CliResult, JsonOutput,
};
use crate::cli::GlobalOptions;

/// Build the 'split' subcommand
pub fn split_command() -> Command {
    Command::new("split")
        .about("Compute pre-split region boundaries for an integer key interval")
        .arg(
            Arg::new("start")
                .help("First key of the interval (inclusive)")
                .long("start")
                .default_value("0"),
        )
        .arg(
            Arg::new("end")
                .help("Last key of the interval (inclusive)")
                .long("end")
                .default_value("9999"),
        )
        .arg(
            Arg::new("count")
                .help("Number of regions")
                .long("count")
                .short('n')
                .required(true),
        )
        .arg(
            Arg::new("width")
                .help("Zero-pad boundaries to this many digits")
                .long("width"),
        )
        .arg(
            Arg::new("regions")
                .help("List the resulting regions instead of the bare boundaries")
                .long("regions")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Boundaries computed for one `split` invocation
#[derive(Debug)]
struct SplitReport {
    interval: KeyInterval,
    count: i64,
    encoding: BoundaryEncoding,
    boundaries: Vec<BoundaryKey>,
}

impl SplitReport {
    fn from_matches(matches: &ArgMatches) -> CliResult<Self> {
        let start = matches
            .get_one::<String>("start")
            .ok_or("start argument is required")?;
        let end = matches
            .get_one::<String>("end")
            .ok_or("end argument is required")?;
        let count = parse_i64(
            matches
                .get_one::<String>("count")
                .ok_or("count argument is required")?,
            "count",
        )?;
        validate_region_count(count)?;
        let encoding = match matches.get_one::<String>("width") {
            Some(width) => BoundaryEncoding::FixedWidth(parse_positive_usize(width, "width")?),
            None => BoundaryEncoding::Canonical,
        };

        let interval = KeyInterval::parse(start, end).map_err(CliError::from)?;
        let splitter = RangeSplitter::new(interval.clone()).with_encoding(encoding);
        let boundaries = splitter.split(count).map_err(CliError::from)?;
        Ok(Self {
            interval,
            count,
            encoding,
            boundaries,
        })
    }

    fn strictly_increasing(&self) -> bool {
        is_strictly_increasing(&self.boundaries)
    }

    fn rendered(&self) -> Vec<String> {
        self.boundaries.iter().map(ToString::to_string).collect()
    }

    fn regions(&self) -> Vec<String> {
        regions_from_boundaries(&self.boundaries)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Problems worth telling the user about; the boundaries are still printed.
    fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.strictly_increasing() {
            warnings.push(format!(
                "boundaries are not strictly increasing: {} regions exceed the usable granularity of {}",
                self.count, self.interval
            ));
        }
        if self.encoding == BoundaryEncoding::Canonical
            && self.interval.spans_digit_boundary()
            && self.count > 1
        {
            warnings.push(
                "interval spans a digit-count change; use --width to keep keys in numeric order"
                    .to_string(),
            );
        }
        warnings
    }

    fn to_json(&self, with_regions: bool) -> JsonOutput {
        let mut output = JsonOutput::new();
        output.status(true);
        output.add_str("start", &self.interval.start().to_string());
        output.add_str("end", &self.interval.end().to_string());
        output.add_uint("count", self.count as u64);
        output.add_string_array("boundaries", &self.rendered());
        output.add_bool("strictly_increasing", self.strictly_increasing());
        if with_regions {
            output.add_string_array("regions", &self.regions());
        }
        output
    }
}

/// Execute the 'split' command
pub fn run_split(matches: &ArgMatches) -> CliResult<()> {
    let global = GlobalOptions::from_matches(matches);
    global.load_config()?;

    let report = SplitReport::from_matches(matches)?;
    let with_regions = matches.get_flag("regions");

    if global.is_json() {
        report.to_json(with_regions).print();
        return Ok(());
    }

    for warning in report.warnings() {
        print_warning(&warning);
    }
    if with_regions {
        if !global.quiet {
            print_header(&format!("{} regions over {}", report.count, report.interval));
        }
        for region in report.regions() {
            println!("{}", region);
        }
    } else {
        for boundary in report.rendered() {
            println!("{}", boundary);
        }
    }
    Ok(())
}
