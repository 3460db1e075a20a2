mod errors;
mod report;

use {
    clap::{Parser, Subcommand},
    color_eyre::eyre::Result,
    credence_adapters::{
        load_evidence, parse_subset, save_evidence,
        scenario::{load_scenario, Scenario},
        EvidenceFile,
    },
    credence_engine::{CombinationRule, EvidenceError, MassFunction, Subset},
    errors::*,
    std::path::PathBuf,
    std::str::FromStr,
    tracing::{debug, info},
    tracing_subscriber::layer::SubscriberExt,
    tracing_subscriber::{EnvFilter, Registry},
};

/// credence-cli combines evidence from independent sources and reports the
/// belief and plausibility of queried events.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[clap(arg_required_else_help = true)]
struct Cli {
    /// Log levels: error, warn, info, debug, trace
    ///
    /// Default is "info".
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// The subcommands supported by the Credence CLI.
#[derive(Subcommand)]
enum Command {
    /// Report belief and plausibility intervals for an evidence file
    Intervals {
        /// Sets the evidence file to load
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Adds an event to query, in brace notation.
        ///
        /// Default is every singleton in the frame.
        #[arg(short, long, value_name = "SUBSET")]
        event: Vec<String>,
    },
    /// Combine two or more evidence files and report the result
    Combine {
        /// Sets the evidence files to combine
        #[arg(short, long, value_name = "FILE", required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Sets the combination rule: dempster, yager
        #[arg(short, long, default_value = "dempster")]
        rule: String,

        /// Discounts every source by a reliability factor before combining
        #[arg(short, long, value_name = "FACTOR")]
        discount: Option<f64>,

        /// Adds an event to query, in brace notation.
        ///
        /// Default is every singleton in the frame.
        #[arg(short, long, value_name = "SUBSET")]
        event: Vec<String>,

        /// Also writes the combined evidence to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Discount an evidence file by a reliability factor
    Discount {
        /// Sets the evidence file to load
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Sets the discount factor, between 0.0 and 1.0
        #[arg(short, long, value_name = "FACTOR")]
        factor: f64,

        /// Writes the discounted evidence to a file instead of reporting it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Compare Dempster's and Yager's rules on the same evidence
    Compare {
        /// Sets the evidence files to combine
        #[arg(short, long, value_name = "FILE", required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Run a scenario file and report its queries
    Run {
        /// Sets the scenario file to load
        #[arg(short, long, value_name = "FILE")]
        scenario: PathBuf,

        /// Also writes the combined evidence to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// An [`EnvFilter`] pattern to limit matched log events to error events.
const ERROR_FILTER: &str = "error";
/// An [`EnvFilter`] pattern to limit matched log events to warning events.
const WARN_FILTER: &str = "warn";
/// An [`EnvFilter`] pattern to limit matched log events to informational events.
const INFO_FILTER: &str = "info";
/// An [`EnvFilter`] pattern to limit matched log events to debug events.
const DEBUG_FILTER: &str = "debug";
/// An [`EnvFilter`] pattern to limit matched log events to trace events.
const TRACE_FILTER: &str = "trace";

fn init_tracing(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install()?;

    let log_level: &str = cli.log_level.as_ref().map_or("info", |ll| ll.as_str());
    let subscriber = Registry::default()
        // Reports go to stdout, so log events go to stderr.
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(
            match log_level.to_ascii_lowercase().as_str() {
                "error" => ERROR_FILTER,
                "warn" => WARN_FILTER,
                "info" => INFO_FILTER,
                "debug" => DEBUG_FILTER,
                "trace" => TRACE_FILTER,
                _ => log_level,
            },
        ));
    tracing::subscriber::set_global_default(subscriber).unwrap();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    // You can check for the existence of subcommands, and if found use their
    // matches just as you would the top level cmd
    match &cli.command.ok_or(CliArgumentError::MissingSubcommand)? {
        Command::Intervals { input, event } => {
            let evidence = load_evidence(input)?;
            let mass_function = evidence.mass_function()?;
            let events = parse_events(event, &mass_function)?;
            println!(
                "{}",
                report::mass_distribution("Mass distribution", &mass_function)
            );
            println!();
            println!("{}", report::interval_table(&mass_function, &events)?);
        }
        Command::Combine {
            input,
            rule,
            discount,
            event,
            output,
        } => {
            let rule = CombinationRule::from_str(rule)
                .map_err(|_| CliArgumentError::InvalidRule(rule.clone()))?;
            let mut sources = load_sources(input)?;
            if let Some(factor) = discount {
                for source in &mut sources {
                    *source = source.discount(*factor)?;
                }
            }
            let combined = MassFunction::combine_multiple(&sources, rule)?;
            let events = parse_events(event, &combined)?;
            println!(
                "{}",
                report::mass_distribution("Combined mass distribution", &combined)
            );
            println!();
            println!("{}", report::interval_table(&combined, &events)?);
            if let Some(output) = output {
                save_evidence(&EvidenceFile::from_mass_function(&combined, None), output)?;
                info!(
                    message = "wrote combined evidence",
                    path = %output.display(),
                );
            }
        }
        Command::Discount {
            input,
            factor,
            output,
        } => {
            let evidence = load_evidence(input)?;
            let discounted = evidence.mass_function()?.discount(*factor)?;
            match output {
                Some(output) => {
                    save_evidence(
                        &EvidenceFile::from_mass_function(
                            &discounted,
                            evidence.parameters.description.clone(),
                        ),
                        output,
                    )?;
                    info!(
                        message = "wrote discounted evidence",
                        path = %output.display(),
                    );
                }
                None => println!(
                    "{}",
                    report::mass_distribution("Discounted mass distribution", &discounted)
                ),
            }
        }
        Command::Compare { input } => {
            let sources = load_sources(input)?;
            // Pairwise conflict is only well-defined for exactly two sources.
            let conflict = match sources.as_slice() {
                [first, second] => Some(first.conflict(second)?),
                _ => None,
            };
            let yager = MassFunction::combine_multiple(&sources, CombinationRule::Yager)?;
            // Total conflict leaves Dempster's rule undefined; the comparison
            // still shows the Yager half.
            let dempster = match MassFunction::combine_multiple(&sources, CombinationRule::Dempster)
            {
                Ok(combined) => Some(combined),
                Err(EvidenceError::TotalConflict) => None,
                Err(error) => return Err(error.into()),
            };
            println!(
                "{}",
                report::rule_comparison(&yager, dempster.as_ref(), conflict)?
            );
        }
        Command::Run { scenario, output } => {
            let scenario = load_scenario(scenario)?;
            let combined = run_scenario(&scenario)?;
            if let Some(output) = output {
                save_evidence(
                    &EvidenceFile::from_mass_function(&combined, scenario.title.clone()),
                    output,
                )?;
                info!(
                    message = "wrote combined evidence",
                    path = %output.display(),
                );
            }
        }
    }
    Ok(())
}

fn load_sources(paths: &[PathBuf]) -> Result<Vec<MassFunction>, Box<dyn std::error::Error>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(load_evidence(path)?.mass_function()?);
    }
    Ok(sources)
}

fn parse_events(
    labels: &[String],
    mass_function: &MassFunction,
) -> Result<Vec<Subset>, Box<dyn std::error::Error>> {
    if labels.is_empty() {
        return Ok(singleton_events(mass_function));
    }
    let mut events = Vec::with_capacity(labels.len());
    for label in labels {
        events.push(parse_subset(label)?);
    }
    Ok(events)
}

fn singleton_events(mass_function: &MassFunction) -> Vec<Subset> {
    mass_function
        .frame()
        .elements()
        .map(|element| Subset::new([element]))
        .collect()
}

fn run_scenario(scenario: &Scenario) -> Result<MassFunction, Box<dyn std::error::Error>> {
    if let Some(title) = &scenario.title {
        println!("=== {} ===", title);
        println!();
    }
    for source in &scenario.sources {
        println!(
            "{}",
            report::mass_distribution(&source.name, &source.mass_function)
        );
        println!();
    }
    debug!(
        message = "combining scenario sources",
        rule = %scenario.rule,
        sources = scenario.sources.len(),
    );
    let combined = scenario.combine()?;
    println!(
        "{}",
        report::mass_distribution(&format!("Combined ({})", scenario.rule), &combined)
    );
    println!();
    let events = if scenario.queries.is_empty() {
        singleton_events(&combined)
    } else {
        scenario.queries.clone()
    };
    println!("{}", report::interval_table(&combined, &events)?);
    Ok(combined)
}
