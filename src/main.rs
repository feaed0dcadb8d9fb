use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use compound::api::{
    ProjectionPayload, build_projection_response, current_year, request_from_payload,
};
use compound::core::{
    ChartSeriesKind, ProjectionInputs, Recalculator, Stepper, YearlySnapshot, format_axis_label,
    validate_start_year,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Compound interest projections with monthly contributions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator UI and JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
    },
    /// Print a single projection
    Project(ProjectArgs),
    /// Read edits from stdin and reprint the table once they settle
    Watch(WatchArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSeriesKind {
    ContributedPrincipal,
    TotalValue,
}

impl From<CliSeriesKind> for ChartSeriesKind {
    fn from(value: CliSeriesKind) -> Self {
        match value {
            CliSeriesKind::ContributedPrincipal => ChartSeriesKind::ContributedPrincipal,
            CliSeriesKind::TotalValue => ChartSeriesKind::TotalValue,
        }
    }
}

#[derive(Args, Debug)]
struct ProjectArgs {
    #[arg(long, default_value_t = 100.0, help = "Initial lump sum")]
    principal: f64,
    #[arg(
        long,
        default_value_t = 0.07,
        help = "Annual interest rate as a fraction, e.g. 0.07"
    )]
    rate: f64,
    #[arg(long, default_value_t = 15, help = "Projection horizon in years (1-100)")]
    years: u32,
    #[arg(long, default_value_t = 0.0, help = "Amount added every month")]
    monthly_contribution: f64,
    #[arg(long, help = "Calendar year for offset 0, defaults to the current year")]
    start_year: Option<i32>,
    #[arg(long, value_enum, default_value_t = CliSeriesKind::ContributedPrincipal)]
    series: CliSeriesKind,
    #[arg(long, help = "Emit the full response as JSON")]
    json: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[arg(long, help = "Calendar year for offset 0, defaults to the current year")]
    start_year: Option<i32>,
    #[arg(long, default_value_t = 300, help = "Quiet window before recomputing, in ms")]
    quiet_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port, host } => {
            if let Err(e) = compound::api::run_http_server(SocketAddr::new(host, port)).await {
                tracing::error!("server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => {
            if let Err(msg) = print_projection(args) {
                eprintln!("{msg}");
                std::process::exit(2);
            }
        }
        Command::Watch(args) => {
            if let Err(msg) = watch(args).await {
                eprintln!("{msg}");
                std::process::exit(2);
            }
        }
    }
}

fn print_projection(args: ProjectArgs) -> Result<(), String> {
    let payload = ProjectionPayload {
        years: Some(args.years),
        interest_rate: Some(args.rate),
        principal: Some(args.principal),
        monthly_contribution: Some(args.monthly_contribution),
        start_year: Some(args.start_year.unwrap_or_else(current_year)),
        series_kind: Some(args.series.into()),
        step: None,
    };
    let request = request_from_payload(payload).map_err(|e| e.to_string())?;
    let response = build_projection_response(&request);

    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("failed to serialize projection: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    print_table(&response.snapshots);
    Ok(())
}

fn print_table(snapshots: &[YearlySnapshot]) {
    println!(
        "{:>6} {:>14} {:>14} {:>14}",
        "Year", "Contributed", "Interest", "Total"
    );
    println!("{}", "-".repeat(51));
    for row in snapshots {
        println!(
            "{:>6} {:>14} {:>14} {:>14}",
            row.year,
            format_axis_label(row.principal_contributed),
            format_axis_label(row.earned_interest),
            format_axis_label(row.total_value),
        );
    }
}

/// Applies one stdin line to the draft inputs.
///
/// Accepts `+years`, `-years`, `+rate`, `-rate` and `field=value` with
/// `years`, `rate`, `principal` or `monthly`. Blank lines yield `None`.
fn parse_edit(line: &str, draft: ProjectionInputs) -> Result<Option<ProjectionInputs>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let stepper = match line {
        "+years" => Some(Stepper::IncrementYears),
        "-years" => Some(Stepper::DecrementYears),
        "+rate" => Some(Stepper::IncrementRate),
        "-rate" => Some(Stepper::DecrementRate),
        _ => None,
    };
    if let Some(stepper) = stepper {
        return Ok(Some(stepper.apply(draft)));
    }

    let Some((field, value)) = line.split_once('=') else {
        return Err(format!("unrecognised edit: {line}"));
    };
    let value = value.trim();
    let number = || {
        value
            .parse::<f64>()
            .map_err(|e| format!("invalid value for {}: {e}", field.trim()))
    };
    let next = match field.trim() {
        "years" => ProjectionInputs {
            years: value
                .parse()
                .map_err(|e| format!("invalid value for years: {e}"))?,
            ..draft
        },
        "rate" => ProjectionInputs {
            annual_rate: number()?,
            ..draft
        },
        "principal" => ProjectionInputs {
            principal: number()?,
            ..draft
        },
        "monthly" => ProjectionInputs {
            monthly_contribution: number()?,
            ..draft
        },
        other => return Err(format!("unknown field: {other}")),
    };
    Ok(Some(next))
}

async fn watch(args: WatchArgs) -> Result<(), String> {
    let start_year = args.start_year.unwrap_or_else(current_year);
    validate_start_year(start_year).map_err(|e| e.to_string())?;

    let mut recalc =
        Recalculator::with_quiet_window(start_year, Duration::from_millis(args.quiet_ms));
    let mut draft = ProjectionInputs::default();
    let projection = recalc.prime(draft).map_err(|e| e.to_string())?;
    print_table(&projection.snapshots);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        let deadline = recalc.pending_deadline();
        if !stdin_open && deadline.is_none() {
            return Ok(());
        }
        let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.map_err(|e| format!("failed to read stdin: {e}"))? {
                    Some(line) => match parse_edit(&line, draft) {
                        Ok(Some(next)) => {
                            draft = next;
                            recalc.submit(draft, Instant::now());
                        }
                        Ok(None) => {}
                        Err(msg) => eprintln!("{msg}"),
                    },
                    None => stdin_open = false,
                }
            }
            () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                if recalc.poll(Instant::now()) {
                    if let Some(projection) = recalc.current() {
                        print_table(&projection.snapshots);
                    }
                } else if let Some(err) = recalc.last_error() {
                    eprintln!("keeping previous projection: {err}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_edit_sets_fields() {
        let draft = ProjectionInputs::default();
        let next = parse_edit("years=20", draft).expect("valid").expect("edit");
        assert_eq!(next.years, 20);
        assert_eq!(next.principal, draft.principal);

        let next = parse_edit(" rate = 0.05 ", next).expect("valid").expect("edit");
        assert_eq!(next.annual_rate, 0.05);
        assert_eq!(next.years, 20);

        let next = parse_edit("principal=2500", next).expect("valid").expect("edit");
        let next = parse_edit("monthly=150", next).expect("valid").expect("edit");
        assert_eq!(next.principal, 2_500.0);
        assert_eq!(next.monthly_contribution, 150.0);
    }

    #[test]
    fn parse_edit_applies_steppers() {
        let draft = ProjectionInputs {
            years: 100,
            annual_rate: 0.0,
            ..ProjectionInputs::default()
        };
        let next = parse_edit("+years", draft).expect("valid").expect("edit");
        assert_eq!(next.years, 100);
        let next = parse_edit("-years", next).expect("valid").expect("edit");
        assert_eq!(next.years, 99);
        let next = parse_edit("-rate", next).expect("valid").expect("edit");
        assert_eq!(next.annual_rate, 0.0);
        let next = parse_edit("+rate", next).expect("valid").expect("edit");
        assert_eq!(next.annual_rate, 0.01);
    }

    #[test]
    fn parse_edit_passes_out_of_range_values_through() {
        // Range checks happen in the recalculator, which keeps the old table.
        let next = parse_edit("principal=-5", ProjectionInputs::default())
            .expect("parses")
            .expect("edit");
        assert_eq!(next.principal, -5.0);
    }

    #[test]
    fn parse_edit_rejects_garbage() {
        let draft = ProjectionInputs::default();
        assert_eq!(parse_edit("   ", draft), Ok(None));
        assert!(parse_edit("years=abc", draft).is_err());
        assert!(parse_edit("speed=3", draft).is_err());
        assert!(parse_edit("hello", draft).is_err());
        assert!(parse_edit("years=-1", draft).is_err());
    }
}
