use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod calendar;
mod config;
mod consolidate;
mod error;
mod loader;
mod models;
mod normalize;
mod output;
mod report;

use config::{ConsolidateOptions, GroupOrder, GroupingMode};
use models::AbsenceInterval;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "absence-consolidator")]
#[command(about = "Collapse daily absence rows into absence intervals for school documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Attendance sheet (.csv, .xlsx, .xls, .ods)
    #[arg(long)]
    input: PathBuf,
    /// Worksheet name; defaults to the first sheet
    #[arg(long)]
    sheet: Option<String>,
    /// JSON file with column names and consolidation options
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    grouping: Option<GroupingMode>,
    #[arg(long, value_enum)]
    group_order: Option<GroupOrder>,
    /// Reason written when a run has none
    #[arg(long)]
    placeholder: Option<String>,
    /// Order intervals by student number
    #[arg(long)]
    sort: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write consolidated intervals as CSV or JSON
    Consolidate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "absence-report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Consolidate { input, format, out } => {
            let intervals = load_and_consolidate(&input)?;
            if intervals.is_empty() {
                eprintln!("No absence rows found in {}.", input.input.display());
            }

            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    output::write_intervals(std::io::BufWriter::new(file), &intervals, format)?;
                    println!("Wrote {} intervals to {}.", intervals.len(), path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    output::write_intervals(&mut handle, &intervals, format)?;
                    handle.flush()?;
                }
            }
        }
        Commands::Report { input, out } => {
            let intervals = load_and_consolidate(&input)?;
            let report = report::build_report(&input.input.display().to_string(), &intervals);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_and_consolidate(args: &InputArgs) -> anyhow::Result<Vec<AbsenceInterval>> {
    let options = resolve_options(args)?;
    let table = loader::read_table(&args.input, args.sheet.as_deref())
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    consolidate::consolidate(&table, &options)
        .with_context(|| format!("cannot consolidate {}", args.input.display()))
}

fn resolve_options(args: &InputArgs) -> anyhow::Result<ConsolidateOptions> {
    let mut options = match args.config.as_deref() {
        Some(path) => ConsolidateOptions::from_json_file(Path::new(path))?,
        None => ConsolidateOptions::default(),
    };

    if let Some(grouping) = args.grouping {
        options.grouping = grouping;
    }
    if let Some(group_order) = args.group_order {
        options.group_order = group_order;
    }
    if let Some(placeholder) = &args.placeholder {
        options.reason_placeholder = placeholder.clone();
    }
    if args.sort {
        options.sort_by_student_number = true;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> InputArgs {
        let mut argv = vec!["absence-consolidator", "report", "--input", "march.csv"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Report { input, .. } => input,
            Commands::Consolidate { .. } => unreachable!(),
        }
    }

    #[test]
    fn flags_override_defaults() {
        let options = resolve_options(&args(&[
            "--grouping",
            "by-category-and-reason",
            "--group-order",
            "first-appearance",
            "--placeholder",
            "pending",
            "--sort",
        ]))
        .unwrap();
        assert_eq!(options.grouping, GroupingMode::ByCategoryAndReason);
        assert_eq!(options.group_order, GroupOrder::FirstAppearance);
        assert_eq!(options.reason_placeholder, "pending");
        assert!(options.sort_by_student_number);
    }

    #[test]
    fn without_flags_defaults_apply() {
        assert_eq!(resolve_options(&args(&[])).unwrap(), ConsolidateOptions::default());
    }

    #[test]
    fn end_to_end_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.csv");
        std::fs::write(
            &path,
            "번호,성명,일자,출결구분,사유\n\
             101,Kim,2024.03.04,질병으로 인한 결석,건강 문제로 인한 결석\n\
             ,,2024.03.05,질병으로 인한 결석,\n\
             ,,2024.03.06,출석,\n\
             ,,2024.03.07,질병으로 인한 결석,\n\
             102,Lee,2024.13.40,기타결석,여행\n",
        )
        .unwrap();

        let input = InputArgs {
            input: path,
            sheet: None,
            config: None,
            grouping: None,
            group_order: None,
            placeholder: None,
            sort: false,
        };
        let intervals = load_and_consolidate(&input).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].display_date(), "2024.03.04 ~ 2024.03.05");
        assert_eq!(intervals[0].reason, "건강 문제");
        assert_eq!(intervals[1].day_count, 1);
        assert_eq!(intervals[1].reason, "사유입력");
    }
}
