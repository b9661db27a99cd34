//! `roster` - command-line front end for shift rostering.
//!
//! # Usage
//!
//! ```bash
//! # Write the default configuration
//! roster init-config
//!
//! # Solve a week and write the report
//! roster solve --input week.json --output report.json
//!
//! # Force a strategy
//! roster solve --input week.json --strategy cp
//!
//! # Score one candidate
//! roster evaluate --input week.json --shift S1 --employee E7
//! ```
//!
//! Logs go to stderr; stdout carries JSON only.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_roster::analysis::ScheduleReport;
use shift_roster::classify::classify_with_reason;
use shift_roster::config::RosterConfig;
use shift_roster::evaluation::{CandidateContext, CandidateEvaluator};
use shift_roster::models::SchedulingProblem;
use shift_roster::solver::{MultiSolverScheduler, Strategy};
use shift_roster::validation::validate_problem;

const DEFAULT_CONFIG: &str = "roster.toml";

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Employee shift rostering")]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a scheduling problem and print the report
    Solve {
        /// Problem JSON
        #[arg(long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
        strategy: StrategyArg,
    },

    /// Print the complexity class of a problem
    Classify {
        #[arg(long)]
        input: PathBuf,
    },

    /// Check a problem for invalid input
    Validate {
        #[arg(long)]
        input: PathBuf,
    },

    /// Score one employee for one shift
    Evaluate {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        shift: String,

        #[arg(long)]
        employee: String,
    },

    /// Write the default configuration file
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Auto,
    Greedy,
    Cp,
    MultiStage,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => Strategy::Auto,
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::Cp => Strategy::ConstraintProgramming,
            StrategyArg::MultiStage => Strategy::MultiStage,
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn read_problem(path: &Path) -> Result<SchedulingProblem> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RosterConfig::load(&cli.config)
        .with_context(|| format!("load {}", cli.config.display()))?;
    init_tracing(&config.logging.filter);

    match cli.command {
        Command::Solve {
            input,
            output,
            strategy,
        } => {
            let problem = read_problem(&input)?;
            let solution = MultiSolverScheduler::from_config(&config)
                .solve_with(&problem, strategy.into())?;
            info!(
                assigned = solution.assignments.len(),
                unassignable = solution.unassignable.len(),
                solver = solution.solver.as_str(),
                solve_time_ms = solution.solve_time_ms,
                "solve finished"
            );
            let report = ScheduleReport::build(&problem, solution);
            match output {
                Some(path) => {
                    let text = serde_json::to_string_pretty(&report).context("serialize report")?;
                    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
                    info!(path = %path.display(), "wrote report");
                }
                None => print_json(&report)?,
            }
        }

        Command::Classify { input } => {
            let problem = read_problem(&input)?;
            let (complexity, rule) = classify_with_reason(&problem);
            print_json(&json!({ "complexity": complexity, "rule": rule }))?;
        }

        Command::Validate { input } => {
            let problem = read_problem(&input)?;
            if let Err(errors) = validate_problem(&problem) {
                for error in &errors {
                    eprintln!("{error}");
                }
                bail!("{} validation error(s)", errors.len());
            }
            print_json(&json!({ "valid": true }))?;
        }

        Command::Evaluate {
            input,
            shift,
            employee,
        } => {
            let problem = read_problem(&input)?;
            let clock = problem.clock().map_err(anyhow::Error::msg)?;
            let shift = problem
                .shift(&shift)
                .with_context(|| format!("unknown shift '{shift}'"))?;
            let employee = problem
                .employee(&employee)
                .with_context(|| format!("unknown employee '{employee}'"))?;

            let ctx =
                CandidateContext::new(shift, employee, &problem.constraints).with_clock(clock);
            let score = CandidateEvaluator::standard().evaluate(&ctx);
            let trace: Vec<_> = score
                .trace
                .iter()
                .map(|t| json!({ "rule": t.rule, "delta": t.delta }))
                .collect();
            print_json(&json!({
                "shiftId": shift.id,
                "employeeId": employee.id,
                "score": score.score,
                "reasons": score.reasons,
                "warnings": score.warnings,
                "rejectedBy": score.rejected_by,
                "trace": trace,
            }))?;
        }

        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            RosterConfig::default().save(&path)?;
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}
