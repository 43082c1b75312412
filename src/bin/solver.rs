// The prover CLI (spec.md 6). Three entry points share one binary: a single-strategy run over
// one TPTP file, a portfolio run across a schedule, and a CASC-LTB batch run over a batch
// specification file. `--slice`/`--timeout-secs` is the hidden form `portfolio::ProcessExecutor`
// re-invokes this same binary with, one child per slice.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use vamp_saturate::batch::{parse_batch_file, BatchRunner};
use vamp_saturate::error::ProverError;
use vamp_saturate::ordering::{Kbo, Lpo, TermOrdering};
use vamp_saturate::output::{format_status_line, SzsStatus};
use vamp_saturate::portfolio::{ThreadExecutor, SLOWNESS};
use vamp_saturate::proof_step::Role;
use vamp_saturate::saturation::SaturationLoop;
use vamp_saturate::schedule::{schedules_for, ProblemCategory};
use vamp_saturate::selector::{
    LiteralSelector, MaximalitySelector, NegativePrioritySelector, ReverseMaximalSelector, SizeBasedSelector,
};
use vamp_saturate::strategy::{self, OrderingKind, SelectorKind, StrategyConfig};
use vamp_saturate::term::TermFactory;
use vamp_saturate::tptp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "snake_case")]
enum Mode {
    Single,
    Portfolio,
    CascLtb,
}

#[derive(Parser)]
struct Args {
    /// When set, print the version and exit.
    #[clap(long, short)]
    version: bool,

    #[clap(long, value_enum, default_value = "single")]
    mode: Mode,

    /// Term ordering to use in single-strategy mode.
    #[clap(long, default_value = "kbo")]
    ord: String,

    /// Literal selection function to use in single-strategy mode.
    #[clap(long, default_value = "max")]
    sel: String,

    /// Age/weight ratio as `age:weight`, e.g. `1:4`.
    #[clap(long, default_value = "1:1")]
    nwc: String,

    /// Overall time budget in seconds.
    #[clap(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Re-invocation form: run exactly one slice, as `ProcessExecutor` shells out to.
    #[clap(long)]
    slice: Option<String>,

    /// The TPTP problem file (single/portfolio mode) or batch file (casc_ltb mode).
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    color_backtrace::install();
    let args = Args::parse();

    if args.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let Some(input) = args.input.clone() else {
        eprintln!("error: no input file given");
        return ExitCode::from(2);
    };

    let result = if let Some(slice) = &args.slice {
        run_slice_mode(slice, &input, Duration::from_secs(args.timeout_secs))
    } else {
        match args.mode {
            Mode::Single => run_single_mode(&args, &input),
            Mode::Portfolio => run_portfolio_mode(&args, &input),
            Mode::CascLtb => run_casc_ltb_mode(&input),
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn build_strategy(args: &Args) -> Result<StrategyConfig, ProverError> {
    let mut config = StrategyConfig::default();
    config.ordering = match args.ord.as_str() {
        "lpo" => OrderingKind::Lpo,
        _ => OrderingKind::Kbo,
    };
    config.selector = match args.sel.as_str() {
        "neg" => SelectorKind::NegativePriority,
        "rev" => SelectorKind::ReverseMaximal,
        "size" => SelectorKind::SizeBased,
        _ => SelectorKind::Maximality,
    };
    let (age, weight) = args
        .nwc
        .split_once(':')
        .ok_or_else(|| ProverError::UserError(format!("malformed --nwc value: {}", args.nwc)))?;
    config.age_weight = age
        .parse()
        .map_err(|_| ProverError::UserError(format!("malformed --nwc age: {}", age)))?;
    config.weight_weight = weight
        .parse()
        .map_err(|_| ProverError::UserError(format!("malformed --nwc weight: {}", weight)))?;
    config.time_budget = Duration::from_secs(args.timeout_secs);
    Ok(config)
}

fn build_ordering(kind: OrderingKind, factory: &TermFactory) -> Box<dyn TermOrdering> {
    match kind {
        OrderingKind::Kbo => Box::new(Kbo::from_signature(&factory.signature)),
        OrderingKind::Lpo => Box::new(Lpo::from_signature(&factory.signature)),
    }
}

fn build_selector(kind: SelectorKind) -> Box<dyn LiteralSelector> {
    match kind {
        SelectorKind::Maximality => Box::new(MaximalitySelector),
        SelectorKind::NegativePriority => Box::new(NegativePrioritySelector),
        SelectorKind::ReverseMaximal => Box::new(ReverseMaximalSelector),
        SelectorKind::SizeBased => Box::new(SizeBasedSelector),
    }
}

/// Runs one strategy to completion and prints its SZS status line. Returns `Ok(true)` for a
/// clean `0` exit (spec.md 6: "`0` if a refutation or satisfiability is reported").
fn run_single_mode(args: &Args, input: &PathBuf) -> Result<bool, ProverError> {
    let config = build_strategy(args)?;
    let text = std::fs::read_to_string(input).map_err(|e| ProverError::UserError(format!("cannot read {}: {}", input.display(), e)))?;

    let mut factory = TermFactory::new();
    let clauses = tptp::parse_cnf_file(&mut factory, &text)?;
    let has_goal = clauses.iter().any(|c| c.role == Role::NegatedGoal);

    let ordering = build_ordering(config.ordering, &factory);
    let selector = build_selector(config.selector);
    let mut loop_ = SaturationLoop::new(factory, ordering, selector, config.age_weight, config.weight_weight, config.complete, false);
    for clause in clauses {
        loop_.add_input_clause(clause.clause, clause.role);
    }
    let outcome = loop_.run(config.time_budget);

    let problem = input.display().to_string();
    let status = SzsStatus::from_outcome(&outcome, has_goal);
    println!("{}", format_status_line(status, &problem));
    Ok(status.has_proof_body() || status == SzsStatus::Unsatisfiable || status == SzsStatus::CounterSatisfiable)
}

fn run_portfolio_mode(args: &Args, input: &PathBuf) -> Result<bool, ProverError> {
    let text = std::fs::read_to_string(input).map_err(|e| ProverError::UserError(format!("cannot read {}: {}", input.display(), e)))?;
    let (quick, fallback) = schedules_for(ProblemCategory::Horn);
    let executor = ThreadExecutor::new(4);
    let budget = Duration::from_secs(args.timeout_secs);

    let already_run: Vec<String> = quick.iter().map(|s| s.to_string()).collect();
    let outcome = executor.run_schedule(&quick, &text, budget).or_else(|| {
        let mut remaining = vamp_saturate::schedule::Schedule::new();
        for slice in fallback.skip_already_run(&already_run) {
            remaining.push(slice);
        }
        executor.run_schedule(&remaining, &text, budget)
    });

    let problem = input.display().to_string();
    match outcome {
        Some(slice_outcome) => {
            let status = SzsStatus::from_outcome(&slice_outcome.outcome, slice_outcome.has_goal);
            println!("{}", format_status_line(status, &problem));
            Ok(status.has_proof_body() || status == SzsStatus::Unsatisfiable || status == SzsStatus::CounterSatisfiable)
        }
        None => {
            println!("{}", format_status_line(SzsStatus::GaveUp, &problem));
            Ok(false)
        }
    }
}

fn run_casc_ltb_mode(batch_path: &PathBuf) -> Result<bool, ProverError> {
    let text = std::fs::read_to_string(batch_path)
        .map_err(|e| ProverError::UserError(format!("cannot read {}: {}", batch_path.display(), e)))?;
    let config = parse_batch_file(&text)?;
    let mut runner = BatchRunner::new(config);
    runner.run()?;
    print!("{}", runner.render_output());
    println!("{}", runner.summary());
    Ok(runner.results.iter().any(|r| r.status.has_proof_body()))
}

/// The re-invocation form `portfolio::ProcessExecutor::run_slice` shells out to: run exactly one
/// slice against `problem_path` and exit `0` only on a genuine refutation, matching the parent's
/// "exit code is the only signal observed" contract.
fn run_slice_mode(slice: &str, problem_path: &PathBuf, budget: Duration) -> Result<bool, ProverError> {
    let config = strategy::parse_slice(slice)?;
    let scaled = config.time_budget.mul_f64(SLOWNESS).min(budget);
    let text = std::fs::read_to_string(problem_path)
        .map_err(|e| ProverError::UserError(format!("cannot read {}: {}", problem_path.display(), e)))?;

    let mut factory = TermFactory::new();
    let clauses = tptp::parse_cnf_file(&mut factory, &text)?;
    let has_goal = clauses.iter().any(|c| c.role == Role::NegatedGoal);

    let ordering = build_ordering(config.ordering, &factory);
    let selector = build_selector(config.selector);
    let mut loop_ = SaturationLoop::new(factory, ordering, selector, config.age_weight, config.weight_weight, config.complete, false);
    for clause in clauses {
        loop_.add_input_clause(clause.clause, clause.role);
    }
    let outcome = loop_.run(scaled);

    let problem = problem_path.display().to_string();
    let status = SzsStatus::from_outcome(&outcome, has_goal);
    println!("{}", format_status_line(status, &problem));
    Ok(status.has_proof_body())
}
