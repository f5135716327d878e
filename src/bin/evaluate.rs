//! Evaluate branch predictors against one or more traces.

use anyhow::{ bail, Context, Result };
use clap::{ Parser, ValueEnum };
use hybridpred::*;
use hybridpred::stats::*;
use hybridpred::trace::synthetic::SyntheticTrace;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Selection {
    Gshare,
    Hybrid,
    Stub,
    All,
}

#[derive(Parser, Debug)]
#[command(about = "Evaluate branch predictors against branch traces")]
struct Args {
    /// Predictor to evaluate
    #[arg(short, long, value_enum, default_value_t = Selection::All)]
    predictor: Selection,

    /// Only use the first N records of each trace
    #[arg(short, long)]
    limit: Option<usize>,

    /// Also evaluate a synthetic trace with N records
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for the synthetic trace
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of low hit-rate branches to print
    #[arg(long, default_value_t = 0)]
    low_rate: usize,

    /// Binary trace files
    traces: Vec<PathBuf>,
}

fn report(name: &str, stat: &BranchStats, args: &Args) {
    println!("  {:20} Global hit rate: {}/{} ({:.2}% correct) ({} misses)",
        name,
        stat.global_hits(),
        stat.global_brns(),
        stat.hit_rate() * 100.0,
        stat.global_miss()
    );
    for (pc, data) in stat.get_low_rate_branches(args.low_rate, 100, 0.55) {
        let recent: String = data.recent_outcomes(32).iter()
            .map(|o| format!("{:?}", o))
            .collect();
        println!("    {:016x} {:8}/{:8} {:.4} taken={:8} {}",
            pc, data.hits, data.occ, data.hit_rate(), data.times_taken(),
            recent
        );
    }
}

/// Print a summary of the conditional branches in a trace.
fn describe(records: &[BranchRecord]) {
    let mut stat = BranchStats::new();
    for record in records.iter().filter(|r| r.is_conditional()) {
        stat.update(record, record.outcome());
    }
    println!("  {} unique conditional branches ({} always taken, {} never taken)",
        stat.num_unique_branches(),
        stat.num_always_taken(),
        stat.num_never_taken()
    );
}

fn run_test<P: BranchPredictor>(mut p: P, records: &[BranchRecord], args: &Args)
    -> P
{
    let start = Instant::now();
    let stat = sim::run(&mut p, records);
    log::debug!("{} simulated in {:.3?}", p.name(), start.elapsed());
    report(p.name(), &stat, args);
    p
}

fn evaluate(records: &[BranchRecord], args: &Args) {
    describe(records);
    let sel = args.predictor;
    if matches!(sel, Selection::Stub | Selection::All) {
        run_test(StubPredictor, records, args);
    }
    if matches!(sel, Selection::Gshare | Selection::All) {
        run_test(GsharePredictor::new(), records, args);
    }
    if matches!(sel, Selection::Hybrid | Selection::All) {
        let p = run_test(HybridPredictor::new(), records, args);
        println!("    Fallback component: {} misses, {} hits",
            p.stat.fallback_miss, p.stat.fallback_hits
        );
        println!("    Global component:   {} misses, {} hits",
            p.stat.global_miss, p.stat.global_hits
        );
        println!("    {} allocations ({} failed), {:.2}% of {} entries utilized",
            p.stat.alcs, p.stat.failed_alcs, p.global().utilization(),
            p.global().size()
        );
        println!("    {} rows, {}-way set-associative",
            p.global().size() / p.global().ways(), p.global().ways()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.traces.is_empty() && args.synthetic.is_none() {
        bail!("no traces provided (pass trace files and/or --synthetic N)");
    }

    if let Some(len) = args.synthetic {
        let trace = SyntheticTrace::generate(len, args.seed);
        println!("[*] synthetic (seed={}, {} records)", args.seed, len);
        evaluate(trace.as_slice(), &args);
    }

    let traces = BinaryTraceSet::new_from_slice(&args.traces);
    for (path, trace) in args.traces.iter().zip(traces) {
        let trace = trace.with_context(|| {
            format!("failed to load trace {}", path.display())
        })?;
        let records = match args.limit {
            Some(limit) => trace.as_slice_trunc(limit),
            None => trace.as_slice(),
        };
        println!("[*] {} ({} records)", trace.name(), records.len());
        evaluate(records, &args);
    }
    Ok(())
}
