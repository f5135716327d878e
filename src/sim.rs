//! Driving a [BranchPredictor] with a trace of branch records.

use log::info;

use crate::branch::*;
use crate::predictor::*;
use crate::stats::*;

/// Feed each record to a predictor [in order], training it with the
/// resolved outcome and target. Only conditional branches are scored.
pub fn run<P: BranchPredictor>(p: &mut P, records: &[BranchRecord])
    -> BranchStats
{
    let mut stats = BranchStats::new();
    for record in records {
        let inflight = p.begin(&record.info());
        let prediction = inflight.resolve(record.outcome(), record.tgt);
        if record.is_conditional() {
            stats.update(record, prediction);
        }
    }
    info!("{}: {}/{} correct over {} records",
        p.name(), stats.global_hits(), stats.global_brns(), records.len());
    stats
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trace::synthetic::SyntheticTrace;

    #[test]
    fn only_conditional_branches_are_scored() {
        let records = [
            BranchRecord::new(0x10, 0x20, BranchKind::DirectJump, Outcome::T),
            BranchRecord::new(0x20, 0x90, BranchKind::DirectBranch, Outcome::T),
            BranchRecord::new(0x30, 0x10, BranchKind::Return, Outcome::T),
        ];
        let stats = run(&mut StubPredictor, &records);
        assert_eq!(stats.global_brns(), 1);
        assert_eq!(stats.global_hits(), 1);
    }

    #[test]
    fn learning_predictors_beat_the_stub() {
        let trace = SyntheticTrace::generate(200_000, 3);
        let stub = run(&mut StubPredictor, trace.as_slice());
        let gshare = run(&mut GsharePredictor::new(), trace.as_slice());
        let hybrid = run(&mut HybridPredictor::new(), trace.as_slice());
        assert!(gshare.hit_rate() > stub.hit_rate(),
            "gshare {} stub {}", gshare.hit_rate(), stub.hit_rate());
        assert!(hybrid.hit_rate() > stub.hit_rate(),
            "hybrid {} stub {}", hybrid.hit_rate(), stub.hit_rate());
    }
}
