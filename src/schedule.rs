// An ordered list of slices, and the quick/fallback pairing `CASC::CLTBMode::performStrategy`
// (`examples/original_source/CASC/CLTBMode.cpp`) drives a batch problem through: the quick
// schedule runs first, and only if none of its slices prove the problem does the fallback
// schedule run, skipping anything the quick pass already tried (spec.md 4.8's
// de-duplication contract).

use crate::strategy::chopped_name;

/// A coarse problem classification used to pick which schedule to run (spec.md 4.8: "Schedules
/// are selected by problem category... and a coarse property"). The real classifier inspects
/// clause shape (Horn-ness, equality use, atom counts); this crate exposes the classification
/// as an explicit input rather than computing it, since clausification is out of scope
/// (SPEC_FULL.md 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemCategory {
    Horn,
    NonHornWithEquality,
    NonHornWithoutEquality,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    slices: Vec<String>,
}

impl Schedule {
    pub fn new() -> Schedule {
        Schedule::default()
    }

    pub fn push(&mut self, slice: impl Into<String>) {
        self.slices.push(slice.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns the slices in this schedule that are not chopped-name-equal to anything in
    /// `already_run` (spec.md 4.8's de-duplication contract).
    pub fn skip_already_run<'a>(&'a self, already_run: &[String]) -> Vec<&'a str> {
        self.slices
            .iter()
            .map(|s| s.as_str())
            .filter(|slice| !already_run.iter().any(|run| chopped_name(run) == chopped_name(slice)))
            .collect()
    }
}

/// Picks the quick and fallback schedules for a category. This is a small, fixed table rather
/// than the source's per-category hand-tuned hundred-slice lists -- a faithful port of those
/// would just be inert data, not an algorithm -- so each category gets two representative
/// slices that exercise the strategy's ordering/selector/ratio axes.
pub fn schedules_for(category: ProblemCategory) -> (Schedule, Schedule) {
    let mut quick = Schedule::new();
    let mut fallback = Schedule::new();
    match category {
        ProblemCategory::Horn => {
            quick.push("ord=kbo:nwc=1:1_10");
            quick.push("ord=kbo:sel=neg:nwc=1:4_10");
            fallback.push("ord=lpo:nwc=1:1_40");
            fallback.push("ord=kbo:sel=size:nwc=1:8_40");
        }
        ProblemCategory::NonHornWithEquality => {
            quick.push("ord=kbo:sel=rev:nwc=1:2_10");
            quick.push("ord=lpo:nwc=1:1_10");
            fallback.push("ord=kbo:sel=neg:nwc=1:8_60");
            fallback.push("ord=lpo:sel=size:nwc=1:4_60");
        }
        ProblemCategory::NonHornWithoutEquality => {
            quick.push("ord=kbo:nwc=1:1_10");
            quick.push("ord=kbo:sel=rev:nwc=1:1_20");
            fallback.push("ord=lpo:sel=neg:nwc=1:4_60");
        }
    }
    (quick, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_already_run_filters_by_chopped_name() {
        let mut schedule = Schedule::new();
        schedule.push("nwc=1:1_10");
        schedule.push("nwc=1:4_10");
        let already_run = vec!["nwc=1:1_99".to_string()];
        let remaining = schedule.skip_already_run(&already_run);
        assert_eq!(remaining, vec!["nwc=1:4_10"]);
    }

    #[test]
    fn test_schedules_for_each_category_are_nonempty() {
        for category in [
            ProblemCategory::Horn,
            ProblemCategory::NonHornWithEquality,
            ProblemCategory::NonHornWithoutEquality,
        ] {
            let (quick, fallback) = schedules_for(category);
            assert!(!quick.is_empty());
            assert!(!fallback.is_empty());
        }
    }
}
