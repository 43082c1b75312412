// An immutable run configuration built once from CLI flags or a parsed slice string (spec.md
// 4.8, SPEC_FULL.md's AMBIENT STACK configuration section; Design Note "`StrategyConfig` built
// once, not a mutable global `Options`"). Slice strings are
// `examples/original_source/CASC/CLTBMode.cpp`'s on-disk format, e.g.
// `dis+11_4_nwc=3:sos=on_42`: a prefix naming the saturation algorithm, an underscore-separated
// age/weight ratio, a colon-separated `key=value` option list, and a trailing deciseconds
// budget. `original_source` never needs most of those option keys outside Vampire's internals;
// this crate keeps the subset spec.md 4.2/4.3/4.7 actually exposes (ordering, selector,
// age/weight ratio, completeness, time budget).

use std::fmt;
use std::time::Duration;

use crate::error::ProverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingKind {
    Kbo,
    Lpo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Maximality,
    NegativePriority,
    ReverseMaximal,
    SizeBased,
}

/// A strategy configuration, parsed once and never mutated for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    pub ordering: OrderingKind,
    pub selector: SelectorKind,
    pub age_weight: u32,
    pub weight_weight: u32,
    /// Whether the enabled rule set is a complete decision procedure for the input's fragment
    /// (spec.md 4.7's `isComplete()`). `sos` (set-of-support) and other incompleteness-trading
    /// options would flip this to `false`; this crate doesn't implement any yet, so it is
    /// always `true`.
    pub complete: bool,
    pub time_budget: Duration,
}

impl Default for StrategyConfig {
    fn default() -> StrategyConfig {
        StrategyConfig {
            ordering: OrderingKind::Kbo,
            selector: SelectorKind::Maximality,
            age_weight: 1,
            weight_weight: 1,
            complete: true,
            time_budget: Duration::from_secs(10),
        }
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ord = match self.ordering {
            OrderingKind::Kbo => "kbo",
            OrderingKind::Lpo => "lpo",
        };
        write!(
            f,
            "{}+{}:{}_{}",
            ord,
            self.age_weight,
            self.weight_weight,
            self.time_budget.as_secs() * 10
        )
    }
}

/// Parses one `key=value` option, mutating `config` in place. Unknown keys are ignored rather
/// than rejected: a slice string carries many options this crate's reduced engine does not
/// implement, and CASC schedules are not worth hand-editing to strip them.
fn apply_option(config: &mut StrategyConfig, key: &str, value: &str) {
    match key {
        "ord" => {
            config.ordering = match value {
                "lpo" => OrderingKind::Lpo,
                _ => OrderingKind::Kbo,
            };
        }
        "sel" => {
            config.selector = match value {
                "neg" => SelectorKind::NegativePriority,
                "rev" => SelectorKind::ReverseMaximal,
                "size" => SelectorKind::SizeBased,
                _ => SelectorKind::Maximality,
            };
        }
        "nwc" => {
            if let Some((a, w)) = value.split_once(':') {
                if let (Ok(a), Ok(w)) = (a.parse(), w.parse()) {
                    config.age_weight = a;
                    config.weight_weight = w;
                }
            }
        }
        _ => {}
    }
}

/// Parses a slice code: `<strategy>_<deciseconds>` where `<strategy>` is a colon-separated
/// `key=value` list (spec.md 6: "the prover parses this back into its option struct before
/// running").
pub fn parse_slice(slice: &str) -> Result<StrategyConfig, ProverError> {
    let (options_part, deciseconds_part) = slice
        .rsplit_once('_')
        .ok_or_else(|| ProverError::UserError(format!("malformed slice code: {}", slice)))?;
    let deciseconds: u64 = deciseconds_part
        .parse()
        .map_err(|_| ProverError::UserError(format!("malformed slice time budget: {}", deciseconds_part)))?;

    let mut config = StrategyConfig::default();
    config.time_budget = Duration::from_millis(deciseconds * 100);
    for option in options_part.split(':') {
        if let Some((key, value)) = option.split_once('=') {
            apply_option(&mut config, key, value);
        }
    }
    Ok(config)
}

/// The chopped name of a slice: its options without the trailing time suffix, used by the
/// schedule de-duplication pass (spec.md 4.8: "a slice is identified by its chopped-name").
pub fn chopped_name(slice: &str) -> &str {
    slice.rsplit_once('_').map(|(opts, _)| opts).unwrap_or(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slice_extracts_time_budget() {
        let config = parse_slice("nwc=3:ord=lpo_42").unwrap();
        assert_eq!(config.time_budget, Duration::from_millis(4200));
        assert_eq!(config.ordering, OrderingKind::Lpo);
        assert_eq!(config.age_weight, 3);
    }

    #[test]
    fn test_parse_slice_rejects_missing_time_suffix() {
        assert!(parse_slice("nwc=3").is_err());
    }

    #[test]
    fn test_chopped_name_drops_time_suffix() {
        assert_eq!(chopped_name("dis+11_4_nwc=3:sos=on_42"), "dis+11_4_nwc=3:sos=on");
    }

    #[test]
    fn test_unknown_option_is_ignored_not_rejected() {
        let config = parse_slice("sos=on:spl=sat_10").unwrap();
        let mut expected = StrategyConfig::default();
        expected.time_budget = Duration::from_secs(1);
        assert_eq!(config, expected);
    }
}
