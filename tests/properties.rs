//! Property tests for the gate rules.

use chrono::Utc;
use proptest::prelude::*;
use sar_gate::domain::{ConfidenceBand, DecisionGate, FailureClass, MetricSet, Provenance, TargetMetrics};
use sar_gate::gate::{classify_confidence, classify_failure, decide_gate, expected_error_range};
use sar_gate::sar::{finalize, SarBuilder};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_plddt() -> impl Strategy<Value = f64> {
    prop_oneof![0.0f64..100.0, Just(70.0), Just(90.0), Just(90.0001)]
}

fn arb_pae() -> impl Strategy<Value = f64> {
    prop_oneof![0.0f64..30.0, Just(5.0), Just(10.0), Just(4.9999)]
}

fn arb_metric_set() -> impl Strategy<Value = MetricSet> {
    (
        arb_plddt(),
        arb_pae(),
        0.0f64..20.0,
        prop::option::of(0.0f64..20.0),
        any::<bool>(),
    )
        .prop_map(|(plddt, pae, rmsd, pocket, ligand)| MetricSet {
            pdb_id: "8ABC".to_string(),
            metrics: TargetMetrics {
                rmsd_global: rmsd,
                rmsd_ligand_pocket: pocket,
                contact_map_overlap: None,
                plddt_mean: plddt,
                pae_mean: pae,
            },
            ligand_present: ligand,
            provenance: Provenance::default(),
        })
}

proptest! {
    #[test]
    fn overall_band_follows_combination_rule(plddt in arb_plddt(), pae in arb_pae()) {
        let c = classify_confidence(plddt, pae);
        let expected = if c.plddt_bin == ConfidenceBand::High && c.pae_bin == ConfidenceBand::High {
            ConfidenceBand::High
        } else if c.plddt_bin == ConfidenceBand::Low || c.pae_bin == ConfidenceBand::Low {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::Medium
        };
        prop_assert_eq!(c.overall_confidence, expected);
    }

    #[test]
    fn within_upper_bound_is_never_a_failure(set in arb_metric_set()) {
        let c = classify_confidence(set.metrics.plddt_mean, set.metrics.pae_mean);
        let range = expected_error_range(c.overall_confidence);
        let taxonomy = classify_failure(&set.metrics, set.ligand_present, &range);
        prop_assert_eq!(
            taxonomy.class == FailureClass::NotApplicable,
            set.metrics.rmsd_global <= range.rmsd_max
        );
    }

    #[test]
    fn gate_matches_its_rules(set in arb_metric_set()) {
        let m = &set.metrics;
        let c = classify_confidence(m.plddt_mean, m.pae_mean);
        let range = expected_error_range(c.overall_confidence);
        let taxonomy = classify_failure(m, set.ligand_present, &range);
        let gate = decide_gate(m.rmsd_global, &range, taxonomy.class, &c);

        let accept = m.rmsd_global <= range.rmsd_max;
        let reject = !accept
            && (matches!(taxonomy.class, FailureClass::ClassA | FailureClass::ClassC)
                || m.rmsd_global > 2.0 * range.rmsd_max);
        prop_assert_eq!(gate == DecisionGate::Accept, accept);
        prop_assert_eq!(gate == DecisionGate::Reject, reject);
        prop_assert_eq!(gate == DecisionGate::Review, !accept && !reject);
    }

    #[test]
    fn built_records_always_validate(set in arb_metric_set()) {
        let now = Utc::now();
        let builder = SarBuilder::default();
        let sar = builder.build(&set, now).unwrap();
        let reread = finalize(builder.draft(&set, now)).unwrap();
        prop_assert_eq!(sar, reread);
    }

    #[test]
    fn error_range_is_deterministic_and_ordered(idx in 0usize..3) {
        let band = ConfidenceBand::ALL[idx];
        let a = expected_error_range(band);
        prop_assert_eq!(&a, &expected_error_range(band));
        prop_assert!(a.rmsd_min >= 0.0 && a.rmsd_min <= a.rmsd_max);
    }
}
