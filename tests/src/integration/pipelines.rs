//! # Pipeline Tests
//!
//! Operator chains: transformation, filtering, and the demand-compensation
//! rule that keeps bounded downstream requests exact.

#[cfg(test)]
mod tests {
    use crate::integration::Probe;
    use rill::{Completion, Demand, Publisher, PublisherExt, Sequence};
    use std::convert::Infallible;

    #[test]
    fn test_map_preserves_order_and_completion() {
        let probe: Probe<String, Infallible> = Probe::new(Demand::Unlimited, Demand::None);
        let values = probe.values.clone();
        let completions = probe.completions.clone();

        Sequence::from_iter(vec![1u64, 2, 3])
            .map(|v| format!("#{v}"))
            .subscribe(probe);

        assert_eq!(*values.lock(), vec!["#1", "#2", "#3"]);
        assert_eq!(*completions.lock(), vec![Completion::Finished]);
    }

    #[test]
    fn test_filter_demand_compensation_exact_delivery() {
        // [1,2,3,4,5], keep evens, downstream max(2).
        // Upstream consumes a unit per emitted value including rejected
        // ones; compensation must cover those so exactly 2 and 4 arrive.
        let probe: Probe<u64, Infallible> = Probe::new(Demand::max(2), Demand::None);
        let values = probe.values.clone();

        Sequence::from_iter(vec![1u64, 2, 3, 4, 5])
            .filter(|v| v % 2 == 0)
            .subscribe(probe);

        assert_eq!(*values.lock(), vec![2, 4]);
    }

    #[test]
    fn test_filter_then_map_chain_under_bounded_demand() {
        let probe: Probe<u64, Infallible> = Probe::new(Demand::max(3), Demand::None);
        let values = probe.values.clone();
        let handle = probe.handle();

        Sequence::from_iter(1u64..=20)
            .filter(|v| v % 2 == 0)
            .map(|v| v * 100)
            .subscribe(probe);

        assert_eq!(*values.lock(), vec![200, 400, 600]);

        // More demand resumes the chain where it paused.
        let handle = handle.lock().clone().expect("subscribed");
        handle.request(Demand::max(2));
        assert_eq!(*values.lock(), vec![200, 400, 600, 800, 1000]);
    }

    #[test]
    fn test_cancel_propagates_through_operators() {
        let probe: Probe<u64, Infallible> = Probe::new(Demand::max(1), Demand::None);
        let values = probe.values.clone();
        let completions = probe.completions.clone();
        let handle = probe.handle();

        Sequence::from_iter(1u64..=10).map(|v| v + 1).subscribe(probe);
        let handle = handle.lock().clone().expect("subscribed");
        handle.cancel();
        handle.request(Demand::Unlimited);

        assert_eq!(*values.lock(), vec![2]);
        assert!(completions.lock().is_empty());
    }

    #[test]
    fn test_operators_are_cold_per_subscriber() {
        let pipeline = Sequence::from_iter(1u64..=4).filter(|v| v % 2 == 1);

        for _ in 0..2 {
            let probe: Probe<u64, Infallible> = Probe::new(Demand::Unlimited, Demand::None);
            let values = probe.values.clone();
            pipeline.subscribe(probe);
            assert_eq!(*values.lock(), vec![1, 3]);
        }
    }

    #[test]
    fn test_filter_rejecting_everything_still_finishes() {
        let probe: Probe<u64, Infallible> = Probe::new(Demand::max(1), Demand::None);
        let values = probe.values.clone();
        let completions = probe.completions.clone();

        Sequence::from_iter(1u64..=50)
            .filter(|_| false)
            .subscribe(probe);

        // Every rejection regenerated one unit, walking the whole
        // sequence to its finish without a single delivery.
        assert!(values.lock().is_empty());
        assert_eq!(*completions.lock(), vec![Completion::Finished]);
    }
}
