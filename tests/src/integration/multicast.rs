//! # Multicast Tests
//!
//! Subjects and share: fan-out, the zero-demand drop policy, replay,
//! reference-counted teardown, and the end-to-end two-sink scenario.

#[cfg(test)]
mod tests {
    use crate::integration::Probe;
    use parking_lot::Mutex;
    use rill::{
        Completion, CurrentValueSubject, Demand, PassthroughSubject, Publisher, PublisherExt,
        Subject,
    };
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_end_to_end_two_sinks_observe_everything_in_order() {
        crate::integration::init_tracing();

        // PassthroughSubject with two unlimited-demand sinks: send 0, 1,
        // finished; both observe the full ordered sequence independently.
        let subject: PassthroughSubject<i64, &'static str> = PassthroughSubject::new();

        let logs: Vec<Arc<Mutex<Vec<String>>>> = (0..2).map(|_| Arc::new(Mutex::new(Vec::new()))).collect();
        let _tokens: Vec<_> = logs
            .iter()
            .map(|log| {
                let value_log = log.clone();
                let completion_log = log.clone();
                subject.sink(
                    move |v| value_log.lock().push(format!("value {v}")),
                    move |c: Completion<&'static str>| {
                        completion_log.lock().push(format!("completion {c}"));
                    },
                )
            })
            .collect();

        subject.send(0);
        subject.send(1);
        subject.send_completion(Completion::Finished);

        for log in &logs {
            assert_eq!(
                *log.lock(),
                vec!["value 0", "value 1", "completion finished"]
            );
        }
    }

    #[test]
    fn test_zero_demand_subscriber_misses_value_others_receive() {
        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();

        let starved: Probe<u64, &'static str> = Probe::new(Demand::max(1), Demand::None);
        let satisfied: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let starved_values = starved.values.clone();
        let satisfied_values = satisfied.values.clone();
        let starved_handle = starved.handle();

        subject.subscribe(starved);
        subject.subscribe(satisfied);

        subject.send(10); // consumes the starved subscriber's only unit
        subject.send(11); // dropped for starved, delivered to satisfied

        assert_eq!(*starved_values.lock(), vec![10]);
        assert_eq!(*satisfied_values.lock(), vec![10, 11]);

        // Demand requested later applies only to later values.
        let handle = starved_handle.lock().clone().expect("subscribed");
        handle.request(Demand::Unlimited);
        subject.send(12);
        assert_eq!(*starved_values.lock(), vec![10, 12]);
    }

    #[test]
    fn test_current_value_subject_replay_and_accessor() {
        let subject: CurrentValueSubject<&'static str> = CurrentValueSubject::new("A");

        let probe: Probe<&'static str, std::convert::Infallible> =
            Probe::new(Demand::Unlimited, Demand::None);
        let values = probe.values.clone();
        subject.subscribe(probe);

        assert_eq!(values.lock().first(), Some(&"A"));

        subject.send("B");
        subject.send("C");
        assert_eq!(*values.lock(), vec!["A", "B", "C"]);
        assert_eq!(subject.value(), "C");
    }

    #[test]
    fn test_replay_never_duplicates_a_racing_send() {
        use std::convert::Infallible;
        use std::sync::Barrier;

        // A subscriber joining while another thread sends must observe
        // that send at most once: either registration wins and the value
        // follows the seed as a broadcast, or the send wins and becomes
        // the seed itself.
        for _ in 0..500 {
            let subject: CurrentValueSubject<u64> = CurrentValueSubject::new(0);
            let barrier = Arc::new(Barrier::new(2));

            let sender = {
                let subject = subject.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    subject.send(1);
                })
            };

            let probe: Probe<u64, Infallible> = Probe::new(Demand::Unlimited, Demand::None);
            let values = probe.values.clone();
            barrier.wait();
            subject.subscribe(probe);
            sender.join().expect("sender thread");

            let seen = values.lock().clone();
            assert!(
                seen == vec![0, 1] || seen == vec![1],
                "expected the sent value exactly once, got {seen:?}"
            );
        }
    }

    #[test]
    fn test_share_late_subscriber_misses_earlier_value() {
        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();
        let shared = subject.clone().share();

        let early: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let early_values = early.values.clone();
        shared.subscribe(early);

        subject.send(0);

        let late: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let late_values = late.values.clone();
        shared.subscribe(late);

        subject.send(1);

        assert_eq!(*early_values.lock(), vec![0, 1]);
        assert_eq!(*late_values.lock(), vec![1]);
        assert_eq!(subject.subscriber_count(), 1);
    }

    #[test]
    fn test_share_failure_broadcast_and_terminal_for_late_joiners() {
        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();
        let shared = subject.clone().share();

        let first: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let second: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let first_completions = first.completions.clone();
        let second_completions = second.completions.clone();
        shared.subscribe(first);
        shared.subscribe(second);

        subject.send_completion(Completion::Failure("upstream failed"));

        assert_eq!(
            *first_completions.lock(),
            vec![Completion::Failure("upstream failed")]
        );
        assert_eq!(
            *second_completions.lock(),
            vec![Completion::Failure("upstream failed")]
        );

        let late: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let late_values = late.values.clone();
        let late_completions = late.completions.clone();
        shared.subscribe(late);

        assert!(late_values.lock().is_empty());
        assert_eq!(
            *late_completions.lock(),
            vec![Completion::Failure("upstream failed")]
        );
    }

    #[test]
    fn test_share_refcount_teardown_and_rearm() {
        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();
        let shared = subject.clone().share();

        let a = shared.sink(|_| {}, |_| {});
        let b = shared.sink(|_| {}, |_| {});
        assert_eq!(subject.subscriber_count(), 1);

        drop(a);
        assert_eq!(subject.subscriber_count(), 1);
        drop(b);
        assert_eq!(subject.subscriber_count(), 0);

        let _c = shared.sink(|_| {}, |_| {});
        assert_eq!(subject.subscriber_count(), 1);
    }

    #[test]
    fn test_concurrent_senders_never_interleave_within_a_subscriber() {
        // Two producer threads hammer the same subject; each subscriber
        // must observe a serialized stream (every value exactly once per
        // send that found demand, here unlimited so all of them).
        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();
        let probe: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let values = probe.values.clone();
        subject.subscribe(probe);

        let producers: Vec<_> = (0..2)
            .map(|p| {
                let subject = subject.clone();
                thread::spawn(move || {
                    for i in 0..500u64 {
                        subject.send(p * 1000 + i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().expect("producer thread");
        }

        let seen = values.lock();
        assert_eq!(seen.len(), 1000);
        // Per-producer order is preserved even though the streams merge.
        let firsts: Vec<u64> = seen.iter().copied().filter(|v| *v < 1000).collect();
        let seconds: Vec<u64> = seen.iter().copied().filter(|v| *v >= 1000).collect();
        assert_eq!(firsts, (0..500).collect::<Vec<u64>>());
        assert_eq!(seconds, (1000..1500).collect::<Vec<u64>>());
    }

    #[test]
    fn test_cancel_inside_hook_does_not_disturb_other_subscribers() {
        use rill::{Subscriber, SubscriptionHandle};

        struct OneShot {
            handle: Option<SubscriptionHandle>,
            values: Arc<Mutex<Vec<u64>>>,
        }

        impl Subscriber for OneShot {
            type Input = u64;
            type Failure = &'static str;

            fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
                subscription.request(Demand::Unlimited);
                self.handle = Some(subscription);
            }

            fn on_value(&mut self, value: u64) -> Demand {
                self.values.lock().push(value);
                if let Some(handle) = &self.handle {
                    handle.cancel();
                }
                Demand::None
            }

            fn on_completion(&mut self, _completion: Completion<&'static str>) {}
        }

        let subject: PassthroughSubject<u64, &'static str> = PassthroughSubject::new();
        let one_shot_values = Arc::new(Mutex::new(Vec::new()));
        subject.subscribe(OneShot {
            handle: None,
            values: one_shot_values.clone(),
        });

        let steady: Probe<u64, &'static str> = Probe::new(Demand::Unlimited, Demand::None);
        let steady_values = steady.values.clone();
        subject.subscribe(steady);

        subject.send(1);
        subject.send(2);

        assert_eq!(*one_shot_values.lock(), vec![1]);
        assert_eq!(*steady_values.lock(), vec![1, 2]);
        assert_eq!(subject.subscriber_count(), 1);
    }
}
