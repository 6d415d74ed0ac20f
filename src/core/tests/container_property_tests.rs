use crate::core::container::Container;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Get(u32),
    Put(u32),
}

fn op(capacity: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=capacity).prop_map(Op::Get),
        (1..=capacity).prop_map(Op::Put),
    ]
}

proptest! {
    #[test]
    fn level_stays_within_bounds(
        capacity in 1u32..50,
        initial in 0u32..50,
        ops in prop::collection::vec(op(50), 1..200),
    ) {
        let initial = initial.min(capacity);
        let mut container = Container::new("buffer", capacity, initial).unwrap();
        for (pid, op) in ops.into_iter().enumerate() {
            match op {
                Op::Get(amount) => {
                    let _ = container.request_get(pid, amount.min(capacity));
                }
                Op::Put(amount) => {
                    let _ = container.request_put(pid, amount.min(capacity));
                }
            }
            container.settle();
            prop_assert!(container.level() <= container.capacity());
        }
    }

    #[test]
    fn gets_are_served_in_arrival_order(
        amounts in prop::collection::vec(1u32..10, 1..20),
        puts in prop::collection::vec(1u32..10, 1..60),
    ) {
        let mut container = Container::new("dispatch", 10, 0).unwrap();
        for (pid, amount) in amounts.iter().enumerate() {
            prop_assert!(!container.request_get(pid, *amount).unwrap());
        }
        let mut served = Vec::new();
        for (i, amount) in puts.into_iter().enumerate() {
            // Feeders never wait for space in this test.
            let amount = amount.min(container.free_space());
            if amount == 0 {
                continue;
            }
            let _ = container.request_put(1000 + i, amount);
            served.extend(container.settle());
        }
        let expected: Vec<usize> = (0..served.len()).collect();
        prop_assert_eq!(served, expected);
    }
}
