use crate::harness::Session;
use proptest::prelude::*;
use runtime::{event_type, field};

#[derive(Clone, Copy, Debug)]
enum Op {
    Increment,
    Decrement,
    Reset,
    Select(u32),
}

impl Op {
    fn send(self, core: &Session) -> i32 {
        match self {
            Op::Increment => core.dispatch(event_type::COUNTER_INCREMENT, &[]),
            Op::Decrement => core.dispatch(event_type::COUNTER_DECREMENT, &[]),
            Op::Reset => core.dispatch(event_type::COUNTER_RESET, &[]),
            Op::Select(index) => core.dispatch(event_type::SELECTION, &index.to_le_bytes()),
        }
    }
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Increment),
        Just(Op::Decrement),
        Just(Op::Reset),
        (0u32..4).prop_map(Op::Select),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Versions advance by one exactly when a dispatch changes a field, and
    /// the diff names only the fields that changed.
    #[test]
    fn versions_follow_real_changes(ops in prop::collection::vec(op(), 1..40)) {
        let core = Session::start();
        let mut counter = 0i64;
        let mut selection = 0u32;
        let mut version = 0u64;

        for op in ops {
            let (next_counter, next_selection) = match op {
                Op::Increment => (counter + 1, selection),
                Op::Decrement => (counter - 1, selection),
                Op::Reset => (0, selection),
                Op::Select(index) => (counter, index),
            };
            prop_assert_eq!(op.send(&core), abi::ZYLIX_OK);

            let counter_changed = next_counter != counter;
            let selection_changed = next_selection != selection;
            if counter_changed || selection_changed {
                version += 1;
            }
            counter = next_counter;
            selection = next_selection;

            prop_assert_eq!(abi::zylix_get_state_version(), version);
            prop_assert_eq!(abi::zylix_get_counter(), counter);
            prop_assert_eq!(core.app().selection, selection);
            prop_assert_eq!(abi::zylix_field_changed(field::COUNTER), counter_changed);
            prop_assert_eq!(abi::zylix_field_changed(field::SELECTION), selection_changed);
            prop_assert!(!abi::zylix_field_changed(field::SCREEN));
        }
    }

    /// The last event a batch applies comes from the lowest priority present,
    /// and among those it is the most recently queued.
    #[test]
    fn batch_ends_with_latest_lowest_priority(priorities in prop::collection::vec(0u8..4, 1..24)) {
        let core = Session::start();
        for (index, priority) in priorities.iter().enumerate() {
            let selection = index as u32 + 1;
            prop_assert_eq!(
                core.queue(event_type::SELECTION, &selection.to_le_bytes(), *priority),
                abi::ZYLIX_OK
            );
        }

        let processed = abi::zylix_process_events(0);
        prop_assert_eq!(processed as usize, priorities.len());
        prop_assert_eq!(abi::zylix_queue_depth(), 0);

        let lowest = *priorities.iter().min().expect("non-empty");
        let last = priorities
            .iter()
            .rposition(|priority| *priority == lowest)
            .expect("lowest priority present");
        prop_assert_eq!(core.app().selection, last as u32 + 1);
        // Every queued selection differs from its predecessor, so each one commits.
        prop_assert_eq!(abi::zylix_get_state_version(), priorities.len() as u64);
        prop_assert_eq!(core.diff().change_count as usize, priorities.len());
    }
}
