use crate::harness::Session;
use abi::{
    ZylixConfig, ZYLIX_ABI_VERSION, ZYLIX_ERR_INVALID_ARG, ZYLIX_ERR_INVALID_STATE,
    ZYLIX_ERR_NOT_INITIALIZED, ZYLIX_ERR_OUT_OF_MEMORY, ZYLIX_OK,
};
use anyhow::{ensure, Result};
use runtime::{event_type, field, DispatchResult, Priority, Screen, MAX_PAYLOAD};
use std::ffi::{c_char, CStr};

#[test]
fn counter_scenario_through_the_abi() -> Result<()> {
    let core = Session::start();
    for _ in 0..3 {
        ensure!(core.dispatch(event_type::COUNTER_INCREMENT, &[]) == ZYLIX_OK);
    }
    assert_eq!(core.app().counter, 3);
    assert_eq!(core.state().version, 3);
    assert_eq!(abi::zylix_get_counter(), 3);

    let reset = unsafe {
        abi::zylix_queue_event(
            event_type::COUNTER_RESET,
            std::ptr::null(),
            0,
            Priority::Immediate as u8,
        )
    };
    assert_eq!(reset, ZYLIX_OK);
    assert_eq!(
        core.queue(event_type::COUNTER_INCREMENT, &[], Priority::Low as u8),
        ZYLIX_OK
    );
    assert_eq!(abi::zylix_queue_depth(), 2);

    assert_eq!(abi::zylix_process_events(0), 2);
    assert_eq!(core.app().counter, 1);
    assert_eq!(abi::zylix_get_state_version(), 5);

    let diff = core.diff();
    assert_eq!(diff.version, 5);
    assert_eq!(diff.change_count, 2);
    assert_eq!(diff.changed_mask, 1 << field::COUNTER);
    Ok(())
}

#[test]
fn oversized_queue_payload_is_rejected() {
    let core = Session::start();
    let payload = [0u8; MAX_PAYLOAD + 1];
    assert_eq!(
        core.queue(event_type::TEXT_INPUT, &payload, 1),
        ZYLIX_ERR_INVALID_ARG
    );
    assert_eq!(abi::zylix_queue_depth(), 0);
    assert!(!core.last_error().is_empty());

    assert_eq!(
        core.queue(event_type::TEXT_INPUT, &payload[..MAX_PAYLOAD], 1),
        ZYLIX_OK
    );
    assert_eq!(abi::zylix_queue_depth(), 1);
    assert!(core.last_error().is_empty());
}

#[test]
fn priority_out_of_range_is_rejected() {
    let core = Session::start();
    assert_eq!(
        core.queue(event_type::COUNTER_INCREMENT, &[], 4),
        ZYLIX_ERR_INVALID_ARG
    );
    assert_eq!(abi::zylix_queue_depth(), 0);
}

#[test]
fn calls_before_init_fail_softly() {
    let core = Session::uninitialized();
    assert_eq!(abi::zylix_get_abi_version(), ZYLIX_ABI_VERSION);
    assert!(abi::zylix_get_state().is_null());
    assert!(abi::zylix_get_diff().is_null());
    assert_eq!(abi::zylix_get_state_version(), 0);
    assert_eq!(abi::zylix_get_counter(), 0);
    assert_eq!(
        core.dispatch(event_type::COUNTER_INCREMENT, &[]),
        ZYLIX_ERR_NOT_INITIALIZED
    );
    assert_eq!(
        core.queue(event_type::COUNTER_INCREMENT, &[], 0),
        ZYLIX_ERR_NOT_INITIALIZED
    );
    assert_eq!(
        abi::zylix_get_dispatch_status(),
        DispatchResult::NotInitialized as u32
    );
    assert_eq!(abi::zylix_process_events(0), 0);
    assert_eq!(abi::zylix_queue_depth(), 0);
    assert!(!abi::zylix_field_changed(field::COUNTER));
    assert_eq!(core.last_error(), "core not initialized");
    assert_eq!(abi::zylix_deinit(), ZYLIX_ERR_NOT_INITIALIZED);
    abi::zylix_queue_clear();
    abi::zylix_reset_scratch_arena();
}

#[test]
fn double_init_is_a_state_error() {
    let core = Session::start();
    core.dispatch(event_type::COUNTER_INCREMENT, &[]);
    assert_eq!(abi::zylix_init(), ZYLIX_ERR_INVALID_STATE);
    // The running core is untouched.
    assert_eq!(abi::zylix_get_counter(), 1);

    assert_eq!(abi::zylix_deinit(), ZYLIX_OK);
    assert_eq!(abi::zylix_init(), ZYLIX_OK);
    assert_eq!(abi::zylix_get_state_version(), 0);
    assert_eq!(abi::zylix_get_counter(), 0);
}

#[test]
fn init_with_config_validates_and_bounds_the_queue() {
    let core = Session::uninitialized();
    assert_eq!(
        unsafe { abi::zylix_init_with_config(std::ptr::null()) },
        ZYLIX_ERR_INVALID_ARG
    );

    let zero = ZylixConfig {
        queue_capacity: 0,
        ..ZylixConfig::default()
    };
    assert_eq!(unsafe { abi::zylix_init_with_config(&zero) }, ZYLIX_ERR_INVALID_ARG);
    assert!(abi::zylix_get_state().is_null());

    let small = ZylixConfig {
        queue_capacity: 2,
        ..ZylixConfig::default()
    };
    assert_eq!(unsafe { abi::zylix_init_with_config(&small) }, ZYLIX_OK);
    assert_eq!(core.queue(event_type::COUNTER_INCREMENT, &[], 0), ZYLIX_OK);
    assert_eq!(core.queue(event_type::COUNTER_INCREMENT, &[], 3), ZYLIX_OK);
    assert_eq!(
        core.queue(event_type::COUNTER_INCREMENT, &[], 3),
        ZYLIX_ERR_OUT_OF_MEMORY
    );
    assert_eq!(abi::zylix_queue_depth(), 2);
}

#[test]
fn init_with_config_rejects_huge_capacities() {
    let core = Session::uninitialized();
    let huge_queue = ZylixConfig {
        queue_capacity: u32::MAX,
        ..ZylixConfig::default()
    };
    assert_eq!(
        unsafe { abi::zylix_init_with_config(&huge_queue) },
        ZYLIX_ERR_INVALID_ARG
    );
    assert!(abi::zylix_get_state().is_null());
    assert!(!core.last_error().is_empty());

    let huge_scratch = ZylixConfig {
        scratch_capacity: u32::MAX,
        ..ZylixConfig::default()
    };
    assert_eq!(
        unsafe { abi::zylix_init_with_config(&huge_scratch) },
        ZYLIX_ERR_INVALID_ARG
    );
    assert!(abi::zylix_get_state().is_null());

    let largest = ZylixConfig {
        queue_capacity: runtime::MAX_QUEUE_CAPACITY as u32,
        scratch_capacity: runtime::MAX_SCRATCH_CAPACITY as u32,
    };
    assert_eq!(unsafe { abi::zylix_init_with_config(&largest) }, ZYLIX_OK);
    assert_eq!(core.queue(event_type::COUNTER_INCREMENT, &[], 1), ZYLIX_OK);
}

#[test]
fn no_op_dispatch_keeps_version() {
    let core = Session::start();
    assert_eq!(
        core.dispatch(event_type::NAVIGATE, &(Screen::Home as u32).to_le_bytes()),
        ZYLIX_OK
    );
    assert_eq!(core.dispatch(event_type::TEXT_COMMIT, &[]), ZYLIX_OK);
    assert_eq!(core.state().version, 0);
    assert_eq!(core.diff().change_count, 0);
    assert_eq!(core.diff().changed_mask, 0);
}

#[test]
fn unknown_events_are_silent() {
    let core = Session::start();
    assert_eq!(core.dispatch(event_type::CUSTOM_BASE + 1, &[1, 2]), ZYLIX_OK);
    assert_eq!(
        abi::zylix_get_dispatch_status(),
        DispatchResult::UnknownEvent as u32
    );
    assert_eq!(core.state().version, 0);
    assert!(core.last_error().is_empty());
    assert!(core.state().error_message.is_null());
}

#[test]
fn invalid_payload_leaves_state_and_reports() {
    let core = Session::start();
    core.dispatch(event_type::SELECTION, &7u32.to_le_bytes());
    let before = core.diff();

    assert_eq!(core.dispatch(event_type::SELECTION, &[9, 9]), ZYLIX_ERR_INVALID_ARG);
    assert_eq!(
        abi::zylix_get_dispatch_status(),
        DispatchResult::InvalidPayload as u32
    );
    assert_eq!(core.app().selection, 7);
    assert_eq!(core.state().version, 1);
    assert_eq!(core.diff(), before);
    assert!(!core.state().error_message.is_null());
    assert!(!core.last_error().is_empty());

    let status = unsafe {
        abi::zylix_dispatch(event_type::BUTTON_PRESS, std::ptr::null(), 4)
    };
    assert_eq!(status, ZYLIX_ERR_INVALID_ARG);
    assert_eq!(core.app().last_button, 0);
}

#[test]
fn field_changed_tracks_the_last_commit() {
    let core = Session::start();
    core.dispatch(event_type::BUTTON_PRESS, &3u32.to_le_bytes());
    assert!(abi::zylix_field_changed(field::LAST_BUTTON));
    assert!(!abi::zylix_field_changed(field::COUNTER));
    assert!(!abi::zylix_field_changed(field::SCREEN));
    assert!(!abi::zylix_field_changed(64));

    core.dispatch(event_type::NAVIGATE, &(Screen::Detail as u32).to_le_bytes());
    assert!(abi::zylix_field_changed(field::SCREEN));
    assert!(!abi::zylix_field_changed(field::PREVIOUS_SCREEN));
    assert!(!abi::zylix_field_changed(field::LAST_BUTTON));
    assert_eq!(core.state().screen, Screen::Detail as u32);

    core.dispatch(event_type::NAVIGATE_BACK, &[]);
    assert_eq!(core.state().screen, Screen::Home as u32);
    assert!(abi::zylix_field_changed(field::PREVIOUS_SCREEN));
}

#[test]
fn text_input_is_published_in_view_data() {
    let core = Session::start();
    assert_eq!(core.dispatch(event_type::TEXT_INPUT, b"hi\n"), ZYLIX_OK);
    let app = core.app();
    assert_eq!(&app.input_text[..app.input_len], b"hi");
    assert!(abi::zylix_field_changed(field::INPUT));

    assert_eq!(core.dispatch(event_type::TEXT_COMMIT, &[]), ZYLIX_OK);
    assert_eq!(core.app().input_len, 0);
}

#[test]
fn last_error_can_be_copied_out() {
    let core = Session::start();
    core.dispatch(event_type::NAVIGATE, &99u32.to_le_bytes());
    let ptr = abi::zylix_get_last_error();
    let len = unsafe { CStr::from_ptr(ptr) }.to_bytes().len();
    assert!(len > 8);

    let mut buf = [0 as c_char; 8];
    let copied = unsafe { abi::zylix_copy_string(ptr, len, buf.as_mut_ptr(), buf.len()) };
    assert_eq!(copied, 7);
    let copy = unsafe { CStr::from_ptr(buf.as_ptr()) };
    assert_eq!(copy.to_bytes(), &core.last_error().as_bytes()[..7]);

    // The copy outlives the next mutating call.
    core.dispatch(event_type::COUNTER_INCREMENT, &[]);
    assert!(core.last_error().is_empty());
    assert_eq!(copy.to_bytes().len(), 7);
}

#[test]
fn queue_clear_drops_without_reducing() {
    let core = Session::start();
    core.queue(event_type::COUNTER_INCREMENT, &[], Priority::Immediate as u8);
    core.queue(event_type::COUNTER_INCREMENT, &[], Priority::Normal as u8);
    // Immediate events still wait for process_events.
    assert_eq!(abi::zylix_get_counter(), 0);
    abi::zylix_queue_clear();
    assert_eq!(abi::zylix_queue_depth(), 0);
    assert_eq!(abi::zylix_process_events(0), 0);
    assert_eq!(abi::zylix_get_counter(), 0);
    assert_eq!(core.state().version, 0);
}

#[test]
fn process_events_honors_max() {
    let core = Session::start();
    for _ in 0..4 {
        core.queue(event_type::COUNTER_DECREMENT, &[], Priority::High as u8);
    }
    assert_eq!(abi::zylix_process_events(3), 3);
    assert_eq!(abi::zylix_queue_depth(), 1);
    assert_eq!(abi::zylix_get_counter(), -3);
    assert_eq!(core.diff().change_count, 3);
}

#[test]
fn a_panicking_session_releases_the_core() {
    let crashed = std::thread::spawn(|| {
        let core = Session::start();
        core.dispatch(event_type::COUNTER_INCREMENT, &[]);
        panic!("session dropped while unwinding");
    })
    .join();
    assert!(crashed.is_err());

    let core = Session::start();
    assert_eq!(abi::zylix_get_counter(), 0);
    assert_eq!(core.state().version, 0);
}
