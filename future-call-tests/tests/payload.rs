#![deny(rust_2018_idioms)]

mod support;
pub use self::support::*;

fn adapter() -> FutureAdapter<Pack<TestData>> {
    FutureAdapter::<Pack<TestData>>::with_envelope()
}

#[test]
fn get_extracts_the_payload() {
    let future = adapter().adapt_payload(mock_ok(ok_response(Pack::ok(TestData { id: 1 }))));

    assert_eq!(Some(TestData { id: 1 }), future.get().unwrap());
}

#[test]
fn enqueue_delivers_the_envelopes_own_code_and_message() {
    let future = adapter().adapt_payload(mock_ok(ok_response(Pack::ok(TestData { id: 1 }))));

    let (callback, deliveries) = recording();
    future.enqueue(callback).unwrap();

    // The transport said 200/OK, but the payload consumer sees the
    // envelope's own status triple.
    assert_eq!(
        Delivered::Response {
            code: 0,
            message: "ok".to_owned(),
            result: Some(TestData { id: 1 }),
        },
        next_delivery(&deliveries)
    );
}

#[test]
fn interceptions_pass_through_payload_shaped() {
    let log = filter_log();
    let future = adapter()
        .add_filter(LoggingFilter::intercepting("stale", &log))
        .adapt_payload(mock_ok(ok_response(Pack::ok(TestData { id: 1 }))));

    let (callback, deliveries) = recording();
    future.enqueue(callback).unwrap();

    match next_delivery(&deliveries) {
        Delivered::Response { code, result, .. } => {
            assert_eq!(CODE_INTERCEPTED, code);
            assert_eq!(None, result);
        }
        Delivered::Error => panic!("unexpected error delivery"),
    }
}

#[test]
fn transport_failures_fire_on_error_and_absent_get() {
    let enqueued = adapter().adapt_payload(mock_fail("connection reset"));
    let (callback, deliveries) = recording();
    enqueued.enqueue(callback).unwrap();
    assert!(matches!(next_delivery(&deliveries), Delivered::Error));

    let blocking = adapter().adapt_payload(mock_fail("connection reset"));
    assert_eq!(None, blocking.get().unwrap());
}

#[test]
fn empty_envelope_payload_is_absent() {
    let empty = Pack {
        code: 0,
        message: "ok".to_owned(),
        timestamp: 1_540_000_000,
        time: None,
        data: None,
    };
    let future = adapter().adapt_payload(mock_ok(ok_response(empty)));

    assert_eq!(None, future.get().unwrap());
}
