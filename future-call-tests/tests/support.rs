#![deny(rust_2018_idioms)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// Convenience re-exports
pub use future_call::adapter::*;
pub use future_call::callback::*;
pub use future_call::dispatch::*;
pub use future_call::error::*;
pub use future_call::future::*;
pub use future_call::*;

/// How long a test is willing to wait for an asynchronous delivery before
/// declaring it lost.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// A structured payload used throughout the tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestData {
    pub id: u32,
}

/// The application envelope used throughout the tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pack<T> {
    pub code: i32,
    pub message: String,
    pub timestamp: u64,
    pub time: Option<String>,
    pub data: Option<T>,
}

impl<T> Pack<T> {
    pub fn ok(data: T) -> Self {
        Pack {
            code: 0,
            message: "ok".to_owned(),
            timestamp: 1_540_000_000,
            time: None,
            data: Some(data),
        }
    }
}

impl<T> Envelope for Pack<T> {
    type Payload = T;

    fn code(&self) -> i32 {
        self.code
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn into_payload(self) -> Option<T> {
        self.data
    }
}

pub fn ok_response<T>(body: T) -> Response<T> {
    Response::new(200, "OK", Some(body))
}

#[derive(Clone)]
enum MockScript<T> {
    Respond(Response<T>),
    Fail(&'static str),
    Never,
}

#[derive(Default)]
struct MockFlags {
    started: bool,
    canceled: bool,
}

/// A scripted transport call: completes by itself, from its own thread,
/// according to its script. Cancellation before the (possibly delayed)
/// completion suppresses delivery; `duplicate` yields a fresh call with the
/// same script.
pub struct MockCall<T> {
    script: MockScript<T>,
    delay: Option<Duration>,
    flags: Arc<Mutex<MockFlags>>,
}

impl<T: Clone + Send + Sync + 'static> MockCall<T> {
    fn new(script: MockScript<T>, delay: Option<Duration>) -> Self {
        MockCall {
            script,
            delay,
            flags: Arc::new(Mutex::new(MockFlags::default())),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Call<T> for MockCall<T> {
    fn start(&self, completion: Completion<T>) {
        self.flags.lock().unwrap().started = true;

        if let MockScript::Never = self.script {
            return;
        }

        let script = self.script.clone();
        let delay = self.delay;
        let flags = Arc::clone(&self.flags);

        thread::spawn(move || {
            if let Some(delay) = delay {
                thread::sleep(delay);
            }
            if flags.lock().unwrap().canceled {
                return;
            }
            match script {
                MockScript::Respond(response) => completion(Ok(response)),
                MockScript::Fail(message) => completion(Err(failure::err_msg(message))),
                MockScript::Never => unreachable!(),
            }
        });
    }

    fn is_started(&self) -> bool {
        self.flags.lock().unwrap().started
    }

    fn cancel(&self) {
        self.flags.lock().unwrap().canceled = true;
    }

    fn is_canceled(&self) -> bool {
        self.flags.lock().unwrap().canceled
    }

    fn duplicate(&self) -> Box<dyn Call<T>> {
        Box::new(MockCall::new(self.script.clone(), self.delay))
    }
}

pub fn mock_ok<T: Clone + Send + Sync + 'static>(response: Response<T>) -> Box<dyn Call<T>> {
    Box::new(MockCall::new(MockScript::Respond(response), None))
}

pub fn mock_ok_after<T: Clone + Send + Sync + 'static>(
    response: Response<T>,
    delay: Duration,
) -> Box<dyn Call<T>> {
    Box::new(MockCall::new(MockScript::Respond(response), Some(delay)))
}

pub fn mock_fail<T: Clone + Send + Sync + 'static>(message: &'static str) -> Box<dyn Call<T>> {
    Box::new(MockCall::new(MockScript::Fail(message), None))
}

pub fn mock_never<T: Clone + Send + Sync + 'static>() -> Box<dyn Call<T>> {
    Box::new(MockCall::new(MockScript::Never, None))
}

#[derive(Default)]
struct ManualFlags {
    started: bool,
    canceled: bool,
}

/// A transport call completed by hand through a `ManualDriver`.
///
/// Duplicates register their completions with the same driver, oldest
/// first. The driver delivers regardless of cancellation, emulating a
/// completion signal that was already in flight.
pub struct ManualCall<T: 'static> {
    flags: Arc<Mutex<ManualFlags>>,
    shared: Arc<Mutex<VecDeque<Completion<T>>>>,
}

pub struct ManualDriver<T: 'static> {
    shared: Arc<Mutex<VecDeque<Completion<T>>>>,
}

impl<T: 'static> ManualDriver<T> {
    /// Completes the oldest started-but-uncompleted call.
    pub fn complete(&self, outcome: Result<Response<T>, failure::Error>) {
        let completion = self
            .shared
            .lock()
            .unwrap()
            .pop_front()
            .expect("no started call to complete");
        completion(outcome);
    }

    /// How many started calls have not been completed yet.
    pub fn pending(&self) -> usize {
        self.shared.lock().unwrap().len()
    }
}

impl<T: 'static> Call<T> for ManualCall<T> {
    fn start(&self, completion: Completion<T>) {
        self.flags.lock().unwrap().started = true;
        self.shared.lock().unwrap().push_back(completion);
    }

    fn is_started(&self) -> bool {
        self.flags.lock().unwrap().started
    }

    fn cancel(&self) {
        self.flags.lock().unwrap().canceled = true;
    }

    fn is_canceled(&self) -> bool {
        self.flags.lock().unwrap().canceled
    }

    fn duplicate(&self) -> Box<dyn Call<T>> {
        Box::new(ManualCall {
            flags: Arc::new(Mutex::new(ManualFlags::default())),
            shared: Arc::clone(&self.shared),
        })
    }
}

pub fn manual_call<T: 'static>() -> (Box<dyn Call<T>>, ManualDriver<T>) {
    let shared = Arc::new(Mutex::new(VecDeque::new()));
    let call = ManualCall {
        flags: Arc::new(Mutex::new(ManualFlags::default())),
        shared: Arc::clone(&shared),
    };
    (Box::new(call), ManualDriver { shared })
}

/// What a `RecordingCallback` observed.
#[derive(Debug, Eq, PartialEq)]
pub enum Delivered<T> {
    Response {
        code: i32,
        message: String,
        result: Option<T>,
    },
    Error,
}

/// A callback which forwards every delivery onto a channel.
pub struct RecordingCallback<T> {
    sender: Mutex<mpsc::Sender<Delivered<T>>>,
}

impl<T: Send> Callback<T> for RecordingCallback<T> {
    fn on_response(&self, code: i32, message: &str, result: Option<T>) {
        let delivered = Delivered::Response {
            code,
            message: message.to_owned(),
            result,
        };
        let _ = self.sender.lock().unwrap().send(delivered);
    }

    fn on_error(&self) {
        let _ = self.sender.lock().unwrap().send(Delivered::Error);
    }
}

pub fn recording<T: Send + 'static>() -> (Box<dyn Callback<T>>, mpsc::Receiver<Delivered<T>>) {
    let (callback, receiver) = recording_arc();
    (Box::new(ArcRecording(callback)), receiver)
}

pub fn recording_arc<T: Send>() -> (Arc<RecordingCallback<T>>, mpsc::Receiver<Delivered<T>>) {
    let (sender, receiver) = mpsc::channel();
    let callback = Arc::new(RecordingCallback {
        sender: Mutex::new(sender),
    });
    (callback, receiver)
}

struct ArcRecording<T>(Arc<RecordingCallback<T>>);

impl<T: Send> Callback<T> for ArcRecording<T> {
    fn on_response(&self, code: i32, message: &str, result: Option<T>) {
        self.0.on_response(code, message, result)
    }

    fn on_error(&self) {
        self.0.on_error()
    }
}

/// Blocks until the next delivery arrives, failing the test if none does.
pub fn next_delivery<T>(receiver: &mpsc::Receiver<Delivered<T>>) -> Delivered<T> {
    receiver
        .recv_timeout(DELIVERY_TIMEOUT)
        .expect("no callback delivery arrived")
}

/// Asserts that no further delivery arrives within a short grace period.
pub fn assert_no_delivery<T>(receiver: &mpsc::Receiver<Delivered<T>>) {
    assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
}

/// Shared log used to observe filter execution order.
pub type FilterLog = Arc<Mutex<Vec<&'static str>>>;

pub fn filter_log() -> FilterLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A filter which records its own execution and optionally intercepts.
pub struct LoggingFilter {
    name: &'static str,
    intercepts: bool,
    log: FilterLog,
}

impl LoggingFilter {
    pub fn passing(name: &'static str, log: &FilterLog) -> Self {
        LoggingFilter {
            name,
            intercepts: false,
            log: Arc::clone(log),
        }
    }

    pub fn intercepting(name: &'static str, log: &FilterLog) -> Self {
        LoggingFilter {
            name,
            intercepts: true,
            log: Arc::clone(log),
        }
    }
}

impl<T> Filter<Pack<T>> for LoggingFilter {
    fn intercept(&self, _envelope: &mut Pack<T>) -> bool {
        self.log.lock().unwrap().push(self.name);
        self.intercepts
    }
}

/// A filter which annotates the envelope with a receive time and never
/// intercepts.
pub struct StampFilter;

impl<T> Filter<Pack<T>> for StampFilter {
    fn intercept(&self, envelope: &mut Pack<T>) -> bool {
        envelope.time = Some(format!("{}s", envelope.timestamp));
        false
    }
}

/// A callback owner whose liveness can be toggled by the test.
pub struct TestOwner {
    alive: AtomicBool,
}

impl TestOwner {
    pub fn alive() -> Arc<Self> {
        Arc::new(TestOwner {
            alive: AtomicBool::new(true),
        })
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl Liveness for TestOwner {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
