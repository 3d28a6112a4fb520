//! A demo which exercises the future-call consumption modes against an
//! in-process mock transport: blocking retrieval of an extracted payload,
//! callback notification with the full (filter-annotated) envelope, and
//! fire-and-forget submission of the raw response.

use clap::{App, Arg};
use failure::format_err;
use future_call::adapter::FutureAdapter;
use future_call::future::{Filter, FutureCall};
use future_call::{Call, Callback, Completion, Envelope, Response};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The envelope the mock service wraps every payload in.
#[derive(Clone, Debug)]
struct Pack {
    code: i32,
    message: String,
    timestamp: u64,
    time: Option<String>,
    data: Option<String>,
}

impl Envelope for Pack {
    type Payload = String;

    fn code(&self) -> i32 {
        self.code
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn into_payload(self) -> Option<String> {
        self.data
    }
}

/// Annotates each envelope with a human readable receive time.
struct StampTime;

impl Filter<Pack> for StampTime {
    fn intercept(&self, pack: &mut Pack) -> bool {
        pack.time = Some(format!("{}s since the epoch", pack.timestamp));
        false
    }
}

#[derive(Default)]
struct MockState {
    started: bool,
    canceled: bool,
}

/// A transport stand-in which completes from its own thread after a delay.
struct MockCall {
    delay: Duration,
    fail: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockCall {
    fn new(delay: Duration, fail: bool) -> Self {
        MockCall {
            delay,
            fail,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }
}

impl Call<Pack> for MockCall {
    fn start(&self, completion: Completion<Pack>) {
        self.state.lock().expect("mock state poisoned").started = true;

        let delay = self.delay;
        let fail = self.fail;
        let state = Arc::clone(&self.state);

        thread::spawn(move || {
            thread::sleep(delay);
            if state.lock().expect("mock state poisoned").canceled {
                return;
            }

            if fail {
                completion(Err(format_err!("simulated connectivity failure")));
            } else {
                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                let pack = Pack {
                    code: 0,
                    message: "ok".to_owned(),
                    timestamp,
                    time: None,
                    data: Some("{\"id\": 1}".to_owned()),
                };
                completion(Ok(Response::new(200, "OK", Some(pack))));
            }
        });
    }

    fn is_started(&self) -> bool {
        self.state.lock().expect("mock state poisoned").started
    }

    fn cancel(&self) {
        self.state.lock().expect("mock state poisoned").canceled = true;
    }

    fn is_canceled(&self) -> bool {
        self.state.lock().expect("mock state poisoned").canceled
    }

    fn duplicate(&self) -> Box<dyn Call<Pack>> {
        Box::new(MockCall::new(self.delay, self.fail))
    }
}

/// Prints the delivered envelope and signals the main thread.
struct PackCallback {
    done: Mutex<mpsc::Sender<()>>,
}

impl Callback<Pack> for PackCallback {
    fn on_response(&self, code: i32, message: &str, result: Option<Pack>) {
        println!("on_response: code={} message={:?}", code, message);
        match result {
            Some(pack) => println!(
                "  envelope: code={} message={:?} time={:?} data={:?}",
                pack.code, pack.message, pack.time, pack.data
            ),
            None => println!("  envelope: <absent>"),
        }
        let _ = self.done.lock().expect("sender poisoned").send(());
    }

    fn on_error(&self) {
        println!("on_error: request failed");
        let _ = self.done.lock().expect("sender poisoned").send(());
    }
}

fn main() {
    let matches = App::new("mocky")
        .about("Exercises future-call consumption modes against a mock transport")
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .takes_value(true)
                .possible_values(&["get", "enqueue", "submit"])
                .default_value("get")
                .help("Which consumption mode to demonstrate"),
        )
        .arg(
            Arg::with_name("delay")
                .long("delay-ms")
                .takes_value(true)
                .default_value("100")
                .help("How long the mock transport takes to respond"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout-ms")
                .takes_value(true)
                .default_value("1000")
                .help("How long blocking retrieval waits"),
        )
        .arg(
            Arg::with_name("fail")
                .long("fail")
                .help("Make the mock transport fail instead of responding"),
        )
        .get_matches();

    let delay = Duration::from_millis(parse_millis(matches.value_of("delay"), "--delay-ms"));
    let timeout = Duration::from_millis(parse_millis(matches.value_of("timeout"), "--timeout-ms"));
    let fail = matches.is_present("fail");

    let adapter = FutureAdapter::<Pack>::with_envelope().add_filter(StampTime);
    let call: Box<dyn Call<Pack>> = Box::new(MockCall::new(delay, fail));

    match matches.value_of("mode").expect("mode has a default") {
        "get" => {
            let future = adapter.adapt_payload(call);
            match future.get_within(Some(timeout), true) {
                Ok(Some(payload)) => println!("payload: {}", payload),
                Ok(None) => println!("no payload (request failed or body empty)"),
                Err(err) => println!("error: {}", err),
            }
        }
        "enqueue" => {
            let (tx, rx) = mpsc::channel();
            let future = adapter.adapt_envelope(call);
            future
                .enqueue(Box::new(PackCallback {
                    done: Mutex::new(tx),
                }))
                .expect("fresh future cannot have executed");
            if rx.recv_timeout(delay + timeout).is_err() {
                println!("no callback within {:?}", delay + timeout);
            }
        }
        "submit" => {
            let future = adapter.adapt_raw(call);
            future.submit();
            println!("submitted; executed={}", future.is_executed());
            match future.get_within(Some(timeout), false) {
                Ok(Some(response)) => println!("response: {}", response),
                Ok(None) => println!("no response within {:?}", timeout),
                Err(err) => println!("error: {}", err),
            }
        }
        other => unreachable!("unknown mode: {}", other),
    }
}

fn parse_millis(value: Option<&str>, flag: &str) -> u64 {
    value
        .expect("flag has a default")
        .parse()
        .unwrap_or_else(|_| panic!("{} must be a whole number of milliseconds", flag))
}
