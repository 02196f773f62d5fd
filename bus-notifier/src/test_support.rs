//! Helpers shared by tests: a one-shot HTTP server, log capture and mock
//! collaborators.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response on a local port.
///
/// Returns the base URL (with trailing slash) and a handle resolving to the
/// raw request text, headers and body included.
pub async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        request
    });

    (format!("http://{addr}/"), handle)
}

/// A local address with nothing listening on it.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// Read headers, then as much body as `Content-Length` announces.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&request).into_owned();
        }
        request.extend_from_slice(&buf[..n]);
    };

    let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while request.len() < header_end + content_length {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }

    String::from_utf8_lossy(&request).into_owned()
}

/// Capture of formatted log output.
pub mod logs {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    /// Buffer receiving everything logged on the current thread while the
    /// guard from [`LogCapture::install`] is alive.
    #[derive(Clone, Default)]
    pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        pub fn install() -> (Self, DefaultGuard) {
            let capture = Self::default();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(capture.clone())
                .with_ansi(false)
                .without_time()
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            let guard = tracing::subscriber::set_default(subscriber);
            (capture, guard)
        }

        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        /// Lines containing `needle`.
        pub fn lines_with(&self, needle: &str) -> Vec<String> {
            self.contents()
                .lines()
                .filter(|line| line.contains(needle))
                .map(str::to_string)
                .collect()
        }
    }

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = LogCapture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}

/// Mock collaborators for driving the poller and schedule loop.
pub mod mocks {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Local;
    use serde_json::json;

    use crate::curlbus::{FetchError, RawScheduleResponse};
    use crate::domain::{ArrivalsSummary, InvalidQuery, Query, StationId};
    use crate::notify::{Notifier, NotifyError};
    use crate::poller::{QuerySource, StationDataFetcher};
    use crate::schedule::StopHandle;

    /// A well-formed response for `station` with visits `(line, seconds from now)`.
    pub fn station_response(station: u32, visits: &[(&str, i64)]) -> RawScheduleResponse {
        let now = Local::now().fixed_offset();
        let entries: Vec<_> = visits
            .iter()
            .map(|(line, secs)| {
                json!({
                    "line_name": line,
                    "eta": (now + chrono::Duration::seconds(*secs)).to_rfc3339(),
                    "timestamp": now.to_rfc3339(),
                })
            })
            .collect();

        serde_json::from_value(json!({
            "errors": null,
            "stop_info": {"address": {"city": "Tel Aviv"}, "name": {"EN": format!("Stop {station}")}},
            "visits": {station.to_string(): entries}
        }))
        .unwrap()
    }

    /// A transport-class failure.
    pub fn transport_error() -> FetchError {
        FetchError::Json {
            message: "expected value at line 1 column 1".into(),
            body: Some("<html>".into()),
        }
    }

    /// Fetcher that replays a script, then repeats a fallback.
    pub struct MockFetcher {
        script: Mutex<VecDeque<Result<RawScheduleResponse, FetchError>>>,
        fallback: Option<RawScheduleResponse>,
        delay: Duration,
        requests: Mutex<Vec<StationId>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: None,
                delay: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue the next result.
        pub fn then(self, result: Result<RawScheduleResponse, FetchError>) -> Self {
            self.script.lock().unwrap().push_back(result);
            self
        }

        /// Queue `n` transport failures.
        pub fn failing(self, n: usize) -> Self {
            (0..n).fold(self, |f, _| f.then(Err(transport_error())))
        }

        /// Response returned once the script runs out.
        pub fn otherwise(mut self, response: RawScheduleResponse) -> Self {
            self.fallback = Some(response);
            self
        }

        /// Simulated request latency (virtual time under a paused clock).
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requested(&self) -> Vec<StationId> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl StationDataFetcher for MockFetcher {
        async fn fetch(&self, station: StationId) -> Result<RawScheduleResponse, FetchError> {
            self.requests.lock().unwrap().push(station);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => self.fallback.clone().ok_or_else(transport_error),
            }
        }
    }

    /// Query source that replays a script, then repeats its last entry.
    pub struct ScriptedQueries {
        script: Mutex<VecDeque<Result<Option<Query>, InvalidQuery>>>,
        last: Mutex<Result<Option<Query>, InvalidQuery>>,
        calls: Mutex<usize>,
    }

    impl ScriptedQueries {
        pub fn new(script: Vec<Result<Option<Query>, InvalidQuery>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(Ok(None)),
                calls: Mutex::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl QuerySource for ScriptedQueries {
        async fn query(&self) -> Result<Option<Query>, InvalidQuery> {
            *self.calls.lock().unwrap() += 1;
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => {
                    *self.last.lock().unwrap() = result.clone();
                    result
                }
                None => self.last.lock().unwrap().clone(),
            }
        }
    }

    /// Notifier that records what it was sent.
    pub struct RecordingNotifier {
        sent: Mutex<Vec<ArrivalsSummary>>,
        texts: Mutex<Vec<String>>,
        attempts: Mutex<usize>,
        fail: bool,
        stop_after: Option<(usize, StopHandle)>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                texts: Mutex::new(Vec::new()),
                attempts: Mutex::new(0),
                fail: false,
                stop_after: None,
            }
        }

        /// Reject every notification.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        /// Request a stop once `n` notifications have been delivered.
        pub fn stop_after(mut self, n: usize, handle: StopHandle) -> Self {
            self.stop_after = Some((n, handle));
            self
        }

        pub fn sent(&self) -> Vec<ArrivalsSummary> {
            self.sent.lock().unwrap().clone()
        }

        /// Status lines delivered through `notify_text`.
        pub fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }

        pub fn attempts(&self) -> usize {
            *self.attempts.lock().unwrap()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, summary: &ArrivalsSummary) -> Result<(), NotifyError> {
            *self.attempts.lock().unwrap() += 1;
            if self.fail {
                return Err(NotifyError::Rejected("sink is down".into()));
            }

            let delivered = {
                let mut sent = self.sent.lock().unwrap();
                sent.push(summary.clone());
                sent.len()
            };

            if let Some((n, handle)) = &self.stop_after
                && delivered >= *n
            {
                handle.stop();
            }
            Ok(())
        }

        async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Rejected("sink is down".into()));
            }
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
