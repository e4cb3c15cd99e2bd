//! Interaction lookup integration tests.
//!
//! Covers cache behavior under concurrency and the openFDA client against a
//! loopback HTTP stub.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use medscan_core::interactions::{
    InteractionCache, InteractionError, InteractionResult, InteractionService, InteractionSource,
    MemoryInteractionCache, OpenFdaClient,
};

/// Source that sleeps before answering and counts calls.
struct SlowSource {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl InteractionSource for SlowSource {
    fn fetch(&self, ingredient: &str) -> InteractionResult<Option<Vec<String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(Some(vec![format!("Avoid combining {} with alcohol", ingredient)]))
    }
}

/// Source that fails the first `failures` calls, then answers.
struct FlakySource {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

impl InteractionSource for FlakySource {
    fn fetch(&self, _ingredient: &str) -> InteractionResult<Option<Vec<String>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(InteractionError::Http("connection refused".into()))
        } else {
            Ok(Some(vec!["entry".into()]))
        }
    }
}

#[test]
fn test_concurrent_lookups_fetch_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(InteractionService::new(Box::new(SlowSource {
        calls: Arc::clone(&calls),
        delay: Duration::from_millis(50),
    })));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.lookup("Paracetamol")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.iter().filter(|r| !r.cached).count(), 1);
    for result in &results {
        assert_eq!(result.entries, vec!["Avoid combining Paracetamol with alcohol"]);
        assert!(result.warning.is_none());
    }
}

#[test]
fn test_distinct_ingredients_fetch_separately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(InteractionService::new(Box::new(SlowSource {
        calls: Arc::clone(&calls),
        delay: Duration::from_millis(10),
    })));

    let handles: Vec<_> = ["Paracetamol", "Ibuprofen", "Amoxicillin"]
        .into_iter()
        .map(|ingredient| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.lookup(ingredient))
        })
        .collect();
    for handle in handles {
        assert!(!handle.join().unwrap().cached);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_key_normalization_shares_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = InteractionService::new(Box::new(SlowSource {
        calls: Arc::clone(&calls),
        delay: Duration::ZERO,
    }));

    let first = service.lookup("  PARACETAMOL ");
    let second = service.lookup("paracetamol");

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.entries, second.entries);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failure_is_retried_on_next_lookup() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(MemoryInteractionCache::new());
    let service = InteractionService::with_cache(
        Box::new(FlakySource {
            calls: Arc::clone(&calls),
            failures: 1,
        }),
        cache.clone(),
    );

    let failed = service.lookup("Paracetamol");
    assert!(failed.is_failure());
    assert!(failed.entries.is_empty());
    assert!(failed.warning.unwrap().contains("connection refused"));
    assert!(cache.is_empty());

    let retried = service.lookup("Paracetamol");
    assert_eq!(retried.entries, vec!["entry"]);
    assert!(!retried.cached);
    assert_eq!(cache.get("paracetamol"), Some(vec!["entry".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// =========================================================================
// openFDA client against a loopback stub
// =========================================================================

/// Serve one canned HTTP response and hand back the request line.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/drug/label.json", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
        }

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
        request_line
    });

    (url, handle)
}

#[test]
fn test_openfda_client_reads_label() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"results": [{"drug_interactions": ["Warfarin: monitor INR"], "warnings": ["Liver damage"]}]}"#,
    );
    let client =
        OpenFdaClient::new(&url, Some("test-key".into()), Some(Duration::from_secs(5))).unwrap();

    let entries = client.fetch("Paracetamol").unwrap();
    let request_line = server.join().unwrap();

    assert_eq!(
        entries,
        Some(vec![
            "Warfarin: monitor INR".to_string(),
            "Liver damage".to_string()
        ])
    );
    assert!(request_line.starts_with("GET /drug/label.json?"));
    assert!(request_line.contains("openfda.substance_name%3A%22Paracetamol%22"));
    assert!(request_line.contains("limit=1"));
    assert!(request_line.contains("api_key=test-key"));
}

#[test]
fn test_openfda_client_without_key() {
    let (url, server) = serve_once("200 OK", r#"{"results": [{}]}"#);
    let client = OpenFdaClient::new(&url, None, Some(Duration::from_secs(5))).unwrap();

    let entries = client.fetch("Ibuprofen").unwrap();
    let request_line = server.join().unwrap();

    assert_eq!(entries, Some(Vec::new()));
    assert!(!request_line.contains("api_key"));
}

#[test]
fn test_openfda_error_status_is_not_cached() {
    let (url, server) = serve_once("404 Not Found", r#"{"error": {"code": "NOT_FOUND"}}"#);
    let client = OpenFdaClient::new(&url, None, Some(Duration::from_secs(5))).unwrap();
    let cache = Arc::new(MemoryInteractionCache::new());
    let service = InteractionService::with_cache(Box::new(client), cache.clone());

    let lookup = service.lookup("Unobtainium");
    server.join().unwrap();

    assert!(lookup.is_failure());
    assert!(lookup.warning.unwrap().contains("404"));
    assert!(cache.is_empty());
}
