use float_launcher::license::cache::{is_valid_filename, make_filename};
use float_launcher::license::{
    CachePolicy, CheckOutcome, ContentCache, EndpointFlavor, HashNamedCache, HttpVerifier,
    LicenseCache, LicenseError, LicenseGate, Verification, Verifier,
};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

const SECRET: &str = "S";

struct Stub(Verification);

impl Verifier for Stub {
    fn activate(&self, _token: &str) -> Verification {
        self.0.clone()
    }
}

fn hash_gate(dir: &std::path::Path, answer: Verification) -> LicenseGate {
    LicenseGate::new(
        CachePolicy::HashNamed,
        Box::new(HashNamedCache::new(dir, SECRET, "txt")),
        Box::new(Stub(answer)),
    )
}

/// Loopback requests must not go through a proxy from the environment.
fn local_verifier(url: String, flavor: EndpointFlavor, timeout: Duration) -> HttpVerifier {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .unwrap();
    HttpVerifier::with_client(client, url, flavor)
}

fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn empty_cache_then_successful_activation_unlocks() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("config");
    let gate = hash_gate(&cache_dir, Verification::Verified);
    assert_eq!(gate.check(), CheckOutcome::Locked);

    gate.activate_and_store("good-token").unwrap();

    assert_eq!(gate.check(), CheckOutcome::Unlocked);
    let names: Vec<String> = std::fs::read_dir(&cache_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(is_valid_filename(&names[0], SECRET, "txt"));
}

#[test]
fn one_valid_record_among_garbage_unlocks() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(make_filename("abc123", SECRET, "txt")), "").unwrap();
    std::fs::write(dir.path().join("notes_for_me.txt"), "hello").unwrap();
    let gate = hash_gate(dir.path(), Verification::NetworkError("unused".into()));
    assert_eq!(gate.check(), CheckOutcome::Unlocked);
}

#[test]
fn network_error_writes_nothing() {
    let dir = tempdir().unwrap();
    let gate = hash_gate(dir.path(), Verification::NetworkError("timed out".into()));
    let err = gate.activate_and_store("good-token").unwrap_err();
    assert!(matches!(err, LicenseError::Network(_)));
    assert!(err.is_retryable());
    assert_eq!(file_count(dir.path()), 0);
}

#[test]
fn rejection_writes_nothing() {
    let dir = tempdir().unwrap();
    let gate = hash_gate(dir.path(), Verification::Rejected);
    let err = gate.activate_and_store("bad-token").unwrap_err();
    assert!(matches!(err, LicenseError::ServerRejected));
    assert_eq!(err.user_message(), "Invalid API token. Please try again.");
    assert_eq!(file_count(dir.path()), 0);
}

#[test]
fn check_is_idempotent() {
    let dir = tempdir().unwrap();
    let gate = hash_gate(dir.path(), Verification::Verified);
    assert_eq!(gate.check(), gate.check());
    gate.activate_and_store("t").unwrap();
    let first = gate.check();
    assert_eq!(first, gate.check());
    assert_eq!(first, CheckOutcome::Unlocked);
}

#[test]
fn records_for_another_secret_do_not_unlock() {
    let dir = tempdir().unwrap();
    let other = HashNamedCache::new(dir.path(), "other-secret", "txt");
    other.write("t").unwrap();
    let gate = hash_gate(dir.path(), Verification::Verified);
    assert_eq!(gate.check(), CheckOutcome::Locked);
}

#[test]
fn content_policy_drops_rejected_token() {
    let dir = tempdir().unwrap();
    let cache = ContentCache::new(dir.path(), "api_token.txt");
    cache.write("old-token").unwrap();
    let gate = LicenseGate::new(
        CachePolicy::Content,
        Box::new(ContentCache::new(dir.path(), "api_token.txt")),
        Box::new(Stub(Verification::Rejected)),
    );
    assert_eq!(gate.check(), CheckOutcome::Locked);
    assert!(!dir.path().join("api_token.txt").exists());
}

#[test]
fn content_policy_keeps_token_when_offline() {
    let dir = tempdir().unwrap();
    ContentCache::new(dir.path(), "api_token.txt")
        .write("old-token")
        .unwrap();
    let gate = LicenseGate::new(
        CachePolicy::Content,
        Box::new(ContentCache::new(dir.path(), "api_token.txt")),
        Box::new(Stub(Verification::NetworkError("offline".into()))),
    );
    assert_eq!(gate.check(), CheckOutcome::Locked);
    assert!(dir.path().join("api_token.txt").exists());
}

/// Serve one canned HTTP response and hand back the request that came in.
fn serve_once(status: &str, body: &str) -> (String, std::sync::mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while let Ok(n) = stream.read(&mut buf) {
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let len = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if body.len() >= len {
                    break;
                }
            }
        }
        stream.write_all(response.as_bytes()).unwrap();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });
    (format!("http://{addr}/register"), rx)
}

#[test]
fn http_verifier_posts_token_and_reads_verdict() {
    let (url, requests) = serve_once("200 OK", r#"{"verified":"yes"}"#);
    let verifier = local_verifier(url, EndpointFlavor::Register, Duration::from_secs(5));
    assert_eq!(verifier.activate("good-token"), Verification::Verified);
    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.starts_with("POST /register"));
    assert!(request.contains(r#""token":"good-token""#));
}

#[test]
fn http_verifier_rejects_missing_success_key() {
    let (url, _requests) = serve_once("200 OK", r#"{"verified":"no"}"#);
    let verifier = local_verifier(url, EndpointFlavor::Register, Duration::from_secs(5));
    assert_eq!(verifier.activate("bad-token"), Verification::Rejected);
}

#[test]
fn http_verifier_validate_flavor() {
    let (url, _requests) = serve_once("200 OK", r#"{"valid":"success"}"#);
    let verifier = local_verifier(url, EndpointFlavor::ValidateToken, Duration::from_secs(5));
    assert_eq!(verifier.activate("tok"), Verification::Verified);
}

#[test]
fn http_verifier_maps_server_error_to_network_error() {
    let (url, _requests) = serve_once("500 Internal Server Error", "{}");
    let verifier = local_verifier(url, EndpointFlavor::Register, Duration::from_secs(5));
    assert!(matches!(verifier.activate("tok"), Verification::NetworkError(_)));
}

#[test]
fn http_verifier_unreachable_endpoint_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let verifier = local_verifier(
        format!("http://127.0.0.1:{port}/register"),
        EndpointFlavor::Register,
        Duration::from_secs(2),
    );
    assert!(matches!(verifier.activate("tok"), Verification::NetworkError(_)));
}
