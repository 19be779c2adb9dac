use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use zkart_catalog::{ArtifactFile, ArtifactKind, CatalogError, DigestTable, ProgramFormat};
use zkart_download::{Cause, DownloadOptions, Downloader, Program};
use zkart_fetch::{CancellationToken, FetchError, RetryPolicy, Transport, compress};
use zkart_store::{ArtifactStore, MemoryStore};
use zkart_verify::Sha256Hasher;

const VKEY: &[u8] = br#"{"protocol":"groth16","curve":"bn128","nPublic":5}"#;

fn zkey() -> Vec<u8> { (0..4096u32).flat_map(|i| (i * 7).to_le_bytes()).collect() }

fn wasm() -> Vec<u8> { b"\0asm\x01\0\0\0".iter().copied().cycle().take(2048).collect() }

fn dat() -> Vec<u8> { vec![0xda; 1024] }

/// In-memory stand-in for the network, keyed by path.
#[derive(Default)]
struct MockTransport {
    files:     HashMap<String, Bytes>,
    failures:  Mutex<HashMap<String, VecDeque<FetchError>>>,
    delay:     Option<Duration>,
    verifies:  bool,
    calls:     AtomicUsize,
    inits:     AtomicUsize,
    shutdowns: AtomicUsize,
}

impl MockTransport {
    fn serving(variant: &str) -> Self {
        let mut transport = Self::default();
        transport.publish(variant);
        transport
    }

    fn publish(&mut self, variant: &str) {
        let (vkey_path, zkey_path, wasm_path, dat_path) = if variant.starts_with("POI_") {
            (
                format!("{variant}/vkey.json"),
                format!("{variant}/zkey.br"),
                format!("{variant}/wasm.br"),
                format!("{variant}/dat.br"),
            )
        } else {
            (
                format!("circuits/{variant}/vkey.json"),
                format!("circuits/{variant}/zkey.br"),
                format!("prover/snarkjs/{variant}.wasm.br"),
                format!("prover/native/{variant}.dat.br"),
            )
        };
        self.files.insert(vkey_path, Bytes::from_static(VKEY));
        self.files.insert(zkey_path, compress(&zkey(), ArtifactKind::ProvingKey).unwrap().into());
        self.files.insert(wasm_path, compress(&wasm(), ArtifactKind::Program).unwrap().into());
        self.files.insert(dat_path, compress(&dat(), ArtifactKind::Program).unwrap().into());
    }

    fn fail(self, path: &str, errors: impl IntoIterator<Item = FetchError>) -> Self {
        self.failures.lock().insert(path.to_string(), errors.into_iter().collect());
        self
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl Transport for MockTransport {
    fn name(&self) -> &'static str { "mock" }

    fn verifies_content(&self) -> bool { self.verifies }

    async fn init(&self) -> Result<(), FetchError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&self, _root: &str, path: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failures.lock().get_mut(path).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        self.files.get(path).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            url:    path.to_string(),
        })
    }

    async fn shutdown(&self) { self.shutdowns.fetch_add(1, Ordering::SeqCst); }
}

fn digests(variant: &str) -> DigestTable {
    DigestTable::new()
        .with(variant, ArtifactFile::ProvingKey, Sha256Hasher::digest(&zkey()))
        .with(variant, ArtifactFile::Wasm, Sha256Hasher::digest(&wasm()))
        .with(variant, ArtifactFile::Native, Sha256Hasher::digest(&dat()))
}

fn fast_options() -> DownloadOptions {
    DownloadOptions::new().retry(RetryPolicy::default().base_delay(Duration::from_millis(1)).jitter(false))
}

fn downloader(transport: MockTransport, store: MemoryStore) -> Downloader<MockTransport, MemoryStore> {
    Downloader::new(transport, store, fast_options()).with_digests(digests("01x01"))
}

#[tokio::test]
async fn second_download_is_served_from_the_store() {
    let store = MemoryStore::new();
    let downloader = downloader(MockTransport::serving("01x01"), store.clone());

    let first = downloader.load_variant("01x01").await.unwrap();
    assert_eq!(downloader.transport().calls(), 3);

    let second = downloader.load_variant("01x01").await.unwrap();
    assert_eq!(downloader.transport().calls(), 3, "no network on the second call");
    assert_eq!(first, second);

    assert_eq!(&first.verification_key[..], VKEY);
    assert_eq!(first.proving_key, Bytes::from(zkey()));
    assert_eq!(first.program, Program::Wasm(Bytes::from(wasm())));
    assert_eq!(
        store.keys(),
        ["artifacts-v2.1/01x01/vkey.json", "artifacts-v2.1/01x01/wasm", "artifacts-v2.1/01x01/zkey"]
    );
}

#[tokio::test]
async fn download_variant_returns_storage_keys() {
    let store = MemoryStore::new();
    let downloader = Downloader::new(
        MockTransport::serving("01x01"),
        store.clone(),
        fast_options().program(ProgramFormat::Native),
    )
    .with_digests(digests("01x01"));

    let paths = downloader.download_variant("01x01").await.unwrap();
    assert_eq!(paths.verification_key.as_str(), "artifacts-v2.1/01x01/vkey.json");
    assert_eq!(paths.proving_key.as_str(), "artifacts-v2.1/01x01/zkey");
    assert!(matches!(&paths.program, Program::Native(key) if key.as_str() == "artifacts-v2.1/01x01/dat"));

    let program = store.get(paths.program.get().as_str()).await.unwrap().unwrap();
    assert_eq!(program, Bytes::from(dat()));
}

#[tokio::test]
async fn verification_key_decodes_as_json() {
    let downloader = downloader(MockTransport::serving("01x01"), MemoryStore::new());
    let bytes = downloader.fetch_one("01x01", ArtifactKind::VerificationKey).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["protocol"], "groth16");
}

#[tokio::test]
async fn invalid_variant_never_reaches_the_network() {
    let downloader = downloader(MockTransport::serving("01x01"), MemoryStore::new());

    let err = downloader
        .fetch_one("not-a-variant", ArtifactKind::VerificationKey)
        .await
        .unwrap_err();
    assert!(matches!(err.cause, Cause::Catalog(CatalogError::InvalidVariant(_))));
    assert_eq!(err.attempts, 0);

    let err = downloader.download_variant("../01x01").await.unwrap_err();
    assert!(matches!(err.cause, Cause::Catalog(CatalogError::PathTraversal(_))));
    assert!(err.kind.is_none());

    assert_eq!(downloader.transport().calls(), 0);
    assert_eq!(downloader.transport().inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_reference_digest_is_fatal() {
    let store = MemoryStore::new();
    let table = digests("01x01").with("01x01", ArtifactFile::ProvingKey, [0xab; 32]);
    let downloader = Downloader::new(MockTransport::serving("01x01"), store.clone(), fast_options()).with_digests(table);

    let err = downloader.download_variant("01x01").await.unwrap_err();
    assert_eq!(err.kind, Some(ArtifactKind::ProvingKey));
    assert!(matches!(err.cause, Cause::IntegrityMismatch(_)));
    assert_eq!(err.attempts, 1, "mismatches are not retried");
    assert!(!store.exists("artifacts-v2.1/01x01/zkey").await.unwrap());
}

#[tokio::test]
async fn undecodable_payload_is_fatal_and_never_stored() {
    let store = MemoryStore::new();
    let mut transport = MockTransport::serving("01x01");
    let packed = compress(&zkey(), ArtifactKind::ProvingKey).unwrap();
    let truncated = Bytes::copy_from_slice(&packed[..packed.len() / 2]);
    transport.files.insert("circuits/01x01/zkey.br".to_string(), truncated);
    let downloader = Downloader::new(transport, store.clone(), fast_options()).with_digests(digests("01x01"));

    let err = downloader.fetch_one("01x01", ArtifactKind::ProvingKey).await.unwrap_err();
    assert_eq!(err.kind, Some(ArtifactKind::ProvingKey));
    assert!(matches!(err.cause, Cause::Decompression(_)));
    assert_eq!(err.attempts, 1, "decode failures are not retried");
    assert_eq!(downloader.transport().calls(), 1);
    assert!(!store.exists("artifacts-v2.1/01x01/zkey").await.unwrap());
}

#[tokio::test]
async fn missing_reference_digest_is_fatal() {
    let downloader = Downloader::new(MockTransport::serving("02x03"), MemoryStore::new(), fast_options());
    let err = downloader.fetch_one("02x03", ArtifactKind::Program).await.unwrap_err();
    assert!(matches!(err.cause, Cause::MissingDigest { file: ArtifactFile::Wasm }));
}

#[tokio::test]
async fn verifying_transport_skips_digest_table() {
    let mut transport = MockTransport::serving("POI_3x3");
    transport.verifies = true;
    let store = MemoryStore::new();
    let downloader = Downloader::new(transport, store.clone(), fast_options());

    let paths = downloader.download_variant("POI_3x3").await.unwrap();
    assert_eq!(paths.proving_key.as_str(), "artifacts-v2.1/poi-nov-2-23/POI_3x3/zkey");
    assert_eq!(store.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_fetch() {
    let mut transport = MockTransport::serving("01x01");
    transport.delay = Some(Duration::from_millis(50));
    let downloader = Arc::new(downloader(transport, MemoryStore::new()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let downloader = Arc::clone(&downloader);
            tokio::spawn(async move { downloader.fetch_one("01x01", ArtifactKind::ProvingKey).await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), Bytes::from(zkey()));
    }
    assert_eq!(downloader.transport().calls(), 1);
}

#[tokio::test]
async fn terminal_failure_aborts_the_variant() {
    let mut transport = MockTransport::serving("01x01");
    transport.files.remove("prover/snarkjs/01x01.wasm.br");
    let downloader = downloader(transport, MemoryStore::new());

    let err = downloader.download_variant("01x01").await.unwrap_err();
    assert_eq!(err.kind, Some(ArtifactKind::Program));
    assert_eq!(err.attempts, 1);
    assert!(matches!(err.cause, Cause::Fetch(FetchError::Status { status: 404, .. })));
    assert!(err.to_string().contains("program of variant '01x01'"));
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let transport = MockTransport::serving("01x01").fail(
        "circuits/01x01/zkey.br",
        [
            FetchError::Status {
                status: 503,
                url:    "gw".into(),
            },
            FetchError::Timeout,
        ],
    );
    let downloader = downloader(transport, MemoryStore::new());

    let bytes = downloader.fetch_one("01x01", ArtifactKind::ProvingKey).await.unwrap();
    assert_eq!(bytes, Bytes::from(zkey()));
    assert_eq!(downloader.transport().calls(), 3);
}

#[tokio::test]
async fn exhausted_retries_report_attempts() {
    let busy = (0..10).map(|_| FetchError::Status {
        status: 429,
        url:    "gw".into(),
    });
    let transport = MockTransport::serving("01x01").fail("circuits/01x01/vkey.json", busy);
    let options = fast_options().retry(RetryPolicy::default().max_retries(2).base_delay(Duration::from_millis(1)));
    let downloader = Downloader::new(transport, MemoryStore::new(), options);

    let err = downloader
        .fetch_one("01x01", ArtifactKind::VerificationKey)
        .await
        .unwrap_err();
    assert_eq!(err.attempts, 3);
    assert!(matches!(err.cause, Cause::Fetch(FetchError::Status { status: 429, .. })));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_backoff() {
    let unavailable = (0..10).map(|_| FetchError::Status {
        status: 503,
        url:    "gw".into(),
    });
    let transport = MockTransport::serving("01x01").fail("circuits/01x01/vkey.json", unavailable);
    let cancel = CancellationToken::new();
    let downloader = Downloader::new(transport, MemoryStore::new(), DownloadOptions::default())
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let err = downloader
        .fetch_one("01x01", ArtifactKind::VerificationKey)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.attempts, 1);

    // Once cancelled, nothing else starts.
    let err = downloader.download_variant("01x02").await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(downloader.transport().calls(), 1);
}

#[tokio::test]
async fn stored_artifacts_skip_transport_init() {
    let store = MemoryStore::new();
    store
        .store("artifacts-v2.1/01x01", "artifacts-v2.1/01x01/vkey.json", Bytes::from_static(VKEY))
        .await
        .unwrap();
    let downloader = downloader(MockTransport::default(), store);

    let bytes = downloader.fetch_one("01x01", ArtifactKind::VerificationKey).await.unwrap();
    assert_eq!(&bytes[..], VKEY);
    assert_eq!(downloader.transport().inits.load(Ordering::SeqCst), 0);

    downloader.shutdown().await;
    downloader.shutdown().await;
    assert_eq!(downloader.transport().shutdowns.load(Ordering::SeqCst), 2);
}
