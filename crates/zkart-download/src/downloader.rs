use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use zkart_catalog::{ArtifactFile, ArtifactKind, ArtifactLocation, Catalog, DigestTable, StorageKey, Variant};
use zkart_fetch::{RetryError, Transport, decompress, run_with_retry};
use zkart_store::ArtifactStore;

use crate::config::DownloadOptions;
use crate::error::{Cause, DownloadError};
use crate::flight::KeyedLocks;
use crate::integrity::IntegrityValidator;
use crate::program::{ArtifactPaths, Program, VariantArtifacts};

/// Cache-first artifact downloader.
///
/// Every artifact is looked up in the store before the network is touched,
/// fetched at most once per storage key even under concurrent requests, and
/// written back only after decompression and (for transports that do not
/// verify content) digest validation.
pub struct Downloader<T, S> {
    catalog:   Catalog,
    transport: T,
    store:     S,
    options:   DownloadOptions,
    validator: IntegrityValidator,
    flights:   KeyedLocks,
    cancel:    CancellationToken,
}

impl<T: Transport, S: ArtifactStore> Downloader<T, S> {
    pub fn new(transport: T, store: S, options: DownloadOptions) -> Self {
        Self {
            catalog: Catalog::default(),
            transport,
            store,
            options,
            validator: IntegrityValidator::default(),
            flights: KeyedLocks::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_digests(mut self, table: DigestTable) -> Self {
        self.validator = IntegrityValidator::new(table);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Cancelling `token` aborts in-flight retries and pending fetches.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn transport(&self) -> &T { &self.transport }

    pub fn store(&self) -> &S { &self.store }

    pub fn options(&self) -> &DownloadOptions { &self.options }

    /// Bytes of one artifact of `variant`, from the store when present.
    pub async fn fetch_one(&self, variant: &str, kind: ArtifactKind) -> Result<Bytes, DownloadError> {
        let variant = self
            .catalog
            .classify(variant)
            .map_err(|e| DownloadError::new(variant, Some(kind), e))?;
        let location = self.catalog.locate(&variant, kind.file(self.options.program));
        self.retrieve(&variant, &location).await
    }

    /// Make sure all three artifacts of `variant` are in the store and return
    /// their keys. The three fetches run concurrently; the first failure
    /// aborts the others.
    pub async fn download_variant(&self, variant: &str) -> Result<ArtifactPaths, DownloadError> {
        let variant = self
            .catalog
            .classify(variant)
            .map_err(|e| DownloadError::new(variant, None, e))?;
        let [vkey, zkey, program] = self.locations(&variant);

        tokio::try_join!(
            self.retrieve(&variant, &vkey),
            self.retrieve(&variant, &zkey),
            self.retrieve(&variant, &program),
        )?;

        Ok(VariantArtifacts {
            program: Program::new(self.options.program, program.storage),
            verification_key: vkey.storage,
            proving_key: zkey.storage,
            variant,
        })
    }

    /// Like [`Downloader::download_variant`] but returns the artifact bytes.
    pub async fn load_variant(&self, variant: &str) -> Result<VariantArtifacts<Bytes>, DownloadError> {
        let variant = self
            .catalog
            .classify(variant)
            .map_err(|e| DownloadError::new(variant, None, e))?;
        let [vkey, zkey, program] = self.locations(&variant);

        let (verification_key, proving_key, program_bytes) = tokio::try_join!(
            self.retrieve(&variant, &vkey),
            self.retrieve(&variant, &zkey),
            self.retrieve(&variant, &program),
        )?;

        Ok(VariantArtifacts {
            variant,
            verification_key,
            proving_key,
            program: Program::new(self.options.program, program_bytes),
        })
    }

    /// Storage key of one artifact without touching store or network.
    pub fn storage_key(&self, variant: &str, kind: ArtifactKind) -> Result<StorageKey, DownloadError> {
        let variant = self
            .catalog
            .classify(variant)
            .map_err(|e| DownloadError::new(variant, Some(kind), e))?;
        Ok(self.catalog.locate(&variant, kind.file(self.options.program)).storage)
    }

    /// Release the transport. Idempotent, and safe before any fetch.
    pub async fn shutdown(&self) { self.transport.shutdown().await; }

    fn locations(&self, variant: &Variant) -> [ArtifactLocation; 3] {
        ArtifactKind::ALL.map(|kind| self.catalog.locate(variant, kind.file(self.options.program)))
    }

    #[instrument(level = "debug", skip_all, fields(variant = %variant, file = %location.file))]
    async fn retrieve(&self, variant: &Variant, location: &ArtifactLocation) -> Result<Bytes, DownloadError> {
        let fail = |cause: Cause| DownloadError::new(variant.as_str(), Some(location.file.kind()), cause);
        let key = location.storage.as_str();

        if self.cancel.is_cancelled() {
            return Err(fail(Cause::Cancelled));
        }
        if let Some(bytes) = self.cached(key).await.map_err(fail)? {
            return Ok(bytes);
        }

        let _flight = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(fail(Cause::Cancelled)),
            guard = self.flights.lock(key) => guard,
        };
        // Whoever held the lock before us may have stored it.
        if let Some(bytes) = self.cached(key).await.map_err(fail)? {
            return Ok(bytes);
        }

        self.transport.init().await.map_err(|e| fail(Cause::TransportInit(e)))?;

        let locator = &location.locator;
        let mut attempts = 0;
        let raw = run_with_retry(&self.options.retry, &self.cancel, |attempt| {
            attempts = attempt + 1;
            self.transport.fetch(&locator.root, &locator.path)
        })
        .await
        .map_err(|err| {
            let attempts = err.attempts();
            let cause = match err {
                RetryError::Cancelled { .. } => Cause::Cancelled,
                RetryError::Exhausted { source, .. } | RetryError::Terminal { source, .. } => Cause::Fetch(source),
            };
            fail(cause).attempts(attempts)
        })?;

        let fail = |cause: Cause| fail(cause).attempts(attempts);

        let bytes = Bytes::from(decompress(&raw, location.file.kind()).map_err(|e| fail(e.into()))?);
        self.check(&bytes, variant, location.file).map_err(fail)?;

        self.store
            .store(location.storage.dir(), key, bytes.clone())
            .await
            .map_err(|e| fail(Cause::StoreWrite(e)))?;
        info!(
            transport = self.transport.name(),
            %locator,
            key,
            attempts,
            len = bytes.len(),
            "artifact downloaded"
        );
        Ok(bytes)
    }

    async fn cached(&self, key: &str) -> Result<Option<Bytes>, Cause> {
        if !self.store.exists(key).await.map_err(Cause::StoreRead)? {
            return Ok(None);
        }
        let bytes = self.store.get(key).await.map_err(Cause::StoreRead)?;
        if bytes.is_some() {
            debug!(key, "store hit");
        }
        Ok(bytes)
    }

    fn check(&self, bytes: &[u8], variant: &Variant, file: ArtifactFile) -> Result<(), Cause> {
        if self.transport.verifies_content() {
            return Ok(());
        }
        self.validator.validate(bytes, variant, file)
    }
}
