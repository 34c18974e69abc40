// tests/export_workflow.rs
//! End-to-end workflow tests: URL in, saved file out, driven by a mock
//! provider API so no network is touched.

use doc2sheet::{
    AppError, CredentialIssuer, DocumentExporter, DocumentRef, ExportApi, ExportCheck,
    ExportFormat, IssuedCredential, JobStatus, PayloadSink, PayloadSource, PollPolicy, Provider,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A provider API double that records calls and replays scripted status
/// checks.
struct MockProvider {
    checks: Mutex<VecDeque<ExportCheck>>,
    payload: Vec<u8>,
    tokens_issued: AtomicUsize,
    created_with: Mutex<Option<(DocumentRef, ExportFormat)>>,
}

impl MockProvider {
    fn new(status_codes: &[(i64, Option<&str>)], payload: &[u8]) -> Self {
        let checks = status_codes
            .iter()
            .map(|(code, token)| ExportCheck {
                status: JobStatus::from_code(*code),
                file_token: token.map(String::from),
                error_message: None,
            })
            .collect();
        Self {
            checks: Mutex::new(checks),
            payload: payload.to_vec(),
            tokens_issued: AtomicUsize::new(0),
            created_with: Mutex::new(None),
        }
    }

    fn created_with(&self) -> Option<(DocumentRef, ExportFormat)> {
        self.created_with.lock().expect("created lock").clone()
    }
}

#[async_trait::async_trait]
impl CredentialIssuer for MockProvider {
    async fn issue(&self) -> Result<IssuedCredential, AppError> {
        self.tokens_issued.fetch_add(1, Ordering::SeqCst);
        Ok(IssuedCredential {
            token: "t-access".to_string(),
            lifetime: Duration::from_secs(7200),
        })
    }
}

#[async_trait::async_trait]
impl ExportApi for MockProvider {
    async fn create_export_task(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
        access_token: &str,
    ) -> Result<String, AppError> {
        assert_eq!(access_token, "t-access");
        *self.created_with.lock().expect("created lock") = Some((doc.clone(), format));
        Ok("TICKET-1".to_string())
    }

    async fn check_export_task(
        &self,
        ticket: &str,
        _doc: &DocumentRef,
        _access_token: &str,
    ) -> Result<ExportCheck, AppError> {
        assert_eq!(ticket, "TICKET-1");
        self.checks
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| AppError::MalformedResponse("script exhausted".to_string()))
    }

    async fn first_sheet_id(
        &self,
        _doc: &DocumentRef,
        _access_token: &str,
    ) -> Result<String, AppError> {
        Ok("s0".to_string())
    }

    async fn download_export(
        &self,
        file_token: &str,
        _access_token: &str,
    ) -> Result<Vec<u8>, AppError> {
        assert_eq!(file_token, "F1");
        Ok(self.payload.clone())
    }
}

fn fast_exporter(
    api: MockProvider,
    dir: &std::path::Path,
) -> DocumentExporter<MockProvider> {
    DocumentExporter::new(api, dir)
        .expect("exporter")
        .with_poll_policy(PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts: 30,
        })
}

#[tokio::test]
async fn feishu_sheet_url_exports_to_deterministic_filename() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(1, None), (2, None), (0, Some("F1"))], b"xlsx bytes");
    let exporter = fast_exporter(api, dir.path());

    let result = exporter
        .export_url("https://example.feishu.cn/sheets/ABC123", ExportFormat::Xlsx)
        .await
        .expect("export");

    assert_eq!(result.filename, "feishu_sheet_ABC123.xlsx");
    assert_eq!(result.saved_path, dir.path().join("feishu_sheet_ABC123.xlsx"));
    let saved = std::fs::read(&result.saved_path).expect("saved file");
    assert_eq!(saved, b"xlsx bytes");
}

#[tokio::test]
async fn spreadsheet_export_looks_up_the_first_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(0, Some("F1"))], b"payload");
    let exporter = fast_exporter(api, dir.path());

    let doc = doc2sheet::resolver::resolve("https://example.feishu.cn/sheets/ABC123")
        .expect("resolvable");
    assert_eq!(doc.sub_id, None);

    exporter
        .export_document(&doc, ExportFormat::Xlsx)
        .await
        .expect("export");

    // sub_id must have been filled in before task creation.
    let (created_doc, _) = exporter.api().created_with().expect("task was created");
    assert_eq!(created_doc.sub_id.as_deref(), Some("s0"));
}

#[tokio::test]
async fn docx_export_passes_doc_type_and_skips_sheet_lookup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(0, Some("F1"))], b"doc payload");
    let exporter = fast_exporter(api, dir.path());

    let result = exporter
        .export_url(
            "https://example.feishu.cn/docx/DocxToken99",
            ExportFormat::Xlsx,
        )
        .await
        .expect("export");

    assert_eq!(result.filename, "feishu_docx_DocxToken99.xlsx");
    let (created_doc, format) = exporter.api().created_with().expect("task was created");
    assert_eq!(created_doc.provider, Provider::FeishuDocx);
    assert_eq!(created_doc.sub_id, None);
    assert_eq!(format, ExportFormat::Xlsx);
}

#[tokio::test]
async fn failure_status_surfaces_as_export_failed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(107, None)], b"");
    let exporter = fast_exporter(api, dir.path());

    let err = exporter
        .export_url("https://example.feishu.cn/sheets/ABC123", ExportFormat::Xlsx)
        .await
        .expect_err("export should fail");

    assert!(matches!(err, AppError::ExportFailed { status: 107, .. }));
    // Nothing must have been written.
    assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
}

#[tokio::test]
async fn dingtalk_urls_resolve_but_cannot_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[], b"");
    let exporter = fast_exporter(api, dir.path());

    let doc = doc2sheet::resolver::resolve(
        "https://alidocs.dingtalk.com/i/nodes/NodeId123",
    )
    .expect("resolvable");
    assert_eq!(doc.provider, Provider::DingTalkNode);

    let err = exporter
        .export_document(&doc, ExportFormat::Xlsx)
        .await
        .expect_err("no export API for dingtalk");
    assert!(matches!(err, AppError::UnsupportedProvider(_)));
}

#[tokio::test]
async fn unresolvable_url_is_a_validation_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[], b"");
    let exporter = fast_exporter(api, dir.path());

    let err = exporter
        .export_url("https://example.com/not-a-doc", ExportFormat::Xlsx)
        .await
        .expect_err("unsupported URL");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn access_token_is_issued_once_per_exporter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(0, Some("F1")), (0, Some("F1"))], b"payload");
    let exporter = fast_exporter(api, dir.path());

    exporter
        .export_url("https://example.feishu.cn/sheets/ABC123", ExportFormat::Xlsx)
        .await
        .expect("first export");
    exporter
        .export_url("https://example.feishu.cn/sheets/ABC123", ExportFormat::Xlsx)
        .await
        .expect("second export");

    // Both exports ran inside the cached token's lifetime.
    assert_eq!(exporter.api().tokens_issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn persisted_payload_round_trips_through_the_sink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[], b"");
    let exporter = fast_exporter(api, dir.path());

    let doc = DocumentRef::new(
        Provider::FeishuSheet,
        "XYZ",
        Some("s0".to_string()),
        "https://example.feishu.cn/sheets/XYZ",
    )
    .expect("doc");
    let result = exporter
        .persist(doc2sheet::ExportedPayload {
            doc,
            format: ExportFormat::Csv,
            bytes: b"a,b\n1,2\n".to_vec(),
            source_download_url: "https://example/dl".to_string(),
        })
        .expect("persist");

    assert_eq!(result.filename, "feishu_sheet_XYZ.csv");
    assert_eq!(
        std::fs::read_to_string(result.saved_path).expect("read back"),
        "a,b\n1,2\n"
    );
}

// PayloadSource is exercised indirectly by every export test above; this
// pins the trait being publicly usable on its own.
#[tokio::test]
async fn payload_source_returns_bytes_and_download_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = MockProvider::new(&[(0, Some("F1"))], b"bytes");
    let exporter = fast_exporter(api, dir.path());

    let doc = doc2sheet::resolver::resolve("https://example.feishu.cn/sheets/ABC123")
        .expect("resolvable");
    let payload = exporter
        .fetch_payload(&doc, ExportFormat::Xlsx)
        .await
        .expect("payload");

    assert_eq!(payload.bytes, b"bytes");
    assert!(payload.source_download_url.contains("/file/F1/download"));
}
