use export_job_poller::{DownloadTrigger, ExportJobError, FileDownloader};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn downloads_once_under_requested_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id,amount\n1,10.00\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = FileDownloader::new(dir.path().join("exports"));
    let url = format!("{}/files/abc", server.uri());

    let saved = downloader.download(&url, Some("report.xlsx")).await.unwrap();

    assert_eq!(saved, dir.path().join("exports").join("report.xlsx"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"id,amount\n1,10.00\n");
    assert!(!dir.path().join("exports").join("report.xlsx.part").exists());
}

#[tokio::test]
async fn derives_name_from_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/transactions.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = FileDownloader::new(dir.path());
    let url = format!("{}/files/transactions.csv", server.uri());

    let saved = downloader.download(&url, None).await.unwrap();

    assert_eq!(saved.file_name().unwrap(), "transactions.csv");
}

#[tokio::test]
async fn missing_file_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = FileDownloader::new(dir.path());
    let url = format!("{}/files/gone", server.uri());

    let result = downloader.download(&url, Some("report.xlsx")).await;

    assert!(matches!(result, Err(ExportJobError::HttpStatus(404))));
    assert!(!dir.path().join("report.xlsx").exists());
    assert!(!dir.path().join("report.xlsx.part").exists());
}

#[tokio::test]
async fn rejects_unsafe_filename_before_requesting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = FileDownloader::new(dir.path());
    let url = format!("{}/files/abc", server.uri());

    let result = downloader.download(&url, Some("../escape.xlsx")).await;

    assert!(matches!(result, Err(ExportJobError::InvalidFilename(_))));
}
