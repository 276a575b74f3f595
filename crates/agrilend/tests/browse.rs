//! End-to-end listing commands over seed data, data files and a stub backend.

use std::fs;

use agrilend::cli::{self, Cli};
use agrilend::commands;
use agrilend::config::AppConfig;
use agrilend::output::OutputFormat;
use agrilend::records::{CropReport, Farmer};
use agrilend::screen::{BrowseRequest, DateSelection};
use agrilend_browser::{ExportFormat, SortSpec, TotalsScope};
use chrono::NaiveDate;
use clap::Parser;
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const FARMERS: &str = r#"[
  {"id":"F-1","name":"Juan Dela Cruz","barangay":"San Isidro","municipality":"Cabanatuan",
   "status":"Active","ecosystem":"Irrigated","farm_area_ha":1.5,"loan_amount":20000,
   "registered_on":"2024-01-15"},
  {"id":"F-2","name":"Maria Santos","barangay":"Poblacion","municipality":"Talavera",
   "status":"Pending","ecosystem":"Rainfed","farm_area_ha":2.0,"loan_amount":15000,
   "registered_on":"2024-01-31"},
  {"id":"F-3","name":"José Reyes","barangay":"Malaya","municipality":"Talavera",
   "status":"Active","ecosystem":"Upland","farm_area_ha":0.75,"loan_amount":25000,
   "registered_on":"2024-02-01"}
]"#;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn data_file(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

async fn browse_json<T: agrilend::schemas::Listing>(
    config: &AppConfig,
    data: Option<&std::path::Path>,
    request: &BrowseRequest,
) -> Value {
    let text = commands::browse::<T>(config, data, request, OutputFormat::Json)
        .await
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn report_screen_is_unpaged_with_totals() {
    console::set_colors_enabled(false);
    let config = AppConfig::default();
    let request = BrowseRequest::default();
    let text = commands::browse::<CropReport>(&config, None, &request, OutputFormat::Text)
        .await
        .unwrap();
    assert!(text.contains("Total losses"));
    assert!(text.contains("Damage"));
    assert!(text.contains("Showing 1–24 of 24"));
}

#[tokio::test]
async fn date_range_is_inclusive_of_end_day() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir, "farmers.json", FARMERS);
    let request = BrowseRequest {
        dates: DateSelection::Range {
            from: day(2024, 1, 15),
            to: Some(day(2024, 1, 31)),
        },
        ..Default::default()
    };
    let json = browse_json::<Farmer>(&AppConfig::default(), Some(&path), &request).await;
    let ids: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["F-1", "F-2"]);
    let summary = "registered_on=2024-01-15..2024-01-31";
    assert_eq!(json["filter_summary"], summary);
}

#[tokio::test]
async fn yaml_data_with_search_sort_and_page_totals() {
    let dir = TempDir::new().unwrap();
    let farmers: Vec<Farmer> = serde_json::from_str(FARMERS).unwrap();
    let yaml = serde_yaml::to_string(&farmers).unwrap();
    let path = data_file(&dir, "farmers.yml", &yaml);
    let request = BrowseRequest {
        search: Some("talavera".into()),
        sort: Some(SortSpec::desc("loan_amount")),
        totals: TotalsScope::Page,
        ..Default::default()
    };
    let json = browse_json::<Farmer>(&AppConfig::default(), Some(&path), &request).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "F-3");
    assert_eq!(json["page"]["total_count"], 3);
}

#[tokio::test]
async fn csv_export_is_written_to_file() {
    let dir = TempDir::new().unwrap();
    let data = data_file(&dir, "farmers.json", FARMERS);
    let target = dir.path().join("export.csv");
    let request = BrowseRequest {
        filters: vec![("status".into(), "Active".into())],
        export: Some(ExportFormat::Csv),
        export_file: Some(target.clone()),
        ..Default::default()
    };
    let config = AppConfig::default();
    let text = commands::browse::<Farmer>(&config, Some(&data), &request, OutputFormat::Text)
        .await
        .unwrap();
    assert!(text.contains("exported to"));

    let csv = fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID,Name,Barangay"));
    assert!(lines[1].contains("₱20,000.00"));
}

#[tokio::test]
async fn csv_export_without_file_goes_to_stdout() {
    let request = BrowseRequest {
        export: Some(ExportFormat::Csv),
        ..Default::default()
    };
    let config = AppConfig::default();
    let text = commands::browse::<CropReport>(&config, None, &request, OutputFormat::Text)
        .await
        .unwrap();
    assert!(text.starts_with("ID,Crop,Reported"));
    assert_eq!(text.lines().count(), 25);
}

#[tokio::test]
async fn malformed_data_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir, "farmers.json", "[{\"id\": 1}]");
    let config = AppConfig::default();
    let request = BrowseRequest::default();
    let err = commands::browse::<Farmer>(&config, Some(&path), &request, OutputFormat::Json)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid farmers"));
}

/// Serves one canned JSON response and returns the request head.
async fn stub(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });
    (base, handle)
}

#[tokio::test]
async fn remote_browse_uses_backend_paging() {
    let body = r#"{"data":{"items":[
        {"id":"R-0011","crop_id":"C-0002","reported_on":"2024-06-01","damage_type":"Flood Damage",
         "damage_percentage":40,"estimated_loss":18000,"verified":true}],
        "pagination":{"total_items":21,"per_page":10,"current_page":2,"total_pages":3}}}"#;
    let (base, server) = stub(body).await;
    let config = AppConfig {
        api_url: Some(base),
        tenant: Some("coop-7".into()),
        ..Default::default()
    };
    let request = BrowseRequest {
        page: Some(2),
        filters: vec![("verified".into(), "true".into())],
        ..Default::default()
    };
    let json = browse_json::<CropReport>(&config, None, &request).await;
    let head = server.await.unwrap();

    let request_line = "GET /reports?page=2&per_page=10&verified=true ";
    assert!(head.starts_with(request_line));
    assert!(head.to_lowercase().contains("x-tenant-id: coop-7"));
    assert_eq!(json["page"]["page_count"], 3);
    assert_eq!(json["page"]["first_row"], 11);
    assert_eq!(json["items"][0]["id"], "R-0011");
}

#[tokio::test]
async fn cli_runs_options_command() {
    let cli = Cli::parse_from([
        "agrilend",
        "options",
        "farmers",
        "ecosystem",
        "-o",
        "json",
    ]);
    let config = AppConfig::default();
    let text = cli::run(&cli.command, &config).await.unwrap();
    let options: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(options.as_array().unwrap().len(), 3);
    assert_eq!(options[0]["value"], "Irrigated");
}

#[tokio::test]
async fn cli_selects_page_and_runs_bulk_action() {
    let cli = Cli::parse_from([
        "agrilend",
        "browse",
        "farmers",
        "--page",
        "5",
        "--select-all",
        "--bulk",
        "Deactivate",
        "-o",
        "json",
    ]);
    let text = cli::run(&cli.command, &AppConfig::default()).await.unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["page"]["page"], 5);
    assert_eq!(json["selected"].as_array().unwrap().len(), 2);
    assert_eq!(json["messages"][0]["text"], "Deactivate: 2 farmer(s)");
}
