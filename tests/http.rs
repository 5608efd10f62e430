use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct CoverageView {
    policy: String,
    end_date: String,
    status: String,
    total_days: i64,
    days_elapsed: i64,
    days_remaining: i64,
    percent_elapsed: f64,
}

#[derive(Debug, Deserialize)]
struct ReportSummary {
    id: String,
    customer: String,
    warranties: Vec<CoverageView>,
}

#[derive(Debug, Deserialize)]
struct SkippedReport {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReportsResponse {
    reports: Vec<ReportSummary>,
    skipped: Vec<SkippedReport>,
}

#[derive(Debug, Deserialize)]
struct MaintenanceEntry {
    report_id: String,
    policy: String,
    due_date: String,
    days_remaining: i64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct MaintenanceResponse {
    entries: Vec<MaintenanceEntry>,
}

#[derive(Debug, Deserialize)]
struct ReportDetailResponse {
    report: ReportSummary,
    maintenance: Vec<MaintenanceEntry>,
}

const SEED_DATA: &str = r#"{
  "reports": [
    {
      "id": "r-1001",
      "customer": "Maya Okafor",
      "device": { "brand": "Nimbus", "model": "X2", "serial": "NX2-4411" },
      "issue": "screen flicker after drop",
      "reported_at": "2025-01-01T00:00:00Z",
      "invoice": { "number": "INV-2025-0117", "amount_cents": 12900 }
    },
    {
      "id": "r-1002",
      "customer": "Turgen Bat-Erdene",
      "device": { "brand": "Helios", "model": "P5", "serial": "HP5-0923" },
      "issue": "battery drains overnight",
      "reported_at": "2023-05-15"
    },
    {
      "id": "r-bad",
      "customer": "Nobody",
      "device": { "brand": "?", "model": "?", "serial": "?" },
      "issue": "corrupt record",
      "reported_at": "unknown"
    }
  ],
  "completed_maintenance": []
}"#;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn seeded_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "repair_portal_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    std::fs::write(&path, SEED_DATA).expect("seed data file");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/reports")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = seeded_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_repair_portal"))
        .env("PORT", port.to_string())
        .env("PORTAL_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_reports_evaluates_warranties_at_fixed_date() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: ReportsResponse = client
        .get(format!(
            "{}/api/reports?at=2025-01-10T12:00:00Z",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.reports.len(), 2);
    assert_eq!(body.skipped.len(), 1);
    assert_eq!(body.skipped[0].id, "r-bad");

    let report = body
        .reports
        .iter()
        .find(|report| report.id == "r-1001")
        .expect("missing r-1001");
    assert_eq!(report.customer, "Maya Okafor");
    assert_eq!(report.warranties.len(), 3);

    let replacement = report
        .warranties
        .iter()
        .find(|warranty| warranty.policy == "replacement")
        .expect("missing replacement warranty");
    assert_eq!(replacement.status, "active");
    assert_eq!(replacement.end_date, "2025-01-15");
    assert_eq!(replacement.total_days, 14);
    assert_eq!(replacement.days_elapsed, 10);
    assert_eq!(replacement.days_remaining, 4);
    assert!((replacement.percent_elapsed - 71.4).abs() < 0.05);

    let defect = report
        .warranties
        .iter()
        .find(|warranty| warranty.policy == "manufacturing_defect")
        .expect("missing manufacturing_defect warranty");
    assert_eq!(defect.status, "active");
    assert_eq!(defect.end_date, "2025-07-01");
}

#[tokio::test]
async fn http_report_detail_includes_maintenance_schedule() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: ReportDetailResponse = client
        .get(format!(
            "{}/api/reports/r-1001?at=2026-02-01T00:00:00Z",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.report.id, "r-1001");
    assert_eq!(body.maintenance.len(), 2);
    for entry in &body.maintenance {
        assert_eq!(entry.status, "due");
        assert_eq!(entry.days_remaining, 0);
    }
}

#[tokio::test]
async fn http_maintenance_schedule_classifies_windows() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: MaintenanceResponse = client
        .get(format!(
            "{}/api/maintenance?at=2025-06-15T00:00:00Z",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let first_service = body
        .entries
        .iter()
        .find(|entry| entry.report_id == "r-1001" && entry.policy == "periodic_maintenance_1")
        .expect("missing r-1001 first service");
    assert_eq!(first_service.due_date, "2025-07-01");
    assert_eq!(first_service.days_remaining, 16);
    assert_eq!(first_service.status, "upcoming");

    let second_service = body
        .entries
        .iter()
        .find(|entry| entry.report_id == "r-1001" && entry.policy == "periodic_maintenance_2")
        .expect("missing r-1001 second service");
    assert_eq!(second_service.due_date, "2026-01-01");
    assert_eq!(second_service.status, "scheduled");

    let overdue = body
        .entries
        .iter()
        .find(|entry| entry.report_id == "r-1002" && entry.policy == "periodic_maintenance_2")
        .expect("missing r-1002 second service");
    assert_eq!(overdue.due_date, "2024-05-15");
    assert_eq!(overdue.status, "due");
}

#[tokio::test]
async fn http_completing_maintenance_updates_schedule() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let entry: MaintenanceEntry = client
        .post(format!("{}/api/maintenance/complete", server.base_url))
        .json(&serde_json::json!({
            "report_id": "r-1002",
            "policy": "periodic_maintenance_1"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entry.report_id, "r-1002");
    assert_eq!(entry.status, "completed");

    let body: MaintenanceResponse = client
        .get(format!("{}/api/maintenance", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let completed = body
        .entries
        .iter()
        .find(|entry| entry.report_id == "r-1002" && entry.policy == "periodic_maintenance_1")
        .expect("missing completed entry");
    assert_eq!(completed.status, "completed");

    let still_pending = body
        .entries
        .iter()
        .find(|entry| entry.report_id == "r-1002" && entry.policy == "periodic_maintenance_2")
        .expect("missing pending entry");
    assert_ne!(still_pending.status, "completed");
}

#[tokio::test]
async fn http_rejects_unknown_report_and_bad_timestamp() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let missing = client
        .get(format!("{}/api/reports/r-9999", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let bad_at = client
        .get(format!("{}/api/reports?at=yesterday", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_at.status(), reqwest::StatusCode::BAD_REQUEST);

    let bad_policy = client
        .post(format!("{}/api/maintenance/complete", server.base_url))
        .json(&serde_json::json!({
            "report_id": "r-1001",
            "policy": "replacement"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_policy.status(), reqwest::StatusCode::BAD_REQUEST);
}
