use std::sync::{Arc, Mutex, OnceLock};
use axum::{extract::State, http::StatusCode, Json};
use sysinfo::System;
use tracing::info;

use crate::{models::DiagnosticsResponse, AppState};

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Report connection, document and host resource figures
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DiagnosticsResponse>) {

    let (n_conn, doc_chars) = {
        let hub = state.hub.lock().await;
        (hub.connection_count() as u32, hub.document_len() as u64)
    };

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Doc: {} chars",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        doc_chars
    );

    (
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn,
            doc_chars,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    )
}
