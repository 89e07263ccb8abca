use crate::backup;
use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use log::info;
use serde_json::json;
use std::path::PathBuf;

fn path_param(req: &Request, key: &str) -> Option<PathBuf> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(out_path) = path_param(req, "outPath") else {
        return err(&req.id, "bad_params", "missing outPath", None);
    };

    match backup::export_roster_bundle(roster.data_path(), &out_path) {
        Ok(summary) => {
            info!("exported roster bundle to {}", out_path.to_string_lossy());
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                    "sha256": summary.sha256,
                }),
            )
        }
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(in_path) = path_param(req, "inPath") else {
        return err(&req.id, "bad_params", "missing inPath", None);
    };

    let summary = match backup::import_roster_bundle(&in_path, roster.data_path()) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "io_failed", format!("{e:#}"), None),
    };
    info!(
        "imported {} roster from {}",
        summary.bundle_format_detected,
        in_path.to_string_lossy()
    );

    match roster.refresh() {
        Ok(report) => ok(
            &req.id,
            json!({
                "bundleFormatDetected": summary.bundle_format_detected,
                "studentCount": report.student_count,
                "codesRepaired": report.codes_repaired,
            }),
        ),
        Err(e) => roster_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_export_bundle(state, req)),
        "backup.importBundle" => Some(handle_import_bundle(state, req)),
        _ => None,
    }
}
