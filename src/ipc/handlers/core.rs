use crate::error::RosterError;
use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::roster::{LoadReport, Roster};
use anyhow::Context;
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (creating if needed) a workspace directory and loads its roster.
/// The previous workspace stays selected if this fails.
pub fn open_workspace(
    state: &mut AppState,
    path: &Path,
    data_file: Option<&str>,
) -> Result<LoadReport, RosterError> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create workspace {}", path.to_string_lossy()))?;
    let file_name = data_file.unwrap_or(&state.data_file);
    let (roster, report) = Roster::open(path.join(file_name))?;
    info!(
        "workspace {} selected ({} students)",
        path.to_string_lossy(),
        report.student_count
    );
    state.workspace = Some(path.to_path_buf());
    state.roster = Some(roster);
    Ok(report)
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let data_file = req
        .params
        .get("dataFile")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if data_file.is_some_and(|f| f.contains(&['/', '\\'][..])) {
        return err(
            &req.id,
            "bad_params",
            "dataFile must be a file name, not a path",
            None,
        );
    }

    match open_workspace(state, &path, data_file) {
        Ok(report) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "dataPath": state
                    .roster
                    .as_ref()
                    .map(|r| r.data_path().to_string_lossy().to_string()),
                "studentCount": report.student_count,
                "codesRepaired": report.codes_repaired,
            }),
        ),
        Err(e) => roster_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
