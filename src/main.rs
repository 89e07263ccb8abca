mod args;
mod backup;
mod error;
mod ipc;
mod logging;
mod record;
mod roster;
mod store;

use clap::Parser;
use log::{debug, error, warn};
use serde_json::json;
use std::io::{self, BufRead, Write};

fn main() {
    let args = args::StudentdArgs::parse();
    logging::configure_logging(args.logging_config.as_deref(), args.log_level.into());

    let mut state = ipc::AppState {
        workspace: None,
        data_file: args.data_file.clone(),
        roster: None,
    };

    if let Some(workspace) = args.workspace.as_deref() {
        // A bad startup workspace leaves the daemon running with none selected.
        if let Err(e) = ipc::open_workspace(&mut state, workspace, None) {
            error!(
                "failed to open workspace {}: {:#}",
                workspace.to_string_lossy(),
                e
            );
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!("stdin closed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        debug!("request {} {}", req.id, req.method);
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
