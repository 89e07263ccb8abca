use std::path::PathBuf;

use serde::Deserialize;

use crate::roster::Roster;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    /// Roster file name used when a workspace.select doesn't name one.
    pub data_file: String,
    pub roster: Option<Roster>,
}
