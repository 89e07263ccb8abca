use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_ENTRY: &str = "data/studentMarks.txt";
pub const BUNDLE_FORMAT_V1: &str = "studentd-roster-v1";
pub const LEGACY_TEXT_FORMAT: &str = "legacy-text";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn export_roster_bundle(data_path: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !data_path.is_file() {
        return Err(anyhow!(
            "roster data file not found: {}",
            data_path.to_string_lossy()
        ));
    }
    let data = std::fs::read(data_path)
        .with_context(|| format!("failed to read roster {}", data_path.to_string_lossy()))?;
    let checksum = sha256_hex(&data);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "sourceFile": data_path.file_name().map(|n| n.to_string_lossy().to_string()),
        "sha256": checksum,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DATA_ENTRY, opts)
        .context("failed to start roster entry")?;
    zip.write_all(&data).context("failed to write roster entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 2,
        sha256: checksum,
    })
}

/// Restores a roster from a bundle, or from a bare roster text file.
/// The destination is only replaced once the payload is fully extracted
/// and its checksum matches the manifest.
pub fn import_roster_bundle(in_path: &Path, data_path: &Path) -> anyhow::Result<ImportSummary> {
    if let Some(parent) = data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let (payload, detected) = if is_zip_file(in_path)? {
        (read_bundle_payload(in_path)?, BUNDLE_FORMAT_V1)
    } else {
        let bytes = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        (bytes, LEGACY_TEXT_FORMAT)
    };

    let mut tmp_name = data_path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| anyhow!("invalid roster path {}", data_path.to_string_lossy()))?;
    tmp_name.push(".importing");
    let tmp_dst = data_path.with_file_name(tmp_name);
    if tmp_dst.exists() {
        let _ = std::fs::remove_file(&tmp_dst);
    }

    let mut out = File::create(&tmp_dst).with_context(|| {
        format!(
            "failed to create temp roster {}",
            tmp_dst.to_string_lossy()
        )
    })?;
    out.write_all(&payload)
        .context("failed to write extracted roster")?;
    out.flush().context("failed to flush extracted roster")?;
    drop(out);

    std::fs::rename(&tmp_dst, data_path).with_context(|| {
        format!(
            "failed to move extracted roster to {}",
            data_path.to_string_lossy()
        )
    })?;

    Ok(ImportSummary {
        bundle_format_detected: detected.to_string(),
    })
}

fn read_bundle_payload(in_path: &Path) -> anyhow::Result<Vec<u8>> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut payload = Vec::new();
    archive
        .by_name(DATA_ENTRY)
        .context("bundle missing data/studentMarks.txt")?
        .read_to_end(&mut payload)
        .context("failed to extract roster entry")?;

    if let Some(expected) = manifest.get("sha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(&payload);
        if actual != expected {
            return Err(anyhow!(
                "roster checksum mismatch: expected={} actual={}",
                expected,
                actual
            ));
        }
    }
    Ok(payload)
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
