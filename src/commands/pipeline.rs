//! Upload pipeline commands.

use crate::commands::render_lines;
use crate::error::AppError;
use crate::services::pipeline::{PipelineOutcome, UploadTarget};
use crate::services::transport::UploadFile;
use crate::state::Console;
use std::path::PathBuf;

/// Upload spreadsheets as one drop. Only the first file is used.
pub async fn upload(
    console: &Console,
    paths: &[PathBuf],
    target: UploadTarget,
) -> Result<String, AppError> {
    let path = paths
        .first()
        .ok_or_else(|| AppError::invalid_input_field("No file to upload", "file"))?;
    if paths.len() > 1 {
        log::warn!(
            "[pipeline] {} extra file(s) dropped, uploading only {}",
            paths.len() - 1,
            path.display()
        );
    }

    let file = UploadFile::from_path(path).await?;
    let outcome = console.pipeline().run(file, target).await?;
    Ok(summary(&outcome))
}

/// Retry ingest for data already uploaded.
pub async fn ingest(console: &Console, target: UploadTarget) -> Result<String, AppError> {
    let outcome = console.pipeline().run_ingest(target).await?;
    Ok(summary(&outcome))
}

fn summary(outcome: &PipelineOutcome) -> String {
    let mut text = render_lines(&outcome.messages);
    if !outcome.refresh.is_complete() {
        let failed: Vec<String> = outcome.refresh.failed.iter().map(ToString::to_string).collect();
        text.push_str(&format!("\nKept previous rows for {}", failed.join(", ")));
    }
    text
}
