//! Resource table commands.

use crate::commands::render_rows;
use crate::error::AppError;
use crate::models::{ResourceKind, ResourceRow};
use crate::services::resources::ResourceFetcher;
use crate::state::Console;

/// Render one resource's current rows.
///
/// Rows kept from an earlier load after a failed reload are still shown,
/// followed by the reload error.
pub async fn show(console: &Console, kind: ResourceKind) -> Result<String, AppError> {
    let resources = console.resources();
    let text = match kind {
        ResourceKind::Info => table(&resources.info).await,
        ResourceKind::Csv => table(&resources.csv).await,
        ResourceKind::CsvProjects => table(&resources.csv_projects).await,
        ResourceKind::Projects => table(&resources.projects).await,
        ResourceKind::Repos => table(&resources.repos).await,
    };
    Ok(text)
}

async fn table<R: ResourceRow>(fetcher: &ResourceFetcher<R>) -> String {
    let rows = fetcher.rows().await;
    let mut text = format!("{} ({} rows)\n{}", R::KIND, rows.len(), render_rows(&rows));
    if let Some(error) = fetcher.last_error().await {
        text.push_str(&format!("\nLast reload failed, showing previous rows: {}", error));
    }
    text
}

/// Invalidate the server cache and reload every table.
pub async fn refresh(console: &Console) -> Result<String, AppError> {
    let report = console.refresher().invalidate_and_refresh().await?;
    if report.is_complete() {
        return Ok(format!("Refreshed {} resources", report.refreshed.len()));
    }

    let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
    Ok(format!(
        "Refreshed {} resources; kept previous rows for {}",
        report.refreshed.len(),
        failed.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::mock::MockTransport;
    use crate::services::transport::Method;
    use crate::state::tests::console;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_show_renders_rows() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/get_info",
            200,
            json!({ "info": [{ "buid": "U1", "name": "Ada", "project_name": "loom" }] }),
        );
        let (console, _dir) = console(mock);
        console.refresher().refresh(ResourceKind::Info).await;

        let text = show(&console, ResourceKind::Info).await.unwrap();

        assert!(text.starts_with("info (1 rows)"));
        assert!(text.contains("U1"));
        assert!(text.contains("loom"));
    }

    #[tokio::test]
    async fn test_show_flags_stale_rows() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_sequence(
            Method::Get,
            "/git/get_all_repos",
            vec![
                (200, json!({ "repos": [["engine", "u"]] })),
                (500, json!("rate limited")),
            ],
        );
        let (console, _dir) = console(mock);
        console.refresher().refresh(ResourceKind::Repos).await;
        console.refresher().refresh(ResourceKind::Repos).await;

        let text = show(&console, ResourceKind::Repos).await.unwrap();

        assert!(text.contains("engine"));
        assert!(text.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_refresh_reports_failures() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Post, "/refresh", 200, json!({}));
        let (console, _dir) = console(mock);

        // Nothing else is routed, so every GET fails.
        let text = refresh(&console).await.unwrap();

        assert!(text.starts_with("Refreshed 0 resources; kept previous rows for info, csv"));
    }
}
