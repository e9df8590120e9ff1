use anyhow::{Context, Result};
use std::path::PathBuf;

use paddock::annotate::annotate_html;
use paddock::service::FetchService;

pub async fn annotate(
    service: &FetchService,
    input: PathBuf,
    output: Option<PathBuf>,
    fragment: bool,
) -> Result<()> {
    let html = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let directory = service.get_directory().await;
    let annotated = annotate_html(&directory, &html, !fragment);

    tracing::info!(
        input = %input.display(),
        drivers = directory.len(),
        wrapped = annotated.wrapped,
        "Annotated page"
    );

    match output {
        Some(path) => {
            tokio::fs::write(&path, annotated.html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrapped {} driver names into {}", annotated.wrapped, path.display());
        }
        None => println!("{}", annotated.html),
    }
    Ok(())
}
