use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::types::StagedFile;
use crate::error::MarketplaceError;

/// Text fields and staged files of one multipart request.
#[derive(Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, StagedFile)>,
}

impl MultipartForm {
    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// First file sent under `name`.
    pub fn file(&mut self, name: &str) -> Option<StagedFile> {
        let index = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.remove(index).1)
    }

    /// Every file sent under `name`, in request order.
    pub fn files(&mut self, name: &str) -> Vec<StagedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(n, _)| n == name);
        self.files = rest;
        matching.into_iter().map(|(_, f)| f).collect()
    }
}

fn invalid(err: MultipartError) -> MarketplaceError {
    MarketplaceError::InvalidBody(err.body_text())
}

/// Drain a multipart body. Text parts are buffered; file parts are streamed
/// into `upload_dir` under random names.
pub async fn read_multipart(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<MultipartForm, MarketplaceError> {
    let mut form = MultipartForm::default();
    while let Some(mut field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned);

        let Some(file_name) = file_name else {
            let value = field.text().await.map_err(invalid)?;
            form.fields.insert(name, value);
            continue;
        };

        // Registered before the first write so a failed request still
        // cleans up a partial file.
        let staged = StagedFile {
            path: upload_dir.join(Uuid::new_v4().to_string()),
            file_name,
            content_type: field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned(),
        };
        let mut out = tokio::fs::File::create(&staged.path)
            .await
            .with_context(|| format!("create staged file {}", staged.path.display()))?;
        while let Some(chunk) = field.chunk().await.map_err(invalid)? {
            out.write_all(&chunk).await.context("write staged file")?;
        }
        out.flush().await.context("flush staged file")?;
        form.files.push((name, staged));
    }
    Ok(form)
}
