//! Loading the document a command works on.

use std::path::Path;

use astlens::{Document, Language};

use super::Context;

/// Build the document for `file`, or the sample snippet when there is none.
///
/// The language comes from `--language`, else the file extension, else the
/// configuration.
pub fn load(ctx: &Context, file: Option<&Path>) -> astlens::Result<Document> {
    let Some(path) = file else {
        let language = ctx.language.unwrap_or(ctx.config.language);
        tracing::debug!(%language, "No file given, using sample source");
        return Ok(Document::with_sample(language));
    };

    let text = std::fs::read_to_string(path)?;
    let language = ctx
        .language
        .or_else(|| detect(path))
        .unwrap_or(ctx.config.language);
    tracing::info!(path = %path.display(), %language, "Loaded source file");
    Ok(Document::new(language, text))
}

/// Language registered for the file's extension.
pub fn detect(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;
    let language = Language::from_extension(ext);
    if language.is_none() {
        tracing::debug!(path = %path.display(), ext, "Unrecognized extension");
    }
    language
}
