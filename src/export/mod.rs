pub mod pdf;
pub mod report;

use std::path::Path;

use thiserror::Error;

use crate::model::GroupedCatalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Html,
    Json,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<ExportFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".pdf") {
        return Some(ExportFormat::Pdf);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(ExportFormat::Html);
    }
    if lower.ends_with(".json") {
        return Some(ExportFormat::Json);
    }
    None
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render PDF: {source}")]
    Pdf {
        #[source]
        source: lopdf::Error,
    },

    #[error("failed to serialize catalog: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write export file: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// File name the export is saved under when no path is given: `{title}.{ext}`
/// with path separators replaced.
pub fn default_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() {
        "catalog".to_string()
    } else {
        stem
    };
    format!("{stem}.{}", format.extension())
}

pub fn render_json(catalog: &GroupedCatalog) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(catalog).map_err(|e| ExportError::Json { source: e })
}

pub fn render_html(catalog: &GroupedCatalog) -> Vec<u8> {
    report::render_html(catalog)
}

pub fn render_pdf(catalog: &GroupedCatalog) -> Result<Vec<u8>, ExportError> {
    pdf::render_pdf(catalog).map_err(|e| ExportError::Pdf { source: e })
}

pub fn render(catalog: &GroupedCatalog, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Pdf => render_pdf(catalog),
        ExportFormat::Html => Ok(render_html(catalog)),
        ExportFormat::Json => render_json(catalog),
    }
}

pub async fn write_catalog(
    catalog: &GroupedCatalog,
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let bytes = render(catalog, format)?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| ExportError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        bytes = bytes.len(),
        "catalog exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_inference_and_parse() {
        assert_eq!(infer_format_from_path("SD.PDF"), Some(ExportFormat::Pdf));
        assert_eq!(infer_format_from_path("out.htm"), Some(ExportFormat::Html));
        assert_eq!(infer_format_from_path("out.txt"), None);
        assert_eq!(ExportFormat::parse(" Json "), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("xml"), None);
    }

    #[test]
    fn default_file_name_uses_title() {
        assert_eq!(
            default_file_name("Pelatihan SD", ExportFormat::Pdf),
            "Pelatihan SD.pdf"
        );
        assert_eq!(
            default_file_name("TK/PAUD", ExportFormat::Html),
            "TK-PAUD.html"
        );
        assert_eq!(default_file_name("  ", ExportFormat::Json), "catalog.json");
    }
}
