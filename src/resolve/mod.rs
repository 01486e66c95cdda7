use serde::Serialize;

use crate::model::{non_empty, Training};

/// Sentinel id rendered when a training has no video configured at all.
///
/// It points at an unrelated public clip and carries no meaning; callers
/// should check [`VideoSource::is_placeholder`] before presenting it as
/// real content.
pub const FALLBACK_YOUTUBE_ID: &str = "dQw4w9WgXcQ";

pub const NO_LINK: &str = "#";

const DRIVE_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoSource {
    Vimeo { id: String },
    GoogleDrive { id: String },
    DirectFile { url: String },
    YouTube { id: String },
}

impl VideoSource {
    pub fn label(&self) -> &'static str {
        match self {
            VideoSource::Vimeo { .. } => "Vimeo",
            VideoSource::GoogleDrive { .. } => "Google Drive",
            VideoSource::DirectFile { .. } => "Video",
            VideoSource::YouTube { .. } => "YouTube",
        }
    }

    /// URL handed to the player: an iframe source, a native video source, or
    /// the YouTube watch page for the lightweight embed.
    pub fn embed_url(&self) -> String {
        match self {
            VideoSource::Vimeo { id } => format!("https://player.vimeo.com/video/{id}"),
            VideoSource::GoogleDrive { id } => {
                format!("https://drive.google.com/file/d/{id}/preview")
            }
            VideoSource::DirectFile { url } => url.clone(),
            VideoSource::YouTube { id } => format!("https://www.youtube.com/embed/{id}"),
        }
    }

    /// Embed URL including the player options the viewer uses.
    pub fn player_url(&self) -> String {
        match self {
            VideoSource::Vimeo { .. } => format!("{}?title=0&byline=0&portrait=0", self.embed_url()),
            _ => self.embed_url(),
        }
    }

    /// "Open on the provider" link, absent for direct files.
    pub fn external_url(&self) -> Option<String> {
        match self {
            VideoSource::Vimeo { id } => Some(format!("https://vimeo.com/{id}")),
            VideoSource::GoogleDrive { id } => {
                Some(format!("https://drive.google.com/file/d/{id}/view"))
            }
            VideoSource::DirectFile { .. } => None,
            VideoSource::YouTube { id } => Some(format!("https://www.youtube.com/watch?v={id}")),
        }
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        match self {
            VideoSource::YouTube { id } => Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, VideoSource::YouTube { id } if id == FALLBACK_YOUTUBE_ID)
    }
}

/// Picks the playable source for a training.
///
/// Priority is fixed and the first non-empty field wins:
/// Vimeo, then Google Drive, then a direct file URL, then YouTube. When none
/// is set the result is YouTube with [`FALLBACK_YOUTUBE_ID`].
pub fn resolve_video_source(training: &Training) -> VideoSource {
    if let Some(id) = non_empty(training.vimeo_id.as_deref()) {
        return VideoSource::Vimeo { id: id.to_string() };
    }
    if let Some(id) = non_empty(training.google_drive_id.as_deref()) {
        return VideoSource::GoogleDrive { id: id.to_string() };
    }
    if let Some(url) = non_empty(training.video_url.as_deref()) {
        return VideoSource::DirectFile {
            url: url.to_string(),
        };
    }
    let id = non_empty(training.youtube_id.as_deref()).unwrap_or(FALLBACK_YOUTUBE_ID);
    VideoSource::YouTube { id: id.to_string() }
}

/// Turns a stored PDF reference into something a download button can use.
///
/// A value that does not start with `http` and has no `/` is taken to be a
/// bare Google Drive file id. Anything else is returned untouched. A slashless
/// malformed URL is indistinguishable from a file id here; the rule is kept
/// for compatibility with stored data.
pub fn resolve_download_link(raw: Option<&str>) -> String {
    match raw.filter(|r| !r.is_empty()) {
        None => NO_LINK.to_string(),
        Some(r) if !r.starts_with("http") && !r.contains('/') => {
            format!("{DRIVE_DOWNLOAD_PREFIX}{r}")
        }
        Some(r) => r.to_string(),
    }
}

pub const FALLBACK_CATEGORY_LABEL: &str = "Lainnya";

pub fn category_label(key: &str) -> &'static str {
    match key {
        "tk" => "TK / PAUD",
        "sd" => "SD",
        "smp" => "SMP",
        "sma" => "SMA / SMK",
        _ => FALLBACK_CATEGORY_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_file_beats_youtube() {
        let t = Training {
            name: "x".to_string(),
            youtube_id: Some("abc".to_string()),
            video_url: Some("https://cdn.example.com/v.mp4".to_string()),
            ..Default::default()
        };
        let source = resolve_video_source(&t);
        assert_eq!(
            source,
            VideoSource::DirectFile {
                url: "https://cdn.example.com/v.mp4".to_string()
            }
        );
        assert_eq!(source.external_url(), None);
        assert_eq!(source.embed_url(), "https://cdn.example.com/v.mp4");
    }

    #[test]
    fn blank_vimeo_id_is_skipped() {
        let t = Training {
            name: "x".to_string(),
            vimeo_id: Some(String::new()),
            google_drive_id: Some("drv".to_string()),
            ..Default::default()
        };
        let source = resolve_video_source(&t);
        assert_eq!(source.embed_url(), "https://drive.google.com/file/d/drv/preview");
        assert_eq!(
            source.external_url().as_deref(),
            Some("https://drive.google.com/file/d/drv/view")
        );
    }

    #[test]
    fn vimeo_player_url_carries_options() {
        let source = VideoSource::Vimeo {
            id: "42".to_string(),
        };
        assert_eq!(source.embed_url(), "https://player.vimeo.com/video/42");
        assert_eq!(
            source.player_url(),
            "https://player.vimeo.com/video/42?title=0&byline=0&portrait=0"
        );
    }

    #[test]
    fn youtube_thumbnail_template() {
        let source = VideoSource::YouTube {
            id: "abc".to_string(),
        };
        assert_eq!(
            source.thumbnail_url().as_deref(),
            Some("https://i.ytimg.com/vi/abc/hqdefault.jpg")
        );
        assert!(!source.is_placeholder());
    }

    #[test]
    fn download_link_keeps_relative_paths() {
        assert_eq!(
            resolve_download_link(Some("files/modul.pdf")),
            "files/modul.pdf"
        );
        assert_eq!(resolve_download_link(Some("")), NO_LINK);
    }

    #[test]
    fn whitespace_ids_still_count_as_set() {
        let t = Training {
            name: "x".to_string(),
            vimeo_id: Some(" ".to_string()),
            youtube_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_video_source(&t),
            VideoSource::Vimeo { id: " ".to_string() }
        );

        let t = Training {
            name: "x".to_string(),
            youtube_id: Some("  ".to_string()),
            ..Default::default()
        };
        let source = resolve_video_source(&t);
        assert_eq!(source, VideoSource::YouTube { id: "  ".to_string() });
        assert!(!source.is_placeholder());
    }
}
