use std::collections::HashMap;

use crate::client::{FetchError, FixtureSource};
use crate::model::{group, GroupedCatalog, Training};
use crate::resolve::{
    category_label, resolve_download_link, resolve_video_source, VideoSource,
    FALLBACK_CATEGORY_LABEL, FALLBACK_YOUTUBE_ID,
};
use crate::session::{self, Completion, SessionError, ViewSession, ViewState};

fn training(name: &str, month: Option<i64>) -> Training {
    Training {
        name: name.to_string(),
        month_index: month,
        ..Default::default()
    }
}

fn sample_catalog() -> GroupedCatalog {
    group(
        "Sekolah Dasar",
        vec![training("Literasi", Some(0)), training("Numerasi", Some(2))],
    )
}

const FIXTURE: &str = r#"{
    "categories": [
        {"id": "sd", "title": "Sekolah Dasar"},
        {"id": "smp", "title": "Sekolah Menengah Pertama"}
    ],
    "trainings": [
        {"category_id": "sd", "name": "Numerasi", "month_index": 2, "duration": "2 Hari", "vimeo_id": "76979871"},
        {"category_id": "sd", "name": "Literasi", "month_index": 0, "pdf_path": "1AbC_def"},
        {"category_id": "sd", "name": "Broken", "month_index": 14},
        {"category_id": "smp", "name": "Sains", "month_index": 6}
    ]
}"#;

#[test]
fn group_is_a_permutation_of_valid_input() {
    let input: Vec<Training> = (0..30)
        .map(|i| training(&format!("t{i}"), Some((i * 5) % 14 - 1)))
        .collect();
    let valid: Vec<&Training> = input.iter().filter(|t| t.month_slot().is_some()).collect();

    let catalog = group("SMA", input.clone());
    assert_eq!(catalog.months.len(), 12);

    let mut expected: HashMap<String, usize> = HashMap::new();
    for t in valid.iter() {
        *expected.entry(t.name.clone()).or_default() += 1;
    }
    let mut actual: HashMap<String, usize> = HashMap::new();
    for (slot, month) in catalog.months.iter().enumerate() {
        for t in month.trainings.iter() {
            assert_eq!(t.month_index, Some(slot as i64));
            *actual.entry(t.name.clone()).or_default() += 1;
        }
    }
    assert_eq!(actual, expected);
    assert!(catalog.total_trainings() <= input.len());
}

#[test]
fn group_is_stable_inside_a_bucket() {
    let catalog = group(
        "SD",
        vec![
            training("A", Some(3)),
            training("other", Some(4)),
            training("B", Some(3)),
        ],
    );
    let names: Vec<_> = catalog.months[3].trainings.iter().map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn group_excludes_invalid_month_indices() {
    let catalog = group(
        "SD",
        vec![
            training("minus", Some(-1)),
            training("twelve", Some(12)),
            training("absent", None),
        ],
    );
    assert_eq!(catalog.total_trainings(), 0);
}

#[test]
fn vimeo_wins_over_youtube() {
    let t = Training {
        vimeo_id: Some("123".to_string()),
        youtube_id: Some("abc".to_string()),
        ..training("x", Some(0))
    };
    assert_eq!(
        resolve_video_source(&t),
        VideoSource::Vimeo {
            id: "123".to_string()
        }
    );
}

#[test]
fn no_video_fields_fall_back_to_placeholder() {
    let source = resolve_video_source(&training("x", Some(0)));
    assert_eq!(
        source,
        VideoSource::YouTube {
            id: FALLBACK_YOUTUBE_ID.to_string()
        }
    );
    assert!(source.is_placeholder());
}

#[test]
fn download_links() {
    assert_eq!(
        resolve_download_link(Some("1AbC_def")),
        "https://drive.google.com/uc?export=download&id=1AbC_def"
    );
    assert_eq!(
        resolve_download_link(Some("https://example.com/a.pdf")),
        "https://example.com/a.pdf"
    );
    assert_eq!(resolve_download_link(None), "#");
}

#[test]
fn category_labels() {
    assert_eq!(category_label("sd"), "SD");
    assert_eq!(category_label("tk"), "TK / PAUD");
    assert_eq!(category_label("sma"), "SMA / SMK");
    assert_eq!(category_label("unknown"), FALLBACK_CATEGORY_LABEL);
}

#[test]
fn stale_completion_is_ignored() {
    let mut view = ViewSession::new();
    let first = view.open("sd");
    let second = view.open("smp");

    assert_eq!(
        view.complete::<String>(&first, Ok(sample_catalog())),
        Completion::Stale
    );
    assert!(matches!(view.state(), ViewState::Loading { category_id } if category_id == "smp"));

    assert_eq!(
        view.complete::<String>(&second, Ok(group("SMP", Vec::new()))),
        Completion::Applied
    );
    assert_eq!(view.catalog().unwrap().title, "SMP");
}

#[test]
fn completion_after_close_is_ignored() {
    let mut view = ViewSession::new();
    let ticket = view.open("sd");
    view.close();
    assert_eq!(
        view.complete::<String>(&ticket, Ok(sample_catalog())),
        Completion::Stale
    );
    assert_eq!(view.state(), &ViewState::Closed);
    assert!(view.catalog().is_none());
}

#[test]
fn failure_keeps_no_catalog_and_can_retry() {
    let mut view = ViewSession::new();
    let ticket = view.open("sd");
    view.complete(&ticket, Err("timeout"));
    assert!(view.catalog().is_none());
    assert!(matches!(view.state(), ViewState::Failed { message, .. } if message == "timeout"));

    let retry = view.retry().unwrap();
    assert_eq!(retry.category_id(), "sd");
    assert_eq!(
        view.complete::<String>(&retry, Ok(sample_catalog())),
        Completion::Applied
    );
    assert!(view.retry().is_none());
}

#[test]
fn reopening_collapses_accordion() {
    let mut view = ViewSession::new();
    let ticket = view.open("sd");
    view.complete::<String>(&ticket, Ok(sample_catalog()));
    assert_eq!(view.toggle_month(2), Some(true));
    assert_eq!(view.toggle_month(12), None);
    assert!(view.is_expanded(2));

    let ticket = view.open("sd");
    assert!(!view.is_expanded(2));
    assert_eq!(view.toggle_month(2), None);
    view.complete::<String>(&ticket, Ok(sample_catalog()));
    assert_eq!(view.toggle_month(2), Some(true));
    assert_eq!(view.toggle_month(2), Some(false));
}

#[test]
fn select_training_builds_content_view() {
    let mut view = ViewSession::new();
    assert!(view.select_training(0, 0).is_none());

    let ticket = view.open("sd");
    let catalog = group(
        "SD",
        vec![Training {
            google_drive_id: Some("drive-id".to_string()),
            duration: Some("3 Hari".to_string()),
            pdf_path: Some("https://example.com/modul.pdf".to_string()),
            materi: Some("Pengantar".to_string()),
            ..training("Asesmen", Some(7))
        }],
    );
    view.complete::<String>(&ticket, Ok(catalog));

    let content = view.select_training(7, 0).unwrap();
    assert_eq!(content.title, "Asesmen");
    assert_eq!(content.month, "Agustus");
    assert_eq!(content.duration, "3 Hari");
    assert_eq!(content.category_label, "SD");
    assert_eq!(
        content.video,
        VideoSource::GoogleDrive {
            id: "drive-id".to_string()
        }
    );
    assert_eq!(content.materi, "Pengantar");
    assert_eq!(content.download_link, "https://example.com/modul.pdf");

    assert!(view.select_training(7, 1).is_none());
    assert!(view.select_training(12, 0).is_none());
}

#[test]
fn export_guard_blocks_double_submission_and_resets() {
    let mut view = ViewSession::new();
    assert_eq!(view.begin_export().unwrap_err(), SessionError::NoCatalog);

    let ticket = view.open("sd");
    view.complete::<String>(&ticket, Ok(sample_catalog()));

    let guard = view.begin_export().unwrap();
    assert!(view.is_exporting());
    assert_eq!(
        view.begin_export().unwrap_err(),
        SessionError::ExportInProgress
    );
    drop(guard);
    assert!(!view.is_exporting());

    let failed: Result<(), &str> = (|| {
        let _guard = view.begin_export().map_err(|_| "busy")?;
        Err("render failed")
    })();
    assert_eq!(failed, Err("render failed"));
    assert!(!view.is_exporting());
}

#[tokio::test]
async fn load_from_fixture_groups_and_drops_bad_months() {
    let source = FixtureSource::from_json_str(FIXTURE, "fixture").unwrap();
    let mut view = ViewSession::new();
    let state = session::load(&mut view, &source, "sd").await;
    assert!(matches!(state, ViewState::Ready { .. }));

    let catalog = view.catalog().unwrap();
    assert_eq!(catalog.title, "Sekolah Dasar");
    assert_eq!(catalog.total_trainings(), 2);
    assert_eq!(catalog.months[0].trainings[0].name, "Literasi");
    assert_eq!(catalog.months[2].trainings[0].name, "Numerasi");

    let content = view.select_training(2, 0).unwrap();
    assert_eq!(content.video.embed_url(), "https://player.vimeo.com/video/76979871");
}

#[tokio::test]
async fn load_unknown_category_fails_without_catalog() {
    let source = FixtureSource::from_json_str(FIXTURE, "fixture").unwrap();
    let mut view = ViewSession::new();
    let state = session::load(&mut view, &source, "tk").await;
    match state {
        ViewState::Failed {
            category_id,
            message,
        } => {
            assert_eq!(category_id, "tk");
            assert_eq!(
                message,
                &FetchError::NotFound {
                    id: "tk".to_string()
                }
                .to_string()
            );
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(view.catalog().is_none());
}

#[tokio::test]
async fn export_writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = sample_catalog();

    let pdf_path = dir
        .path()
        .join(crate::export::default_file_name(&catalog.title, crate::export::ExportFormat::Pdf));
    crate::export::write_catalog(&catalog, &pdf_path, crate::export::ExportFormat::Pdf)
        .await
        .unwrap();
    let bytes = std::fs::read(&pdf_path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(pdf_path.ends_with("Sekolah Dasar.pdf"));

    let json_path = dir.path().join("catalog.json");
    crate::export::write_catalog(&catalog, &json_path, crate::export::ExportFormat::Json)
        .await
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(value["months"].as_array().unwrap().len(), 12);
    assert_eq!(value["months"][2]["trainings"][0]["name"], "Numerasi");

    let missing_dir = dir.path().join("missing").join("out.html");
    let err = crate::export::write_catalog(&catalog, &missing_dir, crate::export::ExportFormat::Html)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("out.html"));
}
