use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{Backend, FetchError, FixtureSource, RestClient, RestOptions};
use crate::config::{self, ConfigFile};
use crate::export::{self, ExportFormat};
use crate::model::{DurationKind, EMPTY_MONTH_NOTE};
use crate::session::{self, ContentView, ViewSession, ViewState};

fn print_banner() {
    const BANNER: &str = r#"
           __      __             _
  ___  ___/ /_ __ / /________ _  (_)__
 / -_)/ _  / // // __/ __/ _ `/ / / _ \
 \__/ \_,_/\_,_/ \__/_/  \_,_/ /_/_//_/
        jadwal pelatihan tahunan
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) -> String {
    format!(":: {:<10}: {}\n", label, value)
}

#[derive(Clone, Debug, PartialEq)]
struct ExportPlan {
    path: Option<String>,
    format: ExportFormat,
}

#[derive(Clone, Debug)]
struct RunConfig {
    category: String,
    data_file: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: usize,
    proxy: Option<String>,
    expand: Vec<usize>,
    expand_all: bool,
    show: Option<(usize, usize)>,
    export: Option<ExportPlan>,
    no_color: bool,
    verbose: u8,
    retry_command: String,
}

fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:~=@%+,".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Rebuilds the invocation for the failure hint, keeping only the flags that
/// choose the backend. Values read from the config file are left out since a
/// rerun picks them up again.
fn retry_command(args: &CliArgs, category: &str) -> String {
    let mut parts = vec!["edutrain".to_string(), "-k".to_string(), shell_quote(category)];
    let flags = [
        ("-C", args.config.as_deref()),
        ("-D", args.data_file.as_deref()),
        ("-b", args.base_url.as_deref()),
        ("-K", args.api_key.as_deref()),
        ("-p", args.proxy.as_deref()),
    ];
    for (flag, value) in flags {
        if let Some(value) = value {
            parts.push(flag.to_string());
            parts.push(shell_quote(value));
        }
    }
    if let Some(timeout) = args.timeout {
        parts.push("-T".to_string());
        parts.push(timeout.to_string());
    }
    parts.join(" ")
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let category = args
        .category
        .as_deref()
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    let retry_command = retry_command(&args, &category);

    let data_file = args
        .data_file
        .or(cfg.data_file)
        .map(|p| config::expand_tilde_string(&p));
    let base_url = args
        .base_url
        .or(cfg.base_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if data_file.is_none() && base_url.is_none() {
        return Err(
            "no catalog backend configured: set base_url in the config, pass --base-url, or use --data-file"
                .to_string(),
        );
    }
    let api_key = args.api_key.or(cfg.api_key);
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy);

    let show = match args.show.as_deref() {
        Some(raw) => Some(
            validation::parse_show_target(raw)
                .map_err(|e| format!("invalid --show '{raw}': {e}"))?,
        ),
        None => None,
    };

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => Some(
            ExportFormat::parse(&raw)
                .ok_or_else(|| format!("invalid output format '{raw}'"))?,
        ),
        None => None,
    };
    let export = match (output, args.export) {
        (Some(path), _) => {
            let format = output_format
                .or_else(|| export::infer_format_from_path(&path))
                .unwrap_or(ExportFormat::Pdf);
            Some(ExportPlan {
                path: Some(path),
                format,
            })
        }
        (None, true) => Some(ExportPlan {
            path: None,
            format: output_format.unwrap_or(ExportFormat::Pdf),
        }),
        (None, false) => None,
    };

    Ok(RunConfig {
        category,
        data_file,
        base_url,
        api_key,
        timeout,
        proxy,
        expand: args.expand.iter().map(|m| m - 1).collect(),
        expand_all: args.expand_all,
        show,
        export,
        no_color,
        verbose: args.verbose,
        retry_command,
    })
}

async fn build_backend(run: &RunConfig) -> Result<Backend, FetchError> {
    if let Some(path) = run.data_file.as_deref() {
        let fixture = FixtureSource::from_path(std::path::Path::new(path)).await?;
        return Ok(Backend::Fixture(fixture));
    }
    let client = RestClient::new(RestOptions {
        base_url: run.base_url.clone().unwrap_or_default(),
        api_key: run.api_key.clone(),
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
    })?;
    Ok(Backend::Rest(client))
}

fn render_accordion(session: &ViewSession) -> String {
    let Some(catalog) = session.catalog() else {
        return String::new();
    };
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", catalog.title.bold()));
    for (index, month) in catalog.months.iter().enumerate() {
        let expanded = session.is_expanded(index);
        let marker = if expanded { "v" } else { ">" };
        out.push_str(&format!(
            "{} [{:>2}] {} ({})\n",
            marker,
            index + 1,
            month.name.bold(),
            month.trainings.len()
        ));
        if !expanded {
            continue;
        }
        if month.trainings.is_empty() {
            out.push_str(&format!("        {}\n", EMPTY_MONTH_NOTE.italic().dimmed()));
        }
        for (t_index, training) in month.trainings.iter().enumerate() {
            let duration = training.duration_text();
            let duration = match training.duration_kind() {
                DurationKind::Short => duration.green(),
                DurationKind::Long => duration.yellow(),
            };
            out.push_str(&format!(
                "     {}.{:<3} {}  [{}]\n",
                index + 1,
                t_index + 1,
                training.name,
                duration
            ));
        }
    }
    out
}

fn render_content_view(view: &ContentView) -> String {
    let mut out = String::new();
    out.push_str(&format_kv_line("Pelatihan", &view.title));
    out.push_str(&format_kv_line("Kategori", &view.category_label));
    out.push_str(&format_kv_line("Bulan", &view.month));
    let duration = match view.duration_kind {
        DurationKind::Short => view.duration.green(),
        DurationKind::Long => view.duration.yellow(),
    };
    out.push_str(&format_kv_line("Durasi", &duration.to_string()));
    if view.video.is_placeholder() {
        out.push_str(&format_kv_line(
            "Video",
            &format!("{} (belum tersedia)", view.video.label()),
        ));
    } else {
        out.push_str(&format_kv_line(
            "Video",
            &format!("{} {}", view.video.label(), view.video.player_url()),
        ));
        if let Some(link) = view.video.external_url() {
            out.push_str(&format_kv_line("Buka", &link));
        }
        if let Some(thumb) = view.video.thumbnail_url() {
            out.push_str(&format_kv_line("Thumbnail", &thumb));
        }
    }
    out.push_str(&format_kv_line("Modul PDF", &view.download_link));
    out.push_str(&format_kv_line("Materi", ""));
    for line in view.materi.lines() {
        out.push_str("   ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn render_failure(message: &str, retry_command: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Gagal Memuat Data".red().bold()));
    out.push_str(&format!("{}\n", message));
    out.push_str(&format!(
        "Pastikan tabel 'categories' dan 'trainings' tersedia di backend.\nCoba lagi: {}\n",
        retry_command
    ));
    out
}

fn loading_spinner(no_color: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = if no_color {
        "{spinner} {msg}"
    } else {
        "{spinner:.green} {msg}"
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Memuat data pelatihan...");
    pb
}

async fn export_catalog(session: &ViewSession, plan: &ExportPlan) -> Result<PathBuf, String> {
    let guard = session.begin_export().map_err(|e| e.to_string())?;
    let catalog = session.catalog().ok_or_else(|| "no catalog is loaded".to_string())?;
    let path = PathBuf::from(
        plan.path
            .clone()
            .unwrap_or_else(|| export::default_file_name(&catalog.title, plan.format)),
    );
    let result = export::write_catalog(catalog, &path, plan.format).await;
    drop(guard);
    result.map_err(|e| {
        tracing::error!(error = %e, "export failed");
        e.to_string()
    })?;
    Ok(path)
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let now = Instant::now();
    let backend = build_backend(&run).await.map_err(|e| e.to_string())?;
    match &backend {
        Backend::Rest(client) => print!("{}", format_kv_line("Backend", client.base_url())),
        Backend::Fixture(_) => print!(
            "{}",
            format_kv_line("Data", run.data_file.as_deref().unwrap_or_default())
        ),
    }
    print!("{}", format_kv_line("Kategori", &run.category));
    println!();

    let mut view = ViewSession::new();
    let pb = loading_spinner(run.no_color);
    let state = session::load(&mut view, &backend, &run.category).await;
    pb.finish_and_clear();

    if let ViewState::Failed {
        category_id,
        message,
    } = state
    {
        print!("{}", render_failure(message, &run.retry_command));
        return Err(format!("failed to load category '{category_id}'"));
    }

    let months: Vec<usize> = if run.expand_all {
        (0..12).collect()
    } else {
        run.expand.clone()
    };
    for month in months {
        if !view.is_expanded(month) {
            view.toggle_month(month);
        }
    }
    print!("{}", render_accordion(&view));

    if let Some((month, index)) = run.show {
        let content = view
            .select_training(month, index)
            .ok_or_else(|| format!("no training {}.{} in this catalog", month + 1, index + 1))?;
        println!();
        print!("{}", render_content_view(&content));
    }

    if let Some(plan) = run.export.as_ref() {
        let path = export_catalog(&view, plan).await?;
        println!();
        print!("{}", format_kv_line("Disimpan", &path.display().to_string()));
    }

    view.close();
    println!();
    println!(":: Selesai :: {}ms ::", now.elapsed().as_millis());
    Ok(())
}

fn init_config(path: Option<String>) -> Result<(), String> {
    let path = match path {
        Some(p) => config::expand_tilde(&p),
        None => config::default_config_path()
            .ok_or_else(|| "could not resolve home directory for the config file".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        println!("config written to {}", path.display());
    } else {
        println!("config already exists at {}", path.display());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        return init_config(args.config);
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    if let Err(e) = crate::logging::init(run.verbose, !run.no_color) {
        eprintln!("warning: {e}");
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
