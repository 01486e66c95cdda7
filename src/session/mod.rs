use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::client::{self, CatalogSource};
use crate::model::{DurationKind, GroupedCatalog, MONTH_NAMES};
use crate::resolve::{self, VideoSource};

/// Identifies one fetch request. Only the most recently issued ticket can
/// complete a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    category_id: String,
}

impl Ticket {
    pub fn category_id(&self) -> &str {
        &self.category_id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState {
    Closed,
    Loading {
        category_id: String,
    },
    Ready {
        category_id: String,
        catalog: GroupedCatalog,
    },
    Failed {
        category_id: String,
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no catalog is loaded")]
    NoCatalog,

    #[error("an export is already running")]
    ExportInProgress,
}

/// Everything the content viewer shows for one training.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentView {
    pub title: String,
    pub month: String,
    pub duration: String,
    #[serde(skip)]
    pub duration_kind: DurationKind,
    pub category_label: String,
    pub video: VideoSource,
    pub materi: String,
    pub download_link: String,
}

/// Re-enables exporting when dropped, whether the export succeeded or not.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// View state of the catalog modal: which category is active, its grouped
/// catalog once loaded, which months are expanded, and whether an export is
/// running.
#[derive(Debug)]
pub struct ViewSession {
    state: ViewState,
    generation: u64,
    expanded: [bool; 12],
    exporting: Arc<AtomicBool>,
}

impl Default for ViewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSession {
    pub fn new() -> Self {
        Self {
            state: ViewState::Closed,
            generation: 0,
            expanded: [false; 12],
            exporting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn active_category(&self) -> Option<&str> {
        match &self.state {
            ViewState::Closed => None,
            ViewState::Loading { category_id }
            | ViewState::Ready { category_id, .. }
            | ViewState::Failed { category_id, .. } => Some(category_id),
        }
    }

    pub fn catalog(&self) -> Option<&GroupedCatalog> {
        match &self.state {
            ViewState::Ready { catalog, .. } => Some(catalog),
            _ => None,
        }
    }

    /// Starts loading `category_id`, replacing whatever was shown before.
    pub fn open(&mut self, category_id: &str) -> Ticket {
        self.generation += 1;
        self.expanded = [false; 12];
        self.state = ViewState::Loading {
            category_id: category_id.to_string(),
        };
        tracing::debug!(category = category_id, generation = self.generation, "open");
        Ticket {
            generation: self.generation,
            category_id: category_id.to_string(),
        }
    }

    /// Applies a fetch result if `ticket` is still the latest request.
    pub fn complete<E: Display>(
        &mut self,
        ticket: &Ticket,
        result: Result<GroupedCatalog, E>,
    ) -> Completion {
        let current = matches!(
            &self.state,
            ViewState::Loading { category_id } if *category_id == ticket.category_id
        );
        if ticket.generation != self.generation || !current {
            tracing::debug!(
                category = %ticket.category_id,
                generation = ticket.generation,
                "dropping stale result"
            );
            return Completion::Stale;
        }

        self.state = match result {
            Ok(catalog) => ViewState::Ready {
                category_id: ticket.category_id.clone(),
                catalog,
            },
            Err(e) => {
                tracing::warn!(category = %ticket.category_id, error = %e, "catalog fetch failed");
                ViewState::Failed {
                    category_id: ticket.category_id.clone(),
                    message: e.to_string(),
                }
            }
        };
        Completion::Applied
    }

    /// Reissues the fetch for a failed category.
    pub fn retry(&mut self) -> Option<Ticket> {
        let category_id = match &self.state {
            ViewState::Failed { category_id, .. } => category_id.clone(),
            _ => return None,
        };
        Some(self.open(&category_id))
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.expanded = [false; 12];
        self.state = ViewState::Closed;
    }

    /// Flips one accordion section and returns its new state.
    pub fn toggle_month(&mut self, month: usize) -> Option<bool> {
        self.catalog()?;
        let slot = self.expanded.get_mut(month)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn is_expanded(&self, month: usize) -> bool {
        self.expanded.get(month).copied().unwrap_or(false)
    }

    pub fn select_training(&self, month: usize, index: usize) -> Option<ContentView> {
        let ViewState::Ready {
            category_id,
            catalog,
        } = &self.state
        else {
            return None;
        };
        let training = catalog.training(month, index)?;
        Some(ContentView {
            title: training.name.clone(),
            month: MONTH_NAMES[month].to_string(),
            duration: training.duration_text().to_string(),
            duration_kind: training.duration_kind(),
            category_label: resolve::category_label(category_id).to_string(),
            video: resolve::resolve_video_source(training),
            materi: training.materi_text().to_string(),
            download_link: resolve::resolve_download_link(training.pdf_path.as_deref()),
        })
    }

    /// Marks an export as running. Fails while another guard is alive.
    pub fn begin_export(&self) -> Result<ExportGuard, SessionError> {
        if self.catalog().is_none() {
            return Err(SessionError::NoCatalog);
        }
        if self
            .exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::ExportInProgress);
        }
        Ok(ExportGuard {
            flag: Arc::clone(&self.exporting),
        })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }
}

/// Opens `category_id`, fetches it from `source` and applies the result.
pub async fn load<'a, S>(
    session: &'a mut ViewSession,
    source: &S,
    category_id: &str,
) -> &'a ViewState
where
    S: CatalogSource + Sync,
{
    let ticket = session.open(category_id);
    let result = client::load_catalog(source, category_id)
        .await
        .map(|(_, catalog)| catalog);
    session.complete(&ticket, result);
    session.state()
}
