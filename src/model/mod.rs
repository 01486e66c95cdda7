use serde::{Deserialize, Deserializer, Serialize};

/// Calendar month labels used for the twelve catalog buckets.
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

pub const DEFAULT_DURATION: &str = "1 Hari";

pub const MATERI_PLACEHOLDER: &str = "Materi untuk pelatihan ini sedang dalam tahap penyusunan. Harap cek kembali secara berkala untuk mendapatkan materi lengkap, panduan, dan sumber daya pendukung lainnya yang berkaitan dengan topik ini.";

pub const EMPTY_MONTH_NOTE: &str = "Belum ada pelatihan untuk bulan ini.";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub title: String,
}

/// A single training record as stored by the backend.
///
/// Unknown columns are ignored and every optional column tolerates `null`.
/// `month_index` is kept as a raw integer so out-of-range values survive
/// deserialization and are dropped later by [`group`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Training {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_month_index")]
    pub month_index: Option<i64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub vimeo_id: Option<String>,
    #[serde(default)]
    pub google_drive_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub materi: Option<String>,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

// Anything that is not an integral number (strings, fractions, objects) maps
// to `None` instead of failing the whole payload.
fn lenient_month_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_i64().or_else(|| {
            v.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        })
    }))
}

// A null or non-string name becomes the empty string so one broken row does
// not reject the rest of the payload.
fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationKind {
    Short,
    Long,
}

impl Training {
    /// Bucket position for this record, if it names a real month.
    pub fn month_slot(&self) -> Option<usize> {
        match self.month_index {
            Some(i) if (0..12).contains(&i) => Some(i as usize),
            _ => None,
        }
    }

    pub fn duration_text(&self) -> &str {
        non_empty(self.duration.as_deref()).unwrap_or(DEFAULT_DURATION)
    }

    pub fn duration_kind(&self) -> DurationKind {
        if self.duration_text().contains('1') {
            DurationKind::Short
        } else {
            DurationKind::Long
        }
    }

    pub fn materi_text(&self) -> &str {
        non_empty(self.materi.as_deref()).unwrap_or(MATERI_PLACEHOLDER)
    }
}

/// Returns the value unless it is missing or the empty string.
///
/// Whitespace counts as content.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthBucket {
    pub name: String,
    pub trainings: Vec<Training>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupedCatalog {
    pub title: String,
    pub months: Vec<MonthBucket>,
}

impl GroupedCatalog {
    pub fn training(&self, month: usize, index: usize) -> Option<&Training> {
        self.months.get(month)?.trainings.get(index)
    }

    pub fn total_trainings(&self) -> usize {
        self.months.iter().map(|m| m.trainings.len()).sum()
    }
}

/// Partitions `trainings` into twelve month buckets in calendar order.
///
/// The partition is stable: records keep the relative order they were given
/// in. Records without a month in `0..12` land in no bucket.
pub fn group<I>(title: &str, trainings: I) -> GroupedCatalog
where
    I: IntoIterator<Item = Training>,
{
    let mut months: Vec<MonthBucket> = MONTH_NAMES
        .iter()
        .map(|name| MonthBucket {
            name: (*name).to_string(),
            trainings: Vec::new(),
        })
        .collect();

    for training in trainings {
        if let Some(slot) = training.month_slot() {
            months[slot].trainings.push(training);
        }
    }

    GroupedCatalog {
        title: title.to_string(),
        months,
    }
}
