//! Resource record persisted for every repository object placed in a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CourseId, RecordId};

/// Presentation settings stored alongside a resource.
///
/// The defaults match what the course UI writes when the editor leaves the
/// display options untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    /// Free-form option string passed through to the renderer.
    #[serde(default)]
    pub options: String,
    /// Popup window specification; empty means inline rendering.
    #[serde(default)]
    pub popup_window: String,
    /// Tracking flag.
    #[serde(default)]
    pub tracking: i64,
    /// Inline width in pixels.
    #[serde(default)]
    pub window_width: Option<u32>,
    /// Inline height in pixels.
    #[serde(default)]
    pub window_height: Option<u32>,
    /// Float alignment (`left`, `right`, `none`).
    #[serde(default)]
    pub window_float: Option<String>,
    /// Whether course blocks stay visible while the resource is shown.
    #[serde(default)]
    pub show_course_blocks: bool,
}

/// A course resource linked to a node in the repository.
///
/// # Invariant
///
/// A persisted record with a `usage_id` corresponds to a live usage in the
/// repository. Callers that fail to create the usage roll the record back
/// (update) or remove it (create).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Generated primary key.
    pub id: RecordId,
    /// Owning course.
    pub course: CourseId,
    /// Display name.
    pub name: String,
    /// Introductory text shown above the resource.
    pub intro: String,
    /// Repository object URL, e.g. `ccrep://home/9b1a...`.
    pub object_url: String,
    /// Node version pinned by this resource (`"0"` follows the latest).
    pub object_version: String,
    /// Usage handle returned by the repository, once linked.
    pub usage_id: Option<String>,
    /// Creation time.
    pub time_created: DateTime<Utc>,
    /// Last modification time.
    pub time_modified: DateTime<Utc>,
    /// Last time the usage link was (re)established.
    pub time_updated: DateTime<Utc>,
    /// Presentation settings.
    pub presentation: PresentationOptions,
}

/// A record not yet inserted; the store assigns the id.
///
/// # Example
///
/// ```
/// use edusharing_storage::{CourseId, NewResourceRecord};
///
/// let record = NewResourceRecord::builder()
///     .course(CourseId::from(7))
///     .name("Photosynthesis")
///     .object_url("ccrep://home/9b1a")
///     .object_version("1.0")
///     .build();
///
/// assert!(record.intro.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct NewResourceRecord {
    /// Owning course.
    pub course: CourseId,
    /// Display name.
    #[builder(into, default)]
    pub name: String,
    /// Introductory text.
    #[builder(into, default)]
    pub intro: String,
    /// Repository object URL.
    #[builder(into)]
    pub object_url: String,
    /// Requested node version.
    #[builder(into, default)]
    pub object_version: String,
    /// Creation time.
    #[builder(default = Utc::now())]
    pub time_created: DateTime<Utc>,
    /// Modification time.
    #[builder(default = Utc::now())]
    pub time_modified: DateTime<Utc>,
    /// Link time.
    #[builder(default = Utc::now())]
    pub time_updated: DateTime<Utc>,
    /// Presentation settings.
    #[builder(default)]
    pub presentation: PresentationOptions,
}

impl NewResourceRecord {
    /// Materializes the record under the id the store generated.
    ///
    /// The usage id is always empty: links are attached by a later update.
    #[must_use]
    pub fn into_record(self, id: RecordId) -> ResourceRecord {
        ResourceRecord {
            id,
            course: self.course,
            name: self.name,
            intro: self.intro,
            object_url: self.object_url,
            object_version: self.object_version,
            usage_id: None,
            time_created: self.time_created,
            time_modified: self.time_modified,
            time_updated: self.time_updated,
            presentation: self.presentation,
        }
    }
}

impl ResourceRecord {
    /// Storage key used in errors and log fields.
    #[must_use]
    pub fn key(id: RecordId) -> String {
        format!("edusharing/{id}")
    }

    /// Returns `true` once a usage handle has been attached.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.usage_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
