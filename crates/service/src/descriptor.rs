//! Inputs of the usage and lifecycle operations.

use edusharing_storage::{CourseId, PresentationOptions, RecordId};

use crate::error::{Result, ServiceError};

/// Identifies a usage, or the parameters of one to create.
///
/// Every field is optional; each operation checks the ones it needs.
#[derive(Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct UsageDescriptor {
    /// Course id.
    #[builder(into)]
    pub container_id: Option<String>,
    /// Resource id inside the course.
    #[builder(into)]
    pub resource_id: Option<String>,
    /// Repository node id.
    #[builder(into)]
    pub node_id: Option<String>,
    /// Node version to pin.
    #[builder(into)]
    pub node_version: Option<String>,
    /// Ticket to act with.
    #[builder(into)]
    pub ticket: Option<String>,
    /// Repository usage id.
    #[builder(into)]
    pub usage_id: Option<String>,
}

impl UsageDescriptor {
    pub(crate) fn container_id(&self) -> Result<&str> {
        required(self.container_id.as_deref(), "container_id")
    }

    pub(crate) fn resource_id(&self) -> Result<&str> {
        required(self.resource_id.as_deref(), "resource_id")
    }

    pub(crate) fn node_id(&self) -> Result<&str> {
        required(self.node_id.as_deref(), "node_id")
    }

    pub(crate) fn ticket(&self) -> Result<&str> {
        required(self.ticket.as_deref(), "ticket")
    }

    pub(crate) fn node_version(&self) -> Option<&str> {
        self.node_version.as_deref().filter(|v| !v.is_empty())
    }
}

impl std::fmt::Debug for UsageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageDescriptor")
            .field("container_id", &self.container_id)
            .field("resource_id", &self.resource_id)
            .field("node_id", &self.node_id)
            .field("node_version", &self.node_version)
            .field("ticket", &self.ticket.as_ref().map(|_| "<redacted>"))
            .field("usage_id", &self.usage_id)
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    value.filter(|v| !v.is_empty()).ok_or(ServiceError::MissingField { field })
}

/// A repository object being placed in a course.
#[derive(Clone, Debug, PartialEq, Eq, bon::Builder)]
pub struct AddResourceInput {
    /// Course the resource goes into.
    pub course: CourseId,
    /// Display name.
    #[builder(into, default)]
    pub name: String,
    /// Introduction text.
    #[builder(into, default)]
    pub intro: String,
    /// Repository object URL, e.g. `ccrep://home/<node-id>`.
    #[builder(into)]
    pub object_url: String,
    /// Node version to pin; empty for the latest.
    #[builder(into, default)]
    pub object_version: String,
    /// Display settings. `options`, `popup_window` and `tracking` are reset on save.
    #[builder(default)]
    pub presentation: PresentationOptions,
}

/// New settings for an existing resource.
#[derive(Clone, Debug, PartialEq, Eq, bon::Builder)]
pub struct UpdateResourceInput {
    /// Record to update.
    pub id: RecordId,
    /// Course the resource is in.
    pub course: CourseId,
    /// New display name; kept when `None`.
    #[builder(into)]
    pub name: Option<String>,
    /// New introduction text; kept when `None`.
    #[builder(into)]
    pub intro: Option<String>,
    /// Repository object URL.
    #[builder(into)]
    pub object_url: String,
    /// Node version to pin; empty for the latest.
    #[builder(into, default)]
    pub object_version: String,
    /// Display settings. `options`, `popup_window` and `tracking` are reset on save.
    #[builder(default)]
    pub presentation: PresentationOptions,
}

/// Clears the per-save presentation fields, keeping window settings.
pub(crate) fn reset_options(presentation: PresentationOptions) -> PresentationOptions {
    let defaults = PresentationOptions::default();
    PresentationOptions {
        options: defaults.options,
        popup_window: defaults.popup_window,
        tracking: defaults.tracking,
        ..presentation
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let descriptor = UsageDescriptor::builder().node_id("n").container_id("").build();

        assert_eq!(descriptor.node_id().expect("node id"), "n");
        assert!(matches!(
            descriptor.container_id(),
            Err(ServiceError::MissingField { field: "container_id" })
        ));
        assert!(matches!(descriptor.resource_id(), Err(ServiceError::MissingField { field: "resource_id" })));
    }

    #[test]
    fn test_empty_node_version_is_none() {
        let descriptor = UsageDescriptor::builder().node_version("").build();
        assert!(descriptor.node_version().is_none());
    }

    #[test]
    fn test_debug_redacts_ticket() {
        let descriptor = UsageDescriptor::builder().ticket("SECRET").build();
        let printed = format!("{descriptor:?}");
        assert!(!printed.contains("SECRET"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_reset_options_keeps_window_settings() {
        let presentation = PresentationOptions {
            options: "custom".into(),
            popup_window: "1".into(),
            tracking: 2,
            window_width: Some(640),
            window_height: Some(480),
            window_float: Some("left".into()),
            show_course_blocks: true,
        };

        let reset = reset_options(presentation);

        assert_eq!(reset.options, "");
        assert_eq!(reset.popup_window, "");
        assert_eq!(reset.tracking, 0);
        assert_eq!(reset.window_width, Some(640));
        assert_eq!(reset.window_float.as_deref(), Some("left"));
        assert!(reset.show_course_blocks);
    }
}
