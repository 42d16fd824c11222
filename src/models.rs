use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Section
///
/// The areas of the CMS dashboard. Each one is a placeholder page scoped to
/// the caller's church.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Section {
    Dashboard,
    Messages,
    Events,
    Media,
    Website,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Messages => "Messages",
            Section::Events => "Events",
            Section::Media => "Media",
            Section::Website => "Website",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Section::Dashboard => "Welcome to your church CMS.",
            Section::Messages => "Manage sermons and messages here.",
            Section::Events => "Manage upcoming events here.",
            Section::Media => "Manage images, audio and video here.",
            Section::Website => "Manage your website theme and pages here.",
        }
    }
}

/// DashboardSection
///
/// Response body of every protected dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSection {
    pub section: Section,
    pub title: String,
    pub summary: String,
    /// Church the page is scoped to.
    pub church_id: String,
}

impl DashboardSection {
    pub fn new(section: Section, church_id: &str) -> Self {
        Self {
            section,
            title: section.title().to_string(),
            summary: section.summary().to_string(),
            church_id: church_id.to_string(),
        }
    }
}

/// LoginPage
///
/// Public descriptor of the login route. The form itself is served by the
/// authentication provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginPage {
    pub title: String,
    pub login_path: String,
    /// Where the visitor signs in: `remote` (external auth service) or `token`.
    pub provider: String,
}
