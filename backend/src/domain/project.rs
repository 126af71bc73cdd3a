//! Project data model.
//!
//! A project is a portfolio entry owned by exactly one user. The display
//! name has carried two wire names over time (`name` and `title`); the domain
//! knows it only as the title and leaves aliasing to inbound adapters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Error, FieldErrors, UserId};

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 255;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 1000;
/// Maximum URL length in characters.
pub const LINK_MAX: usize = 255;

/// Validation errors returned by project value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    /// Identifier was not a UUID.
    InvalidId,
    /// Title was missing or blank once trimmed.
    EmptyTitle,
    /// Title exceeded `max` characters.
    TitleTooLong { max: usize },
    /// Description exceeded `max` characters.
    DescriptionTooLong { max: usize },
    /// Link exceeded `max` characters.
    LinkTooLong { max: usize },
    /// Link was not an absolute http(s) URL.
    InvalidLink,
    /// Status was not `planned`, `current` or `finished`.
    UnknownStatus,
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "project id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "the title field is required"),
            Self::TitleTooLong { max } => {
                write!(f, "the title may not be greater than {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "the description may not be greater than {max} characters")
            }
            Self::LinkTooLong { max } => write!(f, "may not be greater than {max} characters"),
            Self::InvalidLink => write!(f, "must be a valid http or https URL"),
            Self::UnknownStatus => write!(
                f,
                "the selected status is invalid; expected one of planned, current, finished"
            ),
        }
    }
}

impl std::error::Error for ProjectValidationError {}

/// Stable project identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Parse a [`ProjectId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ProjectValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty project title of at most [`TITLE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTitle(String);

impl ProjectTitle {
    /// Trim and validate a title.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ProjectValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-text description of at most [`DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescription(String);

impl ProjectDescription {
    /// Validate a description. Callers treat blank input as absent.
    pub fn new(description: impl Into<String>) -> Result<Self, ProjectValidationError> {
        let description = description.into();
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ProjectValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(description))
    }
}

impl AsRef<str> for ProjectDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Absolute `http`/`https` URL of at most [`LINK_MAX`] characters.
///
/// The caller's spelling is preserved; parsing is only used to check shape.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::ProjectLink;
///
/// assert!(ProjectLink::new("https://github.com/ada/engine").is_ok());
/// assert!(ProjectLink::new("github.com/ada/engine").is_err());
/// assert!(ProjectLink::new("ftp://example.com/file").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLink(String);

impl ProjectLink {
    /// Trim and validate a link.
    pub fn new(link: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = link.as_ref().trim();
        if trimmed.chars().count() > LINK_MAX {
            return Err(ProjectValidationError::LinkTooLong { max: LINK_MAX });
        }
        let parsed = Url::parse(trimmed).map_err(|_| ProjectValidationError::InvalidLink)?;
        let web_scheme = matches!(parsed.scheme(), "http" | "https");
        if !web_scheme || parsed.host_str().is_none_or(str::is_empty) {
            return Err(ProjectValidationError::InvalidLink);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle stage of a project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Not started yet.
    #[default]
    Planned,
    /// Under active development.
    Current,
    /// Completed.
    Finished,
}

impl ProjectStatus {
    /// Wire and storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Current => "current",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ProjectValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "planned" => Ok(Self::Planned),
            "current" => Ok(Self::Current),
            "finished" => Ok(Self::Finished),
            _ => Err(ProjectValidationError::UnknownStatus),
        }
    }
}

/// Three-state field used by partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not supplied.
    #[default]
    Missing,
    /// The field was supplied as an explicit `null`.
    Null,
    /// The field was supplied with a value.
    Value(T),
}

impl<T> Patch<T> {
    /// Collapse to an optional value, treating `null` as absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

/// Raw project fields after wire aliasing, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInput {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub demo_link: Patch<String>,
    pub github_link: Patch<String>,
    pub image: Patch<String>,
    pub status: Patch<String>,
    /// Failures found while decoding the wire payload (wrong JSON types,
    /// conflicting aliases). Reported together with validation failures.
    pub rejected: FieldErrors,
}

/// Validated fields for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub demo_link: Option<ProjectLink>,
    pub github_link: Option<ProjectLink>,
    pub image: Option<ProjectLink>,
    pub status: ProjectStatus,
}

impl ProjectDraft {
    /// Validate a creation payload. Title and status are required; the
    /// remaining fields are checked only when present.
    pub fn validate(input: ProjectInput) -> Result<Self, Error> {
        let mut errors = input.rejected;
        let title = if errors.contains("title") {
            None
        } else {
            let raw_title = input.title.into_option().unwrap_or_default();
            errors.check("title", ProjectTitle::new(raw_title))
        };
        let status = match input.status.into_option() {
            _ if errors.contains("status") => None,
            Some(raw) => errors.check("status", raw.parse::<ProjectStatus>()),
            None => {
                errors.push("status", "the status field is required");
                None
            }
        };
        let description = optional_description(&mut errors, input.description).flatten();
        let demo_link = optional_link(&mut errors, "demo_link", input.demo_link).flatten();
        let github_link = optional_link(&mut errors, "github_link", input.github_link).flatten();
        let image = optional_link(&mut errors, "image", input.image).flatten();
        errors.into_result()?;

        match (title, status) {
            (Some(title), Some(status)) => Ok(Self {
                title,
                description,
                demo_link,
                github_link,
                image,
                status,
            }),
            _ => Err(Error::internal("project validation lost a required field")),
        }
    }
}

/// Validated partial update. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub title: Option<ProjectTitle>,
    pub description: Option<Option<ProjectDescription>>,
    pub demo_link: Option<Option<ProjectLink>>,
    pub github_link: Option<Option<ProjectLink>>,
    pub image: Option<Option<ProjectLink>>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// Validate the supplied subset of fields.
    pub fn validate(input: ProjectInput) -> Result<Self, Error> {
        let mut errors = input.rejected;
        let title = match input.title {
            Patch::Missing => None,
            Patch::Null => {
                errors.push("title", ProjectValidationError::EmptyTitle.to_string());
                None
            }
            Patch::Value(raw) => errors.check("title", ProjectTitle::new(raw)),
        };
        let status = match input.status {
            Patch::Missing => None,
            Patch::Null => {
                errors.push("status", "the status field may not be null");
                None
            }
            Patch::Value(raw) => errors.check("status", raw.parse::<ProjectStatus>()),
        };
        let description = optional_description(&mut errors, input.description);
        let demo_link = optional_link(&mut errors, "demo_link", input.demo_link);
        let github_link = optional_link(&mut errors, "github_link", input.github_link);
        let image = optional_link(&mut errors, "image", input.image);
        errors.into_result()?;

        Ok(Self {
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
        })
    }
}

/// Outer `None`: not supplied. `Some(None)`: supplied as null or blank.
fn optional_description(
    errors: &mut FieldErrors,
    field: Patch<String>,
) -> Option<Option<ProjectDescription>> {
    match field {
        Patch::Missing => None,
        Patch::Null => Some(None),
        Patch::Value(raw) if raw.trim().is_empty() => Some(None),
        Patch::Value(raw) => errors
            .check("description", ProjectDescription::new(raw))
            .map(Some),
    }
}

fn optional_link(
    errors: &mut FieldErrors,
    name: &str,
    field: Patch<String>,
) -> Option<Option<ProjectLink>> {
    match field {
        Patch::Missing => None,
        Patch::Null => Some(None),
        Patch::Value(raw) if raw.trim().is_empty() => Some(None),
        Patch::Value(raw) => match ProjectLink::new(raw) {
            Ok(link) => Some(Some(link)),
            Err(err) => {
                errors.push(name, format!("the {} {err}", name.replace('_', " ")));
                None
            }
        },
    }
}

/// Persisted project aggregate.
///
/// ## Invariants
/// - `owner` is fixed at creation; [`Project::apply`] never changes it.
/// - `title` is non-empty and `status` is one of the three known stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    title: ProjectTitle,
    description: Option<ProjectDescription>,
    demo_link: Option<ProjectLink>,
    github_link: Option<ProjectLink>,
    image: Option<ProjectLink>,
    status: ProjectStatus,
    owner: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Persistence-side view used to rehydrate a [`Project`].
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub demo_link: Option<ProjectLink>,
    pub github_link: Option<ProjectLink>,
    pub image: Option<ProjectLink>,
    pub status: ProjectStatus,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let ProjectRecord {
            id,
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
            owner,
            created_at,
            updated_at,
        } = record;
        Self {
            id,
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
            owner,
            created_at,
            updated_at,
        }
    }
}

impl Project {
    /// Create a new project owned by `owner`.
    #[must_use]
    pub fn create(id: ProjectId, draft: ProjectDraft, owner: UserId, now: DateTime<Utc>) -> Self {
        let ProjectDraft {
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
        } = draft;
        Self {
            id,
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated patch and refresh `updated_at`.
    #[must_use]
    pub fn apply(mut self, patch: ProjectPatch, now: DateTime<Utc>) -> Self {
        let ProjectPatch {
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(demo_link) = demo_link {
            self.demo_link = demo_link;
        }
        if let Some(github_link) = github_link {
            self.github_link = github_link;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = now;
        self
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn title(&self) -> &ProjectTitle {
        &self.title
    }

    pub fn description(&self) -> Option<&ProjectDescription> {
        self.description.as_ref()
    }

    pub fn demo_link(&self) -> Option<&ProjectLink> {
        self.demo_link.as_ref()
    }

    pub fn github_link(&self) -> Option<&ProjectLink> {
        self.github_link.as_ref()
    }

    pub fn image(&self) -> Option<&ProjectLink> {
        self.image.as_ref()
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Owning user.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests;
