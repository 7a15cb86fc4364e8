use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Route of the login page; also the redirect target after a 401.
pub const LOGIN_ROUTE: &str = "/login";

/// Landing page for any role the client does not recognize.
pub const DEFAULT_ROUTE: &str = "/dashboard";

/// Closed set of job functions known to the client.
///
/// The backend sends these as strings; anything outside this set still gets
/// a landing route (the default), it just loses its dedicated dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TechnicalDirector,
    ProjectManager,
    Procurement,
    SiteSupervisor,
    MepSupervisor,
    Estimation,
    Accounts,
    Design,
}

pub const ALL_ROLES: [Role; 8] = [
    Role::TechnicalDirector,
    Role::ProjectManager,
    Role::Procurement,
    Role::SiteSupervisor,
    Role::MepSupervisor,
    Role::Estimation,
    Role::Accounts,
    Role::Design,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::TechnicalDirector => "technical_director",
            Role::ProjectManager => "project_manager",
            Role::Procurement => "procurement",
            Role::SiteSupervisor => "site_supervisor",
            Role::MepSupervisor => "mep_supervisor",
            Role::Estimation => "estimation",
            Role::Accounts => "accounts",
            Role::Design => "design",
        }
    }

    /// Default landing page shown immediately after login.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::TechnicalDirector => "/dashboard/technical-director",
            Role::ProjectManager => "/dashboard/project-manager",
            Role::Procurement => "/dashboard/procurement",
            Role::SiteSupervisor => "/dashboard/site-supervisor",
            Role::MepSupervisor => "/dashboard/mep-supervisor",
            Role::Estimation => "/dashboard/estimation",
            Role::Accounts => "/dashboard/accounts",
            Role::Design => "/dashboard/design",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts the backend's snake_case identifiers and the camelCase
    /// spellings the web client historically used.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical_director" | "technicalDirector" => Ok(Role::TechnicalDirector),
            "project_manager" | "projectManager" => Ok(Role::ProjectManager),
            "procurement" => Ok(Role::Procurement),
            "site_supervisor" | "siteSupervisor" => Ok(Role::SiteSupervisor),
            "mep_supervisor" | "mepSupervisor" => Ok(Role::MepSupervisor),
            "estimation" => Ok(Role::Estimation),
            "accounts" => Ok(Role::Accounts),
            "design" => Ok(Role::Design),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Total mapping from an arbitrary role string to a landing route.
/// Unknown roles fall back to [`DEFAULT_ROUTE`]; this never fails.
pub fn landing_route(role: &str) -> &'static str {
    role.parse::<Role>()
        .map(|r| r.landing_route())
        .unwrap_or(DEFAULT_ROUTE)
}
