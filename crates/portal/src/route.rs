//! Landing routes and post-login destination.

use api::{Api, ApiError, AuthContext, Transport};
use serde_json::Value;
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use crate::role::{GroupType, Role, normalize_group_type, resolve_role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    Login,
    AdminDashboard,
    CoordinatorDashboard,
    TreasurerDashboard,
    JoinGroup,
    SectionDashboard,
    ThesisDashboard,
    /// Default student landing page, also used whenever the group lookup
    /// cannot tell where the student belongs.
    StudentHome,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::AdminDashboard => "/admin/dashboard",
            Route::CoordinatorDashboard => "/finance-coordinator/dashboard",
            Route::TreasurerDashboard => "/treasurer/dashboard",
            Route::JoinGroup => "/student/join-group",
            Route::SectionDashboard => "/student/section",
            Route::ThesisDashboard => "/student/thesis",
            Route::StudentHome => "/student/dashboard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupContext {
    pub id: Option<String>,
    pub name: Option<String>,
    pub group_type: Option<GroupType>,
}

/// What the group lookup said about the current student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLookup {
    Member(GroupContext),
    NoGroup,
    /// Lookup failed or was not attempted.
    Unavailable,
}

fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whether a message means "this student has no group".
pub fn signals_no_group(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("no group") || lower.contains("not in a group") || lower.contains("not assigned")
}

/// Read a group-lookup answer. Accepts the group at `data.group`, `group`
/// or `data`; a null group or `hasGroup: false` means no group.
pub fn parse_group_lookup(body: &Value) -> GroupLookup {
    let data = api::envelope::data(body);
    if data.get("hasGroup").and_then(Value::as_bool) == Some(false) {
        return GroupLookup::NoGroup;
    }

    let group = [data.get("group"), body.get("group")]
        .into_iter()
        .flatten()
        .next()
        .or(Some(data).filter(|d| d.is_object() && d.get("hasGroup").is_none()));

    let Some(group) = group.filter(|g| g.is_object()) else {
        return GroupLookup::NoGroup;
    };

    let id = ["id", "_id", "groupId", "group_id"]
        .iter()
        .find_map(|k| text(group.get(*k)));
    let name = ["name", "groupName", "group_name"]
        .iter()
        .find_map(|k| text(group.get(*k)));
    let group_type = ["type", "groupType", "group_type"]
        .iter()
        .find_map(|k| text(group.get(*k)))
        .and_then(|raw| normalize_group_type(&raw));

    if id.is_none() && name.is_none() && group_type.is_none() {
        return GroupLookup::NoGroup;
    }
    GroupLookup::Member(GroupContext {
        id,
        name,
        group_type,
    })
}

/// Destination for an authenticated user. Staff roles ignore the group.
pub fn resolve_destination(role: Role, group: &GroupLookup) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::FinanceCoordinator => Route::CoordinatorDashboard,
        Role::Treasurer => Route::TreasurerDashboard,
        Role::Student => match group {
            GroupLookup::NoGroup => Route::JoinGroup,
            GroupLookup::Member(ctx) => match ctx.group_type {
                Some(GroupType::Section) => Route::SectionDashboard,
                Some(GroupType::Thesis) => Route::ThesisDashboard,
                None => Route::StudentHome,
            },
            GroupLookup::Unavailable => Route::StudentHome,
        },
    }
}

/// Look the student's group up. Never fails: errors become `Unavailable`.
pub async fn lookup_group<T: Transport>(api: &Api<T>, auth: &AuthContext) -> GroupLookup {
    match api.my_group(auth).await {
        Ok(body) => parse_group_lookup(&body),
        Err(ApiError::Status { status: 404, .. }) => GroupLookup::NoGroup,
        Err(ApiError::Rejected { ref message, .. }) if signals_no_group(message) => {
            GroupLookup::NoGroup
        }
        Err(e) => {
            warn!(error = %e, "group lookup failed, using default landing route");
            GroupLookup::Unavailable
        }
    }
}

/// Post-login routing; only students need the extra group lookup.
pub async fn route_after_login<T: Transport>(
    api: &Api<T>,
    auth: &AuthContext,
    role: Role,
) -> Route {
    let group = if role == Role::Student {
        lookup_group(api, auth).await
    } else {
        GroupLookup::Unavailable
    };
    let route = resolve_destination(role, &group);
    debug!(%role, %route, "resolved landing route");
    route
}

/// Landing route for a restored session. Without a token, or when the
/// server refuses it, that is the login page.
pub async fn resume_session<T: Transport>(api: &Api<T>, auth: &AuthContext) -> Route {
    if !auth.is_authenticated() {
        return Route::Login;
    }
    match api.dashboard(auth).await {
        Ok(body) => route_after_login(api, auth, resolve_role(&body)).await,
        Err(e) if e.status() == Some(401) => Route::Login,
        Err(e) => {
            warn!(error = %e, "dashboard unavailable, using default landing route");
            Route::StudentHome
        }
    }
}
