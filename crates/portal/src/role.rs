//! Role and group-type normalization.
//!
//! Both arrive as free-form backend strings. They are lower-cased, synonyms
//! are folded, and anything unrecognized falls back to the least privileged
//! value instead of failing.

use serde_json::Value;
use strum::{Display, EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    FinanceCoordinator,
    Treasurer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GroupType {
    Section,
    Thesis,
}

/// Where in a payload a role string was found, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    TopLevel,
    User,
    DataUser,
    Data,
}

impl RoleSource {
    pub const PRIORITY: [RoleSource; 4] = [
        RoleSource::TopLevel,
        RoleSource::User,
        RoleSource::DataUser,
        RoleSource::Data,
    ];

    pub fn pointer(&self) -> &'static str {
        match self {
            RoleSource::TopLevel => "/role",
            RoleSource::User => "/user/role",
            RoleSource::DataUser => "/data/user/role",
            RoleSource::Data => "/data/role",
        }
    }
}

fn canonical(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Map a raw role string to a role; `None` when unrecognized.
pub fn normalize_role(raw: &str) -> Option<Role> {
    match canonical(raw).as_str() {
        "student" | "students" => Some(Role::Student),
        "finance_coordinator" | "financecoordinator" | "fc" | "coordinator"
        | "finance" => Some(Role::FinanceCoordinator),
        "treasurer" => Some(Role::Treasurer),
        "admin" | "administrator" => Some(Role::Admin),
        _ => None,
    }
}

/// First non-empty role string, following [`RoleSource::PRIORITY`].
pub fn extract_role(payload: &Value) -> Option<(RoleSource, &str)> {
    RoleSource::PRIORITY.iter().find_map(|source| {
        payload
            .pointer(source.pointer())
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| (*source, s))
    })
}

/// Total: every payload yields exactly one role, `Student` when nothing
/// usable is present.
pub fn resolve_role(payload: &Value) -> Role {
    match extract_role(payload) {
        Some((source, raw)) => normalize_role(raw).unwrap_or_else(|| {
            tracing::warn!(?source, role = raw, "unrecognized role, defaulting to student");
            Role::Student
        }),
        None => Role::Student,
    }
}

pub fn normalize_group_type(raw: &str) -> Option<GroupType> {
    match canonical(raw).as_str() {
        "section" | "sections" | "section_group" => Some(GroupType::Section),
        "thesis" | "thesis_group" | "research" => Some(GroupType::Thesis),
        _ => None,
    }
}
