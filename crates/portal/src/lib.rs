//! Student contributions portal: page forms, role-based landing routes and
//! the payable-week board, on top of the `forms` and `api` crates.

pub mod config;
pub mod effects;
mod error;
pub mod flows;
pub mod role;
pub mod route;
pub mod weeks;

pub use config::Config;
pub use effects::{Effect, Effects, Notice, NoticeLevel};
pub use error::{PortalError, Result};
pub use role::{GroupType, Role, resolve_role};
pub use route::{GroupContext, GroupLookup, Route, resolve_destination, route_after_login};
pub use weeks::{PayableWeek, WeekBoard, WeekStatus, WeeksView};

/// Application identity used for directories, settings and logs.
pub struct Portal;

impl app::Application for Portal {
    const APP_ID: &'static str = "portal";
}
