//! Pages, dashboard tabs and who may open them.
//!
//! Access failures never surface as errors: the caller is redirected to
//! the login page or to the home page of their own role.

use std::fmt;

use crate::models::{Role, UserProfile};

/// Tabs of the host dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostTab {
    #[default]
    Calendar,
    Tasks,
    Apartments,
    Cleaners,
    Settings,
}

impl HostTab {
    pub const ALL: [HostTab; 5] = [
        HostTab::Calendar,
        HostTab::Tasks,
        HostTab::Apartments,
        HostTab::Cleaners,
        HostTab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HostTab::Calendar => "Calendar",
            HostTab::Tasks => "Tasks",
            HostTab::Apartments => "Apartments",
            HostTab::Cleaners => "Cleaners",
            HostTab::Settings => "Settings",
        }
    }
}

/// Tabs of the cleaner dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CleanerTab {
    #[default]
    Tasks,
    Calendar,
    Availability,
}

impl CleanerTab {
    pub const ALL: [CleanerTab; 3] = [CleanerTab::Tasks, CleanerTab::Calendar, CleanerTab::Availability];

    pub fn label(&self) -> &'static str {
        match self {
            CleanerTab::Tasks => "My tasks",
            CleanerTab::Calendar => "Calendar",
            CleanerTab::Availability => "Availability",
        }
    }
}

/// Every routed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Login,
    /// Target of invitation and password-reset links
    SetPassword,
    HostDashboard(HostTab),
    CleanerDashboard(CleanerTab),
}

impl Page {
    /// Landing page of a role
    pub fn home(role: Role) -> Self {
        match role {
            Role::Host => Page::HostDashboard(HostTab::default()),
            Role::Cleaner => Page::CleanerDashboard(CleanerTab::default()),
        }
    }

    /// Role required to open the page, if any
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Landing | Page::Login | Page::SetPassword => None,
            Page::HostDashboard(_) => Some(Role::Host),
            Page::CleanerDashboard(_) => Some(Role::Cleaner),
        }
    }

    /// URL path of the page
    pub fn path(&self) -> String {
        match self {
            Page::Landing => "/".to_string(),
            Page::Login => "/login".to_string(),
            Page::SetPassword => "/set-password".to_string(),
            Page::HostDashboard(tab) => format!("/host/{}", tab.label().to_lowercase()),
            Page::CleanerDashboard(tab) => {
                format!("/cleaner/{}", tab.label().to_lowercase().replace(' ', "-"))
            }
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of opening a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Page),
}

/// Decide whether `profile` may open `page`
pub fn guard(page: Page, profile: Option<&UserProfile>) -> Access {
    match (page.required_role(), profile) {
        // a signed-in user has nothing to do on the login page
        (None, Some(profile)) if page == Page::Login => Access::Redirect(Page::home(profile.role)),
        (None, _) => Access::Allow,
        (Some(_), None) => Access::Redirect(Page::Login),
        (Some(required), Some(profile)) if profile.role == required => Access::Allow,
        (Some(_), Some(profile)) => Access::Redirect(Page::home(profile.role)),
    }
}
