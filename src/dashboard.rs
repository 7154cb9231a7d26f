//! Role-based view selection for the dashboard and results pages.
//!
//! Every decision here is an exhaustive `match` on [`Role`], so adding a
//! role is a compile error until each view says what it shows.

use crate::session::{Role, Session};

pub const UNRECOGNIZED_ROLE_TITLE: &str = "Rôle non reconnu";

/// What the dashboard page renders for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    User,
    Admin { super_admin: bool },
    /// Fallback panel; carries the code so it can be shown to the user.
    UnrecognizedRole { code: String },
    SignedOut,
}

impl DashboardView {
    #[must_use]
    pub fn for_role(role: &Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Admin => Self::Admin { super_admin: false },
            Role::SuperAdmin => Self::Admin { super_admin: true },
            Role::Unknown(code) => Self::UnrecognizedRole { code: code.clone() },
        }
    }

    /// Name of the content component this view mounts.
    #[must_use]
    pub fn component_name(&self) -> &'static str {
        match self {
            Self::User => "UserDashboardContent",
            Self::Admin { .. } => "AdminDashboardContent",
            Self::UnrecognizedRole { .. } => UNRECOGNIZED_ROLE_TITLE,
            Self::SignedOut => "LoginRedirect",
        }
    }
}

/// Dashboard for `session`. Expired and anonymous sessions both sign out.
#[must_use]
pub fn dashboard_for(session: &Session) -> DashboardView {
    match (&session.user, session.is_authenticated && !session.session_expired) {
        (Some(user), true) => DashboardView::for_role(&user.role()),
        _ => DashboardView::SignedOut,
    }
}

/// Results page: admins publish, everyone else sees the consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsPanel {
    PublishControls,
    Consolidation,
}

#[must_use]
pub fn results_panel(role: &Role) -> ResultsPanel {
    match role {
        Role::Admin | Role::SuperAdmin => ResultsPanel::PublishControls,
        Role::User | Role::Unknown(_) => ResultsPanel::Consolidation,
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
