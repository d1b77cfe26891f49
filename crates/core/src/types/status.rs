//! Status enums and the service request lifecycle.
//!
//! Wire values match the backend columns exactly ("In Progress" keeps its
//! space), so every rename lives here as a declared serde attribute rather
//! than being inferred at the decode site.

use serde::{Deserialize, Serialize};

/// Role of a registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Submits service requests for their vehicles.
    Client,
    /// Triages and completes service requests.
    Mechanic,
    /// Views aggregate reporting across the shop.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Mechanic => write!(f, "mechanic"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "mechanic" => Ok(Self::Mechanic),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Lifecycle status of a service request.
///
/// Transitions are restricted to the edges in [`RequestStatus::transition`]:
/// Pending can be accepted or rejected, an accepted request can be completed,
/// and any request that has not reached a terminal state can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

/// An action that moves a service request through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    /// A mechanic takes the request on.
    Accept,
    /// A mechanic declines the request.
    Reject,
    /// Work is done; triggers payment creation.
    Complete,
    /// External cancellation, possible from any non-terminal state.
    Cancel,
}

impl RequestStatus {
    /// Whether the request has reached the end of its lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Whether the request still counts toward the shop's active workload.
    ///
    /// Rejected requests are deliberately counted as active until cancelled;
    /// this matches the dashboard's definition of the figure.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The display label, identical to the wire value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Apply a lifecycle action, returning the resulting status.
    ///
    /// Returns `None` when the action is not legal from the current status,
    /// e.g. completing a request that is still Pending.
    #[must_use]
    pub fn transition(self, action: RequestAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, RequestAction::Accept) => Some(Self::InProgress),
            (Self::Pending, RequestAction::Reject) => Some(Self::Rejected),
            (Self::InProgress, RequestAction::Complete) => Some(Self::Completed),
            (current, RequestAction::Cancel) if !current.is_terminal() => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Rejected" => Ok(Self::Rejected),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid request status: {s}")),
        }
    }
}

impl std::fmt::Display for RequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            RequestStatus::Pending.transition(RequestAction::Accept),
            Some(RequestStatus::InProgress)
        );
        assert_eq!(
            RequestStatus::Pending.transition(RequestAction::Reject),
            Some(RequestStatus::Rejected)
        );
        assert_eq!(RequestStatus::Pending.transition(RequestAction::Complete), None);
    }

    #[test]
    fn test_complete_requires_in_progress() {
        assert_eq!(
            RequestStatus::InProgress.transition(RequestAction::Complete),
            Some(RequestStatus::Completed)
        );
        assert_eq!(RequestStatus::Completed.transition(RequestAction::Complete), None);
        assert_eq!(RequestStatus::Rejected.transition(RequestAction::Complete), None);
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        assert_eq!(
            RequestStatus::Pending.transition(RequestAction::Cancel),
            Some(RequestStatus::Cancelled)
        );
        assert_eq!(
            RequestStatus::InProgress.transition(RequestAction::Cancel),
            Some(RequestStatus::Cancelled)
        );
        assert_eq!(RequestStatus::Completed.transition(RequestAction::Cancel), None);
        assert_eq!(RequestStatus::Cancelled.transition(RequestAction::Cancel), None);
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for action in [RequestAction::Accept, RequestAction::Reject, RequestAction::Complete] {
            assert_eq!(RequestStatus::Completed.transition(action), None);
            assert_eq!(RequestStatus::Cancelled.transition(action), None);
        }
    }

    #[test]
    fn test_active_excludes_completed_and_cancelled() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::InProgress.is_active());
        assert!(RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Completed.is_active());
        assert!(!RequestStatus::Cancelled.is_active());
    }

    #[test]
    fn test_wire_value_keeps_space() {
        let json = serde_json::to_string(&RequestStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"In Progress\"");

        let back: RequestStatus = serde_json::from_str("\"In Progress\"").expect("deserialize");
        assert_eq!(back, RequestStatus::InProgress);
    }

    #[test]
    fn test_status_from_str_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<RequestStatus>(), Ok(status));
        }
        assert!("On Hold".parse::<RequestStatus>().is_err());
    }
}
