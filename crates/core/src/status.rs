//! Status enums for the text status columns.
//!
//! Each variant's string form matches the `CHECK` constraint on the
//! corresponding column (`projects.status`, `funds.status`,
//! `funds.payment_method`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the value stored in the database column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

define_status_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Completed = "completed",
    }
}

define_status_enum! {
    /// Donation (fund) payment status.
    FundStatus {
        Pending = "pending",
        Paid = "paid",
        Failed = "failed",
    }
}

define_status_enum! {
    /// How a donation was paid.
    PaymentMethodKind {
        Card = "card",
        Gcash = "gcash",
        Paymaya = "paymaya",
        GrabPay = "grab_pay",
        BankTransfer = "bank_transfer",
    }
}

impl ProjectStatus {
    /// Whether a project in this status may move to `next`.
    ///
    /// Admin moderation moves `pending` to `approved` or `rejected` and an
    /// approved project to `completed`. An owner edit moves a rejected
    /// project back to `pending` for another review.
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Rejected, Pending)
        )
    }

    /// Check a transition, returning a validation error when it is not allowed.
    pub fn ensure_transition(self, next: ProjectStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Cannot change project status from '{self}' to '{next}'"
            )))
        }
    }

    /// Whether projects in this status are visible to the public and accept
    /// comments and ratings.
    pub fn is_public(self) -> bool {
        matches!(self, ProjectStatus::Approved | ProjectStatus::Completed)
    }

    /// Whether the project accepts new donations.
    pub fn accepts_donations(self) -> bool {
        self == ProjectStatus::Approved
    }

    /// Whether the owner may still edit the proposal.
    pub fn is_editable(self) -> bool {
        matches!(self, ProjectStatus::Pending | ProjectStatus::Rejected)
    }
}

impl FundStatus {
    /// Only pending funds settle; `paid` and `failed` are terminal.
    pub fn can_transition_to(self, next: FundStatus) -> bool {
        matches!(
            (self, next),
            (FundStatus::Pending, FundStatus::Paid) | (FundStatus::Pending, FundStatus::Failed)
        )
    }

    /// Check a transition, returning a conflict error when the fund has
    /// already settled.
    pub fn ensure_transition(self, next: FundStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Donation is already '{self}' and cannot become '{next}'"
            )))
        }
    }
}

impl PaymentMethodKind {
    /// E-wallets authorize through a redirect to the wallet provider.
    pub fn is_ewallet(self) -> bool {
        matches!(
            self,
            PaymentMethodKind::Gcash | PaymentMethodKind::Paymaya | PaymentMethodKind::GrabPay
        )
    }

    /// Methods processed through the payment gateway (everything except a
    /// manual bank transfer).
    pub fn is_online(self) -> bool {
        self != PaymentMethodKind::BankTransfer
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn project_status_round_trips_through_str() {
        for status in ProjectStatus::ALL {
            let parsed: ProjectStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert_matches!(
            "archived".parse::<ProjectStatus>(),
            Err(CoreError::Validation(_))
        );
        assert_matches!("refunded".parse::<FundStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn pending_project_can_be_approved_or_rejected() {
        assert!(ProjectStatus::Pending.can_transition_to(ProjectStatus::Approved));
        assert!(ProjectStatus::Pending.can_transition_to(ProjectStatus::Rejected));
        assert!(!ProjectStatus::Pending.can_transition_to(ProjectStatus::Completed));
    }

    #[test]
    fn only_approved_projects_complete() {
        assert!(ProjectStatus::Approved.can_transition_to(ProjectStatus::Completed));
        assert!(!ProjectStatus::Rejected.can_transition_to(ProjectStatus::Completed));
        assert!(ProjectStatus::Completed.ensure_transition(ProjectStatus::Approved).is_err());
    }

    #[test]
    fn rejected_project_can_be_resubmitted() {
        assert!(ProjectStatus::Rejected.can_transition_to(ProjectStatus::Pending));
        assert!(!ProjectStatus::Approved.can_transition_to(ProjectStatus::Pending));
    }

    #[test]
    fn public_visibility() {
        assert!(ProjectStatus::Approved.is_public());
        assert!(ProjectStatus::Completed.is_public());
        assert!(!ProjectStatus::Pending.is_public());
        assert!(!ProjectStatus::Rejected.is_public());
        assert!(!ProjectStatus::Completed.accepts_donations());
    }

    #[test]
    fn settled_funds_are_terminal() {
        assert!(FundStatus::Pending.can_transition_to(FundStatus::Paid));
        assert!(FundStatus::Pending.can_transition_to(FundStatus::Failed));
        assert_matches!(
            FundStatus::Paid.ensure_transition(FundStatus::Failed),
            Err(CoreError::Conflict(_))
        );
        assert!(!FundStatus::Failed.can_transition_to(FundStatus::Pending));
    }

    #[test]
    fn payment_method_classification() {
        assert!(PaymentMethodKind::Gcash.is_ewallet());
        assert!(!PaymentMethodKind::Card.is_ewallet());
        assert!(PaymentMethodKind::Card.is_online());
        assert!(!PaymentMethodKind::BankTransfer.is_online());
        assert_eq!(PaymentMethodKind::GrabPay.as_str(), "grab_pay");
    }
}
