use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::chat::models::{ParticipantRole, SenderType};

/// Roles issued by the session service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    MunicipalReviewer,
    TechnicalStaff,
    ExternalMaintainer,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::MunicipalReviewer => "municipal_reviewer",
            Role::TechnicalStaff => "technical_staff",
            Role::ExternalMaintainer => "external_maintainer",
            Role::Administrator => "administrator",
        }
    }

    /// Every non-citizen actor is an operator
    pub fn is_operator(&self) -> bool {
        !matches!(self, Role::Citizen)
    }

    pub fn participant_role(&self) -> ParticipantRole {
        if self.is_operator() {
            ParticipantRole::Operator
        } else {
            ParticipantRole::Citizen
        }
    }

    pub fn sender_type(&self) -> SenderType {
        match self.participant_role() {
            ParticipantRole::Citizen => SenderType::Citizen,
            ParticipantRole::Operator => SenderType::Operator,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "municipal_reviewer" => Ok(Role::MunicipalReviewer),
            "technical_staff" => Ok(Role::TechnicalStaff),
            "external_maintainer" => Ok(Role::ExternalMaintainer),
            "administrator" => Ok(Role::Administrator),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Principal resolved by the transport layer and passed into every core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_citizen(&self) -> bool {
        self.has_role(Role::Citizen)
    }

    pub fn is_operator(&self) -> bool {
        self.role.is_operator()
    }

    /// Reviewers and administrators see every report
    pub fn has_oversight_access(&self) -> bool {
        self.has_any_role(&[Role::MunicipalReviewer, Role::Administrator])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_claim_string() {
        for role in [
            Role::Citizen,
            Role::MunicipalReviewer,
            Role::TechnicalStaff,
            Role::ExternalMaintainer,
            Role::Administrator,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("mayor".parse::<Role>().is_err());
    }

    #[test]
    fn test_participant_role_collapses_operators() {
        assert_eq!(Role::Citizen.participant_role(), ParticipantRole::Citizen);
        assert_eq!(
            Role::ExternalMaintainer.participant_role(),
            ParticipantRole::Operator
        );
        assert_eq!(Role::Administrator.sender_type(), SenderType::Operator);
        assert_eq!(Role::Citizen.sender_type(), SenderType::Citizen);
    }
}
