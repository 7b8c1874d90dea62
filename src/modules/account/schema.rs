#![allow(dead_code)]
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "actor_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

/// An authenticated caller. Resolved from a verified credential by the
/// access service; everything past the auth boundary works with this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccountStatus {
    pub display_name: String,
    pub suspended: bool,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAvailability {
    pub online_consult_enabled: bool,
    pub is_online_now: bool,
    pub online_consult_fee: i64,
    pub average_consult_duration: i32,
}

/// Partial update of the doctor's consult availability. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub online_consult_enabled: Option<bool>,
    pub is_online_now: Option<bool>,
    #[validate(range(min = 0))]
    pub online_consult_fee: Option<i64>,
}

/// Both parties of an appointment, as reported by the booking collaborator.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct AppointmentParticipants {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

impl AppointmentParticipants {
    pub fn side_of(&self, principal: &Principal) -> Option<Role> {
        match principal.role {
            Role::Patient if self.patient_id == principal.id => Some(Role::Patient),
            Role::Doctor if self.doctor_id == principal.id => Some(Role::Doctor),
            _ => None,
        }
    }

    pub fn counterpart(&self, principal: &Principal) -> Option<Principal> {
        match self.side_of(principal)? {
            Role::Patient => Some(Principal { id: self.doctor_id, role: Role::Doctor }),
            Role::Doctor => Some(Principal { id: self.patient_id, role: Role::Patient }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants() -> AppointmentParticipants {
        AppointmentParticipants { patient_id: Uuid::now_v7(), doctor_id: Uuid::now_v7() }
    }

    #[test]
    fn patient_side_resolves() {
        let p = participants();
        let principal = Principal { id: p.patient_id, role: Role::Patient };
        assert_eq!(p.side_of(&principal), Some(Role::Patient));
        assert_eq!(p.counterpart(&principal).unwrap().id, p.doctor_id);
    }

    #[test]
    fn matching_id_with_wrong_role_is_not_a_participant() {
        let p = participants();
        // Same id as the patient but presented as a doctor credential.
        let principal = Principal { id: p.patient_id, role: Role::Doctor };
        assert_eq!(p.side_of(&principal), None);
        assert!(p.counterpart(&principal).is_none());
    }

    #[test]
    fn stranger_is_not_a_participant() {
        let p = participants();
        let principal = Principal { id: Uuid::now_v7(), role: Role::Doctor };
        assert_eq!(p.side_of(&principal), None);
    }
}
