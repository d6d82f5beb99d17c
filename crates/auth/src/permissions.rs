use serde::{Deserialize, Serialize};

use carehub_core::EntityKind;

use crate::Role;

/// An authorization-gated operation.
///
/// Operations are a closed set; the role mapping lives in
/// [`Operation::allowed_roles`] and is an exhaustive `match`, so adding an
/// operation without deciding who may perform it does not compile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "patients.create")]
    PatientsCreate,
    #[serde(rename = "patients.read")]
    PatientsRead,
    #[serde(rename = "appointments.create")]
    AppointmentsCreate,
    #[serde(rename = "appointments.read")]
    AppointmentsRead,
    #[serde(rename = "prescriptions.create")]
    PrescriptionsCreate,
    #[serde(rename = "prescriptions.read")]
    PrescriptionsRead,
    #[serde(rename = "users.manage")]
    UsersManage,
    #[serde(rename = "users.read")]
    UsersRead,
    #[serde(rename = "hospital.read")]
    HospitalRead,
    #[serde(rename = "rbac.read")]
    RbacRead,
}

const CLINICAL_STAFF: &[Role] = &[Role::Admin, Role::Doctor, Role::Nurse, Role::Receptionist];
const PRESCRIBERS: &[Role] = &[Role::Admin, Role::Doctor];
const DISPENSERS: &[Role] = &[Role::Admin, Role::Doctor, Role::Pharmacist];
const ADMINS: &[Role] = &[Role::Admin];
const EVERYONE: &[Role] = &Role::ALL;

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::PatientsCreate,
        Operation::PatientsRead,
        Operation::AppointmentsCreate,
        Operation::AppointmentsRead,
        Operation::PrescriptionsCreate,
        Operation::PrescriptionsRead,
        Operation::UsersManage,
        Operation::UsersRead,
        Operation::HospitalRead,
        Operation::RbacRead,
    ];

    /// Roles permitted to perform this operation.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::PatientsCreate | Operation::PatientsRead => CLINICAL_STAFF,
            Operation::AppointmentsCreate | Operation::AppointmentsRead => CLINICAL_STAFF,
            Operation::PrescriptionsCreate => PRESCRIBERS,
            Operation::PrescriptionsRead => DISPENSERS,
            Operation::UsersManage | Operation::UsersRead => ADMINS,
            Operation::HospitalRead | Operation::RbacRead => EVERYONE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::PatientsCreate => "patients.create",
            Operation::PatientsRead => "patients.read",
            Operation::AppointmentsCreate => "appointments.create",
            Operation::AppointmentsRead => "appointments.read",
            Operation::PrescriptionsCreate => "prescriptions.create",
            Operation::PrescriptionsRead => "prescriptions.read",
            Operation::UsersManage => "users.manage",
            Operation::UsersRead => "users.read",
            Operation::HospitalRead => "hospital.read",
            Operation::RbacRead => "rbac.read",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Operation gating creation of a record of `kind`.
    pub fn create(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Patient => Operation::PatientsCreate,
            EntityKind::Appointment => Operation::AppointmentsCreate,
            EntityKind::Prescription => Operation::PrescriptionsCreate,
        }
    }

    /// Operation gating reads of records of `kind`.
    pub fn read(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Patient => Operation::PatientsRead,
            EntityKind::Appointment => Operation::AppointmentsRead,
            EntityKind::Prescription => Operation::PrescriptionsRead,
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
