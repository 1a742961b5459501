//! Role and authorization model for role exporting.
//!
//! A role manifest describes a set of roles (named workloads with scaling bounds, affinity and
//! exposed ports) and an authorization section:
//!
//! - Each `AuthRole` and cluster role is a list of RBAC rules.
//! - Each `AuthAccount` binds roles and cluster roles. Rules granting `use` on
//!   `podsecuritypolicies` link the account to named privilege policies.
//! - Privilege policies are abstract privilege levels. Two of them, `nonprivileged` and
//!   `privileged`, are always known; manifests may declare more.
//!
//! ```text
//! [ Role ] -> [ AuthAccount ] -> [ AuthRole ] -> [ AuthRule ] -> [ PrivilegePolicy ]
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod privilege;
pub mod role;
mod usage;

pub use self::{
    auth::{AuthAccount, AuthRole, AuthRule, Authorization, Configuration},
    privilege::PrivilegePolicy,
    role::{ExposedPort, Role, Run, Scaling},
    usage::UsageCounts,
};
