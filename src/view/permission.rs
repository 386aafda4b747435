// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capability gating for view and editing operations.
//!
//! The owning context decides which operations are currently allowed (for
//! instance, editing is withdrawn while the user only navigates frames) and
//! hands the set to the mapper and the editor.

/// A single capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Scale,
    Pan,
    Edit,
    All,
}

/// The capabilities granted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: Vec<Permission>,
}

impl PermissionSet {
    /// No capabilities at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every capability.
    pub fn all() -> Self {
        Self::from_slice(&[Permission::All])
    }

    pub fn from_slice(permissions: &[Permission]) -> Self {
        let mut set = Self::none();
        for &permission in permissions {
            set.grant(permission);
        }
        set
    }

    pub fn grant(&mut self, permission: Permission) {
        if !self.granted.contains(&permission) {
            self.granted.push(permission);
        }
    }

    pub fn revoke(&mut self, permission: Permission) {
        self.granted.retain(|p| *p != permission);
    }

    /// True when `permission` or `All` has been granted.
    pub fn allows(&self, permission: Permission) -> bool {
        self.granted
            .iter()
            .any(|p| *p == permission || *p == Permission::All)
    }
}
