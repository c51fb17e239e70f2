//! Identifiers carried between steps
//!
//! Later steps depend on resources created by earlier ones. The context maps
//! each resource role to the identifier the service returned, and remembers
//! whether this run created the resource or merely adopted an existing one.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Logical role of a remote resource within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Workspace,
    Segment,
    CultureProfile,
    EconomicProfile,
    Persona,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Workspace => "workspace",
            Role::Segment => "segment",
            Role::CultureProfile => "culture profile",
            Role::EconomicProfile => "economic profile",
            Role::Persona => "persona",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable identifier bag for one run
#[derive(Debug, Default)]
pub struct RunContext {
    ids: HashMap<Role, String>,
    created: HashSet<Role>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an identifier for a resource this run did not create
    pub fn set(&mut self, role: Role, id: impl Into<String>) {
        self.ids.insert(role, id.into());
        self.created.remove(&role);
    }

    /// Store an identifier for a resource this run created and must delete
    pub fn set_created(&mut self, role: Role, id: impl Into<String>) {
        self.ids.insert(role, id.into());
        self.created.insert(role);
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        self.ids.get(&role).map(String::as_str)
    }

    pub fn is_created(&self, role: Role) -> bool {
        self.created.contains(&role)
    }

    /// Forget a resource, after its remote deletion
    pub fn remove(&mut self, role: Role) -> Option<String> {
        self.created.remove(&role);
        self.ids.remove(&role)
    }
}
