// src/role.rs
// Classification of the local client as admin or guest. Evaluated once at
// startup and never re-checked. This is a UI convention, not a security
// boundary: the hub trusts all inbound events equally.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Guest,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Admin when explicitly flagged, or when talking to a server on the
/// operator's own machine.
pub fn classify(admin_flag: bool, host: &str) -> Role {
    if admin_flag || host == "localhost" || host == "127.0.0.1" {
        Role::Admin
    } else {
        Role::Guest
    }
}
