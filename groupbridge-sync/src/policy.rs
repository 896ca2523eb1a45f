//! Sync policy: which directions, roles and group-level aspects propagate.
//!
//! Every decision goes through [`PolicyGate::allowed`], which takes a fresh
//! [`SyncPolicy`] snapshot from the settings reader on each call. Anything
//! missing or unrecognised in the settings evaluates to "not allowed".

use crate::collaborator::SettingsReader;
use groupbridge_types::{Direction, Role, RoleSyncMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Dotted settings keys read by the policy.
pub mod keys {
    use groupbridge_types::Role;

    /// Master switch for the integration.
    pub const ENABLED: &str = "buddypress.enabled";
    /// Allows course-side changes to flow back into social groups.
    pub const REVERSE_ENABLED: &str = "learndash.enabled";
    pub const AUTO_SYNC_ON_CREATE: &str = "buddypress.default_auto_sync";
    pub const DELETE_COUNTERPART_ON_DELETE: &str = "buddypress.delete_ld_on_delete";
    /// Counterpart creation happens at a dedicated wizard step.
    pub const DEFER_DURING_WIZARD: &str = "buddypress.show_in_bp_create";

    /// Key holding the sync mode of `role`.
    pub fn role_sync_mode(role: Role) -> String {
        format!("buddypress.default_{}_sync_to", role.settings_name())
    }
}

/// A group-level aspect of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aspect {
    Enabled,
    AutoSyncOnCreate,
    DeleteOnDelete,
    DeferredDuringWizard,
}

impl Aspect {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Aspect::Enabled => "enabled",
            Aspect::AutoSyncOnCreate => "autoSyncOnCreate",
            Aspect::DeleteOnDelete => "deleteOnDelete",
            Aspect::DeferredDuringWizard => "deferredDuringWizard",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(Aspect::Enabled),
            "autoSyncOnCreate" => Ok(Aspect::AutoSyncOnCreate),
            "deleteOnDelete" => Ok(Aspect::DeleteOnDelete),
            "deferredDuringWizard" => Ok(Aspect::DeferredDuringWizard),
            other => Err(format!("unknown policy aspect: {other}")),
        }
    }
}

/// Read-only snapshot of the settings that drive sync decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub enabled: bool,
    pub reverse_enabled: bool,
    pub auto_sync_on_create: bool,
    pub delete_counterpart_on_delete: bool,
    pub defer_during_creation_wizard: bool,
    pub admin: RoleSyncMode,
    pub moderator: RoleSyncMode,
    pub member: RoleSyncMode,
}

impl SyncPolicy {
    /// Reads a snapshot from `settings`.
    pub fn from_settings(settings: &dyn SettingsReader) -> Self {
        let mode = |role: Role| match settings.get(&keys::role_sync_mode(role)) {
            Value::String(s) => RoleSyncMode::parse_lenient(&s),
            _ => RoleSyncMode::None,
        };

        Self {
            enabled: truthy(&settings.get(keys::ENABLED)),
            reverse_enabled: truthy(&settings.get(keys::REVERSE_ENABLED)),
            auto_sync_on_create: truthy(&settings.get(keys::AUTO_SYNC_ON_CREATE)),
            delete_counterpart_on_delete: truthy(&settings.get(keys::DELETE_COUNTERPART_ON_DELETE)),
            defer_during_creation_wizard: truthy(&settings.get(keys::DEFER_DURING_WIZARD)),
            admin: mode(Role::Admin),
            moderator: mode(Role::Moderator),
            member: mode(Role::Member),
        }
    }

    #[must_use]
    pub fn role_mode(&self, role: Role) -> RoleSyncMode {
        match role {
            Role::Admin => self.admin,
            Role::Moderator => self.moderator,
            Role::Member => self.member,
        }
    }

    /// Returns true if anything may propagate in `direction` at all.
    #[must_use]
    pub fn direction_enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::SocialToCourse => self.enabled,
            Direction::CourseToSocial => self.enabled && self.reverse_enabled,
        }
    }

    #[must_use]
    pub fn allows(&self, direction: Direction, role: Option<Role>, aspect: Aspect) -> bool {
        if !self.direction_enabled(direction) {
            return false;
        }
        if let Some(role) = role {
            if !self.role_mode(role).permits(direction) {
                return false;
            }
        }
        match aspect {
            Aspect::Enabled => true,
            Aspect::AutoSyncOnCreate => self.auto_sync_on_create,
            Aspect::DeleteOnDelete => self.delete_counterpart_on_delete,
            Aspect::DeferredDuringWizard => self.defer_during_creation_wizard,
        }
    }
}

/// Loose truthiness of a stored setting: `true`, non-zero numbers and
/// non-empty strings other than `"0"` / `"false"`.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Answers "may this change propagate?" from the current settings.
#[derive(Clone)]
pub struct PolicyGate {
    settings: Arc<dyn SettingsReader>,
}

impl PolicyGate {
    pub fn new(settings: Arc<dyn SettingsReader>) -> Self {
        Self { settings }
    }

    /// Takes a snapshot of the current settings.
    pub fn snapshot(&self) -> SyncPolicy {
        SyncPolicy::from_settings(self.settings.as_ref())
    }

    pub fn allowed(&self, direction: Direction, role: Option<Role>, aspect: Aspect) -> bool {
        self.snapshot().allows(direction, role, aspect)
    }

    /// Like [`PolicyGate::allowed`] with the aspect given by name. Unknown
    /// aspects are never allowed.
    pub fn allowed_named(&self, direction: Direction, role: Option<Role>, aspect: &str) -> bool {
        aspect
            .parse::<Aspect>()
            .is_ok_and(|aspect| self.allowed(direction, role, aspect))
    }
}
