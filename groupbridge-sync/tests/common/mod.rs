#![allow(dead_code)]

use groupbridge_sync::memory::{MemoryLinkRegistry, MemoryMembership, MemorySettings};
use groupbridge_sync::policy::keys;
use groupbridge_sync::{Collaborators, LinkRegistry, SyncConfig, SyncController};
use groupbridge_types::{GroupDetails, GroupId, GroupLink, Role, RoleSyncMode, System, UserId};
use std::sync::Arc;
use uuid::Uuid;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A group id as some system would issue it.
pub fn group_id() -> GroupId {
    GroupId::from_uuid(Uuid::new_v4())
}

/// A user id from the shared user directory.
pub fn user_id() -> UserId {
    UserId::from_uuid(Uuid::new_v4())
}

/// Both systems in memory, wired to one controller the way a host would:
/// every event either system emits is delivered to the controller.
pub struct Harness {
    pub social: Arc<MemoryMembership>,
    pub course: Arc<MemoryMembership>,
    pub links: Arc<MemoryLinkRegistry>,
    pub settings: Arc<MemorySettings>,
    pub controller: Arc<SyncController>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        init_tracing();
        let social = Arc::new(MemoryMembership::new(System::Social));
        let course = Arc::new(MemoryMembership::new(System::Course));
        let links = Arc::new(MemoryLinkRegistry::new());
        let settings = Arc::new(MemorySettings::new());

        let controller = Arc::new(SyncController::assemble(
            Collaborators {
                social: social.clone(),
                course: course.clone(),
                links: links.clone(),
                settings: settings.clone(),
            },
            config,
        ));

        for system in [&social, &course] {
            let weak = Arc::downgrade(&controller);
            system.set_listener(move |event| {
                if let Some(controller) = weak.upgrade() {
                    controller.notify(event);
                }
            });
        }

        Self {
            social,
            course,
            links,
            settings,
            controller,
        }
    }

    /// Sync on in both directions with every role bidirectional.
    pub fn enable_all(&self) -> &Self {
        self.settings.set(keys::ENABLED, true);
        self.settings.set(keys::REVERSE_ENABLED, true);
        self.settings.set(keys::AUTO_SYNC_ON_CREATE, true);
        for role in Role::ALL {
            self.set_role_mode(role, RoleSyncMode::Bidirectional);
        }
        self
    }

    pub fn set_role_mode(&self, role: Role, mode: RoleSyncMode) {
        self.settings.set(&keys::role_sync_mode(role), mode.as_str());
    }

    pub fn membership(&self, system: System) -> &MemoryMembership {
        match system {
            System::Social => &self.social,
            System::Course => &self.course,
        }
    }

    /// Seeds a linked pair of empty groups without emitting events.
    pub fn linked_pair(&self, name: &str) -> GroupLink {
        let details = GroupDetails::new(name);
        let link = GroupLink::new(
            self.social.seed_group(&details),
            self.course.seed_group(&details),
        );
        self.links.set_link(link).unwrap();
        link
    }

    pub fn roles_on(&self, system: System, group: GroupId, user: groupbridge_types::UserId) -> Vec<Role> {
        use groupbridge_sync::MembershipApi;
        let mut roles = self.membership(system).roles_of(group, user).unwrap();
        roles.sort();
        roles
    }
}
