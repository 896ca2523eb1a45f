//! In-process collaborator implementations.
//!
//! Useful for embedding the engine next to systems that keep their state in
//! memory, and for exercising the controller end to end in tests.
//! [`MemoryMembership`] behaves like a native system: every mutation that
//! changes state emits the matching lifecycle event to its listener.

use crate::collaborator::{LinkRegistry, MembershipApi, SettingsReader};
use crate::error::{SyncError, SyncResult};
use groupbridge_types::{
    CreationStep, GroupDetails, GroupId, GroupLink, LifecycleEvent, Role, RoleAssignment, System,
    UserId,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Settings ─────────────────────────────────────────────────────

/// Settings held in a map of dotted keys.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemorySettings::set`].
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.into());
    }
}

impl SettingsReader for MemorySettings {
    fn get(&self, key: &str) -> Value {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

// ── Links ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryLinkRegistry {
    links: Mutex<Vec<GroupLink>>,
}

impl MemoryLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> Vec<GroupLink> {
        lock(&self.links).clone()
    }
}

impl LinkRegistry for MemoryLinkRegistry {
    fn resolve_counterpart(&self, system: System, group: GroupId) -> SyncResult<Option<GroupId>> {
        Ok(lock(&self.links)
            .iter()
            .find_map(|link| link.counterpart_of(system, group)))
    }

    fn set_link(&self, link: GroupLink) -> SyncResult<()> {
        let mut links = lock(&self.links);
        links.retain(|l| l.social != link.social && l.course != link.course);
        links.push(link);
        Ok(())
    }

    fn remove_link(&self, system: System, group: GroupId) -> SyncResult<Option<GroupLink>> {
        let mut links = lock(&self.links);
        let index = links.iter().position(|l| l.side(system) == group);
        Ok(index.map(|i| links.remove(i)))
    }
}

// ── Membership ───────────────────────────────────────────────────

/// Callback receiving the events a [`MemoryMembership`] emits.
pub type EventListener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

#[derive(Debug, Clone)]
struct GroupRecord {
    details: GroupDetails,
    members: BTreeSet<(UserId, Role)>,
}

/// A bridged system kept in memory.
pub struct MemoryMembership {
    system: System,
    groups: Mutex<HashMap<GroupId, GroupRecord>>,
    listener: RwLock<Option<EventListener>>,
    emitted: Mutex<Vec<LifecycleEvent>>,
    fail_mutations: AtomicBool,
}

impl MemoryMembership {
    pub fn new(system: System) -> Self {
        Self {
            system,
            groups: Mutex::new(HashMap::new()),
            listener: RwLock::new(None),
            emitted: Mutex::new(Vec::new()),
            fail_mutations: AtomicBool::new(false),
        }
    }

    pub fn system(&self) -> System {
        self.system
    }

    /// Routes every emitted event to `listener`, typically a controller.
    pub fn set_listener(&self, listener: impl Fn(&LifecycleEvent) + Send + Sync + 'static) {
        *self
            .listener
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(listener));
    }

    /// Makes every subsequent mutation fail with a collaborator error.
    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Events emitted so far, oldest first.
    pub fn emitted(&self) -> Vec<LifecycleEvent> {
        lock(&self.emitted).clone()
    }

    pub fn clear_emitted(&self) {
        lock(&self.emitted).clear();
    }

    pub fn group_exists(&self, group: GroupId) -> bool {
        lock(&self.groups).contains_key(&group)
    }

    pub fn group_count(&self) -> usize {
        lock(&self.groups).len()
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        lock(&self.groups).keys().copied().collect()
    }

    /// Inserts a group without emitting events, as when loading existing
    /// state.
    pub fn seed_group(&self, details: &GroupDetails) -> GroupId {
        // This store plays the native system, so it issues the id.
        let group = GroupId::from_uuid(Uuid::new_v4());
        lock(&self.groups).insert(
            group,
            GroupRecord {
                details: details.clone(),
                members: BTreeSet::new(),
            },
        );
        group
    }

    /// Grants a role without emitting events. Returns false if the group
    /// does not exist.
    pub fn seed_role(&self, group: GroupId, user: UserId, role: Role) -> bool {
        match lock(&self.groups).get_mut(&group) {
            Some(record) => {
                record.members.insert((user, role));
                true
            }
            None => false,
        }
    }

    /// Creates a group the way an interactive creation flow does: the
    /// creator becomes admin first, then the group is announced.
    pub fn create_group_as(
        &self,
        details: &GroupDetails,
        creator: UserId,
        step: Option<CreationStep>,
    ) -> SyncResult<GroupId> {
        self.check_writable()?;
        let group = self.seed_group(details);
        self.add_role(group, creator, Role::Admin)?;
        self.emit(LifecycleEvent::GroupCreated {
            source: self.system,
            group,
            step,
        });
        Ok(group)
    }

    fn check_writable(&self) -> SyncResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(SyncError::collaborator(self.system, "mutations are failing"));
        }
        Ok(())
    }

    fn not_found(&self, group: GroupId) -> SyncError {
        SyncError::collaborator(self.system, format!("group {group} does not exist"))
    }

    /// Records and delivers an event. Must be called without holding the
    /// group lock; listeners read this system back.
    fn emit(&self, event: LifecycleEvent) {
        lock(&self.emitted).push(event.clone());
        let listener = self
            .listener
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(listener) = listener {
            listener(&event);
        }
    }
}

impl MembershipApi for MemoryMembership {
    fn add_role(&self, group: GroupId, user: UserId, role: Role) -> SyncResult<()> {
        self.check_writable()?;
        let inserted = {
            let mut groups = lock(&self.groups);
            let record = groups.get_mut(&group).ok_or_else(|| self.not_found(group))?;
            record.members.insert((user, role))
        };
        if inserted {
            self.emit(LifecycleEvent::RoleAdded {
                source: self.system,
                group,
                user,
                role,
            });
        }
        Ok(())
    }

    fn remove_role(&self, group: GroupId, user: UserId, role: Role) -> SyncResult<()> {
        self.check_writable()?;
        let removed = {
            let mut groups = lock(&self.groups);
            let record = groups.get_mut(&group).ok_or_else(|| self.not_found(group))?;
            record.members.remove(&(user, role))
        };
        if removed {
            self.emit(LifecycleEvent::RoleRemoved {
                source: self.system,
                group,
                user,
                role,
            });
        }
        Ok(())
    }

    fn list_members(&self, group: GroupId) -> SyncResult<Vec<RoleAssignment>> {
        let groups = lock(&self.groups);
        let record = groups.get(&group).ok_or_else(|| self.not_found(group))?;
        Ok(record
            .members
            .iter()
            .map(|(user, role)| RoleAssignment::new(group, *user, *role))
            .collect())
    }

    fn create_group(&self, details: &GroupDetails) -> SyncResult<GroupId> {
        self.check_writable()?;
        let group = self.seed_group(details);
        self.emit(LifecycleEvent::GroupCreated {
            source: self.system,
            group,
            step: None,
        });
        Ok(group)
    }

    fn delete_group(&self, group: GroupId) -> SyncResult<()> {
        self.check_writable()?;
        if !self.group_exists(group) {
            return Err(self.not_found(group));
        }
        self.emit(LifecycleEvent::GroupDeleting {
            source: self.system,
            group,
        });
        lock(&self.groups).remove(&group);
        self.emit(LifecycleEvent::GroupDeleted {
            source: self.system,
            group,
        });
        Ok(())
    }

    fn describe_group(&self, group: GroupId) -> SyncResult<Option<GroupDetails>> {
        Ok(lock(&self.groups).get(&group).map(|r| r.details.clone()))
    }

    fn update_group(&self, group: GroupId, details: &GroupDetails) -> SyncResult<()> {
        self.check_writable()?;
        {
            let mut groups = lock(&self.groups);
            let record = groups.get_mut(&group).ok_or_else(|| self.not_found(group))?;
            record.details = details.clone();
        }
        self.emit(LifecycleEvent::GroupUpdated {
            source: self.system,
            group,
        });
        Ok(())
    }
}
