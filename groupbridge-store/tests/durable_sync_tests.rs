//! The controller running against the SQLite registry and TOML settings.

use groupbridge_store::{FileSettings, SqliteLinkRegistry};
use groupbridge_sync::memory::MemoryMembership;
use groupbridge_sync::{Collaborators, MembershipApi, SyncConfig, SyncController};
use groupbridge_types::{GroupDetails, Role, System, UserId};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use uuid::Uuid;

fn user_id() -> UserId {
    UserId::from_uuid(Uuid::new_v4())
}

const SETTINGS: &str = r#"
[buddypress]
enabled = true
default_auto_sync = true
delete_ld_on_delete = true
default_admin_sync_to = "bidirectional"
default_user_sync_to = "a-to-b"
"#;

struct Durable {
    social: Arc<MemoryMembership>,
    course: Arc<MemoryMembership>,
    links: SqliteLinkRegistry,
    _controller: Arc<SyncController>,
}

fn wire(db: &Path, settings: &Path) -> Durable {
    let social = Arc::new(MemoryMembership::new(System::Social));
    let course = Arc::new(MemoryMembership::new(System::Course));
    let links = SqliteLinkRegistry::open(db).unwrap();

    let controller = Arc::new(SyncController::assemble(
        Collaborators {
            social: social.clone(),
            course: course.clone(),
            links: Arc::new(links.clone()),
            settings: Arc::new(FileSettings::load_from(settings)),
        },
        SyncConfig::default(),
    ));

    for system in [&social, &course] {
        let weak = Arc::downgrade(&controller);
        system.set_listener(move |event| {
            if let Some(controller) = weak.upgrade() {
                controller.notify(event);
            }
        });
    }

    Durable {
        social,
        course,
        links,
        _controller: controller,
    }
}

#[test]
fn group_lifecycle_with_durable_collaborators() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("links.db");
    let settings = dir.path().join("groupbridge.toml");
    std::fs::write(&settings, SETTINGS).unwrap();

    let sys = wire(&db, &settings);
    let creator = user_id();
    let student = user_id();

    let group = sys
        .social
        .create_group_as(&GroupDetails::new("Chess club"), creator, None)
        .unwrap();

    let links = sys.links.links().unwrap();
    assert_eq!(links.len(), 1);
    let course_group = links[0].course;
    assert_eq!(links[0].social, group);
    assert_eq!(
        sys.course.describe_group(course_group).unwrap(),
        Some(GroupDetails::new("Chess club"))
    );
    assert_eq!(sys.course.roles_of(course_group, creator).unwrap(), vec![Role::Admin]);

    // Members flow one way only.
    sys.social.add_role(group, student, Role::Member).unwrap();
    assert_eq!(sys.course.roles_of(course_group, student).unwrap(), vec![Role::Member]);
    sys.course.remove_role(course_group, student, Role::Member).unwrap();
    assert_eq!(sys.social.roles_of(group, student).unwrap(), vec![Role::Member]);

    sys.social.delete_group(group).unwrap();
    assert!(!sys.course.group_exists(course_group));
    assert!(sys.links.links().unwrap().is_empty());
}

#[test]
fn links_outlive_the_process() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("links.db");
    let settings = dir.path().join("groupbridge.toml");
    std::fs::write(&settings, SETTINGS).unwrap();

    let group = {
        let sys = wire(&db, &settings);
        sys.social
            .create_group_as(&GroupDetails::new("Film society"), user_id(), None)
            .unwrap()
    };

    let reopened = SqliteLinkRegistry::open(&db).unwrap();
    let links = reopened.links().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].social, group);
}

#[test]
fn missing_settings_file_keeps_sync_off() {
    let dir = tempdir().unwrap();
    let sys = wire(&dir.path().join("links.db"), &dir.path().join("absent.toml"));

    sys.social
        .create_group_as(&GroupDetails::new("Quiet group"), user_id(), None)
        .unwrap();

    assert_eq!(sys.course.group_count(), 0);
    assert!(sys.links.links().unwrap().is_empty());
}
