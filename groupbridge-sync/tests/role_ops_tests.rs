//! Tests for role_ops.rs: per-role propagation onto the counterpart.

mod common;

use common::{Harness, group_id, user_id};
use groupbridge_sync::{MembershipApi, RoleOutcome, SyncError};
use groupbridge_types::{Direction, Role, RoleSyncMode, System};

#[test]
fn sync_admin_twice_leaves_one_admin() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");
    let user = user_id();
    let roles = h.controller.roles();

    let first = roles.sync_admin(Direction::SocialToCourse, link.social, user, false).unwrap();
    let second = roles.sync_admin(Direction::SocialToCourse, link.social, user, false).unwrap();

    assert_eq!(first, RoleOutcome::Applied);
    assert_eq!(second, RoleOutcome::Unchanged);
    let admins: Vec<_> = h
        .course
        .list_members(link.course)
        .unwrap()
        .into_iter()
        .filter(|a| a.user == user && a.role == Role::Admin)
        .collect();
    assert_eq!(admins.len(), 1);
}

#[test]
fn removing_a_role_not_held_is_unchanged() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");

    let outcome = h
        .controller
        .roles()
        .sync_moderator(Direction::SocialToCourse, link.social, user_id(), true)
        .unwrap();
    assert_eq!(outcome, RoleOutcome::Unchanged);
    assert!(h.course.emitted().is_empty());
}

#[test]
fn removal_is_applied() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");
    let user = user_id();
    h.course.seed_role(link.course, user, Role::Member);

    let outcome = h
        .controller
        .roles()
        .sync_member(Direction::SocialToCourse, link.social, user, true)
        .unwrap();
    assert_eq!(outcome, RoleOutcome::Applied);
    assert!(h.roles_on(System::Course, link.course, user).is_empty());
}

#[test]
fn unlinked_group_is_ignored() {
    let h = Harness::new();
    h.enable_all();

    let outcome = h
        .controller
        .roles()
        .sync_admin(Direction::SocialToCourse, group_id(), user_id(), false)
        .unwrap();
    assert_eq!(outcome, RoleOutcome::Unlinked);
    assert_eq!(h.course.group_count(), 0);
}

#[test]
fn one_way_mode_rejects_other_direction() {
    let h = Harness::new();
    h.enable_all();
    h.set_role_mode(Role::Admin, RoleSyncMode::SocialToCourse);
    let link = h.linked_pair("Physics");
    let user = user_id();

    let outcome = h
        .controller
        .roles()
        .sync_admin(Direction::CourseToSocial, link.course, user, false)
        .unwrap();
    assert_eq!(outcome, RoleOutcome::PolicyRejected);
    assert!(h.roles_on(System::Social, link.social, user).is_empty());
}

#[test]
fn reverse_direction_writes_social_side() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");
    let user = user_id();

    let outcome = h
        .controller
        .roles()
        .sync_role(Direction::CourseToSocial, Role::Moderator, link.course, user, false)
        .unwrap();
    assert_eq!(outcome, RoleOutcome::Applied);
    assert_eq!(h.roles_on(System::Social, link.social, user), vec![Role::Moderator]);
}

#[test]
fn propagated_write_is_not_echoed_back() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");
    let user = user_id();

    h.controller
        .roles()
        .sync_admin(Direction::SocialToCourse, link.social, user, false)
        .unwrap();

    // The course side emitted its native event, the controller dropped it.
    assert_eq!(h.course.emitted().len(), 1);
    assert!(h.social.emitted().is_empty());
    assert!(h.roles_on(System::Social, link.social, user).is_empty());
}

#[test]
fn collaborator_failure_surfaces_and_releases_guard() {
    let h = Harness::new();
    h.enable_all();
    let link = h.linked_pair("Physics");
    h.course.set_fail_mutations(true);

    let err = h
        .controller
        .roles()
        .sync_admin(Direction::SocialToCourse, link.social, user_id(), false)
        .unwrap_err();
    assert!(matches!(err, SyncError::Collaborator { system: System::Course, .. }));
    assert!(!h.controller.loop_guard().is_suppressed(System::Course));
}
