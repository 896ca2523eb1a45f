use groupbridge_types::{
    CreationStep, Direction, EventKind, GroupDetails, GroupId, GroupLink, LifecycleEvent, Role,
    System, UserId,
};
use uuid::Uuid;

fn group_id() -> GroupId {
    GroupId::from_uuid(Uuid::new_v4())
}

fn user_id() -> UserId {
    UserId::from_uuid(Uuid::new_v4())
}

#[test]
fn event_accessors() {
    let group = group_id();
    let user = user_id();
    let event = LifecycleEvent::RoleAdded {
        source: System::Course,
        group,
        user,
        role: Role::Moderator,
    };

    assert_eq!(event.source(), System::Course);
    assert_eq!(event.group(), group);
    assert_eq!(event.role(), Some(Role::Moderator));
    assert_eq!(event.direction(), Direction::CourseToSocial);
    assert_eq!(event.kind(), EventKind::RoleAdded);
}

#[test]
fn group_events_have_no_role() {
    let event = LifecycleEvent::GroupDeleting {
        source: System::Social,
        group: group_id(),
    };
    assert_eq!(event.role(), None);
    assert_eq!(event.kind(), EventKind::GroupDeleting);
}

#[test]
fn event_json_roundtrip_keeps_creation_step() {
    let event = LifecycleEvent::GroupCreated {
        source: System::Social,
        group: group_id(),
        step: Some(CreationStep::GroupDetails),
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"event\":\"group_created\""));
    let parsed: LifecycleEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, event);
}

#[test]
fn creation_step_names() {
    assert!(CreationStep::from_name("group-details").is_first());
    let later = CreationStep::from_name("course");
    assert!(!later.is_first());
    assert_eq!(later.to_string(), "course");
}

#[test]
fn event_kinds_are_distinct() {
    let names: std::collections::HashSet<_> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
    assert_eq!(names.len(), EventKind::ALL.len());
}

// ── GroupLink ────────────────────────────────────────────────────

#[test]
fn link_from_pair_orders_sides() {
    let a = group_id();
    let b = group_id();
    assert_eq!(GroupLink::from_pair(System::Social, a, b), GroupLink::new(a, b));
    assert_eq!(GroupLink::from_pair(System::Course, b, a), GroupLink::new(a, b));
}

#[test]
fn link_counterpart_lookup() {
    let link = GroupLink::new(group_id(), group_id());
    assert_eq!(link.counterpart_of(System::Social, link.social), Some(link.course));
    assert_eq!(link.counterpart_of(System::Course, link.course), Some(link.social));
    assert_eq!(link.counterpart_of(System::Social, link.course), None);
}

#[test]
fn group_details_builder() {
    let details = GroupDetails::new("Chemistry 101").with_description("Lab group");
    assert_eq!(details.name, "Chemistry 101");
    assert_eq!(details.description.as_deref(), Some("Lab group"));
}
