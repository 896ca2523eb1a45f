//! Property-based tests for convergence of role propagation.
//!
//! Role events are applied independently and idempotently, so the course
//! side must end up mirroring the social side regardless of the order or
//! repetition of membership changes.

mod common;

use common::{Harness, user_id};
use groupbridge_sync::MembershipApi;
use groupbridge_types::{Direction, Role, System, UserId};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Moderator), Just(Role::Member)]
}

/// (user index, role, add?) membership changes on the social side.
fn change_strategy() -> impl Strategy<Value = Vec<(usize, Role, bool)>> {
    prop::collection::vec((0usize..4, role_strategy(), any::<bool>()), 0..40)
}

proptest! {
    /// Every sequence of native role changes leaves the counterpart with
    /// exactly the source's role set for every user.
    #[test]
    fn course_mirrors_social_after_any_sequence(changes in change_strategy()) {
        let h = Harness::new();
        h.enable_all();
        let link = h.linked_pair("Property");
        let users: Vec<UserId> = (0..4).map(|_| user_id()).collect();

        for (user, role, add) in changes {
            if add {
                h.social.add_role(link.social, users[user], role).unwrap();
            } else {
                h.social.remove_role(link.social, users[user], role).unwrap();
            }
        }

        for user in &users {
            prop_assert_eq!(
                h.roles_on(System::Course, link.course, *user),
                h.roles_on(System::Social, link.social, *user)
            );
        }
    }

    /// A demotion/promotion pair converges in either order.
    #[test]
    fn promotion_pair_is_order_independent(
        from in role_strategy(),
        to in role_strategy(),
        remove_first in any::<bool>(),
    ) {
        prop_assume!(from != to);
        let h = Harness::new();
        h.enable_all();
        let link = h.linked_pair("Promotion");
        let user = user_id();
        h.social.seed_role(link.social, user, from);
        h.course.seed_role(link.course, user, from);

        if remove_first {
            h.social.remove_role(link.social, user, from).unwrap();
            h.social.add_role(link.social, user, to).unwrap();
        } else {
            h.social.add_role(link.social, user, to).unwrap();
            h.social.remove_role(link.social, user, from).unwrap();
        }

        prop_assert_eq!(h.roles_on(System::Course, link.course, user), vec![to]);
    }

    /// Full resync converges arbitrary divergent state and is a no-op when
    /// repeated.
    #[test]
    fn full_resync_converges_and_settles(
        social_roles in prop::collection::vec((0usize..4, role_strategy()), 0..12),
        course_roles in prop::collection::vec((0usize..4, role_strategy()), 0..12),
    ) {
        let h = Harness::new();
        h.enable_all();
        let link = h.linked_pair("Resync");
        let users: Vec<UserId> = (0..4).map(|_| user_id()).collect();
        for (user, role) in social_roles {
            h.social.seed_role(link.social, users[user], role);
        }
        for (user, role) in course_roles {
            h.course.seed_role(link.course, users[user], role);
        }

        let groups = h.controller.groups();
        groups.full_resync(Direction::SocialToCourse, link.social).unwrap();
        let second = groups.full_resync(Direction::SocialToCourse, link.social).unwrap();

        prop_assert!(second.is_noop());
        for user in &users {
            prop_assert_eq!(
                h.roles_on(System::Course, link.course, *user),
                h.roles_on(System::Social, link.social, *user)
            );
        }
    }
}
