//! End-to-end access scenarios through the boundary

use chrono::Duration;
use doorkeep_core::effects::{RepositoryEffects, StateFilter, UsageFilter};
use doorkeep_core::{ActorState, ErrorClass, Mode, UsageType};
use doorkeep_testkit::{ts, World};

#[tokio::test]
async fn set_state_then_get_state_follows_the_pulse() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let alice = world.add_user("alice").await.unwrap();
    world.grant(alice.id, door.id, Mode::Write).await.unwrap();

    world.clock.set(ts(12, 30, 3));
    world
        .api
        .set_state(Some(&alice.key), Some(&door.id_str()))
        .await
        .unwrap();

    for (instant, open) in [
        (ts(12, 30, 3), true),
        (ts(12, 30, 5), true),
        (ts(12, 30, 13), true),
        (ts(12, 30, 14), false),
    ] {
        world.clock.set(instant);
        let response = world
            .api
            .get_state(Some(&door.key), Some(&door.id_str()))
            .await
            .unwrap();
        assert_eq!(response.state, open, "at {instant}");
    }
}

#[tokio::test]
async fn stored_pulse_interval_is_evaluated_inclusively() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    world
        .repository
        .insert_state(ActorState {
            begin: Some(ts(12, 30, 3)),
            end: Some(ts(12, 30, 10)),
            ..ActorState::pulse(door.id, ts(12, 30, 3), Duration::seconds(7)).unwrap()
        })
        .await
        .unwrap();

    world.clock.set(ts(12, 30, 5));
    let open = world
        .api
        .get_state(Some(&door.key), Some(&door.id_str()))
        .await
        .unwrap();
    assert!(open.state);

    world.clock.set(ts(12, 30, 11));
    let closed = world
        .api
        .get_state(Some(&door.key), Some(&door.id_str()))
        .await
        .unwrap();
    assert!(!closed.state);
}

#[tokio::test]
async fn read_scope_never_grants_set_state() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let bob = world.add_user("bob").await.unwrap();
    world.grant(bob.id, door.id, Mode::Read).await.unwrap();

    let err = world
        .api
        .set_state(Some(&bob.key), Some(&door.id_str()))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Permission);

    let states = world
        .repository
        .select_states(&StateFilter::for_actor(door.id))
        .await
        .unwrap();
    assert!(states.is_empty());
}

#[tokio::test]
async fn get_state_without_read_scope_is_denied_even_when_open() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let carol = world.add_user("carol").await.unwrap();
    world.grant(carol.id, door.id, Mode::Write).await.unwrap();
    world
        .api
        .set_state(Some(&carol.key), Some(&door.id_str()))
        .await
        .unwrap();

    let err = world
        .api
        .get_state(Some(&carol.key), Some(&door.id_str()))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Permission);
}

#[tokio::test]
async fn nonexistent_actor_and_unknown_key_look_like_missing_scope() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let dave = world.add_user("dave").await.unwrap();
    let ghost = doorkeep_core::IdentityId::new_random().to_string();

    let no_scope = world
        .api
        .get_state(Some(&dave.key), Some(&door.id_str()))
        .await
        .unwrap_err();
    let no_actor = world
        .api
        .get_state(Some(&dave.key), Some(&ghost))
        .await
        .unwrap_err();
    let no_key = world
        .api
        .get_state(Some("0000"), Some(&door.id_str()))
        .await
        .unwrap_err();
    assert_eq!(no_scope, no_actor);
    assert_eq!(no_scope, no_key);
}

#[tokio::test]
async fn validity_window_gates_every_operation() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let temp = world
        .add_identity("temp", doorkeep_core::Role::Guest)
        .await
        .unwrap();
    world
        .grant_validity(temp.id, Some(ts(12, 29, 0)), None)
        .await
        .unwrap();
    world.grant(temp.id, door.id, Mode::Write).await.unwrap();

    world.clock.set(ts(12, 28, 59));
    let err = world
        .api
        .set_state(Some(&temp.key), Some(&door.id_str()))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Permission);

    world.clock.set(ts(12, 30, 0));
    world
        .api
        .set_state(Some(&temp.key), Some(&door.id_str()))
        .await
        .unwrap();
}

#[tokio::test]
async fn inverted_window_never_validates() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let odd = world
        .add_identity("odd", doorkeep_core::Role::User)
        .await
        .unwrap();
    world
        .api
        .add_valid(
            Some(&world.admin_key),
            Some(&odd.id_str()),
            Some("2024-02-20T12:30:06"),
            Some("2024-02-20T12:29:00"),
        )
        .await
        .unwrap();
    world.grant(odd.id, door.id, Mode::Write).await.unwrap();

    for instant in [ts(12, 29, 0), ts(12, 30, 0), ts(12, 30, 6)] {
        world.clock.set(instant);
        assert!(world
            .api
            .set_state(Some(&odd.key), Some(&door.id_str()))
            .await
            .is_err());
    }
}

#[tokio::test]
async fn health_reflects_last_poll() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let maintenance = world.maintenance_key.clone();

    let never = world
        .api
        .actor_health(Some(&maintenance), Some(&door.id_str()), Some("30"))
        .await
        .unwrap();
    assert!(!never.health);

    world.clock.set(ts(12, 10, 0));
    world
        .api
        .get_state(Some(&door.key), Some(&door.id_str()))
        .await
        .unwrap();

    world.clock.set(ts(12, 10, 30));
    let fresh = world
        .api
        .actor_health(Some(&maintenance), Some(&door.id_str()), Some("30"))
        .await
        .unwrap();
    assert!(fresh.health);

    world.clock.set(ts(12, 10, 31));
    let stale = world
        .api
        .actor_health(Some(&maintenance), Some(&door.id_str()), Some("30"))
        .await
        .unwrap();
    assert!(!stale.health);

    let usage = world
        .repository
        .select_usage(&UsageFilter::for_actor(door.id, UsageType::LastGetState))
        .await
        .unwrap();
    assert_eq!(usage.len(), 1);
}

#[tokio::test]
async fn maximal_timeout_is_answered_not_rejected() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    world
        .api
        .get_state(Some(&door.key), Some(&door.id_str()))
        .await
        .unwrap();
    world.clock.advance(Duration::days(3650));

    let response = world
        .api
        .actor_health(
            Some(&world.maintenance_key),
            Some(&door.id_str()),
            Some("9223372036854775807"),
        )
        .await
        .unwrap();
    assert!(response.health);
}

#[tokio::test]
async fn health_input_errors() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();
    let user = world.add_user("erin").await.unwrap();
    let maintenance = world.maintenance_key.clone();

    let err = world
        .api
        .actor_health(Some(&maintenance), Some(&user.id_str()), Some("30"))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Input);

    let err = world
        .api
        .actor_health(Some(&maintenance), Some(&door.id_str()), Some("0"))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Input);
}

#[tokio::test]
async fn regenerated_key_replaces_old_one() {
    let world = World::new().await.unwrap();
    let door = world.add_actor("door1").await.unwrap();

    let fresh = world
        .api
        .regenerate_api_key(Some(&door.key))
        .await
        .unwrap()
        .api_key;
    assert_ne!(fresh, door.key);

    let old = world
        .api
        .get_state(Some(&door.key), Some(&door.id_str()))
        .await
        .unwrap_err();
    assert_eq!(old.class, ErrorClass::Permission);
    assert!(world
        .api
        .get_state(Some(&fresh), Some(&door.id_str()))
        .await
        .is_ok());
}

#[tokio::test]
async fn admin_provisioning_end_to_end() {
    let world = World::new().await.unwrap();
    let admin = world.admin_key.clone();

    let door = world
        .api
        .add_user(Some(&admin), Some("front-door"), Some("actor"), None, None)
        .await
        .unwrap();
    let frank = world
        .api
        .add_user(
            Some(&admin),
            Some("frank"),
            Some("user"),
            Some("frank@example.org"),
            Some("nfr21Party!"),
        )
        .await
        .unwrap();
    assert!(frank.password_set);

    let (door_id, frank_id) = (door.id.to_string(), frank.id.to_string());
    for subject in [&door_id, &frank_id] {
        world
            .api
            .add_valid(Some(&admin), Some(subject), None, None)
            .await
            .unwrap();
    }
    world
        .api
        .add_scope(Some(&admin), Some(&frank_id), Some(&door_id), Some("write"))
        .await
        .unwrap();
    world
        .api
        .add_scope(Some(&admin), Some(&door_id), Some(&door_id), Some("read"))
        .await
        .unwrap();

    world
        .api
        .set_state(Some(&frank.api_key), Some(&door_id))
        .await
        .unwrap();
    let state = world
        .api
        .get_state(Some(&door.api_key), Some(&door_id))
        .await
        .unwrap();
    assert!(state.state);

    let dup_email = world
        .api
        .add_user(
            Some(&admin),
            Some("frank2"),
            Some("user"),
            Some("frank@example.org"),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(dup_email.class, ErrorClass::Input);
}
