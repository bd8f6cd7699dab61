//! Integration tests for the matchmaking coordinator.
//!
//! Sessions are registered directly in a registry and driven through the
//! state machine with decoded lines; their outbound queues are read here
//! instead of by socket write tasks.

use std::time::Duration;

use tacky_match::{
    Coordinator, MatchTable, NoRules, Outcome, REQUEST_QUEUE_CAPACITY,
    request_queue, spawn_coordinator,
};
use tacky_protocol::{Reply, Request, SessionId};
use tacky_session::{
    Action, OutboundReceiver, Registry, SessionState, SharedRegistry,
    outbound_channel,
};

// =========================================================================
// Helpers
// =========================================================================

struct Player {
    id: SessionId,
    rx: OutboundReceiver,
}

impl Player {
    /// Returns every reply currently queued, without waiting.
    fn drain(&mut self) -> Vec<Reply> {
        let mut out = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            out.push(reply);
        }
        out
    }
}

/// Registers a session and names it, leaving it in the lobby.
async fn join(registry: &SharedRegistry, name: &str) -> Player {
    join_with_capacity(registry, name, 8).await
}

async fn join_with_capacity(registry: &SharedRegistry, name: &str, capacity: usize) -> Player {
    let (tx, rx) = outbound_channel(capacity);
    let mut reg = registry.lock().await;
    let id = reg.register(tx);
    reg.get_mut(id)
        .unwrap()
        .handle(Request::parse(&format!("name {name}")));
    Player { id, rx }
}

/// Sends `play` through the state machine. Returns `true` if the machine
/// asked for a matchmaking request.
async fn play(registry: &SharedRegistry, player: &Player) -> bool {
    let mut reg = registry.lock().await;
    let dispatch = reg.get_mut(player.id).unwrap().handle(Request::parse("play"));
    dispatch.action == Action::RequestMatch
}

async fn state_of(registry: &SharedRegistry, player: &Player) -> SessionState {
    registry.lock().await.get(player.id).unwrap().state()
}

fn setup() -> (SharedRegistry, Coordinator<NoRules>, tacky_match::MatchQueue) {
    let registry = Registry::shared();
    let (queue, requests) = request_queue();
    let coordinator =
        Coordinator::<NoRules>::new(registry.clone(), MatchTable::shared(), requests);
    (registry, coordinator, queue)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_process_pairs_two_searching_sessions() {
    let (registry, mut coordinator, _queue) = setup();
    let mut alice = join(&registry, "Alice").await;
    let mut bob = join(&registry, "Bob").await;
    let _carol = join(&registry, "Carol").await;
    alice.drain();
    bob.drain();

    assert!(play(&registry, &alice).await);
    assert_eq!(coordinator.process(alice.id).await, Outcome::NoOpponent);
    assert!(play(&registry, &bob).await);
    let outcome = coordinator.process(bob.id).await;

    assert!(matches!(
        outcome,
        Outcome::Paired { requester, opponent, .. }
            if requester == bob.id && opponent == alice.id
    ));
    assert_eq!(state_of(&registry, &alice).await, SessionState::Playing);
    assert_eq!(state_of(&registry, &bob).await, SessionState::Playing);

    assert_eq!(
        alice.drain(),
        vec![Reply::MatchStarting {
            opponent: "Bob".into()
        }]
    );
    assert_eq!(
        bob.drain(),
        vec![Reply::MatchStarting {
            opponent: "Alice".into()
        }]
    );
}

#[tokio::test]
async fn test_process_leaves_other_sessions_untouched() {
    let (registry, mut coordinator, _queue) = setup();
    let alice = join(&registry, "Alice").await;
    let bob = join(&registry, "Bob").await;
    let mut carol = join(&registry, "Carol").await;
    carol.drain();

    play(&registry, &alice).await;
    play(&registry, &bob).await;
    coordinator.process(bob.id).await;

    assert_eq!(state_of(&registry, &carol).await, SessionState::Lobby);
    assert!(carol.drain().is_empty());
}

#[tokio::test]
async fn test_process_lone_searcher_stays_in_pool() {
    let (registry, mut coordinator, _queue) = setup();
    let mut alice = join(&registry, "Alice").await;
    alice.drain();

    play(&registry, &alice).await;
    let outcome = coordinator.process(alice.id).await;

    assert_eq!(outcome, Outcome::NoOpponent);
    assert_eq!(
        state_of(&registry, &alice).await,
        SessionState::SearchingForMatch
    );
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn test_process_later_arrival_matches_earlier_unmatched() {
    // Alice's own request found nobody; Bob's request must find her
    // without Alice re-sending `play`.
    let (registry, mut coordinator, _queue) = setup();
    let alice = join(&registry, "Alice").await;
    let bob = join(&registry, "Bob").await;

    play(&registry, &alice).await;
    assert_eq!(coordinator.process(alice.id).await, Outcome::NoOpponent);

    play(&registry, &bob).await;
    assert!(matches!(
        coordinator.process(bob.id).await,
        Outcome::Paired { opponent, .. } if opponent == alice.id
    ));
}

#[tokio::test]
async fn test_process_stale_request_does_not_repair_playing_session() {
    let (registry, mut coordinator, _queue) = setup();
    let alice = join(&registry, "Alice").await;
    let bob = join(&registry, "Bob").await;
    let carol = join(&registry, "Carol").await;

    play(&registry, &alice).await;
    play(&registry, &bob).await;
    // Alice's request pairs her with Bob before Bob's request is handled.
    coordinator.process(alice.id).await;
    play(&registry, &carol).await;

    assert_eq!(coordinator.process(bob.id).await, Outcome::Stale);
    assert_eq!(
        state_of(&registry, &carol).await,
        SessionState::SearchingForMatch
    );
}

#[tokio::test]
async fn test_process_skips_disconnected_searcher() {
    let (registry, mut coordinator, _queue) = setup();
    let ghost = join(&registry, "Ghost").await;
    let bob = join(&registry, "Bob").await;

    play(&registry, &ghost).await;
    registry.lock().await.disconnect(ghost.id).unwrap();
    play(&registry, &bob).await;

    assert_eq!(coordinator.process(bob.id).await, Outcome::NoOpponent);
    assert_eq!(coordinator.process(ghost.id).await, Outcome::Stale);
}

#[tokio::test]
async fn test_process_unknown_session_is_logged_not_fatal() {
    let (_registry, mut coordinator, _queue) = setup();
    assert_eq!(
        coordinator.process(SessionId(404)).await,
        Outcome::UnknownSession
    );
}

#[tokio::test]
async fn test_request_queue_third_submission_blocks_until_drained() {
    assert_eq!(REQUEST_QUEUE_CAPACITY, 1);
    let (queue, mut requests) = request_queue();

    // Nobody is draining: the single slot fills up.
    queue.submit(SessionId(1)).await.unwrap();
    let blocked =
        tokio::time::timeout(Duration::from_millis(50), queue.submit(SessionId(2))).await;
    assert!(blocked.is_err(), "second submission must wait for a free slot");

    let waiting = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.submit(SessionId(3)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiting.is_finished());

    assert_eq!(requests.next().await, Some(SessionId(1)));
    tokio::time::timeout(Duration::from_secs(1), waiting)
        .await
        .expect("submission should complete once drained")
        .unwrap()
        .unwrap();
    assert_eq!(requests.next().await, Some(SessionId(3)));
}

#[tokio::test]
async fn test_spawned_coordinator_pairs_in_submission_order() {
    let registry = Registry::shared();
    let (queue, _handle) = spawn_coordinator::<NoRules>(registry.clone(), MatchTable::shared());

    let mut alice = join(&registry, "Alice").await;
    let mut bob = join(&registry, "Bob").await;
    alice.drain();
    bob.drain();

    play(&registry, &alice).await;
    queue.submit(alice.id).await.unwrap();
    play(&registry, &bob).await;
    queue.submit(bob.id).await.unwrap();

    let notice = tokio::time::timeout(Duration::from_secs(2), alice.rx.recv())
        .await
        .expect("alice should be notified")
        .unwrap();
    assert_eq!(
        notice,
        Reply::MatchStarting {
            opponent: "Bob".into()
        }
    );
    let notice = tokio::time::timeout(Duration::from_secs(2), bob.rx.recv())
        .await
        .expect("bob should be notified")
        .unwrap();
    assert_eq!(
        notice,
        Reply::MatchStarting {
            opponent: "Alice".into()
        }
    );
}

#[tokio::test]
async fn test_submit_after_coordinator_stops_returns_queue_closed() {
    let (queue, requests) = request_queue();
    drop(requests);
    assert!(matches!(
        queue.submit(SessionId(1)).await,
        Err(tacky_match::MatchError::QueueClosed)
    ));
}

#[tokio::test]
async fn test_coordinator_holds_one_request_while_busy_and_blocks_the_next() {
    let registry = Registry::shared();
    let (queue, _handle) = spawn_coordinator::<NoRules>(registry.clone(), MatchTable::shared());
    let alice = join(&registry, "Alice").await;
    let bob = join(&registry, "Bob").await;
    let carol = join(&registry, "Carol").await;
    for player in [&alice, &bob, &carol] {
        play(&registry, player).await;
    }

    // Holding the registry parks the coordinator inside `process`.
    let guard = registry.lock().await;
    queue.submit(alice.id).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), queue.submit(bob.id))
        .await
        .expect("the slot frees up once the coordinator dequeues alice")
        .unwrap();

    let waiting = {
        let queue = queue.clone();
        let carol = carol.id;
        tokio::spawn(async move { queue.submit(carol).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiting.is_finished(), "third submission must wait");

    drop(guard);
    tokio::time::timeout(Duration::from_secs(1), waiting)
        .await
        .expect("submission should complete once the coordinator resumes")
        .unwrap()
        .unwrap();

    // Alice's request paired her with Bob; Bob's became stale.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while state_of(&registry, &bob).await != SessionState::Playing {
        assert!(tokio::time::Instant::now() < deadline, "bob was never paired");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state_of(&registry, &alice).await, SessionState::Playing);
    assert_eq!(
        state_of(&registry, &carol).await,
        SessionState::SearchingForMatch
    );
}

#[tokio::test]
async fn test_coordinator_is_not_stalled_by_full_outbound_queue() {
    let registry = Registry::shared();
    let (queue, _handle) = spawn_coordinator::<NoRules>(registry.clone(), MatchTable::shared());

    // Slow's client never reads: its queue is already full.
    let mut slow = join_with_capacity(&registry, "Slow", 2).await;
    let slow_tx = registry.lock().await.get(slow.id).unwrap().outbound().clone();
    slow_tx.try_send(Reply::Welcome).unwrap();
    slow_tx.try_send(Reply::AskName).unwrap();
    let mut alice = join(&registry, "Alice").await;

    play(&registry, &slow).await;
    queue.submit(slow.id).await.unwrap();
    play(&registry, &alice).await;
    queue.submit(alice.id).await.unwrap();

    let notice = tokio::time::timeout(Duration::from_secs(2), alice.rx.recv())
        .await
        .expect("alice should be notified")
        .unwrap();
    assert_eq!(
        notice,
        Reply::MatchStarting {
            opponent: "Slow".into()
        }
    );

    // Later players are still matched.
    let carol = join(&registry, "Carol").await;
    let mut dave = join(&registry, "Dave").await;
    for player in [&carol, &dave] {
        play(&registry, player).await;
        tokio::time::timeout(Duration::from_secs(1), queue.submit(player.id))
            .await
            .expect("coordinator must keep draining")
            .unwrap();
    }
    let notice = tokio::time::timeout(Duration::from_secs(2), dave.rx.recv())
        .await
        .expect("dave should be notified")
        .unwrap();
    assert_eq!(
        notice,
        Reply::MatchStarting {
            opponent: "Carol".into()
        }
    );

    assert_eq!(state_of(&registry, &slow).await, SessionState::Playing);
    assert_eq!(slow.drain(), vec![Reply::Welcome, Reply::AskName]);
}
