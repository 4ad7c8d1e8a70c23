//! Tests for the umpire against a tiny counting game.
//!
//! Participants add 1, 2 or 3 to a running total. Whoever must move when
//! the total reaches the target has lost.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_umpire::{
    EventSink, GameStatus, MoveResolver, MoveToken, OracleError, Participant, ResolveError,
    RulesOracle, Session, SessionEvent, SinkError, SubmitError, TerminalFacts, Umpire,
};

const TARGET: u32 = 10;

#[derive(Debug)]
struct CountingOracle;

impl CountingOracle {
    fn step(token: &MoveToken) -> Option<u32> {
        token.as_str().parse::<u32>().ok().filter(|n| (1..=3).contains(n))
    }
}

impl RulesOracle for CountingOracle {
    type State = u32;

    fn initial_state(&self) -> u32 {
        0
    }

    fn is_legal(&self, state: &u32, token: &MoveToken) -> bool {
        Self::step(token).is_some_and(|n| state + n <= TARGET)
    }

    fn apply(&self, state: &u32, token: &MoveToken) -> Result<u32, OracleError> {
        match Self::step(token) {
            Some(n) if state + n <= TARGET => Ok(state + n),
            _ => Err(OracleError::InvalidApplication {
                token: token.clone(),
                reason: "not a legal step".to_string(),
            }),
        }
    }

    fn terminal_facts(&self, state: &u32) -> TerminalFacts {
        TerminalFacts {
            checkmate: *state == TARGET,
            ..TerminalFacts::none()
        }
    }

    fn snapshot(&self, state: &u32) -> String {
        state.to_string()
    }
}

/// Takes the last word of the text as the token; refuses nonsense.
struct LastWordResolver;

#[async_trait]
impl MoveResolver<u32> for LastWordResolver {
    async fn resolve(&self, text: &str, _state: &u32) -> Result<MoveToken, ResolveError> {
        if text.contains("moon") {
            return Err(ResolveError::new("no coherent move"));
        }
        text.split_whitespace()
            .last()
            .map(MoveToken::from)
            .ok_or_else(|| ResolveError::new("empty proposal"))
    }
}

/// Never answers within any reasonable deadline.
struct SlowResolver;

#[async_trait]
impl MoveResolver<u32> for SlowResolver {
    async fn resolve(&self, _text: &str, _state: &u32) -> Result<MoveToken, ResolveError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(MoveToken::new("1"))
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &SessionEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
struct BrokenSink {
    calls: AtomicUsize,
}

impl EventSink for BrokenSink {
    fn emit(&self, _event: &SessionEvent) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::new("renderer crashed"))
    }
}

struct PanickingSink;

impl EventSink for PanickingSink {
    fn emit(&self, _event: &SessionEvent) -> Result<(), SinkError> {
        panic!("renderer blew up");
    }
}

/// Claims every token is legal, then cannot apply any of them.
#[derive(Debug)]
struct InconsistentOracle;

impl RulesOracle for InconsistentOracle {
    type State = u32;

    fn initial_state(&self) -> u32 {
        0
    }

    fn is_legal(&self, _state: &u32, _token: &MoveToken) -> bool {
        true
    }

    fn apply(&self, _state: &u32, token: &MoveToken) -> Result<u32, OracleError> {
        Err(OracleError::InvalidApplication {
            token: token.clone(),
            reason: "transition table missing".to_string(),
        })
    }

    fn terminal_facts(&self, _state: &u32) -> TerminalFacts {
        TerminalFacts::none()
    }

    fn snapshot(&self, state: &u32) -> String {
        state.to_string()
    }
}

fn umpire() -> Umpire<CountingOracle, LastWordResolver> {
    Umpire::new(CountingOracle, LastWordResolver)
}

/// Captures everything a rejection must leave untouched.
fn fingerprint(session: &Session<u32>) -> (u32, Participant, Vec<String>, GameStatus) {
    (
        *session.state(),
        session.turn_holder(),
        session
            .history()
            .entries()
            .iter()
            .map(|e| e.to_string())
            .collect(),
        session.status(),
    )
}

#[tokio::test]
async fn test_turns_alternate_from_a() {
    let umpire = umpire();
    let mut session = umpire.new_session();

    let mut expected = Participant::A;
    for _ in 0..4 {
        assert_eq!(session.turn_holder(), expected);
        umpire
            .submit_move(&mut session, expected, "add 1")
            .await
            .expect("legal step");
        expected = expected.opponent();
    }

    let movers: Vec<_> = session
        .history()
        .entries()
        .iter()
        .map(|e| *e.mover())
        .collect();
    assert_eq!(
        movers,
        vec![Participant::A, Participant::B, Participant::A, Participant::B]
    );
}

#[tokio::test]
async fn test_history_numbers_are_sequential() {
    let umpire = umpire();
    let mut session = umpire.new_session();

    umpire.submit_move(&mut session, Participant::A, "2").await.unwrap();
    let _ = umpire.submit_move(&mut session, Participant::A, "2").await;
    umpire.submit_move(&mut session, Participant::B, "3").await.unwrap();
    let _ = umpire.submit_move(&mut session, Participant::A, "9").await;
    umpire.submit_move(&mut session, Participant::A, "1").await.unwrap();

    let history = session.history();
    assert_eq!(history.len(), 3);
    for (i, entry) in history.entries().iter().enumerate() {
        assert_eq!(*entry.sequence(), i + 1);
    }
    assert_eq!(history.last().unwrap().snapshot(), "6");
}

#[tokio::test]
async fn test_submission_reports_commit() {
    let umpire = umpire();
    let mut session = umpire.new_session();

    let submission = umpire
        .submit_move(&mut session, Participant::A, "play 3")
        .await
        .unwrap();

    assert_eq!(submission.token(), &MoveToken::new("3"));
    assert_eq!(*submission.entry().sequence(), 1);
    assert_eq!(*submission.entry().mover(), Participant::A);
    assert_eq!(*submission.status(), GameStatus::InProgress);
    assert_eq!(session.turn_holder(), Participant::B);
}

#[tokio::test]
async fn test_rejections_do_not_mutate() {
    let umpire = umpire();
    let mut session = umpire.new_session();
    umpire.submit_move(&mut session, Participant::A, "1").await.unwrap();
    let before = fingerprint(&session);

    let out_of_turn = umpire.submit_move(&mut session, Participant::A, "1").await;
    assert_eq!(
        out_of_turn,
        Err(SubmitError::OutOfTurn {
            expected: Participant::B,
            got: Participant::A
        })
    );
    assert_eq!(fingerprint(&session), before);

    let unresolvable = umpire
        .submit_move(&mut session, Participant::B, "fly to the moon")
        .await;
    assert!(matches!(
        unresolvable,
        Err(SubmitError::UnresolvableMove { .. })
    ));
    assert_eq!(fingerprint(&session), before);

    let illegal = umpire.submit_move(&mut session, Participant::B, "7").await;
    assert_eq!(
        illegal,
        Err(SubmitError::IllegalMove {
            token: MoveToken::new("7")
        })
    );
    assert_eq!(fingerprint(&session), before);

    // The rejected proposer still holds the turn.
    umpire.submit_move(&mut session, Participant::B, "2").await.unwrap();
    assert_eq!(*session.state(), 3);
}

#[tokio::test]
async fn test_repeated_rejection_is_stable() {
    let umpire = umpire();
    let mut session = umpire.new_session();
    let before = fingerprint(&session);

    for _ in 0..2 {
        let err = umpire
            .submit_move(&mut session, Participant::B, "1")
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::OutOfTurn { .. }));
        assert!(err.is_recoverable());
    }
    for _ in 0..2 {
        let err = umpire
            .submit_move(&mut session, Participant::A, "0")
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::IllegalMove { .. }));
    }
    assert_eq!(fingerprint(&session), before);
}

#[tokio::test]
async fn test_terminal_position_freezes_session() {
    let umpire = umpire();
    let mut session = umpire.new_session();

    // 3 + 3 + 3 + 1 = 10; B plays the last step, so A is stuck.
    for (mover, step) in [
        (Participant::A, "3"),
        (Participant::B, "3"),
        (Participant::A, "3"),
        (Participant::B, "1"),
    ] {
        umpire.submit_move(&mut session, mover, step).await.unwrap();
    }
    assert_eq!(
        session.status(),
        GameStatus::Checkmate {
            loser: Participant::A
        }
    );
    assert_eq!(session.status().winner(), Some(Participant::B));
    assert_eq!(session.turn_holder(), Participant::A);

    let frozen = fingerprint(&session);
    for proposer in [Participant::A, Participant::B] {
        let err = umpire
            .submit_move(&mut session, proposer, "1")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::SessionTerminated {
                status: GameStatus::Checkmate {
                    loser: Participant::A
                }
            }
        );
    }
    assert_eq!(fingerprint(&session), frozen);
}

#[tokio::test]
async fn test_resolver_timeout_leaves_session_untouched() {
    let umpire =
        Umpire::new(CountingOracle, SlowResolver).with_resolver_timeout(Duration::from_millis(20));
    let mut session = umpire.new_session();
    let before = fingerprint(&session);

    let err = umpire
        .submit_move(&mut session, Participant::A, "1")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SubmitError::ResolverTimeout {
            after: Duration::from_millis(20)
        }
    );
    assert_eq!(fingerprint(&session), before);
}

#[tokio::test]
async fn test_cancelled_submission_is_safe() {
    let umpire = Umpire::new(CountingOracle, SlowResolver);
    let mut session = umpire.new_session();
    let before = fingerprint(&session);

    let cancelled = tokio::time::timeout(
        Duration::from_millis(20),
        umpire.submit_move(&mut session, Participant::A, "1"),
    )
    .await;

    assert!(cancelled.is_err());
    assert_eq!(fingerprint(&session), before);
}

#[tokio::test]
async fn test_events_follow_commits() {
    let sink = Arc::new(RecordingSink::default());
    let umpire = umpire().with_sink(sink.clone());
    let mut session = umpire.new_session();

    umpire.submit_move(&mut session, Participant::A, "3").await.unwrap();
    let _ = umpire.submit_move(&mut session, Participant::A, "3").await;
    for (mover, step) in [
        (Participant::B, "3"),
        (Participant::A, "3"),
        (Participant::B, "1"),
    ] {
        umpire.submit_move(&mut session, mover, step).await.unwrap();
    }

    let events = sink.events.lock().unwrap();
    let committed = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::MoveCommitted { .. }))
        .count();
    assert_eq!(committed, 4);
    assert!(events.iter().all(|e| e.session_id() == session.id()));

    let last = events.last().unwrap();
    assert!(matches!(last, SessionEvent::SessionEnded { .. }));
    assert_eq!(*last.entry().sequence(), 4);
}

#[tokio::test]
async fn test_broken_sink_does_not_affect_outcome() {
    let sink = Arc::new(BrokenSink::default());
    let umpire = umpire().with_sink(sink.clone());
    let mut session = umpire.new_session();

    let result = umpire.submit_move(&mut session, Participant::A, "2").await;

    assert!(result.is_ok());
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_independent_sessions_run_in_parallel() {
    let umpire = Arc::new(umpire());

    let mut tasks = Vec::new();
    for step in ["1", "2"] {
        let umpire = umpire.clone();
        tasks.push(tokio::spawn(async move {
            let mut session = umpire.new_session();
            for mover in [Participant::A, Participant::B, Participant::A] {
                umpire.submit_move(&mut session, mover, step).await.unwrap();
            }
            session
        }));
    }

    let mut totals = Vec::new();
    for task in tasks {
        let session = task.await.unwrap();
        assert_eq!(session.history().len(), 3);
        totals.push(*session.state());
    }
    assert_eq!(totals, vec![3, 6]);
}

#[tokio::test]
async fn test_panicking_sink_does_not_affect_outcome() {
    let recorder = Arc::new(RecordingSink::default());
    let umpire = Arc::new(
        umpire()
            .with_sink(Arc::new(PanickingSink))
            .with_sink(recorder.clone()),
    );

    let task = tokio::spawn({
        let umpire = umpire.clone();
        async move {
            let mut session = umpire.new_session();
            let ruling = umpire.submit_move(&mut session, Participant::A, "2").await;
            (ruling, session)
        }
    });
    let (ruling, session) = task.await.expect("submission task must not panic");

    assert_eq!(*ruling.unwrap().token(), MoveToken::new("2"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.turn_holder(), Participant::B);
    // Later sinks still hear about the commit.
    assert_eq!(recorder.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_inconsistent_oracle_is_a_fatal_fault() {
    let umpire = Umpire::new(InconsistentOracle, LastWordResolver);
    let mut session = umpire.new_session();
    let before = fingerprint(&session);

    let err = umpire
        .submit_move(&mut session, Participant::A, "1")
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::InvalidApplication { .. }));
    assert!(!err.is_recoverable());
    assert_eq!(fingerprint(&session), before);
}
