use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use peer_connect_four::error::{ChannelError, SnapshotError, SyncError};
use peer_connect_four::game::{
    BoardEvent, Game, GameEvent, GameOverEvent, Owner, Side, DRAW_THRESHOLD,
};
use peer_connect_four::sync::{
    CancelToken, Channel, GameState, JsonCodec, MemoryChannel, ReceiveOptions, SnapshotCodec,
    SnapshotPolicy, SyncPhase, Synchronizer, TcpChannel,
};

/// Fills the board without a four in a row, alternating from PlayerOne.
const DRAW_SEQUENCE: [usize; 42] = [
    6, 4, 6, 2, 3, 0, 0, 2, 1, 6, 6, 2, 4, 6, 4, 5, 3, 6, 1, 5, 1, 3, 0, 5, 2, 1, 2, 0, 2, 3, 5,
    4, 1, 1, 4, 3, 5, 4, 3, 5, 0, 0,
];

fn bounded(timeout: Duration) -> ReceiveOptions {
    ReceiveOptions {
        timeout: Some(timeout),
        poll_interval: Duration::from_millis(5),
        cancel: CancelToken::new(),
    }
}

fn peer(channel: impl Channel + 'static, local: Side) -> (Game, Receiver<GameEvent>) {
    let sync = Synchronizer::new(channel).with_receive_options(bounded(Duration::from_secs(5)));
    let (tx, rx) = mpsc::channel::<GameEvent>();
    let game = Game::networked("alice", "bob", local, sync).with_events(tx);
    (game, rx)
}

fn play_side(mut game: Game, columns: Vec<usize>) -> Game {
    game.start().unwrap();
    for column in columns {
        assert!(game.make_move(column).unwrap(), "column {column} refused");
    }
    game
}

fn game_overs(rx: &Receiver<GameEvent>) -> Vec<GameOverEvent> {
    rx.try_iter()
        .filter_map(|event| match event {
            GameEvent::GameOver(over) => Some(over),
            _ => None,
        })
        .collect()
}

fn synced_states(rx: &Receiver<GameEvent>) -> Vec<GameState> {
    rx.try_iter()
        .filter_map(|event| match event {
            GameEvent::Board(BoardEvent::Synced(state)) => Some(state),
            _ => None,
        })
        .collect()
}

/// State after each move of `moves`, played on one hotseat board.
fn states_after_each_move(moves: &[usize]) -> Vec<GameState> {
    let mut game = Game::new("alice", "bob");
    moves
        .iter()
        .map(|&column| {
            assert!(game.make_move(column).unwrap());
            game.snapshot()
        })
        .collect()
}

/// Every snapshot a peer received must equal the mover's state right after
/// that move.
fn assert_converged_each_move(moves: &[usize]) {
    let (a, b) = MemoryChannel::pair();
    let ((one, rx_one), (two, rx_two)) = run_pair(
        peer(a, Side::PlayerOne),
        peer(b, Side::PlayerTwo),
        moves,
    );
    let expected = states_after_each_move(moves);

    let from_one: Vec<GameState> = expected.iter().step_by(2).copied().collect();
    let from_two: Vec<GameState> = expected.iter().skip(1).step_by(2).copied().collect();
    assert_eq!(synced_states(&rx_two), from_one);
    assert_eq!(synced_states(&rx_one), from_two);

    let last = expected.last().copied();
    assert_eq!(Some(one.snapshot()), last);
    assert_eq!(Some(two.snapshot()), last);
}

/// Split an alternating move list into (PlayerOne's columns, PlayerTwo's columns).
fn split_turns(moves: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let ones = moves.iter().step_by(2).copied().collect();
    let twos = moves.iter().skip(1).step_by(2).copied().collect();
    (ones, twos)
}

fn run_pair(
    one: (Game, Receiver<GameEvent>),
    two: (Game, Receiver<GameEvent>),
    moves: &[usize],
) -> ((Game, Receiver<GameEvent>), (Game, Receiver<GameEvent>)) {
    let (ones, twos) = split_turns(moves);
    let (game_one, rx_one) = one;
    let (game_two, rx_two) = two;

    let first = thread::spawn(move || play_side(game_one, ones));
    let second = thread::spawn(move || play_side(game_two, twos));

    ((first.join().unwrap(), rx_one), (second.join().unwrap(), rx_two))
}

#[test]
fn test_peers_converge_on_vertical_win() {
    let (a, b) = MemoryChannel::pair();
    let ((one, rx_one), (two, rx_two)) = run_pair(
        peer(a, Side::PlayerOne),
        peer(b, Side::PlayerTwo),
        &[3, 0, 3, 0, 3, 0, 3],
    );

    assert_eq!(one.snapshot(), two.snapshot());
    assert_eq!(one.winner(), Owner::PlayerOne);
    assert_eq!(one.phase(), Some(SyncPhase::GameOver));
    assert_eq!(two.phase(), Some(SyncPhase::GameOver));

    let win = GameOverEvent::Win {
        player: "alice".into(),
        side: Side::PlayerOne,
    };
    assert_eq!(game_overs(&rx_one), vec![win.clone()]);
    assert_eq!(game_overs(&rx_two), vec![win]);
}

#[test]
fn test_peers_converge_on_draw() {
    let (a, b) = MemoryChannel::pair();
    let ((one, rx_one), (two, rx_two)) = run_pair(
        peer(a, Side::PlayerOne),
        peer(b, Side::PlayerTwo),
        &DRAW_SEQUENCE,
    );

    assert_eq!(one.snapshot(), two.snapshot());
    assert_eq!(one.move_counter(), DRAW_THRESHOLD);
    assert_eq!(one.winner(), Owner::None);
    assert_eq!(game_overs(&rx_one), vec![GameOverEvent::Draw]);
    assert_eq!(game_overs(&rx_two), vec![GameOverEvent::Draw]);
}

#[test]
fn test_peers_agree_after_every_move_to_win() {
    assert_converged_each_move(&[3, 0, 3, 0, 3, 0, 3]);
}

#[test]
fn test_peers_agree_after_every_move_to_draw() {
    assert_converged_each_move(&DRAW_SEQUENCE);
}

#[test]
fn test_peers_converge_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let joiner = thread::spawn(move || TcpChannel::connect(addr, 64 * 1024).unwrap());
    let host = TcpChannel::accept(&listener, 64 * 1024, &bounded(Duration::from_secs(5))).unwrap();
    let guest = joiner.join().unwrap();

    let ((one, _), (two, rx_two)) = run_pair(
        peer(host, Side::PlayerOne),
        peer(guest, Side::PlayerTwo),
        &[0, 0, 1, 1, 2, 2, 3],
    );

    assert_eq!(one.snapshot(), two.snapshot());
    assert_eq!(two.winner(), Owner::PlayerOne);
    assert_eq!(two.board().get(3, 0), Owner::PlayerOne);
    assert_eq!(game_overs(&rx_two).len(), 1);
}

#[test]
fn test_local_move_refused_while_peer_on_turn() {
    let (a, _b) = MemoryChannel::pair();
    let (mut two, rx) = peer(a, Side::PlayerTwo);

    assert!(!two.is_local_turn());
    assert!(!two.make_move(3).unwrap());
    assert_eq!(two.board().token_count(), 0);
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn test_silent_peer_times_out() {
    let (a, _b) = MemoryChannel::pair();
    let sync = Synchronizer::new(a).with_receive_options(bounded(Duration::from_millis(50)));
    let mut one = Game::networked("alice", "bob", Side::PlayerOne, sync);

    let err = one.make_move(2).unwrap_err();
    assert!(err.is_timeout());
    // The local move stands; only the exchange failed.
    assert_eq!(one.board().get(2, 0), Owner::PlayerOne);
    assert_eq!(one.phase(), Some(SyncPhase::WaitingForPeer));
}

#[test]
fn test_cancel_token_aborts_waiting_start() {
    let (a, _b) = MemoryChannel::pair();
    let sync = Synchronizer::new(a).with_receive_options(ReceiveOptions {
        timeout: None,
        poll_interval: Duration::from_millis(5),
        cancel: CancelToken::new(),
    });
    let mut two = Game::networked("alice", "bob", Side::PlayerTwo, sync);
    let cancel = two.cancel_token().unwrap();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        cancel.cancel();
    });
    let err = two.start().unwrap_err();
    assert!(matches!(err, SyncError::Channel(ChannelError::Cancelled)));
    canceller.join().unwrap();
}

#[test]
fn test_trusting_peer_applies_snapshot_verbatim() {
    let (mut raw, b) = MemoryChannel::pair();
    let (mut two, rx) = peer(b, Side::PlayerTwo);

    // Empty board claiming to be full: accepted as a draw.
    let mut bogus = GameState::initial(Side::PlayerTwo);
    bogus.move_counter = DRAW_THRESHOLD;
    raw.send(&JsonCodec.encode(&bogus).unwrap()).unwrap();

    two.start().unwrap();
    assert_eq!(two.snapshot(), bogus);
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&GameEvent::Board(BoardEvent::Synced(bogus))));
    assert!(events.contains(&GameEvent::GameOver(GameOverEvent::Draw)));
}

#[test]
fn test_trusting_peer_counter_past_threshold_is_not_a_draw() {
    let (mut raw, b) = MemoryChannel::pair();
    let (mut two, rx) = peer(b, Side::PlayerTwo);

    let mut bogus = GameState::initial(Side::PlayerTwo);
    bogus.move_counter = DRAW_THRESHOLD + 1;
    raw.send(&JsonCodec.encode(&bogus).unwrap()).unwrap();

    two.start().unwrap();
    assert_eq!(two.move_counter(), DRAW_THRESHOLD + 1);
    assert!(!two.is_over());
    assert!(two.is_local_turn());
    assert!(game_overs(&rx).is_empty());
}

#[test]
fn test_trusting_peer_counter_saturates() {
    let (mut raw, b) = MemoryChannel::pair();
    let (mut two, _rx) = peer(b, Side::PlayerTwo);

    let mut bogus = GameState::initial(Side::PlayerTwo);
    bogus.move_counter = u8::MAX;
    raw.send(&JsonCodec.encode(&bogus).unwrap()).unwrap();
    two.start().unwrap();

    // Queue the reply so the exchange after the move completes.
    raw.send(&JsonCodec.encode(&bogus).unwrap()).unwrap();
    assert!(two.make_move(0).unwrap());

    let pushed = raw.receive(&bounded(Duration::from_secs(5))).unwrap();
    let pushed = JsonCodec.decode(&pushed).unwrap();
    assert_eq!(pushed.move_counter, u8::MAX);
    assert_eq!(pushed.board.get(0, 0), Owner::PlayerTwo);
}

#[test]
fn test_strict_peer_rejects_malformed_snapshot() {
    let (mut raw, b) = MemoryChannel::pair();
    let sync = Synchronizer::new(b)
        .with_policy(SnapshotPolicy::Strict)
        .with_receive_options(bounded(Duration::from_secs(5)));
    let mut two = Game::networked("alice", "bob", Side::PlayerTwo, sync);

    let mut bogus = GameState::initial(Side::PlayerTwo);
    bogus.move_counter = DRAW_THRESHOLD;
    raw.send(&JsonCodec.encode(&bogus).unwrap()).unwrap();

    let err = two.start().unwrap_err();
    assert!(matches!(err, SyncError::Snapshot(SnapshotError::Malformed(_))));
    assert_eq!(two.move_counter(), 1);
}

#[test]
fn test_rematch_across_peers_loser_starts() {
    let (a, b) = MemoryChannel::pair();
    let ((mut one, _), (mut two, _)) = run_pair(
        peer(a, Side::PlayerOne),
        peer(b, Side::PlayerTwo),
        &[3, 0, 3, 0, 3, 0, 3],
    );

    let first = thread::spawn(move || {
        one.setup_new_game();
        assert_eq!(one.active_side(), Side::PlayerTwo);
        // The loser moves first, so the winner waits for its snapshot.
        one.start().unwrap();
        one
    });
    let second = thread::spawn(move || {
        two.setup_new_game();
        assert!(two.is_local_turn());
        two.start().unwrap();
        let result = two.make_move(6);
        (two, result)
    });

    let one = first.join().unwrap();
    assert_eq!(one.board().get(6, 0), Owner::PlayerTwo);
    assert_eq!(one.active_side(), Side::PlayerOne);
    assert_eq!(one.phase(), Some(SyncPhase::LocalTurn));
    drop(one);

    // The winner left without answering, so the loser's pull sees a closed link.
    let (two, result) = second.join().unwrap();
    assert!(matches!(result, Err(SyncError::Channel(ChannelError::Closed))));
    assert_eq!(two.board().get(6, 0), Owner::PlayerTwo);
}
