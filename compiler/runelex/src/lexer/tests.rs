use std::sync::atomic::AtomicUsize;
use std::thread;
use std::time::Duration;

use super::*;
use crate::{eof, TokenKind};
use pretty_assertions::assert_eq;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Tick,
    Word,
}

/// Emits `n` empty `Tick` tokens followed by `Eof`.
fn ticks(n: usize) -> impl FnOnce(&mut Scanner<Kind>) -> Transition<Kind> + Send + 'static {
    move |s: &mut Scanner<Kind>| {
        for _ in 0..n {
            s.emit(Kind::Tick);
        }
        eof(s)
    }
}

/// One state per word, separated by single spaces.
fn words(s: &mut Scanner<Kind>) -> Transition<Kind> {
    s.ignore_runes(|c| c == ' ');
    if s.is_eof() {
        return Some(State::new(eof));
    }
    s.accept_until(' ');
    s.emit(Kind::Word);
    Some(State::new(words))
}

/// Emits forever, one token per state.
fn forever(s: &mut Scanner<Kind>) -> Transition<Kind> {
    s.emit(Kind::Tick);
    Some(State::new(forever))
}

fn wait_for(flag: &AtomicBool) -> bool {
    for _ in 0..500 {
        if flag.load(Ordering::Acquire) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

// === Pulling ===

#[test]
fn tokens_arrive_in_emission_order() {
    let mut lexer = Lexer::new("one two  three", words);
    let texts: Vec<String> = std::iter::from_fn(|| lexer.next_token())
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, ["one", "two", "three", ""]);
}

#[test]
fn positions_are_byte_offsets() {
    let tokens: Vec<Token<Kind>> = Lexer::new("äb ç", words).collect();
    assert_eq!(
        tokens,
        vec![
            Token::<Kind>::new(Kind::Word, 0, "äb"),
            Token::<Kind>::new(Kind::Word, 4, "ç"),
            Token::<Kind>::new(TokenKind::Eof, 6, ""),
        ]
    );
}

#[test]
fn closed_stream_keeps_returning_none() {
    let mut lexer = Lexer::new("", words);
    assert!(lexer.next_token().is_some_and(|t| t.is_eof()));
    for _ in 0..3 {
        assert!(lexer.next_token().is_none());
    }
}

#[test]
fn error_closes_the_stream() {
    let mut lexer = Lexer::new("x", |s: &mut Scanner<Kind>| {
        s.next();
        s.error("nope")
    });
    let token = lexer.next_token();
    assert_eq!(token, Some(Token::<Kind>::new(TokenKind::Error, 0, "nope")));
    assert_eq!(lexer.next_token(), None);
}

// === Back-pressure ===

#[test]
fn rendezvous_emit_waits_for_consumer() {
    let progressed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&progressed);
    let mut lexer = Lexer::new("", move |s: &mut Scanner<Kind>| {
        for _ in 0..3 {
            s.emit(Kind::Tick);
            counter.fetch_add(1, Ordering::AcqRel);
        }
        None
    });

    thread::sleep(Duration::from_millis(50));
    assert_eq!(progressed.load(Ordering::Acquire), 0);

    assert_eq!(lexer.by_ref().count(), 3);
    assert_eq!(progressed.load(Ordering::Acquire), 3);
}

#[test]
fn buffered_channel_lets_scanner_run_ahead() {
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    let config = LexerConfig::default().with_capacity(8);
    let lexer = Lexer::with_config(
        "",
        move |s: &mut Scanner<Kind>| {
            for _ in 0..5 {
                s.emit(Kind::Tick);
            }
            flag.store(true, Ordering::Release);
            None
        },
        &config,
    );

    assert!(wait_for(&done), "scanner should finish without a consumer");
    assert_eq!(lexer.count(), 5);
}

// === Drain ===

#[test]
fn drain_before_first_pull_finishes_scan() {
    let mut lexer = Lexer::new("", ticks(1000));
    assert_eq!(lexer.drain(), 1001);
    assert!(lexer.worker.is_none());
    assert_eq!(lexer.next_token(), None);
}

#[test]
fn drain_after_partial_consumption() {
    let mut lexer = Lexer::new("", ticks(10));
    lexer.next_token();
    lexer.next_token();
    assert_eq!(lexer.drain(), 9);
    assert_eq!(lexer.drain(), 0);
}

#[test]
fn finish_reports_clean_scan() {
    let lexer = Lexer::new("a b", words);
    assert!(lexer.finish().is_ok());
}

// === Cancellation ===

#[test]
fn cancel_stops_endless_grammar() {
    let mut lexer = Lexer::new("", forever);
    assert!(lexer.next_token().is_some());
    assert!(lexer.cancel().is_ok());
}

#[test]
fn cancel_interrupts_emit_loop_within_a_state() {
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopped);
    let mut lexer = Lexer::new("", move |s: &mut Scanner<Kind>| {
        while !s.is_cancelled() {
            s.emit(Kind::Tick);
        }
        flag.store(true, Ordering::Release);
        None
    });
    // The first token proves the state is running.
    assert!(lexer.next_token().is_some());
    assert!(lexer.cancel().is_ok());
    assert!(stopped.load(Ordering::Acquire));
}

#[test]
fn cancel_skips_remaining_states() {
    let reached = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&reached);
    let lexer = Lexer::new("", move |s: &mut Scanner<Kind>| {
        s.emit(Kind::Tick);
        Some(State::new(move |_: &mut Scanner<Kind>| {
            flag.store(true, Ordering::Release);
            None
        }))
    });
    assert!(lexer.cancel().is_ok());
    assert!(!reached.load(Ordering::Acquire));
}

#[test]
fn dropping_lexer_releases_producer() {
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopped);
    let mut lexer = Lexer::new("", move |s: &mut Scanner<Kind>| {
        while !s.is_cancelled() {
            s.emit(Kind::Tick);
        }
        flag.store(true, Ordering::Release);
        None
    });
    assert!(lexer.next_token().is_some());
    drop(lexer);
    assert!(wait_for(&stopped), "producer should exit after the consumer is dropped");
}

// === Failures ===

#[test]
fn grammar_panic_is_reported_by_finish() {
    let lexer = Lexer::new("", |_: &mut Scanner<Kind>| -> Transition<Kind> {
        panic!("grammar bug")
    });
    match lexer.finish() {
        Err(LexError::Panicked { message }) => assert_eq!(message, "grammar bug"),
        other => panic!("expected panic report, got {other:?}"),
    }
}

#[test]
fn grammar_panic_is_reported_by_collect() {
    let lexer = Lexer::new("", |s: &mut Scanner<Kind>| -> Transition<Kind> {
        s.emit(Kind::Tick);
        panic!("halfway: {}", 50)
    });
    match lexer.collect_tokens() {
        Err(LexError::Panicked { message }) => assert_eq!(message, "halfway: 50"),
        other => panic!("expected panic report, got {other:?}"),
    }
}

#[test]
fn collect_without_eof_is_truncated() {
    let lexer = Lexer::new("ab", |s: &mut Scanner<Kind>| {
        s.accept_run('a'..='z');
        s.emit(Kind::Word);
        None
    });
    assert!(matches!(lexer.collect_tokens(), Err(LexError::Truncated)));
}

#[test]
fn collect_returns_tokens_through_eof() {
    let tokens = Lexer::new("x y", words).collect_tokens();
    let kinds: Vec<TokenKind<Kind>> = tokens
        .map(|tokens| tokens.into_iter().map(|t| t.kind).collect())
        .unwrap_or_default();
    assert_eq!(
        kinds,
        [
            TokenKind::Custom(Kind::Word),
            TokenKind::Custom(Kind::Word),
            TokenKind::Eof,
        ]
    );
}

// === Configuration ===

#[test]
fn scanner_runs_on_named_thread() {
    let config = LexerConfig::default().with_thread_name("calc-scanner");
    let lexer = Lexer::with_config(
        "",
        |s: &mut Scanner<Kind>| {
            let name = thread::current().name().unwrap_or_default().to_owned();
            s.error(name)
        },
        &config,
    );
    match lexer.collect_tokens() {
        Err(LexError::Scan { message, .. }) => assert_eq!(message, "calc-scanner"),
        other => panic!("expected scan error, got {other:?}"),
    }
}

#[test]
fn try_new_starts_scan() {
    let lexer = Lexer::try_new("", ticks(0));
    assert!(lexer.is_ok_and(|l| l.finish().is_ok()));
}
