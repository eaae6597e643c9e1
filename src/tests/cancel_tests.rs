// src/tests/cancel_tests.rs

//! tests for `cancel.rs`

#![allow(non_snake_case)]

use crate::readers::cancel::CancelToken;

use std::thread;
use std::time::Duration;

#[test]
fn test_CancelToken_new() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn test_CancelToken_clones_share() {
    let token = CancelToken::new();
    let token2 = token.clone();
    token2.cancel();
    assert!(token.is_cancelled());
    // idempotent
    token.cancel();
    assert!(token2.is_cancelled());
}

#[test]
fn test_CancelToken_subscribe_before() {
    let token = CancelToken::new();
    let receiver = token.subscribe();
    assert!(receiver.try_recv().is_err());
    token.cancel();
    assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(()));
}

#[test]
fn test_CancelToken_subscribe_after() {
    let token = CancelToken::new();
    token.cancel();
    let receiver = token.subscribe();
    assert_eq!(receiver.try_recv(), Ok(()));
}

#[test]
fn test_CancelToken_other_thread() {
    let token = CancelToken::new();
    let receiver = token.subscribe();
    let token_ = token.clone();
    let handle = thread::spawn(move || token_.cancel());
    assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(()));
    handle.join().unwrap();
    assert!(token.is_cancelled());
}
