use std::net::Ipv4Addr;

use crate::farm::{JobType, Request, RequestId, Worker, WorkerId};

fn req(id: u64, duration: u32) -> Request {
    Request::new(
        RequestId(id),
        Ipv4Addr::new(1, 2, 3, 4),
        Ipv4Addr::new(5, 6, 7, 8),
        duration,
        JobType::Processing,
    )
}

#[test]
fn idle_worker_tick_is_noop() {
    let mut w = Worker::new(WorkerId(1));
    assert!(w.is_available());
    assert!(!w.tick());
    assert_eq!(w.remaining(), 0);
    assert_eq!(w.completed_count(), 0);
}

#[test]
fn worker_counts_down_and_completes_on_last_tick() {
    let mut w = Worker::new(WorkerId(7));
    assert!(w.assign(req(1, 3)).is_ok());
    assert!(!w.is_available());
    assert_eq!(w.remaining(), 3);
    assert_eq!(w.current().map(|r| r.id), Some(RequestId(1)));

    assert!(!w.tick());
    assert!(!w.tick());
    assert!(w.tick());

    assert!(w.is_available());
    assert_eq!(w.completed_count(), 1);
    assert_eq!(w.remaining(), 0);
    assert!(w.current().is_none());
    assert_eq!(w.id(), WorkerId(7));
}

#[test]
fn busy_worker_rejects_and_returns_request() {
    let mut w = Worker::new(WorkerId(1));
    assert!(w.assign(req(1, 5)).is_ok());

    let rejected = w.assign(req(2, 1)).expect_err("worker is busy");
    assert_eq!(rejected.id, RequestId(2));
    // 原请求不受影响
    assert_eq!(w.current().map(|r| r.id), Some(RequestId(1)));
    assert_eq!(w.remaining(), 5);
}

#[test]
fn zero_duration_request_runs_for_one_cycle() {
    let mut w = Worker::new(WorkerId(3));
    assert!(w.assign(req(1, 0)).is_ok());
    assert!(!w.is_available());
    assert_eq!(w.remaining(), 1);
    assert_eq!(w.remaining() > 0, !w.is_available());

    assert!(w.tick());
    assert!(w.is_available());
    assert_eq!(w.remaining(), 0);
    assert_eq!(w.completed_count(), 1);
}

#[test]
fn remaining_is_positive_only_while_busy() {
    let mut w = Worker::new(WorkerId(1));
    for round in 1..=3u64 {
        assert!(w.assign(req(round, 2)).is_ok());
        while !w.is_available() {
            assert!(w.remaining() > 0);
            w.tick();
        }
        assert_eq!(w.remaining(), 0);
        assert_eq!(w.completed_count(), round);
    }
}
