use std::net::Ipv4Addr;

use crate::events::{RecordingSink, ScaleInfo, SimEvent};
use crate::farm::{JobType, Request, RequestId, WorkerPool};
use crate::scale::{Autoscaler, ScaleDecision, ScalingPolicy};
use crate::sim::{Cycle, SimulationStats};

fn policy(cooldown: u32) -> ScalingPolicy {
    ScalingPolicy {
        min_queue_per_worker: 50,
        max_queue_per_worker: 80,
        cooldown_cycles: cooldown,
    }
}

fn pool_of(n: usize) -> WorkerPool {
    let mut pool = WorkerPool::new();
    for _ in 0..n {
        pool.add_worker();
    }
    pool
}

fn busy_all(pool: &mut WorkerPool) {
    for (i, w) in pool.iter_mut().enumerate() {
        let r = Request::new(
            RequestId(i as u64 + 1),
            Ipv4Addr::new(1, 1, 1, 1),
            Ipv4Addr::new(2, 2, 2, 2),
            10,
            JobType::Processing,
        );
        assert!(w.assign(r).is_ok());
    }
}

#[test]
fn scales_up_once_then_respects_cooldown() {
    let mut scaler = Autoscaler::new(policy(3));
    let mut pool = pool_of(2);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    let d = scaler.balance(Cycle(1), 200, &mut pool, &mut stats, &mut sink);
    assert_eq!(d, ScaleDecision::ScaledUp);
    assert_eq!(pool.len(), 3);
    assert_eq!(stats.added_servers, 1);
    assert_eq!(scaler.cooldown(), 3);
    assert_eq!(
        sink.events,
        vec![(
            Cycle(1),
            SimEvent::ScaleUp(ScaleInfo {
                queue: 200,
                threshold: 160,
                workers: 3
            })
        )]
    );

    // 冷却期内无论队列多深都不再伸缩
    for (i, expect_cd) in [2u32, 1, 0].into_iter().enumerate() {
        let d = scaler.balance(Cycle(2 + i as u64), 10_000, &mut pool, &mut stats, &mut sink);
        assert_eq!(d, ScaleDecision::Cooling);
        assert_eq!(scaler.cooldown(), expect_cd);
    }
    assert_eq!(pool.len(), 3);
    assert_eq!(stats.added_servers, 1);

    let d = scaler.balance(Cycle(5), 10_000, &mut pool, &mut stats, &mut sink);
    assert_eq!(d, ScaleDecision::ScaledUp);
    assert_eq!(pool.len(), 4);
}

#[test]
fn queue_at_threshold_boundaries_holds() {
    let mut scaler = Autoscaler::new(policy(5));
    let mut pool = pool_of(2);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    assert_eq!(
        scaler.balance(Cycle(1), 160, &mut pool, &mut stats, &mut sink),
        ScaleDecision::Hold
    );
    assert_eq!(
        scaler.balance(Cycle(2), 100, &mut pool, &mut stats, &mut sink),
        ScaleDecision::Hold
    );
    assert_eq!(pool.len(), 2);
    assert_eq!(scaler.cooldown(), 0);
    assert!(sink.events.is_empty());
}

#[test]
fn scales_down_removing_newest_idle_worker() {
    let mut scaler = Autoscaler::new(policy(4));
    let mut pool = pool_of(3);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    let d = scaler.balance(Cycle(9), 10, &mut pool, &mut stats, &mut sink);
    assert_eq!(d, ScaleDecision::ScaledDown);
    assert_eq!(pool.len(), 2);
    assert_eq!(stats.removed_servers, 1);
    assert_eq!(scaler.cooldown(), 4);
    assert_eq!(sink.count_tag("SCALE DOWN"), 1);
    match &sink.events[0].1 {
        SimEvent::ScaleDown(info) => {
            assert_eq!(info.threshold, 150);
            assert_eq!(info.workers, 2);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn never_shrinks_below_one_worker() {
    let mut scaler = Autoscaler::new(policy(0));
    let mut pool = pool_of(1);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    for c in 1..=5 {
        let d = scaler.balance(Cycle(c), 0, &mut pool, &mut stats, &mut sink);
        assert_eq!(d, ScaleDecision::Hold);
    }
    assert_eq!(pool.len(), 1);
    assert_eq!(stats.removed_servers, 0);
}

#[test]
fn all_busy_pool_is_not_shrunk_and_cooldown_untouched() {
    let mut scaler = Autoscaler::new(policy(7));
    let mut pool = pool_of(2);
    busy_all(&mut pool);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    let d = scaler.balance(Cycle(1), 0, &mut pool, &mut stats, &mut sink);
    assert_eq!(d, ScaleDecision::NoIdleWorker);
    assert_eq!(pool.len(), 2);
    assert_eq!(stats.removed_servers, 0);
    assert_eq!(scaler.cooldown(), 0);
    assert!(sink.events.is_empty());
}

#[test]
fn zero_cooldown_allows_scaling_every_cycle() {
    let mut scaler = Autoscaler::new(policy(0));
    let mut pool = pool_of(1);
    let mut stats = SimulationStats::default();
    let mut sink = RecordingSink::new();

    for _ in 0..3 {
        scaler.balance(Cycle(1), 1_000, &mut pool, &mut stats, &mut sink);
    }
    assert_eq!(pool.len(), 4);
    assert_eq!(stats.added_servers, 3);
}
