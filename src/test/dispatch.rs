use std::net::Ipv4Addr;

use crate::events::{RecordingSink, SimEvent};
use crate::farm::{JobType, Request, RequestId, WorkerId};
use crate::filter::AddressFilter;
use crate::sim::{Config, LoadBalancer};

fn quiet_config(servers: u32) -> Config {
    Config {
        initial_servers: servers,
        initial_queue_multiplier: 0,
        arrival_probability: 0.0,
        status_print_interval: 0,
        seed: 1,
        ..Config::default()
    }
}

fn req(id: u64, src: [u8; 4], duration: u32) -> Request {
    Request::new(
        RequestId(id),
        Ipv4Addr::from(src),
        Ipv4Addr::new(9, 9, 9, 9),
        duration,
        JobType::Processing,
    )
}

fn balancer(servers: u32) -> LoadBalancer<RecordingSink> {
    let mut lb = LoadBalancer::new(quiet_config(servers), AddressFilter::new(), RecordingSink::new());
    lb.warm_up_pool();
    lb
}

#[test]
fn submit_blocks_filtered_source_and_queues_the_rest() {
    let mut filter = AddressFilter::new();
    filter.add_range_spec("10.0.0.0/8").expect("cidr");
    let mut lb = LoadBalancer::new(quiet_config(1), filter, RecordingSink::new());

    assert!(!lb.submit(req(1, [10, 1, 2, 3], 2)));
    assert!(lb.submit(req(2, [11, 1, 2, 3], 2)));

    let stats = lb.stats();
    assert_eq!(stats.generated_requests, 2);
    assert_eq!(stats.blocked_requests, 1);
    assert_eq!(stats.accepted_requests, 1);
    assert_eq!(lb.queue().len(), 1);
    assert_eq!(lb.queue().front().map(|r| r.id), Some(RequestId(2)));

    let tags: Vec<&str> = lb.sink().events.iter().map(|(_, ev)| ev.tag()).collect();
    assert_eq!(tags, vec!["BLOCK", "QUEUED"]);
}

#[test]
fn one_pass_fills_both_idle_workers_in_fifo_order() {
    let mut lb = balancer(2);
    lb.submit(req(1, [1, 1, 1, 1], 2));
    lb.submit(req(2, [1, 1, 1, 2], 3));

    assert_eq!(lb.dispatch(), 0);
    assert!(lb.queue().is_empty());
    assert!(lb.pool().iter().all(|w| !w.is_available()));

    let assigned: Vec<(RequestId, WorkerId)> = lb
        .sink()
        .events
        .iter()
        .filter_map(|(_, ev)| match ev {
            SimEvent::Assigned { request, worker, .. } => Some((*request, *worker)),
            _ => None,
        })
        .collect();
    assert_eq!(
        assigned,
        vec![(RequestId(1), WorkerId(1)), (RequestId(2), WorkerId(2))]
    );

    // 第二次 tick 时 r1 完成，第三次 r2 完成
    assert_eq!(lb.dispatch(), 1);
    assert!(lb.pool().get(0).is_some_and(|w| w.is_available()));
    assert_eq!(lb.dispatch(), 1);
    assert!(lb.pool().iter().all(|w| w.is_available()));
    assert_eq!(lb.stats().completed_requests, 2);
}

#[test]
fn unit_duration_request_completes_in_assignment_cycle() {
    let mut lb = balancer(1);
    lb.submit(req(1, [1, 1, 1, 1], 1));

    assert_eq!(lb.dispatch(), 1);
    assert!(lb.pool().get(0).is_some_and(|w| w.is_available()));
    assert_eq!(lb.pool().get(0).map(|w| w.completed_count()), Some(1));
    assert_eq!(lb.stats().completed_requests, 1);
}

#[test]
fn busy_workers_are_skipped_and_excess_requests_wait() {
    let mut lb = balancer(2);
    lb.submit(req(1, [1, 1, 1, 1], 5));
    lb.dispatch();

    lb.submit(req(2, [1, 1, 1, 2], 5));
    lb.submit(req(3, [1, 1, 1, 3], 5));
    lb.dispatch();

    // worker 1 仍忙，r2 去 worker 2，r3 留在队列
    assert_eq!(lb.queue().len(), 1);
    assert_eq!(lb.queue().front().map(|r| r.id), Some(RequestId(3)));
    assert_eq!(
        lb.pool().get(1).and_then(|w| w.current()).map(|r| r.id),
        Some(RequestId(2))
    );
}

#[test]
fn dispatch_with_empty_queue_only_ticks() {
    let mut lb = balancer(3);
    assert_eq!(lb.dispatch(), 0);
    assert_eq!(lb.sink().count_tag("ASSIGNED"), 0);
    assert!(lb.pool().iter().all(|w| w.is_available()));
}
