use crate::sim::Cycle;

#[test]
fn cycle_next_and_interval() {
    assert_eq!(Cycle::ZERO.next(), Cycle(1));
    assert_eq!(Cycle(u64::MAX).next(), Cycle(u64::MAX));

    assert!(Cycle(500).on_interval(500));
    assert!(Cycle(1000).on_interval(500));
    assert!(!Cycle(499).on_interval(500));
    // 0 表示关闭
    assert!(!Cycle(500).on_interval(0));
}
