mod common;

use std::sync::Arc;
use std::thread;

use netvakt_core::time::SystemClock;
use netvakt_detection::HeuristicModel;
use netvakt_engine::{Monitor, Shutdown};
use netvakt_simulator::SyntheticSource;

use common::{fast_settings, wait_until};

const READERS: usize = 8;
const READS_PER_READER: usize = 125;

#[test]
fn concurrent_readers_never_see_torn_statistics() {
    let source = SyntheticSource::new(42, Arc::new(SystemClock)).with_threat_probability(0.5);
    let mut settings = fast_settings();
    settings.monitor.buffer_capacity = 64;
    let monitor = Arc::new(
        Monitor::builder(Arc::new(source))
            .settings(settings)
            .model(Arc::new(HeuristicModel::new()))
            .build()
            .unwrap(),
    );

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_statistics().total_events > 0));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let mut previous = monitor.get_statistics();
                for _ in 0..READS_PER_READER {
                    let stats = monitor.get_statistics();
                    assert!(stats.threats_detected <= stats.total_events);
                    assert!(stats.total_events >= previous.total_events);
                    assert!(stats.threats_detected >= previous.threats_detected);

                    let alerts = monitor.get_recent_alerts(5);
                    assert!(alerts.len() <= 5);
                    assert!(monitor.get_recent_events(100).len() <= 64);
                    monitor.get_traffic_metrics_default();
                    previous = stats;
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    assert_eq!(monitor.stop(), Shutdown::Clean);
    let stats = monitor.get_statistics();
    assert!(stats.total_events > 0);
    assert!(stats.threats_detected > 0 || stats.total_events < 10);
}

#[test]
fn monitors_do_not_share_statistics() {
    let build = |seed| {
        Monitor::builder(Arc::new(SyntheticSource::new(seed, Arc::new(SystemClock))))
            .settings(fast_settings())
            .build()
            .unwrap()
    };
    let running = build(1);
    let idle = build(2);

    running.start().unwrap();
    assert!(wait_until(|| running.get_statistics().total_events >= 3));
    running.stop();

    assert_eq!(idle.get_statistics().total_events, 0);
}
