use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use voltview::acquisition::{AcquisitionHandle, Control, Notice};
use voltview::app::Event;
use voltview::source::{IncompatibleSource, ManualSource};
use voltview::viewport::Viewport;
use volttools::cfg::MeasurementUnit;
use volttools::pin::Pin;

fn test_pins(count: usize, capacity: usize) -> Arc<Mutex<Vec<Pin>>> {
    let pins: Vec<Pin> = (0..count)
        .map(|i| {
            let mut pin = Pin::new(31 + i as u8, 0x9c27b0);
            pin.set_max_datapoints(capacity);
            pin
        })
        .collect();
    Arc::new(Mutex::new(pins))
}

/// Block until a notice matching the predicate arrives, skipping others.
fn wait_for(rx: &flume::Receiver<Event>, want: fn(&Notice) -> bool) -> Notice {
    loop {
        match rx
            .recv_timeout(Duration::from_secs(5))
            .expect("expected notice before timeout")
        {
            Event::Acquisition(notice) if want(&notice) => return notice,
            _ => {}
        }
    }
}

#[test]
fn samples_land_in_every_pin_in_lockstep() {
    let pins = test_pins(3, 100);
    let viewport = Arc::new(Viewport::new(5.0, 0.005));
    let (tx, rx) = flume::unbounded();

    // Three pins, four full scans, then the source dries up.
    let source = ManualSource::new((0..12).map(|i| i as f64));
    let handle = AcquisitionHandle::new(
        Box::new(source),
        pins.clone(),
        viewport,
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::Disconnected));

    {
        let pins = pins.lock();
        assert!(pins.iter().all(|p| p.len() == 4));
        // Scan k reads the pins in board order.
        assert_eq!(pins[0].voltage(0), Some(0.0));
        assert_eq!(pins[1].voltage(0), Some(1.0));
        assert_eq!(pins[2].voltage(0), Some(2.0));
        assert_eq!(pins[0].voltage(3), Some(9.0));

        // Every pin carries the same timestamps, non-decreasing.
        for step in 0..4 {
            let t = pins[0].time(step);
            assert!(pins.iter().all(|p| p.time(step) == t));
        }
        let times: Vec<f64> = (0..4).map(|i| pins[0].time(i).unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}

#[test]
fn incompatible_source_refuses_to_start() {
    let pins = test_pins(1, 10);
    let viewport = Arc::new(Viewport::new(5.0, 0.005));
    let (tx, rx) = flume::unbounded();

    let handle = AcquisitionHandle::new(
        Box::new(IncompatibleSource),
        pins.clone(),
        viewport,
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Incompatible));
    handle.sender.send(Control::Start).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::NotConnected));
    assert!(pins.lock()[0].is_empty());

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}

#[test]
fn reconnect_after_disconnect() {
    let pins = test_pins(1, 10);
    let viewport = Arc::new(Viewport::new(5.0, 0.005));
    let (tx, rx) = flume::unbounded();

    let source = ManualSource::new(vec![1.0]);
    let handle = AcquisitionHandle::new(
        Box::new(source),
        pins.clone(),
        viewport,
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::Disconnected));

    // The handshake itself still succeeds, so the loop goes back to
    // paused and a start is accepted again.
    handle.sender.send(Control::Connect).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();
    // The drained source immediately fails the next scan.
    wait_for(&rx, |n| matches!(n, Notice::Disconnected));
    // Data measured before the first disconnect is still there.
    assert_eq!(pins.lock()[0].len(), 1);

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}

#[test]
fn clear_wipes_series_and_rewinds_time() {
    let pins = test_pins(1, 100);
    let viewport = Arc::new(Viewport::new(5.0, 0.005));
    let (tx, rx) = flume::unbounded();

    let source = ManualSource::new(vec![1.0, 2.0, 3.0]);
    let handle = AcquisitionHandle::new(
        Box::new(source),
        pins.clone(),
        viewport,
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::Disconnected));
    assert_eq!(pins.lock()[0].len(), 3);

    handle.sender.send(Control::Clear).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !pins.lock()[0].is_empty() {
        assert!(Instant::now() < deadline, "clear never landed");
        thread::sleep(Duration::from_millis(10));
    }

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}

#[test]
fn viewport_follows_the_data() {
    let pins = test_pins(1, 1000);
    // A tiny window so a short run is guaranteed to outgrow it.
    let viewport = Arc::new(Viewport::new(0.001, 0.005));
    let (tx, rx) = flume::unbounded();

    let source = ManualSource::new((0..20).map(|i| i as f64));
    let handle = AcquisitionHandle::new(
        Box::new(source),
        pins.clone(),
        viewport.clone(),
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();
    wait_for(&rx, |n| matches!(n, Notice::Disconnected));

    // The first sample already sits at the right edge, so the window
    // must have moved; its width never changes.
    let (min, max) = viewport.range();
    assert!(max > 0.001);
    assert!((max - min - 0.001).abs() < 1e-12);

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}

#[test]
fn concurrent_appends_and_range_changes() {
    let pins = test_pins(2, 50);
    let viewport = Arc::new(Viewport::new(5.0, 0.005));
    let (tx, rx) = flume::unbounded();

    // 200 scans of 2 pins; far more than the series capacity.
    let source = ManualSource::new((0..400).map(|i| i as f64));
    let handle = AcquisitionHandle::new(
        Box::new(source),
        pins.clone(),
        viewport.clone(),
        5,
        MeasurementUnit::Ms,
        tx,
    );

    wait_for(&rx, |n| matches!(n, Notice::Connected));
    handle.sender.send(Control::Start).unwrap();

    let (view, _rx_range) = viewport.subscribe();
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut disconnected = false;
    let mut step = 0u64;
    while !disconnected {
        assert!(Instant::now() < deadline, "source never drained");
        while let Ok(event) = rx.try_recv() {
            if let Event::Acquisition(Notice::Disconnected) = event {
                disconnected = true;
            }
        }
        // Hammer the shared state from this thread while the acquisition
        // thread appends.
        viewport.on_user_range_changed(view, 0.0, 5.0 + (step % 7) as f64);
        {
            let pins = pins.lock();
            for pin in pins.iter() {
                assert!(pin.len() <= 50);
            }
        }
        step += 1;
        thread::sleep(Duration::from_millis(1));
    }

    let pins = pins.lock();
    assert!(pins.iter().all(|p| p.len() == 50));

    handle.sender.send(Control::Shutdown).unwrap();
    handle.join_handle.join().unwrap();
}
