use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use voltview::acquisition::{Control, Notice};
use voltview::app::{self, App};
use voltview::save::SaveMessage;
use voltview::viewport::Viewport;
use volttools::cfg::{MeasurementUnit, Settings, ViewMode, MIN_NUM_DATAPOINTS};

fn wired_app() -> (
    App,
    flume::Receiver<Control>,
    flume::Receiver<SaveMessage>,
) {
    let settings = Settings::default();
    let pins = Arc::new(Mutex::new(app::pins_from_settings(&settings)));
    let viewport = Arc::new(Viewport::new(
        settings.time_range,
        settings.interval_secs(),
    ));
    let (tx_acq, rx_acq) = flume::unbounded();
    let (tx_save, rx_save) = flume::unbounded();
    let app = App::new(
        settings,
        PathBuf::from("exports"),
        pins,
        viewport,
        tx_acq,
        tx_save,
    );
    (app, rx_acq, rx_save)
}

#[test]
fn start_is_refused_until_connected() {
    let (mut app, rx_acq, _rx_save) = wired_app();

    app.set_paused(false);
    assert!(app.is_paused());
    assert!(rx_acq.try_recv().is_err());

    app.reconnect();
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Connect)));

    app.on_notice(Notice::Connected);
    app.set_paused(false);
    assert!(!app.is_paused());
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Start)));
}

#[test]
fn disconnect_forces_a_pause() {
    let (mut app, rx_acq, _rx_save) = wired_app();
    app.on_notice(Notice::Connected);
    app.set_paused(false);
    let _ = rx_acq.try_recv();

    app.on_notice(Notice::Disconnected);
    assert!(app.is_paused());
    assert!(!app.connected);
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Pause)));
}

#[test]
fn capacity_change_pauses_and_restores() {
    let (mut app, rx_acq, _rx_save) = wired_app();
    app.on_notice(Notice::Connected);
    app.set_paused(false);
    let _ = rx_acq.try_recv();

    // Clamped up to the minimum, applied to every pin.
    app.set_max_datapoints(0);
    assert_eq!(app.settings.num_datapoints, MIN_NUM_DATAPOINTS);
    assert!(app
        .pins
        .lock()
        .iter()
        .all(|p| p.series().capacity() == MIN_NUM_DATAPOINTS));

    // Paused for the change, then restored to running.
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Pause)));
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Start)));
    assert!(!app.is_paused());
}

#[test]
fn clear_rewinds_the_window_and_orders_controls() {
    let (mut app, rx_acq, _rx_save) = wired_app();
    app.on_notice(Notice::Connected);
    app.set_paused(false);
    let _ = rx_acq.try_recv();

    app.on_notice(Notice::Sample { elapsed: 42.0 });
    assert_eq!(app.time, 42.0);

    app.clear();
    assert_eq!(app.time, 0.0);
    assert_eq!(app.viewport.range(), (0.0, 5.0));
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Pause)));
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Clear)));
    assert!(matches!(rx_acq.try_recv(), Ok(Control::Start)));
}

#[test]
fn interval_change_reshapes_the_window() {
    let (mut app, rx_acq, _rx_save) = wired_app();
    app.on_notice(Notice::Sample { elapsed: 100.0 });

    // Clamped down to 200; span = max(5, 0.2 * 100), overhang = 0.2 * 20.
    app.set_measurement_interval(1000);
    assert_eq!(app.settings.measurement_interval, 200);
    assert_eq!(app.viewport.range(), (84.0, 104.0));
    assert!(matches!(
        rx_acq.try_recv(),
        Ok(Control::SetInterval {
            interval: 200,
            unit: MeasurementUnit::Ms
        })
    ));

    // A unit change resends the interval and reshapes again.
    app.set_measurement_unit(MeasurementUnit::Sec);
    assert!(matches!(
        rx_acq.try_recv(),
        Ok(Control::SetInterval {
            interval: 200,
            unit: MeasurementUnit::Sec
        })
    ));
}

#[test]
fn snapshot_records_pin_metadata_and_window_width() {
    let (mut app, _rx_acq, _rx_save) = wired_app();
    {
        let mut pins = app.pins.lock();
        pins[0].label = String::from("battery");
        pins[0].visible = false;
    }
    app.switch_view();
    app.set_settings_visible(false);

    let snap = app.settings_snapshot();
    assert_eq!(snap.view_mode, ViewMode::Grid);
    assert!(!snap.settings_visible);
    assert_eq!(snap.time_range, 5.0);
    assert_eq!(snap.pins.len(), volttools::NUM_PINS);
    assert_eq!(snap.pins[0].label.as_deref(), Some("battery"));
    assert_eq!(snap.pins[0].visible, Some(false));
    assert!(snap.timestamp.is_some());
}

#[test]
fn export_request_reaches_the_save_worker() {
    let (mut app, _rx_acq, rx_save) = wired_app();
    app.start_export();
    assert!(matches!(rx_save.try_recv(), Ok(SaveMessage::Save(_))));
}

#[test]
fn restored_pins_keep_their_metadata() {
    let mut settings = Settings::default();
    settings.pins.push(volttools::cfg::PinSettings {
        number: 31,
        visible: Some(false),
        label: Some(String::from("sense")),
        color: Some(0x123456),
    });

    let pins = app::pins_from_settings(&settings);
    assert_eq!(pins.len(), volttools::NUM_PINS);
    assert!(!pins[0].visible);
    assert_eq!(pins[0].label, "sense");
    assert_eq!(pins[0].color, 0x123456);
    // Unsaved pins cycle the palette.
    assert_eq!(pins[1].color, volttools::pin::PLOT_COLORS[0]);
}
