use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::app::Event;

/// Repaint cadence while measuring.
const REFRESH: Duration = Duration::from_millis(100);
/// Idle poll while paused; no refreshes are sent, just a cheap sleep.
const PAUSED_POLL: Duration = Duration::from_millis(200);

pub fn main(tx_event: flume::Sender<Event>, paused: Arc<AtomicBool>) -> Result<()> {
    let _ = thread::spawn(move || loop {
        if paused.load(Ordering::Relaxed) {
            thread::sleep(PAUSED_POLL);
            continue;
        }
        if tx_event.send(Event::Refresh).is_err() {
            break;
        }
        thread::sleep(REFRESH);
    });
    Ok(())
}
