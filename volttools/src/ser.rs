//! Serialization of measured series to `.csv`

use std::io::Write;

use itertools::Itertools;

use crate::error::MeterError;
use crate::pin::Pin;

/// Write a `time/s,v31/V,v32/V,...` header followed by one row per sample
/// index: the time of that step, then each pin's voltage.
///
/// Every pin must hold the same number of samples or this fails with
/// [`MeterError::MisalignedSeries`]; the acquisition loop appends to all
/// pins in lockstep, so any unmodified capture satisfies that. Rows carry
/// the timestamps of the first pin — identical per-index times across pins
/// is a precondition this does not verify.
pub fn csv(wtr: &mut csv::Writer<impl Write>, pins: &[Pin]) -> Result<(), MeterError> {
    csv_with_progress(wtr, pins, |_| {})
}

/// Same as [`csv`], reporting percent complete every few rows.
pub fn csv_with_progress(
    wtr: &mut csv::Writer<impl Write>,
    pins: &[Pin],
    mut progress: impl FnMut(u8),
) -> Result<(), MeterError> {
    let num_steps = pins.first().map_or(0, |p| p.len());
    if num_steps == 0 {
        return Err(MeterError::NothingToSave);
    }
    if !pins.iter().map(|p| p.len()).all_equal() {
        // Name the first offender in pin order.
        let (pin, found) = pins
            .iter()
            .map(|p| (p.number, p.len()))
            .find(|&(_, len)| len != num_steps)
            .unwrap_or((pins[0].number, num_steps));
        return Err(MeterError::MisalignedSeries {
            pin,
            expected: num_steps,
            found,
        });
    }

    let mut header = vec![String::from("time/s")];
    header.extend(pins.iter().map(|p| format!("v{}/V", p.number)));
    wtr.write_record(&header)?;

    let mut row: Vec<String> = Vec::with_capacity(pins.len() + 1);
    for step in 0..num_steps {
        row.clear();
        // Length equality was checked above, so every get succeeds.
        row.push(pins[0].time(step).expect("step < num_steps").to_string());
        for pin in pins {
            row.push(pin.voltage(step).expect("step < num_steps").to_string());
        }
        wtr.write_record(&row)?;

        if step % 10 == 0 {
            progress((step as f64 / num_steps as f64 * 100.0) as u8);
        }
    }
    wtr.flush()?;
    Ok(())
}
