//! Read and write slots binding the tuner to the outside world.
//!
//! The tuner only ever takes a single snapshot of the process value per
//! sample and only ever stores a single relay level, so a slot is just a
//! scalar cell. Whoever owns the slot decides where the value comes from.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Source of the process variable.
pub trait ProcessInput {
    fn read(&self) -> f32;
}

/// Destination of the relay output.
pub trait ActuatorOutput {
    fn write(&mut self, value: f32);
}

impl ProcessInput for &Cell<f32> {
    fn read(&self) -> f32 {
        self.get()
    }
}

impl ActuatorOutput for &Cell<f32> {
    fn write(&mut self, value: f32) {
        self.set(value);
    }
}

/// Scalar slot that can be shared with an interrupt handler or another task.
///
/// ```ignore
/// static BOILER_TEMPERATURE: SharedSlot = SharedSlot::new(25.0);
/// // in the sensor task / ISR
/// BOILER_TEMPERATURE.set(reading);
/// ```
pub struct SharedSlot {
    value: Mutex<CriticalSectionRawMutex, Cell<f32>>,
}

impl SharedSlot {
    pub const fn new(value: f32) -> Self {
        Self {
            value: Mutex::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> f32 {
        self.value.lock(|v| v.get())
    }

    pub fn set(&self, value: f32) {
        self.value.lock(|v| v.set(value));
    }
}

impl ProcessInput for &SharedSlot {
    fn read(&self) -> f32 {
        self.get()
    }
}

impl ActuatorOutput for &SharedSlot {
    fn write(&mut self, value: f32) {
        self.set(value);
    }
}
