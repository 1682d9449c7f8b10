use std::fmt;

/// Shared multi-bit wire connecting the CPU core and its peripherals.
///
/// Tri-state behavior is modeled as "last writer wins, unselected drivers
/// silent": a read of an un-driven bus returns the last committed value
/// rather than a floating state, which keeps the simulation deterministic.
/// `reset()` clears the drive record (not the value) and is called once per
/// half-cycle before any component drives; a second `write()` between resets
/// means two components drove the bus in the same phase, which is a decoder
/// table defect and panics rather than being silently resolved.
pub struct Bus {
    name: String,
    width_bits: u8,
    value: u16,
    driven: bool,
}

impl Bus {
    /// Create a bus of the given width (1-16 bits).
    /// Panics if the width is zero or wider than the backing store; a bus
    /// with no width is a wiring error that must fail at setup time.
    pub fn new(name: &str, width_bits: u8) -> Self {
        assert!(
            width_bits >= 1 && width_bits <= 16,
            "bus {} width must be 1-16 bits, got {}",
            name,
            width_bits
        );
        Bus {
            name: name.to_string(),
            width_bits,
            value: 0,
            driven: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width_bits(&self) -> u8 {
        self.width_bits
    }

    fn mask(&self) -> u16 {
        if self.width_bits == 16 {
            0xFFFF
        } else {
            (1u16 << self.width_bits) - 1
        }
    }

    /// Drive a value onto the bus. Out-of-range values are masked to the
    /// bus width, matching fixed-width hardware rather than rejecting them.
    pub fn write(&mut self, value: u16) {
        if self.driven {
            panic!(
                "bus direction conflict on {}: two drivers in one phase",
                self.name
            );
        }
        self.value = value & self.mask();
        self.driven = true;
    }

    /// Read the bus. An un-driven bus holds its last committed value.
    pub fn read(&self) -> u16 {
        self.value
    }

    /// True if some component has driven the bus since the last `reset()`.
    pub fn was_driven(&self) -> bool {
        self.driven
    }

    /// Clear the tri-state drive record at the start of a half-cycle so that
    /// exactly one component may assert a new value before the next read.
    pub fn reset(&mut self) {
        self.driven = false;
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:X}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_masks_to_width() {
        let mut bus = Bus::new("TEST", 4);
        bus.write(0x1F);
        assert_eq!(bus.read(), 0xF);
    }

    #[test]
    fn test_undriven_read_returns_last_value() {
        let mut bus = Bus::new("TEST", 4);
        bus.write(0xA);
        bus.reset();
        assert!(!bus.was_driven());
        assert_eq!(bus.read(), 0xA);
    }

    #[test]
    fn test_reset_allows_one_new_driver() {
        let mut bus = Bus::new("TEST", 4);
        bus.write(0x3);
        bus.reset();
        bus.write(0x5);
        assert_eq!(bus.read(), 0x5);
        assert!(bus.was_driven());
    }

    #[test]
    #[should_panic(expected = "bus direction conflict")]
    fn test_double_drive_in_one_phase_panics() {
        let mut bus = Bus::new("TEST", 4);
        bus.write(0x1);
        bus.write(0x2);
    }

    #[test]
    #[should_panic(expected = "width must be 1-16")]
    fn test_zero_width_bus_fails_at_setup() {
        let _ = Bus::new("BAD", 0);
    }
}
