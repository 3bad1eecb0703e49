//! Two-digit countdown display and its multiplexer.
//!
//! Both digits share one segment bus. [`DigitMux`] lights one position at a
//! time and always deselects every position before the bus data changes, so a
//! digit never shows the other digit's segments while the select lines move.

use crate::hal::DigitSink;
use crate::phase::WaitTimes;
use embedded_hal::delay::DelayNs;

/// Common-cathode seven-segment codes for 0..=9 (bit 0 = segment a).
pub const SEGMENT_TABLE: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Segment code with every segment off.
pub const SEGMENTS_BLANK: u8 = 0x00;

/// Segment code for a digit; values above 9 show 9.
#[inline]
pub const fn segments(digit: u8) -> u8 {
    SEGMENT_TABLE[if digit > 9 { 9 } else { digit as usize }]
}

/// One digit position on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitPosition {
    NorthSouth,
    EastWest,
}

impl DigitPosition {
    pub const ALL: [DigitPosition; 2] = [DigitPosition::NorthSouth, DigitPosition::EastWest];

    /// Position lit after this one.
    pub const fn next(self) -> DigitPosition {
        match self {
            DigitPosition::NorthSouth => DigitPosition::EastWest,
            DigitPosition::EastWest => DigitPosition::NorthSouth,
        }
    }
}

/// The two digits currently on display, each `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayDigits {
    pub north_south: u8,
    pub east_west: u8,
}

impl DisplayDigits {
    /// Creates digits, clamping each to 9.
    pub const fn new(north_south: u8, east_west: u8) -> Self {
        Self {
            north_south: if north_south > 9 { 9 } else { north_south },
            east_west: if east_west > 9 { 9 } else { east_west },
        }
    }

    /// Digits for derived wait times. The clamp is applied to the finished
    /// sums, so a red wait of 5 + 3 shows 8 and 7 + 5 shows 9.
    pub const fn from_wait_times(wait: WaitTimes) -> Self {
        Self::new(wait.north_south, wait.east_west)
    }

    /// Shows a two-digit value across both positions (tens, units), clamped to 99.
    pub const fn from_value(value: u8) -> Self {
        let value = if value > 99 { 99 } else { value };
        Self {
            north_south: value / 10,
            east_west: value % 10,
        }
    }

    /// Digit shown at `position`.
    pub const fn digit(&self, position: DigitPosition) -> u8 {
        match position {
            DigitPosition::NorthSouth => self.north_south,
            DigitPosition::EastWest => self.east_west,
        }
    }
}

/// Trait for the raw shared-bus display lines.
pub trait DigitBus {
    /// Drives the position select lines. `None` deselects every position.
    fn select(&mut self, position: Option<DigitPosition>);

    /// Writes a segment pattern to the shared data bus.
    fn write_segments(&mut self, segments: u8);
}

/// Multiplexes two digits over a [`DigitBus`].
///
/// Interrupt-driven use calls [`DigitMux::step`] once per tick, which lights
/// the next position and leaves it lit until the following tick; with a 2 ms
/// tick both digits refresh at 250 Hz. Main-loop use calls
/// [`DigitMux::refresh`], which performs a full blocking pass.
pub struct DigitMux<B: DigitBus> {
    bus: B,
    next: DigitPosition,
}

impl<B: DigitBus> DigitMux<B> {
    /// Creates a multiplexer and blanks the display.
    pub fn new(bus: B) -> Self {
        let mut mux = Self {
            bus,
            next: DigitPosition::NorthSouth,
        };
        mux.blank();
        mux
    }

    /// Lights the next position with its digit.
    pub fn step(&mut self, digits: DisplayDigits) {
        let position = self.next;
        self.light(position, digits.digit(position));
        self.next = position.next();
    }

    /// Lights each position for `dwell_us`, then blanks the display.
    pub fn refresh<D: DelayNs>(&mut self, digits: DisplayDigits, delay: &mut D, dwell_us: u32) {
        for position in DigitPosition::ALL {
            self.light(position, digits.digit(position));
            delay.delay_us(dwell_us);
        }
        self.blank();
        self.next = DigitPosition::NorthSouth;
    }

    /// Deselects every position and clears the bus.
    pub fn blank(&mut self) {
        self.bus.select(None);
        self.bus.write_segments(SEGMENTS_BLANK);
    }

    fn light(&mut self, position: DigitPosition, digit: u8) {
        // Blank first: the data bus must not change under a selected digit.
        self.bus.select(None);
        self.bus.write_segments(segments(digit));
        self.bus.select(Some(position));
    }

    /// Position that the next [`DigitMux::step`] will light.
    pub fn next_position(&self) -> DigitPosition {
        self.next
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the bus, leaving the display blank.
    pub fn release(mut self) -> B {
        self.blank();
        self.bus
    }
}

impl<B: DigitBus> DigitSink for DigitMux<B> {
    fn show_digits(&mut self, digits: DisplayDigits) {
        self.step(digits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BusOp {
        Select(Option<DigitPosition>),
        Write(u8),
    }

    struct RecordingBus {
        ops: Vec<BusOp, 32>,
    }

    impl RecordingBus {
        fn new() -> Self {
            Self { ops: Vec::new() }
        }
    }

    impl DigitBus for RecordingBus {
        fn select(&mut self, position: Option<DigitPosition>) {
            let _ = self.ops.push(BusOp::Select(position));
        }

        fn write_segments(&mut self, segments: u8) {
            let _ = self.ops.push(BusOp::Write(segments));
        }
    }

    struct CountingDelay {
        total_us: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += ns / 1000;
        }
    }

    #[test]
    fn digits_clamp_after_sum() {
        let digits = DisplayDigits::from_wait_times(WaitTimes {
            north_south: 5,
            east_west: 12,
        });
        assert_eq!(digits, DisplayDigits::new(5, 9));
    }

    #[test]
    fn value_splits_into_tens_and_units() {
        assert_eq!(DisplayDigits::from_value(27), DisplayDigits::new(2, 7));
        assert_eq!(DisplayDigits::from_value(5), DisplayDigits::new(0, 5));
        assert_eq!(DisplayDigits::from_value(150), DisplayDigits::new(9, 9));
    }

    #[test]
    fn step_deselects_before_changing_data() {
        let mut mux = DigitMux::new(RecordingBus::new());
        mux.step(DisplayDigits::new(3, 8));
        mux.step(DisplayDigits::new(3, 8));

        assert_eq!(
            mux.bus().ops.as_slice(),
            &[
                BusOp::Select(None),
                BusOp::Write(SEGMENTS_BLANK),
                BusOp::Select(None),
                BusOp::Write(SEGMENT_TABLE[3]),
                BusOp::Select(Some(DigitPosition::NorthSouth)),
                BusOp::Select(None),
                BusOp::Write(SEGMENT_TABLE[8]),
                BusOp::Select(Some(DigitPosition::EastWest)),
            ]
        );
    }

    #[test]
    fn no_write_while_a_position_is_selected() {
        let mut mux = DigitMux::new(RecordingBus::new());
        for n in 0..6 {
            mux.step(DisplayDigits::new(n, 9 - n));
        }

        let mut selected = false;
        for op in mux.bus().ops.iter() {
            match op {
                BusOp::Select(position) => selected = position.is_some(),
                BusOp::Write(_) => assert!(!selected),
            }
        }
    }

    #[test]
    fn release_hands_back_a_blank_bus() {
        let mut mux = DigitMux::new(RecordingBus::new());
        mux.step(DisplayDigits::new(6, 2));
        let bus = mux.release();

        let ops = bus.ops.as_slice();
        assert_eq!(
            &ops[ops.len() - 2..],
            &[BusOp::Select(None), BusOp::Write(SEGMENTS_BLANK)]
        );
    }

    #[test]
    fn refresh_dwells_on_each_position_and_ends_blank() {
        let mut mux = DigitMux::new(RecordingBus::new());
        let mut delay = CountingDelay { total_us: 0 };
        mux.step(DisplayDigits::new(1, 1));
        mux.refresh(DisplayDigits::new(4, 2), &mut delay, 1000);

        assert_eq!(delay.total_us, 2000);
        assert_eq!(mux.next_position(), DigitPosition::NorthSouth);
        let ops = mux.bus().ops.as_slice();
        assert_eq!(
            &ops[ops.len() - 2..],
            &[BusOp::Select(None), BusOp::Write(SEGMENTS_BLANK)]
        );
    }
}
