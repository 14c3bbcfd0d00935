//! Packed pin configuration words.
//!
//! A single `u32` carries everything a caller has to say about one pin:
//! which pin it is, the alternate function routed to it, its drive
//! strength, the state it should hold in low-power mode, the low-power
//! edge-detect mode and the static pull configuration. Board tables are
//! arrays of these words, handed to [`MfpController::config`] in bulk.
//!
//! [`MfpController::config`]: crate::controller::MfpController::config

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{BIT, BIT_MASK_LEN, BIT_RNG};

/// Upper bound on the pin count for the whole SoC family. The pin table
/// is sized by this; any pin id at or above it is a fatal caller error.
pub const MFP_PIN_MAX: usize = 256;

const PIN_MASK: u32 = BIT_RNG!(0, 9);
const AF_SHIFT: u32 = 10;
const AF_MASK: u32 = BIT_RNG!(10, 12);
const DS_SHIFT: u32 = 13;
const DS_MASK: u32 = BIT_RNG!(13, 15);
const LPM_SHIFT: u32 = 16;
const LPM_MASK: u32 = BIT_RNG!(16, 18);
const EDGE_SHIFT: u32 = 19;
const EDGE_MASK: u32 = BIT_RNG!(19, 20);
const PULL_SHIFT: u32 = 21;
const PULL_MASK: u32 = BIT_RNG!(21, 23);

/// Pin state while the system is in a low-power sleep state.
///
/// `Default` and `Input` encode to the same register bits; `Default` is
/// what a board table gets when it says nothing about low-power behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LpmState {
    Default = 0,
    DriveLow = 1,
    DriveHigh = 2,
    PullLow = 3,
    PullHigh = 4,
    Float = 5,
    Input = 6,
}

/// Low-power edge-detect mode: which input transitions latch a wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeMode {
    None = 0,
    Rise = 1,
    Fall = 2,
    Both = 3,
}

/// Static run-mode pull configuration.
///
/// The hardware default (`None`) leaves the pull state to the selected
/// alternate function; the other variants override it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PullMode {
    None = 0,
    Low = 1,
    High = 2,
    Both = 3,
    Float = 4,
}

/// One packed pin configuration word.
///
/// Field layout:
///
/// | bits    | field              |
/// |---------|--------------------|
/// | 0..=9   | pin id             |
/// | 10..=12 | alternate function |
/// | 13..=15 | drive strength     |
/// | 16..=18 | low-power state    |
/// | 19..=20 | low-power edge     |
/// | 21..=23 | static pull        |
///
/// Built with the const builder methods, so board tables can live in
/// `static` arrays:
///
/// ```
/// use pxa_mfp::{MfpConfig, PullMode, LpmState};
///
/// static UART_PINS: [MfpConfig; 2] = [
///     MfpConfig::new(47).af(1),
///     MfpConfig::new(48).af(1).pull(PullMode::High).lpm(LpmState::Input),
/// ];
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MfpConfig(pub u32);

impl MfpConfig {
    /// Starts a configuration word for `pin`: alternate function 0, drive
    /// strength 0, low-power default, no edge detect, no pull override.
    pub const fn new(pin: u32) -> Self {
        MfpConfig(pin & PIN_MASK)
    }

    /// Wraps an already-packed word, e.g. one taken from a board table
    /// that ORs the raw field constants together.
    pub const fn from_raw(raw: u32) -> Self {
        MfpConfig(raw)
    }

    /// Selects alternate function `af` (0-7). The value is encoded as-is;
    /// callers supply values from static per-SoC tables.
    pub const fn af(self, af: u32) -> Self {
        MfpConfig((self.0 & !AF_MASK) | ((af << AF_SHIFT) & AF_MASK))
    }

    /// Selects drive strength level `ds` (0-7), encoded as-is.
    pub const fn drive(self, ds: u32) -> Self {
        MfpConfig((self.0 & !DS_MASK) | ((ds << DS_SHIFT) & DS_MASK))
    }

    /// Selects the low-power-mode state.
    pub const fn lpm(self, state: LpmState) -> Self {
        MfpConfig((self.0 & !LPM_MASK) | ((state as u32) << LPM_SHIFT))
    }

    /// Selects the low-power edge-detect mode.
    pub const fn edge(self, edge: EdgeMode) -> Self {
        MfpConfig((self.0 & !EDGE_MASK) | ((edge as u32) << EDGE_SHIFT))
    }

    /// Selects the static pull configuration.
    pub const fn pull(self, pull: PullMode) -> Self {
        MfpConfig((self.0 & !PULL_MASK) | ((pull as u32) << PULL_SHIFT))
    }

    /// Pin id carried by this word.
    pub const fn pin(self) -> usize {
        (self.0 & PIN_MASK) as usize
    }

    /// Alternate function field, as-is.
    pub const fn af_sel(self) -> u32 {
        (self.0 & AF_MASK) >> AF_SHIFT
    }

    /// Drive strength field, as-is.
    pub const fn drive_strength(self) -> u32 {
        (self.0 & DS_MASK) >> DS_SHIFT
    }

    /// Low-power state field.
    ///
    /// The 3-bit field has one undefined encoding (7); a word carrying
    /// it fails fast here rather than selecting an arbitrary low-power
    /// composition.
    pub fn lpm_state(self) -> LpmState {
        LpmState::from_u32((self.0 & LPM_MASK) >> LPM_SHIFT)
            .expect("undefined low-power state encoding")
    }

    /// Low-power edge-detect field. All four encodings are defined.
    pub fn edge_mode(self) -> EdgeMode {
        EdgeMode::from_u32((self.0 & EDGE_MASK) >> EDGE_SHIFT).unwrap()
    }

    /// Static pull field. Panics on the undefined encodings (5-7).
    pub fn pull_mode(self) -> PullMode {
        PullMode::from_u32((self.0 & PULL_MASK) >> PULL_SHIFT)
            .expect("undefined pull encoding")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_packs_every_field() {
        let c = MfpConfig::new(12)
            .af(2)
            .drive(3)
            .pull(PullMode::Low)
            .lpm(LpmState::DriveHigh)
            .edge(EdgeMode::Rise);

        assert_eq!(c.pin(), 12);
        assert_eq!(c.af_sel(), 2);
        assert_eq!(c.drive_strength(), 3);
        assert_eq!(c.pull_mode(), PullMode::Low);
        assert_eq!(c.lpm_state(), LpmState::DriveHigh);
        assert_eq!(c.edge_mode(), EdgeMode::Rise);
    }

    #[test]
    fn builder_matches_hand_packed_word() {
        let c = MfpConfig::new(33).af(5).drive(6).lpm(LpmState::Float);
        let raw = 33 | (5 << 10) | (6 << 13) | (5 << 16);
        assert_eq!(c, MfpConfig::from_raw(raw));
    }

    #[test]
    fn fields_do_not_bleed_into_neighbours() {
        // af = 7 must stay out of the drive field, drive = 7 out of the
        // lpm field, and a large pin id out of the af field.
        let c = MfpConfig::new(0x3ff).af(7).drive(7);
        assert_eq!(c.pin(), 0x3ff);
        assert_eq!(c.af_sel(), 7);
        assert_eq!(c.drive_strength(), 7);
        assert_eq!(c.lpm_state(), LpmState::Default);
        assert_eq!(c.pull_mode(), PullMode::None);
    }

    #[test]
    fn default_and_input_are_distinct_encodings() {
        let d = MfpConfig::new(0).lpm(LpmState::Default);
        let i = MfpConfig::new(0).lpm(LpmState::Input);
        assert_ne!(d, i);
        assert_eq!(d.lpm_state(), LpmState::Default);
        assert_eq!(i.lpm_state(), LpmState::Input);
    }

    #[test]
    #[should_panic(expected = "undefined low-power state")]
    fn undefined_lpm_encoding_fails_fast() {
        let _ = MfpConfig::from_raw(7 << 16).lpm_state();
    }

    #[test]
    #[should_panic(expected = "undefined pull encoding")]
    fn undefined_pull_encoding_fails_fast() {
        let _ = MfpConfig::from_raw(6 << 21).pull_mode();
    }
}
