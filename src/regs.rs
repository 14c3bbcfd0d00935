//! MFPR hardware register layout and the pure packed-word encoder.
//!
//! One 32-bit MFPR register per pin. The encoder turns a packed
//! [`MfpConfig`] word into the two register words the controller shadows:
//! the run-mode value written while the system is active and the low-power
//! value applied on suspend.

use crate::config::{EdgeMode, LpmState, MfpConfig};
use crate::{BIT, BIT_MASK_LEN, BIT_RNG};

pub const MFPR_AF_MASK: u32 = BIT_RNG!(0, 2);
pub const MFPR_EDGE_RISE_EN: u32 = BIT!(4);
pub const MFPR_EDGE_FALL_EN: u32 = BIT!(5);
pub const MFPR_EDGE_CLEAR: u32 = BIT!(6);
pub const MFPR_SLEEP_OE_N: u32 = BIT!(7);
pub const MFPR_SLEEP_DATA: u32 = BIT!(8);
// Sleep-select exists on some steppings only; it is part of the layout but
// takes no part in the composition tables below.
pub const MFPR_SLEEP_SEL: u32 = BIT!(9);
pub const MFPR_DRIVE_MASK: u32 = BIT_RNG!(10, 12);
pub const MFPR_PULLDOWN_EN: u32 = BIT!(13);
pub const MFPR_PULLUP_EN: u32 = BIT!(14);
pub const MFPR_PULL_SEL: u32 = BIT!(15);

/// Both edge-detect enable bits; what a low-power transition masks off.
pub const MFPR_EDGE_BITS: u32 = MFPR_EDGE_RISE_EN | MFPR_EDGE_FALL_EN;

const fn mfpr_af_sel(af: u32) -> u32 {
    af & 0x7
}

const fn mfpr_drive(ds: u32) -> u32 {
    (ds & 0x7) << 10
}

// Low-power output composition per LpmState. Sleep-data and the pull
// enables double as the sleep level selectors; sleep-oe-n decides driven
// versus pulled/floating:
//
//  state      sleep_oe_n  sleep_data  pullup_en  pulldown_en
//  input          0           0           0           0
//  drive 0        0           0           0           1
//  drive 1        0           1           1           0
//  pull low       1           0           0           1
//  pull high      1           1           1           0
//  float          1           0           0           0
pub const MFPR_LPM_INPUT: u32 = 0;
pub const MFPR_LPM_DRIVE_LOW: u32 = MFPR_PULLDOWN_EN;
pub const MFPR_LPM_DRIVE_HIGH: u32 = MFPR_SLEEP_DATA | MFPR_PULLUP_EN;
pub const MFPR_LPM_PULL_LOW: u32 = MFPR_LPM_DRIVE_LOW | MFPR_SLEEP_OE_N;
pub const MFPR_LPM_PULL_HIGH: u32 = MFPR_LPM_DRIVE_HIGH | MFPR_SLEEP_OE_N;
pub const MFPR_LPM_FLOAT: u32 = MFPR_SLEEP_OE_N;

pub const MFPR_PULL_NONE: u32 = 0;
pub const MFPR_PULL_LOW: u32 = MFPR_PULL_SEL | MFPR_PULLDOWN_EN;
pub const MFPR_PULL_HIGH: u32 = MFPR_PULL_SEL | MFPR_PULLUP_EN;
pub const MFPR_PULL_BOTH: u32 = MFPR_PULL_SEL | MFPR_PULLUP_EN | MFPR_PULLDOWN_EN;
pub const MFPR_PULL_FLOAT: u32 = MFPR_PULL_SEL;

// Indexed by LpmState; Default and Input share the input encoding.
const MFPR_LPM: [u32; 7] = [
    MFPR_LPM_INPUT,
    MFPR_LPM_DRIVE_LOW,
    MFPR_LPM_DRIVE_HIGH,
    MFPR_LPM_PULL_LOW,
    MFPR_LPM_PULL_HIGH,
    MFPR_LPM_FLOAT,
    MFPR_LPM_INPUT,
];

// Indexed by PullMode.
const MFPR_PULL: [u32; 5] = [
    MFPR_PULL_NONE,
    MFPR_PULL_LOW,
    MFPR_PULL_HIGH,
    MFPR_PULL_BOTH,
    MFPR_PULL_FLOAT,
];

// Indexed by EdgeMode.
const MFPR_EDGE: [u32; 4] = [
    0,
    MFPR_EDGE_RISE_EN,
    MFPR_EDGE_FALL_EN,
    MFPR_EDGE_RISE_EN | MFPR_EDGE_FALL_EN,
];

/// SoC-stepping quirks, resolved once by the platform layer and injected
/// at controller construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MfpVariant {
    /// Drive-strength values are shifted one bit left before encoding.
    pub drive_shifted_left_by_one: bool,
    /// The low-power state selector is ignored; pins encode as if the
    /// board table had asked for the default low-power state.
    pub low_power_disabled: bool,
    /// Family never switches the table to low-power values; suspend
    /// leaves every pin at its run-mode register value. A documented
    /// exception, not an oversight.
    pub lpm_keeps_run_mode: bool,
}

impl MfpVariant {
    /// No quirks; the behavior of the baseline steppings.
    pub const DEFAULT: MfpVariant = MfpVariant {
        drive_shifted_left_by_one: false,
        low_power_disabled: false,
        lpm_keeps_run_mode: false,
    };
}

/// The two register words shadowed per configured pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MfprValues {
    /// Register word while the system is active.
    pub run: u32,
    /// Register word applied when entering a low-power state.
    pub lpm: u32,
}

/// Hardware edge-detect enable bits for an edge mode.
pub fn edge_bits(edge: EdgeMode) -> u32 {
    MFPR_EDGE[edge as usize]
}

/// Encodes a packed configuration word into its MFPR register words.
///
/// The run word is the OR of the independently computed bitfields; the
/// low-power word starts out as a copy of it, so the low-power register
/// state only diverges from run mode through the mode-switch sequence.
///
/// Alternate-function and drive-strength values are masked to their field
/// width but otherwise taken as-is; callers are trusted board tables.
pub fn encode(c: MfpConfig, variant: &MfpVariant) -> MfprValues {
    let mut drv = c.drive_strength();
    if variant.drive_shifted_left_by_one {
        drv <<= 1;
    }

    let lpm_state = if variant.low_power_disabled {
        LpmState::Default
    } else {
        c.lpm_state()
    };

    let run = mfpr_af_sel(c.af_sel())
        | mfpr_drive(drv)
        | MFPR_PULL[c.pull_mode() as usize]
        | MFPR_LPM[lpm_state as usize]
        | MFPR_EDGE[c.edge_mode() as usize];

    MfprValues { run, lpm: run }
}
