//! The shared pin table and the one-time address map load.
//!
//! Every pin starts out unconfigured, with no register offset. The
//! platform layer supplies a list of [`MfpAddrMap`] entries at boot; the
//! load walks them and gives each named pin its MFPR byte offset, one
//! 4-byte register word per pin within a range. Until that happens the
//! table refuses configuration.

use crate::config::{MfpConfig, MFP_PIN_MAX};

/// MFPR registers are one 32-bit word apart within a range.
const MFPR_STRIDE: u32 = 4;

/// Per-pin state. `config` doubles as the configured/unconfigured
/// sentinel; the two register words are only meaningful once it is set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MfpPin {
    pub config: Option<MfpConfig>,
    pub mfpr_off: u32,
    pub mfpr_run: u32,
    pub mfpr_lpm: u32,
}

impl MfpPin {
    const UNCONFIGURED: MfpPin = MfpPin {
        config: None,
        mfpr_off: 0,
        mfpr_run: 0,
        mfpr_lpm: 0,
    };

    pub fn configured(&self) -> bool {
        self.config.is_some()
    }
}

/// One platform address-map entry: a single pin or an inclusive pin range
/// sharing a linear offset stride.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MfpAddrMap {
    start: u16,
    end: Option<u16>,
    offset: u32,
}

impl MfpAddrMap {
    /// Entry for one pin at `offset`.
    pub const fn pin(pin: u16, offset: u32) -> Self {
        MfpAddrMap {
            start: pin,
            end: None,
            offset,
        }
    }

    /// Entry for pins `start..=end`; `start` sits at `offset`, each
    /// following pin one register word further.
    pub const fn range(start: u16, end: u16, offset: u32) -> Self {
        MfpAddrMap {
            start,
            end: Some(end),
            offset,
        }
    }
}

/// The fixed-size table: the source of truth for which pins are
/// configured and what their run/low-power register words are. All
/// access happens under the controller's lock.
pub(crate) struct MfpTable {
    pins: [MfpPin; MFP_PIN_MAX],
    readback_off: u32,
    addr_mapped: bool,
}

impl MfpTable {
    /// Every entry starts at the unconfigured sentinel.
    pub const fn new() -> Self {
        MfpTable {
            pins: [MfpPin::UNCONFIGURED; MFP_PIN_MAX],
            readback_off: 0,
            addr_mapped: false,
        }
    }

    /// Populates register offsets from a platform address map.
    ///
    /// The first entry's offset becomes the readback register used to
    /// flush posted writes, so it must name a register that always exists
    /// and is safe to read. Mapped pins get their shadow register words
    /// reset to zero. May be called again for additional ranges.
    pub fn load_addr_map(&mut self, map: &[MfpAddrMap]) {
        assert!(
            !map.is_empty(),
            "address map must carry at least the readback register"
        );
        self.readback_off = map[0].offset;

        for entry in map {
            let mut offset = entry.offset;
            let last = entry.end.unwrap_or(entry.start) as usize;
            assert!(
                last < MFP_PIN_MAX,
                "address map entry ends at pin {} beyond the table",
                last
            );

            for i in entry.start as usize..=last {
                let p = &mut self.pins[i];
                p.mfpr_off = offset;
                p.mfpr_run = 0;
                p.mfpr_lpm = 0;
                offset += MFPR_STRIDE;
            }
        }

        self.addr_mapped = true;
    }

    pub fn addr_mapped(&self) -> bool {
        self.addr_mapped
    }

    /// Offset of the designated readback register.
    pub fn readback_off(&self) -> u32 {
        self.readback_off
    }

    pub fn pin(&self, idx: usize) -> &MfpPin {
        &self.pins[idx]
    }

    pub fn pin_mut(&mut self, idx: usize) -> &mut MfpPin {
        &mut self.pins[idx]
    }
}
