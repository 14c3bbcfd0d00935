//! Multi-function pin (MFP) configuration engine for PXA/MMP-class SoCs.
//!
//! Every pin on these parts has one 32-bit MFPR control register that
//! selects its alternate function, drive strength, pull configuration,
//! low-power behavior and edge-detect wakeup. This crate keeps the
//! per-pin run-mode and low-power-mode register words in a fixed table
//! behind one lock, loads the platform's pin-to-register address map once
//! at boot, and exposes bulk configuration plus whole-table mode
//! switching for suspend/resume.
//!
//! ```no_run
//! use pxa_mfp::{MfpAddrMap, MfpConfig, MfpController, MfpVariant, MmioBus, PullMode};
//!
//! // Address map and MMIO base come from the platform layer.
//! let bus = unsafe { MmioBus::new(0xd401_e000) };
//! let mfp = MfpController::new(bus, MfpVariant::DEFAULT);
//! mfp.init_addr(&[MfpAddrMap::range(0, 109, 0xb4)]);
//!
//! // An I2C controller driver configuring its two pins at probe time.
//! mfp.config(&[
//!     MfpConfig::new(87).af(5).pull(PullMode::High),
//!     MfpConfig::new(88).af(5).pull(PullMode::High),
//! ]);
//!
//! // Power management on suspend / resume.
//! mfp.config_lpm();
//! mfp.config_run();
//! ```
#![cfg_attr(not(test), no_std)]

mod bit;
mod bus;
mod config;
mod controller;
mod regs;
mod table;

pub use bus::{MfprBus, MmioBus};
pub use config::{EdgeMode, LpmState, MfpConfig, PullMode, MFP_PIN_MAX};
pub use controller::MfpController;
pub use regs::{edge_bits, encode, MfpVariant, MfprValues};
pub use regs::{
    MFPR_AF_MASK, MFPR_DRIVE_MASK, MFPR_EDGE_BITS, MFPR_EDGE_CLEAR, MFPR_EDGE_FALL_EN,
    MFPR_EDGE_RISE_EN, MFPR_LPM_DRIVE_HIGH, MFPR_LPM_DRIVE_LOW, MFPR_LPM_FLOAT,
    MFPR_LPM_INPUT, MFPR_LPM_PULL_HIGH, MFPR_LPM_PULL_LOW, MFPR_PULLDOWN_EN,
    MFPR_PULLUP_EN, MFPR_PULL_BOTH, MFPR_PULL_FLOAT, MFPR_PULL_HIGH, MFPR_PULL_LOW,
    MFPR_PULL_NONE, MFPR_PULL_SEL, MFPR_SLEEP_DATA, MFPR_SLEEP_OE_N, MFPR_SLEEP_SEL,
};
pub use table::MfpAddrMap;
