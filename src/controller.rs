//! The MFP controller: the public face of the engine.
//!
//! One controller owns the pin table, the register bus and the SoC
//! variant flags behind a single critical-section lock. Every operation
//! holds that lock for its entire duration, so a bulk configure of N pins
//! is atomic with respect to every other caller, not just per pin.
//! Nothing sleeps or blocks under the lock; the only I/O inside it is the
//! MMIO access itself.
//!
//! Posted writes are flushed with one readback of the designated
//! readback register per bulk operation, not after each write: ordering
//! within the critical section is preserved by the bus, and cross-caller
//! visibility comes from the lock.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::bus::MfprBus;
use crate::config::{EdgeMode, MfpConfig, MFP_PIN_MAX};
use crate::regs::{self, MfpVariant, MFPR_EDGE_BITS, MFPR_EDGE_CLEAR};
use crate::table::{MfpAddrMap, MfpTable};

struct Inner<B> {
    bus: B,
    table: MfpTable,
    variant: MfpVariant,
}

impl<B: MfprBus> Inner<B> {
    /// Read back the designated readback register to force completion of
    /// previously posted writes.
    fn sync(&mut self) {
        let off = self.table.readback_off();
        let _ = self.bus.read(off);
    }

    fn config_pin(&mut self, c: MfpConfig) {
        let pin = c.pin();
        assert!(pin < MFP_PIN_MAX, "pin {} out of range", pin);

        let vals = regs::encode(c, &self.variant);
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "mfp: pin {=usize} run {=u32:x} lpm {=u32:x}",
            pin,
            vals.run,
            vals.lpm
        );

        let p = self.table.pin_mut(pin);
        p.config = Some(c);
        p.mfpr_run = vals.run;
        p.mfpr_lpm = vals.lpm;
        let off = p.mfpr_off;

        self.bus.write(off, vals.run);
    }

    fn write_run(&mut self, idx: usize) {
        let p = *self.table.pin(idx);
        if p.configured() {
            self.bus.write(p.mfpr_off, p.mfpr_run);
        }
    }

    fn write_lpm(&mut self, idx: usize) {
        let p = *self.table.pin(idx);
        if p.configured() {
            // Mask the edge-detect enables before moving to the low-power
            // value, so the transition window cannot latch a spurious
            // edge interrupt.
            let clr = (p.mfpr_run & !MFPR_EDGE_BITS) | MFPR_EDGE_CLEAR;
            if clr != p.mfpr_run {
                self.bus.write(p.mfpr_off, clr);
            }
            if p.mfpr_lpm != clr {
                self.bus.write(p.mfpr_off, p.mfpr_lpm);
            }
        }
    }
}

/// Run-mode / low-power-mode pin configuration engine.
///
/// Constructed once by the platform composition root, then shared by
/// reference with every subsystem that owns pins. The address map must be
/// loaded with [`init_addr`](Self::init_addr) before the first
/// [`config`](Self::config) call.
pub struct MfpController<B: MfprBus> {
    inner: CriticalSectionMutex<RefCell<Inner<B>>>,
}

impl<B: MfprBus> MfpController<B> {
    /// Creates a controller with every pin unconfigured.
    ///
    /// `variant` carries the stepping quirks resolved by the platform
    /// layer; [`MfpVariant::DEFAULT`] for the baseline steppings.
    pub const fn new(bus: B, variant: MfpVariant) -> Self {
        MfpController {
            inner: CriticalSectionMutex::new(RefCell::new(Inner {
                bus,
                table: MfpTable::new(),
                variant,
            })),
        }
    }

    /// Loads the platform address map, assigning each named pin its MFPR
    /// register offset. Must complete before any configuration call; the
    /// first entry's offset becomes the readback register.
    ///
    /// Ranges expand at one register word per pin. May be called again
    /// for additional ranges.
    pub fn init_addr(&self, map: &[MfpAddrMap]) {
        self.inner.lock(|cell| {
            cell.borrow_mut().table.load_addr_map(map);
        })
    }

    /// Bulk-configures a list of pins: encodes and stores each pin's
    /// run-mode and low-power register words, marks the pin configured,
    /// and writes the run-mode word to hardware. One readback flush for
    /// the whole batch.
    ///
    /// Reconfiguring an already-configured pin recomputes and overwrites
    /// both words; the call is idempotent for identical input.
    ///
    /// # Panics
    ///
    /// If the address map has not been loaded, or a word names a pin at
    /// or beyond [`MFP_PIN_MAX`]. Both would otherwise corrupt an
    /// unrelated register.
    pub fn config(&self, cfgs: &[MfpConfig]) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            assert!(
                inner.table.addr_mapped(),
                "address map not loaded before pin configuration"
            );
            for c in cfgs {
                inner.config_pin(*c);
            }
            inner.sync();
        })
    }

    /// Reads pin `pin`'s raw MFPR register.
    ///
    /// # Panics
    ///
    /// If `pin` is at or beyond [`MFP_PIN_MAX`].
    pub fn read(&self, pin: usize) -> u32 {
        assert!(pin < MFP_PIN_MAX, "pin {} out of range", pin);
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let off = inner.table.pin(pin).mfpr_off;
            inner.bus.read(off)
        })
    }

    /// Writes pin `pin`'s raw MFPR register and flushes the write.
    ///
    /// Does not touch the stored run/low-power words; a later mode switch
    /// reapplies them over whatever was written here.
    ///
    /// # Panics
    ///
    /// If `pin` is at or beyond [`MFP_PIN_MAX`].
    pub fn write(&self, pin: usize, val: u32) {
        assert!(pin < MFP_PIN_MAX, "pin {} out of range", pin);
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let off = inner.table.pin(pin).mfpr_off;
            inner.bus.write(off, val);
            inner.sync();
        })
    }

    /// Switches every configured pin to its low-power register value.
    /// Unconfigured pins are skipped. Each pin takes a two-step
    /// transition: edge-detect enables are cleared first, then the
    /// low-power value is applied if it still differs.
    ///
    /// On `lpm_keeps_run_mode` variants this is a no-op and pins stay at
    /// their run-mode values.
    pub fn config_lpm(&self) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if inner.variant.lpm_keeps_run_mode {
                return;
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("mfp: entering low-power mode");
            for idx in 0..MFP_PIN_MAX {
                inner.write_lpm(idx);
            }
            inner.sync();
        })
    }

    /// Restores every configured pin's run-mode register value.
    /// Unconfigured pins are skipped.
    pub fn config_run(&self) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            #[cfg(feature = "defmt")]
            defmt::trace!("mfp: entering run mode");
            for idx in 0..MFP_PIN_MAX {
                inner.write_run(idx);
            }
            inner.sync();
        })
    }

    /// Adjusts the edge-detect bits of an already-configured pin in
    /// place: read, clear the edge bitfield, OR in the new enables,
    /// write back, flush.
    ///
    /// # Panics
    ///
    /// If `pin` is at or beyond [`MFP_PIN_MAX`], or has never been
    /// configured (its register offset would be meaningless).
    pub fn set_edge(&self, pin: usize, edge: EdgeMode) {
        assert!(pin < MFP_PIN_MAX, "pin {} out of range", pin);
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let p = *inner.table.pin(pin);
            assert!(p.configured(), "pin {} not configured", pin);
            let off = p.mfpr_off;

            let mut val = inner.bus.read(off);
            val &= !(MFPR_EDGE_BITS | MFPR_EDGE_CLEAR);
            val |= regs::edge_bits(edge);
            inner.bus.write(off, val);
            inner.sync();
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;
    use crate::config::{LpmState, PullMode};
    use crate::regs::{
        MFPR_EDGE_FALL_EN, MFPR_EDGE_RISE_EN, MFPR_LPM_DRIVE_HIGH, MFPR_PULL_LOW,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Access {
        Read(u32),
        Write(u32, u32),
    }

    #[derive(Default)]
    struct BusState {
        regs: BTreeMap<u32, u32>,
        log: Vec<Access>,
    }

    impl BusState {
        fn reg(&self, off: u32) -> u32 {
            self.regs.get(&off).copied().unwrap_or(0)
        }

        fn writes_to(&self, off: u32) -> usize {
            self.log
                .iter()
                .filter(|a| matches!(a, Access::Write(o, _) if *o == off))
                .count()
        }

        fn reads(&self) -> usize {
            self.log.iter().filter(|a| matches!(a, Access::Read(_))).count()
        }
    }

    /// Array-of-registers stand-in for the MFPR block. Tests keep a
    /// second handle to the state to inspect registers and access order.
    #[derive(Clone)]
    struct FakeBus(Rc<RefCell<BusState>>);

    impl FakeBus {
        fn new() -> (FakeBus, Rc<RefCell<BusState>>) {
            let state = Rc::new(RefCell::new(BusState::default()));
            (FakeBus(state.clone()), state)
        }
    }

    impl MfprBus for FakeBus {
        fn read(&mut self, offset: u32) -> u32 {
            let mut s = self.0.borrow_mut();
            s.log.push(Access::Read(offset));
            s.regs.get(&offset).copied().unwrap_or(0)
        }

        fn write(&mut self, offset: u32, value: u32) {
            let mut s = self.0.borrow_mut();
            s.log.push(Access::Write(offset, value));
            s.regs.insert(offset, value);
        }
    }

    // Pins 0..=15 mapped linearly from 0x40; readback register is 0x40.
    const MAP: [MfpAddrMap; 1] = [MfpAddrMap::range(0, 15, 0x40)];
    const READBACK: u32 = 0x40;

    fn off(pin: u32) -> u32 {
        0x40 + pin * 4
    }

    fn controller(variant: MfpVariant) -> (MfpController<FakeBus>, Rc<RefCell<BusState>>) {
        let (bus, state) = FakeBus::new();
        let ctrl = MfpController::new(bus, variant);
        ctrl.init_addr(&MAP);
        (ctrl, state)
    }

    fn pin12_config() -> MfpConfig {
        MfpConfig::new(12)
            .af(2)
            .drive(3)
            .pull(PullMode::Low)
            .lpm(LpmState::DriveHigh)
            .edge(EdgeMode::Rise)
    }

    const PIN12_RUN: u32 =
        2 | (3 << 10) | MFPR_PULL_LOW | MFPR_LPM_DRIVE_HIGH | MFPR_EDGE_RISE_EN;

    #[test]
    fn configure_writes_run_word_and_syncs_once() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[pin12_config()]);

        let s = state.borrow();
        assert_eq!(s.reg(off(12)), PIN12_RUN);
        // One run-mode write, then exactly one readback flush.
        assert_eq!(
            s.log,
            vec![Access::Write(off(12), PIN12_RUN), Access::Read(READBACK)]
        );
    }

    #[test]
    fn bulk_configure_flushes_once_for_the_whole_batch() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[
            MfpConfig::new(1).af(1),
            MfpConfig::new(2).af(2),
            MfpConfig::new(3).af(3),
        ]);

        let s = state.borrow();
        assert_eq!(s.reads(), 1);
        assert_eq!(s.log.last(), Some(&Access::Read(READBACK)));
    }

    #[test]
    fn reconfigure_is_idempotent() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[pin12_config()]);
        let first = state.borrow().reg(off(12));

        ctrl.config(&[pin12_config()]);
        let s = state.borrow();
        assert_eq!(s.reg(off(12)), first);
        // Both passes wrote the identical word.
        assert_eq!(s.writes_to(off(12)), 2);
        assert!(s
            .log
            .iter()
            .all(|a| !matches!(a, Access::Write(o, v) if *o == off(12) && *v != first)));
    }

    #[test]
    fn lpm_clears_edges_before_applying_lpm_word() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[pin12_config()]);
        state.borrow_mut().log.clear();

        ctrl.config_lpm();

        let clr = (PIN12_RUN & !(MFPR_EDGE_RISE_EN | MFPR_EDGE_FALL_EN)) | MFPR_EDGE_CLEAR;
        let s = state.borrow();
        // Edge-clear write first, then the stored low-power word, then
        // the single readback flush.
        assert_eq!(
            s.log,
            vec![
                Access::Write(off(12), clr),
                Access::Write(off(12), PIN12_RUN),
                Access::Read(READBACK),
            ]
        );
    }

    #[test]
    fn lpm_then_run_restores_run_word_bit_for_bit() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[
            pin12_config(),
            MfpConfig::new(5).af(1).lpm(LpmState::PullLow),
            MfpConfig::new(9).af(4).edge(EdgeMode::Both),
        ]);
        let runs: Vec<u32> = [12u32, 5, 9]
            .iter()
            .map(|&p| state.borrow().reg(off(p)))
            .collect();

        ctrl.config_lpm();
        ctrl.config_run();

        let s = state.borrow();
        assert_eq!(s.reg(off(12)), runs[0]);
        assert_eq!(s.reg(off(5)), runs[1]);
        assert_eq!(s.reg(off(9)), runs[2]);
    }

    #[test]
    fn mode_switches_skip_unconfigured_pins() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[MfpConfig::new(1).af(1)]);
        state.borrow_mut().log.clear();

        ctrl.config_lpm();
        ctrl.config_run();

        let s = state.borrow();
        for pin in [0u32, 2, 3, 15] {
            assert_eq!(s.writes_to(off(pin)), 0, "pin {} must stay untouched", pin);
        }
        assert!(s.writes_to(off(1)) > 0);
    }

    #[test]
    fn lpm_keeps_run_mode_variant_skips_the_transition() {
        let variant = MfpVariant {
            lpm_keeps_run_mode: true,
            ..MfpVariant::DEFAULT
        };
        let (ctrl, state) = controller(variant);
        ctrl.config(&[pin12_config()]);
        state.borrow_mut().log.clear();

        ctrl.config_lpm();
        assert!(state.borrow().log.is_empty());

        // Run mode still works normally.
        ctrl.config_run();
        assert_eq!(state.borrow().reg(off(12)), PIN12_RUN);
    }

    #[test]
    fn raw_write_then_read_round_trips_and_flushes() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.write(7, 0x1234);

        {
            let s = state.borrow();
            assert_eq!(
                s.log,
                vec![Access::Write(off(7), 0x1234), Access::Read(READBACK)]
            );
        }
        assert_eq!(ctrl.read(7), 0x1234);
    }

    #[test]
    fn set_edge_rewrites_only_the_edge_field() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[pin12_config()]);
        state.borrow_mut().log.clear();

        ctrl.set_edge(12, EdgeMode::Both);

        let expected = (PIN12_RUN & !(MFPR_EDGE_BITS | MFPR_EDGE_CLEAR))
            | MFPR_EDGE_RISE_EN
            | MFPR_EDGE_FALL_EN;
        let s = state.borrow();
        assert_eq!(
            s.log,
            vec![
                Access::Read(off(12)),
                Access::Write(off(12), expected),
                Access::Read(READBACK),
            ]
        );

        drop(s);
        ctrl.set_edge(12, EdgeMode::None);
        assert_eq!(
            state.borrow().reg(off(12)),
            PIN12_RUN & !(MFPR_EDGE_BITS | MFPR_EDGE_CLEAR)
        );
    }

    #[test]
    #[should_panic(expected = "not configured")]
    fn set_edge_on_unconfigured_pin_fails_fast() {
        let (ctrl, _state) = controller(MfpVariant::DEFAULT);
        ctrl.set_edge(3, EdgeMode::Rise);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn config_with_out_of_range_pin_fails_fast() {
        let (ctrl, _state) = controller(MfpVariant::DEFAULT);
        ctrl.config(&[MfpConfig::new(MFP_PIN_MAX as u32)]);
    }

    #[test]
    fn out_of_range_pin_performs_no_register_write() {
        let (ctrl, state) = controller(MfpVariant::DEFAULT);
        let result = catch_unwind(AssertUnwindSafe(|| {
            ctrl.config(&[MfpConfig::new(300)]);
        }));
        assert!(result.is_err());
        assert!(state
            .borrow()
            .log
            .iter()
            .all(|a| !matches!(a, Access::Write(_, _))));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn raw_read_bounds_checked() {
        let (ctrl, _state) = controller(MfpVariant::DEFAULT);
        let _ = ctrl.read(MFP_PIN_MAX);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn raw_write_bounds_checked() {
        let (ctrl, _state) = controller(MfpVariant::DEFAULT);
        ctrl.write(MFP_PIN_MAX, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_edge_bounds_checked() {
        let (ctrl, _state) = controller(MfpVariant::DEFAULT);
        ctrl.set_edge(MFP_PIN_MAX, EdgeMode::Rise);
    }

    #[test]
    #[should_panic(expected = "address map not loaded")]
    fn configure_before_addr_map_fails_fast() {
        let (bus, _state) = FakeBus::new();
        let ctrl = MfpController::new(bus, MfpVariant::DEFAULT);
        ctrl.config(&[MfpConfig::new(0)]);
    }

    #[test]
    fn drive_shift_variant_applies_to_written_word() {
        let variant = MfpVariant {
            drive_shifted_left_by_one: true,
            ..MfpVariant::DEFAULT
        };
        let (ctrl, state) = controller(variant);
        ctrl.config(&[MfpConfig::new(2).drive(2)]);
        assert_eq!(state.borrow().reg(off(2)), 4 << 10);
    }
}
