use alloc::vec::Vec;

use crate::{
    OneWire, OneWireError, OneWireResult, Rom,
    consts::{
        ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_DEFAULT_RETRIES, ONEWIRE_ROM_BITS,
        ONEWIRE_SEARCH_CMD,
    },
    retry::retry,
    utils::OneWireCrc,
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devicess with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

/// Bus answer to one search step: the id bit and its complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitPair {
    /// `(0, 0)`: devices disagree on this bit.
    Collision,
    /// `(1, 0)`: every remaining device has a 1.
    One,
    /// `(0, 1)`: every remaining device has a 0.
    Zero,
    /// `(1, 1)`: nobody answered.
    Vacant,
}

impl From<u8> for BitPair {
    fn from(bits: u8) -> Self {
        match bits & 0x03 {
            0 => BitPair::Collision,
            1 => BitPair::One,
            2 => BitPair::Zero,
            _ => BitPair::Vacant,
        }
    }
}

/// A subtree still to be walked.
///
/// Positions up to and including `depth` replay `prefix` when they collide,
/// deeper collisions are new and get steered to 0. The root has no depth.
#[derive(Debug, Clone, Copy)]
struct Branch {
    prefix: u64,
    depth: Option<u8>,
}

impl Branch {
    const ROOT: Branch = Branch {
        prefix: 0,
        depth: None,
    };

    fn is_new_collision(&self, bit: u8) -> bool {
        self.depth.is_none_or(|depth| bit > depth)
    }
}

/// Outcome of one successful search pass.
struct Pass {
    rom: u64,
    /// Address accumulated before each newly seen collision.
    collisions: [Option<u64>; ONEWIRE_ROM_BITS],
}

impl Pass {
    /// Subtrees that take the 1 side of every new collision, deepest first so
    /// that popping them off a stack visits the shallowest first.
    fn branches(&self) -> impl Iterator<Item = Branch> + '_ {
        self.collisions
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(bit, &partial)| {
                partial.map(|partial| Branch {
                    prefix: partial | 1 << bit,
                    depth: Some(bit as u8),
                })
            })
    }
}

/// A structure for searching devices on a 1-Wire bus.
/// This structure implements the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html)
/// as a depth-first walk of the ROM binary tree.
///
/// Every pass down the tree is retried as a whole (reset, search command and
/// 64 bit steps) up to the configured number of attempts.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cmd: u8,
    retries: u8,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `cmd` - The kind of search (e.g., `0xf0` for normal search, `0xec` for search in alarm state).
    pub fn new(onewire: &'a mut T, cmd: OneWireSearchKind) -> Self {
        Self {
            onewire,
            cmd: cmd as _,
            retries: ONEWIRE_DEFAULT_RETRIES,
        }
    }

    /// Set the number of attempts for every pass down the tree.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }
}

impl<T: OneWire> OneWireSearch<'_, T>
where
    T::BusError: core::fmt::Debug,
{
    /// Finds the ROM codes of all devices on the 1-Wire bus.
    ///
    /// The first pass steers every collision towards 0. Each collision it
    /// meets becomes a pending branch that replays the same path and then
    /// takes the 1 side. Branches are explored depth first, shallowest
    /// collision first, so each device is reported exactly once.
    ///
    /// # Errors
    /// [`OneWireError::EnumerationFailed`] if the first pass fails on every
    /// attempt. A failing branch below it is dropped from the result instead.
    pub fn search_all(&mut self) -> OneWireResult<Vec<Rom>, T::BusError> {
        let mut roms = Vec::new();
        let mut pending = alloc::vec![Branch::ROOT];
        while let Some(branch) = pending.pop() {
            let pass = match self.pass_with_retries(&branch) {
                Ok(pass) => pass,
                Err(err) if branch.depth.is_none() => {
                    log::warn!("search failed: {:?}", err);
                    return Err(if err.is_retryable() {
                        OneWireError::EnumerationFailed
                    } else {
                        err
                    });
                }
                Err(err) => {
                    log::warn!(
                        "dropping branch at bit {:?} ({:016x}): {:?}",
                        branch.depth,
                        branch.prefix,
                        err
                    );
                    continue;
                }
            };
            roms.push(Rom::new(pass.rom));
            pending.extend(pass.branches());
        }
        Ok(roms)
    }

    /// Verifies if the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// Runs a single pass that resolves every collision along `rom`.
    pub fn verify(&mut self, rom: Rom) -> OneWireResult<bool, T::BusError> {
        let branch = Branch {
            prefix: rom.value(),
            depth: Some(ONEWIRE_ROM_BITS as u8 - 1),
        };
        match self.pass_with_retries(&branch) {
            Ok(pass) => Ok(pass.rom == rom.value()),
            Err(OneWireError::NoDevicePresent | OneWireError::InvalidCrc) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn pass_with_retries(&mut self, branch: &Branch) -> OneWireResult<Pass, T::BusError> {
        retry(self.retries, OneWireError::is_retryable, |_| self.pass(branch))
    }

    fn pass(&mut self, branch: &Branch) -> OneWireResult<Pass, T::BusError> {
        self.onewire.reset()?;
        self.onewire.write_byte(self.cmd)?;

        let mut rom: u64 = 0;
        let mut collisions = [None; ONEWIRE_ROM_BITS];
        for bit in 0..ONEWIRE_ROM_BITS as u8 {
            let dir = match BitPair::from(self.onewire.read_2bits()?) {
                BitPair::Collision if branch.is_new_collision(bit) => {
                    collisions[bit as usize] = Some(rom);
                    false
                }
                BitPair::Collision => branch.prefix >> bit & 1 == 1,
                BitPair::One => true,
                BitPair::Zero => false,
                BitPair::Vacant => return Err(OneWireError::NoDevicePresent),
            };
            self.onewire.write_bit(dir)?;
            if dir {
                rom |= 1 << bit;
            }
        }

        if rom == 0 {
            return Err(OneWireError::NoDevicePresent);
        }
        let mut crc = OneWireCrc::default();
        crc.update_all(&rom.to_le_bytes());
        crc.verify::<T::BusError>()?;
        Ok(Pass { rom, collisions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

    #[derive(Debug, PartialEq)]
    struct Glitch;

    /// Wired-AND bus with a fixed set of devices.
    struct SimBus {
        roms: Vec<u64>,
        selected: Vec<bool>,
        bit: u32,
        passes: usize,
        /// Passes (1-based) whose bit reads fail.
        glitch: core::ops::RangeInclusive<usize>,
    }

    impl SimBus {
        fn new(roms: &[u64]) -> Self {
            Self {
                roms: roms.to_vec(),
                selected: vec![true; roms.len()],
                bit: 0,
                passes: 0,
                glitch: 1..=0,
            }
        }

        fn with_glitch(mut self, passes: core::ops::RangeInclusive<usize>) -> Self {
            self.glitch = passes;
            self
        }

        fn active(&self) -> impl Iterator<Item = u64> + '_ {
            self.roms
                .iter()
                .zip(self.selected.iter())
                .filter(|(_, sel)| **sel)
                .map(|(rom, _)| *rom)
        }
    }

    impl OneWire for SimBus {
        type BusError = Glitch;

        fn reset(&mut self) -> OneWireResult<(), Glitch> {
            self.selected.iter_mut().for_each(|s| *s = true);
            self.bit = 0;
            Ok(())
        }

        fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Glitch> {
            let pos = self.bit;
            for (rom, sel) in self.roms.iter().zip(self.selected.iter_mut()) {
                if (rom >> pos & 1 == 1) != bit {
                    *sel = false;
                }
            }
            self.bit += 1;
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Glitch> {
            if byte == ONEWIRE_SEARCH_CMD {
                self.passes += 1;
            }
            Ok(())
        }

        fn write_4bytes(&mut self, _word: u32) -> OneWireResult<(), Glitch> {
            Ok(())
        }

        fn read_2bits(&mut self) -> OneWireResult<u8, Glitch> {
            if self.glitch.contains(&self.passes) {
                return Err(OneWireError::Other(Glitch));
            }
            let pos = self.bit;
            let id = self.active().all(|rom| rom >> pos & 1 == 1);
            let complement = self.active().all(|rom| rom >> pos & 1 == 0);
            Ok(id as u8 | (complement as u8) << 1)
        }

        fn read_byte(&mut self) -> OneWireResult<u8, Glitch> {
            Ok(0xff)
        }

        fn read_4bytes(&mut self) -> OneWireResult<u32, Glitch> {
            Ok(0xffff_ffff)
        }
    }

    fn with_crc(body: u64) -> u64 {
        let body = body & 0x00ff_ffff_ffff_ffff;
        let crc = OneWireCrc::checksum(&body.to_le_bytes()[..7]);
        body | (crc as u64) << 56
    }

    fn sorted(mut roms: Vec<u64>) -> Vec<u64> {
        roms.sort_unstable();
        roms
    }

    fn search(bus: &mut SimBus) -> OneWireResult<Vec<u64>, Glitch> {
        OneWireSearch::new(bus, OneWireSearchKind::Normal)
            .search_all()
            .map(|roms| roms.into_iter().map(u64::from).collect())
    }

    #[test]
    fn single_device() {
        let rom = 0xa200_0000_01b8_1c02;
        let mut bus = SimBus::new(&[rom]);
        assert_eq!(search(&mut bus).unwrap(), vec![rom]);
        assert_eq!(bus.passes, 1);
    }

    #[test]
    fn collision_revisited_once() {
        // bodies differ in bits 3 and 5 only
        let a = with_crc(0x0000_0012_3456_7828);
        let b = with_crc(0x0000_0012_3456_7828 ^ (1 << 3) ^ (1 << 5));
        let mut bus = SimBus::new(&[a, b]);
        let found = search(&mut bus).unwrap();
        // bit 3 is steered to 0 first
        assert_eq!(found, vec![b, a]);
        assert_eq!(bus.passes, 2);
    }

    #[test]
    fn collision_at_first_bit() {
        let a = with_crc(0x0000_00aa_bbcc_dd28);
        let b = with_crc(0x0000_00aa_bbcc_dd29);
        let mut bus = SimBus::new(&[a, b]);
        assert_eq!(sorted(search(&mut bus).unwrap()), sorted(vec![a, b]));
    }

    #[test]
    fn finds_every_device_exactly_once() {
        let mut rng = StdRng::seed_from_u64(0xf0);
        for n in 1..24 {
            let mut roms: Vec<u64> = (0..n).map(|_| with_crc(rng.random::<u64>() | 1)).collect();
            roms.sort_unstable();
            roms.dedup();
            let mut wired = roms.clone();
            wired.shuffle(&mut rng);

            let mut bus = SimBus::new(&wired);
            let found = search(&mut bus).unwrap();
            assert_eq!(found.len(), roms.len());
            assert_eq!(sorted(found), roms);
            assert_eq!(bus.passes, roms.len());
        }
    }

    #[test]
    fn empty_bus_fails_after_retries() {
        let mut bus = SimBus::new(&[]);
        assert!(matches!(
            search(&mut bus),
            Err(OneWireError::EnumerationFailed)
        ));
        assert_eq!(bus.passes, 3);
    }

    #[test]
    fn corrupt_rom_is_rejected() {
        let mut bus = SimBus::new(&[with_crc(0x1234_5678_9a28) ^ 1 << 60]);
        assert!(matches!(
            search(&mut bus),
            Err(OneWireError::EnumerationFailed)
        ));
        assert_eq!(bus.passes, 3);
    }

    #[test]
    fn all_zero_rom_is_rejected() {
        let mut bus = SimBus::new(&[0]);
        assert!(matches!(
            search(&mut bus),
            Err(OneWireError::EnumerationFailed)
        ));
    }

    #[test]
    fn transient_glitch_is_retried() {
        let rom = with_crc(0x0000_0000_0042_4228);
        let mut bus = SimBus::new(&[rom]).with_glitch(1..=2);
        assert_eq!(search(&mut bus).unwrap(), vec![rom]);
        assert_eq!(bus.passes, 3);
    }

    #[test]
    fn failing_branch_is_dropped() {
        let a = with_crc(0x0000_0000_0000_1028);
        let b = with_crc(0x0000_0000_0000_1128);
        let mut bus = SimBus::new(&[a, b]).with_glitch(2..=4);
        assert_eq!(search(&mut bus).unwrap(), vec![a]);
        assert_eq!(bus.passes, 4);
    }

    #[test]
    fn custom_retry_budget() {
        let mut bus = SimBus::new(&[]);
        let res = OneWireSearch::new(&mut bus, OneWireSearchKind::Alarmed)
            .with_retries(5)
            .search_all();
        assert!(matches!(res, Err(OneWireError::EnumerationFailed)));
    }

    #[test]
    fn verify_present_and_absent() {
        let a = with_crc(0x0000_0000_0000_1028);
        let b = with_crc(0x0000_0000_0000_1128);
        let c = with_crc(0x0000_0000_0000_1228);
        let mut bus = SimBus::new(&[a, b]);
        let mut search = OneWireSearch::new(&mut bus, OneWireSearchKind::Normal);
        assert!(search.verify(Rom::new(a)).unwrap());
        assert!(search.verify(Rom::new(b)).unwrap());
        assert!(!search.verify(Rom::new(c)).unwrap());
    }

    #[test]
    fn bit_pair_decoding() {
        assert_eq!(BitPair::from(0), BitPair::Collision);
        assert_eq!(BitPair::from(1), BitPair::One);
        assert_eq!(BitPair::from(2), BitPair::Zero);
        assert_eq!(BitPair::from(3), BitPair::Vacant);
        assert_eq!(BitPair::from(0xfe), BitPair::Zero);
    }
}
