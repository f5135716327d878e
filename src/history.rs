//! History registers used to index predictor tables.

use bitvec::prelude::*;

/// A global history register [GHR] recording the most recent outcomes.
///
/// Bit 0 is the most-recent outcome.
#[derive(Clone, Debug)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0 && len <= usize::BITS as usize,
            "history length {} doesn't fit in a machine word", len);
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }

    /// Shift the register by 'n' bits.
    /// The bottom 'n' bits become zero, and the top 'n' bits are discarded.
    pub fn shift_by(&mut self, n: usize) {
        self.data.shift_end(n);
    }

    /// Shift the register by one bit and record a new outcome in bit 0.
    pub fn push(&mut self, bit: impl Into<bool>) {
        self.shift_by(1);
        self.data.set(0, bit.into());
    }

    /// Return the contents of the register as an integer.
    pub fn value(&self) -> usize {
        self.data.load_le::<usize>()
    }

    /// Clear all bits in the register.
    pub fn reset(&mut self) {
        self.data.fill(false);
    }
}

/// A path history register [PHR].
///
/// Unlike a [HistoryRegister], each update shifts by more than one bit and
/// mixes in some bits from the address [and target] of the branch.
#[derive(Clone, Debug)]
pub struct PathHistoryRegister {
    data: usize,
    len: usize,
}

impl std::fmt::Display for PathHistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.data, width = self.len)
    }
}

impl PathHistoryRegister {
    /// Create a register with the specified length in bits.
    pub fn new(len: usize) -> Self {
        assert!(len > 0 && len < usize::BITS as usize);
        Self { data: 0, len }
    }

    pub fn len(&self) -> usize { self.len }

    /// Return the contents of the register.
    pub fn value(&self) -> usize { self.data }

    /// Keep the bits selected by 'keep_mask', shift them up by 'by' bits,
    /// and XOR in 'bits'.
    ///
    /// The result must fit in the length of the register.
    pub fn shift_in(&mut self, keep_mask: usize, by: usize, bits: usize) {
        let next = ((self.data & keep_mask) << by) ^ bits;
        assert!(next >> self.len == 0,
            "path history {:#x} overflows {} bits", next, self.len);
        self.data = next;
    }

    pub fn reset(&mut self) {
        self.data = 0;
    }
}
