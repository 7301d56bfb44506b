const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// A bitmasked IUPAC code for DNA bases, eg DNA_BITMASK_A|DNA_BITMASK_C.
/// Single source of truth for degenerate-base semantics; both the binding
/// site scan and the dimer check compare bases through this table.
#[derive(Debug, Copy, Clone, PartialEq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    pub fn new(bitmask: u8) -> Self {
        Self(bitmask)
    }

    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        match letter.to_ascii_uppercase() {
            b'A' => Self(DNA_BITMASK_A),
            b'C' => Self(DNA_BITMASK_C),
            b'G' => Self(DNA_BITMASK_G),
            b'T' => Self(DNA_BITMASK_T),
            b'U' => Self(DNA_BITMASK_T),
            b'W' => Self(DNA_BITMASK_A | DNA_BITMASK_T),
            b'S' => Self(DNA_BITMASK_C | DNA_BITMASK_G),
            b'M' => Self(DNA_BITMASK_A | DNA_BITMASK_C),
            b'K' => Self(DNA_BITMASK_G | DNA_BITMASK_T),
            b'R' => Self(DNA_BITMASK_A | DNA_BITMASK_G),
            b'Y' => Self(DNA_BITMASK_C | DNA_BITMASK_T),
            b'B' => Self(DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T),
            b'D' => Self(DNA_BITMASK_A | DNA_BITMASK_G | DNA_BITMASK_T),
            b'H' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_T),
            b'V' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G),
            b'N' => Self(DNA_BITMASK_N),
            _ => Self(0),
        }
    }

    #[inline(always)]
    pub fn to_letter(self) -> u8 {
        match self.0 {
            0 => b' ',
            1 => b'A',
            2 => b'C',
            3 => b'M',
            4 => b'G',
            5 => b'R',
            6 => b'S',
            7 => b'V',
            8 => b'T',
            9 => b'W',
            10 => b'Y',
            11 => b'H',
            12 => b'K',
            13 => b'D',
            14 => b'B',
            _ => b'N',
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn subset(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        !Self::from_letter(letter).is_empty()
    }

    #[inline(always)]
    pub fn is_canonical_letter(letter: u8) -> bool {
        matches!(letter.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')
    }

    /// Base complement as a bitmask operation, so degenerate codes map to
    /// their degenerate complement (R <-> Y, B <-> V, N <-> N, ...).
    #[inline(always)]
    pub fn complement(self) -> Self {
        let mut c = 0u8;
        if self.0 & DNA_BITMASK_A != 0 {
            c |= DNA_BITMASK_T;
        }
        if self.0 & DNA_BITMASK_C != 0 {
            c |= DNA_BITMASK_G;
        }
        if self.0 & DNA_BITMASK_G != 0 {
            c |= DNA_BITMASK_C;
        }
        if self.0 & DNA_BITMASK_T != 0 {
            c |= DNA_BITMASK_A;
        }
        Self(c)
    }

    #[inline(always)]
    pub fn letter_complement(letter: u8) -> u8 {
        Self::from_letter(letter).complement().to_letter()
    }
}

/// Does `primer_symbol` accept `template_base`? Exact matches and in-set
/// degenerate matches cost nothing; everything else is a mismatch. Both
/// sides may be degenerate (the dimer check probes primer against primer),
/// in which case any overlap of the two base sets counts as compatible.
#[inline(always)]
pub fn base_matches(template_base: u8, primer_symbol: u8) -> bool {
    !IupacCode::from_letter(primer_symbol)
        .subset(IupacCode::from_letter(template_base))
        .is_empty()
}

/// Reverse complement preserving degenerate symbols.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|c| IupacCode::letter_complement(*c))
        .collect()
}
