use crate::error::SimulationError;
use crate::iupac_code::{self, IupacCode};
use anyhow::Result;
use bio::io::fasta;
use gb_io::seq::Topology;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;

type DNAstring = Vec<u8>;

/// A validated, canonicalized target sequence. The normalized view contains
/// only the four canonical bases; whitespace is stripped and `U` is resolved
/// to `T` during construction. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    id: String,
    raw_sequence: String,
    seq: DNAstring,
    is_circular: bool,
}

impl Template {
    pub fn new(id: &str, raw_sequence: &str, is_circular: bool) -> Result<Self, SimulationError> {
        let subject = format!("template '{id}'");
        let mut seq = DNAstring::with_capacity(raw_sequence.len());
        for (pos, c) in raw_sequence.bytes().enumerate() {
            if c.is_ascii_whitespace() {
                continue;
            }
            let upper = c.to_ascii_uppercase();
            if IupacCode::is_canonical_letter(upper) {
                seq.push(upper);
            } else if upper == b'U' {
                seq.push(b'T');
            } else {
                return Err(SimulationError::validation(
                    subject,
                    format!("invalid base '{}' at position {pos}", c as char),
                ));
            }
        }
        if seq.is_empty() {
            return Err(SimulationError::validation(subject, "empty sequence"));
        }
        Ok(Self {
            id: id.to_string(),
            raw_sequence: raw_sequence.to_string(),
            seq,
            is_circular,
        })
    }

    /// A linear pseudo-template that keeps degenerate IUPAC symbols intact.
    /// Used by the dimer check, which probes primers against each other;
    /// real templates go through `new` and stay canonical.
    pub(crate) fn from_iupac(id: &str, sequence: &str) -> Result<Self, SimulationError> {
        let upper = sequence.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(SimulationError::validation(
                format!("template '{id}'"),
                "empty sequence",
            ));
        }
        for (pos, c) in upper.bytes().enumerate() {
            if !IupacCode::is_valid_letter(c) {
                return Err(SimulationError::validation(
                    format!("template '{id}'"),
                    format!("invalid IUPAC symbol '{}' at position {pos}", c as char),
                ));
            }
        }
        Ok(Self {
            id: id.to_string(),
            raw_sequence: sequence.to_string(),
            seq: upper.into_bytes(),
            is_circular: false,
        })
    }

    pub fn from_fasta_file(filename: &str) -> Result<Vec<Template>> {
        let file = File::open(filename)?;
        let mut ret = vec![];
        for record in fasta::Reader::new(file).records() {
            let record = record?;
            let seq = std::str::from_utf8(record.seq())?.to_string();
            ret.push(Template::new(record.id(), &seq, false)?);
        }
        Ok(ret)
    }

    pub fn from_genbank_file(filename: &str) -> Result<Vec<Template>> {
        let mut ret = vec![];
        for seq in gb_io::reader::parse_file(filename)? {
            let id = seq.name.clone().unwrap_or_else(|| "genbank".to_string());
            let is_circular = seq.topology == Topology::Circular;
            let text = String::from_utf8_lossy(&seq.seq).to_string();
            ret.push(Template::new(&id, &text, is_circular)?);
        }
        Ok(ret)
    }

    #[inline(always)]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw_sequence(&self) -> &str {
        &self.raw_sequence
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    #[inline(always)]
    pub fn is_circular(&self) -> bool {
        self.is_circular
    }

    #[inline(always)]
    pub fn wrap(&self, index: usize) -> usize {
        if self.is_circular {
            index % self.len()
        } else {
            index
        }
    }

    #[inline(always)]
    pub fn base_at(&self, index: usize) -> Option<u8> {
        self.seq.get(self.wrap(index)).copied()
    }

    /// Wrap-aware subsequence. On a circular template a range crossing the
    /// origin concatenates tail and head; on a linear template it is `None`.
    pub fn slice(&self, start: usize, length: usize) -> Option<DNAstring> {
        if length == 0 {
            return None;
        }
        if self.is_circular {
            if length > self.len() {
                return None;
            }
            let start = self.wrap(start);
            Some(
                (0..length)
                    .map(|k| self.seq[(start + k) % self.len()])
                    .collect(),
            )
        } else {
            let end = start.checked_add(length)?;
            if end > self.len() {
                return None;
            }
            Some(self.seq[start..end].to_vec())
        }
    }

    /// Distance from `from` to `to` walking the sense direction. On a
    /// circular template this wraps modulo length, and a zero-length span is
    /// reported as the full circle (a product ending where it starts covers
    /// the whole template). On a linear template `to` upstream of `from` is
    /// `None`.
    pub fn sense_distance(&self, from: usize, to: usize) -> Option<usize> {
        if self.is_circular {
            let d = (self.wrap(to) + self.len() - self.wrap(from)) % self.len();
            Some(if d == 0 { self.len() } else { d })
        } else if to >= from {
            Some(to - from)
        } else {
            None
        }
    }

    pub fn reverse_complement(&self) -> DNAstring {
        iupac_code::reverse_complement(&self.seq)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalization() {
        let t = Template::new("t", "acg tU\nacgt", false).unwrap();
        assert_eq!(t.forward(), b"ACGTTACGT");
        assert_eq!(t.len(), 9);
    }

    #[test]
    fn test_rejects_invalid_base() {
        let err = Template::new("t", "ACGQ", false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("'Q'"));
        assert!(text.contains("position 3"));
    }

    #[test]
    fn test_rejects_degenerate_template_base() {
        assert!(Template::new("t", "ACGN", false).is_err());
        assert!(Template::new("t", "ACGR", false).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Template::new("t", "", false).is_err());
        assert!(Template::new("t", "  \n ", true).is_err());
    }

    #[test]
    fn test_base_at() {
        let linear = Template::new("t", "ATGC", false).unwrap();
        assert_eq!(linear.base_at(0), Some(b'A'));
        assert_eq!(linear.base_at(3), Some(b'C'));
        assert_eq!(linear.base_at(4), None);

        let circular = Template::new("t", "ATGC", true).unwrap();
        assert_eq!(circular.base_at(4), Some(b'A'));
        assert_eq!(circular.base_at(7), Some(b'C'));
    }

    #[test]
    fn test_slice() {
        let linear = Template::new("t", "ATGC", false).unwrap();
        assert_eq!(linear.slice(0, 4), Some(b"ATGC".to_vec()));
        assert_eq!(linear.slice(1, 2), Some(b"TG".to_vec()));
        assert_eq!(linear.slice(1, 4), None);
        assert_eq!(linear.slice(0, 0), None);

        let circular = Template::new("t", "ATGC", true).unwrap();
        assert_eq!(circular.slice(0, 4), Some(b"ATGC".to_vec()));
        assert_eq!(circular.slice(2, 4), Some(b"GCAT".to_vec()));
        assert_eq!(circular.slice(3, 2), Some(b"CA".to_vec()));
        assert_eq!(circular.slice(0, 5), None);
    }

    #[test]
    fn test_sense_distance() {
        let linear = Template::new("t", "ATGCATGC", false).unwrap();
        assert_eq!(linear.sense_distance(0, 8), Some(8));
        assert_eq!(linear.sense_distance(2, 6), Some(4));
        assert_eq!(linear.sense_distance(6, 2), None);

        let circular = Template::new("t", "ATGCATGC", true).unwrap();
        assert_eq!(circular.sense_distance(2, 6), Some(4));
        assert_eq!(circular.sense_distance(6, 2), Some(4));
        assert_eq!(circular.sense_distance(3, 3), Some(8));
    }

    #[test]
    fn test_reverse_complement() {
        let t = Template::new("t", "AAAACCCCGGGGTTTT", false).unwrap();
        assert_eq!(t.reverse_complement(), b"AAAACCCCGGGGTTTT".to_vec());
        let t = Template::new("t", "AACG", false).unwrap();
        assert_eq!(t.reverse_complement(), b"CGTT".to_vec());
    }

    #[test]
    fn test_from_iupac_keeps_degenerate_symbols() {
        let t = Template::from_iupac("p", "acgrn").unwrap();
        assert_eq!(t.forward(), b"ACGRN");
        assert!(Template::from_iupac("p", "ACG!").is_err());
    }

    #[test]
    fn test_from_fasta_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">plasmid_a test\nAAAACCCC\nGGGGTTTT").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let templates = Template::from_fasta_file(&path).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id(), "plasmid_a");
        assert_eq!(templates[0].forward(), b"AAAACCCCGGGGTTTT");
        assert!(!templates[0].is_circular());
    }
}
