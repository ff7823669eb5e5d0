use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::classify::record::DifferenceRecord;
use crate::snapshot::model::GridRange;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// 128-bit digest of a difference list, stable across runs and platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiffFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for DiffFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl serde::Serialize for DiffFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DiffFingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let v = (s.len() == 32)
            .then(|| u128::from_str_radix(&s, 16).ok())
            .flatten()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid fingerprint '{s}'")))?;
        Ok(Self {
            hi: (v >> 64) as u64,
            lo: v as u64,
        })
    }
}

/// Fingerprint the fields that identify a finding: kind, selector, index, ranges, counts,
/// deltas and severity. Messages are skipped, they only restate the other fields.
pub fn fingerprint_differences(differences: &[DifferenceRecord]) -> DiffFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(differences.len() as u64);
    for d in differences {
        write_record(&mut h, d);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn write_opt_usize(&mut self, v: Option<usize>) {
        match v {
            Some(v) => {
                self.write_u8(1);
                self.write_u64(v as u64);
            }
            None => self.write_u8(0),
        }
    }

    fn finish(self) -> DiffFingerprint {
        let v = self.inner.digest128();
        DiffFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_record(h: &mut StableHasher, d: &DifferenceRecord) {
    h.write_str(d.kind.as_str());
    h.write_str(&d.selector);
    h.write_opt_usize(d.index);
    write_range(h, d.reference_range.as_ref());
    write_range(h, d.candidate_range.as_ref());
    h.write_opt_usize(d.reference_count);
    h.write_opt_usize(d.candidate_count);
    h.write_u64(d.differences.len() as u64);
    for delta in &d.differences {
        h.write_str(delta);
    }
    h.write_str(d.severity.as_str());
}

fn write_range(h: &mut StableHasher, r: Option<&GridRange>) {
    match r {
        Some(r) => {
            h.write_u8(1);
            h.write_str(&r.label());
        }
        None => h.write_u8(0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/fingerprint.rs"]
mod tests;
