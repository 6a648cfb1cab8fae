//! Opcode-slot qualifiers.
//!
//! A [`Qualifier`] declares one kind of opcode operand slot that an operand
//! can fill: `imm8`, `r32`, `rm64`, `m128`, the fixed `al` register, or an
//! `xmm/m128` slot. Every operand carries a small ordered set of them and an
//! encoder accepts the operand for a slot when any one qualifier equals the
//! slot's requirement.

#[cfg(feature = "serde")]
use alloc::vec::Vec;
use core::fmt;

/// Named register class used by opcode forms that require a specific
/// register or register file rather than a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegClass {
    /// Exactly the `al` register (string, I/O and short accumulator forms).
    Al,
    /// Any SSE register `xmm0`–`xmm7`.
    Xmm,
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegClass::Al => write!(f, "al"),
            RegClass::Xmm => write!(f, "xmm"),
        }
    }
}

/// One opcode-slot descriptor with independent optional axes.
///
/// Unset axes are `None`. Two qualifiers match only when every axis is
/// equal, so `{reg: Xmm, m: 128}` is a different slot from `{m: 128}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Qualifier {
    /// Immediate of this many bits.
    pub imm: Option<u16>,
    /// Direct register of this many bits.
    pub r: Option<u16>,
    /// Named register class.
    pub reg: Option<RegClass>,
    /// Memory reference of this many bits.
    pub m: Option<u16>,
    /// Register or memory of this many bits (ModR/M `r/m` field).
    pub rm: Option<u16>,
}

impl Qualifier {
    /// The qualifier with no axis set.
    pub const EMPTY: Qualifier = Qualifier {
        imm: None,
        r: None,
        reg: None,
        m: None,
        rm: None,
    };

    /// `immN` slot.
    #[inline]
    pub const fn imm(bits: u16) -> Self {
        Qualifier {
            imm: Some(bits),
            ..Self::EMPTY
        }
    }

    /// `rN` slot.
    #[inline]
    pub const fn r(bits: u16) -> Self {
        Qualifier {
            r: Some(bits),
            ..Self::EMPTY
        }
    }

    /// Named register-class slot (`al`, `xmm`).
    #[inline]
    pub const fn reg(class: RegClass) -> Self {
        Qualifier {
            reg: Some(class),
            ..Self::EMPTY
        }
    }

    /// `mN` slot.
    #[inline]
    pub const fn m(bits: u16) -> Self {
        Qualifier {
            m: Some(bits),
            ..Self::EMPTY
        }
    }

    /// `r/mN` slot.
    #[inline]
    pub const fn rm(bits: u16) -> Self {
        Qualifier {
            rm: Some(bits),
            ..Self::EMPTY
        }
    }

    /// Combined register-class-or-memory slot, e.g. `xmm/m128`.
    #[inline]
    pub const fn reg_m(class: RegClass, bits: u16) -> Self {
        Qualifier {
            reg: Some(class),
            m: Some(bits),
            ..Self::EMPTY
        }
    }

    /// Whether this qualifier fills the `required` slot.
    ///
    /// Exact comparison on every axis; no sign- or zero-extension is implied.
    #[inline]
    pub fn matches(&self, required: &Qualifier) -> bool {
        self == required
    }

    /// Whether no axis is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if !first {
                write!(f, "/")?;
            }
            first = false;
            Ok(())
        };
        if let Some(bits) = self.imm {
            sep(f)?;
            write!(f, "imm{}", bits)?;
        }
        if let Some(bits) = self.r {
            sep(f)?;
            write!(f, "r{}", bits)?;
        }
        if let Some(class) = self.reg {
            sep(f)?;
            write!(f, "{}", class)?;
        }
        if let Some(bits) = self.m {
            sep(f)?;
            write!(f, "m{}", bits)?;
        }
        if let Some(bits) = self.rm {
            sep(f)?;
            write!(f, "rm{}", bits)?;
        }
        if first {
            write!(f, "-")?;
        }
        Ok(())
    }
}

// ─── QualifierList: stack-allocated qualifier set ────────────────────

/// Stack-allocated qualifier set (max 3 qualifiers).
///
/// Memory operands carry at most `{m}`, `{rm}` and `{reg, m}`; immediates
/// carry one. Keeping the set inline means operand construction never
/// touches the heap.
#[derive(Clone, Copy)]
pub struct QualifierList {
    items: [Qualifier; 3],
    len: u8,
}

impl QualifierList {
    /// Maximum number of qualifiers.
    pub const MAX_LEN: usize = 3;

    /// Creates a new empty qualifier list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            items: [Qualifier::EMPTY; 3],
            len: 0,
        }
    }

    /// A list holding exactly one qualifier.
    #[inline]
    pub const fn one(q: Qualifier) -> Self {
        Self {
            items: [q, Qualifier::EMPTY, Qualifier::EMPTY],
            len: 1,
        }
    }

    /// A list holding two qualifiers.
    #[inline]
    pub const fn two(a: Qualifier, b: Qualifier) -> Self {
        Self {
            items: [a, b, Qualifier::EMPTY],
            len: 2,
        }
    }

    /// Appends a qualifier to the list.
    ///
    /// # Panics
    /// Panics if the list is full (> 3 qualifiers).
    #[inline]
    pub fn push(&mut self, q: Qualifier) {
        assert!(
            (self.len as usize) < Self::MAX_LEN,
            "QualifierList overflow: max {} qualifiers",
            Self::MAX_LEN
        );
        self.items[self.len as usize] = q;
        self.len += 1;
    }

    /// Returns the number of qualifiers.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the active qualifiers as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Qualifier] {
        &self.items[..self.len as usize]
    }
}

impl core::ops::Deref for QualifierList {
    type Target = [Qualifier];
    #[inline]
    fn deref(&self) -> &[Qualifier] {
        self.as_slice()
    }
}

impl PartialEq for QualifierList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for QualifierList {}

impl PartialEq<[Qualifier]> for QualifierList {
    fn eq(&self, other: &[Qualifier]) -> bool {
        self.as_slice() == other
    }
}

impl fmt::Debug for QualifierList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}

impl Default for QualifierList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a QualifierList {
    type Item = &'a Qualifier;
    type IntoIter = core::slice::Iter<'a, Qualifier>;
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for QualifierList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for q in self.as_slice() {
            seq.serialize_element(q)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for QualifierList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v: Vec<Qualifier> = Vec::deserialize(deserializer)?;
        if v.len() > Self::MAX_LEN {
            return Err(serde::de::Error::custom(alloc::format!(
                "too many qualifiers: {} > {}",
                v.len(),
                Self::MAX_LEN
            )));
        }
        let mut list = Self::new();
        for q in v {
            list.push(q);
        }
        Ok(list)
    }
}

/// Whether any qualifier in `set` fills the `required` slot.
#[inline]
pub(crate) fn any_matches(set: &[Qualifier], required: &Qualifier) -> bool {
    set.iter().any(|q| q.matches(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn constructors_set_single_axis() {
        assert_eq!(Qualifier::imm(8).imm, Some(8));
        assert_eq!(Qualifier::r(32).r, Some(32));
        assert_eq!(Qualifier::m(64).m, Some(64));
        assert_eq!(Qualifier::rm(16).rm, Some(16));
        assert_eq!(Qualifier::reg(RegClass::Al).reg, Some(RegClass::Al));
        assert!(Qualifier::EMPTY.is_empty());
        assert!(!Qualifier::m(8).is_empty());
    }

    #[test]
    fn combined_qualifier_is_distinct_from_parts() {
        let combo = Qualifier::reg_m(RegClass::Xmm, 128);
        assert!(combo.matches(&Qualifier::reg_m(RegClass::Xmm, 128)));
        assert!(!combo.matches(&Qualifier::m(128)));
        assert!(!combo.matches(&Qualifier::reg(RegClass::Xmm)));
    }

    #[test]
    fn matching_is_exact_width() {
        assert!(!Qualifier::rm(32).matches(&Qualifier::rm(64)));
        assert!(!Qualifier::imm(8).matches(&Qualifier::imm(16)));
    }

    #[test]
    fn any_matches_scans_set() {
        let set = [Qualifier::m(32), Qualifier::rm(32)];
        assert!(any_matches(&set, &Qualifier::rm(32)));
        assert!(!any_matches(&set, &Qualifier::r(32)));
        assert!(!any_matches(&[], &Qualifier::r(32)));
    }

    #[test]
    fn qualifier_display() {
        assert_eq!(format!("{}", Qualifier::imm(8)), "imm8");
        assert_eq!(format!("{}", Qualifier::rm(64)), "rm64");
        assert_eq!(format!("{}", Qualifier::reg(RegClass::Al)), "al");
        assert_eq!(
            format!("{}", Qualifier::reg_m(RegClass::Xmm, 128)),
            "xmm/m128"
        );
        assert_eq!(format!("{}", Qualifier::EMPTY), "-");
    }

    #[test]
    fn list_push_and_slice() {
        let mut list = QualifierList::two(Qualifier::m(128), Qualifier::rm(128));
        list.push(Qualifier::reg_m(RegClass::Xmm, 128));
        assert_eq!(list.len(), 3);
        assert_eq!(list[2], Qualifier::reg_m(RegClass::Xmm, 128));
        assert_eq!(QualifierList::one(Qualifier::imm(8)).len(), 1);
        assert!(QualifierList::new().is_empty());
    }

    #[test]
    #[should_panic(expected = "QualifierList overflow")]
    fn list_overflow_panics() {
        let mut list = QualifierList::new();
        for _ in 0..4 {
            list.push(Qualifier::m(8));
        }
    }

    #[test]
    fn list_equality_ignores_unused_slots() {
        let mut a = QualifierList::new();
        a.push(Qualifier::m(8));
        let b = QualifierList::one(Qualifier::m(8));
        assert_eq!(a, b);
        assert_eq!(format!("{:?}", a).matches("Qualifier").count(), 1);
    }
}
