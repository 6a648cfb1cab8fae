//! Operand values handed to the encoder.
//!
//! Values are built by the constructors in [`crate::addressing`] and are
//! read-only afterwards. Besides its qualifier set, a memory operand
//! exposes the raw base/index/scale/displacement fields needed to write
//! ModR/M, SIB and displacement bytes.

use core::fmt;

use crate::qualifier::{any_matches, Qualifier, QualifierList};
use crate::register::Register;

/// Operand width (from `byte ptr`, `dword ptr`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandSize {
    /// 8-bit (`byte ptr`).
    Byte,
    /// 16-bit (`word ptr`).
    Word,
    /// 32-bit (`dword ptr`).
    Dword,
    /// 64-bit (`qword ptr`).
    Qword,
    /// 128-bit (`xmmword ptr`).
    Xmmword,
}

impl OperandSize {
    /// Return the operand size in bits.
    pub const fn bits(self) -> u16 {
        match self {
            OperandSize::Byte => 8,
            OperandSize::Word => 16,
            OperandSize::Dword => 32,
            OperandSize::Qword => 64,
            OperandSize::Xmmword => 128,
        }
    }

    /// Inverse of [`OperandSize::bits`].
    pub const fn from_bits(bits: u16) -> Option<OperandSize> {
        match bits {
            8 => Some(OperandSize::Byte),
            16 => Some(OperandSize::Word),
            32 => Some(OperandSize::Dword),
            64 => Some(OperandSize::Qword),
            128 => Some(OperandSize::Xmmword),
            _ => None,
        }
    }
}

impl fmt::Display for OperandSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandSize::Byte => write!(f, "byte"),
            OperandSize::Word => write!(f, "word"),
            OperandSize::Dword => write!(f, "dword"),
            OperandSize::Qword => write!(f, "qword"),
            OperandSize::Xmmword => write!(f, "xmmword"),
        }
    }
}

/// SIB scale field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scale {
    /// Index × 1 (SIB.ss = 00).
    X1,
    /// Index × 2 (SIB.ss = 01).
    X2,
    /// Index × 4 (SIB.ss = 10).
    X4,
    /// Index × 8 (SIB.ss = 11).
    X8,
}

impl Scale {
    /// Map a logical scale factor to its SIB code; `None` unless 1, 2, 4 or 8.
    pub const fn from_factor(factor: u8) -> Option<Scale> {
        match factor {
            1 => Some(Scale::X1),
            2 => Some(Scale::X2),
            4 => Some(Scale::X4),
            8 => Some(Scale::X8),
            _ => None,
        }
    }

    /// The 2-bit value written to SIB bits 7:6.
    pub const fn code(self) -> u8 {
        match self {
            Scale::X1 => 0,
            Scale::X2 => 1,
            Scale::X4 => 2,
            Scale::X8 => 3,
        }
    }

    /// The multiplier applied to the index register.
    pub const fn factor(self) -> u8 {
        1 << self.code()
    }
}

/// An immediate operand with its minimal unsigned encoding width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Immediate {
    pub(crate) value: u32,
    pub(crate) size: OperandSize,
    pub(crate) qualifiers: QualifierList,
}

impl Immediate {
    /// The raw value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Encoding width: `Byte`, `Word` or `Dword`.
    pub fn size(&self) -> OperandSize {
        self.size
    }

    /// Encoding width in bits.
    pub fn bits(&self) -> u16 {
        self.size.bits()
    }

    /// Always a single `immN` qualifier.
    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    /// See [`Operand::satisfies`].
    pub fn satisfies(&self, required: Qualifier) -> bool {
        any_matches(&self.qualifiers, &required)
    }
}

/// Base + displacement memory reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Indirect {
    pub(crate) base: Register,
    pub(crate) offset: i32,
    pub(crate) size: OperandSize,
    pub(crate) qualifiers: QualifierList,
}

impl Indirect {
    /// Base register (may be [`Register::Rip`] or [`Register::Absolute`]).
    pub fn base(&self) -> Register {
        self.base
    }

    /// Signed 32-bit displacement.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Width of the referenced memory.
    pub fn size(&self) -> OperandSize {
        self.size
    }

    /// Opcode slots this reference can fill.
    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }
}

/// Base + index × scale + displacement memory reference (SIB form).
///
/// An index equal to the stack pointer means "no index": the hardware
/// reserves index code 100b for that, so such an operand is a plain
/// base + displacement that still needs a SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScaledIndirect {
    pub(crate) index: Register,
    pub(crate) scale: Scale,
    pub(crate) indirect: Indirect,
}

impl ScaledIndirect {
    /// Index register.
    pub fn index(&self) -> Register {
        self.index
    }

    /// SIB scale field.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The base, displacement, width and qualifiers.
    pub fn indirect(&self) -> &Indirect {
        &self.indirect
    }

    /// Whether the index slot holds a real index register (not the
    /// stack-pointer "no index" marker).
    pub fn has_index(&self) -> bool {
        !self.index.is_stack_pointer()
    }
}

/// How the encoder must treat a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingKind {
    /// `[base + disp]` via ModR/M alone.
    Plain,
    /// `[rip + disp]`, displacement relative to the next instruction.
    RipRelative,
    /// `[disp]`, displacement is the address.
    Absolute,
    /// `[base + index*scale + disp]` via a SIB byte.
    Scaled,
}

/// A memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Memory {
    /// Ordinary base register.
    Plain(Indirect),
    /// Based on [`Register::Rip`].
    RipRelative(Indirect),
    /// Based on [`Register::Absolute`].
    Absolute(Indirect),
    /// Needs a SIB byte.
    Scaled(ScaledIndirect),
}

impl Memory {
    /// The base/displacement part shared by every variant.
    pub fn indirect(&self) -> &Indirect {
        match self {
            Memory::Plain(ind) | Memory::RipRelative(ind) | Memory::Absolute(ind) => ind,
            Memory::Scaled(sib) => &sib.indirect,
        }
    }

    /// Variant tag.
    pub fn kind(&self) -> AddressingKind {
        match self {
            Memory::Plain(_) => AddressingKind::Plain,
            Memory::RipRelative(_) => AddressingKind::RipRelative,
            Memory::Absolute(_) => AddressingKind::Absolute,
            Memory::Scaled(_) => AddressingKind::Scaled,
        }
    }

    /// Base register.
    pub fn base(&self) -> Register {
        self.indirect().base
    }

    /// Signed 32-bit displacement.
    pub fn offset(&self) -> i32 {
        self.indirect().offset
    }

    /// Width of the referenced memory.
    pub fn size(&self) -> OperandSize {
        self.indirect().size
    }

    /// Index register, for the SIB form only.
    pub fn index(&self) -> Option<Register> {
        match self {
            Memory::Scaled(sib) => Some(sib.index),
            _ => None,
        }
    }

    /// Scale field, for the SIB form only.
    pub fn scale(&self) -> Option<Scale> {
        match self {
            Memory::Scaled(sib) => Some(sib.scale),
            _ => None,
        }
    }

    /// Whether the encoder must emit a SIB byte.
    pub fn needs_sib(&self) -> bool {
        matches!(self, Memory::Scaled(_))
    }

    /// Opcode slots this operand can fill.
    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.indirect().qualifiers
    }

    /// See [`Operand::satisfies`].
    pub fn satisfies(&self, required: Qualifier) -> bool {
        any_matches(self.qualifiers(), &required)
    }
}

/// Any operand accepted by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A register operand.
    Register(Register),
    /// An immediate value.
    Immediate(Immediate),
    /// A memory (indirect) operand.
    Memory(Memory),
}

impl Operand {
    /// Opcode slots this operand can fill.
    pub fn qualifiers(&self) -> &[Qualifier] {
        match self {
            Operand::Register(r) => r.qualifiers(),
            Operand::Immediate(imm) => imm.qualifiers(),
            Operand::Memory(mem) => mem.qualifiers(),
        }
    }

    /// Whether this operand can fill the `required` opcode slot.
    ///
    /// True when any one of its qualifiers equals `required` exactly.
    pub fn satisfies(&self, required: Qualifier) -> bool {
        any_matches(self.qualifiers(), &required)
    }
}

impl From<Register> for Operand {
    fn from(r: Register) -> Self {
        Operand::Register(r)
    }
}

impl From<Immediate> for Operand {
    fn from(imm: Immediate) -> Self {
        Operand::Immediate(imm)
    }
}

impl From<Memory> for Operand {
    fn from(mem: Memory) -> Self {
        Operand::Memory(mem)
    }
}

/// Write a signed displacement as `+0x..`/`-0x..`, or bare when `first`.
fn write_disp(f: &mut fmt::Formatter<'_>, disp: i32, first: bool) -> fmt::Result {
    if disp < 0 {
        write!(f, "-0x{:X}", disp.unsigned_abs())
    } else if first {
        write!(f, "0x{:X}", disp)
    } else {
        write!(f, "+0x{:X}", disp)
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.value)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ind = self.indirect();
        write!(f, "{} ptr [", ind.size)?;
        match self {
            Memory::Absolute(_) => write_disp(f, ind.offset, true)?,
            Memory::Plain(_) | Memory::RipRelative(_) => {
                write!(f, "{}", ind.base)?;
                if ind.offset != 0 {
                    write_disp(f, ind.offset, false)?;
                }
            }
            Memory::Scaled(sib) => {
                let absolute = ind.base == Register::Absolute;
                let mut first = true;
                if !absolute {
                    write!(f, "{}", ind.base)?;
                    first = false;
                }
                if sib.has_index() {
                    if !first {
                        write!(f, "+")?;
                    }
                    write!(f, "{}*{}", sib.index, sib.scale.factor())?;
                    first = false;
                }
                // The displacement is the address itself when there is no base.
                if ind.offset != 0 || absolute {
                    write_disp(f, ind.offset, first)?;
                }
            }
        }
        write!(f, "]")
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Immediate(imm) => write!(f, "{}", imm),
            Operand::Memory(mem) => write!(f, "{}", mem),
        }
    }
}

// ─── Deserialization ─────────────────────────────────────────
//
// Operands are only ever produced by the constructors, so decoded values
// are rebuilt through them and rejected when the input disagrees.

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "Immediate")]
struct ImmediateFields {
    value: u32,
    size: OperandSize,
    qualifiers: QualifierList,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "Indirect")]
struct IndirectFields {
    base: Register,
    offset: i32,
    size: OperandSize,
    qualifiers: QualifierList,
}

#[cfg(feature = "serde")]
impl From<IndirectFields> for Indirect {
    fn from(raw: IndirectFields) -> Self {
        Indirect {
            base: raw.base,
            offset: raw.offset,
            size: raw.size,
            qualifiers: raw.qualifiers,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "ScaledIndirect")]
struct ScaledFields {
    index: Register,
    scale: Scale,
    indirect: IndirectFields,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "Memory")]
enum MemoryFields {
    Plain(IndirectFields),
    RipRelative(IndirectFields),
    Absolute(IndirectFields),
    Scaled(ScaledFields),
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Immediate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = ImmediateFields::deserialize(deserializer)?;
        let built = crate::addressing::imm(raw.value);
        if built.size != raw.size || built.qualifiers != raw.qualifiers {
            return Err(serde::de::Error::custom(alloc::format!(
                "immediate 0x{:X} must be {} wide with qualifiers {:?}",
                raw.value,
                built.size,
                built.qualifiers
            )));
        }
        Ok(built)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Memory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (claimed, built) = match MemoryFields::deserialize(deserializer)? {
            MemoryFields::Plain(raw) => {
                let ind = Indirect::from(raw);
                let built = crate::addressing::memory(ind.size, ind.base, i64::from(ind.offset));
                (Memory::Plain(ind), built)
            }
            MemoryFields::RipRelative(raw) => {
                let ind = Indirect::from(raw);
                let built = crate::addressing::memory(ind.size, ind.base, i64::from(ind.offset));
                (Memory::RipRelative(ind), built)
            }
            MemoryFields::Absolute(raw) => {
                let ind = Indirect::from(raw);
                let built = crate::addressing::memory(ind.size, ind.base, i64::from(ind.offset));
                (Memory::Absolute(ind), built)
            }
            MemoryFields::Scaled(raw) => {
                let sib = ScaledIndirect {
                    index: raw.index,
                    scale: raw.scale,
                    indirect: Indirect::from(raw.indirect),
                };
                let ind = &sib.indirect;
                let built = crate::addressing::memory_sib(
                    ind.size,
                    sib.scale.factor(),
                    sib.index,
                    ind.base,
                    i64::from(ind.offset),
                )
                .map_err(serde::de::Error::custom)?;
                (Memory::Scaled(sib), built)
            }
        };
        if claimed != built {
            return Err(serde::de::Error::custom(alloc::format!(
                "memory operand {:?} is not in normalized form, expected {:?}",
                claimed.kind(),
                built.kind()
            )));
        }
        Ok(built)
    }
}
