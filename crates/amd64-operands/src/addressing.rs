//! Operand constructors and the addressing normalizer.
//!
//! The normalizer decides how a requested memory reference is expressed:
//!
//! * a stack-pointer base cannot use plain ModR/M addressing (r/m = 100b
//!   announces a SIB byte), so it is promoted to SIB form with the
//!   "no index" marker;
//! * a SIB request with scale 0 (the "no index" marker) over any other base
//!   does not need the SIB byte and is demoted to the plain form;
//! * `rip` and `absolute` bases select their own variants.
//!
//! Displacements are taken as `i64` and truncated to the 32-bit signed
//! field; keeping them in range is the caller's job.

use log::trace;

use crate::error::OperandError;
use crate::operand::{Immediate, Indirect, Memory, OperandSize, Scale, ScaledIndirect};
use crate::qualifier::{Qualifier, QualifierList, RegClass};
use crate::register::Register;

/// Build an immediate with the smallest unsigned width that holds `value`.
///
/// `value < 256` is 8-bit, `value < 65536` is 16-bit, anything else 32-bit.
/// No signed narrowing is attempted.
///
/// # Examples
///
/// ```rust
/// use amd64_operands::{imm, OperandSize};
///
/// assert_eq!(imm(255).size(), OperandSize::Byte);
/// assert_eq!(imm(256).size(), OperandSize::Word);
/// ```
pub fn imm(value: u32) -> Immediate {
    let size = if value < 0x100 {
        OperandSize::Byte
    } else if value < 0x1_0000 {
        OperandSize::Word
    } else {
        OperandSize::Dword
    };
    Immediate {
        value,
        size,
        qualifiers: QualifierList::one(Qualifier::imm(size.bits())),
    }
}

/// `[base + offset]` of the given width.
///
/// A stack-pointer base comes back as [`Memory::Scaled`] with index = base
/// and [`Scale::X1`].
///
/// # Examples
///
/// ```rust
/// use amd64_operands::{memory, AddressingKind, OperandSize, Register};
///
/// let m = memory(OperandSize::Qword, Register::Rsp, 8);
/// assert_eq!(m.kind(), AddressingKind::Scaled);
/// assert_eq!(m.index(), Some(Register::Rsp));
/// ```
pub fn memory(size: OperandSize, base: Register, offset: i64) -> Memory {
    let offset = offset as i32;
    if base.is_stack_pointer() {
        trace!(
            "promoting {} ptr [{}] to SIB form: stack pointer cannot be a ModR/M base",
            size,
            base
        );
        return scaled(size, Scale::X1, base, base, offset);
    }
    plain(size, base, offset)
}

/// `[base + index*scale + offset]` of the given width.
///
/// `scale` is the logical factor 1, 2, 4 or 8. Factor 0 means "no index"
/// and is only accepted together with a stack-pointer `index`; if `base`
/// is not the stack pointer as well, no SIB byte is needed and the result
/// equals [`memory`]`(size, base, offset)`.
///
/// # Errors
///
/// [`OperandError::InvalidScale`] for any factor outside `{0, 1, 2, 4, 8}`;
/// [`OperandError::ScaleZeroRequiresStackPointer`] for factor 0 with any
/// other index. Both are caller bugs rather than recoverable conditions.
///
/// # Examples
///
/// ```rust
/// use amd64_operands::{memory_sib, OperandSize, Register, Scale};
///
/// let m = memory_sib(OperandSize::Dword, 4, Register::Rcx, Register::Rbx, 0).unwrap();
/// assert_eq!(m.scale(), Some(Scale::X4));
/// assert!(memory_sib(OperandSize::Dword, 3, Register::Rcx, Register::Rbx, 0).is_err());
/// ```
pub fn memory_sib(
    size: OperandSize,
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    let offset = offset as i32;
    let scale = match scale {
        0 => {
            if !index.is_stack_pointer() {
                return Err(OperandError::ScaleZeroRequiresStackPointer { index });
            }
            if !base.is_stack_pointer() {
                trace!(
                    "demoting {} ptr [{}] to plain form: no index and no SIB needed",
                    size,
                    base
                );
                return Ok(plain(size, base, offset));
            }
            Scale::X1
        }
        factor => Scale::from_factor(factor).ok_or(OperandError::InvalidScale { scale })?,
    };
    Ok(scaled(size, scale, index, base, offset))
}

/// Plain-form builder; `base` is never the stack pointer here.
fn plain(size: OperandSize, base: Register, offset: i32) -> Memory {
    let bits = size.bits();
    let mut qualifiers = QualifierList::two(Qualifier::m(bits), Qualifier::rm(bits));
    if size == OperandSize::Xmmword {
        qualifiers.push(Qualifier::reg_m(RegClass::Xmm, 128));
    }
    let indirect = Indirect {
        base,
        offset,
        size,
        qualifiers,
    };
    match base {
        Register::Rip => Memory::RipRelative(indirect),
        Register::Absolute => Memory::Absolute(indirect),
        _ => Memory::Plain(indirect),
    }
}

/// SIB-form builder.
///
/// Unlike [`plain`], the 128-bit case gets no `xmm/m128` qualifier.
fn scaled(size: OperandSize, scale: Scale, index: Register, base: Register, offset: i32) -> Memory {
    let bits = size.bits();
    Memory::Scaled(ScaledIndirect {
        index,
        scale,
        indirect: Indirect {
            base,
            offset,
            size,
            qualifiers: QualifierList::two(Qualifier::m(bits), Qualifier::rm(bits)),
        },
    })
}

// ─── Sized shorthands ────────────────────────────────────────

/// `byte ptr [base + offset]`.
#[inline]
pub fn byte(base: Register, offset: i64) -> Memory {
    memory(OperandSize::Byte, base, offset)
}

/// `byte ptr [base + index*scale + offset]`.
///
/// # Errors
///
/// See [`memory_sib`].
#[inline]
pub fn byte_sib(
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    memory_sib(OperandSize::Byte, scale, index, base, offset)
}

/// `word ptr [base + offset]`.
#[inline]
pub fn word(base: Register, offset: i64) -> Memory {
    memory(OperandSize::Word, base, offset)
}

/// `word ptr [base + index*scale + offset]`.
///
/// # Errors
///
/// See [`memory_sib`].
#[inline]
pub fn word_sib(
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    memory_sib(OperandSize::Word, scale, index, base, offset)
}

/// `dword ptr [base + offset]`.
#[inline]
pub fn dword(base: Register, offset: i64) -> Memory {
    memory(OperandSize::Dword, base, offset)
}

/// `dword ptr [base + index*scale + offset]`.
///
/// # Errors
///
/// See [`memory_sib`].
#[inline]
pub fn dword_sib(
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    memory_sib(OperandSize::Dword, scale, index, base, offset)
}

/// `qword ptr [base + offset]`.
#[inline]
pub fn qword(base: Register, offset: i64) -> Memory {
    memory(OperandSize::Qword, base, offset)
}

/// `qword ptr [base + index*scale + offset]`.
///
/// # Errors
///
/// See [`memory_sib`].
#[inline]
pub fn qword_sib(
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    memory_sib(OperandSize::Qword, scale, index, base, offset)
}

/// `xmmword ptr [base + offset]`, for SSE operands.
#[inline]
pub fn xmmword(base: Register, offset: i64) -> Memory {
    memory(OperandSize::Xmmword, base, offset)
}

/// `xmmword ptr [base + index*scale + offset]`, for SSE operands.
///
/// # Errors
///
/// See [`memory_sib`].
#[inline]
pub fn xmmword_sib(
    scale: u8,
    index: Register,
    base: Register,
    offset: i64,
) -> Result<Memory, OperandError> {
    memory_sib(OperandSize::Xmmword, scale, index, base, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::AddressingKind;

    #[test]
    fn imm_width_boundaries() {
        assert_eq!(imm(0).bits(), 8);
        assert_eq!(imm(255).bits(), 8);
        assert_eq!(imm(256).bits(), 16);
        assert_eq!(imm(65535).bits(), 16);
        assert_eq!(imm(65536).bits(), 32);
        assert_eq!(imm(u32::MAX).bits(), 32);
    }

    #[test]
    fn imm_single_qualifier() {
        let i = imm(0x1234);
        assert_eq!(i.qualifiers(), &[Qualifier::imm(16)]);
        assert_eq!(i.value(), 0x1234);
    }

    #[test]
    fn plain_qualifiers() {
        let m = dword(Register::Rbx, 4);
        assert_eq!(m.kind(), AddressingKind::Plain);
        assert_eq!(m.qualifiers(), &[Qualifier::m(32), Qualifier::rm(32)]);
    }

    #[test]
    fn plain_128_adds_xmm_combination() {
        let m = xmmword(Register::Rax, 0);
        assert_eq!(
            m.qualifiers(),
            &[
                Qualifier::m(128),
                Qualifier::rm(128),
                Qualifier::reg_m(RegClass::Xmm, 128)
            ]
        );
    }

    #[test]
    fn stack_pointer_base_forces_sib() {
        for sp in [Register::Rsp, Register::Esp] {
            let m = qword(sp, 8);
            match m {
                Memory::Scaled(sib) => {
                    assert_eq!(sib.index(), sp);
                    assert_eq!(sib.scale(), Scale::X1);
                    assert_eq!(sib.indirect().base(), sp);
                    assert_eq!(sib.indirect().offset(), 8);
                }
                other => panic!("expected SIB form, got {:?}", other),
            }
        }
    }

    #[test]
    fn r12_base_stays_plain() {
        assert_eq!(qword(Register::R12, 0).kind(), AddressingKind::Plain);
    }

    #[test]
    fn pseudo_bases_select_variants() {
        assert!(matches!(qword(Register::Rip, 0x10), Memory::RipRelative(_)));
        assert!(matches!(qword(Register::Absolute, 0x10), Memory::Absolute(_)));
    }

    #[test]
    fn scale_zero_without_stack_pointer_index_is_rejected() {
        assert_eq!(
            dword_sib(0, Register::Eax, Register::Rbx, 0),
            Err(OperandError::ScaleZeroRequiresStackPointer {
                index: Register::Eax
            })
        );
    }

    #[test]
    fn invalid_scales_are_rejected() {
        for scale in [3u8, 5, 6, 7, 9, 16, 255] {
            assert_eq!(
                qword_sib(scale, Register::Rcx, Register::Rbx, 0),
                Err(OperandError::InvalidScale { scale })
            );
        }
    }

    #[test]
    fn scale_zero_with_other_base_degrades_to_plain() {
        let m = qword_sib(0, Register::Rsp, Register::Rbp, -16).unwrap();
        assert_eq!(m, qword(Register::Rbp, -16));
    }

    #[test]
    fn scale_zero_with_stack_pointer_base_stays_scaled() {
        let m = qword_sib(0, Register::Rsp, Register::Rsp, 0).unwrap();
        assert_eq!(m, qword(Register::Rsp, 0));
        assert_eq!(m.scale(), Some(Scale::X1));
    }

    #[test]
    fn scaled_maps_factor_to_code() {
        for (factor, code) in [(1u8, 0u8), (2, 1), (4, 2), (8, 3)] {
            let m = dword_sib(factor, Register::Rsi, Register::Rdi, 0).unwrap();
            assert_eq!(m.scale().map(Scale::code), Some(code));
            assert_eq!(m.index(), Some(Register::Rsi));
        }
    }

    #[test]
    fn offset_truncates_to_32_bits() {
        assert_eq!(qword(Register::Rax, 0x1_0000_0001).offset(), 1);
        assert_eq!(qword(Register::Rax, -1).offset(), -1);
    }
}
