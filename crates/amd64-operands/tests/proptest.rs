#![cfg(not(target_arch = "wasm32"))]
//! Property-based tests using proptest.
//!
//! These tests check the normalizer invariants across randomly generated
//! registers, widths, scales and displacements, complementing the targeted
//! tests and the libfuzzer target.

use amd64_operands::{
    imm, memory, memory_sib, AddressingKind, Memory, OperandError, OperandSize, Qualifier,
    Register, Scale,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn any_register() -> impl Strategy<Value = Register> {
    prop::sample::select(Register::ALL.to_vec())
}

fn any_size() -> impl Strategy<Value = OperandSize> {
    prop::sample::select(vec![
        OperandSize::Byte,
        OperandSize::Word,
        OperandSize::Dword,
        OperandSize::Qword,
        OperandSize::Xmmword,
    ])
}

fn valid_factor() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![1u8, 2, 4, 8])
}

// ── Property: immediates pick the minimal unsigned width ────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn immediate_width_is_minimal(value in any::<u32>()) {
        let i = imm(value);
        let expected = if value < 256 { 8 } else if value < 65536 { 16 } else { 32 };
        prop_assert_eq!(i.bits(), expected);
        prop_assert_eq!(i.qualifiers(), &[Qualifier::imm(expected)][..]);
        prop_assert_eq!(i.value(), value);
    }
}

// ── Property: the scaled builder never panics ───────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Arbitrary scale bytes yield Ok/Err, never a panic, and errors are
    /// exactly the two documented contract violations.
    #[test]
    fn memory_sib_never_panics(
        size in any_size(),
        scale in any::<u8>(),
        index in any_register(),
        base in any_register(),
        offset in any::<i64>(),
    ) {
        match memory_sib(size, scale, index, base, offset) {
            Ok(m) => {
                prop_assert_eq!(m.size(), size);
                prop_assert_eq!(m.offset(), offset as i32);
            }
            Err(OperandError::InvalidScale { scale: s }) => {
                prop_assert_eq!(s, scale);
                prop_assert!(![0u8, 1, 2, 4, 8].contains(&scale));
            }
            Err(OperandError::ScaleZeroRequiresStackPointer { index: i }) => {
                prop_assert_eq!(scale, 0);
                prop_assert_eq!(i, index);
                prop_assert!(!index.is_stack_pointer());
            }
        }
    }

    #[test]
    fn valid_factors_always_build_sib(
        size in any_size(),
        factor in valid_factor(),
        index in any_register(),
        base in any_register(),
        offset in any::<i32>(),
    ) {
        let m = memory_sib(size, factor, index, base, i64::from(offset)).unwrap();
        prop_assert_eq!(m.kind(), AddressingKind::Scaled);
        prop_assert_eq!(m.index(), Some(index));
        prop_assert_eq!(m.scale().map(Scale::factor), Some(factor));
        prop_assert_eq!(m.base(), base);
        let bits = size.bits();
        prop_assert_eq!(m.qualifiers(), &[Qualifier::m(bits), Qualifier::rm(bits)][..]);
    }
}

// ── Property: plain-form normalization ──────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn stack_pointer_base_always_needs_sib(
        size in any_size(),
        base in any_register(),
        offset in any::<i32>(),
    ) {
        let m = memory(size, base, i64::from(offset));
        prop_assert_eq!(m.needs_sib(), base.is_stack_pointer());
        if let Memory::Scaled(sib) = m {
            prop_assert_eq!(sib.index(), base);
            prop_assert_eq!(sib.scale(), Scale::X1);
        }
    }

    #[test]
    fn plain_form_variant_follows_base(
        size in any_size(),
        base in any_register(),
        offset in any::<i32>(),
    ) {
        let kind = memory(size, base, i64::from(offset)).kind();
        let expected = match base {
            Register::Rip => AddressingKind::RipRelative,
            Register::Absolute => AddressingKind::Absolute,
            r if r.is_stack_pointer() => AddressingKind::Scaled,
            _ => AddressingKind::Plain,
        };
        prop_assert_eq!(kind, expected);
    }

    #[test]
    fn scale_zero_matches_plain_form(
        size in any_size(),
        base in any_register(),
        offset in any::<i32>(),
    ) {
        let sib = memory_sib(size, 0, Register::Rsp, base, i64::from(offset));
        if base.is_stack_pointer() {
            // Stack-pointer base: the SIB byte is still required.
            prop_assert_eq!(sib.unwrap().kind(), AddressingKind::Scaled);
        } else {
            prop_assert_eq!(sib.unwrap(), memory(size, base, i64::from(offset)));
        }
    }
}
