//! # amd64-operands: x86-64 Operand and Addressing-Mode Model
//!
//! `amd64-operands` builds typed, immutable operand values (registers,
//! immediates, memory references) annotated with the opcode slots they can
//! fill. An encoder picks the instruction form by asking each operand
//! whether it [`satisfies`](Operand::satisfies) the form's slot.
//!
//! ## Quick Start
//!
//! ```rust
//! use amd64_operands::{dword_sib, imm, qword, Operand, Qualifier, Register};
//!
//! // mov qword ptr [rbp-8], imm8
//! let dst = Operand::from(qword(Register::Rbp, -8));
//! let src = Operand::from(imm(42));
//! assert!(dst.satisfies(Qualifier::rm(64)));
//! assert!(src.satisfies(Qualifier::imm(8)));
//!
//! // Scale factors other than 1, 2, 4, 8 are rejected.
//! assert!(dword_sib(3, Register::Rcx, Register::Rbx, 0).is_err());
//! ```
//!
//! ## Features
//!
//! - **Addressing rules built in**: stack-pointer bases are forced into SIB
//!   form, `rip` and `absolute` bases get their own variants.
//! - **Allocation-free**: qualifier sets live inline in the operand.
//! - **`no_std` + `alloc`**: embeddable in JITs, kernels, WASM.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// Displacements are deliberately truncated from i64 to the 32-bit field.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::missing_errors_doc
)]

extern crate alloc;

/// Operand constructors and the addressing normalizer.
pub mod addressing;
/// Error types.
pub mod error;
/// Operand value types: immediates, memory references, the `Operand` sum.
pub mod operand;
/// Opcode-slot qualifiers and qualifier sets.
pub mod qualifier;
/// The register table.
pub mod register;

// Re-exports
pub use addressing::{
    byte, byte_sib, dword, dword_sib, imm, memory, memory_sib, qword, qword_sib, word, word_sib,
    xmmword, xmmword_sib,
};
pub use error::{OperandError, ParseRegisterError};
pub use operand::{
    AddressingKind, Immediate, Indirect, Memory, Operand, OperandSize, Scale, ScaledIndirect,
};
pub use qualifier::{Qualifier, QualifierList, RegClass};
pub use register::{Register, RegisterClass};
