//! The x86-64 register table.
//!
//! General-purpose registers in their 8/16/32/64-bit views, the SSE
//! registers `xmm0`–`xmm7`, and two pseudo-registers (`rip`, `absolute`)
//! that only ever appear as the base of a memory operand to select an
//! addressing mode.

use core::fmt;
use core::str::FromStr;

use crate::error::ParseRegisterError;
use crate::qualifier::{Qualifier, RegClass};

/// Register file a [`Register`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterClass {
    /// General-purpose integer register.
    Gpr,
    /// 128-bit SSE register.
    Xmm,
    /// Addressing-mode marker, not a real register.
    Pseudo,
}

/// x86-64 register.
///
/// Every variant knows its hardware number (see [`Register::number`]),
/// its width (see [`Register::size_bits`]) and the opcode slots it can
/// fill (see [`Register::qualifiers`]). All width views of one physical
/// register share the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    // -- 64-bit general-purpose registers --
    /// RAX: 64-bit accumulator.
    Rax,
    /// RCX: 64-bit counter.
    Rcx,
    /// RDX: 64-bit data.
    Rdx,
    /// RBX: 64-bit base.
    Rbx,
    /// RSP: 64-bit stack pointer.
    Rsp,
    /// RBP: 64-bit frame pointer.
    Rbp,
    /// RSI: 64-bit source index.
    Rsi,
    /// RDI: 64-bit destination index.
    Rdi,
    /// R8–R15: extended 64-bit registers (require REX prefix).
    R8,
    /// Extended 64-bit register.
    R9,
    /// Extended 64-bit register.
    R10,
    /// Extended 64-bit register.
    R11,
    /// Extended 64-bit register.
    R12,
    /// Extended 64-bit register.
    R13,
    /// Extended 64-bit register.
    R14,
    /// Extended 64-bit register.
    R15,
    // -- 32-bit general-purpose registers --
    /// EAX: 32-bit accumulator.
    Eax,
    /// ECX: 32-bit counter.
    Ecx,
    /// EDX: 32-bit data.
    Edx,
    /// EBX: 32-bit base.
    Ebx,
    /// ESP: 32-bit stack pointer.
    Esp,
    /// EBP: 32-bit frame pointer.
    Ebp,
    /// ESI: 32-bit source index.
    Esi,
    /// EDI: 32-bit destination index.
    Edi,
    /// R8D–R15D: low 32 bits of extended registers.
    R8d,
    /// Low 32 bits of R9.
    R9d,
    /// Low 32 bits of R10.
    R10d,
    /// Low 32 bits of R11.
    R11d,
    /// Low 32 bits of R12.
    R12d,
    /// Low 32 bits of R13.
    R13d,
    /// Low 32 bits of R14.
    R14d,
    /// Low 32 bits of R15.
    R15d,
    // -- 16-bit general-purpose registers --
    /// AX: 16-bit accumulator.
    Ax,
    /// CX: 16-bit counter.
    Cx,
    /// DX: 16-bit data.
    Dx,
    /// BX: 16-bit base.
    Bx,
    /// SP: 16-bit stack pointer.
    Sp,
    /// BP: 16-bit frame pointer.
    Bp,
    /// SI: 16-bit source index.
    Si,
    /// DI: 16-bit destination index.
    Di,
    /// R8W–R15W: low 16 bits of extended registers.
    R8w,
    /// Low 16 bits of R9.
    R9w,
    /// Low 16 bits of R10.
    R10w,
    /// Low 16 bits of R11.
    R11w,
    /// Low 16 bits of R12.
    R12w,
    /// Low 16 bits of R13.
    R13w,
    /// Low 16 bits of R14.
    R14w,
    /// Low 16 bits of R15.
    R15w,
    // -- 8-bit general-purpose registers (low bytes) --
    /// AL: low byte of RAX.
    Al,
    /// CL: low byte of RCX.
    Cl,
    /// DL: low byte of RDX.
    Dl,
    /// BL: low byte of RBX.
    Bl,
    /// SPL: low byte of RSP.
    Spl,
    /// BPL: low byte of RBP.
    Bpl,
    /// SIL: low byte of RSI.
    Sil,
    /// DIL: low byte of RDI.
    Dil,
    /// R8B–R15B: low bytes of extended registers.
    R8b,
    /// Low byte of R9.
    R9b,
    /// Low byte of R10.
    R10b,
    /// Low byte of R11.
    R11b,
    /// Low byte of R12.
    R12b,
    /// Low byte of R13.
    R13b,
    /// Low byte of R14.
    R14b,
    /// Low byte of R15.
    R15b,
    // -- SSE registers --
    /// XMM0–XMM7: 128-bit SSE registers.
    Xmm0,
    /// SSE register.
    Xmm1,
    /// SSE register.
    Xmm2,
    /// SSE register.
    Xmm3,
    /// SSE register.
    Xmm4,
    /// SSE register.
    Xmm5,
    /// SSE register.
    Xmm6,
    /// SSE register.
    Xmm7,
    // -- Addressing-mode markers --
    /// Instruction pointer: a memory operand based on it is RIP-relative.
    Rip,
    /// No base: a memory operand based on it addresses its displacement.
    Absolute,
}

static GPR8_QUALIFIERS: [Qualifier; 2] = [Qualifier::r(8), Qualifier::rm(8)];
static AL_QUALIFIERS: [Qualifier; 3] = [
    Qualifier::reg(RegClass::Al),
    Qualifier::r(8),
    Qualifier::rm(8),
];
static GPR16_QUALIFIERS: [Qualifier; 2] = [Qualifier::r(16), Qualifier::rm(16)];
static GPR32_QUALIFIERS: [Qualifier; 2] = [Qualifier::r(32), Qualifier::rm(32)];
static GPR64_QUALIFIERS: [Qualifier; 2] = [Qualifier::r(64), Qualifier::rm(64)];
static XMM_QUALIFIERS: [Qualifier; 2] = [
    Qualifier::reg(RegClass::Xmm),
    Qualifier::reg_m(RegClass::Xmm, 128),
];

impl Register {
    /// Every register in the table, in declaration order.
    pub const ALL: [Register; 74] = {
        use Register::*;
        [
            Rax, Rcx, Rdx, Rbx, Rsp, Rbp, Rsi, Rdi, R8, R9, R10, R11, R12, R13, R14, R15, Eax,
            Ecx, Edx, Ebx, Esp, Ebp, Esi, Edi, R8d, R9d, R10d, R11d, R12d, R13d, R14d, R15d, Ax,
            Cx, Dx, Bx, Sp, Bp, Si, Di, R8w, R9w, R10w, R11w, R12w, R13w, R14w, R15w, Al, Cl, Dl,
            Bl, Spl, Bpl, Sil, Dil, R8b, R9b, R10b, R11b, R12b, R13b, R14b, R15b, Xmm0, Xmm1,
            Xmm2, Xmm3, Xmm4, Xmm5, Xmm6, Xmm7, Rip, Absolute,
        ]
    };

    /// The 4-bit hardware register number (0–15).
    pub const fn number(self) -> u8 {
        use Register::*;
        match self {
            Rax | Eax | Ax | Al | Xmm0 => 0,
            Rcx | Ecx | Cx | Cl | Xmm1 => 1,
            Rdx | Edx | Dx | Dl | Xmm2 => 2,
            Rbx | Ebx | Bx | Bl | Xmm3 => 3,
            Rsp | Esp | Sp | Spl | Xmm4 => 4,
            Rbp | Ebp | Bp | Bpl | Xmm5 => 5,
            Rsi | Esi | Si | Sil | Xmm6 => 6,
            Rdi | Edi | Di | Dil | Xmm7 => 7,
            R8 | R8d | R8w | R8b => 8,
            R9 | R9d | R9w | R9b => 9,
            R10 | R10d | R10w | R10b => 10,
            R11 | R11d | R11w | R11b => 11,
            R12 | R12d | R12w | R12b => 12,
            R13 | R13d | R13w | R13b => 13,
            R14 | R14d | R14w | R14b => 14,
            R15 | R15d | R15w | R15b => 15,
            Rip => 5, // RIP-relative uses encoding 5 (mod=00, rm=101)
            Absolute => 0,
        }
    }

    /// The 3-bit register encoding (bits 0-2 of the register number).
    pub const fn base_code(self) -> u8 {
        self.number() & 7
    }

    /// Whether bit 3 of the register number is set (REX.R/X/B needed).
    pub const fn is_extended(self) -> bool {
        matches!(self.class(), RegisterClass::Gpr) && self.number() >= 8
    }

    /// Size of the register in bits.
    pub const fn size_bits(self) -> u16 {
        use Register::*;
        match self {
            Rax | Rcx | Rdx | Rbx | Rsp | Rbp | Rsi | Rdi | R8 | R9 | R10 | R11 | R12 | R13
            | R14 | R15 | Rip | Absolute => 64,
            Eax | Ecx | Edx | Ebx | Esp | Ebp | Esi | Edi | R8d | R9d | R10d | R11d | R12d
            | R13d | R14d | R15d => 32,
            Ax | Cx | Dx | Bx | Sp | Bp | Si | Di | R8w | R9w | R10w | R11w | R12w | R13w
            | R14w | R15w => 16,
            Al | Cl | Dl | Bl | Spl | Bpl | Sil | Dil | R8b | R9b | R10b | R11b | R12b | R13b
            | R14b | R15b => 8,
            Xmm0 | Xmm1 | Xmm2 | Xmm3 | Xmm4 | Xmm5 | Xmm6 | Xmm7 => 128,
        }
    }

    /// Register file this register belongs to.
    pub const fn class(self) -> RegisterClass {
        use Register::*;
        match self {
            Xmm0 | Xmm1 | Xmm2 | Xmm3 | Xmm4 | Xmm5 | Xmm6 | Xmm7 => RegisterClass::Xmm,
            Rip | Absolute => RegisterClass::Pseudo,
            _ => RegisterClass::Gpr,
        }
    }

    /// Whether this is one of the addressing-mode markers.
    pub const fn is_pseudo(self) -> bool {
        matches!(self.class(), RegisterClass::Pseudo)
    }

    /// Whether this is a view of the stack pointer (`spl`, `sp`, `esp`,
    /// `rsp`).
    ///
    /// ModR/M reserves base code 4 to announce a SIB byte, so a memory
    /// operand based on the stack pointer always needs one.
    pub const fn is_stack_pointer(self) -> bool {
        matches!(self.class(), RegisterClass::Gpr) && self.number() == 4
    }

    /// Opcode slots this register can fill as a direct operand.
    ///
    /// Pseudo-registers return an empty slice.
    pub fn qualifiers(self) -> &'static [Qualifier] {
        match self.class() {
            RegisterClass::Pseudo => &[],
            RegisterClass::Xmm => &XMM_QUALIFIERS,
            RegisterClass::Gpr => match self.size_bits() {
                8 if self == Register::Al => &AL_QUALIFIERS,
                8 => &GPR8_QUALIFIERS,
                16 => &GPR16_QUALIFIERS,
                32 => &GPR32_QUALIFIERS,
                _ => &GPR64_QUALIFIERS,
            },
        }
    }

    /// Lowercase assembler name.
    pub const fn name(self) -> &'static str {
        use Register::*;
        match self {
            Rax => "rax",
            Rcx => "rcx",
            Rdx => "rdx",
            Rbx => "rbx",
            Rsp => "rsp",
            Rbp => "rbp",
            Rsi => "rsi",
            Rdi => "rdi",
            R8 => "r8",
            R9 => "r9",
            R10 => "r10",
            R11 => "r11",
            R12 => "r12",
            R13 => "r13",
            R14 => "r14",
            R15 => "r15",
            Eax => "eax",
            Ecx => "ecx",
            Edx => "edx",
            Ebx => "ebx",
            Esp => "esp",
            Ebp => "ebp",
            Esi => "esi",
            Edi => "edi",
            R8d => "r8d",
            R9d => "r9d",
            R10d => "r10d",
            R11d => "r11d",
            R12d => "r12d",
            R13d => "r13d",
            R14d => "r14d",
            R15d => "r15d",
            Ax => "ax",
            Cx => "cx",
            Dx => "dx",
            Bx => "bx",
            Sp => "sp",
            Bp => "bp",
            Si => "si",
            Di => "di",
            R8w => "r8w",
            R9w => "r9w",
            R10w => "r10w",
            R11w => "r11w",
            R12w => "r12w",
            R13w => "r13w",
            R14w => "r14w",
            R15w => "r15w",
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Spl => "spl",
            Bpl => "bpl",
            Sil => "sil",
            Dil => "dil",
            R8b => "r8b",
            R9b => "r9b",
            R10b => "r10b",
            R11b => "r11b",
            R12b => "r12b",
            R13b => "r13b",
            R14b => "r14b",
            R15b => "r15b",
            Xmm0 => "xmm0",
            Xmm1 => "xmm1",
            Xmm2 => "xmm2",
            Xmm3 => "xmm3",
            Xmm4 => "xmm4",
            Xmm5 => "xmm5",
            Xmm6 => "xmm6",
            Xmm7 => "xmm7",
            Rip => "rip",
            Absolute => "absolute",
        }
    }

    /// Look up a register by name: **case-insensitive**, with zero heap
    /// allocations.
    pub fn from_name(name: &str) -> Option<Register> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::from_name(s).ok_or(ParseRegisterError)
    }
}
