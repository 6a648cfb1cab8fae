//! Operand selection example. Shows how an encoder would pick an opcode
//! form by asking operands which slots they satisfy.
//!
//! Run with: `cargo run --example operand_selection`

use amd64_operands::{
    dword_sib, imm, qword, xmmword, Memory, Operand, Qualifier, RegClass, Register,
};

/// A toy opcode form: mnemonic, opcode bytes and one slot per operand.
struct Form {
    name: &'static str,
    opcode: &'static [u8],
    slots: &'static [Qualifier],
}

const FORMS: &[Form] = &[
    Form {
        name: "add r/m64, imm8",
        opcode: &[0x48, 0x83],
        slots: &[Qualifier::rm(64), Qualifier::imm(8)],
    },
    Form {
        name: "add r/m64, imm32",
        opcode: &[0x48, 0x81],
        slots: &[Qualifier::rm(64), Qualifier::imm(32)],
    },
    Form {
        name: "mov r32, r/m32",
        opcode: &[0x8B],
        slots: &[Qualifier::r(32), Qualifier::rm(32)],
    },
    Form {
        name: "movaps xmm, xmm/m128",
        opcode: &[0x0F, 0x28],
        slots: &[
            Qualifier::reg(RegClass::Xmm),
            Qualifier::reg_m(RegClass::Xmm, 128),
        ],
    },
];

fn select(operands: &[Operand]) -> Option<&'static Form> {
    FORMS.iter().find(|form| {
        form.slots.len() == operands.len()
            && form
                .slots
                .iter()
                .zip(operands)
                .all(|(slot, op)| op.satisfies(*slot))
    })
}

fn show(operands: &[Operand]) {
    let text: Vec<String> = operands.iter().map(|op| op.to_string()).collect();
    match select(operands) {
        Some(form) => println!(
            "   {:<40} -> {} ({:02X?})",
            text.join(", "),
            form.name,
            form.opcode
        ),
        None => println!("   {:<40} -> no matching form", text.join(", ")),
    }
}

fn describe(mem: &Memory) {
    println!(
        "   {:<28} kind={:?} base={} index={:?} scale={:?} disp={}",
        mem.to_string(),
        mem.kind(),
        mem.base(),
        mem.index(),
        mem.scale().map(|s| s.code()),
        mem.offset()
    );
}

fn main() {
    println!("=== amd64_operands operand selection ===\n");

    println!("1. Form selection:");
    show(&[qword(Register::Rbp, -8).into(), imm(1).into()]);
    show(&[qword(Register::Rbp, -8).into(), imm(0x1_0000).into()]);
    show(&[Register::Eax.into(), Register::Ecx.into()]);
    show(&[Register::Xmm0.into(), xmmword(Register::Rip, 0x40).into()]);
    show(&[Register::Xmm0.into(), Register::Xmm1.into()]);
    // imm 0x1234 is 16-bit wide: neither imm8 nor imm32 matches.
    show(&[qword(Register::Rbx, 0).into(), imm(0x1234).into()]);

    println!("\n2. Addressing normalization:");
    describe(&qword(Register::Rbx, 16));
    describe(&qword(Register::Rsp, 16));
    describe(&qword(Register::Rip, 0x100));
    describe(&qword(Register::Absolute, 0x1000));
    match dword_sib(4, Register::Rcx, Register::Rbx, 8) {
        Ok(mem) => describe(&mem),
        Err(e) => println!("   error: {}", e),
    }

    println!("\n3. Contract violations:");
    for (scale, index) in [(3, Register::Rcx), (0, Register::Eax)] {
        match dword_sib(scale, index, Register::Rbx, 0) {
            Ok(mem) => describe(&mem),
            Err(e) => println!("   scale={} index={}: {}", scale, index, e),
        }
    }
}
