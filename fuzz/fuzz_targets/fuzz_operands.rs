#![no_main]
use amd64_operands::{imm, memory, memory_sib, OperandSize, Register};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    size: u8,
    scale: u8,
    index: u8,
    base: u8,
    offset: i64,
    value: u32,
}

fn pick(n: u8) -> Register {
    Register::ALL[n as usize % Register::ALL.len()]
}

fuzz_target!(|input: Input| {
    let size = [
        OperandSize::Byte,
        OperandSize::Word,
        OperandSize::Dword,
        OperandSize::Qword,
        OperandSize::Xmmword,
    ][input.size as usize % 5];
    let (index, base) = (pick(input.index), pick(input.base));

    // Constructors must never panic, only return Ok/Err.
    let _ = imm(input.value).to_string();
    let plain = memory(size, base, input.offset);
    assert_eq!(plain.needs_sib(), base.is_stack_pointer());
    let _ = plain.to_string();

    if let Ok(m) = memory_sib(size, input.scale, index, base, input.offset) {
        assert_eq!(m.size(), size);
        let _ = m.to_string();
    }
});
