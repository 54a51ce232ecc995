// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Intel 8080 instruction descriptor table.

/// How a mnemonic combines its base opcode with its operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// No operands; the base opcode is the whole instruction.
    Implied,
    /// One 8-bit register operand added to the base opcode.
    Reg,
    /// One 8-bit register operand shifted into bits 3-5 (`inr`/`dcr`).
    RegHigh,
    /// `mov`: destination register in bits 3-5, source in bits 0-2.
    MovRegReg,
    /// One register-pair operand added to the base opcode.
    Pair(PairPolicy),
    /// Base opcode followed by one immediate byte.
    Imm8,
    /// Base opcode followed by a little-endian address/word.
    Addr16,
    /// `mvi`: register in bits 3-5, then one immediate byte.
    RegImm8,
    /// `lxi`: register pair added to the base opcode, then a word.
    PairImm16,
    /// `rst`: vector 0-7 shifted into bits 3-5 of the base opcode.
    Rst,
    /// `stax`/`ldax`: register `b` keeps the base opcode, `d` adds 0x10.
    AccPair,
}

/// Which register encodes as 0x30 for a pair-operand mnemonic: `psw`
/// for the stack ops, `sp` for the arithmetic/increment group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairPolicy {
    Psw,
    Sp,
}

pub struct InstructionEntry {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub encoding: Encoding,
}

/// Static descriptor table, sorted by mnemonic. Pseudo-ops (`org`,
/// `equ`, `db`, `dw`, `ds`, `name`, `title`, `end`) are not listed here;
/// the assembler dispatches them before consulting this table.
pub static INSTRUCTION_TABLE: &[InstructionEntry] = &[
    InstructionEntry { mnemonic: "aci", opcode: 0xce, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "adc", opcode: 0x88, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "add", opcode: 0x80, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "adi", opcode: 0xc6, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "ana", opcode: 0xa0, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "ani", opcode: 0xe6, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "call", opcode: 0xcd, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cc", opcode: 0xdc, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cm", opcode: 0xfc, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cma", opcode: 0x2f, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "cmc", opcode: 0x3f, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "cmp", opcode: 0xb8, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "cnc", opcode: 0xd4, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cnz", opcode: 0xc4, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cp", opcode: 0xf4, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cpe", opcode: 0xec, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cpi", opcode: 0xfe, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "cpo", opcode: 0xe4, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "cz", opcode: 0xcc, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "daa", opcode: 0x27, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "dad", opcode: 0x09, encoding: Encoding::Pair(PairPolicy::Sp) },
    InstructionEntry { mnemonic: "dcr", opcode: 0x05, encoding: Encoding::RegHigh },
    InstructionEntry { mnemonic: "dcx", opcode: 0x0b, encoding: Encoding::Pair(PairPolicy::Sp) },
    InstructionEntry { mnemonic: "di", opcode: 0xf3, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "ei", opcode: 0xfb, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "hlt", opcode: 0x76, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "in", opcode: 0xdb, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "inr", opcode: 0x04, encoding: Encoding::RegHigh },
    InstructionEntry { mnemonic: "inx", opcode: 0x03, encoding: Encoding::Pair(PairPolicy::Sp) },
    InstructionEntry { mnemonic: "jc", opcode: 0xda, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jm", opcode: 0xfa, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jmp", opcode: 0xc3, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jnc", opcode: 0xd2, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jnz", opcode: 0xc2, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jp", opcode: 0xf2, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jpe", opcode: 0xea, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jpo", opcode: 0xe2, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "jz", opcode: 0xca, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "lda", opcode: 0x3a, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "ldax", opcode: 0x0a, encoding: Encoding::AccPair },
    InstructionEntry { mnemonic: "lhld", opcode: 0x2a, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "lxi", opcode: 0x01, encoding: Encoding::PairImm16 },
    InstructionEntry { mnemonic: "mov", opcode: 0x40, encoding: Encoding::MovRegReg },
    InstructionEntry { mnemonic: "mvi", opcode: 0x06, encoding: Encoding::RegImm8 },
    InstructionEntry { mnemonic: "nop", opcode: 0x00, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "ora", opcode: 0xb0, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "ori", opcode: 0xf6, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "out", opcode: 0xd3, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "pchl", opcode: 0xe9, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "pop", opcode: 0xc1, encoding: Encoding::Pair(PairPolicy::Psw) },
    InstructionEntry { mnemonic: "push", opcode: 0xc5, encoding: Encoding::Pair(PairPolicy::Psw) },
    InstructionEntry { mnemonic: "ral", opcode: 0x17, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rar", opcode: 0x1f, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rc", opcode: 0xd8, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "ret", opcode: 0xc9, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rlc", opcode: 0x07, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rm", opcode: 0xf8, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rnc", opcode: 0xd0, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rnz", opcode: 0xc0, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rp", opcode: 0xf0, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rpe", opcode: 0xe8, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rpo", opcode: 0xe0, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rrc", opcode: 0x0f, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "rst", opcode: 0xc7, encoding: Encoding::Rst },
    InstructionEntry { mnemonic: "rz", opcode: 0xc8, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "sbb", opcode: 0x98, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "sbi", opcode: 0xde, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "shld", opcode: 0x22, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "sphl", opcode: 0xf9, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "sta", opcode: 0x32, encoding: Encoding::Addr16 },
    InstructionEntry { mnemonic: "stax", opcode: 0x02, encoding: Encoding::AccPair },
    InstructionEntry { mnemonic: "stc", opcode: 0x37, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "sub", opcode: 0x90, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "sui", opcode: 0xd6, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "xchg", opcode: 0xeb, encoding: Encoding::Implied },
    InstructionEntry { mnemonic: "xra", opcode: 0xa8, encoding: Encoding::Reg },
    InstructionEntry { mnemonic: "xri", opcode: 0xee, encoding: Encoding::Imm8 },
    InstructionEntry { mnemonic: "xthl", opcode: 0xe3, encoding: Encoding::Implied },
];

pub fn lookup(mnemonic: &str) -> Option<&'static InstructionEntry> {
    INSTRUCTION_TABLE
        .binary_search_by(|entry| entry.mnemonic.cmp(mnemonic))
        .ok()
        .map(|ix| &INSTRUCTION_TABLE[ix])
}

/// 3-bit code for an 8-bit register operand.
pub fn reg_code(name: &str) -> Option<u8> {
    match name {
        "b" => Some(0x00),
        "c" => Some(0x01),
        "d" => Some(0x02),
        "e" => Some(0x03),
        "h" => Some(0x04),
        "l" => Some(0x05),
        "m" => Some(0x06),
        "a" => Some(0x07),
        _ => None,
    }
}

/// Opcode offset for a register-pair operand under the given policy.
pub fn pair_code(name: &str, policy: PairPolicy) -> Option<u8> {
    match name {
        "b" => Some(0x00),
        "d" => Some(0x10),
        "h" => Some(0x20),
        "psw" if policy == PairPolicy::Psw => Some(0x30),
        "sp" if policy == PairPolicy::Sp => Some(0x30),
        _ => None,
    }
}

/// True for a register-pair name recognized by some pair mnemonic; used
/// to tell a pair/mnemonic mismatch from a name that is never a pair.
pub fn is_pair_name(name: &str) -> bool {
    matches!(name, "b" | "d" | "h" | "psw" | "sp")
}

#[cfg(test)]
mod tests {
    use super::{lookup, pair_code, reg_code, Encoding, PairPolicy, INSTRUCTION_TABLE};

    #[test]
    fn instruction_table_is_sorted_by_mnemonic() {
        let mut prev = "";
        for entry in INSTRUCTION_TABLE {
            assert!(
                entry.mnemonic > prev,
                "instruction table out of order: {} before {}",
                prev,
                entry.mnemonic
            );
            prev = entry.mnemonic;
        }
    }

    #[test]
    fn lookup_finds_entries() {
        let mov = lookup("mov").expect("mov");
        assert_eq!(mov.opcode, 0x40);
        assert_eq!(mov.encoding, Encoding::MovRegReg);
        assert_eq!(lookup("nop").map(|e| e.opcode), Some(0x00));
        assert_eq!(lookup("xthl").map(|e| e.opcode), Some(0xe3));
        assert!(lookup("ldir").is_none());
        assert!(lookup("org").is_none());
    }

    #[test]
    fn register_codes() {
        assert_eq!(reg_code("b"), Some(0));
        assert_eq!(reg_code("a"), Some(7));
        assert_eq!(reg_code("q"), None);
        assert_eq!(reg_code("B"), None);
    }

    #[test]
    fn pair_codes_follow_policy() {
        assert_eq!(pair_code("b", PairPolicy::Psw), Some(0x00));
        assert_eq!(pair_code("h", PairPolicy::Sp), Some(0x20));
        assert_eq!(pair_code("psw", PairPolicy::Psw), Some(0x30));
        assert_eq!(pair_code("psw", PairPolicy::Sp), None);
        assert_eq!(pair_code("sp", PairPolicy::Sp), Some(0x30));
        assert_eq!(pair_code("sp", PairPolicy::Psw), None);
        assert_eq!(pair_code("a", PairPolicy::Sp), None);
    }
}
