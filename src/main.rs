// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for asm80.

fn main() {
    if let Err(err) = asm80::assembler::run() {
        eprintln!("asm80: {err}");
        std::process::exit(1);
    }
}
