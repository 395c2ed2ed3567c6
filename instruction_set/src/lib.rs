//! # Instruction Set
//!
//! Classifies the lines of a task program.
//!
//! ## Grammar
//!
//! Each line matches at most one of four fixed forms, tried in this order:
//!
//! ```text
//! #T=<digits>                     header: bytes the task intends to use
//! <ident> new <digits>            declare a variable of <digits> bytes
//! <ident>[<digits>]               access a byte of a declared variable
//! read disk                       suspend for a simulated disk read
//! ```
//!
//! `<ident>` is `[A-Za-z_][A-Za-z0-9_]*`. Trailing whitespace is always
//! allowed, leading whitespace never is. Separators inside `new` are one or
//! more whitespace characters; `<ident>` and `[` may be separated by any
//! amount of whitespace. Anything else is [`Instruction::Unknown`].
//!
//! ## Purity
//!
//! Classification has no side effects and depends only on the line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an instruction line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    Header,
    New,
    MemoryAccess,
    ReadDisk,
    Unknown,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Header => write!(f, "header"),
            InstructionKind::New => write!(f, "new"),
            InstructionKind::MemoryAccess => write!(f, "memory access"),
            InstructionKind::ReadDisk => write!(f, "read disk"),
            InstructionKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A classified instruction with its operands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// `#T=<bytes>`
    Header { bytes: u64 },
    /// `<name> new <size>`
    New { name: String, size: u64 },
    /// `<name>[<offset>]`
    MemoryAccess { name: String, offset: u64 },
    /// `read disk`
    ReadDisk,
    /// Any other line
    Unknown,
}

impl Instruction {
    /// Classifies a raw line and extracts its operands
    ///
    /// Digit runs too large for `u64` saturate to `u64::MAX`.
    pub fn parse(line: &str) -> Self {
        if let Some(bytes) = Self::parse_header(line) {
            return Instruction::Header { bytes };
        }
        if let Some((name, size)) = Self::parse_new(line) {
            return Instruction::New {
                name: name.to_string(),
                size,
            };
        }
        if let Some((name, offset)) = Self::parse_memory_access(line) {
            return Instruction::MemoryAccess {
                name: name.to_string(),
                offset,
            };
        }
        if Self::parse_read_disk(line) {
            return Instruction::ReadDisk;
        }
        Instruction::Unknown
    }

    /// Returns the kind of this instruction
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Header { .. } => InstructionKind::Header,
            Instruction::New { .. } => InstructionKind::New,
            Instruction::MemoryAccess { .. } => InstructionKind::MemoryAccess,
            Instruction::ReadDisk => InstructionKind::ReadDisk,
            Instruction::Unknown => InstructionKind::Unknown,
        }
    }

    /// Returns true if executing the instruction costs CPU time
    ///
    /// Only the header is free: it sets up the task's memory, it is not work.
    pub fn is_chargeable(&self) -> bool {
        !matches!(self, Instruction::Header { .. })
    }

    fn parse_header(line: &str) -> Option<u64> {
        let mut scanner = Scanner::new(line);
        scanner.literal("#T=").then_some(())?;
        let bytes = scanner.number()?;
        scanner.only_trailing_space().then_some(bytes)
    }

    fn parse_new(line: &str) -> Option<(&str, u64)> {
        let mut scanner = Scanner::new(line);
        let name = scanner.identifier()?;
        (scanner.skip_space() > 0).then_some(())?;
        scanner.literal("new").then_some(())?;
        (scanner.skip_space() > 0).then_some(())?;
        let size = scanner.number()?;
        scanner.only_trailing_space().then_some((name, size))
    }

    fn parse_memory_access(line: &str) -> Option<(&str, u64)> {
        let mut scanner = Scanner::new(line);
        let name = scanner.identifier()?;
        scanner.skip_space();
        scanner.literal("[").then_some(())?;
        let offset = scanner.number()?;
        scanner.literal("]").then_some(())?;
        scanner.only_trailing_space().then_some((name, offset))
    }

    fn parse_read_disk(line: &str) -> bool {
        let mut scanner = Scanner::new(line);
        scanner.literal("read disk") && scanner.only_trailing_space()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Header { bytes } => write!(f, "#T={}", bytes),
            Instruction::New { name, size } => write!(f, "{} new {}", name, size),
            Instruction::MemoryAccess { name, offset } => write!(f, "{}[{}]", name, offset),
            Instruction::ReadDisk => write!(f, "read disk"),
            Instruction::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Classifies a raw instruction line
pub fn classify(line: &str) -> InstructionKind {
    Instruction::parse(line).kind()
}

/// Forward-only cursor over the bytes of one line
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    /// Consumes `expected` if the remaining text starts with it
    fn literal(&mut self, expected: &str) -> bool {
        if self.text[self.pos..].starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return None,
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Some(&self.text[start..self.pos])
    }

    fn number(&mut self) -> Option<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            value = value
                .saturating_mul(10)
                .saturating_add(u64::from(b - b'0'));
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    /// Skips whitespace and returns how many bytes were skipped
    fn skip_space(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_space(b)) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn only_trailing_space(&mut self) -> bool {
        self.skip_space();
        self.pos == self.text.len()
    }
}

/// Whitespace as POSIX `[[:space:]]` defines it
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
