use crate::instructions::{self, InstrDesc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    End,
    Word,
    Double,
}

impl Directive {
    pub const ALL: [Directive; 3] = [Directive::End, Directive::Word, Directive::Double];

    pub fn name(self) -> &'static str {
        match self {
            Directive::End => "END",
            Directive::Word => "WORD",
            Directive::Double => "DOUBLE",
        }
    }

    fn parse(mnemonic: &str) -> Option<Directive> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(mnemonic))
    }
}

/// What a mnemonic names: an assembler directive or a machine instruction.
#[derive(Debug, Clone, Copy)]
pub enum Stmt {
    Directive(Directive),
    Instruction(&'static InstrDesc),
}

impl Stmt {
    pub fn classify(mnemonic: &str) -> Option<Stmt> {
        if let Some(d) = Directive::parse(mnemonic) {
            return Some(Stmt::Directive(d));
        }
        instructions::lookup(mnemonic).map(Stmt::Instruction)
    }

    /// Image words the statement occupies.
    pub fn width(&self) -> u32 {
        match self {
            Stmt::Directive(Directive::Double) => 2,
            _ => 1,
        }
    }
}

/// True for names that can never be labels.
pub fn is_reserved(name: &str) -> bool {
    Stmt::classify(name).is_some() || is_register_name(name)
}

pub fn is_register_name(name: &str) -> bool {
    name == "flags" || register(name).is_some()
}

/// `r0`..`r15`. The flags register is implicit and never an operand.
pub fn register(name: &str) -> Option<u8> {
    let idx = name.strip_prefix('r')?;
    // no leading zeros or signs: "r01" and "r+1" are not registers
    if idx.is_empty() || (idx.len() > 1 && idx.starts_with('0')) || !idx.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    idx.parse::<u8>().ok().filter(|&r| r < 16)
}

/// Numeric tokens start with a digit or a sign; anything else is a label.
pub fn looks_numeric(tok: &str) -> bool {
    matches!(tok.bytes().next(), Some(b'0'..=b'9' | b'-' | b'+'))
}

/// Decimal or `0x` hexadecimal, optionally signed.
pub fn parse_number(tok: &str) -> Option<i64> {
    let (neg, body) = match tok.as_bytes().first() {
        Some(b'-') => (true, &tok[1..]),
        Some(b'+') => (false, &tok[1..]),
        _ => (false, tok),
    };
    let digits = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"));
    if digits.unwrap_or(body).starts_with(['+', '-']) {
        return None;
    }
    let v = match digits {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => body.parse::<i64>().ok()?,
    };
    Some(if neg { -v } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Op;

    #[test]
    fn directives_win_over_table_lookup() {
        assert!(matches!(Stmt::classify("double"), Some(Stmt::Directive(Directive::Double))));
        assert!(matches!(Stmt::classify("Ret"), Some(Stmt::Instruction(d)) if d.op == Op::Ret));
        assert!(Stmt::classify("NOPE").is_none());
    }

    #[test]
    fn register_names() {
        assert_eq!(register("r0"), Some(0));
        assert_eq!(register("r15"), Some(15));
        assert_eq!(register("r16"), None);
        assert_eq!(register("R1"), None);
        assert_eq!(register("r01"), None);
        assert_eq!(register("flags"), None);
        assert!(is_register_name("flags"));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("-7"), Some(-7));
        assert_eq!(parse_number("+0x10"), Some(16));
        assert_eq!(parse_number("--1"), None);
        assert_eq!(parse_number("12ab"), None);
        assert!(looks_numeric("-1") && !looks_numeric("loop"));
    }
}
