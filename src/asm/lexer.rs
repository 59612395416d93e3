//! Splits assembly text into per-line label / mnemonic / operand lists.

/// One physical source line after tokenizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: usize,
    pub labels: Vec<String>,
    /// Upper-cased.
    pub mnemonic: Option<String>,
    pub operands: Vec<String>,
}

pub fn tokenize(src: &str) -> Vec<SourceLine> {
    src.lines()
        .enumerate()
        .map(|(i, line)| split_line(i + 1, line))
        .collect()
}

pub fn split_line(number: usize, text: &str) -> SourceLine {
    let mut line = SourceLine {
        number,
        ..SourceLine::default()
    };
    let mut token = String::new();
    for ch in text.chars() {
        match ch {
            ';' => break,
            ':' => {
                if !token.is_empty() {
                    line.labels.push(std::mem::take(&mut token));
                }
            }
            ' ' | '\t' | ',' | '\r' => line.push_token(&mut token),
            _ => token.push(ch),
        }
    }
    line.push_token(&mut token);
    line
}

impl SourceLine {
    fn push_token(&mut self, token: &mut String) {
        if token.is_empty() {
            return;
        }
        let tok = std::mem::take(token);
        if self.mnemonic.is_none() {
            self.mnemonic = Some(tok.to_ascii_uppercase());
        } else {
            self.operands.push(tok);
        }
    }
}
