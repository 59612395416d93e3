//! Host side of `SYSCALL`: the handful of stdin/stdout operations a program
//! can request.

use std::io::{self, BufRead, BufWriter, Write};

pub trait Host {
    fn read_int(&mut self) -> io::Result<i32>;
    fn read_double(&mut self) -> io::Result<f64>;
    /// Next input byte, or -1 at end of input.
    fn read_char(&mut self) -> io::Result<i32>;
    fn write_int(&mut self, v: i32) -> io::Result<()>;
    fn write_double(&mut self, v: f64) -> io::Result<()>;
    fn write_char(&mut self, c: i32) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// [`Host`] over any buffered reader and writer.
///
/// Numbers are scanned the way `scanf` does it: leading whitespace is
/// skipped and the longest numeric prefix is consumed, leaving the rest of
/// the input in place for the next read.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.fill_buf()?.first().copied())
    }

    fn scan(&mut self, accept: impl Fn(&[u8], u8) -> bool) -> io::Result<String> {
        // Pending output (a prompt, say) must be visible before we block.
        self.output.flush()?;
        while let Some(b) = self.peek()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.input.consume(1);
        }
        let mut tok = Vec::new();
        while let Some(b) = self.peek()? {
            if !accept(&tok, b) {
                break;
            }
            tok.push(b);
            self.input.consume(1);
        }
        if tok.is_empty() {
            return Err(match self.peek()? {
                None => io::Error::new(io::ErrorKind::UnexpectedEof, "input exhausted"),
                Some(b) => io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected {:?} in numeric input", b as char),
                ),
            });
        }
        Ok(String::from_utf8_lossy(&tok).into_owned())
    }

    fn invalid(tok: &str) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, format!("malformed number {tok:?}"))
    }
}

impl Console<io::StdinLock<'static>, BufWriter<io::StdoutLock<'static>>> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), BufWriter::new(io::stdout().lock()))
    }
}

impl<R: BufRead, W: Write> Host for Console<R, W> {
    fn read_int(&mut self) -> io::Result<i32> {
        let tok = self.scan(|tok, b| b.is_ascii_digit() || (tok.is_empty() && (b == b'-' || b == b'+')))?;
        // %d keeps the low 32 bits of an oversized literal
        tok.parse::<i64>().map(|v| v as i32).map_err(|_| Self::invalid(&tok))
    }

    fn read_double(&mut self) -> io::Result<f64> {
        let tok = self.scan(|tok, b| match b {
            b'0'..=b'9' | b'.' | b'e' | b'E' => true,
            b'-' | b'+' => matches!(tok.last().copied(), None | Some(b'e') | Some(b'E')),
            _ => false,
        })?;
        tok.parse::<f64>().map_err(|_| Self::invalid(&tok))
    }

    fn read_char(&mut self) -> io::Result<i32> {
        self.output.flush()?;
        match self.peek()? {
            Some(b) => {
                self.input.consume(1);
                Ok(b as i32)
            }
            None => Ok(-1),
        }
    }

    fn write_int(&mut self, v: i32) -> io::Result<()> {
        write!(self.output, "{v}")
    }

    fn write_double(&mut self, v: f64) -> io::Result<()> {
        self.output.write_all(format_g(v).as_bytes())
    }

    fn write_char(&mut self, c: i32) -> io::Result<()> {
        self.output.write_all(&[c as u8])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

/// Formats like C's `%g`: six significant digits, trailing zeros dropped,
/// exponent form when the exponent is below -4 or at least 6.
pub fn format_g(v: f64) -> String {
    const PRECISION: i32 = 6;

    if v.is_nan() {
        return if v.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let fixed = format!("{:.*}", (PRECISION - 1 - exp) as usize, v);
        trim_fraction(&fixed).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
