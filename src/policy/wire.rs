use std::io::{self, BufRead, Write};
use std::process::{ChildStdin, ChildStdout};

/// A lossless C99 `%a`-style hexadecimal-float encoding of an `f64`, used for
/// every floating-point token the supervisor sends to a policy process
/// (spec §4.D, §6): `[-]0x{0,1}[.hhh...]p[+-]ddd`, e.g. `1.0` encodes as
/// `0x1p+0` and `3.5` as `0x1.cp+1`. This is the literal syntax `strtod(3)`
/// and Python's `float.fromhex` accept, unlike a raw bit-pattern dump — a
/// policy process written against either can parse it directly.
pub fn encode_hexf64(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0x0p+0".to_string() } else { "0x0p+0".to_string() };
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf".to_string() } else { "inf".to_string() };
    }

    let bits = value.to_bits();
    let sign = bits >> 63;
    let biased_exp = ((bits >> 52) & 0x7ff) as i64;
    let mantissa = bits & 0xf_ffff_ffff_ffff;

    // Normals carry an implicit leading 1 bit and an unbiased exponent;
    // subnormals have no implicit bit and a fixed exponent of -1022.
    let (leading_digit, exponent) = if biased_exp == 0 {
        (0u64, -1022i64)
    } else {
        (1u64, biased_exp - 1023)
    };

    let mantissa_hex = format!("{mantissa:013x}");
    let mantissa_hex = mantissa_hex.trim_end_matches('0');
    let frac = if mantissa_hex.is_empty() {
        String::new()
    } else {
        format!(".{mantissa_hex}")
    };

    format!(
        "{}0x{leading_digit}{frac}p{exponent:+}",
        if sign == 1 { "-" } else { "" },
    )
}

/// Inverse of [`encode_hexf64`]. Reconstructs the IEEE-754 bit pattern
/// directly from the parsed sign/mantissa/exponent fields rather than via
/// floating-point arithmetic, so it round-trips [`encode_hexf64`]'s output
/// exactly.
pub fn decode_hexf64(token: &str) -> io::Result<f64> {
    let invalid = || io::Error::new(io::ErrorKind::InvalidData, format!("invalid hex float: {token}"));

    match token {
        "nan" => return Ok(f64::NAN),
        "inf" => return Ok(f64::INFINITY),
        "-inf" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }

    let (sign_bit, rest) = match token.strip_prefix('-') {
        Some(rest) => (1u64, rest),
        None => (0u64, token),
    };

    let rest = rest.strip_prefix("0x").ok_or_else(invalid)?;
    let (mantissa_part, exp_part) = rest.split_once('p').ok_or_else(invalid)?;
    let exponent: i64 = exp_part.parse().map_err(|_| invalid())?;

    let (leading, frac) = match mantissa_part.split_once('.') {
        Some((leading, frac)) => (leading, frac),
        None => (mantissa_part, ""),
    };

    if !frac.bytes().all(|b| b.is_ascii_hexdigit()) || frac.len() > 13 {
        return Err(invalid());
    }
    let mut mantissa_hex = frac.to_string();
    while mantissa_hex.len() < 13 {
        mantissa_hex.push('0');
    }
    let mantissa = u64::from_str_radix(&mantissa_hex, 16).map_err(|_| invalid())?;

    let biased_exp = match leading {
        "0" => 0u64,
        "1" => (exponent + 1023) as u64,
        _ => return Err(invalid()),
    };

    let bits = (sign_bit << 63) | (biased_exp << 52) | mantissa;
    Ok(f64::from_bits(bits))
}

/// Line-oriented half-duplex channel to a policy process's stdin/stdout.
///
/// Writes go straight through; reads accumulate bytes until a newline is
/// seen regardless of how the policy process buffers its output (spec §4.D).
pub struct PolicyPipe {
    stdin: ChildStdin,
    stdout: io::BufReader<ChildStdout>,
}

impl PolicyPipe {
    pub fn new(stdin: ChildStdin, stdout: ChildStdout) -> Self {
        Self {
            stdin,
            stdout: io::BufReader::new(stdout),
        }
    }

    /// Writes one line (newline appended) to the policy's stdin.
    ///
    /// A short write or a broken pipe is `PipeFatal` (spec §7): the caller
    /// should propagate it and let [`crate::lifecycle::Lifecycle`] clean up.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }

    /// Blocks until a full line (sans trailing newline) is available.
    ///
    /// EOF with no bytes read is a broken pipe: `PipeFatal`.
    pub fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.stdout.read_line(&mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "policy process closed its stdout",
            ));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_hexfloat_literals() {
        assert_eq!(encode_hexf64(1.0), "0x1p+0");
        assert_eq!(encode_hexf64(3.5), "0x1.cp+1");
        assert_eq!(encode_hexf64(-3.5), "-0x1.cp+1");
        assert_eq!(encode_hexf64(0.0), "0x0p+0");
        assert_eq!(encode_hexf64(-0.0), "-0x0p+0");
    }

    #[test]
    fn roundtrips_subnormals_and_extremes() {
        for v in [
            0.0,
            -0.0,
            1.0,
            -3.5,
            f64::MAX,
            f64::MIN_POSITIVE,
            5e-324, // smallest positive subnormal
            f64::EPSILON,
        ] {
            let encoded = encode_hexf64(v);
            let decoded = decode_hexf64(&encoded).unwrap();
            assert_eq!(v.to_bits(), decoded.to_bits(), "{v} encoded as {encoded}");
        }
    }

    #[test]
    fn roundtrips_nan_and_infinities() {
        assert!(decode_hexf64(&encode_hexf64(f64::NAN)).unwrap().is_nan());
        assert_eq!(decode_hexf64(&encode_hexf64(f64::INFINITY)).unwrap(), f64::INFINITY);
        assert_eq!(
            decode_hexf64(&encode_hexf64(f64::NEG_INFINITY)).unwrap(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(decode_hexf64("not-a-float").is_err());
        assert!(decode_hexf64("0x1.zp+0").is_err());
        assert!(decode_hexf64("1p+0").is_err());
    }
}
