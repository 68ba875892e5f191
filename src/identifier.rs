use crate::error::Error;

/// How identifier tokens are written on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    /// Two hex digits per byte, `0x` prefix optional
    #[default]
    Hex,
    /// Decimal octets `0..=255`
    Decimal,
}

/// Assemble one byte per token into the data identifier
pub fn parse_identifier<S: AsRef<str>>(tokens: &[S], radix: Radix) -> Result<Vec<u8>, Error> {
    if tokens.is_empty() {
        return Err(Error::InvalidIdentifier("no bytes given".to_owned()));
    }
    tokens
        .iter()
        .map(|token| parse_byte(token.as_ref(), radix))
        .collect()
}

/// An identifier is compared against the start of one block, so it must fit in one
pub fn check_length(identifier: &[u8], block_size: u32) -> Result<(), Error> {
    if identifier.is_empty() || identifier.len() > block_size as usize {
        return Err(Error::InvalidIdentifier(format!(
            "{} bytes does not fit a {block_size} byte block",
            identifier.len()
        )));
    }
    Ok(())
}

fn parse_byte(token: &str, radix: Radix) -> Result<u8, Error> {
    let invalid = || Error::InvalidIdentifier(format!("{token:?} is not a byte"));
    let parsed = match radix {
        Radix::Hex => {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty()
                || digits.len() > 2
                || !digits.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(invalid());
            }
            u8::from_str_radix(digits, 16)
        }
        Radix::Decimal => token.parse::<u8>(),
    };
    parsed.map_err(|_| invalid())
}
