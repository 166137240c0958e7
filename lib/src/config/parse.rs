use std::path::PathBuf;
use std::time::Duration;
use super::ValueParser;

#[derive(Clone, Debug)]
pub struct StringParser { }

impl ValueParser<String> for self::StringParser {
    fn parse(&self, value: &str) -> Result<String, String> {
        Ok(value.to_owned())
    }
}

pub const STRING: StringParser = StringParser {};

#[derive(Clone, Debug)]
pub struct BoolParser { }

impl ValueParser<bool> for self::BoolParser {
    fn parse(&self, value: &str) -> Result<bool, String> {
        value.parse::<bool>()
            .map_err(|_| format!("invalid boolean value: {value}"))
    }
}

pub const BOOL: BoolParser = BoolParser {};

#[derive(Clone, Debug)]
pub struct FilePathParser { }

impl ValueParser<PathBuf> for self::FilePathParser {
    fn parse(&self, value: &str) -> Result<PathBuf, String> {
        Ok(PathBuf::from(shellexpand::tilde(value).into_owned()))
    }
}

pub const FILE_PATH: FilePathParser = FilePathParser {};

#[derive(Clone, Debug)]
pub struct WebPortParser { }

impl ValueParser<u16> for self::WebPortParser {
    fn parse(&self, value: &str) -> Result<u16, String> {
        value.parse::<u16>()
            .map_err(|_| format!("invalid port number: {value}"))
    }
}

pub const WEB_PORT: WebPortParser = WebPortParser {};

/// Whole milliseconds.  `0` means no limit, and parses to `None`.
#[derive(Clone, Debug)]
pub struct MillisParser { }

impl ValueParser<Option<Duration>> for self::MillisParser {
    fn parse(&self, value: &str) -> Result<Option<Duration>, String> {
        let ms = value.parse::<u64>()
            .map_err(|_| format!("invalid duration in milliseconds: {value}"))?;
        Ok((ms > 0).then(|| Duration::from_millis(ms)))
    }
}

pub const MILLIS: MillisParser = MillisParser {};

/// A whole number of bytes.
#[derive(Clone, Debug)]
pub struct ByteSizeParser { }

impl ValueParser<usize> for self::ByteSizeParser {
    fn parse(&self, value: &str) -> Result<usize, String> {
        value.parse::<usize>()
            .map_err(|_| format!("invalid size in bytes: {value}"))
    }
}

pub const BYTE_SIZE: ByteSizeParser = ByteSizeParser {};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_zero_is_unlimited() {
        assert_eq!(MILLIS.parse("0").unwrap(), None);
        assert_eq!(MILLIS.parse("1500").unwrap(),
                   Some(Duration::from_millis(1500)));
        assert!(MILLIS.parse("-1").is_err());
    }

    #[test]
    fn port_must_fit_u16() {
        assert_eq!(WEB_PORT.parse("9000").unwrap(), 9000);
        assert!(WEB_PORT.parse("70000").is_err());
    }

    #[test]
    fn byte_size_is_unsigned() {
        assert_eq!(BYTE_SIZE.parse("16777216").unwrap(), 16 * 1024 * 1024);
        assert!(BYTE_SIZE.parse("-5").is_err());
        assert!(BYTE_SIZE.parse("1MB").is_err());
    }
}
