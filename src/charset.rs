//! Text/byte conversion for the supported charsets.
//!
//! Multi-byte East Asian encodings go through `encoding_rs`. UTF-16 and
//! ISO-8859-1 are converted directly because the WHATWG tables behind
//! `encoding_rs` have no UTF-16 encoder and map `ISO-8859-1` to
//! windows-1252.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use encoding_rs::{BIG5, EUC_KR, Encoding, GB18030, GBK, SHIFT_JIS};

use crate::error::CryptoError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    #[default]
    Utf8,
    Gbk,
    Gb2312,
    Gb18030,
    Big5,
    Iso8859_1,
    ShiftJis,
    EucKr,
    Utf16Be,
    Utf16Le,
}

impl Charset {
    /// Supported charsets in selector order.
    pub const ALL: &'static [Self] =
        &[Self::Utf8, Self::Gbk, Self::Gb2312, Self::Gb18030, Self::Big5, Self::Iso8859_1, Self::ShiftJis, Self::EucKr, Self::Utf16Be, Self::Utf16Le];

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Gbk => "GBK",
            Self::Gb2312 => "GB2312",
            Self::Gb18030 => "GB18030",
            Self::Big5 => "BIG5",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::ShiftJis => "Shift_JIS",
            Self::EucKr => "EUC-KR",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
        }
    }

    /// Converts text to bytes. Unmappable characters are replaced.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Iso8859_1 => text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            other => other.table().map(|encoding| encoding.encode(text).0.into_owned()).unwrap_or_default(),
        }
    }

    /// Converts bytes to text. Invalid sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Utf16Be => encoding_rs::UTF_16BE.decode_without_bom_handling(bytes).0.into_owned(),
            Self::Utf16Le => encoding_rs::UTF_16LE.decode_without_bom_handling(bytes).0.into_owned(),
            other => other.table().map(|encoding| encoding.decode_without_bom_handling(bytes).0.into_owned()).unwrap_or_default(),
        }
    }

    fn table(self) -> Option<&'static Encoding> {
        match self {
            // GB2312 text is a subset of GBK.
            Self::Gbk | Self::Gb2312 => Some(GBK),
            Self::Gb18030 => Some(GB18030),
            Self::Big5 => Some(BIG5),
            Self::ShiftJis => Some(SHIFT_JIS),
            Self::EucKr => Some(EUC_KR),
            Self::Utf8 | Self::Iso8859_1 | Self::Utf16Be | Self::Utf16Le => None,
        }
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|charset| charset.name().eq_ignore_ascii_case(wanted) || charset.name().replace('-', "").eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CryptoError::UnsupportedCharset(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("UTF8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("shift_jis".parse::<Charset>().unwrap(), Charset::ShiftJis);
        assert!(matches!("EBCDIC".parse::<Charset>(), Err(CryptoError::UnsupportedCharset(_))));
    }

    #[test]
    fn test_every_charset_roundtrips_ascii() {
        for &charset in Charset::ALL {
            let bytes = charset.encode("hello world");
            assert_eq!(charset.decode(&bytes), "hello world", "{charset}");
        }
    }

    #[test]
    fn test_gbk_chinese() {
        let bytes = Charset::Gbk.encode("你好");
        assert_eq!(bytes, vec![0xc4, 0xe3, 0xba, 0xc3]);
        assert_eq!(Charset::Gbk.decode(&bytes), "你好");
    }

    #[test]
    fn test_utf16_byte_order() {
        assert_eq!(Charset::Utf16Be.encode("A"), vec![0x00, 0x41]);
        assert_eq!(Charset::Utf16Le.encode("A"), vec![0x41, 0x00]);
    }

    #[test]
    fn test_latin1_is_byte_for_byte() {
        assert_eq!(Charset::Iso8859_1.encode("é"), vec![0xe9]);
        assert_eq!(Charset::Iso8859_1.decode(&[0xe9]), "é");
        assert_eq!(Charset::Iso8859_1.encode("€"), vec![b'?']);
    }
}
