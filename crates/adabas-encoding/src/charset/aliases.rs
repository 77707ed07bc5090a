//! Charset alias table.
//!
//! Maps the lower-case labels accepted in field definitions and session
//! parameters to a codec identifier. The table is sorted by label so lookup
//! is a binary search.

/// Internal codec index selected by an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharsetId {
    Utf8,
    Ibm866,
    Iso8859_2,
    Iso8859_3,
    Iso8859_4,
    Iso8859_5,
    Iso8859_6,
    Iso8859_7,
    Iso8859_8,
    Iso8859_8I,
    Iso8859_10,
    Iso8859_13,
    Iso8859_14,
    Iso8859_15,
    Iso8859_16,
    Koi8R,
    Koi8U,
    Macintosh,
    Windows874,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    Windows1254,
    Windows1255,
    Windows1256,
    Windows1257,
    Windows1258,
    MacCyrillic,
    Gbk,
    Gb18030,
    Big5,
    EucJp,
    Iso2022Jp,
    ShiftJis,
    EucKr,
    Replacement,
    Utf16Be,
    Utf16Le,
    Ibm037,
    Ibm850,
    Ibm852,
    Ibm855,
    Ibm858,
    Ibm860,
    Ibm437,
    Ibm1047,
    Ibm1140,
    XUserDefined,
}

#[rustfmt::skip]
static ALIASES: &[(&str, CharsetId)] = &[
    ("437", CharsetId::Ibm437),
    ("850", CharsetId::Ibm850),
    ("866", CharsetId::Ibm866),
    ("ansi_x3.4-1968", CharsetId::Windows1252),
    ("arabic", CharsetId::Iso8859_6),
    ("ascii", CharsetId::Windows1252),
    ("asmo-708", CharsetId::Iso8859_6),
    ("big5", CharsetId::Big5),
    ("big5-hkscs", CharsetId::Big5),
    ("chinese", CharsetId::Gbk),
    ("cn-big5", CharsetId::Big5),
    ("cp037", CharsetId::Ibm037),
    ("cp1047", CharsetId::Ibm1047),
    ("cp1140", CharsetId::Ibm1140),
    ("cp1250", CharsetId::Windows1250),
    ("cp1251", CharsetId::Windows1251),
    ("cp1252", CharsetId::Windows1252),
    ("cp1253", CharsetId::Windows1253),
    ("cp1254", CharsetId::Windows1254),
    ("cp1255", CharsetId::Windows1255),
    ("cp1256", CharsetId::Windows1256),
    ("cp1257", CharsetId::Windows1257),
    ("cp1258", CharsetId::Windows1258),
    ("cp437", CharsetId::Ibm437),
    ("cp819", CharsetId::Windows1252),
    ("cp850", CharsetId::Ibm850),
    ("cp852", CharsetId::Ibm852),
    ("cp855", CharsetId::Ibm855),
    ("cp858", CharsetId::Ibm858),
    ("cp860", CharsetId::Ibm860),
    ("cp866", CharsetId::Ibm866),
    ("csbig5", CharsetId::Big5),
    ("cseuckr", CharsetId::EucKr),
    ("cseucpkdfmtjapanese", CharsetId::EucJp),
    ("csgb2312", CharsetId::Gbk),
    ("csibm866", CharsetId::Ibm866),
    ("csiso2022jp", CharsetId::Iso2022Jp),
    ("csiso2022kr", CharsetId::Replacement),
    ("csiso58gb231280", CharsetId::Gbk),
    ("csiso88596e", CharsetId::Iso8859_6),
    ("csiso88596i", CharsetId::Iso8859_6),
    ("csiso88598e", CharsetId::Iso8859_8),
    ("csiso88598i", CharsetId::Iso8859_8I),
    ("csisolatin1", CharsetId::Windows1252),
    ("csisolatin2", CharsetId::Iso8859_2),
    ("csisolatin3", CharsetId::Iso8859_3),
    ("csisolatin4", CharsetId::Iso8859_4),
    ("csisolatin5", CharsetId::Windows1254),
    ("csisolatin6", CharsetId::Iso8859_10),
    ("csisolatin9", CharsetId::Iso8859_15),
    ("csisolatinarabic", CharsetId::Iso8859_6),
    ("csisolatincyrillic", CharsetId::Iso8859_5),
    ("csisolatingreek", CharsetId::Iso8859_7),
    ("csisolatinhebrew", CharsetId::Iso8859_8),
    ("cskoi8r", CharsetId::Koi8R),
    ("csksc56011987", CharsetId::EucKr),
    ("csmacintosh", CharsetId::Macintosh),
    ("csshiftjis", CharsetId::ShiftJis),
    ("cyrillic", CharsetId::Iso8859_5),
    ("dos-874", CharsetId::Windows874),
    ("ebcdic-cp-us", CharsetId::Ibm037),
    ("ecma-114", CharsetId::Iso8859_6),
    ("ecma-118", CharsetId::Iso8859_7),
    ("elot_928", CharsetId::Iso8859_7),
    ("euc-jp", CharsetId::EucJp),
    ("euc-kr", CharsetId::EucKr),
    ("gb18030", CharsetId::Gb18030),
    ("gb2312", CharsetId::Gbk),
    ("gb_2312", CharsetId::Gbk),
    ("gb_2312-80", CharsetId::Gbk),
    ("gbk", CharsetId::Gbk),
    ("greek", CharsetId::Iso8859_7),
    ("greek8", CharsetId::Iso8859_7),
    ("hebrew", CharsetId::Iso8859_8),
    ("hz-gb-2312", CharsetId::Replacement),
    ("ibm-037", CharsetId::Ibm037),
    ("ibm-1047", CharsetId::Ibm1047),
    ("ibm-1140", CharsetId::Ibm1140),
    ("ibm-852", CharsetId::Ibm852),
    ("ibm037", CharsetId::Ibm037),
    ("ibm1047", CharsetId::Ibm1047),
    ("ibm1140", CharsetId::Ibm1140),
    ("ibm437", CharsetId::Ibm437),
    ("ibm819", CharsetId::Windows1252),
    ("ibm850", CharsetId::Ibm850),
    ("ibm852", CharsetId::Ibm852),
    ("ibm855", CharsetId::Ibm855),
    ("ibm858", CharsetId::Ibm858),
    ("ibm860", CharsetId::Ibm860),
    ("ibm866", CharsetId::Ibm866),
    ("iso-2022-cn", CharsetId::Replacement),
    ("iso-2022-cn-ext", CharsetId::Replacement),
    ("iso-2022-jp", CharsetId::Iso2022Jp),
    ("iso-2022-kr", CharsetId::Replacement),
    ("iso-8859-1", CharsetId::Windows1252),
    ("iso-8859-10", CharsetId::Iso8859_10),
    ("iso-8859-11", CharsetId::Windows874),
    ("iso-8859-13", CharsetId::Iso8859_13),
    ("iso-8859-14", CharsetId::Iso8859_14),
    ("iso-8859-15", CharsetId::Iso8859_15),
    ("iso-8859-16", CharsetId::Iso8859_16),
    ("iso-8859-2", CharsetId::Iso8859_2),
    ("iso-8859-3", CharsetId::Iso8859_3),
    ("iso-8859-4", CharsetId::Iso8859_4),
    ("iso-8859-5", CharsetId::Iso8859_5),
    ("iso-8859-6", CharsetId::Iso8859_6),
    ("iso-8859-6-e", CharsetId::Iso8859_6),
    ("iso-8859-6-i", CharsetId::Iso8859_6),
    ("iso-8859-7", CharsetId::Iso8859_7),
    ("iso-8859-8", CharsetId::Iso8859_8),
    ("iso-8859-8-e", CharsetId::Iso8859_8),
    ("iso-8859-8-i", CharsetId::Iso8859_8I),
    ("iso-8859-9", CharsetId::Windows1254),
    ("iso-ir-100", CharsetId::Windows1252),
    ("iso-ir-101", CharsetId::Iso8859_2),
    ("iso-ir-109", CharsetId::Iso8859_3),
    ("iso-ir-110", CharsetId::Iso8859_4),
    ("iso-ir-126", CharsetId::Iso8859_7),
    ("iso-ir-127", CharsetId::Iso8859_6),
    ("iso-ir-138", CharsetId::Iso8859_8),
    ("iso-ir-144", CharsetId::Iso8859_5),
    ("iso-ir-148", CharsetId::Windows1254),
    ("iso-ir-149", CharsetId::EucKr),
    ("iso-ir-157", CharsetId::Iso8859_10),
    ("iso-ir-58", CharsetId::Gbk),
    ("iso8859-1", CharsetId::Windows1252),
    ("iso8859-10", CharsetId::Iso8859_10),
    ("iso8859-11", CharsetId::Windows874),
    ("iso8859-13", CharsetId::Iso8859_13),
    ("iso8859-14", CharsetId::Iso8859_14),
    ("iso8859-15", CharsetId::Iso8859_15),
    ("iso8859-2", CharsetId::Iso8859_2),
    ("iso8859-3", CharsetId::Iso8859_3),
    ("iso8859-4", CharsetId::Iso8859_4),
    ("iso8859-5", CharsetId::Iso8859_5),
    ("iso8859-6", CharsetId::Iso8859_6),
    ("iso8859-7", CharsetId::Iso8859_7),
    ("iso8859-8", CharsetId::Iso8859_8),
    ("iso8859-9", CharsetId::Windows1254),
    ("iso88591", CharsetId::Windows1252),
    ("iso885910", CharsetId::Iso8859_10),
    ("iso885911", CharsetId::Windows874),
    ("iso885913", CharsetId::Iso8859_13),
    ("iso885914", CharsetId::Iso8859_14),
    ("iso885915", CharsetId::Iso8859_15),
    ("iso88592", CharsetId::Iso8859_2),
    ("iso88593", CharsetId::Iso8859_3),
    ("iso88594", CharsetId::Iso8859_4),
    ("iso88595", CharsetId::Iso8859_5),
    ("iso88596", CharsetId::Iso8859_6),
    ("iso88597", CharsetId::Iso8859_7),
    ("iso88598", CharsetId::Iso8859_8),
    ("iso88599", CharsetId::Windows1254),
    ("iso_8859-1", CharsetId::Windows1252),
    ("iso_8859-15", CharsetId::Iso8859_15),
    ("iso_8859-1:1987", CharsetId::Windows1252),
    ("iso_8859-2", CharsetId::Iso8859_2),
    ("iso_8859-2:1987", CharsetId::Iso8859_2),
    ("iso_8859-3", CharsetId::Iso8859_3),
    ("iso_8859-3:1988", CharsetId::Iso8859_3),
    ("iso_8859-4", CharsetId::Iso8859_4),
    ("iso_8859-4:1988", CharsetId::Iso8859_4),
    ("iso_8859-5", CharsetId::Iso8859_5),
    ("iso_8859-5:1988", CharsetId::Iso8859_5),
    ("iso_8859-6", CharsetId::Iso8859_6),
    ("iso_8859-6:1987", CharsetId::Iso8859_6),
    ("iso_8859-7", CharsetId::Iso8859_7),
    ("iso_8859-7:1987", CharsetId::Iso8859_7),
    ("iso_8859-8", CharsetId::Iso8859_8),
    ("iso_8859-8:1988", CharsetId::Iso8859_8),
    ("iso_8859-9", CharsetId::Windows1254),
    ("iso_8859-9:1989", CharsetId::Windows1254),
    ("koi", CharsetId::Koi8R),
    ("koi8", CharsetId::Koi8R),
    ("koi8-r", CharsetId::Koi8R),
    ("koi8-ru", CharsetId::Koi8U),
    ("koi8-u", CharsetId::Koi8U),
    ("koi8_r", CharsetId::Koi8R),
    ("korean", CharsetId::EucKr),
    ("ks_c_5601-1987", CharsetId::EucKr),
    ("ks_c_5601-1989", CharsetId::EucKr),
    ("ksc5601", CharsetId::EucKr),
    ("ksc_5601", CharsetId::EucKr),
    ("l1", CharsetId::Windows1252),
    ("l2", CharsetId::Iso8859_2),
    ("l3", CharsetId::Iso8859_3),
    ("l4", CharsetId::Iso8859_4),
    ("l5", CharsetId::Windows1254),
    ("l6", CharsetId::Iso8859_10),
    ("l9", CharsetId::Iso8859_15),
    ("latin1", CharsetId::Windows1252),
    ("latin2", CharsetId::Iso8859_2),
    ("latin3", CharsetId::Iso8859_3),
    ("latin4", CharsetId::Iso8859_4),
    ("latin5", CharsetId::Windows1254),
    ("latin6", CharsetId::Iso8859_10),
    ("logical", CharsetId::Iso8859_8I),
    ("mac", CharsetId::Macintosh),
    ("macintosh", CharsetId::Macintosh),
    ("ms932", CharsetId::ShiftJis),
    ("ms_kanji", CharsetId::ShiftJis),
    ("replacement", CharsetId::Replacement),
    ("shift-jis", CharsetId::ShiftJis),
    ("shift_jis", CharsetId::ShiftJis),
    ("sjis", CharsetId::ShiftJis),
    ("sun_eu_greek", CharsetId::Iso8859_7),
    ("tis-620", CharsetId::Windows874),
    ("unicode-1-1-utf-8", CharsetId::Utf8),
    ("us-ascii", CharsetId::Windows1252),
    ("utf-16", CharsetId::Utf16Le),
    ("utf-16be", CharsetId::Utf16Be),
    ("utf-16le", CharsetId::Utf16Le),
    ("utf-8", CharsetId::Utf8),
    ("utf8", CharsetId::Utf8),
    ("visual", CharsetId::Iso8859_8),
    ("windows-1250", CharsetId::Windows1250),
    ("windows-1251", CharsetId::Windows1251),
    ("windows-1252", CharsetId::Windows1252),
    ("windows-1253", CharsetId::Windows1253),
    ("windows-1254", CharsetId::Windows1254),
    ("windows-1255", CharsetId::Windows1255),
    ("windows-1256", CharsetId::Windows1256),
    ("windows-1257", CharsetId::Windows1257),
    ("windows-1258", CharsetId::Windows1258),
    ("windows-31j", CharsetId::ShiftJis),
    ("windows-874", CharsetId::Windows874),
    ("windows-949", CharsetId::EucKr),
    ("x-cp1250", CharsetId::Windows1250),
    ("x-cp1251", CharsetId::Windows1251),
    ("x-cp1252", CharsetId::Windows1252),
    ("x-cp1253", CharsetId::Windows1253),
    ("x-cp1254", CharsetId::Windows1254),
    ("x-cp1255", CharsetId::Windows1255),
    ("x-cp1256", CharsetId::Windows1256),
    ("x-cp1257", CharsetId::Windows1257),
    ("x-cp1258", CharsetId::Windows1258),
    ("x-euc-jp", CharsetId::EucJp),
    ("x-gbk", CharsetId::Gbk),
    ("x-mac-cyrillic", CharsetId::MacCyrillic),
    ("x-mac-roman", CharsetId::Macintosh),
    ("x-mac-ukrainian", CharsetId::MacCyrillic),
    ("x-sjis", CharsetId::ShiftJis),
    ("x-user-defined", CharsetId::XUserDefined),
    ("x-x-big5", CharsetId::Big5),
];

/// Resolve an alias (case-insensitive, surrounding whitespace ignored).
pub fn lookup(name: &str) -> Option<CharsetId> {
    let key = name.trim().to_ascii_lowercase();
    ALIASES
        .binary_search_by(|(alias, _)| (*alias).cmp(key.as_str()))
        .ok()
        .map(|i| ALIASES[i].1)
}

/// Number of known aliases.
pub fn alias_count() -> usize {
    ALIASES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in ALIASES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn lookup_common_aliases() {
        assert_eq!(lookup("utf-8"), Some(CharsetId::Utf8));
        assert_eq!(lookup("UTF8"), Some(CharsetId::Utf8));
        assert_eq!(lookup("latin1"), Some(CharsetId::Windows1252));
        assert_eq!(lookup(" iso-8859-1 "), Some(CharsetId::Windows1252));
        assert_eq!(lookup("cp037"), Some(CharsetId::Ibm037));
        assert_eq!(lookup("shift_jis"), Some(CharsetId::ShiftJis));
        assert_eq!(lookup("ibm-1047"), Some(CharsetId::Ibm1047));
    }

    #[test]
    fn lookup_unknown() {
        assert_eq!(lookup("klingon"), None);
        assert!(alias_count() > 120);
    }
}
