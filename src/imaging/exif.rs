use chrono::NaiveDate;
use std::io::Cursor;

/// 촬영 일시(EXIF)에서 영수증 날짜를 추출
///
/// DateTimeOriginal → DateTime 순으로 찾는다. EXIF가 없으면 None.
pub fn extract_date(bytes: &[u8]) -> Option<NaiveDate> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .iter()
        .filter_map(|tag| exif.get_field(*tag, exif::In::PRIMARY))
        .find_map(|field| match &field.value {
            exif::Value::Ascii(values) => values.first().and_then(|raw| parse_exif_date(raw)),
            _ => None,
        })
}

/// "2025:07:01 12:34:56" 형식
fn parse_exif_date(raw: &[u8]) -> Option<NaiveDate> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exif_date() {
        assert_eq!(
            parse_exif_date(b"2025:07:01 12:34:56"),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert!(parse_exif_date(b"not a date").is_none());
    }

    #[test]
    fn test_no_exif() {
        assert!(extract_date(b"plain bytes").is_none());
    }
}
