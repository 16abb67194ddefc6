//! 行到实体的映射辅助
//!
//! JSON文本列采用宽松解析：解析失败回退为空列表而不是让整行
//! 查询失败，与既有数据的容错方式保持一致。损坏内容会记一条
//! warn日志，周几编号的合法性由到期判定负责。

use chrono::NaiveDate;
use tracing::warn;

pub struct MappingHelpers;

impl MappingHelpers {
    /// 解析周几JSON列（如 `[0,2,4]`）
    pub fn parse_weekdays(raw: &str) -> Vec<u8> {
        match serde_json::from_str::<Vec<i64>>(raw) {
            // 超出u8范围的值（包括负数）映射为u8::MAX，保持越界标记，
            // 由到期判定报告InvalidRecurrence，绝不落到合法的周几编号上
            Ok(values) => values
                .into_iter()
                .map(|value| u8::try_from(value).unwrap_or(u8::MAX))
                .collect(),
            Err(error) => {
                warn!("周几列内容损坏，按空列表处理: {error}");
                Vec::new()
            }
        }
    }

    pub fn weekdays_to_json(weekdays: &[u8]) -> String {
        serde_json::to_string(weekdays).unwrap_or_else(|_| "[]".to_string())
    }

    /// 解析假期日期JSON列（ISO日期字符串数组）
    pub fn parse_holiday_dates(raw: &str) -> Vec<NaiveDate> {
        let entries: Vec<String> = match serde_json::from_str(raw) {
            Ok(entries) => entries,
            Err(error) => {
                warn!("假期列内容损坏，按空列表处理: {error}");
                return Vec::new();
            }
        };

        entries
            .iter()
            .filter_map(|entry| match entry.parse::<NaiveDate>() {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!("忽略无法解析的假期日期: {entry}");
                    None
                }
            })
            .collect()
    }

    pub fn holiday_dates_to_json(dates: &[NaiveDate]) -> String {
        let entries: Vec<String> = dates.iter().map(|date| date.to_string()).collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weekdays_lenient() {
        assert_eq!(MappingHelpers::parse_weekdays("[0,2,4]"), vec![0, 2, 4]);
        assert_eq!(MappingHelpers::parse_weekdays("[]"), Vec::<u8>::new());
        // 损坏内容回退为空
        assert_eq!(MappingHelpers::parse_weekdays("not json"), Vec::<u8>::new());
        // 越界值保留，由到期判定报告
        assert_eq!(MappingHelpers::parse_weekdays("[9]"), vec![9]);
    }

    #[test]
    fn test_parse_weekdays_negative_stays_out_of_range() {
        // 负数不得映射到合法的周几编号（0是周一）
        assert_eq!(MappingHelpers::parse_weekdays("[-1]"), vec![u8::MAX]);
        assert_eq!(MappingHelpers::parse_weekdays("[-1,2]"), vec![u8::MAX, 2]);
        assert_eq!(MappingHelpers::parse_weekdays("[300]"), vec![u8::MAX]);
    }

    #[test]
    fn test_holiday_dates_roundtrip() {
        let dates = vec![
            "2025-01-01".parse().unwrap(),
            "2025-10-01".parse().unwrap(),
        ];
        let json = MappingHelpers::holiday_dates_to_json(&dates);
        assert_eq!(MappingHelpers::parse_holiday_dates(&json), dates);
    }

    #[test]
    fn test_parse_holiday_dates_skips_bad_entries() {
        let parsed = MappingHelpers::parse_holiday_dates(r#"["2025-01-01","不是日期"]"#);
        assert_eq!(parsed, vec!["2025-01-01".parse::<NaiveDate>().unwrap()]);
        assert!(MappingHelpers::parse_holiday_dates("oops").is_empty());
    }
}
