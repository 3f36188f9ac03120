//! Projection of result records onto the fixed export columns

use crate::types::{ResultRecord, ResultTable, PROJECTED_COLUMNS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One exported row; field order matches [`PROJECTED_COLUMNS`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub keyword: String,
    pub position: String,
    pub page: String,
    pub domain: String,
    pub link: String,
    pub title: String,
    pub description: String,
}

impl ProjectedRow {
    /// Cells in column order
    pub fn cells(&self) -> [&str; 7] {
        [
            self.keyword.as_str(),
            self.position.as_str(),
            self.page.as_str(),
            self.domain.as_str(),
            self.link.as_str(),
            self.title.as_str(),
            self.description.as_str(),
        ]
    }

    fn from_record(record: &ResultRecord) -> Self {
        Self {
            keyword: cell(record, "keyword"),
            position: cell(record, "position"),
            page: cell(record, "page"),
            domain: cell(record, "domain"),
            link: cell(record, "link"),
            title: cell(record, "title"),
            description: cell(record, "description"),
        }
    }
}

/// Rows ready for display and CSV export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedTable {
    rows: Vec<ProjectedRow>,
}

impl ProjectedTable {
    pub fn from_rows(rows: Vec<ProjectedRow>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> [&'static str; 7] {
        PROJECTED_COLUMNS
    }

    pub fn rows(&self) -> &[ProjectedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keep the seven export columns of every record, one row per record
///
/// Absent or `null` fields become empty cells rather than failing the row.
pub fn project(table: &ResultTable) -> ProjectedTable {
    let rows = table.iter().map(ProjectedRow::from_record).collect();
    ProjectedTable { rows }
}

fn cell(record: &ResultRecord, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => {
            log::debug!("Result record has no '{field}' field; leaving cell empty");
            String::new()
        }
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Keyword;
    use serde_json::json;

    fn tagged(keyword: &str, value: Value) -> ResultRecord {
        let mut record = ResultRecord::from_value(value).unwrap();
        record.set_keyword(&Keyword::new(keyword).unwrap());
        record
    }

    #[test]
    fn test_selects_columns_in_order() {
        let table: ResultTable = vec![tagged(
            "plumber houston",
            json!({
                "description": "D1",
                "title": "T1",
                "link": "http://example.com",
                "domain": "example.com",
                "page": 1,
                "position": 1,
                "sitelinks": [{"title": "extra"}]
            }),
        )]
        .into_iter()
        .collect();

        let projected = project(&table);

        assert_eq!(projected.len(), 1);
        assert_eq!(
            projected.rows()[0].cells(),
            [
                "plumber houston",
                "1",
                "1",
                "example.com",
                "http://example.com",
                "T1",
                "D1"
            ]
        );
        assert_eq!(projected.header(), PROJECTED_COLUMNS);
    }

    #[test]
    fn test_missing_fields_become_empty_cells() {
        let table: ResultTable = vec![tagged(
            "roofer",
            json!({"position": 3, "title": null, "link": "https://a.example"}),
        )]
        .into_iter()
        .collect();

        let projected = project(&table);
        let row = &projected.rows()[0];

        assert_eq!(row.keyword, "roofer");
        assert_eq!(row.position, "3");
        assert_eq!(row.page, "");
        assert_eq!(row.title, "");
        assert_eq!(row.link, "https://a.example");
    }

    #[test]
    fn test_row_count_preserved() {
        let table: ResultTable = (0..5)
            .map(|i| tagged("k", json!({"position": i})))
            .chain(std::iter::once(tagged("k", json!({}))))
            .collect();

        assert_eq!(project(&table).len(), table.len());
    }

    #[test]
    fn test_empty_table() {
        let projected = project(&ResultTable::new());
        assert!(projected.is_empty());
    }

    #[test]
    fn test_non_string_values_rendered_as_json() {
        let table: ResultTable = vec![tagged(
            "k",
            json!({"position": 1.5, "page": true, "description": {"a": 1}}),
        )]
        .into_iter()
        .collect();

        let projected = project(&table);
        let row = &projected.rows()[0];
        assert_eq!(row.position, "1.5");
        assert_eq!(row.page, "true");
        assert_eq!(row.description, r#"{"a":1}"#);
    }
}
