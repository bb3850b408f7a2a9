use std::fmt;

use serde::Serialize;

use crate::models::breach::{BreachRecord, EmailCheckResponse};

pub const MAX_ROWS: usize = 20;
pub const MAX_DATA_CLASSES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreachRow {
    pub breach: String,
    pub date: String,
    pub domain: String,
    pub data_classes: String,
    pub verified: &'static str,
}

impl BreachRow {
    fn from_record(record: &BreachRecord) -> Self {
        let breach = if record.title.is_empty() {
            record.name.clone()
        } else {
            record.title.clone()
        };
        let domain = match record.domain.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => "—".to_string(),
        };
        let data_classes = if record.data_classes.is_empty() {
            "n/a".to_string()
        } else {
            record
                .data_classes
                .iter()
                .take(MAX_DATA_CLASSES)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            breach,
            date: record.breach_date.clone(),
            domain,
            data_classes,
            verified: if record.is_verified { "Verified" } else { "Unverified" },
        }
    }
}

/// Rendered form of a breach-check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreachTable {
    pub headline: String,
    pub rows: Vec<BreachRow>,
    /// "Showing N of M." when the reported count exceeds the rows shown.
    pub disclosure: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_error: Option<String>,
}

impl BreachTable {
    pub fn from_response(resp: &EmailCheckResponse) -> Self {
        let rows: Vec<BreachRow> = resp
            .breaches
            .iter()
            .take(MAX_ROWS)
            .map(BreachRow::from_record)
            .collect();

        let disclosure = (!rows.is_empty() && resp.count > rows.len() as u64)
            .then(|| format!("Showing {} of {}.", rows.len(), resp.count));

        Self {
            headline: resp.headline(),
            rows,
            disclosure,
            ai_summary: resp.ai_summary.clone().filter(|s| !s.trim().is_empty()),
            ai_error: resp.ai_error.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

const HEADERS: [&str; 5] = ["Breach", "Date", "Domain", "Data classes", "Verified"];

impl fmt::Display for BreachTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline)?;

        if !self.rows.is_empty() {
            let cells: Vec<[&str; 5]> = self
                .rows
                .iter()
                .map(|r| [r.breach.as_str(), r.date.as_str(), r.domain.as_str(), r.data_classes.as_str(), r.verified])
                .collect();

            let mut widths = HEADERS.map(|h| h.chars().count());
            for row in &cells {
                for (w, cell) in widths.iter_mut().zip(row.iter()) {
                    *w = (*w).max(cell.chars().count());
                }
            }

            let write_line = |f: &mut fmt::Formatter<'_>, row: &[&str; 5]| -> fmt::Result {
                let line: Vec<String> = row
                    .iter()
                    .zip(widths.iter())
                    .map(|(cell, w)| format!("{cell:<w$}", w = *w))
                    .collect();
                writeln!(f, "{}", line.join(" | ").trim_end())
            };

            write_line(f, &HEADERS)?;
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            writeln!(f, "{}", rule.join("-+-"))?;
            for row in &cells {
                write_line(f, row)?;
            }
            if let Some(disclosure) = &self.disclosure {
                writeln!(f, "{disclosure}")?;
            }
        }

        if let Some(summary) = &self.ai_summary {
            writeln!(f, "\nSummary\n{summary}")?;
        }
        if let Some(err) = &self.ai_error {
            writeln!(f, "\nSummary unavailable: {err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> BreachRecord {
        BreachRecord {
            name: format!("Breach{n}"),
            title: format!("Breach {n}"),
            domain: Some(format!("b{n}.com")),
            breach_date: "2021-06-01".into(),
            data_classes: vec!["Emails".into(), "Passwords".into()],
            is_verified: n % 2 == 0,
            ..Default::default()
        }
    }

    fn response(count: u64, breaches: usize) -> EmailCheckResponse {
        EmailCheckResponse {
            email: "me@example.com".into(),
            count,
            breaches: (0..breaches).map(record).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_breaches() {
        let table = BreachTable::from_response(&response(0, 0));
        assert_eq!(table.headline, "No breaches found for me@example.com.");
        assert!(table.rows.is_empty());
        assert!(table.disclosure.is_none());
        assert_eq!(table.to_string(), "No breaches found for me@example.com.\n");
    }

    #[test]
    fn test_three_breaches_without_disclosure() {
        let table = BreachTable::from_response(&response(3, 3));
        assert_eq!(table.headline, "3 breach(es) found for me@example.com.");
        assert_eq!(table.rows.len(), 3);
        assert!(table.disclosure.is_none());
        assert!(!table.to_string().contains("Showing"));
    }

    #[test]
    fn test_rows_capped_with_disclosure() {
        let table = BreachTable::from_response(&response(25, 25));
        assert_eq!(table.rows.len(), MAX_ROWS);
        assert_eq!(table.disclosure.as_deref(), Some("Showing 20 of 25."));
        assert!(table.to_string().contains("Showing 20 of 25."));
    }

    #[test]
    fn test_disclosure_when_count_exceeds_returned_rows() {
        let table = BreachTable::from_response(&response(12, 5));
        assert_eq!(table.disclosure.as_deref(), Some("Showing 5 of 12."));
    }

    #[test]
    fn test_row_fallbacks() {
        let bare = BreachRecord {
            name: "Legacy".into(),
            domain: Some(String::new()),
            ..Default::default()
        };
        let row = BreachRow::from_record(&bare);
        assert_eq!(row.breach, "Legacy");
        assert_eq!(row.domain, "—");
        assert_eq!(row.data_classes, "n/a");
        assert_eq!(row.verified, "Unverified");

        let wide = BreachRecord {
            title: "Wide".into(),
            data_classes: (1..=6).map(|i| format!("c{i}")).collect(),
            is_verified: true,
            ..Default::default()
        };
        let row = BreachRow::from_record(&wide);
        assert_eq!(row.data_classes, "c1, c2, c3, c4");
        assert_eq!(row.verified, "Verified");
    }

    #[test]
    fn test_ai_sections() {
        let mut resp = response(1, 1);
        resp.ai_summary = Some("Rotate passwords.".into());
        resp.ai_error = Some("model offline".into());
        let text = BreachTable::from_response(&resp).to_string();
        assert!(text.contains("Summary\nRotate passwords."));
        assert!(text.contains("Summary unavailable: model offline"));
    }
}
