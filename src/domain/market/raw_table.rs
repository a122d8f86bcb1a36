/// One untyped input cell
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    /// Wraps CSV text; blank text becomes `Empty`
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<&str> for RawCell {
    fn from(text: &str) -> Self {
        RawCell::from_text(text)
    }
}

impl From<Option<f64>> for RawCell {
    fn from(value: Option<f64>) -> Self {
        value.map(RawCell::Number).unwrap_or(RawCell::Empty)
    }
}

/// Header row plus untyped data rows, as handed over by an input source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| clean_header(h.as_ref())).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<RawCell>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_cleaned() {
        let table = RawTable::new(&["\u{feff}Date", " Change % "]);
        assert_eq!(table.column_index("Date"), Some(0));
        assert_eq!(table.column_index("Change %"), Some(1));
        assert_eq!(table.column_index("Price"), None);
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert_eq!(RawCell::from_text("   "), RawCell::Empty);
        assert_eq!(RawCell::from_text(" 1.5% "), RawCell::Text("1.5%".into()));
        assert_eq!(RawCell::from(None), RawCell::Empty);
    }
}
