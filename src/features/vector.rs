use super::ReferenceSchema;
use std::collections::HashMap;

/// A single-row table: ordered column names with one numeric value each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, or overwrites the value if the column already exists.
    pub fn push(&mut self, column: impl Into<String>, value: f64) {
        let column = column.into();
        match self.columns.iter().position(|c| *c == column) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Reshapes the row onto the reference columns: same names, same order,
    /// 0 for columns the row lacks, unknown columns dropped.
    pub fn align_to(&self, schema: &ReferenceSchema) -> FeatureVector {
        let lookup: HashMap<&str, f64> = self.iter().collect();

        let values = schema
            .columns()
            .iter()
            .map(|column| lookup.get(column.as_str()).copied().unwrap_or(0.0))
            .collect();

        FeatureVector {
            columns: schema.columns().to_vec(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema(columns: &[&str]) -> ReferenceSchema {
        ReferenceSchema::from_columns(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_push_overwrites_existing_column() {
        let mut row = FeatureVector::new();
        row.push("area", 100.0);
        row.push("area", 200.0);

        assert_eq!(row.len(), 1);
        assert_eq!(row.get("area"), Some(200.0));
    }

    #[test]
    fn test_align_fills_missing_and_drops_extra() {
        let mut row = FeatureVector::new();
        row.push("bedrooms", 3.0);
        row.push("area", 1200.0);
        row.push("furnishingstatus_furnished", 1.0);

        let aligned = row.align_to(&schema(&[
            "area",
            "bedrooms",
            "furnishingstatus_semi-furnished",
            "furnishingstatus_unfurnished",
        ]));

        assert_eq!(
            aligned.columns(),
            &[
                "area",
                "bedrooms",
                "furnishingstatus_semi-furnished",
                "furnishingstatus_unfurnished",
            ]
        );
        assert_eq!(aligned.values(), &[1200.0, 3.0, 0.0, 0.0]);
        assert_eq!(aligned.get("furnishingstatus_furnished"), None);
    }

    #[test]
    fn test_align_is_idempotent() {
        let mut row = FeatureVector::new();
        row.push("stories", 2.0);
        row.push("extra", 9.0);
        let reference = schema(&["area", "stories"]);

        let once = row.align_to(&reference);
        let twice = once.align_to(&reference);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_align_to_empty_schema() {
        let mut row = FeatureVector::new();
        row.push("area", 1.0);

        let aligned = row.align_to(&schema(&[]));
        assert!(aligned.is_empty());
    }
}
