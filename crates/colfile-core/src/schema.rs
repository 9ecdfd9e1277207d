// Table schemas and their Arrow representation
//
// A `Schema` is an ordered list of uniquely named fields. Every row group
// written to one file carries the same schema.

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef, TimeUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TableError};
use crate::value::ColumnType;

/// One column declaration: name, type and nullability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }

    /// Shorthand for a nullable field
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, true)
    }

    /// Shorthand for a non-nullable field
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Arrow type this column is stored as
    pub fn arrow_type(&self) -> DataType {
        arrow_type_for(self.column_type)
    }

    fn to_arrow(&self) -> ArrowField {
        ArrowField::new(self.name.as_str(), self.arrow_type(), self.nullable)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.column_type)?;
        if !self.nullable {
            f.write_str(" not null")?;
        }
        Ok(())
    }
}

/// Ordered, non-empty list of uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Build a schema, rejecting empty field lists and duplicate names
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(TableError::NoColumns);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(TableError::DuplicateColumn(field.name().to_string()));
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a constructed schema
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// Describe the first difference between `self` (expected) and `other`.
    ///
    /// Returns `None` when the schemas are identical in column order, names,
    /// types and nullability.
    pub fn difference(&self, other: &Schema) -> Option<String> {
        if self.fields.len() != other.fields.len() {
            return Some(format!(
                "expected {} columns, found {}",
                self.fields.len(),
                other.fields.len()
            ));
        }

        self.fields
            .iter()
            .zip(&other.fields)
            .enumerate()
            .find(|(_, (expected, actual))| expected != actual)
            .map(|(idx, (expected, actual))| {
                format!("column {}: expected '{}', found '{}'", idx, expected, actual)
            })
    }

    /// Fail with `SchemaMismatch` unless `other` equals `self`
    pub fn ensure_matches(&self, other: &Schema) -> Result<()> {
        match self.difference(other) {
            Some(detail) => Err(TableError::SchemaMismatch(detail)),
            None => Ok(()),
        }
    }

    pub fn to_arrow(&self) -> ArrowSchema {
        ArrowSchema::new(
            self.fields
                .iter()
                .map(Field::to_arrow)
                .collect::<Vec<_>>(),
        )
    }

    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::new(self.to_arrow())
    }

    /// Map an Arrow schema onto column types.
    ///
    /// Narrower integer and float widths, large strings and timestamps of any
    /// unit widen to the canonical type; everything else is unsupported.
    pub fn try_from_arrow(schema: &ArrowSchema) -> Result<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|field| {
                let column_type = column_type_for(field.data_type()).ok_or_else(|| {
                    TableError::UnsupportedType {
                        column: field.name().clone(),
                        data_type: field.data_type().to_string(),
                    }
                })?;
                Ok(Field::new(
                    field.name().as_str(),
                    column_type,
                    field.is_nullable(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Schema::new(fields)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Field>> for Schema {
    type Error = TableError;

    fn try_from(fields: Vec<Field>) -> Result<Self> {
        Schema::new(fields)
    }
}

impl From<Schema> for Vec<Field> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

pub(crate) fn arrow_type_for(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Utf8 => DataType::Utf8,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        ColumnType::Date => DataType::Date32,
    }
}

fn column_type_for(data_type: &DataType) -> Option<ColumnType> {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => Some(ColumnType::Int64),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Some(ColumnType::Float64),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(ColumnType::Utf8),
        DataType::Boolean => Some(ColumnType::Boolean),
        DataType::Timestamp(_, _) => Some(ColumnType::Timestamp),
        DataType::Date32 | DataType::Date64 => Some(ColumnType::Date),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Field::nullable("one", ColumnType::Int64),
            Field::nullable("three", ColumnType::Utf8),
            Field::required("four", ColumnType::Timestamp),
        ])
        .unwrap()
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = Schema::new(vec![
            Field::nullable("one", ColumnType::Int64),
            Field::nullable("one", ColumnType::Utf8),
        ]);
        assert!(matches!(result, Err(TableError::DuplicateColumn(name)) if name == "one"));
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert!(matches!(Schema::new(vec![]), Err(TableError::NoColumns)));
    }

    #[test]
    fn test_difference_reports_first_mismatch() {
        let expected = sample_schema();
        let actual = Schema::new(vec![
            Field::nullable("one", ColumnType::Int64),
            Field::nullable("three", ColumnType::Int64),
            Field::required("four", ColumnType::Timestamp),
        ])
        .unwrap();

        let detail = expected.difference(&actual).unwrap();
        assert!(detail.contains("column 1"));
        assert!(expected.difference(&expected.clone()).is_none());
    }

    #[test]
    fn test_difference_detects_nullability() {
        let expected = sample_schema();
        let mut fields = expected.fields().to_vec();
        fields[2] = Field::nullable("four", ColumnType::Timestamp);
        let actual = Schema::new(fields).unwrap();

        assert!(matches!(
            expected.ensure_matches(&actual),
            Err(TableError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_arrow_round_trip() {
        let schema = sample_schema();
        let arrow = schema.to_arrow();

        assert_eq!(arrow.field(0).data_type(), &DataType::Int64);
        assert_eq!(
            arrow.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, None)
        );
        assert!(!arrow.field(2).is_nullable());
        assert_eq!(Schema::try_from_arrow(&arrow).unwrap(), schema);
    }

    #[test]
    fn test_try_from_arrow_widens_and_rejects() {
        let arrow = ArrowSchema::new(vec![
            ArrowField::new("small", DataType::Int32, true),
            ArrowField::new(
                "ns",
                DataType::Timestamp(TimeUnit::Nanosecond, None),
                true,
            ),
        ]);
        let schema = Schema::try_from_arrow(&arrow).unwrap();
        assert_eq!(schema.fields()[0].column_type(), ColumnType::Int64);
        assert_eq!(schema.fields()[1].column_type(), ColumnType::Timestamp);

        let unsupported = ArrowSchema::new(vec![ArrowField::new("bin", DataType::Binary, true)]);
        assert!(matches!(
            Schema::try_from_arrow(&unsupported),
            Err(TableError::UnsupportedType { column, .. }) if column == "bin"
        ));
    }

    #[test]
    fn test_schema_serde() {
        let schema = sample_schema();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"type\":\"timestamp\""));

        let parsed: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);

        assert!(serde_json::from_str::<Schema>("[]").is_err());
    }
}
