//! # Two-Dimensional Presentation Tables
//!
//! Every output of this crate is a `TwoDimTable`: a titled grid with one row
//! header per row and a typed, formatted column schema.
//!
//! Column schemas are assembled with a `TableSchemaBuilder`, which only
//! appends `(name, type, format)` triples. Calling `freeze` turns it into an
//! immutable `TableSchema`, and only then can a table be allocated. Column
//! indices therefore never shift while rows are being filled.

use itertools::Itertools;
use ndarray::Array2;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;

/// Value-type tag of a column, serialized as `double`, `int` or `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "string")]
    Str,
}

impl ColumnType {
    pub fn tag(self) -> &'static str {
        match self {
            ColumnType::Double => "double",
            ColumnType::Int => "int",
            ColumnType::Str => "string",
        }
    }
}

/// Name, type tag and printf-style display format of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub format: String,
}

/// Append-only accumulator for a column schema.
#[derive(Debug, Default)]
pub struct TableSchemaBuilder {
    columns: Vec<ColumnSpec>,
}

impl TableSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        format: &str,
    ) -> &mut Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            column_type,
            format: format.to_string(),
        });
        self
    }

    /// Number of columns accumulated so far.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn freeze(self) -> TableSchema {
        TableSchema {
            columns: self.columns,
        }
    }
}

/// A frozen column schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// A schema whose columns all share one type and format.
    pub fn uniform<I, S>(names: I, column_type: ColumnType, format: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = TableSchemaBuilder::new();
        for name in names {
            builder.push(name, column_type, format);
        }
        builder.freeze()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// One table cell. Unset cells stay `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Double(f64),
    Int(i64),
    Str(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Double(v) => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Cell::Empty, _)
                | (Cell::Double(_), ColumnType::Double)
                | (Cell::Int(_), ColumnType::Int)
                | (Cell::Str(_), ColumnType::Str)
        )
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Double(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Str(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Str(value.to_string())
    }
}

/// A titled table with named rows and a frozen column schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoDimTable {
    name: String,
    description: String,
    row_header_label: String,
    row_headers: Vec<String>,
    columns: TableSchema,
    #[serde(serialize_with = "serialize_rows")]
    cells: Array2<Cell>,
}

fn serialize_rows<S: Serializer>(cells: &Array2<Cell>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(cells.rows().into_iter().map(|row| row.to_vec()))
}

impl TwoDimTable {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        row_headers: Vec<String>,
        schema: TableSchema,
        row_header_label: impl Into<String>,
    ) -> Self {
        let cells = Array2::from_elem((row_headers.len(), schema.column_count()), Cell::Empty);
        Self {
            name: name.into(),
            description: description.into(),
            row_header_label: row_header_label.into(),
            row_headers,
            columns: schema,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn row_header_label(&self) -> &str {
        &self.row_header_label
    }

    pub fn row_headers(&self) -> &[String] {
        &self.row_headers
    }

    pub fn schema(&self) -> &TableSchema {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.cells.nrows()
    }

    pub fn column_count(&self) -> usize {
        self.cells.ncols()
    }

    /// Writes one cell. Out-of-range indices and values that do not match the
    /// column type are internal defects and panic.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<Cell>) {
        assert!(
            row < self.row_count() && col < self.column_count(),
            "cell ({row}, {col}) outside {}x{} table '{}'",
            self.row_count(),
            self.column_count(),
            self.name
        );
        let value = value.into();
        let spec = &self.columns.columns[col];
        assert!(
            value.fits(spec.column_type),
            "column '{}' of table '{}' holds {} values, got {:?}",
            spec.name,
            self.name,
            spec.column_type.tag(),
            value
        );
        self.cells[[row, col]] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        &self.cells[[row, col]]
    }

    /// Numeric value at `(row, column name)`, if the column exists and the cell is numeric.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.columns.position(column)?;
        self.cells.get((row, col)).and_then(Cell::as_f64)
    }

    /// A copy of this table under a new title with every column renamed.
    /// Cell values are shared verbatim.
    pub fn relabeled<I, S>(&self, name: impl Into<String>, column_names: I) -> TwoDimTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column_names: Vec<String> = column_names.into_iter().map(Into::into).collect();
        assert_eq!(
            column_names.len(),
            self.column_count(),
            "relabeling table '{}' needs one name per column",
            self.name
        );
        let mut builder = TableSchemaBuilder::new();
        for (spec, label) in self.columns.columns.iter().zip(column_names) {
            builder.push(label, spec.column_type, &spec.format);
        }
        TwoDimTable {
            name: name.into(),
            description: self.description.clone(),
            row_header_label: self.row_header_label.clone(),
            row_headers: self.row_headers.clone(),
            columns: builder.freeze(),
            cells: self.cells.clone(),
        }
    }

    /// Writes the table as tab-separated values with a header line.
    /// Doubles are written with the shortest representation that round-trips.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        let header = std::iter::once(self.row_header_label.as_str()).chain(self.columns.names());
        out.write_record(header)?;

        let mut float_buffer = ryu::Buffer::new();
        for (row_header, row) in self.row_headers.iter().zip(self.cells.rows()) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(row_header.clone());
            for cell in row.iter() {
                record.push(match cell {
                    Cell::Empty => String::new(),
                    Cell::Double(v) => float_buffer.format(*v).to_string(),
                    Cell::Int(v) => v.to_string(),
                    Cell::Str(s) => s.clone(),
                });
            }
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl fmt::Display for TwoDimTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            writeln!(f, "{}:", self.name)?;
        } else {
            writeln!(f, "{}: {}", self.name, self.description)?;
        }

        let rendered: Vec<Vec<String>> = self
            .cells
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(self.columns.columns.iter())
                    .map(|(cell, spec)| FormatSpec::parse(&spec.format).render(cell))
                    .collect()
            })
            .collect();

        let header_width = self
            .row_headers
            .iter()
            .map(String::len)
            .chain(std::iter::once(self.row_header_label.len()))
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .columns
            .iter()
            .enumerate()
            .map(|(col, spec)| {
                rendered
                    .iter()
                    .map(|row| row[col].len())
                    .chain(std::iter::once(spec.name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header_line = self
            .columns
            .names()
            .zip(&widths)
            .map(|(name, width)| format!("{name:>width$}"))
            .join("  ");
        writeln!(
            f,
            "{:<header_width$}  {}",
            self.row_header_label, header_line
        )?;

        for (row_header, row) in self.row_headers.iter().zip(&rendered) {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(text, width)| format!("{text:>width$}"))
                .join("  ");
            writeln!(f, "{row_header:<header_width$}  {line}")?;
        }
        Ok(())
    }
}

/// A parsed printf-style format such as `%5f`, `%.5f`, `%d` or `%s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatSpec {
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl FormatSpec {
    /// Unparseable formats fall back to plain `%s`.
    fn parse(format: &str) -> Self {
        let fallback = FormatSpec {
            width: 0,
            precision: None,
            conversion: 's',
        };
        let Some(body) = format.strip_prefix('%') else {
            return fallback;
        };
        let Some(conversion) = body.chars().last() else {
            return fallback;
        };
        let flags = &body[..body.len() - conversion.len_utf8()];
        let (width, precision) = match flags.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (flags, None),
        };
        let width = if width.is_empty() {
            Some(0)
        } else {
            width.parse().ok()
        };
        let precision = match precision {
            Some(p) => match p.parse() {
                Ok(p) => Some(Some(p)),
                Err(_) => None,
            },
            None => Some(None),
        };
        match (width, precision) {
            (Some(width), Some(precision)) if matches!(conversion, 'f' | 'd' | 's') => FormatSpec {
                width,
                precision,
                conversion,
            },
            _ => fallback,
        }
    }

    fn render(&self, cell: &Cell) -> String {
        let width = self.width;
        let precision = self.precision.unwrap_or(6);
        match (cell, self.conversion) {
            (Cell::Empty, _) => String::new(),
            (Cell::Double(v), 'f') => format!("{v:>width$.precision$}"),
            (Cell::Double(v), 'd') if v.is_finite() => format!("{:>width$}", v.trunc() as i64),
            (Cell::Double(v), _) => format!("{v:>width$}"),
            (Cell::Int(v), 'f') => format!("{:>width$.precision$}", *v as f64),
            (Cell::Int(v), _) => format!("{v:>width$}"),
            (Cell::Str(s), _) => format!("{s:>width$}"),
        }
    }
}
