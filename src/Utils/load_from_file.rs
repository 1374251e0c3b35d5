use crate::error::{AmmoniaError, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads one numeric column (selected by header name) from CSV data.
/// Every cell of the column must hold a finite, non-negative number; the first bad cell
/// is reported with its 1-based data row.
pub fn load_column_from_reader<R: Read>(reader: R, column: &str) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AmmoniaError::InvalidDataset(format!("cannot read CSV header: {}", e)))?
        .clone();

    let col_idx = headers.iter().position(|h| h == column).ok_or_else(|| {
        AmmoniaError::InvalidDataset(format!(
            "column '{}' not found, available columns: {}",
            column,
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })?;

    let mut values = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AmmoniaError::InvalidDataset(format!("cannot parse CSV row {}: {}", row + 1, e))
        })?;
        let field = record.get(col_idx).unwrap_or("");
        if field.is_empty() {
            return Err(AmmoniaError::InvalidDataset(format!(
                "missing '{}' value in row {}",
                column,
                row + 1
            )));
        }
        let value = field.parse::<f64>().map_err(|_| {
            AmmoniaError::InvalidDataset(format!(
                "'{}' in row {} is not a number: '{}'",
                column,
                row + 1,
                field
            ))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(AmmoniaError::InvalidDataset(format!(
                "'{}' in row {} must be a finite non-negative number, got {}",
                column,
                row + 1,
                value
            )));
        }
        values.push(value);
    }

    if values.is_empty() {
        warn!("Column '{}' contains no records", column);
    }
    Ok(values)
}

/// Opens a CSV file and reads the given column, see [`load_column_from_reader`]
pub fn load_column_from_file(file_name: &Path, column: &str) -> Result<Vec<f64>> {
    if !file_name.exists() {
        return Err(AmmoniaError::InvalidDataset(format!(
            "file '{}' does not exist",
            file_name.display()
        )));
    }
    let file = File::open(file_name).map_err(|e| {
        AmmoniaError::InvalidDataset(format!(
            "failed to open file '{}': {}",
            file_name.display(),
            e
        ))
    })?;
    let values = load_column_from_reader(BufReader::new(file), column)?;
    info!(
        "Successfully read {} '{}' values from file '{}'",
        values.len(),
        column,
        file_name.display()
    );
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_column_by_name() {
        let data = "Date,Ammonia,Temperature\n2024-01-01,1.5,20\n2024-01-02,2.25,21\n2024-01-03,0,19\n";
        let values = load_column_from_reader(data.as_bytes(), "Ammonia").unwrap();
        assert_eq!(values, vec![1.5, 2.25, 0.0]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let data = "Time , Ammonia\n0, 3.5 \n1,  4\n";
        let values = load_column_from_reader(data.as_bytes(), "Ammonia").unwrap();
        assert_eq!(values, vec![3.5, 4.0]);
    }

    #[test]
    fn test_missing_column() {
        let data = "Date,NH4\n2024-01-01,1.5\n";
        let err = load_column_from_reader(data.as_bytes(), "Ammonia").unwrap_err();
        match err {
            AmmoniaError::InvalidDataset(msg) => {
                assert!(msg.contains("'Ammonia' not found"));
                assert!(msg.contains("NH4"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_values() {
        let not_a_number = "Ammonia\n1.0\nabc\n";
        assert!(matches!(
            load_column_from_reader(not_a_number.as_bytes(), "Ammonia"),
            Err(AmmoniaError::InvalidDataset(msg)) if msg.contains("row 2")
        ));
        let empty = "Date,Ammonia\nx,1.0\ny,\n";
        assert!(load_column_from_reader(empty.as_bytes(), "Ammonia").is_err());
        let negative = "Ammonia\n-1.0\n";
        assert!(load_column_from_reader(negative.as_bytes(), "Ammonia").is_err());
        let nan = "Ammonia\nNaN\n";
        assert!(load_column_from_reader(nan.as_bytes(), "Ammonia").is_err());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let data = "Date,Ammonia\nx,1.0\ny\n";
        assert!(matches!(
            load_column_from_reader(data.as_bytes(), "Ammonia"),
            Err(AmmoniaError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Ammonia").unwrap();
        writeln!(file, "0.5").unwrap();
        writeln!(file, "0.75").unwrap();
        let values = load_column_from_file(file.path(), "Ammonia").unwrap();
        assert_eq!(values, vec![0.5, 0.75]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_column_from_file(Path::new("no_such_file_123.csv"), "Ammonia");
        assert!(matches!(result, Err(AmmoniaError::InvalidDataset(_))));
    }
}
