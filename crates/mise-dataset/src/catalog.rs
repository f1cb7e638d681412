//! Catalog file parsing: delimited text and spreadsheets.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use mise_core::ProductRecord;

use crate::DatasetError;

/// Header aliases under which the barcode column is recognised.
const BARCODE_ALIASES: [&str; 4] = ["cod de barra", "cod. de barra", "codigo de barra", "gtin"];

/// Reads every product record out of a catalog file, dispatching on the
/// extension (`.xlsx`/`.xls` are spreadsheets, everything else delimited
/// text).
///
/// A missing file reads as an empty catalog. Individually malformed rows
/// are skipped with a warning; they never fail the whole load.
///
/// # Errors
///
/// Returns [`DatasetError`] when an existing file cannot be read or parsed
/// at all.
pub fn read_catalog(path: &Path) -> Result<Vec<ProductRecord>, DatasetError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let is_spreadsheet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));

    if is_spreadsheet {
        read_spreadsheet(path)
    } else {
        read_delimited(path)
    }
}

fn read_delimited(path: &Path) -> Result<Vec<ProductRecord>, DatasetError> {
    let raw = std::fs::read_to_string(path)?;

    // Catalogs exported from Brazilian tooling use `;`; fall back to `,`.
    let delimiter = if raw.lines().next().is_some_and(|line| line.contains(';')) {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(path = %path.display(), line, error = %e, "skipping malformed row");
                continue;
            }
        };
        let fields: Vec<String> = row.iter().map(str::to_string).collect();
        if let Some(record) = record_from_row(&headers, &fields) {
            records.push(record);
        }
    }

    Ok(records)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<ProductRecord>, DatasetError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::EmptyWorkbook(path.display().to_string()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(cell_to_string).collect();
        if let Some(record) = record_from_row(&headers, &fields) {
            records.push(record);
        }
    }

    Ok(records)
}

/// Renders a spreadsheet cell the way the normalizer expects: whole floats
/// become plain integer strings instead of `7.8913e12`-style text.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// Builds a record from one parsed row, or `None` when the row is skipped:
/// empty first column, no recognisable barcode, or no product name.
fn record_from_row(headers: &[String], fields: &[String]) -> Option<ProductRecord> {
    if fields.first().map(|f| f.trim()).unwrap_or_default().is_empty() {
        return None;
    }

    let by_header: HashMap<&str, &str> = headers
        .iter()
        .zip(fields.iter())
        .map(|(h, f)| (h.as_str(), f.trim()))
        .collect();

    let get = |name: &str| -> Option<String> {
        by_header
            .get(name)
            .filter(|value| !value.is_empty())
            .map(|value| (*value).to_string())
    };

    let raw_code = BARCODE_ALIASES.iter().find_map(|alias| get(alias))?;
    let codigo = mise_core::normalize(&raw_code);
    if codigo.is_empty() {
        return None;
    }

    let nome = get("produto").or_else(|| get("nome"))?;

    Some(ProductRecord {
        codigo,
        nome,
        marca: get("marca"),
        categoria: get("categoria"),
        grupo: get("grupo"),
        subgrupo: get("subgrupo"),
        unidade: get("unidade"),
        peso_bruto: get("peso bruto"),
        peso_liquido: get("peso liquido"),
        preco_medio: get("preco medio"),
        unidade_medida: get("unidade medida"),
        fonte: Some("local".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create catalog file");
        file.write_all(contents.as_bytes()).expect("write catalog");
        path
    }

    #[test]
    fn missing_file_reads_as_empty_catalog() {
        let records = read_catalog(Path::new("/nonexistent/catalog.csv")).expect("read");
        assert!(records.is_empty());
    }

    #[test]
    fn semicolon_delimiter_is_detected_from_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(
            &dir,
            "catalog.csv",
            "Cod de Barra;Produto;Marca\n7891234567890;Arroz Tipo 1;Tio Jorge\n",
        );

        let records = read_catalog(&path).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].codigo, "7891234567890");
        assert_eq!(records[0].nome, "Arroz Tipo 1");
        assert_eq!(records[0].marca.as_deref(), Some("Tio Jorge"));
    }

    #[test]
    fn comma_delimiter_is_the_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(
            &dir,
            "catalog.csv",
            "gtin,produto\n7891234567890,Feijao Preto\n",
        );

        let records = read_catalog(&path).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nome, "Feijao Preto");
    }

    #[test]
    fn rows_with_empty_first_column_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(
            &dir,
            "catalog.csv",
            "cod de barra;produto\n;Fantasma\n7891234567890;Arroz\n",
        );

        let records = read_catalog(&path).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nome, "Arroz");
    }

    #[test]
    fn scientific_notation_codes_are_normalized_at_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(
            &dir,
            "catalog.csv",
            "codigo de barra;produto\n7.8913E+12;Sabonete\n",
        );

        let records = read_catalog(&path).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].codigo, "7891300000000");
    }

    #[test]
    fn header_aliases_are_recognised() {
        let dir = tempfile::tempdir().expect("tempdir");
        for header in ["cod de barra", "cod. de barra", "codigo de barra", "gtin"] {
            let path = write_catalog(
                &dir,
                "catalog.csv",
                &format!("{header};produto\n7891234567890;Arroz\n"),
            );
            let records = read_catalog(&path).expect("read");
            assert_eq!(records.len(), 1, "alias {header:?} not recognised");
        }
    }

    #[test]
    fn rows_without_a_barcode_column_are_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(&dir, "catalog.csv", "sku;produto\nX1;Arroz\n");
        let records = read_catalog(&path).expect("read");
        assert!(records.is_empty());
    }

    #[test]
    fn headers_are_case_insensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_catalog(
            &dir,
            "catalog.csv",
            "COD DE BARRA;PRODUTO;PRECO MEDIO\n7891234567890;Arroz;12,50\n",
        );

        let records = read_catalog(&path).expect("read");
        assert_eq!(records[0].preco_medio.as_deref(), Some("12,50"));
    }

    #[test]
    fn whole_float_cells_render_as_integer_strings() {
        assert_eq!(cell_to_string(&Data::Float(7_891_300_000_000.0)), "7891300000000");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
