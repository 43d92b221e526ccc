//! Boundary loader: delimited text files into [`Dataset`] with encoding and
//! delimiter auto-detection.
//!
//! The comparison engine itself never touches the filesystem; this module is
//! the external loading boundary. Format routing is by file extension:
//! delimited text is parsed here, spreadsheet formats are rejected with an
//! actionable error (export the sheet as CSV first).

use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::Dataset;

/// Extensions handled as delimited text.
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Spreadsheet extensions the loader knowingly refuses.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "windows-1256" | "cp1256" => "windows-1256".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the detected encoding.
///
/// Unknown encodings fall back to lossy UTF-8, so decoding is total.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        "windows-1256" | "cp1256" => encoding_rs::WINDOWS_1256.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load a dataset from a file, routing by extension.
pub fn load_file<P: AsRef<Path>>(path: P) -> LoadResult<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        return Err(LoadError::UnsupportedFormat { extension });
    }
    if !extension.is_empty() && !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(LoadError::UnsupportedFormat { extension });
    }

    let bytes = std::fs::read(path)?;
    load_bytes(&bytes)
}

/// Load a dataset from raw bytes with encoding and delimiter auto-detection.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<Dataset> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_delimited(&content, delimiter, encoding)
}

/// Parse delimited text into a dataset with an explicit delimiter.
pub fn parse_delimited(content: &str, delimiter: char, encoding: String) -> LoadResult<Dataset> {
    // A leading BOM would otherwise glue itself onto the first header.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(LoadError::Empty)?;
    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::NoHeaders);
    }

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(delimiter).collect();
        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let raw_value = values
                .get(i)
                .map(|s| s.trim().trim_matches('"'))
                .unwrap_or("");
            obj.insert(header.clone(), json!(raw_value));
        }
        rows.push(Value::Object(obj));
    }

    Ok(Dataset {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_csv() {
        let ds = load_bytes("name,age\nAlice,30\nBob,25".as_bytes()).unwrap();
        assert_eq!(ds.headers, vec!["name", "age"]);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[0]["name"], "Alice");
        assert_eq!(ds.rows[1]["age"], "25");
    }

    #[test]
    fn test_detect_delimiter_variants() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
    }

    #[test]
    fn test_empty_input() {
        let err = load_bytes(b"").unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_missing_trailing_values_become_empty() {
        let ds = load_bytes("a,b,c\n1,,3\n4".as_bytes()).unwrap();
        assert_eq!(ds.rows[0]["b"], "");
        assert_eq!(ds.rows[1]["b"], "");
        assert_eq!(ds.rows[1]["c"], "");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let ds = load_bytes("a,b\n1,2\n\n3,4\n".as_bytes()).unwrap();
        assert_eq!(ds.rows.len(), 2);
    }

    #[test]
    fn test_bom_stripped_from_first_header() {
        let ds = load_bytes("\u{feff}name,age\nAlice,30".as_bytes()).unwrap();
        assert_eq!(ds.headers[0], "name");
    }

    #[test]
    fn test_arabic_utf8_roundtrip() {
        let ds = load_bytes("اسم الموظف,القسم\nأحمد,المالية".as_bytes()).unwrap();
        assert_eq!(ds.headers[0], "اسم الموظف");
        assert_eq!(ds.rows[0]["القسم"], "المالية");
    }

    #[test]
    fn test_spreadsheet_extension_rejected() {
        let err = load_file("staff.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref extension } if extension == "xlsx"));
    }

    #[test]
    fn test_load_file_roundtrip() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all("name,dept\nAlice,HR".as_bytes()).unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.rows.len(), 1);
        assert_eq!(ds.rows[0]["dept"], "HR");
        assert_eq!(ds.delimiter, ',');
    }
}
