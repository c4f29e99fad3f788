use crate::error::{ExtractStage, ParseIssue, PipelineError};
use crate::model::{
    DocumentContent, ExcelContent, FileType, NormalizedDocument, Sheet, Table,
};
use crate::parser::ooxml::{self, attribute_value, local_name};
use crate::parser::{DocumentParser, checked_path, extension_matches, filename_of};
use crate::validate::extension_of;
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Parser for Excel workbooks via calamine.
///
/// Fully blank rows are dropped from extracted grids, not represented as
/// empty rows. Table extraction treats each worksheet as one table and
/// assumes the first non-empty row is the header row; that is a heuristic,
/// not a guarantee for headerless sheets.
#[derive(Debug)]
pub struct ExcelParser {
    path: PathBuf,
}

impl ExcelParser {
    pub const EXTENSIONS: &'static [&'static str] = &["xlsx", "xls"];

    /// Open an Excel file, checking existence and extension.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let path = checked_path(path, Self::EXTENSIONS)?;
        if extension_of(&path) == "xls" {
            log::warn!(
                "'{}': legacy .xls support is best-effort; convert to .xlsx for full fidelity",
                path.display()
            );
        }
        Ok(Self { path })
    }

    pub fn can_parse(path: &Path) -> bool {
        extension_matches(path, Self::EXTENSIONS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Sheets<BufReader<File>>, String> {
        open_workbook_auto(&self.path)
            .map_err(|error| format!("failed to open workbook '{}': {error}", self.path.display()))
    }

    /// Grids for all sheets in workbook order, with per-sheet soft failures.
    fn load_sheets(
        &self,
        workbook: &mut Sheets<BufReader<File>>,
        issues: &mut Vec<ParseIssue>,
    ) -> Vec<Sheet> {
        let merged = merged_ranges(&self.path);
        let names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::new();

        for name in names {
            match workbook.worksheet_range(&name) {
                Ok(range) => {
                    let merged_cells = merged.get(&name).cloned().unwrap_or_default();
                    sheets.push(sheet_from_range(&name, &range, merged_cells));
                }
                Err(error) => issues.push(ParseIssue::new(
                    ExtractStage::Content,
                    format!("failed to read sheet '{name}': {error}"),
                )),
            }
        }
        sheets
    }
}

impl DocumentParser for ExcelParser {
    fn parse(&self) -> NormalizedDocument {
        log::info!("parsing excel workbook: {}", self.path.display());
        let mut document = NormalizedDocument::new(
            filename_of(&self.path),
            FileType::Excel,
            DocumentContent::Excel(ExcelContent::default()),
        );

        let mut workbook = match self.load() {
            Ok(workbook) => workbook,
            Err(error) => {
                document
                    .errors
                    .push(ParseIssue::new(ExtractStage::Content, error));
                return document;
            }
        };

        let mut issues = Vec::new();
        let sheets = self.load_sheets(&mut workbook, &mut issues);
        document.errors.append(&mut issues);

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        document.metadata = workbook_metadata(&self.path, &sheet_names);
        document.tables = sheets
            .iter()
            .filter_map(|sheet| table_from_grid(&sheet.name, &sheet.data))
            .collect();
        document.content = DocumentContent::Excel(ExcelContent {
            sheet_count: sheet_names.len(),
            sheet_names,
            sheets,
        });
        document
    }

    fn extract_text(&self) -> Result<String, PipelineError> {
        let mut workbook = self.load().map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let sheets = self.load_sheets(&mut workbook, &mut issues);

        let mut parts = Vec::new();
        for sheet in &sheets {
            parts.push(format!("=== {} ===", sheet.name));
            for row in &sheet.data {
                let cells: Vec<&str> = row
                    .iter()
                    .filter_map(|cell| cell.as_deref())
                    .collect();
                if !cells.is_empty() {
                    parts.push(cells.join("\t"));
                }
            }
            parts.push(String::new());
        }
        Ok(parts.join("\n"))
    }

    fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError> {
        let workbook = self.load().map_err(PipelineError::parse_failed)?;
        let names = workbook.sheet_names().to_vec();
        Ok(workbook_metadata(&self.path, &names))
    }

    fn extract_tables(&self) -> Result<Vec<Table>, PipelineError> {
        let mut workbook = self.load().map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let sheets = self.load_sheets(&mut workbook, &mut issues);
        Ok(sheets
            .iter()
            .filter_map(|sheet| table_from_grid(&sheet.name, &sheet.data))
            .collect())
    }
}

/// Core properties (OOXML workbooks only) plus workbook statistics.
fn workbook_metadata(path: &Path, sheet_names: &[String]) -> BTreeMap<String, String> {
    let mut metadata = match ooxml::open_archive(path) {
        Ok(mut archive) => ooxml::core_properties(&mut archive).unwrap_or_default(),
        Err(_) => BTreeMap::new(),
    };
    metadata.insert("sheet_count".to_owned(), sheet_names.len().to_string());
    metadata.insert("sheet_names".to_owned(), sheet_names.join(", "));
    metadata
}

/// Build a sheet record from a used range, dropping fully blank rows.
fn sheet_from_range(name: &str, range: &Range<Data>, merged_cells: Vec<String>) -> Sheet {
    let mut data = Vec::new();
    for row in range.rows() {
        let cells: Vec<Option<String>> = row.iter().map(cell_to_string).collect();
        if cells.iter().any(Option::is_some) {
            data.push(cells);
        }
    }

    Sheet {
        name: name.to_owned(),
        dimensions: dimensions_of(range),
        max_row: range.height(),
        max_column: range.width(),
        data,
        merged_cells,
    }
}

/// One table per sheet: first non-empty row becomes the header row, the
/// rest become data. Empty grids produce no table.
fn table_from_grid(name: &str, grid: &[Vec<Option<String>>]) -> Option<Table> {
    let (first, rest) = grid.split_first()?;
    let headers: Vec<String> = first
        .iter()
        .map(|cell| cell.clone().unwrap_or_default())
        .collect();
    let data: Vec<Vec<String>> = rest
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect()
        })
        .collect();
    Some(Table::from_rows(Some(name.to_owned()), headers, data))
}

/// Stringify one cell. Temporal values normalize to ISO-8601; every other
/// non-empty value falls back to its string form.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) => Some(value.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(format_float(*value)),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => Some(
            value
                .as_datetime()
                .map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_else(|| value.as_f64().to_string()),
        ),
        Data::DateTimeIso(value) => Some(value.clone()),
        Data::DurationIso(value) => Some(value.clone()),
        Data::Error(error) => Some(format!("{error:?}")),
    }
}

/// Integral floats print without a trailing `.0`, matching how spreadsheet
/// applications display whole numbers.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A1-style used range, e.g. "A1:B2".
fn dimensions_of(range: &Range<Data>) -> String {
    match (range.start(), range.end()) {
        (Some(start), Some(end)) => format!("{}:{}", cell_ref(start), cell_ref(end)),
        _ => "A1:A1".to_owned(),
    }
}

fn cell_ref((row, column): (u32, u32)) -> String {
    format!("{}{}", column_letters(column), row + 1)
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 26 -> AA.
fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii letters")
}

/// Merged ranges per sheet, read from the worksheet XML `mergeCell`
/// elements. OOXML workbooks only; legacy workbooks and any read failure
/// yield an empty map.
fn merged_ranges(path: &Path) -> BTreeMap<String, Vec<String>> {
    if extension_of(path) != "xlsx" {
        return BTreeMap::new();
    }
    let Ok(mut archive) = ooxml::open_archive(path) else {
        return BTreeMap::new();
    };

    let mut targets_by_id = BTreeMap::new();
    if let Ok(relationships) = ooxml::relationships(&mut archive, "xl/_rels/workbook.xml.rels") {
        for relationship in relationships {
            targets_by_id.insert(
                relationship.id,
                ooxml::resolve_target("xl", &relationship.target),
            );
        }
    }

    let Ok(workbook_xml) = ooxml::read_part(&mut archive, "xl/workbook.xml") else {
        return BTreeMap::new();
    };

    let mut sheet_parts = Vec::new();
    let mut reader = quick_xml::Reader::from_str(&workbook_xml);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref element)) | Ok(Event::Start(ref element))
                if local_name(element.name().as_ref()) == b"sheet" =>
            {
                let name = attribute_value(element, b"name");
                let id = attribute_value(element, b"id");
                if let (Some(name), Some(id)) = (name, id) {
                    if let Some(target) = targets_by_id.get(&id) {
                        sheet_parts.push((name, target.clone()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return BTreeMap::new(),
            _ => {}
        }
    }

    let mut merged = BTreeMap::new();
    for (name, part) in sheet_parts {
        let Ok(sheet_xml) = ooxml::read_part(&mut archive, &part) else {
            continue;
        };
        let mut ranges = Vec::new();
        let mut reader = quick_xml::Reader::from_str(&sheet_xml);
        reader.trim_text(true);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref element)) | Ok(Event::Start(ref element))
                    if local_name(element.name().as_ref()) == b"mergeCell" =>
                {
                    if let Some(reference) = attribute_value(element, b"ref") {
                        ranges.push(reference);
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
        }
        if !ranges.is_empty() {
            merged.insert(name, ranges);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;

    // Minimal workbook with one sheet ("Sheet1") and values:
    // A1="Header", A2="Value", B2=42.
    const MINIMAL_XLSX_BASE64: &str = "UEsDBBQAAAAIAJyhWlzD9b3EJQEAAC8DAAATAAAAW0NvbnRlbnRfVHlwZXNdLnhtbK1SS08CMRC+8yuaXsm24MEYswsHH0flgD+gtrNsQ1/pFIR/7+ziIzGgGD1Nmu/ZTuv5zju2hYw2hoZPxYQzCDoaG1YNf1reV1ecYVHBKBcDNHwPyOezUb3cJ0BG4oAN70pJ11Ki7sArFDFBIKSN2atCx7ySSem1WoG8mEwupY6hQChV6T34bMRYfQut2rjC7naEHLpkcMjZzYHbxzVcpeSsVoVwuQ3mS1D1FiJIOXCwswnHRODyVEgPns74lD7SE2VrgC1ULg/KE1HunHyJef0c41p873Oka2xbq8FEvfEkEZgyKIMdQPFODFN4ZcP4rAoDH+Uwpv/c5cP/hyokX+SYkLab4fcd3nfXq6tERpCLBTw3lNz/fG/ov4UBcyS+lsN/n70CUEsDBBQAAAAIAJyhWlxPY8Kx7AAAAFUCAAALAAAAX3JlbHMvLnJlbHOtks1OwzAMgO97isj3Nd0mIYSa7jIh7Tah8QAmcX/UNo4SA93bEyGBGGKwA8c49ufPlqvtPI3qhWLq2RtYFSUo8pZd71sDj8f75S2oJOgdjuzJwIkSbOtF9UAjSq5JXR+SyhCfDHQi4U7rZDuaMBUcyOefhuOEkp+x1QHtgC3pdVne6PiVAfVCqTOs2jsDce9WoI6nQNfguWl6Szu2zxN5+aHLt4xMxtiSGJhH/cpxeGIeigwFfVFnfb3O5Wn1RIIOBbXlSMsQc3WUPi/308ixPeRwes/4w2nznyuiWcg7cr9bYQgfUpU+u4b6DVBLAwQUAAAACACcoVpc1cMGTcEAAAAoAQAADwAAAHhsL3dvcmtib29rLnhtbI1Py47CMAy88xWR75CWwwpVbbkgJM67+wGhcWnUxq7ssI+/JwX1zskzGs14pj7+xcn8oGhgaqDcFWCQOvaBbg18f523BzCaHHk3MWED/6hwbDf1L8t4ZR5N9pM2MKQ0V9ZqN2B0uuMZKSs9S3QpU7lZnQWd1wExxcnui+LDRhcIXgmVvJPBfR86PHF3j0jpFSI4uZTb6xBmhXZjTP18ogtciSEXc/vPBZd50XIvPg8GI1XIQC6+BPt029Ve23Vl+wBQSwMEFAAAAAgAnKFaXPVgA4K3AAAALQEAABoAAAB4bC9fcmVscy93b3JrYm9vay54bWwucmVsc43PzQrCMAwH8PueouTusnkQkXW7iLCrzAcoXfaBW1ua+rG3t3gQBx48hSTkF/5F9ZwncSfPozUS8jQDQUbbdjS9hEtz2uxBcFCmVZM1JGEhhqpMijNNKsQbHkbHIiKGJQwhuAMi64Fmxal1ZOKms35WIba+R6f0VfWE2yzbof82oEyEWLGibiX4us1BNIujf3jbdaOmo9W3mUz48QUf1l95IAoRVb6nIOEzYnyXPI0qYAyJq5TlC1BLAwQUAAAACACcoVpc5Bkyr9IAAABVAQAAGAAAAHhsL3dvcmtzaGVldHMvc2hlZXQxLnhtbHWQT0vEQAzF7/sphtzddIuISDqLIuLdP/ehjdvBmUyZiV399k57WOzBQyDvhffjETp+x2BmzsUn6eCwb8Cw9Gnwcurg7fXp6hZMUSeDC0m4gx8ucLQ7Oqf8WUZmNRUgpYNRdbpDLP3I0ZV9mljq5SPl6LTKfMIyZXbDGooB26a5wei8gN0ZQ6v96NQtquqczibXQmCpX5b7AxjtwEvwwi+aq++LJbXPlcmZUC3h4mBfp6a3nPbCaf/hvLvwxVvMGnhYorO9bgnnLZ3wT2nCy0fsL1BLAwQUAAAACACcoVpcasaL7d8AAACJAQAAEQAAAGRvY1Byb3BzL2NvcmUueG1sbZBNS8RADIbv/ooy9zatgkiZdm+eFAQVvA6Z2B3sfDCJdvffO1u0LrjH5H3ykETvDn6uviizi2FQXdOqigJG68I0qNeX+/pOVSwmWDPHQIM6EqvdeKUx9RgzPeWYKIsjrooocI9pUHuR1AMw7skbbgoRSvgeszdSyjxBMvhhJoLrtr0FT2KsEQMnYZ02o/pRWtyU6TPPq8Ai0EyegjB0TQd/rFD2fHFgTc5I7+SY6CL6G270gd0GLsvSLDcrWvbv4O3x4Xk9tXbh9CokNWqLPWYyEvMoxKLhrKHh3/fGb1BLAwQUAAAACACcoVpcWQwavqkAAAAUAQAAEAAAAGRvY1Byb3BzL2FwcC54bWydzzELwjAQBeDdX1Gy11QHEUlbBHHuoO4hudpAcxeSs7T/3oigzo53Dz7eU+3sx2KCmBxhLTbrShSAhqzDey2ul3O5F0VijVaPhFCLBZJom5XqIgWI7CAVWcBUi4E5HKRMZgCv0zrHmJOeotecz3iX1PfOwInMwwOy3FbVTsLMgBZsGT6geIuHif9FLZlXv3S7LCF7jTqGMDqjOY9suoUHQiV/f0p+9zRPUEsBAhQDFAAAAAgAnKFaXMP1vcQlAQAALwMAABMAAAAAAAAAAAAAAIABAAAAAFtDb250ZW50X1R5cGVzXS54bWxQSwECFAMUAAAACACcoVpcT2PCsewAAABVAgAACwAAAAAAAAAAAAAAgAFWAQAAX3JlbHMvLnJlbHNQSwECFAMUAAAACACcoVpc1cMGTcEAAAAoAQAADwAAAAAAAAAAAAAAgAFrAgAAeGwvd29ya2Jvb2sueG1sUEsBAhQDFAAAAAgAnKFaXPVgA4K3AAAALQEAABoAAAAAAAAAAAAAAIABWQMAAHhsL19yZWxzL3dvcmtib29rLnhtbC5yZWxzUEsBAhQDFAAAAAgAnKFaXOQZMq/SAAAAVQEAABgAAAAAAAAAAAAAAIABSAQAAHhsL3dvcmtzaGVldHMvc2hlZXQxLnhtbFBLAQIUAxQAAAAIAJyhWlxqxovt3wAAAIkBAAARAAAAAAAAAAAAAACAAVAFAABkb2NQcm9wcy9jb3JlLnhtbFBLAQIUAxQAAAAIAJyhWlxZDBq+qQAAABQBAAAQAAAAAAAAAAAAAACAAV4GAABkb2NQcm9wcy9hcHAueG1sUEsFBgAAAAAHAAcAwgEAADUHAAAAAA==";

    fn write_minimal_xlsx() -> NamedTempFile {
        let file = NamedTempFile::with_suffix(".xlsx").expect("create xlsx temp file");
        let bytes = STANDARD.decode(MINIMAL_XLSX_BASE64).expect("valid fixture");
        fs::write(file.path(), bytes).expect("write xlsx bytes");
        file
    }

    #[test]
    fn open_rejects_missing_file_and_foreign_extension() {
        let error = ExcelParser::open(Path::new("/tmp/missing.xlsx")).expect_err("missing file");
        assert_eq!(error.kind, ErrorKind::NotFound);

        let file = NamedTempFile::with_suffix(".pptx").expect("create temp file");
        fs::write(file.path(), b"stub").expect("write stub");
        let error = ExcelParser::open(file.path()).expect_err("pptx extension");
        assert_eq!(error.kind, ErrorKind::UnsupportedExtension);
    }

    #[test]
    fn parses_sheets_in_workbook_order() {
        let file = write_minimal_xlsx();
        let parser = ExcelParser::open(file.path()).expect("open xlsx");
        let document = parser.parse();

        assert!(document.errors.is_empty(), "errors: {:?}", document.errors);
        let DocumentContent::Excel(content) = &document.content else {
            panic!("expected excel content");
        };
        assert_eq!(content.sheet_count, 1);
        assert_eq!(content.sheet_names, vec!["Sheet1"]);

        let sheet = &content.sheets[0];
        assert_eq!(sheet.dimensions, "A1:B2");
        assert_eq!(sheet.max_row, 2);
        assert_eq!(sheet.max_column, 2);
        assert_eq!(
            sheet.data,
            vec![
                vec![Some("Header".to_owned()), None],
                vec![Some("Value".to_owned()), Some("42".to_owned())],
            ]
        );
    }

    #[test]
    fn first_non_empty_row_becomes_table_header() {
        let file = write_minimal_xlsx();
        let parser = ExcelParser::open(file.path()).expect("open xlsx");
        let tables = parser.extract_tables().expect("tables");

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name.as_deref(), Some("Sheet1"));
        assert_eq!(table.headers, vec!["Header", ""]);
        assert_eq!(table.data, vec![vec!["Value".to_owned(), "42".to_owned()]]);
        assert_eq!(table.rows, 1);
        assert_eq!(table.columns, 2);
    }

    #[test]
    fn blank_rows_are_dropped_from_grid_and_table() {
        let grid = vec![
            vec![Some("Name".to_owned()), Some("Age".to_owned())],
            vec![Some("Ana".to_owned()), Some("30".to_owned())],
        ];
        // The grid above is what sheet extraction produces for rows
        // [["Name","Age"],["Ana","30"],[None,None]]: the blank row never
        // reaches the table stage.
        let table = table_from_grid("People", &grid).expect("table");
        assert_eq!(table.headers, vec!["Name", "Age"]);
        assert_eq!(table.data, vec![vec!["Ana".to_owned(), "30".to_owned()]]);
        assert_eq!(table.rows, 1);
    }

    #[test]
    fn empty_grid_produces_no_table() {
        assert!(table_from_grid("Empty", &[]).is_none());
    }

    #[test]
    fn metadata_reports_sheet_statistics() {
        let file = write_minimal_xlsx();
        let parser = ExcelParser::open(file.path()).expect("open xlsx");
        let metadata = parser.extract_metadata().expect("metadata");

        assert_eq!(metadata.get("sheet_count").map(String::as_str), Some("1"));
        assert_eq!(
            metadata.get("sheet_names").map(String::as_str),
            Some("Sheet1")
        );
    }

    #[test]
    fn extract_text_renders_tab_separated_rows_per_sheet() {
        let file = write_minimal_xlsx();
        let parser = ExcelParser::open(file.path()).expect("open xlsx");
        let text = parser.extract_text().expect("text");

        assert!(text.starts_with("=== Sheet1 ===\n"));
        assert!(text.contains("Header\n"));
        assert!(text.contains("Value\t42"));
    }

    #[test]
    fn images_default_to_empty_sequence() {
        let file = write_minimal_xlsx();
        let parser = ExcelParser::open(file.path()).expect("open xlsx");
        assert!(parser.extract_images().expect("images").is_empty());
    }

    #[test]
    fn malformed_workbook_soft_fails_into_error_log() {
        let file = NamedTempFile::with_suffix(".xlsx").expect("create temp file");
        fs::write(file.path(), b"not a workbook").expect("write stub");
        let parser = ExcelParser::open(file.path()).expect("open wrapper");

        let document = parser.parse();
        assert!(!document.errors.is_empty());
        assert_eq!(document.errors[0].stage, ExtractStage::Content);
    }

    #[test]
    fn column_letters_cover_multi_letter_columns() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
    }

    #[test]
    fn integral_floats_print_without_decimal_point() {
        assert_eq!(format_float(30.0), "30");
        assert_eq!(format_float(30.5), "30.5");
        assert_eq!(format_float(-2.0), "-2");
    }

    #[test]
    fn merged_ranges_read_from_worksheet_xml() {
        let file = NamedTempFile::with_suffix(".xlsx").expect("create temp file");
        let mut writer =
            zip::ZipWriter::new(fs::File::create(file.path()).expect("open xlsx for write"));
        let parts = [
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData/><mergeCells count="1"><mergeCell ref="A1:B2"/></mergeCells></worksheet>"#,
            ),
        ];
        for (name, contents) in parts {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer
                .write_all(contents.as_bytes())
                .expect("write zip entry");
        }
        writer.finish().expect("finish xlsx");

        let merged = merged_ranges(file.path());
        assert_eq!(merged.get("Data"), Some(&vec!["A1:B2".to_owned()]));
    }
}
