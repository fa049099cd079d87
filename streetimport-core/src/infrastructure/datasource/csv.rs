// streetimport-core/src/infrastructure/datasource/csv.rs

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::configuration::DomainConfig;
use crate::domain::configuration::import::validate_delimiter;
use crate::domain::outcome::ImportResult;
use crate::domain::record::{Record, RecordBuilder};
use crate::error::ImportError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::data_source::{DataSource, HeaderPolicy, RequiredColumns};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Resolves an encoding label. Only ASCII-compatible encodings can be tokenized byte-wise.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, InfrastructureError> {
    Encoding::for_label(label.trim().as_bytes())
        .filter(|e| e.is_ascii_compatible())
        .ok_or_else(|| InfrastructureError::UnsupportedEncoding(label.to_string()))
}

pub struct CsvOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Source column name to record field name.
    pub field_mapping: HashMap<String, String>,
    pub header_policy: Option<Box<dyn HeaderPolicy>>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: UTF_8,
            field_mapping: HashMap::new(),
            header_policy: None,
        }
    }
}

impl CsvOptions {
    /// Domain settings under `data_source.*` win over the process configuration.
    pub fn from_config(config: &DomainConfig) -> Result<Self, InfrastructureError> {
        let import = config.import_config();

        let delimiter = config.setting_str(["data_source", "delimiter"], &import.delimiter);
        validate_delimiter(&delimiter).map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                delimiter
            ))
        })?;

        let encoding =
            resolve_encoding(&config.setting_str(["data_source", "encoding"], &import.encoding))?;

        let field_mapping = match config.get_setting(["data_source", "field_mapping"], Value::Null) {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k, v.to_string())))
                .collect(),
            _ => HashMap::new(),
        };

        let required = config.setting_strings(["data_source", "required_columns"]);
        let header_policy: Option<Box<dyn HeaderPolicy>> = if required.is_empty() {
            None
        } else {
            Some(Box::new(RequiredColumns(required)))
        };

        Ok(Self {
            delimiter: delimiter.as_bytes()[0],
            encoding,
            field_mapping,
            header_policy,
        })
    }
}

/// Streaming reader over one delimited text file.
///
/// Holds at most one open file handle; it is dropped as soon as the last
/// record has been buffered, on `close`, or when `reset` fails.
pub struct CsvDataSource {
    uri: PathBuf,
    options: CsvOptions,
    reader: Option<Reader<File>>,
    header: Vec<String>,
    lookahead: Option<Record>,
}

impl CsvDataSource {
    pub fn new(uri: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            uri: uri.into(),
            options,
            reader: None,
            header: Vec::new(),
            lookahead: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn decode(&self, raw: &[u8]) -> String {
        let (text, _) = self.options.encoding.decode_without_bom_handling(raw);
        text.into_owned()
    }

    fn load_next(&mut self, result: &mut ImportResult) -> Result<(), ImportError> {
        self.lookahead = None;
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };

        let mut raw = ByteRecord::new();
        match reader.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => {
                debug!(uri = ?self.uri, "End of file reached, closing");
                self.reader = None;
                return Ok(());
            }
            Err(e) => {
                self.reader = None;
                return Err(result.abort(format!(
                    "Unable to read {}: {}",
                    self.uri.display(),
                    e
                )));
            }
        }

        let line = raw.position().map_or(0, |p| p.line());
        let mut builder = RecordBuilder::new();
        // Sparse policy: columns missing at the end of the row stay absent.
        for (name, value) in self.header.iter().zip(raw.iter()) {
            builder.push(name, self.decode(value));
        }
        self.lookahead = Some(builder.finish(line, &self.uri.to_string_lossy()));
        Ok(())
    }

    fn open(&mut self, result: &mut ImportResult) -> Result<(), ImportError> {
        let uri = self.uri.display().to_string();

        let mut file = File::open(&self.uri)
            .map_err(|e| result.abort(format!("Unable to open file {}: {}", uri, e)))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| result.abort(format!("Unable to read file {}: {}", uri, e)))?;

        let bom = if self.options.encoding == UTF_8 && content.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        let body = &content[bom..];

        if self
            .options
            .encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .is_none()
        {
            return Err(result.abort(format!(
                "File {} is not valid {}",
                uri,
                self.options.encoding.name()
            )));
        }

        let first_line = body
            .split(|b| *b == b'\n')
            .next()
            .unwrap_or_default();
        if first_line.iter().all(u8::is_ascii_whitespace) {
            return Err(result.abort(format!("No header row found in {}", uri)));
        }
        let columns = first_line
            .split(|b| *b == self.options.delimiter)
            .count();
        if columns < 2 {
            return Err(result.abort(format!(
                "Delimiter '{}' not found in the first row of {}",
                self.options.delimiter as char, uri
            )));
        }

        file.seek(SeekFrom::Start(bom as u64))
            .map_err(|e| result.abort(format!("Unable to rewind file {}: {}", uri, e)))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut raw = ByteRecord::new();
        let has_header = reader
            .read_byte_record(&mut raw)
            .map_err(|e| result.abort(format!("Unable to read header of {}: {}", uri, e)))?;
        if !has_header {
            return Err(result.abort(format!("No header row found in {}", uri)));
        }

        let header: Vec<String> = raw
            .iter()
            .map(|column| {
                let name = self.decode(column).trim().to_string();
                self.options
                    .field_mapping
                    .get(&name)
                    .cloned()
                    .unwrap_or(name)
            })
            .collect();

        if let Some(policy) = &self.options.header_policy
            && let Err(reason) = policy.validate(&header)
        {
            return Err(result.abort(format!("Invalid header in {}: {}", uri, reason)));
        }

        debug!(uri = %uri, columns = header.len(), "Header accepted");
        self.header = header;
        self.reader = Some(reader);
        Ok(())
    }
}

impl DataSource for CsvDataSource {
    fn uri(&self) -> &Path {
        &self.uri
    }

    #[instrument(skip(self, result), fields(uri = %self.uri.display()))]
    fn reset(&mut self, result: &mut ImportResult) -> Result<(), ImportError> {
        self.close();
        self.header.clear();

        if let Err(e) = self.open(result) {
            self.close();
            return Err(e);
        }
        self.load_next(result)
    }

    fn has_next(&self) -> bool {
        self.lookahead.is_some()
    }

    fn next(&mut self, result: &mut ImportResult) -> Result<Option<Record>, ImportError> {
        let Some(record) = self.lookahead.take() else {
            return Ok(None);
        };
        self.load_next(result)?;
        Ok(Some(record))
    }

    fn close(&mut self) {
        self.reader = None;
        self.lookahead = None;
    }

    fn header(&self) -> &[String] {
        &self.header
    }
}
