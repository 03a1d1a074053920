use std::io::{BufRead, Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;

use gmt_import::domain::{DedupPolicy, GeneIdType, OutputForm, SourceLocator};
use gmt_import::error::GmtError;
use gmt_import::importer::{ImportOptions, ImportResult, Importer, import_reader};
use gmt_import::source::{HttpSourceClient, SourceClient, decode};

const SCENARIO_A: &str = "SET1\tdesc1\tG1\tG2\nSET2\tdesc2\tG3\n";
const DUPLICATED: &str = "SET1\tdesc1\tG1\tG2\nSET2\tdesc2\tG3\nSET1\tdesc1\tG5\tG6\n";

#[derive(Default)]
struct MockSource {
    content: Vec<u8>,
    opened: Arc<AtomicUsize>,
}

impl MockSource {
    fn new(content: &[u8]) -> Self {
        Self {
            content: content.to_vec(),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SourceClient for MockSource {
    fn open(&self, source: &SourceLocator) -> Result<Box<dyn BufRead>, GmtError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        decode(Cursor::new(self.content.clone()), source)
    }
}

struct OfflineSource;

impl SourceClient for OfflineSource {
    fn open(&self, source: &SourceLocator) -> Result<Box<dyn BufRead>, GmtError> {
        Err(GmtError::SourceUnavailable {
            source_name: source.to_string(),
            status: None,
            reason: "network unreachable".to_string(),
        })
    }
}

/// Hands out the content one byte per `read`, like a slow chunked body.
struct TricklingSource(Vec<u8>);

struct OneByteReader(Cursor<Vec<u8>>);

impl Read for OneByteReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = buf.len().min(1);
        self.0.read(&mut buf[..len])
    }
}

impl SourceClient for TricklingSource {
    fn open(&self, source: &SourceLocator) -> Result<Box<dyn BufRead>, GmtError> {
        decode(OneByteReader(Cursor::new(self.0.clone())), source)
    }
}

/// Serves a single HTTP response on a local port and returns its URL.
fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut buf).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }
        let header = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
    });
    format!("http://{addr}/sets.gmt.gz")
}

fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> SourceLocator {
    let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
    std::fs::write(path.as_std_path(), content).unwrap();
    SourceLocator::Path(path)
}

fn mapping() -> ImportOptions {
    ImportOptions {
        output: OutputForm::Mapping,
        ..ImportOptions::default()
    }
}

#[test]
fn import_local_file_as_mapping() {
    let temp = tempfile::tempdir().unwrap();
    let source = write_fixture(&temp, "sets.gmt", SCENARIO_A.as_bytes());
    let importer = Importer::new(HttpSourceClient::new().unwrap());

    let result = importer.import(&source, &mapping()).unwrap();
    let map = result.as_mapping().unwrap();
    assert_eq!(map.names().collect::<Vec<_>>(), vec!["SET1", "SET2"]);
    assert_eq!(map.get("SET1").unwrap(), ["G1", "G2"].map(String::from));
    assert_eq!(map.get("SET2").unwrap(), ["G3".to_string()]);
}

#[test]
fn gzip_file_matches_plain_file() {
    let temp = tempfile::tempdir().unwrap();
    let plain = write_fixture(&temp, "sets.gmt", DUPLICATED.as_bytes());
    let compressed = write_fixture(&temp, "sets.gmt.gz", &gzip(DUPLICATED.as_bytes()));
    let misnamed = write_fixture(&temp, "sets.txt", &gzip(DUPLICATED.as_bytes()));
    let importer = Importer::new(HttpSourceClient::new().unwrap());
    let options = ImportOptions {
        gene_id_type: Some(GeneIdType::Symbol),
        ..ImportOptions::default()
    };

    let expected = importer.import(&plain, &options).unwrap();
    assert_eq!(importer.import(&compressed, &options).unwrap(), expected);
    assert_eq!(importer.import(&misnamed, &options).unwrap(), expected);
}

#[test]
fn import_is_idempotent() {
    let mock = MockSource::new(DUPLICATED.as_bytes());
    let opened = Arc::clone(&mock.opened);
    let importer = Importer::new(mock);
    let source: SourceLocator = "https://example.org/sets.gmt".parse().unwrap();
    let options = ImportOptions::default();

    let first = importer.import(&source, &options).unwrap();
    let second = importer.import(&source, &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(opened.load(Ordering::SeqCst), 2);
}

#[test]
fn first_policy_keeps_first_occurrence() {
    let importer = Importer::new(MockSource::new(DUPLICATED.as_bytes()));
    let source: SourceLocator = "sets.gmt".parse().unwrap();

    let outcome = importer
        .import_with_report(&source, &ImportOptions::default())
        .unwrap();
    let collection = outcome.result.as_collection().unwrap();
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.get("SET1").unwrap().genes, vec!["G1", "G2"]);
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].name, "SET1");
    assert_eq!(outcome.duplicates[0].occurrences, 2);
}

#[test]
fn error_policy_names_duplicate() {
    let importer = Importer::new(MockSource::new(DUPLICATED.as_bytes()));
    let source: SourceLocator = "sets.gmt".parse().unwrap();
    let options = ImportOptions {
        dedup: DedupPolicy::Error,
        ..ImportOptions::default()
    };

    let err = importer.import(&source, &options).unwrap_err();
    assert!(err.to_string().contains("SET1"));
    assert_matches!(err, GmtError::DuplicateNames(_));
}

#[test]
fn none_policy_mapping_takes_last_occurrence() {
    let options = ImportOptions {
        dedup: DedupPolicy::None,
        output: OutputForm::Mapping,
        ..ImportOptions::default()
    };
    let result = import_reader(DUPLICATED.as_bytes(), &options).unwrap();
    let map = result.as_mapping().unwrap();
    assert_eq!(map.get("SET1").unwrap(), ["G5", "G6"].map(String::from));
}

#[test]
fn unique_input_ignores_policy() {
    let expected = import_reader(SCENARIO_A.as_bytes(), &ImportOptions::default()).unwrap();
    for dedup in [DedupPolicy::Last, DedupPolicy::Error, DedupPolicy::None] {
        let options = ImportOptions {
            dedup,
            ..ImportOptions::default()
        };
        assert_eq!(import_reader(SCENARIO_A.as_bytes(), &options).unwrap(), expected);
    }
}

#[test]
fn exported_collection_reimports_equal() {
    let input = "SET1\tfirst set\tG1\tG2\tG1\nSET2\t\tG3\n";
    let options = ImportOptions {
        gene_id_type: Some(GeneIdType::Entrez),
        ..ImportOptions::default()
    };
    let ImportResult::Collection(collection) = import_reader(input.as_bytes(), &options).unwrap()
    else {
        panic!("expected a collection");
    };

    let mut exported = Vec::new();
    collection.write_gmt(&mut exported).unwrap();
    let reimported = import_reader(exported.as_slice(), &options).unwrap();
    assert_eq!(reimported, ImportResult::Collection(collection));
}

#[test]
fn missing_file_is_source_unavailable() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("absent.gmt")).unwrap();
    let importer = Importer::new(HttpSourceClient::new().unwrap());

    let err = importer
        .import(&SourceLocator::Path(path), &ImportOptions::default())
        .unwrap_err();
    assert_matches!(err, GmtError::SourceUnavailable { .. });
}

#[test]
fn offline_remote_source_fails() {
    let importer = Importer::new(OfflineSource);
    let source: SourceLocator = "https://example.org/c2.gmt.gz".parse().unwrap();
    let err = importer
        .import(&source, &ImportOptions::default())
        .unwrap_err();
    assert_matches!(err, GmtError::SourceUnavailable { .. });
}

#[test]
fn gzip_checksum_mismatch_is_source_unavailable() {
    let mut bytes = gzip(SCENARIO_A.as_bytes());
    let crc_offset = bytes.len() - 8;
    bytes[crc_offset] ^= 0xff;
    let importer = Importer::new(MockSource::new(&bytes));
    let source: SourceLocator = "sets.gmt.gz".parse().unwrap();

    let err = importer
        .import(&source, &ImportOptions::default())
        .unwrap_err();
    assert_matches!(err, GmtError::SourceUnavailable { .. });
}

#[test]
fn malformed_line_reports_line_number() {
    let input = "SET1\td\tG1\n\nSET2\tonly-description\n";
    let err = import_reader(input.as_bytes(), &ImportOptions::default()).unwrap_err();
    assert_matches!(err, GmtError::MalformedLine { line: 3, fields: 2 });
}

#[test]
fn trailing_tab_yields_empty_gene() {
    let result = import_reader("SET1\td\tG1\t\n".as_bytes(), &mapping()).unwrap();
    let map = result.as_mapping().unwrap();
    assert_eq!(map.get("SET1").unwrap(), ["G1".to_string(), String::new()]);
}

#[test]
fn remote_gzip_source_imports() {
    let url = serve_once("200 OK", gzip(DUPLICATED.as_bytes()));
    let source: SourceLocator = url.parse().unwrap();
    let importer = Importer::new(HttpSourceClient::new().unwrap());

    let result = importer.import(&source, &ImportOptions::default()).unwrap();
    let expected = import_reader(DUPLICATED.as_bytes(), &ImportOptions::default()).unwrap();
    assert_eq!(result, expected);
}

#[test]
fn remote_not_found_carries_status() {
    let url = serve_once("404 Not Found", b"no such gene set file".to_vec());
    let source: SourceLocator = url.parse().unwrap();
    let importer = Importer::new(HttpSourceClient::new().unwrap());

    let err = importer
        .import(&source, &ImportOptions::default())
        .unwrap_err();
    assert_matches!(
        err,
        GmtError::SourceUnavailable {
            status: Some(404),
            ..
        }
    );
}

#[test]
fn gzip_detected_on_trickling_stream() {
    let importer = Importer::new(TricklingSource(gzip(b"SET1\td\tG1\n")));
    let source: SourceLocator = "https://example.org/sets".parse().unwrap();

    let result = importer.import(&source, &mapping()).unwrap();
    let map = result.as_mapping().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("SET1").unwrap(), ["G1".to_string()]);
}
