//! Document loading.
//!
//! Turns a batch of files into text fragments with provenance and computes
//! the batch signature used to skip reprocessing an unchanged batch.
//!
//! PDF files yield one fragment per page, DOCX files a single fragment
//! without a page. Anything else except legacy `.doc` is read as text.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use asisten_core::Fragment;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::error::{AssistantError, Result};

/// Page separator emitted by text exports of paginated documents (`pdftotext`).
const FORM_FEED: char = '\u{000C}';

/// WordprocessingML main namespace.
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Document formats the loader can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Pdf,
    Docx,
}

/// Fragments and metadata of one processed batch.
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    /// Text fragments in file order, then page order.
    pub fragments: Vec<Fragment>,

    /// Display names of the loaded documents.
    pub documents: Vec<String>,

    /// Hex SHA-256 over every file's name and contents.
    pub signature: String,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn detect_format(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(Format::Pdf),
        "docx" => Ok(Format::Docx),
        "doc" => Err(AssistantError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        }),
        _ => Ok(Format::Text),
    }
}

fn parse_error(path: &Path, error: impl std::fmt::Display) -> AssistantError {
    AssistantError::DocumentParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Decode file bytes as NFC-normalised UTF-8 without a byte order mark.
fn decode(path: &Path, bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(|_| AssistantError::DocumentEncoding {
        path: path.to_path_buf(),
    })?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    Ok(text.nfc().collect())
}

/// Split decoded text into fragments.
///
/// Text with form feeds is treated as paginated: page `n` (1-based) is the
/// `n`-th form-feed separated segment, and blank pages are skipped. Text
/// without form feeds becomes a single fragment without a page.
pub fn fragments_from_text(text: &str, source: &str) -> Vec<Fragment> {
    if !text.contains(FORM_FEED) {
        return vec![Fragment::new(text, source, None)];
    }

    text.split(FORM_FEED)
        .zip(1u32..)
        .filter(|(page, _)| !page.trim().is_empty())
        .map(|(page, number)| Fragment::new(page, source, Some(number)))
        .collect()
}

/// One fragment per PDF page with extractable text.
///
/// Pages are numbered from 1 in document order. A page whose text cannot be
/// extracted is skipped with a warning, like a blank page.
fn pdf_fragments(path: &Path, bytes: &[u8], source: &str) -> Result<Vec<Fragment>> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| parse_error(path, e))?;

    let mut fragments = Vec::new();
    for page in document.get_pages().into_keys() {
        let text = match document.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(document = %source, page, error = %e, "Skipping unreadable PDF page");
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }
        fragments.push(Fragment::new(text.nfc().collect::<String>(), source, Some(page)));
    }
    Ok(fragments)
}

/// Text of a DOCX body, one line per paragraph.
fn docx_text(path: &Path, bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| parse_error(path, e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| parse_error(path, e))?
        .read_to_string(&mut xml)
        .map_err(|e| parse_error(path, e))?;

    let document = roxmltree::Document::parse(&xml).map_err(|e| parse_error(path, e))?;
    let paragraphs: Vec<String> = document
        .descendants()
        .filter(|node| node.has_tag_name((WORD_NS, "p")))
        .map(paragraph_text)
        .collect();

    Ok(paragraphs.join("\n").nfc().collect())
}

/// Run text of one `w:p`. Tab stops in paragraph properties are not text.
fn paragraph_text(paragraph: roxmltree::Node<'_, '_>) -> String {
    let mut text = String::new();

    for node in paragraph.descendants() {
        let in_run = node
            .parent()
            .is_some_and(|parent| parent.has_tag_name((WORD_NS, "r")));
        if !in_run || node.tag_name().namespace() != Some(WORD_NS) {
            continue;
        }
        match node.tag_name().name() {
            "t" => text.push_str(node.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }

    text
}

/// Load a batch of documents.
///
/// # Errors
/// Fails on the first unreadable, unparsable or unsupported file, and with
/// [`asisten_core::CoreError::EmptyBatch`] when no path is given.
pub async fn load_batch(paths: &[PathBuf]) -> Result<LoadedBatch> {
    if paths.is_empty() {
        return Err(asisten_core::CoreError::EmptyBatch.into());
    }

    let mut hasher = Sha256::new();
    let mut fragments = Vec::new();
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let format = detect_format(path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AssistantError::DocumentRead {
                path: path.clone(),
                source,
            })?;
        let name = display_name(path);

        // Length-prefix each part so (a, bc) and (ab, c) hash differently.
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);

        let loaded = match format {
            Format::Text => fragments_from_text(&decode(path, &bytes)?, &name),
            Format::Pdf => pdf_fragments(path, &bytes, &name)?,
            Format::Docx => vec![Fragment::new(docx_text(path, &bytes)?, name.as_str(), None)],
        };
        tracing::debug!(document = %name, fragments = loaded.len(), "Loaded document");

        fragments.extend(loaded);
        documents.push(name);
    }

    Ok(LoadedBatch {
        fragments,
        documents,
        signature: hex::encode(hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_single_text_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "uu.txt", b"Pasal 1\nKetentuan umum.");

        let batch = load_batch(&[path]).await.unwrap();
        assert_eq!(batch.documents, vec!["uu.txt".to_string()]);
        assert_eq!(
            batch.fragments,
            vec![Fragment::new("Pasal 1\nKetentuan umum.", "uu.txt", None)]
        );
        assert_eq!(batch.signature.len(), 64);
    }

    #[tokio::test]
    async fn test_bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bom.txt", "\u{FEFF}Pasal 1\nIsi.".as_bytes());

        let batch = load_batch(&[path]).await.unwrap();
        assert!(batch.fragments[0].content.starts_with("Pasal 1"));
    }

    #[tokio::test]
    async fn test_text_is_nfc_normalised() {
        let dir = TempDir::new().unwrap();
        // "e" followed by a combining acute accent.
        let path = write(&dir, "nfd.txt", "Pasal 1\ncafe\u{0301}".as_bytes());

        let batch = load_batch(&[path]).await.unwrap();
        assert!(batch.fragments[0].content.ends_with("caf\u{00E9}"));
    }

    /// A PDF with one text object per line, so extracted lines stay apart.
    fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 760 - 20 * i as i64;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn docx_bytes(body: &str) -> Vec<u8> {
        use std::io::Write;

        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WORD_NS}"><w:body>{body}</w:body></w:document>"#
        );
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_pdf_yields_one_fragment_per_page() {
        let dir = TempDir::new().unwrap();
        let bytes = pdf_bytes(&[
            &["Pasal 1", "Ketentuan umum."],
            &[],
            &["Pasal 2", "Sanksi denda."],
        ]);
        let path = write(&dir, "uu.PDF", &bytes);

        let batch = load_batch(&[path]).await.unwrap();
        let pages: Vec<_> = batch.fragments.iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![Some(1), Some(3)]);
        assert!(batch.fragments.iter().all(|f| f.source == "uu.PDF"));
        assert!(batch.fragments[0].content.contains("Pasal 1"));
        assert!(batch.fragments[0].content.contains("Ketentuan umum."));
        assert!(batch.fragments[1].content.contains("Sanksi denda."));
        assert!(!batch.fragments[1].content.contains("Pasal 1"));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "uu.pdf", b"%PDF-1.7 bukan pdf");

        let err = load_batch(&[path]).await.unwrap_err();
        assert!(matches!(err, AssistantError::DocumentParse { .. }));
    }

    #[tokio::test]
    async fn test_docx_yields_single_fragment() {
        let dir = TempDir::new().unwrap();
        let bytes = docx_bytes(concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>Pasal 1</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Setiap orang </w:t></w:r>"#,
            r#"<w:r><w:t>wajib.</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Pasal 2</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Ayat</w:t><w:tab/><w:t>satu</w:t></w:r></w:p>"#,
        ));
        let path = write(&dir, "uu.docx", &bytes);

        let batch = load_batch(&[path]).await.unwrap();
        assert_eq!(
            batch.fragments,
            vec![Fragment::new(
                "Pasal 1\nSetiap orang wajib.\nPasal 2\nAyat\tsatu",
                "uu.docx",
                None
            )]
        );
    }

    #[tokio::test]
    async fn test_docx_without_body_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let path = write(&dir, "kosong.docx", &bytes);

        let err = load_batch(&[path]).await.unwrap_err();
        assert!(matches!(err, AssistantError::DocumentParse { .. }));
    }

    #[tokio::test]
    async fn test_legacy_doc_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "uu.DOC", b"\xD0\xCF\x11\xE0");

        let err = load_batch(&[path]).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::UnsupportedFormat { ref extension, .. } if extension == "doc"
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "latin1.txt", &[0x50, 0x61, 0xE9, 0xFF]);

        let err = load_batch(&[path]).await.unwrap_err();
        assert!(matches!(err, AssistantError::DocumentEncoding { .. }));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_batch(&[PathBuf::from("/nonexistent/uu.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::DocumentRead { .. }));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let err = load_batch(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Core(asisten_core::CoreError::EmptyBatch)
        ));
    }

    #[tokio::test]
    async fn test_signature_tracks_contents() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", b"Pasal 1\nSatu.");
        let first = load_batch(&[a.clone()]).await.unwrap().signature;
        let again = load_batch(&[a.clone()]).await.unwrap().signature;
        assert_eq!(first, again);

        std::fs::write(&a, b"Pasal 1\nDua.").unwrap();
        let changed = load_batch(&[a]).await.unwrap().signature;
        assert_ne!(first, changed);
    }

    #[test]
    fn test_form_feed_pages() {
        let fragments = fragments_from_text("Pasal 1\nSatu.\u{000C}\u{000C}Pasal 2\nDua.", "uu.txt");
        assert_eq!(
            fragments,
            vec![
                Fragment::new("Pasal 1\nSatu.", "uu.txt", Some(1)),
                Fragment::new("Pasal 2\nDua.", "uu.txt", Some(3)),
            ]
        );
    }
}
