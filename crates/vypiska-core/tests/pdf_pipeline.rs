//! End-to-end parsing of PDFs generated in memory.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

use vypiska_core::{
    ExtractionMethod, ExtractorKind, PdfError, PdfExtractor, PdfSource, StatementParser,
    VypiskaError,
};

/// WinAnsi bytes for the handful of non-ASCII characters the tests draw.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '–' => 0x96,
            c => c as u8,
        })
        .collect()
}

fn show(font: &str, x: i64, y: i64, bytes: Vec<u8>) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(10)]),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]
}

fn text_at(x: i64, y: i64, text: &str) -> Vec<Operation> {
    show("F1", x, y, win_ansi(text))
}

/// Title, header and rows of a three-column statement table.
fn statement_operations(rows: &[[&str; 3]]) -> Vec<Operation> {
    let mut operations = text_at(50, 800, "Account statement");
    operations.extend(text_at(50, 760, "Date"));
    operations.extend(text_at(200, 760, "Amount"));
    operations.extend(text_at(350, 760, "Description"));

    let mut y = 740;
    for row in rows {
        operations.extend(text_at(50, y, row[0]));
        operations.extend(text_at(200, y, row[1]));
        operations.extend(text_at(350, y, row[2]));
        y -= 20;
    }
    operations
}

/// One-page PDF with a Helvetica table of the given rows.
fn statement_pdf(rows: &[[&str; 3]]) -> Vec<u8> {
    build_pdf(vec![Content {
        operations: statement_operations(rows),
    }])
}

fn build_pdf(pages: Vec<Content>) -> Vec<u8> {
    build_pdf_with_xobjects(pages, Vec::new())
}

/// Pages share one resource dictionary: `F1` is Helvetica with WinAnsi,
/// `F2` remaps a few codes to Cyrillic through `Differences`, and the
/// given XObjects are registered under their names.
fn build_pdf_with_xobjects(pages: Vec<Content>, xobjects: Vec<(&str, Stream)>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let cyrillic_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => dictionary! {
            "Type" => "Encoding",
            "BaseEncoding" => "WinAnsiEncoding",
            "Differences" => vec![
                Object::Integer(0xC4),
                Object::Name(b"afii10021".to_vec()),
                Object::Integer(0xE0),
                Object::Name(b"afii10065".to_vec()),
                Object::Integer(0xF2),
                Object::Name(b"afii10084".to_vec()),
            ],
        },
    });

    let mut xobject_dict = Dictionary::new();
    for (name, stream) in xobjects {
        xobject_dict.set(name, doc.add_object(stream));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id, "F2" => cyrillic_id },
        "XObject" => xobject_dict,
    });

    let mut kids = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[test]
fn test_layout_of_generated_page() {
    let data = statement_pdf(&[["01.03.2024", "-500.00", "Coffee shop"]]);
    let extractor = PdfExtractor::from_bytes(&data).unwrap();

    assert_eq!(extractor.page_count(), 1);

    let layout = extractor.page_layout(1).unwrap();
    let texts: Vec<_> = layout.text_boxes.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(
        texts,
        ["Account statement", "Date", "Amount", "Description", "01.03.2024", "-500.00", "Coffee shop"]
    );
    assert_eq!(layout.text_boxes[1].x, 50.0);
    assert_eq!(layout.text_boxes[1].y, 760.0);
    assert_eq!(layout.width, 595.0);
}

#[test]
fn test_parse_generated_statement() {
    let data = statement_pdf(&[
        ["02.03.2024", "1250.50", "Salary from employer"],
        ["31.02.2024", "100.00", "Refund"],
        ["01.03.2024", "-500.00", "Coffee shop payment"],
    ]);

    let result = StatementParser::new().parse_bytes(&data).unwrap();

    assert_eq!(result.transactions_count, 2);
    assert_eq!(result.document_pages, 1);
    assert_eq!(result.transactions[0].description, "Coffee shop payment");
    assert_eq!(result.transactions[0].amount, Decimal::from_str("-500.00").unwrap());
    assert_eq!(result.transactions[1].amount, Decimal::from_str("1250.50").unwrap());
    assert!(result.transactions.iter().all(|tx| tx.method == ExtractionMethod::Table));

    assert_eq!(result.rejected_rows_count, 1);
    let rejected = &result.rejected_rows[0];
    assert_eq!(rejected.source, ExtractorKind::GridTables);
    assert_eq!(rejected.reason, "Отсутствует дата");
    assert_eq!(rejected.page, Some(1));
    assert_eq!(rejected.headers, ["date", "amount", "description"]);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["transactions"][0]["date"], "2024-03-01");
    assert_eq!(json["transactions"][0]["method"], "table");
}

#[test]
fn test_document_without_pages() {
    let err = StatementParser::new().parse_bytes(&build_pdf(Vec::new())).unwrap_err();
    assert!(matches!(err, VypiskaError::Pdf(PdfError::NoPages)));
}

#[test]
fn test_winansi_en_dash_is_a_minus() {
    let data = statement_pdf(&[
        ["01.03.2024", "–500.00", "Coffee shop payment"],
        ["02.03.2024", "1250.50", "Salary from employer"],
    ]);

    let extractor = PdfExtractor::from_bytes(&data).unwrap();
    let layout = extractor.page_layout(1).unwrap();
    assert!(layout.text_boxes.iter().any(|b| b.text == "–500.00"));

    let result = StatementParser::new().parse_bytes(&data).unwrap();
    assert_eq!(result.transactions_count, 2);
    assert_eq!(result.rejected_rows_count, 0);
    assert_eq!(result.transactions[0].amount, Decimal::from_str("-500.00").unwrap());
}

#[test]
fn test_differences_encoding_decodes_cyrillic() {
    let operations = show("F2", 50, 700, vec![0xC4, 0xE0, 0xF2, 0xE0]);
    let data = build_pdf(vec![Content { operations }]);

    let extractor = PdfExtractor::from_bytes(&data).unwrap();
    assert_eq!(extractor.extract_page_text(1).unwrap(), "Дата");
}

#[test]
fn test_words_drawn_in_separate_text_objects() {
    let mut operations = statement_operations(&[]);
    operations.extend(text_at(50, 740, "01.03.2024"));
    operations.extend(text_at(200, 740, "-500.00"));
    operations.extend(text_at(350, 740, "Coffee"));
    operations.extend(text_at(383, 740, "shop"));
    operations.extend(text_at(408, 740, "payment"));
    let data = build_pdf(vec![Content { operations }]);

    let layout = PdfExtractor::from_bytes(&data).unwrap().page_layout(1).unwrap();
    assert!(layout.text_boxes.iter().any(|b| b.text == "Coffee shop payment"));

    let result = StatementParser::new().parse_bytes(&data).unwrap();
    assert_eq!(result.transactions_count, 1);
    assert_eq!(result.transactions[0].description, "Coffee shop payment");
}

#[test]
fn test_table_inside_form_xobject() {
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        },
        Content {
            operations: statement_operations(&[
                ["01.03.2024", "-500.00", "Coffee shop payment"],
                ["02.03.2024", "1250.50", "Salary from employer"],
            ]),
        }
        .encode()
        .unwrap(),
    );
    let logo = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0x00, 0xFF],
    );
    let page = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
            Operation::new("Do", vec![Object::Name(b"Fm1".to_vec())]),
        ],
    };
    let data = build_pdf_with_xobjects(vec![page], vec![("Im1", logo), ("Fm1", form)]);

    let result = StatementParser::new().parse_bytes(&data).unwrap();

    assert_eq!(result.transactions_count, 2);
    assert!(result.winning_strategy.as_deref().unwrap().starts_with("grid:"));
    assert_eq!(result.transactions[1].description, "Salary from employer");
}
