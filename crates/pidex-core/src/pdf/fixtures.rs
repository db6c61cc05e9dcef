//! In-memory PDF documents for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Content of one fixture page.
pub(crate) enum FixturePage {
    /// Text runs at `(x, y)` in 10pt Helvetica.
    Text(Vec<(String, i64, i64)>),
    /// A raw, unvalidated content stream.
    Raw(Vec<u8>),
}

impl FixturePage {
    pub(crate) fn text(runs: &[(&str, i64, i64)]) -> Self {
        FixturePage::Text(
            runs.iter()
                .map(|(text, x, y)| (text.to_string(), *x, *y))
                .collect(),
        )
    }

    /// One run per line of `text`, starting at `top` and 14 units apart.
    pub(crate) fn lines(text: &str, top: i64) -> Self {
        FixturePage::Text(
            text.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| (line.trim().to_string(), 50, top - 14 * i as i64))
                .collect(),
        )
    }

    pub(crate) fn raw(content: Vec<u8>) -> Self {
        FixturePage::Raw(content)
    }

    fn content(&self) -> Vec<u8> {
        match self {
            FixturePage::Raw(bytes) => bytes.clone(),
            FixturePage::Text(runs) => {
                let mut operations = Vec::new();
                for (text, x, y) in runs {
                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
                    operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                    operations.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
                    operations.push(Operation::new("ET", vec![]));
                }
                Content { operations }.encode().unwrap()
            }
        }
    }
}

/// Build a PDF with one page per fixture.
pub(crate) fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.content()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
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

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
