//! In-memory PDFs for tests.
//!
//! Pages are US Letter (612 x 792 pt) unless a fixture says otherwise. Every
//! page shares one resource dictionary: Helvetica as `/F1`, an Identity-H
//! composite font with a `/ToUnicode` map as `/F2`, and a form XObject
//! `/Fm1` that draws "Hidden in form" at (72, 720).

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

const LETTER: [i64; 4] = [0, 0, 612, 792];

/// Maps codes <0024> and <0025> of `/F2` to "A" and "B".
const TO_UNICODE: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0024> <0041>
<0025> <0042>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// Single-page PDF with a raw content stream.
pub fn pdf_with_content(content: &[u8]) -> Vec<u8> {
    build(LETTER, &[content.to_vec()])
}

/// Single-page PDF with a raw content stream and a custom MediaBox.
pub fn pdf_with_media_box(media_box: [i64; 4], content: &[u8]) -> Vec<u8> {
    build(media_box, &[content.to_vec()])
}

/// One page per entry, each drawing its text at (72, 720) in 12 pt.
pub fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = texts
        .iter()
        .map(|text| format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", escape(text)).into_bytes())
        .collect();
    build(LETTER, &contents)
}

/// One page per entry with two text runs: a header line at y=720 and a body
/// line at y=600. Canvas coordinates of the header are roughly y 62..75,
/// the body roughly y 182..195.
pub fn pdf_with_header_and_body(pages: &[(&str, &str)]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = pages
        .iter()
        .map(|(header, body)| {
            format!(
                "BT /F1 12 Tf 72 720 Td ({}) Tj ET BT /F1 12 Tf 72 600 Td ({}) Tj ET",
                escape(header),
                escape(body)
            )
            .into_bytes()
        })
        .collect();
    build(LETTER, &contents)
}

/// Page whose only text lives inside the `/Fm1` form XObject.
pub fn pdf_with_form_xobject() -> Vec<u8> {
    pdf_with_content(b"q /Fm1 Do Q")
}

/// Page showing codes <0024><0025> in the composite `/F2` font ("AB").
pub fn pdf_with_composite_font() -> Vec<u8> {
    pdf_with_content(b"BT /F2 12 Tf 72 720 Td <00240025> Tj ET")
}

pub fn write_pdf(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

fn shared_resources(doc: &mut Document) -> Object {
    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let to_unicode = doc.add_object(Stream::new(dictionary! {}, TO_UNICODE.as_bytes().to_vec()));
    let descendant = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "ClipSans",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "DW" => 600,
    });
    let composite = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ClipSans",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant)],
        "ToUnicode" => Object::Reference(to_unicode),
    });

    let fonts = dictionary! {
        "F1" => Object::Reference(helvetica),
        "F2" => Object::Reference(composite),
    };

    let form = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => fonts.clone() },
        },
        b"BT /F1 12 Tf 72 720 Td (Hidden in form) Tj ET".to_vec(),
    ));

    Object::Dictionary(dictionary! {
        "Font" => fonts,
        "XObject" => dictionary! { "Fm1" => Object::Reference(form) },
    })
}

fn build(media_box: [i64; 4], contents: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let resources = shared_resources(&mut doc);
    let media_box: Vec<Object> = media_box.iter().map(|&v| Object::Integer(v)).collect();

    let page_ids: Vec<ObjectId> = contents
        .iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => resources.clone(),
            })
        })
        .collect();

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_ids.len() as i64),
    });

    for &page_id in &page_ids {
        if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("in-memory PDF should serialize");
    buf
}
