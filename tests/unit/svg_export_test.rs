//! Unit tests for the vector surface and SVG export
//!
//! The exported document is checked with an XML reader, not by string
//! comparison alone.

use chrono::{TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use svgtrace::surface::{export_filename, SvgPath, Surfaces, VectorSurface, GENERATOR_COMMENT};

/// Names of the start/empty elements in document order, plus the comment text
fn scan(document: &str) -> (Vec<String>, Vec<String>) {
    let mut reader = Reader::from_str(document);
    let mut elements = Vec::new();
    let mut comments = Vec::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) => {
                elements.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
            }
            Event::Comment(text) => {
                comments.push(String::from_utf8(text.to_vec()).unwrap());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    (elements, comments)
}

fn attribute(document: &str, element: &str, key: &str) -> Option<String> {
    let mut reader = Reader::from_str(document);
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == element.as_bytes() => {
                return e
                    .try_get_attribute(key)
                    .unwrap()
                    .map(|attr| attr.unescape_value().unwrap().into_owned());
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod svg_export_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_is_well_formed() {
        let vector = VectorSurface::new("svg", 32, 24);
        vector.prepend(SvgPath::new("M0 0 L4 0 L4 4 Z", "#112233", (1.0, 1.0)));
        vector.prepend(SvgPath::new("M0 0 L2 0 L2 2 Z", "#445566", (8.0, 8.0)));

        let document = vector.export_document();
        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));

        let (elements, comments) = scan(&document);
        assert_eq!(elements, vec!["svg", "path", "path"]);
        assert_eq!(
            format!("<!--{}-->", comments[0]),
            GENERATOR_COMMENT.to_string()
        );

        assert_eq!(
            attribute(&document, "svg", "viewBox").as_deref(),
            Some("0 0 32 24")
        );
        assert_eq!(
            attribute(&document, "svg", "xmlns").as_deref(),
            Some("http://www.w3.org/2000/svg")
        );
    }

    #[test]
    fn test_most_recent_path_comes_first() {
        let vector = VectorSurface::new("svg", 4, 4);
        vector.prepend(SvgPath::new("M0 0", "#000000", (0.0, 0.0)));
        vector.prepend(SvgPath::new("M1 1", "#ffffff", (0.0, 0.0)));

        let document = vector.export_document();
        assert_eq!(attribute(&document, "path", "d").as_deref(), Some("M1 1"));
    }

    #[test]
    fn test_empty_surface_exports_empty_svg() {
        let surfaces = Surfaces::new();
        let vector = surfaces.attach_vector("svg", 5, 7);

        let (elements, _) = scan(&vector.export_document());
        assert_eq!(elements, vec!["svg"]);
        assert_eq!(
            attribute(&vector.export_document(), "svg", "height").as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_markup_has_no_prolog() {
        let vector = VectorSurface::new("svg", 1, 1);
        assert!(vector.markup().starts_with("<svg"));
    }

    #[test]
    fn test_export_filename() {
        let at = Utc.with_ymd_and_hms(2020, 10, 5, 14, 23, 1).unwrap();
        assert_eq!(export_filename(at), "export-2020-10-05T142301.svg");

        let midnight = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(export_filename(midnight), "export-1999-12-31T000000.svg");
    }
}
