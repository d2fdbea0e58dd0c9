//! Widget annotation, appearance stream, and incremental page update.

use super::serialize::write_value;
use super::utils::{find_page_by_number, pdf_string};
use super::SignContext;
use crate::error::{SignResult, SignatureError};
use crate::object::format_real;
use crate::types::Rectangle;
use bitflags::bitflags;

bitflags! {
    /// PDF annotation flags (ISO 32000 table 165).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct AnnotationFlags: u32 {
        const INVISIBLE       = 1 << 0;
        const HIDDEN          = 1 << 1;
        const PRINT           = 1 << 2;
        const NO_ZOOM         = 1 << 3;
        const NO_ROTATE       = 1 << 4;
        const NO_VIEW         = 1 << 5;
        const READ_ONLY       = 1 << 6;
        const LOCKED          = 1 << 7;
        const TOGGLE_NO_VIEW  = 1 << 8;
        const LOCKED_CONTENTS = 1 << 9;
    }
}

impl SignContext<'_> {
    /// Builds the signature widget annotation. For visible signatures the
    /// appearance XObject is appended first so the widget can reference it.
    pub(crate) fn create_visual_signature(
        &mut self,
        visible: bool,
        page_number: u32,
        rect: Rectangle,
    ) -> SignResult<Vec<u8>> {
        let mut buf = Vec::new();

        buf.extend_from_slice(b"<<\n");
        buf.extend_from_slice(b"  /Type /Annot\n");
        buf.extend_from_slice(b"  /Subtype /Widget\n");

        if visible {
            buf.extend_from_slice(
                format!(
                    "  /Rect [{} {} {} {}]\n",
                    format_real(rect.lower_left_x),
                    format_real(rect.lower_left_y),
                    format_real(rect.upper_right_x),
                    format_real(rect.upper_right_y),
                )
                .as_bytes(),
            );

            let appearance = self.create_appearance(rect)?;
            let appearance_id = self.add_object(&appearance)?;
            buf.extend_from_slice(format!("  /AP << /N {} 0 R >>\n", appearance_id).as_bytes());
        } else {
            buf.extend_from_slice(b"  /Rect [0 0 0 0]\n");
        }

        let root = self.reader.trailer().key("Root");
        let root_ptr = root.ptr();
        self.catalog_data.root_string = root_ptr.reference_string();

        if root.keys().iter().any(|k| k == "Pages") {
            let page = find_page_by_number(root.key("Pages"), page_number)?;
            let page_ptr = page.ptr();
            self.visual_sign_data.page_object_id = page_ptr.number;
            buf.extend_from_slice(
                format!("  /P {}\n", page_ptr.reference_string()).as_bytes(),
            );
        }

        let flags = AnnotationFlags::PRINT | AnnotationFlags::LOCKED;
        buf.extend_from_slice(format!("  /F {}\n", flags.bits()).as_bytes());
        buf.extend_from_slice(b"  /FT /Sig\n");

        buf.extend_from_slice(b"  /T ");
        buf.extend_from_slice(&pdf_string(&format!(
            "Signature {}",
            self.existing_signatures.len() + 1
        )));
        buf.push(b'\n');

        buf.extend_from_slice(format!("  /V {} 0 R\n", self.signature_object_id).as_bytes());
        buf.extend_from_slice(b">>\n");

        Ok(buf)
    }

    /// Builds a new revision of the page dictionary with the widget added
    /// to its `/Annots` array. Every other key is carried over.
    pub(crate) fn create_inc_page_update(
        &mut self,
        page_number: u32,
        annot_id: u32,
    ) -> SignResult<Vec<u8>> {
        let root = self.reader.trailer().key("Root");
        let page = find_page_by_number(root.key("Pages"), page_number)?;
        let page_id = page.ptr().number;

        let mut buf = Vec::new();
        buf.extend_from_slice(b"<<\n");

        for key in page.keys() {
            match key.as_str() {
                "Contents" | "Parent" => {
                    let ptr = page.key(&key).ptr();
                    buf.extend_from_slice(
                        format!("  /{} {}\n", key, ptr.reference_string()).as_bytes(),
                    );
                }
                "Annots" => {
                    buf.extend_from_slice(b"  /Annots [\n");
                    let annots = page.key("Annots");
                    for i in 0..annots.len() {
                        let ptr = annots.index(i).ptr();
                        buf.extend_from_slice(
                            format!("    {}\n", ptr.reference_string()).as_bytes(),
                        );
                    }
                    buf.extend_from_slice(format!("    {} 0 R\n", annot_id).as_bytes());
                    buf.extend_from_slice(b"  ]\n");
                }
                _ => {
                    buf.extend_from_slice(format!("  /{} ", key).as_bytes());
                    write_value(&mut buf, page_id, &page.key(&key))?;
                    buf.push(b'\n');
                }
            }
        }

        if page.key("Annots").is_null() {
            buf.extend_from_slice(format!("  /Annots [{} 0 R]\n", annot_id).as_bytes());
        }

        buf.extend_from_slice(b">>\n");
        Ok(buf)
    }

    /// Builds the appearance form XObject: the signer's name as a single
    /// line of Times-Roman.
    pub(crate) fn create_appearance(&self, rect: Rectangle) -> SignResult<Vec<u8>> {
        let text = self.sign_data.info.name.clone();

        let rect_width = rect.width();
        let rect_height = rect.height();

        if rect_width < 1.0 || rect_height < 1.0 {
            return Err(SignatureError::InvalidRectangle {
                width: rect_width,
                height: rect_height,
            }
            .into());
        }

        // Width estimation counts UTF-8 bytes, not glyphs.
        let text_len = text.len() as f64;
        let mut font_size = rect_height * 0.8;
        if text_len * font_size * 0.5 > rect_width {
            font_size = rect_width / (text_len * 0.5);
        }

        let mut stream = Vec::new();
        stream.extend_from_slice(b"q\n");
        stream.extend_from_slice(b"BT\n");
        stream.extend_from_slice(format!("/F1 {:.2} Tf\n", font_size).as_bytes());
        stream.extend_from_slice(format!("0 {:.2} Td\n", rect_height - font_size).as_bytes());
        stream.extend_from_slice(b"0.2 0.2 0.6 rg\n");
        stream.extend_from_slice(&pdf_string(&text));
        stream.extend_from_slice(b" Tj\n");
        stream.extend_from_slice(b"ET\n");
        stream.extend_from_slice(b"Q\n");

        let mut buf = Vec::new();
        buf.extend_from_slice(b"<<\n");
        buf.extend_from_slice(b"  /Type /XObject\n");
        buf.extend_from_slice(b"  /Subtype /Form\n");
        buf.extend_from_slice(
            format!(
                "  /BBox [0 0 {} {}]\n",
                format_real(rect_width),
                format_real(rect_height)
            )
            .as_bytes(),
        );
        buf.extend_from_slice(b"  /Matrix [1 0 0 1 0 0]\n");
        buf.extend_from_slice(b"  /Resources <<\n");
        buf.extend_from_slice(b"   /Font <<\n");
        buf.extend_from_slice(b"     /F1 <<\n");
        buf.extend_from_slice(b"       /Type /Font\n");
        buf.extend_from_slice(b"       /Subtype /Type1\n");
        buf.extend_from_slice(b"       /BaseFont /Times-Roman\n");
        buf.extend_from_slice(b"     >>\n");
        buf.extend_from_slice(b"   >>\n");
        buf.extend_from_slice(b"  >>\n");
        buf.extend_from_slice(b"  /FormType 1\n");
        buf.extend_from_slice(format!("  /Length {}\n", stream.len()).as_bytes());
        buf.extend_from_slice(b">>\n");
        buf.extend_from_slice(b"stream\n");
        buf.extend_from_slice(&stream);
        buf.extend_from_slice(b"endstream\n");

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PdfReader;
    use crate::signer::{test_support, SignContext};

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_annotation_flags_print_locked() {
        let flags = AnnotationFlags::PRINT | AnnotationFlags::LOCKED;
        assert_eq!(flags.bits(), 132);
    }

    #[test]
    fn test_appearance_font_size_counts_utf8_bytes() {
        let reader = PdfReader::from_bytes(test_support::minimal_pdf()).unwrap();
        let mut sign_data = test_support::test_sign_data(vec![0x5A; 64]);
        sign_data.info.name = "Zo\u{eb}".to_string();
        let context = SignContext::new(&reader, sign_data);

        // "Zoë" is 4 UTF-8 bytes: 4 * 24.0 * 0.5 exceeds the 40pt width,
        // so the size clamps to 40 / (4 * 0.5). A codepoint count would
        // have left the size at 24.
        let appearance = context
            .create_appearance(Rectangle::new(0.0, 0.0, 40.0, 30.0))
            .unwrap();
        assert!(contains(&appearance, b"/F1 20.00 Tf"));
        assert!(!contains(&appearance, b"/F1 24.00 Tf"));
    }

    #[test]
    fn test_appearance_font_size_fits_short_names() {
        let reader = PdfReader::from_bytes(test_support::minimal_pdf()).unwrap();
        let mut sign_data = test_support::test_sign_data(vec![0x5A; 64]);
        sign_data.info.name = "Jo".to_string();
        let context = SignContext::new(&reader, sign_data);

        // 2 bytes at 0.5 width ratio fit easily: the size stays at
        // height * 0.8.
        let appearance = context
            .create_appearance(Rectangle::new(0.0, 0.0, 200.0, 50.0))
            .unwrap();
        assert!(contains(&appearance, b"/F1 40.00 Tf"));
    }
}
