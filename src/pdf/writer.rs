//! Byte accumulator with cross-reference bookkeeping.
//!
//! [`PdfWriter`] owns the output buffer for exactly one document. Every
//! indirect object goes through [`PdfWriter::begin_object`], which records
//! the offset of its `"<n> 0 obj"` token before writing it, so the xref
//! table emitted by [`PdfWriter::finish`] cannot drift from the bytes.
//! Stream lengths are always taken from the body slice itself.

use crate::error::Snap2PdfError;

/// Free-list head entry for object 0.
const XREF_FREE_HEAD: &[u8] = b"0000000000 65535 f \n";

/// Growable PDF output buffer for a single build.
#[derive(Debug)]
pub struct PdfWriter {
    buf: Vec<u8>,
    /// `offsets[n]` is the start of object `n`; slot 0 is the free head.
    offsets: Vec<Option<usize>>,
    open_object: Option<usize>,
}

impl PdfWriter {
    /// Create a writer for a document whose objects are numbered `1..=highest_id`.
    pub fn new(highest_id: usize) -> Self {
        Self {
            buf: Vec::new(),
            offsets: vec![None; highest_id + 1],
            open_object: None,
        }
    }

    /// Append raw bytes.
    pub fn emit(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append ASCII PDF syntax.
    pub fn emit_str(&mut self, s: &str) {
        self.emit(s.as_bytes());
    }

    /// Offset of the next byte to be written, from the start of the buffer.
    pub fn current_offset(&self) -> usize {
        self.buf.len()
    }

    /// Record the current offset for object `id` and write its header.
    pub fn begin_object(&mut self, id: usize) -> Result<(), Snap2PdfError> {
        if let Some(open) = self.open_object {
            return Err(Snap2PdfError::encoding(format!(
                "object {} started while object {} is still open",
                id, open
            )));
        }
        let highest = self.offsets.len() - 1;
        if id == 0 || id > highest {
            return Err(Snap2PdfError::encoding(format!(
                "object number {} is outside 1..={}",
                id, highest
            )));
        }
        if self.offsets[id].is_some() {
            return Err(Snap2PdfError::encoding(format!("object {} written twice", id)));
        }

        self.offsets[id] = Some(self.current_offset());
        self.open_object = Some(id);
        self.emit_str(&format!("{} 0 obj\n", id));
        Ok(())
    }

    /// Close the currently open object.
    pub fn end_object(&mut self) -> Result<(), Snap2PdfError> {
        if self.open_object.take().is_none() {
            return Err(Snap2PdfError::encoding("endobj without an open object"));
        }
        self.emit(b"\nendobj\n");
        Ok(())
    }

    /// Write a complete non-stream object whose body is `dict`.
    pub fn write_object(&mut self, id: usize, dict: &str) -> Result<(), Snap2PdfError> {
        self.begin_object(id)?;
        self.emit_str(dict);
        self.end_object()
    }

    /// Write a complete stream object.
    ///
    /// `entries` are the dictionary entries other than `/Length`, which is
    /// always `body.len()`. The body is copied verbatim.
    pub fn write_stream_object(
        &mut self,
        id: usize,
        entries: &str,
        body: &[u8],
    ) -> Result<(), Snap2PdfError> {
        self.begin_object(id)?;
        if entries.is_empty() {
            self.emit_str(&format!("<< /Length {} >>\nstream\n", body.len()));
        } else {
            self.emit_str(&format!("<< {} /Length {} >>\nstream\n", entries, body.len()));
        }
        self.emit(body);
        self.emit(b"\nendstream");
        self.end_object()
    }

    /// Append the xref table and trailer and return the finished document.
    ///
    /// Fails if any object in `1..=highest_id` was never written or an
    /// object is still open.
    pub fn finish(mut self, root_id: usize) -> Result<Vec<u8>, Snap2PdfError> {
        if let Some(open) = self.open_object {
            return Err(Snap2PdfError::encoding(format!(
                "object {} was never closed",
                open
            )));
        }

        let offsets = std::mem::take(&mut self.offsets);
        let size = offsets.len();
        let xref_start = self.current_offset();

        self.emit_str(&format!("xref\n0 {}\n", size));
        self.emit(XREF_FREE_HEAD);
        for (id, offset) in offsets.iter().enumerate().skip(1) {
            let offset = offset.ok_or_else(|| {
                Snap2PdfError::encoding(format!("object {} has no recorded offset", id))
            })?;
            self.emit_str(&format!("{:010} 00000 n \n", offset));
        }

        self.emit_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF",
            size, root_id, xref_start
        ));

        Ok(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &[u8]) -> String {
        String::from_utf8_lossy(buf).into_owned()
    }

    #[test]
    fn offsets_point_at_object_headers() {
        let mut w = PdfWriter::new(2);
        w.emit(b"%PDF-1.4\n");
        w.write_object(1, "<< /Type /Catalog /Pages 2 0 R >>").unwrap();
        w.write_stream_object(2, "", b"\x00\xFFbinary").unwrap();
        let out = w.finish(1).unwrap();
        let s = text(&out);

        let xref = s.find("xref\n").unwrap();
        let entries: Vec<&str> = s[xref..].lines().skip(3).take(2).collect();
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert_eq!(&out[offset..offset + header.len()], header.as_bytes());
        }
    }

    #[test]
    fn xref_entries_are_twenty_bytes() {
        let mut w = PdfWriter::new(1);
        w.write_object(1, "<< >>").unwrap();
        let out = w.finish(1).unwrap();
        let s = text(&out);
        let xref = s.find("xref\n0 2\n").unwrap();
        let body = &out[xref + "xref\n0 2\n".len()..];
        assert_eq!(&body[..20], XREF_FREE_HEAD);
        assert_eq!(&body[20..40], b"0000000000 00000 n \n");
    }

    #[test]
    fn startxref_points_at_xref() {
        let mut w = PdfWriter::new(1);
        w.emit(b"%PDF-1.4\n");
        w.write_object(1, "<< >>").unwrap();
        let out = w.finish(1).unwrap();
        let s = text(&out);
        assert!(s.ends_with("%%EOF"));
        let tail = &s[s.rfind("startxref\n").unwrap() + "startxref\n".len()..];
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(s[offset..].starts_with("xref\n"));
    }

    #[test]
    fn stream_length_is_body_length() {
        let mut w = PdfWriter::new(1);
        w.write_stream_object(1, "/Filter /DCTDecode", b"12345").unwrap();
        let out = text(&w.finish(1).unwrap());
        assert!(out.contains("<< /Filter /DCTDecode /Length 5 >>\nstream\n12345\nendstream\nendobj\n"));
    }

    #[test]
    fn missing_object_fails_finish() {
        let mut w = PdfWriter::new(2);
        w.write_object(1, "<< >>").unwrap();
        assert!(matches!(w.finish(1), Err(Snap2PdfError::Encoding { .. })));
    }

    #[test]
    fn duplicate_and_out_of_range_ids_fail() {
        let mut w = PdfWriter::new(1);
        w.write_object(1, "<< >>").unwrap();
        assert!(w.write_object(1, "<< >>").is_err());
        assert!(w.begin_object(0).is_err());
        assert!(w.begin_object(2).is_err());
    }

    #[test]
    fn unbalanced_objects_fail() {
        let mut w = PdfWriter::new(2);
        w.begin_object(1).unwrap();
        assert!(w.begin_object(2).is_err());
        w.end_object().unwrap();
        assert!(w.end_object().is_err());
    }
}
