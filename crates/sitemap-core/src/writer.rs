//! `<urlset>` serialization.
//!
//! Produces one sitemap file:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
//!         xmlns:xhtml="http://www.w3.org/1999/xhtml">
//!   <url>
//!     <loc>https://data.example.org/dataset/census</loc>
//!     <lastmod>2024-03-09</lastmod>
//!     <xhtml:link rel="alternate" hreflang="fr" href="https://data.example.org/fr/dataset/census"/>
//!   </url>
//! </urlset>
//! ```

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::entry::UrlEntry;

/// Namespace of the sitemaps.org protocol.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Namespace of `xhtml:link` language alternates.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Serialize `entries` as a pretty-printed UTF-8 `<urlset>` document.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn render_urlset(entries: &[UrlEntry]) -> io::Result<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("urlset");
    root.push_attribute(("xmlns", SITEMAP_NS));
    root.push_attribute(("xmlns:xhtml", XHTML_NS));
    writer.write_event(Event::Start(root))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.location)?;
        write_text_element(
            &mut writer,
            "lastmod",
            &entry.last_modified.format("%Y-%m-%d").to_string(),
        )?;
        for alternate in &entry.alternates {
            let mut link = BytesStart::new("xhtml:link");
            link.push_attribute(("rel", "alternate"));
            link.push_attribute(("hreflang", alternate.language.as_str()));
            link.push_attribute(("href", alternate.href.as_str()));
            writer.write_event(Event::Empty(link))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(finish(writer))
}

/// Create an indenting writer with the XML declaration already written.
pub(crate) fn new_writer() -> io::Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

/// Write `<name>text</name>` with `text` escaped.
pub(crate) fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Take the buffer out of the writer, terminated by a newline.
pub(crate) fn finish(writer: Writer<Vec<u8>>) -> Vec<u8> {
    let mut out = writer.into_inner();
    out.push(b'\n');
    out
}
