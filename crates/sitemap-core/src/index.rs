//! `<sitemapindex>` serialization.

use std::io;

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::store::file_name;
use crate::writer::{SITEMAP_NS, finish, new_writer, write_text_element};

/// Serialize the index referencing files `0..file_count` under `site_root`.
///
/// Each file is listed as `<site_root>/sitemap-<i>.xml`.
pub fn render_index(site_root: &str, file_count: usize) -> io::Result<Vec<u8>> {
    let site_root = site_root.trim_end_matches('/');
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("sitemapindex");
    root.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(root))?;

    for i in 0..file_count {
        writer.write_event(Event::Start(BytesStart::new("sitemap")))?;
        write_text_element(&mut writer, "loc", &format!("{site_root}/{}", file_name(i)))?;
        writer.write_event(Event::End(BytesEnd::new("sitemap")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sitemapindex")))?;
    Ok(finish(writer))
}
