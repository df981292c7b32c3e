//! HTML extraction for listings, details, chapters, and page images.
//!
//! Each operation reads a fixed selector path. Missing mandatory nodes are reported as
//! [SourceError::Parse]; the only tolerated absence is the latest listing's pagination link.

use crate::model::{Chapter, ContentDetails, ListingSummary, PageImage};
use crate::source::error::SourceError;
use crate::source::normalize::{parse_date, parse_status, strip_label, strip_language_tag};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

const POPULAR_ITEM: &str = "div#maisLidos div.itemmanga";
const LATEST_ITEM: &str = "div.col-sm-12.atualizacao > div.row";
const LATEST_TITLE: &str = "div.col-sm-10.col-xs-8 h3";
const LATEST_THUMB: &str = "a:first-child div img";
const LATEST_LINK: &str = "a:first-child";
const LATEST_NEXT_PAGE: &str = "ul.pagination li:last-child a";
const SEARCH_ITEM: &str = "div.mangas.col-lg-2 a";

const DETAILS_INFO: &str = "div.row > div.col-sm-8 > div.row";
const DETAILS_IMAGE: &str = "div.col-sm-4.text-right > img";
const DETAILS_COLUMN: &str = "div.col-sm-8";
const DETAILS_TITLE: &str = "h2:first-child";
const DETAILS_DESCRIPTION: &str = "#manga_capitulo_descricao";

const CHAPTER_ROW: &str = "ul#capitulos li.row";
const CHAPTER_NAME_COLUMN: &str = "a > div.col-sm-5";
const CHAPTER_CREDITS: &str = "div.col-sm-5.text-right a:not([href^='/'])";
const CHAPTER_DATE: &str = "span[style]";

const PAGES_CONTAINER: &str = "div.col-sm-12[id^='capitulos_images']";
const PAGE_IMAGE: &str = "img[pag]";
const TEXT_BLOCK_MARKER: &str = ".block_text_border";

const LOW_RES_THUMB: &str = "w=100&h=140";
const HIGH_RES_THUMB: &str = "w=380&h=600";

/// A parsed HTML page together with the URL it was loaded from.
pub struct Document {
    html: Html,
    url: Url,
}

impl Document {
    pub fn parse(body: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Resolve an attribute value against the document URL; empty when missing or unresolvable.
    fn abs_url(&self, value: Option<&str>) -> String {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| self.url.join(v).ok())
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Which listing a document came from; each has its own item layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Popular,
    Latest,
    Search,
}

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, SourceError> {
    Selector::parse(sel).map_err(|e| SourceError::parse(format!("invalid selector {:?}: {}", sel, e)))
}

/// Element text with whitespace runs collapsed, trimmed.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of several elements joined by a space, empty ones skipped.
fn joined_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    what: &str,
) -> Result<ElementRef<'a>, SourceError> {
    scope
        .select(selector)
        .next()
        .ok_or_else(|| SourceError::parse(format!("missing {}", what)))
}

/// `h5` headings in `column` whose text contains `label`, compared case-insensitively.
fn labelled_headings<'a>(
    column: ElementRef<'a>,
    heading: &Selector,
    label: &str,
) -> Vec<ElementRef<'a>> {
    let label = label.to_lowercase();
    column
        .select(heading)
        .filter(|h| text_of(*h).to_lowercase().contains(&label))
        .collect()
}

pub fn extract_listing(
    doc: &Document,
    kind: ListingKind,
) -> Result<Vec<ListingSummary>, SourceError> {
    let entries = match kind {
        ListingKind::Popular => extract_grid_items(doc, POPULAR_ITEM)?,
        ListingKind::Search => extract_grid_items(doc, SEARCH_ITEM)?,
        ListingKind::Latest => extract_latest_items(doc)?,
    };
    tracing::debug!(?kind, count = entries.len(), "extracted listing");
    Ok(entries)
}

/// Popular and search listings are single pages; latest advertises more via its pagination bar.
pub fn has_next_page(doc: &Document, kind: ListingKind) -> Result<bool, SourceError> {
    match kind {
        ListingKind::Popular | ListingKind::Search => Ok(false),
        ListingKind::Latest => {
            let next = parse_selector(LATEST_NEXT_PAGE)?;
            Ok(doc.html.select(&next).next().is_some())
        }
    }
}

fn extract_grid_items(doc: &Document, item_sel: &str) -> Result<Vec<ListingSummary>, SourceError> {
    let item = parse_selector(item_sel)?;
    let heading = parse_selector("h3")?;
    let image = parse_selector("img")?;
    let anchor = parse_selector("a[href]")?;
    doc.html
        .select(&item)
        .map(|element| -> Result<ListingSummary, SourceError> {
            let title = text_of(first(element, &heading, "listing title (h3)")?);
            let thumb = first(element, &image, "listing thumbnail (img)")?;
            let url = element
                .value()
                .attr("href")
                .or_else(|| enclosing_href(element))
                .or_else(|| {
                    element
                        .select(&anchor)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                })
                .unwrap_or_default();
            Ok(ListingSummary {
                title: strip_language_tag(&title),
                thumbnail_url: doc.abs_url(thumb.value().attr("src")),
                url: url.to_string(),
            })
        })
        .collect()
}

/// `href` of the nearest `<a>` wrapping `element`.
fn enclosing_href<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

fn extract_latest_items(doc: &Document) -> Result<Vec<ListingSummary>, SourceError> {
    let item = parse_selector(LATEST_ITEM)?;
    let title_sel = parse_selector(LATEST_TITLE)?;
    let thumb_sel = parse_selector(LATEST_THUMB)?;
    let link_sel = parse_selector(LATEST_LINK)?;
    doc.html
        .select(&item)
        .map(|element| -> Result<ListingSummary, SourceError> {
            let info = first(element, &title_sel, "latest title")?;
            let thumb = first(element, &thumb_sel, "latest thumbnail")?;
            let url = element
                .select(&link_sel)
                .find_map(|a| a.value().attr("href"))
                .unwrap_or_default();
            Ok(ListingSummary {
                title: strip_language_tag(&text_of(info)),
                thumbnail_url: doc
                    .abs_url(thumb.value().attr("src"))
                    .replace(LOW_RES_THUMB, HIGH_RES_THUMB),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Details from the two-column info block. An empty title is returned as-is; staleness is
/// decided by [guard_details](crate::source::guard_details).
pub fn extract_details(doc: &Document) -> Result<ContentDetails, SourceError> {
    let info_sel = parse_selector(DETAILS_INFO)?;
    let image_sel = parse_selector(DETAILS_IMAGE)?;
    let column_sel = parse_selector(DETAILS_COLUMN)?;
    let title_sel = parse_selector(DETAILS_TITLE)?;
    let h5 = parse_selector("h5")?;
    let link = parse_selector("a")?;
    let description_sel = parse_selector(DETAILS_DESCRIPTION)?;

    let info = doc
        .html
        .select(&info_sel)
        .next()
        .ok_or_else(|| SourceError::parse("missing details info block"))?;
    let image = first(info, &image_sel, "details cover image")?;
    let column = first(info, &column_sel, "details info column")?;

    let title = strip_language_tag(&joined_text(column.select(&title_sel)));
    let author = strip_label(&joined_text(
        labelled_headings(column, &h5, "Autor").into_iter(),
    ));
    let artist = strip_label(&joined_text(
        labelled_headings(column, &h5, "Artista").into_iter(),
    ));
    let genres = labelled_headings(column, &h5, "Genero")
        .into_iter()
        .flat_map(|h| h.select(&link))
        .map(text_of)
        .filter(|g| !g.is_empty())
        .collect();
    let status = parse_status(&joined_text(
        labelled_headings(column, &h5, "Status")
            .into_iter()
            .flat_map(|h| h.select(&link)),
    ));
    let description = joined_text(doc.html.select(&description_sel));

    Ok(ContentDetails {
        title,
        author,
        artist,
        genres,
        status,
        description,
        thumbnail_url: doc.abs_url(image.value().attr("src")),
    })
}

/// Chapter rows in site order. Any row without a name column fails the whole list.
pub fn extract_chapters(doc: &Document) -> Result<Vec<Chapter>, SourceError> {
    let row_sel = parse_selector(CHAPTER_ROW)?;
    let name_sel = parse_selector(CHAPTER_NAME_COLUMN)?;
    let credits_sel = parse_selector(CHAPTER_CREDITS)?;
    let date_sel = parse_selector(CHAPTER_DATE)?;
    let link = parse_selector("a")?;

    let chapters = doc
        .html
        .select(&row_sel)
        .map(|row| -> Result<Chapter, SourceError> {
            let name_column = first(row, &name_sel, "chapter name column")?;
            let full_name = text_of(name_column);
            let name = match full_name.split_once('(') {
                Some((before, _)) => before,
                None => full_name.as_str(),
            };
            let scanlator = row
                .select(&credits_sel)
                .map(text_of)
                .collect::<Vec<_>>()
                .join(", ");
            let url = row
                .select(&link)
                .find_map(|a| a.value().attr("href"))
                .unwrap_or_default();
            Ok(Chapter {
                name: name.trim().to_string(),
                scanlator,
                upload_timestamp: parse_date(&joined_text(name_column.select(&date_sel))),
                url: url.to_string(),
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;
    tracing::debug!(count = chapters.len(), "extracted chapters");
    Ok(chapters)
}

/// Page images in document order. A chapter published as text has no image container but
/// carries a text-block marker; that case is [SourceError::ChapterIsTextOnly].
pub fn extract_pages(doc: &Document) -> Result<Vec<PageImage>, SourceError> {
    let container_sel = parse_selector(PAGES_CONTAINER)?;
    let image_sel = parse_selector(PAGE_IMAGE)?;
    let marker_sel = parse_selector(TEXT_BLOCK_MARKER)?;

    let container = doc
        .html
        .select(&container_sel)
        .find(|c| c.select(&image_sel).next().is_some());
    let Some(container) = container else {
        if doc.html.select(&marker_sel).next().is_some() {
            return Err(SourceError::ChapterIsTextOnly);
        }
        return Err(SourceError::parse("missing chapter images container"));
    };

    let document_url = doc.url.to_string();
    let pages: Vec<PageImage> = container
        .select(&image_sel)
        .enumerate()
        .map(|(index, img)| PageImage {
            index,
            document_url: document_url.clone(),
            image_url: doc.abs_url(img.value().attr("src")),
        })
        .collect();
    tracing::debug!(count = pages.len(), url = %doc.url, "extracted pages");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn doc(html: &str, url: &str) -> Document {
        Document::parse(html, Url::parse(url).unwrap())
    }

    const POPULAR_HTML: &str = r#"<html><body>
<div id="maisLidos">
  <a href="/mangabr/one-piece"><div class="itemmanga">
    <img src="/timthumb.php?src=one-piece.jpg"><h3>One Piece (Pt-br)</h3>
  </div></a>
  <div class="itemmanga" href="/mangabr/berserk">
    <img src="https://cdn.goldenmanga.top/berserk.jpg"><h3> Berserk </h3>
  </div>
</div>
</body></html>"#;

    #[test]
    fn popular_items_strip_tags_and_resolve_thumbnails() -> Result<(), SourceError> {
        let d = doc(POPULAR_HTML, "https://goldenmanga.top/");
        let items = extract_listing(&d, ListingKind::Popular)?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "One Piece");
        assert_eq!(items[0].url, "/mangabr/one-piece");
        assert_eq!(
            items[0].thumbnail_url,
            "https://goldenmanga.top/timthumb.php?src=one-piece.jpg"
        );
        assert_eq!(items[1].title, "Berserk");
        assert_eq!(items[1].url, "/mangabr/berserk");
        assert_eq!(
            items[1].thumbnail_url,
            "https://cdn.goldenmanga.top/berserk.jpg"
        );
        assert!(!has_next_page(&d, ListingKind::Popular)?);
        Ok(())
    }

    #[test]
    fn popular_item_without_heading_is_parse_error() {
        let html = r#"<div id="maisLidos"><div class="itemmanga"><img src="/a.jpg"></div></div>"#;
        let d = doc(html, "https://goldenmanga.top/");
        let result = extract_listing(&d, ListingKind::Popular);
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }

    const LATEST_HTML: &str = r#"<html><body>
<div class="col-sm-12 atualizacao">
  <div class="row">
    <a href="/mangabr/solo-leveling"><div><img src="/timthumb.php?src=solo.jpg&w=100&h=140"></div></a>
    <div class="col-sm-10 col-xs-8"><h3>Solo Leveling (SCAN)</h3></div>
  </div>
  <div class="row">
    <a href="/mangabr/naruto"><div><img src="/timthumb.php?src=naruto.jpg&w=100&h=140"></div></a>
    <div class="col-sm-10 col-xs-8"><h3>Naruto</h3></div>
  </div>
</div>
<ul class="pagination"><li><a href="?pagina=1">1</a></li><li><a href="?pagina=2">&raquo;</a></li></ul>
</body></html>"#;

    #[test]
    fn latest_items_use_high_resolution_thumbnails() -> Result<(), SourceError> {
        let d = doc(LATEST_HTML, "https://goldenmanga.top/");
        let items = extract_listing(&d, ListingKind::Latest)?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Solo Leveling");
        assert_eq!(items[0].url, "/mangabr/solo-leveling");
        assert_eq!(
            items[0].thumbnail_url,
            "https://goldenmanga.top/timthumb.php?src=solo.jpg&w=380&h=600"
        );
        assert_eq!(items[1].title, "Naruto");
        assert!(has_next_page(&d, ListingKind::Latest)?);
        Ok(())
    }

    #[test]
    fn latest_without_pagination_is_last_page() -> Result<(), SourceError> {
        let html = r#"<div class="col-sm-12 atualizacao"></div>"#;
        let d = doc(html, "https://goldenmanga.top/index.php?pagina=9");
        assert!(extract_listing(&d, ListingKind::Latest)?.is_empty());
        assert!(!has_next_page(&d, ListingKind::Latest)?);
        Ok(())
    }

    #[test]
    fn search_items_never_paginate() -> Result<(), SourceError> {
        let html = r#"<div class="mangas col-lg-2"><a href="/mangabr/bleach">
<img src="/img/bleach.jpg"><h3>Bleach (Pt/Br)</h3></a></div>
<ul class="pagination"><li><a href="?p=2">2</a></li></ul>"#;
        let d = doc(html, "https://goldenmanga.top/mangas?busca=bleach");
        let items = extract_listing(&d, ListingKind::Search)?;
        assert_eq!(
            items,
            vec![ListingSummary {
                title: "Bleach".to_string(),
                thumbnail_url: "https://goldenmanga.top/img/bleach.jpg".to_string(),
                url: "/mangabr/bleach".to_string(),
            }]
        );
        assert!(!has_next_page(&d, ListingKind::Search)?);
        Ok(())
    }

    const DETAILS_HTML: &str = r#"<html><body>
<div class="row"><div class="col-sm-8"><div class="row">
  <div class="col-sm-4 text-right"><img src="/mm-admin/uploads/capa.jpg"></div>
  <div class="col-sm-8">
    <h2>One Piece (Pt-br)</h2>
    <h5><strong>Autor:</strong> Eiichiro Oda</h5>
    <h5><strong>Artista:</strong> Eiichiro Oda</h5>
    <h5><strong>Genero:</strong> <a href="/g/acao">Ação</a>, <a href="/g/x"></a><a href="/g/aventura">Aventura</a>, <a href="/g/acao">Ação</a></h5>
    <h5><strong>Status:</strong> <a href="/s/ativo">Ativo</a></h5>
  </div>
</div></div></div>
<div id="manga_capitulo_descricao"> Luffy quer ser o
  Rei dos Piratas. </div>
</body></html>"#;

    #[test]
    fn details_fields_follow_labels() -> Result<(), SourceError> {
        let d = doc(DETAILS_HTML, "https://goldenmanga.top/mangabr/one-piece");
        let details = extract_details(&d)?;
        assert_eq!(details.title, "One Piece");
        assert_eq!(details.author, "Eiichiro Oda");
        assert_eq!(details.artist, "Eiichiro Oda");
        assert_eq!(details.genres, vec!["Ação", "Aventura", "Ação"]);
        assert_eq!(details.genre(), "Ação, Aventura, Ação");
        assert_eq!(details.status, Status::Ongoing);
        assert_eq!(details.description, "Luffy quer ser o Rei dos Piratas.");
        assert_eq!(
            details.thumbnail_url,
            "https://goldenmanga.top/mm-admin/uploads/capa.jpg"
        );
        Ok(())
    }

    #[test]
    fn details_missing_fields_are_empty_or_unknown() -> Result<(), SourceError> {
        let html = r#"<div class="row"><div class="col-sm-8"><div class="row">
<div class="col-sm-4 text-right"><img src="c.jpg"></div>
<div class="col-sm-8"><h2>Vagabond</h2><h5>Status: <a>Pausado</a></h5></div>
</div></div></div>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/vagabond");
        let details = extract_details(&d)?;
        assert_eq!(details.title, "Vagabond");
        assert_eq!(details.author, "");
        assert!(details.genres.is_empty());
        assert_eq!(details.status, Status::Unknown);
        assert_eq!(details.description, "");
        assert_eq!(
            details.thumbnail_url,
            "https://goldenmanga.top/mangabr/c.jpg"
        );
        Ok(())
    }

    #[test]
    fn details_without_info_block_is_parse_error() {
        let d = doc("<html><body><p>404</p></body></html>", "https://goldenmanga.top/x");
        assert!(matches!(extract_details(&d), Err(SourceError::Parse { .. })));
    }

    const CHAPTERS_HTML: &str = r#"<html><body>
<ul id="capitulos">
  <li class="row">
    <a href="/mangabr/one-piece/1045"><div class="col-sm-5">Cap 1045 (Parte 2) <span style="font-size:10px">(01/05/2021)</span></div></a>
    <div class="col-sm-5 text-right">
      <a href="https://goldenscan.com">Golden Scan</a>
      <a href="/perfil/admin">admin</a>
      <a href="https://outra.scan">Outra Scan</a>
    </div>
  </li>
  <li class="row">
    <a href="/mangabr/one-piece/1044"><div class="col-sm-5">Cap 1044 <span style="x">(31/02/2021)</span></div></a>
    <div class="col-sm-5 text-right"><a href="/perfil/admin">admin</a></div>
  </li>
</ul>
</body></html>"#;

    #[test]
    fn chapters_parse_name_credits_and_date() -> Result<(), SourceError> {
        let d = doc(CHAPTERS_HTML, "https://goldenmanga.top/mangabr/one-piece");
        let chapters = extract_chapters(&d)?;
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].name, "Cap 1045");
        assert_eq!(chapters[0].scanlator, "Golden Scan, Outra Scan");
        assert_eq!(chapters[0].upload_timestamp, parse_date("(01/05/2021)"));
        assert_ne!(chapters[0].upload_timestamp, 0);
        assert_eq!(chapters[0].url, "/mangabr/one-piece/1045");

        assert_eq!(chapters[1].name, "Cap 1044");
        assert_eq!(chapters[1].scanlator, "");
        assert_eq!(chapters[1].upload_timestamp, 0);
        Ok(())
    }

    #[test]
    fn chapter_row_without_name_column_is_parse_error() {
        let html = r#"<ul id="capitulos"><li class="row"><span>?</span></li></ul>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/x");
        assert!(matches!(extract_chapters(&d), Err(SourceError::Parse { .. })));
    }

    #[test]
    fn pages_are_indexed_in_document_order() -> Result<(), SourceError> {
        let html = r#"<html><body>
<div class="col-sm-12" id="capitulos_images">
  <img pag="1" src="/mm-admin/uploads/1.jpg">
  <img src="/ads/banner.gif">
  <p><img pag="2" src="https://img.goldenmanga.top/2.jpg"></p>
  <img pag="3" src="/mm-admin/uploads/3.jpg">
</div>
</body></html>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/one-piece/1045");
        let pages = extract_pages(&d)?;
        let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            pages[0].image_url,
            "https://goldenmanga.top/mm-admin/uploads/1.jpg"
        );
        assert_eq!(pages[1].image_url, "https://img.goldenmanga.top/2.jpg");
        assert_eq!(
            pages[2].image_url,
            "https://goldenmanga.top/mm-admin/uploads/3.jpg"
        );
        assert!(pages
            .iter()
            .all(|p| p.document_url == "https://goldenmanga.top/mangabr/one-piece/1045"));
        Ok(())
    }

    #[test]
    fn text_only_chapter_is_reported() {
        let html = r#"<div class="col-sm-12" id="capitulos_images_0"></div>
<div class="block_text_border"><p>Era uma vez...</p></div>"#;
        let d = doc(html, "https://goldenmanga.top/novel/x/1");
        assert!(matches!(
            extract_pages(&d),
            Err(SourceError::ChapterIsTextOnly)
        ));
    }

    #[test]
    fn missing_container_without_marker_is_parse_error() {
        let d = doc("<html><body></body></html>", "https://goldenmanga.top/x/1");
        assert!(matches!(extract_pages(&d), Err(SourceError::Parse { .. })));
    }
}
