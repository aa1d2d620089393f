mod images;
mod table;
mod text;

use std::collections::HashSet;
use std::sync::Arc;

use pdf_writer::types::PageMode;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{FontConfig, FontSet, WrittenFont, write_font};
use crate::layout::{Frame, PageGeometry, Rendered, Surface, plan_rows};
use crate::model::{ImageData, Orientation, Table};

pub use images::load_illustration;

/// Drawing operations recorded per page and turned into a content stream
/// once the whole document is laid out (fonts are subset by then).
pub(crate) enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Fill {
        rect: Rect,
        gray: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
    },
    Image {
        index: usize,
        rect: Rect,
    },
    Placeholder {
        rect: Rect,
    },
}

struct PageState {
    orientation: Orientation,
    ops: Vec<DrawOp>,
}

/// Everything table drawing needs to record onto the current page.
pub(crate) struct Painter<'a> {
    pub(crate) fonts: &'a FontSet,
    pub(crate) ops: &'a mut Vec<DrawOp>,
    used_chars: &'a mut [HashSet<char>; 2],
    images: &'a mut Vec<ImageData>,
}

impl Painter<'_> {
    pub(crate) fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: &str) {
        if text.is_empty() {
            return;
        }
        self.used_chars[bold as usize].extend(text.chars());
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            text: text.to_string(),
        });
    }

    /// Index of `image` in the document's image list; identical data
    /// (same allocation) is stored once.
    pub(crate) fn image_index(&mut self, image: &ImageData) -> usize {
        if let Some(i) = self
            .images
            .iter()
            .position(|known| Arc::ptr_eq(&known.bytes, &image.bytes))
        {
            return i;
        }
        self.images.push(image.clone());
        self.images.len() - 1
    }
}

/// The PDF-backed [`Surface`]: measures tables with the document fonts and
/// records their drawing onto pages.
pub struct PdfSurface {
    fonts: FontSet,
    geometry: PageGeometry,
    pages: Vec<PageState>,
    bookmarks: Vec<(String, usize)>,
    images: Vec<ImageData>,
    used_chars: [HashSet<char>; 2], // regular, bold
}

impl PdfSurface {
    /// Loads the fonts. Failing here aborts the build before any page exists.
    pub fn new(fonts: &FontConfig, geometry: PageGeometry) -> Result<Self, Error> {
        Ok(Self {
            fonts: FontSet::load(fonts)?,
            geometry,
            pages: Vec::new(),
            bookmarks: Vec::new(),
            images: Vec::new(),
            used_chars: [HashSet::new(), HashSet::new()],
        })
    }

    pub fn page_orientations(&self) -> Vec<Orientation> {
        self.pages.iter().map(|p| p.orientation).collect()
    }

    pub fn bookmarks(&self) -> &[(String, usize)] {
        &self.bookmarks
    }

    /// Number of text drawing operations on page `index`.
    pub fn text_ops_on_page(&self, index: usize) -> usize {
        self.pages.get(index).map_or(0, |p| {
            p.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Text { .. }))
                .count()
        })
    }

    /// Serialises the document.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let outline_id = alloc();

        // Phase 1: fonts, subset to the characters actually drawn
        let mut written: Vec<WrittenFont> = Vec::with_capacity(2);
        for (face, used) in self.fonts.faces().into_iter().zip(self.used_chars.iter()) {
            let mut used = used.clone();
            used.insert(' ');
            written.push(write_font(&mut pdf, face, &used, &mut alloc)?);
        }
        let t_fonts = t0.elapsed();

        // Phase 2: images; undecodable ones become placeholders
        let image_refs: Vec<Option<Ref>> = self
            .images
            .iter()
            .map(|img| images::embed_image(&mut pdf, img, &mut alloc))
            .collect();
        let t_images = t0.elapsed();

        // Phase 3: page content
        let n = self.pages.len().max(1);
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (i, page) in self.pages.iter().enumerate() {
            let content = self.page_content(page, &written, &image_refs);
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }
        if self.pages.is_empty() {
            // A PDF needs at least one page.
            pdf.stream(content_ids[0], &[]);
        }

        // Phase 4: outline
        let has_outline = !self.bookmarks.is_empty();
        if has_outline {
            let item_ids: Vec<Ref> = self.bookmarks.iter().map(|_| alloc()).collect();
            pdf.outline(outline_id)
                .first(item_ids[0])
                .last(item_ids[item_ids.len() - 1])
                .count(item_ids.len() as i32);
            for (i, (title, page_index)) in self.bookmarks.iter().enumerate() {
                let mut item = pdf.outline_item(item_ids[i]);
                item.title(TextStr(title)).parent(outline_id);
                if i > 0 {
                    item.prev(item_ids[i - 1]);
                }
                if i + 1 < item_ids.len() {
                    item.next(item_ids[i + 1]);
                }
                let target = page_ids[(*page_index).min(n - 1)];
                item.dest().page(target).fit();
            }
        }

        {
            let mut catalog = pdf.catalog(catalog_id);
            catalog.pages(pages_id);
            if has_outline {
                catalog.outlines(outline_id);
                catalog.page_mode(PageMode::UseOutlines);
            }
        }
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let font_pairs: Vec<(&str, Ref)> = self
            .fonts
            .faces()
            .iter()
            .zip(written.iter())
            .map(|(face, w)| (face.pdf_name, w.font_ref))
            .collect();
        let image_pairs: Vec<(String, Ref)> = image_refs
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.map(|r| (image_name(i), r)))
            .collect();

        for i in 0..n {
            let orientation = self
                .pages
                .get(i)
                .map_or(Orientation::Portrait, |p| p.orientation);
            let (w, h) = self.geometry.page_size(orientation);
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, w, h))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !image_pairs.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_pairs {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        let t_assembly = t0.elapsed();
        log::info!(
            "Write phases: fonts={:.1}ms, images={:.1}ms, pages+assembly={:.1}ms ({} pages)",
            t_fonts.as_secs_f64() * 1000.0,
            (t_images - t_fonts).as_secs_f64() * 1000.0,
            (t_assembly - t_images).as_secs_f64() * 1000.0,
            self.pages.len(),
        );

        Ok(pdf.finish())
    }

    fn page_content(
        &self,
        page: &PageState,
        fonts: &[WrittenFont],
        image_refs: &[Option<Ref>],
    ) -> Content {
        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    size,
                    bold,
                    text,
                } => {
                    let face = self.fonts.face(*bold);
                    let bytes = fonts[*bold as usize].encode(text);
                    content
                        .begin_text()
                        .set_font(Name(face.pdf_name.as_bytes()), *size)
                        .next_line(*x, *y)
                        .show(Str(&bytes))
                        .end_text();
                }
                DrawOp::Fill { rect, gray } => {
                    content.save_state();
                    content.set_fill_gray(*gray);
                    content.rect(rect.x1, rect.y1, rect.x2 - rect.x1, rect.y2 - rect.y1);
                    content.fill_nonzero();
                    content.restore_state();
                }
                DrawOp::Line { from, to, width } => {
                    content.save_state();
                    content.set_line_width(*width);
                    content.move_to(from.0, from.1);
                    content.line_to(to.0, to.1);
                    content.stroke();
                    content.restore_state();
                }
                DrawOp::Image { index, rect } => match image_refs.get(*index).copied().flatten() {
                    Some(_) => {
                        let name = image_name(*index);
                        content.save_state();
                        content.transform([
                            rect.x2 - rect.x1,
                            0.0,
                            0.0,
                            rect.y2 - rect.y1,
                            rect.x1,
                            rect.y1,
                        ]);
                        content.x_object(Name(name.as_bytes()));
                        content.restore_state();
                    }
                    None => placeholder(&mut content, rect),
                },
                DrawOp::Placeholder { rect } => placeholder(&mut content, rect),
            }
        }
        content
    }

    fn painter(&mut self) -> Painter<'_> {
        if self.pages.is_empty() {
            log::warn!("drawing before any page was opened; starting a portrait page");
            self.pages.push(PageState {
                orientation: Orientation::Portrait,
                ops: Vec::new(),
            });
        }
        let last = self.pages.len() - 1;
        Painter {
            fonts: &self.fonts,
            ops: &mut self.pages[last].ops,
            used_chars: &mut self.used_chars,
            images: &mut self.images,
        }
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn placeholder(content: &mut Content, rect: &Rect) {
    content.save_state();
    content.set_stroke_gray(0.7);
    content.set_line_width(0.5);
    content.rect(rect.x1, rect.y1, rect.x2 - rect.x1, rect.y2 - rect.y1);
    content.stroke();
    content.restore_state();
}

impl Surface for PdfSurface {
    fn add_page(&mut self, orientation: Orientation) {
        self.pages.push(PageState {
            orientation,
            ops: Vec::new(),
        });
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_orientation(&self) -> Option<Orientation> {
        self.pages.last().map(|p| p.orientation)
    }

    fn add_bookmark(&mut self, title: &str) {
        let page = self.pages.len().saturating_sub(1);
        self.bookmarks.push((title.to_string(), page));
    }

    fn measure_height(&self, table: &Table, width: f32) -> f32 {
        table::measure_table(&self.fonts, table, width)
    }

    fn render(&mut self, table: &Table, frame: &Frame) -> Rendered {
        let heights = table::row_heights(&self.fonts, table, frame.width);
        let plan = plan_rows(
            &heights,
            table.header_rows,
            frame.first_row,
            frame.top - frame.bottom_margin,
        );
        if plan.rows.is_empty() {
            return Rendered {
                bottom: frame.top,
                next_row: plan.next_row,
            };
        }
        let mut painter = self.painter();
        let bottom = table::draw_rows(
            &mut painter,
            table,
            &heights,
            &plan.rows,
            frame.left,
            frame.width,
            frame.top,
        );
        Rendered {
            bottom,
            next_row: plan.next_row,
        }
    }
}
