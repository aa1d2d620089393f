use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;

/// Which fonts a document is set in.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FontConfig {
    /// PDF base-14 Helvetica and Helvetica-Bold; nothing is embedded.
    #[default]
    Builtin,
    /// A TrueType/OpenType family, subset and embedded on output.
    TrueType { regular: PathBuf, bold: PathBuf },
}

enum FaceSource {
    Builtin(&'static str),
    TrueType { data: Mmap, family: String },
}

pub(crate) struct FontFace {
    pub(crate) pdf_name: &'static str,
    widths_1000: Vec<f32>, // WinAnsi 32..=255
    char_widths_1000: HashMap<char, f32>,
    line_h_ratio: f32,
    ascender_ratio: f32,
    source: FaceSource,
}

impl FontFace {
    /// Width of a single character in 1000-units. Uses the per-char table of
    /// a TrueType face first, then the WinAnsi table.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        if let Some(&w) = self.char_widths_1000.get(&ch) {
            return w;
        }
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub(crate) fn word_width(&self, word: &str, font_size: f32) -> f32 {
        word.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }

    pub(crate) fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_h_ratio
    }

    pub(crate) fn ascent(&self, font_size: f32) -> f32 {
        font_size * self.ascender_ratio
    }

    fn builtin(pdf_name: &'static str, base_font: &'static str, bold: bool) -> Self {
        Self {
            pdf_name,
            widths_1000: helvetica_widths(bold),
            char_widths_1000: HashMap::new(),
            line_h_ratio: 1.15,
            ascender_ratio: 0.718,
            source: FaceSource::Builtin(base_font),
        }
    }

    fn truetype(pdf_name: &'static str, path: &Path) -> Result<Self, Error> {
        let fail = |msg: String| Error::Font(format!("{}: {msg}", path.display()));
        let file = std::fs::File::open(path).map_err(|e| fail(e.to_string()))?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| fail(e.to_string()))?;
        let face = Face::parse(&data, 0).map_err(|e| fail(e.to_string()))?;

        let units = face.units_per_em() as f32;
        let advance = |ch: char| {
            face.glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|adv| adv as f32 / units * 1000.0)
        };

        let widths_1000: Vec<f32> = (32u8..=255u8)
            .map(|byte| advance(winansi_to_char(byte)).unwrap_or(0.0))
            .collect();
        let char_widths_1000: HashMap<char, f32> = ('\u{0100}'..='\u{024F}')
            .chain('\u{2000}'..='\u{206F}')
            .filter_map(|ch| advance(ch).map(|w| (ch, w)))
            .collect();

        let line_gap = face.line_gap() as f32;
        let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
        let ascender_ratio = face.ascender() as f32 / units;
        let family = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| pdf_name.to_string());
        drop(face);

        Ok(Self {
            pdf_name,
            widths_1000,
            char_widths_1000,
            line_h_ratio,
            ascender_ratio,
            source: FaceSource::TrueType { data, family },
        })
    }
}

pub(crate) struct FontSet {
    regular: FontFace,
    bold: FontFace,
}

impl FontSet {
    pub(crate) fn load(config: &FontConfig) -> Result<Self, Error> {
        let t0 = std::time::Instant::now();
        let set = match config {
            FontConfig::Builtin => Self {
                regular: FontFace::builtin("F1", "Helvetica", false),
                bold: FontFace::builtin("F2", "Helvetica-Bold", true),
            },
            FontConfig::TrueType { regular, bold } => Self {
                regular: FontFace::truetype("F1", regular)?,
                bold: FontFace::truetype("F2", bold)?,
            },
        };
        log::debug!(
            "fonts loaded ({config:?}) in {:.1}ms",
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(set)
    }

    pub(crate) fn face(&self, bold: bool) -> &FontFace {
        if bold { &self.bold } else { &self.regular }
    }

    pub(crate) fn faces(&self) -> [&FontFace; 2] {
        [&self.regular, &self.bold]
    }
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match (b, bold) {
            (32, _) => 278.0,                          // space
            (48..=57, _) => 556.0,                     // digits
            (33..=47 | 58..=64, false) => 333.0,       // punctuation
            (33..=47 | 58..=64, true) => 333.0,
            (73, false) => 278.0,                      // I
            (74, false) => 500.0,                      // J
            (73 | 74, true) => 278.0,
            (77, _) => 833.0,                          // M (wide)
            (65..=90, false) => 667.0,                 // uppercase A-Z (average)
            (65..=90, true) => 722.0,
            (91..=96, _) => 333.0,                     // brackets etc.
            (102 | 105 | 106 | 108 | 116, _) => 278.0, // narrow lowercase: f i j l t
            (109 | 119, false) => 833.0,               // m w (wide)
            (109 | 119, true) => 889.0,
            (97..=122, false) => 556.0,                // lowercase a-z (average)
            (97..=122, true) => 611.0,
            (_, false) => 556.0,
            (_, true) => 611.0,
        })
        .collect()
}

/// A font resource written to the PDF. `char_to_gid` is set for embedded
/// faces, whose text must be encoded as glyph IDs.
pub(crate) struct WrittenFont {
    pub(crate) font_ref: Ref,
    pub(crate) char_to_gid: Option<HashMap<char, u16>>,
}

impl WrittenFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Writes `face` into the PDF: a Type1 reference for the base-14 fonts, or
/// a subset CIDFont covering `used_chars` for TrueType faces.
pub(crate) fn write_font(
    pdf: &mut Pdf,
    face: &FontFace,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<WrittenFont, Error> {
    let font_ref = alloc();
    match &face.source {
        FaceSource::Builtin(base_font) => {
            pdf.type1_font(font_ref)
                .base_font(Name(base_font.as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            Ok(WrittenFont {
                font_ref,
                char_to_gid: None,
            })
        }
        FaceSource::TrueType { data, family } => {
            let char_to_gid = embed_truetype(pdf, font_ref, family, data, used_chars, alloc)?;
            Ok(WrittenFont {
                font_ref,
                char_to_gid: Some(char_to_gid),
            })
        }
    }
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding.
/// The font data is subsetted to only include glyphs used in the document.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<HashMap<char, u16>, Error> {
    let face = Face::parse(font_data, 0).map_err(|e| Error::Font(format!("{font_name}: {e}")))?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, 0, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e}; embedding full font");
        font_data.to_vec()
    });

    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Font(format!("{font_name}: font program too large")))?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(char_to_gid)
}
