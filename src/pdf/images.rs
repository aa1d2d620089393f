use std::io::{BufReader, Cursor};
use std::path::Path;
use std::sync::Arc;

use pdf_writer::{Filter, Pdf, Ref};

use crate::model::{Illustration, ImageData, ImageFormat};

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

/// Reads a picture for a `width` × `height` box. A missing, unreadable or
/// unsupported file yields a blank placeholder of the same size.
pub fn load_illustration(path: &Path, width: f32, height: f32) -> Illustration {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("picture {} not readable ({e}), using placeholder", path.display());
            return Illustration::placeholder(width, height);
        }
    };
    let Some(format) = sniff_format(&bytes) else {
        log::warn!("picture {} is neither PNG nor JPEG, using placeholder", path.display());
        return Illustration::placeholder(width, height);
    };
    Illustration {
        image: Some(ImageData {
            bytes: Arc::from(bytes),
            format,
        }),
        width,
        height,
    }
}

fn reader(data: &ImageData) -> image::ImageReader<BufReader<Cursor<&[u8]>>> {
    let format = match data.format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    };
    image::ImageReader::with_format(BufReader::new(Cursor::new(&data.bytes[..])), format)
}

/// Pixel size read from the image header, without decoding.
pub(super) fn image_size(data: &ImageData) -> Option<(u32, u32)> {
    reader(data).into_dimensions().ok()
}

/// Writes `data` as an image XObject. JPEGs in RGB or gray are passed
/// through; everything else is decoded and re-encoded with Flate, with an
/// SMask when the picture has transparency. `None` if decoding fails.
pub(super) fn embed_image(
    pdf: &mut Pdf,
    data: &ImageData,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<Ref> {
    let decoded = match reader(data).decode() {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!("image could not be decoded ({e}); drawn as placeholder");
            return None;
        }
    };
    let (w, h) = (decoded.width(), decoded.height());
    let xobj_ref = alloc();

    if data.format == ImageFormat::Jpeg {
        let gray = match decoded.color() {
            image::ColorType::Rgb8 => Some(false),
            image::ColorType::L8 => Some(true),
            _ => None,
        };
        if let Some(gray) = gray {
            let mut xobj = pdf.image_xobject(xobj_ref, &data.bytes);
            xobj.filter(Filter::DctDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            if gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
            return Some(xobj_ref);
        }
    }

    let rgba = decoded.to_rgba8();
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Some(xobj_ref)
}
