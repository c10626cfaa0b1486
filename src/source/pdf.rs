//! First-page PDF rasterizer.
//!
//! Parses page content with `lopdf` and paints it directly with
//! `tiny_skia` at `dpi / 72` pixels per point. The page is drawn onto a
//! transparent surface and white is composited behind it afterwards, so
//! unpainted areas come out white.
//!
//! Covered: graphics state, paths, gray/RGB/CMYK colors, image and form
//! XObjects. Text is drawn with the watermark font in place of embedded
//! fonts, which keeps text position and color but not glyph shapes.
//! Clipping, shadings and patterns are ignored.

use crate::canvas::Canvas;
use crate::constants::{DEFAULT_PDF_PAGE_SIZE, MAX_PDF_IMAGE_BYTES, PDF_POINTS_PER_INCH};
use crate::error::{Error, Result};
use crate::watermark::text_renderer::{Color, GlyphPathBuilder, Typesetter};
use ab_glyph::Font;
use image::{ImageFormat, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Page rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs().max(1.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs().max(1.0)
    }

    /// Pixel size of the page at `dpi`.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        let scale = dpi as f32 / PDF_POINTS_PER_INCH;
        (
            (self.width() * scale).round().max(1.0) as u32,
            (self.height() * scale).round().max(1.0) as u32,
        )
    }
}

type XObjects = HashMap<Vec<u8>, ObjectId>;

#[derive(Clone, Debug)]
struct GraphicsState {
    ctm: Transform,
    fill: tiny_skia::Color,
    stroke: tiny_skia::Color,
    line_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
    render_mode: i64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Transform::identity(),
            fill: tiny_skia::Color::BLACK,
            stroke: tiny_skia::Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            render_mode: 0,
        }
    }
}

/// Load `path` and rasterize its first page.
pub fn rasterize_file(path: &Path, dpi: u32, typesetter: &Typesetter) -> Result<Canvas> {
    let doc = Document::load(path)?;
    rasterize_first_page(&doc, dpi, typesetter)
}

/// Rasterize page 1 of `doc` over a white background.
pub fn rasterize_first_page(doc: &Document, dpi: u32, typesetter: &Typesetter) -> Result<Canvas> {
    if dpi == 0 {
        return Err(Error::Config("PDF resolution must be greater than 0".to_string()));
    }
    let page_id = doc
        .get_pages()
        .get(&1)
        .copied()
        .ok_or(lopdf::Error::PageNumberNotFound(1))?;

    let page_box = page_box_for_id(doc, page_id)?;
    let (width, height) = page_box.pixel_size(dpi);
    let mut canvas = Canvas::blank(width, height)?;
    tracing::info!(dpi, width, height, "rasterizing PDF page 1");

    let scale = dpi as f32 / PDF_POINTS_PER_INCH;
    let device = Transform::from_row(
        scale,
        0.0,
        0.0,
        -scale,
        -page_box.x0 * scale,
        page_box.y1 * scale,
    );

    let resources = xobjects_for_page(doc, page_id)?;
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut renderer = PageRenderer::new(doc, typesetter, canvas.pixmap_mut(), device);
    renderer.run(&content.operations, &resources)?;

    canvas.paint_behind(Color::white());
    Ok(canvas)
}

struct PageRenderer<'a> {
    doc: &'a Document,
    typesetter: &'a Typesetter,
    pixmap: &'a mut Pixmap,
    device: Transform,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: PathBuilder,
    current: (f32, f32),
    text_matrix: Transform,
    text_line_matrix: Transform,
    visited_forms: HashSet<ObjectId>,
}

impl<'a> PageRenderer<'a> {
    fn new(
        doc: &'a Document,
        typesetter: &'a Typesetter,
        pixmap: &'a mut Pixmap,
        device: Transform,
    ) -> Self {
        Self {
            doc,
            typesetter,
            pixmap,
            device,
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: PathBuilder::new(),
            current: (0.0, 0.0),
            text_matrix: Transform::identity(),
            text_line_matrix: Transform::identity(),
            visited_forms: HashSet::new(),
        }
    }

    fn user_to_device(&self) -> Transform {
        self.device.pre_concat(self.state.ctm)
    }

    fn run(&mut self, operations: &[Operation], resources: &XObjects) -> Result<()> {
        for op in operations {
            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(prev) = self.stack.pop() {
                        self.state = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = op_matrix(op) {
                        self.state.ctm = self.state.ctm.pre_concat(m);
                    }
                }
                "w" => {
                    if let Some(width) = op_f32(op, 0) {
                        self.state.line_width = width.max(0.0);
                    }
                }
                "J" => {
                    if let Some(cap) = op_i64(op, 0) {
                        self.state.line_cap = match cap {
                            1 => LineCap::Round,
                            2 => LineCap::Square,
                            _ => LineCap::Butt,
                        };
                    }
                }
                "j" => {
                    if let Some(join) = op_i64(op, 0) {
                        self.state.line_join = match join {
                            1 => LineJoin::Round,
                            2 => LineJoin::Bevel,
                            _ => LineJoin::Miter,
                        };
                    }
                }
                "M" => {
                    if let Some(limit) = op_f32(op, 0) {
                        self.state.miter_limit = limit.max(1.0);
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(color) = op_color(op) {
                        self.state.fill = color;
                    }
                }
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    if let Some(color) = op_color(op) {
                        self.state.stroke = color;
                    }
                }
                "m" => {
                    if let Some([x, y]) = op_f32_2(op) {
                        self.path.move_to(x, y);
                        self.current = (x, y);
                    }
                }
                "l" => {
                    if let Some([x, y]) = op_f32_2(op) {
                        self.path.line_to(x, y);
                        self.current = (x, y);
                    }
                }
                "c" => {
                    if let Some([x1, y1, x2, y2, x, y]) = op_f32_6(op) {
                        self.path.cubic_to(x1, y1, x2, y2, x, y);
                        self.current = (x, y);
                    }
                }
                "v" => {
                    if let Some([x2, y2, x, y]) = op_f32_4(op) {
                        let (x1, y1) = self.current;
                        self.path.cubic_to(x1, y1, x2, y2, x, y);
                        self.current = (x, y);
                    }
                }
                "y" => {
                    if let Some([x1, y1, x, y]) = op_f32_4(op) {
                        self.path.cubic_to(x1, y1, x, y, x, y);
                        self.current = (x, y);
                    }
                }
                "re" => {
                    if let Some([x, y, w, h]) = op_f32_4(op) {
                        self.path.move_to(x, y);
                        self.path.line_to(x + w, y);
                        self.path.line_to(x + w, y + h);
                        self.path.line_to(x, y + h);
                        self.path.close();
                        self.current = (x, y);
                    }
                }
                "h" => self.path.close(),
                "f" | "F" => self.paint_path(false, Some(FillRule::Winding), false),
                "f*" => self.paint_path(false, Some(FillRule::EvenOdd), false),
                "S" => self.paint_path(false, None, true),
                "s" => self.paint_path(true, None, true),
                "B" => self.paint_path(false, Some(FillRule::Winding), true),
                "B*" => self.paint_path(false, Some(FillRule::EvenOdd), true),
                "b" => self.paint_path(true, Some(FillRule::Winding), true),
                "b*" => self.paint_path(true, Some(FillRule::EvenOdd), true),
                "n" => self.paint_path(false, None, false),
                "BT" => {
                    self.text_matrix = Transform::identity();
                    self.text_line_matrix = Transform::identity();
                }
                "Tf" => {
                    if let Some(size) = op_f32(op, 1) {
                        self.state.font_size = size;
                    }
                }
                "Tc" => {
                    if let Some(v) = op_f32(op, 0) {
                        self.state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = op_f32(op, 0) {
                        self.state.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = op_f32(op, 0) {
                        self.state.h_scale = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(v) = op_f32(op, 0) {
                        self.state.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(v) = op_f32(op, 0) {
                        self.state.rise = v;
                    }
                }
                "Tr" => {
                    if let Some(mode) = op_i64(op, 0) {
                        self.state.render_mode = mode;
                    }
                }
                "Td" | "TD" => {
                    if let Some([tx, ty]) = op_f32_2(op) {
                        if op.operator == "TD" {
                            self.state.leading = -ty;
                        }
                        self.next_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = op_matrix(op) {
                        self.text_matrix = m;
                        self.text_line_matrix = m;
                    }
                }
                "T*" => self.next_line(0.0, -self.state.leading),
                "Tj" => {
                    if let Some(bytes) = op.operands.first().and_then(|o| o.as_str().ok()) {
                        self.show_text(bytes);
                    }
                }
                "'" => {
                    self.next_line(0.0, -self.state.leading);
                    if let Some(bytes) = op.operands.first().and_then(|o| o.as_str().ok()) {
                        self.show_text(bytes);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (op_f32(op, 0), op_f32(op, 1)) {
                        self.state.word_spacing = aw;
                        self.state.char_spacing = ac;
                    }
                    self.next_line(0.0, -self.state.leading);
                    if let Some(bytes) = op.operands.get(2).and_then(|o| o.as_str().ok()) {
                        self.show_text(bytes);
                    }
                }
                "TJ" => {
                    if let Some(items) = op.operands.first().and_then(|o| o.as_array().ok()) {
                        for item in items {
                            if let Ok(bytes) = item.as_str() {
                                self.show_text(bytes);
                            } else if let Some(adjust) = obj_to_f32(item) {
                                // thousandths of text space units
                                let tx = -(adjust / 1000.0) * self.state.font_size * self.state.h_scale;
                                self.text_matrix = self.text_matrix.pre_translate(tx, 0.0);
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(id) = op
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .and_then(|name| resources.get(name))
                    {
                        self.draw_xobject(*id, resources)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn paint_path(&mut self, close: bool, fill: Option<FillRule>, stroke: bool) {
        if close {
            self.path.close();
        }
        let builder = std::mem::replace(&mut self.path, PathBuilder::new());
        let Some(path) = builder.finish() else {
            return;
        };
        let transform = self.user_to_device();

        if let Some(rule) = fill {
            let paint = solid_paint(self.state.fill);
            self.pixmap.fill_path(&path, &paint, rule, transform, None);
        }
        if stroke {
            let paint = solid_paint(self.state.stroke);
            let stroke = Stroke {
                width: self.state.line_width,
                miter_limit: self.state.miter_limit,
                line_cap: self.state.line_cap,
                line_join: self.state.line_join,
                dash: None,
            };
            self.pixmap
                .stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = self.text_line_matrix.pre_translate(tx, ty);
        self.text_matrix = self.text_line_matrix;
    }

    /// Single-byte text drawn with the watermark font.
    fn show_text(&mut self, bytes: &[u8]) {
        let font = self.typesetter.font();
        let units = self.typesetter.units_per_em();
        let state = self.state.clone();
        let visible = !matches!(state.render_mode, 3 | 7);
        let glyph_space = Transform::from_row(
            state.font_size * state.h_scale,
            0.0,
            0.0,
            state.font_size,
            0.0,
            state.rise,
        );
        let paint = solid_paint(state.fill);

        for &byte in bytes {
            let id = font.glyph_id(char::from(byte));
            if visible {
                if let Some(outline) = font.outline(id) {
                    let mut builder = GlyphPathBuilder::new(0.0, 0.0, 1.0 / units, 1.0 / units);
                    builder.append(&outline, 0.0);
                    if let Some(path) = builder.finish() {
                        let transform = self
                            .user_to_device()
                            .pre_concat(self.text_matrix)
                            .pre_concat(glyph_space);
                        self.pixmap
                            .fill_path(&path, &paint, FillRule::Winding, transform, None);
                    }
                }
            }

            let mut tx = font.h_advance_unscaled(id) / units * state.font_size + state.char_spacing;
            if byte == b' ' {
                tx += state.word_spacing;
            }
            self.text_matrix = self.text_matrix.pre_translate(tx * state.h_scale, 0.0);
        }
    }

    fn draw_xobject(&mut self, id: ObjectId, parent: &XObjects) -> Result<()> {
        let doc = self.doc;
        let stream = doc.get_object(id)?.as_stream()?;
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();

        match subtype {
            Some(b"Form") => {
                if !self.visited_forms.insert(id) {
                    tracing::debug!(?id, "skipping recursive form XObject");
                    return Ok(());
                }
                let content = Content::decode(&stream.get_plain_content()?)?;
                let mut resources = parent.clone();
                if let Ok(obj) = stream.dict.get(b"Resources") {
                    resources.extend(xobjects_from_resources(doc, obj)?);
                }
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(matrix_from_object)
                    .unwrap_or_default();

                let depth = self.stack.len();
                self.stack.push(self.state.clone());
                self.state.ctm = self.state.ctm.pre_concat(matrix);
                let result = self.run(&content.operations, &resources);
                self.stack.truncate(depth + 1);
                if let Some(prev) = self.stack.pop() {
                    self.state = prev;
                }
                self.visited_forms.remove(&id);
                result
            }
            Some(b"Image") => {
                match decode_image_xobject(doc, stream) {
                    Some(image) => self.draw_image(&image)?,
                    None => tracing::warn!(?id, "unsupported PDF image encoding, skipped"),
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Images occupy the unit square of user space, top row at y = 1.
    fn draw_image(&mut self, image: &RgbaImage) -> Result<()> {
        let source = Canvas::from_rgba(image)?;
        let w = image.width() as f32;
        let h = image.height() as f32;
        let unit = Transform::from_row(1.0 / w, 0.0, 0.0, -1.0 / h, 0.0, 1.0);
        let transform = self.user_to_device().pre_concat(unit);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.pixmap().as_ref(), &paint, transform, None);
        Ok(())
    }
}

fn solid_paint(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// MediaBox of the page, inherited through the page tree if needed.
pub fn page_box_for_id(doc: &Document, mut id: ObjectId) -> Result<PageBox> {
    loop {
        let dict = doc.get_object(id)?.as_dict()?;
        if let Ok(arr) = dict.get(b"MediaBox").and_then(Object::as_array) {
            if let Some(page_box) = parse_media_box_array(arr) {
                return Ok(page_box);
            }
        }
        id = match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => parent_id,
            Err(_) => break,
        };
    }
    let (width, height) = DEFAULT_PDF_PAGE_SIZE;
    Ok(PageBox {
        x0: 0.0,
        y0: 0.0,
        x1: width,
        y1: height,
    })
}

fn parse_media_box_array(arr: &[Object]) -> Option<PageBox> {
    if arr.len() < 4 {
        return None;
    }
    let x0 = obj_to_f32(&arr[0])?;
    let y0 = obj_to_f32(&arr[1])?;
    let x1 = obj_to_f32(&arr[2])?;
    let y1 = obj_to_f32(&arr[3])?;
    Some(PageBox {
        x0: x0.min(x1),
        y0: y0.min(y1),
        x1: x0.max(x1),
        y1: y0.max(y1),
    })
}

fn xobjects_for_page(doc: &Document, mut id: ObjectId) -> Result<XObjects> {
    loop {
        let dict = doc.get_object(id)?.as_dict()?;
        if let Ok(obj) = dict.get(b"Resources") {
            return xobjects_from_resources(doc, obj);
        }
        id = match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => parent_id,
            Err(_) => return Ok(XObjects::new()),
        };
    }
}

fn xobjects_from_resources(doc: &Document, obj: &Object) -> Result<XObjects> {
    let mut out = XObjects::new();
    let Some(resources) = resolve_dict(doc, obj)? else {
        return Ok(out);
    };
    if let Ok(xobj) = resources.get(b"XObject") {
        if let Some(xobjects) = resolve_dict(doc, xobj)? {
            for (name, value) in xobjects.iter() {
                if let Ok(id) = value.as_reference() {
                    out.insert(name.clone(), id);
                }
            }
        }
    }
    Ok(out)
}

fn resolve_dict<'d>(doc: &'d Document, obj: &'d Object) -> Result<Option<&'d Dictionary>> {
    let (_, resolved) = doc.dereference(obj)?;
    Ok(resolved.as_dict().ok())
}

#[derive(Clone, Copy)]
enum DirectColor {
    Gray,
    Rgb,
    Cmyk,
}

impl DirectColor {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"DeviceGray" | b"G" | b"CalGray" => Some(Self::Gray),
            b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(Self::Rgb),
            b"DeviceCMYK" | b"CMYK" => Some(Self::Cmyk),
            _ => None,
        }
    }

    fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    fn rgb(self, bytes: &[u8]) -> Option<[u8; 3]> {
        match self {
            Self::Gray => {
                let v = *bytes.first()?;
                Some([v, v, v])
            }
            Self::Rgb => Some([*bytes.first()?, *bytes.get(1)?, *bytes.get(2)?]),
            Self::Cmyk => {
                let unit = |i: usize| bytes.get(i).map(|b| f32::from(*b) / 255.0);
                let (r, g, b) = cmyk_to_rgb(unit(0)?, unit(1)?, unit(2)?, unit(3)?);
                Some([to_byte(r), to_byte(g), to_byte(b)])
            }
        }
    }
}

enum ImageColorSpace {
    Direct(DirectColor),
    Indexed { base: DirectColor, lookup: Vec<u8> },
}

fn image_color_space(doc: &Document, obj: &Object) -> Option<ImageColorSpace> {
    let (_, resolved) = doc.dereference(obj).ok()?;
    match resolved {
        Object::Name(name) => DirectColor::from_name(name).map(ImageColorSpace::Direct),
        Object::Array(arr) => {
            let (_, head) = doc.dereference(arr.first()?).ok()?;
            let head = head.as_name().ok()?;
            if let Some(direct) = DirectColor::from_name(head) {
                return Some(ImageColorSpace::Direct(direct));
            }
            if head == b"ICCBased" {
                let (_, profile) = doc.dereference(arr.get(1)?).ok()?;
                let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                return match n {
                    1 => Some(ImageColorSpace::Direct(DirectColor::Gray)),
                    3 => Some(ImageColorSpace::Direct(DirectColor::Rgb)),
                    4 => Some(ImageColorSpace::Direct(DirectColor::Cmyk)),
                    _ => None,
                };
            }
            if head != b"Indexed" && head != b"I" {
                return None;
            }
            let base = match image_color_space(doc, arr.get(1)?)? {
                ImageColorSpace::Direct(base) => base,
                ImageColorSpace::Indexed { .. } => return None,
            };
            let (_, table) = doc.dereference(arr.get(3)?).ok()?;
            let lookup = match table {
                Object::String(bytes, _) => bytes.clone(),
                Object::Stream(stream) => stream.get_plain_content().ok()?,
                _ => return None,
            };
            Some(ImageColorSpace::Indexed { base, lookup })
        }
        _ => None,
    }
}

/// Decode an image XObject: JPEG data or 8-bit raw samples.
fn decode_image_xobject(doc: &Document, stream: &Stream) -> Option<RgbaImage> {
    let filters = stream.filters().unwrap_or_default();
    if filters.iter().any(|f| *f == b"DCTDecode") {
        let mut limits = image::io::Limits::default();
        limits.max_alloc = Some(MAX_PDF_IMAGE_BYTES);
        let mut reader =
            image::io::Reader::with_format(Cursor::new(&stream.content), ImageFormat::Jpeg);
        reader.limits(limits);
        return reader.decode().ok().map(|img| img.to_rgba8());
    }

    let width = stream.dict.get(b"Width").ok()?.as_i64().ok()?;
    let height = stream.dict.get(b"Height").ok()?.as_i64().ok()?;
    let width = u32::try_from(width).ok().filter(|w| *w > 0)?;
    let height = u32::try_from(height).ok().filter(|h| *h > 0)?;
    let bpc = stream
        .dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bpc != 8 {
        return None;
    }

    let color_space = match stream.dict.get(b"ColorSpace") {
        Ok(obj) => image_color_space(doc, obj)?,
        Err(_) => ImageColorSpace::Direct(DirectColor::Gray),
    };
    let plain = stream.get_plain_content().ok()?;

    // declared dimensions must be backed by sample data before allocating
    let pixels = u64::from(width).checked_mul(u64::from(height))?;
    let bytes_per_pixel = match &color_space {
        ImageColorSpace::Direct(mode) => mode.channels() as u64,
        ImageColorSpace::Indexed { .. } => 1,
    };
    let samples = pixels.checked_mul(bytes_per_pixel)?;
    if samples > plain.len() as u64 || pixels.checked_mul(4)? > MAX_PDF_IMAGE_BYTES {
        return None;
    }

    let mut image = RgbaImage::new(width, height);
    let mut src = 0usize;
    for pixel in image.pixels_mut() {
        let [r, g, b] = match &color_space {
            ImageColorSpace::Direct(mode) => {
                let n = mode.channels();
                let rgb = mode.rgb(plain.get(src..src + n)?)?;
                src += n;
                rgb
            }
            ImageColorSpace::Indexed { base, lookup } => {
                let index = usize::from(*plain.get(src)?);
                src += 1;
                let n = base.channels();
                base.rgb(lookup.get(index * n..index * n + n)?)?
            }
        };
        pixel.0 = [r, g, b, 255];
    }
    Some(image)
}

fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> (f32, f32, f32) {
    let c = c.clamp(0.0, 1.0);
    let m = m.clamp(0.0, 1.0);
    let y = y.clamp(0.0, 1.0);
    let k = k.clamp(0.0, 1.0);
    ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Color from 1 (gray), 3 (RGB) or 4 (CMYK) numeric operands.
fn op_color(op: &Operation) -> Option<tiny_skia::Color> {
    let values: Vec<f32> = op.operands.iter().filter_map(obj_to_f32).collect();
    let (r, g, b) = match values.as_slice() {
        [gray] => (*gray, *gray, *gray),
        [r, g, b] => (*r, *g, *b),
        [c, m, y, k] => cmyk_to_rgb(*c, *m, *y, *k),
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(to_byte(r), to_byte(g), to_byte(b), 255))
}

fn matrix_from_object(obj: &Object) -> Option<Transform> {
    let arr = obj.as_array().ok()?;
    if arr.len() < 6 {
        return None;
    }
    let v: Vec<f32> = arr.iter().take(6).filter_map(obj_to_f32).collect();
    match v.as_slice() {
        [a, b, c, d, e, f] => Some(Transform::from_row(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

fn op_matrix(op: &Operation) -> Option<Transform> {
    let [a, b, c, d, e, f] = op_f32_6(op)?;
    Some(Transform::from_row(a, b, c, d, e, f))
}

fn op_f32(op: &Operation, idx: usize) -> Option<f32> {
    obj_to_f32(op.operands.get(idx)?)
}

fn op_i64(op: &Operation, idx: usize) -> Option<i64> {
    op.operands.get(idx)?.as_i64().ok()
}

fn op_f32_2(op: &Operation) -> Option<[f32; 2]> {
    Some([op_f32(op, 0)?, op_f32(op, 1)?])
}

fn op_f32_4(op: &Operation) -> Option<[f32; 4]> {
    Some([
        op_f32(op, 0)?,
        op_f32(op, 1)?,
        op_f32(op, 2)?,
        op_f32(op, 3)?,
    ])
}

fn op_f32_6(op: &Operation) -> Option<[f32; 6]> {
    Some([
        op_f32(op, 0)?,
        op_f32(op, 1)?,
        op_f32(op, 2)?,
        op_f32(op, 3)?,
        op_f32(op, 4)?,
        op_f32(op, 5)?,
    ])
}

fn obj_to_f32(obj: &Object) -> Option<f32> {
    obj.as_float().ok()
}
