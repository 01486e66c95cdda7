use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::model::{GroupedCatalog, EMPTY_MONTH_NOTE};

// A4 portrait in points, 10 mm margins.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 28;

const MONTH_GAP: i64 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Brand,
    Title,
    Subtitle,
    Month,
    Entry,
    Detail,
    Footer,
}

impl Style {
    fn font(self) -> &'static str {
        match self {
            Style::Brand | Style::Title | Style::Month | Style::Entry => "F2",
            _ => "F1",
        }
    }

    fn size(self) -> i64 {
        match self {
            Style::Brand => 22,
            Style::Title => 16,
            Style::Month => 13,
            Style::Entry => 10,
            Style::Subtitle | Style::Detail => 9,
            Style::Footer => 8,
        }
    }

    fn leading(self) -> i64 {
        self.size() + 6
    }

    // Characters per line at this size under the half-em width estimate.
    fn columns(self) -> usize {
        ((PAGE_WIDTH - 2 * MARGIN) / (self.size() / 2).max(1)) as usize
    }

    fn rgb(self) -> (f32, f32, f32) {
        match self {
            Style::Brand => (0.063, 0.725, 0.506),
            Style::Title => (0.216, 0.255, 0.318),
            Style::Subtitle | Style::Detail => (0.420, 0.447, 0.502),
            Style::Footer => (0.612, 0.639, 0.686),
            Style::Month | Style::Entry => (0.067, 0.094, 0.153),
        }
    }

    fn centered(self) -> bool {
        matches!(
            self,
            Style::Brand | Style::Title | Style::Subtitle | Style::Footer
        )
    }
}

#[derive(Clone, Debug)]
struct Line {
    style: Style,
    text: String,
    indent: i64,
}

impl Line {
    fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            indent: 0,
        }
    }

    fn indented(mut self, indent: i64) -> Self {
        self.indent = indent;
        self
    }
}

// The base-14 fonts use WinAnsiEncoding; characters outside Latin-1 are
// replaced rather than dropped so line lengths stay recognisable.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > columns && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// Rough Helvetica advance width: half an em per glyph.
fn approx_width(text: &str, size: i64) -> i64 {
    text.chars().count() as i64 * size / 2
}

fn header_block(catalog: &GroupedCatalog) -> Vec<Line> {
    let mut lines = vec![Line::new(Style::Brand, "EduTrain")];
    lines.extend(
        wrap(&catalog.title, Style::Title.columns())
            .into_iter()
            .map(|part| Line::new(Style::Title, part)),
    );
    lines.push(Line::new(
        Style::Subtitle,
        "Jadwal Pelatihan Tahunan - EduTrain Indonesia",
    ));
    lines
}

fn month_blocks(catalog: &GroupedCatalog) -> Vec<Vec<Line>> {
    catalog
        .months
        .iter()
        .enumerate()
        .map(|(index, month)| {
            let mut block = vec![Line::new(
                Style::Month,
                format!("{}. {}", index + 1, month.name),
            )];
            if month.trainings.is_empty() {
                block.push(Line::new(Style::Detail, EMPTY_MONTH_NOTE).indented(10));
            }
            // Duration rides on the entry line, like the badge on a card.
            for training in month.trainings.iter() {
                let entry = format!("{} ({})", training.name, training.duration_text());
                let columns = Style::Entry.columns() - 4;
                for (i, part) in wrap(&entry, columns).into_iter().enumerate() {
                    let text = if i == 0 { format!("- {part}") } else { part };
                    block.push(Line::new(Style::Entry, text).indented(if i == 0 { 10 } else { 18 }));
                }
            }
            block
        })
        .collect()
}

fn block_height(block: &[Line]) -> i64 {
    block.iter().map(|l| l.style.leading()).sum()
}

/// Lays out header, months and footer onto pages. A month block moves to a
/// fresh page when it does not fit but would fit on an empty one.
fn paginate(catalog: &GroupedCatalog) -> Vec<Vec<(Line, i64)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let usable = PAGE_HEIGHT - 2 * MARGIN;
    let mut pages: Vec<Vec<(Line, i64)>> = vec![Vec::new()];
    let mut y = top;

    let place = |line: Line, y: &mut i64, pages: &mut Vec<Vec<(Line, i64)>>| {
        if *y - line.style.leading() < MARGIN {
            pages.push(Vec::new());
            *y = top;
        }
        *y -= line.style.leading();
        if let Some(page) = pages.last_mut() {
            page.push((line, *y));
        }
    };

    for line in header_block(catalog) {
        place(line, &mut y, &mut pages);
    }
    y -= 18;

    for block in month_blocks(catalog) {
        let height = block_height(&block);
        if y - height < MARGIN && height <= usable && y < top {
            pages.push(Vec::new());
            y = top;
        }
        for line in block {
            place(line, &mut y, &mut pages);
        }
        y -= MONTH_GAP;
    }

    y -= 20;
    place(
        Line::new(
            Style::Footer,
            "(c) 2024 EduTrain Indonesia. Seluruh hak cipta dilindungi.",
        ),
        &mut y,
        &mut pages,
    );
    pages
}

fn page_operations(lines: &[(Line, i64)], first_page: bool) -> Vec<Operation> {
    let mut ops = Vec::new();

    if first_page {
        // Accent rule under the header.
        let (r, g, b) = Style::Brand.rgb();
        let rule_y = lines
            .iter()
            .find(|(line, _)| line.style == Style::Subtitle)
            .map(|(_, y)| *y - 8)
            .unwrap_or(PAGE_HEIGHT - MARGIN);
        ops.push(Operation::new(
            "RG",
            vec![Object::Real(r.into()), Object::Real(g.into()), Object::Real(b.into())],
        ));
        ops.push(Operation::new("w", vec![Object::Integer(2)]));
        ops.push(Operation::new(
            "m",
            vec![Object::Integer(MARGIN), Object::Integer(rule_y)],
        ));
        ops.push(Operation::new(
            "l",
            vec![Object::Integer(PAGE_WIDTH - MARGIN), Object::Integer(rule_y)],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    for (line, y) in lines {
        let style = line.style;
        let x = if style.centered() {
            ((PAGE_WIDTH - approx_width(&line.text, style.size())) / 2).max(MARGIN)
        } else {
            MARGIN + line.indent
        };
        let (r, g, b) = style.rgb();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "rg",
            vec![Object::Real(r.into()), Object::Real(g.into()), Object::Real(b.into())],
        ));
        ops.push(Operation::new(
            "Tf",
            vec![style.font().into(), Object::Integer(style.size())],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(x), Object::Integer(*y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_text(&line.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

pub fn render_pdf(catalog: &GroupedCatalog) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (index, lines) in paginate(catalog).iter().enumerate() {
        let content = Content {
            operations: page_operations(lines, index == 0),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&catalog.title)),
        "Producer" => Object::string_literal(concat!("edutrain ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{group, Training};

    fn busy_catalog(per_month: usize) -> GroupedCatalog {
        let trainings = (0..12).flat_map(|m| {
            (0..per_month).map(move |i| Training {
                name: format!("Pelatihan {m}-{i}"),
                month_index: Some(m),
                duration: Some("2 Hari".to_string()),
                ..Default::default()
            })
        });
        group("SMP", trainings)
    }

    #[test]
    fn pdf_has_header_and_pages() {
        let bytes = render_pdf(&busy_catalog(1)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn full_year_with_one_training_each_fits_one_page() {
        let pages = paginate(&busy_catalog(1));
        assert_eq!(pages.len(), 1);
        let last = pages[0].last().map(|(line, _)| line.style);
        assert_eq!(last, Some(Style::Footer));
    }

    #[test]
    fn empty_months_carry_a_note() {
        let pages = paginate(&group("SD", Vec::new()));
        let notes = pages
            .iter()
            .flatten()
            .filter(|(line, _)| line.text == EMPTY_MONTH_NOTE)
            .count();
        assert_eq!(notes, 12);
    }

    #[test]
    fn long_titles_wrap_inside_the_margins() {
        let title = "Pelatihan Guru Sekolah Menengah Atas dan Sekolah Menengah Kejuruan Program Penguatan Kompetensi Pedagogik";
        let pages = paginate(&group(title, Vec::new()));
        let titles: Vec<_> = pages[0]
            .iter()
            .filter(|(line, _)| line.style == Style::Title)
            .collect();
        assert!(titles.len() > 1);
        for (line, _) in titles {
            assert!(approx_width(&line.text, Style::Title.size()) <= PAGE_WIDTH - 2 * MARGIN);
        }
    }

    #[test]
    fn long_catalogs_spill_onto_more_pages() {
        let pages = paginate(&busy_catalog(6));
        assert!(pages.len() > 1);
        for page in pages.iter() {
            for (_, y) in page {
                assert!(*y >= MARGIN);
            }
        }
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(wrap("satu dua tiga", 8), vec!["satu dua", "tiga"]);
        assert_eq!(wrap("", 8), vec![String::new()]);
    }

    #[test]
    fn encode_text_replaces_non_latin1() {
        assert_eq!(encode_text("Hari \u{2014} é"), b"Hari ? \xe9".to_vec());
    }
}
