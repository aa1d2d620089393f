use crate::fonts::FontFace;

pub(super) struct TextLine {
    pub(super) text: String,
    pub(super) width: f32,
}

fn finish_line(words: &mut Vec<&str>, width: f32) -> TextLine {
    let line = TextLine {
        text: words.join(" "),
        width,
    };
    words.clear();
    line
}

/// Greedy word wrap of `text` into lines no wider than `max_width`.
/// Explicit newlines start a new line; a word wider than the line is kept
/// whole on a line of its own. Always yields at least one line.
pub(super) fn wrap_text(text: &str, face: &FontFace, font_size: f32, max_width: f32) -> Vec<TextLine> {
    let space_w = face.space_width(font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words: Vec<&str> = Vec::new();
        let mut current_x = 0.0f32;
        for word in paragraph.split_whitespace() {
            let ww = face.word_width(word, font_size);
            let proposed_x = if words.is_empty() {
                ww
            } else {
                current_x + space_w + ww
            };
            if !words.is_empty() && proposed_x > max_width {
                lines.push(finish_line(&mut words, current_x));
                current_x = ww;
            } else {
                current_x = proposed_x;
            }
            words.push(word);
        }
        lines.push(finish_line(&mut words, current_x));
    }

    if lines.is_empty() {
        lines.push(TextLine {
            text: String::new(),
            width: 0.0,
        });
    }
    lines
}
