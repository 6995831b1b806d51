// Clustering OCR tokens into reading-order lines

use super::Token;

/// Maximum vertical distance (exclusive) between a token and a line key
pub const LINE_TOLERANCE: f64 = 15.0;

/// Tokens judged to share a text row, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Vertical position of the token that opened the line
    pub y: f64,
    pub tokens: Vec<Token>,
}

impl Line {
    /// Token texts joined with single spaces
    pub fn text(&self) -> String {
        join_texts(self.tokens.iter())
    }
}

pub(crate) fn join_texts<'a>(tokens: impl Iterator<Item = &'a Token>) -> String {
    tokens
        .map(|t| t.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group tokens into lines using [`LINE_TOLERANCE`].
pub fn assemble_lines(tokens: &[Token]) -> Vec<Line> {
    assemble_lines_with_tolerance(tokens, LINE_TOLERANCE)
}

/// Group tokens into lines.
///
/// Each token joins the line whose key is nearest and strictly closer than
/// `tolerance`; ties go to the line opened first. Otherwise it opens a new
/// line keyed by its own y. Lines come out top to bottom, tokens left to right.
pub fn assemble_lines_with_tolerance(tokens: &[Token], tolerance: f64) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for token in tokens {
        let y = token.center_y();

        let nearest = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx, (line.y - y).abs()))
            .filter(|(_, distance)| *distance < tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        match nearest {
            Some((idx, _)) => lines[idx].tokens.push(token.clone()),
            None => lines.push(Line {
                y,
                tokens: vec![token.clone()],
            }),
        }
    }

    for line in &mut lines {
        line.tokens.sort_by(|a, b| a.left_x().total_cmp(&b.left_x()));
    }
    lines.sort_by(|a, b| a.y.total_cmp(&b.y));

    lines
}
