/// Wrapped rendering of an input field plus the screen cell of every cursor
/// position (one per char boundary, `text.chars().count() + 1` entries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    pub lines: Vec<String>,
    pub positions: Vec<(u16, u16)>,
}

impl InputLayout {
    pub fn rendered(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> u16 {
        self.positions
            .iter()
            .map(|(line, _)| *line)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    pub fn cursor(&self, idx: usize) -> (u16, u16) {
        self.positions
            .get(idx)
            .or_else(|| self.positions.last())
            .copied()
            .unwrap_or((0, 0))
    }
}

/// Greedy word wrap: a word that fits on a line never straddles two; longer
/// words are broken at the width.
pub fn layout_input(text: &str, width: u16) -> InputLayout {
    let width = usize::from(width.max(1));
    let chars: Vec<char> = text.chars().collect();
    let mut lines = vec![String::new()];
    let mut positions = Vec::with_capacity(chars.len() + 1);
    let mut col = 0usize;

    for (idx, &ch) in chars.iter().enumerate() {
        if ch == '\n' {
            positions.push(cell(lines.len() - 1, col));
            lines.push(String::new());
            col = 0;
            continue;
        }
        let starts_word = !ch.is_whitespace() && (idx == 0 || chars[idx - 1].is_whitespace());
        if starts_word && col > 0 {
            let word_len = chars[idx..]
                .iter()
                .take_while(|c| !c.is_whitespace())
                .count();
            if word_len <= width && col + word_len > width {
                lines.push(String::new());
                col = 0;
            }
        }
        if col == width {
            lines.push(String::new());
            col = 0;
        }
        positions.push(cell(lines.len() - 1, col));
        if let Some(line) = lines.last_mut() {
            line.push(ch);
        }
        col += 1;
    }

    let end = if col == width {
        cell(lines.len(), 0)
    } else {
        cell(lines.len() - 1, col)
    };
    positions.push(end);
    InputLayout { lines, positions }
}

fn cell(line: usize, col: usize) -> (u16, u16) {
    (
        u16::try_from(line).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

/// Password fields show one `*` per character.
pub fn mask(text: &str) -> String {
    "*".repeat(text.chars().count())
}
