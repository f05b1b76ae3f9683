//! Formats free text into `//` comment blocks for generated C++.

/// Marker placed in front of every non-empty comment line.
pub const COMMENT_PREFIX: &str = "//";

/// Text accepted by [`format_comment`]: one block, or an ordered list of
/// blocks (a doc comment followed by supplementary notes).
#[derive(Debug, Clone, Copy)]
pub enum CommentText<'a> {
    Block(&'a str),
    Blocks(&'a [String]),
}

impl<'a> From<&'a str> for CommentText<'a> {
    fn from(text: &'a str) -> Self {
        CommentText::Block(text)
    }
}

impl<'a> From<&'a String> for CommentText<'a> {
    fn from(text: &'a String) -> Self {
        CommentText::Block(text.as_str())
    }
}

impl<'a> From<&'a [String]> for CommentText<'a> {
    fn from(blocks: &'a [String]) -> Self {
        CommentText::Blocks(blocks)
    }
}

impl<'a> From<&'a Vec<String>> for CommentText<'a> {
    fn from(blocks: &'a Vec<String>) -> Self {
        CommentText::Blocks(blocks.as_slice())
    }
}

/// Render text as a comment indented by `indent` spaces.
///
/// Each block is split on `\n` and every line right-trimmed. Non-empty lines
/// become `<indent>//<line>`; empty lines become bare blank lines, except a
/// trailing empty line produced by a block ending in a newline, which is
/// dropped. A block that is entirely empty is an explicit separator and
/// yields one blank line.
///
/// ```
/// use twirpcpp::comment::format_comment;
///
/// assert_eq!(format_comment(" Makes a hat.\n", 4), "    // Makes a hat.\n");
/// ```
pub fn format_comment<'a>(text: impl Into<CommentText<'a>>, indent: usize) -> String {
    let padding = " ".repeat(indent);
    let mut out = String::new();

    let mut push_block = |block: &str| {
        let lines: Vec<&str> = block.split('\n').collect();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let line = line.trim_end_matches(['\n', '\r', ' ', '\t']);
            if !line.is_empty() {
                out.push_str(&padding);
                out.push_str(COMMENT_PREFIX);
                out.push_str(line);
                out.push('\n');
            } else if i != last || last == 0 {
                out.push('\n');
            }
        }
    };

    let text: CommentText<'a> = text.into();
    match text {
        CommentText::Block(block) => push_block(block),
        CommentText::Blocks(blocks) => blocks.iter().for_each(|b| push_block(b.as_str())),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_block_sequence_with_separator() {
        let blocks = vec![
            "line one".to_string(),
            String::new(),
            "line two".to_string(),
        ];
        assert_eq!(
            format_comment(&blocks, 2),
            "  //line one\n\n  //line two\n"
        );
    }

    #[test]
    fn formats_multiline_block() {
        assert_eq!(
            format_comment("line one\n\nline two", 2),
            "  //line one\n\n  //line two\n"
        );
    }

    #[test]
    fn drops_trailing_blank_line_of_block() {
        assert_eq!(format_comment(" Doc.\n", 0), "// Doc.\n");
        assert_eq!(format_comment(" Doc.\n   \n", 0), "// Doc.\n\n");
    }

    #[test]
    fn trims_trailing_whitespace() {
        assert_eq!(format_comment(" spaced  \t\r\nnext", 1), " // spaced\n //next\n");
    }

    #[test]
    fn empty_block_sequence_is_empty() {
        let blocks: Vec<String> = Vec::new();
        assert_eq!(format_comment(&blocks, 4), "");
    }

    #[test]
    fn merges_doc_and_note_blocks() {
        let blocks = vec![" Serves hats.\n".to_string(), " Route: /twirp/pkg.Hats".to_string()];
        assert_eq!(
            format_comment(&blocks, 0),
            "// Serves hats.\n// Route: /twirp/pkg.Hats\n"
        );
    }
}
