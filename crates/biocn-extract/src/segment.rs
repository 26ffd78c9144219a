//! Sentence segmentation for Chinese and Latin-script text.

/// Characters that end a sentence on their own.
const TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '；', ';', '…'];
/// Closing quotes and brackets that stay attached to the sentence they close.
const CLOSERS: &[char] = &['”', '’', '」', '』', '）', '》', ')', '"', '\''];

/// Split text into trimmed, non-empty sentences, keeping terminators.
///
/// A `.` only ends a sentence when followed by whitespace, a closer, or the
/// end of the text, so decimals and abbreviations like `3.14` stay intact.
/// Line breaks always end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            flush(&mut sentences, &mut current);
            continue;
        }
        current.push(c);

        let ends = if TERMINATORS.contains(&c) {
            true
        } else if c == '.' {
            chars
                .peek()
                .map_or(true, |n| n.is_whitespace() || CLOSERS.contains(n))
        } else {
            false
        };

        if ends {
            while let Some(&n) = chars.peek() {
                if TERMINATORS.contains(&n) || CLOSERS.contains(&n) {
                    current.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            flush(&mut sentences, &mut current);
        }
    }
    flush(&mut sentences, &mut current);

    sentences
}

fn flush(sentences: &mut Vec<String>, current: &mut String) {
    let s = current.trim();
    if !s.is_empty() {
        sentences.push(s.to_string());
    }
    current.clear();
}
