//! 文本规范化
//!
//! 部分语音后端会把标点按字面读出（如意大利语读出 "punto"、"virgola"），
//! 规范化分两步：
//! 1. [`normalize_text`]：分段前执行，去掉冒号/分号、合并空白
//! 2. [`strip_spoken_punctuation`]：分段后对每个分段执行，去掉句号和逗号
//!
//! 句号和逗号是分段器依赖的边界，因此必须等分段完成后再去除。
//! 问号和感叹号保留以维持自然语调。

/// 分段前就可以去除的标点
#[inline]
fn is_inline_pause(ch: char) -> bool {
    matches!(ch, ':' | ';')
}

/// 分段后需要去除的标点
#[inline]
fn is_spoken_punctuation(ch: char) -> bool {
    matches!(ch, '.' | ',' | ':' | ';')
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 分段前规范化：去除首尾空白、冒号/分号，合并连续空白
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if is_inline_pause(c) { ' ' } else { c })
        .collect();
    collapse_whitespace(&replaced)
}

/// 分段后规范化：去除会被后端读出的标点
pub fn strip_spoken_punctuation(chunk: &str) -> String {
    let replaced: String = chunk
        .chars()
        .map(|c| if is_spoken_punctuation(c) { ' ' } else { c })
        .collect();
    collapse_whitespace(&replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Hello \n\n world\t! "), "Hello world !");
    }

    #[test]
    fn test_normalize_keeps_sentence_boundaries() {
        assert_eq!(
            normalize_text("Note: this works; really. Yes, it does?"),
            "Note this works really. Yes, it does?"
        );
    }

    #[test]
    fn test_strip_spoken_punctuation() {
        assert_eq!(
            strip_spoken_punctuation("Ciao, come stai. Bene!"),
            "Ciao come stai Bene!"
        );
        assert_eq!(strip_spoken_punctuation("..."), "");
    }
}
