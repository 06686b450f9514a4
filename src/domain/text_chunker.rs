//! 文本分段器
//!
//! 将任意长度的文本按句子切分为长度受限的有序分段

/// 默认分段最大字符数
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 200;

/// 检查是否为句末标点（其后紧跟空白时构成句子边界）
#[inline]
fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 按句子边界切分，丢弃空白句子
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if !is_sentence_terminator(ch) {
            continue;
        }
        let Some(&(next_i, next_ch)) = chars.peek() else {
            break;
        };
        if !next_ch.is_whitespace() {
            continue;
        }

        sentences.push(&text[start..i + ch.len_utf8()]);

        // 跳过连续空白
        let mut resume = next_i;
        while let Some(&(j, c)) = chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            resume = j + c.len_utf8();
            chars.next();
        }
        start = resume;
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 按逗号切分超长句子，除最后一段外都补回逗号
fn split_clauses(sentence: &str) -> Vec<String> {
    let parts: Vec<&str> = sentence.split(',').collect();
    let last = parts.len().saturating_sub(1);

    parts
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            let part = part.trim();
            if part.is_empty() {
                None
            } else if i < last {
                Some(format!("{},", part))
            } else {
                Some(part.to_string())
            }
        })
        .collect()
}

/// 贪心累积缓冲区
struct ChunkBuffer {
    max_chars: usize,
    current: String,
    current_chars: usize,
    chunks: Vec<String>,
}

impl ChunkBuffer {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            current: String::new(),
            current_chars: 0,
            chunks: Vec::new(),
        }
    }

    /// 追加片段；放不下时先把当前缓冲区作为完整分段输出
    fn push(&mut self, piece: &str) {
        let piece_chars = char_len(piece);
        let fits = self.current_chars == 0 || self.current_chars + 1 + piece_chars <= self.max_chars;

        if !fits {
            self.flush();
        }
        if self.current_chars > 0 {
            self.current.push(' ');
            self.current_chars += 1;
        }
        self.current.push_str(piece);
        self.current_chars += piece_chars;
    }

    fn flush(&mut self) {
        let chunk = self.current.trim().trim_end_matches(',').trim_end();
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_string());
        }
        self.current.clear();
        self.current_chars = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// 对文本进行分段
///
/// 分段策略：
/// 1. 文本不超过 `max_chars` 时整体作为唯一分段
/// 2. 否则按句子边界（`.` `!` `?` 后跟空白）切分，贪心合并相邻句子直到放不下
/// 3. 单句超过 `max_chars` 时再按逗号切分，同样贪心合并
/// 4. 既无句末标点也无逗号的超长文本整体作为一个分段
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut buffer = ChunkBuffer::new(max_chars);

    for sentence in split_sentences(text) {
        if char_len(sentence) <= max_chars {
            buffer.push(sentence);
            continue;
        }

        buffer.flush();
        for clause in split_clauses(sentence) {
            buffer.push(&clause);
        }
    }

    buffer.finish()
}
