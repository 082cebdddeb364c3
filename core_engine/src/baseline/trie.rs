use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
struct Node {
    children: BTreeMap<char, Node>,
    terminal_freq: u32,
}

/// Prefix tree of words weighted by a frequency.
#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: Node,
}

impl Trie {
    pub fn insert(&mut self, word: &str, freq: u32) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal_freq = node.terminal_freq.saturating_add(freq.max(1));
    }

    /// Words under `prefix`, highest frequency first, ties alphabetical.
    pub fn completions(&self, prefix: &str, limit: usize) -> Vec<(String, u32)> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut found = Vec::new();
        let mut buf = prefix.to_string();
        Self::collect(node, &mut buf, &mut found);
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        found.truncate(limit);
        found
    }

    fn collect(node: &Node, buf: &mut String, found: &mut Vec<(String, u32)>) {
        if node.terminal_freq > 0 {
            found.push((buf.clone(), node.terminal_freq));
        }
        for (ch, child) in node.children.iter() {
            buf.push(*ch);
            Self::collect(child, buf, found);
            buf.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_frequency_then_alphabet() {
        let mut trie = Trie::default();
        trie.insert("help", 3);
        trie.insert("hello", 5);
        trie.insert("helmet", 3);
        trie.insert("world", 9);

        let words: Vec<String> = trie
            .completions("hel", 10)
            .into_iter()
            .map(|(word, _)| word)
            .collect();
        assert_eq!(words, vec!["hello", "helmet", "help"]);
    }

    #[test]
    fn prefix_itself_counts_and_misses_are_empty() {
        let mut trie = Trie::default();
        trie.insert("go", 1);
        trie.insert("good", 1);
        assert_eq!(trie.completions("go", 1), vec![("go".to_string(), 1)]);
        assert!(trie.completions("x", 5).is_empty());
    }
}
