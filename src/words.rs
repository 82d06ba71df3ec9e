//! Word vocabulary and the injectable word source lanes draw from.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A word in a lane's queue. Always drawn from a static list.
pub type Word = &'static str;

/// Common English words, drawn uniformly with replacement.
pub const VOCABULARY: &[Word] = &[
    "the", "be", "of", "and", "a", "to", "in", "he", "have", "it", "that", "for", "they", "with",
    "as", "not", "on", "she", "at", "by", "this", "we", "you", "do", "but", "from", "or", "which",
    "one", "would", "all", "will", "there", "say", "who", "make", "when", "can", "more", "if",
    "no", "man", "out", "other", "so", "what", "time", "up", "go", "about", "than", "into",
    "could", "state", "only", "new", "year", "some", "take", "come", "these", "know", "see",
    "use", "get", "like", "then", "first", "any", "work", "now", "may", "such", "give", "over",
    "think", "most", "even", "find", "day", "also", "after", "way", "many", "must", "look",
    "before", "great", "back", "through", "long", "where", "much", "should", "well", "people",
    "down", "own", "just", "because", "good", "each", "those", "feel", "seem", "how", "high",
    "too", "place", "little", "world", "very", "still", "nation", "hand", "old", "life", "tell",
    "write", "become", "here", "show", "house", "both", "between", "need", "mean", "call",
    "develop", "under", "last", "right", "move", "thing", "general", "school", "never", "same",
    "another", "begin", "while", "number", "part", "turn", "real", "leave", "might", "want",
    "point", "form", "off", "child", "few", "small", "since", "against", "ask", "late", "home",
    "interest", "large", "person", "end", "open", "public", "follow", "during", "present",
    "without", "again", "hold", "govern", "around", "possible", "head", "consider", "word",
    "program", "problem", "however", "lead", "system", "set", "order", "eye", "plan", "run",
    "keep", "face", "fact", "group", "play", "stand", "increase", "early", "course", "change",
    "help", "line",
];

/// Supplies fresh words for initial deals, refills and penalty lines.
pub trait WordSource {
    fn next_word(&mut self) -> Word;
}

/// Seeded uniform draw from [`VOCABULARY`].
#[derive(Debug, Clone)]
pub struct RandomWords {
    rng: ChaCha8Rng,
}

impl RandomWords {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl WordSource for RandomWords {
    fn next_word(&mut self) -> Word {
        VOCABULARY[self.rng.gen_range(0..VOCABULARY.len())]
    }
}

/// Deterministic source for tests: cycles through a fixed list.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct CycleWords {
    words: Vec<Word>,
    next: usize,
}

#[cfg(test)]
impl CycleWords {
    pub fn new(words: &[Word]) -> Self {
        assert!(!words.is_empty(), "CycleWords needs at least one word");
        Self {
            words: words.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl WordSource for CycleWords {
    fn next_word(&mut self) -> Word {
        let w = self.words[self.next % self.words.len()];
        self.next += 1;
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_lowercase_ascii_without_spaces() {
        assert_eq!(VOCABULARY.len(), 199);
        for w in VOCABULARY {
            assert!(!w.is_empty());
            assert!(w.chars().all(|c| c.is_ascii_lowercase()), "bad word {w:?}");
        }
    }

    #[test]
    fn same_seed_same_words() {
        let mut a = RandomWords::new(7);
        let mut b = RandomWords::new(7);
        for _ in 0..50 {
            assert_eq!(a.next_word(), b.next_word());
        }
    }

    #[test]
    fn draws_come_from_vocabulary() {
        let mut src = RandomWords::new(99);
        for _ in 0..200 {
            assert!(VOCABULARY.contains(&src.next_word()));
        }
    }

    #[test]
    fn cycle_words_wraps() {
        let mut src = CycleWords::new(&["a", "b"]);
        let got: Vec<_> = (0..5).map(|_| src.next_word()).collect();
        assert_eq!(got, ["a", "b", "a", "b", "a"]);
    }
}
