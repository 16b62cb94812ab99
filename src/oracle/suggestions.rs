use crate::oracle::dictionary::Dictionary;

const MAX_DISTANCE: usize = 2;

/// Ranked replacement candidates for a lowercase `word`.
///
/// Candidates come from three sources, cheapest first: single-edit
/// transformations, words sharing a prefix, and (for short words only) a
/// length-bounded walk of the dictionary. The merged list is ordered by
/// edit distance, ties keep discovery order.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    if max_suggestions == 0 || word.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, String)> = Vec::new();
    let push = |candidate: String, candidates: &mut Vec<(usize, String)>| {
        if candidate == word || candidates.iter().any(|(_, c)| *c == candidate) {
            return;
        }
        let distance = edit_distance(word, &candidate);
        if distance <= MAX_DISTANCE {
            candidates.push((distance, candidate));
        }
    };

    for transform in transformations(word) {
        if dictionary.contains(&transform) {
            push(transform, &mut candidates);
        }
    }

    let chars: Vec<char> = word.chars().collect();
    for prefix_len in [3, 2] {
        if chars.len() < prefix_len {
            continue;
        }
        let prefix: String = chars[..prefix_len].iter().collect();
        for candidate in dictionary.words_with_prefix(&prefix) {
            push(candidate, &mut candidates);
        }
        if candidates.len() >= max_suggestions {
            break;
        }
    }

    if candidates.len() < max_suggestions && chars.len() <= 3 {
        for candidate in dictionary.words_near_length(chars.len(), 1) {
            push(candidate, &mut candidates);
        }
    }

    candidates.sort_by_key(|(distance, _)| *distance);
    candidates
        .into_iter()
        .take(max_suggestions)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Deletions, adjacent transpositions and common keyboard/phonetic swaps.
fn transformations(word: &str) -> Vec<String> {
    const SWAPS: [(char, char); 11] = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::new();

    for i in 0..chars.len() {
        let mut edited = chars.clone();
        edited.remove(i);
        out.push(edited.into_iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut edited = chars.clone();
        edited.swap(i, i + 1);
        out.push(edited.into_iter().collect());
    }

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &SWAPS {
            let replacement = if ch == from {
                to
            } else if ch == to {
                from
            } else {
                continue;
            };
            let mut edited = chars.clone();
            edited[i] = replacement;
            out.push(edited.into_iter().collect());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("hello", "hallo"), 1);
        assert_eq!(edit_distance("teh", "the"), 2);
        assert_eq!(edit_distance("hello", "world"), 4);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_transformations() {
        let transforms = transformations("teh");
        assert!(transforms.contains(&"th".to_string()));
        assert!(transforms.contains(&"the".to_string()));
        assert!(transforms.contains(&"ted".to_string()));
    }

    #[test]
    fn test_generate_ranks_by_distance() {
        let dict = Dictionary::from_words(["the", "ten", "tea", "teeth", "zebra"]).unwrap();
        let suggestions = generate("teh", &dict, 5);

        assert!(suggestions.contains(&"the".to_string()));
        assert!(suggestions.contains(&"ten".to_string()));
        assert!(!suggestions.contains(&"zebra".to_string()));
        // Distance-1 candidates come before the transposition.
        let ten = suggestions.iter().position(|s| s == "ten").unwrap();
        let the = suggestions.iter().position(|s| s == "the").unwrap();
        assert!(ten < the);
    }

    #[test]
    fn test_generate_respects_limit() {
        let dict = Dictionary::from_words(["cat", "cap", "car", "can", "cab", "cut"]).unwrap();
        assert_eq!(generate("caz", &dict, 2).len(), 2);
        assert!(generate("caz", &dict, 0).is_empty());
    }

    #[test]
    fn test_generate_nothing_close() {
        let dict = Dictionary::from_words(["elephant"]).unwrap();
        assert!(generate("qqq", &dict, 5).is_empty());
    }
}
