use leadline_core::ConversationTurn;

/// Build the bounded context window for a chat call: drop entries whose text
/// equals the new utterance (the utterance travels separately, so keeping it
/// would duplicate it), drop empty entries, then keep only the most recent
/// `limit` turns in order.
pub fn build_context_window(
    transcript: &[ConversationTurn],
    utterance: &str,
    limit: usize,
) -> Vec<ConversationTurn> {
    let filtered: Vec<&ConversationTurn> = transcript
        .iter()
        .filter(|turn| !turn.text.is_empty() && turn.text != utterance)
        .collect();

    let start = filtered.len().saturating_sub(limit);
    filtered[start..].iter().map(|turn| (*turn).clone()).collect()
}

#[cfg(test)]
mod tests {
    use leadline_core::ConversationTurn;

    use super::build_context_window;

    fn transcript(texts: &[&str]) -> Vec<ConversationTurn> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                if i % 2 == 0 {
                    ConversationTurn::user(*text)
                } else {
                    ConversationTurn::assistant(*text)
                }
            })
            .collect()
    }

    #[test]
    fn window_is_bounded_to_most_recent_entries() {
        let turns = transcript(&[
            "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8", "t9", "t10", "t11",
        ]);
        let window = build_context_window(&turns, "new message", 10);

        assert_eq!(window.len(), 10);
        assert_eq!(window.first().unwrap().text, "t2");
        assert_eq!(window.last().unwrap().text, "t11");
    }

    #[test]
    fn entries_matching_the_utterance_are_dropped() {
        let turns = transcript(&["hello", "hi!", "tell me more"]);
        let window = build_context_window(&turns, "tell me more", 10);

        assert_eq!(window.len(), 2);
        assert!(window.iter().all(|turn| turn.text != "tell me more"));
    }

    #[test]
    fn dedup_applies_before_the_bound() {
        // 11 entries, one of which matches the utterance: after dedup the
        // remaining 10 all fit the window.
        let mut turns = transcript(&["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8", "t9"]);
        turns.push(ConversationTurn::user("repeat"));
        let window = build_context_window(&turns, "repeat", 10);

        assert_eq!(window.len(), 10);
        assert_eq!(window.first().unwrap().text, "t0");
    }

    #[test]
    fn empty_entries_are_dropped() {
        let mut turns = transcript(&["hello"]);
        turns.push(ConversationTurn::assistant(""));
        let window = build_context_window(&turns, "next", 10);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn order_is_preserved() {
        let turns = transcript(&["a", "b", "c"]);
        let window = build_context_window(&turns, "d", 10);
        let texts: Vec<&str> = window.iter().map(|turn| turn.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
