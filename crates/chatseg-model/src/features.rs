//! Window feature extraction.
//!
//! A window of `k` messages is split into context (the first `k - 1`) and
//! response (the last). Features combine lexical cohesion, timing and the
//! participant pattern.

use std::collections::HashSet;

use chatseg_types::ChatMessage;

use crate::tfidf::TfIdfVectorizer;

/// Number of features per window.
pub const FEATURE_COUNT: usize = 6;

/// Feature names in row order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "sim_ctx_resp",
    "log_max_gap",
    "log_last_gap",
    "num_unique_users",
    "resp_user_seen",
    "question_in_last_context",
];

/// Feature vector of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFeatures {
    /// Cosine similarity between rendered context and rendered response
    pub sim_ctx_resp: f32,
    /// ln(1 + largest gap between neighbours)
    pub log_max_gap: f32,
    /// ln(1 + gap between the last two messages)
    pub log_last_gap: f32,
    /// Distinct users in the window
    pub num_unique_users: f32,
    /// 1.0 if the responder also wrote context
    pub resp_user_seen: f32,
    /// 1.0 if the last context message contains `?`
    pub question_in_last_context: f32,
}

impl WindowFeatures {
    /// Extract features from a window.
    ///
    /// Returns `None` for windows shorter than two messages.
    pub(crate) fn extract(window: &[ChatMessage], vectorizer: &TfIdfVectorizer) -> Option<Self> {
        let [.., last_context, response] = window else {
            return None;
        };
        let context = &window[..window.len() - 1];

        let context_text = context
            .iter()
            .map(ChatMessage::render)
            .collect::<Vec<_>>()
            .join("\n");
        let response_text = response.render();
        let sim_ctx_resp = vectorizer.cosine(&context_text, &response_text);

        let gaps: Vec<i64> = window.windows(2).map(|w| w[1].gap_since(&w[0])).collect();
        let max_gap = gaps.iter().copied().max().unwrap_or(0);
        let last_gap = gaps.last().copied().unwrap_or(0);

        let users: HashSet<&str> = window.iter().map(|m| m.user.as_str()).collect();
        let resp_user_seen = context.iter().any(|m| m.user == response.user);
        let question = last_context.text.contains('?');

        Some(Self {
            sim_ctx_resp,
            log_max_gap: (max_gap as f64).ln_1p() as f32,
            log_last_gap: (last_gap as f64).ln_1p() as f32,
            num_unique_users: users.len() as f32,
            resp_user_seen: indicator(resp_user_seen),
            question_in_last_context: indicator(question),
        })
    }

    /// Features as a dense row in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.sim_ctx_resp,
            self.log_max_gap,
            self.log_last_gap,
            self.num_unique_users,
            self.resp_user_seen,
            self.question_in_last_context,
        ]
    }
}

fn indicator(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfidf::VectorizerOptions;

    fn vectorizer() -> TfIdfVectorizer {
        TfIdfVectorizer::fit(
            &["deploy the service tonight", "lunch plans"],
            VectorizerOptions::default(),
        )
    }

    fn window() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(1, "alice", "should we deploy?", 0),
            ChatMessage::new(2, "bob", "lunch plans", 30),
            ChatMessage::new(3, "alice", "deploy the service tonight?", 90),
            ChatMessage::new(4, "carol", "yes deploy tonight", 100),
        ]
    }

    #[test]
    fn test_timing_features() {
        let f = WindowFeatures::extract(&window(), &vectorizer()).unwrap();
        assert!((f.log_max_gap - (60f64).ln_1p() as f32).abs() < 1e-6);
        assert!((f.log_last_gap - (10f64).ln_1p() as f32).abs() < 1e-6);
    }

    #[test]
    fn test_participant_features() {
        let f = WindowFeatures::extract(&window(), &vectorizer()).unwrap();
        assert_eq!(f.num_unique_users, 3.0);
        assert_eq!(f.resp_user_seen, 0.0);
        assert_eq!(f.question_in_last_context, 1.0);
    }

    #[test]
    fn test_response_user_seen() {
        let mut w = window();
        w[3].user = "bob".to_string();
        let f = WindowFeatures::extract(&w, &vectorizer()).unwrap();
        assert_eq!(f.resp_user_seen, 1.0);
        assert_eq!(f.num_unique_users, 2.0);
    }

    #[test]
    fn test_question_only_in_last_context() {
        let mut w = window();
        w[2].text = "deploy the service tonight".to_string();
        let f = WindowFeatures::extract(&w, &vectorizer()).unwrap();
        assert_eq!(f.question_in_last_context, 0.0);
    }

    #[test]
    fn test_out_of_order_gap_clamped() {
        let w = vec![
            ChatMessage::new(1, "a", "x", 100),
            ChatMessage::new(2, "b", "y", 50),
        ];
        let f = WindowFeatures::extract(&w, &vectorizer()).unwrap();
        assert_eq!(f.log_max_gap, 0.0);
        assert_eq!(f.log_last_gap, 0.0);
    }

    #[test]
    fn test_extreme_timestamps_give_finite_gaps() {
        let w = vec![
            ChatMessage::new(1, "a", "x", i64::MIN),
            ChatMessage::new(2, "b", "y", i64::MAX),
        ];
        let f = WindowFeatures::extract(&w, &vectorizer()).unwrap();
        let expected = (i64::MAX as f64).ln_1p() as f32;
        assert_eq!(f.log_max_gap, expected);
        assert_eq!(f.log_last_gap, expected);
        assert!(f.log_max_gap.is_finite());
    }

    #[test]
    fn test_similarity_positive_for_shared_terms() {
        let f = WindowFeatures::extract(&window(), &vectorizer()).unwrap();
        assert!(f.sim_ctx_resp > 0.0 && f.sim_ctx_resp <= 1.0);
    }

    #[test]
    fn test_single_message_window() {
        let w = vec![ChatMessage::new(1, "a", "x", 0)];
        assert!(WindowFeatures::extract(&w, &vectorizer()).is_none());
    }

    #[test]
    fn test_to_array_order() {
        let f = WindowFeatures::extract(&window(), &vectorizer()).unwrap();
        let row = f.to_array();
        assert_eq!(row[0], f.sim_ctx_resp);
        assert_eq!(row[3], f.num_unique_users);
        assert_eq!(row[5], f.question_in_last_context);
        assert_eq!(FEATURE_NAMES[5], "question_in_last_context");
    }
}
