//! Small-talk detection

use regex::Regex;

use crate::config::SmallTalkConfig;
use crate::error::{Error, Result};

/// Recognizes greetings and chit-chat that need no lookup
pub struct SmallTalkDetector {
    patterns: Vec<Regex>,
    reply: String,
}

impl SmallTalkDetector {
    pub fn new(config: &SmallTalkConfig) -> Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| Error::Config(format!("Invalid small-talk pattern {:?}: {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            reply: config.reply.clone(),
        })
    }

    /// True when the lower-cased question matches any pattern
    pub fn is_small_talk(&self, question: &str) -> bool {
        let lowered = question.to_lowercase();
        self.patterns.iter().any(|p| p.is_match(&lowered))
    }

    /// The canned reply
    pub fn reply(&self) -> &str {
        &self.reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SmallTalkDetector {
        SmallTalkDetector::new(&SmallTalkConfig::default()).unwrap()
    }

    #[test]
    fn test_greetings_and_farewells() {
        let detector = detector();
        for question in ["hello", "Hi there", "HEY!", "Good morning", "thanks a lot", "bye", "Who made you?"] {
            assert!(detector.is_small_talk(question), "{question}");
        }
    }

    #[test]
    fn test_inventory_questions_are_not_small_talk() {
        let detector = detector();
        for question in [
            "How many laptops are in stock?",
            "Who are the employees",
            "What is the return policy for damaged items?",
            "show shipments from this week",
        ] {
            assert!(!detector.is_small_talk(question), "{question}");
        }
    }

    #[test]
    fn test_word_boundaries() {
        // "hi" inside "shipping" must not trigger
        assert!(!detector().is_small_talk("shipping status of order 42"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = SmallTalkConfig {
            patterns: vec!["(unclosed".to_string()],
            ..SmallTalkConfig::default()
        };
        assert!(matches!(SmallTalkDetector::new(&config), Err(Error::Config(_))));
    }
}
