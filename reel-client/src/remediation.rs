//! Content-policy remediation
//!
//! When a vendor rejects a task for content-policy reasons, the prompt is
//! rewritten once with neutral wording and resubmitted.

use rand::Rng;
use rand::seq::SliceRandom;
use regex_lite::{NoExpand, Regex};
use std::sync::LazyLock;

/// Failure-reason fragments that identify a content-policy rejection
const POLICY_KEYWORDS: &[&str] = &["violate", "guardrails", "nudity", "sexuality", "erotic"];

/// Ordered substitutions applied to a rejected prompt
const SUBSTITUTIONS: &[(&str, &str)] = &[
    (r"(?i)\b(nudity|naked|nude)\b", "clothed figure"),
    (r"(?i)\b(sexy|sexuality|erotic)\b", "artistic"),
    (r"(?i)\b(provocative|seductive)\b", "elegant"),
    (r"(?i)\b(sexual|intimate)\b", "emotional"),
];

/// Phrases appended to a prompt after a substitution fired
const SAFETY_MODIFIERS: &[&str] = &[
    "family-friendly content",
    "professional cinematography",
    "artistic interpretation",
    "safe for all audiences",
    "modest portrayal",
];

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SUBSTITUTIONS
        .iter()
        .map(|(pattern, replacement)| {
            let regex = Regex::new(pattern).expect("built-in substitution pattern is valid");
            (regex, *replacement)
        })
        .collect()
});

/// A rewritten prompt and what was done to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    pub prompt: String,
    /// Number of matches replaced across all rules
    pub substitutions: usize,
    pub modifier: Option<&'static str>,
}

/// Detects policy rejections and rewrites prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptRemediator;

impl PromptRemediator {
    pub fn new() -> Self {
        Self
    }

    /// Check whether a failure reason reads like a content-policy rejection
    pub fn is_policy_violation(&self, reason: &str) -> bool {
        let reason = reason.to_lowercase();
        POLICY_KEYWORDS
            .iter()
            .any(|keyword| reason.contains(keyword))
    }

    /// Rewrites a prompt using the thread-local RNG to pick the modifier
    pub fn remediate(&self, prompt: &str) -> Remediation {
        self.remediate_with(prompt, &mut rand::thread_rng())
    }

    /// Rewrites a prompt using the given RNG to pick the modifier
    pub fn remediate_with<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> Remediation {
        let mut rewritten = prompt.to_string();
        let mut substitutions = 0;

        for (regex, replacement) in RULES.iter() {
            let matches = regex.find_iter(&rewritten).count();
            if matches > 0 {
                rewritten = regex
                    .replace_all(&rewritten, NoExpand(*replacement))
                    .into_owned();
                substitutions += matches;
            }
        }

        let modifier = if substitutions > 0 {
            SAFETY_MODIFIERS.choose(rng).copied()
        } else {
            None
        };

        if let Some(modifier) = modifier {
            rewritten = format!("{}, {}", rewritten, modifier);
        }

        Remediation {
            prompt: rewritten,
            substitutions,
            modifier,
        }
    }
}
