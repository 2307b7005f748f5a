//! Heuristic matcher — local keyword logic, fully independent of the LLM.
//!
//! Exact token matching against an injected vocabulary. No stemming, no
//! frequency weighting; presence in both texts is the whole signal.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;

use crate::errors::AppError;

/// Token class: a letter followed by letters, digits, or the symbol set
/// that keeps "c++", "c#", and "node.js" intact as single tokens.
const TOKEN_PATTERN: &str = "[a-z][a-z0-9.+#-]*";

/// Section headers gating resume-likeness. A cheap substring test, not a
/// classifier; false positives and negatives are acceptable.
const RESUME_SECTION_WORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "projects",
    "summary",
    "work",
    "internship",
];

/// Built-in recognized skill tokens: language names, frameworks,
/// platforms, tools. Overridable via SKILL_KEYWORDS_FILE.
const DEFAULT_SKILL_KEYWORDS: &[&str] = &[
    "python", "java", "c++", "c#", "javascript", "typescript",
    "react", "node", "express", "angular", "vue",
    "html", "css", "tailwind", "bootstrap",
    "sql", "mysql", "postgresql", "mongodb", "oracle",
    "aws", "azure", "gcp", "docker", "kubernetes",
    "tensorflow", "pytorch", "scikit-learn", "keras",
    "hadoop", "spark", "tableau", "powerbi",
    "git", "linux", "bash",
];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token regex"))
}

/// Lowercases the text and extracts every maximal token run.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True when any known section header appears anywhere in the text.
pub fn looks_like_resume(text: &str) -> bool {
    let lowered = text.to_lowercase();
    RESUME_SECTION_WORDS.iter().any(|word| lowered.contains(word))
}

/// The recognized-skill set. Injected through `AppState` so the vocabulary
/// can grow without touching the matching logic.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    skills: HashSet<String>,
}

impl SkillVocabulary {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skills: skills
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }

    /// Loads one token per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary from '{path}'"))?;
        Ok(Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        ))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.skills.contains(token)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILL_KEYWORDS.iter().copied())
    }
}

/// Pluggable matcher seam. Carried in `AppState` as `Arc<dyn SkillMatcher>`
/// so a semantic backend could be swapped in without touching handlers.
#[async_trait]
pub trait SkillMatcher: Send + Sync {
    async fn matched_skills(
        &self,
        jd_text: &str,
        resume_text: &str,
    ) -> Result<Vec<String>, AppError>;
}

/// Default backend: set intersection of recognized tokens appearing in
/// both texts, sorted for deterministic output.
pub struct KeywordSkillMatcher {
    vocabulary: SkillVocabulary,
}

impl KeywordSkillMatcher {
    pub fn new(vocabulary: SkillVocabulary) -> Self {
        Self { vocabulary }
    }

    fn intersect(&self, jd_text: &str, resume_text: &str) -> Vec<String> {
        let jd_skills: BTreeSet<String> = tokenize(jd_text)
            .into_iter()
            .filter(|token| self.vocabulary.contains(token))
            .collect();
        let resume_skills: BTreeSet<String> = tokenize(resume_text)
            .into_iter()
            .filter(|token| self.vocabulary.contains(token))
            .collect();

        jd_skills.intersection(&resume_skills).cloned().collect()
    }
}

#[async_trait]
impl SkillMatcher for KeywordSkillMatcher {
    async fn matched_skills(
        &self,
        jd_text: &str,
        resume_text: &str,
    ) -> Result<Vec<String>, AppError> {
        Ok(self.intersect(jd_text, resume_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_exact_output_for_symbolic_skills() {
        let tokens = tokenize("Node.js developer, C++ and C#");
        assert_eq!(tokens, vec!["node.js", "developer", "c++", "and", "c#"]);
    }

    #[test]
    fn test_tokenize_drops_leading_digits() {
        // Tokens must start with a letter; "3d" only matches from "d".
        let tokens = tokenize("3d modelling");
        assert_eq!(tokens, vec!["d", "modelling"]);
    }

    #[test]
    fn test_looks_like_resume_accepts_section_headers() {
        assert!(looks_like_resume("EDUCATION\nB.Tech in CS\nEXPERIENCE\n..."));
        assert!(looks_like_resume("my internship at a startup"));
    }

    #[test]
    fn test_looks_like_resume_rejects_unrelated_text() {
        assert!(!looks_like_resume("A recipe for banana bread. Mix flour and sugar."));
    }

    #[test]
    fn test_matched_skills_is_intersection_with_vocabulary() {
        let matcher = KeywordSkillMatcher::new(SkillVocabulary::default());
        let jd = "Looking for Python, Docker and Kubernetes. Must enjoy meetings.";
        let resume = "Shipped Python services on Docker. Never touched Kubernetes.";
        assert_eq!(
            matcher.intersect(jd, resume),
            vec!["docker", "kubernetes", "python"]
        );
    }

    #[test]
    fn test_matched_skills_is_symmetric() {
        let matcher = KeywordSkillMatcher::new(SkillVocabulary::default());
        let a = "java sql aws meetings";
        let b = "aws java tennis";
        assert_eq!(matcher.intersect(a, b), matcher.intersect(b, a));
    }

    #[test]
    fn test_matched_skills_excludes_unrecognized_tokens() {
        let matcher = KeywordSkillMatcher::new(SkillVocabulary::default());
        // "meetings" appears in both but is not a recognized skill.
        assert_eq!(
            matcher.intersect("meetings python", "python meetings"),
            vec!["python"]
        );
    }

    #[test]
    fn test_matched_skills_case_insensitive() {
        let matcher = KeywordSkillMatcher::new(SkillVocabulary::default());
        assert_eq!(matcher.intersect("PYTHON", "Python"), vec!["python"]);
    }

    #[test]
    fn test_injected_vocabulary_replaces_default() {
        let matcher = KeywordSkillMatcher::new(SkillVocabulary::new(["cobol"]));
        assert_eq!(matcher.intersect("cobol python", "python cobol"), vec!["cobol"]);
    }

    #[test]
    fn test_vocabulary_normalizes_to_lowercase() {
        let vocabulary = SkillVocabulary::new(["Rust", "GoLang"]);
        assert!(vocabulary.contains("rust"));
        assert!(vocabulary.contains("golang"));
        assert_eq!(vocabulary.len(), 2);
    }
}
