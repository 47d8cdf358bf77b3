//! Command grammar matching
//!
//! Maps raw transcripts to the closed set of spoken navigation commands.
//! Pure string matching, no state: the grammar is a process-wide constant.

use serde::Serialize;

/// Hotword that activates command parsing
pub const HOTWORD: &str = "hey maitri";

/// Canonical spoken command phrases, in match order
pub const COMMANDS: [&str; 6] = [
    "open dashboard",
    "open chat",
    "open guardian",
    "open co-pilot",
    "open storyteller",
    "open playmate",
];

/// Matches transcripts against the spoken command grammar
#[derive(Debug, Clone)]
pub struct CommandGrammar {
    hotword: String,
    commands: Vec<String>,
}

impl Default for CommandGrammar {
    fn default() -> Self {
        Self::new(HOTWORD, COMMANDS.iter().map(ToString::to_string).collect())
    }
}

impl CommandGrammar {
    /// Create a grammar with a custom hotword and command set
    #[must_use]
    pub fn new(hotword: &str, commands: Vec<String>) -> Self {
        Self {
            hotword: hotword.to_lowercase().trim().to_string(),
            commands,
        }
    }

    /// Parse a transcript into a command phrase
    ///
    /// Case-insensitive. The transcript must start with the hotword (after
    /// trimming); the remainder is matched by prefix against the grammar in
    /// order, folding spelling variants ("co-pilot" / "copilot") to one
    /// token first. Returns the original command phrase, or `None` when the
    /// hotword is absent or nothing matches.
    #[must_use]
    pub fn parse(&self, transcript: &str) -> Option<&str> {
        let lower = transcript.trim().to_lowercase();
        let rest = lower.strip_prefix(&self.hotword)?;

        // Recognizers often insert a comma after the hotword
        let candidate = normalize_variants(
            rest.trim()
                .trim_start_matches([',', '.', '!', '?', ':', ';'])
                .trim(),
        );

        self.commands
            .iter()
            .find(|cmd| candidate.starts_with(&normalize_variants(&cmd.to_lowercase())))
            .map(String::as_str)
    }

    /// The configured hotword
    #[must_use]
    pub fn hotword(&self) -> &str {
        &self.hotword
    }

    /// The configured command phrases
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

/// Fold domain spelling variants to a canonical form
fn normalize_variants(s: &str) -> String {
    s.replace("co-pilot", "copilot")
}

/// A view the operator can navigate to by voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationTarget {
    /// Mission dashboard
    Dashboard,
    /// Companion chat
    Chat,
    /// Health guardian
    Guardian,
    /// Procedure co-pilot
    CoPilot,
    /// Storyteller diary
    Storyteller,
    /// Playmate games
    Playmate,
}

impl NavigationTarget {
    /// Resolve a matched command phrase to its navigation target
    #[must_use]
    pub fn from_command(command: &str) -> Option<Self> {
        match command.strip_prefix("open ")? {
            "dashboard" => Some(Self::Dashboard),
            "chat" => Some(Self::Chat),
            "guardian" => Some(Self::Guardian),
            "co-pilot" => Some(Self::CoPilot),
            "storyteller" => Some(Self::Storyteller),
            "playmate" => Some(Self::Playmate),
            _ => None,
        }
    }
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Chat => write!(f, "chat"),
            Self::Guardian => write!(f, "guardian"),
            Self::CoPilot => write!(f, "co-pilot"),
            Self::Storyteller => write!(f, "storyteller"),
            Self::Playmate => write!(f, "playmate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_transcript_without_hotword() {
        let grammar = CommandGrammar::default();
        assert_eq!(grammar.parse("open dashboard"), None);
        assert_eq!(grammar.parse("please open dashboard"), None);
        assert_eq!(grammar.parse(""), None);
    }

    #[test]
    fn rejects_hotword_not_at_start() {
        let grammar = CommandGrammar::default();
        assert_eq!(grammar.parse("I said hey maitri open chat"), None);
    }

    #[test]
    fn rejects_partial_hotword() {
        let grammar = CommandGrammar::default();
        assert_eq!(grammar.parse("hey mai open dashboard"), None);
    }

    #[test]
    fn matches_case_insensitively() {
        let grammar = CommandGrammar::default();
        assert_eq!(
            grammar.parse("HEY MAITRI OPEN DASHBOARD"),
            Some("open dashboard")
        );
        assert_eq!(
            grammar.parse("hey maitri open dashboard"),
            Some("open dashboard")
        );
    }

    #[test]
    fn tolerates_punctuation_after_hotword() {
        let grammar = CommandGrammar::default();
        assert_eq!(
            grammar.parse("Hey Maitri, open co-pilot"),
            Some("open co-pilot")
        );
    }

    #[test]
    fn folds_copilot_spelling_variants() {
        let grammar = CommandGrammar::default();
        // Recognizers emit either spelling; both resolve to the hyphenated
        // grammar entry.
        assert_eq!(
            grammar.parse("hey maitri open copilot"),
            Some("open co-pilot")
        );
        assert_eq!(
            grammar.parse("hey maitri open co-pilot"),
            Some("open co-pilot")
        );
    }

    #[test]
    fn prefix_match_allows_trailing_words() {
        let grammar = CommandGrammar::default();
        assert_eq!(
            grammar.parse("hey maitri open guardian right now please"),
            Some("open guardian")
        );
    }

    #[test]
    fn leading_whitespace_is_trimmed() {
        let grammar = CommandGrammar::default();
        assert_eq!(
            grammar.parse("   hey maitri open playmate"),
            Some("open playmate")
        );
    }

    #[test]
    fn unknown_command_returns_none() {
        let grammar = CommandGrammar::default();
        assert_eq!(grammar.parse("hey maitri open airlock"), None);
        assert_eq!(grammar.parse("hey maitri"), None);
    }

    #[test]
    fn navigation_targets_resolve() {
        assert_eq!(
            NavigationTarget::from_command("open co-pilot"),
            Some(NavigationTarget::CoPilot)
        );
        assert_eq!(
            NavigationTarget::from_command("open dashboard"),
            Some(NavigationTarget::Dashboard)
        );
        assert_eq!(NavigationTarget::from_command("open airlock"), None);
        assert_eq!(NavigationTarget::from_command("dashboard"), None);
    }
}
