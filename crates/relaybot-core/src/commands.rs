//! `!`-prefixed chat commands and the fixed reply texts.

use crate::stats::AccountStats;

pub const COMMAND_PREFIX: char = '!';

pub const RESET_REPLY: &str = "✅ Stats have been reset.";
pub const COMPLETION_FAILED_REPLY: &str = "❌ Something went wrong with the AI.";

/// Both reset commands zero the sender's counters; the scope is only a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetScope {
    Daily,
    Monthly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `!stats [account]`
    Stats { target: Option<String> },
    /// `!reset-daily` / `!reset-monthly`
    Reset(ResetScope),
    /// Any other prefixed text. Ignored without a reply.
    Unknown,
}

impl Command {
    /// Parse trimmed message text. `None` if it is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with(COMMAND_PREFIX) {
            return None;
        }

        match text {
            "!reset-daily" => return Some(Command::Reset(ResetScope::Daily)),
            "!reset-monthly" => return Some(Command::Reset(ResetScope::Monthly)),
            _ => {}
        }

        // Whole-token match: `!statistics` is not `!stats`.
        let mut parts = text.split_whitespace();
        if parts.next() == Some("!stats") {
            let target = parts.next().map(str::to_string);
            return Some(Command::Stats { target });
        }

        Some(Command::Unknown)
    }
}

pub fn format_stats(account: &str, stats: AccountStats) -> String {
    format!(
        "📊 Stats for `{account}` — Inputs: {}, Tokens: {}",
        stats.inputs, stats.tokens
    )
}

pub fn format_log_line(account: &str, stats: AccountStats) -> String {
    format!(
        "📨 `{account}` — Inputs: {} | Tokens: {}",
        stats.inputs, stats.tokens
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("  what is !stats"), None);
    }

    #[test]
    fn stats_with_and_without_target() {
        assert_eq!(
            Command::parse("!stats"),
            Some(Command::Stats { target: None })
        );
        assert_eq!(
            Command::parse("  !stats   beta  "),
            Some(Command::Stats {
                target: Some("beta".to_string())
            })
        );
        assert_eq!(Command::parse("!statistics"), Some(Command::Unknown));
    }

    #[test]
    fn reset_aliases_need_an_exact_match() {
        assert_eq!(
            Command::parse("!reset-daily"),
            Some(Command::Reset(ResetScope::Daily))
        );
        assert_eq!(
            Command::parse(" !reset-monthly "),
            Some(Command::Reset(ResetScope::Monthly))
        );
        assert_eq!(Command::parse("!reset-daily now"), Some(Command::Unknown));
        assert_eq!(Command::parse("!"), Some(Command::Unknown));
    }

    #[test]
    fn reply_formats() {
        let s = AccountStats {
            inputs: 5,
            tokens: 100,
        };
        assert_eq!(
            format_stats("alpha", s),
            "📊 Stats for `alpha` — Inputs: 5, Tokens: 100"
        );
        assert_eq!(format_log_line("alpha", s), "📨 `alpha` — Inputs: 5 | Tokens: 100");
    }
}
