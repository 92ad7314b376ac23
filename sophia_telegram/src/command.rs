use teloxide::types::BotCommand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
}

impl Command {
    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        vec![BotCommand {
            command: "start".to_string(),
            description: "Dire bonjour à Soph_IA".to_string(),
        }]
    }

    /// Whether `text` opens with bot-command syntax: `/` followed by ASCII
    /// letters, digits or `_`. Anything else is ordinary text.
    #[must_use]
    pub fn is_command(text: &str) -> bool {
        split_command(text).is_some()
    }

    /// Parse a slash command, accepting an optional `@bot_name` suffix.
    ///
    /// A mention of another bot is not ours and yields `None`. An empty
    /// `bot_name` accepts any mention.
    #[must_use]
    pub fn parse_from_text(text: &str, bot_name: &str) -> Option<Self> {
        let (command, mention) = split_command(text)?;

        let bot_name = bot_name.trim_start_matches('@');
        if mention.is_some_and(|m| !bot_name.is_empty() && !m.eq_ignore_ascii_case(bot_name)) {
            return None;
        }

        if command.eq_ignore_ascii_case("start") {
            Some(Self::Start)
        } else {
            None
        }
    }
}

/// Split `/name@mention` at the start of `text`, the way Telegram delimits
/// a `bot_command` entity.
fn split_command(text: &str) -> Option<(&str, Option<&str>)> {
    const fn is_word(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    let rest = text.trim_start().strip_prefix('/')?;
    let end = rest.find(|c: char| !is_word(c)).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let (command, tail) = rest.split_at(end);

    let mention = tail.strip_prefix('@').and_then(|m| {
        let end = m.find(|c: char| !is_word(c)).unwrap_or(m.len());
        (end > 0).then(|| &m[..end])
    });

    Some((command, mention))
}
