//! The text command grammar.
//!
//! Every inbound line is either a slash command or a plain chat message.
//! Matching is case-sensitive and prefix-based: `/users are great` is the
//! `/users` command, not a chat message. That ambiguity is part of the
//! protocol and is kept as-is; clients that want to say something starting
//! with a known prefix are out of luck.

/// One parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/quit` — say goodbye and close the connection.
    Quit,
    /// `/history` — replay the whole transcript to the requester.
    History,
    /// `/nickname <name>` — change the session nickname.
    Nickname(&'a str),
    /// `/users` — list the nicknames of all connected sessions.
    Users,
    /// `/task add <description>` — record a task owned by the caller.
    TaskAdd(&'a str),
    /// `/task list` — list all recorded tasks.
    TaskList,
    /// `/task delete <id>` — remove a task by id.
    TaskDelete(&'a str),
    /// Anything else — a chat message, broadcast to everyone else.
    Chat(&'a str),
}

impl<'a> Command<'a> {
    /// Parse one trimmed input line.
    ///
    /// Returns `None` for a recognized command with a missing argument;
    /// such lines are silently ignored by the server (no error reply).
    /// Arguments are the raw remainder after `splitn` on single spaces and
    /// are deliberately not trimmed.
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.starts_with("/quit") {
            Some(Command::Quit)
        } else if line.starts_with("/history") {
            Some(Command::History)
        } else if line.starts_with("/nickname") {
            let mut parts = line.splitn(2, ' ');
            parts.next();
            parts.next().map(Command::Nickname)
        } else if line.starts_with("/users") {
            Some(Command::Users)
        } else if line.starts_with("/task add") {
            let mut parts = line.splitn(3, ' ');
            parts.next();
            parts.next();
            parts.next().map(Command::TaskAdd)
        } else if line.starts_with("/task list") {
            Some(Command::TaskList)
        } else if line.starts_with("/task delete") {
            let mut parts = line.splitn(3, ' ');
            parts.next();
            parts.next();
            parts.next().map(Command::TaskDelete)
        } else {
            Some(Command::Chat(line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_is_chat() {
        assert_eq!(Command::parse("hello world"), Some(Command::Chat("hello world")));
    }

    #[test]
    fn test_empty_line_is_chat() {
        assert_eq!(Command::parse(""), Some(Command::Chat("")));
    }

    #[test]
    fn test_quit() {
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
    }

    #[test]
    fn test_history() {
        assert_eq!(Command::parse("/history"), Some(Command::History));
    }

    #[test]
    fn test_nickname_with_argument() {
        assert_eq!(Command::parse("/nickname Alice"), Some(Command::Nickname("Alice")));
    }

    #[test]
    fn test_nickname_argument_not_trimmed() {
        // Only the whole line is trimmed before dispatch; the extracted
        // argument keeps interior spacing verbatim.
        assert_eq!(
            Command::parse("/nickname Alice B"),
            Some(Command::Nickname("Alice B"))
        );
    }

    #[test]
    fn test_nickname_without_argument_ignored() {
        assert_eq!(Command::parse("/nickname"), None);
    }

    #[test]
    fn test_users() {
        assert_eq!(Command::parse("/users"), Some(Command::Users));
    }

    #[test]
    fn test_task_add() {
        assert_eq!(
            Command::parse("/task add fix bug"),
            Some(Command::TaskAdd("fix bug"))
        );
    }

    #[test]
    fn test_task_add_without_description_ignored() {
        assert_eq!(Command::parse("/task add"), None);
    }

    #[test]
    fn test_task_list() {
        assert_eq!(Command::parse("/task list"), Some(Command::TaskList));
    }

    #[test]
    fn test_task_delete() {
        assert_eq!(Command::parse("/task delete 1"), Some(Command::TaskDelete("1")));
    }

    #[test]
    fn test_task_delete_without_id_ignored() {
        assert_eq!(Command::parse("/task delete"), None);
    }

    #[test]
    fn test_unknown_task_subcommand_is_chat() {
        assert_eq!(
            Command::parse("/task frobnicate"),
            Some(Command::Chat("/task frobnicate"))
        );
    }

    #[test]
    fn test_prefix_matching_quirk_users() {
        // Prefix-based matching: chat text sharing a command prefix is
        // interpreted as the command. Documented protocol quirk.
        assert_eq!(Command::parse("/users are great"), Some(Command::Users));
    }

    #[test]
    fn test_prefix_matching_quirk_quit() {
        assert_eq!(Command::parse("/quitting now"), Some(Command::Quit));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(Command::parse("/QUIT"), Some(Command::Chat("/QUIT")));
    }
}
