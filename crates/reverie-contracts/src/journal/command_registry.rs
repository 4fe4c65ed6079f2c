#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "analyze",
        action: "analyze",
    },
    CommandSpec {
        command: "show",
        action: "show",
    },
    CommandSpec {
        command: "prompts",
        action: "prompts",
    },
    CommandSpec {
        command: "render",
        action: "render",
    },
    CommandSpec {
        command: "reset",
        action: "reset",
    },
];

pub(crate) const PANELS_COMMAND: CommandSpec = CommandSpec {
    command: "panels",
    action: "set_panels",
};

pub(crate) const MERGE_COMMAND: CommandSpec = CommandSpec {
    command: "merge",
    action: "set_merge",
};

pub(crate) const EXPORT_COMMAND: CommandSpec = CommandSpec {
    command: "export",
    action: "export",
};

/// A line holding only this marker analyzes the pending dream.
pub(crate) const ANALYZE_MARKER: &str = ".";

pub const JOURNAL_HELP_COMMANDS: &[&str] = &[
    "/help",
    "/analyze",
    "/show",
    "/prompts",
    "/render",
    "/reset",
    "/panels <n>",
    "/merge on|off",
    "/export <path>",
];
