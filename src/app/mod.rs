// Application layer: the CLI subcommands wired to the engine and renderers.

pub mod commands;

pub use commands::execute;
