pub mod cli_args;
pub mod formatter;

pub use cli_args::CliArgs;
pub use formatter::OutputFormatter;
