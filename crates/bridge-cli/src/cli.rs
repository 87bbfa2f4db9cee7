//! Argument definitions for the `bridge` client.

use clap::Parser;

/// Default bridge host when `SOCKET_HOST` is unset.
pub const DEFAULT_HOST: &str = "localhost";
/// Default bridge port when `SOCKET_PORT` is unset.
pub const DEFAULT_PORT: u16 = 7345;

/// Invokes a named operation on the application behind a running bridge.
#[derive(Parser, Debug)]
#[command(name = "bridge", version)]
pub(crate) struct Cli {
    /// Bridge host.
    #[arg(long, env = "SOCKET_HOST", default_value = DEFAULT_HOST)]
    pub(crate) host: String,
    /// Bridge port.
    #[arg(long, env = "SOCKET_PORT", default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    /// Writes the reply to `response.txt` instead of stdout.
    #[arg(long)]
    pub(crate) file: bool,
    /// Operation name, for example `send`.
    #[arg(value_name = "NAME")]
    pub(crate) name: String,
    /// Operation arguments.
    #[arg(value_name = "ARG", num_args = 0.., allow_negative_numbers = true)]
    pub(crate) arguments: Vec<String>,
}
