//! Background removal CLI
//!
//! Thin entry point over `bgremove_chain::cli`.

use bgremove_chain::cli;

fn main() -> anyhow::Result<()> {
    cli::main()
}
