use clap::{Args, Subcommand};

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Find the "Adicionar Órgão Julgador" button and report how it was found
    Locate(LocateArgs),

    /// Find the "Adicionar Órgão Julgador" button and click it
    Click,

    /// Print the effective configuration
    Config,
}

#[derive(Args, Clone, Debug)]
pub struct LocateArgs {
    /// Attempt number to start counting from (3 runs a single attempt)
    #[arg(long, default_value_t = 1)]
    pub from_attempt: u32,
}
