use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "transaction-store")]
#[command(about = "Transaction Store - validates and persists transactions over HTTP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Connect to the database and apply migrations
    Migrate,

    /// Print the resolved configuration
    Config,
}

pub fn handle_config_show(config: &Config) {
    println!("\n=== Configuration ===");
    println!("Server Port:         {}", config.server_port);
    println!("Database URL:        {}", config.redacted_database_url());
    println!("DB Max Connections:  {}", config.db_max_connections);
    println!("DB Connect Timeout:  {:?}", config.db_connect_timeout);
    println!("Store Timeout:       {:?}", config.store_timeout);
    println!("Max Body Bytes:      {}", config.max_body_bytes);
    println!("Log Level:           {}", config.log_level);
    println!("Log Format:          {:?}", config.log_format);
    println!("=====================\n");
}
