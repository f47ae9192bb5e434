//! [`Args`] definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use service::domain::{user, Resource};

/// Administrative back-office of the Detty Fusion platform.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Command`] to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Back-office command.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Logs in and persists the session.
    Login {
        /// Email of the user.
        #[arg(long, env = "BACKOFFICE_EMAIL")]
        email: user::Email,

        /// Password of the user.
        #[arg(long, env = "BACKOFFICE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Keep the session only in the durable storage.
        #[arg(long)]
        remember_me: bool,
    },

    /// Clears the persisted session.
    Logout,

    /// Checks whether the persisted session admits into the back-office.
    Gate,

    /// Lists items of a resource collection.
    List {
        /// Resource collection to list.
        resource: Resource,

        /// Query parameter as `key=value`.
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },

    /// Fetches a single item of a resource collection.
    Get {
        /// Resource collection the item belongs to.
        resource: Resource,

        /// ID of the item.
        id: String,
    },

    /// Creates a new item in a resource collection.
    Create {
        /// Resource collection to create the item in.
        resource: Resource,

        /// JSON fields of the new item.
        #[arg(long)]
        data: serde_json::Value,
    },

    /// Updates an item of a resource collection.
    Update {
        /// Resource collection the item belongs to.
        resource: Resource,

        /// ID of the item.
        id: String,

        /// JSON fields to update.
        #[arg(long)]
        data: serde_json::Value,
    },

    /// Deletes an item of a resource collection.
    Delete {
        /// Resource collection the item belongs to.
        resource: Resource,

        /// ID of the item.
        id: String,
    },

    /// Uploads gallery images of a resource item.
    Upload {
        /// Resource collection the item belongs to.
        resource: Resource,

        /// ID of the item.
        id: String,

        /// Image files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Changes the password of the logged-in user.
    ChangePassword {
        /// Current password.
        #[arg(long, env = "BACKOFFICE_PASSWORD", hide_env_values = true)]
        current: String,

        /// New password.
        #[arg(long, env = "BACKOFFICE_NEW_PASSWORD", hide_env_values = true)]
        new: String,

        /// New password, repeated.
        #[arg(long)]
        confirm: String,
    },
}

impl Command {
    /// Indicates whether this [`Command`] enters the protected area, so has
    /// to pass the [`AuthGate`] first.
    ///
    /// [`AuthGate`]: service::AuthGate
    #[must_use]
    pub fn is_protected(&self) -> bool {
        match self {
            Self::Login { .. } | Self::Logout | Self::Gate => false,
            Self::List { .. }
            | Self::Get { .. }
            | Self::Create { .. }
            | Self::Update { .. }
            | Self::Delete { .. }
            | Self::Upload { .. }
            | Self::ChangePassword { .. } => true,
        }
    }
}

/// Parses a `key=value` pair.
fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("`{s}` is not a `key=value` pair"))
}
