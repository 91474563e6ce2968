use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::input::InputFormat;

#[derive(Parser)]
#[command(name = "umapi")]
#[command(about = "Manage Adobe Admin Console users and groups from the command line")]
#[command(long_about = "umapi - User Management API command-line client

Reads, creates, updates and deletes users and user groups of an Adobe
organization, one at a time or in bulk from CSV or JSON-lines files.

QUICK START:
  umapi user-read -e jdoe@example.com          Show one user
  umapi user-read-all -f csv -o users.csv      Export every user
  umapi user-create --email jdoe@example.com --country US
  umapi user-delete-bulk -i leavers.csv        Remove users listed in a file

CREDENTIALS:
  Set UMAPI_CLIENT_ID, UMAPI_CLIENT_SECRET and UMAPI_ORG_ID, or pass a
  YAML file with --config. Environment variables win over the file.

Use --test to have the API validate changes without applying them.")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// YAML file with connection settings
    #[arg(long, value_name = "FILE", env = "UMAPI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Run in test mode (changes are validated but not applied)
    #[arg(short = 't', long = "test", global = true)]
    pub test_mode: bool,

    /// Enable verbose logging (-v for progress, -vv for debug)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for read commands.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Padded `key : value` blocks (default).
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
    /// CSV with a header row.
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get details for a single user
    ///
    /// # Examples
    ///
    ///   umapi user-read -e jdoe@example.com
    ///   umapi user-read -e jdoe@example.com -f json
    UserRead(UserReadArgs),

    /// Get details for all users belonging to the organization
    ///
    /// # Examples
    ///
    ///   umapi user-read-all
    ///   umapi user-read-all -f csv -o users.csv
    UserReadAll(ReadAllArgs),

    /// Get details for a single user group
    ///
    /// The name is matched ignoring case and surrounding whitespace.
    GroupRead(GroupReadArgs),

    /// Get details for all groups and product profiles
    GroupReadAll(ReadAllArgs),

    /// Create a single user
    ///
    /// # Examples
    ///
    ///   umapi user-create \
    ///       --type federatedID \
    ///       --email test.user.001@example.com \
    ///       --groups group1,group2 \
    ///       --firstname Test --lastname "User 001" \
    ///       --country US
    UserCreate(UserCreateArgs),

    /// Create users in bulk from an input file
    ///
    /// Columns: type, email, firstname, lastname, country, username, domain, groups
    UserCreateBulk(BulkArgs),

    /// Update a single user
    UserUpdate(UserUpdateArgs),

    /// Update users in bulk from an input file
    ///
    /// Columns: email, email_new, firstname, lastname, username, add_groups, remove_groups
    UserUpdateBulk(BulkArgs),

    /// Delete a single user (from the organization and optionally the directory)
    UserDelete(UserDeleteArgs),

    /// Delete users in bulk from an input file
    ///
    /// Columns: email, hard_delete (Y or N)
    UserDeleteBulk(BulkArgs),

    /// Create a single user group
    ///
    /// # Examples
    ///
    ///   umapi group-create --name "Adobe Stock Users" --description "Stock provisioning group"
    GroupCreate(GroupCreateArgs),

    /// Create groups in bulk from an input file
    ///
    /// Columns: name, description
    GroupCreateBulk(BulkArgs),

    /// Update information and memberships of a single group
    GroupUpdate(GroupUpdateArgs),

    /// Update groups in bulk from an input file
    ///
    /// Columns: name, name_new, description, add_users, remove_users,
    /// add_profiles, remove_profiles
    GroupUpdateBulk(BulkArgs),

    /// Delete a single user group
    GroupDelete(GroupDeleteArgs),

    /// Delete groups in bulk from an input file
    ///
    /// Columns: name
    GroupDeleteBulk(BulkArgs),

    /// Generate shell completions
    ///
    /// Example: umapi completions bash > ~/.bash_completion.d/umapi
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for reading a single user.
#[derive(Args, Debug)]
pub struct UserReadArgs {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// User email address
    #[arg(short, long)]
    pub email: String,
}

/// Arguments for reading a single group.
#[derive(Args, Debug)]
pub struct GroupReadArgs {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Group name
    #[arg(short = 'g', long = "group")]
    pub group: String,
}

/// Arguments for the read-all commands.
#[derive(Args, Debug)]
pub struct ReadAllArgs {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "out-file", value_name = "FILENAME")]
    pub out_file: Option<PathBuf>,
}

/// Arguments for the bulk commands.
#[derive(Args, Debug)]
pub struct BulkArgs {
    /// Input file format
    #[arg(short = 'f', long = "format", value_enum, default_value = "csv")]
    pub format: InputFormat,

    /// Input file
    #[arg(short = 'i', long = "in-file", value_name = "FILENAME")]
    pub in_file: PathBuf,
}

/// Arguments for creating a user.
#[derive(Args, Debug)]
pub struct UserCreateArgs {
    /// Identity type (adobeID, enterpriseID or federatedID)
    #[arg(long = "type", default_value = "federatedID")]
    pub identity_type: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Username (defaults to the email)
    #[arg(long)]
    pub username: Option<String>,

    /// Directory domain (defaults to the username's domain)
    #[arg(long)]
    pub domain: Option<String>,

    /// Comma-delimited list of groups to assign
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// First name
    #[arg(long)]
    pub firstname: Option<String>,

    /// Last name
    #[arg(long)]
    pub lastname: Option<String>,

    /// Two-letter (ISO 3166-1 alpha-2) country code
    #[arg(long)]
    pub country: String,
}

/// Arguments for updating a user.
#[derive(Args, Debug)]
pub struct UserUpdateArgs {
    /// Email address that identifies the user
    #[arg(short = 'e', long)]
    pub email: String,

    /// New email address
    #[arg(short = 'E', long = "email-new")]
    pub email_new: Option<String>,

    /// New first name
    #[arg(short = 'f', long)]
    pub firstname: Option<String>,

    /// New last name
    #[arg(short = 'l', long)]
    pub lastname: Option<String>,

    /// New username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// New two-letter country code
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    /// Comma-delimited list of groups to add
    #[arg(short = 'g', long = "groups-add", value_delimiter = ',')]
    pub groups_add: Vec<String>,

    /// Comma-delimited list of groups to remove
    #[arg(short = 'G', long = "groups-remove", value_delimiter = ',')]
    pub groups_remove: Vec<String>,
}

/// Arguments for deleting a user.
#[derive(Args, Debug)]
pub struct UserDeleteArgs {
    /// User email address
    #[arg(short, long)]
    pub email: String,

    /// Also delete the account from its identity directory
    #[arg(short = 'd', long = "hard")]
    pub hard: bool,
}

/// Arguments for creating a group.
#[derive(Args, Debug)]
pub struct GroupCreateArgs {
    /// Group name
    #[arg(long)]
    pub name: String,

    /// Group description
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for updating a group.
#[derive(Args, Debug)]
pub struct GroupUpdateArgs {
    /// Current group name
    #[arg(short = 'n', long)]
    pub name: String,

    /// New group name
    #[arg(short = 'N', long = "name-new")]
    pub name_new: Option<String>,

    /// New description
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Comma-delimited list of user emails to add
    #[arg(short = 'u', long = "users-add", value_delimiter = ',')]
    pub users_add: Vec<String>,

    /// Comma-delimited list of user emails to remove
    #[arg(short = 'U', long = "users-remove", value_delimiter = ',')]
    pub users_remove: Vec<String>,

    /// Comma-delimited list of product profiles to add
    #[arg(short = 'p', long = "profiles-add", value_delimiter = ',')]
    pub profiles_add: Vec<String>,

    /// Comma-delimited list of product profiles to remove
    #[arg(short = 'P', long = "profiles-remove", value_delimiter = ',')]
    pub profiles_remove: Vec<String>,
}

/// Arguments for deleting a group.
#[derive(Args, Debug)]
pub struct GroupDeleteArgs {
    /// Group name
    #[arg(short, long)]
    pub name: String,
}
