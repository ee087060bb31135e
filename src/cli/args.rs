//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::IdType;

/// Configure, validate and issue NG9-1-1 X.509 certificates.
///
/// Settings are kept between runs in a JSON document; every `set` or
/// `roles` command saves it.
#[derive(Parser, Debug)]
#[command(name = "certbuilder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings document to use instead of the per-user one
    #[arg(long, env = "CERTBUILDER_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current settings
    Show,

    /// Print the settings document location
    Path,

    /// Change one setting and save
    Set {
        /// Setting to change (see `certbuilder set --help`)
        #[arg(long_help = SET_KEYS_HELP)]
        key: String,

        /// New value; an empty string clears optional settings
        value: String,
    },

    /// Replace the saved settings with the defaults
    Reset,

    /// Manage the roles claimed in the subject alternative name
    Roles(RolesArgs),

    /// Check the settings without creating anything
    Validate,

    /// Create the certificate described by the settings
    Create,
}

const SET_KEYS_HELP: &str = "Setting to change. One of:
  self-signed      true|false
  ca-certificate   true|false (the new certificate may sign others)
  algorithm        rsa|ecdsa
  ca-cert-file     PKCS#12 file of the signing CA
  expires-years    lifetime of a self-signed certificate
  destination      directory the .pfx and .cer files are written to
  file-name        base name of the written files
  add-san          true|false
  cn, o, ou, l, st, c
                   subject distinguished name fields
  id-type          ElementId|ServiceId|AgencyId|AgentId|CAId
  id               NG9-1-1 identifier
  usage.<flag>     true|false, e.g. usage.digitalSignature";

#[derive(Args, Debug)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommands,
}

#[derive(Subcommand, Debug)]
pub enum RolesCommands {
    /// List the roles offered for an identifier type
    List {
        /// Identifier type (defaults to the configured one)
        #[arg(long)]
        id_type: Option<IdType>,
    },

    /// Add roles to the selection; prompts with a list when none are given
    Select {
        /// Roles to select
        names: Vec<String>,

        /// Add a custom role to the catalog and select it
        #[arg(long = "custom", value_name = "NAME")]
        custom: Vec<String>,
    },

    /// Remove roles from the selection
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Remove every selected role
    Clear,
}
