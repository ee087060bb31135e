//! CLI argument parsing and command dispatch.

pub mod args;
pub mod prompt;
pub mod set;

use anyhow::{Context, Result, bail};
use args::{Cli, Commands, RolesCommands};

use crate::config::{CertificateRequestConfig, ConfigField};
use crate::error::CreateError;
use crate::orchestrator::{IssuanceOutcome, Orchestrator};
use crate::pkcs12::Pkcs12CaLoader;
use crate::provider::RustCryptoProvider;
use crate::session::CertBuilder;
use crate::settings::JsonFileStore;

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    let store = match cli.settings {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_location()?,
    };
    let mut builder = CertBuilder::new(store);
    builder.subscribe(|config: &CertificateRequestConfig, field: ConfigField| {
        println!("{}", set::describe(config, field));
    });

    match cli.command {
        Commands::Show => {
            println!("{}", serde_json::to_string_pretty(builder.config())?);
        }
        Commands::Path => {
            println!("{}", builder.store().path().display());
        }
        Commands::Set { key, value } => {
            set::apply(&mut builder, &key, &value)?;
            builder.save_settings()?;
        }
        Commands::Reset => {
            builder.replace(CertificateRequestConfig::default());
            builder.save_settings()?;
        }
        Commands::Roles(args) => roles(&mut builder, args.command)?,
        Commands::Validate => match builder.validate() {
            Ok(()) => println!("The settings are valid."),
            Err(err) => bail!("{} settings: {err}", err.group),
        },
        Commands::Create => {
            let mut orchestrator = Orchestrator::new(
                RustCryptoProvider::default(),
                Pkcs12CaLoader,
                prompt::TerminalPrompt,
            );
            match builder.create_certificate(&mut orchestrator) {
                Ok(IssuanceOutcome::Created(artifacts)) => {
                    println!("The new certificate was successfully created.");
                    println!("  {}", artifacts.pfx.display());
                    println!("  {}", artifacts.cer.display());
                }
                Ok(IssuanceOutcome::Cancelled) => println!("Cancelled. Nothing was created."),
                Err(CreateError::Invalid(err)) => {
                    bail!("{} settings: {err}", err.group)
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

fn roles(builder: &mut CertBuilder<JsonFileStore>, command: RolesCommands) -> Result<()> {
    match command {
        RolesCommands::List { id_type } => {
            let id_type = id_type.unwrap_or(builder.config().subject_alt_name.id_type);
            let selected = builder.config().subject_alt_name.roles();
            for role in builder.catalog().list_for(id_type) {
                let mark = if selected.contains(role) { "*" } else { " " };
                println!("{mark} {role}");
            }
            return Ok(());
        }
        RolesCommands::Select { mut names, custom } => {
            let id_type = builder.config().subject_alt_name.id_type;
            for name in custom {
                builder
                    .add_custom_role(id_type, &name)
                    .with_context(|| format!("Could not add the custom role '{name}'"))?;
                names.push(name);
            }

            if names.is_empty() {
                let offered = builder.available_roles().to_vec();
                match prompt::pick_roles(id_type.as_str(), &offered) {
                    Some(picked) => names = picked,
                    None => {
                        println!("Cancelled. The selected roles were not changed.");
                        return Ok(());
                    }
                }
            }

            let unknown: Vec<&String> = names
                .iter()
                .filter(|name| !builder.available_roles().contains(*name))
                .collect();
            if !unknown.is_empty() {
                log::warn!("roles not in the {id_type} catalog: {unknown:?}");
            }

            builder.select_roles(&names)?;
        }
        RolesCommands::Remove { names } => {
            builder.deselect_roles(&names)?;
        }
        RolesCommands::Clear => builder.clear_roles(),
    }

    builder.save_settings()?;
    Ok(())
}
