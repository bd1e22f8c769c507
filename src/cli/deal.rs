//! Deal lifecycle and catalog commands: new, list, recommend.

use clap::{Subcommand, ValueEnum};

use crate::config::Config;
use crate::directory::Directory;
use crate::model::{ProductType, ProjectPhase};
use crate::owner::resolve_owner;
use crate::service::{self, NewDeal, Outreach};
use crate::transport::Transport;

use super::format;

#[derive(Debug, Subcommand)]
pub enum DealCommand {
    /// Create a new deal. Prints the deal ID.
    New {
        /// Owner of the deal; signs generated emails.
        /// When omitted, `OUTREACH_OWNER` or the configured default owner is used.
        #[arg(long = "as")]
        owner: Option<String>,

        /// Account: a directory company id or a plain name.
        #[arg(long)]
        company: String,

        /// The building project.
        #[arg(long)]
        project: String,

        #[arg(long, value_enum)]
        phase: PhaseArg,

        #[arg(long, value_enum, default_value = "other")]
        product: ProductArg,

        /// Estimated value in whole dollars.
        #[arg(long, default_value_t = 0)]
        value: u64,

        /// Directory id of the current primary contact.
        #[arg(long)]
        contact: Option<String>,

        /// Short deal title.
        title: String,
    },

    /// List deals.
    List,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Show the sequence the catalog picks for a contact role.
    Recommend {
        /// Job title, e.g. "Principal Architect".
        #[arg(long)]
        role: String,

        #[arg(long, value_enum)]
        phase: PhaseArg,

        #[arg(long, value_enum, default_value = "other")]
        product: ProductArg,
    },
}

/// CLI-facing project phase, mapped to the domain `ProjectPhase`.
#[derive(Debug, Clone, ValueEnum)]
pub enum PhaseArg {
    Planning,
    SchematicDesign,
    DesignDevelopment,
    ConstructionDocuments,
    Construction,
}

impl PhaseArg {
    fn to_domain(&self) -> ProjectPhase {
        match self {
            Self::Planning => ProjectPhase::Planning,
            Self::SchematicDesign => ProjectPhase::SchematicDesign,
            Self::DesignDevelopment => ProjectPhase::DesignDevelopment,
            Self::ConstructionDocuments => ProjectPhase::ConstructionDocuments,
            Self::Construction => ProjectPhase::Construction,
        }
    }
}

/// CLI-facing product line, mapped to the domain `ProductType`.
#[derive(Debug, Clone, ValueEnum)]
pub enum ProductArg {
    Flooring,
    Acoustics,
    Furniture,
    Lighting,
    Other,
}

impl ProductArg {
    fn to_domain(&self) -> ProductType {
        match self {
            Self::Flooring => ProductType::Flooring,
            Self::Acoustics => ProductType::Acoustics,
            Self::Furniture => ProductType::Furniture,
            Self::Lighting => ProductType::Lighting,
            Self::Other => ProductType::Other,
        }
    }
}

pub(super) fn run<D: Directory, T: Transport>(
    config: &Config,
    svc: &Outreach<'_, D, T>,
    command: DealCommand,
) -> Result<(), String> {
    match command {
        DealCommand::New {
            owner,
            company,
            project,
            phase,
            product,
            value,
            contact,
            title,
        } => {
            let owner = resolve_owner(owner.as_deref(), config)?;
            let new = NewDeal {
                title,
                value,
                owner,
                company,
                project,
                phase: phase.to_domain(),
                product: product.to_domain(),
                contact,
            };
            let deal = svc
                .create_deal(new)
                .map_err(|e| format!("failed to create deal: {e}"))?;
            println!("{}", deal.id);
            Ok(())
        }
        DealCommand::List => cmd_list(svc),
    }
}

fn cmd_list<D: Directory, T: Transport>(svc: &Outreach<'_, D, T>) -> Result<(), String> {
    let deals = svc
        .list_deals()
        .map_err(|e| format!("failed to list deals: {e}"))?;

    if deals.is_empty() {
        println!("No deals");
        return Ok(());
    }

    for d in &deals {
        println!("{}", format::format_deal_line(d));
    }
    Ok(())
}

pub(super) fn run_catalog(command: &CatalogCommand) -> Result<(), String> {
    match command {
        CatalogCommand::Recommend {
            role,
            phase,
            product,
        } => {
            let definition = service::recommend(role, phase.to_domain(), product.to_domain());
            print!("{}", format::format_definition(&definition));
            Ok(())
        }
    }
}
