use clap::Subcommand;
use entigen::{Generator, Outcome, find_table};
use entigen_schema::entity_name;

use crate::context::{CliError, Context};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold or remove a model (entity, mapper, repository)
    Model {
        #[command(subcommand)]
        action: ModelCommand,
    },

    /// Merge schema facts into one entity's doc block
    Entity {
        #[command(subcommand)]
        action: EntityCommand,
    },

    /// Synchronize every entity with the whole schema, in schema order
    Sync,

    /// Scaffold or remove a service class
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Create the model files and register the repository
    Create {
        /// Model name, e.g. `Article`
        name: String,

        /// Also scaffold a conventions class
        #[arg(long)]
        with_conventions: bool,
    },

    /// Delete the model directory and unregister the repository
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Merge every column of a table
    Sync { table: String },

    /// Merge a single column of a table
    Column { table: String, column: String },

    /// Add the collection side of a foreign key on the referenced entity
    OneToMany {
        table: String,
        /// Foreign-key column of `table`
        column: String,
    },

    /// Add the many-to-many properties of a junction table on both entities
    ManyToMany {
        junction: String,

        /// Key column whose entity owns the join
        #[arg(long)]
        main: Option<String>,
    },

    /// Re-sort an entity's doc block without adding anything
    Sort { table: String },
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    Create { name: String },
    Remove { name: String },
}

pub fn execute(command: &Command, context: &Context) -> Result<Vec<Outcome>, CliError> {
    let outcomes = match command {
        Command::Model { action } => model(action, context)?,
        Command::Entity { action } => entity(action, context)?,
        Command::Sync => {
            let schema = context.load_schema()?;
            context.generator().sync_schema(&schema)?
        }
        Command::Service { action } => {
            let generator = context.generator();
            let outcome = match action {
                ServiceCommand::Create { name } => generator.create_service(name)?,
                ServiceCommand::Remove { name } => generator.remove_service(name)?,
            };
            vec![outcome]
        }
    };
    Ok(outcomes)
}

fn model(action: &ModelCommand, context: &Context) -> Result<Vec<Outcome>, CliError> {
    match action {
        ModelCommand::Create {
            name,
            with_conventions,
        } => {
            let mut settings = context.settings.clone();
            settings.with_conventions |= *with_conventions;
            let generator = Generator::new(context.layout.clone(), settings);
            Ok(generator.create_model(name)?)
        }
        ModelCommand::Remove { name } => Ok(context.generator().remove_model(name)?),
    }
}

fn entity(action: &EntityCommand, context: &Context) -> Result<Vec<Outcome>, CliError> {
    let generator = context.generator();
    let outcomes = match action {
        EntityCommand::Sort { table } => vec![generator.sort_entity(&entity_name(table))?],
        EntityCommand::Sync { table } => {
            let schema = context.load_schema()?;
            vec![generator.sync_table(find_table(&schema, table)?)?]
        }
        EntityCommand::Column { table, column } => {
            let schema = context.load_schema()?;
            vec![generator.add_column(find_table(&schema, table)?, column)?]
        }
        EntityCommand::OneToMany { table, column } => {
            let schema = context.load_schema()?;
            vec![generator.one_to_many(find_table(&schema, table)?, column)?]
        }
        EntityCommand::ManyToMany { junction, main } => {
            let schema = context.load_schema()?;
            generator.many_to_many(find_table(&schema, junction)?, main.as_deref())?
        }
    };
    Ok(outcomes)
}
