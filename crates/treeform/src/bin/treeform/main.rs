mod cli;

use std::path::Path;
use std::sync::Arc;
use treeform::{DataBag, Document, PathScope, Stack, TreeAssembler};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TREEFORM_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime\n{e}");
            std::process::exit(1);
        }
    };

    let command_result = match cli.command {
        cli::Command::Build(build_cli) => runtime.block_on(build(build_cli)),
        cli::Command::Dev(dev_cli) => runtime.block_on(dev(dev_cli)),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub async fn build(cli: cli::BuildCommand) -> anyhow::Result<()> {
    let data = load_data(&cli.data)?;
    let documents = assemble(&cli.source, data.clone()).await?;

    let mut bag = data;
    bag.merge_missing(treeform::collect_exports(&documents)?);

    let stack = Stack::finalize(&documents, &bag)?;
    output(&cli.output, &stack)?;
    Ok(())
}

async fn assemble(source: &cli::SourceArgs, data: DataBag) -> anyhow::Result<Vec<Document>> {
    let scope = scope_for(&source.source, source.relative.as_deref())?;
    tracing::info!(root=%scope.root().display(), scope=%scope, "assembling");

    let documents = TreeAssembler::new(scope, Arc::new(data)).build().await?;
    Ok(documents)
}

/// Without --relative the last component of `source` is the root-level scope
fn scope_for(source: &Path, relative: Option<&Path>) -> anyhow::Result<PathScope> {
    if let Some(relative) = relative {
        return Ok(PathScope::new(source, relative)?);
    }

    let source = source.canonicalize()?;
    let (Some(root), Some(name)) = (source.parent(), source.file_name()) else {
        anyhow::bail!(
            "{} has no parent directory, use --relative",
            source.display()
        );
    };

    Ok(PathScope::new(root, name)?)
}

fn load_data(args: &cli::DataArgs) -> anyhow::Result<DataBag> {
    let mut data = DataBag::new();

    for file_path in &args.files {
        data.merge(DataBag::load_file(file_path)?);
    }

    for assignment in &args.vars {
        let (name, value) = DataBag::parse_assignment(assignment)?;
        data.insert(name, value);
    }

    Ok(data)
}

fn output(output: &cli::OutputArgs, stack: &Stack) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), stack)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), stack)?;
            println!();
        }
    };

    Ok(())
}

/// (treeform-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub async fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Documents(documents_cli) => {
            let data = load_data(&documents_cli.data)?;
            let documents = assemble(&documents_cli.source, data).await?;
            println!("{documents:#?}");
        }
        Scope(scope_cli) => {
            let scope = PathScope::new(std::env::current_dir()?, &scope_cli.relative)?;
            let suffix = scope_cli.suffix.as_str();
            println!("depth:  {}", scope.depth());
            println!("token:  {}", scope.scoped_token(suffix));
            println!(
                "parent: {}",
                scope
                    .parent_scoped_token(suffix)
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("root:   {}", scope.root_scoped_token(suffix));
        }
    }

    Ok(())
}
